use super::*;
use core::net::SocketAddr;

/// Next hop selection for bundles leaving this agent.
pub trait RoutingAgent: Send + Sync {
    /// The next hop towards `destination`, `dtn:none` when there is no route
    fn next_hop_eid(&self, destination: &EndpointId) -> EndpointId;

    /// The CLA that reaches `next_hop`
    fn next_hop_cla(&self, next_hop: &EndpointId) -> Option<Arc<dyn cla::Cla>>;

    /// The transport address bundles for `eid` are sent to or received on
    fn transport_address(&self, eid: &EndpointId) -> SocketAddr;
}
