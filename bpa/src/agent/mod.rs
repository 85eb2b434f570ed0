/*!
The bundle agent state machine.

Locally sent bundles enter through [`Agent::send`], bundles from convergence
layers through [`Agent::process_bundle`]. Both are stored and dispatched:
bundles for a registered endpoint are delivered, the rest are forwarded.
Custody signals addressed to the agent's own endpoint acknowledge the bundles
it holds custody of.
*/

use super::*;
use bundle::DropReason;
use core::net::SocketAddr;
use dtnbp_bundle::Version;
use hashbrown::HashMap;
use scheduler::{Scheduler, TimerEvent, TimerHandle};
use storage::{BundleHandle, BundleStore};

mod admin;
mod custody;
mod dispatch;
mod forward;
mod reassemble;
mod registration;
mod send;

pub use forward::ForwardOutcome;
pub use registration::Registration;

pub struct Agent {
    config: config::Config,
    endpoint_id: EndpointId,
    scheduler: Arc<dyn Scheduler>,
    routing: Option<Arc<dyn routes::RoutingAgent>>,
    clas: Vec<Arc<dyn cla::Cla>>,
    registrations: HashMap<EndpointId, Registration>,
    store: BundleStore,
    sequence_number: u64,
    bundles_delivered: u64,
    bytes_delivered: u64,
    lifecycle_timers: Vec<TimerHandle>,
}

impl Agent {
    pub fn new(config: config::Config, scheduler: Arc<dyn Scheduler>) -> Self {
        describe_metrics();
        debug!("Creating bundle agent: {config:?}");

        Self {
            endpoint_id: config.endpoint_id.clone().unwrap_or_default(),
            store: BundleStore::new(scheduler.clone()),
            config,
            scheduler,
            routing: None,
            clas: Vec::new(),
            registrations: HashMap::new(),
            sequence_number: 0,
            bundles_delivered: 0,
            bytes_delivered: 0,
            lifecycle_timers: Vec::new(),
        }
    }

    pub fn set_routing_agent(&mut self, routing: Arc<dyn routes::RoutingAgent>) {
        self.routing = Some(routing);
    }

    pub fn endpoint_id(&self) -> &EndpointId {
        &self.endpoint_id
    }

    pub fn config(&self) -> &config::Config {
        &self.config
    }

    pub fn store(&self) -> &BundleStore {
        &self.store
    }

    pub fn bundles_delivered(&self) -> u64 {
        self.bundles_delivered
    }

    pub fn bytes_delivered(&self) -> u64 {
        self.bytes_delivered
    }

    /// React to a timer event scheduled by this agent
    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub fn on_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Start => {
                if let Err(e) = self.start() {
                    error!("Failed to start bundle agent: {e}");
                }
            }
            TimerEvent::Stop => {
                if let Err(e) = self.stop() {
                    warn!("Failed to stop bundle agent: {e}");
                }
            }
            TimerEvent::Expire(handle) => {
                self.store.expire(handle);
            }
            TimerEvent::Retransmit(handle) => {
                let Some(metadata) = self.store.metadata_mut(handle) else {
                    trace!("Ignoring retransmission of removed bundle {handle}");
                    return;
                };
                metadata.retransmit_timer = None;
                debug!("Custody retransmission timer fired for {handle}");
                self.forward(handle);
            }
        }
    }

    /// Deliver every event `scheduler` has due up to `until`, then move its clock to `until`
    pub fn run_until(&mut self, scheduler: &scheduler::ManualScheduler, until: time::Duration) {
        while let Some(event) = scheduler.pop_due(until) {
            self.on_timer(event);
        }
        scheduler.advance_to(until);
    }

    /// The CLA bundles for `destination` leave through, if routing knows one
    fn outgoing_cla(&self, destination: &EndpointId) -> Option<Arc<dyn cla::Cla>> {
        let routing = self.routing.as_ref()?;
        let next_hop = routing.next_hop_eid(destination);
        if next_hop.is_none() {
            trace!("No next hop for {destination}");
            return None;
        }
        routing.next_hop_cla(&next_hop)
    }

    fn transport_address(&self, eid: &EndpointId) -> SocketAddr {
        self.routing
            .as_ref()
            .map_or(static_routes::DEFAULT_ADDRESS, |routing| {
                routing.transport_address(eid)
            })
    }

    fn now_seconds(&self) -> u64 {
        u64::try_from(self.scheduler.now().whole_seconds()).unwrap_or(0)
    }
}

fn describe_metrics() {
    metrics::describe_counter!(
        "bpa_bundles_delivered",
        metrics::Unit::Count,
        "Bundles handed to applications"
    );
    metrics::describe_counter!(
        "bpa_bytes_delivered",
        metrics::Unit::Bytes,
        "ADU bytes handed to applications"
    );
    metrics::describe_counter!(
        "bpa_bundles_expired",
        metrics::Unit::Count,
        "Bundles dropped when their lifetime elapsed"
    );
    metrics::describe_counter!(
        "bpa_bundles_dropped",
        metrics::Unit::Count,
        "Bundles removed from the store for any reason other than delivery"
    );
    metrics::describe_counter!(
        "bpa_custody_signals_sent",
        metrics::Unit::Count,
        "Custody signals originated by the agent"
    );
    metrics::describe_gauge!(
        "bpa_stored_bundles",
        metrics::Unit::Count,
        "Bundles currently held in the store"
    );
    metrics::describe_gauge!(
        "bpa_stored_bytes",
        metrics::Unit::Bytes,
        "ADU bytes currently held in the store"
    );
}
