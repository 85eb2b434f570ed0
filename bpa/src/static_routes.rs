/*!
A routing agent backed by a fixed table of routes.

Each destination has an ordered list of routes. The first route that is up
wins; routes are switched up and down by the host as contacts come and go.
*/

use super::*;
use core::net::{IpAddr, Ipv4Addr, SocketAddr};
use hashbrown::HashMap;
use std::sync::Mutex;

/// The address reported for an EID with no usable route
pub const DEFAULT_ADDRESS: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);

#[derive(Clone)]
pub struct Route {
    pub next_hop: EndpointId,
    pub up: bool,
    pub address: SocketAddr,
    pub cla: Option<Arc<dyn cla::Cla>>,
    pub note: Option<String>,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("next_hop", &self.next_hop.uri())
            .field("up", &self.up)
            .field("address", &self.address)
            .field("note", &self.note)
            .finish()
    }
}

#[derive(Default)]
pub struct StaticRoutingAgent {
    routes: Mutex<HashMap<EndpointId, Vec<Route>>>,
}

impl StaticRoutingAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route to `destination`, after any existing routes
    pub fn add_route(&self, destination: EndpointId, route: Route) {
        debug!(
            "Adding route to {destination} via {} ({})",
            route.next_hop,
            if route.up { "up" } else { "down" }
        );
        self.routes
            .lock()
            .trace_expect("Failed to acquire lock")
            .entry(destination)
            .or_default()
            .push(route);
    }

    /// Mark the route to `destination` via `next_hop` as up, returns false if there is no such route
    pub fn up_route(
        &self,
        destination: &EndpointId,
        next_hop: &EndpointId,
        note: Option<&str>,
    ) -> bool {
        self.set_route_state(destination, next_hop, note, true)
    }

    /// Mark the route to `destination` via `next_hop` as down, returns false if there is no such route
    pub fn down_route(
        &self,
        destination: &EndpointId,
        next_hop: &EndpointId,
        note: Option<&str>,
    ) -> bool {
        self.set_route_state(destination, next_hop, note, false)
    }

    fn set_route_state(
        &self,
        destination: &EndpointId,
        next_hop: &EndpointId,
        note: Option<&str>,
        up: bool,
    ) -> bool {
        let mut routes = self.routes.lock().trace_expect("Failed to acquire lock");
        let Some(route) = routes.get_mut(destination).and_then(|routes| {
            routes.iter_mut().find(|r| {
                r.next_hop == *next_hop && note.is_none_or(|n| r.note.as_deref() == Some(n))
            })
        }) else {
            debug!("No route to {destination} via {next_hop}");
            return false;
        };
        route.up = up;
        debug!(
            "Route to {destination} via {next_hop} is {}",
            if up { "up" } else { "down" }
        );
        true
    }

    /// The first route to `destination` that is up
    fn first_up<R>(&self, destination: &EndpointId, f: impl FnOnce(&Route) -> R) -> Option<R> {
        self.routes
            .lock()
            .trace_expect("Failed to acquire lock")
            .get(destination)
            .and_then(|routes| routes.iter().find(|r| r.up))
            .map(f)
    }
}

impl routes::RoutingAgent for StaticRoutingAgent {
    fn next_hop_eid(&self, destination: &EndpointId) -> EndpointId {
        self.first_up(destination, |r| r.next_hop.clone())
            .unwrap_or_else(EndpointId::none)
    }

    fn next_hop_cla(&self, next_hop: &EndpointId) -> Option<Arc<dyn cla::Cla>> {
        if let Some(cla) = self.first_up(next_hop, |r| r.cla.clone()) {
            return cla;
        }

        // Fall back to any live route that names the neighbour as its next hop
        self.routes
            .lock()
            .trace_expect("Failed to acquire lock")
            .values()
            .flatten()
            .find(|r| r.up && r.next_hop == *next_hop)
            .and_then(|r| r.cla.clone())
    }

    fn transport_address(&self, eid: &EndpointId) -> SocketAddr {
        self.first_up(eid, |r| r.address).unwrap_or(DEFAULT_ADDRESS)
    }
}
