use super::*;
use thiserror::Error;

/// The primary error type for the `dtnbp-bpa` crate.
#[derive(Error, Debug)]
pub enum Error {
    /// A bundle was sent from an endpoint this agent has not registered.
    #[error("Source endpoint {0} is not registered with this agent")]
    UnregisteredSource(EndpointId),

    /// The agent was started without a routing agent.
    #[error("No routing agent configured")]
    NoRoutingAgent,

    /// The agent was started without an endpoint ID of its own.
    #[error("No endpoint ID configured")]
    NoEndpointId,

    /// An endpoint was registered twice.
    #[error("Endpoint {0} is already registered")]
    DuplicateRegistration(EndpointId),

    /// The endpoint has no registration.
    #[error("Endpoint {0} is not registered")]
    NotRegistered(EndpointId),

    /// An administrative record addressed to this agent could not be parsed.
    #[error("Failed to parse administrative record: {0}")]
    AdminRecordParseFailure(#[source] dtnbp_bundle::Error),

    /// The operation is not supported by this implementation.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// A convergence layer adapter failed.
    #[error(transparent)]
    Cla(#[from] cla::Error),

    /// A bundle could not be built or encoded.
    #[error(transparent)]
    Bundle(#[from] dtnbp_bundle::Error),
}
