use super::*;
use core::net::SocketAddr;
use dtnbp_bundle::Bundle;
use thiserror::Error;

/// A specialized `Result` type for CLA operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur during CLA operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The CLA cannot send right now.
    #[error("The CLA is not ready")]
    NotReady,

    /// A bundle could not be encoded for transmission.
    #[error(transparent)]
    InvalidBundle(#[from] dtnbp_bundle::Error),

    /// An internal error occurred.
    #[error(transparent)]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A Convergence Layer Adapter, carrying bundles over some transport.
///
/// Inbound, the host decodes received bytes with [`Bundle::parse`] and hands
/// the result to [`agent::Agent::process_bundle`](crate::agent::Agent::process_bundle).
pub trait Cla: Send + Sync {
    /// Queue a bundle for transmission to `address`
    fn send_bundle(&self, bundle: &Bundle, address: &SocketAddr) -> Result<()>;

    fn is_ready(&self) -> bool;

    /// Start accepting bundles for `eid` on the local `address`
    fn enable_receive(&self, eid: &EndpointId, address: &SocketAddr) -> Result<()>;

    fn disable_receive(&self, eid: &EndpointId) -> Result<()>;
}

/// CLA identity is the identity of the shared instance
pub fn same_cla(a: &Arc<dyn Cla>, b: &Arc<dyn Cla>) -> bool {
    core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
