/*!
A Bundle Protocol agent (RFC 5050) with custody transfer.

The [`agent::Agent`] owns a [`storage::BundleStore`] and drives each bundle
through dispatch, forwarding, local delivery and custody acknowledgement.
Everything outside the bundle layer is supplied by the host through three
collaborator traits: [`cla::Cla`] for convergence layers,
[`routes::RoutingAgent`] for next hop selection and
[`scheduler::Scheduler`] for virtual time and timers.

The agent is single owner: every operation takes `&mut self` and runs to
completion. Timer callbacks are plain [`scheduler::TimerEvent`] values the
host feeds back through [`agent::Agent::on_timer`], carrying
generation-checked [`storage::BundleHandle`]s, so an event that outlives its
bundle is ignored.
*/

mod error;
mod metadata;

pub mod agent;
pub mod bundle;
pub mod cla;
pub mod config;
pub mod routes;
pub mod scheduler;
pub mod static_routes;
pub mod storage;

pub use dtnbp_bundle as wire;

pub use error::Error;
pub use metadata::{Metadata, RetentionConstraints};

use dtnbp_bundle::EndpointId;
use std::sync::Arc;
use trace_err::*;
use tracing::{debug, error, info, trace, warn};

#[cfg(feature = "instrument")]
use tracing::instrument;
