use super::*;

/// Why a bundle left the store without being delivered to an application
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DropReason {
    Expired,
    FullyAcknowledged,
    Forwarded,
    /// Forwarded, but the CLA refused at least one segment
    ForwardFailed,
    AdminRecordProcessed,
    Coalesced,
    AdminRecordParseFailure,
}

/// A stored bundle: the wire bundle and the agent's bookkeeping for it
#[derive(Debug, Clone)]
pub struct Bundle {
    pub bundle: dtnbp_bundle::Bundle,
    pub metadata: Metadata,
}

impl Bundle {
    pub fn new(bundle: dtnbp_bundle::Bundle, retention: RetentionConstraints) -> Self {
        Self {
            bundle,
            metadata: Metadata {
                retention,
                ..Default::default()
            },
        }
    }

    /// Virtual time at which the bundle expires, `None` for a zero lifetime
    pub fn expiry(&self) -> Option<time::Duration> {
        let lifetime = self.bundle.lifetime();
        if lifetime.is_zero() {
            return None;
        }
        let created = time::Duration::seconds(
            i64::try_from(self.bundle.timestamp().creation_time).unwrap_or(i64::MAX),
        );
        Some(created.saturating_add(lifetime))
    }

    pub fn has_expired(&self, now: time::Duration) -> bool {
        self.expiry().is_some_and(|expiry| expiry <= now)
    }

    pub(crate) fn trace_drop(&self, reason: DropReason) {
        debug!(bundle = %self.bundle, ?reason, "dropping bundle");
        metrics::counter!("bpa_bundles_dropped").increment(1);
        if reason == DropReason::Expired {
            metrics::counter!("bpa_bundles_expired").increment(1);
        }
    }
}
