use super::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// The bundle was handed to a CLA in `segments` segments, `failed` of which the CLA refused
    Forwarded { segments: usize, failed: usize },
    /// No ready CLA, the bundle waits in the store
    Contraindicated,
}

impl Agent {
    /// Forward a stored bundle towards its destination (RFC 5050 §5.4).
    ///
    /// Returns `None` if `handle` no longer names a stored bundle.
    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub(crate) fn forward(&mut self, handle: BundleHandle) -> Option<ForwardOutcome> {
        let metadata = self.store.metadata_mut(handle)?;
        metadata
            .retention
            .insert(RetentionConstraints::FORWARD_PENDING);
        metadata
            .retention
            .remove(RetentionConstraints::DISPATCH_PENDING);

        let bundle = &self.store.get(handle)?.bundle;
        let destination = bundle.destination().clone();
        let Some(cla) = self.outgoing_cla(&destination).filter(|cla| cla.is_ready()) else {
            debug!("Forwarding {bundle} to {destination} is contraindicated, waiting for a CLA");
            return Some(ForwardOutcome::Contraindicated);
        };
        debug!(bundle = %bundle, %destination, "unicast forward");

        let segments = self.segments(bundle);
        let custody_requested = bundle.custody_requested();
        let address = self.transport_address(&destination);

        if custody_requested {
            let retransmit = self
                .scheduler
                .schedule(self.config.custody_rto, TimerEvent::Retransmit(handle));
            if let Some(metadata) = self.store.metadata_mut(handle)
                && let Some(previous) = metadata.retransmit_timer.replace(retransmit)
            {
                self.scheduler.cancel(previous);
            }
        }

        let count = segments.len();
        let mut failed = 0;
        for segment in segments {
            debug!(bundle = %segment, %address, length = segment.adu.len(), "outbound queued");
            if cla
                .send_bundle(&segment, &address)
                .trace_warn("CLA failed to send bundle")
                .is_none()
            {
                failed += 1;
            }
        }

        let metadata = self.store.metadata_mut(handle)?;
        metadata
            .retention
            .remove(RetentionConstraints::FORWARD_PENDING);
        if metadata.retention.is_empty()
            && let Some(bundle) = self.store.remove(handle)
        {
            bundle.trace_drop(if failed == 0 {
                DropReason::Forwarded
            } else {
                DropReason::ForwardFailed
            });
        }
        Some(ForwardOutcome::Forwarded {
            segments: count,
            failed,
        })
    }

    /// Split a bundle into outbound segments no larger than the configured maximum
    fn segments(&self, bundle: &dtnbp_bundle::Bundle) -> Vec<dtnbp_bundle::Bundle> {
        let len = bundle.adu.len() as u64;
        let max = self.config.max_bundle_size.max(1);
        if len <= max {
            return vec![bundle.clone()];
        }
        if bundle.flags().do_not_fragment {
            warn!("Bundle {bundle} must not be fragmented, sending {len} bytes whole");
            return vec![bundle.clone()];
        }
        (0..len)
            .step_by(max as usize)
            .map(|offset| bundle.segment(offset, max.min(len - offset)))
            .collect()
    }

    /// A CLA has become ready, retry every bundle waiting for it
    #[cfg_attr(feature = "instrument", instrument(skip_all))]
    pub fn cla_ready(&mut self, cla: &Arc<dyn cla::Cla>) {
        for handle in self.store.forward_pending() {
            let Some(bundle) = self.store.get(handle) else {
                continue;
            };
            if self
                .outgoing_cla(bundle.bundle.destination())
                .is_some_and(|outgoing| cla::same_cla(&outgoing, cla))
            {
                self.forward(handle);
            }
        }
    }
}
