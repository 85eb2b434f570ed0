use super::*;
use core::ops::Range;
use dtnbp_bundle::{
    BundleFlags, CreationTimestamp, v6,
    admin_record::{AdminRecord, CustodySignal, CustodySignalReason, SignalFragment},
};

/// What a custody signal needs to know about the bundle it acknowledges
#[derive(Debug, Clone)]
pub(super) struct CustodySubject {
    source: EndpointId,
    timestamp: CreationTimestamp,
    fragment: Option<SignalFragment>,
    custodian: EndpointId,
    lifetime: time::Duration,
}

impl CustodySubject {
    /// `None` unless custody transfer was requested
    pub(super) fn new(bundle: &dtnbp_bundle::Bundle) -> Option<Self> {
        if !bundle.custody_requested() {
            return None;
        }
        Some(Self {
            source: bundle.source().clone(),
            timestamp: *bundle.timestamp(),
            fragment: bundle.fragment_info().map(|f| SignalFragment {
                offset: f.offset,
                length: bundle.adu.len() as u64,
            }),
            custodian: bundle.custodian()?.clone(),
            lifetime: bundle.lifetime(),
        })
    }
}

impl Agent {
    /// Tell the current custodian of a bundle whether custody was accepted (RFC 5050 §6.1.2)
    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub(super) fn send_custody_signal(&mut self, subject: &CustodySubject, succeeded: bool) {
        if subject.custodian.is_none() {
            debug!(
                "Bundle {}/{}.{} has no custodian to signal",
                subject.source, subject.timestamp.creation_time, subject.timestamp.sequence_number
            );
            return;
        }

        let record = AdminRecord::CustodySignal(CustodySignal {
            succeeded,
            reason: CustodySignalReason::NoAdditionalInformation,
            fragment: subject.fragment,
            time_of_signal: self.scheduler.now(),
            timestamp: subject.timestamp,
            source: subject.source.clone(),
        });
        debug!(
            "Sending custody signal to {} for sequence number {}",
            subject.custodian, subject.timestamp.sequence_number
        );

        let source = self.endpoint_id.clone();
        if self
            .originate(
                record.emit().into(),
                &source,
                &subject.custodian,
                subject.lifetime,
                false,
                v6::Priority::default(),
                BundleFlags {
                    is_admin_record: true,
                    ..Default::default()
                },
            )
            .trace_warn("Failed to send custody signal")
            .is_some()
        {
            metrics::counter!("bpa_custody_signals_sent").increment(1);
        }
    }

    /// Apply a custody signal to the bundle it acknowledges
    pub(super) fn custody_signal_received(&mut self, signal: CustodySignal) {
        if !signal.succeeded {
            debug!(
                "Custody of {}/{}.{} refused: {:?}",
                signal.source,
                signal.timestamp.creation_time,
                signal.timestamp.sequence_number,
                signal.reason
            );
            return;
        }

        let Some(handle) = self.store.find(&signal.source, &signal.timestamp) else {
            debug!(
                "No stored bundle {}/{}.{} for custody signal",
                signal.source, signal.timestamp.creation_time, signal.timestamp.sequence_number
            );
            self.store.debug_dump();
            return;
        };
        let Some(total_len) = self.store.get(handle).map(|b| b.bundle.total_adu_length()) else {
            return;
        };
        let Some(metadata) = self.store.metadata_mut(handle) else {
            return;
        };

        merge_ack(&mut metadata.acks, signal.range(total_len));
        trace!("Custody acknowledgements now {:?}", metadata.acks);

        if fully_acknowledged(&metadata.acks, total_len)
            && let Some(bundle) = self.store.remove(handle)
        {
            bundle.trace_drop(DropReason::FullyAcknowledged);
        }
    }
}

/// Join `ack` to any range it abuts, or record it as a new range.
///
/// Only exact adjacency merges: overlapping ranges are kept apart.
pub(crate) fn merge_ack(acks: &mut Vec<Range<u64>>, ack: Range<u64>) {
    let mut merged = false;
    for range in acks.iter_mut() {
        if range.end == ack.start {
            range.end = ack.end;
            merged = true;
        }
        if range.start == ack.end {
            range.start = ack.start;
            merged = true;
        }
    }
    if !merged && !acks.contains(&ack) {
        acks.push(ack);
    }
}

fn fully_acknowledged(acks: &[Range<u64>], total_len: u64) -> bool {
    acks.iter().any(|range| range.start == 0 && range.end == total_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_ranges_merge() {
        let mut acks = Vec::new();
        merge_ack(&mut acks, 0..50);
        merge_ack(&mut acks, 50..100);
        assert_eq!(acks, [0..100]);
        assert!(fully_acknowledged(&acks, 100));

        // Either order
        let mut acks = Vec::new();
        merge_ack(&mut acks, 50..100);
        merge_ack(&mut acks, 0..50);
        assert_eq!(acks, [0..100]);
    }

    #[test]
    fn gaps_stay_apart() {
        let mut acks = Vec::new();
        merge_ack(&mut acks, 0..30);
        merge_ack(&mut acks, 60..100);
        assert_eq!(acks, [0..30, 60..100]);
        assert!(!fully_acknowledged(&acks, 100));
    }

    #[test]
    fn overlap_is_not_union() {
        let mut acks = vec![0..60];
        merge_ack(&mut acks, 40..100);
        assert_eq!(acks, [0..60, 40..100]);
        assert!(!fully_acknowledged(&acks, 100));
    }

    #[test]
    fn duplicates_are_not_recorded() {
        let mut acks = Vec::new();
        merge_ack(&mut acks, 0..50);
        merge_ack(&mut acks, 0..50);
        assert_eq!(acks, [0..50]);
        merge_ack(&mut acks, 50..100);
        assert!(fully_acknowledged(&acks, 100));
    }

    #[test]
    fn whole_bundle() {
        let mut acks = Vec::new();
        merge_ack(&mut acks, 0..0);
        assert!(fully_acknowledged(&acks, 0));
        assert!(!fully_acknowledged(&acks, 1));
    }
}
