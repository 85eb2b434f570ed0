use super::*;
use dtnbp_bundle::admin_record::AdminRecord;

impl Agent {
    /// Consume an administrative record addressed to this agent
    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub(super) fn admin_record(&mut self, handle: BundleHandle) -> Result<(), Error> {
        let Some(bundle) = self.store.remove(handle) else {
            return Ok(());
        };

        match AdminRecord::parse(&bundle.bundle.adu) {
            Err(e) => {
                debug!("Invalid administrative record in {}: {e}", bundle.bundle);
                bundle.trace_drop(DropReason::AdminRecordParseFailure);
                return Err(Error::AdminRecordParseFailure(e));
            }
            Ok(AdminRecord::CustodySignal(signal)) => {
                trace!("Custody signal from {}", bundle.bundle.source());
                self.custody_signal_received(signal);
            }
            Ok(AdminRecord::AggregateCustodySignal(signal)) => {
                // TODO: release custody of the bundles named by the custody ID fills once CTEB custody IDs are assigned
                debug!(
                    "Ignoring aggregate custody signal from {} covering {} custody ID ranges",
                    bundle.bundle.source(),
                    signal.fills.len()
                );
            }
        }

        bundle.trace_drop(DropReason::AdminRecordProcessed);
        Ok(())
    }
}
