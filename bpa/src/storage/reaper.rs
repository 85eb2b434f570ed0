use super::*;
use bundle::DropReason;
use scheduler::{TimerEvent, TimerHandle};

impl BundleStore {
    /// Ask the scheduler to expire `handle` when its lifetime elapses
    pub(super) fn schedule_expiry(
        &self,
        handle: BundleHandle,
        bundle: &bundle::Bundle,
        now: time::Duration,
    ) -> Option<TimerHandle> {
        let expiry = bundle.expiry()?;
        trace!("Bundle {} expires at {expiry}", bundle.bundle);
        Some(
            self.scheduler
                .schedule(expiry - now, TimerEvent::Expire(handle)),
        )
    }

    /// Handle an expiry event, removing the bundle if it is still stored and its lifetime has elapsed
    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub fn expire(&mut self, handle: BundleHandle) -> Option<bundle::Bundle> {
        if !self.get(handle)?.has_expired(self.scheduler.now()) {
            trace!("Ignoring early expiry of {handle}");
            return None;
        }
        let bundle = self.remove(handle)?;
        bundle.trace_drop(DropReason::Expired);
        Some(bundle)
    }
}
