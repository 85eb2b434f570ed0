/*!
Virtual time and timers.

The agent never sleeps or spawns: it asks the [`Scheduler`] to deliver a
[`TimerEvent`] later, and the host hands each due event back through
[`Agent::on_timer`](crate::agent::Agent::on_timer). [`ManualScheduler`] is a
self-contained implementation for simulations and tests.
*/

use super::*;
use std::collections::BTreeMap;
use std::sync::Mutex;
use storage::BundleHandle;

/// Identifies a scheduled event so it can be cancelled
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Start the agent
    Start,
    /// Stop the agent
    Stop,
    /// A stored bundle's lifetime has elapsed
    Expire(BundleHandle),
    /// Custody has not been acknowledged in time, forward the bundle again
    Retransmit(BundleHandle),
}

pub trait Scheduler: Send + Sync {
    /// Virtual time since the start of the simulation
    fn now(&self) -> time::Duration;

    /// Deliver `event` once `after` has elapsed
    fn schedule(&self, after: time::Duration, event: TimerEvent) -> TimerHandle;

    /// Cancel a scheduled event, cancelling a fired or unknown event is a no-op
    fn cancel(&self, handle: TimerHandle);
}

#[derive(Default)]
struct Timers {
    now: time::Duration,
    next_id: u64,
    pending: BTreeMap<(time::Duration, u64), TimerEvent>,
}

/// A scheduler whose clock only moves when told to.
///
/// Events due at the same instant are released in the order they were
/// scheduled.
#[derive(Default)]
pub struct ManualScheduler {
    timers: Mutex<Timers>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the next event due at or before `until`, moving the clock to its due time
    pub fn pop_due(&self, until: time::Duration) -> Option<TimerEvent> {
        let mut timers = self.timers.lock().trace_expect("Failed to acquire lock");
        let entry = timers.pending.first_entry()?;
        let due = entry.key().0;
        if due > until {
            return None;
        }
        let event = entry.remove();
        if due > timers.now {
            timers.now = due;
        }
        Some(event)
    }

    /// Move the clock forward to `t`, never backwards
    pub fn advance_to(&self, t: time::Duration) {
        let mut timers = self.timers.lock().trace_expect("Failed to acquire lock");
        if t > timers.now {
            timers.now = t;
        }
    }

    /// Number of events still waiting to fire
    pub fn pending(&self) -> usize {
        self.timers
            .lock()
            .trace_expect("Failed to acquire lock")
            .pending
            .len()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> time::Duration {
        self.timers.lock().trace_expect("Failed to acquire lock").now
    }

    fn schedule(&self, after: time::Duration, event: TimerEvent) -> TimerHandle {
        let mut timers = self.timers.lock().trace_expect("Failed to acquire lock");
        let id = timers.next_id;
        timers.next_id += 1;
        let due = timers.now + after.max(time::Duration::ZERO);
        trace!("Scheduling {event:?} at {due}");
        timers.pending.insert((due, id), event);
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        self.timers
            .lock()
            .trace_expect("Failed to acquire lock")
            .pending
            .retain(|(_, id), _| *id != handle.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_in_due_order() {
        let s = ManualScheduler::new();
        s.schedule(time::Duration::seconds(5), TimerEvent::Stop);
        s.schedule(time::Duration::seconds(1), TimerEvent::Start);
        let h = s.schedule(time::Duration::seconds(3), TimerEvent::Stop);
        s.cancel(h);
        assert_eq!(s.pending(), 2);

        assert_eq!(s.pop_due(time::Duration::ZERO), None);
        assert_eq!(
            s.pop_due(time::Duration::seconds(10)),
            Some(TimerEvent::Start)
        );
        assert_eq!(s.now(), time::Duration::seconds(1));
        assert_eq!(
            s.pop_due(time::Duration::seconds(10)),
            Some(TimerEvent::Stop)
        );
        assert_eq!(s.now(), time::Duration::seconds(5));
        assert_eq!(s.pop_due(time::Duration::seconds(10)), None);

        s.advance_to(time::Duration::seconds(10));
        s.advance_to(time::Duration::seconds(2));
        assert_eq!(s.now(), time::Duration::seconds(10));
    }

    #[test]
    fn relative_to_now() {
        let s = ManualScheduler::new();
        s.advance_to(time::Duration::seconds(100));
        s.schedule(time::Duration::seconds(1), TimerEvent::Start);
        assert_eq!(s.pop_due(time::Duration::seconds(100)), None);
        assert_eq!(
            s.pop_due(time::Duration::seconds(101)),
            Some(TimerEvent::Start)
        );
    }
}
