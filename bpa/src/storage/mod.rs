/*!
The in-memory bundle store.

Bundles live in a generational arena: a [`BundleHandle`] names a slot and the
generation the slot had when the bundle was inserted, so a handle held by a
timer event stops resolving the moment its bundle is removed, even if the
slot is reused.

Iteration follows the store order: ascending priority, then creation time,
sequence number, fragment offset and source EID.
*/

use super::*;
use std::collections::BTreeSet;

mod reaper;
mod store;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleHandle {
    index: u32,
    generation: u32,
}

impl std::fmt::Display for BundleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct StoreKey {
    priority: u8,
    creation_time: u64,
    sequence_number: u64,
    fragment_offset: u64,
    source: EndpointId,
    handle: BundleHandle,
}

impl StoreKey {
    fn new(bundle: &dtnbp_bundle::Bundle, handle: BundleHandle) -> Self {
        let timestamp = bundle.timestamp();
        Self {
            priority: bundle.priority(),
            creation_time: timestamp.creation_time,
            sequence_number: timestamp.sequence_number,
            fragment_offset: bundle.fragment_offset(),
            source: bundle.source().clone(),
            handle,
        }
    }
}

#[derive(Default)]
struct Slot {
    generation: u32,
    bundle: Option<bundle::Bundle>,
}

pub struct BundleStore {
    scheduler: Arc<dyn scheduler::Scheduler>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: BTreeSet<StoreKey>,
    stored_bytes: u64,
    max_bundles_stored: usize,
}

impl BundleStore {
    pub fn new(scheduler: Arc<dyn scheduler::Scheduler>) -> Self {
        Self {
            scheduler,
            slots: Vec::new(),
            free: Vec::new(),
            order: BTreeSet::new(),
            stored_bytes: 0,
            max_bundles_stored: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total ADU bytes currently stored
    pub fn stored_bytes(&self) -> u64 {
        self.stored_bytes
    }

    /// The most bundles ever held at once
    pub fn max_bundles_stored(&self) -> usize {
        self.max_bundles_stored
    }

    fn update_gauges(&self) {
        metrics::gauge!("bpa_stored_bundles").set(self.len() as f64);
        metrics::gauge!("bpa_stored_bytes").set(self.stored_bytes as f64);
    }
}
