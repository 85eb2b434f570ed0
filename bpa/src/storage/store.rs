use super::*;
use bundle::DropReason;
use bytes::Bytes;
use dtnbp_bundle::CreationTimestamp;

impl BundleStore {
    /// Store a bundle and start its expiry timer.
    ///
    /// A bundle whose lifetime has already elapsed is dropped instead and
    /// `None` is returned.
    #[cfg_attr(feature = "instrument", instrument(skip_all))]
    pub fn insert(&mut self, mut bundle: bundle::Bundle) -> Option<BundleHandle> {
        let now = self.scheduler.now();
        if bundle.has_expired(now) {
            debug!("Bundle {} expired before it could be stored", bundle.bundle);
            bundle.trace_drop(DropReason::Expired);
            return None;
        }

        let handle = self.allocate();
        bundle.metadata.expiry_timer = self.schedule_expiry(handle, &bundle, now);
        self.stored_bytes += bundle.bundle.adu.len() as u64;
        self.order.insert(StoreKey::new(&bundle.bundle, handle));
        self.slots[handle.index as usize].bundle = Some(bundle);

        self.max_bundles_stored = self.max_bundles_stored.max(self.len());
        self.update_gauges();
        Some(handle)
    }

    fn allocate(&mut self) -> BundleHandle {
        let index = self.free.pop().unwrap_or_else(|| {
            self.slots.push(Slot::default());
            (self.slots.len() - 1) as u32
        });
        BundleHandle {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    /// Remove a bundle, cancelling any timers it still has running
    pub fn remove(&mut self, handle: BundleHandle) -> Option<bundle::Bundle> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)?;
        let mut bundle = slot.bundle.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);

        self.order.remove(&StoreKey::new(&bundle.bundle, handle));
        self.stored_bytes = self
            .stored_bytes
            .saturating_sub(bundle.bundle.adu.len() as u64);

        if let Some(timer) = bundle.metadata.expiry_timer.take() {
            self.scheduler.cancel(timer);
        }
        if let Some(timer) = bundle.metadata.retransmit_timer.take() {
            self.scheduler.cancel(timer);
        }

        self.update_gauges();
        Some(bundle)
    }

    pub fn get(&self, handle: BundleHandle) -> Option<&bundle::Bundle> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.bundle.as_ref())
    }

    pub fn contains(&self, handle: BundleHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn metadata_mut(&mut self, handle: BundleHandle) -> Option<&mut Metadata> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.bundle.as_mut())
            .map(|bundle| &mut bundle.metadata)
    }

    /// Edit a stored wire bundle, keeping the store order and byte count in step
    pub fn modify<R>(
        &mut self,
        handle: BundleHandle,
        f: impl FnOnce(&mut dtnbp_bundle::Bundle) -> R,
    ) -> Option<R> {
        let bundle = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.bundle.as_mut())?;

        self.order.remove(&StoreKey::new(&bundle.bundle, handle));
        let old_len = bundle.bundle.adu.len() as u64;

        let r = f(&mut bundle.bundle);

        self.order.insert(StoreKey::new(&bundle.bundle, handle));
        self.stored_bytes = (self.stored_bytes - old_len) + bundle.bundle.adu.len() as u64;
        self.update_gauges();
        Some(r)
    }

    /// Stored bundles in store order
    pub fn iter(&self) -> impl Iterator<Item = (BundleHandle, &bundle::Bundle)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.get(key.handle).map(|bundle| (key.handle, bundle)))
    }

    /// The first bundle with the given source and creation timestamp
    pub fn find(&self, source: &EndpointId, timestamp: &CreationTimestamp) -> Option<BundleHandle> {
        self.iter()
            .find(|(_, b)| b.bundle.source() == source && b.bundle.timestamp() == timestamp)
            .map(|(handle, _)| handle)
    }

    /// Every bundle, fragments included, with the given source and creation timestamp
    pub fn find_all(&self, source: &EndpointId, timestamp: &CreationTimestamp) -> Vec<BundleHandle> {
        self.iter()
            .filter(|(_, b)| b.bundle.source() == source && b.bundle.timestamp() == timestamp)
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Bundles waiting for a forwarding opportunity
    pub fn forward_pending(&self) -> Vec<BundleHandle> {
        self.iter()
            .filter(|(_, b)| {
                b.metadata
                    .retention
                    .contains(RetentionConstraints::FORWARD_PENDING)
            })
            .map(|(handle, _)| handle)
            .collect()
    }

    fn first_deliverable(&self, destination: &EndpointId) -> Option<(BundleHandle, &bundle::Bundle)> {
        self.iter()
            .find(|(_, b)| b.bundle.destination() == destination && !b.bundle.is_fragment())
    }

    /// Remove the first complete bundle addressed to `destination`
    pub fn take_for_delivery(&mut self, destination: &EndpointId) -> Option<bundle::Bundle> {
        let (handle, _) = self.first_deliverable(destination)?;
        self.remove(handle)
    }

    /// The ADU of the first complete bundle addressed to `destination`
    pub fn peek_adu(&self, destination: &EndpointId) -> Option<Bytes> {
        self.first_deliverable(destination)
            .map(|(_, b)| b.bundle.adu.clone())
    }

    /// Log every stored bundle in store order
    pub fn debug_dump(&self) {
        debug!(
            "Bundle store: {} bundles, {} bytes, at most {} bundles held",
            self.len(),
            self.stored_bytes,
            self.max_bundles_stored
        );
        for (handle, b) in self.iter() {
            debug!(
                "  {handle} {} -> {} priority {} length {} {:?}",
                b.bundle,
                b.bundle.destination(),
                b.bundle.priority(),
                b.bundle.adu.len(),
                b.metadata.retention
            );
        }
    }
}
