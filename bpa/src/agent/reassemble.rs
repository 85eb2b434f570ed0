use super::*;
use bytes::Bytes;

enum Join {
    /// The other fragment ends where this one starts
    After,
    /// The other fragment starts where this one ends
    Before,
}

impl Agent {
    /// Coalesce a newly delivered fragment with the fragments already stored.
    ///
    /// Fragments only join when one ends exactly where the other starts.
    /// Joining repeats until the surviving fragment abuts nothing, and once
    /// it covers the whole ADU it becomes a complete bundle.
    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub(super) fn reassemble(&mut self, mut handle: BundleHandle) {
        loop {
            let Some(current) = self.store.get(handle) else {
                return;
            };
            let Some(fragment_info) = current.bundle.fragment_info() else {
                return;
            };
            let start = fragment_info.offset;
            let end = start + current.bundle.adu.len() as u64;
            if start == 0 && end == fragment_info.total_len {
                self.store
                    .modify(handle, |bundle| bundle.set_fragment_info(None));
                return;
            }

            let adjacent = self
                .store
                .find_all(current.bundle.source(), current.bundle.timestamp())
                .into_iter()
                .filter(|other| *other != handle)
                .find_map(|other| {
                    let b = &self.store.get(other)?.bundle;
                    let offset = b.fragment_info()?.offset;
                    if offset + b.adu.len() as u64 == start {
                        Some((other, Join::After))
                    } else if offset == end {
                        Some((other, Join::Before))
                    } else {
                        None
                    }
                });
            let Some((other, join)) = adjacent else {
                trace!("Fragment {} abuts no stored fragment", current.bundle);
                return;
            };

            let (head, tail) = match join {
                Join::After => (other, handle),
                Join::Before => (handle, other),
            };
            let Some(tail_bundle) = self.store.remove(tail) else {
                return;
            };
            tail_bundle.trace_drop(DropReason::Coalesced);

            self.store.modify(head, |bundle| {
                let mut adu = Vec::with_capacity(bundle.adu.len() + tail_bundle.bundle.adu.len());
                adu.extend_from_slice(&bundle.adu);
                adu.extend_from_slice(&tail_bundle.bundle.adu);
                bundle.set_adu(Bytes::from(adu));
                debug!("Coalesced fragments into {bundle}, {} bytes", bundle.adu.len());
            });
            handle = head;
        }
    }
}
