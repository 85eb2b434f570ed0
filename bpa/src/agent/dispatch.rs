use super::*;

impl Agent {
    /// Accept a bundle received by a CLA (RFC 5050 §5.6)
    #[cfg_attr(feature = "instrument", instrument(skip_all))]
    pub fn process_bundle(&mut self, bundle: dtnbp_bundle::Bundle) {
        debug!("Received bundle {bundle} for {}", bundle.destination());

        // TODO: process extension blocks and send reception reports once blocks other than the payload are parsed
        let Some(handle) = self.store.insert(bundle::Bundle::new(
            bundle,
            RetentionConstraints::DISPATCH_PENDING,
        )) else {
            return;
        };
        self.dispatch(handle);
    }

    /// Deliver locally or forward (RFC 5050 §5.3)
    pub(crate) fn dispatch(&mut self, handle: BundleHandle) {
        let Some(bundle) = self.store.get(handle) else {
            return;
        };
        if self.registrations.contains_key(bundle.bundle.destination()) {
            self.deliver(handle);
        } else {
            self.forward(handle);
        }
    }

    /// Local delivery (RFC 5050 §5.7), acknowledging custody to the custodian
    fn deliver(&mut self, handle: BundleHandle) {
        let Some(bundle) = self.store.get(handle) else {
            return;
        };
        let destination = bundle.bundle.destination().clone();

        // The bundle may be consumed by delivery, so capture what the signal needs first
        let custody = custody::CustodySubject::new(&bundle.bundle);

        match self.registrations.get(&destination) {
            None => {
                error!("No registration for {destination}");
                return;
            }
            Some(registration) if !registration.active => {
                debug!("Registration for {destination} is not active, holding {}", bundle.bundle);
            }
            Some(_) => {
                if let Err(e) = self.enqueue_for_delivery(handle) {
                    warn!("Failed to deliver bundle to {destination}: {e}");
                }
            }
        }

        if let Some(subject) = custody {
            self.send_custody_signal(&subject, true);
        }
    }

    /// Hand a bundle to the endpoint it is addressed to.
    ///
    /// Bundles for the agent's own endpoint are administrative records and are
    /// consumed here. Fragments for an application are coalesced with the
    /// fragments already held, and complete bundles wait in the store for
    /// [`receive`](Self::receive).
    pub(crate) fn enqueue_for_delivery(&mut self, handle: BundleHandle) -> Result<(), Error> {
        let Some(bundle) = self.store.get(handle) else {
            return Ok(());
        };
        debug!(bundle = %bundle.bundle, destination = %bundle.bundle.destination(), "local deliver");

        if *bundle.bundle.destination() == self.endpoint_id {
            return self.admin_record(handle);
        }
        if bundle.bundle.is_fragment() {
            self.reassemble(handle);
        }
        Ok(())
    }
}
