use super::*;
use bytes::Bytes;

/// A local endpoint bundles can be delivered to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Registration {
    /// How long the registration is kept, zero for as long as the agent runs
    pub lifetime: time::Duration,
    /// Inactive registrations keep their bundles but nothing is handed over
    pub active: bool,
}

impl Default for Registration {
    fn default() -> Self {
        Self {
            lifetime: time::Duration::ZERO,
            active: true,
        }
    }
}

impl Agent {
    /// Register the agent's own endpoint, so administrative records reach it
    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub fn start(&mut self) -> Result<(), Error> {
        if self.routing.is_none() {
            return Err(Error::NoRoutingAgent);
        }
        if self.endpoint_id.is_none() {
            return Err(Error::NoEndpointId);
        }
        info!("Starting bundle agent {}", self.endpoint_id);
        self.register(self.endpoint_id.clone(), Registration::default())
    }

    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub fn stop(&mut self) -> Result<(), Error> {
        info!("Stopping bundle agent {}", self.endpoint_id);
        for timer in self.lifecycle_timers.drain(..) {
            self.scheduler.cancel(timer);
        }
        let endpoint_id = self.endpoint_id.clone();
        self.close(&endpoint_id)
    }

    /// Schedule [`start`](Self::start) and [`stop`](Self::stop) at the configured times
    pub fn schedule_lifecycle(&mut self) {
        let now = self.scheduler.now();
        let start = self
            .scheduler
            .schedule(self.config.start_time - now, TimerEvent::Start);
        self.lifecycle_timers.push(start);
        if let Some(stop_time) = self.config.stop_time {
            let stop = self.scheduler.schedule(stop_time - now, TimerEvent::Stop);
            self.lifecycle_timers.push(stop);
        }
    }

    /// Attach a CLA, enabling receive on it for every active registration
    pub fn add_cla(&mut self, cla: Arc<dyn cla::Cla>) {
        for (eid, _) in self.registrations.iter().filter(|(_, r)| r.active) {
            cla.enable_receive(eid, &self.transport_address(eid))
                .trace_warn("Failed to enable receive on CLA");
        }
        self.clas.push(cla);
    }

    pub fn remove_cla(&mut self, cla: &Arc<dyn cla::Cla>) {
        self.clas.retain(|c| !cla::same_cla(c, cla));
    }

    /// Register a local endpoint.
    ///
    /// # Panics
    ///
    /// Registering the same endpoint twice is a programming error.
    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub fn register(&mut self, eid: EndpointId, registration: Registration) -> Result<(), Error> {
        if self.registrations.contains_key(&eid) {
            let e = Error::DuplicateRegistration(eid);
            error!("{e}");
            panic!("{e}");
        }
        debug!("Registering {eid}");
        if registration.active {
            self.enable_receive(&eid);
        }
        self.registrations.insert(eid, registration);
        Ok(())
    }

    /// Deactivate a registration, keeping it so it can be bound again
    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub fn unregister(&mut self, eid: &EndpointId) -> Result<(), Error> {
        let registration = self
            .registrations
            .get_mut(eid)
            .ok_or_else(|| Error::NotRegistered(eid.clone()))?;
        registration.active = false;
        debug!("Unregistered {eid}");
        for cla in &self.clas {
            cla.disable_receive(eid)
                .trace_warn("Failed to disable receive on CLA");
        }
        Ok(())
    }

    /// Reactivate a registration
    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub fn bind(&mut self, eid: &EndpointId) -> Result<(), Error> {
        let registration = self
            .registrations
            .get_mut(eid)
            .ok_or_else(|| Error::NotRegistered(eid.clone()))?;
        registration.active = true;
        debug!("Bound {eid}");
        self.enable_receive(eid);
        Ok(())
    }

    /// Forget a registration entirely
    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub fn close(&mut self, eid: &EndpointId) -> Result<(), Error> {
        self.registrations
            .remove(eid)
            .ok_or_else(|| Error::NotRegistered(eid.clone()))?;
        debug!("Closed {eid}");
        Ok(())
    }

    pub fn is_registered(&self, eid: &EndpointId) -> bool {
        self.registrations.contains_key(eid)
    }

    pub fn registration(&self, eid: &EndpointId) -> Option<&Registration> {
        self.registrations.get(eid)
    }

    fn enable_receive(&self, eid: &EndpointId) {
        let address = self.transport_address(eid);
        for cla in &self.clas {
            cla.enable_receive(eid, &address)
                .trace_warn("Failed to enable receive on CLA");
        }
    }

    /// Take the next complete bundle delivered to `eid`, returning its ADU
    pub fn receive(&mut self, eid: &EndpointId) -> Option<Bytes> {
        let bundle = self.store.take_for_delivery(eid)?;
        let adu = bundle.bundle.adu;
        self.bundles_delivered += 1;
        self.bytes_delivered += adu.len() as u64;
        metrics::counter!("bpa_bundles_delivered").increment(1);
        metrics::counter!("bpa_bytes_delivered").increment(adu.len() as u64);
        debug!("Application at {eid} received {} bytes", adu.len());
        Some(adu)
    }

    /// The ADU [`receive`](Self::receive) would return, without taking it
    pub fn peek(&self, eid: &EndpointId) -> Option<Bytes> {
        self.store.peek_adu(eid)
    }
}
