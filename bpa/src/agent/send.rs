use super::*;
use bytes::Bytes;
use dtnbp_bundle::{BundleFlags, CreationTimestamp, v6, v7};

impl Agent {
    /// Originate a bundle carrying `payload` from the local endpoint `source`.
    ///
    /// `source` must be registered unless it is `dtn:none`. The bundle is
    /// stored and forwarded straight away; if no CLA is ready it waits in the
    /// store for [`cla_ready`](Self::cla_ready).
    #[cfg_attr(feature = "instrument", instrument(skip(self, payload)))]
    pub fn send(
        &mut self,
        payload: Bytes,
        source: &EndpointId,
        destination: &EndpointId,
        lifetime: time::Duration,
        custody: bool,
        priority: v6::Priority,
    ) -> Result<(), Error> {
        self.originate(
            payload,
            source,
            destination,
            lifetime,
            custody,
            priority,
            BundleFlags::default(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn originate(
        &mut self,
        payload: Bytes,
        source: &EndpointId,
        destination: &EndpointId,
        lifetime: time::Duration,
        custody: bool,
        priority: v6::Priority,
        flags: BundleFlags,
    ) -> Result<(), Error> {
        if !source.is_none() && !self.registrations.contains_key(source) {
            return Err(Error::UnregisteredSource(source.clone()));
        }

        let timestamp = CreationTimestamp {
            creation_time: self.now_seconds(),
            sequence_number: self.sequence_number,
        };

        let mut retention = RetentionConstraints::DISPATCH_PENDING;
        let bundle = match self.config.version {
            Version::V6 => {
                let custodian = if custody {
                    retention.insert(RetentionConstraints::CUSTODY_ACCEPTED);
                    self.endpoint_id.clone()
                } else {
                    EndpointId::none()
                };
                dtnbp_bundle::Bundle::new_v6(
                    v6::PrimaryBlock {
                        flags,
                        custody_requested: custody,
                        priority,
                        destination: destination.clone(),
                        source: source.clone(),
                        custodian,
                        timestamp,
                        lifetime,
                        ..v6::PrimaryBlock::new(self.config.cbhe)
                    },
                    payload,
                )
            }
            Version::V7 => {
                if custody {
                    return Err(Error::NotImplemented("BPv7 custody transfer"));
                }
                dtnbp_bundle::Bundle::new_v7(
                    v7::PrimaryBlock {
                        flags,
                        destination: destination.clone(),
                        source: source.clone(),
                        timestamp,
                        lifetime,
                        ..Default::default()
                    },
                    payload,
                )
            }
        };

        // A bundle that cannot be encoded does not consume a sequence number
        bundle.emit()?;
        self.sequence_number += 1;

        debug!(
            "Sending bundle {bundle} to {destination}, {} bytes",
            bundle.adu.len()
        );
        let Some(handle) = self
            .store
            .insert(bundle::Bundle::new(bundle, retention))
        else {
            return Ok(());
        };
        self.forward(handle);
        Ok(())
    }
}
