use super::*;
use dtnbp_bundle::Version;

const DEFAULT_MAX_BUNDLE_SIZE: u64 = 512;
const DEFAULT_CUSTODY_RTO_SECS: i64 = 30;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone)]
pub struct Config {
    /// The agent's own endpoint, administrative records are addressed to it
    pub endpoint_id: Option<EndpointId>,

    /// Largest ADU carried by one outbound bundle, larger ADUs are fragmented
    pub max_bundle_size: u64,

    /// Custody retransmission timeout
    pub custody_rto: time::Duration,

    pub start_time: time::Duration,

    /// `None` runs until the host stops the agent
    pub stop_time: Option<time::Duration>,

    /// Protocol version of locally originated bundles
    pub version: Version,

    /// Encode locally originated BPv6 bundles with CBHE
    pub cbhe: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_id: None,
            max_bundle_size: DEFAULT_MAX_BUNDLE_SIZE,
            custody_rto: time::Duration::seconds(DEFAULT_CUSTODY_RTO_SECS),
            start_time: time::Duration::ZERO,
            stop_time: None,
            version: Version::V6,
            cbhe: false,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "endpoint_id",
                &self.endpoint_id.as_ref().map(|eid| eid.uri()),
            )
            .field("max_bundle_size", &self.max_bundle_size)
            .field("custody_rto", &self.custody_rto)
            .field("start_time", &self.start_time)
            .field("stop_time", &self.stop_time)
            .field("version", &self.version)
            .field("cbhe", &self.cbhe)
            .finish()
    }
}
