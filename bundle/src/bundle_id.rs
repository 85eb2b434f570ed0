/// Creation timestamp: seconds since the agent's epoch plus a per-agent sequence number.
#[derive(Default, Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CreationTimestamp {
    pub creation_time: u64,
    pub sequence_number: u64,
}

/// Position of a fragment within the original application data unit.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct FragmentInfo {
    pub offset: u64,
    pub total_len: u64,
}
