/// Block processing control flags shared by BPv6 and BPv7.
///
/// BPv6 only bits (last block, forwarded without processing, EID references)
/// are held by [`v6::BlockHeader`](crate::v6::BlockHeader).
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlockFlags {
    pub must_replicate: bool,
    pub report_on_failure: bool,
    pub delete_bundle_on_failure: bool,
    pub delete_block_on_failure: bool,
    pub unrecognised: u64,
}

impl From<u64> for BlockFlags {
    fn from(value: u64) -> Self {
        let mut flags = Self::default();
        for b in 0..64 {
            if value & (1 << b) != 0 {
                match b {
                    0 => flags.must_replicate = true,
                    1 => flags.report_on_failure = true,
                    2 => flags.delete_bundle_on_failure = true,
                    4 => flags.delete_block_on_failure = true,
                    b => {
                        flags.unrecognised |= 1 << b;
                    }
                }
            }
        }
        flags
    }
}

impl From<BlockFlags> for u64 {
    fn from(value: BlockFlags) -> Self {
        let mut flags = value.unrecognised;
        if value.must_replicate {
            flags |= 1 << 0;
        }
        if value.report_on_failure {
            flags |= 1 << 1;
        }
        if value.delete_bundle_on_failure {
            flags |= 1 << 2;
        }
        if value.delete_block_on_failure {
            flags |= 1 << 4;
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles() {
        for raw in [0u64, 0x17, 0x05, 1 << 9] {
            let original = BlockFlags::from(raw);
            let mut flags = original;
            flags.must_replicate = !flags.must_replicate;
            flags.must_replicate = !flags.must_replicate;
            flags.delete_block_on_failure = !flags.delete_block_on_failure;
            flags.delete_block_on_failure = !flags.delete_block_on_failure;
            assert_eq!(flags, original);
            assert_eq!(u64::from(flags), raw);
        }
    }
}
