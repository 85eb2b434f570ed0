/// Bundle processing control flags shared by BPv6 and BPv7.
///
/// The is-fragment flag is not held here, it is derived from the presence of
/// [`FragmentInfo`](crate::FragmentInfo). Version specific bits (BPv6 custody
/// and priority, BPv7 status time) are held by the version's primary block.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct BundleFlags {
    pub is_admin_record: bool,
    pub do_not_fragment: bool,
    pub app_ack_requested: bool,
    pub receipt_report_requested: bool,
    pub forward_report_requested: bool,
    pub delivery_report_requested: bool,
    pub delete_report_requested: bool,
    pub unrecognised: u64,
}

pub(crate) const IS_FRAGMENT: u64 = 1 << 0;

impl From<u64> for BundleFlags {
    fn from(value: u64) -> Self {
        let mut flags = Self::default();
        for b in 0..64 {
            if value & (1 << b) != 0 {
                match b {
                    1 => flags.is_admin_record = true,
                    2 => flags.do_not_fragment = true,
                    5 => flags.app_ack_requested = true,
                    14 => flags.receipt_report_requested = true,
                    16 => flags.forward_report_requested = true,
                    17 => flags.delivery_report_requested = true,
                    18 => flags.delete_report_requested = true,
                    b => {
                        flags.unrecognised |= 1 << b;
                    }
                }
            }
        }
        flags
    }
}

impl From<BundleFlags> for u64 {
    fn from(value: BundleFlags) -> Self {
        let mut flags = value.unrecognised;
        if value.is_admin_record {
            flags |= 1 << 1;
        }
        if value.do_not_fragment {
            flags |= 1 << 2;
        }
        if value.app_ack_requested {
            flags |= 1 << 5;
        }
        if value.receipt_report_requested {
            flags |= 1 << 14;
        }
        if value.forward_report_requested {
            flags |= 1 << 16;
        }
        if value.delivery_report_requested {
            flags |= 1 << 17;
        }
        if value.delete_report_requested {
            flags |= 1 << 18;
        }
        flags
    }
}
