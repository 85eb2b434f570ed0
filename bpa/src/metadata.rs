use super::*;
use core::ops::Range;
use scheduler::TimerHandle;

/// Reasons a bundle must stay in the store (RFC 5050 §5).
///
/// A bundle with no constraints left is removed.
#[derive(Default, Copy, Clone, PartialEq, Eq)]
pub struct RetentionConstraints(u8);

impl RetentionConstraints {
    pub const DISPATCH_PENDING: Self = Self(1 << 0);
    pub const FORWARD_PENDING: Self = Self(1 << 1);
    pub const CUSTODY_ACCEPTED: Self = Self(1 << 2);

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Debug for RetentionConstraints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut set = f.debug_set();
        if self.contains(Self::DISPATCH_PENDING) {
            set.entry(&"DISPATCH_PENDING");
        }
        if self.contains(Self::FORWARD_PENDING) {
            set.entry(&"FORWARD_PENDING");
        }
        if self.contains(Self::CUSTODY_ACCEPTED) {
            set.entry(&"CUSTODY_ACCEPTED");
        }
        set.finish()
    }
}

/// Per-bundle state the agent keeps alongside the wire bundle
#[derive(Default, Debug, Clone)]
pub struct Metadata {
    pub retention: RetentionConstraints,
    /// Byte ranges of the ADU acknowledged by custody signals
    pub acks: Vec<Range<u64>>,
    pub expiry_timer: Option<TimerHandle>,
    pub retransmit_timer: Option<TimerHandle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraints() {
        let mut r = RetentionConstraints::default();
        assert!(r.is_empty());
        r.insert(RetentionConstraints::DISPATCH_PENDING);
        r.insert(RetentionConstraints::CUSTODY_ACCEPTED);
        assert!(r.contains(RetentionConstraints::DISPATCH_PENDING));
        assert!(!r.contains(RetentionConstraints::FORWARD_PENDING));
        assert_eq!(format!("{r:?}"), r#"{"DISPATCH_PENDING", "CUSTODY_ACCEPTED"}"#);

        r.remove(RetentionConstraints::DISPATCH_PENDING);
        r.remove(RetentionConstraints::FORWARD_PENDING);
        assert!(!r.is_empty());
        r.remove(RetentionConstraints::CUSTODY_ACCEPTED);
        assert!(r.is_empty());
    }
}
