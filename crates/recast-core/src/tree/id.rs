use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a tree node or marker.
///
/// Identities are process-unique: every call to [`TreeId::fresh`] yields a value
/// never handed out before, so two logically distinct nodes (or two stamps
/// created by different recipe runs) never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreeId(u64);

impl TreeId {
    pub fn fresh() -> Self {
        TreeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_are_distinct() {
        let a = TreeId::fresh();
        let b = TreeId::fresh();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
