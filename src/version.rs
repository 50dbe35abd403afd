//! Game version counter shared between the controller and the searcher.
//!
//! The controller bumps it on every restart, undo and restore. A searcher
//! remembers the value it started with and its decision is only applied if
//! the counter still holds that value.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Default)]
pub struct GameVersion(Arc<AtomicU64>);

impl GameVersion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Invalidates every decision started before this call.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Snapshot of the current version to check later.
    pub fn watch(&self) -> VersionWatch {
        VersionWatch {
            counter: self.clone(),
            expected: self.current(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VersionWatch {
    counter: GameVersion,
    expected: u64,
}

impl VersionWatch {
    pub fn expected(&self) -> u64 {
        self.expected
    }

    pub fn is_stale(&self) -> bool {
        self.counter.current() != self.expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_goes_stale_after_bump() {
        let version = GameVersion::new();
        let watch = version.watch();
        assert!(!watch.is_stale());

        assert_eq!(version.bump(), 1);
        assert!(watch.is_stale());
        assert!(!version.watch().is_stale());
    }

    #[test]
    fn clones_share_the_counter() {
        let version = GameVersion::new();
        let other = version.clone();
        other.bump();
        other.bump();
        assert_eq!(version.current(), 2);
    }
}
