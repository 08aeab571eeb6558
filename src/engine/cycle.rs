//! Cycle detection for composite conversions.

use std::collections::HashSet;

/// Visited set for one top-level conversion.
///
/// Keyed by the identity of a shared container (see `Array::id`,
/// `Table::id`). Identities are never removed during a conversion, so a
/// container reachable twice is reported even when the second path is not
/// a true cycle. The one exception is [`CycleGuard::rollback`], which undoes
/// the marks of a failed speculative conversion.
#[derive(Debug, Default)]
pub struct CycleGuard {
    visited: HashSet<usize>,
    /// Marked identities in insertion order.
    log: Vec<usize>,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `identity` as visited. Returns true if it already was.
    pub fn mark(&mut self, identity: usize) -> bool {
        if !self.visited.insert(identity) {
            return true;
        }
        self.log.push(identity);
        false
    }

    /// Position to roll back to.
    pub fn checkpoint(&self) -> usize {
        self.log.len()
    }

    /// Forget every identity marked after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: usize) {
        while self.log.len() > checkpoint {
            if let Some(identity) = self.log.pop() {
                self.visited.remove(&identity);
            }
        }
    }

    pub fn clear(&mut self) {
        self.visited.clear();
        self.log.clear();
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_reports_second_visit() {
        let mut guard = CycleGuard::new();
        assert!(!guard.mark(0x10));
        assert!(!guard.mark(0x20));
        assert!(guard.mark(0x10));
        assert_eq!(guard.len(), 2);
    }

    #[test]
    fn test_rollback_keeps_earlier_marks() {
        let mut guard = CycleGuard::new();
        guard.mark(1);
        let checkpoint = guard.checkpoint();
        guard.mark(2);
        guard.mark(3);
        assert!(guard.mark(1));
        guard.rollback(checkpoint);
        assert_eq!(guard.len(), 1);
        assert!(guard.mark(1));
        assert!(!guard.mark(2));
        assert!(!guard.mark(3));
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut guard = CycleGuard::new();
        guard.mark(1);
        guard.clear();
        assert!(guard.is_empty());
        assert!(!guard.mark(1));
    }
}
