use std::collections::hash_map::{self, HashMap};

use motionrelay_frame::{Command, TargetKey};

/// Latest command per target since the last flush.
///
/// Owned by the scheduler thread alone, so it needs no locking.
#[derive(Debug, Default)]
pub struct PendingSet {
    commands: HashMap<TargetKey, Command>,
    dirty: bool,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the command for its target and mark the set dirty.
    ///
    /// Returns the command it replaced, if any.
    pub fn upsert(&mut self, command: Command) -> Option<Command> {
        self.dirty = true;
        self.commands.insert(command.target(), command)
    }

    pub fn get(&self, target: &TargetKey) -> Option<&Command> {
        self.commands.get(target)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Empty the set and clear the dirty flag, yielding every pending entry.
    ///
    /// Iteration order is unspecified.
    pub fn drain(&mut self) -> hash_map::Drain<'_, TargetKey, Command> {
        self.dirty = false;
        self.commands.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_same_target() {
        let mut set = PendingSet::new();
        assert!(set.upsert(Command::vibrate(1, 0, 50.0)).is_none());
        let replaced = set.upsert(Command::vibrate(1, 0, 75.0));

        assert_eq!(replaced, Some(Command::vibrate(1, 0, 50.0)));
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get(&Command::vibrate(1, 0, 0.0).target()),
            Some(&Command::vibrate(1, 0, 75.0))
        );
    }

    #[test]
    fn distinct_targets_coexist() {
        let mut set = PendingSet::new();
        set.upsert(Command::vibrate(1, 0, 10.0));
        set.upsert(Command::vibrate(1, 1, 10.0));
        set.upsert(Command::linear(1, 0, 0.5, 10.0));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn drain_clears_entries_and_dirty_flag() {
        let mut set = PendingSet::new();
        assert!(!set.is_dirty());
        set.upsert(Command::rotate(2, 1, 30.0, true));
        assert!(set.is_dirty());

        let drained: Vec<_> = set.drain().collect();
        assert_eq!(drained.len(), 1);
        assert!(set.is_empty());
        assert!(!set.is_dirty());
    }
}
