//! Active debuff lists and the round-start status tick

use serde::{Deserialize, Serialize};

use crate::content::debuffs::{DebuffKind, RollKind};
use crate::core::types::Stat;

/// One active debuff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debuff {
    pub kind: DebuffKind,
    /// Round-start ticks left before the debuff expires
    pub remaining: u32,
}

/// A change produced by the status tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Damage { kind: DebuffKind, amount: u32 },
    Expired { kind: DebuffKind },
}

/// Ordered list of active debuffs. At most one entry per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebuffList(Vec<Debuff>);

impl DebuffList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a debuff. An existing debuff of the same kind is replaced in place.
    ///
    /// Returns true when an existing entry was replaced. A zero duration is ignored.
    pub fn apply(&mut self, kind: DebuffKind, duration: u32) -> bool {
        if duration == 0 {
            return false;
        }
        match self.0.iter_mut().find(|d| d.kind == kind) {
            Some(existing) => {
                existing.remaining = duration;
                true
            }
            None => {
                self.0.push(Debuff { kind, remaining: duration });
                false
            }
        }
    }

    pub fn has(&self, kind: DebuffKind) -> bool {
        self.0.iter().any(|d| d.kind == kind)
    }

    pub fn remaining(&self, kind: DebuffKind) -> Option<u32> {
        self.0.iter().find(|d| d.kind == kind).map(|d| d.remaining)
    }

    pub fn remove(&mut self, kind: DebuffKind) -> bool {
        let before = self.0.len();
        self.0.retain(|d| d.kind != kind);
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Debuff> {
        self.0.iter()
    }

    pub fn kinds(&self) -> Vec<DebuffKind> {
        self.0.iter().map(|d| d.kind).collect()
    }

    pub fn stat_adjustment(&self, stat: Stat) -> i32 {
        self.0.iter().map(|d| d.kind.stat_adjustment(stat)).sum()
    }

    pub fn roll_adjustment(&self, roll: RollKind) -> i32 {
        self.0.iter().map(|d| d.kind.roll_adjustment(roll)).sum()
    }

    pub fn skips_turn(&self) -> bool {
        self.0.iter().any(|d| d.kind.skips_turn())
    }

    pub fn confused(&self) -> bool {
        self.0.iter().any(|d| d.kind.confuses())
    }

    /// Round-start tick: decrement every duration, collect recurring damage,
    /// then strip what expired. Changes come out in list order.
    ///
    /// A duration counts round-start ticks, the first one after the debuff
    /// lands included. A 1-round debuff applied outside combat, or after its
    /// holder has acted this round, is gone before the holder's next turn.
    pub fn tick(&mut self) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        for debuff in self.0.iter_mut() {
            debuff.remaining = debuff.remaining.saturating_sub(1);
            let amount = debuff.kind.recurring_damage();
            if amount > 0 {
                changes.push(StatusChange::Damage { kind: debuff.kind, amount });
            }
            if debuff.remaining == 0 {
                changes.push(StatusChange::Expired { kind: debuff.kind });
            }
        }
        self.0.retain(|d| d.remaining > 0);
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_round_debuff_expires_on_first_tick() {
        let mut list = DebuffList::new();
        list.apply(DebuffKind::Stunned, 1);
        list.apply(DebuffKind::Slowed, 2);
        assert!(list.skips_turn());

        assert_eq!(list.tick(), vec![StatusChange::Expired { kind: DebuffKind::Stunned }]);
        assert!(!list.skips_turn());
        assert_eq!(list.remaining(DebuffKind::Slowed), Some(1));
    }

    #[test]
    fn test_reapply_replaces_in_place() {
        let mut list = DebuffList::new();
        list.apply(DebuffKind::Slowed, 2);
        list.apply(DebuffKind::Poisoned, 3);
        assert!(list.apply(DebuffKind::Slowed, 5));
        assert_eq!(list.kinds(), vec![DebuffKind::Slowed, DebuffKind::Poisoned]);
        assert_eq!(list.remaining(DebuffKind::Slowed), Some(5));
    }

    #[test]
    fn test_zero_duration_is_ignored() {
        let mut list = DebuffList::new();
        list.apply(DebuffKind::Stunned, 0);
        assert!(list.is_empty());
    }

    #[test]
    fn test_tick_damages_then_strips() {
        let mut list = DebuffList::new();
        list.apply(DebuffKind::Poisoned, 1);
        list.apply(DebuffKind::Cursed, 2);

        let changes = list.tick();
        assert_eq!(
            changes,
            vec![
                StatusChange::Damage { kind: DebuffKind::Poisoned, amount: 1 },
                StatusChange::Expired { kind: DebuffKind::Poisoned },
            ]
        );
        assert_eq!(list.kinds(), vec![DebuffKind::Cursed]);

        let changes = list.tick();
        assert_eq!(changes, vec![StatusChange::Expired { kind: DebuffKind::Cursed }]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_adjustments_stack_across_kinds() {
        let mut list = DebuffList::new();
        list.apply(DebuffKind::Poisoned, 2);
        list.apply(DebuffKind::Weakened, 2);
        assert_eq!(list.stat_adjustment(Stat::Might), -4);
        assert_eq!(list.stat_adjustment(Stat::Wit), -2);

        list.apply(DebuffKind::Blinded, 2);
        list.apply(DebuffKind::Slowed, 2);
        assert_eq!(list.roll_adjustment(RollKind::Attack), -6);
    }
}
