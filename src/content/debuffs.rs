//! Debuff table

use serde::{Deserialize, Serialize};

use crate::core::types::Stat;

/// Timed negative status effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebuffKind {
    Poisoned,
    Weakened,
    Slowed,
    Stunned,
    Confused,
    Cursed,
    Blinded,
    Frightened,
}

/// The kind of d20 roll a debuff can penalise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollKind {
    Attack,
    Initiative,
    Spell,
    /// Trap detection and treasure searching
    Check,
}

impl DebuffKind {
    /// Trap debuff table, in 1d8 order
    pub const TRAP_TABLE: [DebuffKind; 8] = [
        DebuffKind::Poisoned,
        DebuffKind::Weakened,
        DebuffKind::Slowed,
        DebuffKind::Stunned,
        DebuffKind::Confused,
        DebuffKind::Cursed,
        DebuffKind::Blinded,
        DebuffKind::Frightened,
    ];

    /// Debuff for a 1d8 trap roll
    pub fn from_d8(roll: u32) -> DebuffKind {
        let index = roll.clamp(1, 8) as usize - 1;
        Self::TRAP_TABLE[index]
    }

    pub fn name(&self) -> &'static str {
        match self {
            DebuffKind::Poisoned => "Poisoned",
            DebuffKind::Weakened => "Weakened",
            DebuffKind::Slowed => "Slowed",
            DebuffKind::Stunned => "Stunned",
            DebuffKind::Confused => "Confused",
            DebuffKind::Cursed => "Cursed",
            DebuffKind::Blinded => "Blinded",
            DebuffKind::Frightened => "Frightened",
        }
    }

    /// Adjustment to a stat modifier while the debuff is active
    pub fn stat_adjustment(&self, stat: Stat) -> i32 {
        match (self, stat) {
            (DebuffKind::Poisoned, _) => -2,
            (DebuffKind::Weakened, Stat::Might) => -2,
            (DebuffKind::Cursed, Stat::Luck) => -2,
            _ => 0,
        }
    }

    /// Flat adjustment to a d20 roll while the debuff is active
    pub fn roll_adjustment(&self, roll: RollKind) -> i32 {
        match (self, roll) {
            (DebuffKind::Blinded, RollKind::Attack) => -4,
            (DebuffKind::Slowed, RollKind::Attack | RollKind::Initiative) => -2,
            (DebuffKind::Frightened, RollKind::Attack) => -2,
            _ => 0,
        }
    }

    /// Damage dealt at every round start
    pub fn recurring_damage(&self) -> u32 {
        match self {
            DebuffKind::Poisoned => 1,
            _ => 0,
        }
    }

    /// The afflicted combatant loses its turn
    pub fn skips_turn(&self) -> bool {
        matches!(self, DebuffKind::Stunned)
    }

    /// The afflicted combatant may strike its own side
    pub fn confuses(&self) -> bool {
        matches!(self, DebuffKind::Confused)
    }

    /// Armor class adjustment when an enemy carries the debuff
    pub fn enemy_ac_adjustment(&self) -> i32 {
        match self {
            DebuffKind::Blinded => -2,
            _ => 0,
        }
    }
}

impl std::fmt::Display for DebuffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
