//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Unique identifier for a guild
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
pub struct GuildId(pub u32);

/// Unique identifier for a character, scoped to its guild's roster
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
pub struct CharacterId(pub u32);

/// Expedition tick counter (event ordering unit)
pub type Tick = u64;

/// Lowest and highest legal raw stat value
pub const STAT_MIN: i32 = 3;
pub const STAT_MAX: i32 = 18;

/// The four party roles. An active party fields exactly one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Striker,
    Scout,
    Support,
    Controller,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Striker, Role::Scout, Role::Support, Role::Controller];

    pub fn name(&self) -> &'static str {
        match self {
            Role::Striker => "Striker",
            Role::Scout => "Scout",
            Role::Support => "Support",
            Role::Controller => "Controller",
        }
    }

    /// Spellcasting roles act through the spell priority list
    pub fn is_caster(&self) -> bool {
        matches!(self, Role::Support | Role::Controller)
    }

    /// Hit die rolled on top of GRIT for starting max HP
    pub fn hit_die(&self) -> u32 {
        match self {
            Role::Striker => 10,
            Role::Scout => 8,
            Role::Support | Role::Controller => 6,
        }
    }

    /// Weapon die for the role's basic attack
    pub fn weapon_die(&self) -> u32 {
        match self {
            Role::Striker => 8,
            Role::Scout => 6,
            Role::Support | Role::Controller => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Might,
    Grit,
    Wit,
    Luck,
}

impl Stat {
    pub const ALL: [Stat; 4] = [Stat::Might, Stat::Grit, Stat::Wit, Stat::Luck];

    /// Stat selected by a 1d4 roll (1 = MIGHT ... 4 = LUCK)
    pub fn from_d4(roll: u32) -> Stat {
        match roll {
            1 => Stat::Might,
            2 => Stat::Grit,
            3 => Stat::Wit,
            _ => Stat::Luck,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stat::Might => "MIGHT",
            Stat::Grit => "GRIT",
            Stat::Wit => "WIT",
            Stat::Luck => "LUCK",
        }
    }
}

/// Raw character stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub might: i32,
    pub grit: i32,
    pub wit: i32,
    pub luck: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self::uniform(10)
    }
}

impl Stats {
    pub fn new(might: i32, grit: i32, wit: i32, luck: i32) -> Self {
        Self { might, grit, wit, luck }
    }

    pub fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Might => self.might,
            Stat::Grit => self.grit,
            Stat::Wit => self.wit,
            Stat::Luck => self.luck,
        }
    }

    pub fn get_mut(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Might => &mut self.might,
            Stat::Grit => &mut self.grit,
            Stat::Wit => &mut self.wit,
            Stat::Luck => &mut self.luck,
        }
    }

    /// Roll modifier for a stat: raw value / 3
    pub fn modifier(&self, stat: Stat) -> i32 {
        self.get(stat) / 3
    }

    /// First stat outside `STAT_MIN..=STAT_MAX`, if any
    pub fn out_of_range(&self) -> Option<(Stat, i32)> {
        Stat::ALL
            .into_iter()
            .map(|stat| (stat, self.get(stat)))
            .find(|(_, value)| !(STAT_MIN..=STAT_MAX).contains(value))
    }
}
