//! Adventurers and their per-expedition state

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::content::debuffs::RollKind;
use crate::content::spells::Spell;
use crate::core::error::ConfigurationError;
use crate::core::types::{CharacterId, Role, Stat, Stats};
use crate::dice::{Advantage, Roller};
use crate::party::status::DebuffList;

/// Base defense before GRIT
pub const BASE_DEFENSE: i32 = 10;

/// Defense bonus while Shielded
pub const SHIELD_BONUS: i32 = 2;

/// Temporary boons. Advantage flags last until used, the rest until the
/// current encounter ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boons {
    pub next_roll_advantage: bool,
    pub next_spell_advantage: bool,
    pub shielded: bool,
    pub death_ward: bool,
    /// Rounds of 1 HP regeneration left
    pub regeneration: u32,
}

/// Result of damage landing on a character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wound {
    pub dealt: u32,
    pub downed: bool,
    /// A death ward held the character at 1 HP
    pub warded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub role: Role,
    pub stats: Stats,
    pub hp: u32,
    pub max_hp: u32,
    #[serde(default)]
    pub debuffs: DebuffList,
    #[serde(default)]
    pub known_spells: Vec<Spell>,
    #[serde(default)]
    pub disabled_spells: BTreeSet<Spell>,
    #[serde(default)]
    pub downed_this_expedition: u32,
    #[serde(default)]
    pub lifetime_downed: u32,
    /// Personal share of expedition gold
    #[serde(default)]
    pub purse: u64,
    /// Sits out the next expedition
    #[serde(default)]
    pub resting: bool,
    #[serde(default)]
    pub boons: Boons,
}

impl Character {
    /// A healthy character with the role's starting spell
    pub fn new(id: CharacterId, name: impl Into<String>, role: Role, stats: Stats, max_hp: u32) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            stats,
            hp: max_hp,
            max_hp,
            debuffs: DebuffList::new(),
            known_spells: Spell::starting(role).into_iter().collect(),
            disabled_spells: BTreeSet::new(),
            downed_this_expedition: 0,
            lifetime_downed: 0,
            purse: 0,
            resting: false,
            boons: Boons::default(),
        }
    }

    /// Roll up a new recruit: max HP is GRIT plus the role's hit die, and
    /// casters learn `WIT/3 - 1` extra spells of their role at random.
    pub fn recruit(
        id: CharacterId,
        name: impl Into<String>,
        role: Role,
        stats: Stats,
        dice: &mut impl Roller,
    ) -> Self {
        let max_hp = (stats.grit + dice.die(role.hit_die()) as i32).max(1) as u32;
        let mut character = Self::new(id, name, role, stats, max_hp);

        let extra = (stats.modifier(Stat::Wit) - 1).max(0) as usize;
        let mut pool: Vec<Spell> = Spell::for_role(role)
            .iter()
            .copied()
            .filter(|s| !character.known_spells.contains(s))
            .collect();
        for _ in 0..extra {
            match dice.pick(pool.len()) {
                Some(index) => character.known_spells.push(pool.remove(index)),
                None => break,
            }
        }
        character
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some((stat, value)) = self.stats.out_of_range() {
            return Err(ConfigurationError::StatOutOfRange { character: self.id, stat, value });
        }
        if self.max_hp == 0 {
            return Err(ConfigurationError::NoHitPoints { character: self.id });
        }
        if self.hp > self.max_hp {
            return Err(ConfigurationError::HpAboveMax { character: self.id, hp: self.hp, max_hp: self.max_hp });
        }
        Ok(())
    }

    pub fn is_conscious(&self) -> bool {
        self.hp > 0
    }

    pub fn missing_hp(&self) -> u32 {
        self.max_hp.saturating_sub(self.hp)
    }

    /// Below half of max HP
    pub fn is_wounded(&self) -> bool {
        self.hp * 2 < self.max_hp
    }

    /// Stat modifier after debuffs
    pub fn modifier(&self, stat: Stat) -> i32 {
        self.stats.modifier(stat) + self.debuffs.stat_adjustment(stat)
    }

    /// Total bonus on a d20 roll keyed off `stat`
    pub fn roll_bonus(&self, stat: Stat, roll: RollKind) -> i32 {
        self.modifier(stat) + self.debuffs.roll_adjustment(roll)
    }

    /// Target number for enemy attacks
    pub fn defense(&self) -> i32 {
        let shield = if self.boons.shielded { SHIELD_BONUS } else { 0 };
        BASE_DEFENSE + self.modifier(Stat::Grit) + shield
    }

    /// Consume pending advantage on a general roll
    pub fn take_advantage(&mut self) -> Advantage {
        if std::mem::take(&mut self.boons.next_roll_advantage) {
            Advantage::Advantage
        } else {
            Advantage::Normal
        }
    }

    /// Consume pending advantage on a spell check
    pub fn take_spell_advantage(&mut self) -> Advantage {
        if std::mem::take(&mut self.boons.next_spell_advantage) {
            Advantage::Advantage
        } else {
            Advantage::Normal
        }
    }

    /// Known spells that have not been disabled, in learning order
    pub fn usable_spells(&self) -> impl Iterator<Item = Spell> + '_ {
        self.known_spells
            .iter()
            .copied()
            .filter(|s| !self.disabled_spells.contains(s))
    }

    pub fn can_cast(&self, spell: Spell) -> bool {
        self.known_spells.contains(&spell) && !self.disabled_spells.contains(&spell)
    }

    pub fn disable_spell(&mut self, spell: Spell) {
        self.disabled_spells.insert(spell);
    }

    /// Apply damage. Hitting 0 HP downs the character and bumps both downed counters.
    pub fn take_damage(&mut self, amount: u32) -> Wound {
        if !self.is_conscious() || amount == 0 {
            return Wound { dealt: 0, downed: false, warded: false };
        }
        if amount >= self.hp && self.boons.death_ward {
            self.boons.death_ward = false;
            let dealt = self.hp - 1;
            self.hp = 1;
            return Wound { dealt, downed: false, warded: true };
        }
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        let downed = self.hp == 0;
        if downed {
            self.downed_this_expedition += 1;
            self.lifetime_downed += 1;
            self.boons.regeneration = 0;
        }
        Wound { dealt, downed, warded: false }
    }

    /// Heal a conscious character, returning HP actually restored
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_conscious() {
            return 0;
        }
        let healed = amount.min(self.missing_hp());
        self.hp += healed;
        healed
    }

    /// Fountain restore: full HP, no debuffs, downed counter reset
    pub fn restore_full(&mut self) -> u32 {
        let healed = self.missing_hp();
        self.hp = self.max_hp;
        self.debuffs.clear();
        self.downed_this_expedition = 0;
        healed
    }

    /// Drop boons that only last for one encounter
    pub fn end_encounter(&mut self) {
        self.boons.shielded = false;
        self.boons.death_ward = false;
        self.boons.regeneration = 0;
    }
}
