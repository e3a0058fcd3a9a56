//! Enemies spawned for a single encounter

use serde::{Deserialize, Serialize};

use crate::content::debuffs::{DebuffKind, RollKind};
use crate::content::enemies::{Archetype, BossAbility};
use crate::core::types::Stat;
use crate::dice::Roller;
use crate::party::status::DebuffList;

/// Base armor class before level and archetype modifiers
pub const BASE_AC: i32 = 10;

/// Hit points gained per difficulty level
pub const HP_PER_LEVEL: u32 = 5;

/// Tier from which stats scale with half the difficulty level
pub const HALF_SCALING_TIER: u32 = 4;

pub const BOSS_HP_MULTIPLIER: u32 = 2;
pub const BOSS_AC_BONUS: i32 = 1;
pub const BOSS_DAMAGE_BONUS: i32 = 1;
pub const RAGE_DAMAGE_BONUS: i32 = 2;

/// Result of damage landing on an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyWound {
    pub dealt: u32,
    pub killed: bool,
    /// HP fell to half or below for the first time
    pub bloodied_now: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub archetype: Archetype,
    pub tier: u32,
    /// Difficulty level the stats were rolled at
    pub level: u32,
    pub hp: u32,
    pub max_hp: u32,
    pub base_ac: i32,
    pub might: i32,
    pub damage_dice: (u32, u32),
    pub damage_bonus: i32,
    pub on_hit: Option<DebuffKind>,
    pub caster: bool,
    pub boss: Option<BossAbility>,
    #[serde(default)]
    pub debuffs: DebuffList,
    #[serde(default)]
    pub bloodied: bool,
}

impl Enemy {
    /// Roll a regular enemy of `archetype` at difficulty `level`
    pub fn spawn(archetype: Archetype, level: u32, ordinal: u32, dice: &mut impl Roller) -> Self {
        let profile = archetype.profile();
        let level = level.max(1);
        let (hp_count, hp_sides) = profile.hp_dice;
        let max_hp = HP_PER_LEVEL * level + dice.roll(hp_count, hp_sides);
        let scaled = if profile.tier >= HALF_SCALING_TIER { level / 2 } else { level } as i32;

        Self {
            name: format!("{} {}", profile.name, ordinal),
            archetype,
            tier: profile.tier,
            level,
            hp: max_hp,
            max_hp,
            base_ac: BASE_AC + scaled + profile.ac_modifier,
            might: scaled,
            damage_dice: profile.damage_dice,
            damage_bonus: 0,
            on_hit: profile.on_hit,
            caster: profile.caster,
            boss: None,
            debuffs: DebuffList::new(),
            bloodied: false,
        }
    }

    /// Roll a boss: doubled HP, +1 AC, +1 damage and one ability from 1d4
    pub fn spawn_boss(archetype: Archetype, level: u32, dice: &mut impl Roller) -> Self {
        let mut boss = Self::spawn(archetype, level, 1, dice);
        let ability = BossAbility::from_d4(dice.d4());
        boss.name = format!("{} {}", ability.title(), archetype.name());
        boss.max_hp *= BOSS_HP_MULTIPLIER;
        boss.hp = boss.max_hp;
        boss.base_ac += BOSS_AC_BONUS;
        boss.damage_bonus += BOSS_DAMAGE_BONUS;
        boss.boss = Some(ability);
        boss
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_boss(&self) -> bool {
        self.boss.is_some()
    }

    pub fn has_ability(&self, ability: BossAbility) -> bool {
        self.boss == Some(ability)
    }

    /// At or below half HP
    pub fn is_bloodied(&self) -> bool {
        self.hp * 2 <= self.max_hp
    }

    pub fn ac(&self) -> i32 {
        self.base_ac + self.debuffs.iter().map(|d| d.kind.enemy_ac_adjustment()).sum::<i32>()
    }

    /// MIGHT after debuffs
    pub fn might(&self) -> i32 {
        self.might + self.debuffs.stat_adjustment(Stat::Might)
    }

    /// Bonus on attack rolls; `aura` adds the boss Aura bonus
    pub fn attack_bonus(&self, aura: bool) -> i32 {
        self.might() + self.debuffs.roll_adjustment(RollKind::Attack) + i32::from(aura)
    }

    pub fn initiative_bonus(&self, aura: bool) -> i32 {
        self.might() + self.debuffs.roll_adjustment(RollKind::Initiative) + i32::from(aura)
    }

    /// Flat damage added to the damage dice
    pub fn damage_modifier(&self) -> i32 {
        let rage = if self.has_ability(BossAbility::Rage) && self.is_bloodied() {
            RAGE_DAMAGE_BONUS
        } else {
            0
        };
        self.might() + self.damage_bonus + rage
    }

    pub fn take_damage(&mut self, amount: u32) -> EnemyWound {
        if !self.is_alive() {
            return EnemyWound { dealt: 0, killed: false, bloodied_now: false };
        }
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        let bloodied_now = !self.bloodied && self.is_bloodied();
        if bloodied_now {
            self.bloodied = true;
        }
        EnemyWound { dealt, killed: self.hp == 0, bloodied_now }
    }

    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let healed = amount.min(self.max_hp.saturating_sub(self.hp));
        self.hp += healed;
        healed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    #[test]
    fn test_low_tier_stats() {
        let mut dice = ScriptedDice::new([3]);
        let rat = Enemy::spawn(Archetype::GiantRat, 2, 1, &mut dice);
        assert_eq!(rat.name, "Giant Rat 1");
        assert_eq!(rat.max_hp, 13);
        assert_eq!(rat.base_ac, 12);
        assert_eq!(rat.might, 2);
        assert_eq!(rat.damage_dice, (1, 4));
        assert_eq!(rat.on_hit, Some(DebuffKind::Poisoned));
    }

    #[test]
    fn test_high_tier_scales_with_half_level() {
        let mut dice = ScriptedDice::new([2, 3]);
        let wolf = Enemy::spawn(Archetype::DireWolf, 7, 2, &mut dice);
        assert_eq!(wolf.max_hp, 35 + 5);
        assert_eq!(wolf.base_ac, 13);
        assert_eq!(wolf.might, 3);
    }

    #[test]
    fn test_boss_modifiers() {
        // hp die 4, ability roll 1 = Rage
        let mut dice = ScriptedDice::new([4, 1]);
        let boss = Enemy::spawn_boss(Archetype::Slime, 2, &mut dice);
        assert_eq!(boss.name, "Raging Slime");
        assert_eq!(boss.max_hp, 28);
        assert_eq!(boss.base_ac, 12);
        assert_eq!(boss.damage_bonus, 1);
        assert!(boss.has_ability(BossAbility::Rage));
    }

    #[test]
    fn test_bloodied_edge_fires_once() {
        let mut dice = ScriptedDice::new([4, 1]);
        let mut boss = Enemy::spawn_boss(Archetype::Slime, 2, &mut dice);
        let before = boss.damage_modifier();
        assert!(!boss.take_damage(10).bloodied_now);
        assert!(boss.take_damage(4).bloodied_now);
        assert!(!boss.take_damage(1).bloodied_now);
        assert_eq!(boss.damage_modifier(), before + RAGE_DAMAGE_BONUS);
    }

    #[test]
    fn test_debuffs_lower_ac_and_might() {
        let mut dice = ScriptedDice::new([1]);
        let mut beetle = Enemy::spawn(Archetype::CaveBeetle, 1, 1, &mut dice);
        let ac = beetle.ac();
        beetle.debuffs.apply(DebuffKind::Blinded, 2);
        beetle.debuffs.apply(DebuffKind::Weakened, 2);
        assert_eq!(beetle.ac(), ac - 2);
        assert_eq!(beetle.might(), -1);
        assert_eq!(beetle.attack_bonus(true), -1 - 4 + 1);
    }
}
