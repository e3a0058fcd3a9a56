//! Attack and spell check resolution
//!
//! Pure functions over already-rolled dice. Natural 20 and natural 1 decide
//! the outcome before any modifier is looked at.

use serde::{Deserialize, Serialize};

use crate::combat::constants::{MIN_DAMAGE, NATURAL_CRIT, NATURAL_FUMBLE};
use crate::dice::Roller;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackResult {
    Critical,
    Hit,
    Miss,
}

impl AttackResult {
    pub fn landed(&self) -> bool {
        !matches!(self, AttackResult::Miss)
    }
}

/// Resolve an attack roll against a target number (AC or defense)
pub fn resolve_attack(natural: u32, bonus: i32, target: i32) -> AttackResult {
    match natural {
        NATURAL_CRIT => AttackResult::Critical,
        NATURAL_FUMBLE => AttackResult::Miss,
        n if n as i32 + bonus >= target => AttackResult::Hit,
        _ => AttackResult::Miss,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellCheck {
    /// Natural 20: success plus advantage on the caster's next spell
    Critical,
    Success,
    Failure,
    /// Natural 1: failure, and the spell is disabled for the expedition
    Fumble,
}

impl SpellCheck {
    pub fn succeeded(&self) -> bool {
        matches!(self, SpellCheck::Critical | SpellCheck::Success)
    }
}

pub fn resolve_spell_check(natural: u32, bonus: i32, dc: i32) -> SpellCheck {
    match natural {
        NATURAL_CRIT => SpellCheck::Critical,
        NATURAL_FUMBLE => SpellCheck::Fumble,
        n if n as i32 + bonus >= dc => SpellCheck::Success,
        _ => SpellCheck::Failure,
    }
}

/// Damage for a landed attack. A critical adds the dice's maximum to the roll.
pub fn roll_damage(
    result: AttackResult,
    damage_dice: (u32, u32),
    modifier: i32,
    dice: &mut impl Roller,
) -> i32 {
    if !result.landed() {
        return 0;
    }
    let (count, sides) = damage_dice;
    let rolled = dice.roll(count, sides) as i32;
    let damage = match result {
        AttackResult::Critical => (count * sides) as i32 + rolled + modifier,
        _ => rolled + modifier,
    };
    damage.max(MIN_DAMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    #[test]
    fn test_natural_twenty_always_hits() {
        assert_eq!(resolve_attack(20, -10, 99), AttackResult::Critical);
    }

    #[test]
    fn test_natural_one_always_misses() {
        assert_eq!(resolve_attack(1, 50, 2), AttackResult::Miss);
    }

    #[test]
    fn test_meets_it_beats_it() {
        assert_eq!(resolve_attack(10, 3, 13), AttackResult::Hit);
        assert_eq!(resolve_attack(10, 2, 13), AttackResult::Miss);
    }

    #[test]
    fn test_spell_checks() {
        assert_eq!(resolve_spell_check(20, -5, 30), SpellCheck::Critical);
        assert_eq!(resolve_spell_check(1, 20, 5), SpellCheck::Fumble);
        assert_eq!(resolve_spell_check(8, 3, 11), SpellCheck::Success);
        assert_eq!(resolve_spell_check(7, 3, 11), SpellCheck::Failure);
        assert!(!SpellCheck::Fumble.succeeded());
    }

    #[test]
    fn test_critical_damage_adds_max_die() {
        // Striker: 8 + 1d8 + MIGHT
        let mut dice = ScriptedDice::new([5]);
        assert_eq!(roll_damage(AttackResult::Critical, (1, 8), 3, &mut dice), 16);
        let mut dice = ScriptedDice::new([2, 3]);
        assert_eq!(roll_damage(AttackResult::Critical, (2, 4), 1, &mut dice), 14);
    }

    #[test]
    fn test_damage_floor_is_one() {
        let mut dice = ScriptedDice::new([1]);
        assert_eq!(roll_damage(AttackResult::Hit, (1, 4), -5, &mut dice), 1);
    }
}
