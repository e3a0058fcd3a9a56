//! Morale and retreat checks
//!
//! Harm accumulates into a single score. A check rolls percentile dice and
//! the party retreats when the roll comes in under the score. Every term is
//! additive, so more harm can never make a retreat less likely.

use serde::{Deserialize, Serialize};

use crate::dice::{Advantage, Roller};
use crate::party::guild::Party;

/// Score per missing hit point
pub const MISSING_HP_WEIGHT: u32 = 1;
/// Score per disabled spell
pub const DISABLED_SPELL_WEIGHT: u32 = 5;
/// Score per currently downed ally
pub const DOWNED_ALLY_WEIGHT: u32 = 20;
/// Score per time any member has ever been downed
pub const LIFETIME_DOWNED_WEIGHT: u32 = 10;

const PERCENTILE: u32 = 100;

/// Which check is rolled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// 1d100 after a room
    Room,
    /// 2d100 keep lower after a floor, disadvantage against the party
    Floor,
}

/// Terms of the morale score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoraleScore {
    pub missing_hp: u32,
    pub disabled_spells: u32,
    pub downed_allies: u32,
    pub lifetime_downed: u32,
}

impl MoraleScore {
    /// Tally a party. Current downed allies and lifetime downs are both counted.
    pub fn of(party: &Party) -> Self {
        party.members.iter().fold(Self::default(), |mut score, c| {
            score.missing_hp += c.missing_hp();
            score.disabled_spells += c.disabled_spells.len() as u32;
            score.downed_allies += u32::from(!c.is_conscious());
            score.lifetime_downed += c.lifetime_downed;
            score
        })
    }

    pub fn total(&self) -> u32 {
        self.missing_hp * MISSING_HP_WEIGHT
            + self.disabled_spells * DISABLED_SPELL_WEIGHT
            + self.downed_allies * DOWNED_ALLY_WEIGHT
            + self.lifetime_downed * LIFETIME_DOWNED_WEIGHT
    }
}

/// A rolled morale check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoraleCheck {
    pub kind: CheckKind,
    pub score: MoraleScore,
    pub roll: u32,
    pub retreat: bool,
}

impl MoraleCheck {
    pub fn total(&self) -> u32 {
        self.score.total()
    }
}

/// Roll a morale check for the party
pub fn check(party: &Party, kind: CheckKind, dice: &mut impl Roller) -> MoraleCheck {
    let score = MoraleScore::of(party);
    let roll = match kind {
        CheckKind::Room => dice.die(PERCENTILE),
        CheckKind::Floor => dice.roll_with(PERCENTILE, Advantage::Disadvantage),
    };
    MoraleCheck { kind, score, roll, retreat: roll < score.total() }
}

/// Chance a check of `kind` ends in retreat for a given score
pub fn retreat_probability(score: u32, kind: CheckKind) -> f64 {
    // rolls 1..score-1 retreat
    let single = (score.saturating_sub(1).min(PERCENTILE) as f64) / PERCENTILE as f64;
    match kind {
        CheckKind::Room => single,
        CheckKind::Floor => 1.0 - (1.0 - single) * (1.0 - single),
    }
}
