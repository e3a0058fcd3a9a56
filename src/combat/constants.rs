//! Combat rule constants - every tunable number in one place
//!
//! All modifiers are flat additions to dice. No percentage modifiers.

// d20 thresholds
pub const NATURAL_CRIT: u32 = 20;
pub const NATURAL_FUMBLE: u32 = 1;

// Damage
pub const MIN_DAMAGE: i32 = 1;

// Spells
pub const SPELL_BASE_DC: i32 = 10;
pub const BOSS_SPELL_DC_BONUS: i32 = 1;
/// Lowest duration or amount a successful spell produces
pub const MIN_SPELL_EFFECT: i32 = 1;

// Enemy specials
/// 1d4 at or above this applies an archetype's on-hit debuff
pub const ON_HIT_TRIGGER: u32 = 3;
/// On-hit debuffs last 1d4 rounds
pub const ON_HIT_DURATION_DIE: u32 = 4;
/// 1d6 at or above this makes a caster enemy hex instead of attacking
pub const CASTER_TRIGGER: u32 = 4;
/// Enemy hexes last 1d4 rounds
pub const HEX_DURATION_DIE: u32 = 4;
/// Boss Regenerate heals 1d4 per round
pub const REGENERATE_DIE: u32 = 4;
/// Boss Summon calls 1d4 minions
pub const SUMMON_DIE: u32 = 4;

// Status
/// A confused combatant strikes its own side on a 1 on this die
pub const CONFUSION_DIE: u32 = 2;
/// Regeneration boons heal this much per round
pub const REGENERATION_PER_ROUND: u32 = 1;
