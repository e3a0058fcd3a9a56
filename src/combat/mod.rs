//! Turn-based encounter resolution
//!
//! `resolution` holds the pure d20 rules, `encounter` the state machine,
//! `status` the round-start tick, `casting` the caster turns.

pub mod casting;
pub mod constants;
pub mod encounter;
pub mod resolution;
pub mod status;

pub use casting::SpellTarget;
pub use encounter::{resolve_combat, CombatOutcome, CombatReport, CombatSettings, Combatant, Encounter};
pub use resolution::{resolve_attack, resolve_spell_check, roll_damage, AttackResult, SpellCheck};
