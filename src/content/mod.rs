//! Static content tables: enemies, bosses, spells, debuffs and loot.

pub mod debuffs;
pub mod enemies;
pub mod loot;
pub mod spells;

pub use debuffs::{DebuffKind, RollKind};
pub use enemies::{tier_for_floor, Archetype, ArchetypeProfile, BossAbility, EnemyHex};
pub use loot::{MagicItem, Rarity};
pub use spells::{Spell, SpellEffect};
