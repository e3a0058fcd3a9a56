//! Guilds, characters and the active party

pub mod character;
pub mod guild;
pub mod roster;
pub mod status;

pub use character::{Boons, Character, Wound};
pub use guild::{Guild, Party};
pub use roster::{CharacterRecord, GuildRecord, RosterFile};
pub use status::{Debuff, DebuffList, StatusChange};
