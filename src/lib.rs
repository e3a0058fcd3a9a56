//! Guild Delve - Deterministic Guild Dungeon Expedition Engine

pub mod combat;
pub mod content;
pub mod core;
pub mod dice;
pub mod dungeon;
pub mod events;
pub mod expedition;
pub mod hazards;
pub mod morale;
pub mod party;
pub mod recovery;
pub mod runner;
