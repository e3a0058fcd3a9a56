//! Procedural dungeon floors and their encounters

pub mod enemy;
pub mod generator;

pub use enemy::{Enemy, EnemyWound};
pub use generator::{
    generate_floor, preview, spawn_encounter, spawn_minions, Floor, FloorSummary, Room, RoomKind,
    RoomOutcome,
};
