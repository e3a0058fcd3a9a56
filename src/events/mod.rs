//! Expedition event stream
//!
//! The ordered event log is the only output the replay viewer and the
//! persistence layer consume, so its schema is closed.

pub mod log;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::types::{GuildId, Tick};

pub use log::EventLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    // Expedition lifecycle
    ExpeditionStart,
    ExpeditionRetreat,
    ExpeditionComplete,
    ExpeditionWipe,
    FloorEnter,
    RoomEnter,
    RoomComplete,

    // Combat
    CombatStart,
    CombatEnd,
    EnemyAppears,
    EnemyDefeated,
    BossAbilityTriggered,
    AttackHit,
    AttackMiss,
    AttackCritical,
    SpellCast,
    SpellFail,
    CharacterHealed,

    // Status
    DebuffApplied,
    DebuffExpired,
    StatusDamage,
    CharacterUnconscious,
    /// Reserved. Downed characters recover after the expedition, so the
    /// engine never emits this.
    CharacterDies,

    // Hazards
    TrapTriggered,
    TrapDetected,
    TreasureFound,
    MoraleCheck,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ExpeditionStart => "expedition_start",
            EventType::ExpeditionRetreat => "expedition_retreat",
            EventType::ExpeditionComplete => "expedition_complete",
            EventType::ExpeditionWipe => "expedition_wipe",
            EventType::FloorEnter => "floor_enter",
            EventType::RoomEnter => "room_enter",
            EventType::RoomComplete => "room_complete",
            EventType::CombatStart => "combat_start",
            EventType::CombatEnd => "combat_end",
            EventType::EnemyAppears => "enemy_appears",
            EventType::EnemyDefeated => "enemy_defeated",
            EventType::BossAbilityTriggered => "boss_ability_triggered",
            EventType::AttackHit => "attack_hit",
            EventType::AttackMiss => "attack_miss",
            EventType::AttackCritical => "attack_critical",
            EventType::SpellCast => "spell_cast",
            EventType::SpellFail => "spell_fail",
            EventType::CharacterHealed => "character_healed",
            EventType::DebuffApplied => "debuff_applied",
            EventType::DebuffExpired => "debuff_expired",
            EventType::StatusDamage => "status_damage",
            EventType::CharacterUnconscious => "character_unconscious",
            EventType::CharacterDies => "character_dies",
            EventType::TrapTriggered => "trap_triggered",
            EventType::TrapDetected => "trap_detected",
            EventType::TreasureFound => "treasure_found",
            EventType::MoraleCheck => "morale_check",
        }
    }

    /// Priority used when the emitter does not override it
    pub fn default_priority(&self) -> Priority {
        match self {
            EventType::ExpeditionWipe | EventType::CharacterDies => Priority::Critical,
            EventType::ExpeditionStart
            | EventType::ExpeditionRetreat
            | EventType::ExpeditionComplete
            | EventType::BossAbilityTriggered
            | EventType::AttackCritical
            | EventType::CharacterUnconscious => Priority::High,
            _ => Priority::Normal,
        }
    }

    /// Ends the event stream
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventType::ExpeditionRetreat | EventType::ExpeditionComplete | EventType::ExpeditionWipe
        )
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Normal,
    High,
    Critical,
}

/// One immutable entry in an expedition's event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub tick_number: Tick,
    pub guild_id: GuildId,
    pub guild_name: String,
    pub description: String,
    pub priority: Priority,
    pub details: Value,
}

impl Event {
    /// Read a detail field, if present
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}
