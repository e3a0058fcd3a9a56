//! What an expedition hands back

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::content::loot::MagicItem;
use crate::content::spells::Spell;
use crate::core::types::{CharacterId, GuildId, Role};
use crate::events::Event;
use crate::party::character::Character;
use crate::party::guild::Party;

/// Lifecycle of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpeditionStatus {
    #[default]
    NotStarted,
    Running,
    Completed,
    Retreated,
    Wiped,
}

impl ExpeditionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExpeditionStatus::Completed | ExpeditionStatus::Retreated | ExpeditionStatus::Wiped
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpeditionStatus::NotStarted => "not_started",
            ExpeditionStatus::Running => "running",
            ExpeditionStatus::Completed => "completed",
            ExpeditionStatus::Retreated => "retreated",
            ExpeditionStatus::Wiped => "wiped",
        }
    }
}

/// State of one member when the party set out
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub hp: u32,
    pub lifetime_downed: u32,
    pub disabled: BTreeSet<Spell>,
}

impl Snapshot {
    pub fn of(character: &Character) -> Self {
        Self {
            hp: character.hp,
            lifetime_downed: character.lifetime_downed,
            disabled: character.disabled_spells.clone(),
        }
    }
}

/// How one member fared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDelta {
    pub id: CharacterId,
    pub name: String,
    pub role: Role,
    pub hp_start: u32,
    pub hp_end: u32,
    pub hp_lost: u32,
    pub times_downed: u32,
    /// Spells lost to fumbles on this run
    pub spells_disabled: Vec<Spell>,
}

impl CharacterDelta {
    pub(crate) fn between(start: &Snapshot, end: &Character) -> Self {
        Self {
            id: end.id,
            name: end.name.clone(),
            role: end.role,
            hp_start: start.hp,
            hp_end: end.hp,
            hp_lost: start.hp.saturating_sub(end.hp),
            times_downed: end.lifetime_downed - start.lifetime_downed,
            spells_disabled: end
                .disabled_spells
                .iter()
                .copied()
                .filter(|s| !start.disabled.contains(s))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpeditionSummary {
    pub guild_id: GuildId,
    pub guild_name: String,
    pub status: ExpeditionStatus,
    pub start_floor: u32,
    pub floors_cleared: u32,
    pub rooms_cleared: u32,
    /// Floor and room the party was in when the run ended
    pub final_floor: u32,
    pub final_room: u32,
    pub gold: u64,
    pub items: Vec<MagicItem>,
    pub enemies_defeated: u32,
    pub bosses_defeated: u32,
    pub characters: Vec<CharacterDelta>,
    pub final_morale: u32,
}

impl ExpeditionSummary {
    /// Deepest floor fully cleared, if any
    pub fn deepest_floor(&self) -> Option<u32> {
        (self.floors_cleared > 0).then(|| self.start_floor + self.floors_cleared - 1)
    }
}

/// Summary plus everything recovery needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpeditionReport {
    pub summary: ExpeditionSummary,
    /// Party state at the moment the run ended
    pub party: Party,
    pub events: Vec<Event>,
}
