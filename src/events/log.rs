//! Append-only event log for one expedition

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::ResolutionError;
use crate::core::types::{GuildId, Tick};
use crate::events::{Event, EventType, Priority};

/// Ordered events of one run.
///
/// Ticks never decrease: [`EventLog::beat`] advances the tick at an action
/// boundary and every event emitted until the next beat shares it. Once a
/// terminal event is pushed the log is sealed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    guild_id: GuildId,
    guild_name: String,
    tick: Tick,
    sealed: bool,
    events: Vec<Event>,
}

impl EventLog {
    pub fn new(guild_id: GuildId, guild_name: impl Into<String>) -> Self {
        Self {
            guild_id,
            guild_name: guild_name.into(),
            tick: 0,
            sealed: false,
            events: Vec::new(),
        }
    }

    /// Advance to the next action boundary
    pub fn beat(&mut self) -> Tick {
        self.tick += 1;
        self.tick
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Append an event with its type's default priority
    pub fn emit(
        &mut self,
        event_type: EventType,
        description: impl Into<String>,
        details: Value,
    ) -> Result<(), ResolutionError> {
        self.emit_with(event_type, event_type.default_priority(), description, details)
    }

    pub fn emit_with(
        &mut self,
        event_type: EventType,
        priority: Priority,
        description: impl Into<String>,
        details: Value,
    ) -> Result<(), ResolutionError> {
        if self.sealed {
            return Err(ResolutionError::EventAfterTermination {
                event: event_type.as_str().to_string(),
            });
        }
        self.events.push(Event {
            event_type,
            tick_number: self.tick,
            guild_id: self.guild_id,
            guild_name: self.guild_name.clone(),
            description: description.into(),
            priority,
            details,
        });
        if event_type.is_terminal() {
            self.sealed = true;
        }
        Ok(())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count(&self, event_type: EventType) -> usize {
        self.events.iter().filter(|e| e.event_type == event_type).count()
    }

    pub fn of_type(&self, event_type: EventType) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.event_type == event_type)
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ticks_follow_beats() {
        let mut log = EventLog::new(GuildId(1), "Lantern Company");
        log.beat();
        log.emit(EventType::RoomEnter, "enter", json!({"room": 1})).unwrap();
        log.emit(EventType::CombatStart, "fight", json!({})).unwrap();
        log.beat();
        log.emit(EventType::AttackMiss, "miss", json!({})).unwrap();

        let ticks: Vec<Tick> = log.events().iter().map(|e| e.tick_number).collect();
        assert_eq!(ticks, vec![1, 1, 2]);
        assert_eq!(log.events()[0].guild_name, "Lantern Company");
    }

    #[test]
    fn test_terminal_event_seals_log() {
        let mut log = EventLog::new(GuildId(2), "Ashen Oath");
        log.emit(EventType::ExpeditionWipe, "wiped", json!({})).unwrap();
        assert!(log.is_sealed());
        let err = log.emit(EventType::RoomEnter, "late", json!({})).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::EventAfterTermination { event: "room_enter".into() }
        );
        assert_eq!(log.count(EventType::ExpeditionWipe), 1);
        assert_eq!(log.events()[0].priority, Priority::Critical);
    }
}
