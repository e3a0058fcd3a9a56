//! Expedition orchestrator
//!
//! Walks a guild's party down the configured floors room by room:
//! trap, combat, treasure, `room_complete`, then a morale check. Owns the
//! party, the dice and the event log for the whole run and lends them to the
//! resolvers by `&mut`.

use serde_json::json;
use tracing::{debug, info};

use crate::combat::{resolve_combat, CombatOutcome, CombatSettings};
use crate::content::loot::MagicItem;
use crate::core::config::ExpeditionConfig;
use crate::core::error::{ResolutionError, Result};
use crate::core::types::GuildId;
use crate::dice::{Roller, SeededDice};
use crate::dungeon::generator::{generate_floor, spawn_encounter, Room, RoomKind, RoomOutcome};
use crate::events::{EventLog, EventType};
use crate::expedition::summary::{
    CharacterDelta, ExpeditionReport, ExpeditionStatus, ExpeditionSummary, Snapshot,
};
use crate::hazards::{resolve_trap, resolve_treasure};
use crate::morale::{self, CheckKind, MoraleScore};
use crate::party::guild::{Guild, Party};

/// Running totals for the summary
#[derive(Debug, Clone, Default)]
struct Tally {
    floors_cleared: u32,
    rooms_cleared: u32,
    gold: u64,
    items: Vec<MagicItem>,
    enemies_defeated: u32,
    bosses_defeated: u32,
}

/// One guild's scheduled run
pub struct Expedition<R: Roller = SeededDice> {
    guild_id: GuildId,
    guild_name: String,
    party: Party,
    config: ExpeditionConfig,
    start_floor: u32,
    dice: R,
    log: EventLog,
    status: ExpeditionStatus,
    floor: u32,
    room: u32,
    tally: Tally,
    snapshots: Vec<Snapshot>,
}

impl Expedition<SeededDice> {
    /// Prepare a run seeded with `seed`
    pub fn new(guild: &Guild, config: ExpeditionConfig, seed: u64) -> Result<Self> {
        Self::with_dice(guild, config, SeededDice::new(seed))
    }
}

impl<R: Roller> Expedition<R> {
    /// Prepare a run with any roller. Fails on a bad config or party.
    pub fn with_dice(guild: &Guild, config: ExpeditionConfig, dice: R) -> Result<Self> {
        config.validate()?;
        let party = guild.muster()?;
        let start_floor = guild.resume_floor();
        Ok(Self {
            guild_id: guild.id,
            guild_name: guild.name.clone(),
            snapshots: party.members.iter().map(Snapshot::of).collect(),
            party,
            config,
            start_floor,
            dice,
            log: EventLog::new(guild.id, guild.name.clone()),
            status: ExpeditionStatus::NotStarted,
            floor: start_floor,
            room: 0,
            tally: Tally::default(),
        })
    }

    pub fn status(&self) -> ExpeditionStatus {
        self.status
    }

    pub fn start_floor(&self) -> u32 {
        self.start_floor
    }

    pub fn party(&self) -> &Party {
        &self.party
    }

    /// Run to a terminal state
    pub fn run(mut self) -> std::result::Result<ExpeditionReport, ResolutionError> {
        if self.status != ExpeditionStatus::NotStarted {
            return Err(ResolutionError::AlreadyTerminated(self.status.label().to_string()));
        }
        self.status = ExpeditionStatus::Running;
        let last_floor = self.start_floor + self.config.max_floors - 1;

        info!(
            guild = %self.guild_id,
            name = %self.guild_name,
            start_floor = self.start_floor,
            last_floor,
            "expedition departs"
        );
        self.log.beat();
        self.log.emit(
            EventType::ExpeditionStart,
            format!("{} descends into the dungeon from floor {}", self.guild_name, self.start_floor),
            json!({
                "party": self.party.names(),
                "start_floor": self.start_floor,
                "floors": self.config.max_floors,
            }),
        )?;

        let status = 'floors: loop {
            let layout = generate_floor(self.floor, &mut self.dice);
            let room_count = layout.room_count();
            self.room = 0;
            self.log.beat();
            self.log.emit(
                EventType::FloorEnter,
                format!("The party reaches floor {} ({} rooms)", self.floor, room_count),
                json!({"floor": self.floor, "rooms": room_count}),
            )?;

            for room in &layout.rooms {
                self.room = room.index;
                let outcome = self.resolve_room(room)?;
                debug!(
                    guild = %self.guild_id,
                    floor = self.floor,
                    room = room.index,
                    kind = room.kind.label(),
                    ?outcome,
                    "room resolved"
                );
                match outcome {
                    RoomOutcome::Wiped => break 'floors ExpeditionStatus::Wiped,
                    RoomOutcome::Retreated => break 'floors ExpeditionStatus::Retreated,
                    RoomOutcome::Cleared | RoomOutcome::Stalemate | RoomOutcome::Fountain => {}
                }

                // the floor check stands in for the last room's check
                if room.index < room_count && self.morale_check(CheckKind::Room)? {
                    break 'floors ExpeditionStatus::Retreated;
                }
            }

            self.tally.floors_cleared += 1;
            if self.morale_check(CheckKind::Floor)? {
                break ExpeditionStatus::Retreated;
            }
            if self.floor == last_floor {
                break ExpeditionStatus::Completed;
            }
            self.floor += 1;
        };

        self.terminate(status)?;
        Ok(self.into_report())
    }

    fn resolve_room(&mut self, room: &Room) -> std::result::Result<RoomOutcome, ResolutionError> {
        let floor = self.floor;
        self.log.beat();
        self.log.emit(
            EventType::RoomEnter,
            format!("Room {} of floor {}: {}", room.index, floor, room.kind.label().replace('_', " ")),
            json!({
                "floor": floor,
                "room": room.index,
                "kind": room.kind,
                "enemies": room.enemy_count,
            }),
        )?;

        if room.kind == RoomKind::Fountain {
            self.drink_fountain()?;
            return self.complete_room(room, RoomOutcome::Fountain);
        }

        if room.kind.has_trap() {
            resolve_trap(&mut self.party, floor, &mut self.dice, &mut self.log)?;
            if self.party.is_wiped() {
                return Ok(RoomOutcome::Wiped);
            }
        }

        let mut outcome = RoomOutcome::Cleared;
        if room.kind.has_combat() {
            let enemies = spawn_encounter(room, floor, &mut self.dice)?;
            let settings = CombatSettings {
                floor,
                room: room.index,
                boss_fight: room.kind.is_boss(),
                max_rounds: self.config.max_combat_rounds,
                morale_checks: self.config.combat_morale_checks,
            };
            let report = resolve_combat(&mut self.party, enemies, settings, &mut self.dice, &mut self.log)?;
            self.tally.enemies_defeated += report.enemies_defeated;
            self.tally.bosses_defeated += report.bosses_defeated;
            match report.outcome {
                CombatOutcome::Victory => {}
                CombatOutcome::Wipe => return Ok(RoomOutcome::Wiped),
                CombatOutcome::Retreat => return Ok(RoomOutcome::Retreated),
                CombatOutcome::Stalemate => outcome = RoomOutcome::Stalemate,
            }
        }

        if room.kind.has_treasure() && outcome == RoomOutcome::Cleared && !self.party.is_wiped() {
            let found = resolve_treasure(
                &mut self.party,
                floor,
                room.kind.is_boss(),
                &mut self.dice,
                &mut self.log,
            )?;
            self.tally.gold += found.gold;
            self.tally.items.extend(found.item);
        }

        self.complete_room(room, outcome)
    }

    fn drink_fountain(&mut self) -> std::result::Result<(), ResolutionError> {
        for member in self.party.members.iter_mut() {
            let healed = member.restore_full();
            self.log.emit(
                EventType::CharacterHealed,
                format!("{} drinks from the fountain and is made whole", member.name),
                json!({
                    "target": member.name,
                    "amount": healed,
                    "hp": member.hp,
                    "source": "fountain",
                }),
            )?;
        }
        Ok(())
    }

    fn complete_room(&mut self, room: &Room, outcome: RoomOutcome) -> std::result::Result<RoomOutcome, ResolutionError> {
        self.tally.rooms_cleared += 1;
        self.log.beat();
        self.log.emit(
            EventType::RoomComplete,
            format!("Room {} of floor {} is behind the party", room.index, self.floor),
            json!({"floor": self.floor, "room": room.index, "outcome": outcome}),
        )?;
        Ok(outcome)
    }

    /// Roll morale. Returns true when the party turns back.
    fn morale_check(&mut self, kind: CheckKind) -> std::result::Result<bool, ResolutionError> {
        let check = morale::check(&self.party, kind, &mut self.dice);
        self.log.beat();
        self.log.emit(
            EventType::MoraleCheck,
            if check.retreat {
                format!("Morale breaks (rolled {} under {})", check.roll, check.total())
            } else {
                format!("The party presses on (rolled {} against {})", check.roll, check.total())
            },
            json!({
                "kind": check.kind,
                "roll": check.roll,
                "morale": check.total(),
                "retreat": check.retreat,
                "during_combat": false,
                "floor": self.floor,
                "room": self.room,
            }),
        )?;
        Ok(check.retreat)
    }

    fn terminate(&mut self, status: ExpeditionStatus) -> std::result::Result<(), ResolutionError> {
        if self.status.is_terminal() {
            return Err(ResolutionError::AlreadyTerminated(self.status.label().to_string()));
        }
        self.status = status;
        let (event_type, description) = match status {
            ExpeditionStatus::Completed => (
                EventType::ExpeditionComplete,
                format!("{} returns triumphant with {} gold", self.guild_name, self.tally.gold),
            ),
            ExpeditionStatus::Retreated => (
                EventType::ExpeditionRetreat,
                format!("{} retreats from floor {}", self.guild_name, self.floor),
            ),
            _ => (
                EventType::ExpeditionWipe,
                format!("{} has fallen on floor {}", self.guild_name, self.floor),
            ),
        };

        self.log.beat();
        self.log.emit(
            event_type,
            description,
            json!({
                "status": status,
                "floor": self.floor,
                "room": self.room,
                "floors_cleared": self.tally.floors_cleared,
                "gold": self.tally.gold,
            }),
        )?;
        info!(
            guild = %self.guild_id,
            status = status.label(),
            floor = self.floor,
            room = self.room,
            gold = self.tally.gold,
            events = self.log.len(),
            "expedition ended"
        );
        Ok(())
    }

    fn into_report(self) -> ExpeditionReport {
        let characters = self
            .snapshots
            .iter()
            .zip(self.party.members.iter())
            .map(|(start, end)| CharacterDelta::between(start, end))
            .collect();
        let summary = ExpeditionSummary {
            guild_id: self.guild_id,
            guild_name: self.guild_name,
            status: self.status,
            start_floor: self.start_floor,
            floors_cleared: self.tally.floors_cleared,
            rooms_cleared: self.tally.rooms_cleared,
            final_floor: self.floor,
            final_room: self.room,
            gold: self.tally.gold,
            items: self.tally.items,
            enemies_defeated: self.tally.enemies_defeated,
            bosses_defeated: self.tally.bosses_defeated,
            characters,
            final_morale: MoraleScore::of(&self.party).total(),
        };
        ExpeditionReport { summary, party: self.party, events: self.log.into_events() }
    }
}
