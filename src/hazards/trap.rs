//! Trap detection
//!
//! The Scout makes a single LUCK check against the floor's DC. A fumble
//! springs the trap on the detector with a debuff on top, a plain failure
//! springs it on a random member.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::combat::constants::{NATURAL_CRIT, NATURAL_FUMBLE};
use crate::content::debuffs::{DebuffKind, RollKind};
use crate::core::error::ResolutionError;
use crate::core::types::{Role, Stat};
use crate::dice::Roller;
use crate::events::{EventLog, EventType};
use crate::party::guild::Party;

pub const TRAP_BASE_DC: i32 = 10;
/// Trap damage is this die times the floor number
pub const TRAP_DAMAGE_DIE: u32 = 6;
pub const TRAP_DEBUFF_DIE: u32 = 8;
pub const TRAP_DEBUFF_DURATION_DIE: u32 = 4;

pub fn trap_dc(floor: u32) -> i32 {
    TRAP_BASE_DC + floor as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapOutcome {
    /// Natural 20: disarmed and the detector's next roll has advantage
    Mastered,
    Disarmed,
    /// Failed check: a random member is hit
    Sprung,
    /// Natural 1: the detector is hit and debuffed
    Backfired,
}

impl TrapOutcome {
    pub fn disarmed(&self) -> bool {
        matches!(self, TrapOutcome::Mastered | TrapOutcome::Disarmed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapReport {
    pub outcome: TrapOutcome,
    /// Party index of the member who made the check
    pub detector: usize,
    pub natural: u32,
    /// Party index of the member hit, if the trap went off
    pub victim: Option<usize>,
    pub damage: u32,
    pub debuff: Option<(DebuffKind, u32)>,
}

/// Resolve a trap on `floor`
pub fn resolve_trap(
    party: &mut Party,
    floor: u32,
    dice: &mut impl Roller,
    log: &mut EventLog,
) -> Result<TrapReport, ResolutionError> {
    let detector = party
        .role_or_random(Role::Scout, dice)
        .ok_or(ResolutionError::NoConsciousMember { action: "detect a trap" })?;
    let member = &mut party.members[detector];
    let advantage = member.take_advantage();
    let bonus = member.roll_bonus(Stat::Luck, RollKind::Check);
    let detector_name = member.name.clone();

    let dc = trap_dc(floor);
    let natural = dice.roll_with(20, advantage);
    let total = natural as i32 + bonus;

    log.beat();
    let outcome = match natural {
        NATURAL_CRIT => TrapOutcome::Mastered,
        NATURAL_FUMBLE => TrapOutcome::Backfired,
        _ if total < dc => TrapOutcome::Sprung,
        _ => TrapOutcome::Disarmed,
    };

    if outcome.disarmed() {
        let mastered = outcome == TrapOutcome::Mastered;
        if mastered {
            party.members[detector].boons.next_roll_advantage = true;
        }
        log.emit(
            EventType::TrapDetected,
            if mastered {
                format!("{} spots and disarms a trap with time to spare", detector_name)
            } else {
                format!("{} disarms a trap", detector_name)
            },
            json!({
                "detector": detector_name,
                "natural": natural,
                "total": total,
                "dc": dc,
                "critical": mastered,
            }),
        )?;
        return Ok(TrapReport { outcome, detector, natural, victim: None, damage: 0, debuff: None });
    }

    let victim = if outcome == TrapOutcome::Backfired {
        detector
    } else {
        party
            .random_conscious(dice)
            .ok_or(ResolutionError::NoConsciousMember { action: "spring a trap" })?
    };
    let damage = dice.die(TRAP_DAMAGE_DIE) * floor.max(1);
    let debuff = if outcome == TrapOutcome::Backfired {
        let kind = DebuffKind::from_d8(dice.die(TRAP_DEBUFF_DIE));
        Some((kind, dice.die(TRAP_DEBUFF_DURATION_DIE)))
    } else {
        None
    };

    let target = &mut party.members[victim];
    let wound = target.take_damage(damage);
    if let Some((kind, duration)) = debuff {
        if target.is_conscious() {
            target.debuffs.apply(kind, duration);
        }
    }
    let victim_name = target.name.clone();

    log.emit(
        EventType::TrapTriggered,
        format!("A trap springs on {} for {} damage", victim_name, wound.dealt),
        json!({
            "detector": detector_name,
            "target": victim_name,
            "natural": natural,
            "total": total,
            "dc": dc,
            "damage": wound.dealt,
            "fumble": outcome == TrapOutcome::Backfired,
            "debuff": debuff.map(|(kind, _)| kind),
            "duration": debuff.map(|(_, duration)| duration),
        }),
    )?;
    if wound.downed {
        log.emit(
            EventType::CharacterUnconscious,
            format!("{} collapses", victim_name),
            json!({
                "target": victim_name,
                "times_downed": party.members[victim].downed_this_expedition,
            }),
        )?;
    }

    Ok(TrapReport { outcome, detector, natural, victim: Some(victim), damage: wound.dealt, debuff })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::hazards::fixtures::{log, party};

    const SCOUT: usize = 1;

    #[test]
    fn test_natural_twenty_disarms_with_advantage() {
        let mut party = party();
        let mut log = log();
        let report = resolve_trap(&mut party, 3, &mut ScriptedDice::new([20]), &mut log).unwrap();

        assert_eq!(report.outcome, TrapOutcome::Mastered);
        assert_eq!(report.detector, SCOUT);
        assert!(party.members[SCOUT].boons.next_roll_advantage);
        assert_eq!(log.count(EventType::TrapDetected), 1);
        assert_eq!(log.count(EventType::TrapTriggered), 0);
    }

    #[test]
    fn test_natural_one_hits_detector_with_debuff() {
        let mut party = party();
        let mut log = log();
        // 3 x floor 2 damage, debuff 8 -> Frightened for 2 rounds
        let report = resolve_trap(&mut party, 2, &mut ScriptedDice::new([1, 3, 8, 2]), &mut log).unwrap();

        assert_eq!(report.outcome, TrapOutcome::Backfired);
        assert_eq!(report.victim, Some(SCOUT));
        assert_eq!(report.damage, 6);
        assert_eq!(party.members[SCOUT].hp, 9);
        assert_eq!(party.members[SCOUT].debuffs.remaining(DebuffKind::Frightened), Some(2));
        let sprung = log.of_type(EventType::TrapTriggered).next().unwrap();
        assert_eq!(sprung.detail("fumble"), Some(&json!(true)));
    }

    #[test]
    fn test_failed_check_hits_random_member() {
        let mut party = party();
        let mut log = log();
        // 5 + LUCK 3 < DC 11, victim pick 1 -> Striker, 4 damage
        let report = resolve_trap(&mut party, 1, &mut ScriptedDice::new([5, 1, 4]), &mut log).unwrap();

        assert_eq!(report.outcome, TrapOutcome::Sprung);
        assert_eq!(report.victim, Some(0));
        assert_eq!(party.members[0].hp, 11);
        assert!(party.members[0].debuffs.is_empty());
    }

    #[test]
    fn test_meeting_dc_disarms() {
        let mut party = party();
        let mut log = log();
        let report = resolve_trap(&mut party, 1, &mut ScriptedDice::new([8]), &mut log).unwrap();
        assert_eq!(report.outcome, TrapOutcome::Disarmed);
        assert!(party.members.iter().all(|c| c.hp == c.max_hp));
    }

    #[test]
    fn test_downed_scout_falls_back_to_random_member() {
        let mut party = party();
        party.members[SCOUT].take_damage(99);
        let mut log = log();
        // conscious are [0, 2, 3]; pick 2 -> Support
        let report = resolve_trap(&mut party, 1, &mut ScriptedDice::new([2, 20]), &mut log).unwrap();
        assert_eq!(report.detector, 2);
    }

    #[test]
    fn test_pending_advantage_is_spent() {
        let mut party = party();
        party.members[SCOUT].boons.next_roll_advantage = true;
        let mut log = log();
        // 2d20 keep higher: 3 and 15
        let report = resolve_trap(&mut party, 1, &mut ScriptedDice::new([3, 15]), &mut log).unwrap();
        assert_eq!(report.natural, 15);
        assert!(!party.members[SCOUT].boons.next_roll_advantage);
    }
}
