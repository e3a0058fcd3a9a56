//! Floor and room generation

use serde::{Deserialize, Serialize};

use crate::content::enemies::{tier_for_floor, Archetype};
use crate::core::error::ResolutionError;
use crate::dice::{Roller, SeededDice};
use crate::dungeon::enemy::Enemy;

/// Rooms on a floor before the 1d4 bonus
pub const BASE_ROOM_COUNT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// Combat + Treasure
    Combat,
    /// Trap + Treasure
    Trap,
    /// Combat + Trap + Treasure
    CombatTrap,
    /// Boss + Treasure
    Boss,
    /// Healing Fountain, no treasure
    Fountain,
}

impl RoomKind {
    /// Room contents for a 1d100 roll
    pub fn from_d100(roll: u32) -> RoomKind {
        match roll {
            0..=40 => RoomKind::Combat,
            41..=70 => RoomKind::Trap,
            71..=94 => RoomKind::CombatTrap,
            95..=99 => RoomKind::Boss,
            _ => RoomKind::Fountain,
        }
    }

    pub fn has_combat(&self) -> bool {
        matches!(self, RoomKind::Combat | RoomKind::CombatTrap | RoomKind::Boss)
    }

    pub fn has_trap(&self) -> bool {
        matches!(self, RoomKind::Trap | RoomKind::CombatTrap)
    }

    pub fn has_treasure(&self) -> bool {
        !matches!(self, RoomKind::Fountain)
    }

    pub fn is_boss(&self) -> bool {
        matches!(self, RoomKind::Boss)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoomKind::Combat => "combat",
            RoomKind::Trap => "trap",
            RoomKind::CombatTrap => "combat_trap",
            RoomKind::Boss => "boss",
            RoomKind::Fountain => "fountain",
        }
    }
}

/// How a processed room ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomOutcome {
    Cleared,
    Fountain,
    /// Combat hit the round cap and the party disengaged
    Stalemate,
    Retreated,
    Wiped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// 1-based position on the floor
    pub index: u32,
    pub kind: RoomKind,
    /// Enemies in the encounter, boss included
    pub enemy_count: u32,
    pub outcome: Option<RoomOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub level: u32,
    pub rooms: Vec<Room>,
}

impl Floor {
    pub fn room_count(&self) -> u32 {
        self.rooms.len() as u32
    }

    pub fn summary(&self) -> FloorSummary {
        let count = |kind: RoomKind| self.rooms.iter().filter(|r| r.kind == kind).count() as u32;
        FloorSummary {
            level: self.level,
            rooms: self.room_count(),
            combat_rooms: self.rooms.iter().filter(|r| r.kind.has_combat()).count() as u32,
            trap_rooms: self.rooms.iter().filter(|r| r.kind.has_trap()).count() as u32,
            boss_rooms: count(RoomKind::Boss),
            fountains: count(RoomKind::Fountain),
            enemies: self.rooms.iter().map(|r| r.enemy_count).sum(),
        }
    }
}

/// Room and enemy counts for one floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorSummary {
    pub level: u32,
    pub rooms: u32,
    pub combat_rooms: u32,
    pub trap_rooms: u32,
    pub boss_rooms: u32,
    pub fountains: u32,
    pub enemies: u32,
}

/// Enemy count for a room on `level`
fn enemy_count(kind: RoomKind, level: u32, dice: &mut impl Roller) -> u32 {
    match kind {
        RoomKind::Boss => dice.d4() + level + 1,
        RoomKind::Combat | RoomKind::CombatTrap => dice.d4() + level,
        RoomKind::Trap | RoomKind::Fountain => 0,
    }
}

/// Generate a floor: `5 + 1d4` rooms, the last one always a boss lair
pub fn generate_floor(level: u32, dice: &mut impl Roller) -> Floor {
    let level = level.max(1);
    let count = BASE_ROOM_COUNT + dice.d4();
    let rooms = (1..=count)
        .map(|index| {
            let kind = if index == count {
                RoomKind::Boss
            } else {
                RoomKind::from_d100(dice.d100())
            };
            Room { index, kind, enemy_count: enemy_count(kind, level, dice), outcome: None }
        })
        .collect();
    Floor { level, rooms }
}

/// Materialise a room's enemies. Bosses roll at `level + 1` and take one slot.
pub fn spawn_encounter(
    room: &Room,
    level: u32,
    dice: &mut impl Roller,
) -> Result<Vec<Enemy>, ResolutionError> {
    if !room.kind.has_combat() || room.enemy_count == 0 {
        return Err(ResolutionError::EmptyEncounter { floor: level, room: room.index });
    }

    let mut enemies = Vec::with_capacity(room.enemy_count as usize);
    let mut regulars = room.enemy_count;
    if room.kind.is_boss() {
        let boss_level = level + 1;
        let archetype = Archetype::for_tier(tier_for_floor(boss_level), dice.d4());
        enemies.push(Enemy::spawn_boss(archetype, boss_level, dice));
        regulars -= 1;
    }
    enemies.extend(spawn_minions(regulars, level, &[], dice));
    Ok(enemies)
}

/// Roll `count` regular enemies of the floor's tier. Names are numbered per
/// archetype, continuing after any already in `present`.
pub fn spawn_minions(count: u32, level: u32, present: &[Enemy], dice: &mut impl Roller) -> Vec<Enemy> {
    let tier = tier_for_floor(level);
    let mut spawned: Vec<Enemy> = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let archetype = Archetype::for_tier(tier, dice.d4());
        let ordinal = present
            .iter()
            .chain(spawned.iter())
            .filter(|e| !e.is_boss() && e.archetype == archetype)
            .count() as u32
            + 1;
        spawned.push(Enemy::spawn(archetype, level, ordinal, dice));
    }
    spawned
}

/// Summaries of the floors an expedition from `start_floor` would see with `seed`
pub fn preview(start_floor: u32, floors: u32, seed: u64) -> Vec<FloorSummary> {
    let mut dice = SeededDice::new(seed);
    (start_floor.max(1)..start_floor.max(1) + floors)
        .map(|level| generate_floor(level, &mut dice).summary())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    #[test]
    fn test_room_table_edges() {
        assert_eq!(RoomKind::from_d100(1), RoomKind::Combat);
        assert_eq!(RoomKind::from_d100(40), RoomKind::Combat);
        assert_eq!(RoomKind::from_d100(41), RoomKind::Trap);
        assert_eq!(RoomKind::from_d100(70), RoomKind::Trap);
        assert_eq!(RoomKind::from_d100(71), RoomKind::CombatTrap);
        assert_eq!(RoomKind::from_d100(94), RoomKind::CombatTrap);
        assert_eq!(RoomKind::from_d100(95), RoomKind::Boss);
        assert_eq!(RoomKind::from_d100(99), RoomKind::Boss);
        assert_eq!(RoomKind::from_d100(100), RoomKind::Fountain);
        assert!(!RoomKind::Fountain.has_treasure());
    }

    #[test]
    fn test_room_count_and_boss_lair() {
        let mut dice = SeededDice::new(11);
        for level in 1..=12 {
            let floor = generate_floor(level, &mut dice);
            assert!((6..=9).contains(&floor.room_count()));
            let last = floor.rooms.last().unwrap();
            assert!(last.kind.is_boss());
            assert!(last.kind.has_treasure());
        }
    }

    #[test]
    fn test_scripted_floor() {
        // 1 extra room (6 total); rooms: 15 combat (+2 enemies), 100 fountain,
        // 50 trap, 80 combat+trap (+1), 97 boss (+4), last boss (+3)
        let mut dice = ScriptedDice::new([1, 15, 2, 100, 50, 80, 1, 97, 4, 3]);
        let floor = generate_floor(1, &mut dice);
        let kinds: Vec<RoomKind> = floor.rooms.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RoomKind::Combat,
                RoomKind::Fountain,
                RoomKind::Trap,
                RoomKind::CombatTrap,
                RoomKind::Boss,
                RoomKind::Boss,
            ]
        );
        let counts: Vec<u32> = floor.rooms.iter().map(|r| r.enemy_count).collect();
        assert_eq!(counts, vec![3, 0, 0, 2, 6, 5]);
    }

    #[test]
    fn test_boss_encounter_takes_one_slot() {
        let room = Room { index: 6, kind: RoomKind::Boss, enemy_count: 4, outcome: None };
        let mut dice = SeededDice::new(5);
        let enemies = spawn_encounter(&room, 3, &mut dice).unwrap();
        assert_eq!(enemies.len(), 4);
        assert!(enemies[0].is_boss());
        assert_eq!(enemies[0].level, 4);
        assert!(enemies[1..].iter().all(|e| !e.is_boss() && e.level == 3));
    }

    #[test]
    fn test_minion_names_are_numbered_per_archetype() {
        let mut dice = ScriptedDice::new([1, 1, 1, 1, 2, 1]);
        let enemies = spawn_minions(3, 1, &[], &mut dice);
        let names: Vec<&str> = enemies.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Giant Rat 1", "Giant Rat 2", "Slime 1"]);
    }

    #[test]
    fn test_empty_encounter_is_an_error() {
        let room = Room { index: 2, kind: RoomKind::Trap, enemy_count: 0, outcome: None };
        let mut dice = SeededDice::new(1);
        assert_eq!(
            spawn_encounter(&room, 1, &mut dice),
            Err(ResolutionError::EmptyEncounter { floor: 1, room: 2 })
        );
    }

    #[test]
    fn test_preview_is_deterministic() {
        let a = preview(1, 3, 99);
        let b = preview(1, 3, 99);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(a[2].level, 3);
        assert!(a.iter().all(|f| f.boss_rooms >= 1));
    }
}
