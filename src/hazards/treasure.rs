//! Treasure checks

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::combat::constants::{NATURAL_CRIT, NATURAL_FUMBLE};
use crate::content::debuffs::RollKind;
use crate::content::loot::{MagicItem, Rarity};
use crate::core::error::ResolutionError;
use crate::core::types::{Role, Stat};
use crate::dice::Roller;
use crate::events::{EventLog, EventType};
use crate::party::guild::Party;

pub const TREASURE_BASE_DC: i32 = 10;
pub const BOSS_TREASURE_DC_BONUS: i32 = 1;
/// Gold found is this die times the floor number
pub const GOLD_DIE: u32 = 20;

pub fn treasure_dc(floor: u32, boss: bool) -> i32 {
    TREASURE_BASE_DC + floor as i32 + if boss { BOSS_TREASURE_DC_BONUS } else { 0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureReport {
    pub natural: u32,
    pub gold: u64,
    pub item: Option<MagicItem>,
}

impl TreasureReport {
    pub fn found_anything(&self) -> bool {
        self.gold > 0 || self.item.is_some()
    }
}

fn roll_gold(floor: u32, dice: &mut impl Roller) -> u64 {
    u64::from(floor.max(1)) * u64::from(dice.die(GOLD_DIE))
}

/// Search a cleared room. `treasure_found` is emitted even when the search
/// turns up nothing.
pub fn resolve_treasure(
    party: &mut Party,
    floor: u32,
    boss: bool,
    dice: &mut impl Roller,
    log: &mut EventLog,
) -> Result<TreasureReport, ResolutionError> {
    let finder = party
        .role_or_random(Role::Scout, dice)
        .ok_or(ResolutionError::NoConsciousMember { action: "search for treasure" })?;
    let member = &mut party.members[finder];
    let advantage = member.take_advantage();
    let bonus = member.roll_bonus(Stat::Luck, RollKind::Check);
    let finder_name = member.name.clone();

    let dc = treasure_dc(floor, boss);
    let natural = dice.roll_with(20, advantage);
    let total = natural as i32 + bonus;

    let (gold, item) = match natural {
        NATURAL_CRIT => {
            let gold = roll_gold(floor, dice);
            let rarity = Rarity::from_d20(dice.d20());
            (gold, Some(MagicItem::found(rarity, dice.d4(), floor)))
        }
        NATURAL_FUMBLE => (0, None),
        _ if total >= dc => (roll_gold(floor, dice), None),
        _ => (0, None),
    };

    log.beat();
    let description = match (&item, gold) {
        (Some(item), _) => format!("{} uncovers {} gold and a {}", finder_name, gold, item.name),
        (None, 0) => format!("{} finds nothing of value", finder_name),
        (None, _) => format!("{} uncovers {} gold", finder_name, gold),
    };
    log.emit(
        EventType::TreasureFound,
        description,
        json!({
            "finder": finder_name,
            "natural": natural,
            "total": total,
            "dc": dc,
            "gold": gold,
            "item": item.as_ref().map(|i| i.name.clone()),
            "rarity": item.as_ref().map(|i| i.rarity),
        }),
    )?;

    Ok(TreasureReport { natural, gold, item })
}
