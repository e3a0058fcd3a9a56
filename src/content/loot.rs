//! Magic item rarity tables

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
}

impl Rarity {
    /// Rarity for a 1d20 roll: 1-12 common, 13-18 uncommon, 19-20 rare
    pub fn from_d20(roll: u32) -> Rarity {
        match roll {
            0..=12 => Rarity::Common,
            13..=18 => Rarity::Uncommon,
            _ => Rarity::Rare,
        }
    }

    /// The rarity's 1d4 sub-table
    pub fn table(&self) -> [&'static str; 4] {
        match self {
            Rarity::Common => ["Rusty Sword", "Cracked Shield", "Faded Cloak", "Bent Wand"],
            Rarity::Uncommon => ["Silver Blade", "Iron Shield", "Mystic Robe", "Crystal Wand"],
            Rarity::Rare => ["Flaming Sword", "Dragon Shield", "Archmage Robe", "Staff of Power"],
        }
    }

    pub fn item_name(&self, roll: u32) -> &'static str {
        self.table()[roll.clamp(1, 4) as usize - 1]
    }
}

/// A magic item carried out of the dungeon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicItem {
    pub name: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub identified: bool,
    #[serde(default)]
    pub cursed: bool,
    /// Floor the item was found on
    #[serde(default)]
    pub floor: u32,
}

impl MagicItem {
    /// A freshly looted, unidentified item
    pub fn found(rarity: Rarity, roll: u32, floor: u32) -> Self {
        Self {
            name: rarity.item_name(roll).to_string(),
            rarity,
            identified: false,
            cursed: false,
            floor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_bands() {
        assert_eq!(Rarity::from_d20(1), Rarity::Common);
        assert_eq!(Rarity::from_d20(12), Rarity::Common);
        assert_eq!(Rarity::from_d20(13), Rarity::Uncommon);
        assert_eq!(Rarity::from_d20(18), Rarity::Uncommon);
        assert_eq!(Rarity::from_d20(19), Rarity::Rare);
        assert_eq!(Rarity::from_d20(20), Rarity::Rare);
    }

    #[test]
    fn test_found_items_start_unidentified() {
        let item = MagicItem::found(Rarity::Rare, 4, 3);
        assert_eq!(item.name, "Staff of Power");
        assert!(!item.identified);
        assert!(!item.cursed);
        assert_eq!(item.floor, 3);
    }
}
