//! Roster files
//!
//! Guilds, their characters and the expedition config are described in one
//! TOML document. Characters without a recorded max HP are rolled up as
//! fresh recruits.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::content::loot::MagicItem;
use crate::content::spells::Spell;
use crate::core::config::ExpeditionConfig;
use crate::core::error::Result;
use crate::core::types::{CharacterId, GuildId, Role, Stats};
use crate::dice::Roller;
use crate::party::character::Character;
use crate::party::guild::Guild;

fn default_stat() -> i32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: CharacterId,
    pub name: String,
    pub role: Role,
    #[serde(default = "default_stat")]
    pub might: i32,
    #[serde(default = "default_stat")]
    pub grit: i32,
    #[serde(default = "default_stat")]
    pub wit: i32,
    #[serde(default = "default_stat")]
    pub luck: i32,
    /// Rolled as GRIT + hit die when absent
    #[serde(default)]
    pub max_hp: Option<u32>,
    /// Defaults to max HP
    #[serde(default)]
    pub hp: Option<u32>,
    /// Defaults to the role's starting spell (plus WIT picks for recruits)
    #[serde(default)]
    pub spells: Option<Vec<Spell>>,
    #[serde(default)]
    pub lifetime_downed: u32,
    #[serde(default)]
    pub purse: u64,
    #[serde(default)]
    pub resting: bool,
}

impl CharacterRecord {
    pub fn into_character(self, dice: &mut impl Roller) -> Character {
        let stats = Stats::new(self.might, self.grit, self.wit, self.luck);
        let mut character = match self.max_hp {
            Some(max_hp) => Character::new(self.id, self.name, self.role, stats, max_hp),
            None => Character::recruit(self.id, self.name, self.role, stats, dice),
        };
        if let Some(spells) = self.spells {
            character.known_spells = spells;
        }
        character.hp = self.hp.unwrap_or(character.max_hp).min(character.max_hp);
        character.lifetime_downed = self.lifetime_downed;
        character.purse = self.purse;
        character.resting = self.resting;
        character
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildRecord {
    pub id: GuildId,
    pub name: String,
    #[serde(default)]
    pub treasury: u64,
    #[serde(default)]
    pub floors_completed: u32,
    /// Active party character ids
    pub party: Vec<CharacterId>,
    pub roster: Vec<CharacterRecord>,
    #[serde(default)]
    pub items: Vec<MagicItem>,
}

impl GuildRecord {
    pub fn into_guild(self, dice: &mut impl Roller) -> Guild {
        let mut guild = Guild::new(self.id, self.name);
        guild.treasury = self.treasury;
        guild.floors_completed = self.floors_completed;
        guild.active_party = self.party;
        guild.equipped_items = self.items;
        guild.roster = self
            .roster
            .into_iter()
            .map(|record| record.into_character(dice))
            .collect();
        guild
    }
}

/// A whole roster document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterFile {
    #[serde(default)]
    pub expedition: ExpeditionConfig,
    #[serde(default)]
    pub guilds: Vec<GuildRecord>,
}

impl RosterFile {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let roster: RosterFile = toml::from_str(text)?;
        roster.expedition.validate()?;
        Ok(roster)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Build guilds, rolling up any recruits with `dice`
    pub fn into_guilds(self, dice: &mut impl Roller) -> (ExpeditionConfig, Vec<Guild>) {
        let guilds = self
            .guilds
            .into_iter()
            .map(|record| record.into_guild(dice))
            .collect();
        (self.expedition, guilds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::SeededDice;

    const ROSTER: &str = r#"
[expedition]
max_floors = 2

[[guilds]]
id = 1
name = "Lantern Company"
treasury = 40
party = [1, 2, 3, 4]

[[guilds.roster]]
id = 1
name = "Brakka"
role = "striker"
might = 14
max_hp = 22

[[guilds.roster]]
id = 2
name = "Pell"
role = "scout"
luck = 15

[[guilds.roster]]
id = 3
name = "Ilsa"
role = "support"
spells = ["mend_wounds", "soothing_touch"]
max_hp = 14
hp = 9

[[guilds.roster]]
id = 4
name = "Corvin"
role = "controller"
wit = 14
"#;

    #[test]
    fn test_roster_parses_and_builds() {
        let roster = RosterFile::from_toml_str(ROSTER).unwrap();
        assert_eq!(roster.expedition.max_floors, 2);

        let mut dice = SeededDice::new(3);
        let (_, guilds) = roster.into_guilds(&mut dice);
        let guild = &guilds[0];
        assert_eq!(guild.treasury, 40);
        assert!(guild.validate_party().is_ok());

        let brakka = guild.character(CharacterId(1)).unwrap();
        assert_eq!(brakka.max_hp, 22);
        assert_eq!(brakka.stats.might, 14);
        assert_eq!(brakka.stats.grit, 10);

        let pell = guild.character(CharacterId(2)).unwrap();
        assert!((11..=18).contains(&pell.max_hp));
        assert_eq!(pell.hp, pell.max_hp);

        let ilsa = guild.character(CharacterId(3)).unwrap();
        assert_eq!(ilsa.hp, 9);
        assert_eq!(ilsa.known_spells, vec![Spell::MendWounds, Spell::SoothingTouch]);

        let corvin = guild.character(CharacterId(4)).unwrap();
        assert_eq!(corvin.known_spells[0], Spell::PsychicLance);
        assert_eq!(corvin.known_spells.len(), 4);
    }

    #[test]
    fn test_bad_config_is_rejected() {
        let err = RosterFile::from_toml_str("[expedition]\nmax_combat_rounds = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_combat_rounds"));
    }
}
