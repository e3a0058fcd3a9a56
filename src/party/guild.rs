//! Guilds and the active party they send into the dungeon

use serde::{Deserialize, Serialize};

use crate::content::loot::MagicItem;
use crate::core::error::ConfigurationError;
use crate::core::types::{CharacterId, GuildId, Role};
use crate::dice::Roller;
use crate::party::character::Character;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guild {
    pub id: GuildId,
    pub name: String,
    /// Persistent gold
    pub treasury: u64,
    /// Deepest floor fully cleared; expeditions resume one floor below
    pub floors_completed: u32,
    pub roster: Vec<Character>,
    /// Characters sent on the next expedition, one per role
    pub active_party: Vec<CharacterId>,
    pub equipped_items: Vec<MagicItem>,
}

impl Guild {
    pub fn new(id: GuildId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            treasury: 0,
            floors_completed: 0,
            roster: Vec::new(),
            active_party: Vec::new(),
            equipped_items: Vec::new(),
        }
    }

    /// Floor the next expedition starts on
    pub fn resume_floor(&self) -> u32 {
        self.floors_completed + 1
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.roster.iter().find(|c| c.id == id)
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.roster.iter_mut().find(|c| c.id == id)
    }

    /// Who actually sets out: the active party, with each resting member
    /// replaced by a rested bench member of the same role when there is one
    pub fn lineup(&self) -> Vec<CharacterId> {
        self.active_party
            .iter()
            .map(|&id| match self.character(id) {
                Some(member) if member.resting => self.reserve_for(member.role).unwrap_or(id),
                _ => id,
            })
            .collect()
    }

    fn reserve_for(&self, role: Role) -> Option<CharacterId> {
        self.bench()
            .find(|c| c.role == role && !c.resting && c.validate().is_ok())
            .map(|c| c.id)
    }

    /// The guild misses an expedition: every resting member has now sat one
    /// out. Returns who was resting.
    pub fn sit_out(&mut self) -> Vec<CharacterId> {
        self.roster
            .iter_mut()
            .filter(|c| c.resting)
            .map(|c| {
                c.resting = false;
                c.id
            })
            .collect()
    }

    /// Check the lineup can start an expedition
    pub fn validate_party(&self) -> Result<(), ConfigurationError> {
        let lineup = self.lineup();
        let mut seen: Vec<Role> = Vec::with_capacity(Role::ALL.len());
        for &id in &lineup {
            let character = self.character(id).ok_or(ConfigurationError::UnknownCharacter {
                guild: self.id,
                character: id,
            })?;
            if character.resting {
                return Err(ConfigurationError::CharacterResting { character: id });
            }
            character.validate()?;
            if seen.contains(&character.role) {
                return Err(ConfigurationError::DuplicateRole { guild: self.id, role: character.role });
            }
            seen.push(character.role);
        }

        if let Some(&role) = Role::ALL.iter().find(|r| !seen.contains(r)) {
            return Err(ConfigurationError::MissingRole { guild: self.id, role });
        }
        if lineup.len() != Role::ALL.len() {
            return Err(ConfigurationError::PartySize { guild: self.id, found: lineup.len() });
        }
        Ok(())
    }

    /// Snapshot the validated active party for one expedition
    pub fn muster(&self) -> Result<Party, ConfigurationError> {
        self.validate_party()?;
        let members = self
            .lineup()
            .iter()
            .filter_map(|&id| self.character(id).cloned())
            .collect();
        Ok(Party::new(members))
    }

    /// Write a returning party's state back onto the roster
    pub fn absorb(&mut self, party: &Party) {
        for member in &party.members {
            if let Some(slot) = self.character_mut(member.id) {
                *slot = member.clone();
            }
        }
    }

    /// Roster members not in the active party
    pub fn bench(&self) -> impl Iterator<Item = &Character> {
        self.roster.iter().filter(|c| !self.active_party.contains(&c.id))
    }
}

/// The four characters on an expedition. Owned by the run for its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub members: Vec<Character>,
}

impl Party {
    pub fn new(members: Vec<Character>) -> Self {
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn conscious_indices(&self) -> Vec<usize> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_conscious())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn conscious_count(&self) -> usize {
        self.members.iter().filter(|c| c.is_conscious()).count()
    }

    /// Every member is downed
    pub fn is_wiped(&self) -> bool {
        self.members.iter().all(|c| !c.is_conscious())
    }

    pub fn index_of_role(&self, role: Role) -> Option<usize> {
        self.members.iter().position(|c| c.role == role)
    }

    /// A uniformly chosen conscious member
    pub fn random_conscious(&self, dice: &mut impl Roller) -> Option<usize> {
        let conscious = self.conscious_indices();
        dice.pick(conscious.len()).map(|i| conscious[i])
    }

    /// The conscious member of `role`, else a random conscious member
    pub fn role_or_random(&self, role: Role, dice: &mut impl Roller) -> Option<usize> {
        match self.index_of_role(role) {
            Some(index) if self.members[index].is_conscious() => Some(index),
            _ => self.random_conscious(dice),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.members.iter().map(|c| c.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Stats;
    use crate::dice::ScriptedDice;

    fn guild() -> Guild {
        let mut guild = Guild::new(GuildId(1), "Lantern Company");
        for (i, role) in Role::ALL.into_iter().enumerate() {
            let id = CharacterId(i as u32 + 1);
            guild.roster.push(Character::new(id, format!("Member {}", i + 1), role, Stats::default(), 15));
            guild.active_party.push(id);
        }
        guild
    }

    #[test]
    fn test_valid_party_musters() {
        let party = guild().muster().unwrap();
        assert_eq!(party.len(), 4);
        assert_eq!(party.conscious_count(), 4);
    }

    #[test]
    fn test_missing_role_fails_fast() {
        let mut guild = guild();
        guild.active_party.pop();
        assert_eq!(
            guild.validate_party(),
            Err(ConfigurationError::MissingRole { guild: GuildId(1), role: Role::Controller })
        );
    }

    #[test]
    fn test_duplicate_role_fails() {
        let mut guild = guild();
        guild.roster.push(Character::new(CharacterId(9), "Spare", Role::Striker, Stats::default(), 12));
        guild.active_party[3] = CharacterId(9);
        assert_eq!(
            guild.validate_party(),
            Err(ConfigurationError::DuplicateRole { guild: GuildId(1), role: Role::Striker })
        );
    }

    #[test]
    fn test_resting_and_unknown_members_fail() {
        let mut guild = guild();
        guild.roster[0].resting = true;
        assert!(matches!(guild.validate_party(), Err(ConfigurationError::CharacterResting { .. })));

        let mut guild = self::guild();
        guild.active_party[0] = CharacterId(77);
        assert!(matches!(guild.validate_party(), Err(ConfigurationError::UnknownCharacter { .. })));
    }

    #[test]
    fn test_resting_member_replaced_from_bench() {
        let mut guild = guild();
        guild.roster[1].resting = true;
        guild.roster.push(Character::new(CharacterId(8), "Tired Scout", Role::Scout, Stats::default(), 12));
        guild.roster[4].resting = true;
        guild.roster.push(Character::new(CharacterId(9), "Reserve Scout", Role::Scout, Stats::default(), 12));

        assert_eq!(guild.lineup(), vec![CharacterId(1), CharacterId(9), CharacterId(3), CharacterId(4)]);
        let party = guild.muster().unwrap();
        assert_eq!(party.members[1].name, "Reserve Scout");
        // the active party itself is untouched
        assert_eq!(guild.active_party[1], CharacterId(2));
    }

    #[test]
    fn test_overfull_snapshot_rejected() {
        let mut guild = guild();
        guild.roster[0].hp = 25;
        assert_eq!(
            guild.muster(),
            Err(ConfigurationError::HpAboveMax { character: CharacterId(1), hp: 25, max_hp: 15 })
        );
        // scoring a party built around validation still cannot underflow
        let party = Party::new(guild.roster.clone());
        assert_eq!(crate::morale::MoraleScore::of(&party).total(), 0);
    }

    #[test]
    fn test_sitting_out_clears_rest() {
        let mut guild = guild();
        guild.roster[0].resting = true;
        guild.roster[3].resting = true;
        assert!(guild.muster().is_err());

        assert_eq!(guild.sit_out(), vec![CharacterId(1), CharacterId(4)]);
        assert!(guild.roster.iter().all(|c| !c.resting));
        assert!(guild.muster().is_ok());
    }

    #[test]
    fn test_scout_falls_back_to_random_member() {
        let mut party = guild().muster().unwrap();
        let mut dice = ScriptedDice::new([1]);
        assert_eq!(party.role_or_random(Role::Scout, &mut dice), Some(1));
        party.members[1].hp = 0;
        assert_eq!(party.role_or_random(Role::Scout, &mut dice), Some(0));
    }

    #[test]
    fn test_absorb_writes_back() {
        let mut guild = guild();
        let mut party = guild.muster().unwrap();
        party.members[2].hp = 3;
        guild.absorb(&party);
        assert_eq!(guild.roster[2].hp, 3);
    }
}
