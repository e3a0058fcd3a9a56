//! Post-expedition recovery
//!
//! Runs once per guild after a terminal state. Heals the party, rolls for
//! lasting consequences of going down, pays out gold and deals with found
//! items, then writes everything back onto the guild.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::content::loot::MagicItem;
use crate::content::spells::Spell;
use crate::core::config::ExpeditionConfig;
use crate::core::types::{CharacterId, GuildId, Stat, STAT_MIN};
use crate::dice::Roller;
use crate::expedition::ExpeditionReport;
use crate::party::character::{Boons, Character};
use crate::party::guild::Guild;

/// 1d6 at or below this keeps a disabled spell disabled
pub const SPELL_STAYS_DISABLED: u32 = 2;
/// 1d6 on a downed character: 1 maims
pub const MAIMED_ROLL: u32 = 1;
/// 1d6 on a downed character: up to this rests
pub const RESTING_ROLL: u32 = 3;
/// 1d4 on an unidentified item: 1 is cursed
pub const CURSED_ROLL: u32 = 1;

/// Lasting effect of having gone down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownedRecovery {
    /// Permanent stat loss, never below the floor
    Maimed { stat: Stat, before: i32, after: i32 },
    /// Sits out the next expedition
    Resting,
    Recovered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecovery {
    pub id: CharacterId,
    pub name: String,
    pub healed: u32,
    pub spells_restored: Vec<Spell>,
    pub spells_still_disabled: Vec<Spell>,
    /// Set when the character went down at least once
    pub downed: Option<DownedRecovery>,
    pub gold: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemFate {
    Identified,
    Unidentified,
    Cursed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecovery {
    pub name: String,
    pub fate: ItemFate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryReport {
    pub guild_id: GuildId,
    pub characters: Vec<CharacterRecovery>,
    /// Gold paid into the treasury, half the haul plus what was not shared
    pub treasury_deposit: u64,
    pub identification_spent: u64,
    pub items: Vec<ItemRecovery>,
    pub floors_completed: u32,
}

/// Recover `guild` after `report`
pub fn recover(
    guild: &mut Guild,
    report: &ExpeditionReport,
    config: &ExpeditionConfig,
    dice: &mut impl Roller,
) -> RecoveryReport {
    let mut party = report.party.clone();
    let mut downed = Vec::with_capacity(party.len());
    let mut characters: Vec<CharacterRecovery> = party
        .members
        .iter_mut()
        .map(|member| {
            let was_downed = member.downed_this_expedition > 0 || !member.is_conscious();
            downed.push(was_downed);
            heal_character(member, was_downed, dice)
        })
        .collect();

    // benched members are fresh for the next run
    for character in guild.roster.iter_mut() {
        if !party.members.iter().any(|m| m.id == character.id) {
            character.resting = false;
        }
    }

    let deposit = split_gold(report.summary.gold, &mut party.members, &downed, &mut characters);
    guild.treasury += deposit;
    guild.absorb(&party);

    let mut spent = 0;
    let items = report
        .summary
        .items
        .iter()
        .map(|item| {
            let (equipped, fate) = settle_item(item, guild, config, dice);
            if fate == ItemFate::Identified {
                spent += config.identification_cost;
            }
            guild.equipped_items.push(equipped);
            ItemRecovery { name: item.name.clone(), fate }
        })
        .collect();

    if let Some(deepest) = report.summary.deepest_floor() {
        guild.floors_completed = guild.floors_completed.max(deepest);
    }

    info!(
        guild = %guild.id,
        deposit,
        treasury = guild.treasury,
        floors_completed = guild.floors_completed,
        "guild recovered"
    );

    RecoveryReport {
        guild_id: guild.id,
        characters,
        treasury_deposit: deposit,
        identification_spent: spent,
        items,
        floors_completed: guild.floors_completed,
    }
}

fn heal_character(member: &mut Character, was_downed: bool, dice: &mut impl Roller) -> CharacterRecovery {
    let healed = member.missing_hp();
    member.hp = member.max_hp;
    member.debuffs.clear();
    member.boons = Boons::default();

    let mut spells_restored = Vec::new();
    let mut spells_still_disabled = Vec::new();
    for spell in std::mem::take(&mut member.disabled_spells) {
        if dice.d6() <= SPELL_STAYS_DISABLED {
            spells_still_disabled.push(spell);
        } else {
            spells_restored.push(spell);
        }
    }
    member.disabled_spells = spells_still_disabled.iter().copied().collect();

    let downed = was_downed.then(|| match dice.d6() {
        MAIMED_ROLL => {
            let stat = Stat::from_d4(dice.d4());
            let value = member.stats.get_mut(stat);
            let before = *value;
            *value = (before - 1).max(STAT_MIN);
            DownedRecovery::Maimed { stat, before, after: *value }
        }
        roll if roll <= RESTING_ROLL => {
            member.resting = true;
            DownedRecovery::Resting
        }
        _ => DownedRecovery::Recovered,
    });
    member.downed_this_expedition = 0;

    CharacterRecovery {
        id: member.id,
        name: member.name.clone(),
        healed,
        spells_restored,
        spells_still_disabled,
        downed,
        gold: 0,
    }
}

/// Half to the treasury (plus any odd coin), half shared across the party
/// with downed members taking half a share. Returns the treasury deposit.
fn split_gold(
    gold: u64,
    members: &mut [Character],
    downed: &[bool],
    characters: &mut [CharacterRecovery],
) -> u64 {
    let party_pool = gold / 2;
    let mut deposit = gold - party_pool;
    if members.is_empty() {
        return gold;
    }

    let share = party_pool / members.len() as u64;
    let mut distributed = 0;
    for ((member, &was_downed), record) in members.iter_mut().zip(downed).zip(characters.iter_mut()) {
        let amount = if was_downed { share / 2 } else { share };
        member.purse += amount;
        record.gold = amount;
        distributed += amount;
    }
    deposit += party_pool - distributed;
    deposit
}

fn settle_item(
    item: &MagicItem,
    guild: &mut Guild,
    config: &ExpeditionConfig,
    dice: &mut impl Roller,
) -> (MagicItem, ItemFate) {
    let mut item = item.clone();
    if config.identify_items && guild.treasury >= config.identification_cost {
        guild.treasury -= config.identification_cost;
        item.identified = true;
        item.cursed = false;
        return (item, ItemFate::Identified);
    }
    item.cursed = dice.d4() == CURSED_ROLL;
    let fate = if item.cursed { ItemFate::Cursed } else { ItemFate::Unidentified };
    (item, fate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::debuffs::DebuffKind;
    use crate::content::loot::Rarity;
    use crate::core::types::{Role, Stats};
    use crate::dice::ScriptedDice;
    use crate::expedition::{ExpeditionStatus, ExpeditionSummary};

    fn guild() -> Guild {
        let mut guild = Guild::new(GuildId(3), "Ember Wardens");
        for (i, role) in Role::ALL.into_iter().enumerate() {
            let id = CharacterId(i as u32 + 1);
            guild.roster.push(Character::new(id, role.name(), role, Stats::default(), 15));
            guild.active_party.push(id);
        }
        guild
    }

    fn report(guild: &Guild, gold: u64, items: Vec<MagicItem>) -> ExpeditionReport {
        let party = guild.muster().unwrap();
        ExpeditionReport {
            summary: ExpeditionSummary {
                guild_id: guild.id,
                guild_name: guild.name.clone(),
                status: ExpeditionStatus::Retreated,
                start_floor: 1,
                floors_cleared: 1,
                rooms_cleared: 7,
                final_floor: 2,
                final_room: 3,
                gold,
                items,
                enemies_defeated: 9,
                bosses_defeated: 1,
                characters: Vec::new(),
                final_morale: 0,
            },
            party,
            events: Vec::new(),
        }
    }

    #[test]
    fn test_party_is_healed_and_cleansed() {
        let mut guild = guild();
        let mut report = report(&guild, 0, Vec::new());
        report.party.members[1].take_damage(6);
        report.party.members[2].debuffs.apply(DebuffKind::Poisoned, 3);
        report.party.members[3].boons.shielded = true;

        let recovery = recover(&mut guild, &report, &ExpeditionConfig::default(), &mut ScriptedDice::new(Vec::new()));

        assert_eq!(recovery.characters[1].healed, 6);
        for character in &guild.roster {
            assert_eq!(character.hp, character.max_hp);
            assert!(character.debuffs.is_empty());
            assert_eq!(character.boons, Boons::default());
        }
        assert_eq!(guild.floors_completed, 1);
    }

    #[test]
    fn test_gold_split_with_downed_half_share() {
        let mut guild = guild();
        let mut report = report(&guild, 101, Vec::new());
        report.party.members[0].take_damage(99);
        // downed striker recovers on a 5
        let recovery = recover(&mut guild, &report, &ExpeditionConfig::default(), &mut ScriptedDice::new([5]));

        // 51 + (50 - 12 - 12 - 12 - 6)
        assert_eq!(recovery.treasury_deposit, 59);
        assert_eq!(guild.treasury, 59);
        assert_eq!(guild.roster[0].purse, 6);
        assert_eq!(guild.roster[1].purse, 12);
        assert_eq!(recovery.characters[0].downed, Some(DownedRecovery::Recovered));
        assert_eq!(guild.roster[0].downed_this_expedition, 0);
        assert_eq!(guild.roster[0].lifetime_downed, 1);
    }

    #[test]
    fn test_maimed_stat_never_drops_below_floor() {
        let mut guild = guild();
        let mut report = report(&guild, 0, Vec::new());
        report.party.members[0].stats.might = STAT_MIN;
        report.party.members[0].take_damage(99);
        report.party.members[1].take_damage(99);
        // striker: maimed, MIGHT; scout: maimed, LUCK
        let recovery = recover(&mut guild, &report, &ExpeditionConfig::default(), &mut ScriptedDice::new([1, 1, 1, 4]));

        assert_eq!(guild.roster[0].stats.might, STAT_MIN);
        assert_eq!(guild.roster[1].stats.luck, 9);
        assert_eq!(
            recovery.characters[1].downed,
            Some(DownedRecovery::Maimed { stat: Stat::Luck, before: 10, after: 9 })
        );
    }

    #[test]
    fn test_resting_and_bench_return() {
        let mut guild = guild();
        let mut spare = Character::new(CharacterId(9), "Spare", Role::Striker, Stats::default(), 12);
        spare.resting = true;
        guild.roster.push(spare);
        let mut report = report(&guild, 0, Vec::new());
        report.party.members[0].take_damage(99);

        recover(&mut guild, &report, &ExpeditionConfig::default(), &mut ScriptedDice::new([2]));

        assert!(guild.roster[0].resting);
        assert!(!guild.character(CharacterId(9)).unwrap().resting);
    }

    #[test]
    fn test_disabled_spells_roll_to_return() {
        let mut guild = guild();
        let mut report = report(&guild, 0, Vec::new());
        report.party.members[2].disable_spell(Spell::MendWounds);
        report.party.members[3].disable_spell(Spell::PsychicLance);
        let recovery = recover(&mut guild, &report, &ExpeditionConfig::default(), &mut ScriptedDice::new([5, 2]));

        assert_eq!(recovery.characters[2].spells_restored, vec![Spell::MendWounds]);
        assert!(guild.roster[2].can_cast(Spell::MendWounds));
        assert_eq!(recovery.characters[3].spells_still_disabled, vec![Spell::PsychicLance]);
        assert!(!guild.roster[3].can_cast(Spell::PsychicLance));
    }

    #[test]
    fn test_items_identified_while_affordable() {
        let mut guild = guild();
        guild.treasury = 60;
        let items = vec![
            MagicItem::found(Rarity::Rare, 1, 2),
            MagicItem::found(Rarity::Common, 2, 2),
        ];
        let report = report(&guild, 0, items);
        // second item can't be paid for and rolls cursed
        let recovery = recover(&mut guild, &report, &ExpeditionConfig::default(), &mut ScriptedDice::new([1]));

        assert_eq!(recovery.items[0].fate, ItemFate::Identified);
        assert_eq!(recovery.items[1].fate, ItemFate::Cursed);
        assert_eq!(recovery.identification_spent, 50);
        assert_eq!(guild.treasury, 10);
        assert_eq!(guild.equipped_items.len(), 2);
        assert!(guild.equipped_items[0].identified);
        assert!(guild.equipped_items[1].cursed);
    }
}
