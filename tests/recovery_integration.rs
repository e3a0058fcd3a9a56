//! Recovery after real expeditions

use guild_delve::core::config::ExpeditionConfig;
use guild_delve::core::types::{CharacterId, GuildId, Role, Stats, STAT_MIN};
use guild_delve::dice::SeededDice;
use guild_delve::expedition::{Expedition, ExpeditionStatus};
use guild_delve::party::{Character, Guild};
use guild_delve::recovery::{recover, DownedRecovery};

fn guild() -> Guild {
    let mut guild = Guild::new(GuildId(2), "Ember Wardens");
    guild.treasury = 25;
    for (i, role) in Role::ALL.into_iter().enumerate() {
        let id = CharacterId(i as u32 + 10);
        guild.roster.push(Character::new(id, role.name(), role, Stats::new(12, 11, 12, 12), 14));
        guild.active_party.push(id);
    }
    guild
}

#[test]
fn test_recovery_restores_hp_and_clears_debuffs() {
    let config = ExpeditionConfig::default();
    for seed in 0..30 {
        let mut guild = guild();
        let mut dice = SeededDice::new(seed);
        let report = Expedition::with_dice(&guild, config.clone(), &mut dice).unwrap().run().unwrap();
        let recovery = recover(&mut guild, &report, &config, &mut dice);

        for character in &guild.roster {
            assert_eq!(character.hp, character.max_hp);
            assert!(character.debuffs.is_empty());
            assert_eq!(character.downed_this_expedition, 0);
            assert!(character.stats.out_of_range().is_none());
        }
        assert_eq!(recovery.characters.len(), 4);
        assert_eq!(guild.equipped_items.len(), report.summary.items.len());

        // gold is conserved between treasury and purses
        let purses: u64 = guild.roster.iter().map(|c| c.purse).sum();
        assert_eq!(
            guild.treasury + recovery.identification_spent,
            25 + recovery.treasury_deposit
        );
        assert_eq!(purses + recovery.treasury_deposit, report.summary.gold);
    }
}

#[test]
fn test_downed_members_roll_consequences() {
    let config = ExpeditionConfig::default();
    let mut saw_downed = false;
    for seed in 0..60 {
        let mut guild = guild();
        let mut dice = SeededDice::new(seed);
        let report = Expedition::with_dice(&guild, config.clone(), &mut dice).unwrap().run().unwrap();
        let recovery = recover(&mut guild, &report, &config, &mut dice);

        for (record, member) in recovery.characters.iter().zip(&report.party.members) {
            let went_down = member.downed_this_expedition > 0 || !member.is_conscious();
            assert_eq!(record.downed.is_some(), went_down);
            let character = guild.character(record.id).unwrap();
            match record.downed {
                Some(DownedRecovery::Maimed { stat, before, after }) => {
                    saw_downed = true;
                    assert_eq!(character.stats.get(stat), after);
                    assert!(after >= STAT_MIN && after >= before - 1);
                }
                Some(DownedRecovery::Resting) => {
                    saw_downed = true;
                    assert!(character.resting);
                }
                Some(DownedRecovery::Recovered) => saw_downed = true,
                None => assert!(!character.resting),
            }
        }
        if report.summary.status == ExpeditionStatus::Wiped {
            assert!(recovery.characters.iter().all(|c| c.downed.is_some()));
        }
    }
    assert!(saw_downed);
}
