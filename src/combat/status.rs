//! Round-start status phase
//!
//! Every duration-based effect advances here and nowhere else: debuff
//! durations and recurring damage, party regeneration boons, and boss
//! round-start abilities.

use serde_json::json;

use crate::combat::constants::{REGENERATE_DIE, REGENERATION_PER_ROUND};
use crate::combat::encounter::Encounter;
use crate::content::enemies::BossAbility;
use crate::core::error::ResolutionError;
use crate::dice::Roller;
use crate::events::EventType;
use crate::party::status::StatusChange;

impl<'a, R: Roller> Encounter<'a, R> {
    pub(super) fn round_start(&mut self) -> Result<(), ResolutionError> {
        self.log.beat();
        for index in 0..self.party.len() {
            if self.party.members[index].is_conscious() {
                self.tick_member(index)?;
            }
        }
        for index in 0..self.enemies.len() {
            if self.enemies[index].is_alive() {
                self.tick_enemy(index)?;
            }
        }
        for index in 0..self.enemies.len() {
            if self.enemies[index].is_alive() {
                self.boss_round_start(index)?;
            }
        }
        Ok(())
    }

    fn tick_member(&mut self, index: usize) -> Result<(), ResolutionError> {
        let member = &mut self.party.members[index];
        if member.boons.regeneration > 0 {
            member.boons.regeneration -= 1;
            let healed = member.heal(REGENERATION_PER_ROUND);
            if healed > 0 {
                let name = member.name.clone();
                let hp = member.hp;
                self.log.emit(
                    EventType::CharacterHealed,
                    format!("{} regenerates {} HP", name, healed),
                    json!({"target": name, "amount": healed, "hp": hp, "source": "regeneration"}),
                )?;
            }
        }

        let changes = self.party.members[index].debuffs.tick();
        for change in changes {
            let name = self.party.members[index].name.clone();
            match change {
                StatusChange::Damage { kind, amount } => {
                    let wound = self.party.members[index].take_damage(amount);
                    self.log.emit(
                        EventType::StatusDamage,
                        format!("{} suffers {} damage from {}", name, wound.dealt, kind.name().to_lowercase()),
                        json!({
                            "target": name,
                            "debuff": kind,
                            "damage": wound.dealt,
                            "hp": self.party.members[index].hp,
                            "enemy": false,
                        }),
                    )?;
                    self.after_member_wound(index, wound)?;
                }
                StatusChange::Expired { kind } => {
                    self.log.emit(
                        EventType::DebuffExpired,
                        format!("{} is no longer {}", name, kind.name().to_lowercase()),
                        json!({"target": name, "debuff": kind, "enemy": false}),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn tick_enemy(&mut self, index: usize) -> Result<(), ResolutionError> {
        let changes = self.enemies[index].debuffs.tick();
        for change in changes {
            let name = self.enemies[index].name.clone();
            match change {
                StatusChange::Damage { kind, amount } => {
                    let wound = self.enemies[index].take_damage(amount);
                    self.log.emit(
                        EventType::StatusDamage,
                        format!("{} suffers {} damage from {}", name, wound.dealt, kind.name().to_lowercase()),
                        json!({
                            "target": name,
                            "debuff": kind,
                            "damage": wound.dealt,
                            "hp": self.enemies[index].hp,
                            "enemy": true,
                        }),
                    )?;
                    self.after_enemy_wound(index, wound)?;
                }
                StatusChange::Expired { kind } => {
                    self.log.emit(
                        EventType::DebuffExpired,
                        format!("{} is no longer {}", name, kind.name().to_lowercase()),
                        json!({"target": name, "debuff": kind, "enemy": true}),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn boss_round_start(&mut self, index: usize) -> Result<(), ResolutionError> {
        let name = self.enemies[index].name.clone();
        match self.enemies[index].boss {
            Some(BossAbility::Regenerate) if self.enemies[index].hp < self.enemies[index].max_hp => {
                let amount = self.dice.die(REGENERATE_DIE);
                let healed = self.enemies[index].heal(amount);
                let hp = self.enemies[index].hp;
                self.log.emit(
                    EventType::BossAbilityTriggered,
                    format!("{} knits its wounds, regaining {} HP", name, healed),
                    json!({"enemy": name, "ability": "regenerate", "amount": healed, "hp": hp}),
                )
            }
            Some(BossAbility::Aura) if self.round == 1 => self.log.emit(
                EventType::BossAbilityTriggered,
                format!("{} radiates a dreadful aura", name),
                json!({"enemy": name, "ability": "aura"}),
            ),
            _ => Ok(()),
        }
    }
}
