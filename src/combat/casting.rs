//! Caster turns: pick a spell by priority, roll the check, apply the effect
//!
//! Priority is cure, then heal, then the role's utility (Support buffs,
//! Controller hexes and damage). A caster with nothing worth casting falls
//! back to a basic weapon attack.

use std::cmp::Reverse;

use serde_json::json;

use crate::combat::constants::{MIN_DAMAGE, MIN_SPELL_EFFECT};
use crate::combat::encounter::Encounter;
use crate::combat::resolution::{resolve_spell_check, SpellCheck};
use crate::content::debuffs::{DebuffKind, RollKind};
use crate::content::spells::{Spell, SpellEffect};
use crate::core::error::ResolutionError;
use crate::core::types::Stat;
use crate::dice::Roller;
use crate::events::EventType;

/// Who a chosen spell lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellTarget {
    Ally(usize),
    Allies,
    Enemy(usize),
}

impl<'a, R: Roller> Encounter<'a, R> {
    /// Try to cast. Returns false when no spell is worth casting.
    pub(super) fn caster_turn(&mut self, index: usize) -> Result<bool, ResolutionError> {
        match self.choose_spell(index) {
            Some((spell, target)) => {
                self.cast(index, spell, target)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub(super) fn choose_spell(&self, index: usize) -> Option<(Spell, SpellTarget)> {
        let spells: Vec<Spell> = self.party.members[index].usable_spells().collect();
        if spells.is_empty() {
            return None;
        }
        self.choose_cure(&spells)
            .or_else(|| self.choose_heal(&spells))
            .or_else(|| self.choose_utility(&spells))
    }

    fn choose_cure(&self, spells: &[Spell]) -> Option<(Spell, SpellTarget)> {
        let mut best: Option<((bool, usize), Spell)> = None;
        for ally in self.party.conscious_indices() {
            for debuff in self.party.members[ally].debuffs.iter() {
                let Some(&spell) = spells.iter().find(|s| s.cures().contains(&debuff.kind)) else {
                    continue;
                };
                // poisoned allies first, then roster order
                let key = (debuff.kind != DebuffKind::Poisoned, ally);
                if best.map_or(true, |(current, _)| key < current) {
                    best = Some((key, spell));
                }
            }
        }
        best.map(|((_, ally), spell)| (spell, SpellTarget::Ally(ally)))
    }

    fn choose_heal(&self, spells: &[Spell]) -> Option<(Spell, SpellTarget)> {
        let wounded: Vec<usize> = self
            .party
            .conscious_indices()
            .into_iter()
            .filter(|&i| self.party.members[i].is_wounded())
            .collect();
        let neediest = self.lowest_health(&wounded)?;
        let knows = |pred: fn(&SpellEffect) -> bool| spells.iter().copied().find(|s| pred(&s.effect()));

        if wounded.len() >= 2 {
            if let Some(spell) = knows(|e| matches!(e, SpellEffect::HealAll { .. })) {
                return Some((spell, SpellTarget::Allies));
            }
        }
        if let Some(spell) = knows(|e| matches!(e, SpellEffect::Heal { .. })) {
            return Some((spell, SpellTarget::Ally(neediest)));
        }
        if self.party.members[neediest].boons.regeneration == 0 {
            if let Some(spell) = knows(|e| matches!(e, SpellEffect::Regenerate { .. })) {
                return Some((spell, SpellTarget::Ally(neediest)));
            }
        }
        knows(|e| matches!(e, SpellEffect::HealAll { .. })).map(|spell| (spell, SpellTarget::Allies))
    }

    fn choose_utility(&self, spells: &[Spell]) -> Option<(Spell, SpellTarget)> {
        let allies = self.party.conscious_indices();
        spells.iter().find_map(|&spell| {
            let target = match spell.effect() {
                SpellEffect::Shield => allies
                    .iter()
                    .copied()
                    .filter(|&i| !self.party.members[i].boons.shielded)
                    .min_by_key(|&i| (self.party.members[i].defense(), i))
                    .map(SpellTarget::Ally),
                SpellEffect::DeathWard => {
                    let open: Vec<usize> = allies
                        .iter()
                        .copied()
                        .filter(|&i| !self.party.members[i].boons.death_ward)
                        .collect();
                    self.lowest_health(&open).map(SpellTarget::Ally)
                }
                SpellEffect::Hex { debuff, .. } => self
                    .enemies
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.is_alive() && !e.debuffs.has(debuff))
                    .max_by_key(|&(i, e)| (e.hp, Reverse(i)))
                    .map(|(i, _)| SpellTarget::Enemy(i)),
                SpellEffect::Damage { .. } => self.weakest_enemy().map(SpellTarget::Enemy),
                _ => None,
            };
            target.map(|t| (spell, t))
        })
    }

    /// Lowest current/max HP ratio, ties to roster order
    fn lowest_health(&self, candidates: &[usize]) -> Option<usize> {
        candidates.iter().copied().min_by(|&a, &b| {
            let (ca, cb) = (&self.party.members[a], &self.party.members[b]);
            (ca.hp * cb.max_hp)
                .cmp(&(cb.hp * ca.max_hp))
                .then(a.cmp(&b))
        })
    }

    fn target_name(&self, target: SpellTarget) -> String {
        match target {
            SpellTarget::Ally(i) => self.party.members[i].name.clone(),
            SpellTarget::Allies => "the party".to_string(),
            SpellTarget::Enemy(i) => self.enemies[i].name.clone(),
        }
    }

    pub(super) fn cast(&mut self, index: usize, spell: Spell, target: SpellTarget) -> Result<(), ResolutionError> {
        let dc = self.settings.spell_dc();
        let caster = &mut self.party.members[index];
        let advantage = caster.take_spell_advantage();
        let bonus = caster.roll_bonus(Stat::Wit, RollKind::Spell);
        let caster_name = caster.name.clone();

        let natural = self.dice.roll_with(20, advantage);
        let check = resolve_spell_check(natural, bonus, dc);
        let target_name = self.target_name(target);
        let mut details = json!({
            "caster": caster_name,
            "spell": spell.name(),
            "target": target_name,
            "natural": natural,
            "total": natural as i32 + bonus,
            "dc": dc,
            "enemy": false,
        });

        match check {
            SpellCheck::Fumble | SpellCheck::Failure => {
                let disabled = check == SpellCheck::Fumble;
                if disabled {
                    self.party.members[index].disable_spell(spell);
                }
                details["disabled"] = json!(disabled);
                let description = if disabled {
                    format!("{} botches {} and loses the spell", caster_name, spell)
                } else {
                    format!("{} fails to cast {}", caster_name, spell)
                };
                return self.log.emit(EventType::SpellFail, description, details);
            }
            SpellCheck::Critical => self.party.members[index].boons.next_spell_advantage = true,
            SpellCheck::Success => {}
        }

        details["critical"] = json!(check == SpellCheck::Critical);
        self.log.emit(
            EventType::SpellCast,
            format!("{} casts {} on {}", caster_name, spell, target_name),
            details,
        )?;
        self.apply_spell(index, spell, target)
    }

    fn apply_spell(&mut self, index: usize, spell: Spell, target: SpellTarget) -> Result<(), ResolutionError> {
        let grit = self.party.members[index].modifier(Stat::Grit);
        let luck = self.party.members[index].modifier(Stat::Luck);
        let source = spell.name();

        match (spell.effect(), target) {
            (SpellEffect::Heal { dice: (count, sides) }, SpellTarget::Ally(ally)) => {
                let amount = (self.dice.roll(count, sides) as i32 + grit).max(MIN_SPELL_EFFECT) as u32;
                self.heal_ally(ally, amount, source)
            }
            (SpellEffect::Regenerate { dice: (count, sides) }, SpellTarget::Ally(ally)) => {
                let rounds = (self.dice.roll(count, sides) as i32 + grit).max(MIN_SPELL_EFFECT) as u32;
                self.party.members[ally].boons.regeneration = rounds;
                Ok(())
            }
            (SpellEffect::HealAll { base }, _) => {
                let amount = (base as i32 + grit).max(MIN_SPELL_EFFECT) as u32;
                for ally in self.party.conscious_indices() {
                    self.heal_ally(ally, amount, source)?;
                }
                Ok(())
            }
            (SpellEffect::Shield, SpellTarget::Ally(ally)) => {
                self.party.members[ally].boons.shielded = true;
                Ok(())
            }
            (SpellEffect::DeathWard, SpellTarget::Ally(ally)) => {
                self.party.members[ally].boons.death_ward = true;
                Ok(())
            }
            (SpellEffect::Cure(kinds), SpellTarget::Ally(ally)) => {
                let name = self.party.members[ally].name.clone();
                for &kind in kinds {
                    if self.party.members[ally].debuffs.remove(kind) {
                        self.log.emit(
                            EventType::DebuffExpired,
                            format!("{} is cured of {}", name, kind.name().to_lowercase()),
                            json!({"target": name, "debuff": kind, "cured": true, "source": source, "enemy": false}),
                        )?;
                    }
                }
                Ok(())
            }
            (SpellEffect::Hex { debuff, dice: (count, sides), scales }, SpellTarget::Enemy(foe)) => {
                let bonus = if scales { luck } else { 0 };
                let duration = (self.dice.roll(count, sides) as i32 + bonus).max(MIN_SPELL_EFFECT) as u32;
                self.enemies[foe].debuffs.apply(debuff, duration);
                let name = self.enemies[foe].name.clone();
                self.log.emit(
                    EventType::DebuffApplied,
                    format!("{} is {} for {} rounds", name, debuff.name().to_lowercase(), duration),
                    json!({"debuff": debuff, "duration": duration, "target": name, "source": source, "enemy": true}),
                )
            }
            (SpellEffect::Damage { dice: (count, sides) }, SpellTarget::Enemy(foe)) => {
                let damage = (self.dice.roll(count, sides) as i32 + luck).max(MIN_DAMAGE) as u32;
                let wound = self.enemies[foe].take_damage(damage);
                let attacker = self.party.members[index].name.clone();
                let name = self.enemies[foe].name.clone();
                self.log.emit(
                    EventType::AttackHit,
                    format!("{}'s {} sears {} for {} damage", attacker, source, name, wound.dealt),
                    json!({
                        "attacker": attacker,
                        "target": name,
                        "damage": wound.dealt,
                        "spell": source,
                        "enemy": false,
                        "confused": false,
                    }),
                )?;
                self.after_enemy_wound(foe, wound)
            }
            // choose_spell never pairs an effect with the wrong kind of target
            _ => Ok(()),
        }
    }

    fn heal_ally(&mut self, ally: usize, amount: u32, source: &str) -> Result<(), ResolutionError> {
        let member = &mut self.party.members[ally];
        let healed = member.heal(amount);
        if healed == 0 {
            return Ok(());
        }
        let name = member.name.clone();
        let hp = member.hp;
        self.log.emit(
            EventType::CharacterHealed,
            format!("{} recovers {} HP", name, healed),
            json!({"target": name, "amount": healed, "hp": hp, "source": source}),
        )
    }
}

