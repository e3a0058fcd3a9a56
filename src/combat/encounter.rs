//! Encounter state machine
//!
//! `Init -> RoundStart -> Initiative (once) -> TurnOrder -> RoundEnd`, looping
//! until Victory, Wipe, a between-round Retreat, or the round cap.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::combat::constants::{
    BOSS_SPELL_DC_BONUS, CASTER_TRIGGER, CONFUSION_DIE, HEX_DURATION_DIE, ON_HIT_DURATION_DIE,
    ON_HIT_TRIGGER, SPELL_BASE_DC, SUMMON_DIE,
};
use crate::combat::resolution::{resolve_attack, roll_damage, AttackResult};
use crate::content::debuffs::RollKind;
use crate::content::enemies::{BossAbility, EnemyHex};
use crate::core::error::ResolutionError;
use crate::core::types::Stat;
use crate::dice::Roller;
use crate::dungeon::enemy::{Enemy, EnemyWound, RAGE_DAMAGE_BONUS};
use crate::dungeon::generator::spawn_minions;
use crate::events::{EventLog, EventType};
use crate::morale::{self, CheckKind};
use crate::party::character::Wound;
use crate::party::guild::Party;

/// Per-encounter rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatSettings {
    pub floor: u32,
    pub room: u32,
    pub boss_fight: bool,
    pub max_rounds: u32,
    /// Allow a room morale check between rounds after an ally goes down
    pub morale_checks: bool,
}

impl CombatSettings {
    pub fn spell_dc(&self) -> i32 {
        let boss = if self.boss_fight { BOSS_SPELL_DC_BONUS } else { 0 };
        SPELL_BASE_DC + self.floor as i32 + boss
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    Victory,
    Wipe,
    Retreat,
    Stalemate,
}

impl CombatOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CombatOutcome::Victory => "victory",
            CombatOutcome::Wipe => "wipe",
            CombatOutcome::Retreat => "retreat",
            CombatOutcome::Stalemate => "stalemate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    pub outcome: CombatOutcome,
    pub rounds: u32,
    pub enemies_defeated: u32,
    pub bosses_defeated: u32,
}

/// A slot in the initiative order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combatant {
    Member(usize),
    Enemy(usize),
}

/// Resolve one encounter between the party and `enemies`
pub fn resolve_combat<R: Roller>(
    party: &mut Party,
    enemies: Vec<Enemy>,
    settings: CombatSettings,
    dice: &mut R,
    log: &mut EventLog,
) -> Result<CombatReport, ResolutionError> {
    Encounter::new(party, enemies, settings, dice, log).run()
}

/// Live state of one encounter. Party state is borrowed from the expedition,
/// enemies live and die here.
pub struct Encounter<'a, R: Roller> {
    pub(super) party: &'a mut Party,
    pub(super) enemies: Vec<Enemy>,
    pub(super) dice: &'a mut R,
    pub(super) log: &'a mut EventLog,
    pub(super) settings: CombatSettings,
    pub(super) round: u32,
    pub(super) downs_this_round: u32,
    order: Vec<Combatant>,
    defeated: u32,
    bosses_defeated: u32,
}

impl<'a, R: Roller> Encounter<'a, R> {
    pub fn new(
        party: &'a mut Party,
        enemies: Vec<Enemy>,
        settings: CombatSettings,
        dice: &'a mut R,
        log: &'a mut EventLog,
    ) -> Self {
        Self {
            party,
            enemies,
            dice,
            log,
            settings,
            round: 0,
            downs_this_round: 0,
            order: Vec::new(),
            defeated: 0,
            bosses_defeated: 0,
        }
    }

    pub fn run(mut self) -> Result<CombatReport, ResolutionError> {
        if self.enemies.is_empty() {
            return Err(ResolutionError::EmptyEncounter {
                floor: self.settings.floor,
                room: self.settings.room,
            });
        }
        if self.party.is_wiped() {
            return Err(ResolutionError::NoConsciousMember { action: "fight" });
        }

        self.log.beat();
        self.roll_initiative();
        let initiative: Vec<String> = self.order.iter().map(|&c| self.combatant_name(c)).collect();
        self.log.emit(
            EventType::CombatStart,
            format!("The party engages {} foes", self.enemies.len()),
            json!({
                "floor": self.settings.floor,
                "room": self.settings.room,
                "enemies": self.enemies.len(),
                "boss": self.settings.boss_fight,
                "initiative": initiative,
            }),
        )?;
        for index in 0..self.enemies.len() {
            self.announce_enemy(index)?;
        }

        let outcome = 'rounds: loop {
            if self.round >= self.settings.max_rounds {
                break CombatOutcome::Stalemate;
            }
            self.round += 1;
            self.downs_this_round = 0;

            self.round_start()?;
            if let Some(outcome) = self.finished() {
                break outcome;
            }

            let mut slot = 0;
            while slot < self.order.len() {
                let combatant = self.order[slot];
                slot += 1;
                match combatant {
                    Combatant::Member(index) => self.member_turn(index)?,
                    Combatant::Enemy(index) => self.enemy_turn(index)?,
                }
                if let Some(outcome) = self.finished() {
                    break 'rounds outcome;
                }
            }

            if self.settings.morale_checks && self.downs_this_round > 0 && self.morale_interrupt()? {
                break CombatOutcome::Retreat;
            }
        };

        self.log.beat();
        self.log.emit(
            EventType::CombatEnd,
            format!("Combat ends in {} after {} rounds", outcome.label(), self.round),
            json!({
                "floor": self.settings.floor,
                "room": self.settings.room,
                "outcome": outcome.label(),
                "rounds": self.round,
                "enemies_defeated": self.defeated,
            }),
        )?;
        for member in self.party.members.iter_mut() {
            member.end_encounter();
        }

        tracing::debug!(
            floor = self.settings.floor,
            room = self.settings.room,
            outcome = outcome.label(),
            rounds = self.round,
            "combat resolved"
        );

        Ok(CombatReport {
            outcome,
            rounds: self.round,
            enemies_defeated: self.defeated,
            bosses_defeated: self.bosses_defeated,
        })
    }

    fn roll_initiative(&mut self) {
        let aura = self.aura_active();
        let mut rolls: Vec<(i32, u8, usize, Combatant)> = Vec::new();
        for index in self.party.conscious_indices() {
            let bonus = self.party.members[index].roll_bonus(Stat::Grit, RollKind::Initiative);
            let roll = self.dice.d20() as i32 + bonus;
            rolls.push((roll, 0, index, Combatant::Member(index)));
        }
        for index in 0..self.enemies.len() {
            let bonus = self.enemies[index].initiative_bonus(aura);
            let roll = self.dice.d20() as i32 + bonus;
            rolls.push((roll, 1, index, Combatant::Enemy(index)));
        }
        // ties: party first, then roster / spawn order
        rolls.sort_by_key(|&(roll, side, index, _)| (Reverse(roll), side, index));
        self.order = rolls.into_iter().map(|(_, _, _, c)| c).collect();
    }

    fn finished(&self) -> Option<CombatOutcome> {
        if self.party.is_wiped() {
            Some(CombatOutcome::Wipe)
        } else if self.enemies.iter().all(|e| !e.is_alive()) {
            Some(CombatOutcome::Victory)
        } else {
            None
        }
    }

    pub(super) fn aura_active(&self) -> bool {
        self.enemies
            .iter()
            .any(|e| e.is_alive() && e.has_ability(BossAbility::Aura))
    }

    fn combatant_name(&self, combatant: Combatant) -> String {
        match combatant {
            Combatant::Member(index) => self.party.members[index].name.clone(),
            Combatant::Enemy(index) => self.enemies[index].name.clone(),
        }
    }

    pub(super) fn weakest_enemy(&self) -> Option<usize> {
        self.enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_alive())
            .min_by_key(|&(index, e)| (e.hp, index))
            .map(|(index, _)| index)
    }

    fn announce_enemy(&mut self, index: usize) -> Result<(), ResolutionError> {
        let enemy = &self.enemies[index];
        let description = match enemy.boss {
            Some(_) => format!("{} rises to guard the lair", enemy.name),
            None => format!("{} appears. {}", enemy.name, enemy.archetype.profile().description),
        };
        let details = json!({
            "enemy": enemy.name,
            "is_boss": enemy.is_boss(),
            "archetype": enemy.archetype,
            "tier": enemy.tier,
            "hp": enemy.hp,
            "ac": enemy.ac(),
            "ability": enemy.boss.map(|a| a.key()),
        });
        self.log.emit(EventType::EnemyAppears, description, details)
    }

    /// Follow-up events once damage has landed on a party member
    pub(super) fn after_member_wound(&mut self, index: usize, wound: Wound) -> Result<(), ResolutionError> {
        if wound.downed {
            self.downs_this_round += 1;
            let member = &self.party.members[index];
            self.log.emit(
                EventType::CharacterUnconscious,
                format!("{} collapses", member.name),
                json!({
                    "target": member.name,
                    "times_downed": member.downed_this_expedition,
                }),
            )?;
        }
        Ok(())
    }

    /// Follow-up events once damage has landed on an enemy
    pub(super) fn after_enemy_wound(&mut self, index: usize, wound: EnemyWound) -> Result<(), ResolutionError> {
        if wound.killed {
            let enemy = &self.enemies[index];
            self.defeated += 1;
            if enemy.is_boss() {
                self.bosses_defeated += 1;
            }
            self.log.emit(
                EventType::EnemyDefeated,
                format!("{} is defeated", enemy.name),
                json!({"enemy": enemy.name, "is_boss": enemy.is_boss()}),
            )?;
        } else if wound.bloodied_now {
            self.on_bloodied(index)?;
        }
        Ok(())
    }

    /// Half-HP edge for bosses
    fn on_bloodied(&mut self, index: usize) -> Result<(), ResolutionError> {
        let name = self.enemies[index].name.clone();
        match self.enemies[index].boss {
            Some(BossAbility::Rage) => self.log.emit(
                EventType::BossAbilityTriggered,
                format!("{} flies into a rage", name),
                json!({"enemy": name, "ability": "rage", "bonus": RAGE_DAMAGE_BONUS}),
            ),
            Some(BossAbility::Summon) => {
                let count = self.dice.die(SUMMON_DIE);
                let minions = spawn_minions(count, self.settings.floor, &self.enemies, &mut *self.dice);
                self.log.emit(
                    EventType::BossAbilityTriggered,
                    format!("{} calls {} minions to its side", name, count),
                    json!({"enemy": name, "ability": "summon", "count": count}),
                )?;
                for minion in minions {
                    self.enemies.push(minion);
                    let spawned = self.enemies.len() - 1;
                    self.order.push(Combatant::Enemy(spawned));
                    self.announce_enemy(spawned)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn member_turn(&mut self, index: usize) -> Result<(), ResolutionError> {
        if !self.party.members[index].is_conscious() {
            return Ok(());
        }
        self.log.beat();
        let name = self.party.members[index].name.clone();

        if self.party.members[index].debuffs.skips_turn() {
            return self.log.emit(
                EventType::AttackMiss,
                format!("{} is stunned and loses the turn", name),
                json!({"attacker": name, "stunned": true, "enemy": false}),
            );
        }
        if self.party.members[index].debuffs.confused() && self.dice.die(CONFUSION_DIE) == 1 {
            return self.member_confused_strike(index);
        }
        if self.party.members[index].role.is_caster() && self.caster_turn(index)? {
            return Ok(());
        }
        self.weapon_attack(index)
    }

    fn member_confused_strike(&mut self, index: usize) -> Result<(), ResolutionError> {
        let attacker = self.party.members[index].name.clone();
        let others: Vec<usize> = self
            .party
            .conscious_indices()
            .into_iter()
            .filter(|&i| i != index)
            .collect();
        let Some(pick) = self.dice.pick(others.len()) else {
            return self.log.emit(
                EventType::AttackMiss,
                format!("{} swings wildly at nothing", attacker),
                json!({"attacker": attacker, "confused": true, "enemy": false}),
            );
        };
        let target = others[pick];
        let die = self.party.members[index].role.weapon_die();
        let modifier = self.party.members[index].modifier(Stat::Might);
        let damage = roll_damage(AttackResult::Hit, (1, die), modifier, &mut *self.dice);
        let wound = self.party.members[target].take_damage(damage as u32);
        let target_name = self.party.members[target].name.clone();
        self.log.emit(
            EventType::AttackHit,
            format!("{} lashes out at {} in confusion for {} damage", attacker, target_name, wound.dealt),
            json!({
                "attacker": attacker,
                "target": target_name,
                "damage": wound.dealt,
                "enemy": false,
                "confused": true,
                "warded": wound.warded,
            }),
        )?;
        self.after_member_wound(target, wound)
    }

    pub(super) fn weapon_attack(&mut self, index: usize) -> Result<(), ResolutionError> {
        let Some(target) = self.weakest_enemy() else {
            return Ok(());
        };
        let member = &mut self.party.members[index];
        let advantage = member.take_advantage();
        let bonus = member.roll_bonus(Stat::Might, RollKind::Attack);
        let modifier = member.modifier(Stat::Might);
        let die = member.role.weapon_die();
        let attacker = member.name.clone();

        let natural = self.dice.roll_with(20, advantage);
        let ac = self.enemies[target].ac();
        let result = resolve_attack(natural, bonus, ac);
        let damage = roll_damage(result, (1, die), modifier, &mut *self.dice);
        let target_name = self.enemies[target].name.clone();
        let total = natural as i32 + bonus;

        if result == AttackResult::Miss {
            return self.log.emit(
                EventType::AttackMiss,
                format!("{} misses {}", attacker, target_name),
                json!({
                    "attacker": attacker,
                    "target": target_name,
                    "natural": natural,
                    "total": total,
                    "target_ac": ac,
                    "enemy": false,
                }),
            );
        }

        let wound = self.enemies[target].take_damage(damage as u32);
        let (event_type, verb) = match result {
            AttackResult::Critical => (EventType::AttackCritical, "critically strikes"),
            _ => (EventType::AttackHit, "hits"),
        };
        self.log.emit(
            event_type,
            format!("{} {} {} for {} damage", attacker, verb, target_name, wound.dealt),
            json!({
                "attacker": attacker,
                "target": target_name,
                "damage": wound.dealt,
                "natural": natural,
                "total": total,
                "target_ac": ac,
                "enemy": false,
                "confused": false,
            }),
        )?;
        self.after_enemy_wound(target, wound)
    }

    fn enemy_turn(&mut self, index: usize) -> Result<(), ResolutionError> {
        if !self.enemies[index].is_alive() {
            return Ok(());
        }
        self.log.beat();
        let name = self.enemies[index].name.clone();

        if self.enemies[index].debuffs.skips_turn() {
            return self.log.emit(
                EventType::AttackMiss,
                format!("{} is stunned and loses the turn", name),
                json!({"attacker": name, "stunned": true, "enemy": true}),
            );
        }
        if self.enemies[index].debuffs.confused() && self.dice.die(CONFUSION_DIE) == 1 {
            return self.enemy_confused_strike(index);
        }
        if self.enemies[index].caster && self.dice.d6() >= CASTER_TRIGGER {
            return self.enemy_hex(index);
        }
        self.enemy_attack(index)
    }

    fn enemy_confused_strike(&mut self, index: usize) -> Result<(), ResolutionError> {
        let attacker = self.enemies[index].name.clone();
        let others: Vec<usize> = (0..self.enemies.len())
            .filter(|&i| i != index && self.enemies[i].is_alive())
            .collect();
        let Some(pick) = self.dice.pick(others.len()) else {
            return self.log.emit(
                EventType::AttackMiss,
                format!("{} thrashes at empty air", attacker),
                json!({"attacker": attacker, "confused": true, "enemy": true}),
            );
        };
        let target = others[pick];
        let damage_dice = self.enemies[index].damage_dice;
        let modifier = self.enemies[index].damage_modifier();
        let damage = roll_damage(AttackResult::Hit, damage_dice, modifier, &mut *self.dice);
        let wound = self.enemies[target].take_damage(damage as u32);
        let target_name = self.enemies[target].name.clone();
        self.log.emit(
            EventType::AttackHit,
            format!("{} turns on {} for {} damage", attacker, target_name, wound.dealt),
            json!({
                "attacker": attacker,
                "target": target_name,
                "damage": wound.dealt,
                "enemy": true,
                "confused": true,
            }),
        )?;
        self.after_enemy_wound(target, wound)
    }

    fn enemy_hex(&mut self, index: usize) -> Result<(), ResolutionError> {
        let target = self
            .party
            .random_conscious(&mut *self.dice)
            .ok_or(ResolutionError::NoConsciousMember { action: "hex" })?;
        let hex = EnemyHex::from_d4(self.dice.d4());
        let duration = self.dice.die(HEX_DURATION_DIE);
        let debuff = hex.debuff();
        self.party.members[target].debuffs.apply(debuff, duration);

        let caster = self.enemies[index].name.clone();
        let target_name = self.party.members[target].name.clone();
        self.log.emit(
            EventType::SpellCast,
            format!("{} casts {} on {}", caster, hex.name(), target_name),
            json!({"caster": caster, "spell": hex.name(), "target": target_name, "enemy": true}),
        )?;
        self.log.emit(
            EventType::DebuffApplied,
            format!("{} is {} for {} rounds", target_name, debuff.name().to_lowercase(), duration),
            json!({"debuff": debuff, "duration": duration, "target": target_name, "source": caster}),
        )
    }

    fn enemy_attack(&mut self, index: usize) -> Result<(), ResolutionError> {
        let target = self
            .party
            .random_conscious(&mut *self.dice)
            .ok_or(ResolutionError::NoConsciousMember { action: "attack" })?;
        let aura = self.aura_active();
        let enemy = &self.enemies[index];
        let bonus = enemy.attack_bonus(aura);
        let modifier = enemy.damage_modifier();
        let damage_dice = enemy.damage_dice;
        let on_hit = enemy.on_hit;
        let attacker = enemy.name.clone();

        let natural = self.dice.d20();
        let defense = self.party.members[target].defense();
        let result = resolve_attack(natural, bonus, defense);
        let damage = roll_damage(result, damage_dice, modifier, &mut *self.dice);
        let target_name = self.party.members[target].name.clone();
        let total = natural as i32 + bonus;

        if result == AttackResult::Miss {
            return self.log.emit(
                EventType::AttackMiss,
                format!("{} misses {}", attacker, target_name),
                json!({
                    "attacker": attacker,
                    "target": target_name,
                    "natural": natural,
                    "total": total,
                    "target_ac": defense,
                    "enemy": true,
                }),
            );
        }

        let wound = self.party.members[target].take_damage(damage as u32);
        let (event_type, verb) = match result {
            AttackResult::Critical => (EventType::AttackCritical, "critically strikes"),
            _ => (EventType::AttackHit, "hits"),
        };
        self.log.emit(
            event_type,
            format!("{} {} {} for {} damage", attacker, verb, target_name, wound.dealt),
            json!({
                "attacker": attacker,
                "target": target_name,
                "damage": wound.dealt,
                "natural": natural,
                "total": total,
                "target_ac": defense,
                "enemy": true,
                "confused": false,
                "warded": wound.warded,
            }),
        )?;
        self.after_member_wound(target, wound)?;

        if let Some(debuff) = on_hit {
            if self.party.members[target].is_conscious() && self.dice.d4() >= ON_HIT_TRIGGER {
                let duration = self.dice.die(ON_HIT_DURATION_DIE);
                self.party.members[target].debuffs.apply(debuff, duration);
                self.log.emit(
                    EventType::DebuffApplied,
                    format!("{} is {} for {} rounds", target_name, debuff.name().to_lowercase(), duration),
                    json!({"debuff": debuff, "duration": duration, "target": target_name, "source": attacker}),
                )?;
            }
        }
        Ok(())
    }

    fn morale_interrupt(&mut self) -> Result<bool, ResolutionError> {
        self.log.beat();
        let check = morale::check(&*self.party, CheckKind::Room, &mut *self.dice);
        self.log.emit(
            EventType::MoraleCheck,
            if check.retreat {
                format!("Morale breaks mid-fight (rolled {} under {})", check.roll, check.total())
            } else {
                format!("The party holds its nerve (rolled {} against {})", check.roll, check.total())
            },
            json!({
                "kind": check.kind,
                "roll": check.roll,
                "morale": check.total(),
                "retreat": check.retreat,
                "during_combat": true,
                "round": self.round,
            }),
        )?;
        Ok(check.retreat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::debuffs::DebuffKind;
    use crate::content::enemies::Archetype;
    use crate::content::spells::Spell;
    use crate::core::types::{CharacterId, GuildId, Role, Stats};
    use crate::dice::ScriptedDice;
    use crate::party::character::Character;

    fn settings(max_rounds: u32) -> CombatSettings {
        CombatSettings { floor: 1, room: 1, boss_fight: false, max_rounds, morale_checks: true }
    }

    fn member(id: u32, role: Role, hp: u32) -> Character {
        Character::new(CharacterId(id), format!("Hero {}", id), role, Stats::default(), hp)
    }

    /// AC 10, no MIGHT, no specials
    fn dummy(hp: u32) -> Enemy {
        let mut enemy = Enemy::spawn(Archetype::GiantBat, 1, 1, &mut ScriptedDice::new([1]));
        enemy.hp = hp;
        enemy.max_hp = hp;
        enemy.base_ac = 10;
        enemy.might = 0;
        enemy.on_hit = None;
        enemy.caster = false;
        enemy
    }

    fn log() -> EventLog {
        EventLog::new(GuildId(1), "Test Company")
    }

    #[test]
    fn test_single_blow_victory() {
        let mut party = Party::new(vec![member(1, Role::Striker, 20)]);
        // initiative 15 / 5, attack 12 + 3 vs 10, damage 4 + 3
        let mut dice = ScriptedDice::new([15, 5, 12, 4]);
        let mut log = log();
        let report = resolve_combat(&mut party, vec![dummy(5)], settings(20), &mut dice, &mut log).unwrap();

        assert_eq!(report.outcome, CombatOutcome::Victory);
        assert_eq!(report.rounds, 1);
        assert_eq!(report.enemies_defeated, 1);
        assert_eq!(log.count(EventType::CombatStart), 1);
        assert_eq!(log.count(EventType::EnemyDefeated), 1);
        assert_eq!(log.count(EventType::CombatEnd), 1);
        let hit = log.of_type(EventType::AttackHit).next().unwrap();
        assert_eq!(hit.detail("damage"), Some(&json!(5)));
        assert_eq!(hit.detail("natural"), Some(&json!(12)));
    }

    #[test]
    fn test_round_cap_is_a_stalemate() {
        let mut party = Party::new(vec![member(1, Role::Striker, 20)]);
        let mut dice = ScriptedDice::new([15, 5, 1, 1]);
        let mut log = log();
        let report = resolve_combat(&mut party, vec![dummy(5)], settings(1), &mut dice, &mut log).unwrap();

        assert_eq!(report.outcome, CombatOutcome::Stalemate);
        assert_eq!(report.rounds, 1);
        assert_eq!(log.count(EventType::AttackMiss), 2);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_last_member_down_is_a_wipe() {
        let mut party = Party::new(vec![member(1, Role::Striker, 1)]);
        // enemy acts first: 15 vs defense 13, 1d4 damage
        let mut dice = ScriptedDice::new([5, 15, 15, 3]);
        let mut log = log();
        let report = resolve_combat(&mut party, vec![dummy(5)], settings(20), &mut dice, &mut log).unwrap();

        assert_eq!(report.outcome, CombatOutcome::Wipe);
        assert_eq!(log.count(EventType::CharacterUnconscious), 1);
        assert_eq!(party.members[0].downed_this_expedition, 1);
        assert_eq!(party.members[0].lifetime_downed, 1);
    }

    #[test]
    fn test_stunned_enemy_loses_turn() {
        let mut party = Party::new(vec![member(1, Role::Striker, 20)]);
        let mut enemy = dummy(5);
        enemy.debuffs.apply(DebuffKind::Stunned, 2);
        let mut dice = ScriptedDice::new([15, 5, 1]);
        let mut log = log();
        resolve_combat(&mut party, vec![enemy], settings(1), &mut dice, &mut log).unwrap();

        let stunned = log
            .of_type(EventType::AttackMiss)
            .find(|e| e.detail("stunned") == Some(&json!(true)))
            .unwrap();
        assert_eq!(stunned.detail("enemy"), Some(&json!(true)));
    }

    #[test]
    fn test_one_round_stun_from_before_combat_is_spent_by_the_first_tick() {
        let mut striker = member(1, Role::Striker, 20);
        striker.debuffs.apply(DebuffKind::Stunned, 1);
        let mut party = Party::new(vec![striker]);
        // the round 1 tick removes the stun before the striker acts
        let mut dice = ScriptedDice::new([15, 5, 12, 4]);
        let mut log = log();
        let report = resolve_combat(&mut party, vec![dummy(5)], settings(20), &mut dice, &mut log).unwrap();

        assert_eq!(report.outcome, CombatOutcome::Victory);
        assert_eq!(log.count(EventType::DebuffExpired), 1);
        assert!(log.of_type(EventType::AttackMiss).all(|e| e.detail("stunned").is_none()));
    }

    #[test]
    fn test_two_round_stun_costs_one_turn() {
        let mut striker = member(1, Role::Striker, 20);
        striker.debuffs.apply(DebuffKind::Stunned, 2);
        let mut party = Party::new(vec![striker]);
        // round 1: striker stunned, dummy fumbles; round 2: stun expires, striker kills
        let mut dice = ScriptedDice::new([15, 5, 1, 12, 4]);
        let mut log = log();
        let report = resolve_combat(&mut party, vec![dummy(5)], settings(20), &mut dice, &mut log).unwrap();

        assert_eq!(report.outcome, CombatOutcome::Victory);
        assert_eq!(report.rounds, 2);
        let lost: Vec<_> = log
            .of_type(EventType::AttackMiss)
            .filter(|e| e.detail("stunned") == Some(&json!(true)))
            .collect();
        assert_eq!(lost.len(), 1);
        assert_eq!(lost[0].detail("enemy"), Some(&json!(false)));
        assert_eq!(log.count(EventType::DebuffExpired), 1);
    }

    #[test]
    fn test_poison_ticks_at_round_start() {
        let mut striker = member(1, Role::Striker, 20);
        striker.debuffs.apply(DebuffKind::Poisoned, 1);
        let mut party = Party::new(vec![striker]);
        let mut dice = ScriptedDice::new([15, 5, 1, 1]);
        let mut log = log();
        resolve_combat(&mut party, vec![dummy(5)], settings(1), &mut dice, &mut log).unwrap();

        assert_eq!(log.count(EventType::StatusDamage), 1);
        assert_eq!(log.count(EventType::DebuffExpired), 1);
        assert_eq!(party.members[0].hp, 19);
        assert!(party.members[0].debuffs.is_empty());
    }

    #[test]
    fn test_controller_opens_with_psychic_lance() {
        let mut party = Party::new(vec![member(1, Role::Controller, 12)]);
        // spell check 10 + 3 vs DC 11, damage 2 + LUCK 3
        let mut dice = ScriptedDice::new([15, 5, 10, 2]);
        let mut log = log();
        let report = resolve_combat(&mut party, vec![dummy(5)], settings(20), &mut dice, &mut log).unwrap();

        assert_eq!(report.outcome, CombatOutcome::Victory);
        let cast = log.of_type(EventType::SpellCast).next().unwrap();
        assert_eq!(cast.detail("spell"), Some(&json!("Psychic Lance")));
        assert_eq!(cast.detail("dc"), Some(&json!(11)));
    }

    #[test]
    fn test_spell_fumble_disables_spell() {
        let mut party = Party::new(vec![member(1, Role::Controller, 12)]);
        let mut dice = ScriptedDice::new([15, 5, 1, 1]);
        let mut log = log();
        resolve_combat(&mut party, vec![dummy(5)], settings(1), &mut dice, &mut log).unwrap();

        let fail = log.of_type(EventType::SpellFail).next().unwrap();
        assert_eq!(fail.detail("disabled"), Some(&json!(true)));
        assert!(party.members[0].disabled_spells.contains(&Spell::PsychicLance));
        assert!(!party.members[0].can_cast(Spell::PsychicLance));
    }

    #[test]
    fn test_down_mid_fight_triggers_morale_retreat() {
        let mut party = Party::new(vec![member(1, Role::Striker, 20), member(2, Role::Scout, 1)]);
        // enemy picks the scout and drops it, striker misses, morale 31 vs roll 5
        let mut dice = ScriptedDice::new([5, 5, 15, 2, 15, 4, 1, 5]);
        let mut log = log();
        let report = resolve_combat(&mut party, vec![dummy(30)], settings(20), &mut dice, &mut log).unwrap();

        assert_eq!(report.outcome, CombatOutcome::Retreat);
        let check = log.of_type(EventType::MoraleCheck).next().unwrap();
        assert_eq!(check.detail("during_combat"), Some(&json!(true)));
        assert_eq!(check.detail("morale"), Some(&json!(31)));
    }

    #[test]
    fn test_summon_on_bloodied_joins_initiative() {
        let mut party = Party::new(vec![member(1, Role::Striker, 20)]);
        let mut boss = dummy(10);
        boss.name = "Summoning Giant Bat".to_string();
        boss.boss = Some(BossAbility::Summon);
        // hit for 5 -> bloodied; summon 1 Giant Bat with 2 HP dice; both miss
        let mut dice = ScriptedDice::new([15, 5, 12, 2, 1, 3, 2, 1, 1]);
        let mut log = log();
        let report = resolve_combat(&mut party, vec![boss], settings(1), &mut dice, &mut log).unwrap();

        assert_eq!(report.outcome, CombatOutcome::Stalemate);
        assert_eq!(log.count(EventType::BossAbilityTriggered), 1);
        assert_eq!(log.count(EventType::EnemyAppears), 2);
        let summoned = log.of_type(EventType::EnemyAppears).nth(1).unwrap();
        assert_eq!(summoned.detail("enemy"), Some(&json!("Giant Bat 1")));
        assert_eq!(log.count(EventType::AttackMiss), 2);
    }

    #[test]
    fn test_empty_encounter_is_an_error() {
        let mut party = Party::new(vec![member(1, Role::Striker, 20)]);
        let mut dice = ScriptedDice::new(Vec::new());
        let mut log = log();
        let err = resolve_combat(&mut party, Vec::new(), settings(20), &mut dice, &mut log).unwrap_err();
        assert_eq!(err, ResolutionError::EmptyEncounter { floor: 1, room: 1 });
    }
}
