//! Enemy archetype and boss ability tables

use serde::{Deserialize, Serialize};

use crate::content::debuffs::DebuffKind;

/// Highest enemy tier. Floors past the last band keep rolling on it.
pub const MAX_TIER: u32 = 5;

/// Enemy difficulty band for a floor: floors 1-2 are tier 1, 3-4 tier 2, ...
pub fn tier_for_floor(floor: u32) -> u32 {
    floor.max(1).div_ceil(2).min(MAX_TIER)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    // Tier 1
    GiantRat,
    Slime,
    GiantBat,
    CaveBeetle,
    // Tier 2
    Skeleton,
    Zombie,
    CarrionCrowSwarm,
    SpittingSpider,
    // Tier 3
    Ghoul,
    ShadowHound,
    VenomousSnake,
    AnimatedArmor,
    // Tier 4
    BoneGolem,
    DireWolf,
    PlagueBear,
    Gargoyle,
    // Tier 5
    Wraith,
    Revenant,
    HellHound,
    StoneTitan,
}

/// Static stat line of an archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeProfile {
    pub name: &'static str,
    pub tier: u32,
    /// Dice added to `5 × level` for hit points, as (count, sides)
    pub hp_dice: (u32, u32),
    /// Damage dice before MIGHT, as (count, sides)
    pub damage_dice: (u32, u32),
    pub ac_modifier: i32,
    /// Debuff applied on a hit when 1d4 rolls 3 or more
    pub on_hit: Option<DebuffKind>,
    /// Casts control hexes instead of attacking when 1d6 rolls 4 or more
    pub caster: bool,
    pub description: &'static str,
}

const fn profile(
    name: &'static str,
    tier: u32,
    ac_modifier: i32,
    on_hit: Option<DebuffKind>,
    caster: bool,
    description: &'static str,
) -> ArchetypeProfile {
    let dice = match tier {
        1 => (1, 4),
        2 => (1, 6),
        3 => (1, 8),
        4 => (2, 4),
        _ => (1, 10),
    };
    ArchetypeProfile {
        name,
        tier,
        hp_dice: dice,
        damage_dice: dice,
        ac_modifier,
        on_hit,
        caster,
        description,
    }
}

impl Archetype {
    pub const ALL: [Archetype; 20] = [
        Archetype::GiantRat,
        Archetype::Slime,
        Archetype::GiantBat,
        Archetype::CaveBeetle,
        Archetype::Skeleton,
        Archetype::Zombie,
        Archetype::CarrionCrowSwarm,
        Archetype::SpittingSpider,
        Archetype::Ghoul,
        Archetype::ShadowHound,
        Archetype::VenomousSnake,
        Archetype::AnimatedArmor,
        Archetype::BoneGolem,
        Archetype::DireWolf,
        Archetype::PlagueBear,
        Archetype::Gargoyle,
        Archetype::Wraith,
        Archetype::Revenant,
        Archetype::HellHound,
        Archetype::StoneTitan,
    ];

    /// Archetype for a tier and a 1d4 roll
    pub fn for_tier(tier: u32, roll: u32) -> Archetype {
        let tier = tier.clamp(1, MAX_TIER) as usize;
        let slot = roll.clamp(1, 4) as usize - 1;
        Self::ALL[(tier - 1) * 4 + slot]
    }

    pub fn profile(&self) -> ArchetypeProfile {
        use DebuffKind::*;
        match self {
            Archetype::GiantRat => profile("Giant Rat", 1, 0, Some(Poisoned), false,
                "A dog-sized rat with venom on its teeth"),
            Archetype::Slime => profile("Slime", 1, -1, Some(Slowed), false,
                "A quivering mass of acidic ooze"),
            Archetype::GiantBat => profile("Giant Bat", 1, 2, None, false,
                "Leathery wings beat somewhere above"),
            Archetype::CaveBeetle => profile("Cave Beetle", 1, 1, None, false,
                "A beetle the size of a shield, clicking its mandibles"),
            Archetype::Skeleton => profile("Skeleton", 2, 2, None, true,
                "Old bones bound by a whispered curse"),
            Archetype::Zombie => profile("Zombie", 2, -1, Some(Weakened), false,
                "A rotting corpse that will not stay down"),
            Archetype::CarrionCrowSwarm => profile("Carrion Crow Swarm", 2, 1, Some(Blinded), false,
                "A shrieking cloud of beaks and feathers"),
            Archetype::SpittingSpider => profile("Spitting Spider", 2, 0, Some(Poisoned), false,
                "A hairy spider that spits venom from the ceiling"),
            Archetype::Ghoul => profile("Ghoul", 3, 0, Some(Stunned), false,
                "Long claws that numb whatever they scratch"),
            Archetype::ShadowHound => profile("Shadow Hound", 3, 1, Some(Frightened), true,
                "A hound that flickers between shadows"),
            Archetype::VenomousSnake => profile("Venomous Snake", 3, 1, Some(Poisoned), false,
                "Iridescent scales and a dripping bite"),
            Archetype::AnimatedArmor => profile("Animated Armor", 3, 2, None, false,
                "An empty suit of plate that still remembers how to fight"),
            Archetype::BoneGolem => profile("Bone Golem", 4, 2, None, false,
                "A lumbering giant stitched from a thousand skeletons"),
            Archetype::DireWolf => profile("Dire Wolf", 4, 0, Some(Frightened), false,
                "A wolf as large as a horse, eyes burning red"),
            Archetype::PlagueBear => profile("Plague Bear", 4, 0, Some(Poisoned), false,
                "A sickly bear weeping pestilence"),
            Archetype::Gargoyle => profile("Gargoyle", 4, 2, None, true,
                "A winged statue that moves when unobserved"),
            Archetype::Wraith => profile("Wraith", 5, 2, Some(Cursed), true,
                "A hooded shade whose touch drains fortune"),
            Archetype::Revenant => profile("Revenant", 5, 0, Some(Stunned), false,
                "A vengeful knight who refuses to die"),
            // Burns are resolved as poison
            Archetype::HellHound => profile("Hell Hound", 5, 0, Some(Poisoned), false,
                "A hound wreathed in smouldering flame"),
            Archetype::StoneTitan => profile("Stone Titan", 5, 2, None, false,
                "A walking cliff face that shakes the floor"),
        }
    }

    pub fn name(&self) -> &'static str {
        self.profile().name
    }

    pub fn tier(&self) -> u32 {
        self.profile().tier
    }
}

/// Single special ability rolled for every boss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossAbility {
    /// +2 damage while at or below half HP
    Rage,
    /// Calls 1d4 minions the first time HP drops to half
    Summon,
    /// +1 to every enemy roll while the boss stands
    Aura,
    /// Heals 1d4 at every round start
    Regenerate,
}

impl BossAbility {
    pub fn from_d4(roll: u32) -> BossAbility {
        match roll {
            1 => BossAbility::Rage,
            2 => BossAbility::Summon,
            3 => BossAbility::Aura,
            _ => BossAbility::Regenerate,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            BossAbility::Rage => "rage",
            BossAbility::Summon => "summon",
            BossAbility::Aura => "aura",
            BossAbility::Regenerate => "regenerate",
        }
    }

    /// Title prefixed to the boss's archetype name
    pub fn title(&self) -> &'static str {
        match self {
            BossAbility::Rage => "Raging",
            BossAbility::Summon => "Summoning",
            BossAbility::Aura => "Dread",
            BossAbility::Regenerate => "Undying",
        }
    }
}

/// Control hexes cast by caster-tagged enemies, in 1d4 order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyHex {
    Chill,
    Terror,
    Befuddle,
    Darkness,
}

impl EnemyHex {
    pub fn from_d4(roll: u32) -> EnemyHex {
        match roll {
            1 => EnemyHex::Chill,
            2 => EnemyHex::Terror,
            3 => EnemyHex::Befuddle,
            _ => EnemyHex::Darkness,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnemyHex::Chill => "Chill",
            EnemyHex::Terror => "Terror",
            EnemyHex::Befuddle => "Befuddle",
            EnemyHex::Darkness => "Darkness",
        }
    }

    pub fn debuff(&self) -> DebuffKind {
        match self {
            EnemyHex::Chill => DebuffKind::Slowed,
            EnemyHex::Terror => DebuffKind::Frightened,
            EnemyHex::Befuddle => DebuffKind::Confused,
            EnemyHex::Darkness => DebuffKind::Blinded,
        }
    }
}
