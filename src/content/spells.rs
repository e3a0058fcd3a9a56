//! Spell table

use serde::{Deserialize, Serialize};

use crate::content::debuffs::DebuffKind;
use crate::core::types::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spell {
    // Support
    MendWounds,
    Lifebloom,
    SanctuaryPulse,
    WardOfVitality,
    EchoOfHope,
    HearteningHowl,
    SoothingTouch,
    CureAilment,
    // Controller
    SerensTouch,
    VeilOfDelirium,
    ChainsOfStillness,
    HexOfFrailty,
    Mindshatter,
    PhantomBlight,
    DreadfulGaze,
    BlindHex,
    PsychicLance,
}

/// What a successful cast does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellEffect {
    /// Heal one ally for dice + GRIT
    Heal { dice: (u32, u32) },
    /// Heal one ally 1 HP per round for dice + GRIT rounds
    Regenerate { dice: (u32, u32) },
    /// Heal every conscious ally for `base` + GRIT
    HealAll { base: u32 },
    /// +2 defense for the rest of the encounter
    Shield,
    /// The next blow that would down the ally leaves it at 1 HP
    DeathWard,
    /// Remove the listed debuffs from one ally
    Cure(&'static [DebuffKind]),
    /// Apply a debuff to an enemy for dice (+ LUCK when `scales`) rounds
    Hex { debuff: DebuffKind, dice: (u32, u32), scales: bool },
    /// Damage one enemy for dice + LUCK
    Damage { dice: (u32, u32) },
}

impl Spell {
    pub const SUPPORT: [Spell; 8] = [
        Spell::MendWounds,
        Spell::Lifebloom,
        Spell::SanctuaryPulse,
        Spell::WardOfVitality,
        Spell::EchoOfHope,
        Spell::HearteningHowl,
        Spell::SoothingTouch,
        Spell::CureAilment,
    ];

    pub const CONTROLLER: [Spell; 9] = [
        Spell::SerensTouch,
        Spell::VeilOfDelirium,
        Spell::ChainsOfStillness,
        Spell::HexOfFrailty,
        Spell::Mindshatter,
        Spell::PhantomBlight,
        Spell::DreadfulGaze,
        Spell::BlindHex,
        Spell::PsychicLance,
    ];

    /// Spells a role can learn
    pub fn for_role(role: Role) -> &'static [Spell] {
        match role {
            Role::Support => &Self::SUPPORT,
            Role::Controller => &Self::CONTROLLER,
            Role::Striker | Role::Scout => &[],
        }
    }

    /// Spell every new caster of the role starts with
    pub fn starting(role: Role) -> Option<Spell> {
        match role {
            Role::Support => Some(Spell::MendWounds),
            Role::Controller => Some(Spell::PsychicLance),
            Role::Striker | Role::Scout => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Spell::MendWounds => "Mend Wounds",
            Spell::Lifebloom => "Lifebloom",
            Spell::SanctuaryPulse => "Sanctuary Pulse",
            Spell::WardOfVitality => "Ward of Vitality",
            Spell::EchoOfHope => "Echo of Hope",
            Spell::HearteningHowl => "Heartening Howl",
            Spell::SoothingTouch => "Soothing Touch",
            Spell::CureAilment => "Cure Ailment",
            Spell::SerensTouch => "Seren's Touch",
            Spell::VeilOfDelirium => "Veil of Delirium",
            Spell::ChainsOfStillness => "Chains of Stillness",
            Spell::HexOfFrailty => "Hex of Frailty",
            Spell::Mindshatter => "Mindshatter",
            Spell::PhantomBlight => "Phantom Blight",
            Spell::DreadfulGaze => "Dreadful Gaze",
            Spell::BlindHex => "Blind Hex",
            Spell::PsychicLance => "Psychic Lance",
        }
    }

    pub fn effect(&self) -> SpellEffect {
        use DebuffKind::*;
        match self {
            Spell::MendWounds => SpellEffect::Heal { dice: (1, 4) },
            Spell::Lifebloom => SpellEffect::Regenerate { dice: (1, 6) },
            Spell::SanctuaryPulse => SpellEffect::HealAll { base: 1 },
            Spell::WardOfVitality => SpellEffect::Shield,
            Spell::EchoOfHope => SpellEffect::DeathWard,
            Spell::HearteningHowl => SpellEffect::Cure(&[Confused, Frightened]),
            Spell::SoothingTouch => SpellEffect::Cure(&[Poisoned, Cursed]),
            Spell::CureAilment => SpellEffect::Cure(&[Blinded, Slowed]),
            Spell::SerensTouch => SpellEffect::Hex { debuff: Confused, dice: (1, 4), scales: true },
            Spell::VeilOfDelirium => SpellEffect::Hex { debuff: Cursed, dice: (1, 6), scales: true },
            Spell::ChainsOfStillness => SpellEffect::Hex { debuff: Slowed, dice: (1, 4), scales: true },
            Spell::HexOfFrailty => SpellEffect::Hex { debuff: Weakened, dice: (1, 4), scales: true },
            // lasts through the target's next turn
            Spell::Mindshatter => SpellEffect::Hex { debuff: Stunned, dice: (2, 1), scales: false },
            Spell::PhantomBlight => SpellEffect::Hex { debuff: Poisoned, dice: (2, 4), scales: true },
            Spell::DreadfulGaze => SpellEffect::Hex { debuff: Frightened, dice: (1, 4), scales: true },
            Spell::BlindHex => SpellEffect::Hex { debuff: Blinded, dice: (1, 6), scales: true },
            Spell::PsychicLance => SpellEffect::Damage { dice: (1, 4) },
        }
    }

    /// Debuffs this spell removes, if it is a cure
    pub fn cures(&self) -> &'static [DebuffKind] {
        match self.effect() {
            SpellEffect::Cure(kinds) => kinds,
            _ => &[],
        }
    }

    pub fn is_heal(&self) -> bool {
        matches!(
            self.effect(),
            SpellEffect::Heal { .. } | SpellEffect::Regenerate { .. } | SpellEffect::HealAll { .. }
        )
    }
}

impl std::fmt::Display for Spell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
