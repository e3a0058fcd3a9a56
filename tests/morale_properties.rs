//! Property tests for morale scoring and dice bounds

use guild_delve::content::spells::Spell;
use guild_delve::core::types::{CharacterId, Role, Stats};
use guild_delve::dice::notation::DiceExpr;
use guild_delve::dice::SeededDice;
use guild_delve::morale::{retreat_probability, CheckKind, MoraleScore};
use guild_delve::party::{Character, Party};
use proptest::prelude::*;

fn party(hp: [u32; 4]) -> Party {
    Party::new(
        Role::ALL
            .into_iter()
            .zip(hp)
            .enumerate()
            .map(|(i, (role, hp))| {
                let mut c = Character::new(CharacterId(i as u32), role.name(), role, Stats::default(), 20);
                c.hp = hp;
                c
            })
            .collect(),
    )
}

proptest! {
    #[test]
    fn more_missing_hp_never_lowers_score(hp in prop::array::uniform4(1u32..=20), who in 0usize..4, loss in 1u32..=19) {
        let before = MoraleScore::of(&party(hp)).total();
        let mut hurt = hp;
        hurt[who] = hurt[who].saturating_sub(loss).max(1);
        let after = MoraleScore::of(&party(hurt)).total();
        prop_assert!(after >= before);
    }

    #[test]
    fn disabled_spells_raise_score(hp in prop::array::uniform4(1u32..=20)) {
        let healthy = party(hp);
        let mut hexed = healthy.clone();
        hexed.members[2].disable_spell(Spell::MendWounds);
        prop_assert!(MoraleScore::of(&hexed).total() > MoraleScore::of(&healthy).total());
    }

    #[test]
    fn downing_an_ally_raises_score(hp in prop::array::uniform4(1u32..=20), who in 0usize..4) {
        let healthy = party(hp);
        let mut downed = healthy.clone();
        downed.members[who].take_damage(100);
        prop_assert!(MoraleScore::of(&downed).total() > MoraleScore::of(&healthy).total());
    }

    #[test]
    fn retreat_probability_is_monotone(a in 0u32..300, b in 0u32..300) {
        let (lo, hi) = (a.min(b), a.max(b));
        for kind in [CheckKind::Room, CheckKind::Floor] {
            let p_lo = retreat_probability(lo, kind);
            let p_hi = retreat_probability(hi, kind);
            prop_assert!(p_lo <= p_hi);
            prop_assert!((0.0..=1.0).contains(&p_hi));
        }
        prop_assert!(retreat_probability(hi, CheckKind::Floor) >= retreat_probability(hi, CheckKind::Room));
    }

    #[test]
    fn dice_rolls_stay_in_bounds(count in 1u32..=6, sides in 2u32..=20, modifier in -5i32..=5, seed in any::<u64>()) {
        let expr = DiceExpr::new(count, sides, modifier).unwrap();
        let mut dice = SeededDice::new(seed);
        for _ in 0..16 {
            let total = expr.roll(&mut dice);
            prop_assert!((expr.min()..=expr.max()).contains(&total));
        }
        let parsed: DiceExpr = expr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, expr);
    }
}
