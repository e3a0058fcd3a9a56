//! Dice service
//!
//! Every random decision in an expedition goes through a [`Roller`]. A run
//! owns exactly one roller, seeded once, so the same seed always produces
//! the same event log.

pub mod notation;

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub use notation::DiceExpr;

/// Advantage state for a d20 check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advantage {
    #[default]
    Normal,
    /// Roll twice, keep the higher
    Advantage,
    /// Roll twice, keep the lower
    Disadvantage,
}

/// Source of die rolls
pub trait Roller {
    /// Roll one die with `sides` faces, returning `1..=sides`.
    ///
    /// A zero-sided die rolls 0 and a one-sided die rolls 1.
    fn die(&mut self, sides: u32) -> u32;

    /// Sum of `count` dice with `sides` faces
    fn roll(&mut self, count: u32, sides: u32) -> u32 {
        (0..count).map(|_| self.die(sides)).sum()
    }

    fn d4(&mut self) -> u32 {
        self.die(4)
    }

    fn d6(&mut self) -> u32 {
        self.die(6)
    }

    fn d20(&mut self) -> u32 {
        self.die(20)
    }

    fn d100(&mut self) -> u32 {
        self.die(100)
    }

    /// Roll one die twice and keep the higher or lower result
    fn roll_with(&mut self, sides: u32, advantage: Advantage) -> u32 {
        match advantage {
            Advantage::Normal => self.die(sides),
            Advantage::Advantage => {
                let (a, b) = (self.die(sides), self.die(sides));
                a.max(b)
            }
            Advantage::Disadvantage => {
                let (a, b) = (self.die(sides), self.die(sides));
                a.min(b)
            }
        }
    }

    /// Uniformly pick an index into a slice of `len` items
    fn pick(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.die(len as u32) as usize - 1)
    }
}

/// Seeded roller backed by ChaCha8
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl Roller for SeededDice {
    fn die(&mut self, sides: u32) -> u32 {
        if sides <= 1 {
            return sides;
        }
        self.rng.gen_range(1..=sides)
    }
}

/// Roller that replays a fixed script of faces before falling back to a seed.
///
/// Scripted faces are clamped into `1..=sides` of whatever die consumes them,
/// so a script entry of 100 on a d20 reads as a natural 20.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    script: VecDeque<u32>,
    fallback: SeededDice,
    consumed: usize,
}

impl ScriptedDice {
    pub fn new(script: impl IntoIterator<Item = u32>) -> Self {
        Self::with_fallback(script, 0)
    }

    pub fn with_fallback(script: impl IntoIterator<Item = u32>, seed: u64) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: SeededDice::new(seed),
            consumed: 0,
        }
    }

    /// Queue more faces after the current script
    pub fn push(&mut self, faces: impl IntoIterator<Item = u32>) {
        self.script.extend(faces);
    }

    /// Scripted faces not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Scripted faces consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl Roller for ScriptedDice {
    fn die(&mut self, sides: u32) -> u32 {
        if sides <= 1 {
            return sides;
        }
        match self.script.pop_front() {
            Some(face) => {
                self.consumed += 1;
                face.clamp(1, sides)
            }
            None => self.fallback.die(sides),
        }
    }
}

impl<R: Roller + ?Sized> Roller for &mut R {
    fn die(&mut self, sides: u32) -> u32 {
        (**self).die(sides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_dice_are_reproducible() {
        let mut a = SeededDice::new(42);
        let mut b = SeededDice::new(42);
        let left: Vec<u32> = (0..50).map(|_| a.d20()).collect();
        let right: Vec<u32> = (0..50).map(|_| b.d20()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_rolls_stay_in_range() {
        let mut dice = SeededDice::new(7);
        for _ in 0..1000 {
            let face = dice.die(6);
            assert!((1..=6).contains(&face));
            let total = dice.roll(2, 4);
            assert!((2..=8).contains(&total));
        }
    }

    #[test]
    fn test_degenerate_dice() {
        let mut dice = SeededDice::new(1);
        assert_eq!(dice.die(0), 0);
        assert_eq!(dice.die(1), 1);
        assert_eq!(dice.pick(0), None);
        assert_eq!(dice.pick(1), Some(0));
    }

    #[test]
    fn test_scripted_dice_replay_then_fall_back() {
        let mut dice = ScriptedDice::new([20, 1, 99]);
        assert_eq!(dice.d20(), 20);
        assert_eq!(dice.d20(), 1);
        // clamped to the die consuming it
        assert_eq!(dice.d6(), 6);
        assert_eq!(dice.consumed(), 3);
        let next = dice.d20();
        assert!((1..=20).contains(&next));
    }

    #[test]
    fn test_advantage_keeps_higher_and_lower() {
        let mut dice = ScriptedDice::new([5, 17, 5, 17]);
        assert_eq!(dice.roll_with(20, Advantage::Advantage), 17);
        assert_eq!(dice.roll_with(20, Advantage::Disadvantage), 5);
    }

    #[test]
    fn test_roller_through_mutable_reference() {
        fn roll_twice(mut dice: impl Roller) -> u32 {
            dice.d4() + dice.d4()
        }
        let mut dice = ScriptedDice::new([3, 4]);
        assert_eq!(roll_twice(&mut dice), 7);
        assert_eq!(dice.remaining(), 0);
    }
}
