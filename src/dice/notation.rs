//! `XdY+Z` dice notation

use std::fmt;
use std::str::FromStr;

use nom::{
    character::complete::{digit1, multispace0, one_of},
    combinator::{all_consuming, map_res, opt},
    IResult, Parser,
};
use serde::{Deserialize, Serialize};

use crate::core::error::DiceError;
use crate::dice::Roller;

/// A validated dice expression such as `2d6+1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDiceExpr")]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

/// Unchecked wire form, validated through `DiceExpr::new`
#[derive(Deserialize)]
struct RawDiceExpr {
    count: u32,
    sides: u32,
    #[serde(default)]
    modifier: i32,
}

impl TryFrom<RawDiceExpr> for DiceExpr {
    type Error = DiceError;

    fn try_from(raw: RawDiceExpr) -> Result<Self, Self::Error> {
        DiceExpr::new(raw.count, raw.sides, raw.modifier)
    }
}

/// Clamp a wide total into `i32`
fn narrow(total: i64) -> i32 {
    i32::try_from(total).unwrap_or(if total < 0 { i32::MIN } else { i32::MAX })
}

impl DiceExpr {
    /// Build an expression, rejecting zero dice, dice with fewer than two
    /// sides and totals that do not fit an `i32`
    pub fn new(count: u32, sides: u32, modifier: i32) -> Result<Self, DiceError> {
        if count == 0 {
            return Err(DiceError::NoDice);
        }
        if sides < 2 {
            return Err(DiceError::TooFewSides(sides));
        }
        let expr = Self { count, sides, modifier };
        if expr.wide_max() > i64::from(i32::MAX) || expr.wide_min() < i64::from(i32::MIN) {
            return Err(DiceError::OutOfRange(expr.to_string()));
        }
        Ok(expr)
    }

    fn wide_min(&self) -> i64 {
        i64::from(self.count) + i64::from(self.modifier)
    }

    fn wide_max(&self) -> i64 {
        i64::from(self.count) * i64::from(self.sides) + i64::from(self.modifier)
    }

    pub fn roll(&self, dice: &mut impl Roller) -> i32 {
        let total: i64 = (0..self.count).map(|_| i64::from(dice.die(self.sides))).sum();
        narrow(total + i64::from(self.modifier))
    }

    /// Roll every die separately, returning the faces and the total
    pub fn roll_detailed(&self, dice: &mut impl Roller) -> (Vec<u32>, i32) {
        let faces: Vec<u32> = (0..self.count).map(|_| dice.die(self.sides)).collect();
        let total = faces.iter().map(|&f| i64::from(f)).sum::<i64>() + i64::from(self.modifier);
        (faces, narrow(total))
    }

    pub fn min(&self) -> i32 {
        narrow(self.wide_min())
    }

    pub fn max(&self) -> i32 {
        narrow(self.wide_max())
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{}", m),
            m => write!(f, "{}", m),
        }
    }
}

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, (count, sides, modifier)) = all_consuming(expression)
            .parse(s)
            .map_err(|_| DiceError::Notation(s.to_string()))?;
        DiceExpr::new(count.unwrap_or(1), sides, modifier.unwrap_or(0))
    }
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>).parse(input)
}

fn die_marker(input: &str) -> IResult<&str, char> {
    one_of("dD").parse(input)
}

fn sign(input: &str) -> IResult<&str, char> {
    one_of("+-").parse(input)
}

fn spaces(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

fn modifier(input: &str) -> IResult<&str, i32> {
    let (input, _) = spaces(input)?;
    let (input, sign) = sign(input)?;
    let (input, _) = spaces(input)?;
    let (input, value) = map_res(digit1, str::parse::<i32>).parse(input)?;
    Ok((input, if sign == '-' { -value } else { value }))
}

fn expression(input: &str) -> IResult<&str, (Option<u32>, u32, Option<i32>)> {
    let (input, _) = spaces(input)?;
    let (input, count) = opt(number).parse(input)?;
    let (input, _) = die_marker(input)?;
    let (input, sides) = number(input)?;
    let (input, modifier) = opt(modifier).parse(input)?;
    let (input, _) = spaces(input)?;
    Ok((input, (count, sides, modifier)))
}
