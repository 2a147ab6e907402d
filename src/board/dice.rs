/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{bail, Result};
use arrayvec::ArrayVec;
use rand::Rng;

use super::{MAX_DICE, MAX_DIE};

/// The usable die values of one throw of the dice.
///
/// A throw of two distinct faces yields two values; a double yields the same
/// face four times, per standard backgammon rules. The order of `faces` is
/// the order the dice were given in, and downstream code identifies each die
/// by its index here.
///
/// # Example
/// ```
/// # use tavla::DiceRoll;
/// let roll = DiceRoll::forced(3, 5)?;
/// assert_eq!(roll.faces(), &[3, 5]);
///
/// let double = DiceRoll::forced(4, 4)?;
/// assert_eq!(double.faces(), &[4, 4, 4, 4]);
/// assert!(double.is_double());
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DiceRoll {
    faces: ArrayVec<u8, MAX_DICE>,
}

impl DiceRoll {
    /// Throws two dice using the thread-local RNG.
    pub fn roll() -> Self {
        let mut rng = rand::thread_rng();
        Self::expand(rng.gen_range(1..=MAX_DIE), rng.gen_range(1..=MAX_DIE))
    }

    /// Builds a roll from two chosen faces, for scripted play and tests.
    pub fn forced(first: u8, second: u8) -> Result<Self> {
        for die in [first, second] {
            if die == 0 || die > MAX_DIE {
                bail!("die face must be in [1, 6], got {die}")
            }
        }
        Ok(Self::expand(first, second))
    }

    fn expand(first: u8, second: u8) -> Self {
        let mut faces = ArrayVec::new();
        faces.push(first);
        faces.push(second);
        if first == second {
            faces.push(first);
            faces.push(first);
        }
        Self { faces }
    }

    /// The usable die values, in order. Two entries normally, four for a
    /// double.
    pub fn faces(&self) -> &[u8] {
        &self.faces
    }

    /// Whether this roll was a double.
    pub fn is_double(&self) -> bool {
        self.faces.len() == MAX_DICE
    }
}

impl fmt::Display for DiceRoll {
    /// Displays the faces joined by dashes, like `3-5` or `4-4-4-4`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, die) in self.faces.iter().enumerate() {
            if i > 0 {
                write!(f, "-")?;
            }
            write!(f, "{die}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_grant_four_values() {
        let roll = DiceRoll::forced(6, 6).unwrap();
        assert_eq!(roll.faces(), &[6, 6, 6, 6]);
        assert!(roll.is_double());
        assert_eq!(roll.to_string(), "6-6-6-6");
    }

    #[test]
    fn distinct_faces_grant_two_values() {
        let roll = DiceRoll::forced(2, 5).unwrap();
        assert_eq!(roll.faces(), &[2, 5]);
        assert!(!roll.is_double());
        assert_eq!(roll.to_string(), "2-5");
    }

    #[test]
    fn face_values_are_validated() {
        assert!(DiceRoll::forced(0, 3).is_err());
        assert!(DiceRoll::forced(3, 7).is_err());
    }

    #[test]
    fn random_rolls_stay_in_range() {
        for _ in 0..100 {
            let roll = DiceRoll::roll();
            assert!(matches!(roll.faces().len(), 2 | 4));
            assert!(roll.faces().iter().all(|&d| (1..=6).contains(&d)));
        }
    }
}
