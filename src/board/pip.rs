/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Context, Result};

use super::NUM_PIPS;

/// A single point on a backgammon board.
///
/// Internally this is a zero-based index in the range `0..24`. Index `0` is
/// the point labelled `1` on a printed board and index `23` is the point
/// labelled `24`. The bottom player's home quadrant covers indices `0..6`
/// and the top player's covers indices `18..24`.
///
/// The bar and the bear-off trays are *not* pips; they are addressed
/// separately by [`Position`](crate::Position).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Pip(u8);

impl Pip {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = NUM_PIPS as u8 - 1;
    pub const COUNT: usize = NUM_PIPS;

    /// Returns a [`Pip`] from the provided zero-based index value, if it is
    /// within bounds.
    ///
    /// # Example
    /// ```
    /// # use tavla::Pip;
    /// let pip = Pip::from_index(7).unwrap();
    /// assert_eq!(pip.to_string(), "8");
    /// assert!(Pip::from_index(24).is_err());
    /// ```
    pub fn from_index(index: usize) -> Result<Self> {
        if index > Self::MAX as usize {
            bail!("pip index must be in [0, 24), got {index}")
        }
        Ok(Self(index as u8))
    }

    /// Returns a [`Pip`] from the provided index value, ignoring bounds.
    ///
    /// Only use this if you know the provided index is valid.
    pub fn from_index_unchecked(index: usize) -> Self {
        debug_assert!(index <= Self::MAX as usize, "invalid pip index {index}");
        Self(index as u8)
    }

    /// Returns a [`Pip`] from the one-based number printed on a board.
    ///
    /// # Example
    /// ```
    /// # use tavla::Pip;
    /// let pip = Pip::from_number(1).unwrap();
    /// assert_eq!(pip.index(), 0);
    /// ```
    pub fn from_number(number: u8) -> Result<Self> {
        if number == 0 || number > NUM_PIPS as u8 {
            bail!("pip number must be in [1, 24], got {number}")
        }
        Ok(Self(number - 1))
    }

    /// Returns the zero-based index of this [`Pip`].
    ///
    /// # Example
    /// ```
    /// # use tavla::Pip;
    /// assert_eq!(Pip::from_number(24).unwrap().index(), 23);
    /// ```
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns the one-based number of this [`Pip`], as printed on a board.
    pub const fn number(&self) -> u8 {
        self.0 + 1
    }

    /// Returns an iterator over all pips, from index `0` to `23`.
    ///
    /// # Example
    /// ```
    /// # use tavla::Pip;
    /// let mut iter = Pip::iter();
    /// assert_eq!(iter.next().unwrap(), Pip::from_number(1).unwrap());
    /// assert_eq!(iter.count(), 23);
    /// ```
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator {
        (Self::MIN..=Self::MAX).map(Self)
    }
}

impl FromStr for Pip {
    type Err = anyhow::Error;
    /// Parses the one-based number printed on a board.
    fn from_str(s: &str) -> Result<Self> {
        let number = s
            .parse::<u8>()
            .with_context(|| format!("invalid pip {s:?}"))?;
        Self::from_number(number)
    }
}

impl fmt::Display for Pip {
    /// Displays the one-based number printed on a board.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl fmt::Debug for Pip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (index {})", self.number(), self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_number_agree() {
        for (i, pip) in Pip::iter().enumerate() {
            assert_eq!(pip.index(), i);
            assert_eq!(pip.number() as usize, i + 1);
            assert_eq!(Pip::from_index(i).unwrap(), pip);
            assert_eq!(Pip::from_number(pip.number()).unwrap(), pip);
        }
    }

    #[test]
    fn out_of_bounds_are_rejected() {
        assert!(Pip::from_index(24).is_err());
        assert!(Pip::from_number(0).is_err());
        assert!(Pip::from_number(25).is_err());
        assert!("0".parse::<Pip>().is_err());
        assert!("banana".parse::<Pip>().is_err());
    }

    #[test]
    fn parses_board_numbers() {
        assert_eq!("8".parse::<Pip>().unwrap().index(), 7);
        assert_eq!("24".parse::<Pip>().unwrap().index(), 23);
    }
}
