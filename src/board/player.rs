/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut, Neg},
    str::FromStr,
};

use anyhow::{bail, Result};

use super::{Pip, HOME_QUADRANT_SIZE, NUM_PIPS};

/// The color of a player's checkers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(u8)]
pub enum Color {
    #[default]
    White = 0,
    Black = 1,
}

impl Color {
    pub const COUNT: usize = 2;

    /// Returns this [`Color`] as a `usize`, useful for indexing into arrays.
    ///
    /// # Example
    /// ```
    /// # use tavla::Color;
    /// assert_eq!(Color::White.index(), 0);
    /// assert_eq!(Color::Black.index(), 1);
    /// ```
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Returns this [`Color`]'s opposite; White for Black and vice versa.
    ///
    /// # Example
    /// ```
    /// # use tavla::Color;
    /// assert_eq!(Color::White.opponent(), Color::Black);
    /// ```
    pub const fn opponent(&self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Returns this [`Color`] as a lowercase string, as typed at the prompt.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// Returns the single character used for this [`Color`]'s checkers in
    /// board diagrams.
    pub const fn char(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }
}

impl Neg for Color {
    type Output = Self;
    /// Negating a [`Color`] yields its opponent.
    fn neg(self) -> Self::Output {
        self.opponent()
    }
}

impl<T> Index<Color> for [T; Color::COUNT] {
    type Output = T;
    fn index(&self, index: Color) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Color> for [T; Color::COUNT] {
    fn index_mut(&mut self, index: Color) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(Self::White),
            "b" | "black" => Ok(Self::Black),
            _ => bail!("color must be white/w or black/b, got {s:?}"),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "White"),
            Self::Black => write!(f, "Black"),
        }
    }
}

/// The direction a player's checkers travel around the board.
///
/// The bottom player races from pip 24 down to pip 1 and bears off past the
/// low edge; the top player races from pip 1 up to pip 24 and bears off past
/// the high edge. All travel arithmetic lives here, so the rest of the crate
/// never branches on which player is which.
///
/// Positions just beyond either edge are represented as `i8` coordinates:
/// `-1` lies past the low edge and `24` past the high edge. A checker on the
/// bar re-enters from its owner's *entry* edge, which is the edge opposite
/// its bear-off edge.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(u8)]
pub enum Perspective {
    #[default]
    Bottom = 0,
    Top = 1,
}

impl Perspective {
    pub const COUNT: usize = 2;

    /// Returns the opposing [`Perspective`].
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Bottom => Self::Top,
            Self::Top => Self::Bottom,
        }
    }

    /// The coordinate just beyond this player's last home point, where their
    /// checkers leave the board.
    ///
    /// # Example
    /// ```
    /// # use tavla::Perspective;
    /// assert_eq!(Perspective::Bottom.bear_off_edge(), -1);
    /// assert_eq!(Perspective::Top.bear_off_edge(), 24);
    /// ```
    pub const fn bear_off_edge(&self) -> i8 {
        match self {
            Self::Bottom => -1,
            Self::Top => NUM_PIPS as i8,
        }
    }

    /// The coordinate a checker on the bar travels from when re-entering.
    ///
    /// This is the edge opposite [`Self::bear_off_edge`].
    pub const fn entry_edge(&self) -> i8 {
        self.opposite().bear_off_edge()
    }

    /// Advances a coordinate `steps` pips in this player's direction of
    /// travel.
    ///
    /// The result may lie off the board; callers are expected to range-check
    /// it before converting to a [`Pip`].
    ///
    /// # Example
    /// ```
    /// # use tavla::Perspective;
    /// assert_eq!(Perspective::Bottom.advance(7, 5), 2);
    /// assert_eq!(Perspective::Top.advance(7, 5), 12);
    /// assert_eq!(Perspective::Bottom.advance(2, 6), -4); // off the board
    /// ```
    pub const fn advance(&self, from: i8, steps: u8) -> i8 {
        match self {
            Self::Bottom => from - steps as i8,
            Self::Top => from + steps as i8,
        }
    }

    /// Whether `pip` lies within this player's home quadrant.
    ///
    /// # Example
    /// ```
    /// # use tavla::{Perspective, Pip};
    /// let pip = Pip::from_number(3)?;
    /// assert!(Perspective::Bottom.home_quadrant_contains(pip));
    /// assert!(!Perspective::Top.home_quadrant_contains(pip));
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub const fn home_quadrant_contains(&self, pip: Pip) -> bool {
        match self {
            Self::Bottom => pip.index() < HOME_QUADRANT_SIZE,
            Self::Top => pip.index() >= NUM_PIPS - HOME_QUADRANT_SIZE,
        }
    }

    /// How many pips a checker on `pip` must still travel to bear off.
    ///
    /// # Example
    /// ```
    /// # use tavla::{Perspective, Pip};
    /// let pip = Pip::from_number(1)?;
    /// assert_eq!(Perspective::Bottom.distance_to_home(pip), 1);
    /// assert_eq!(Perspective::Top.distance_to_home(pip), 24);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub const fn distance_to_home(&self, pip: Pip) -> u8 {
        match self {
            Self::Bottom => pip.index() as u8 + 1,
            Self::Top => NUM_PIPS as u8 - pip.index() as u8,
        }
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bottom => write!(f, "bottom"),
            Self::Top => write!(f, "top"),
        }
    }
}

/// One of the two participants in a game.
///
/// A player is a checker [`Color`] bound to the [`Perspective`] it travels
/// in, plus a display name for prompts and reports.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Player {
    name: String,
    color: Color,
    perspective: Perspective,
}

impl Player {
    /// Creates a new [`Player`].
    pub fn new(name: impl Into<String>, color: Color, perspective: Perspective) -> Self {
        Self {
            name: name.into(),
            color,
            perspective,
        }
    }

    /// This player's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The color of this player's checkers.
    pub const fn color(&self) -> Color {
        self.color
    }

    /// The direction this player's checkers travel.
    pub const fn perspective(&self) -> Perspective {
        self.perspective
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_directions_mirror_each_other() {
        for steps in 1..=6 {
            let from = 12;
            let down = Perspective::Bottom.advance(from, steps);
            let up = Perspective::Top.advance(from, steps);
            assert_eq!(down, from - steps as i8);
            assert_eq!(up, from + steps as i8);
        }
    }

    #[test]
    fn entry_edge_is_opposite_bear_off_edge() {
        assert_eq!(Perspective::Bottom.entry_edge(), 24);
        assert_eq!(Perspective::Top.entry_edge(), -1);
    }

    #[test]
    fn home_quadrants_do_not_overlap() {
        let both: Vec<Pip> = Pip::iter()
            .filter(|p| {
                Perspective::Bottom.home_quadrant_contains(*p)
                    && Perspective::Top.home_quadrant_contains(*p)
            })
            .collect();
        assert!(both.is_empty());

        let neither = Pip::iter()
            .filter(|p| {
                !Perspective::Bottom.home_quadrant_contains(*p)
                    && !Perspective::Top.home_quadrant_contains(*p)
            })
            .count();
        assert_eq!(neither, NUM_PIPS - 2 * HOME_QUADRANT_SIZE);
    }

    #[test]
    fn distance_to_home_reaches_the_edge() {
        for pip in Pip::iter() {
            for pov in [Perspective::Bottom, Perspective::Top] {
                let travelled = pov.advance(pip.index() as i8, pov.distance_to_home(pip));
                assert_eq!(travelled, pov.bear_off_edge());
            }
        }
    }

    #[test]
    fn color_parsing() {
        assert_eq!("white".parse::<Color>().unwrap(), Color::White);
        assert_eq!("B".parse::<Color>().unwrap(), Color::Black);
        assert!("green".parse::<Color>().is_err());
        assert_eq!(-Color::White, Color::Black);
    }
}
