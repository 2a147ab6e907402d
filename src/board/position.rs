/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Index};

use anyhow::{anyhow, Result};

use super::{Color, MoveResult, Pip, Player, BAR_DISTANCE, NUM_PIPS};

/// One point on the board: a stack of same-colored checkers.
///
/// Opposing checkers never share a point; a landing on a lone opposing
/// checker sends it to the bar before the landing checker arrives.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Point {
    count: u8,
    color: Color,
}

impl Point {
    /// How many checkers stand on this point.
    pub const fn count(&self) -> u8 {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The color holding this point, if any checkers stand on it.
    pub const fn owner(&self) -> Option<Color> {
        if self.count == 0 {
            None
        } else {
            Some(self.color)
        }
    }

    /// Whether a lone checker of the other color stands here, ready to be
    /// hit.
    pub fn is_blot_against(&self, mover: Color) -> bool {
        self.count == 1 && self.color == mover.opponent()
    }

    fn push(&mut self, color: Color) {
        debug_assert!(
            self.count == 0 || self.color == color,
            "cannot stack {color} on a point held by {}",
            self.color
        );
        self.color = color;
        self.count += 1;
    }

    fn pop(&mut self) -> Option<Color> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        Some(self.color)
    }
}

/// The full state of the checkers: 24 points plus each color's bar and
/// bear-off tray.
///
/// This type only stores and relocates checkers. Which relocations are
/// *legal* is the business of the move generation methods layered on top of
/// it; the storage operations here are deliberately dumb so that scripted
/// setups and tests can build any board they like.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    points: [Point; NUM_PIPS],
    bars: [u8; Color::COUNT],
    homes: [u8; Color::COUNT],
}

impl Position {
    /// Creates a board with no checkers anywhere.
    pub fn empty() -> Self {
        Self {
            points: [Point::default(); NUM_PIPS],
            bars: [0; Color::COUNT],
            homes: [0; Color::COUNT],
        }
    }

    /// Creates a board in the standard backgammon starting layout, with
    /// White racing from pip 24 down to pip 1.
    ///
    /// # Example
    /// ```
    /// # use tavla::*;
    /// let position = Position::new();
    /// let back_point = Pip::from_number(24)?;
    /// assert_eq!(position[back_point].count(), 2);
    /// assert_eq!(position[back_point].owner(), Some(Color::White));
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn new() -> Self {
        let mut position = Self::empty();
        for (number, count) in [(24, 2), (13, 5), (8, 3), (6, 5)] {
            position.place(Pip::from_index_unchecked(number - 1), Color::White, count);
            // Black mirrors White across the center of the board.
            position.place(Pip::from_index_unchecked(24 - number), Color::Black, count);
        }
        position
    }

    /// The point a pip refers to.
    pub const fn point(&self, pip: Pip) -> &Point {
        &self.points[pip.index()]
    }

    /// Stacks `count` checkers of `color` onto a point.
    ///
    /// Intended for board setup; panics in debug builds if the point is held
    /// by the other color.
    pub fn place(&mut self, pip: Pip, color: Color, count: u8) {
        for _ in 0..count {
            self.points[pip.index()].push(color);
        }
    }

    /// Adds one checker of `color` to a point.
    pub fn push_checker(&mut self, pip: Pip, color: Color) {
        self.points[pip.index()].push(color);
    }

    /// Removes the top checker from a point, returning its color.
    pub fn pop_checker(&mut self, pip: Pip) -> Option<Color> {
        self.points[pip.index()].pop()
    }

    /// How many checkers of `color` wait on the bar.
    pub const fn bar_count(&self, color: Color) -> u8 {
        self.bars[color.index()]
    }

    pub const fn has_checkers_on_bar(&self, color: Color) -> bool {
        self.bars[color.index()] > 0
    }

    /// How many checkers of `color` have been borne off.
    pub const fn home_count(&self, color: Color) -> u8 {
        self.homes[color.index()]
    }

    /// Puts a checker of `color` on the bar.
    pub fn push_bar(&mut self, color: Color) {
        self.bars[color] += 1;
    }

    /// Takes a checker of `color` off the bar.
    pub fn pop_bar(&mut self, color: Color) -> Result<()> {
        if self.bars[color] == 0 {
            return Err(anyhow!("{color} has no checkers on the bar"));
        }
        self.bars[color] -= 1;
        Ok(())
    }

    /// Bears a checker of `color` off into its tray.
    pub fn push_home(&mut self, color: Color) {
        self.homes[color] += 1;
    }

    /// Hits the checker on `pip`, sending it to its owner's bar.
    pub fn send_to_bar(&mut self, pip: Pip) -> Result<Color> {
        let color = self.points[pip.index()]
            .pop()
            .ok_or_else(|| anyhow!("no checker on {pip} to send to the bar"))?;
        self.push_bar(color);
        Ok(color)
    }

    /// Bears a checker of `color` off directly from the bar.
    ///
    /// Returns [`MovedToHomeFromBar`](MoveResult::MovedToHomeFromBar) when a
    /// checker was waiting there and [`PipEmpty`](MoveResult::PipEmpty) when
    /// the bar was empty.
    pub fn bar_to_home(&mut self, color: Color) -> MoveResult {
        if self.pop_bar(color).is_err() {
            return MoveResult::PipEmpty;
        }
        self.push_home(color);
        MoveResult::MovedToHomeFromBar
    }

    /// Whether every checker the player still has on points stands inside
    /// their home quadrant.
    ///
    /// The bar is not considered; callers decide whether barred checkers
    /// matter for the rule they are checking.
    pub fn all_in_home_quadrant(&self, player: &Player) -> bool {
        let pov = player.perspective();
        Pip::iter()
            .filter(|pip| self.point(*pip).owner() == Some(player.color()))
            .all(|pip| pov.home_quadrant_contains(pip))
    }

    /// Whether the player owns a point farther from their bear-off edge
    /// than `than`.
    ///
    /// Bearing off with a die larger than the travel distance is only
    /// allowed from the player's farthest occupied point.
    pub fn has_farther_checker(&self, player: &Player, than: Pip) -> bool {
        let pov = player.perspective();
        let limit = pov.distance_to_home(than);
        Pip::iter()
            .filter(|pip| self.point(*pip).owner() == Some(player.color()))
            .any(|pip| pov.distance_to_home(pip) > limit)
    }

    /// The player's pip count: total distance their checkers must still
    /// travel to all bear off.
    ///
    /// # Example
    /// ```
    /// # use tavla::*;
    /// let position = Position::new();
    /// let white = Player::new("w", Color::White, Perspective::Bottom);
    /// assert_eq!(position.pip_count(&white), 167);
    /// ```
    pub fn pip_count(&self, player: &Player) -> u32 {
        let pov = player.perspective();
        let on_points: u32 = Pip::iter()
            .filter(|pip| self.point(*pip).owner() == Some(player.color()))
            .map(|pip| self.point(pip).count() as u32 * pov.distance_to_home(pip) as u32)
            .sum();
        on_points + self.bar_count(player.color()) as u32 * BAR_DISTANCE as u32
    }

    /// Total number of `color` checkers anywhere: on points, the bar, or
    /// borne off.
    pub fn checkers(&self, color: Color) -> u8 {
        let on_points: u8 = Pip::iter()
            .filter(|pip| self.point(*pip).owner() == Some(color))
            .map(|pip| self.point(pip).count())
            .sum();
        on_points + self.bar_count(color) + self.home_count(color)
    }

    fn cell(&self, index: usize, row: u8) -> char {
        let point = self.points[index];
        if point.count() <= row {
            return '.';
        }
        // The outermost visible cell shows the stack size when it overflows.
        if row == 4 && point.count() > 5 {
            return char::from_digit(point.count() as u32, 16).unwrap_or('+');
        }
        point.color.char()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Pip> for Position {
    type Output = Point;
    fn index(&self, pip: Pip) -> &Self::Output {
        self.point(pip)
    }
}

impl fmt::Display for Position {
    /// Draws the board with the top player's points along the top edge.
    ///
    /// Stacks taller than five checkers show their size in the outermost
    /// visible cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for number in 13..=24 {
            write!(f, " {number:>2}")?;
            if number == 18 {
                write!(f, "  ")?;
            }
        }
        writeln!(f)?;

        for row in 0..5 {
            for index in 12..NUM_PIPS {
                write!(f, "  {}", self.cell(index, row))?;
                if index == 17 {
                    write!(f, "  ")?;
                }
            }
            writeln!(f)?;
        }

        writeln!(
            f,
            "  bar: [w {}] [b {}]   off: [w {}] [b {}]",
            self.bars[Color::White],
            self.bars[Color::Black],
            self.homes[Color::White],
            self.homes[Color::Black],
        )?;

        for row in (0..5).rev() {
            for index in (0..12).rev() {
                write!(f, "  {}", self.cell(index, row))?;
                if index == 6 {
                    write!(f, "  ")?;
                }
            }
            writeln!(f)?;
        }

        for number in (1..=12).rev() {
            write!(f, " {number:>2}")?;
            if number == 7 {
                write!(f, "  ")?;
            }
        }
        Ok(())
    }
}
