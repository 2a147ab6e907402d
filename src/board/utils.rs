/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Number of points ("pips") on a backgammon board.
pub const NUM_PIPS: usize = 24;

/// Number of checkers each player starts the game with.
pub const CHECKERS_PER_COLOR: u8 = 15;

/// Number of points in each player's home quadrant.
///
/// A player may only bear off once every checker they own stands on one of
/// the six points nearest their bear-off boundary.
pub const HOME_QUADRANT_SIZE: usize = 6;

/// Highest face value of a single die.
pub const MAX_DIE: u8 = 6;

/// Maximum number of usable die values in one roll (a double grants four).
pub const MAX_DICE: usize = 4;

/// Distance a checker on the bar must travel to bear off.
///
/// Re-entry happens from just beyond the opponent's side of the board,
/// one step farther than the farthest point.
pub const BAR_DISTANCE: u8 = NUM_PIPS as u8 + 1;
