/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Dice rolling and the usable die values of a throw.
mod dice;
/// A playable game: players, turns, dice, and move application.
mod game;
/// Enumerating legal moves and keeping them in step with the board.
mod movegen;
/// Move representation: single hops, compound moves, and the move graph.
mod moves;
/// Colors, travel directions, and the players themselves.
mod player;
/// Points on the board.
mod pip;
/// Checker storage: points, bars, and bear-off trays.
mod position;
/// Board dimensions and other fixed facts of backgammon.
mod utils;

pub use dice::*;
pub use game::*;
pub use moves::*;
pub use pip::*;
pub use player::*;
pub use position::*;
pub use utils::*;
