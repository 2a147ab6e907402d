/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::Parser;

use crate::{Color, MoveSpec, Pip};

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(multicall = true, about, rename_all = "lower", override_usage("<COMMAND>"))]
pub enum EngineCommand {
    /// Send the top checker on a point to its owner's bar, as if hit.
    Bar { pip: Pip },

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Re-enter a barred checker onto a point, if the landing allows it.
    Enter { color: Color, pip: Pip },

    /// Quit the engine.
    #[command(aliases = ["quit", "q"])]
    Exit,

    /// Lift the top checker on a point straight into its owner's tray.
    Home { pip: Pip },

    /// Bear a barred checker of the given color straight off.
    #[command(alias = "hb")]
    HomeBar { color: Color },

    /// Play a move in from/to notation, like 13/8, bar/20 or 6/off.
    ///
    /// Compound moves are played out one die at a time, hitting any blots
    /// their intermediate landings touch.
    #[command(aliases = ["m", "play"])]
    Move { notation: MoveSpec },

    /// Show all legal moves for the current roll, or from one point.
    Moves {
        /// Only show moves starting on this point.
        pip: Option<Pip>,

        /// If set, only moves entering from the bar are shown.
        #[arg(short, long, default_value = "false")]
        bar: bool,
    },

    /// Start a fresh game from the standard starting position.
    New,

    /// Give the turn to the other player, dropping any unplayed dice.
    Pass,

    /// Print both players' pip counts and borne-off checkers.
    Pips,

    /// Roll the dice for the player to move, or force specific faces.
    ///
    /// With no arguments the dice are thrown; with two faces the roll is
    /// forced, which is handy for scripted play.
    Roll { first: Option<u8>, second: Option<u8> },
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}
