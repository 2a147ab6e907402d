/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, mem};

use anyhow::{anyhow, bail, Result};

use super::{
    Color, DiceRoll, Move, MoveRef, MoveResult, MoveSpec, Moves, Perspective, Pip, Player,
    Position, CHECKERS_PER_COLOR,
};

/// A game of backgammon.
///
/// This type wraps a [`Position`] and adds everything a playable game
/// needs: the two [`Player`]s, whose turn it is, the pending [`DiceRoll`],
/// and the [`Moves`] graph for that roll. Moves are applied through
/// [`Game::play`], which keeps the graph in step with the board as dice get
/// used up, including playing a compound move one die at a time.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Game {
    /// Where every checker currently stands.
    position: Position,

    /// White at the bottom racing downward, Black at the top racing upward.
    players: [Player; Color::COUNT],

    /// The color to move.
    turn: Color,

    /// The dice of the current ply, if they have been rolled.
    dice: Option<DiceRoll>,

    /// Legal moves for `dice`. Empty between plies.
    moves: Moves,
}

impl Game {
    /// Creates a new [`Game`] from the provided [`Position`], with White to
    /// move.
    pub fn new(position: Position) -> Self {
        Self {
            position,
            players: [
                Player::new("White", Color::White, Perspective::Bottom),
                Player::new("Black", Color::Black, Perspective::Top),
            ],
            turn: Color::White,
            dice: None,
            moves: Moves::default(),
        }
    }

    /// The board as it currently stands.
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// The player to move.
    pub fn current_player(&self) -> &Player {
        &self.players[self.turn]
    }

    /// The player of the given color.
    pub fn player(&self, color: Color) -> &Player {
        &self.players[color]
    }

    /// The dice of the current ply, if rolled.
    pub fn dice(&self) -> Option<&DiceRoll> {
        self.dice.as_ref()
    }

    /// The legal moves for the current roll.
    pub fn moves(&self) -> &Moves {
        &self.moves
    }

    /// The player who has borne off all fifteen checkers, if the game is
    /// over.
    pub fn winner(&self) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| self.position.home_count(p.color()) == CHECKERS_PER_COLOR)
    }

    /// Rolls the dice for the player to move and enumerates their legal
    /// moves, replacing any roll already pending.
    ///
    /// Pass `forced` faces for scripted play. If the enumeration comes back
    /// without a single move, the caller is expected to [`Game::pass_turn`].
    pub fn roll_dice(&mut self, forced: Option<(u8, u8)>) -> Result<&DiceRoll> {
        if let Some(winner) = self.winner() {
            bail!("the game is over; {winner} has already won")
        }
        let roll = match forced {
            Some((first, second)) => DiceRoll::forced(first, second)?,
            None => DiceRoll::roll(),
        };
        self.moves = self.position.calculate_moves(&roll, &self.players[self.turn]);
        Ok(self.dice.insert(roll))
    }

    /// Gives the turn to the other player, dropping any unplayed dice.
    pub fn pass_turn(&mut self) {
        self.turn = self.turn.opponent();
        self.dice = None;
        self.moves = Moves::default();
    }

    /// Plays the move described by `spec` for the player to move.
    ///
    /// A single-die move is applied directly. A compound move is replayed
    /// one die at a time: its first hop is applied, the continuation toward
    /// the final destination is registered and looked up, and so on until
    /// the last die lands. Each hop consumes its die from the graph, so sum
    /// sets depending on used dice disappear as play proceeds.
    ///
    /// When the roll has no playable moves left afterwards, the turn passes
    /// automatically.
    pub fn play(&mut self, spec: &MoveSpec) -> Result<()> {
        if self.winner().is_some() {
            bail!("the game is over")
        }
        if self.dice.is_none() {
            bail!("roll the dice before moving")
        }
        let mut mref = self
            .moves
            .find(spec)
            .ok_or_else(|| anyhow!("{spec} is not a legal move"))?;

        loop {
            let Some(mv) = self.moves.resolve(mref).cloned() else {
                bail!("move reference went stale while playing {spec}")
            };
            if !mv.is_compound() {
                self.apply(&mv)?;
                self.moves.consume(mref.roll);
                self.recalculate();
                break;
            }

            let compound_value = self.set_value(mref)?;
            let Some(&first) = mv.intermediates().first() else {
                bail!("compound move {mv} has no first hop")
            };
            let hop_value = self.set_value(first)?;
            let Some(hop) = self.moves.resolve(first).cloned() else {
                bail!("first hop of {mv} is not in the graph")
            };

            self.apply(&hop)?;
            self.position
                .add_hop_moves(&mut self.moves, &self.players[self.turn], mref, first)?;
            self.moves.consume(first.roll);
            self.position
                .update_is_hit(&mut self.moves, &self.players[self.turn]);
            self.recalculate();

            // Chase the rest of the compound move with the remaining value.
            let remainder = compound_value - hop_value;
            let Some(continue_from) = hop.to_pip() else {
                bail!("first hop {hop} left the board")
            };
            let target = match &mv {
                Move::PipToPip { to, .. } | Move::BarToPip { to, .. } => {
                    MoveSpec::between(continue_from, *to)
                }
                Move::PipToHome { .. } => MoveSpec::bear_off(continue_from),
            };
            mref = self
                .moves
                .find_valued(&target, remainder)
                .ok_or_else(|| anyhow!("no continuation {target} while playing {spec}"))?;
        }

        if self.winner().is_some() {
            self.dice = None;
            self.moves = Moves::default();
        } else if !self.moves.has_moves() {
            self.pass_turn();
        }
        Ok(())
    }

    /// Relocates the checkers of one already-validated move.
    fn apply(&mut self, mv: &Move) -> Result<()> {
        let color = mv.color();
        if mv.is_hit() {
            if let Some(to) = mv.to_pip() {
                self.position.send_to_bar(to)?;
            }
        }
        match mv {
            Move::BarToPip { to, .. } => {
                self.position.pop_bar(color)?;
                self.position.push_checker(*to, color);
            }
            Move::PipToPip { from, to, .. } => {
                let moved = self
                    .position
                    .pop_checker(*from)
                    .ok_or_else(|| anyhow!("no checker on {from} to play {mv}"))?;
                debug_assert_eq!(moved, color, "board out of step with the move graph");
                self.position.push_checker(*to, color);
            }
            Move::PipToHome { from, .. } => {
                self.position
                    .pop_checker(*from)
                    .ok_or_else(|| anyhow!("no checker on {from} to play {mv}"))?;
                self.position.push_home(color);
            }
        }
        Ok(())
    }

    fn set_value(&self, mref: MoveRef) -> Result<u8> {
        Ok(self
            .moves
            .by_id(mref.roll)
            .ok_or_else(|| anyhow!("roll set {} is not in the graph", mref.roll))?
            .value())
    }

    fn recalculate(&mut self) {
        self.moves = self
            .position
            .recalculate_moves(mem::take(&mut self.moves), &self.players[self.turn]);
    }

    /// Refreshes the move graph after the board was edited out-of-band.
    fn refresh(&mut self) {
        if self.dice.is_some() {
            self.position
                .update_is_hit(&mut self.moves, &self.players[self.turn]);
            self.recalculate();
        }
    }

    /// Sends the top checker on `pip` to its owner's bar, as if hit.
    pub fn send_to_bar(&mut self, pip: Pip) -> Result<Color> {
        let color = self.position.send_to_bar(pip)?;
        self.refresh();
        Ok(color)
    }

    /// Lifts the top checker on `pip` straight into its owner's tray.
    pub fn bear_off_from(&mut self, pip: Pip) -> Result<Color> {
        let color = self
            .position
            .pop_checker(pip)
            .ok_or_else(|| anyhow!("no checker on {pip}"))?;
        self.position.push_home(color);
        self.refresh();
        Ok(color)
    }

    /// Bears a barred checker of `color` off directly.
    pub fn bear_off_from_bar(&mut self, color: Color) -> MoveResult {
        let result = self.position.bar_to_home(color);
        if result.is_legal() {
            self.refresh();
        }
        result
    }

    /// Re-enters a barred checker of `color` onto `to`, if the landing
    /// allows it. Returns the probe verdict either way.
    pub fn enter_from_bar(&mut self, color: Color, to: Pip) -> Result<MoveResult> {
        let result = self.position.probe_bar_to_pip(color, to);
        if !result.is_legal() {
            return Ok(result);
        }
        if result.is_hit() {
            self.position.send_to_bar(to)?;
        }
        self.position.pop_bar(color)?;
        self.position.push_checker(to, color);
        self.refresh();
        Ok(result)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Position::new())
    }
}

impl fmt::Display for Game {
    /// Draws the board followed by a one-line status: whose turn it is and
    /// the pending dice.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.position)?;
        write!(f, "turn: {}", self.players[self.turn])?;
        if let Some(winner) = self.winner() {
            write!(f, "   winner: {winner}")?;
        } else if let Some(dice) = &self.dice {
            write!(f, "   dice: {dice}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pip(number: u8) -> Pip {
        Pip::from_number(number).unwrap()
    }

    fn spec(s: &str) -> MoveSpec {
        s.parse().unwrap()
    }

    #[test]
    fn a_ply_uses_both_dice() {
        let mut game = Game::default();
        game.roll_dice(Some((3, 5))).unwrap();

        game.play(&spec("13/10")).unwrap();
        assert_eq!(game.current_player().color(), Color::White);
        assert!(game.dice().is_some());

        game.play(&spec("13/8")).unwrap();
        assert_eq!(game.current_player().color(), Color::Black);
        assert!(game.dice().is_none());
        assert!(game.moves().is_empty());
    }

    #[test]
    fn illegal_requests_are_rejected() {
        let mut game = Game::default();
        assert!(game.play(&spec("13/10")).is_err());

        game.roll_dice(Some((3, 5))).unwrap();
        // 24/19 runs into Black's anchor; 13/11 matches neither die.
        assert!(game.play(&spec("24/19")).is_err());
        assert!(game.play(&spec("13/11")).is_err());
        // Black's checkers are not White's to move.
        assert!(game.play(&spec("19/16")).is_err());
    }

    #[test]
    fn a_compound_move_hits_blots_along_the_way() {
        let mut position = Position::empty();
        position.place(pip(13), Color::White, 1);
        position.place(pip(10), Color::Black, 1);
        let mut game = Game::new(position);
        game.roll_dice(Some((3, 5))).unwrap();

        game.play(&spec("13/5")).unwrap();
        assert_eq!(game.position().point(pip(5)).owner(), Some(Color::White));
        assert_eq!(game.position().bar_count(Color::Black), 1);
        // Both dice were spent on the compound move.
        assert_eq!(game.current_player().color(), Color::Black);
    }

    #[test]
    fn doubles_allow_four_hops() {
        let mut position = Position::empty();
        for _ in 0..(CHECKERS_PER_COLOR - 1) {
            position.push_home(Color::White);
        }
        position.place(pip(24), Color::White, 1);
        let mut game = Game::new(position);
        game.roll_dice(Some((6, 6))).unwrap();

        game.play(&spec("24/12")).unwrap();
        assert_eq!(game.position().point(pip(12)).owner(), Some(Color::White));
        // Two sixes remain playable.
        assert_eq!(game.current_player().color(), Color::White);
        let values: Vec<u8> = game.moves().iter().map(|r| r.value()).collect();
        assert!(values.contains(&6));

        game.play(&spec("12/6")).unwrap();
        game.play(&spec("6/off")).unwrap();
        assert_eq!(game.winner().map(|p| p.color()), Some(Color::White));
    }

    #[test]
    fn bearing_off_the_last_checker_wins() {
        let mut position = Position::empty();
        for _ in 0..(CHECKERS_PER_COLOR - 1) {
            position.push_home(Color::White);
        }
        position.place(pip(1), Color::White, 1);
        let mut game = Game::new(position);

        game.roll_dice(Some((1, 2))).unwrap();
        game.play(&spec("1/off")).unwrap();

        let winner = game.winner().expect("White should have won");
        assert_eq!(winner.color(), Color::White);
        assert!(game.dice().is_none());
        assert!(game.roll_dice(None).is_err());
        assert!(game.play(&spec("1/off")).is_err());
    }

    #[test]
    fn rolling_without_moves_lets_the_turn_pass() {
        let mut position = Position::empty();
        position.place(pip(24), Color::White, 2);
        // Black holds every point a 1 or 2 could reach.
        position.place(pip(23), Color::Black, 2);
        position.place(pip(22), Color::Black, 2);
        let mut game = Game::new(position);

        game.roll_dice(Some((1, 2))).unwrap();
        assert!(!game.moves().has_moves());
        game.pass_turn();
        assert_eq!(game.current_player().color(), Color::Black);
    }

    #[test]
    fn scripted_edits_keep_the_graph_fresh() {
        let mut game = Game::default();
        game.roll_dice(Some((4, 2))).unwrap();
        let before = game.moves().clone();

        // Knocking one of White's own checkers onto the bar forces re-entry.
        game.send_to_bar(pip(6)).unwrap();
        assert_eq!(game.position().bar_count(Color::White), 1);
        assert_ne!(&before, game.moves());
        assert!(game
            .moves()
            .iter()
            .flat_map(|r| r.moves())
            .all(|m| m.from_pip().is_none()));
    }

    #[test]
    fn bar_debug_operations() {
        let mut game = Game::default();
        game.send_to_bar(pip(1)).unwrap();
        assert_eq!(
            game.bear_off_from_bar(Color::Black),
            MoveResult::MovedToHomeFromBar
        );
        assert_eq!(game.bear_off_from_bar(Color::Black), MoveResult::PipEmpty);

        game.send_to_bar(pip(1)).unwrap();
        let entered = game.enter_from_bar(Color::Black, pip(5)).unwrap();
        assert_eq!(entered, MoveResult::MovedFromBar);
        assert_eq!(game.position().point(pip(5)).owner(), Some(Color::Black));
    }
}
