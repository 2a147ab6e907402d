/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::Range;

use anyhow::{anyhow, bail, Result};
use arrayvec::ArrayVec;

use super::{
    Color, DiceRoll, Intermediates, Move, MoveList, MoveRef, MoveResult, Moves, Perspective, Pip,
    Player, Position, RollId, RollMoves, MAX_DICE, NUM_PIPS,
};

/// Whether a travel coordinate lands on an actual point.
const fn on_board(coord: i8) -> bool {
    coord >= 0 && coord < NUM_PIPS as i8
}

/// Whether `x` lies strictly between `a` and `b`, in either direction.
fn strictly_between(x: i8, a: i8, b: i8) -> bool {
    if b > a {
        a < x && x < b
    } else {
        b < x && x < a
    }
}

/// Collects references to every move in `graph` that starts at `fro` and
/// lands strictly between `fro` and `to`, keeping only moves whose roll set
/// passes `keep`.
fn collect_first_hops(
    graph: &Moves,
    pov: Perspective,
    fro: i8,
    to: i8,
    keep: impl Fn(&RollMoves) -> bool,
) -> Intermediates {
    let mut found = Intermediates::new();
    for roll in graph.iter().filter(|r| keep(r)) {
        for (index, mv) in roll.moves().iter().enumerate() {
            let (m_fro, m_to) = mv.endpoints(pov);
            if m_fro == fro && strictly_between(m_to, fro, to) {
                found.push(MoveRef::new(roll.id(), index as u8));
            }
        }
    }
    found
}

/// First hops for a sum move under construction: any move out of `fro` that
/// makes progress toward `to` qualifies.
fn find_first_hops(graph: &Moves, pov: Perspective, fro: i8, to: i8) -> Intermediates {
    collect_first_hops(graph, pov, fro, to, |_| true)
}

/// First hops for a continuation move: only sum sets that do not depend on
/// the die just played may supply them, since the others are about to leave
/// the graph.
fn find_first_hops_excluding(
    graph: &Moves,
    pov: Perspective,
    fro: i8,
    to: i8,
    used: RollId,
) -> Intermediates {
    collect_first_hops(graph, pov, fro, to, |r| {
        r.is_sum() && !r.depends_on().contains(&used)
    })
}

/// The single-die sets a sum set drawing on dice `first..=last` depends on.
fn id_span(first: usize, last: usize) -> ArrayVec<RollId, MAX_DICE> {
    let mut ids = ArrayVec::new();
    for i in first..=last {
        ids.push(RollId(i as u8));
    }
    ids
}

impl Position {
    /// Enumerates every move the player can make with this roll.
    ///
    /// The resulting graph holds one single-die set per usable die, in die
    /// order, followed by the sum sets that have at least one legal move.
    /// Single-die sets are kept even when empty. While the player has
    /// checkers on the bar, re-entering is the only thing they may do, so
    /// each set offers at most its one entry move.
    ///
    /// # Example
    /// ```
    /// # use tavla::*;
    /// let position = Position::new();
    /// let player = Player::new("w", Color::White, Perspective::Bottom);
    /// let roll = DiceRoll::forced(3, 5)?;
    ///
    /// let moves = position.calculate_moves(&roll, &player);
    /// assert_eq!(moves.len(), 3); // two dice plus the 8-sum
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn calculate_moves(&self, roll: &DiceRoll, player: &Player) -> Moves {
        let mut moves = Moves::default();
        self.single_die_moves(&mut moves, roll, player);
        self.die_sum_moves(&mut moves, roll, player);
        moves
    }

    fn single_die_moves(&self, moves: &mut Moves, roll: &DiceRoll, player: &Player) {
        for (die_index, &die) in roll.faces().iter().enumerate() {
            let mut set = RollMoves::normal(RollId(die_index as u8), die);
            self.fill_roll_moves(moves, &mut set, player, 0..NUM_PIPS);
            // Kept even when empty: the die can still anchor sums, and
            // recalculation revisits it as the board changes.
            moves.push(set);
        }
    }

    /// Builds the sum sets: prefix sums of the roll's die values, each
    /// depending on the single-die sets it is made of.
    ///
    /// A double's two-die sum is playable from either half of the four dice,
    /// so it appears twice: once depending on the first half, mirrored once
    /// depending on the second half. Sum sets with no legal moves are
    /// discarded on the spot.
    fn die_sum_moves(&self, moves: &mut Moves, roll: &DiceRoll, player: &Player) {
        let faces = roll.faces();
        let count = faces.len();
        let mut value = faces[0];

        for i in 1..count {
            value += faces[i];
            let depends_on = if i == count / 2 {
                id_span(i - 1, count - 1)
            } else {
                id_span(0, i)
            };

            let mut set = RollMoves::sum(RollId(moves.len() as u8), value, depends_on);
            self.fill_roll_moves(moves, &mut set, player, 0..NUM_PIPS);
            if set.moves().is_empty() {
                continue;
            }

            let mirrored: Option<MoveList> = (roll.is_double() && i == count / 2 - 1)
                .then(|| set.moves().iter().cloned().collect());
            moves.push(set);

            if let Some(list) = mirrored {
                let mut mirror =
                    RollMoves::sum(RollId(moves.len() as u8), value, id_span(i + 1, count - 1));
                *mirror.moves_mut() = list;
                moves.push(mirror);
            }
        }
    }

    /// Fills `set` with its legal moves against this board, scanning only
    /// origins in `origins`. Intermediate hops for sum sets are looked up in
    /// `graph`, the sets built before this one.
    fn fill_roll_moves(
        &self,
        graph: &Moves,
        set: &mut RollMoves,
        player: &Player,
        origins: Range<usize>,
    ) {
        if self.has_checkers_on_bar(player.color()) {
            self.try_bar_entry(graph, set, player);
        } else {
            for index in origins {
                self.try_point_moves(graph, set, player, Pip::from_index_unchecked(index));
            }
        }
    }

    fn try_bar_entry(&self, graph: &Moves, set: &mut RollMoves, player: &Player) {
        let pov = player.perspective();
        let to = pov.advance(pov.entry_edge(), set.value());
        if !on_board(to) {
            return;
        }
        let to = Pip::from_index_unchecked(to as usize);

        let result = self.probe_bar_to_pip(player.color(), to);
        if !result.is_legal() {
            return;
        }

        let mut intermediates = Intermediates::new();
        if set.is_sum() {
            intermediates = find_first_hops(graph, pov, pov.entry_edge(), to.index() as i8);
            if intermediates.is_empty() {
                return;
            }
        }
        set.push(Move::BarToPip {
            color: player.color(),
            to,
            hit: result.is_hit(),
            intermediates,
        });
    }

    /// Tries the two moves a die offers from one origin point: relocating
    /// to another point, or bearing off. The destination ranges make them
    /// mutually exclusive.
    fn try_point_moves(&self, graph: &Moves, set: &mut RollMoves, player: &Player, from: Pip) {
        let pov = player.perspective();
        let color = player.color();
        let fro = from.index() as i8;
        let to = pov.advance(fro, set.value());

        if on_board(to) {
            let to_pip = Pip::from_index_unchecked(to as usize);
            let result = self.probe_pip_to_pip(from, to_pip, color);
            if result.is_legal() {
                if let Some(intermediates) = self.sum_witnesses(graph, set, pov, fro, to) {
                    set.push(Move::PipToPip {
                        color,
                        from,
                        to: to_pip,
                        hit: result.is_hit(),
                        intermediates,
                    });
                }
            }
        }

        if self.can_bear_off(player, from, to, set.is_sum()) {
            if let Some(intermediates) =
                self.sum_witnesses(graph, set, pov, fro, pov.bear_off_edge())
            {
                set.push(Move::PipToHome {
                    color,
                    from,
                    intermediates,
                });
            }
        }
    }

    /// The intermediates a move must carry to enter `set`: none for a
    /// single-die set, at least one first hop for a sum set. `None` means
    /// the move is not decomposable and must be dropped.
    fn sum_witnesses(
        &self,
        graph: &Moves,
        set: &RollMoves,
        pov: Perspective,
        fro: i8,
        to: i8,
    ) -> Option<Intermediates> {
        if !set.is_sum() {
            return Some(Intermediates::new());
        }
        let found = find_first_hops(graph, pov, fro, to);
        if found.is_empty() {
            None
        } else {
            Some(found)
        }
    }

    /// Whether the player may bear off from `from` with a die that travels
    /// to coordinate `to`.
    ///
    /// Requires every checker home and none on the bar. The die must land
    /// exactly on the bear-off edge; a larger die is only good from the
    /// farthest occupied point, and never as a die sum.
    fn can_bear_off(&self, player: &Player, from: Pip, to: i8, is_sum: bool) -> bool {
        let color = player.color();
        if self.has_checkers_on_bar(color) || !self.all_in_home_quadrant(player) {
            return false;
        }
        if !self.probe_pip_to_home(from, color).is_legal() {
            return false;
        }

        if to == player.perspective().bear_off_edge() {
            return true;
        }
        !is_sum && !on_board(to) && !self.has_farther_checker(player, from)
    }

    /// Probes relocating a checker between two points without touching the
    /// board.
    ///
    /// # Example
    /// ```
    /// # use tavla::*;
    /// let position = Position::new();
    /// let from = Pip::from_number(24)?;
    ///
    /// // 24/19 runs into Black's five checkers on the 19-point.
    /// let blocked = position.probe_pip_to_pip(from, Pip::from_number(19)?, Color::White);
    /// assert_eq!(blocked, MoveResult::Blocked);
    ///
    /// // 24/20 lands on an open point.
    /// let open = position.probe_pip_to_pip(from, Pip::from_number(20)?, Color::White);
    /// assert_eq!(open, MoveResult::MovedToPip);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn probe_pip_to_pip(&self, from: Pip, to: Pip, color: Color) -> MoveResult {
        let origin = self.point(from);
        if origin.is_empty() {
            return MoveResult::PipEmpty;
        }
        if origin.owner() != Some(color) {
            return MoveResult::NotMoved;
        }
        self.probe_landing(to, color, MoveResult::MovedToPip)
    }

    /// Probes re-entering a barred checker of `color` onto `to`.
    pub fn probe_bar_to_pip(&self, color: Color, to: Pip) -> MoveResult {
        if !self.has_checkers_on_bar(color) {
            return MoveResult::PipEmpty;
        }
        self.probe_landing(to, color, MoveResult::MovedFromBar)
    }

    /// Probes bearing off the top checker of `from`. This checks ownership
    /// only; the travel-distance rules live in the move generator.
    pub fn probe_pip_to_home(&self, from: Pip, color: Color) -> MoveResult {
        match self.point(from).owner() {
            None => MoveResult::PipEmpty,
            Some(c) if c != color => MoveResult::NotMoved,
            Some(_) => MoveResult::MovedToHomeFromPip,
        }
    }

    /// How a landing on `to` plays out: `arrives` on an open or friendly
    /// point, a hit on a lone opposing checker, blocked by two or more.
    fn probe_landing(&self, to: Pip, color: Color, arrives: MoveResult) -> MoveResult {
        let dest = self.point(to);
        match dest.owner() {
            None => arrives,
            Some(c) if c == color => arrives,
            Some(_) if dest.count() == 1 => MoveResult::MoveToBar,
            Some(_) => MoveResult::Blocked,
        }
    }

    /// Rebuilds a move graph against the current board.
    ///
    /// Set identities (ids, values, dependencies) survive; every move list
    /// is regenerated from scratch, and sets left without a single move are
    /// dropped, single-die sets included.
    pub fn recalculate_moves(&self, prev: Moves, player: &Player) -> Moves {
        self.recalculate_moves_within(prev, player, 0..NUM_PIPS)
    }

    /// Rebuilds a move graph, scanning only origin points in `origins`.
    ///
    /// Moves starting outside `origins` are not regenerated, so a narrowed
    /// range discards them. Use the full range unless play is currently
    /// restricted to the given origins. Bar entries ignore the range, since
    /// they do not start on a point.
    pub fn recalculate_moves_within(
        &self,
        prev: Moves,
        player: &Player,
        origins: Range<usize>,
    ) -> Moves {
        let mut next = Moves::default();
        for old in prev.into_rolls() {
            let mut set = RollMoves::like(&old);
            self.fill_roll_moves(&next, &mut set, player, origins.clone());
            if !set.moves().is_empty() {
                next.push(set);
            }
        }
        next
    }

    /// Re-probes the hit flag of every point-landing move in the graph.
    ///
    /// Cheaper than recalculation when only blots have come or gone; the
    /// set of legal moves itself is not revisited.
    pub fn update_is_hit(&self, moves: &mut Moves, player: &Player) {
        let color = player.color();
        for set in moves.iter_mut() {
            for mv in set.moves_mut().iter_mut() {
                let result = match &*mv {
                    Move::BarToPip { to, .. } => self.probe_bar_to_pip(color, *to),
                    Move::PipToPip { from, to, .. } => self.probe_pip_to_pip(*from, *to, color),
                    Move::PipToHome { .. } => continue,
                };
                mv.set_hit(result.is_hit());
            }
        }
    }

    /// Registers the continuations of a compound move whose first hop was
    /// just played.
    ///
    /// `compound` names a point-to-point sum move and `hop` the single-die
    /// move that started it. The remaining travel, from the hop's landing
    /// point to the compound's destination, is added to every set of the
    /// remaining value: unconditionally to single-die sets, and to sum sets
    /// that do not depend on the hop's die and can still witness a first
    /// hop of their own. Compounds that bear off or re-enter need no
    /// registration, since recalculation rederives their continuations.
    ///
    /// Call this before consuming the hop's die from the graph.
    pub fn add_hop_moves(
        &self,
        moves: &mut Moves,
        player: &Player,
        compound: MoveRef,
        hop: MoveRef,
    ) -> Result<()> {
        let compound_set = moves
            .by_id(compound.roll)
            .ok_or_else(|| anyhow!("roll set {} is not in the graph", compound.roll))?;
        let compound_value = compound_set.value();
        let compound_mv = compound_set
            .get(compound.index as usize)
            .ok_or_else(|| anyhow!("{} has no move {}", compound.roll, compound.index))?;
        let final_to = match compound_mv {
            Move::PipToPip { to, .. } => *to,
            _ => return Ok(()),
        };

        let hop_set = moves
            .by_id(hop.roll)
            .ok_or_else(|| anyhow!("roll set {} is not in the graph", hop.roll))?;
        let hop_value = hop_set.value();
        let hop_mv = hop_set
            .get(hop.index as usize)
            .ok_or_else(|| anyhow!("{} has no move {}", hop.roll, hop.index))?;
        let Some(from) = hop_mv.to_pip() else {
            return Ok(());
        };

        if hop_value >= compound_value {
            bail!("{hop_mv} does not shorten {compound_mv}");
        }
        let remainder = compound_value - hop_value;

        let color = player.color();
        let pov = player.perspective();
        let result = self.probe_pip_to_pip(from, final_to, color);
        if !result.is_legal() {
            return Ok(());
        }
        let hit = result.is_hit();

        let mut additions: Vec<(RollId, Move)> = Vec::new();
        for set in moves.iter().filter(|r| r.value() == remainder) {
            let intermediates = if set.is_sum() {
                let found = find_first_hops_excluding(
                    moves,
                    pov,
                    from.index() as i8,
                    final_to.index() as i8,
                    hop.roll,
                );
                if found.is_empty() {
                    continue;
                }
                found
            } else {
                Intermediates::new()
            };
            additions.push((
                set.id(),
                Move::PipToPip {
                    color,
                    from,
                    to: final_to,
                    hit,
                    intermediates,
                },
            ));
        }

        for (id, mv) in additions {
            if let Some(set) = moves.by_id_mut(id) {
                set.push(mv);
            }
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

    fn white() -> Player {
        Player::new("w", Color::White, Perspective::Bottom)
    }

    #[test]
    fn landing_rules() {
        let mut position = Position::empty();
        position.place(pip(13), Color::White, 2);
        position.place(pip(8), Color::White, 1);
        position.place(pip(10), Color::Black, 1);
        position.place(pip(11), Color::Black, 2);

        let probe = |to| position.probe_pip_to_pip(pip(13), pip(to), Color::White);
        assert_eq!(probe(9), MoveResult::MovedToPip); // open point
        assert_eq!(probe(8), MoveResult::MovedToPip); // own point
        assert_eq!(probe(10), MoveResult::MoveToBar); // blot
        assert_eq!(probe(11), MoveResult::Blocked); // held point

        // Probing from an empty or foreign point never moves.
        assert_eq!(
            position.probe_pip_to_pip(pip(4), pip(2), Color::White),
            MoveResult::PipEmpty
        );
        assert_eq!(
            position.probe_pip_to_pip(pip(10), pip(8), Color::White),
            MoveResult::NotMoved
        );
    }

    #[test]
    fn bar_entry_rules() {
        let mut position = Position::empty();
        assert_eq!(
            position.probe_bar_to_pip(Color::White, pip(20)),
            MoveResult::PipEmpty
        );

        position.push_bar(Color::White);
        position.place(pip(20), Color::Black, 1);
        position.place(pip(19), Color::Black, 2);
        assert_eq!(
            position.probe_bar_to_pip(Color::White, pip(21)),
            MoveResult::MovedFromBar
        );
        assert_eq!(
            position.probe_bar_to_pip(Color::White, pip(20)),
            MoveResult::MoveToBar
        );
        assert_eq!(
            position.probe_bar_to_pip(Color::White, pip(19)),
            MoveResult::Blocked
        );
    }

    #[test]
    fn bear_off_needs_everyone_home() {
        let mut position = Position::empty();
        position.place(pip(3), Color::White, 1);
        position.place(pip(13), Color::White, 1);
        let player = white();

        // A checker outside the home quadrant blocks bearing off.
        let moves = position.calculate_moves(&DiceRoll::forced(3, 3).unwrap(), &player);
        assert!(moves
            .iter()
            .flat_map(|r| r.moves())
            .all(|m| m.to_pip().is_some()));

        // Once it comes home, the exact die bears off.
        position.pop_checker(pip(13)).unwrap();
        position.place(pip(5), Color::White, 1);
        let moves = position.calculate_moves(&DiceRoll::forced(3, 5).unwrap(), &player);
        let bear_offs: Vec<String> = moves
            .iter()
            .flat_map(|r| r.moves())
            .filter(|m| m.to_pip().is_none())
            .map(|m| m.to_string())
            .collect();
        assert_eq!(bear_offs, ["3/off", "5/off"]);
    }

    #[test]
    fn overshoot_only_from_the_farthest_point() {
        let mut position = Position::empty();
        position.place(pip(3), Color::White, 1);
        position.place(pip(5), Color::White, 1);
        let player = white();

        let moves = position.calculate_moves(&DiceRoll::forced(6, 6).unwrap(), &player);
        let with_six: Vec<String> = moves
            .iter()
            .filter(|r| r.value() == 6)
            .flat_map(|r| r.moves())
            .map(|m| m.to_string())
            .collect();
        // Only the 5-point checker may use the oversized die.
        assert_eq!(with_six, ["5/off", "5/off", "5/off", "5/off"]);
    }

    #[test]
    fn entering_from_the_bar_is_forced() {
        let mut position = Position::new();
        position.push_bar(Color::White);
        let player = white();

        let moves = position.calculate_moves(&DiceRoll::forced(2, 6).unwrap(), &player);
        for set in moves.iter() {
            for mv in set.moves() {
                assert!(matches!(mv, Move::BarToPip { .. }));
            }
        }
        // 24 - 6 lands on Black's anchor on the 19-point; only the 2 enters.
        let playable: Vec<String> = moves
            .iter()
            .filter(|r| !r.moves().is_empty())
            .map(|r| r.to_string())
            .collect();
        assert_eq!(playable, ["[2] bar/23"]);
    }
}
