/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Context, Result};
use arrayvec::ArrayVec;

use super::{Color, Perspective, Pip, MAX_DICE};

/// Maximum number of roll sets one throw can produce.
///
/// A double yields four single-die sets plus at most four compound sets (the
/// two half-sums, the three-die sum, and the four-die sum). A plain throw
/// yields two single-die sets and one compound set.
pub const MAX_ROLL_SETS: usize = 8;

/// Maximum number of moves one roll set can hold.
///
/// At most one move starts from each of the 24 points, plus headroom for
/// continuation moves registered while a compound move is being played out.
pub const MAX_MOVES_PER_ROLL: usize = 32;

/// Maximum number of first-hop witnesses recorded on a compound move.
pub const MAX_INTERMEDIATE_HOPS: usize = 16;

/// A list of [`Move`]s belonging to a single roll set.
pub type MoveList = ArrayVec<Move, MAX_MOVES_PER_ROLL>;

/// First-hop witnesses of a compound [`Move`].
pub type Intermediates = ArrayVec<MoveRef, MAX_INTERMEDIATE_HOPS>;

/// The outcome of probing or applying a single checker relocation.
///
/// The first three variants reject the relocation; the rest describe how a
/// legal one lands.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveResult {
    /// The source holds checkers, but the move is not available to the
    /// moving player, because the top checker there belongs to the opponent.
    NotMoved,
    /// The destination point is held by two or more opposing checkers.
    Blocked,
    /// The source (point or bar) holds no checkers at all.
    PipEmpty,
    /// A checker relocated from one point to another without hitting.
    MovedToPip,
    /// A checker re-entered from the bar without hitting.
    MovedFromBar,
    /// A checker landed on a lone opposing checker, sending it to the bar.
    MoveToBar,
    /// A checker on a point was borne off.
    MovedToHomeFromPip,
    /// A checker on the bar was borne off directly.
    MovedToHomeFromBar,
}

impl MoveResult {
    /// Whether the probed relocation is allowed to happen.
    pub const fn is_legal(&self) -> bool {
        !matches!(self, Self::NotMoved | Self::Blocked | Self::PipEmpty)
    }

    /// Whether the relocation lands on a lone opposing checker.
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::MoveToBar)
    }
}

impl fmt::Display for MoveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotMoved => "not moved",
            Self::Blocked => "blocked",
            Self::PipEmpty => "source empty",
            Self::MovedToPip => "moved",
            Self::MovedFromBar => "entered from the bar",
            Self::MoveToBar => "hit",
            Self::MovedToHomeFromPip => "borne off",
            Self::MovedToHomeFromBar => "borne off from the bar",
        };
        write!(f, "{s}")
    }
}

/// Identifier of a roll set within one [`Moves`] graph.
///
/// Single-die sets are numbered by die index, so ids `0` and `1` are the two
/// dice of a plain throw (`0..4` for a double), and compound sets take the
/// ids after them in creation order. Ids are stable for the lifetime of a
/// throw; recalculation preserves them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RollId(pub(crate) u8);

impl RollId {
    /// Returns this [`RollId`] as a `usize`.
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A stable reference to one [`Move`] within a [`Moves`] graph: the owning
/// roll set plus the move's position in that set's list.
///
/// A reference is only meaningful against the graph generation it was taken
/// from. Resolve it with [`Moves::resolve`] before the graph is mutated.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveRef {
    pub roll: RollId,
    pub index: u8,
}

impl MoveRef {
    pub const fn new(roll: RollId, index: u8) -> Self {
        Self { roll, index }
    }
}

/// A single legal relocation of one checker.
///
/// Every variant records the moving [`Color`], and point-landing variants
/// record whether the landing hits a lone opposing checker. Compound moves
/// additionally carry `intermediates`: references to the single-hop moves
/// this move can start with, which is what makes a compound move replayable
/// one die at a time.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Move {
    /// Re-entry of a barred checker onto `to`.
    BarToPip {
        color: Color,
        to: Pip,
        hit: bool,
        intermediates: Intermediates,
    },
    /// Relocation from one point to another.
    PipToPip {
        color: Color,
        from: Pip,
        to: Pip,
        hit: bool,
        intermediates: Intermediates,
    },
    /// Bearing a checker off from `from`. Never a hit.
    PipToHome {
        color: Color,
        from: Pip,
        intermediates: Intermediates,
    },
}

impl Move {
    /// The color making this move.
    pub const fn color(&self) -> Color {
        match self {
            Self::BarToPip { color, .. }
            | Self::PipToPip { color, .. }
            | Self::PipToHome { color, .. } => *color,
        }
    }

    /// The point this move starts from, unless it starts on the bar.
    pub const fn from_pip(&self) -> Option<Pip> {
        match self {
            Self::BarToPip { .. } => None,
            Self::PipToPip { from, .. } | Self::PipToHome { from, .. } => Some(*from),
        }
    }

    /// The point this move lands on, unless it bears off.
    pub const fn to_pip(&self) -> Option<Pip> {
        match self {
            Self::BarToPip { to, .. } | Self::PipToPip { to, .. } => Some(*to),
            Self::PipToHome { .. } => None,
        }
    }

    /// Whether this move lands on a lone opposing checker.
    pub const fn is_hit(&self) -> bool {
        match self {
            Self::BarToPip { hit, .. } | Self::PipToPip { hit, .. } => *hit,
            Self::PipToHome { .. } => false,
        }
    }

    /// Updates the hit flag. Bear-offs have none, so this is a no-op there.
    pub fn set_hit(&mut self, is_hit: bool) {
        match self {
            Self::BarToPip { hit, .. } | Self::PipToPip { hit, .. } => *hit = is_hit,
            Self::PipToHome { .. } => {}
        }
    }

    /// The single-hop moves this move can start with. Empty for single-die
    /// moves.
    pub fn intermediates(&self) -> &[MoveRef] {
        match self {
            Self::BarToPip { intermediates, .. }
            | Self::PipToPip { intermediates, .. }
            | Self::PipToHome { intermediates, .. } => intermediates,
        }
    }

    /// Whether this move spans more than one die.
    pub fn is_compound(&self) -> bool {
        !self.intermediates().is_empty()
    }

    /// Both ends of this move as coordinates from the mover's point of
    /// view. Bar entries start at the mover's entry edge and bear-offs end
    /// at their bear-off edge.
    pub const fn endpoints(&self, pov: Perspective) -> (i8, i8) {
        match self {
            Self::BarToPip { to, .. } => (pov.entry_edge(), to.index() as i8),
            Self::PipToPip { from, to, .. } => (from.index() as i8, to.index() as i8),
            Self::PipToHome { from, .. } => (from.index() as i8, pov.bear_off_edge()),
        }
    }

    /// Whether this move is the one a player described at the prompt.
    pub fn matches(&self, spec: &MoveSpec) -> bool {
        match self {
            Self::BarToPip { to, .. } => spec.from.is_none() && spec.to == Some(*to),
            Self::PipToPip { from, to, .. } => {
                spec.from == Some(*from) && spec.to == Some(*to)
            }
            Self::PipToHome { from, .. } => spec.from == Some(*from) && spec.to.is_none(),
        }
    }
}

impl fmt::Display for Move {
    /// Displays the move in standard notation: `13/8`, `bar/20`, `6/off`,
    /// with a trailing `*` when the landing hits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BarToPip { to, hit, .. } => {
                write!(f, "bar/{to}{}", if *hit { "*" } else { "" })
            }
            Self::PipToPip { from, to, hit, .. } => {
                write!(f, "{from}/{to}{}", if *hit { "*" } else { "" })
            }
            Self::PipToHome { from, .. } => write!(f, "{from}/off"),
        }
    }
}

/// A from/to pair in the notation players type at the prompt.
///
/// `None` endpoints stand for the bar (source) and the bear-off tray
/// (destination). Point numbers are the one-based labels printed on a board.
///
/// # Example
/// ```
/// # use tavla::MoveSpec;
/// let spec: MoveSpec = "bar/20".parse()?;
/// assert!(spec.from.is_none());
/// assert_eq!(spec.to.map(|p| p.number()), Some(20));
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveSpec {
    pub from: Option<Pip>,
    pub to: Option<Pip>,
}

impl MoveSpec {
    /// Describes a relocation between two points.
    pub const fn between(from: Pip, to: Pip) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Describes a re-entry from the bar.
    pub const fn from_bar(to: Pip) -> Self {
        Self {
            from: None,
            to: Some(to),
        }
    }

    /// Describes bearing off from a point.
    pub const fn bear_off(from: Pip) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }
}

impl FromStr for MoveSpec {
    type Err = anyhow::Error;
    /// Parses notation like `13/8`, `bar/20` or `6/off`. A trailing `*` is
    /// accepted and ignored; whether a move hits is derived from the board.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().trim_end_matches('*');
        let (from, to) = s
            .split_once('/')
            .with_context(|| format!("expected from/to notation, got {s:?}"))?;

        let from = match from {
            "bar" => None,
            pip => Some(pip.parse::<Pip>()?),
        };
        let to = match to {
            "off" => None,
            pip => Some(pip.parse::<Pip>()?),
        };
        if from.is_none() && to.is_none() {
            bail!("a checker cannot move bar/off in one hop")
        }
        Ok(Self { from, to })
    }
}

impl fmt::Display for MoveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            Some(pip) => write!(f, "{pip}")?,
            None => write!(f, "bar")?,
        }
        match self.to {
            Some(pip) => write!(f, "/{pip}"),
            None => write!(f, "/off"),
        }
    }
}

/// How a roll set came to be.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RollKind {
    /// The set of a single die.
    Normal,
    /// The set of a die sum. `depends_on` lists the single-die sets whose
    /// values this sum is made of; once any of them is used up, this set is
    /// no longer playable.
    Sum {
        depends_on: ArrayVec<RollId, MAX_DICE>,
    },
}

/// All legal moves of one die value (or one die sum) against a fixed board.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RollMoves {
    id: RollId,
    value: u8,
    kind: RollKind,
    moves: MoveList,
}

impl RollMoves {
    /// Creates an empty set for a single die.
    pub fn normal(id: RollId, value: u8) -> Self {
        Self {
            id,
            value,
            kind: RollKind::Normal,
            moves: MoveList::new(),
        }
    }

    /// Creates an empty set for a die sum.
    pub fn sum(id: RollId, value: u8, depends_on: ArrayVec<RollId, MAX_DICE>) -> Self {
        Self {
            id,
            value,
            kind: RollKind::Sum { depends_on },
            moves: MoveList::new(),
        }
    }

    /// Creates an empty set carrying over another set's identity.
    pub fn like(other: &Self) -> Self {
        Self {
            id: other.id,
            value: other.value,
            kind: other.kind.clone(),
            moves: MoveList::new(),
        }
    }

    pub const fn id(&self) -> RollId {
        self.id
    }

    /// The die value (or die sum) every move in this set travels.
    pub const fn value(&self) -> u8 {
        self.value
    }

    pub const fn kind(&self) -> &RollKind {
        &self.kind
    }

    pub fn is_sum(&self) -> bool {
        matches!(self.kind, RollKind::Sum { .. })
    }

    /// The single-die sets this sum is made of. Empty for single-die sets.
    pub fn depends_on(&self) -> &[RollId] {
        match &self.kind {
            RollKind::Normal => &[],
            RollKind::Sum { depends_on } => depends_on,
        }
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn get(&self, index: usize) -> Option<&Move> {
        self.moves.get(index)
    }

    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub(crate) fn moves_mut(&mut self) -> &mut MoveList {
        &mut self.moves
    }
}

impl fmt::Display for RollMoves {
    /// Displays the value followed by the moves, like `[5] 24/20 13/8*`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}{}]", self.value, if self.is_sum() { " sum" } else { "" })?;
        for mv in &self.moves {
            write!(f, " {mv}")?;
        }
        Ok(())
    }
}

/// Every legal move available to the player to move, grouped by roll set.
///
/// Single-die sets come first in die order, compound sets after them in
/// creation order. The graph is regenerated from the board by
/// [`Position::calculate_moves`](crate::Position::calculate_moves) and kept
/// in step with play through consumption and recalculation.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Moves {
    rolls: Vec<RollMoves>,
}

impl Moves {
    /// Number of roll sets currently in the graph.
    pub fn len(&self) -> usize {
        self.rolls.len()
    }

    /// Whether the graph holds no roll sets at all.
    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
    }

    /// Whether any roll set still offers a move.
    pub fn has_moves(&self) -> bool {
        self.rolls.iter().any(|r| !r.moves().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RollMoves> {
        self.rolls.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut RollMoves> {
        self.rolls.iter_mut()
    }

    pub(crate) fn into_rolls(self) -> Vec<RollMoves> {
        self.rolls
    }

    pub fn push(&mut self, roll: RollMoves) {
        self.rolls.push(roll);
    }

    /// Looks up a roll set by id.
    pub fn by_id(&self, id: RollId) -> Option<&RollMoves> {
        self.rolls.iter().find(|r| r.id() == id)
    }

    pub(crate) fn by_id_mut(&mut self, id: RollId) -> Option<&mut RollMoves> {
        self.rolls.iter_mut().find(|r| r.id() == id)
    }

    /// Resolves a [`MoveRef`] against this graph.
    pub fn resolve(&self, mref: MoveRef) -> Option<&Move> {
        self.by_id(mref.roll)?.get(mref.index as usize)
    }

    /// Uses up a single-die set: removes it and every sum set that depends
    /// on it.
    ///
    /// # Example
    /// ```
    /// # use tavla::*;
    /// let position = Position::new();
    /// let player = Player::new("w", Color::White, Perspective::Bottom);
    /// let roll = DiceRoll::forced(3, 5)?;
    /// let mut moves = position.calculate_moves(&roll, &player);
    ///
    /// let first = moves.iter().next().map(|r| r.id()).unwrap();
    /// moves.consume(first);
    /// // The other die survives; the 8-sum depended on the used die.
    /// assert!(moves.by_id(first).is_none());
    /// assert_eq!(moves.len(), 1);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn consume(&mut self, id: RollId) {
        self.rolls
            .retain(|r| r.id() != id && !r.depends_on().contains(&id));
    }

    /// Finds the first move matching `spec`, searching single-die sets
    /// before compound sets.
    pub fn find(&self, spec: &MoveSpec) -> Option<MoveRef> {
        self.find_by(|_, mv| mv.matches(spec))
    }

    /// Finds the first move matching `spec` in a set of the given value.
    pub fn find_valued(&self, spec: &MoveSpec, value: u8) -> Option<MoveRef> {
        self.find_by(|roll, mv| roll.value() == value && mv.matches(spec))
    }

    fn find_by(&self, pred: impl Fn(&RollMoves, &Move) -> bool) -> Option<MoveRef> {
        for roll in &self.rolls {
            for (index, mv) in roll.moves().iter().enumerate() {
                if pred(roll, mv) {
                    return Some(MoveRef::new(roll.id(), index as u8));
                }
            }
        }
        None
    }
}

impl fmt::Display for Moves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, roll) in self.rolls.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{roll}")?;
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

    fn plain_move(from: u8, to: u8) -> Move {
        Move::PipToPip {
            color: Color::White,
            from: pip(from),
            to: pip(to),
            hit: false,
            intermediates: Intermediates::new(),
        }
    }

    #[test]
    fn notation_round_trips() {
        for s in ["13/8", "bar/20", "6/off"] {
            let spec: MoveSpec = s.parse().unwrap();
            assert_eq!(spec.to_string(), s);
        }
        let hit: MoveSpec = "13/8*".parse().unwrap();
        assert_eq!(hit, MoveSpec::between(pip(13), pip(8)));
        assert!("bar/off".parse::<MoveSpec>().is_err());
        assert!("13-8".parse::<MoveSpec>().is_err());
        assert!("0/5".parse::<MoveSpec>().is_err());
    }

    #[test]
    fn moves_display_in_standard_notation() {
        assert_eq!(plain_move(13, 8).to_string(), "13/8");

        let hit = Move::BarToPip {
            color: Color::Black,
            to: pip(20),
            hit: true,
            intermediates: Intermediates::new(),
        };
        assert_eq!(hit.to_string(), "bar/20*");

        let off = Move::PipToHome {
            color: Color::White,
            from: pip(6),
            intermediates: Intermediates::new(),
        };
        assert_eq!(off.to_string(), "6/off");
    }

    #[test]
    fn endpoints_are_viewed_from_the_mover() {
        let mv = Move::BarToPip {
            color: Color::White,
            to: pip(20),
            hit: false,
            intermediates: Intermediates::new(),
        };
        assert_eq!(mv.endpoints(Perspective::Bottom), (24, 19));

        let off = Move::PipToHome {
            color: Color::White,
            from: pip(3),
            intermediates: Intermediates::new(),
        };
        assert_eq!(off.endpoints(Perspective::Bottom), (2, -1));
    }

    #[test]
    fn consuming_a_die_removes_dependent_sums() {
        let mut deps = ArrayVec::new();
        deps.push(RollId(0));
        deps.push(RollId(1));

        let mut moves = Moves::default();
        let mut first = RollMoves::normal(RollId(0), 3);
        first.push(plain_move(13, 10));
        moves.push(first);
        let mut second = RollMoves::normal(RollId(1), 5);
        second.push(plain_move(13, 8));
        moves.push(second);
        let mut sum = RollMoves::sum(RollId(2), 8, deps);
        sum.push(plain_move(13, 5));
        moves.push(sum);

        moves.consume(RollId(0));
        assert!(moves.by_id(RollId(0)).is_none());
        assert!(moves.by_id(RollId(2)).is_none());
        assert!(moves.by_id(RollId(1)).is_some());
        assert_eq!(moves.len(), 1);
    }

    #[test]
    fn find_prefers_single_die_sets() {
        let mut moves = Moves::default();
        let mut five = RollMoves::normal(RollId(0), 5);
        five.push(plain_move(13, 8));
        moves.push(five);
        let mut deps = ArrayVec::new();
        deps.push(RollId(0));
        deps.push(RollId(1));
        let mut sum = RollMoves::sum(RollId(2), 8, deps);
        sum.push(plain_move(13, 8));
        moves.push(sum);

        let spec = MoveSpec::between(pip(13), pip(8));
        let found = moves.find(&spec).unwrap();
        assert_eq!(found.roll, RollId(0));

        let in_sum = moves.find_valued(&spec, 8).unwrap();
        assert_eq!(in_sum.roll, RollId(2));
    }

    #[test]
    fn move_refs_resolve_against_the_graph() {
        let mut moves = Moves::default();
        let mut set = RollMoves::normal(RollId(0), 4);
        set.push(plain_move(24, 20));
        set.push(plain_move(13, 9));
        moves.push(set);

        let mref = MoveRef::new(RollId(0), 1);
        assert_eq!(moves.resolve(mref), Some(&plain_move(13, 9)));
        assert!(moves.resolve(MoveRef::new(RollId(1), 0)).is_none());

        moves.consume(RollId(0));
        assert!(moves.resolve(mref).is_none());
    }
}
