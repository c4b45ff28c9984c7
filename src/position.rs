//! Go position representation and move execution.
//!
//! This module provides the core game logic, including:
//! - Board state as one [`Bitboard`] per colour
//! - Stone placement, capture resolution and suicide detection on bitboards
//! - Simple ko enforcement
//! - Fill-eye detection for playout quality
//! - Area scoring
//!
//! A position is also a node of the search tree: `moves` holds the candidate
//! moves with their statistics and `visits` counts the descents through it.
//! Cloning a position is a deep copy, which is how playouts get a private
//! board to play on.

use crate::bitboard::Bitboard;
use crate::board::{Size, Stone, Vertex};
use crate::moves::Move;
use crate::probability::Probability;

/// Why a move could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// Point is not empty
    Occupied,
    /// Move retakes a ko immediately
    Ko,
    /// Move would leave its own group without liberties
    Suicide,
    /// The stone to place is neither black nor white
    NotPlayer,
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveError::Occupied => write!(f, "illegal move: point not empty"),
            MoveError::Ko => write!(f, "illegal move: retakes ko"),
            MoveError::Suicide => write!(f, "illegal move: suicide"),
            MoveError::NotPlayer => write!(f, "illegal move: not a player's stone"),
        }
    }
}

impl std::error::Error for MoveError {}

/// The outcome of a legal stone placement, ready to be committed.
struct Placement {
    stone: Stone,
    index: usize,
    own: Bitboard,
    opp: Bitboard,
    captured: Bitboard,
    ko: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Position {
    pub size: Size,
    black: Bitboard,
    white: Bitboard,
    /// White stones captured by Black
    pub black_prisoners: u32,
    /// Black stones captured by White
    pub white_prisoners: u32,
    /// Komi of the game this position belongs to. [`Position::score`] takes
    /// komi as an argument, so searches may score with their own.
    pub komi: f64,
    ko: Option<usize>,
    /// Candidate moves of this search node, with their statistics
    pub moves: Vec<Move>,
    /// Descents backed up through this node
    pub visits: f64,
    /// Playout sampling weights. Left uninitialised outside playouts.
    pub probs: Probability,
    history: Vec<Move>,
}

impl Position {
    pub fn new(size: Size, komi: f64) -> Self {
        Position {
            size,
            black: Bitboard::empty(),
            white: Bitboard::empty(),
            black_prisoners: 0,
            white_prisoners: 0,
            komi,
            ko: None,
            moves: Vec::new(),
            visits: 0.0,
            probs: Probability::default(),
            history: Vec::new(),
        }
    }

    /// The same board with an empty candidate list and no statistics.
    pub fn successor(&self) -> Position {
        Position {
            size: self.size,
            black: self.black,
            white: self.white,
            black_prisoners: self.black_prisoners,
            white_prisoners: self.white_prisoners,
            komi: self.komi,
            ko: self.ko,
            moves: Vec::new(),
            visits: 0.0,
            probs: Probability::default(),
            history: self.history.clone(),
        }
    }

    /// Cells holding `stone`. For `Empty` these are the empty cells; `Wall`
    /// has no cells on the board.
    pub fn stones(&self, stone: Stone) -> Bitboard {
        match stone {
            Stone::Black => self.black,
            Stone::White => self.white,
            Stone::Empty => self.empties(),
            Stone::Wall => Bitboard::empty(),
        }
    }

    #[inline]
    pub fn empties(&self) -> Bitboard {
        !(self.black | self.white) & self.size.valid()
    }

    pub fn empty_vertices(&self) -> impl Iterator<Item = Vertex> + use<> {
        self.empties().iter_ones().map(Vertex::Point)
    }

    /// The stone on `vertex`. Off-board vertices read as `Wall`.
    pub fn stone_at(&self, vertex: Vertex) -> Stone {
        match vertex.index() {
            Some(i) if i < self.size.capacity() => {
                if self.black.get(i) {
                    Stone::Black
                } else if self.white.get(i) {
                    Stone::White
                } else {
                    Stone::Empty
                }
            }
            _ => Stone::Wall,
        }
    }

    /// Stones captured by `stone`.
    pub fn prisoners(&self, stone: Stone) -> u32 {
        match stone {
            Stone::Black => self.black_prisoners,
            Stone::White => self.white_prisoners,
            _ => 0,
        }
    }

    pub fn ko(&self) -> Option<Vertex> {
        self.ko.map(Vertex::Point)
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    /// Put `stone` on `vertex` without any rule checks. `Empty` removes
    /// whatever is there. Used to set up positions.
    pub fn set_stone(&mut self, vertex: Vertex, stone: Stone) {
        let Some(index) = vertex.index() else {
            return;
        };
        debug_assert!(index < self.size.capacity());
        self.black.clear(index);
        self.white.clear(index);
        match stone {
            Stone::Black => self.black.set(index),
            Stone::White => self.white.set(index),
            _ => {}
        }
    }

    /// Work out what placing `stone` on `index` does, without touching the
    /// board.
    fn resolve(&self, stone: Stone, index: usize) -> Result<Placement, MoveError> {
        let size = self.size;
        debug_assert!(index < size.capacity());
        if !stone.is_player() {
            return Err(MoveError::NotPlayer);
        }
        if !self.empties().get(index) {
            return Err(MoveError::Occupied);
        }
        if self.ko == Some(index) {
            return Err(MoveError::Ko);
        }

        let placed = Bitboard::single(index);
        let own = self.stones(stone) | placed;
        let mut opp = self.stones(stone.opposite());
        let free = !(own | opp) & size.valid();

        // Opposing groups next to the new stone that lost their last liberty
        let mut captured = Bitboard::empty();
        let mut targets = placed.neighbors(size) & opp;
        while let Some(seed) = targets.lowest() {
            let group = Bitboard::single(seed).flood_fill(opp, size);
            targets &= !group;
            if (group.neighbors(size) & free).is_empty() {
                captured |= group;
            }
        }
        opp ^= captured;

        let group = placed.flood_fill(own, size);
        let liberties = group.neighbors(size) & !(own | opp) & size.valid();
        if liberties.is_empty() {
            return Err(MoveError::Suicide);
        }

        let ko = if captured.count() == 1 && group.count() == 1 && liberties.count() == 1 {
            captured.lowest()
        } else {
            None
        };

        Ok(Placement {
            stone,
            index,
            own,
            opp,
            captured,
            ko,
        })
    }

    fn commit(&mut self, placement: Placement) {
        let taken = placement.captured.count();
        match placement.stone {
            Stone::Black => {
                self.black = placement.own;
                self.white = placement.opp;
                self.black_prisoners += taken;
            }
            _ => {
                self.white = placement.own;
                self.black = placement.opp;
                self.white_prisoners += taken;
            }
        }
        self.ko = placement.ko;

        if !self.probs.is_uninit() {
            self.probs.update(placement.index, 0);
            for i in placement.captured.iter_ones() {
                self.probs.update(i, 1);
            }
        }

        self.history
            .push(Move::new(placement.stone, Vertex::Point(placement.index)));
    }

    /// Whether `mv` could be played here. Passes are always legal.
    pub fn check(&self, mv: &Move) -> Result<(), MoveError> {
        match mv.vertex {
            Vertex::Outbound => Ok(()),
            Vertex::Point(index) => self.resolve(mv.stone, index).map(|_| ()),
        }
    }

    /// The position after `mv`, with a fresh candidate list.
    pub fn apply(&self, mv: &Move) -> Result<Position, MoveError> {
        let placement = match mv.vertex {
            Vertex::Outbound => None,
            Vertex::Point(index) => Some(self.resolve(mv.stone, index)?),
        };
        let mut next = self.successor();
        match placement {
            Some(placement) => next.commit(placement),
            None => next.pass(mv.stone),
        }
        Ok(next)
    }

    /// Play `mv` on this board in place. Candidate statistics are left
    /// alone; the sampling weights follow the board if they are in use.
    pub fn fix_move(&mut self, mv: &Move) -> Result<(), MoveError> {
        match mv.vertex {
            Vertex::Outbound => self.pass(mv.stone),
            Vertex::Point(index) => {
                let placement = self.resolve(mv.stone, index)?;
                self.commit(placement);
            }
        }
        Ok(())
    }

    /// Record a pass by `stone`. Lifts any ko ban.
    pub fn pass(&mut self, stone: Stone) {
        self.ko = None;
        self.history.push(Move::pass(stone));
    }

    pub fn is_suicide(&self, mv: &Move) -> bool {
        self.check(mv) == Err(MoveError::Suicide)
    }

    /// True if `mv` fills one of the mover's own eyes: every on-board
    /// orthogonal neighbour is the mover's and no diagonal neighbour is the
    /// opponent's.
    pub fn is_fill_eye(&self, mv: &Move) -> bool {
        let Some(index) = mv.vertex.index() else {
            return false;
        };
        if !mv.stone.is_player() || !self.empties().get(index) {
            return false;
        }
        let cell = Bitboard::single(index);
        let own = self.stones(mv.stone);
        let opp = self.stones(mv.stone.opposite());
        (cell.neighbors(self.size) & !own).is_empty()
            && (cell.diagonals(self.size) & opp).is_empty()
    }

    /// Area score from `stone`'s side: stones on the board, empty regions
    /// bordered by one colour only, and prisoners; komi goes to White.
    pub fn score(&self, stone: Stone, komi: f64) -> f64 {
        let size = self.size;
        let empties = self.empties();
        let mut black = f64::from(self.black.count() + self.black_prisoners);
        let mut white = f64::from(self.white.count() + self.white_prisoners);

        let mut remaining = empties;
        while let Some(seed) = remaining.lowest() {
            let region = Bitboard::single(seed).flood_fill(empties, size);
            remaining &= !region;
            let border = region.neighbors(size);
            let by_black = !(border & self.black).is_empty();
            let by_white = !(border & self.white).is_empty();
            match (by_black, by_white) {
                (true, false) => black += f64::from(region.count()),
                (false, true) => white += f64::from(region.count()),
                _ => {}
            }
        }

        let diff = black - white - komi;
        if stone == Stone::White { -diff } else { diff }
    }

    /// Reset the playout sampling weights to the current empty cells.
    pub fn init_probs(&mut self) {
        let empties = self.empties();
        self.probs.init(empties, self.size.capacity());
    }
}
