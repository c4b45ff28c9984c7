//! Board vocabulary shared by every layer: sizes, vertices and stones.
//!
//! Cells are numbered row by row from the bottom-left corner, so the cell at
//! `(col, row)` has index `row * line + col`. Rows are packed back to back in
//! the bitboard with no padding between them; the per-size [`Masks`] are what
//! keep shifted bits from wrapping between rows or leaking past the board.

use std::fmt;

use crate::bitboard::Bitboard;
use crate::constants::WORDS;

/// A stone (or the lack of one) on a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stone {
    Empty,
    Wall,
    Black,
    White,
}

impl Stone {
    /// The other player's colour. `Empty` and `Wall` are returned unchanged.
    pub fn opposite(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            other => other,
        }
    }

    /// True for `Black` and `White`.
    pub fn is_player(self) -> bool {
        matches!(self, Stone::Black | Stone::White)
    }

    pub fn to_char(self) -> char {
        match self {
            Stone::Empty => '.',
            Stone::Wall => '#',
            Stone::Black => 'X',
            Stone::White => 'O',
        }
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stone::Empty => "empty",
            Stone::Wall => "wall",
            Stone::Black => "black",
            Stone::White => "white",
        };
        write!(f, "{name}")
    }
}

/// Per-size bitboard masks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Masks {
    /// Every cell of the board (indices `0..capacity`).
    pub valid: Bitboard,
    /// The board minus column 0. Applied after shifting towards higher
    /// indices, where column 0 can only be reached by wrapping.
    pub not_first_col: Bitboard,
    /// The board minus the last column. Applied after shifting towards lower
    /// indices.
    pub not_last_col: Bitboard,
}

impl Masks {
    const fn build(line: usize) -> Self {
        let mut valid = [0u64; WORDS];
        let mut not_first = [0u64; WORDS];
        let mut not_last = [0u64; WORDS];
        let mut i = 0;
        while i < line * line {
            let bit = 1u64 << (i % 64);
            valid[i / 64] |= bit;
            if i % line != 0 {
                not_first[i / 64] |= bit;
            }
            if i % line != line - 1 {
                not_last[i / 64] |= bit;
            }
            i += 1;
        }
        Masks {
            valid: Bitboard::from_words(valid),
            not_first_col: Bitboard::from_words(not_first),
            not_last_col: Bitboard::from_words(not_last),
        }
    }
}

static MASKS_9X9: Masks = Masks::build(9);
static MASKS_11X11: Masks = Masks::build(11);
static MASKS_13X13: Masks = Masks::build(13);
static MASKS_15X15: Masks = Masks::build(15);
static MASKS_19X19: Masks = Masks::build(19);

/// Supported board sizes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Size {
    B9x9,
    B11x11,
    B13x13,
    B15x15,
    #[default]
    B19x19,
}

impl Size {
    pub const ALL: [Size; 5] = [
        Size::B9x9,
        Size::B11x11,
        Size::B13x13,
        Size::B15x15,
        Size::B19x19,
    ];

    /// Cells per row (and per column).
    pub const fn line(self) -> usize {
        match self {
            Size::B9x9 => 9,
            Size::B11x11 => 11,
            Size::B13x13 => 13,
            Size::B15x15 => 15,
            Size::B19x19 => 19,
        }
    }

    /// Number of cells on the board.
    pub const fn capacity(self) -> usize {
        self.line() * self.line()
    }

    pub fn from_line(line: usize) -> Option<Size> {
        Size::ALL.into_iter().find(|size| size.line() == line)
    }

    pub fn masks(self) -> &'static Masks {
        match self {
            Size::B9x9 => &MASKS_9X9,
            Size::B11x11 => &MASKS_11X11,
            Size::B13x13 => &MASKS_13X13,
            Size::B15x15 => &MASKS_15X15,
            Size::B19x19 => &MASKS_19X19,
        }
    }

    #[inline]
    pub fn valid(self) -> Bitboard {
        self.masks().valid
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}x{0}", self.line())
    }
}

/// A cell of the board, or `Outbound` for a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Vertex {
    Point(usize),
    Outbound,
}

impl Vertex {
    /// The vertex at `(col, row)`, or `Outbound` if that is off the board.
    pub fn new(col: usize, row: usize, size: Size) -> Vertex {
        let line = size.line();
        if col < line && row < line {
            Vertex::Point(row * line + col)
        } else {
            Vertex::Outbound
        }
    }

    pub fn index(self) -> Option<usize> {
        match self {
            Vertex::Point(index) => Some(index),
            Vertex::Outbound => None,
        }
    }

    pub fn is_outbound(self) -> bool {
        self == Vertex::Outbound
    }

    /// Column and row of the vertex, counted from the bottom-left corner.
    pub fn col_row(self, size: Size) -> Option<(usize, usize)> {
        self.index()
            .map(|index| (index % size.line(), index / size.line()))
    }
}
