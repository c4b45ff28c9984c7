//! Packed bit-vector board.
//!
//! Bit `i` stands for cell `i` of the active [`Size`]. Bits at or beyond the
//! board's capacity are padding: the size-aware shifts keep them clear, but
//! `!` sets them, so callers mask with [`Size::valid`] after complementing.
//!
//! Directions follow the cell numbering in [`crate::board`]:
//! - left: column − 1 (towards lower indices)
//! - right: column + 1 (towards higher indices)
//! - up: row + 1 (`+line`)
//! - down: row − 1 (`−line`)

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use crate::board::Size;
use crate::constants::{MAX_CAPACITY, WORDS};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bitboard {
    words: [u64; WORDS],
}

impl Bitboard {
    /// All bits zero.
    #[inline]
    pub const fn empty() -> Self {
        Bitboard { words: [0; WORDS] }
    }

    /// Construct from raw words.
    #[inline]
    pub const fn from_words(words: [u64; WORDS]) -> Self {
        Bitboard { words }
    }

    /// Single bit set at `index`.
    #[inline]
    pub fn single(index: usize) -> Self {
        let mut bb = Self::empty();
        bb.set(index);
        bb
    }

    #[inline]
    pub fn words(&self) -> &[u64; WORDS] {
        &self.words
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        debug_assert!(index < MAX_CAPACITY);
        (self.words[index / 64] >> (index % 64)) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < MAX_CAPACITY);
        self.words[index / 64] |= 1u64 << (index % 64);
    }

    #[inline]
    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < MAX_CAPACITY);
        self.words[index / 64] &= !(1u64 << (index % 64));
    }

    /// Population count.
    #[inline]
    pub fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Index of the lowest set bit.
    #[inline]
    pub fn lowest(&self) -> Option<usize> {
        self.words
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
    }

    #[inline]
    pub fn iter_ones(&self) -> BitIterator {
        BitIterator {
            words: self.words,
            word_index: 0,
        }
    }

    /// Every bit moved `n` places towards higher indices. Bits pushed past the
    /// last word are lost.
    fn raise(&self, n: usize) -> Self {
        let word_shift = n / 64;
        let bit_shift = n % 64;
        let mut out = [0u64; WORDS];
        for i in word_shift..WORDS {
            out[i] = self.words[i - word_shift] << bit_shift;
            if bit_shift != 0 && i > word_shift {
                out[i] |= self.words[i - word_shift - 1] >> (64 - bit_shift);
            }
        }
        Bitboard { words: out }
    }

    /// Every bit moved `n` places towards lower indices. Bits pushed below 0
    /// are lost.
    fn lower(&self, n: usize) -> Self {
        let word_shift = n / 64;
        let bit_shift = n % 64;
        let mut out = [0u64; WORDS];
        for i in 0..WORDS - word_shift {
            out[i] = self.words[i + word_shift] >> bit_shift;
            if bit_shift != 0 && i + word_shift + 1 < WORDS {
                out[i] |= self.words[i + word_shift + 1] << (64 - bit_shift);
            }
        }
        Bitboard { words: out }
    }

    /// Each stone moved one column left. Column 0 falls off the board.
    #[inline]
    pub fn shift_left(&self, size: Size) -> Self {
        self.lower(1) & size.masks().not_last_col
    }

    /// Each stone moved one column right. The last column falls off the board.
    #[inline]
    pub fn shift_right(&self, size: Size) -> Self {
        self.raise(1) & size.masks().not_first_col
    }

    /// Each stone moved one row up. The top row falls off the board.
    #[inline]
    pub fn shift_up(&self, size: Size) -> Self {
        self.raise(size.line()) & size.valid()
    }

    /// Each stone moved one row down. The bottom row falls off the board.
    #[inline]
    pub fn shift_down(&self, size: Size) -> Self {
        self.lower(size.line()) & size.valid()
    }

    /// All cells orthogonally adjacent to some bit of `self`.
    #[inline]
    pub fn neighbors(&self, size: Size) -> Self {
        self.shift_left(size) | self.shift_right(size) | self.shift_up(size) | self.shift_down(size)
    }

    /// All cells diagonally adjacent to some bit of `self`.
    #[inline]
    pub fn diagonals(&self, size: Size) -> Self {
        let up = self.shift_up(size);
        let down = self.shift_down(size);
        up.shift_left(size) | up.shift_right(size) | down.shift_left(size) | down.shift_right(size)
    }

    /// The connected component of `self` within `mask`.
    pub fn flood_fill(&self, mask: Bitboard, size: Size) -> Self {
        let mut filled = *self & mask;
        loop {
            let expanded = (filled | filled.neighbors(size)) & mask;
            if expanded == filled {
                return filled;
            }
            filled = expanded;
        }
    }
}

impl BitAnd for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitand(mut self, rhs: Bitboard) -> Bitboard {
        self &= rhs;
        self
    }
}

impl BitAndAssign for Bitboard {
    #[inline]
    fn bitand_assign(&mut self, rhs: Bitboard) {
        for (w, r) in self.words.iter_mut().zip(rhs.words) {
            *w &= r;
        }
    }
}

impl BitOr for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitor(mut self, rhs: Bitboard) -> Bitboard {
        self |= rhs;
        self
    }
}

impl BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Bitboard) {
        for (w, r) in self.words.iter_mut().zip(rhs.words) {
            *w |= r;
        }
    }
}

impl BitXor for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitxor(mut self, rhs: Bitboard) -> Bitboard {
        self ^= rhs;
        self
    }
}

impl BitXorAssign for Bitboard {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Bitboard) {
        for (w, r) in self.words.iter_mut().zip(rhs.words) {
            *w ^= r;
        }
    }
}

impl Not for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn not(self) -> Bitboard {
        Bitboard {
            words: self.words.map(|w| !w),
        }
    }
}

/// Iterator over set-bit indices in a `Bitboard`.
pub struct BitIterator {
    words: [u64; WORDS],
    word_index: usize,
}

impl Iterator for BitIterator {
    type Item = usize;
    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.word_index < WORDS {
            let w = self.words[self.word_index];
            if w != 0 {
                let bit = w.trailing_zeros() as usize;
                self.words[self.word_index] = w & (w - 1);
                return Some(self.word_index * 64 + bit);
            }
            self.word_index += 1;
        }
        None
    }
}
