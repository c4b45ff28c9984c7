//! Weighted random selection of playout moves.
//!
//! Every cell carries an integer weight; empty cells start at 1 and every
//! other cell at 0. A playout draws `r` uniformly from `[0, total)` and asks
//! [`Probability::pick`] for the cell whose cumulative interval contains it.

use crate::bitboard::Bitboard;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Probability {
    weights: Vec<i32>,
    total: i32,
}

impl Probability {
    /// Weight 1 on every cell of `empties`, 0 on every other cell of a board
    /// with `capacity` cells.
    pub fn init(&mut self, empties: Bitboard, capacity: usize) {
        self.weights.clear();
        self.weights.resize(capacity, 0);
        for i in empties.iter_ones() {
            self.weights[i] = 1;
        }
        self.total = empties.count() as i32;
    }

    /// True until [`Probability::init`] has been called.
    pub fn is_uninit(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of all weights. Zero or less means nothing is left to draw.
    #[inline]
    pub fn total(&self) -> i32 {
        self.total
    }

    #[inline]
    pub fn weight(&self, index: usize) -> i32 {
        self.weights[index]
    }

    /// The first index whose running prefix sum exceeds `r`. Falls back to the
    /// last index when `r >= total`.
    pub fn pick(&self, r: i32) -> usize {
        let mut sum = 0;
        for (i, &w) in self.weights.iter().enumerate() {
            sum += w;
            if sum > r {
                return i;
            }
        }
        self.weights.len().saturating_sub(1)
    }

    /// Overwrite the weight of `index`, keeping the cached total in step.
    #[inline]
    pub fn update(&mut self, index: usize, weight: i32) {
        self.total += weight - self.weights[index];
        self.weights[index] = weight;
    }
}
