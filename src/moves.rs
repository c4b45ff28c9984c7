//! Moves, doubling as search-tree edges.

use crate::board::{Stone, Vertex};

/// A stone placed on a vertex, or a pass when the vertex is `Outbound`.
///
/// When a move sits in a position's candidate list, `rate` and `visits` are
/// the statistics of that edge of the search tree: `visits` counts the
/// descents backed up through it and `rate` is the running average of their
/// results, seen from `stone`'s side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Move {
    pub stone: Stone,
    pub vertex: Vertex,
    pub rate: f64,
    pub visits: f64,
}

impl Move {
    pub fn new(stone: Stone, vertex: Vertex) -> Self {
        Move {
            stone,
            vertex,
            rate: 0.0,
            visits: 0.0,
        }
    }

    pub fn pass(stone: Stone) -> Self {
        Self::new(stone, Vertex::Outbound)
    }

    #[inline]
    pub fn is_pass(&self) -> bool {
        self.vertex.is_outbound()
    }

    /// Same stone and vertex, statistics ignored.
    pub fn same_play(&self, other: &Move) -> bool {
        self.stone == other.stone && self.vertex == other.vertex
    }

    /// Fold one more backed-up result into the running average.
    pub fn record(&mut self, win: f64) {
        self.rate = (self.rate * self.visits + win) / (self.visits + 1.0);
        self.visits += 1.0;
    }
}
