//! The record of the game being played over GTP.
//!
//! Keeps every position reached so far. The engine only ever sees a copy of
//! the current one.

use crate::board::{Size, Stone};
use crate::moves::Move;
use crate::position::{MoveError, Position};

#[derive(Clone, Debug)]
pub struct Game {
    pub size: Size,
    pub komi: f64,
    history: Vec<Position>,
}

impl Game {
    pub fn new(size: Size, komi: f64) -> Self {
        Self {
            size,
            komi,
            history: vec![Position::new(size, komi)],
        }
    }

    /// Back to an empty board, keeping size and komi.
    pub fn clear(&mut self) {
        self.history = vec![Position::new(self.size, self.komi)];
    }

    /// Change the board size. Clears the board.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.clear();
    }

    pub fn set_komi(&mut self, komi: f64) {
        self.komi = komi;
        for position in &mut self.history {
            position.komi = komi;
        }
    }

    pub fn current(&self) -> &Position {
        // `history` is never empty: `new` and `clear` seed it
        &self.history[self.history.len() - 1]
    }

    /// Play `mv` on the current position. The record is unchanged if the
    /// move is illegal.
    pub fn make_move(&mut self, mv: &Move) -> Result<(), MoveError> {
        let next = self.current().apply(mv)?;
        self.history.push(next);
        Ok(())
    }

    pub fn pass(&mut self, stone: Stone) {
        let mut next = self.current().successor();
        next.pass(stone);
        self.history.push(next);
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.current().last_move()
    }

    /// Moves played so far, passes included.
    pub fn move_count(&self) -> usize {
        self.history.len() - 1
    }

    /// Area score of the current position from Black's side, with the komi
    /// the position was played under.
    pub fn final_score(&self) -> f64 {
        let position = self.current();
        position.score(Stone::Black, position.komi)
    }
}
