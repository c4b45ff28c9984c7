//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays weighted-random moves on a private copy of a position
//! until both sides pass in a row or the depth budget runs out, then scores
//! the final board. Moves are drawn through the position's
//! [`crate::probability::Probability`] weights, so each draw costs one scan of
//! the weights instead of a rebuilt candidate list.

use log::trace;

use crate::board::{Stone, Vertex};
use crate::moves::Move;
use crate::position::Position;

/// Play `position` out to the end, `stone` moving first.
///
/// Returns the area score from `stone`'s side:
/// - Positive score = `stone` is ahead
/// - Negative score = `stone` is behind
pub fn playout(
    mut position: Position,
    stone: Stone,
    komi: f64,
    max_depth: usize,
    rng: &mut fastrand::Rng,
) -> f64 {
    position.init_probs();

    let mut turn = stone;
    let mut passed = false;
    for _ in 0..max_depth {
        let mv = sample_move(&mut position, turn, rng);
        if mv.is_pass() || position.fix_move(&mv).is_err() {
            if passed {
                break;
            }
            passed = true;
        } else {
            passed = false;
        }
        turn = turn.opposite();
    }

    let score = position.score(stone, komi);
    trace!("playout after {} moves: {score}", position.history().len());
    score
}

/// Draw a random move for `stone`.
///
/// Cells are drawn by weight. A drawn cell is zeroed; if the move there is
/// illegal or fills one of `stone`'s own eyes, the cell stays zeroed while the
/// next one is drawn and gets its weight back afterwards. The number of draws
/// is bounded by the number of empty cells. Returns a pass when nothing
/// acceptable is left.
pub fn sample_move(position: &mut Position, stone: Stone, rng: &mut fastrand::Rng) -> Move {
    if position.probs.total() <= 0 {
        return Move::pass(stone);
    }

    let budget = position.empties().count() as usize;
    let mut skipped: Vec<(usize, i32)> = Vec::new();
    let mut chosen = Move::pass(stone);

    while position.probs.total() > 0 && skipped.len() < budget {
        let index = position.probs.pick(rng.i32(0..position.probs.total()));
        let weight = position.probs.weight(index);
        position.probs.update(index, 0);

        let mv = Move::new(stone, Vertex::Point(index));
        if position.check(&mv).is_ok() && !position.is_fill_eye(&mv) {
            chosen = mv;
            break;
        }
        skipped.push((index, weight));
    }

    for (index, weight) in skipped {
        position.probs.update(index, weight);
    }
    chosen
}
