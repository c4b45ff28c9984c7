//! Monte Carlo Tree Search with UCT selection.
//!
//! This module implements:
//! - UCB1 selection, with every untried candidate taken before any revisit
//! - Expansion of a node's candidate list exactly once
//! - Random playouts below a visit threshold, deeper tree descent above it
//! - Zero-sum backup: each level negates the result of the level below
//!
//! The tree is shared by all descents of a `ponder` call. Every node sits
//! behind its own mutex, held only while expanding, selecting or backing up;
//! playouts run on private copies with no lock held.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use rayon::prelude::*;

use crate::board::Stone;
use crate::constants::{
    DEFAULT_KOMI, DEFAULT_TRIALS, MIN_PLAYOUT, PLAYOUT_DEPTH_FACTOR, UCB_FACTOR,
    UNVISITED_URGENCY,
};
use crate::moves::Move;
use crate::playout::playout;
use crate::position::Position;

/// How the descents of one `ponder` call are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Descents run concurrently on the rayon thread pool.
    #[default]
    Parallel,
    /// Descents run one after another on the calling thread. With a fixed
    /// seed the search is fully reproducible.
    Sequential,
}

/// Search parameters, owned by the session driving the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub komi: f64,
    /// Descents per `ponder` call
    pub trials: usize,
    /// Exploration factor of the UCB term
    pub ucb_factor: f64,
    /// Visits a candidate needs before the search grows the tree below it
    pub min_playout: u32,
    /// Playout length as a multiple of the board capacity
    pub depth_factor: f64,
    pub mode: SearchMode,
    /// Base seed for the per-descent random generators. Random if unset.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            komi: DEFAULT_KOMI,
            trials: DEFAULT_TRIALS,
            ucb_factor: UCB_FACTOR,
            min_playout: MIN_PLAYOUT,
            depth_factor: PLAYOUT_DEPTH_FACTOR,
            mode: SearchMode::default(),
            seed: None,
        }
    }
}

/// A node in the search tree.
///
/// The node's position carries the candidate moves and their statistics;
/// `children` runs parallel to that list and holds the subtree below each
/// candidate once it has been visited often enough.
pub struct Node {
    state: Mutex<NodeState>,
}

struct NodeState {
    position: Position,
    children: Vec<Option<Arc<Node>>>,
}

/// Where a descent continues after choosing a candidate.
enum Next {
    Playout(Position),
    Descend(Arc<Node>),
}

impl Node {
    pub fn new(position: Position) -> Self {
        let children = vec![None; position.moves.len()];
        Self {
            state: Mutex::new(NodeState { position, children }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Descents backed up through this node so far.
    pub fn visits(&self) -> f64 {
        self.lock().position.visits
    }

    /// The node's position, with the statistics gathered by the search.
    pub fn into_position(self) -> Position {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .position
    }
}

impl NodeState {
    /// Populate the candidate list on the first visit: every empty cell where
    /// `stone` may legally play, then a pass. A position that arrives with
    /// its candidates already listed keeps them.
    fn expand_once(&mut self, stone: Stone) {
        if self.position.moves.is_empty() {
            let position = &self.position;
            let mut candidates: Vec<Move> = position
                .empty_vertices()
                .map(|vertex| Move::new(stone, vertex))
                .filter(|mv| position.check(mv).is_ok())
                .collect();
            candidates.push(Move::pass(stone));
            self.position.moves = candidates;
        }
        // `children` runs parallel to `moves`
        if self.children.len() != self.position.moves.len() {
            self.children.resize(self.position.moves.len(), None);
        }
    }

    /// Index of the candidate with the highest UCB score.
    fn select(&self, ucb_factor: f64, rng: &mut fastrand::Rng) -> usize {
        let log_visits = self.position.visits.log10();
        let mut selected = 0;
        let mut max_ucb = f64::NEG_INFINITY;
        for (i, mv) in self.position.moves.iter().enumerate() {
            let ucb = if mv.visits == 0.0 {
                UNVISITED_URGENCY + rng.f64()
            } else {
                mv.rate + ucb_factor * (log_visits / mv.visits).sqrt()
            };
            if ucb > max_ucb {
                max_ucb = ucb;
                selected = i;
            }
        }
        selected
    }

    fn record_visit(&mut self, index: usize, win: f64) {
        self.position.moves[index].record(win);
        self.position.visits += 1.0;
    }
}

/// The position after `mv`. A move that no longer applies is replaced by a
/// pass.
fn successor_of(position: &Position, mv: &Move) -> Position {
    position.apply(mv).unwrap_or_else(|err| {
        debug!("{err} while descending, passing instead");
        let mut next = position.successor();
        next.pass(mv.stone);
        next
    })
}

/// The UCT search engine.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    pub config: Config,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run `config.trials` descents from `position` with `stone` to move and
    /// return the most visited candidate, or a pass if there is none.
    ///
    /// The root statistics are left in `position.moves` and
    /// `position.visits`.
    pub fn ponder(&self, position: &mut Position, stone: Stone) -> Move {
        let max_depth = (position.size.capacity() as f64 * self.config.depth_factor) as usize;
        let seed = self.config.seed.unwrap_or_else(|| fastrand::u64(..));
        let root = Node::new(position.clone());

        let trial = |i: usize| {
            let mut rng = fastrand::Rng::with_seed(seed.wrapping_add(i as u64));
            self.descend(&root, stone, &mut rng, max_depth);
        };
        match self.config.mode {
            SearchMode::Parallel => (0..self.config.trials).into_par_iter().for_each(trial),
            SearchMode::Sequential => (0..self.config.trials).for_each(trial),
        }

        *position = root.into_position();

        let mut selected: Option<&Move> = None;
        for mv in &position.moves {
            debug!("candidate {:?} visits={} rate={:.3}", mv.vertex, mv.visits, mv.rate);
            if selected.is_none_or(|best| mv.visits > best.visits) {
                selected = Some(mv);
            }
        }
        let selected = selected.copied().unwrap_or_else(|| Move::pass(stone));
        info!(
            "selected {:?} for {stone}: visits={} rate={:.3} of {} descents",
            selected.vertex, selected.visits, selected.rate, position.visits
        );
        selected
    }

    /// One descent from `node` with `stone` to move. Returns the result from
    /// `stone`'s side, after backing it up into the node.
    pub fn descend(
        &self,
        node: &Node,
        stone: Stone,
        rng: &mut fastrand::Rng,
        max_depth: usize,
    ) -> f64 {
        let (index, next) = {
            let mut guard = node.lock();
            let state = &mut *guard;
            state.expand_once(stone);
            let index = state.select(self.config.ucb_factor, rng);
            let mv = state.position.moves[index];

            let next = if mv.visits < f64::from(self.config.min_playout) {
                Next::Playout(successor_of(&state.position, &mv))
            } else {
                let child = state.children[index].get_or_insert_with(|| {
                    Arc::new(Node::new(successor_of(&state.position, &mv)))
                });
                Next::Descend(Arc::clone(child))
            };
            (index, next)
        };

        let win = match next {
            Next::Playout(position) => {
                -playout(position, stone.opposite(), self.config.komi, max_depth, rng)
            }
            Next::Descend(child) => -self.descend(&child, stone.opposite(), rng, max_depth),
        };

        node.lock().record_visit(index, win);
        win
    }

    /// Choose a move for `stone` in `position`.
    ///
    /// If the opponent just passed and `stone` is already ahead on the board,
    /// passing ends the game in its favour. Otherwise the search runs on a
    /// copy of `position` with fresh statistics.
    pub fn answer(&self, position: &Position, stone: Stone, last: Option<&Move>) -> Move {
        if last.is_some_and(Move::is_pass) && position.score(stone, self.config.komi) > 0.0 {
            info!("opponent passed and {stone} is ahead, passing");
            return Move::pass(stone);
        }
        let mut root = position.successor();
        self.ponder(&mut root, stone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Size, Vertex};

    fn engine(trials: usize, min_playout: u32, mode: SearchMode) -> Engine {
        Engine::new(Config {
            trials,
            min_playout,
            mode,
            seed: Some(2014),
            ..Config::default()
        })
    }

    fn total_visits(position: &Position) -> f64 {
        position.moves.iter().map(|mv| mv.visits).sum()
    }

    #[test]
    fn test_ponder_zero_trials_passes() {
        let engine = engine(0, MIN_PLAYOUT, SearchMode::Sequential);
        let mut pos = Position::new(Size::B9x9, 0.0);
        let mv = engine.ponder(&mut pos, Stone::Black);
        assert!(mv.is_pass());
        assert!(pos.moves.is_empty());
    }

    #[test]
    fn test_expansion_lists_every_legal_move_and_pass() {
        let engine = engine(1, MIN_PLAYOUT, SearchMode::Sequential);
        let mut pos = Position::new(Size::B9x9, 0.0);
        engine.ponder(&mut pos, Stone::Black);
        assert_eq!(pos.moves.len(), 82);
        assert!(pos.moves.last().is_some_and(Move::is_pass));
        assert!(pos.moves.iter().all(|mv| mv.stone == Stone::Black));
    }

    #[test]
    fn test_expansion_skips_illegal_moves() {
        let mut pos = Position::new(Size::B9x9, 0.0);
        pos.set_stone(Vertex::new(1, 0, Size::B9x9), Stone::Black);
        pos.set_stone(Vertex::new(0, 1, Size::B9x9), Stone::Black);
        let engine = engine(1, MIN_PLAYOUT, SearchMode::Sequential);
        engine.ponder(&mut pos, Stone::White);
        // Two occupied cells and the suicide point are missing; pass is added
        assert_eq!(pos.moves.len(), 81 - 3 + 1);
        assert!(
            !pos.moves
                .iter()
                .any(|mv| mv.vertex == Vertex::new(0, 0, Size::B9x9))
        );
    }

    #[test]
    fn test_every_candidate_tried_before_revisit() {
        let engine = engine(82, MIN_PLAYOUT, SearchMode::Sequential);
        let mut pos = Position::new(Size::B9x9, 0.0);
        engine.ponder(&mut pos, Stone::Black);
        assert!(pos.moves.iter().all(|mv| mv.visits == 1.0));
    }

    #[test]
    fn test_seeded_search_on_empty_board() {
        let engine = engine(200, 5, SearchMode::Sequential);
        let mut pos = Position::new(Size::B9x9, 0.0);
        let mv = engine.ponder(&mut pos, Stone::Black);

        assert!(pos.moves.iter().any(|m| m.visits > 0.0));
        assert!(mv.is_pass() || pos.moves.iter().any(|m| m.same_play(&mv)));
        assert_eq!(pos.visits, 200.0);
        assert_eq!(total_visits(&pos), 200.0);
        let best = pos.moves.iter().map(|m| m.visits).fold(0.0, f64::max);
        assert_eq!(mv.visits, best);
    }

    #[test]
    fn test_sequential_search_is_reproducible() {
        let engine = engine(120, 3, SearchMode::Sequential);
        let mut first = Position::new(Size::B9x9, 0.0);
        let mut second = Position::new(Size::B9x9, 0.0);
        let a = engine.ponder(&mut first, Stone::White);
        let b = engine.ponder(&mut second, Stone::White);
        assert!(a.same_play(&b));
        for (x, y) in first.moves.iter().zip(&second.moves) {
            assert_eq!(x.visits, y.visits);
            assert_eq!(x.rate, y.rate);
        }
    }

    #[test]
    fn test_parallel_search_accounts_for_every_descent() {
        let engine = engine(300, 2, SearchMode::Parallel);
        let mut pos = Position::new(Size::B9x9, 6.5);
        let mv = engine.ponder(&mut pos, Stone::Black);
        assert_eq!(pos.visits, 300.0);
        assert_eq!(total_visits(&pos), 300.0);
        assert!(mv.is_pass() || pos.moves.iter().any(|m| m.same_play(&mv)));
    }

    #[test]
    fn test_descend_backs_up_one_visit() {
        let engine = engine(0, 1, SearchMode::Sequential);
        let root = Node::new(Position::new(Size::B9x9, 0.0));
        let mut rng = fastrand::Rng::with_seed(9);
        for i in 1..=30 {
            engine.descend(&root, Stone::Black, &mut rng, 97);
            assert_eq!(root.visits(), i as f64);
        }
        let pos = root.into_position();
        assert_eq!(total_visits(&pos), 30.0);
    }

    #[test]
    fn test_ponder_same_position_twice() {
        let engine = engine(100, 1, SearchMode::Sequential);
        let mut pos = Position::new(Size::B9x9, 0.0);
        engine.ponder(&mut pos, Stone::Black);
        assert_eq!(pos.moves.len(), 82);
        assert_eq!(pos.visits, 100.0);

        // The candidates from the first search are kept and searched further
        let mv = engine.ponder(&mut pos, Stone::Black);
        assert_eq!(pos.moves.len(), 82);
        assert_eq!(pos.visits, 200.0);
        assert_eq!(total_visits(&pos), 200.0);
        assert!(mv.is_pass() || pos.moves.iter().any(|m| m.same_play(&mv)));
    }

    #[test]
    fn test_node_with_listed_candidates() {
        let mut pos = Position::new(Size::B9x9, 0.0);
        pos.moves = vec![
            Move::new(Stone::Black, Vertex::new(4, 4, Size::B9x9)),
            Move::pass(Stone::Black),
        ];
        let engine = engine(0, 1, SearchMode::Sequential);
        let root = Node::new(pos);
        let mut rng = fastrand::Rng::with_seed(4);
        for _ in 0..10 {
            engine.descend(&root, Stone::Black, &mut rng, 97);
        }
        let pos = root.into_position();
        assert_eq!(pos.moves.len(), 2);
        assert_eq!(total_visits(&pos), 10.0);
    }

    /// Check the visit accounting of `node` and every node below it. Returns
    /// the number of child nodes found.
    fn check_subtree(node: &Node, min_playout: f64) -> usize {
        let state = node.lock();
        let moves = &state.position.moves;
        assert_eq!(state.children.len(), moves.len());
        assert_eq!(total_visits(&state.position), state.position.visits);

        let mut found = 0;
        for (mv, child) in moves.iter().zip(&state.children) {
            let Some(child) = child else {
                continue;
            };
            // The first `min_playout` visits ran playouts, the rest descended
            assert_eq!(child.visits(), mv.visits - min_playout);
            found += 1 + check_subtree(child, min_playout);
        }
        found
    }

    #[test]
    fn test_child_nodes_account_for_every_descent() {
        let engine = engine(0, 1, SearchMode::Sequential);
        let root = Node::new(Position::new(Size::B9x9, 0.0));
        let mut rng = fastrand::Rng::with_seed(31);
        for _ in 0..400 {
            engine.descend(&root, Stone::Black, &mut rng, 97);
        }
        assert_eq!(root.visits(), 400.0);
        let children = check_subtree(&root, 1.0);
        assert!(children > 0);
    }

    #[test]
    fn test_answer_passes_when_ahead_after_pass() {
        let size = Size::B9x9;
        let mut pos = Position::new(size, 0.0);
        for row in 0..9 {
            pos.set_stone(Vertex::new(4, row, size), Stone::Black);
        }
        let engine = engine(10, MIN_PLAYOUT, SearchMode::Sequential);
        let last = Move::pass(Stone::White);
        assert!(engine.answer(&pos, Stone::Black, Some(&last)).is_pass());

        // Without the pass the search runs and picks a listed move
        let mv = engine.answer(&pos, Stone::Black, None);
        assert_eq!(mv.stone, Stone::Black);
    }
}
