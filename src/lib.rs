//! Isana: a Go engine built on bitboards and parallel UCT search.
//!
//! This crate provides a Monte Carlo Tree Search (MCTS) engine for Go. The
//! board is a packed bit vector, so group, liberty and territory questions
//! are answered with shifts and masks rather than per-cell walks.
//!
//! ## Modules
//!
//! - [`constants`] - Engine defaults and bitboard geometry
//! - [`bitboard`] - Packed bit-vector board with size-aware shifts
//! - [`board`] - Board sizes, vertices and stones
//! - [`probability`] - Weighted sampling of playout moves
//! - [`moves`] - Moves and their search statistics
//! - [`position`] - Core game logic (move application, captures, scoring)
//! - [`playout`] - Random game simulation for position evaluation
//! - [`mcts`] - UCT search over a shared tree
//! - [`game`] - Record of the game being played
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use isana::board::{Size, Stone};
//! use isana::mcts::{Config, Engine};
//! use isana::position::Position;
//!
//! let engine = Engine::new(Config { trials: 100, ..Config::default() });
//! let mut pos = Position::new(Size::B9x9, 6.5);
//! let best = engine.ponder(&mut pos, Stone::Black);
//! assert!(best.is_pass() || pos.moves.iter().any(|mv| mv.same_play(&best)));
//! ```

pub mod bitboard;
pub mod board;
pub mod constants;
pub mod game;
pub mod gtp;
pub mod mcts;
pub mod moves;
pub mod playout;
pub mod position;
pub mod probability;
