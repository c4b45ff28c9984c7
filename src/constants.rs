//! Engine defaults and bitboard geometry constants.
//!
//! Board sizes are chosen at runtime (see [`crate::board::Size`]), so the
//! only geometry fixed at compile time is the word count of a
//! [`crate::bitboard::Bitboard`], which must cover the largest board.

// =============================================================================
// Bitboard Geometry
// =============================================================================

/// Number of 64-bit words in a bitboard.
pub const WORDS: usize = 6;

/// Bits available in a bitboard (384, enough for 19x19 = 361 cells).
pub const MAX_CAPACITY: usize = WORDS * 64;

/// Largest supported line length.
pub const MAX_LINE: usize = 19;

// =============================================================================
// Engine Identity
// =============================================================================

/// Name reported over GTP.
pub const ENGINE_NAME: &str = "Isana";

/// GTP protocol version implemented by the command loop.
pub const PROTOCOL_VERSION: &str = "2";

// =============================================================================
// UCT Search Parameters
// =============================================================================

/// Default number of descents per `ponder` call.
pub const DEFAULT_TRIALS: usize = 2000;

/// Default komi. White's compensation is usually set over GTP.
pub const DEFAULT_KOMI: f64 = 0.0;

/// Exploration factor of the UCB term.
pub const UCB_FACTOR: f64 = 0.31;

/// Visits a candidate needs before the search descends below it instead of
/// running a playout.
pub const MIN_PLAYOUT: u32 = 20;

/// Maximum playout length as a multiple of the board capacity.
pub const PLAYOUT_DEPTH_FACTOR: f64 = 1.2;

/// Urgency of a candidate that has never been visited. Random jitter in
/// `[0, 1)` is added on top so ties between unvisited moves break randomly.
pub const UNVISITED_URGENCY: f64 = 10000.0;
