//! Integration tests for isana
//!
//! These exercise the public API end to end: coordinates from text, moves
//! through the game record, and searches over real positions.

use isana::bitboard::Bitboard;
use isana::board::{Size, Stone, Vertex};
use isana::game::Game;
use isana::gtp::{parse_vertex, str_vertex};
use isana::mcts::{Config, Engine, SearchMode};
use isana::moves::Move;
use isana::playout::{playout, sample_move};
use isana::position::{MoveError, Position};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

fn vertex(text: &str, size: Size) -> Vertex {
    parse_vertex(text, size).expect("valid vertex")
}

/// Play a sequence of moves, alternating Black and White, starting with
/// Black. "pass" can be used to pass.
fn setup_game(size: Size, moves: &[&str]) -> Game {
    let mut game = Game::new(size, 0.0);
    let mut stone = Stone::Black;
    for text in moves {
        let mv = Move::new(stone, vertex(text, size));
        game.make_move(&mv)
            .unwrap_or_else(|err| panic!("{text} in setup: {err}"));
        stone = stone.opposite();
    }
    game
}

fn sequential_engine(trials: usize, seed: u64) -> Engine {
    Engine::new(Config {
        trials,
        mode: SearchMode::Sequential,
        seed: Some(seed),
        ..Config::default()
    })
}

// =============================================================================
// Bitboard
// =============================================================================

#[test]
fn test_bitboard_word_layout() {
    let mut bb = Bitboard::empty();
    bb.set(3);
    assert_eq!(bb.words()[0], 0x8);
    bb.set(80);
    assert_eq!(bb.words()[1], 65536);
}

#[test]
fn test_neighbors_on_every_size() {
    for size in Size::ALL {
        let line = size.line();
        let corners = [0, line - 1, line * (line - 1), line * line - 1];
        for corner in corners {
            assert_eq!(Bitboard::single(corner).neighbors(size).count(), 2);
        }
        let center = (line / 2) * line + line / 2;
        assert_eq!(Bitboard::single(center).neighbors(size).count(), 4);
        let edge = line / 2;
        assert_eq!(Bitboard::single(edge).neighbors(size).count(), 3);
    }
}

// =============================================================================
// Move application through the game record
// =============================================================================

#[test]
fn test_capture_in_the_corner() {
    // White A1 is captured by Black A2 + B1
    let game = setup_game(Size::B9x9, &["B1", "A1", "A2"]);
    let pos = game.current();
    assert_eq!(pos.stone_at(vertex("A1", Size::B9x9)), Stone::Empty);
    assert_eq!(pos.prisoners(Stone::Black), 1);
    assert_eq!(pos.prisoners(Stone::White), 0);
}

#[test]
fn test_suicide_is_rejected() {
    let mut game = setup_game(Size::B9x9, &["B1", "pass", "A2"]);
    let mv = Move::new(Stone::White, vertex("A1", Size::B9x9));
    assert_eq!(game.make_move(&mv), Err(MoveError::Suicide));
    assert_eq!(game.move_count(), 3);
}

#[test]
fn test_ko_on_13x13() {
    let size = Size::B13x13;
    // Black: D5 C4 D3, White: E5 D4 F4 E3, Black takes at E4
    let mut game = setup_game(
        size,
        &["D5", "E5", "C4", "D4", "D3", "F4", "pass", "E3", "E4"],
    );
    assert_eq!(game.current().prisoners(Stone::Black), 1);

    let retake = Move::new(Stone::White, vertex("D4", size));
    assert_eq!(game.make_move(&retake), Err(MoveError::Ko));

    game.make_move(&Move::new(Stone::White, vertex("K10", size)))
        .expect("legal");
    game.make_move(&Move::new(Stone::Black, vertex("K11", size)))
        .expect("legal");
    game.make_move(&retake).expect("ko threat answered, retake allowed");
    assert_eq!(game.current().prisoners(Stone::White), 1);
}

#[test]
fn test_coordinates_roundtrip_on_19x19() {
    let size = Size::B19x19;
    for text in ["A1", "T19", "K10", "H8", "J8"] {
        assert_eq!(str_vertex(vertex(text, size), size), text);
    }
    assert_eq!(vertex("T19", size), Vertex::Point(360));
}

// =============================================================================
// Playouts
// =============================================================================

#[test]
fn test_playout_leaves_original_untouched() {
    let game = setup_game(Size::B9x9, &["E5", "D5", "E4"]);
    let mut pos = game.current().clone();
    pos.moves.push(Move::new(Stone::White, vertex("C3", Size::B9x9)));
    pos.moves[0].record(2.0);

    let mut rng = fastrand::Rng::with_seed(17);
    let copy = pos.clone();
    playout(copy, Stone::White, 6.5, 97, &mut rng);

    assert_eq!(pos.empties().count(), 78);
    assert_eq!(pos.moves[0].visits, 1.0);
    assert_eq!(pos.moves[0].rate, 2.0);
    assert!(pos.probs.is_uninit());
}

#[test]
fn test_sample_move_with_no_weight() {
    let mut pos = Position::new(Size::B9x9, 0.0);
    pos.init_probs();
    for i in 0..Size::B9x9.capacity() {
        pos.probs.update(i, 0);
    }
    let mut rng = fastrand::Rng::with_seed(5);
    assert!(sample_move(&mut pos, Stone::Black, &mut rng).is_pass());
    assert_eq!(pos.probs.total(), 0);
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_ponder_empty_9x9() {
    let engine = sequential_engine(150, 2024);
    let mut pos = Position::new(Size::B9x9, 0.0);
    let best = engine.ponder(&mut pos, Stone::Black);

    assert!(pos.moves.iter().any(|mv| mv.visits > 0.0));
    assert!(best.is_pass() || pos.moves.iter().any(|mv| mv.same_play(&best)));
    let visits: f64 = pos.moves.iter().map(|mv| mv.visits).sum();
    assert_eq!(visits, 150.0);
    assert_eq!(pos.visits, 150.0);
}

#[test]
fn test_ponder_zero_trials() {
    let engine = sequential_engine(0, 1);
    let mut pos = Position::new(Size::B13x13, 0.0);
    assert!(engine.ponder(&mut pos, Stone::White).is_pass());
}

#[test]
fn test_ponder_does_not_disturb_the_record() {
    let game = setup_game(Size::B9x9, &["C3", "G7"]);
    let engine = sequential_engine(60, 8);
    let mv = engine.answer(game.current(), Stone::Black, game.last_move());
    assert_eq!(mv.stone, Stone::Black);
    // The record's position never collects search statistics
    assert!(game.current().moves.is_empty());
    assert_eq!(game.move_count(), 2);
}

#[test]
fn test_parallel_ponder_counts_every_trial() {
    let engine = Engine::new(Config {
        trials: 256,
        min_playout: 4,
        seed: Some(99),
        ..Config::default()
    });
    let game = setup_game(Size::B9x9, &["E5"]);
    let mut pos = game.current().successor();
    let best = engine.ponder(&mut pos, Stone::White);

    assert_eq!(pos.visits, 256.0);
    let visits: f64 = pos.moves.iter().map(|mv| mv.visits).sum();
    assert_eq!(visits, 256.0);
    assert_eq!(best.stone, Stone::White);
    assert!(
        pos.moves
            .iter()
            .all(|mv| mv.vertex != vertex("E5", Size::B9x9))
    );
}

#[test]
fn test_search_captures_a_stone_in_atari() {
    // White D5 has a single liberty at D6; capturing is worth the most
    let size = Size::B9x9;
    let mut pos = Position::new(size, 0.0);
    for text in ["C5", "E5", "D4"] {
        pos.set_stone(vertex(text, size), Stone::Black);
    }
    pos.set_stone(vertex("D5", size), Stone::White);

    let engine = Engine::new(Config {
        trials: 400,
        mode: SearchMode::Sequential,
        seed: Some(3),
        ..Config::default()
    });
    engine.ponder(&mut pos, Stone::Black);
    let capture = pos
        .moves
        .iter()
        .find(|mv| mv.vertex == vertex("D6", size))
        .expect("capture is a candidate");
    assert!(capture.visits >= 1.0);
}
