//! Perft node counts for the standard reference positions.
//!
//! A wrong count at any depth points at move generation, the transition, or
//! the king-safety filter.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use chess_arbiter::engine::board::Position;
use chess_arbiter::engine::game::Game;

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const ENDGAME_PINS: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const PROMOTION_MIRROR: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const CHECKS_AND_PROMOTIONS: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
const MIDDLEGAME: &str =
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";

/// Leaf count at `depth`, walking the tree through validated transitions.
fn perft(pos: &Position, depth: u32) -> u64 {
    let moves = pos.legal_moves();
    if depth <= 1 {
        return if depth == 0 { 1 } else { moves.len() as u64 };
    }
    moves
        .iter()
        .map(|mv| perft(&pos.apply(mv).unwrap(), depth - 1))
        .sum()
}

/// Same count, but through a `Game`'s make/undo history instead of fresh
/// positions.
fn perft_game(game: &mut Game, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    for mv in game.legal_moves() {
        game.make_move(mv).unwrap();
        nodes += perft_game(game, depth - 1);
        game.undo_move().unwrap();
    }
    nodes
}

fn check(fen: &str, expected: &[u64]) {
    let pos = Position::from_fen(fen).unwrap();
    for (depth, &nodes) in (1..).zip(expected) {
        assert_eq!(perft(&pos, depth), nodes, "{fen} at depth {depth}");
    }
}

#[test]
fn perft_start() {
    check(START, &[20, 400, 8_902, 197_281]);
}

#[test]
fn perft_kiwipete() {
    check(KIWIPETE, &[48, 2_039, 97_862]);
}

#[test]
fn perft_endgame_pins() {
    check(ENDGAME_PINS, &[14, 191, 2_812, 43_238]);
}

#[test]
fn perft_promotion_mirror() {
    check(PROMOTION_MIRROR, &[6, 264, 9_467]);
}

#[test]
fn perft_checks_and_promotions() {
    check(CHECKS_AND_PROMOTIONS, &[44, 1_486, 62_379]);
}

#[test]
fn perft_middlegame() {
    check(MIDDLEGAME, &[46, 2_079, 89_890]);
}

#[test]
fn perft_through_game_history() {
    let mut game = Game::from_fen(KIWIPETE).unwrap();
    assert_eq!(perft_game(&mut game, 3), 97_862);
    assert_eq!(game.to_fen(), KIWIPETE);
    assert!(game.move_history().is_empty());
}
