//! Level 1: usually grab the most discs, sometimes play anything.

use rand::Rng;

use crate::board::{Board, positions};
use crate::types::{DiscColor, Position};

/// With `greedy_rate_percent`% probability returns the legal move flipping
/// the most discs (first in row-major order on ties), otherwise a uniformly
/// random legal move.
pub fn choose<R: Rng + ?Sized>(
    board: &Board,
    color: DiscColor,
    greedy_rate_percent: u8,
    rng: &mut R,
) -> Option<Position> {
    let moves: Vec<Position> = positions(board.legal_moves(color)).collect();
    if moves.is_empty() {
        return None;
    }

    if rng.gen_range(0..100u8) < greedy_rate_percent {
        most_flips(board, color, &moves)
    } else {
        Some(moves[rng.gen_range(0..moves.len())])
    }
}

fn most_flips(board: &Board, color: DiscColor, moves: &[Position]) -> Option<Position> {
    let mut best: Option<(Position, u32)> = None;
    for &pos in moves {
        let count = board.flips(color, pos).count_ones();
        if best.is_none_or(|(_, max)| count > max) {
            best = Some((pos, count));
        }
    }
    best.map(|(pos, _)| pos)
}
