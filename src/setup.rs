//! Random-mode opening generator.
//!
//! Scatters extra discs around the center four and keeps the candidate the
//! level 3 evaluation considers closest to even.

use rand::Rng;

use crate::ai::eval::Evaluator;
use crate::board::{Board, bit, center_mask};
use crate::types::{DiscColor, NUM_SQUARES, Position};

const MAX_ATTEMPTS: usize = 10;
const MAX_PLACEMENT_TRIES: usize = 100;
const EXTRA_DISCS_MIN: usize = 6;
const EXTRA_DISCS_MAX: usize = 16;
const MIN_HUMAN_MOVES: i32 = 2;
const FAIR_ENOUGH: i32 = 500;

/// Builds a randomized opening with Black to move.
///
/// Candidates where `human_color` has fewer than two replies are skipped.
/// If every attempt is skipped the classic position is returned.
pub fn random_position<R: Rng + ?Sized>(
    rng: &mut R,
    human_color: DiscColor,
    evaluator: &Evaluator,
) -> Board {
    let mut best: Option<(Board, i32)> = None;

    for attempt in 0..MAX_ATTEMPTS {
        let mut board = Board::new();
        scatter_discs(&mut board, rng);

        if board.mobility(human_color) < MIN_HUMAN_MOVES {
            continue;
        }

        let fairness = evaluator.eval_lv3(&board, DiscColor::Black).abs();
        if best.as_ref().is_none_or(|(_, score)| fairness < *score) {
            best = Some((board, fairness));
        }
        if fairness < FAIR_ENOUGH {
            log::debug!("random setup accepted on attempt {attempt} with fairness {fairness}");
            break;
        }
    }

    let mut board = best.map(|(board, _)| board).unwrap_or_default();
    board.set_turn(DiscColor::Black);
    board
}

fn scatter_discs<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) {
    let extra = rng.gen_range(EXTRA_DISCS_MIN..=EXTRA_DISCS_MAX);
    let black = extra / 2;

    for n in 0..extra {
        let color = if n < black {
            DiscColor::Black
        } else {
            DiscColor::White
        };
        if let Some(pos) = random_free_cell(board, rng) {
            board.set_cell(pos, color);
        }
    }
}

/// Draws cells until one is empty and outside the center, giving up after
/// [`MAX_PLACEMENT_TRIES`] draws.
fn random_free_cell<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Position> {
    let free = board.bitboard(DiscColor::None) & !center_mask();
    if free == 0 {
        return None;
    }
    (0..MAX_PLACEMENT_TRIES)
        .map(|_| Position::from_index(rng.gen_range(0..NUM_SQUARES)))
        .find(|pos| free & bit(pos.index()) != 0)
}
