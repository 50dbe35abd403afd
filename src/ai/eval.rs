//! Static evaluation. Every score is from the point of view of `me`; positive favors `me`.

use crate::board::{Board, positions};
use crate::config::EvalWeights;
use crate::types::{DiscColor, Position};

/// Signed value of holding each square.
pub const POSITION_TABLE: [[i32; 8]; 8] = [
    [120, -20, 20, 5, 5, 20, -20, 120],
    [-20, -40, -5, -5, -5, -5, -40, -20],
    [20, -5, 15, 3, 3, 15, -5, 20],
    [5, -5, 3, 3, 3, 3, -5, 5],
    [5, -5, 3, 3, 3, 3, -5, 5],
    [20, -5, 15, 3, 3, 15, -5, 20],
    [-20, -40, -5, -5, -5, -5, -40, -20],
    [120, -20, 20, 5, 5, 20, -20, 120],
];

const CORNERS: [Position; 4] = [
    Position::new(0, 0),
    Position::new(0, 7),
    Position::new(7, 0),
    Position::new(7, 7),
];

/// Each corner with its X square and two C squares.
const DANGER_SQUARES: [(Position, Position, [Position; 2]); 4] = [
    (
        Position::new(0, 0),
        Position::new(1, 1),
        [Position::new(0, 1), Position::new(1, 0)],
    ),
    (
        Position::new(0, 7),
        Position::new(1, 6),
        [Position::new(0, 6), Position::new(1, 7)],
    ),
    (
        Position::new(7, 0),
        Position::new(6, 1),
        [Position::new(7, 1), Position::new(6, 0)],
    ),
    (
        Position::new(7, 7),
        Position::new(6, 6),
        [Position::new(7, 6), Position::new(6, 7)],
    ),
];

/// Corner and the inward step along the column and the row.
const STABLE_WALKS: [(Position, i32, i32); 4] = [
    (Position::new(0, 0), 1, 1),
    (Position::new(0, 7), 1, -1),
    (Position::new(7, 0), -1, 1),
    (Position::new(7, 7), -1, -1),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluator {
    weights: EvalWeights,
}

impl Evaluator {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    /// Level 2 evaluation: table sum plus mobility difference.
    pub fn calc_score(&self, board: &Board, me: DiscColor) -> i32 {
        let opp = me.opposite();
        position_sum(board, me)
            + (board.mobility(me) - board.mobility(opp)) * self.weights.l2_mobility
    }

    /// Level 3 evaluation: position, corners, X/C squares, mobility and stable discs.
    pub fn eval_lv3(&self, board: &Board, me: DiscColor) -> i32 {
        let w = &self.weights;
        let opp = me.opposite();

        let mut score = position_sum(board, me) * w.position;

        for corner in CORNERS {
            score += ownership(board.cell(corner), me, opp) * w.corner;
        }

        for (corner, x_square, c_squares) in DANGER_SQUARES {
            if board.cell(corner) != DiscColor::None {
                continue;
            }
            score += ownership(board.cell(x_square), me, opp) * w.x_square;
            for c_square in c_squares {
                score += ownership(board.cell(c_square), me, opp) * w.c_square;
            }
        }

        score += (board.mobility(me) - board.mobility(opp)) * w.mobility;
        score += (count_stable_discs(board, me) - count_stable_discs(board, opp)) * w.stable;

        score
    }
}

/// Final disc margin times 100, negated when `me` is not the side to move.
pub fn eval_final(board: &Board, me: DiscColor) -> i32 {
    let diff = board.disc_count(me) as i32 - board.disc_count(me.opposite()) as i32;
    if board.turn() == me {
        diff * 100
    } else {
        -diff * 100
    }
}

/// Table value of `me`'s discs minus that of the opponent's.
pub fn position_sum(board: &Board, me: DiscColor) -> i32 {
    table_sum(board.bitboard(me)) - table_sum(board.bitboard(me.opposite()))
}

/// Edge runs anchored at corners owned by `color`.
///
/// From each owned corner this walks down or up the column (corner included)
/// and then along the row (corner excluded). A fully owned edge is counted
/// from both of its corners.
pub fn count_stable_discs(board: &Board, color: DiscColor) -> i32 {
    STABLE_WALKS
        .iter()
        .map(|&(corner, dr, dc)| stable_from_corner(board, color, corner, dr, dc))
        .sum()
}

fn stable_from_corner(board: &Board, color: DiscColor, corner: Position, dr: i32, dc: i32) -> i32 {
    if board.cell(corner) != color {
        return 0;
    }

    let mut count = 0;

    let mut r = corner.row as i32;
    while (0..8).contains(&r) && board.cell(Position::new(r as u8, corner.col)) == color {
        count += 1;
        r += dr;
    }

    let mut c = corner.col as i32 + dc;
    while (0..8).contains(&c) && board.cell(Position::new(corner.row, c as u8)) == color {
        count += 1;
        c += dc;
    }

    count
}

fn table_sum(mask: u64) -> i32 {
    positions(mask)
        .map(|pos| POSITION_TABLE[pos.row as usize][pos.col as usize])
        .sum()
}

fn ownership(cell: DiscColor, me: DiscColor, opp: DiscColor) -> i32 {
    if cell == me {
        1
    } else if cell == opp {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::bit;

    fn sq(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn mask(cells: &[(u8, u8)]) -> u64 {
        cells
            .iter()
            .fold(0, |acc, &(r, c)| acc | bit(sq(r, c).index()))
    }

    #[test]
    fn initial_position_is_balanced() {
        let board = Board::new();
        let eval = Evaluator::default();

        assert_eq!(eval.calc_score(&board, DiscColor::Black), 0);
        assert_eq!(eval.eval_lv3(&board, DiscColor::Black), 0);
        assert_eq!(eval.eval_lv3(&board, DiscColor::White), 0);
    }

    #[test]
    fn calc_score_adds_table_and_mobility() {
        let mut board = Board::new();
        board.play(sq(2, 3));
        board.change_turn();
        let eval = Evaluator::default();

        // Black holds (2,3),(3,3),(3,4),(4,3) = 3*4; white holds (4,4) = 3.
        let black_mobility = board.mobility(DiscColor::Black);
        let white_mobility = board.mobility(DiscColor::White);
        let expected = (12 - 3) + 20 * (black_mobility - white_mobility);
        assert_eq!(eval.calc_score(&board, DiscColor::Black), expected);
        assert_eq!(
            eval.calc_score(&board, DiscColor::White),
            -expected
        );
    }

    #[test]
    fn owned_corner_outweighs_everything_else_nearby() {
        let board = Board::from_bitboards(mask(&[(0, 0)]), mask(&[(0, 1)]), DiscColor::Black);
        let eval = Evaluator::default();

        // position: (120 - -20) * 10 = 1400
        // corners: +500
        // danger: only the (0,0) corner is taken, so (0,1) is ignored there
        // mobility: black can take (0,2), white has nothing -> +80
        // stable: black corner run: column (0,0) = 1, row stops at (0,1) -> 1
        assert_eq!(eval.eval_lv3(&board, DiscColor::Black), 1400 + 500 + 80 + 100);
    }

    #[test]
    fn x_square_next_to_empty_corner_is_penalised() {
        let board = Board::from_bitboards(mask(&[(1, 1)]), mask(&[(6, 7)]), DiscColor::Black);
        let eval = Evaluator::default();

        // position: (-40) - (-20) = -20 -> -200
        // danger: black X at (1,1): -150; white C at (6,7): +50
        assert_eq!(eval.eval_lv3(&board, DiscColor::Black), -200 - 150 + 50);
        assert_eq!(eval.eval_lv3(&board, DiscColor::White), 200 + 150 - 50);
    }

    #[test]
    fn stable_count_follows_corner_runs() {
        // Whole top row black plus (1,0),(2,0) down the left edge.
        let mut black = mask(&[(1, 0), (2, 0)]);
        for c in 0..8 {
            black |= mask(&[(0, c)]);
        }
        let board = Board::from_bitboards(black, 0, DiscColor::Black);

        // (0,0): column 3 + row 7 = 10; (0,7): column 1 + row 7 = 8.
        assert_eq!(count_stable_discs(&board, DiscColor::Black), 18);
        assert_eq!(count_stable_discs(&board, DiscColor::White), 0);
    }

    #[test]
    fn eval_final_signs_by_side_to_move() {
        let board = Board::from_bitboards(mask(&[(0, 0), (0, 1)]), mask(&[(0, 2)]), DiscColor::Black);

        assert_eq!(eval_final(&board, DiscColor::Black), 100);
        assert_eq!(eval_final(&board, DiscColor::White), 100);

        let mut white_to_move = board;
        white_to_move.set_turn(DiscColor::White);
        assert_eq!(eval_final(&white_to_move, DiscColor::Black), -100);
    }
}
