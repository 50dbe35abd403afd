//! Level 2: fixed-depth minimax with parent-bound pruning.
//!
//! Odd depths (the root included) maximize, even depths minimize. Leaves
//! are scored with [`Evaluator::calc_score`] from the point of view of the
//! side that just moved. A node stops looking at further moves as soon as
//! its running value reaches the bound its parent already holds (ties
//! included).

use crate::ai::eval::Evaluator;
use crate::board::{Board, positions};
use crate::types::Position;

pub const DEFAULT_DEPTH: u8 = 3;

pub struct MinimaxSearcher<'a> {
    evaluator: &'a Evaluator,
    root_depth: u8,
    best_move: Option<Position>,
    nodes: u64,
}

impl<'a> MinimaxSearcher<'a> {
    pub fn new(evaluator: &'a Evaluator, root_depth: u8) -> Self {
        Self {
            evaluator,
            root_depth: root_depth.max(1),
            best_move: None,
            nodes: 0,
        }
    }

    /// Picks a move for the side to move, or `None` if it has none.
    pub fn search(&mut self, board: &Board) -> Option<Position> {
        self.best_move = None;
        self.nodes = 0;
        let _score = self.alpha_beta(board, self.root_depth, None);
        self.best_move
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Value of `board` at `depth`. `bound` is the parent's running value,
    /// `None` while the parent has not scored any move yet.
    fn alpha_beta(&mut self, board: &Board, depth: u8, bound: Option<i32>) -> i32 {
        self.nodes += 1;
        let legal = board.legal_moves(board.turn());

        if legal == 0 {
            let mut next = *board;
            return if depth == 1 {
                self.evaluator.calc_score(&next, next.turn())
            } else {
                next.change_turn();
                self.alpha_beta(&next, depth - 1, None)
            };
        }

        let maximizing = depth % 2 == 1;
        let mut value: Option<i32> = None;

        for pos in positions(legal) {
            let mut next = *board;
            next.play(pos);

            let score = if depth == 1 {
                self.evaluator.calc_score(&next, next.turn())
            } else {
                next.change_turn();
                self.alpha_beta(&next, depth - 1, value)
            };

            let improves = match value {
                None => true,
                Some(current) if maximizing => current < score,
                Some(current) => current > score,
            };
            if improves {
                value = Some(score);
                if depth == self.root_depth {
                    self.best_move = Some(pos);
                }
            }

            if let (Some(parent), Some(current)) = (bound, value) {
                let cut = if maximizing {
                    parent <= current
                } else {
                    parent >= current
                };
                if cut {
                    break;
                }
            }
        }

        value.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::bit;
    use crate::types::DiscColor;

    fn sq(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    /// Plain minimax with the same leaf convention, no pruning.
    fn reference(evaluator: &Evaluator, board: &Board, depth: u8) -> i32 {
        let legal = board.legal_moves(board.turn());
        if legal == 0 {
            let mut next = *board;
            if depth == 1 {
                return evaluator.calc_score(&next, next.turn());
            }
            next.change_turn();
            return reference(evaluator, &next, depth - 1);
        }
        let scores = positions(legal).map(|pos| {
            let mut next = *board;
            next.play(pos);
            if depth == 1 {
                evaluator.calc_score(&next, next.turn())
            } else {
                next.change_turn();
                reference(evaluator, &next, depth - 1)
            }
        });
        if depth % 2 == 1 {
            scores.max().unwrap_or_default()
        } else {
            scores.min().unwrap_or_default()
        }
    }

    #[test]
    fn pruned_root_value_matches_plain_minimax() {
        let evaluator = Evaluator::default();
        let mut board = Board::new();
        for pos in [sq(2, 3), sq(2, 2), sq(2, 1)] {
            board.play(pos);
            board.change_turn();
        }

        let mut searcher = MinimaxSearcher::new(&evaluator, DEFAULT_DEPTH);
        let value = searcher.alpha_beta(&board, DEFAULT_DEPTH, None);

        assert_eq!(value, reference(&evaluator, &board, DEFAULT_DEPTH));
    }

    #[test]
    fn search_returns_a_legal_move_and_is_deterministic() {
        let evaluator = Evaluator::default();
        let board = Board::new();

        let mut searcher = MinimaxSearcher::new(&evaluator, DEFAULT_DEPTH);
        let first = searcher.search(&board);
        let nodes = searcher.nodes();
        let second = searcher.search(&board);

        let pos = first.unwrap();
        assert_ne!(board.legal_moves(DiscColor::Black) & bit(pos.index()), 0);
        assert_eq!(first, second);
        // Root plus at least one node per opening move.
        assert!(nodes > 4, "{nodes}");
        assert_eq!(searcher.nodes(), nodes);
    }

    #[test]
    fn depth_one_takes_the_best_immediate_score() {
        let evaluator = Evaluator::default();
        // Black can take the corner (0,0) or flip (2,3) from (1,3).
        let black = bit(sq(0, 2).index()) | bit(sq(3, 3).index());
        let white = bit(sq(0, 1).index()) | bit(sq(2, 3).index());
        let board = Board::from_bitboards(black, white, DiscColor::Black);

        let choice = MinimaxSearcher::new(&evaluator, 1).search(&board);

        assert_eq!(choice, Some(sq(0, 0)));
    }

    #[test]
    fn no_moves_at_root_gives_none() {
        let evaluator = Evaluator::default();
        let board = Board::from_bitboards(
            bit(sq(0, 0).index()) | bit(sq(0, 1).index()),
            bit(sq(7, 7).index()),
            DiscColor::Black,
        );

        assert_eq!(MinimaxSearcher::new(&evaluator, DEFAULT_DEPTH).search(&board), None);
    }
}
