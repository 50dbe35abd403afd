use std::time::Duration;

use once_cell::sync::Lazy;
use web_time::Instant;

use crate::ai::eval::{Evaluator, eval_final};
use crate::board::{Board, positions};
use crate::config::EngineConfig;
use crate::types::{DiscColor, NUM_SQUARES, Position};
use crate::version::VersionWatch;

const DEFAULT_TIMEOUT_MS: u64 = 8000;
const DEFAULT_MAX_DEPTH: u8 = 7;
const DEFAULT_ENDGAME_THRESHOLD: u8 = 12;
const INF: i32 = 100_000_000;

/// Static ordering priority per square: corners first, X squares last.
static MOVE_PRIORITY: Lazy<[i32; NUM_SQUARES]> = Lazy::new(|| {
    let mut table = [0; NUM_SQUARES];
    for (index, priority) in table.iter_mut().enumerate() {
        let pos = Position::from_index(index);
        *priority = if pos.is_corner() {
            100
        } else if pos.is_c_square() {
            -10
        } else if pos.is_edge() {
            50
        } else if pos.is_x_square() {
            -50
        } else {
            0
        };
    }
    table
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchResult {
    Complete(Option<Position>, i32),
    TimedOut,
}

impl SearchResult {
    fn negate(self) -> Self {
        match self {
            Self::Complete(_, score) => Self::Complete(None, -score),
            Self::TimedOut => Self::TimedOut,
        }
    }
}

/// Level 3 searcher: iterative-deepening negamax over [`Evaluator::eval_lv3`]
/// and an exact endgame solver once few squares are left.
pub struct Searcher<'a> {
    evaluator: &'a Evaluator,
    start_time: Instant,
    timeout: Duration,
    max_depth: u8,
    endgame_threshold: u8,
    timed_out: bool,
    completed_depth: u8,
    nodes: u64,
    me: DiscColor,
    watch: Option<VersionWatch>,
}

impl<'a> Searcher<'a> {
    pub fn new(evaluator: &'a Evaluator) -> Self {
        Self::with_limits(
            evaluator,
            DEFAULT_MAX_DEPTH,
            DEFAULT_ENDGAME_THRESHOLD,
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
        )
    }

    pub fn from_config(evaluator: &'a Evaluator, config: &EngineConfig) -> Self {
        Self::with_limits(
            evaluator,
            config.lv3_max_depth,
            config.endgame_threshold,
            Duration::from_millis(config.time_limit_ms),
        )
    }

    pub fn with_limits(
        evaluator: &'a Evaluator,
        max_depth: u8,
        endgame_threshold: u8,
        timeout: Duration,
    ) -> Self {
        Self {
            evaluator,
            start_time: Instant::now(),
            timeout,
            max_depth: max_depth.max(1),
            endgame_threshold,
            timed_out: false,
            completed_depth: 0,
            nodes: 0,
            me: DiscColor::None,
            watch: None,
        }
    }

    /// Abandons the search, like a timeout, once the game version moves on.
    pub fn watch_version(&mut self, watch: Option<VersionWatch>) {
        self.watch = watch;
    }

    /// Searches the best move for the side to move. Returns `None` only when
    /// that side has no legal move.
    pub fn search(&mut self, board: &Board) -> Option<Position> {
        self.start_time = Instant::now();
        self.timed_out = false;
        self.completed_depth = 0;
        self.nodes = 0;
        self.me = board.turn();

        let moves: Vec<Position> = positions(board.legal_moves(self.me)).collect();
        match moves.len() {
            0 => return None,
            1 => return Some(moves[0]),
            _ => {}
        }

        let empty = board.empty_count();
        if empty <= self.endgame_threshold {
            log::debug!("endgame solver: {empty} empty squares");
            return self.solve_endgame(board, empty);
        }

        let mut best_move = moves[0];

        for depth in 1..=self.max_depth {
            match self.negamax(board, depth, depth, -INF, INF) {
                SearchResult::Complete(Some(mv), score) => {
                    best_move = mv;
                    self.completed_depth = depth;
                    log::debug!("depth {depth} complete: ({}, {}) score {score}", mv.row, mv.col);
                }
                SearchResult::Complete(None, _) => {}
                SearchResult::TimedOut => break,
            }
        }

        if self.timed_out {
            log::warn!(
                "search stopped after {:?} at depth {}",
                self.start_time.elapsed(),
                self.completed_depth
            );
        }

        Some(best_move)
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Deepest fully searched iteration of the last [`Searcher::search`].
    pub fn completed_depth(&self) -> u8 {
        self.completed_depth
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    fn check_deadline(&mut self) -> bool {
        if !self.timed_out
            && (self.start_time.elapsed() >= self.timeout
                || self.watch.as_ref().is_some_and(VersionWatch::is_stale))
        {
            self.timed_out = true;
        }
        self.timed_out
    }

    fn negamax(
        &mut self,
        board: &Board,
        depth: u8,
        root_depth: u8,
        alpha: i32,
        beta: i32,
    ) -> SearchResult {
        // Keep depth-1 search guaranteed by suppressing timeout checks at root depth 1.
        if root_depth > 1 && self.check_deadline() {
            return SearchResult::TimedOut;
        }
        self.nodes += 1;

        let turn = board.turn();
        let legal = board.legal_moves(turn);
        if legal == 0 && !board.has_any_move(turn.opposite()) {
            return SearchResult::Complete(None, eval_final(board, self.me));
        }

        if depth == 0 {
            let score = self.evaluator.eval_lv3(board, self.me);
            let score = if turn == self.me { score } else { -score };
            return SearchResult::Complete(None, score);
        }

        if legal == 0 {
            let mut next = *board;
            next.change_turn();
            return self
                .negamax(&next, depth, root_depth, -beta, -alpha)
                .negate();
        }

        let mut best_move = None;
        let mut best_score = -INF;
        let mut alpha = alpha;

        for mv in sorted_moves(legal) {
            let mut next = *board;
            next.play(mv);
            next.change_turn();

            match self.negamax(&next, depth - 1, root_depth, -beta, -alpha) {
                SearchResult::TimedOut => return SearchResult::TimedOut,
                SearchResult::Complete(_, score) => {
                    let score = -score;
                    if score > best_score {
                        best_score = score;
                        best_move = Some(mv);
                    }
                    if score > alpha {
                        alpha = score;
                    }
                    if alpha >= beta {
                        break;
                    }
                }
            }
        }

        SearchResult::Complete(best_move, best_score)
    }

    /// Plays every root move out to the end. Moves whose subtree was cut
    /// short by the deadline are not considered.
    fn solve_endgame(&mut self, board: &Board, empty: u8) -> Option<Position> {
        let moves = sorted_moves(board.legal_moves(self.me));
        let fallback = moves.first().copied();
        let mut best_move = None;
        let mut best_score = -INF;

        for mv in moves {
            if self.check_deadline() {
                break;
            }

            let mut next = *board;
            next.play(mv);
            next.change_turn();

            match self.endgame(&next, empty.saturating_sub(1), -INF, -best_score) {
                SearchResult::TimedOut => break,
                SearchResult::Complete(_, score) => {
                    let score = -score;
                    if score > best_score {
                        best_score = score;
                        best_move = Some(mv);
                    }
                }
            }
        }

        if self.timed_out {
            log::warn!("endgame solver ran out of time after {:?}", self.start_time.elapsed());
        }

        best_move.or(fallback)
    }

    fn endgame(&mut self, board: &Board, empties: u8, alpha: i32, beta: i32) -> SearchResult {
        if self.check_deadline() {
            return SearchResult::TimedOut;
        }
        self.nodes += 1;

        let turn = board.turn();
        let legal = board.legal_moves(turn);

        if empties == 0 || (legal == 0 && !board.has_any_move(turn.opposite())) {
            return SearchResult::Complete(None, eval_final(board, self.me));
        }

        if legal == 0 {
            let mut next = *board;
            next.change_turn();
            return self.endgame(&next, empties, -beta, -alpha).negate();
        }

        let mut best_score = -INF;
        let mut alpha = alpha;

        for mv in sorted_moves(legal) {
            let mut next = *board;
            next.play(mv);
            next.change_turn();

            match self.endgame(&next, empties - 1, -beta, -alpha) {
                SearchResult::TimedOut => return SearchResult::TimedOut,
                SearchResult::Complete(_, score) => {
                    let score = -score;
                    if score > best_score {
                        best_score = score;
                    }
                    if score > alpha {
                        alpha = score;
                    }
                    if alpha >= beta {
                        break;
                    }
                }
            }
        }

        SearchResult::Complete(None, best_score)
    }
}

pub fn move_priority(pos: Position) -> i32 {
    MOVE_PRIORITY[pos.index()]
}

/// Legal moves by descending priority; equal priorities stay in row-major order.
pub fn sorted_moves(legal: u64) -> Vec<Position> {
    let mut moves: Vec<Position> = positions(legal).collect();
    moves.sort_by_key(|&mv| std::cmp::Reverse(move_priority(mv)));
    moves
}
