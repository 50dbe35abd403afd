//! Computer players.

pub mod eval;
pub mod greedy;
pub mod minimax;
pub mod search;

use rand::SeedableRng;
use rand::rngs::StdRng;
use web_time::Instant;

use crate::board::Board;
use crate::config::EngineConfig;
use crate::types::{Level, Position};
use crate::version::VersionWatch;

use eval::Evaluator;
use minimax::MinimaxSearcher;
use search::Searcher;

/// Decides the move for the side to move on `board`.
pub trait MoveSelector: Send {
    fn select_move(&mut self, board: &Board, level: Level) -> Option<Position>;

    /// Game version the next decisions belong to. Selectors that can give up
    /// early should stop once it goes stale.
    fn watch_version(&mut self, _watch: Option<VersionWatch>) {}
}

/// The built-in computer opponent. Level 1 is noisy greedy, level 2 a
/// depth-3 minimax and level 3 the iterative-deepening searcher.
pub struct CpuPlayer {
    config: EngineConfig,
    evaluator: Evaluator,
    rng: StdRng,
    watch: Option<VersionWatch>,
}

impl CpuPlayer {
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            evaluator: Evaluator::new(config.weights),
            config,
            rng,
            watch: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}

impl Default for CpuPlayer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl MoveSelector for CpuPlayer {
    fn select_move(&mut self, board: &Board, level: Level) -> Option<Position> {
        let started = Instant::now();
        let color = board.turn();

        let choice = match level {
            Level::Beginner => {
                greedy::choose(board, color, self.config.greedy_rate_percent, &mut self.rng)
            }
            Level::Intermediate => MinimaxSearcher::new(&self.evaluator, level.depth()).search(board),
            Level::Advanced => {
                let mut searcher = Searcher::from_config(&self.evaluator, &self.config);
                searcher.watch_version(self.watch.clone());
                searcher.search(board)
            }
        };

        match choice {
            Some(pos) => log::debug!(
                "level {} {} plays ({}, {}) after {:?}",
                level.number(),
                color.name(),
                pos.row,
                pos.col,
                started.elapsed()
            ),
            None => log::debug!("level {} {} has no move", level.number(), color.name()),
        }

        choice
    }

    fn watch_version(&mut self, watch: Option<VersionWatch>) {
        self.watch = watch;
    }
}
