use std::cmp::Ordering;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::ai::eval::Evaluator;
use crate::ai::{CpuPlayer, MoveSelector};
use crate::board::{Board, positions};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::history::{History, Move};
use crate::session::{InitialPosition, SavedSession, encode_cells};
use crate::setup;
use crate::types::{DiscColor, GameConfig, GameResult, GameState, Level, PlayOutcome, Position};
use crate::version::{GameVersion, VersionWatch};

/// Called after every board change with `(black_count, white_count, turn)`.
pub type ScoreListener = Box<dyn FnMut(u8, u8, DiscColor) + Send>;
/// Called once per finished game.
pub type ResultListener = Box<dyn FnMut(&GameResult) + Send>;

/// What a background searcher needs to decide the computer's move.
#[derive(Debug, Clone)]
pub struct AiJob {
    pub board: Board,
    pub level: Level,
    pub watch: VersionWatch,
    /// History length when the snapshot was taken.
    pub ply: usize,
}

/// Game controller: one human against one [`MoveSelector`].
pub struct GameInstance {
    board: Board,
    history: History,
    initial: InitialPosition,
    config: GameConfig,
    engine_config: EngineConfig,
    evaluator: Evaluator,
    used_undo: bool,
    is_pass: bool,
    flipped: Vec<u8>,
    result: Option<GameResult>,
    version: GameVersion,
    selector: Box<dyn MoveSelector>,
    setup_rng: StdRng,
    score_listener: Option<ScoreListener>,
    result_listener: Option<ResultListener>,
}

impl GameInstance {
    /// Creates a controller holding a classic board with the default
    /// [`GameConfig`]. Call [`GameInstance::new_game`] to apply another one.
    pub fn new(engine_config: EngineConfig, selector: Box<dyn MoveSelector>) -> Self {
        let setup_rng = match engine_config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            board: Board::new(),
            history: History::new(),
            initial: InitialPosition::default(),
            config: GameConfig::default(),
            evaluator: Evaluator::new(engine_config.weights),
            engine_config,
            used_undo: false,
            is_pass: false,
            flipped: Vec::new(),
            result: None,
            version: GameVersion::new(),
            selector,
            setup_rng,
            score_listener: None,
            result_listener: None,
        }
    }

    pub fn with_default_selector(engine_config: EngineConfig) -> Self {
        let selector = Box::new(CpuPlayer::new(engine_config.clone()));
        Self::new(engine_config, selector)
    }

    /// Starts over with `config`. Any AI decision still in flight for the
    /// previous game is invalidated.
    pub fn new_game(&mut self, config: GameConfig) -> EngineResult<()> {
        config.validate()?;
        self.version.bump();

        self.board = if config.random_mode {
            setup::random_position(&mut self.setup_rng, config.human_color, &self.evaluator)
        } else {
            let mut board = Board::new();
            board.reset(config.handicap_color(), config.handicap_count);
            board
        };
        self.initial = InitialPosition::from_board(&self.board);
        self.history.clear();
        self.used_undo = false;
        self.clear_transient();

        log::info!(
            "new game: human {}, level {}, handicap {:?}x{}, random {}",
            config.human_color.name(),
            config.ai_level.number(),
            config.handicap_target,
            config.handicap_count,
            config.random_mode
        );
        self.config = config;

        self.settle_turn();
        self.notify_score();
        Ok(())
    }

    pub fn human_plays(&mut self, row: u8, col: u8) -> EngineResult<PlayOutcome> {
        self.ensure_running()?;
        if self.board.turn() != self.config.human_color {
            return Err(EngineError::NotYourTurn);
        }
        let pos = Position::try_new(row, col).ok_or(EngineError::IllegalMove { row, col })?;
        self.apply_move(pos)
    }

    /// Lets the selector play for the computer.
    ///
    /// Returns `Ok(None)` when it is not the computer's turn, or when the
    /// decision no longer belongs to the current game.
    pub fn ai_plays(&mut self) -> EngineResult<Option<PlayOutcome>> {
        let Some(job) = self.snapshot_for_ai() else {
            self.ensure_running()?;
            return Ok(None);
        };

        self.selector.watch_version(Some(job.watch.clone()));
        let choice = self.selector.select_move(&job.board, job.level);
        self.selector.watch_version(None);

        match choice {
            Some(pos) => self.commit_ai_move(&job, pos),
            None => {
                log::warn!("selector returned no move for {}", job.board.turn().name());
                Ok(None)
            }
        }
    }

    /// Board copy and version snapshot for a search run outside the
    /// controller. `None` unless the computer is to move.
    pub fn snapshot_for_ai(&self) -> Option<AiJob> {
        if self.is_game_over() || self.board.turn() != self.config.ai_color() {
            return None;
        }
        Some(AiJob {
            board: self.board,
            level: self.config.ai_level,
            watch: self.version.watch(),
            ply: self.history.len(),
        })
    }

    /// Applies a computer move decided on `job`'s snapshot. Decisions for an
    /// older game version, or for a position that has since been played on,
    /// are dropped and reported as `Ok(None)`.
    pub fn commit_ai_move(
        &mut self,
        job: &AiJob,
        pos: Position,
    ) -> EngineResult<Option<PlayOutcome>> {
        let version = job.watch.expected();
        if self.version.current() != version || self.history.len() != job.ply {
            log::warn!(
                "dropping move ({}, {}) decided for game version {version} at ply {}",
                pos.row,
                pos.col,
                job.ply
            );
            return Ok(None);
        }
        self.ensure_running()?;
        if self.board.turn() != self.config.ai_color() {
            return Err(EngineError::NotYourTurn);
        }
        self.apply_move(pos).map(Some)
    }

    /// Takes back the human's most recent move and everything played after
    /// it, then rebuilds the board from the initial position.
    pub fn undo(&mut self) -> EngineResult<()> {
        self.ensure_running()?;

        let mut history = self.history.clone();
        history.undo_to_self(self.config.human_color);
        let board = history.replay(&self.initial)?;

        self.version.bump();
        self.board = board;
        self.history = history;
        self.used_undo = true;
        self.clear_transient();
        log::info!("undo: {} moves left in history", self.history.len());

        self.settle_turn();
        self.notify_score();
        Ok(())
    }

    pub fn current_turn(&self) -> DiscColor {
        self.board.turn()
    }

    /// `(black, white)`.
    pub fn disc_counts(&self) -> (u8, u8) {
        self.board.count_discs()
    }

    pub fn serialize(&self) -> SavedSession {
        SavedSession {
            turn: self.board.turn().ordinal(),
            cells: encode_cells(&self.board),
            history: self.history.encode(),
            initial: Some(self.initial.encode()),
        }
    }

    /// Resumes a game from its three saved strings. On malformed input a
    /// fresh game with the current config is started and the error returned.
    pub fn restore(&mut self, turn: u8, cells: &str, history: &str) -> EngineResult<()> {
        self.restore_session(&SavedSession {
            turn,
            cells: cells.to_string(),
            history: history.to_string(),
            initial: None,
        })
    }

    pub fn restore_session(&mut self, saved: &SavedSession) -> EngineResult<()> {
        let decoded = match saved.decode(&self.configured_initial()) {
            Ok(decoded) => decoded,
            Err(err) => {
                log::warn!("restore rejected, starting a new game: {err}");
                self.new_game(self.config.clone())?;
                return Err(err);
            }
        };

        self.version.bump();
        self.board = decoded.board;
        self.history = decoded.history;
        self.initial = decoded.initial;
        self.used_undo = false;
        self.clear_transient();

        if self.is_game_over() {
            self.result = Some(self.compute_result());
        } else {
            self.settle_turn();
        }
        self.notify_score();
        Ok(())
    }

    pub fn set_score_listener<F>(&mut self, listener: F)
    where
        F: FnMut(u8, u8, DiscColor) + Send + 'static,
    {
        self.score_listener = Some(Box::new(listener));
    }

    pub fn set_result_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&GameResult) + Send + 'static,
    {
        self.result_listener = Some(Box::new(listener));
    }

    /// Legal moves of the side to move, row-major.
    pub fn legal_moves(&self) -> Vec<Position> {
        positions(self.board.legal_moves(self.board.turn())).collect()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last()
    }

    pub fn to_game_state(&self) -> GameState {
        let (black_count, white_count) = self.board.count_discs();
        GameState {
            board: self.board.to_array().to_vec(),
            current_player: self.board.turn().ordinal(),
            black_count,
            white_count,
            is_game_over: self.is_game_over(),
            is_pass: self.is_pass,
            flipped: self.flipped.clone(),
            last_move: self.history.last().map(|mv| mv.pos),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn initial_position(&self) -> &InitialPosition {
        &self.initial
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine_config
    }

    /// Shared handle on the game version, for searchers running elsewhere.
    pub fn version(&self) -> &GameVersion {
        &self.version
    }

    pub fn used_undo(&self) -> bool {
        self.used_undo
    }

    pub fn is_pass(&self) -> bool {
        self.is_pass
    }

    pub fn is_game_over(&self) -> bool {
        self.board.turn() == DiscColor::None
    }

    /// Result of the finished game, `None` while it is running.
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    fn ensure_running(&self) -> EngineResult<()> {
        if self.is_game_over() {
            Err(EngineError::GameAlreadyOver)
        } else {
            Ok(())
        }
    }

    fn apply_move(&mut self, pos: Position) -> EngineResult<PlayOutcome> {
        let mover = self.board.turn();
        let flips = self.board.play(pos);
        if flips == 0 {
            return Err(EngineError::IllegalMove {
                row: pos.row,
                col: pos.col,
            });
        }

        self.history.append(mover, pos);
        self.flipped = positions(flips).map(|p| p.index() as u8).collect();
        self.is_pass = false;

        let outcome = self.finish_turn(mover);
        self.notify_score();
        Ok(outcome)
    }

    /// Hands the turn over after `mover` placed a disc.
    fn finish_turn(&mut self, mover: DiscColor) -> PlayOutcome {
        let opponent = mover.opposite();
        if self.board.has_any_move(opponent) {
            self.board.change_turn();
            PlayOutcome::Applied
        } else if self.board.has_any_move(mover) {
            log::debug!("{} cannot move, {} plays again", opponent.name(), mover.name());
            self.is_pass = true;
            PlayOutcome::OpponentPasses { passed: opponent }
        } else {
            self.board.end_turn();
            PlayOutcome::GameOver(self.finish_game())
        }
    }

    /// Makes sure the side to move can move after the board was replaced.
    fn settle_turn(&mut self) {
        let turn = self.board.turn();
        if turn == DiscColor::None || self.board.has_any_move(turn) {
            return;
        }
        if self.board.has_any_move(turn.opposite()) {
            log::debug!("{} cannot move", turn.name());
            self.board.change_turn();
        } else {
            self.board.end_turn();
            self.finish_game();
        }
    }

    fn finish_game(&mut self) -> GameResult {
        let result = self.compute_result();
        log::info!(
            "game over: black {} white {}, point {}, excluded {}",
            result.black_count,
            result.white_count,
            result.point,
            result.excluded_from_stats
        );
        if let Some(listener) = self.result_listener.as_mut() {
            listener(&result);
        }
        self.result = Some(result);
        result
    }

    fn compute_result(&self) -> GameResult {
        let (black_count, white_count) = self.board.count_discs();
        let winner = match black_count.cmp(&white_count) {
            Ordering::Greater => DiscColor::Black,
            Ordering::Less => DiscColor::White,
            Ordering::Equal => DiscColor::None,
        };
        let human = self.board.disc_count(self.config.human_color) as i32;
        let computer = self.board.disc_count(self.config.ai_color()) as i32;

        GameResult {
            winner,
            black_count,
            white_count,
            point: human - computer,
            level: self.config.ai_level.number(),
            excluded_from_stats: self.used_undo || self.config.uses_handicap(),
            random_mode: self.config.random_mode,
        }
    }

    /// Start position implied by the config, for sessions saved without one.
    fn configured_initial(&self) -> InitialPosition {
        let mut board = Board::new();
        board.reset(self.config.handicap_color(), self.config.handicap_count);
        InitialPosition::from_board(&board)
    }

    fn clear_transient(&mut self) {
        self.is_pass = false;
        self.flipped.clear();
        self.result = None;
    }

    fn notify_score(&mut self) {
        let (black, white) = self.board.count_discs();
        let turn = self.board.turn();
        if let Some(listener) = self.score_listener.as_mut() {
            listener(black, white, turn);
        }
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board) {
        self.board = board;
        self.initial = InitialPosition::from_board(&board);
        self.history.clear();
        self.clear_transient();
    }
}

impl Default for GameInstance {
    fn default() -> Self {
        Self::with_default_selector(EngineConfig::default())
    }
}
