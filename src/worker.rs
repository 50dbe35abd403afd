//! Background computer player for native hosts.
//!
//! The controller lives behind a mutex shared with one worker thread. The
//! host asks for a computer move, the worker searches on a board copy
//! without holding the lock, waits out the thinking delay and then commits
//! against the game version and ply the search started from.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use web_time::Instant;

use crate::ai::{CpuPlayer, MoveSelector};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::game::{AiJob, GameInstance};
use crate::types::{PlayOutcome, Position};

enum Input {
    Think(AiJob),
}

/// What the worker did with a requested move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiEvent {
    Played { pos: Position, outcome: PlayOutcome },
    /// The game moved on while the search ran: restart, undo, restore or an
    /// earlier decision for the same turn.
    Dropped { version: u64 },
    NoMove,
    Failed(EngineError),
}

pub struct GameHandle {
    game: Arc<Mutex<GameInstance>>,
    jobs: Option<Sender<Input>>,
    events: Receiver<AiEvent>,
    worker: Option<JoinHandle<()>>,
}

impl GameHandle {
    /// Starts the worker with the built-in computer player.
    pub fn spawn(engine_config: EngineConfig) -> Self {
        let selector = Box::new(CpuPlayer::new(engine_config.clone()));
        let game = GameInstance::with_default_selector(engine_config);
        Self::with_selector(game, selector)
    }

    /// Starts the worker for `game`, searching with `selector`.
    pub fn with_selector(game: GameInstance, selector: Box<dyn MoveSelector>) -> Self {
        let think_delay = Duration::from_millis(game.engine_config().think_delay_ms);
        let game = Arc::new(Mutex::new(game));
        let (job_tx, job_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let shared = Arc::clone(&game);
        let worker = thread::spawn(move || {
            run_worker(shared, selector, think_delay, job_rx, event_tx);
        });

        Self {
            game,
            jobs: Some(job_tx),
            events: event_rx,
            worker: Some(worker),
        }
    }

    /// Locks the controller. Keep the guard short-lived: the worker needs
    /// the same lock to commit its move.
    pub fn game(&self) -> MutexGuard<'_, GameInstance> {
        lock(&self.game)
    }

    /// Queues a search if the computer is to move. Returns whether one was queued.
    pub fn request_ai_move(&self) -> bool {
        let Some(job) = self.game().snapshot_for_ai() else {
            return false;
        };
        self.jobs
            .as_ref()
            .is_some_and(|jobs| jobs.send(Input::Think(job)).is_ok())
    }

    pub fn try_event(&self) -> Option<AiEvent> {
        self.events.try_recv().ok()
    }

    /// Waits up to `timeout` for the next worker event.
    pub fn wait_event(&self, timeout: Duration) -> Option<AiEvent> {
        self.events.recv_timeout(timeout).ok()
    }
}

impl Drop for GameHandle {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(
    game: Arc<Mutex<GameInstance>>,
    mut selector: Box<dyn MoveSelector>,
    think_delay: Duration,
    jobs: Receiver<Input>,
    events: Sender<AiEvent>,
) {
    for input in jobs {
        let Input::Think(job) = input;
        let started = Instant::now();
        let version = job.watch.expected();

        selector.watch_version(Some(job.watch.clone()));
        let choice = selector.select_move(&job.board, job.level);
        selector.watch_version(None);

        if let Some(rest) = think_delay.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }

        let event = match choice {
            None => AiEvent::NoMove,
            Some(pos) => match lock(&game).commit_ai_move(&job, pos) {
                Ok(Some(outcome)) => AiEvent::Played { pos, outcome },
                Ok(None) => AiEvent::Dropped { version },
                Err(err) => AiEvent::Failed(err),
            },
        };

        if events.send(event).is_err() {
            break;
        }
    }
    log::debug!("ai worker stopped");
}

fn lock(game: &Mutex<GameInstance>) -> MutexGuard<'_, GameInstance> {
    game.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, positions};
    use crate::types::{DiscColor, GameConfig, Level};

    const WAIT: Duration = Duration::from_secs(5);

    /// First legal move, but only once the test opens the gate.
    struct GatedSelector {
        gate: Receiver<()>,
    }

    impl MoveSelector for GatedSelector {
        fn select_move(&mut self, board: &Board, _level: Level) -> Option<Position> {
            let _ = self.gate.recv();
            positions(board.legal_moves(board.turn())).next()
        }
    }

    fn gated_handle() -> (GameHandle, Sender<()>) {
        let config = EngineConfig {
            think_delay_ms: 0,
            ..EngineConfig::default().with_seed(3)
        };
        let (gate_tx, gate_rx) = mpsc::channel();
        let game = GameInstance::with_default_selector(config);
        let handle = GameHandle::with_selector(game, Box::new(GatedSelector { gate: gate_rx }));
        (handle, gate_tx)
    }

    #[test]
    fn nothing_is_queued_on_the_humans_turn() {
        let (handle, _gate) = gated_handle();

        assert!(!handle.request_ai_move());
        assert_eq!(handle.try_event(), None);
    }

    #[test]
    fn worker_commits_its_move() {
        let (handle, gate) = gated_handle();
        handle.game().human_plays(2, 3).unwrap();

        assert!(handle.request_ai_move());
        gate.send(()).unwrap();

        let event = handle.wait_event(WAIT).unwrap();
        assert!(matches!(event, AiEvent::Played { outcome: PlayOutcome::Applied, .. }));
        let game = handle.game();
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.current_turn(), DiscColor::Black);
    }

    #[test]
    fn restart_during_search_drops_the_decision() {
        let (handle, gate) = gated_handle();
        handle.game().human_plays(2, 3).unwrap();
        assert!(handle.request_ai_move());

        handle.game().new_game(GameConfig::default()).unwrap();
        handle.game().human_plays(2, 3).unwrap();
        gate.send(()).unwrap();

        let event = handle.wait_event(WAIT).unwrap();
        assert!(matches!(event, AiEvent::Dropped { .. }));
        let game = handle.game();
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.current_turn(), DiscColor::White);
    }

    #[test]
    fn duplicate_request_for_one_turn_is_dropped() {
        let (handle, gate) = gated_handle();
        handle.game().human_plays(2, 3).unwrap();
        assert!(handle.request_ai_move());
        assert!(handle.request_ai_move());

        gate.send(()).unwrap();
        gate.send(()).unwrap();

        let first = handle.wait_event(WAIT).unwrap();
        let second = handle.wait_event(WAIT).unwrap();
        assert!(matches!(first, AiEvent::Played { .. }));
        assert!(matches!(second, AiEvent::Dropped { .. }));
        let game = handle.game();
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.current_turn(), DiscColor::Black);
    }

    #[test]
    fn thinking_delay_is_a_minimum() {
        let config = EngineConfig {
            think_delay_ms: 150,
            ..EngineConfig::default().with_seed(3)
        };
        let handle = GameHandle::with_selector(
            GameInstance::with_default_selector(config.clone()),
            Box::new(CpuPlayer::new(config)),
        );
        handle.game().human_plays(2, 3).unwrap();

        let started = Instant::now();
        assert!(handle.request_ai_move());
        let event = handle.wait_event(WAIT).unwrap();

        assert!(started.elapsed() >= Duration::from_millis(150));
        assert!(matches!(event, AiEvent::Played { .. }));
    }
}
