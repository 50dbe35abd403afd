use wasm_bindgen::prelude::*;

pub mod ai;
pub mod arena;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod history;
pub mod session;
pub mod setup;
pub mod types;
pub mod version;
pub mod wasm;
#[cfg(not(target_arch = "wasm32"))]
pub mod worker;

pub use ai::{CpuPlayer, MoveSelector};
pub use board::Board;
pub use config::{EngineConfig, EvalWeights};
pub use error::{EngineError, EngineResult};
pub use game::GameInstance;
pub use history::{History, Move};
pub use session::{InitialPosition, SavedSession};
pub use types::{
    DiscColor, GameConfig, GameResult, GameState, HandicapTarget, Level, PlayOutcome, Position,
};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
