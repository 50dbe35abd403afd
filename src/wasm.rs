//! JavaScript bindings. Snapshots cross the boundary as plain objects.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::EngineConfig;
use crate::game::GameInstance;
use crate::session::SavedSession;
use crate::types::GameConfig;

#[wasm_bindgen]
pub struct WasmGame {
    inner: GameInstance,
}

#[wasm_bindgen]
impl WasmGame {
    /// `engine_config` is an optional JSON string; missing fields keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(engine_config: Option<String>) -> Result<WasmGame, JsError> {
        let config = match engine_config {
            Some(json) => EngineConfig::load_from_json(&json)?,
            None => EngineConfig::default(),
        };
        Ok(Self {
            inner: GameInstance::with_default_selector(config),
        })
    }

    /// Starts a game. `config` follows `GameConfig`; `undefined` means defaults.
    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self, config: JsValue) -> Result<(), JsError> {
        let config: GameConfig = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        self.inner.new_game(config)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = humanPlays)]
    pub fn human_plays(&mut self, row: u8, col: u8) -> Result<JsValue, JsError> {
        let outcome = self.inner.human_plays(row, col)?;
        to_js(&outcome)
    }

    /// Plays the computer's move; `null` when it is not the computer's turn.
    #[wasm_bindgen(js_name = aiPlays)]
    pub fn ai_plays(&mut self) -> Result<JsValue, JsError> {
        let outcome = self.inner.ai_plays()?;
        to_js(&outcome)
    }

    pub fn undo(&mut self) -> Result<(), JsError> {
        self.inner.undo()?;
        Ok(())
    }

    #[wasm_bindgen(js_name = currentTurn)]
    pub fn current_turn(&self) -> u8 {
        self.inner.current_turn().ordinal()
    }

    /// `[black, white]`.
    #[wasm_bindgen(js_name = discCounts)]
    pub fn disc_counts(&self) -> Vec<u8> {
        let (black, white) = self.inner.disc_counts();
        vec![black, white]
    }

    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.legal_moves())
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.to_game_state())
    }

    pub fn result(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.result())
    }

    /// Saved session as a JSON string for host storage.
    pub fn serialize(&self) -> Result<String, JsError> {
        Ok(self.inner.serialize().to_json()?)
    }

    pub fn restore(&mut self, turn: u8, cells: &str, history: &str) -> Result<(), JsError> {
        self.inner.restore(turn, cells, history)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = restoreJson)]
    pub fn restore_json(&mut self, json: &str) -> Result<(), JsError> {
        let saved = SavedSession::from_json(json)?;
        self.inner.restore_session(&saved)?;
        Ok(())
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(to_js_error)
}

fn to_js_error(err: serde_wasm_bindgen::Error) -> JsError {
    JsError::new(&err.to_string())
}
