//! Saved-session strings.
//!
//! Cells are 64 digits in row-major order (`0` empty, `1` black, `2` white),
//! the turn is one ordinal digit and the history uses [`History`]'s `TRC`
//! groups. These are the formats existing saved sessions use, so they must
//! not change.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{EngineError, EngineResult};
use crate::history::History;
use crate::types::{DiscColor, NUM_SQUARES};

/// Snapshot of the cells a game started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialPosition {
    cells: [DiscColor; NUM_SQUARES],
}

impl InitialPosition {
    pub fn from_board(board: &Board) -> Self {
        Self {
            cells: board.cells(),
        }
    }

    pub fn parse(encoded: &str) -> EngineResult<Self> {
        Ok(Self {
            cells: decode_cells(encoded)?,
        })
    }

    /// The recorded cells with Black to move.
    pub fn to_board(&self) -> Board {
        let mut board = Board::empty();
        board.set_cells(&self.cells);
        board
    }

    pub fn encode(&self) -> String {
        self.cells.iter().map(|c| c.to_digit()).collect()
    }
}

impl Default for InitialPosition {
    fn default() -> Self {
        Self::from_board(&Board::new())
    }
}

/// Everything a host needs to persist to resume a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub turn: u8,
    pub cells: String,
    pub history: String,
    /// Starting cells of the game. Absent in sessions written before it was
    /// recorded; those fall back to the configured setup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
}

impl SavedSession {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::MalformedSavedState(e.to_string()))
    }
}

/// A validated saved session.
#[derive(Debug, Clone)]
pub(crate) struct DecodedSession {
    pub board: Board,
    pub history: History,
    pub initial: InitialPosition,
}

impl SavedSession {
    /// Checks every field and that the history replays from the game's
    /// initial position.
    ///
    /// With a recorded initial position the replay must also reproduce the
    /// saved cells. Sessions without one are replayed from `fallback`, the
    /// start the current config implies, and every move must still land on
    /// an occupied saved cell.
    pub(crate) fn decode(&self, fallback: &InitialPosition) -> EngineResult<DecodedSession> {
        let turn = DiscColor::from_ordinal(self.turn).ok_or_else(|| {
            EngineError::MalformedSavedState(format!("invalid turn ordinal {}", self.turn))
        })?;
        let cells = decode_cells(&self.cells)?;
        let history = History::parse(&self.history)?;

        let mut board = Board::empty();
        board.set_cells(&cells);
        board.set_turn(turn);

        let initial = match &self.initial {
            Some(encoded) => {
                let initial = InitialPosition::parse(encoded)?;
                let replayed = history.replay(&initial)?;
                if replayed.cells() != cells {
                    return Err(EngineError::MalformedSavedState(
                        "history does not lead to the saved cells".to_string(),
                    ));
                }
                initial
            }
            None => {
                check_history_against_cells(&history, &board)?;
                history.replay(fallback)?;
                *fallback
            }
        };

        Ok(DecodedSession {
            board,
            history,
            initial,
        })
    }
}

pub fn encode_cells(board: &Board) -> String {
    board.cells().iter().map(|c| c.to_digit()).collect()
}

pub fn decode_cells(encoded: &str) -> EngineResult<[DiscColor; NUM_SQUARES]> {
    let len = encoded.chars().count();
    if len != NUM_SQUARES {
        return Err(EngineError::MalformedSavedState(format!(
            "cells string must have {NUM_SQUARES} characters, got {len}"
        )));
    }

    let mut cells = [DiscColor::None; NUM_SQUARES];
    for (index, (cell, ch)) in cells.iter_mut().zip(encoded.chars()).enumerate() {
        *cell = DiscColor::from_digit(ch).ok_or_else(|| {
            EngineError::MalformedSavedState(format!("invalid cell {ch:?} at index {index}"))
        })?;
    }
    Ok(cells)
}

fn check_history_against_cells(history: &History, board: &Board) -> EngineResult<()> {
    let mut seen = 0u64;
    for (n, mv) in history.iter().enumerate() {
        let square = 1u64 << mv.pos.index();
        if board.cell(mv.pos) == DiscColor::None || (seen & square) != 0 {
            return Err(EngineError::MalformedSavedState(format!(
                "history move #{n} ({}, {}) is impossible for the saved cells",
                mv.pos.row, mv.pos.col
            )));
        }
        seen |= square;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSIC: &str = "0000000000000000000000000002100000012000000000000000000000000000";

    #[test]
    fn classic_board_encodes_to_known_string() {
        assert_eq!(encode_cells(&Board::new()), CLASSIC);
        assert_eq!(InitialPosition::default().encode(), CLASSIC);
    }

    #[test]
    fn decode_cells_rejects_wrong_length_and_digits() {
        assert!(decode_cells(&CLASSIC[1..]).is_err());
        let bad = CLASSIC.replacen('1', "3", 1);
        assert!(decode_cells(&bad).is_err());
        assert!(decode_cells(CLASSIC).is_ok());
    }

    #[test]
    fn decode_checks_turn_and_history() {
        let session = SavedSession {
            turn: 3,
            cells: CLASSIC.to_string(),
            history: String::new(),
            initial: None,
        };
        assert!(session.decode(&InitialPosition::default()).is_err());

        // (0,0) is empty in the classic cells.
        let session = SavedSession {
            turn: 1,
            cells: CLASSIC.to_string(),
            history: "100".to_string(),
            initial: None,
        };
        assert!(session.decode(&InitialPosition::default()).is_err());
    }

    #[test]
    fn decode_without_initial_replays_from_the_fallback() {
        let mut board = Board::new();
        board.play(crate::types::Position::new(2, 3));
        board.change_turn();
        let cells = encode_cells(&board);
        let fallback = InitialPosition::default();

        let session = SavedSession {
            turn: 2,
            cells: cells.clone(),
            history: "123".to_string(),
            initial: None,
        };
        let decoded = session.decode(&fallback).unwrap();
        assert_eq!(decoded.initial, fallback);
        assert_eq!(decoded.board, board);

        // Every cell is occupied, but white cannot open on (4,4).
        let session = SavedSession {
            turn: 2,
            cells,
            history: "244133123".to_string(),
            initial: None,
        };
        assert!(matches!(
            session.decode(&fallback),
            Err(EngineError::MalformedSavedState(_))
        ));
    }

    #[test]
    fn decode_with_initial_position_replays_history() {
        let mut board = Board::new();
        board.play(crate::types::Position::new(2, 3));
        board.change_turn();
        let session = SavedSession {
            turn: 2,
            cells: encode_cells(&board),
            history: "123".to_string(),
            initial: Some(CLASSIC.to_string()),
        };

        let decoded = session.decode(&InitialPosition::default()).unwrap();
        assert_eq!(decoded.board, board);
        assert_eq!(decoded.history.encode(), "123");

        let tampered = SavedSession {
            cells: CLASSIC.to_string(),
            ..session
        };
        assert!(tampered.decode(&InitialPosition::default()).is_err());
    }

    #[test]
    fn json_round_trip_omits_missing_initial() {
        let session = SavedSession {
            turn: 1,
            cells: CLASSIC.to_string(),
            history: String::new(),
            initial: None,
        };

        let json = session.to_json().unwrap();
        assert!(!json.contains("initial"));
        assert_eq!(SavedSession::from_json(&json).unwrap(), session);
        assert!(SavedSession::from_json("{").is_err());
    }
}
