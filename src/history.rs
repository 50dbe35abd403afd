//! Append-only move log and replay.
//!
//! The log is kept as a list of moves and converts to and from the compact
//! `TRC` string form (color ordinal, row digit, column digit per move) that
//! saved sessions use.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{EngineError, EngineResult};
use crate::session::InitialPosition;
use crate::types::{BOARD_SIZE, DiscColor, Position};

const GROUP_LEN: usize = 3;

/// One placement: who played and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub color: DiscColor,
    pub pos: Position,
}

impl Move {
    pub fn new(color: DiscColor, pos: Position) -> Self {
        Self { color, pos }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    moves: Vec<Move>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a `TRC...` string. Every group must name a player (`1` or `2`)
    /// and a cell on the board.
    pub fn parse(encoded: &str) -> EngineResult<Self> {
        let bytes = encoded.as_bytes();
        if bytes.len() % GROUP_LEN != 0 {
            return Err(EngineError::MalformedSavedState(format!(
                "history length {} is not a multiple of {GROUP_LEN}",
                bytes.len()
            )));
        }

        let mut moves = Vec::with_capacity(bytes.len() / GROUP_LEN);
        for (n, group) in bytes.chunks_exact(GROUP_LEN).enumerate() {
            let color = DiscColor::from_digit(char::from(group[0]))
                .filter(|c| *c != DiscColor::None)
                .ok_or_else(|| {
                    EngineError::MalformedSavedState(format!(
                        "history group #{n} has invalid player {:?}",
                        char::from(group[0])
                    ))
                })?;
            let row = coordinate(group[1]);
            let col = coordinate(group[2]);
            let (Some(row), Some(col)) = (row, col) else {
                return Err(EngineError::MalformedSavedState(format!(
                    "history group #{n} has an off-board cell"
                )));
            };
            moves.push(Move::new(color, Position::new(row, col)));
        }

        Ok(Self { moves })
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn append(&mut self, color: DiscColor, pos: Position) {
        self.moves.push(Move::new(color, pos));
    }

    /// Drops the most recent move by `human` and everything after it.
    /// Without any such move the whole history goes. Returns whether a move
    /// by `human` was found.
    pub fn undo_to_self(&mut self, human: DiscColor) -> bool {
        match self.moves.iter().rposition(|m| m.color == human) {
            Some(index) => {
                self.moves.truncate(index);
                true
            }
            None => {
                self.moves.clear();
                false
            }
        }
    }

    /// Rebuilds a board from `initial` by replaying every move in order.
    ///
    /// The side to move afterwards is the opponent of the last mover, or
    /// Black when the history is empty. Fails when a move is not legal for
    /// its recorded color at that point.
    pub fn replay(&self, initial: &InitialPosition) -> EngineResult<Board> {
        let mut board = initial.to_board();
        for (n, mv) in self.moves.iter().enumerate() {
            board.set_turn(mv.color);
            if board.play(mv.pos) == 0 {
                return Err(EngineError::MalformedSavedState(format!(
                    "history move #{n} ({}, {}) by {} cannot be replayed",
                    mv.pos.row,
                    mv.pos.col,
                    mv.color.name()
                )));
            }
        }
        if !self.moves.is_empty() {
            board.change_turn();
        }
        Ok(board)
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn last(&self) -> Option<Move> {
        self.moves.last().copied()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter()
    }

    pub fn contains_move_by(&self, color: DiscColor) -> bool {
        self.moves.iter().any(|m| m.color == color)
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mv in &self.moves {
            write!(f, "{}{}{}", mv.color.ordinal(), mv.pos.row, mv.pos.col)?;
        }
        Ok(())
    }
}

fn coordinate(byte: u8) -> Option<u8> {
    let value = byte.checked_sub(b'0')?;
    ((value as usize) < BOARD_SIZE).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn encode_writes_three_digit_groups() {
        let mut history = History::new();
        history.append(DiscColor::Black, sq(2, 3));
        history.append(DiscColor::White, sq(2, 2));

        assert_eq!(history.encode(), "123222");
        assert_eq!(History::parse("123222").unwrap(), history);
    }

    #[test]
    fn parse_rejects_bad_groups() {
        assert!(History::parse("12").is_err());
        assert!(History::parse("023").is_err()); // nobody played it
        assert!(History::parse("323").is_err());
        assert!(History::parse("183").is_err());
        assert!(History::parse("1a3").is_err());
        assert!(History::parse("").unwrap().is_empty());
    }

    #[test]
    fn undo_to_self_cuts_at_latest_own_move() {
        let mut history = History::parse("123222132244").unwrap();

        assert!(history.undo_to_self(DiscColor::Black));
        assert_eq!(history.encode(), "123222");

        assert!(history.undo_to_self(DiscColor::Black));
        assert!(history.is_empty());
    }

    #[test]
    fn undo_to_self_without_own_move_clears_everything() {
        let mut history = History::parse("123").unwrap();

        assert!(!history.undo_to_self(DiscColor::White));
        assert!(history.is_empty());
    }

    #[test]
    fn replay_reproduces_incremental_play() {
        let mut board = Board::new();
        let mut history = History::new();
        for pos in [sq(2, 3), sq(2, 2), sq(2, 1)] {
            let color = board.turn();
            assert_ne!(board.play(pos), 0);
            history.append(color, pos);
            board.change_turn();
        }

        let replayed = history
            .replay(&InitialPosition::from_board(&Board::new()))
            .unwrap();

        assert_eq!(replayed, board);
        assert_eq!(replayed.turn(), DiscColor::White);
    }

    #[test]
    fn replay_of_empty_history_is_the_initial_position_with_black_to_move() {
        let mut start = Board::new();
        start.set_turn(DiscColor::White);
        let initial = InitialPosition::from_board(&start);

        let board = History::new().replay(&initial).unwrap();

        assert_eq!(board.cells(), start.cells());
        assert_eq!(board.turn(), DiscColor::Black);
    }

    #[test]
    fn replay_rejects_impossible_moves() {
        let history = History::parse("100").unwrap();

        let err = history
            .replay(&InitialPosition::from_board(&Board::new()))
            .unwrap_err();

        assert!(matches!(err, EngineError::MalformedSavedState(_)));
    }

    #[test]
    fn last_returns_the_latest_group() {
        let history = History::parse("123222").unwrap();
        assert_eq!(history.last(), Some(Move::new(DiscColor::White, sq(2, 2))));
        assert!(history.contains_move_by(DiscColor::White));
    }
}
