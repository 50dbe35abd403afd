use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// Contents of a cell, and also whose turn it is (`None` once the game is over).
///
/// The discriminants are the ordinals used by the saved-session strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum DiscColor {
    #[default]
    None = 0,
    Black = 1,
    White = 2,
}

impl DiscColor {
    pub fn opposite(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
            Self::None => Self::None,
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::None),
            1 => Some(Self::Black),
            2 => Some(Self::White),
            _ => None,
        }
    }

    /// Parses one character of a cells or history string.
    pub fn from_digit(ch: char) -> Option<Self> {
        ch.to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .and_then(Self::from_ordinal)
    }

    pub fn to_digit(self) -> char {
        char::from(b'0' + self.ordinal())
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Checked constructor for coordinates coming from outside the crate.
    pub fn try_new(row: u8, col: u8) -> Option<Self> {
        if (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self {
            row: (index / BOARD_SIZE) as u8,
            col: (index % BOARD_SIZE) as u8,
        }
    }

    /// Row-major index `8 * row + col`.
    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    pub fn is_corner(self) -> bool {
        is_edge_line(self.row) && is_edge_line(self.col)
    }

    pub fn is_edge(self) -> bool {
        is_edge_line(self.row) || is_edge_line(self.col)
    }

    /// Edge cell orthogonally adjacent to a corner.
    pub fn is_c_square(self) -> bool {
        (is_edge_line(self.row) && is_next_to_edge(self.col))
            || (is_next_to_edge(self.row) && is_edge_line(self.col))
    }

    /// Cell diagonally adjacent to a corner.
    pub fn is_x_square(self) -> bool {
        is_next_to_edge(self.row) && is_next_to_edge(self.col)
    }
}

fn is_edge_line(v: u8) -> bool {
    v == 0 || v as usize == BOARD_SIZE - 1
}

fn is_next_to_edge(v: u8) -> bool {
    v == 1 || v as usize == BOARD_SIZE - 2
}

/// Computer strength. The depth numbers are the ones the search dispatch keys on.
///
/// Serialized as the level number `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Level {
    pub fn depth(self) -> u8 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 3,
            Self::Advanced => 5,
        }
    }

    /// Level number shown to players and recorded with results.
    pub fn number(self) -> u8 {
        (self.depth() + 1) / 2
    }
}

impl TryFrom<u8> for Level {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Beginner),
            2 => Ok(Self::Intermediate),
            3 => Ok(Self::Advanced),
            other => Err(EngineError::InvalidConfig(format!(
                "ai level must be 1..=3, got {other}"
            ))),
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.number()
    }
}

/// Which side receives free corner discs, in player terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HandicapTarget {
    #[default]
    None,
    Human,
    Opponent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub ai_level: Level,
    pub human_color: DiscColor,
    pub handicap_target: HandicapTarget,
    pub handicap_count: u8,
    pub random_mode: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ai_level: Level::default(),
            human_color: DiscColor::Black,
            handicap_target: HandicapTarget::None,
            handicap_count: 1,
            random_mode: false,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.human_color == DiscColor::None {
            return Err(EngineError::InvalidConfig(
                "human color must be black or white".to_string(),
            ));
        }
        if self.handicap_target != HandicapTarget::None {
            if !(1..=4).contains(&self.handicap_count) {
                return Err(EngineError::InvalidConfig(format!(
                    "handicap count must be 1..=4, got {}",
                    self.handicap_count
                )));
            }
            if self.random_mode {
                return Err(EngineError::InvalidConfig(
                    "handicap and random mode are mutually exclusive".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn ai_color(&self) -> DiscColor {
        self.human_color.opposite()
    }

    /// Board color that receives the handicap corners, if any.
    pub fn handicap_color(&self) -> DiscColor {
        match self.handicap_target {
            HandicapTarget::None => DiscColor::None,
            HandicapTarget::Human => self.human_color,
            HandicapTarget::Opponent => self.ai_color(),
        }
    }

    pub fn uses_handicap(&self) -> bool {
        self.handicap_target != HandicapTarget::None
    }
}

/// What happened after a placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PlayOutcome {
    /// The move was applied and the turn passed to the other side.
    Applied,
    /// The move was applied but `passed` has no reply, so the mover plays again.
    OpponentPasses { passed: DiscColor },
    /// Neither side can move any more.
    GameOver(GameResult),
}

/// Public game state snapshot for shells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub board: Vec<u8>,
    pub current_player: u8,
    pub black_count: u8,
    pub white_count: u8,
    pub is_game_over: bool,
    /// Contract:
    /// - `true` when the last placement made the opponent pass.
    /// - `false` otherwise.
    pub is_pass: bool,
    /// Contract:
    /// - After a placement: flipped positions (0..=63).
    /// - After setup, undo or restore: empty.
    pub flipped: Vec<u8>,
    pub last_move: Option<Position>,
}

/// Final result after game over, from the human's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub winner: DiscColor,
    pub black_count: u8,
    pub white_count: u8,
    /// Human disc count minus computer disc count.
    pub point: i32,
    pub level: u8,
    /// Set when undo or a handicap was used; such games are not rated.
    pub excluded_from_stats: bool,
    pub random_mode: bool,
}
