//! Computer-against-computer games, for comparing levels.

use serde::Serialize;

use crate::ai::MoveSelector;
use crate::board::{Board, positions};
use crate::types::{DiscColor, Level};

/// Tally of a matchup from the point of view of its first level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchupResult {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl MatchupResult {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

/// Plays one game from the classic start and returns the final board.
///
/// A side without a legal move passes. When a selector declines to move or
/// picks an illegal square, the first legal move is played for it.
pub fn play_game(
    black: &mut dyn MoveSelector,
    black_level: Level,
    white: &mut dyn MoveSelector,
    white_level: Level,
) -> Board {
    let mut board = Board::new();

    loop {
        let turn = board.turn();
        if !board.has_any_move(turn) {
            if !board.has_any_move(turn.opposite()) {
                board.end_turn();
                return board;
            }
            board.change_turn();
            continue;
        }

        let choice = match turn {
            DiscColor::Black => black.select_move(&board, black_level),
            _ => white.select_move(&board, white_level),
        };
        let played = choice.is_some_and(|pos| board.play(pos) != 0);
        if !played {
            log::warn!("{} gave no legal move, playing the first one", turn.name());
            if let Some(pos) = positions(board.legal_moves(turn)).next() {
                board.play(pos);
            }
        }
        board.change_turn();
    }
}

/// Plays `games` games between `first` at `first_level` and `second` at
/// `second_level`, with `first` taking Black in the even-numbered games.
pub fn run_matchup(
    first: &mut dyn MoveSelector,
    first_level: Level,
    second: &mut dyn MoveSelector,
    second_level: Level,
    games: u32,
) -> MatchupResult {
    let mut result = MatchupResult::default();

    for n in 0..games {
        let first_is_black = n % 2 == 0;
        let board = if first_is_black {
            play_game(first, first_level, second, second_level)
        } else {
            play_game(second, second_level, first, first_level)
        };

        let (black, white) = board.count_discs();
        let first_margin = if first_is_black {
            i32::from(black) - i32::from(white)
        } else {
            i32::from(white) - i32::from(black)
        };
        match first_margin {
            m if m > 0 => result.wins += 1,
            m if m < 0 => result.losses += 1,
            _ => result.draws += 1,
        }
    }

    log::info!(
        "{first_level:?} vs {second_level:?}: {} wins, {} losses, {} draws",
        result.wins,
        result.losses,
        result.draws
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::CpuPlayer;
    use crate::config::EngineConfig;
    use crate::types::Position;

    struct FirstLegal;

    impl MoveSelector for FirstLegal {
        fn select_move(&mut self, board: &Board, _level: Level) -> Option<Position> {
            positions(board.legal_moves(board.turn())).next()
        }
    }

    #[test]
    fn game_runs_until_neither_side_can_move() {
        let board = play_game(&mut FirstLegal, Level::Beginner, &mut FirstLegal, Level::Beginner);

        assert_eq!(board.turn(), DiscColor::None);
        assert!(!board.has_any_move(DiscColor::Black));
        assert!(!board.has_any_move(DiscColor::White));
    }

    #[test]
    fn mirrored_matchup_between_identical_players_is_symmetric() {
        let result = run_matchup(
            &mut FirstLegal,
            Level::Beginner,
            &mut FirstLegal,
            Level::Beginner,
            4,
        );

        assert_eq!(result.games(), 4);
        assert_eq!(result.wins, result.losses);
    }

    #[test]
    fn minimax_beats_random_play_more_often_than_not() {
        let mut noisy = CpuPlayer::new(EngineConfig {
            greedy_rate_percent: 0,
            ..EngineConfig::default().with_seed(17)
        });
        let mut minimax = CpuPlayer::new(EngineConfig::default().with_seed(17));

        let result = run_matchup(
            &mut minimax,
            Level::Intermediate,
            &mut noisy,
            Level::Beginner,
            10,
        );

        assert_eq!(result.games(), 10);
        assert!(result.wins > result.losses, "{result:?}");
    }
}
