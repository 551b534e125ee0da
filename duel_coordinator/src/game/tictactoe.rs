//! 3x3 tic-tac-toe, version 0.0.1.
//!
//! State is a 3x3 array of marks: `1` for player 1, `-1` for player 2, `0` for
//! empty. A move is the cell index `0..9`, row major.

use super::{GameEngine, GameError, GameMove, GameRef, GameState, Outcome, Transition, Turn};
use serde_json::json;

pub const NAME: &str = "tictactoe";
pub const VERSION: &str = "0.0.1";

type Board = [[i8; 3]; 3];

const EMPTY: i8 = 0;

const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

fn mark(turn: Turn) -> i8 {
    match turn {
        Turn::Player1 => 1,
        Turn::Player2 => -1,
    }
}

/// Cell addressed by a move, if the move names an empty cell
fn playable_cell(board: &Board, mv: &GameMove) -> Option<(usize, usize)> {
    let index = mv.as_u64().filter(|index| *index < 9)? as usize;
    let (row, col) = (index / 3, index % 3);
    (board[row][col] == EMPTY).then_some((row, col))
}

fn outcome(board: &Board) -> Outcome {
    for line in LINES {
        let sum: i8 = line.iter().map(|&(row, col)| board[row][col]).sum();
        if sum == 3 * mark(Turn::Player1) {
            return Outcome::Player1;
        }
        if sum == 3 * mark(Turn::Player2) {
            return Outcome::Player2;
        }
    }

    let has_space = board.iter().flatten().any(|cell| *cell == EMPTY);
    if has_space {
        Outcome::Undecided
    } else {
        Outcome::Draw
    }
}

/// Tic-tac-toe engine
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl TicTacToe {
    fn decode(&self, state: &GameState) -> Result<Board, GameError> {
        let board: Board =
            serde_json::from_value(state.clone()).map_err(|e| GameError::CorruptState {
                game: self.game_ref(),
                reason: e.to_string(),
            })?;

        if let Some(cell) = board
            .iter()
            .flatten()
            .find(|cell| !(mark(Turn::Player2)..=mark(Turn::Player1)).contains(*cell))
        {
            return Err(GameError::CorruptState {
                game: self.game_ref(),
                reason: format!("invalid mark {cell}"),
            });
        }
        Ok(board)
    }
}

impl GameEngine for TicTacToe {
    fn game_ref(&self) -> GameRef {
        GameRef::new(NAME, VERSION)
    }

    fn init(&self) -> GameState {
        json!([[0, 0, 0], [0, 0, 0], [0, 0, 0]])
    }

    fn next(&self, state: &GameState, turn: Turn, mv: &GameMove) -> Result<Transition, GameError> {
        let mut board = self.decode(state)?;

        let Some((row, col)) = playable_cell(&board, mv) else {
            return Ok(Transition {
                state: state.clone(),
                turn,
                outcome: outcome(&board),
            });
        };

        board[row][col] = mark(turn);

        Ok(Transition {
            state: json!(board),
            turn: turn.opponent(),
            outcome: outcome(&board),
        })
    }
}
