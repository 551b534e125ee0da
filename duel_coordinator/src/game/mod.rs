//! Game engine adapter.
//!
//! Every game is a pure, deterministic state-transition function pack selected at
//! runtime by its `name@version` reference. Engines never perform I/O and never
//! reject a move by failing: an illegal move yields the unchanged state and turn
//! with an undecided outcome.
//!
//! ## Example
//!
//! ```
//! use duel_coordinator::game::{GameRef, GameRegistry, Outcome, Turn};
//! use serde_json::json;
//!
//! let registry = GameRegistry::with_builtin_games();
//! let engine = registry.resolve(&"tictactoe@0.0.1".parse::<GameRef>().unwrap()).unwrap();
//!
//! let transition = engine.next(&engine.init(), Turn::Player1, &json!(4)).unwrap();
//! assert_eq!(transition.turn, Turn::Player2);
//! assert_eq!(transition.outcome, Outcome::Undecided);
//! ```

pub mod tictactoe;

pub use tictactoe::TicTacToe;

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};
use thiserror::Error;

/// Engine-defined game state blob
pub type GameState = serde_json::Value;

/// Engine-defined move payload
pub type GameMove = serde_json::Value;

/// Game engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("invalid game reference '{0}', expected name@version")]
    InvalidReference(String),

    #[error("{game} cannot decode state: {reason}")]
    CorruptState { game: GameRef, reason: String },
}

/// Side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    Player1,
    Player2,
}

impl Turn {
    /// The other side
    pub fn opponent(self) -> Self {
        match self {
            Turn::Player1 => Turn::Player2,
            Turn::Player2 => Turn::Player1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Turn::Player1 => "PLAYER1",
            Turn::Player2 => "PLAYER2",
        }
    }
}

impl FromStr for Turn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLAYER1" => Ok(Turn::Player1),
            "PLAYER2" => Ok(Turn::Player2),
            other => Err(format!("unknown turn '{other}'")),
        }
    }
}

/// Result of applying a move, also used as a match's winner marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Game continues
    #[serde(rename = "none")]
    Undecided,
    #[serde(rename = "player1")]
    Player1,
    #[serde(rename = "player2")]
    Player2,
    /// Draw
    #[serde(rename = "both")]
    Draw,
}

impl Outcome {
    /// Whether the game has ended
    pub fn is_terminal(self) -> bool {
        self != Outcome::Undecided
    }

    /// The winning side, if exactly one side won
    pub fn winner(self) -> Option<Turn> {
        match self {
            Outcome::Player1 => Some(Turn::Player1),
            Outcome::Player2 => Some(Turn::Player2),
            Outcome::Undecided | Outcome::Draw => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Undecided => "NONE",
            Outcome::Player1 => "PLAYER1",
            Outcome::Player2 => "PLAYER2",
            Outcome::Draw => "BOTH",
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(Outcome::Undecided),
            "PLAYER1" => Ok(Outcome::Player1),
            "PLAYER2" => Ok(Outcome::Player2),
            "BOTH" => Ok(Outcome::Draw),
            other => Err(format!("unknown outcome '{other}'")),
        }
    }
}

/// Game name and pinned ruleset version, written `name@version`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameRef {
    pub name: String,
    pub version: String,
}

impl GameRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for GameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl FromStr for GameRef {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((name, version))
                if !name.is_empty() && !version.is_empty() && !version.contains('@') =>
            {
                Ok(Self::new(name, version))
            }
            _ => Err(GameError::InvalidReference(s.to_string())),
        }
    }
}

impl TryFrom<String> for GameRef {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GameRef> for String {
    fn from(game: GameRef) -> Self {
        game.to_string()
    }
}

/// New state, turn and outcome after a move
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: GameState,
    pub turn: Turn,
    pub outcome: Outcome,
}

/// Ruleset of one game version
pub trait GameEngine: Send + Sync {
    /// Reference this engine is registered under
    fn game_ref(&self) -> GameRef;

    /// Canonical starting state of a fresh match
    fn init(&self) -> GameState;

    /// Apply `mv` for the side holding `turn`.
    ///
    /// Illegal or malformed moves return the unchanged state and turn with a
    /// non-terminal outcome. Only a state the engine cannot decode is an error.
    fn next(&self, state: &GameState, turn: Turn, mv: &GameMove) -> Result<Transition, GameError>;
}

/// Maps game references to engines
#[derive(Clone, Default)]
pub struct GameRegistry {
    engines: HashMap<GameRef, Arc<dyn GameEngine>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every game shipped in this crate
    pub fn with_builtin_games() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TicTacToe));
        registry
    }

    /// Add an engine, replacing any engine already registered under the same reference
    pub fn register(&mut self, engine: Arc<dyn GameEngine>) {
        self.engines.insert(engine.game_ref(), engine);
    }

    pub fn resolve(&self, game: &GameRef) -> Option<Arc<dyn GameEngine>> {
        self.engines.get(game).cloned()
    }

    /// All registered references, sorted
    pub fn games(&self) -> Vec<GameRef> {
        let mut games: Vec<GameRef> = self.engines.keys().cloned().collect();
        games.sort_by_key(|game| game.to_string());
        games
    }
}

impl fmt::Debug for GameRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameRegistry")
            .field("games", &self.games())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_ref_parse() {
        let game: GameRef = "tictactoe@0.0.1".parse().unwrap();
        assert_eq!(game.name, "tictactoe");
        assert_eq!(game.version, "0.0.1");
        assert_eq!(game.to_string(), "tictactoe@0.0.1");
    }

    #[test]
    fn test_game_ref_rejects_malformed() {
        for bad in ["tictactoe", "@0.0.1", "tictactoe@", "a@b@c", ""] {
            assert!(bad.parse::<GameRef>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_game_ref_serializes_as_string() {
        let game = GameRef::new("tictactoe", "0.0.1");
        assert_eq!(
            serde_json::to_string(&game).unwrap(),
            "\"tictactoe@0.0.1\""
        );
    }

    #[test]
    fn test_registry_resolves_pinned_version_only() {
        let registry = GameRegistry::with_builtin_games();
        assert!(registry.resolve(&GameRef::new("tictactoe", "0.0.1")).is_some());
        assert!(registry.resolve(&GameRef::new("tictactoe", "9.9.9")).is_none());
        assert!(registry.resolve(&GameRef::new("chess", "0.0.1")).is_none());
    }

    #[test]
    fn test_turn_opponent() {
        assert_eq!(Turn::Player1.opponent(), Turn::Player2);
        assert_eq!(Turn::Player2.opponent(), Turn::Player1);
    }

    #[test]
    fn test_outcome_round_trips_storage_names() {
        for outcome in [
            Outcome::Undecided,
            Outcome::Player1,
            Outcome::Player2,
            Outcome::Draw,
        ] {
            assert_eq!(outcome.as_str().parse::<Outcome>().unwrap(), outcome);
        }
        assert_eq!(Outcome::Draw.winner(), None);
        assert_eq!(Outcome::Player2.winner(), Some(Turn::Player2));
    }
}
