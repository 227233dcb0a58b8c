//! Bonsai - rules engine for a bonsai-growing tile placement game
//!
//! This crate provides the core game logic for 1-4 players, including:
//! - Offset hex grid around the pot
//! - Per-player trees with legal move enumeration
//! - The card and goal tile catalog
//! - Game state machine for the Cultivate and Meditate turn commands
//! - Scoring, progression and per-player views
//!
//! # Architecture
//!
//! The engine is a pure function of its input: every command takes a
//! `&GameState` and returns a new state plus the ordered events it produced.
//! Nothing is written back on failure, so a host can keep the pre-state and
//! the rejected command as a regression fixture.
//!
//! # Modules
//!
//! - [`hex`]: Grid coordinates and neighbours
//! - [`tree`]: Placed tiles, legal moves and tile scoring
//! - [`cards`]: Static card and goal tile catalog
//! - [`player`]: Player reserve, capacity and placement allowance
//! - [`game`]: Game setup and the turn state machine
//! - [`actions`]: Commands, events and outcomes
//! - [`scoring`]: Score breakdowns and progression
//! - [`snapshot`]: Versioned JSON save and restore
//! - [`view`]: Redacted per-player view
//! - [`zombie`]: Auto-play for absent players

pub mod actions;
pub mod cards;
pub mod game;
pub mod hex;
pub mod player;
pub mod scoring;
pub mod snapshot;
pub mod tree;
pub mod view;
pub mod zombie;

// Re-export commonly used types
pub use actions::{
    ActionOutcome, CultivateAction, GameAction, GameEvent, MeditateAction, ReceiveSource,
};
pub use cards::{
    catalog, Card, CardId, CardKind, CardType, Catalog, GoalId, GoalSize, GoalTile, GoalType,
    ParchmentTarget,
};
pub use game::{cultivate, meditate, GameError, GameOptions, GameState, PlayerSeat};
pub use hex::{Coord, Direction};
pub use player::{ColorIndex, PlacementBudget, Player, TileHand};
pub use scoring::{get_game_progression, get_scores, winners, ScoreBreakdown};
pub use snapshot::{SnapshotError, CURRENT_VERSION};
pub use tree::{LegalMoves, PlacedTile, PlayerId, Resource, TileType, Tree};
pub use view::{get_player_view, FaceDownView, GameView, PlayerView};
pub use zombie::Zombie;
