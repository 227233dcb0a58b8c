//! Turn commands a player can submit.
//!
//! This module defines the two compound commands, the events that result
//! from applying them, and the outcome returned to the host.

use crate::cards::{CardId, GoalId};
use crate::game::GameState;
use crate::hex::Coord;
use crate::tree::{PlacedTile, PlayerId, TileType};
use serde::{Deserialize, Serialize};

/// Place tiles from the reserve, optionally removing one first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CultivateAction {
    /// Turn the pot around (cosmetic)
    pub flip_pot: bool,
    /// A tile to take out of the tree before placing
    pub remove_tile: Option<Coord>,
    pub place_tiles: Vec<PlacedTile>,
    pub renounce_goals: Vec<GoalId>,
    pub claim_goals: Vec<GoalId>,
}

/// Take a card from the board, collect tiles, then place and discard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditateAction {
    #[serde(default)]
    pub flip_pot: bool,
    #[serde(default)]
    pub remove_tile: Option<Coord>,
    /// Card to take; must be on the board
    pub draw_card: CardId,
    /// Bonus tile when drawing from slot 1: Wood or Leaf
    #[serde(default)]
    pub wood_or_leaf: Option<TileType>,
    /// One tile per Wild slot on a Master card, in slot order
    #[serde(default)]
    pub master_choices: Vec<TileType>,
    #[serde(default)]
    pub place_tiles: Vec<PlacedTile>,
    #[serde(default)]
    pub renounce_goals: Vec<GoalId>,
    #[serde(default)]
    pub claim_goals: Vec<GoalId>,
    /// Tiles to give up to get back under capacity
    #[serde(default)]
    pub discard_tiles: Vec<TileType>,
}

impl MeditateAction {
    /// A bare draw with no choices, placements or discards
    pub fn draw(card: CardId) -> Self {
        Self {
            flip_pot: false,
            remove_tile: None,
            draw_card: card,
            wood_or_leaf: None,
            master_choices: Vec::new(),
            place_tiles: Vec::new(),
            renounce_goals: Vec::new(),
            claim_goals: Vec::new(),
            discard_tiles: Vec::new(),
        }
    }
}

/// All commands a player can submit on their turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    Cultivate(CultivateAction),
    Meditate(MeditateAction),
}

/// Where received tiles came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiveSource {
    /// Granted by a Master card
    MasterCard(CardId),
    /// Bonus for the board slot the card was taken from
    BoardSlot(usize),
}

/// Events that occur as a result of actions, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The pot was turned around
    PotFlipped { player: PlayerId, flipped: bool },

    /// A tile was taken out of a tree
    TileRemoved { player: PlayerId, tile: PlacedTile },

    /// Tiles were placed; `score` is the player's tile score afterwards
    TilesAdded {
        player: PlayerId,
        tiles: Vec<PlacedTile>,
        score: u32,
    },

    GoalRenounced { player: PlayerId, goal: GoalId },

    GoalClaimed { player: PlayerId, goal: GoalId },

    /// A card was taken from a board slot
    CardTaken {
        player: PlayerId,
        card: CardId,
        slot: usize,
    },

    /// A Tool raised the player's capacity
    CapacityIncreased { player: PlayerId, capacity: u32 },

    TilesReceived {
        player: PlayerId,
        tiles: Vec<TileType>,
        source: ReceiveSource,
    },

    /// A card left the board without being taken
    CardDiscarded { card: CardId, slot: usize },

    /// A card was dealt into a slot; `None` when the pile is empty
    CardRevealed { slot: usize, card: Option<CardId> },

    TilesDiscarded {
        player: PlayerId,
        tiles: Vec<TileType>,
    },

    /// The draw pile ran out; this many turns remain
    LastRound { final_turns: u32 },

    /// Turn ended; `score` is the acting player's total
    EndTurn {
        player: PlayerId,
        next_player: PlayerId,
        score: u32,
    },
}

/// The result of a successfully applied command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// The new state; the input state is never modified
    pub state: GameState,
    pub events: Vec<GameEvent>,
    /// Total score of the player the turn pointer named before it advanced
    pub next_player_score: u32,
}
