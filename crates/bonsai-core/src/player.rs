//! Player state and tile management.
//!
//! This module contains:
//! - `TileHand` for the tiles a player holds in reserve
//! - `PlacementBudget` for how many tiles of each type may be placed in a turn
//! - `Player` with capacity, cards, goals and tree

use crate::cards::{catalog, CardId, CardType, GoalId};
use crate::tree::{PlayerId, Resource, TileType, Tree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Seat colour index chosen by the host
pub type ColorIndex = u8;

/// Tiles a player holds in reserve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileHand {
    pub wood: u32,
    pub leaf: u32,
    pub flower: u32,
    pub fruit: u32,
}

impl TileHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, leaf: u32, flower: u32, fruit: u32) -> Self {
        Self {
            wood,
            leaf,
            flower,
            fruit,
        }
    }

    /// Starting reserve for a seat: one of each type up to the seat index
    pub fn starting(seat_index: usize) -> Self {
        let mut hand = Self::new();
        for tile in TileType::ALL.iter().take(seat_index + 1) {
            hand.add(*tile, 1);
        }
        hand
    }

    /// Total number of tiles
    pub fn total(&self) -> u32 {
        self.wood + self.leaf + self.flower + self.fruit
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific tile type
    pub fn get(&self, tile: TileType) -> u32 {
        match tile {
            TileType::Wood => self.wood,
            TileType::Leaf => self.leaf,
            TileType::Flower => self.flower,
            TileType::Fruit => self.fruit,
        }
    }

    fn slot(&mut self, tile: TileType) -> &mut u32 {
        match tile {
            TileType::Wood => &mut self.wood,
            TileType::Leaf => &mut self.leaf,
            TileType::Flower => &mut self.flower,
            TileType::Fruit => &mut self.fruit,
        }
    }

    /// Add tiles to the hand
    pub fn add(&mut self, tile: TileType, amount: u32) {
        *self.slot(tile) += amount;
    }

    /// Add every tile in a list
    pub fn add_all(&mut self, tiles: &[TileType]) {
        for tile in tiles {
            self.add(*tile, 1);
        }
    }

    /// Take one tile out, returning false if there is none
    pub fn try_take(&mut self, tile: TileType) -> bool {
        let count = self.slot(tile);
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }
}

/// Tiles that may still be placed this turn, per type plus a shared wild pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementBudget {
    pub wood: u32,
    pub leaf: u32,
    pub flower: u32,
    pub fruit: u32,
    pub wild: u32,
}

impl PlacementBudget {
    /// The allowance printed on every player's mat
    pub fn seishi() -> Self {
        Self {
            wood: 1,
            leaf: 1,
            flower: 0,
            fruit: 0,
            wild: 1,
        }
    }

    /// An allowance covering exactly these resource slots
    pub fn from_resources(resources: &[Resource]) -> Self {
        let mut budget = Self::default();
        for resource in resources {
            budget.increment(*resource);
        }
        budget
    }

    /// Raise the allowance for one slot
    pub fn increment(&mut self, resource: Resource) {
        match resource {
            Resource::Wood => self.wood += 1,
            Resource::Leaf => self.leaf += 1,
            Resource::Flower => self.flower += 1,
            Resource::Fruit => self.fruit += 1,
            Resource::Wild => self.wild += 1,
        }
    }

    /// Spend allowance for one tile: its own type first, then a wild.
    /// Returns false when both are exhausted.
    pub fn consume(&mut self, tile: TileType) -> bool {
        let own = match tile {
            TileType::Wood => &mut self.wood,
            TileType::Leaf => &mut self.leaf,
            TileType::Flower => &mut self.flower,
            TileType::Fruit => &mut self.fruit,
        };
        if *own > 0 {
            *own -= 1;
            return true;
        }
        if self.wild > 0 {
            self.wild -= 1;
            return true;
        }
        false
    }

    /// Total tiles this allowance covers
    pub fn total(&self) -> u32 {
        self.wood + self.leaf + self.flower + self.fruit + self.wild
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Host-assigned player id
    pub id: PlayerId,
    /// Seat colour
    pub color: ColorIndex,
    /// Tiles held in reserve
    pub inventory: TileHand,
    /// Most tiles the reserve may hold at the end of a turn
    pub capacity: u32,
    /// Per-turn placement allowance when cultivating
    pub can_play: PlacementBudget,
    pub tree: Tree,
    /// Tool and Growth cards
    pub face_up: Vec<CardId>,
    /// Master, Helper and Parchment cards
    pub face_down: Vec<CardId>,
    pub claimed_goals: BTreeSet<GoalId>,
    pub renounced_goals: BTreeSet<GoalId>,
    /// Pot orientation; cosmetic
    pub pot_flipped: bool,
}

impl Player {
    /// Starting capacity of a player's reserve
    pub const STARTING_CAPACITY: u32 = 5;

    /// Create a player for a seat in turn order
    pub fn new(id: PlayerId, color: ColorIndex, seat_index: usize) -> Self {
        Self {
            id,
            color,
            inventory: TileHand::starting(seat_index),
            capacity: Self::STARTING_CAPACITY,
            can_play: PlacementBudget::seishi(),
            tree: Tree::new(),
            face_up: Vec::new(),
            face_down: Vec::new(),
            claimed_goals: BTreeSet::new(),
            renounced_goals: BTreeSet::new(),
            pot_flipped: false,
        }
    }

    /// Tiles over capacity that must be discarded
    pub fn excess_tiles(&self) -> u32 {
        self.inventory.total().saturating_sub(self.capacity)
    }

    /// Every card held, face up then face down
    pub fn cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.face_up.iter().chain(self.face_down.iter()).copied()
    }

    /// Number of held cards of a family
    pub fn card_count(&self, card_type: CardType) -> usize {
        let catalog = catalog();
        self.cards()
            .filter(|id| catalog.card_type(*id) == Some(card_type))
            .count()
    }

    /// Whether the player already holds a goal
    pub fn has_claimed(&self, goal: GoalId) -> bool {
        self.claimed_goals.contains(&goal)
    }

    pub fn has_renounced(&self, goal: GoalId) -> bool {
        self.renounced_goals.contains(&goal)
    }
}
