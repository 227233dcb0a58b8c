//! Score calculation and game progression.
//!
//! Everything here is a pure function of a `GameState`; nothing is cached
//! in the state itself.

use crate::cards::{catalog, CardKind, GoalSize, GoalTile, GoalType, ParchmentTarget};
use crate::game::{GameState, BOARD_SLOTS};
use crate::hex::Coord;
use crate::player::Player;
use crate::tree::{PlayerId, TileType, Tree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Progression reached when the draw pile runs out
const PILE_SHARE: u32 = 80;

/// A player's score by category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub leaf: u32,
    pub flower: u32,
    pub fruit: u32,
    /// `None` when the game is played without goal tiles
    pub goals: Option<u32>,
    /// Always 0 until the game is over
    pub parchment: u32,
    pub total: u32,
}

/// Score one player against the state they belong to
pub fn score_player(state: &GameState, player: &Player) -> ScoreBreakdown {
    let tree = &player.tree;
    let leaf = tree.leaf_score();
    let flower = tree.flower_score();
    let fruit = tree.fruit_score();
    let goals = state.options.goal_tiles.then(|| goal_score(player));
    let parchment = if state.is_game_over() {
        parchment_score(player)
    } else {
        0
    };

    ScoreBreakdown {
        leaf,
        flower,
        fruit,
        goals,
        parchment,
        total: leaf + flower + fruit + goals.unwrap_or(0) + parchment,
    }
}

/// Scores for every player, keyed by player id
pub fn get_scores(state: &GameState) -> BTreeMap<PlayerId, ScoreBreakdown> {
    state
        .players
        .iter()
        .map(|p| (p.id, score_player(state, p)))
        .collect()
}

/// Points from claimed goals whose requirement the tree currently meets
fn goal_score(player: &Player) -> u32 {
    let catalog = catalog();
    player
        .claimed_goals
        .iter()
        .filter_map(|id| catalog.goal(*id))
        .filter(|goal| goal_achieved(&player.tree, goal))
        .map(|goal| goal.points)
        .sum()
}

fn parchment_score(player: &Player) -> u32 {
    let catalog = catalog();
    player
        .face_down
        .iter()
        .filter_map(|id| catalog.card(*id))
        .map(|card| match card.kind {
            CardKind::Parchment {
                points,
                target: ParchmentTarget::Tiles(tile),
            } => points * player.tree.count(tile) as u32,
            CardKind::Parchment {
                points,
                target: ParchmentTarget::Cards(card_type),
            } => points * player.card_count(card_type) as u32,
            _ => 0,
        })
        .sum()
}

/// The quantity a goal's requirement is compared against
pub fn goal_metric(tree: &Tree, goal: &GoalTile) -> u32 {
    match goal.goal_type {
        GoalType::Wood => tree.count(TileType::Wood) as u32,
        GoalType::Leaf => tree.largest_cluster(TileType::Leaf) as u32,
        GoalType::Fruit => tree.count(TileType::Fruit) as u32,
        GoalType::Flower => {
            let flowers = || tree.tiles().filter(|t| t.tile_type == TileType::Flower);
            let left = flowers().filter(|t| t.coord().protrudes_left()).count();
            let right = flowers().filter(|t| t.coord().protrudes_right()).count();
            left.max(right) as u32
        }
        GoalType::Placement => u32::from(placement_reached(tree, goal.size)),
    }
}

/// Placement tiers: Small reaches past either side of the pot, Medium past
/// both, Large past one side above the rim and the other side below it.
fn placement_reached(tree: &Tree, size: GoalSize) -> bool {
    let cells: Vec<_> = tree.tiles().map(|t| t.coord()).collect();
    let any = |check: fn(&Coord) -> bool| cells.iter().any(check);

    let left = any(|c| c.protrudes_left());
    let right = any(|c| c.protrudes_right());
    match size {
        GoalSize::Small => left || right,
        GoalSize::Medium => left && right,
        GoalSize::Large => {
            let left_below = any(|c| c.protrudes_left() && c.is_below_pot());
            let left_above = any(|c| c.protrudes_left() && c.is_above_pot());
            let right_below = any(|c| c.protrudes_right() && c.is_below_pot());
            let right_above = any(|c| c.protrudes_right() && c.is_above_pot());
            (left_below && right_above) || (right_below && left_above)
        }
    }
}

/// Whether the tree meets a goal's requirement
pub fn goal_achieved(tree: &Tree, goal: &GoalTile) -> bool {
    goal_metric(tree, goal) >= goal.requirement
}

/// Rough completion estimate from 0 to 100 for progress displays.
///
/// The draw pile accounts for the first 80; the final round for the rest.
/// Reaches 100 exactly when the game is over and never goes down.
pub fn get_game_progression(state: &GameState) -> u8 {
    let player_count = state.players.len().max(1) as u32;

    let progress = match state.final_turns_remaining {
        Some(remaining) => {
            let played = player_count - remaining.min(player_count);
            PILE_SHARE + (100 - PILE_SHARE) * played / player_count
        }
        None => {
            let initial = catalog()
                .deck_for(state.players.len())
                .len()
                .saturating_sub(BOARD_SLOTS)
                .max(state.draw_pile.len());
            if initial == 0 {
                return 0;
            }
            let drawn = (initial - state.draw_pile.len()) as u32;
            PILE_SHARE * drawn / initial as u32
        }
    };

    progress.min(100) as u8
}

/// Players with the highest total once the game is over. Ties are all
/// returned; empty while the game is running.
pub fn winners(state: &GameState) -> Vec<PlayerId> {
    if !state.is_game_over() {
        return Vec::new();
    }

    let scores = get_scores(state);
    let best = scores.values().map(|s| s.total).max().unwrap_or(0);
    state
        .players
        .iter()
        .filter(|p| scores.get(&p.id).map(|s| s.total) == Some(best))
        .map(|p| p.id)
        .collect()
}
