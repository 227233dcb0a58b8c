//! What one player is allowed to see of a game.

use crate::cards::{CardId, GoalId};
use crate::game::{GameOptions, GameState, BOARD_SLOTS};
use crate::player::{ColorIndex, PlacementBudget, Player, TileHand};
use crate::tree::{PlayerId, Tree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Face-down cards as seen by a viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceDownView {
    /// The viewer's own cards, or anyone's once the game is over
    Revealed(Vec<CardId>),
    /// Someone else's cards during play
    Hidden { count: usize },
}

/// A player as seen by a viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub color: ColorIndex,
    pub inventory: TileHand,
    pub capacity: u32,
    pub can_play: PlacementBudget,
    pub tree: Tree,
    pub face_up: Vec<CardId>,
    pub face_down: FaceDownView,
    pub claimed_goals: BTreeSet<GoalId>,
    pub renounced_goals: BTreeSet<GoalId>,
    pub pot_flipped: bool,
}

impl PlayerView {
    fn of(player: &Player, reveal: bool) -> Self {
        let face_down = if reveal {
            FaceDownView::Revealed(player.face_down.clone())
        } else {
            FaceDownView::Hidden {
                count: player.face_down.len(),
            }
        };

        Self {
            id: player.id,
            color: player.color,
            inventory: player.inventory,
            capacity: player.capacity,
            can_play: player.can_play,
            tree: player.tree.clone(),
            face_up: player.face_up.clone(),
            face_down,
            claimed_goals: player.claimed_goals.clone(),
            renounced_goals: player.renounced_goals.clone(),
            pot_flipped: player.pot_flipped,
        }
    }
}

/// A game as seen by one player: the draw pile is reduced to its size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub version: u32,
    pub players: Vec<PlayerView>,
    pub board: [Option<CardId>; BOARD_SLOTS],
    pub draw_pile_count: usize,
    pub available_goals: Vec<GoalId>,
    pub turn_pointer: usize,
    pub final_turns_remaining: Option<u32>,
    pub options: GameOptions,
}

/// Redact a state for `viewer`. Other players' face-down cards are reduced to
/// a count until the game is over. An unknown viewer sees no hidden cards.
pub fn get_player_view(state: &GameState, viewer: PlayerId) -> GameView {
    let game_over = state.is_game_over();
    let players = state
        .players
        .iter()
        .map(|p| PlayerView::of(p, game_over || p.id == viewer))
        .collect();

    GameView {
        version: state.version,
        players,
        board: state.board,
        draw_pile_count: state.draw_pile.len(),
        available_goals: state.available_goals.clone(),
        turn_pointer: state.turn_pointer,
        final_turns_remaining: state.final_turns_remaining,
        options: state.options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::PlayerSeat;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state() -> GameState {
        let seats = [PlayerSeat::new(1, 0), PlayerSeat::new(2, 1)];
        let mut rng = StdRng::seed_from_u64(2);
        let mut state = GameState::new_with_rng(&seats, GameOptions::default(), &mut rng).unwrap();
        state.players[0].face_down = vec![12, 28];
        state.players[1].face_down = vec![22];
        state
    }

    #[test]
    fn test_own_cards_visible_others_hidden() {
        let state = state();
        let view = get_player_view(&state, 1);

        assert_eq!(view.players[0].face_down, FaceDownView::Revealed(vec![12, 28]));
        assert_eq!(view.players[1].face_down, FaceDownView::Hidden { count: 1 });
        assert_eq!(view.draw_pile_count, state.draw_pile.len());
    }

    #[test]
    fn test_everything_revealed_at_game_end() {
        let mut state = state();
        state.final_turns_remaining = Some(0);
        let view = get_player_view(&state, 1);
        assert_eq!(view.players[1].face_down, FaceDownView::Revealed(vec![22]));
    }

    #[test]
    fn test_view_json_has_no_draw_pile() {
        let view = get_player_view(&state(), 2);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("draw_pile").is_none());
        assert_eq!(json["draw_pile_count"], 19);
    }
}
