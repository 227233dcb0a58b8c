//! Auto-play for a player who has left the table.
//!
//! A zombie always meditates on the cheapest card on the board, picks any
//! wild tiles at random and discards just enough to get back under capacity.
//! It goes through the same `apply_action` entry point as everyone else.

use crate::actions::{ActionOutcome, CultivateAction, GameAction, MeditateAction};
use crate::cards::{catalog, CardKind};
use crate::game::{GameError, GameState};
use crate::player::TileHand;
use crate::tree::{PlayerId, TileType};
use rand::prelude::*;

/// Plays turns for one player
pub struct Zombie {
    pub player_id: PlayerId,
    rng: StdRng,
}

impl Zombie {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player_id: PlayerId, seed: u64) -> Self {
        Self {
            player_id,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Build a command for this player, or `None` when it is not their turn
    pub fn choose_action(&mut self, game: &GameState) -> Option<GameAction> {
        if game.is_game_over() {
            return None;
        }
        let player = game.current_player().filter(|p| p.id == self.player_id)?;

        let Some((slot, card_id)) = game
            .board
            .iter()
            .enumerate()
            .find_map(|(slot, card)| card.map(|c| (slot, c)))
        else {
            // Nothing left to take
            return Some(GameAction::Cultivate(CultivateAction::default()));
        };

        let mut action = MeditateAction::draw(card_id);
        let mut inventory = player.inventory;
        let mut capacity = player.capacity;

        match catalog().card(card_id).map(|c| &c.kind) {
            Some(CardKind::Tool { capacity_bonus }) => capacity += capacity_bonus,
            Some(CardKind::Master { resources }) => {
                for resource in resources {
                    let tile = match resource.tile() {
                        Some(tile) => tile,
                        None => {
                            let choice = self.random_tile();
                            action.master_choices.push(choice);
                            choice
                        }
                    };
                    inventory.add(tile, 1);
                }
            }
            _ => {}
        }

        match slot {
            0 => {}
            1 => {
                let choice = *[TileType::Wood, TileType::Leaf]
                    .choose(&mut self.rng)
                    .unwrap_or(&TileType::Leaf);
                action.wood_or_leaf = Some(choice);
                inventory.add(choice, 1);
            }
            2 => inventory.add_all(&[TileType::Wood, TileType::Flower]),
            _ => inventory.add_all(&[TileType::Leaf, TileType::Fruit]),
        }

        action.discard_tiles = zombie_discard(&inventory, capacity);
        Some(GameAction::Meditate(action))
    }

    /// Choose and apply a command in one go
    pub fn play_turn(&mut self, game: &GameState) -> Option<Result<ActionOutcome, GameError>> {
        let action = self.choose_action(game)?;
        Some(game.apply_action(action))
    }

    fn random_tile(&mut self) -> TileType {
        *TileType::ALL
            .choose(&mut self.rng)
            .unwrap_or(&TileType::Wood)
    }
}

/// Tiles to give up to fit `capacity`, always from the largest pile
pub fn zombie_discard(inventory: &TileHand, capacity: u32) -> Vec<TileType> {
    let mut remaining = *inventory;
    let mut discard = Vec::new();

    while remaining.total() > capacity {
        let Some(most) = TileType::ALL
            .iter()
            .copied()
            .max_by_key(|t| remaining.get(*t))
        else {
            break;
        };
        if !remaining.try_take(most) {
            break;
        }
        discard.push(most);
    }

    discard
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameOptions, PlayerSeat};

    fn game() -> GameState {
        let seats = [PlayerSeat::new(1, 0), PlayerSeat::new(2, 1)];
        let mut rng = StdRng::seed_from_u64(17);
        GameState::new_with_rng(&seats, GameOptions::default(), &mut rng).unwrap()
    }

    #[test]
    fn test_zombie_waits_its_turn() {
        let game = game();
        let mut zombie = Zombie::with_seed(2, 1);
        assert!(zombie.choose_action(&game).is_none());
    }

    #[test]
    fn test_zombie_takes_cheapest_card() {
        let game = game();
        let mut zombie = Zombie::new(1);

        let Some(GameAction::Meditate(action)) = zombie.choose_action(&game) else {
            panic!("zombie should meditate");
        };
        assert_eq!(Some(action.draw_card), game.board[0]);
    }

    #[test]
    fn test_zombie_turn_applies() {
        let game = game();
        let mut zombie = Zombie::with_seed(1, 9);
        let outcome = zombie.play_turn(&game).unwrap().unwrap();
        assert_eq!(outcome.state.turn_pointer, 1);
    }

    #[test]
    fn test_zombie_discard_from_largest_pile() {
        let hand = TileHand::with_amounts(1, 4, 2, 0);
        assert_eq!(zombie_discard(&hand, 5), vec![TileType::Leaf, TileType::Leaf]);
        assert!(zombie_discard(&hand, 7).is_empty());
    }
}
