//! Core game state machine.
//!
//! This module contains the `GameState` document, game setup and the two
//! turn commands. Commands never mutate the state they are called on: they
//! run against a working copy which is handed back only when every step
//! succeeded.

use crate::actions::{
    ActionOutcome, CultivateAction, GameAction, GameEvent, MeditateAction, ReceiveSource,
};
use crate::cards::{catalog, CardId, CardKind, CardType, GoalId, GoalSize, GoalType};
use crate::hex::{Coord, Direction};
use crate::player::{ColorIndex, PlacementBudget, Player};
use crate::scoring;
use crate::snapshot::CURRENT_VERSION;
use crate::tree::{PlacedTile, PlayerId, TileType};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Number of face-up card slots on the board
pub const BOARD_SLOTS: usize = 4;

/// Largest supported table
pub const MAX_PLAYERS: usize = 4;

/// Number of goal types in play when goal tiles are enabled
const GOAL_TYPES_IN_PLAY: usize = 3;

/// Fewest goal tiles a game with goals enabled can start with
const MIN_GOAL_TILES: usize = 6;

/// Game options chosen by the host at setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    /// Play with goal tiles
    pub goal_tiles: bool,
    /// Bias Parchment cards toward the top half of the deck
    pub tokonoma_variant: bool,
    /// Difficulty of a solo game; carried for the host
    pub solo_difficulty: Option<u8>,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            goal_tiles: true,
            tokonoma_variant: false,
            solo_difficulty: None,
        }
    }
}

/// A player joining a new game, in turn order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSeat {
    pub id: PlayerId,
    pub color: ColorIndex,
}

impl PlayerSeat {
    pub fn new(id: PlayerId, color: ColorIndex) -> Self {
        Self { id, color }
    }
}

/// Errors that can occur when setting up a game or applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Player {player} has no {tile_type:?} tile left")]
    InsufficientInventory {
        player: PlayerId,
        tile_type: TileType,
    },

    #[error("No placement left for a {tile_type:?} tile this turn")]
    Overplay { tile_type: TileType },

    #[error("Expected {expected} tile choices, got {supplied}")]
    InvalidChoiceCount { expected: usize, supplied: usize },

    #[error("Goal {goal} is not available")]
    GoalUnavailable { goal: GoalId },

    #[error("Goal {goal} has already been claimed")]
    GoalAlreadyClaimed { goal: GoalId },

    #[error("Goal {goal} has already been renounced")]
    GoalAlreadyRenounced { goal: GoalId },

    #[error("Card {card} is not on the board")]
    CardUnavailable { card: CardId },

    #[error("Must discard {required} tiles, only {supplied} given")]
    MustDiscardMore { required: u32, supplied: usize },

    #[error("Cannot discard a {tile_type:?} tile that is not held")]
    DiscardUnderflow { tile_type: TileType },

    #[error("No tile at ({x}, {y})")]
    TileNotFound { x: i32, y: i32 },

    #[error("A tile already sits at ({x}, {y})")]
    DuplicateTile { x: i32, y: i32 },

    #[error("Only {found} goal tiles selected, need at least {required}")]
    InsufficientGoals { found: usize, required: usize },
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Schema version of this document
    pub version: u32,
    /// All players, in turn order
    pub players: Vec<Player>,
    /// Face-up card offer; slot 0 is the cheapest
    pub board: [Option<CardId>; BOARD_SLOTS],
    /// Undealt cards, top first
    pub draw_pile: VecDeque<CardId>,
    /// Goal tiles nobody has claimed yet
    pub available_goals: Vec<GoalId>,
    /// Index into `players` of the player to act
    pub turn_pointer: usize,
    /// Turns left once the draw pile has run out
    pub final_turns_remaining: Option<u32>,
    pub options: GameOptions,
}

impl GameState {
    /// Create a new game with a randomly shuffled deck
    pub fn new(seats: &[PlayerSeat], options: GameOptions) -> Result<Self, GameError> {
        Self::new_with_rng(seats, options, &mut rand::thread_rng())
    }

    /// Create a new game using the given random source, for reproducible setups
    pub fn new_with_rng<R: Rng + ?Sized>(
        seats: &[PlayerSeat],
        options: GameOptions,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if seats.is_empty() || seats.len() > MAX_PLAYERS {
            return Err(GameError::Validation(format!(
                "A game needs 1 to {} players, got {}",
                MAX_PLAYERS,
                seats.len()
            )));
        }
        let unique: BTreeSet<PlayerId> = seats.iter().map(|s| s.id).collect();
        if unique.len() != seats.len() {
            return Err(GameError::Validation("Player ids must be unique".into()));
        }

        let player_count = seats.len();
        let available_goals = if options.goal_tiles {
            select_goals(player_count, rng)?
        } else {
            Vec::new()
        };

        let mut draw_pile: VecDeque<CardId> =
            build_deck(player_count, options.tokonoma_variant, rng).into();
        let mut board = [None; BOARD_SLOTS];
        for slot in board.iter_mut() {
            *slot = draw_pile.pop_front();
        }

        let players = seats
            .iter()
            .enumerate()
            .map(|(i, seat)| Player::new(seat.id, seat.color, i))
            .collect();

        debug!(
            players = player_count,
            goals = available_goals.len(),
            deck = draw_pile.len(),
            "new game"
        );

        Ok(Self {
            version: CURRENT_VERSION,
            players,
            board,
            draw_pile,
            available_goals,
            turn_pointer: 0,
            final_turns_remaining: None,
            options,
        })
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by id
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The player whose turn it is
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn_pointer)
    }

    /// Whether the final countdown has run out
    pub fn is_game_over(&self) -> bool {
        self.final_turns_remaining == Some(0)
    }

    /// Whether the end-game countdown has started
    pub fn is_last_round(&self) -> bool {
        self.final_turns_remaining.is_some()
    }

    /// Apply a command for the player at the turn pointer.
    ///
    /// `self` is left untouched; on success the outcome carries the new state.
    pub fn apply_action(&self, action: GameAction) -> Result<ActionOutcome, GameError> {
        if self.is_game_over() {
            return Err(GameError::Validation("Game is over".into()));
        }
        let acting = self.acting_index()?;
        let countdown_running = self.is_last_round();

        let mut working = self.clone();
        let mut events = Vec::new();

        match action {
            GameAction::Cultivate(action) => working.cultivate_turn(acting, action, &mut events)?,
            GameAction::Meditate(action) => working.meditate_turn(acting, action, &mut events)?,
        }

        let next_player_score = working.end_turn(acting, countdown_running, &mut events);

        Ok(ActionOutcome {
            state: working,
            events,
            next_player_score,
        })
    }

    /// Tiles from `tiles` that would not be legal moves when placed in order
    /// into a player's tree as it stands.
    ///
    /// Placement itself does not enforce legality; this lets a host check a
    /// command up front or review one after the fact.
    pub fn audit_placements(
        &self,
        player: PlayerId,
        tiles: &[PlacedTile],
    ) -> Result<Vec<PlacedTile>, GameError> {
        let player = self
            .player(player)
            .ok_or_else(|| GameError::Validation(format!("Unknown player {}", player)))?;

        let mut tree = player.tree.clone();
        let mut illegal = Vec::new();
        for tile in tiles {
            if !tree.is_legal_placement(tile) {
                illegal.push(*tile);
            }
            tree.place(*tile)?;
        }
        Ok(illegal)
    }

    fn acting_index(&self) -> Result<usize, GameError> {
        if self.turn_pointer < self.players.len() {
            Ok(self.turn_pointer)
        } else {
            Err(GameError::Validation(format!(
                "Turn pointer {} is out of range",
                self.turn_pointer
            )))
        }
    }

    // ==================== Turn commands ====================

    fn cultivate_turn(
        &mut self,
        acting: usize,
        action: CultivateAction,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        if action.flip_pot {
            self.flip_pot(acting, events);
        }
        if let Some(cell) = action.remove_tile {
            self.remove_tile(acting, cell, events)?;
        }

        let mut budget = self.players[acting].can_play;
        self.place_tiles(acting, &action.place_tiles, &mut budget, events)?;
        self.renounce_goals(acting, &action.renounce_goals, events)?;
        self.claim_goals(acting, &action.claim_goals, events)?;

        // Placing only drains the reserve, so this holds unless the state
        // came in over capacity.
        let required = self.players[acting].excess_tiles();
        if required > 0 {
            return Err(GameError::MustDiscardMore {
                required,
                supplied: 0,
            });
        }
        Ok(())
    }

    fn meditate_turn(
        &mut self,
        acting: usize,
        action: MeditateAction,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        if action.flip_pot {
            self.flip_pot(acting, events);
        }
        if let Some(cell) = action.remove_tile {
            self.remove_tile(acting, cell, events)?;
        }

        let slot = self
            .board
            .iter()
            .position(|c| *c == Some(action.draw_card))
            .ok_or(GameError::CardUnavailable {
                card: action.draw_card,
            })?;
        let budget = self.take_card(acting, slot, &action.master_choices, events)?;
        self.grant_slot_bonus(acting, slot, action.wood_or_leaf, events)?;

        let mut budget = budget.unwrap_or_default();
        self.place_tiles(acting, &action.place_tiles, &mut budget, events)?;
        self.renounce_goals(acting, &action.renounce_goals, events)?;
        self.claim_goals(acting, &action.claim_goals, events)?;
        self.discard_tiles(acting, &action.discard_tiles, events)?;

        self.shift_board(slot, events);
        Ok(())
    }

    // ==================== Steps ====================

    fn flip_pot(&mut self, acting: usize, events: &mut Vec<GameEvent>) {
        let player = &mut self.players[acting];
        player.pot_flipped = !player.pot_flipped;
        events.push(GameEvent::PotFlipped {
            player: player.id,
            flipped: player.pot_flipped,
        });
    }

    fn remove_tile(
        &mut self,
        acting: usize,
        cell: Coord,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        if !cell.is_on_grid() {
            return Err(GameError::Validation(format!("{} is off the grid", cell)));
        }
        let player = &mut self.players[acting];
        let tile = player.tree.remove(&cell)?;
        debug!(player = player.id, %cell, "tile removed");
        events.push(GameEvent::TileRemoved {
            player: player.id,
            tile,
        });
        Ok(())
    }

    fn place_tiles(
        &mut self,
        acting: usize,
        tiles: &[PlacedTile],
        budget: &mut PlacementBudget,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        if tiles.is_empty() {
            return Ok(());
        }
        let player = &mut self.players[acting];

        for tile in tiles {
            let cell = tile.coord();
            if Direction::from_index(tile.rotation).is_none() {
                return Err(GameError::Validation(format!(
                    "Rotation {} at {} is out of range",
                    tile.rotation, cell
                )));
            }
            if !cell.is_on_grid() {
                return Err(GameError::Validation(format!("{} is off the grid", cell)));
            }
            if cell.is_pot() {
                return Err(GameError::Validation(format!("{} is part of the pot", cell)));
            }
            if !player.inventory.try_take(tile.tile_type) {
                return Err(GameError::InsufficientInventory {
                    player: player.id,
                    tile_type: tile.tile_type,
                });
            }
            if !budget.consume(tile.tile_type) {
                return Err(GameError::Overplay {
                    tile_type: tile.tile_type,
                });
            }
            if !player.tree.is_legal_placement(tile) {
                warn!(
                    player = player.id,
                    tile_type = ?tile.tile_type,
                    %cell,
                    "tile placed where it is not a legal move"
                );
            }
            player.tree.place(*tile)?;
        }

        let score = player.tree.score();
        debug!(player = player.id, count = tiles.len(), score, "tiles placed");
        events.push(GameEvent::TilesAdded {
            player: player.id,
            tiles: tiles.to_vec(),
            score,
        });
        Ok(())
    }

    fn renounce_goals(
        &mut self,
        acting: usize,
        goals: &[GoalId],
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        for &goal in goals {
            let player = &self.players[acting];
            if player.has_claimed(goal) {
                return Err(GameError::GoalAlreadyClaimed { goal });
            }
            if player.has_renounced(goal) {
                return Err(GameError::GoalAlreadyRenounced { goal });
            }
            if !self.available_goals.contains(&goal) {
                return Err(GameError::GoalUnavailable { goal });
            }

            let player = &mut self.players[acting];
            player.renounced_goals.insert(goal);
            events.push(GameEvent::GoalRenounced {
                player: player.id,
                goal,
            });
        }
        Ok(())
    }

    /// Claims are not checked against the tree or against other goals of the
    /// same colour; removing the goal from the pool keeps it exclusive.
    fn claim_goals(
        &mut self,
        acting: usize,
        goals: &[GoalId],
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        for &goal in goals {
            if self.players.iter().any(|p| p.has_claimed(goal)) {
                return Err(GameError::GoalAlreadyClaimed { goal });
            }
            if !self.available_goals.contains(&goal) {
                return Err(GameError::GoalUnavailable { goal });
            }
            if self.players[acting].has_renounced(goal) {
                return Err(GameError::GoalAlreadyRenounced { goal });
            }

            self.available_goals.retain(|g| *g != goal);
            let player = &mut self.players[acting];
            player.claimed_goals.insert(goal);
            debug!(player = player.id, goal, "goal claimed");
            events.push(GameEvent::GoalClaimed {
                player: player.id,
                goal,
            });
        }
        Ok(())
    }

    /// Move the card in `slot` to the player and apply its effect.
    /// Returns the placement allowance granted by a Helper card.
    fn take_card(
        &mut self,
        acting: usize,
        slot: usize,
        master_choices: &[TileType],
        events: &mut Vec<GameEvent>,
    ) -> Result<Option<PlacementBudget>, GameError> {
        let card_id = self.board[slot].ok_or_else(|| {
            GameError::Validation(format!("Board slot {} is empty", slot))
        })?;
        let card = catalog()
            .card(card_id)
            .ok_or(GameError::CardUnavailable { card: card_id })?;

        if !matches!(card.kind, CardKind::Master { .. }) && !master_choices.is_empty() {
            return Err(GameError::InvalidChoiceCount {
                expected: 0,
                supplied: master_choices.len(),
            });
        }

        let player = &mut self.players[acting];
        events.push(GameEvent::CardTaken {
            player: player.id,
            card: card_id,
            slot,
        });
        debug!(player = player.id, card = card_id, slot, kind = ?card.card_type(), "card taken");

        let mut helper_budget = None;
        match &card.kind {
            CardKind::Tool { capacity_bonus } => {
                player.face_up.push(card_id);
                player.capacity += *capacity_bonus;
                events.push(GameEvent::CapacityIncreased {
                    player: player.id,
                    capacity: player.capacity,
                });
            }
            CardKind::Growth { tile } => {
                player.face_up.push(card_id);
                player.can_play.increment((*tile).into());
            }
            CardKind::Master { resources } => {
                let wilds = resources.iter().filter(|r| r.is_wild()).count();
                if master_choices.len() != wilds {
                    return Err(GameError::InvalidChoiceCount {
                        expected: wilds,
                        supplied: master_choices.len(),
                    });
                }

                let mut choices = master_choices.iter().copied();
                let tiles: Vec<TileType> = resources
                    .iter()
                    .filter_map(|r| r.tile().or_else(|| choices.next()))
                    .collect();

                player.face_down.push(card_id);
                player.inventory.add_all(&tiles);
                events.push(GameEvent::TilesReceived {
                    player: player.id,
                    tiles,
                    source: ReceiveSource::MasterCard(card_id),
                });
            }
            CardKind::Helper { resources } => {
                player.face_down.push(card_id);
                helper_budget = Some(PlacementBudget::from_resources(resources));
            }
            CardKind::Parchment { .. } => {
                player.face_down.push(card_id);
            }
        }

        Ok(helper_budget)
    }

    fn grant_slot_bonus(
        &mut self,
        acting: usize,
        slot: usize,
        wood_or_leaf: Option<TileType>,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        let tiles = match slot {
            0 => return Ok(()),
            1 => match wood_or_leaf {
                Some(choice @ (TileType::Wood | TileType::Leaf)) => vec![choice],
                other => {
                    return Err(GameError::Validation(format!(
                        "Slot 1 grants Wood or Leaf, got {:?}",
                        other
                    )))
                }
            },
            2 => vec![TileType::Wood, TileType::Flower],
            _ => vec![TileType::Leaf, TileType::Fruit],
        };

        let player = &mut self.players[acting];
        player.inventory.add_all(&tiles);
        events.push(GameEvent::TilesReceived {
            player: player.id,
            tiles,
            source: ReceiveSource::BoardSlot(slot),
        });
        Ok(())
    }

    fn discard_tiles(
        &mut self,
        acting: usize,
        discards: &[TileType],
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        let player = &mut self.players[acting];
        let required = player.excess_tiles();
        if (discards.len() as u32) < required {
            return Err(GameError::MustDiscardMore {
                required,
                supplied: discards.len(),
            });
        }
        if discards.is_empty() {
            return Ok(());
        }

        for &tile_type in discards {
            if !player.inventory.try_take(tile_type) {
                return Err(GameError::DiscardUnderflow { tile_type });
            }
        }
        events.push(GameEvent::TilesDiscarded {
            player: player.id,
            tiles: discards.to_vec(),
        });
        Ok(())
    }

    /// Close the gap left at `slot`, deal into the last slot and start the
    /// countdown the first time the pile runs dry.
    fn shift_board(&mut self, slot: usize, events: &mut Vec<GameEvent>) {
        for i in slot..BOARD_SLOTS - 1 {
            self.board[i] = self.board[i + 1];
        }
        let revealed = self.draw_pile.pop_front();
        self.board[BOARD_SLOTS - 1] = revealed;
        events.push(GameEvent::CardRevealed {
            slot: BOARD_SLOTS - 1,
            card: revealed,
        });

        if self.draw_pile.is_empty() && self.final_turns_remaining.is_none() {
            let final_turns = self.players.len() as u32;
            self.final_turns_remaining = Some(final_turns);
            info!(final_turns, "draw pile exhausted, last round begins");
            events.push(GameEvent::LastRound { final_turns });
        }
    }

    /// Finish the acting player's turn and return their total score.
    ///
    /// Only turns that began after the pile ran out count down.
    fn end_turn(
        &mut self,
        acting: usize,
        countdown_running: bool,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        // Solo games lose the cheapest card every turn
        if self.players.len() == 1 {
            if let Some(card) = self.board[0] {
                events.push(GameEvent::CardDiscarded { card, slot: 0 });
                self.shift_board(0, events);
            }
        }

        let score = scoring::score_player(self, &self.players[acting]).total;

        if countdown_running {
            let remaining = self.final_turns_remaining.unwrap_or(0).saturating_sub(1);
            self.final_turns_remaining = Some(remaining);
            if remaining == 0 {
                info!("final turn played, game over");
            }
        }

        let player = self.players[acting].id;
        self.turn_pointer = (acting + 1) % self.players.len();
        let next_player = self.players[self.turn_pointer].id;
        events.push(GameEvent::EndTurn {
            player,
            next_player,
            score,
        });

        score
    }
}

/// Cultivate for the player at the turn pointer
pub fn cultivate(state: &GameState, action: CultivateAction) -> Result<ActionOutcome, GameError> {
    state.apply_action(GameAction::Cultivate(action))
}

/// Meditate for the player at the turn pointer
pub fn meditate(state: &GameState, action: MeditateAction) -> Result<ActionOutcome, GameError> {
    state.apply_action(GameAction::Meditate(action))
}

/// Pick three goal colours; each brings its Small and Large tile, plus Medium
/// at tables of three or more.
fn select_goals<R: Rng + ?Sized>(player_count: usize, rng: &mut R) -> Result<Vec<GoalId>, GameError> {
    let catalog = catalog();
    let mut types = GoalType::ALL;
    types.shuffle(rng);

    let mut goals = Vec::new();
    for goal_type in types.iter().take(GOAL_TYPES_IN_PLAY) {
        for size in GoalSize::ALL {
            if size == GoalSize::Medium && player_count <= 2 {
                continue;
            }
            if let Some(goal) = catalog.goal_of(*goal_type, size) {
                goals.push(goal.id);
            }
        }
    }
    goals.sort_unstable();

    if goals.len() < MIN_GOAL_TILES {
        return Err(GameError::InsufficientGoals {
            found: goals.len(),
            required: MIN_GOAL_TILES,
        });
    }
    Ok(goals)
}

/// Shuffled deck for a table, top card first.
///
/// With the tokonoma variant, Parchments are shuffled into the top half only.
fn build_deck<R: Rng + ?Sized>(player_count: usize, tokonoma: bool, rng: &mut R) -> Vec<CardId> {
    let catalog = catalog();
    let mut deck = catalog.deck_for(player_count);

    if !tokonoma {
        deck.shuffle(rng);
        return deck;
    }

    let (parchments, mut rest): (Vec<CardId>, Vec<CardId>) = deck
        .into_iter()
        .partition(|id| catalog.card_type(*id) == Some(CardType::Parchment));
    rest.shuffle(rng);

    let bottom = rest.split_off(rest.len() / 2);
    let mut top = rest;
    top.extend(parchments);
    top.shuffle(rng);
    top.extend(bottom);
    top
}
