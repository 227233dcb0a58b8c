//! Integration tests for the bonsai rules engine.
//!
//! These tests drive complete games through the public entry points and
//! check the invariants that must hold after every turn.

use bonsai_core::*;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

const FLOWER_FIXTURE: &str = include_str!("fixtures/flower_scoring.json");

fn seats(count: usize) -> Vec<PlayerSeat> {
    (0..count)
        .map(|i| PlayerSeat::new(100 + i as PlayerId, i as ColorIndex))
        .collect()
}

fn seeded_game(players: usize, seed: u64) -> GameState {
    let mut rng = StdRng::seed_from_u64(seed);
    GameState::new_with_rng(&seats(players), GameOptions::default(), &mut rng).unwrap()
}

/// Check everything that must hold between turns
fn assert_invariants(state: &GameState) {
    for player in &state.players {
        assert!(
            player.inventory.total() <= player.capacity,
            "player {} holds {} tiles over capacity {}",
            player.id,
            player.inventory.total(),
            player.capacity
        );
        assert!(player.tree.has_bud(), "player {} lost the bud", player.id);
    }

    let mut claimed = BTreeSet::new();
    for goal in state.players.iter().flat_map(|p| p.claimed_goals.iter()) {
        assert!(claimed.insert(*goal), "goal {} claimed twice", goal);
        assert!(!state.available_goals.contains(goal));
    }

    let json = snapshot::to_json(state).unwrap();
    assert_eq!(&snapshot::from_json(&json).unwrap(), state);
}

/// Play a whole game with zombies in every seat, returning every state seen
fn play_out(initial: GameState, seed: u64) -> Vec<GameState> {
    let mut zombies: Vec<Zombie> = initial
        .players
        .iter()
        .enumerate()
        .map(|(i, p)| Zombie::with_seed(p.id, seed + i as u64))
        .collect();

    let mut states = vec![initial];
    for _ in 0..200 {
        let state = states.last().unwrap();
        if state.is_game_over() {
            break;
        }
        let pointer = state.turn_pointer;
        let outcome = zombies[pointer]
            .play_turn(state)
            .expect("zombie should act on its turn")
            .expect("zombie command should apply");
        states.push(outcome.state);
    }
    states
}

// ==================== Setup ====================

#[test]
fn test_two_player_goals_have_no_medium() {
    for seed in 0..10 {
        let state = seeded_game(2, seed);
        assert_eq!(state.available_goals.len(), 6);

        let types: BTreeSet<GoalType> = state
            .available_goals
            .iter()
            .map(|id| catalog().goal(*id).unwrap().goal_type)
            .collect();
        assert_eq!(types.len(), 3);
        for id in &state.available_goals {
            assert_ne!(catalog().goal(*id).unwrap().size, GoalSize::Medium);
        }
    }
}

#[test]
fn test_three_player_goals() {
    let state = seeded_game(3, 4);
    assert_eq!(state.available_goals.len(), 9);
}

#[test]
fn test_setup_is_deterministic_per_seed() {
    assert_eq!(seeded_game(4, 99), seeded_game(4, 99));
    assert_ne!(seeded_game(4, 99).draw_pile, seeded_game(4, 100).draw_pile);
}

#[test]
fn test_deck_matches_table_size() {
    for players in 1..=4 {
        let state = seeded_game(players, 1);
        let mut dealt: Vec<CardId> = state.draw_pile.iter().copied().collect();
        dealt.extend(state.board.iter().flatten());
        dealt.sort_unstable();
        assert_eq!(dealt, catalog().deck_for(players));
    }
}

// ==================== Commands ====================

#[test]
fn test_cultivate_leaf_next_to_bud() {
    let state = seeded_game(2, 8);

    // First player passes; the second starts with a leaf
    let outcome = cultivate(&state, CultivateAction::default()).unwrap();
    let state = outcome.state;
    let before = state.players[1].clone();

    let leaf = PlacedTile::new(TileType::Leaf, 0, 1, 0);
    let outcome = cultivate(
        &state,
        CultivateAction {
            place_tiles: vec![leaf],
            ..Default::default()
        },
    )
    .unwrap();
    let after = &outcome.state.players[1];

    assert_eq!(after.tree.get(&Coord::new(0, 1)), Some(&leaf));
    assert_eq!(after.inventory.leaf, before.inventory.leaf - 1);
    assert_eq!(after.tree.leaf_score(), before.tree.leaf_score() + 3);
    assert!(outcome.events.contains(&GameEvent::TilesAdded {
        player: 101,
        tiles: vec![leaf],
        score: 3,
    }));
}

#[test]
fn test_flower_scores_from_fixture() {
    let state = snapshot::from_json(FLOWER_FIXTURE).unwrap();
    let scores = get_scores(&state);

    assert_eq!(scores[&101].flower, 16);
    assert_eq!(scores[&202].flower, 13);
    assert_eq!(scores[&101].leaf, 6);
    assert_eq!(scores[&101].goals, Some(0));
}

#[test]
fn test_fixture_trees_were_grown_legally() {
    let state = snapshot::from_json(FLOWER_FIXTURE).unwrap();
    let mut bare = state.clone();
    for player in &mut bare.players {
        player.tree = Tree::new();
    }

    for player in &state.players {
        let mut tiles: Vec<PlacedTile> = player
            .tree
            .tiles()
            .filter(|t| t.coord() != Coord::ORIGIN)
            .copied()
            .collect();
        // Grow outward from the bud: wood, then leaves, then flowers
        tiles.sort_by_key(|t| (t.tile_type, t.y));

        let illegal = bare.audit_placements(player.id, &tiles).unwrap();
        assert!(illegal.is_empty(), "illegal tiles: {:?}", illegal);
    }
}

#[test]
fn test_meditate_slot_one_grants_chosen_tile() {
    let mut state = snapshot::from_json(FLOWER_FIXTURE).unwrap();
    // Leaf parchment in slot 1 so no other tiles are granted
    state.draw_pile.retain(|c| *c != 29);
    state.board[1] = Some(29);
    let before = state.players[0].inventory;

    let outcome = meditate(
        &state,
        MeditateAction {
            wood_or_leaf: Some(TileType::Leaf),
            ..MeditateAction::draw(29)
        },
    )
    .unwrap();
    let after = outcome.state.players[0].inventory;

    assert_eq!(after.leaf, before.leaf + 1);
    assert_eq!(after.wood, before.wood);
    assert_eq!(outcome.state.board[0], state.board[0]);
    assert_eq!(outcome.state.board[1], state.board[2]);
    assert_eq!(outcome.state.board[2], state.board[3]);
    assert_eq!(outcome.state.board[3], state.draw_pile.front().copied());
}

#[test]
fn test_short_discard_changes_nothing() {
    let mut state = snapshot::from_json(FLOWER_FIXTURE).unwrap();
    state.players[0].inventory = TileHand::with_amounts(2, 1, 1, 1);
    let before = state.clone();

    // Slot 3 adds a leaf and a fruit: 7 tiles against capacity 5
    let err = meditate(
        &state,
        MeditateAction {
            discard_tiles: vec![TileType::Wood],
            ..MeditateAction::draw(28)
        },
    )
    .unwrap_err();

    assert_eq!(
        err,
        GameError::MustDiscardMore {
            required: 2,
            supplied: 1
        }
    );
    assert_eq!(state, before);
}

#[test]
fn test_failed_meditate_is_atomic() {
    let state = snapshot::from_json(FLOWER_FIXTURE).unwrap();
    let before = snapshot::to_json(&state).unwrap();

    // Everything up to the claim succeeds on the working copy first
    let action = MeditateAction {
        flip_pot: true,
        wood_or_leaf: Some(TileType::Wood),
        master_choices: vec![TileType::Fruit],
        claim_goals: vec![1, 2],
        ..MeditateAction::draw(12)
    };
    let err = meditate(&state, action).unwrap_err();

    assert_eq!(err, GameError::GoalUnavailable { goal: 2 });
    assert_eq!(snapshot::to_json(&state).unwrap(), before);
}

#[test]
fn test_goal_claims_are_exclusive() {
    let state = snapshot::from_json(FLOWER_FIXTURE).unwrap();
    let claim = |goals: Vec<GoalId>| CultivateAction {
        claim_goals: goals,
        ..Default::default()
    };

    let outcome = cultivate(&state, claim(vec![7])).unwrap();
    let err = cultivate(&outcome.state, claim(vec![7])).unwrap_err();
    assert_eq!(err, GameError::GoalAlreadyClaimed { goal: 7 });

    let outcome = cultivate(&outcome.state, claim(vec![9])).unwrap();
    assert_invariants(&outcome.state);
    assert_eq!(outcome.state.available_goals, vec![1, 3, 13, 15]);
}

// ==================== Whole games ====================

#[test]
fn test_zombie_games_finish_and_hold_invariants() {
    for players in 1..=4 {
        let states = play_out(seeded_game(players, 40 + players as u64), 7);
        let last = states.last().unwrap();
        assert!(last.is_game_over(), "{} player game did not finish", players);
        assert_eq!(get_game_progression(last), 100);
        assert!(!winners(last).is_empty());

        let mut progress = 0;
        for state in &states {
            assert_invariants(state);
            let now = get_game_progression(state);
            assert!(now >= progress, "progression went from {} to {}", progress, now);
            progress = now;
        }
    }
}

#[test]
fn test_replay_is_deterministic() {
    let initial = seeded_game(3, 12);
    let mut zombies: Vec<Zombie> = initial
        .players
        .iter()
        .map(|p| Zombie::with_seed(p.id, 3))
        .collect();

    let mut commands = Vec::new();
    let mut state = initial.clone();
    while !state.is_game_over() {
        let action = zombies[state.turn_pointer].choose_action(&state).unwrap();
        state = state.apply_action(action.clone()).unwrap().state;
        commands.push(action);
    }

    let replay = |start: &GameState| {
        let mut state = start.clone();
        let mut events = Vec::new();
        for command in &commands {
            let outcome = state.apply_action(command.clone()).unwrap();
            events.extend(outcome.events);
            state = outcome.state;
        }
        (snapshot::to_json(&state).unwrap(), serde_json::to_string(&events).unwrap())
    };

    let first = replay(&initial);
    let second = replay(&snapshot::from_json(&snapshot::to_json(&initial).unwrap()).unwrap());
    assert_eq!(first, second);
}

#[test]
fn test_parchment_counts_once_game_is_over() {
    let mut state = snapshot::from_json(FLOWER_FIXTURE).unwrap();
    // Flower parchment: 1 point per flower
    state.players[0].face_down.push(30);
    assert_eq!(get_scores(&state)[&101].parchment, 0);

    state.draw_pile.clear();
    state.final_turns_remaining = Some(1);
    let outcome = cultivate(&state, CultivateAction::default()).unwrap();
    assert!(outcome.state.is_game_over());
    assert_eq!(get_scores(&outcome.state)[&101].parchment, 4);

    let view = get_player_view(&outcome.state, 202);
    assert_eq!(view.players[0].face_down, FaceDownView::Revealed(vec![30]));
}
