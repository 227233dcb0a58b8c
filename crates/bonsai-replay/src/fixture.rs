//! Fixture and report documents for offline replays.

use bonsai_core::{GameAction, GameError, GameEvent, GameState, PlayerId, ScoreBreakdown};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A recorded game: a starting snapshot and the commands applied to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    /// Snapshot in any supported schema version
    pub state: serde_json::Value,
    #[serde(default)]
    pub actions: Vec<FixtureStep>,
}

/// One recorded command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureStep {
    /// Player the host believed was acting; checked against the turn pointer
    #[serde(default)]
    pub player: Option<PlayerId>,
    pub action: GameAction,
}

/// What happened on one applied step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    pub player: PlayerId,
    pub events: Vec<GameEvent>,
    pub score: u32,
    pub progression: u8,
}

/// Everything needed to reproduce a rejected command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub step: usize,
    pub pre_state: GameState,
    pub action: GameAction,
    pub error: GameError,
    /// Human readable error
    pub message: String,
}

impl FailureReport {
    /// A one-step fixture that fails the same way
    pub fn to_fixture(&self) -> Result<Fixture, serde_json::Error> {
        Ok(Fixture {
            state: serde_json::to_value(&self.pre_state)?,
            actions: vec![FixtureStep {
                player: self
                    .pre_state
                    .players
                    .get(self.pre_state.turn_pointer)
                    .map(|p| p.id),
                action: self.action.clone(),
            }],
        })
    }
}

/// Result of replaying a fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    pub steps: Vec<StepRecord>,
    pub scores: BTreeMap<PlayerId, ScoreBreakdown>,
    pub progression: u8,
    pub game_over: bool,
    pub winners: Vec<PlayerId>,
    pub failure: Option<FailureReport>,
}

impl ReplayReport {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}
