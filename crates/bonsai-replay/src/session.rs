//! A game being replayed one recorded command at a time.

use bonsai_core::snapshot::{self, SnapshotError};
use bonsai_core::{get_game_progression, GameError, GameState, PlayerId};
use thiserror::Error;

use crate::fixture::{FailureReport, FixtureStep, StepRecord};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Could not load snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Step {step}: recorded for player {recorded}, but it is player {current}'s turn")]
    NotYourTurn {
        step: usize,
        recorded: PlayerId,
        current: PlayerId,
    },

    #[error("Step {step}: the turn pointer names no player")]
    NoCurrentPlayer { step: usize },

    #[error("Step {step} rejected: {error}")]
    Rejected { step: usize, error: GameError },
}

/// Replays commands against a state, keeping the last good state.
pub struct ReplaySession {
    state: GameState,
    history: Vec<StepRecord>,
}

impl ReplaySession {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            history: Vec::new(),
        }
    }

    /// Start from a snapshot document in any supported version
    pub fn from_snapshot(document: serde_json::Value) -> Result<Self, SessionError> {
        Ok(Self::new(snapshot::from_value(document)?))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_parts(self) -> (GameState, Vec<StepRecord>) {
        (self.state, self.history)
    }

    /// Number of steps applied so far
    pub fn step_count(&self) -> usize {
        self.history.len()
    }

    /// Apply the next recorded command. On error the session state is unchanged.
    pub fn apply(&mut self, step: &FixtureStep) -> Result<&StepRecord, SessionError> {
        let index = self.history.len();
        let current = self
            .state
            .current_player()
            .map(|p| p.id)
            .ok_or(SessionError::NoCurrentPlayer { step: index })?;

        if let Some(recorded) = step.player {
            if recorded != current {
                return Err(SessionError::NotYourTurn {
                    step: index,
                    recorded,
                    current,
                });
            }
        }

        let outcome = self
            .state
            .apply_action(step.action.clone())
            .map_err(|error| SessionError::Rejected { step: index, error })?;

        self.state = outcome.state;
        self.history.push(StepRecord {
            step: index,
            player: current,
            events: outcome.events,
            score: outcome.next_player_score,
            progression: get_game_progression(&self.state),
        });
        Ok(&self.history[index])
    }

    /// Failure report for a command the engine rejected from the current state
    pub fn failure_report(&self, step: &FixtureStep, error: GameError) -> FailureReport {
        FailureReport {
            step: self.history.len(),
            pre_state: self.state.clone(),
            action: step.action.clone(),
            message: error.to_string(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonsai_core::{
        CultivateAction, GameAction, GameOptions, MeditateAction, PlacedTile, PlayerSeat, TileType,
    };

    fn state() -> GameState {
        let seats = [PlayerSeat::new(1, 0), PlayerSeat::new(2, 1)];
        let mut state = GameState::new(&seats, GameOptions::default()).unwrap();
        state.board = [Some(1), Some(12), Some(22), Some(28)];
        state.draw_pile = vec![2, 4, 6].into();
        state
    }

    fn pass(player: Option<PlayerId>) -> FixtureStep {
        FixtureStep {
            player,
            action: GameAction::Cultivate(CultivateAction::default()),
        }
    }

    #[test]
    fn test_apply_records_history() {
        let mut session = ReplaySession::new(state());

        let record = session.apply(&pass(Some(1))).unwrap();
        assert_eq!(record.step, 0);
        assert_eq!(record.player, 1);

        session
            .apply(&FixtureStep {
                player: None,
                action: GameAction::Meditate(MeditateAction::draw(1)),
            })
            .unwrap();
        assert_eq!(session.step_count(), 2);
        assert_eq!(session.state().players[1].capacity, 7);
    }

    #[test]
    fn test_wrong_player_rejected() {
        let mut session = ReplaySession::new(state());
        let err = session.apply(&pass(Some(2))).unwrap_err();
        assert!(matches!(
            err,
            SessionError::NotYourTurn {
                step: 0,
                recorded: 2,
                current: 1
            }
        ));
        assert_eq!(session.step_count(), 0);
    }

    #[test]
    fn test_rejected_step_keeps_state() {
        let mut session = ReplaySession::new(state());
        let before = session.state().clone();

        let step = FixtureStep {
            player: Some(1),
            action: GameAction::Cultivate(CultivateAction {
                place_tiles: vec![PlacedTile::new(TileType::Fruit, 0, 1, 0)],
                ..Default::default()
            }),
        };
        let err = session.apply(&step).unwrap_err();
        let SessionError::Rejected { error, .. } = err else {
            panic!("expected a rejected step");
        };
        assert_eq!(session.state(), &before);

        let report = session.failure_report(&step, error.clone());
        assert_eq!(report.pre_state, before);
        assert_eq!(report.error, error);

        // The report replays to the same error
        let fixture = report.to_fixture().unwrap();
        let mut replay = ReplaySession::from_snapshot(fixture.state).unwrap();
        let again = replay.apply(&fixture.actions[0]).unwrap_err();
        assert!(matches!(again, SessionError::Rejected { error: e, .. } if e == error));
    }
}
