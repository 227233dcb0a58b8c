//! Fixture loading and the replay loop.

use bonsai_core::{get_game_progression, get_scores, winners};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::fixture::{Fixture, ReplayReport};
use crate::session::{ReplaySession, SessionError};

/// Read a fixture from disk.
pub fn load_fixture(path: &Path) -> anyhow::Result<Fixture> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Replay every step of a fixture, stopping at the first rejected command.
///
/// A rejected command ends up in the report rather than as an error; only a
/// fixture that cannot be replayed at all is an error.
pub fn run(fixture: Fixture) -> Result<ReplayReport, SessionError> {
    let mut session = ReplaySession::from_snapshot(fixture.state)?;
    info!(
        players = session.state().player_count(),
        steps = fixture.actions.len(),
        "Replaying fixture"
    );

    let mut failure = None;
    for step in &fixture.actions {
        match session.apply(step) {
            Ok(record) => {
                debug!(
                    step = record.step,
                    player = record.player,
                    events = record.events.len(),
                    score = record.score,
                    "Step applied"
                );
            }
            Err(SessionError::Rejected { step: index, error }) => {
                warn!("Step {} rejected: {}", index, error);
                failure = Some(session.failure_report(step, error));
                break;
            }
            Err(e) => return Err(e),
        }
    }

    let (state, steps) = session.into_parts();
    let report = ReplayReport {
        steps,
        scores: get_scores(&state),
        progression: get_game_progression(&state),
        game_over: state.is_game_over(),
        winners: winners(&state),
        failure,
    };

    if report.game_over {
        info!("Game over, winners: {:?}", report.winners);
    }
    Ok(report)
}

/// Write a report as pretty JSON to a file, or to stdout when no path is given.
pub fn write_report(report: &ReplayReport, path: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    match path {
        Some(path) => {
            fs::write(path, json)?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::FixtureStep;
    use bonsai_core::{
        CultivateAction, GameAction, GameError, GameOptions, GameState, MeditateAction,
        PlayerSeat, TileType,
    };
    use pretty_assertions::assert_eq;

    fn fixture(actions: Vec<GameAction>) -> Fixture {
        let seats = [PlayerSeat::new(7, 0), PlayerSeat::new(8, 1)];
        let mut state = GameState::new(&seats, GameOptions::default()).unwrap();
        state.board = [Some(1), Some(12), Some(22), Some(28)];
        state.draw_pile = vec![2].into();

        Fixture {
            state: serde_json::to_value(&state).unwrap(),
            actions: actions
                .into_iter()
                .map(|action| FixtureStep {
                    player: None,
                    action,
                })
                .collect(),
        }
    }

    fn pass() -> GameAction {
        GameAction::Cultivate(CultivateAction::default())
    }

    #[test]
    fn test_replay_to_game_over() {
        let fixture = fixture(vec![
            GameAction::Meditate(MeditateAction::draw(1)),
            pass(),
            pass(),
        ]);
        let report = run(fixture).unwrap();

        assert!(report.succeeded());
        assert!(report.game_over);
        assert_eq!(report.progression, 100);
        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.winners, vec![7, 8]);
    }

    #[test]
    fn test_replay_reports_failure() {
        let fixture = fixture(vec![
            pass(),
            GameAction::Meditate(MeditateAction {
                wood_or_leaf: Some(TileType::Fruit),
                master_choices: vec![TileType::Leaf],
                ..MeditateAction::draw(12)
            }),
            pass(),
        ]);
        let report = run(fixture).unwrap();

        let failure = report.failure.expect("second step should fail");
        assert_eq!(failure.step, 1);
        assert_eq!(report.steps.len(), 1);
        assert!(matches!(failure.error, GameError::Validation(_)));
        assert_eq!(failure.pre_state.turn_pointer, 1);
    }

    #[test]
    fn test_fixture_json_shape() {
        let json = r#"{
            "state": {"version": 2},
            "actions": [{"action": {"Cultivate": {}}}]
        }"#;
        let fixture: Fixture = serde_json::from_str(json).unwrap();
        assert_eq!(fixture.actions[0].action, pass());
        assert_eq!(fixture.actions[0].player, None);

        // The snapshot itself is incomplete
        assert!(matches!(run(fixture), Err(SessionError::Snapshot(_))));
    }
}
