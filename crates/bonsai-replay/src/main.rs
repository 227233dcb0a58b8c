//! Offline replay harness for recorded bonsai games.
//!
//! Usage: `bonsai-replay <fixture.json> [report.json]`. The paths can also be
//! given as `BONSAI_FIXTURE` and `BONSAI_REPORT`. When `BONSAI_REPRO` is set, a
//! rejected command is also written there as a one-step fixture.

use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod fixture;
mod runner;
mod session;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let fixture_path: PathBuf = args
        .next()
        .or_else(|| std::env::var("BONSAI_FIXTURE").ok())
        .ok_or_else(|| anyhow::anyhow!("no fixture given; pass a path or set BONSAI_FIXTURE"))?
        .into();
    let report_path: Option<PathBuf> = args
        .next()
        .or_else(|| std::env::var("BONSAI_REPORT").ok())
        .map(PathBuf::from);

    info!("Loading fixture {}", fixture_path.display());
    let fixture = runner::load_fixture(&fixture_path)?;
    let report = runner::run(fixture)?;
    runner::write_report(&report, report_path.as_deref())?;

    if report.succeeded() {
        info!("Replayed {} steps", report.steps.len());
        return Ok(());
    }

    if let Some(failure) = &report.failure {
        error!("Replay stopped at step {}: {}", failure.step, failure.message);
        if let Ok(path) = std::env::var("BONSAI_REPRO") {
            let repro = serde_json::to_string_pretty(&failure.to_fixture()?)?;
            std::fs::write(&path, repro)?;
            info!("Reproduction fixture written to {}", path);
        }
        anyhow::bail!("step {} was rejected", failure.step);
    }
    Ok(())
}
