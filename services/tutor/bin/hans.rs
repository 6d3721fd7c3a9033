//! Main Entrypoint for the HANS Tutor
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and command line.
//! 2. Initializing logging.
//! 3. Loading the curriculum and choosing the contextual responder.
//! 4. Running the conversation over stdin/stdout until the learner leaves.

use anyhow::Context;
use clap::Parser;
use hans_core::{
    curriculum::{BuiltinCurriculumSource, CurriculumSource, JsonFileCurriculumSource},
    engine::LessonProgressionEngine,
    session::TutorSession,
};
use hans_tutor::{build_responder, cli::Cli, config::Config, console::run_conversation};
use rand::{SeedableRng, rngs::StdRng};
use std::sync::Arc;
use tokio::io::{BufReader, stdin, stdout};
use tracing::{Instrument, error, info};

/// Resolves on `Ctrl+C`. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = ?e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let cli = Cli::parse();
    let config = Config::load(&cli).context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    // Logs go to stderr so they never interleave with the conversation on stdout.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
    info!("Configuration loaded. Initializing tutor...");

    // --- 3. Load Curriculum and Responder ---
    let source: Box<dyn CurriculumSource> = match &config.curriculum_path {
        Some(path) => Box::new(JsonFileCurriculumSource::new(path)),
        None => Box::new(BuiltinCurriculumSource),
    };
    let curriculum = source.load().await.context("Failed to load curriculum")?;
    info!(lessons = curriculum.lesson_count(), "Curriculum ready.");

    let responder = build_responder(&config)?;
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    // --- 4. Run the Session ---
    let engine = LessonProgressionEngine::new(Arc::new(curriculum));
    let session_id: u32 = rand::random();
    let session_span = tracing::info_span!("tutor_session", session_id);
    let mut session = session_span.in_scope(|| TutorSession::new(engine, responder, rng));

    run_conversation(
        &mut session,
        BufReader::new(stdin()),
        stdout(),
        shutdown_signal(),
    )
    .instrument(session_span)
    .await?;

    info!("Tutor has shut down.");
    Ok(())
}
