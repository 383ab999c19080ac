//! Main Entrypoint for the Gamebox Bot
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and command line.
//! 2. Loading the word bank.
//! 3. Choosing console or audio speech collaborators.
//! 4. Running one dialog session until it ends.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use clap::Parser;
use gamebox_core::{
    nlu::RasaNluClient,
    orchestrator::{Collaborators, DialogOrchestrator},
    speech::{SpeechSink, SpeechSource},
    text_oracle::OpenAICompatibleContinuation,
    word_bank::WordBank,
};
use gamebox_service::{
    config::{Cli, Config},
    console::{ConsoleSink, ConsoleSource},
    voice::{EspeakSink, RecordingTranscriber},
};
use rand::{SeedableRng, rngs::StdRng};
use std::sync::Arc;
use tracing::info;

/// Builds the speech sink and source for the configured mode.
fn speech_collaborators(config: &Config) -> (Arc<dyn SpeechSink>, Arc<dyn SpeechSource>) {
    if config.print_mode {
        info!("Print mode: using stdin/stdout for speech.");
        return (Arc::new(ConsoleSink), Arc::new(ConsoleSource::stdin()));
    }

    info!(language = %config.speech_language, "Voice mode: using espeak and arecord.");
    let mut transcription_config =
        OpenAIConfig::new().with_api_base(&config.transcription_api_base);
    if let Some(key) = &config.openai_api_key {
        transcription_config = transcription_config.with_api_key(key);
    }
    (
        Arc::new(EspeakSink::new(config.speech_language.clone())),
        Arc::new(RecordingTranscriber::new(
            transcription_config,
            config.transcription_model.clone(),
            config.record_seconds,
        )),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let cli = Cli::parse();
    let config = Config::load(&cli).context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
    info!("Configuration loaded. Initializing collaborators...");

    // --- 3. Load Game Data ---
    let word_bank = Arc::new(
        WordBank::load(&config.word_bank_path).context("Failed to load the word bank")?,
    );

    // --- 4. Initialize Collaborators ---
    let (speech_sink, speech_source) = speech_collaborators(&config);

    let mut continuation_config =
        OpenAIConfig::new().with_api_base(&config.continuation_api_base);
    if let Some(key) = &config.continuation_api_key {
        continuation_config = continuation_config.with_api_key(key);
    }
    let text_oracle = Arc::new(OpenAICompatibleContinuation::new(
        continuation_config,
        config.continuation_model.clone(),
        config.seed.and_then(|seed| i64::try_from(seed).ok()),
    ));

    let collaborators = Collaborators {
        speech_sink,
        speech_source,
        nlu: Arc::new(RasaNluClient::new(config.nlu_url.clone())),
        text_oracle,
    };

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    // --- 5. Run the Session ---
    info!(
        print_mode = config.print_mode,
        nlu_url = %config.nlu_url,
        continuation_model = %config.continuation_model,
        seed = ?config.seed,
        "Gamebox configured. Starting session..."
    );
    let mut orchestrator =
        DialogOrchestrator::new(collaborators, word_bank, config.dialog_settings(), rng);
    let end = orchestrator.run().await?;

    info!(?end, "Session has ended.");
    Ok(())
}
