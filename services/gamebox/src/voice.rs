//! Audio speech collaborators.
//!
//! Speech output shells out to `espeak` piped into `aplay`. Speech input
//! records a fixed-length clip with `arecord` and sends it to an
//! OpenAI-compatible transcription endpoint.

use anyhow::{Context, Result, bail};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{AudioInput, CreateTranscriptionRequestArgs},
};
use async_trait::async_trait;
use gamebox_core::speech::{SpeechSink, SpeechSource};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

const ESPEAK_WORDS_PER_MINUTE: &str = "150";
const RECORD_SAMPLE_RATE: &str = "16000";

/// Speaks through `espeak` and `aplay`, echoing each line as `<< text`.
#[derive(Debug, Clone)]
pub struct EspeakSink {
    language: String,
}

impl EspeakSink {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

#[async_trait]
impl SpeechSink for EspeakSink {
    async fn speak(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        println!("<< {}", text);

        let mut espeak = Command::new("espeak")
            .args(["-v", self.language.as_str(), "-s", ESPEAK_WORDS_PER_MINUTE, "--stdout", text])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("Failed to start espeak")?;
        let wav: Stdio = espeak
            .stdout
            .take()
            .context("espeak has no stdout")?
            .try_into()
            .context("Failed to hand espeak output to aplay")?;

        let played = Command::new("aplay")
            .arg("-q")
            .stdin(wav)
            .stderr(Stdio::null())
            .status()
            .await
            .context("Failed to start aplay")?;
        let spoken = espeak.wait().await.context("espeak did not finish")?;

        if !spoken.success() || !played.success() {
            bail!("Speech playback failed (espeak: {}, aplay: {})", spoken, played);
        }
        Ok(())
    }
}

/// Records one utterance with `arecord` and transcribes it.
pub struct RecordingTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    record_seconds: u32,
}

impl RecordingTranscriber {
    /// Creates a new transcriber.
    ///
    /// # Arguments
    ///
    /// * `config` - OpenAI API configuration (API key, base URL, etc.).
    /// * `model` - Transcription model identifier (e.g., "whisper-1").
    /// * `record_seconds` - Length of each recorded clip.
    pub fn new(config: OpenAIConfig, model: String, record_seconds: u32) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            record_seconds,
        }
    }

    async fn record(&self) -> Result<Vec<u8>> {
        let seconds = self.record_seconds.to_string();
        let output = Command::new("arecord")
            .args([
                "-q",
                "-f",
                "S16_LE",
                "-r",
                RECORD_SAMPLE_RATE,
                "-c",
                "1",
                "-t",
                "wav",
                "-d",
                seconds.as_str(),
                "-",
            ])
            .stderr(Stdio::null())
            .output()
            .await
            .context("Failed to start arecord")?;

        if !output.status.success() {
            bail!("arecord exited with {}", output.status);
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl SpeechSource for RecordingTranscriber {
    async fn listen(&self) -> Result<Option<String>> {
        let wav = self.record().await?;
        debug!(bytes = wav.len(), "Recorded utterance");

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8("utterance.wav".to_string(), wav))
            .model(&self.model)
            .build()?;

        match self.client.audio().transcribe(request).await {
            Ok(response) => {
                let text = response.text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                println!(">> {}", text);
                Ok(Some(text.to_string()))
            }
            Err(e) => {
                warn!(error = %e, "Transcription failed");
                Ok(None)
            }
        }
    }
}
