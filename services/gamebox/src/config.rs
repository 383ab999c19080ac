use clap::Parser;
use gamebox_core::orchestrator::DialogSettings;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Command-line flags. Each one overrides its environment counterpart.
#[derive(Debug, Default, Parser)]
#[command(version, about = "A voice-driven bot that plays word games")]
pub struct Cli {
    /// Use stdin/stdout instead of the microphone and speakers.
    #[arg(long)]
    pub print_mode: bool,
    /// Seed for every random choice the bot makes.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Directory holding animals.json and foods.json.
    #[arg(long)]
    pub word_bank: Option<PathBuf>,
}

/// Holds all configuration loaded at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub print_mode: bool,
    pub nlu_url: String,
    pub continuation_api_base: String,
    pub continuation_model: String,
    pub continuation_api_key: Option<String>,
    pub transcription_api_base: String,
    pub transcription_model: String,
    pub openai_api_key: Option<String>,
    pub record_seconds: u32,
    pub speech_language: String,
    pub word_bank_path: PathBuf,
    pub wait_cooldown: Duration,
    pub reprompt_delay: Duration,
    pub seed: Option<u64>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::read_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from the environment, then applies `cli` on top.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Self::read_env()?;
        if cli.print_mode {
            config.print_mode = true;
        }
        if let Some(seed) = cli.seed {
            config.seed = Some(seed);
        }
        if let Some(path) = &cli.word_bank {
            config.word_bank_path = path.clone();
        }
        config.validate()?;
        Ok(config)
    }

    /// The timing knobs handed to the dialog orchestrator.
    pub fn dialog_settings(&self) -> DialogSettings {
        DialogSettings {
            wait_cooldown: self.wait_cooldown,
            reprompt_delay: self.reprompt_delay,
            ..DialogSettings::default()
        }
    }

    fn read_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let print_mode = parse_var("GAMEBOX_PRINT_MODE", false, parse_bool)?;

        let nlu_url = std::env::var("NLU_URL")
            .unwrap_or_else(|_| "http://localhost:5005/model/parse".to_string());

        let continuation_api_base = std::env::var("CONTINUATION_API_BASE")
            .unwrap_or_else(|_| "http://localhost:8000/v1".to_string());
        let continuation_model =
            std::env::var("CONTINUATION_MODEL").unwrap_or_else(|_| "gpt2".to_string());
        let continuation_api_key = std::env::var("CONTINUATION_API_KEY").ok();

        let transcription_api_base = std::env::var("TRANSCRIPTION_API_BASE")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let transcription_model =
            std::env::var("TRANSCRIPTION_MODEL").unwrap_or_else(|_| "whisper-1".to_string());
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        let record_seconds = parse_var("RECORD_SECONDS", 5, |s| s.parse::<u32>().ok())?;
        let speech_language =
            std::env::var("SPEECH_LANGUAGE").unwrap_or_else(|_| "en".to_string());

        let word_bank_path = std::env::var("WORD_BANK_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./game_data"));

        let wait_cooldown = Duration::from_secs(parse_var("WAIT_COOLDOWN_SECS", 20, |s| {
            s.parse::<u64>().ok()
        })?);
        let reprompt_delay = Duration::from_secs(parse_var("REPROMPT_DELAY_SECS", 5, |s| {
            s.parse::<u64>().ok()
        })?);

        let seed = match std::env::var("GAMEBOX_SEED") {
            Ok(value) => Some(value.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("GAMEBOX_SEED".to_string(), e.to_string())
            })?),
            Err(_) => None,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = Level::from_str(&log_level_str).map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            print_mode,
            nlu_url,
            continuation_api_base,
            continuation_model,
            continuation_api_key,
            transcription_api_base,
            transcription_model,
            openai_api_key,
            record_seconds,
            speech_language,
            word_bank_path,
            wait_cooldown,
            reprompt_delay,
            seed,
            log_level,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.print_mode && self.openai_api_key.is_none() {
            return Err(ConfigError::MissingVar(
                "OPENAI_API_KEY must be set unless print mode is enabled".to_string(),
            ));
        }
        if let Some(seed) = self.seed {
            if i64::try_from(seed).is_err() {
                return Err(ConfigError::InvalidValue(
                    "GAMEBOX_SEED".to_string(),
                    format!("{} is larger than {}", seed, i64::MAX),
                ));
            }
        }
        if self.record_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "RECORD_SECONDS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T>(
    name: &str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => parse(value.trim()).ok_or_else(|| {
            ConfigError::InvalidValue(name.to_string(), format!("'{}' cannot be parsed", value))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
