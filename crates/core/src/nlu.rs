//! Natural Language Understanding
//!
//! This module defines the intent vocabulary the dialog understands, the
//! contract for any service that classifies an utterance, and a client for a
//! Rasa-style HTTP parse endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, error};

/// A discrete label classifying the purpose of an utterance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Intent {
    ChooseAnimalGame,
    ChooseFoodGame,
    ChooseWordSequenceGame,
    GameAnswer,
    EndGame,
    ExplainRules,
    Wait,
    Affirm,
    Deny,
    NluFallback,
    /// Any label outside the known vocabulary.
    Other(String),
}

impl Intent {
    /// Maps an NLU label (e.g. `"choose_animal_game"`) onto an intent.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "choose_animal_game" => Intent::ChooseAnimalGame,
            "choose_food_game" => Intent::ChooseFoodGame,
            "choose_word_sequence_game" => Intent::ChooseWordSequenceGame,
            "game_answer" => Intent::GameAnswer,
            "end_game" => Intent::EndGame,
            "explain_rules" => Intent::ExplainRules,
            "wait" => Intent::Wait,
            "affirm" => Intent::Affirm,
            "deny" => Intent::Deny,
            "nlu_fallback" => Intent::NluFallback,
            other => Intent::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Intent::ChooseAnimalGame => "choose_animal_game",
            Intent::ChooseFoodGame => "choose_food_game",
            Intent::ChooseWordSequenceGame => "choose_word_sequence_game",
            Intent::GameAnswer => "game_answer",
            Intent::EndGame => "end_game",
            Intent::ExplainRules => "explain_rules",
            Intent::Wait => "wait",
            Intent::Affirm => "affirm",
            Intent::Deny => "deny",
            Intent::NluFallback => "nlu_fallback",
            Intent::Other(label) => label,
        }
    }

    /// Whether this intent is meaningless without an extracted entity.
    pub fn requires_entity(&self) -> bool {
        matches!(self, Intent::GameAnswer)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One parsed user utterance.
///
/// A missing `intent` signals that the NLU service could not be used at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUtterance {
    pub intent: Option<Intent>,
    pub entity: Option<String>,
}

impl ParsedUtterance {
    pub fn new(intent: Intent, entity: Option<&str>) -> Self {
        Self {
            intent: Some(intent),
            entity: entity.map(str::to_string),
        }
    }

    /// The result reported when the NLU service is unavailable.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Defines the contract for any service that classifies user utterances.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NluService: Send + Sync {
    /// Classifies `text`.
    ///
    /// Failures are never returned as errors: they surface as
    /// [`ParsedUtterance::unavailable`] after being logged.
    async fn parse(&self, text: &str) -> ParsedUtterance;
}

#[derive(Debug, Deserialize)]
struct RasaIntent {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RasaEntity {
    value: serde_json::Value,
}

/// The subset of a Rasa `/model/parse` response the dialog uses.
#[derive(Debug, Deserialize)]
struct RasaParseResponse {
    intent: Option<RasaIntent>,
    #[serde(default)]
    entities: Vec<RasaEntity>,
}

impl From<RasaParseResponse> for ParsedUtterance {
    fn from(response: RasaParseResponse) -> Self {
        let intent = response
            .intent
            .and_then(|i| i.name)
            .map(|name| Intent::from_label(&name));
        let entity = response.entities.into_iter().next().map(|e| match e.value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        Self { intent, entity }
    }
}

/// An implementation of `NluService` for a Rasa NLU HTTP server.
pub struct RasaNluClient {
    client: reqwest::Client,
    url: String,
}

impl RasaNluClient {
    /// Creates a client posting to `url` (e.g. `http://localhost:5005/model/parse`).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn request(&self, text: &str) -> anyhow::Result<ParsedUtterance> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            anyhow::bail!("NLU server answered with status {}", status);
        }

        let body: RasaParseResponse = response.json().await?;
        Ok(body.into())
    }
}

#[async_trait]
impl NluService for RasaNluClient {
    async fn parse(&self, text: &str) -> ParsedUtterance {
        if text.is_empty() {
            return ParsedUtterance::unavailable();
        }

        match self.request(text).await {
            Ok(parsed) => {
                debug!(intent = ?parsed.intent, entity = ?parsed.entity, "NLU parse succeeded");
                parsed
            }
            Err(e) => {
                error!(url = %self.url, error = %e, "NLU server error");
                ParsedUtterance::unavailable()
            }
        }
    }
}
