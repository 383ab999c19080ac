pub mod confirm;
pub mod continuation;
pub mod letter_chain;
pub mod nlu;
pub mod orchestrator;
pub mod phrasing;
pub mod session;
pub mod speech;
pub mod text_oracle;
pub mod word_bank;

use std::time::Duration;

/// Represents commands that a game engine issues to the dialog runtime.
///
/// Game engines never talk to the speech sink directly. They describe the
/// side effects of a turn as a list of commands, which the orchestrator then
/// executes in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Command the runtime to speak the given text to the user.
    Speak(String),
    /// Command the runtime to stay silent for the given duration.
    Pause(Duration),
}

/// Whether a game keeps going after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Continue,
    /// The game has ended; the session terminates.
    GameOver,
}

/// The result of a single game turn: what to do and what to say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub outcome: GameOutcome,
    pub commands: Vec<Command>,
}

impl TurnReply {
    /// A `Continue` reply that only speaks the given text.
    pub fn say(text: impl Into<String>) -> Self {
        Self {
            outcome: GameOutcome::Continue,
            commands: vec![Command::Speak(text.into())],
        }
    }

    /// Returns the spoken lines of this reply, skipping pauses.
    pub fn spoken(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Speak(text) => Some(text.as_str()),
                Command::Pause(_) => None,
            })
            .collect()
    }
}
