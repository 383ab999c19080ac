//! Speech I/O Contracts
//!
//! The dialog core never renders audio or captures a microphone itself. It
//! talks to the user through these two traits, which the runtime implements
//! either with real audio devices or with a text console.

use anyhow::Result;
use async_trait::async_trait;

/// Renders text to the user (text-to-speech, or a console line).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSink: Send + Sync {
    /// Speaks `text` and returns once playback has completed.
    ///
    /// Implementations treat empty text as a no-op.
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Captures a single user utterance as text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSource: Send + Sync {
    /// Waits for one utterance.
    ///
    /// Returns `Ok(None)` on silence or when nothing could be recognised.
    /// An `Err` means the input channel itself is gone and the session
    /// cannot continue.
    async fn listen(&self) -> Result<Option<String>>;
}
