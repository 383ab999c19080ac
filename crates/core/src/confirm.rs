//! Yes/no confirmation sub-dialog.

use crate::speech::{SpeechSink, SpeechSource};
use anyhow::Result;
use tracing::debug;

/// Words that count as a "yes" anywhere in the reply.
pub const AFFIRMATIONS: [&str; 7] = ["yes", "yeah", "yep", "yup", "sure", "ok", "okay"];

/// Whether `reply` contains one of the [`AFFIRMATIONS`].
///
/// Matching is by substring on the lowercased, trimmed text, so "yes please"
/// and "okay then" both count.
pub fn is_affirmation(reply: &str) -> bool {
    let reply = reply.trim().to_lowercase();
    AFFIRMATIONS.iter().any(|word| reply.contains(word))
}

/// Speaks `prompt`, listens once and classifies the reply.
///
/// Silence counts as "no". There is no retry.
pub async fn confirm(sink: &dyn SpeechSink, source: &dyn SpeechSource, prompt: &str) -> Result<bool> {
    sink.speak(prompt).await?;

    let Some(reply) = source.listen().await? else {
        debug!("No reply to confirmation prompt");
        return Ok(false);
    };

    let confirmed = is_affirmation(&reply);
    debug!(reply = %reply, confirmed, "Confirmation reply classified");
    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::{MockSpeechSink, MockSpeechSource};

    fn sink_expecting(prompt: &'static str) -> MockSpeechSink {
        let mut sink = MockSpeechSink::new();
        sink.expect_speak()
            .withf(move |text| text == prompt)
            .times(1)
            .returning(|_| Ok(()));
        sink
    }

    fn source_replying(reply: Option<&'static str>) -> MockSpeechSource {
        let mut source = MockSpeechSource::new();
        source
            .expect_listen()
            .times(1)
            .returning(move || Ok(reply.map(str::to_string)));
        source
    }

    #[tokio::test]
    async fn test_silence_is_no() {
        let sink = sink_expecting("Quit?");
        let source = source_replying(None);
        assert!(!confirm(&sink, &source, "Quit?").await.unwrap());
    }

    #[tokio::test]
    async fn test_affirmative_replies() {
        for reply in ["yes", "yeah sure", "yup okay", "  YES please "] {
            let sink = sink_expecting("Quit?");
            let source = source_replying(Some(reply));
            assert!(
                confirm(&sink, &source, "Quit?").await.unwrap(),
                "{reply:?} should confirm"
            );
        }
    }

    #[tokio::test]
    async fn test_negative_replies() {
        for reply in ["no", "maybe later", ""] {
            let sink = sink_expecting("Quit?");
            let source = source_replying(Some(reply));
            assert!(
                !confirm(&sink, &source, "Quit?").await.unwrap(),
                "{reply:?} should not confirm"
            );
        }
    }

    #[tokio::test]
    async fn test_closed_input_is_an_error() {
        let sink = sink_expecting("Quit?");
        let mut source = MockSpeechSource::new();
        source
            .expect_listen()
            .returning(|| Err(anyhow::anyhow!("stdin closed")));
        assert!(confirm(&sink, &source, "Quit?").await.is_err());
    }

    #[test]
    fn test_is_affirmation_substring() {
        assert!(is_affirmation("okay then"));
        assert!(is_affirmation("Sure!"));
        assert!(!is_affirmation("nope"));
    }
}
