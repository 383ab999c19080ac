//! Word-Sequence (Text Continuation) Game
//!
//! The user says a few words, the machine continues the story, and so on. The
//! game keeps the whole transcript and only ever speaks the freshly generated
//! part. It has no end condition of its own.

use crate::{TurnReply, text_oracle::TextContinuation};
use rand::Rng;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

/// Range the per-turn continuation bound (in tokens) is drawn from.
pub const CONTINUATION_TOKENS: RangeInclusive<u32> = 3..=12;

pub const INSTRUCTIONS: &str = "In the word sequence game, you say a few words to start a story. \
Then I will continue it with a few words of my own. \
Then it is your turn again, and so on, for as long as you like.";

#[derive(Debug, Clone, Default)]
pub struct ContinuationGame {
    transcript: Vec<String>,
}

impl ContinuationGame {
    pub fn new() -> Self {
        Self::default()
    }

    /// All chunks spoken so far, user and machine alike, in order.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// The transcript as a single text.
    pub fn text(&self) -> String {
        self.transcript.join(" ")
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    pub fn open(&self) -> TurnReply {
        TurnReply::say(
            "Good choice! Let's play the word sequence game. Say a few words and I will continue.",
        )
    }

    /// Appends the user's words and speaks the oracle's continuation.
    ///
    /// Always returns a `Continue` outcome.
    pub async fn turn<R: Rng + ?Sized>(
        &mut self,
        user_input: &str,
        oracle: &dyn TextContinuation,
        rng: &mut R,
    ) -> TurnReply {
        let user_input = user_input.trim();
        if user_input.is_empty() {
            return TurnReply::say("Please say a few words to continue the story.");
        }
        self.transcript.push(user_input.to_string());

        let bound = rng.random_range(CONTINUATION_TOKENS);
        let suffix = match oracle.continue_text(&self.text(), bound).await {
            Ok(suffix) => suffix.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "Text continuation failed");
                return TurnReply::say("Sorry, I couldn't think of a continuation. Your turn.");
            }
        };

        if suffix.is_empty() {
            return TurnReply::say("I have nothing to add. Your turn.");
        }

        debug!(bound, suffix = %suffix, "Continuing the word sequence");
        self.transcript.push(suffix.clone());
        TurnReply::say(suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameOutcome;
    use crate::text_oracle::MockTextContinuation;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[tokio::test]
    async fn test_turn_speaks_only_the_suffix() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut oracle = MockTextContinuation::new();
        oracle
            .expect_continue_text()
            .withf(|text, bound| text == "once upon a time" && CONTINUATION_TOKENS.contains(bound))
            .times(1)
            .returning(|_, _| Ok(" there was a dragon\n".to_string()));
        oracle
            .expect_continue_text()
            .withf(|text, _| text == "once upon a time there was a dragon who ate")
            .times(1)
            .returning(|_, _| Ok("all the cake".to_string()));

        let mut game = ContinuationGame::new();
        let reply = game.turn("once upon a time", &oracle, &mut rng).await;
        assert_eq!(reply.outcome, GameOutcome::Continue);
        assert_eq!(reply.spoken(), ["there was a dragon"]);

        let reply = game.turn(" who ate ", &oracle, &mut rng).await;
        assert_eq!(reply.spoken(), ["all the cake"]);
        assert_eq!(
            game.transcript(),
            ["once upon a time", "there was a dragon", "who ate", "all the cake"]
        );
    }

    #[tokio::test]
    async fn test_oracle_failure_keeps_user_text() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut oracle = MockTextContinuation::new();
        oracle
            .expect_continue_text()
            .returning(|_, _| Err(anyhow::anyhow!("connection refused")));

        let mut game = ContinuationGame::new();
        let reply = game.turn("hello there", &oracle, &mut rng).await;
        assert_eq!(reply.outcome, GameOutcome::Continue);
        assert!(reply.spoken()[0].starts_with("Sorry"));
        assert_eq!(game.transcript(), ["hello there"]);
    }

    #[tokio::test]
    async fn test_blank_input_and_empty_suffix() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut oracle = MockTextContinuation::new();
        oracle
            .expect_continue_text()
            .withf(|text, _| text == "the end")
            .times(1)
            .returning(|_, _| Ok("  ".to_string()));

        let mut game = ContinuationGame::new();
        let reply = game.turn("   ", &oracle, &mut rng).await;
        assert_eq!(reply.outcome, GameOutcome::Continue);
        assert!(game.transcript().is_empty());

        let reply = game.turn("the end", &oracle, &mut rng).await;
        assert_eq!(reply.spoken(), ["I have nothing to add. Your turn."]);
        assert_eq!(game.transcript(), ["the end"]);
    }
}
