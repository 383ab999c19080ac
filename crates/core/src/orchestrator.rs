//! Dialog Orchestrator
//!
//! The single loop that turns user utterances into game actions. Each
//! iteration listens once, classifies the utterance with the NLU service and
//! dispatches it either to a session-level command (wait, rules, quit) or to
//! the active game. Exactly one turn is processed at a time.

use crate::{
    Command, GameOutcome,
    confirm::confirm,
    continuation::{self, ContinuationGame},
    letter_chain::{self, LetterChainGame},
    nlu::{Intent, NluService},
    phrasing,
    session::{ActiveGame, GameKind, GameSession},
    speech::{SpeechSink, SpeechSource},
    text_oracle::TextContinuation,
    word_bank::{Category, WordBank},
};
use anyhow::Result;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

pub const GREETING: &str = "Hello! I am the gamebox bot. I can play three games with you: \
the animal, food or word sequence game. Which game would you like to play?";

const REPROMPT: &str = "I'm sorry, I didn't understand that. Please try again.";
const PICK_A_GAME: &str =
    "Sorry, I didn't understand that. Please say again which game you want to play.";
const NLU_UNAVAILABLE: &str =
    "Sorry, I cannot reach my language understanding service. Goodbye.";
const GOODBYE: &str = "Okay! Goodbye!";
const CONFIRM_QUIT: &str = "Do you really want to stop the game?";
const QUIT_CONFIRMED: &str = "Okay let's play another game. Which game would you like to play? \
We can play the animal, food or word sequence game.";
const QUIT_REFUSED: &str = "Okay. I will continue the game.";

const WAIT_ACKNOWLEDGEMENTS: [&str; 3] = [
    "Okay. I will sleep a while and let you think.",
    "I will give you some time to think.",
    "I will wait a little.",
];
const WAIT_NOTICE: &str = "And tell you when I'm back.";
const WAIT_RESUME: &str = "I'm back. Have you thought of something?";

/// Timing knobs of the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogSettings {
    /// How long to stay silent after a `wait` intent.
    pub wait_cooldown: Duration,
    /// Delay before reprompting when nothing was heard.
    pub reprompt_delay: Duration,
    /// Length of the letter-chain game's cosmetic thinking pause.
    pub thinking_pause: Duration,
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self {
            wait_cooldown: Duration::from_secs(20),
            reprompt_delay: Duration::from_secs(5),
            thinking_pause: Duration::from_secs(2),
        }
    }
}

/// The external services the orchestrator talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub speech_sink: Arc<dyn SpeechSink>,
    pub speech_source: Arc<dyn SpeechSource>,
    pub nlu: Arc<dyn NluService>,
    pub text_oracle: Arc<dyn TextContinuation>,
}

/// Where the dialog currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    SelectingGame,
    InGame(GameKind),
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user said goodbye while no game was running.
    UserQuit,
    /// A game finished on its own.
    GameOver(GameKind),
    /// The NLU service could not classify an utterance.
    NluUnavailable,
}

/// What the loop does after handling one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    End(SessionEnd),
}

pub struct DialogOrchestrator {
    collaborators: Collaborators,
    word_bank: Arc<WordBank>,
    settings: DialogSettings,
    session: GameSession,
    rng: StdRng,
}

impl DialogOrchestrator {
    pub fn new(
        collaborators: Collaborators,
        word_bank: Arc<WordBank>,
        settings: DialogSettings,
        rng: StdRng,
    ) -> Self {
        Self {
            collaborators,
            word_bank,
            settings,
            session: GameSession::new(),
            rng,
        }
    }

    pub fn state(&self) -> DialogState {
        match self.session.active_kind() {
            Some(kind) => DialogState::InGame(kind),
            None => DialogState::SelectingGame,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Greets the user and runs turns until the session ends.
    pub async fn run(&mut self) -> Result<SessionEnd> {
        self.say(GREETING).await?;

        loop {
            let Some(user_input) = self.collaborators.speech_source.listen().await? else {
                tokio::time::sleep(self.settings.reprompt_delay).await;
                self.say(REPROMPT).await?;
                continue;
            };

            if let Flow::End(end) = self.handle_utterance(&user_input).await? {
                info!(?end, "Session finished");
                return Ok(end);
            }
        }
    }

    /// Classifies one utterance and dispatches it.
    pub async fn handle_utterance(&mut self, user_input: &str) -> Result<Flow> {
        let parsed = self.collaborators.nlu.parse(user_input).await;
        debug!(input = %user_input, intent = ?parsed.intent, entity = ?parsed.entity, "Utterance parsed");

        let Some(intent) = parsed.intent else {
            error!(state = ?self.state(), "NLU service unavailable; ending session");
            self.say(NLU_UNAVAILABLE).await?;
            return Ok(Flow::End(SessionEnd::NluUnavailable));
        };

        let entity = match parsed.entity {
            Some(entity) => Some(entity),
            None if intent.requires_entity() => Some(user_input.trim().to_lowercase()),
            None => None,
        };

        match intent {
            Intent::NluFallback => {
                self.say(REPROMPT).await?;
                Ok(Flow::Continue)
            }
            Intent::Wait => {
                self.wait().await?;
                Ok(Flow::Continue)
            }
            _ if self.session.is_active() => {
                self.in_game(user_input, &intent, entity.as_deref()).await
            }
            _ => self.selecting_game(&intent).await,
        }
    }

    async fn selecting_game(&mut self, intent: &Intent) -> Result<Flow> {
        let game = match intent {
            Intent::ChooseAnimalGame => Some(self.letter_chain(Category::Animal)),
            Intent::ChooseFoodGame => Some(self.letter_chain(Category::Food)),
            Intent::ChooseWordSequenceGame => {
                Some(ActiveGame::WordSequence(ContinuationGame::new()))
            }
            Intent::ExplainRules => {
                self.say(&all_games_instructions()).await?;
                None
            }
            Intent::EndGame => {
                self.say(GOODBYE).await?;
                return Ok(Flow::End(SessionEnd::UserQuit));
            }
            _ => {
                self.say(PICK_A_GAME).await?;
                None
            }
        };

        if let Some(game) = game {
            let kind = game.kind();
            if let Some(opening) = self.session.start(game) {
                info!(%kind, "Game started");
                self.execute(opening.commands).await?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn in_game(
        &mut self,
        user_input: &str,
        intent: &Intent,
        entity: Option<&str>,
    ) -> Result<Flow> {
        match intent {
            Intent::EndGame => {
                let sink = self.collaborators.speech_sink.as_ref();
                let source = self.collaborators.speech_source.as_ref();
                if confirm(sink, source, CONFIRM_QUIT).await? {
                    if let Some(game) = self.session.clear() {
                        info!(kind = %game.kind(), "Game quit by user");
                    }
                    self.say(QUIT_CONFIRMED).await?;
                } else {
                    self.say(QUIT_REFUSED).await?;
                }
                Ok(Flow::Continue)
            }
            Intent::ExplainRules => {
                if let Some(rules) = self.session.instructions() {
                    self.say(&rules).await?;
                }
                Ok(Flow::Continue)
            }
            _ => {
                let reply = self
                    .session
                    .turn(
                        user_input,
                        intent,
                        entity,
                        self.collaborators.text_oracle.as_ref(),
                        &mut self.rng,
                    )
                    .await;
                let Some(reply) = reply else {
                    return Ok(Flow::Continue);
                };

                let outcome = reply.outcome;
                self.execute(reply.commands).await?;
                if outcome == GameOutcome::GameOver {
                    if let Some(game) = self.session.clear() {
                        let kind = game.kind();
                        info!(%kind, "Game over");
                        return Ok(Flow::End(SessionEnd::GameOver(kind)));
                    }
                }
                Ok(Flow::Continue)
            }
        }
    }

    async fn wait(&mut self) -> Result<()> {
        let acknowledgement = phrasing::pick(&mut self.rng, &WAIT_ACKNOWLEDGEMENTS);
        self.say(acknowledgement).await?;
        self.say(WAIT_NOTICE).await?;
        debug!(cooldown = ?self.settings.wait_cooldown, "Waiting for the user to think");
        tokio::time::sleep(self.settings.wait_cooldown).await;
        self.say(WAIT_RESUME).await
    }

    fn letter_chain(&mut self, category: Category) -> ActiveGame {
        let game = LetterChainGame::random(category, &self.word_bank, &mut self.rng)
            .with_thinking_pause(self.settings.thinking_pause);
        ActiveGame::LetterChain(game)
    }

    async fn execute(&self, commands: Vec<Command>) -> Result<()> {
        for command in commands {
            match command {
                Command::Speak(text) => self.say(&text).await?,
                Command::Pause(duration) => tokio::time::sleep(duration).await,
            }
        }
        Ok(())
    }

    async fn say(&self, text: &str) -> Result<()> {
        self.collaborators.speech_sink.speak(text).await
    }
}

/// The rules of every game, recited when asked outside of a game.
pub fn all_games_instructions() -> String {
    format!(
        "I can play three games with you. The animal game: {} The food game: {} The word sequence game: {}",
        letter_chain::instructions(Category::Animal),
        letter_chain::instructions(Category::Food),
        continuation::INSTRUCTIONS
    )
}
