//! Game Session
//!
//! Holds the one game currently being played, if any, and gives the
//! orchestrator a single `turn` entry point whichever game it is.

use crate::{
    TurnReply, continuation::ContinuationGame, letter_chain::LetterChainGame, nlu::Intent,
    text_oracle::TextContinuation, word_bank::Category,
};
use rand::Rng;
use std::fmt;

/// Which game is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    LetterChain(Category),
    WordSequence,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameKind::LetterChain(category) => write!(f, "{} game", category),
            GameKind::WordSequence => write!(f, "word sequence game"),
        }
    }
}

/// A game instance of one of the supported kinds.
#[derive(Debug, Clone)]
pub enum ActiveGame {
    LetterChain(LetterChainGame),
    WordSequence(ContinuationGame),
}

impl ActiveGame {
    pub fn kind(&self) -> GameKind {
        match self {
            ActiveGame::LetterChain(game) => GameKind::LetterChain(game.category()),
            ActiveGame::WordSequence(_) => GameKind::WordSequence,
        }
    }

    pub fn instructions(&self) -> String {
        match self {
            ActiveGame::LetterChain(game) => game.instructions(),
            ActiveGame::WordSequence(game) => game.instructions().to_string(),
        }
    }
}

/// The session's game slot. Starting a game requires the slot to be empty;
/// quitting drops the game and all of its state.
#[derive(Debug, Default)]
pub struct GameSession {
    game: Option<ActiveGame>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.game.is_some()
    }

    pub fn active_kind(&self) -> Option<GameKind> {
        self.game.as_ref().map(ActiveGame::kind)
    }

    pub fn game(&self) -> Option<&ActiveGame> {
        self.game.as_ref()
    }

    /// Installs `game` and returns its opening reply.
    ///
    /// Returns `None` without touching the session if a game is already active.
    pub fn start(&mut self, mut game: ActiveGame) -> Option<TurnReply> {
        if self.game.is_some() {
            return None;
        }
        let opening = match &mut game {
            ActiveGame::LetterChain(g) => g.open(),
            ActiveGame::WordSequence(g) => g.open(),
        };
        self.game = Some(game);
        Some(opening)
    }

    /// Drops the active game.
    pub fn clear(&mut self) -> Option<ActiveGame> {
        self.game.take()
    }

    pub fn instructions(&self) -> Option<String> {
        self.game.as_ref().map(ActiveGame::instructions)
    }

    /// Forwards one user turn to the active game.
    ///
    /// Returns `None` when no game is active.
    pub async fn turn<R: Rng + ?Sized>(
        &mut self,
        user_input: &str,
        intent: &Intent,
        entity: Option<&str>,
        oracle: &dyn TextContinuation,
        rng: &mut R,
    ) -> Option<TurnReply> {
        let reply = match self.game.as_mut()? {
            ActiveGame::LetterChain(game) => game.turn(intent, entity, rng),
            ActiveGame::WordSequence(game) => game.turn(user_input, oracle, rng).await,
        };
        Some(reply)
    }
}
