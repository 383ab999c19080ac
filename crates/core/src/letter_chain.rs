//! Letter-Chain Game
//!
//! The machine picks a letter; user and machine then take turns naming words
//! of one category (animals or foods) that start with that letter. Words may
//! not repeat. The machine never loses by contradiction: it only concedes when
//! its word list for the letter runs dry or when its give-up counter reaches
//! the threshold drawn at the start of the game.

use crate::{
    Command, GameOutcome, TurnReply,
    nlu::Intent,
    phrasing,
    word_bank::{Category, WordBank},
};
use rand::Rng;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::{debug, info};

/// Range the give-up threshold is drawn from at game start.
pub const GIVE_UP_RANGE: RangeInclusive<u32> = 1..=10;

/// Probability that the machine "thinks" out loud before answering.
pub const THINKING_PROBABILITY: f64 = 0.3;

const DEFAULT_THINKING_PAUSE: Duration = Duration::from_secs(2);

const MACHINE_WORD_VARIANTS: [&str; 4] = [
    "Great! {answer} is a valid {category}. I'll say {word}. Your turn.",
    "Nice choice! I'll say {word}. Your turn.",
    "Good one! I'll say {word}.",
    "You got it! I'll say {word}. Your turn.",
];

const THINKING_FILLERS: [&str; 3] = [
    "Hmm, let me think.",
    "Oh, that's a tough one.",
    "Give me a second.",
];

#[derive(Debug, Clone)]
pub struct LetterChainGame {
    category: Category,
    letter: char,
    words: Vec<String>,
    cursor: usize,
    used_words: HashSet<String>,
    give_up_threshold: u32,
    give_up_counter: u32,
    thinking_pause: Duration,
}

impl LetterChainGame {
    /// Creates a game with a random letter and a random give-up threshold.
    ///
    /// The category's word list for the chosen letter is copied out of the
    /// bank once; the game never consults the bank again.
    pub fn random<R: Rng + ?Sized>(category: Category, bank: &WordBank, rng: &mut R) -> Self {
        let letter = char::from(b'A' + rng.random_range(0..26u8));
        let threshold = rng.random_range(GIVE_UP_RANGE);
        let words = bank.words(category, letter).to_vec();
        Self::with_letter(category, letter, words, threshold)
    }

    /// Creates a game with a fixed letter, word list and give-up threshold.
    pub fn with_letter(
        category: Category,
        letter: char,
        words: Vec<String>,
        give_up_threshold: u32,
    ) -> Self {
        Self {
            category,
            letter: letter.to_ascii_uppercase(),
            words,
            cursor: 0,
            used_words: HashSet::new(),
            give_up_threshold,
            give_up_counter: 0,
            thinking_pause: DEFAULT_THINKING_PAUSE,
        }
    }

    /// Sets how long the cosmetic "thinking" pause lasts.
    pub fn with_thinking_pause(mut self, pause: Duration) -> Self {
        self.thinking_pause = pause;
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn used_words(&self) -> &HashSet<String> {
        &self.used_words
    }

    pub fn give_up_threshold(&self) -> u32 {
        self.give_up_threshold
    }

    pub fn give_up_counter(&self) -> u32 {
        self.give_up_counter
    }

    pub fn instructions(&self) -> String {
        instructions(self.category)
    }

    /// Announces the letter and plays the machine's opening word.
    pub fn open(&mut self) -> TurnReply {
        info!(category = %self.category, letter = %self.letter, threshold = self.give_up_threshold, "Letter-chain game started");

        let intro = format!(
            "Good choice! Let's play the {} game. I will start. I have chosen the letter {}.",
            self.category, self.letter
        );
        let opening = match self.next_candidate() {
            Some(word) => format!("I'll say {}. Your turn.", word),
            None => "You go first.".to_string(),
        };

        TurnReply {
            outcome: GameOutcome::Continue,
            commands: vec![Command::Speak(intro), Command::Speak(opening)],
        }
    }

    /// Plays one user turn.
    pub fn turn<R: Rng + ?Sized>(
        &mut self,
        intent: &Intent,
        entity: Option<&str>,
        rng: &mut R,
    ) -> TurnReply {
        let answer = match (intent, entity) {
            (Intent::GameAnswer, Some(entity)) => normalize(entity),
            _ => {
                return TurnReply::say(format!(
                    "I'm sorry, I didn't understand your {}. Could you please repeat that?",
                    self.category
                ));
            }
        };

        if !self.starts_with_letter(&answer) {
            debug!(answer = %answer, letter = %self.letter, "Rejected answer with wrong letter");
            return TurnReply::say(format!(
                "The {} has to start with the letter {}. Please try again.",
                self.category, self.letter
            ));
        }

        if self.used_words.contains(&answer) {
            debug!(answer = %answer, "Rejected repeated answer");
            return TurnReply::say(format!(
                "This {} has already been named! Try again.",
                self.category
            ));
        }

        self.used_words.insert(answer.clone());

        if self.give_up_counter >= self.give_up_threshold {
            info!(counter = self.give_up_counter, "Machine gives up");
            return TurnReply {
                outcome: GameOutcome::GameOver,
                commands: vec![Command::Speak(format!(
                    "Good call! I give up. I can't think of any more {} starting with {}. You won!",
                    self.category.plural(),
                    self.letter
                ))],
            };
        }

        let Some(word) = self.next_candidate() else {
            info!(cursor = self.cursor, "Machine vocabulary exhausted");
            return TurnReply {
                outcome: GameOutcome::GameOver,
                commands: vec![Command::Speak(format!(
                    "Good call! I can't think of any more {} starting with {}. You won!",
                    self.category.plural(),
                    self.letter
                ))],
            };
        };

        let mut commands = Vec::new();
        if rng.random_bool(THINKING_PROBABILITY) {
            commands.push(Command::Speak(
                phrasing::pick(rng, &THINKING_FILLERS).to_string(),
            ));
            commands.push(Command::Pause(self.thinking_pause));
        }
        let reply = phrasing::pick(rng, &MACHINE_WORD_VARIANTS)
            .replace("{answer}", &answer)
            .replace("{category}", &self.category.to_string())
            .replace("{word}", &word);
        commands.push(Command::Speak(reply));

        self.give_up_counter += 1;
        debug!(word = %word, counter = self.give_up_counter, cursor = self.cursor, "Machine played a word");

        TurnReply {
            outcome: GameOutcome::Continue,
            commands,
        }
    }

    /// Advances the cursor to the next unused word for the letter and claims it.
    ///
    /// Returns `None` once the list is exhausted.
    fn next_candidate(&mut self) -> Option<String> {
        while self.cursor < self.words.len() {
            let word = normalize(&self.words[self.cursor]);
            self.cursor += 1;
            if self.starts_with_letter(&word) && !self.used_words.contains(&word) {
                self.used_words.insert(word.clone());
                return Some(word);
            }
        }
        None
    }

    fn starts_with_letter(&self, word: &str) -> bool {
        word.chars()
            .next()
            .is_some_and(|c| c.to_ascii_uppercase() == self.letter)
    }
}

/// The rules of the letter-chain game for `category`.
pub fn instructions(category: Category) -> String {
    format!(
        "At the beginning of the game, I will decide upon a random letter. \
         Then, you will have to name {article} {category} that starts with that letter. \
         Then, I will do the same. \
         We will continue until one of us can't think of {article} {category} anymore. \
         You can't repeat {plural}.",
        article = category.article(),
        category = category,
        plural = category.plural(),
    )
}

fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn answer(game: &mut LetterChainGame, word: &str, rng: &mut StdRng) -> TurnReply {
        game.turn(&Intent::GameAnswer, Some(word), rng)
    }

    fn last_line(reply: &TurnReply) -> String {
        reply.spoken().last().map(|s| s.to_string()).unwrap_or_default()
    }

    #[test]
    fn test_camel_cow_cobra_scenario() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut game =
            LetterChainGame::with_letter(Category::Animal, 'C', words(&["cat", "cow", "cobra"]), 2);

        let opening = game.open();
        assert!(last_line(&opening).contains("cat"));
        assert_eq!(game.cursor(), 1);
        assert_eq!(game.used_words(), &HashSet::from(["cat".to_string()]));

        let reply = answer(&mut game, "Camel", &mut rng);
        assert_eq!(reply.outcome, GameOutcome::Continue);
        assert!(last_line(&reply).contains("cow"));
        assert_eq!(game.cursor(), 2);
        assert_eq!(game.give_up_counter(), 1);
        assert!(game.used_words().contains("camel"));

        let before = game.used_words().clone();
        let reply = answer(&mut game, "Cow", &mut rng);
        assert_eq!(reply.outcome, GameOutcome::Continue);
        assert!(last_line(&reply).contains("already been named"));
        assert_eq!(game.used_words(), &before);
        assert_eq!(game.give_up_counter(), 1);

        let reply = answer(&mut game, "Coyote", &mut rng);
        assert_eq!(reply.outcome, GameOutcome::Continue);
        assert!(last_line(&reply).contains("cobra"));
        assert_eq!(game.cursor(), 3);
        assert_eq!(game.give_up_counter(), 2);

        let reply = answer(&mut game, "Caribou", &mut rng);
        assert_eq!(reply.outcome, GameOutcome::GameOver);
        assert!(last_line(&reply).contains("I give up"));
        assert!(game.used_words().contains("caribou"));
    }

    #[test]
    fn test_non_answer_intent_changes_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut game =
            LetterChainGame::with_letter(Category::Food, 'B', words(&["bread", "banana"]), 5);
        game.open();

        let reply = game.turn(&Intent::Other("greet".into()), Some("bagel"), &mut rng);
        assert_eq!(reply.outcome, GameOutcome::Continue);
        assert_eq!(
            reply.spoken(),
            ["I'm sorry, I didn't understand your food. Could you please repeat that?"]
        );

        let reply = game.turn(&Intent::GameAnswer, None, &mut rng);
        assert_eq!(reply.outcome, GameOutcome::Continue);
        assert_eq!(game.used_words().len(), 1);
        assert_eq!(game.cursor(), 1);
        assert_eq!(game.give_up_counter(), 0);
    }

    #[test]
    fn test_wrong_letter_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = LetterChainGame::with_letter(Category::Animal, 'C', words(&["cat"]), 5);
        game.open();

        for bad in ["dog", "", "   ", "9cats"] {
            let reply = answer(&mut game, bad, &mut rng);
            assert_eq!(reply.outcome, GameOutcome::Continue);
            assert_eq!(
                reply.spoken(),
                ["The animal has to start with the letter C. Please try again."]
            );
        }
        assert_eq!(game.used_words().len(), 1);
    }

    #[test]
    fn test_exhaustion_ends_game() {
        let mut rng = StdRng::seed_from_u64(3);
        let list = words(&["tiger", "toad", "turkey"]);
        let mut game = LetterChainGame::with_letter(Category::Animal, 't', list.clone(), u32::MAX);
        game.open();

        let answers = ["tapir", "toucan", "tortoise", "tuna"];
        let mut ended_at = None;
        for (i, word) in answers.iter().enumerate() {
            let reply = answer(&mut game, word, &mut rng);
            if reply.outcome == GameOutcome::GameOver {
                assert!(last_line(&reply).contains("can't think of any more animals"));
                ended_at = Some(i + 1);
                break;
            }
        }
        let ended_at = ended_at.expect("game should end by exhaustion");
        assert!(ended_at <= list.len());
    }

    #[test]
    fn test_user_can_take_machine_words() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut game = LetterChainGame::with_letter(
            Category::Animal,
            'D',
            words(&["dog", "deer", "duck"]),
            10,
        );
        game.open();

        // "deer" is the machine's next candidate, so it has to skip ahead to "duck".
        answer(&mut game, "Deer", &mut rng);
        assert_eq!(game.cursor(), 3);
        let reply = answer(&mut game, "dingo", &mut rng);
        assert_eq!(reply.outcome, GameOutcome::GameOver);
    }

    #[test]
    fn test_next_candidate_skips_long_run_of_unusable_words() {
        let mut list: Vec<String> = (0..100_000).map(|i| format!("x{i}")).collect();
        list.push("zebra".to_string());
        let mut game = LetterChainGame::with_letter(Category::Animal, 'Z', list, 10);

        let opening = game.open();
        assert!(last_line(&opening).contains("zebra"));
        assert_eq!(game.cursor(), 100_001);
        assert_eq!(game.next_candidate(), None);
    }

    #[test]
    fn test_empty_list_lets_user_start() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = LetterChainGame::with_letter(Category::Food, 'X', Vec::new(), 3);

        let opening = game.open();
        assert_eq!(last_line(&opening), "You go first.");
        assert!(game.used_words().is_empty());

        let reply = answer(&mut game, "xigua", &mut rng);
        assert_eq!(reply.outcome, GameOutcome::GameOver);
    }

    #[test]
    fn test_random_games_keep_invariants() {
        let bank = WordBank::from_lists(HashMap::from([(
            Category::Animal,
            ('A'..='Z')
                .map(|c| {
                    let lower = c.to_ascii_lowercase();
                    (c, (0..6).map(|i| format!("{lower}animal{i}")).collect::<Vec<_>>())
                })
                .collect(),
        )]));

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = LetterChainGame::random(Category::Animal, &bank, &mut rng);
            assert!(game.letter().is_ascii_uppercase());
            assert!(GIVE_UP_RANGE.contains(&game.give_up_threshold()));
            game.open();

            let letter = game.letter().to_ascii_lowercase();
            let mut counter = game.give_up_counter();
            for i in 0..20 {
                let candidate = if i % 3 == 0 {
                    // Replays the machine's own opening word.
                    format!("{letter}animal0")
                } else {
                    format!("{letter}user{i}")
                };
                let used_before = game.used_words().len();
                let reply = answer(&mut game, &candidate, &mut rng);

                for word in game.used_words() {
                    assert!(word.starts_with(letter), "{word} breaks the letter rule");
                }
                assert!(game.give_up_counter() >= counter);
                assert!(game.give_up_counter() <= game.give_up_threshold());

                if i % 3 == 0 {
                    assert_eq!(game.used_words().len(), used_before);
                }
                if reply.outcome == GameOutcome::GameOver {
                    break;
                }
                if i % 3 != 0 {
                    assert_eq!(game.give_up_counter(), counter + 1);
                }
                counter = game.give_up_counter();
            }
        }
    }

    #[test]
    fn test_thinking_pause_is_cosmetic() {
        let mut saw_pause = false;
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = LetterChainGame::with_letter(
                Category::Animal,
                'C',
                words(&["cat", "cow", "cobra"]),
                5,
            )
            .with_thinking_pause(Duration::from_millis(10));
            game.open();

            let reply = answer(&mut game, "camel", &mut rng);
            assert_eq!(reply.outcome, GameOutcome::Continue);
            assert!(last_line(&reply).contains("cow"));
            assert_eq!(game.give_up_counter(), 1);
            if reply.commands.contains(&Command::Pause(Duration::from_millis(10))) {
                saw_pause = true;
                assert_eq!(reply.commands.len(), 3);
            } else {
                assert_eq!(reply.commands.len(), 1);
            }
        }
        assert!(saw_pause);
    }

    #[test]
    fn test_instructions_mention_category() {
        assert!(instructions(Category::Animal).contains("name an animal"));
        assert!(instructions(Category::Food).contains("You can't repeat foods."));
    }
}
