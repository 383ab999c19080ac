//! Word Bank
//!
//! Read-only lookup from a game category and a starting letter to the ordered
//! list of words the machine may answer with.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A custom error type for word bank loading failures.
#[derive(Debug, thiserror::Error)]
pub enum WordBankError {
    #[error("Failed to read word list {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed word list {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid letter key '{key}' in {path}")]
    InvalidLetter { path: PathBuf, key: String },
}

/// The categories of the letter-chain game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Animal,
    Food,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Animal, Category::Food];

    /// The file the category's words are stored in, relative to the bank directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Category::Animal => "animals.json",
            Category::Food => "foods.json",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Category::Animal => "animals",
            Category::Food => "foods",
        }
    }

    pub fn article(&self) -> &'static str {
        match self {
            Category::Animal => "an",
            Category::Food => "a",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Animal => write!(f, "animal"),
            Category::Food => write!(f, "food"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WordBank {
    lists: HashMap<Category, HashMap<char, Vec<String>>>,
}

impl WordBank {
    /// Loads `animals.json` and `foods.json` from `dir`.
    ///
    /// Each file holds a JSON object mapping an uppercase letter to an
    /// ordered array of words.
    pub fn load(dir: &Path) -> Result<Self, WordBankError> {
        let mut bank = Self::default();
        for category in Category::ALL {
            let path = dir.join(category.file_name());
            let content = std::fs::read_to_string(&path).map_err(|source| WordBankError::Read {
                path: path.clone(),
                source,
            })?;
            let raw: HashMap<String, Vec<String>> =
                serde_json::from_str(&content).map_err(|source| WordBankError::Parse {
                    path: path.clone(),
                    source,
                })?;

            let mut by_letter = HashMap::new();
            for (key, words) in raw {
                let letter = parse_letter(&key).ok_or_else(|| WordBankError::InvalidLetter {
                    path: path.clone(),
                    key: key.clone(),
                })?;
                by_letter.insert(letter, words);
            }
            bank.lists.insert(category, by_letter);
        }
        Ok(bank)
    }

    /// Builds a bank from in-memory lists.
    pub fn from_lists(lists: HashMap<Category, HashMap<char, Vec<String>>>) -> Self {
        let lists = lists
            .into_iter()
            .map(|(category, by_letter)| {
                let by_letter = by_letter
                    .into_iter()
                    .map(|(letter, words)| (letter.to_ascii_uppercase(), words))
                    .collect();
                (category, by_letter)
            })
            .collect();
        Self { lists }
    }

    /// The ordered candidate words for `letter`; empty if there are none.
    pub fn words(&self, category: Category, letter: char) -> &[String] {
        self.lists
            .get(&category)
            .and_then(|by_letter| by_letter.get(&letter.to_ascii_uppercase()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn parse_letter(key: &str) -> Option<char> {
    let mut chars = key.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}
