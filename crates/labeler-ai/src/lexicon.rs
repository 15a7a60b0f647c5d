//! Closed English word sets used by the normalizer: stop words, pronoun
//! forms (all lemmatized to [`PRONOUN_LEMMA`]) and number words.
//!
//! The built-in set is compiled into the binary. A resource directory may
//! override it with a `lexicon.json`:
//!
//! ```json
//! {"stop_words": ["the", "a"], "pronouns": ["i", "me"], "number_words": ["one"]}
//! ```
//!
//! `number_words` is optional and falls back to the built-in English list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Lemma shared by every personal, possessive and reflexive pronoun form.
pub const PRONOUN_LEMMA: &str = "-PRON-";

const EN_STOP_WORDS: &str = include_str!("../resources/en/stop_words.txt");
const EN_PRONOUNS: &str = include_str!("../resources/en/pronouns.txt");
const EN_NUMBER_WORDS: &str = include_str!("../resources/en/number_words.txt");

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("resource directory not found: {0}")]
    MissingDir(PathBuf),
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("load pre-tokenizer from {path}: {message}")]
    Tokenizer { path: PathBuf, message: String },
}

#[derive(Deserialize)]
struct LexiconFile {
    stop_words: Vec<String>,
    pronouns: Vec<String>,
    #[serde(default)]
    number_words: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    stop_words: HashSet<String>,
    pronouns: HashSet<String>,
    number_words: HashSet<String>,
}

impl Lexicon {
    pub fn english() -> Self {
        Self {
            stop_words: words(EN_STOP_WORDS),
            pronouns: words(EN_PRONOUNS),
            number_words: words(EN_NUMBER_WORDS),
        }
    }

    /// Read a `lexicon.json` file.
    pub fn from_file(path: &Path) -> Result<Self, LexiconError> {
        let json = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: LexiconFile =
            serde_json::from_str(&json).map_err(|source| LexiconError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let lexicon = Self {
            stop_words: lowered(file.stop_words),
            pronouns: lowered(file.pronouns),
            number_words: match file.number_words {
                Some(list) => lowered(list),
                None => words(EN_NUMBER_WORDS),
            },
        };
        info!(
            path = %path.display(),
            stop_words = lexicon.stop_words.len(),
            pronouns = lexicon.pronouns.len(),
            "loaded lexicon"
        );
        Ok(lexicon)
    }

    pub fn is_stop(&self, token: &str) -> bool {
        self.stop_words.contains(&token.to_lowercase())
    }

    /// Lemma of `token`: [`PRONOUN_LEMMA`] for pronoun forms, the lower-cased
    /// token otherwise.
    pub fn lemma(&self, token: &str) -> String {
        let lower = token.to_lowercase();
        if self.pronouns.contains(&lower) {
            PRONOUN_LEMMA.to_string()
        } else {
            lower
        }
    }

    /// Whether `token` reads as a number: digits (with an optional sign and
    /// `,`/`.` separators), a `digits/digits` fraction, a number or ordinal
    /// word, or a digit ordinal like `2nd`.
    pub fn like_num(&self, token: &str) -> bool {
        let text = token
            .strip_prefix(['+', '-', '~', '±'])
            .unwrap_or(token)
            .replace([',', '.'], "");
        if is_digits(&text) {
            return true;
        }
        if let Some((num, denom)) = text.split_once('/')
            && !denom.contains('/')
            && is_digits(num)
            && is_digits(denom)
        {
            return true;
        }

        let lower = text.to_lowercase();
        if self.number_words.contains(&lower) {
            return true;
        }
        ["st", "nd", "rd", "th"]
            .iter()
            .any(|suffix| lower.strip_suffix(suffix).is_some_and(is_digits))
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::english()
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn words(list: &str) -> HashSet<String> {
    list.split_whitespace().map(str::to_lowercase).collect()
}

fn lowered(list: Vec<String>) -> HashSet<String> {
    list.into_iter().map(|w| w.to_lowercase()).collect()
}
