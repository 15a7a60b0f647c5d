//! Free-text normalization for classification input.
//!
//! Text is lower-cased, split with a BERT-style word/punctuation
//! pre-tokenizer, filtered, and re-joined with single spaces.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use labeler_core::records::{RecordError, RecordSet};
use labeler_core::schema::predicted;
use tokenizers::pre_tokenizers::PreTokenizerWrapper;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer, Tokenizer};
use tracing::{debug, info, warn};

use crate::lexicon::{Lexicon, LexiconError, PRONOUN_LEMMA};

const LEXICON_FILE: &str = "lexicon.json";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Stateless text cleaner. Cheap to share across a run.
#[derive(Debug, Clone)]
pub struct Normalizer {
    lexicon: Lexicon,
    pre_tokenizer: PreTokenizerWrapper,
}

impl Normalizer {
    /// Built-in English lexicon with the BERT pre-tokenizer.
    pub fn english() -> Self {
        Self::new(Lexicon::english(), BertPreTokenizer.into())
    }

    pub fn new(lexicon: Lexicon, pre_tokenizer: PreTokenizerWrapper) -> Self {
        Self {
            lexicon,
            pre_tokenizer,
        }
    }

    /// Load resources from a directory.
    ///
    /// `lexicon.json` replaces the built-in word sets and the pre-tokenizer of
    /// `tokenizer.json` replaces the BERT default. Either file may be absent,
    /// but a file that is present must load.
    pub fn load(dir: &Path) -> Result<Self, LexiconError> {
        if !dir.is_dir() {
            return Err(LexiconError::MissingDir(dir.to_path_buf()));
        }

        let lexicon_path = dir.join(LEXICON_FILE);
        let lexicon = if lexicon_path.exists() {
            Lexicon::from_file(&lexicon_path)?
        } else {
            Lexicon::english()
        };

        let tokenizer_path = dir.join(TOKENIZER_FILE);
        let pre_tokenizer = if tokenizer_path.exists() {
            load_pre_tokenizer(&tokenizer_path)?
        } else {
            BertPreTokenizer.into()
        };

        info!(dir = %dir.display(), "loaded normalizer resources");
        Ok(Self::new(lexicon, pre_tokenizer))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Normalize one text. Returns `""` when no token survives.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        self.tokens(&lowered)
            .into_iter()
            .filter(|token| self.keep(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Normalize every row of `text_column`, in record order.
    pub fn normalize_column(
        &self,
        records: &RecordSet,
        text_column: &str,
    ) -> Result<Vec<String>, RecordError> {
        let texts = records.texts(text_column)?;
        let cleaned: Vec<String> = texts.iter().map(|t| self.normalize(t)).collect();
        let empty = cleaned.iter().filter(|c| c.is_empty()).count();
        debug!(rows = cleaned.len(), empty, "normalized text column");
        Ok(cleaned)
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        let mut pretokenized = PreTokenizedString::from(text);
        let pieces: Vec<String> = match self.pre_tokenizer.pre_tokenize(&mut pretokenized) {
            Ok(()) => pretokenized
                .get_splits(OffsetReferential::Original, OffsetType::Char)
                .into_iter()
                .map(|(token, _, _)| token.to_string())
                .collect(),
            Err(e) => {
                warn!(error = %e, "pre-tokenizer failed, splitting on whitespace");
                text.split_whitespace().map(str::to_string).collect()
            }
        };
        join_clitics(pieces)
    }

    fn keep(&self, token: &str) -> bool {
        !(token.chars().all(char::is_whitespace)
            || self.lexicon.like_num(token)
            || token.chars().count() < 2
            || self.lexicon.is_stop(token)
            || self.lexicon.lemma(token) == PRONOUN_LEMMA)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::english()
    }
}

/// Reattach English clitics split off by punctuation-aware pre-tokenizers.
///
/// `doesn ' t` becomes `does n't`, `we ' ll` becomes `we 'll`. Tokens that
/// still contain an apostrophe (whitespace pre-tokenizers) are split first.
/// Irregular negation stems are replaced by their full form (`wo` → `will`).
fn join_clitics(tokens: Vec<String>) -> Vec<String> {
    let pieces: Vec<String> = tokens
        .into_iter()
        .flat_map(|token| {
            if token.chars().count() > 1 && token.contains(is_apostrophe) {
                split_keeping_apostrophes(&token)
            } else {
                vec![token]
            }
        })
        .collect();

    let mut out: Vec<String> = Vec::with_capacity(pieces.len());
    let mut i = 0;
    while i < pieces.len() {
        let clitic = pieces.get(i + 1).map(String::as_str);
        let attaches = pieces[i].chars().all(is_apostrophe)
            && pieces[i].chars().count() == 1
            && clitic.is_some_and(|c| CLITICS.contains(&c))
            && out
                .last()
                .is_some_and(|prev| prev.chars().all(char::is_alphabetic));
        if !attaches {
            out.push(pieces[i].clone());
            i += 1;
            continue;
        }

        let clitic = clitic.unwrap_or_default();
        match out.last_mut() {
            Some(stem) if clitic == "t" && stem.ends_with('n') && stem.chars().count() > 1 => {
                stem.pop();
                let full = NEGATION_STEMS
                    .iter()
                    .find(|(short, _)| *short == stem.as_str())
                    .map(|(_, full)| *full);
                if let Some(full) = full {
                    *stem = full.to_string();
                }
                out.push("n't".to_string());
            }
            _ => out.push(format!("'{clitic}")),
        }
        i += 2;
    }
    out
}

const CLITICS: &[&str] = &["t", "s", "d", "m", "ll", "ve", "re"];

const NEGATION_STEMS: &[(&str, &str)] = &[
    ("ca", "can"),
    ("wo", "will"),
    ("sha", "shall"),
    ("ai", "is"),
];

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}')
}

fn split_keeping_apostrophes(token: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    for c in token.chars() {
        if is_apostrophe(c) {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            parts.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Append `cleaned` to `records` as a `Utf8` column named `column`.
pub fn attach_cleaned(
    records: &RecordSet,
    cleaned: Vec<String>,
    column: &str,
) -> Result<RecordSet, RecordError> {
    let array: ArrayRef = Arc::new(StringArray::from(cleaned));
    records.with_column(predicted::cleaned_field(column), array)
}

fn load_pre_tokenizer(path: &Path) -> Result<PreTokenizerWrapper, LexiconError> {
    let fail = |message: String| LexiconError::Tokenizer {
        path: path.to_path_buf(),
        message,
    };

    let tokenizer = Tokenizer::from_file(path).map_err(|e| fail(e.to_string()))?;
    let pre_tokenizer = tokenizer
        .get_pre_tokenizer()
        .cloned()
        .ok_or_else(|| fail("tokenizer has no pre-tokenizer".to_string()))?;

    // Surface configuration errors at load time rather than mid-run.
    let mut probe = PreTokenizedString::from("probe text, 42.");
    pre_tokenizer
        .pre_tokenize(&mut probe)
        .map_err(|e| fail(e.to_string()))?;

    Ok(pre_tokenizer)
}
