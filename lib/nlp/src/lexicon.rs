//! Lexical databases
//!
//! A [`Lexicon`] answers "how similar are these two words" with a score in
//! `[0, 1]`, or `None` when it does not know one of them. A miss is not an
//! error: it simply produces no synonym entry.

use crate::error::{NlpError, Result};
use ahash::AHashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

pub trait Lexicon: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> Option<f64>;
}

/// Lexicon that knows no words
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLexicon;

impl Lexicon for NoLexicon {
    fn similarity(&self, _a: &str, _b: &str) -> Option<f64> {
        None
    }
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    groups: Vec<Vec<String>>,
    #[serde(default)]
    pairs: Vec<ScoredPair>,
}

#[derive(Debug, Deserialize)]
struct ScoredPair {
    a: String,
    b: String,
    score: f64,
}

/// Synonym groups plus explicitly scored word pairs
///
/// Words in one group score 1.0 with each other. Explicit pairs take
/// precedence over groups. Two known words without a relation score 0.0.
#[derive(Debug, Clone, Default)]
pub struct SynonymLexicon {
    groups: AHashMap<String, Vec<usize>>,
    pairs: AHashMap<(String, String), f64>,
    next_group: usize,
}

fn ordered(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl SynonymLexicon {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: LexiconFile = serde_json::from_str(text)?;
        let mut lexicon = Self::new();
        for group in &file.groups {
            lexicon.add_group(group.iter().map(String::as_str));
        }
        for pair in &file.pairs {
            if !(0.0..=1.0).contains(&pair.score) {
                return Err(NlpError::Lexicon(format!(
                    "score {} for ({}, {}) is outside [0, 1]",
                    pair.score, pair.a, pair.b
                )));
            }
            lexicon.add_pair(&pair.a, &pair.b, pair.score);
        }
        Ok(lexicon)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let lexicon = Self::from_json(&fs::read_to_string(path)?)?;
        info!(
            "loaded lexicon {:?}: {} words, {} scored pairs",
            path,
            lexicon.groups.len(),
            lexicon.pairs.len()
        );
        Ok(lexicon)
    }

    pub fn add_group<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        let id = self.next_group;
        self.next_group += 1;
        for word in words {
            let groups = self.groups.entry(word.to_lowercase()).or_default();
            if !groups.contains(&id) {
                groups.push(id);
            }
        }
    }

    pub fn add_pair(&mut self, a: &str, b: &str, score: f64) {
        let (a, b) = (a.to_lowercase(), b.to_lowercase());
        self.groups.entry(a.clone()).or_default();
        self.groups.entry(b.clone()).or_default();
        self.pairs.insert(ordered(&a, &b), score);
    }

    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.groups.contains_key(word)
    }
}

impl Lexicon for SynonymLexicon {
    fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        let (ga, gb) = (self.groups.get(a)?, self.groups.get(b)?);
        if a == b {
            return Some(1.0);
        }
        if let Some(&score) = self.pairs.get(&ordered(a, b)) {
            return Some(score);
        }
        if ga.iter().any(|g| gb.contains(g)) {
            return Some(1.0);
        }
        Some(0.0)
    }
}
