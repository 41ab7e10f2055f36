//! Token and synonym tables
//!
//! Both tables are filled once by the preprocessor and read-only afterwards.
//! [`NlpCache`] bundles them for the comparator.

use crate::lemmatizer::lemmatize;
use crate::tokenizer::tokenize;
use ahash::AHashMap;
use std::borrow::Cow;

/// Tokenize a name and optionally lemmatize each token
pub fn normalize_tokens(name: &str, lemmatize_tokens: bool) -> Vec<String> {
    let tokens = tokenize(name);
    if lemmatize_tokens {
        tokens.iter().map(|t| lemmatize(t)).collect()
    } else {
        tokens
    }
}

/// Raw name -> normalized tokens
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    entries: AHashMap<String, Vec<String>>,
}

impl TokenTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw: impl Into<String>, tokens: Vec<String>) {
        self.entries.insert(raw.into(), tokens);
    }

    #[inline]
    pub fn get(&self, raw: &str) -> Option<&[String]> {
        self.entries.get(raw).map(Vec::as_slice)
    }

    #[inline]
    pub fn contains(&self, raw: &str) -> bool {
        self.entries.contains_key(raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct tokens over every entry, sorted
    pub fn distinct_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.entries.values().flatten().cloned().collect();
        tokens.sort_unstable();
        tokens.dedup();
        tokens
    }
}

/// Unordered token pair -> similarity in (0, 1]; identity pairs are implicit
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    threshold: f64,
    entries: AHashMap<(String, String), f64>,
}

impl SynonymTable {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            entries: AHashMap::new(),
        }
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Store a pair; identity pairs and non-positive scores are ignored
    pub fn insert(&mut self, a: &str, b: &str, score: f64) {
        if a == b || score <= 0.0 {
            return;
        }
        self.entries.insert(key(a, b), score.min(1.0));
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        if a == b {
            return Some(1.0);
        }
        self.entries.get(&key(a, b)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Read-only NLP state shared by every comparison of one run
#[derive(Debug, Clone, Default)]
pub struct NlpCache {
    tokens: TokenTable,
    synonyms: Option<SynonymTable>,
    lemmatize: bool,
}

impl NlpCache {
    #[must_use]
    pub fn new(tokens: TokenTable, synonyms: Option<SynonymTable>, lemmatize: bool) -> Self {
        Self {
            tokens,
            synonyms,
            lemmatize,
        }
    }

    /// Cache without tables; names are tokenized on demand
    #[must_use]
    pub fn empty(lemmatize: bool) -> Self {
        Self::new(TokenTable::new(), None, lemmatize)
    }

    /// Tokens of a name, tokenized on the fly when the table has no entry
    pub fn tokens<'a>(&'a self, name: &str) -> Cow<'a, [String]> {
        match self.tokens.get(name) {
            Some(tokens) => Cow::Borrowed(tokens),
            None => Cow::Owned(normalize_tokens(name, self.lemmatize)),
        }
    }

    /// Similarity of two tokens, `None` without a synonym table or entry
    #[inline]
    pub fn synonym(&self, a: &str, b: &str) -> Option<f64> {
        self.synonyms.as_ref().and_then(|table| table.get(a, b))
    }

    #[inline]
    pub fn has_synonyms(&self) -> bool {
        self.synonyms.is_some()
    }

    pub fn token_table(&self) -> &TokenTable {
        &self.tokens
    }

    pub fn synonym_table(&self) -> Option<&SynonymTable> {
        self.synonyms.as_ref()
    }
}
