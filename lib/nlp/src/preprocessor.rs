// Token and synonym precomputation over a feature folder
use crate::error::Result;
use crate::lexicon::Lexicon;
use crate::tables::{normalize_tokens, NlpCache, SynonymTable, TokenTable};
use rayon::prelude::*;
use samos_core::{Structure, SynonymThreshold};
use samos_storage::FeatureStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

// Scores within this distance of the threshold still pass, so 1.0 means exact match
const THRESHOLD_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NlpOptions {
    pub lemmatize: bool,
}

impl Default for NlpOptions {
    fn default() -> Self {
        Self { lemmatize: true }
    }
}

pub struct NlpPreprocessor {
    lexicon: Arc<dyn Lexicon>,
    options: NlpOptions,
}

impl NlpPreprocessor {
    pub fn new(lexicon: Arc<dyn Lexicon>, options: NlpOptions) -> Self {
        Self { lexicon, options }
    }

    /// Build both tables from every feature file of the store
    pub fn precompute(
        &self,
        store: &FeatureStore,
        structure: Structure,
        threshold: SynonymThreshold,
    ) -> Result<NlpCache> {
        let mut names = BTreeSet::new();
        let fragments = store.read_all(structure)?;
        for fragment in &fragments {
            for feature in &fragment.features {
                feature.for_each_name(&mut |name| {
                    names.insert(name.to_string());
                });
            }
        }
        debug!("collected {} distinct names from {} fragments", names.len(), fragments.len());
        Ok(self.precompute_names(names, threshold))
    }

    /// Build both tables from an explicit set of names
    pub fn precompute_names<I, S>(&self, names: I, threshold: SynonymThreshold) -> NlpCache
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = self.token_table(names);
        let synonyms = threshold
            .value()
            .map(|threshold| self.synonym_table(&tokens, threshold));
        NlpCache::new(tokens, synonyms, self.options.lemmatize)
    }

    pub fn token_table<I, S>(&self, names: I) -> TokenTable
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = TokenTable::new();
        for name in names {
            let name = name.as_ref();
            if !table.contains(name) {
                table.insert(name, normalize_tokens(name, self.options.lemmatize));
            }
        }
        info!("token table: {} names", table.len());
        table
    }

    /// Score every unordered pair of distinct tokens; pairs are sharded across threads
    pub fn synonym_table(&self, tokens: &TokenTable, threshold: f64) -> SynonymTable {
        let start = Instant::now();
        let words = tokens.distinct_tokens();
        let lexicon = &self.lexicon;

        let pairs: Vec<(usize, usize, f64)> = (0..words.len())
            .into_par_iter()
            .flat_map_iter(|i| {
                let words = &words;
                (i + 1..words.len()).filter_map(move |j| {
                    lexicon
                        .similarity(&words[i], &words[j])
                        .filter(|&score| score > 0.0 && score >= threshold - THRESHOLD_TOLERANCE)
                        .map(|score| (i, j, score))
                })
            })
            .collect();

        let mut table = SynonymTable::new(threshold);
        for (i, j, score) in pairs {
            table.insert(&words[i], &words[j], score);
        }
        info!(
            "synonym table: {} pairs over {} tokens at threshold {} in {:?}",
            table.len(),
            words.len(),
            threshold,
            start.elapsed()
        );
        table
    }
}
