//! Feature comparator
//!
//! `compare(a, b)` composes, in order and short-circuiting:
//!
//! 1. head type match (strict equality or relaxed compatibility groups)
//! 2. name match per typed position (tokens, then synonyms)
//! 3. structural match (positional / sliding n-gram alignment, tree edit distance)
//! 4. context match on edge positions (strict zeroes, linear averages)
//! 5. clamp to [0, 1]
//!
//! Operands are put in a canonical order first, so the score is exactly
//! symmetric.

use crate::cache::{pair_key, score_cache, ScoreCache};
use crate::distance::{name_similarity, type_group, type_similarity};
use crate::tree_edit::tree_edit_distance;
use samos_core::{
    ContextMatch, Feature, Gram, NGram, NTree, NgramComparison, Parameters, Synonym, TypeMatch,
    TypedFeature,
};
use samos_nlp::NlpCache;
use std::sync::Arc;
use tracing::{debug, error};

pub struct FeatureComparator {
    params: Parameters,
    nlp: Arc<NlpCache>,
    cache: ScoreCache,
}

impl FeatureComparator {
    pub fn new(params: Parameters, nlp: Arc<NlpCache>) -> Self {
        let cache = score_cache(params.cache_capacity);
        Self { params, nlp, cache }
    }

    #[inline]
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Pruning key: features with different keys always compare to 0
    pub fn group_key<'a>(&self, feature: &'a Feature) -> &'a str {
        let head = feature.head_kind().unwrap_or("");
        match self.params.type_match {
            TypeMatch::Strict => head,
            TypeMatch::Relaxed => type_group(head),
        }
    }

    /// Similarity in [0, 1]
    pub fn compare(&self, a: &Feature, b: &Feature) -> f64 {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        let score = self.compare_ordered(a, b);
        if !(0.0..=1.0).contains(&score) {
            error!("similarity {} of {} and {} outside [0, 1], clamping", score, a, b);
            return if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        }
        score
    }

    /// `compare` memoized on the vocabulary indices of both operands
    pub fn compare_indexed(&self, ia: u32, a: &Feature, ib: u32, b: &Feature) -> f64 {
        if ia == ib {
            return self.compare(a, b);
        }
        let key = pair_key(ia, ib);
        if let Some(score) = self.cache.get(&key) {
            return score;
        }
        let score = self.compare(a, b);
        self.cache.insert(key, score);
        score
    }

    /// Log the cache size and drop every cached score
    pub fn clear_cache(&self) {
        debug!("comparator cache: {} entries", self.cache.entry_count());
        self.cache.invalidate_all();
    }

    fn compare_ordered(&self, a: &Feature, b: &Feature) -> f64 {
        if let (Some(ha), Some(hb)) = (a.head_kind(), b.head_kind()) {
            if self.type_score(ha, hb) == 0.0 {
                return 0.0;
            }
        }
        match (a, b) {
            (Feature::NGram(x), Feature::NGram(y)) => self.ngram_similarity(x, y),
            (Feature::NTree(x), Feature::NTree(y)) => self.tree_similarity(x, y),
            (Feature::Typed(x), Feature::Typed(y)) => self.typed_similarity(x, y),
            (Feature::Simple(x), Feature::Simple(y)) => self.type_score(&x.kind, &y.kind),
            _ => 0.0,
        }
    }

    #[inline]
    fn synonym_mode(&self) -> Synonym {
        if self.params.synonyms_enabled() {
            self.params.synonym
        } else {
            Synonym::None
        }
    }

    #[inline]
    fn type_score(&self, a: &str, b: &str) -> f64 {
        type_similarity(a, b, self.params.type_match, self.params.relaxed_type_penalty)
    }

    /// Position score: type score for edges, type score times name score for atoms
    pub fn gram_similarity(&self, a: &Gram, b: &Gram) -> f64 {
        match (a, b) {
            (Gram::Simple(x), Gram::Simple(y)) => self.type_score(&x.kind, &y.kind),
            (Gram::Typed(x), Gram::Typed(y)) => self.typed_similarity(x, y),
            _ => 0.0,
        }
    }

    fn typed_similarity(&self, a: &TypedFeature, b: &TypedFeature) -> f64 {
        let t = self.type_score(&a.kind, &b.kind);
        if t == 0.0 {
            return 0.0;
        }
        t * name_similarity(&a.name, &b.name, self.synonym_mode(), &self.nlp)
    }

    /// Sum of counted position scores of two equal-length windows, `None` when
    /// strict context rejects the alignment
    fn window_score(&self, a: &[Gram], b: &[Gram]) -> Option<f64> {
        let mut sum = 0.0;
        for (x, y) in a.iter().zip(b) {
            let s = self.gram_similarity(x, y);
            let edge = x.is_edge() || y.is_edge();
            match self.params.context_match {
                ContextMatch::Strict if edge => {
                    if s < 1.0 {
                        return None;
                    }
                }
                _ => sum += s,
            }
        }
        Some(sum)
    }

    /// Positions that count towards the mean
    fn counted_positions(&self, grams: &[Gram]) -> usize {
        match self.params.context_match {
            ContextMatch::Strict => grams.iter().filter(|g| !g.is_edge()).count(),
            ContextMatch::Linear => grams.len(),
        }
    }

    pub fn ngram_similarity(&self, a: &NGram, b: &NGram) -> f64 {
        let (ga, gb) = (a.grams(), b.grams());
        if ga.len() == gb.len() {
            return self.aligned(ga, gb);
        }
        if self.params.ngram_comparison == NgramComparison::Fixed {
            return 0.0;
        }

        let (short, long) = if ga.len() < gb.len() { (ga, gb) } else { (gb, ga) };
        let denominator = self.counted_positions(long);
        if denominator == 0 {
            return 0.0;
        }
        let mut best = 0.0f64;
        for offset in 0..=long.len() - short.len() {
            if let Some(sum) = self.window_score(short, &long[offset..offset + short.len()]) {
                best = best.max(sum / denominator as f64);
            }
        }
        best
    }

    fn aligned(&self, a: &[Gram], b: &[Gram]) -> f64 {
        match self.window_score(a, b) {
            None => 0.0,
            Some(sum) => match self.counted_positions(a) {
                // edge-only n-grams that passed strict context
                0 => 1.0,
                n => sum / n as f64,
            },
        }
    }

    /// `1 - ted / max(|A|, |B|)` with rename cost `1 - ngram_similarity`
    pub fn tree_similarity(&self, a: &NTree, b: &NTree) -> f64 {
        let largest = a.size().max(b.size()) as f64;
        let distance = tree_edit_distance(a, b, |x, y| 1.0 - self.ngram_similarity(x, y));
        (1.0 - distance / largest).max(0.0)
    }
}
