//! Type and name similarity functions
//!
//! The building blocks of feature comparison. All functions return a
//! similarity score in range [0.0, 1.0] where 1.0 means identical.

use samos_core::weights::{CONTAINS, REFERENCES};
use samos_core::{Synonym, TypeMatch};
use samos_nlp::NlpCache;

/// Compatibility group of a type tag under relaxed type matching
///
/// Tags outside every group form a group of their own.
pub fn type_group(tag: &str) -> &str {
    match tag {
        "EAttribute" | "EReference" => "structural-feature",
        "EClass" | "EEnum" | "EDataType" => "classifier",
        CONTAINS | REFERENCES => "association",
        other => other,
    }
}

/// Calculate type tag similarity
///
/// Equal tags score 1. Under relaxed matching, different tags of one
/// compatibility group score `penalty`.
pub fn type_similarity(a: &str, b: &str, mode: TypeMatch, penalty: f64) -> f64 {
    if a == b {
        return 1.0;
    }
    match mode {
        TypeMatch::Strict => 0.0,
        TypeMatch::Relaxed => {
            if type_group(a) == type_group(b) {
                penalty
            } else {
                0.0
            }
        }
    }
}

/// Similarity of two normalized tokens: 1 if equal, else the synonym table value
#[inline]
pub fn token_similarity(a: &str, b: &str, nlp: &NlpCache) -> f64 {
    if a == b {
        1.0
    } else {
        nlp.synonym(a, b).unwrap_or(0.0)
    }
}

/// Calculate name similarity between two element names
///
/// An absent name (type-only unit) matches anything. Identical names or
/// identical token lists score 1. Otherwise synonyms decide:
///
/// * `Reduced` - token lists of equal length, positional mean of token similarities
/// * `Full` - bag alignment, mean of the best-match averages in both directions
/// * `None` - 0
pub fn name_similarity(a: &str, b: &str, mode: Synonym, nlp: &NlpCache) -> f64 {
    if a.is_empty() || b.is_empty() || a == b {
        return 1.0;
    }
    let (ta, tb) = (nlp.tokens(a), nlp.tokens(b));
    if ta == tb {
        return 1.0;
    }
    if !nlp.has_synonyms() {
        return 0.0;
    }

    match mode {
        Synonym::None => 0.0,
        Synonym::Reduced => {
            if ta.len() != tb.len() || ta.is_empty() {
                return 0.0;
            }
            let sum: f64 = ta
                .iter()
                .zip(tb.iter())
                .map(|(x, y)| token_similarity(x, y, nlp))
                .sum();
            sum / ta.len() as f64
        }
        Synonym::Full => {
            if ta.is_empty() || tb.is_empty() {
                return 0.0;
            }
            let forward = best_match_average(&ta, &tb, nlp);
            let backward = best_match_average(&tb, &ta, nlp);
            ((forward + backward) / 2.0).min(1.0)
        }
    }
}

fn best_match_average(from: &[String], to: &[String], nlp: &NlpCache) -> f64 {
    let sum: f64 = from
        .iter()
        .map(|x| {
            to.iter()
                .map(|y| token_similarity(x, y, nlp))
                .fold(0.0, f64::max)
        })
        .sum();
    sum / from.len() as f64
}
