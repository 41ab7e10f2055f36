//! Column weighting
//!
//! Type weights derive one factor per vocabulary entry from its type tags.
//! IDF derives one factor per column from its document frequency.

use crate::vocabulary::Vocabulary;
use ahash::AHashSet;
use samos_core::weights::is_weighted_edge;
use samos_core::{Feature, Gram, Idf, NGram, NTree, SparseMatrix, WeightScheme};
use tracing::{error, warn};

/// Per-build weight lookup; unknown tags weigh 1.0 and are reported once
#[derive(Debug)]
pub struct TypeWeighter {
    scheme: WeightScheme,
    warned: AHashSet<String>,
}

impl TypeWeighter {
    pub fn new(scheme: WeightScheme) -> Self {
        Self {
            scheme,
            warned: AHashSet::new(),
        }
    }

    pub fn tag_weight(&mut self, tag: &str) -> f64 {
        match self.scheme.weight(tag) {
            Some(w) => w,
            None => {
                if self.warned.insert(tag.to_string()) {
                    warn!("no {} weight for type tag '{}', using 1.0", self.scheme, tag);
                }
                1.0
            }
        }
    }

    pub fn feature_weight(&mut self, feature: &Feature) -> f64 {
        match feature {
            Feature::Simple(s) => self.tag_weight(&s.kind),
            Feature::Typed(t) => self.tag_weight(&t.kind),
            Feature::NGram(n) => self.ngram_weight(n),
            Feature::NTree(t) => self.tree_weight(t),
        }
    }

    /// Mean of content weights; a weighted edge stands in for the position after it
    pub fn ngram_weight(&mut self, ngram: &NGram) -> f64 {
        let grams = ngram.grams();
        let (mut sum, mut terms) = (0.0, 0usize);
        let mut i = 0;
        while i < grams.len() {
            let gram = &grams[i];
            if gram.is_edge() {
                if is_weighted_edge(gram.kind()) {
                    sum += self.tag_weight(gram.kind());
                    terms += 1;
                    i += 2;
                    continue;
                }
            } else {
                sum += self.tag_weight(gram.kind());
                terms += 1;
            }
            i += 1;
        }
        if terms == 0 {
            1.0
        } else {
            sum / terms as f64
        }
    }

    /// Root weight plus one term per child, averaged
    ///
    /// A child reached over a weighted edge contributes the edge weight,
    /// any other child contributes its own type weight.
    pub fn tree_weight(&mut self, tree: &NTree) -> f64 {
        let mut sum = self.ngram_weight(&tree.node);
        for child in &tree.children {
            let grams = child.node.grams();
            let edge = grams.iter().find(|g| g.is_edge()).map(Gram::kind);
            let content = grams.iter().find(|g| !g.is_edge()).map(Gram::kind);
            sum += match (edge, content) {
                (Some(edge), _) if is_weighted_edge(edge) => self.tag_weight(edge),
                (_, Some(content)) => self.tag_weight(content),
                (Some(edge), None) => self.tag_weight(edge),
                (None, None) => 1.0,
            };
        }
        sum / (1 + tree.children.len()) as f64
    }

    pub fn column_weights(&mut self, vocabulary: &Vocabulary) -> Vec<f64> {
        vocabulary.iter().map(|f| self.feature_weight(f)).collect()
    }
}

/// IDF factor per column; a column with no positive cell is reported and zeroed
pub fn idf_factors(matrix: &SparseMatrix, idf: Idf) -> Vec<f64> {
    let documents = matrix.row_count() as f64;
    matrix
        .document_frequencies()
        .into_iter()
        .enumerate()
        .map(|(column, df)| {
            if df == 0 {
                error!("column {} has document frequency 0", column);
                return 0.0;
            }
            let ratio = documents / df as f64;
            match idf {
                Idf::None => 1.0,
                Idf::Log => ratio.log10(),
                Idf::NormLog => (1.0 + ratio).log10(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use samos_core::Structure;

    fn feature(line: &str, structure: Structure) -> Feature {
        Feature::parse(line, structure).unwrap()
    }

    #[test]
    fn test_unigram_weights() {
        let mut w = TypeWeighter::new(WeightScheme::W1);
        assert_eq!(w.feature_weight(&feature("EPackage:lib", Structure::Unigram)), 1.0);
        assert_eq!(w.feature_weight(&feature("EParameter:x", Structure::Unigram)), 0.1);

        let mut w = TypeWeighter::new(WeightScheme::W2);
        assert_eq!(w.feature_weight(&feature("EPackage:lib", Structure::Unigram)), 2.0);
    }

    #[test]
    fn test_unknown_tag_defaults_to_one() {
        let mut w = TypeWeighter::new(WeightScheme::W1);
        assert_eq!(w.feature_weight(&feature("EAnnotation:x", Structure::Unigram)), 1.0);
        assert_eq!(w.feature_weight(&feature("EAnnotation:y", Structure::Unigram)), 1.0);
        assert_eq!(w.warned.len(), 1);
    }

    #[test]
    fn test_bigram_weights() {
        let mut w = TypeWeighter::new(WeightScheme::W1);
        // contains passes through: (EClass + EAttribute) / 2
        assert_eq!(
            w.feature_weight(&feature("EClass:a contains EAttribute:b", Structure::Bigram)),
            0.75
        );
        // has-supertype replaces its target: (EClass + has-supertype) / 2
        assert_eq!(
            w.feature_weight(&feature("EClass:a has-supertype EClass:b", Structure::Bigram)),
            0.6
        );
        // (EOperation + throws) / 2
        assert_eq!(
            w.feature_weight(&feature("EOperation:a throws EClass:b", Structure::Bigram)),
            (0.3 + 0.1) / 2.0
        );
    }

    #[test]
    fn test_tree_weights() {
        let mut w = TypeWeighter::new(WeightScheme::W1);
        let tree = feature(
            r#"{"node":"EClass:book","children":[{"node":"contains EAttribute:title"},{"node":"has-supertype EClass:item"}]}"#,
            Structure::NTree,
        );
        assert_eq!(w.feature_weight(&tree), (1.0 + 0.5 + 0.2) / 3.0);

        let leaf = feature(r#"{"node":"EParameter:x"}"#, Structure::NTree);
        assert_eq!(w.feature_weight(&leaf), 0.1);
    }

    #[test]
    fn test_idf_factors() {
        let m = SparseMatrix::from_rows(
            vec![vec![(0, 1.0)], vec![(0, 1.0)], vec![(0, 1.0), (1, 1.0)]],
            3,
        )
        .unwrap();

        let log = idf_factors(&m, Idf::Log);
        assert_eq!(log[0], 0.0);
        assert_eq!(log[1], 3f64.log10());
        assert_eq!(log[2], 0.0);

        let norm = idf_factors(&m, Idf::NormLog);
        assert_eq!(norm[0], 2f64.log10());
        assert_eq!(norm[1], 4f64.log10());
        assert!(norm[0] < norm[1]);
    }
}
