//! # samos Similarity
//!
//! Type-aware approximate comparison of vector space features.
//!
//! ## Features
//!
//! - **Type matching**: strict tag equality or relaxed compatibility groups with a penalty
//! - **Name matching**: token equality plus synonym lookup (positional or bag alignment)
//! - **N-gram alignment**: fixed positional or sliding, with strict or linear edge context
//! - **Tree edit distance**: Zhang-Shasha over n-gram labeled trees
//! - **Score cache**: bounded concurrent `moka` cache keyed by interned vocabulary indices
//!
//! ## Example
//!
//! ```rust
//! use samos_core::{Feature, Parameters, Structure, Synonym, TypeMatch};
//! use samos_nlp::NlpCache;
//! use samos_similarity::FeatureComparator;
//! use std::sync::Arc;
//!
//! let params = Parameters {
//!     type_match: TypeMatch::Relaxed,
//!     synonym: Synonym::None,
//!     ..Parameters::default()
//! };
//! let comparator = FeatureComparator::new(params, Arc::new(NlpCache::empty(true)));
//!
//! let class = Feature::parse("EClass:book", Structure::Unigram).unwrap();
//! let enumeration = Feature::parse("EEnum:books", Structure::Unigram).unwrap();
//! assert_eq!(comparator.compare(&class, &class), 1.0);
//! assert_eq!(comparator.compare(&class, &enumeration), 0.5);
//! ```

pub mod cache;
pub mod comparator;
pub mod distance;
pub mod tree_edit;

pub use cache::{score_cache, ScoreCache};
pub use comparator::FeatureComparator;
pub use distance::{name_similarity, type_group, type_similarity};
pub use tree_edit::tree_edit_distance;
