//! # samos Core
//!
//! Core data model shared by every stage of the samos pipeline.
//!
//! This crate provides the fundamental types:
//!
//! - [`Feature`] - A dimension of the vector space (typed name, n-gram or labeled tree)
//! - [`Parameters`] - The frozen option record of one vector space model build
//! - [`WeightScheme`] - Type tag weight tables
//! - [`ModelGraph`] - The typed object graph a model loader produces
//! - [`SparseMatrix`] - Compressed-row document-by-vocabulary matrix
//!
//! ## Example
//!
//! ```rust
//! use samos_core::{Feature, Structure, WeightScheme};
//!
//! let feature = Feature::parse("EClass:book contains EAttribute:title", Structure::Bigram).unwrap();
//! assert_eq!(feature.head_kind(), Some("EClass"));
//! assert_eq!(WeightScheme::W1.weight("EAttribute"), Some(0.5));
//! ```

pub mod error;
pub mod feature;
pub mod matrix;
pub mod model;
pub mod params;
pub mod weights;

pub use error::{Error, Result};
pub use feature::{Feature, Gram, NGram, NTree, SimpleType, TypedFeature};
pub use matrix::{SparseMatrix, SparseRow};
pub use model::{Edge, EdgeKind, Element, ElementId, ElementKind, ModelGraph};
pub use params::{
    ContextMatch, Frequency, Idf, NgramComparison, Parameters, Scope, Structure, Synonym,
    SynonymThreshold, TypeMatch, Unit, VsmMode, WeightScheme,
};

/// Suffix of every feature file in a feature folder
pub const FEATURE_FILE_SUFFIX: &str = ".features";
