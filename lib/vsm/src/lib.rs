//! # samos VSM
//!
//! Builds the document x vocabulary matrix from a feature folder.
//!
//! - [`Vocabulary`] - insertion-ordered intern set, positions are columns
//! - [`VsmBuilder`] - quadratic approximate or linear exact term frequencies
//! - [`TypeWeighter`] / [`idf_factors`] - column weighting
//!
//! ## Example
//!
//! ```rust
//! use samos_core::{Feature, Idf, Parameters, Structure, WeightScheme};
//! use samos_nlp::NlpCache;
//! use samos_storage::FeatureStore;
//! use samos_vsm::VsmBuilder;
//! use std::sync::Arc;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = FeatureStore::new(dir.path().join("features"));
//! store.create().unwrap();
//! let book = Feature::parse("EClass:book", Structure::Unigram).unwrap();
//! store.write_fragment("a", &[book.clone()]).unwrap();
//! store.write_fragment("b", &[book]).unwrap();
//!
//! let params = Parameters {
//!     weight: WeightScheme::Raw,
//!     idf: Idf::None,
//!     ..Parameters::default()
//! };
//! let report = VsmBuilder::new(params, Arc::new(NlpCache::empty(true)))
//!     .unwrap()
//!     .build(&store, &dir.path().join("vsm"), "cluster")
//!     .unwrap();
//! assert_eq!((report.rows, report.columns), (2, 1));
//! ```

pub mod builder;
pub mod error;
pub mod vocabulary;
pub mod weighting;

pub use builder::{Corpus, VsmBuilder, VsmReport};
pub use error::{Result, VsmError};
pub use vocabulary::Vocabulary;
pub use weighting::{idf_factors, TypeWeighter};
