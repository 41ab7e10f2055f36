//! # samos
//!
//! Statistical analysis of metamodel corpora: clustering and clone detection
//! of domain models through vector space models of structural features.
//!
//! ## Pipeline
//!
//! 1. **Extraction** - model graphs become unigrams, bigrams or labeled trees
//!    of typed names, one feature file per model or package fragment
//! 2. **NLP precomputation** - token and synonym tables over every name
//! 3. **VSM** - a document x vocabulary matrix filled with approximate,
//!    type-aware similarity scores, then type weights and IDF
//! 4. **Back end** - an external statistics program clusters or ranks clones
//!
//! ## Quick Start
//!
//! ```bash
//! samos cluster ./corpus ./corpus/hyper.json
//! samos clone ./corpus
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use samos::prelude::*;
//!
//! let config = Configuration::new("./models", "./work", Goal::Cluster);
//! let report = Pipeline::new(config).run_clustering().unwrap();
//! println!("{} rows", report.matrices[0].rows);
//! ```
//!
//! ## Crate Structure
//!
//! - `samos-core` - model graphs, features, parameters, sparse matrix
//! - `samos-storage` - feature folder, configuration, CSV/JSON export
//! - `samos-nlp` - tokenizer, lemmatizer, lexicon, token and synonym tables
//! - `samos-similarity` - feature comparator
//! - `samos-extract` - model loading and feature extraction
//! - `samos-vsm` - vocabulary, matrix fill, weighting

pub mod backend;
pub mod pipeline;

// Re-export core types
pub use samos_core::{
    Error, Feature, ModelGraph, Parameters, Result, Scope, SparseMatrix, Structure, Unit,
};

pub use samos_extract::{FeatureExtractor, JsonModelLoader, ModelLoader};
pub use samos_nlp::{Lexicon, NlpPreprocessor, SynonymLexicon};
pub use samos_similarity::FeatureComparator;
pub use samos_storage::{Configuration, FeatureStore, Goal};
pub use samos_vsm::{VsmBuilder, VsmReport};

pub use backend::{CommandBackend, StatsBackend};
pub use pipeline::{Pipeline, PipelineOptions, RunReport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CommandBackend, Configuration, Feature, FeatureComparator, FeatureExtractor,
        FeatureStore, Goal, JsonModelLoader, Lexicon, ModelGraph, ModelLoader, NlpPreprocessor,
        Parameters, Pipeline, PipelineOptions, RunReport, Scope, SparseMatrix, StatsBackend,
        Structure, SynonymLexicon, Unit, VsmBuilder, VsmReport,
    };
}
