//! # samos Extract
//!
//! Turns model graphs into feature files.
//!
//! - [`ModelLoader`] - the seam to model files, with the bundled [`JsonModelLoader`]
//! - [`FeatureExtractor`] - unigrams, bigrams or labeled trees per model or per package fragment
//!
//! ## Example
//!
//! ```rust
//! use samos_core::{Edge, EdgeKind, Element, ElementKind, ModelGraph, Scope, Structure, Unit};
//! use samos_extract::FeatureExtractor;
//!
//! let model = ModelGraph::new("library")
//!     .with_element(Element::new("c", ElementKind::EClass, "Book"))
//!     .with_element(Element::new("a", ElementKind::EAttribute, "title"))
//!     .with_edge(Edge::new("c", EdgeKind::Contains, "a"));
//!
//! let fragments = FeatureExtractor::default()
//!     .extract(&model, "library", Scope::Model, Unit::Name, Structure::Bigram)
//!     .unwrap();
//! assert_eq!(fragments["library"][0].to_string(), "EClass:book contains EAttribute:title");
//! ```

pub mod error;
pub mod extractor;
pub mod loader;

pub use error::{ExtractError, Result};
pub use extractor::{effective_size, ExtractOptions, ExtractionReport, FeatureExtractor, FragmentMap};
pub use loader::{list_model_files, JsonModelLoader, ModelLoader};
