//! # samos NLP
//!
//! Name normalization and the two precomputed NLP tables:
//!
//! - [`TokenTable`] - raw element name to normalized, lemmatized tokens
//! - [`SynonymTable`] - unordered token pair to lexical similarity above a threshold
//!
//! Both are built once per run by [`NlpPreprocessor`] and handed to the
//! comparator inside an [`NlpCache`].
//!
//! ## Example
//!
//! ```rust
//! use samos_core::SynonymThreshold;
//! use samos_nlp::{NlpOptions, NlpPreprocessor, SynonymLexicon};
//! use std::sync::Arc;
//!
//! let mut lexicon = SynonymLexicon::new();
//! lexicon.add_pair("book", "publication", 0.85);
//!
//! let nlp = NlpPreprocessor::new(Arc::new(lexicon), NlpOptions::default());
//! let cache = nlp.precompute_names(["Books", "publication"], SynonymThreshold::Syn80);
//! assert_eq!(cache.tokens("Books").as_ref(), &["book".to_string()]);
//! assert_eq!(cache.synonym("book", "publication"), Some(0.85));
//! ```

pub mod error;
pub mod lemmatizer;
pub mod lexicon;
pub mod preprocessor;
pub mod tables;
pub mod tokenizer;

pub use error::{NlpError, Result};
pub use lemmatizer::lemmatize;
pub use lexicon::{Lexicon, NoLexicon, SynonymLexicon};
pub use preprocessor::{NlpOptions, NlpPreprocessor};
pub use tables::{normalize_tokens, NlpCache, SynonymTable, TokenTable};
pub use tokenizer::tokenize;
