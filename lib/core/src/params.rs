//! Run parameters
//!
//! Every option is a closed enumeration. A [`Parameters`] record is frozen
//! before a vector space model is built; the presets mirror the standard
//! clustering and clone detection settings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[inline]
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.to_ascii_lowercase().as_str() {
                    $( $text $(| $alias)* => Ok($name::$variant), )+
                    _ => Err(Error::UnknownOption {
                        option: $label,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

option_enum! {
    /// Whole models or per-package fragments
    Scope as "scope" {
        Model => "model",
        Fragment => "fragment",
    }
}

option_enum! {
    /// What an element contributes to a feature
    Unit as "unit" {
        Name => "name",
        Type => "type",
        NameType => "name-type" | "nametype" | "name_type",
    }
}

option_enum! {
    Structure as "structure" {
        Unigram => "unigram",
        Bigram => "bigram",
        NTree => "ntree",
    }
}

option_enum! {
    /// Type-based column weighting table
    WeightScheme as "weight scheme" {
        Raw => "raw",
        W1 => "w1" | "weight1",
        W2 => "w2" | "weight2",
    }
}

option_enum! {
    Idf as "idf" {
        None => "none" | "no-idf",
        Log => "log",
        NormLog => "norm-log" | "normlog" | "norm_log",
    }
}

option_enum! {
    TypeMatch as "type match" {
        Strict => "strict",
        Relaxed => "relaxed",
    }
}

option_enum! {
    Synonym as "synonym" {
        None => "none",
        Full => "full",
        Reduced => "reduced",
    }
}

option_enum! {
    /// Minimum lexical similarity for a token pair to count as synonyms
    SynonymThreshold as "synonym threshold" {
        None => "none" | "no-wordnet",
        Syn60 => "60" | "syn60",
        Syn80 => "80" | "syn80",
        Syn100 => "100" | "syn100",
    }
}

impl SynonymThreshold {
    /// `None` disables synonym lookup entirely
    pub fn value(self) -> Option<f64> {
        match self {
            SynonymThreshold::None => None,
            SynonymThreshold::Syn60 => Some(0.6),
            SynonymThreshold::Syn80 => Some(0.8),
            SynonymThreshold::Syn100 => Some(1.0),
        }
    }
}

option_enum! {
    NgramComparison as "n-gram comparison" {
        Fixed => "fixed" | "fix",
        LinearSliding => "linear-sliding" | "sliding",
    }
}

option_enum! {
    ContextMatch as "context match" {
        Strict => "strict",
        Linear => "linear",
    }
}

option_enum! {
    Frequency as "frequency" {
        Sum => "sum",
        Max => "max",
    }
}

option_enum! {
    VsmMode as "vsm mode" {
        Linear => "linear",
        Quadratic => "quadratic",
    }
}

pub const DEFAULT_RELAXED_TYPE_PENALTY: f64 = 0.5;
pub const DEFAULT_CACHE_CAPACITY: usize = 100_000;

/// Frozen configuration of one vector space model build
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub scope: Scope,
    pub unit: Unit,
    pub structure: Structure,
    pub weight: WeightScheme,
    pub idf: Idf,
    pub type_match: TypeMatch,
    pub synonym: Synonym,
    pub synonym_threshold: SynonymThreshold,
    pub ngram_comparison: NgramComparison,
    pub context_match: ContextMatch,
    pub frequency: Frequency,
    pub vsm_mode: VsmMode,
    /// Score factor for different but compatible type tags under relaxed matching
    #[serde(default = "default_penalty")]
    pub relaxed_type_penalty: f64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_penalty() -> f64 {
    DEFAULT_RELAXED_TYPE_PENALTY
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Parameters {
    /// Standard settings for clustering
    pub fn clustering(unit: Unit, structure: Structure) -> Self {
        Self {
            scope: Scope::Model,
            unit,
            structure,
            weight: WeightScheme::W1,
            idf: Idf::NormLog,
            type_match: TypeMatch::Relaxed,
            synonym: Synonym::Reduced,
            synonym_threshold: SynonymThreshold::Syn80,
            ngram_comparison: NgramComparison::Fixed,
            context_match: ContextMatch::Strict,
            frequency: Frequency::Sum,
            vsm_mode: VsmMode::Quadratic,
            relaxed_type_penalty: DEFAULT_RELAXED_TYPE_PENALTY,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Relaxed, approximate run used as the similarity signal for clone detection
    pub fn clone_full(unit: Unit, structure: Structure) -> Self {
        Self {
            idf: Idf::None,
            context_match: if structure == Structure::Unigram {
                ContextMatch::Strict
            } else {
                ContextMatch::Linear
            },
            ..Self::clustering(unit, structure)
        }
    }

    /// Exact, binary run used for masking in clone detection
    pub fn clone_mask(unit: Unit, structure: Structure) -> Self {
        Self {
            weight: WeightScheme::Raw,
            idf: Idf::None,
            type_match: TypeMatch::Strict,
            synonym: Synonym::None,
            synonym_threshold: SynonymThreshold::None,
            context_match: ContextMatch::Strict,
            vsm_mode: VsmMode::Linear,
            ..Self::clustering(unit, structure)
        }
    }

    /// Synonym lookup happens only when both the mode and the threshold allow it
    #[inline]
    pub fn synonyms_enabled(&self) -> bool {
        self.synonym != Synonym::None && self.synonym_threshold.value().is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.relaxed_type_penalty) {
            return Err(Error::UnknownOption {
                option: "relaxed type penalty",
                value: self.relaxed_type_penalty.to_string(),
            });
        }
        Ok(())
    }

    /// Stable identifier of this parameter combination
    pub fn id(&self) -> String {
        [
            self.scope.as_str(),
            self.unit.as_str(),
            self.structure.as_str(),
            self.weight.as_str(),
            self.idf.as_str(),
            self.type_match.as_str(),
            self.synonym.as_str(),
            self.synonym_threshold.as_str(),
            self.ngram_comparison.as_str(),
            self.context_match.as_str(),
            self.frequency.as_str(),
            self.vsm_mode.as_str(),
        ]
        .join("-")
        .to_ascii_uppercase()
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::clustering(Unit::Name, Structure::Unigram)
    }
}
