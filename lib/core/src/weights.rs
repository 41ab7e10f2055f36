// Type tag weight tables used for column weighting
use crate::params::WeightScheme;

pub const CONTAINS: &str = "contains";
pub const HAS_SUPERTYPE: &str = "has-supertype";
pub const THROWS: &str = "throws";
pub const REFERENCES: &str = "references";

// tag, raw, w1, w2
const WEIGHT_TABLE: &[(&str, f64, f64, f64)] = &[
    ("EPackage", 1.0, 1.0, 2.0),
    ("EDataType", 1.0, 0.2, 0.1),
    ("EClass", 1.0, 1.0, 1.0),
    ("EReference", 1.0, 0.5, 0.5),
    ("EAttribute", 1.0, 0.5, 0.5),
    ("EEnum", 1.0, 1.0, 1.0),
    ("EEnumLiteral", 1.0, 1.0, 1.0),
    ("EOperation", 1.0, 0.3, 0.2),
    ("EParameter", 1.0, 0.1, 0.01),
    (HAS_SUPERTYPE, 1.0, 0.2, 0.2),
    (THROWS, 1.0, 0.1, 0.1),
];

impl WeightScheme {
    /// Weight of a type tag, `None` when the tag is not in the table
    pub fn weight(self, tag: &str) -> Option<f64> {
        WEIGHT_TABLE
            .iter()
            .find(|(t, ..)| *t == tag)
            .map(|&(_, raw, w1, w2)| match self {
                WeightScheme::Raw => raw,
                WeightScheme::W1 => w1,
                WeightScheme::W2 => w2,
            })
    }
}

/// Edges whose own tag carries a weight (instead of passing through to the target)
#[inline]
pub fn is_weighted_edge(tag: &str) -> bool {
    tag == HAS_SUPERTYPE || tag == THROWS
}
