//! Structural features extracted from models
//!
//! A feature occupies one dimension of the vector space. Features are
//! immutable values with deep structural equality, so they can be interned
//! into a vocabulary and used as hash keys directly.
//!
//! Plain text encoding (unigrams and bigrams):
//!
//! ```text
//! EClass:book                          unigram
//! EClass:book contains EAttribute:title bigram
//! ```
//!
//! Tree encoding (one JSON object per line):
//!
//! ```text
//! {"node":"EClass:book","children":[{"node":"contains EAttribute:title","children":[]}]}
//! ```

use crate::error::{Error, Result};
use crate::params::Structure;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;

/// A bare type tag, used for the edges inside n-grams
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimpleType {
    pub kind: String,
}

impl SimpleType {
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

/// A type tag plus a name; the content-bearing atom of every feature
///
/// An empty name means the name is absent (type-only unit).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypedFeature {
    pub kind: String,
    pub name: String,
}

impl TypedFeature {
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }

    #[inline]
    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }
}

/// One position of an n-gram
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gram {
    Simple(SimpleType),
    Typed(TypedFeature),
}

impl Gram {
    #[inline]
    pub fn kind(&self) -> &str {
        match self {
            Gram::Simple(s) => &s.kind,
            Gram::Typed(t) => &t.kind,
        }
    }

    /// Edge positions are the bare type tags between content positions
    #[inline]
    pub fn is_edge(&self) -> bool {
        matches!(self, Gram::Simple(_))
    }

    pub fn parse(token: &str) -> Result<Self> {
        match token.split_once(':') {
            Some((kind, name)) => {
                if kind.is_empty() {
                    return Err(Error::invalid_feature(token, "missing type tag"));
                }
                Ok(Gram::Typed(TypedFeature::new(kind, name)))
            }
            None if token.is_empty() => Err(Error::invalid_feature(token, "empty token")),
            None => Ok(Gram::Simple(SimpleType::new(token))),
        }
    }
}

impl fmt::Display for Gram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gram::Simple(s) => write!(f, "{}", s.kind),
            Gram::Typed(t) => write!(f, "{}:{}", t.kind, t.name),
        }
    }
}

impl From<TypedFeature> for Gram {
    fn from(t: TypedFeature) -> Self {
        Gram::Typed(t)
    }
}

impl From<SimpleType> for Gram {
    fn from(s: SimpleType) -> Self {
        Gram::Simple(s)
    }
}

/// An ordered sequence of grams, `n >= 1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NGram {
    grams: SmallVec<[Gram; 3]>,
}

impl NGram {
    #[inline]
    #[must_use]
    pub fn new(grams: impl IntoIterator<Item = Gram>) -> Self {
        Self {
            grams: grams.into_iter().collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn unigram(feature: TypedFeature) -> Self {
        Self::new([Gram::Typed(feature)])
    }

    /// `[source, edge, target]`
    #[must_use]
    pub fn bigram(source: TypedFeature, edge: impl Into<String>, target: TypedFeature) -> Self {
        Self::new([
            Gram::Typed(source),
            Gram::Simple(SimpleType::new(edge)),
            Gram::Typed(target),
        ])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.grams.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.grams.is_empty()
    }

    #[inline]
    pub fn grams(&self) -> &[Gram] {
        &self.grams
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Gram> {
        self.grams.get(index)
    }

    /// Type tag of the first content position, falling back to the first gram
    pub fn head_kind(&self) -> Option<&str> {
        self.grams
            .iter()
            .find(|g| !g.is_edge())
            .or_else(|| self.grams.first())
            .map(Gram::kind)
    }

    pub fn parse(line: &str) -> Result<Self> {
        let grams = line
            .split_whitespace()
            .map(Gram::parse)
            .collect::<Result<SmallVec<[Gram; 3]>>>()?;
        if grams.is_empty() {
            return Err(Error::invalid_feature(line, "empty n-gram"));
        }
        Ok(Self { grams })
    }
}

impl fmt::Display for NGram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gram) in self.grams.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", gram)?;
        }
        Ok(())
    }
}

impl Serialize for NGram {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NGram {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        NGram::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// A labeled ordered tree whose node payloads are n-grams
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NTree {
    pub node: NGram,
    #[serde(default)]
    pub children: Vec<NTree>,
}

impl NTree {
    #[inline]
    #[must_use]
    pub fn leaf(node: NGram) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_children(node: NGram, children: Vec<NTree>) -> Self {
        Self { node, children }
    }

    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(NTree::size).sum::<usize>()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(line: &str) -> Result<Self> {
        serde_json::from_str(line).map_err(|e| Error::invalid_feature(line, e.to_string()))
    }
}

/// A dimension of the vector space
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Simple(SimpleType),
    Typed(TypedFeature),
    NGram(NGram),
    NTree(NTree),
}

impl Feature {
    /// Type tag used for the first matching step and for pruning
    pub fn head_kind(&self) -> Option<&str> {
        match self {
            Feature::Simple(s) => Some(&s.kind),
            Feature::Typed(t) => Some(&t.kind),
            Feature::NGram(n) => n.head_kind(),
            Feature::NTree(t) => t.node.head_kind(),
        }
    }

    /// Parse one line of a feature file written for `structure`
    pub fn parse(line: &str, structure: Structure) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Err(Error::invalid_feature(line, "empty line"));
        }
        match structure {
            Structure::NTree => NTree::from_json(line).map(Feature::NTree),
            Structure::Unigram | Structure::Bigram => NGram::parse(line).map(Feature::NGram),
        }
    }

    /// Serialize to the single-line form `parse` reads back
    pub fn to_line(&self) -> Result<String> {
        match self {
            Feature::NTree(t) => t.to_json(),
            other => Ok(other.to_string()),
        }
    }

    /// Number of nodes for trees, 1 otherwise
    pub fn size(&self) -> usize {
        match self {
            Feature::NTree(t) => t.size(),
            _ => 1,
        }
    }

    /// Visit every non-empty name of every typed atom in this feature
    pub fn for_each_name<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        fn visit_ngram<'a>(ngram: &'a NGram, f: &mut impl FnMut(&'a str)) {
            for gram in ngram.grams() {
                if let Gram::Typed(t) = gram {
                    if t.has_name() {
                        f(&t.name);
                    }
                }
            }
        }
        fn visit_tree<'a>(tree: &'a NTree, f: &mut impl FnMut(&'a str)) {
            visit_ngram(&tree.node, f);
            for child in &tree.children {
                visit_tree(child, f);
            }
        }

        match self {
            Feature::Simple(_) => {}
            Feature::Typed(t) => {
                if t.has_name() {
                    f(&t.name);
                }
            }
            Feature::NGram(n) => visit_ngram(n, f),
            Feature::NTree(t) => visit_tree(t, f),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Simple(s) => write!(f, "{}", s.kind),
            Feature::Typed(t) => write!(f, "{}:{}", t.kind, t.name),
            Feature::NGram(n) => write!(f, "{}", n),
            Feature::NTree(t) => match serde_json::to_string(t) {
                Ok(json) => f.write_str(&json),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<NGram> for Feature {
    fn from(n: NGram) -> Self {
        Feature::NGram(n)
    }
}

impl From<NTree> for Feature {
    fn from(t: NTree) -> Self {
        Feature::NTree(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_unigram() {
        let f = Feature::parse("EClass:book", Structure::Unigram).unwrap();
        let expected = Feature::NGram(NGram::unigram(TypedFeature::new("EClass", "book")));
        assert_eq!(f, expected);
        assert_eq!(f.head_kind(), Some("EClass"));
    }

    #[test]
    fn test_parse_bigram_with_edge() {
        let f = Feature::parse("EClass:book contains EAttribute:title", Structure::Bigram).unwrap();
        let Feature::NGram(ngram) = &f else {
            panic!("expected n-gram");
        };
        assert_eq!(ngram.len(), 3);
        assert!(ngram.get(1).unwrap().is_edge());
        assert_eq!(f.to_line().unwrap(), "EClass:book contains EAttribute:title");
    }

    #[test]
    fn test_type_only_unit_keeps_empty_name() {
        let f = Feature::parse("EClass:", Structure::Unigram).unwrap();
        let Feature::NGram(ngram) = &f else {
            panic!("expected n-gram");
        };
        match ngram.get(0).unwrap() {
            Gram::Typed(t) => assert!(!t.has_name()),
            other => panic!("unexpected gram {:?}", other),
        }
        assert_eq!(f.to_line().unwrap(), "EClass:");
    }

    #[test]
    fn test_parse_errors() {
        assert!(Feature::parse("", Structure::Unigram).is_err());
        assert!(Feature::parse(":book", Structure::Unigram).is_err());
        assert!(Feature::parse("{not json", Structure::NTree).is_err());
    }

    #[test]
    fn test_tree_json_roundtrip_and_size() {
        let tree = NTree::with_children(
            NGram::unigram(TypedFeature::new("EClass", "book")),
            vec![
                NTree::leaf(NGram::new([
                    Gram::Simple(SimpleType::new("contains")),
                    Gram::Typed(TypedFeature::new("EAttribute", "title")),
                ])),
                NTree::leaf(NGram::new([
                    Gram::Simple(SimpleType::new("has-supertype")),
                    Gram::Typed(TypedFeature::new("EClass", "item")),
                ])),
            ],
        );
        assert_eq!(tree.size(), 3);

        let line = Feature::NTree(tree.clone()).to_line().unwrap();
        assert!(line.starts_with("{\"node\":\"EClass:book\""));
        let parsed = Feature::parse(&line, Structure::NTree).unwrap();
        assert_eq!(parsed, Feature::NTree(tree));
    }

    #[test]
    fn test_tree_children_default_to_empty() {
        let parsed = Feature::parse(r#"{"node":"EClass:book"}"#, Structure::NTree).unwrap();
        assert_eq!(parsed.size(), 1);
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let a = Feature::parse("EClass:book contains EAttribute:title", Structure::Bigram).unwrap();
        let b = Feature::parse("EClass:book  contains  EAttribute:title", Structure::Bigram).unwrap();
        let c = Feature::parse("EClass:book contains EAttribute:isbn", Structure::Bigram).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Feature> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_for_each_name_visits_tree_atoms() {
        let line = r#"{"node":"EClass:book","children":[{"node":"contains EAttribute:title"},{"node":"contains EAttribute:"}]}"#;
        let f = Feature::parse(line, Structure::NTree).unwrap();
        let mut names = Vec::new();
        f.for_each_name(&mut |n| names.push(n.to_string()));
        assert_eq!(names, vec!["book".to_string(), "title".to_string()]);
    }
}
