// Typed object graph of a loaded model - elements and labeled edges
use crate::error::{Error, Result};
use crate::weights;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ElementId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    EPackage,
    EClass,
    EAttribute,
    EReference,
    EOperation,
    EParameter,
    EEnum,
    EEnumLiteral,
    EDataType,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::EPackage => "EPackage",
            ElementKind::EClass => "EClass",
            ElementKind::EAttribute => "EAttribute",
            ElementKind::EReference => "EReference",
            ElementKind::EOperation => "EOperation",
            ElementKind::EParameter => "EParameter",
            ElementKind::EEnum => "EEnum",
            ElementKind::EEnumLiteral => "EEnumLiteral",
            ElementKind::EDataType => "EDataType",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "has-supertype")]
    HasSupertype,
    #[serde(rename = "throws")]
    Throws,
    #[serde(rename = "references")]
    References,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Contains => weights::CONTAINS,
            EdgeKind::HasSupertype => weights::HAS_SUPERTYPE,
            EdgeKind::Throws => weights::THROWS,
            EdgeKind::References => weights::REFERENCES,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    #[serde(default)]
    pub name: String,
}

impl Element {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: ElementId,
    pub kind: EdgeKind,
    pub target: ElementId,
}

impl Edge {
    #[inline]
    #[must_use]
    pub fn new(source: impl Into<String>, kind: EdgeKind, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind,
            target: target.into(),
        }
    }
}

/// A loaded model: elements in declared order plus labeled edges in declared order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelGraph {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl ModelGraph {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            edges: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    #[must_use]
    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let graph: ModelGraph = serde_json::from_str(text)?;
        graph.validate()?;
        Ok(graph)
    }

    /// Element ids must be unique and every edge must connect known elements
    pub fn validate(&self) -> Result<()> {
        let index = self.index()?;
        for edge in &self.edges {
            for end in [&edge.source, &edge.target] {
                if !index.contains_key(end.as_str()) {
                    return Err(Error::MalformedModel(format!(
                        "edge {} {} {} references unknown element '{}'",
                        edge.source, edge.kind, edge.target, end
                    )));
                }
            }
        }
        Ok(())
    }

    /// Map from element id to its position in declared order
    pub fn index(&self) -> Result<AHashMap<&str, usize>> {
        let mut index = AHashMap::with_capacity(self.elements.len());
        for (pos, element) in self.elements.iter().enumerate() {
            if index.insert(element.id.as_str(), pos).is_some() {
                return Err(Error::MalformedModel(format!(
                    "duplicate element id '{}'",
                    element.id
                )));
            }
        }
        Ok(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
