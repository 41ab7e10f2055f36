//! Feature extraction
//!
//! Walks a [`ModelGraph`] under a scope, unit and structure and produces the
//! feature multiset of every fragment. Traversal follows declared element
//! order, and edges follow declared edge order, so extraction is
//! deterministic.

use crate::error::Result;
use crate::loader::{file_stem, list_model_files, ModelLoader};
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use samos_core::{
    Edge, EdgeKind, Element, ElementKind, Feature, Gram, ModelGraph, NGram, NTree, Scope, SimpleType,
    Structure, TypedFeature, Unit,
};
use samos_nlp::normalize_tokens;
use samos_storage::FeatureStore;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

const PROGRESS_EVERY: usize = 100;

/// Fragment key -> features, in fragment creation order
pub type FragmentMap = IndexMap<String, Vec<Feature>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Split names into tokens before joining them with `_`
    pub tokenize: bool,
    pub lemmatize: bool,
    /// Fragments with a smaller effective size are not written
    pub min_size: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            tokenize: true,
            lemmatize: true,
            min_size: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub models: usize,
    pub skipped_models: usize,
    pub fragments_written: usize,
    pub fragments_filtered: usize,
}

/// Effective size of a fragment used by the minimum-size filter
pub fn effective_size(features: &[Feature], structure: Structure) -> usize {
    match structure {
        Structure::Unigram => features.len(),
        Structure::Bigram => features.len() + 1,
        Structure::NTree => {
            let nodes: usize = features.iter().map(Feature::size).sum();
            nodes + 1 - features.len()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    options: ExtractOptions,
}

impl FeatureExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Lowercase normalized form of an element name
    ///
    /// Names that yield no tokens fall back to the raw name with separators
    /// replaced, so a name never breaks the feature line format.
    pub fn normalize_name(&self, name: &str) -> String {
        if name.trim().is_empty() {
            return String::new();
        }
        if self.options.tokenize {
            let tokens = normalize_tokens(name, self.options.lemmatize);
            if !tokens.is_empty() {
                return tokens.join("_");
            }
        }
        raw_name(name)
    }

    fn unit(&self, element: &Element, unit: Unit) -> TypedFeature {
        let kind = element.kind.as_str();
        match unit {
            Unit::Type => TypedFeature::new(kind, ""),
            Unit::Name | Unit::NameType => TypedFeature::new(kind, self.normalize_name(&element.name)),
        }
    }

    pub fn extract(
        &self,
        model: &ModelGraph,
        stem: &str,
        scope: Scope,
        unit: Unit,
        structure: Structure,
    ) -> Result<FragmentMap> {
        model.validate()?;
        let index = model.index()?;
        let units: Vec<TypedFeature> = model.elements.iter().map(|e| self.unit(e, unit)).collect();

        let (keys, owner) = match scope {
            Scope::Model => (vec![stem.to_string()], vec![0usize; model.len()]),
            Scope::Fragment => fragments_by_package(model, &index, stem),
        };

        let mut per_fragment: Vec<Vec<Feature>> = vec![Vec::new(); keys.len()];
        match structure {
            Structure::Unigram => {
                for (pos, feature) in units.iter().enumerate() {
                    per_fragment[owner[pos]].push(NGram::unigram(feature.clone()).into());
                }
            }
            Structure::Bigram => {
                for edge in &model.edges {
                    let (s, t) = (index[edge.source.as_str()], index[edge.target.as_str()]);
                    let bigram = NGram::bigram(units[s].clone(), edge.kind.as_str(), units[t].clone());
                    per_fragment[owner[s]].push(bigram.into());
                }
            }
            Structure::NTree => {
                let mut outgoing: Vec<Vec<&Edge>> = vec![Vec::new(); model.len()];
                let mut incoming = vec![false; model.len()];
                for edge in &model.edges {
                    outgoing[index[edge.source.as_str()]].push(edge);
                    incoming[index[edge.target.as_str()]] = true;
                }
                for (pos, feature) in units.iter().enumerate() {
                    if outgoing[pos].is_empty() && incoming[pos] {
                        continue;
                    }
                    let children = outgoing[pos]
                        .iter()
                        .map(|edge| {
                            NTree::leaf(NGram::new([
                                Gram::Simple(SimpleType::new(edge.kind.as_str())),
                                Gram::Typed(units[index[edge.target.as_str()]].clone()),
                            ]))
                        })
                        .collect();
                    let tree = NTree::with_children(NGram::unigram(feature.clone()), children);
                    per_fragment[owner[pos]].push(tree.into());
                }
            }
        }

        let mut fragments = FragmentMap::with_capacity(keys.len());
        for (key, features) in keys.into_iter().zip(per_fragment) {
            fragments.insert(key, features);
        }
        if scope == Scope::Fragment {
            // the package-less fragment exists only when something landed in it
            if fragments.get(stem).is_some_and(Vec::is_empty) {
                fragments.shift_remove(stem);
            }
        }
        Ok(fragments)
    }

    /// Write every fragment whose effective size reaches `min_size`; returns `(written, filtered)`
    pub fn write_features(
        &self,
        fragments: &FragmentMap,
        store: &FeatureStore,
        structure: Structure,
    ) -> Result<(usize, usize)> {
        let (mut written, mut filtered) = (0, 0);
        for (key, features) in fragments {
            let size = effective_size(features, structure);
            if size < self.options.min_size {
                info!(
                    "skipping fragment {} (effective size {} < {})",
                    key, size, self.options.min_size
                );
                filtered += 1;
                continue;
            }
            store.write_fragment(key, features)?;
            written += 1;
        }
        Ok((written, filtered))
    }

    /// Extract every model of `folder` into a freshly cleared feature folder
    pub fn extract_folder(
        &self,
        loader: &dyn ModelLoader,
        folder: &Path,
        store: &FeatureStore,
        scope: Scope,
        unit: Unit,
        structure: Structure,
    ) -> Result<ExtractionReport> {
        let start = Instant::now();
        let files = list_model_files(folder, loader.extension())?;
        store.reset()?;
        info!(
            "extracting {}-{}-{} features from {} models in {:?}",
            scope,
            unit,
            structure,
            files.len(),
            folder
        );

        let mut report = ExtractionReport::default();
        let mut taken = AHashSet::new();
        for (n, path) in files.iter().enumerate() {
            if n > 0 && n % PROGRESS_EVERY == 0 {
                info!("extracted {}/{} models", n, files.len());
            }
            let fragments = match loader
                .load(path)
                .and_then(|model| self.extract(&model, &file_stem(path), scope, unit, structure))
            {
                Ok(fragments) => fragments,
                Err(e) => {
                    error!("skipping malformed model {:?}: {}", path, e);
                    report.skipped_models += 1;
                    continue;
                }
            };
            let fragments: FragmentMap = fragments
                .into_iter()
                .map(|(key, features)| (unique_key(&key, &mut taken), features))
                .collect();
            let (written, filtered) = self.write_features(&fragments, store, structure)?;
            report.models += 1;
            report.fragments_written += written;
            report.fragments_filtered += filtered;
        }

        info!(
            "extraction done in {:?}: {} models, {} skipped, {} fragments written, {} filtered",
            start.elapsed(),
            report.models,
            report.skipped_models,
            report.fragments_written,
            report.fragments_filtered
        );
        Ok(report)
    }
}

fn raw_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_whitespace() || c == ':' { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// `key`, or `key_2`, `key_3`, ... when already taken
fn unique_key(key: &str, taken: &mut AHashSet<String>) -> String {
    if taken.insert(key.to_string()) {
        return key.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", key, n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Fragment keys plus the owning fragment of every element
///
/// Every package owns itself and what it transitively contains, except nested
/// packages. Fragment 0 is the package-less `<stem>` fragment.
fn fragments_by_package(
    model: &ModelGraph,
    index: &AHashMap<&str, usize>,
    stem: &str,
) -> (Vec<String>, Vec<usize>) {
    let mut parent: Vec<Option<usize>> = vec![None; model.len()];
    for edge in model.edges.iter().filter(|e| e.kind == EdgeKind::Contains) {
        let (s, t) = (index[edge.source.as_str()], index[edge.target.as_str()]);
        if parent[t].is_none() && s != t {
            parent[t] = Some(s);
        }
    }

    let is_package = |pos: usize| model.elements[pos].kind == ElementKind::EPackage;
    let nearest_package = |pos: usize| -> Option<usize> {
        let mut seen = AHashSet::new();
        let mut current = Some(pos);
        while let Some(p) = current {
            if is_package(p) {
                return Some(p);
            }
            if !seen.insert(p) {
                return None;
            }
            current = parent[p];
        }
        None
    };
    let qualified_name = |pos: usize| -> String {
        let mut names = Vec::new();
        let mut seen = AHashSet::new();
        let mut current = Some(pos);
        while let Some(p) = current {
            if !seen.insert(p) {
                break;
            }
            if is_package(p) {
                names.push(raw_name(&model.elements[p].name));
            }
            current = parent[p];
        }
        names.reverse();
        names.join(".")
    };

    let mut taken = AHashSet::new();
    let mut keys = vec![unique_key(stem, &mut taken)];
    let mut fragment_of_package = AHashMap::new();
    for pos in (0..model.len()).filter(|&p| is_package(p)) {
        let key = unique_key(&format!("{}_{}", stem, qualified_name(pos)), &mut taken);
        fragment_of_package.insert(pos, keys.len());
        keys.push(key);
    }

    let owner = (0..model.len())
        .map(|pos| {
            nearest_package(pos)
                .and_then(|package| fragment_of_package.get(&package).copied())
                .unwrap_or(0)
        })
        .collect();
    (keys, owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::loader::JsonModelLoader;
    use std::fs;

    fn library() -> ModelGraph {
        ModelGraph::new("library")
            .with_element(Element::new("p", ElementKind::EPackage, "library"))
            .with_element(Element::new("c", ElementKind::EClass, "BookShelves"))
            .with_element(Element::new("a", ElementKind::EAttribute, "title"))
            .with_element(Element::new("s", ElementKind::EClass, "Item"))
            .with_edge(Edge::new("p", EdgeKind::Contains, "c"))
            .with_edge(Edge::new("p", EdgeKind::Contains, "s"))
            .with_edge(Edge::new("c", EdgeKind::Contains, "a"))
            .with_edge(Edge::new("c", EdgeKind::HasSupertype, "s"))
    }

    fn lines(features: &[Feature]) -> Vec<String> {
        features.iter().map(|f| f.to_line().unwrap()).collect()
    }

    #[test]
    fn test_normalize_name() {
        let extractor = FeatureExtractor::default();
        assert_eq!(extractor.normalize_name("BookShelves"), "book_shelf");
        assert_eq!(extractor.normalize_name("ISBN number"), "isbn_number");
        assert_eq!(extractor.normalize_name("__"), "__");
        assert_eq!(extractor.normalize_name(""), "");

        let plain = FeatureExtractor::new(ExtractOptions {
            tokenize: false,
            ..ExtractOptions::default()
        });
        assert_eq!(plain.normalize_name("Book Shelf"), "book_shelf");
    }

    #[test]
    fn test_unigram_units() {
        let extractor = FeatureExtractor::default();
        let model = library();

        let by_name = extractor
            .extract(&model, "lib", Scope::Model, Unit::Name, Structure::Unigram)
            .unwrap();
        assert_eq!(
            lines(&by_name["lib"]),
            vec!["EPackage:library", "EClass:book_shelf", "EAttribute:title", "EClass:item"]
        );

        let by_type = extractor
            .extract(&model, "lib", Scope::Model, Unit::Type, Structure::Unigram)
            .unwrap();
        assert_eq!(
            lines(&by_type["lib"]),
            vec!["EPackage:", "EClass:", "EAttribute:", "EClass:"]
        );
    }

    #[test]
    fn test_bigrams_follow_edge_order() {
        let fragments = FeatureExtractor::default()
            .extract(&library(), "lib", Scope::Model, Unit::Name, Structure::Bigram)
            .unwrap();
        assert_eq!(
            lines(&fragments["lib"]),
            vec![
                "EPackage:library contains EClass:book_shelf",
                "EPackage:library contains EClass:item",
                "EClass:book_shelf contains EAttribute:title",
                "EClass:book_shelf has-supertype EClass:item",
            ]
        );
    }

    #[test]
    fn test_trees() {
        let model = library().with_element(Element::new("x", ElementKind::EEnum, "Color"));
        let fragments = FeatureExtractor::default()
            .extract(&model, "lib", Scope::Model, Unit::Name, Structure::NTree)
            .unwrap();
        let trees = &fragments["lib"];
        // package, book_shelf (roots with edges), color (isolated)
        assert_eq!(trees.len(), 3);
        assert_eq!(trees.iter().map(Feature::size).collect::<Vec<_>>(), vec![3, 3, 1]);
        assert_eq!(
            trees[1].to_line().unwrap(),
            r#"{"node":"EClass:book_shelf","children":[{"node":"contains EAttribute:title","children":[]},{"node":"has-supertype EClass:item","children":[]}]}"#
        );
        assert_eq!(effective_size(trees, Structure::NTree), 7 - 3 + 1);
    }

    #[test]
    fn test_fragment_scope_by_package() {
        let model = library()
            .with_element(Element::new("q", ElementKind::EPackage, "shop"))
            .with_element(Element::new("o", ElementKind::EClass, "Order"))
            .with_element(Element::new("loose", ElementKind::EClass, "Loose"))
            .with_edge(Edge::new("p", EdgeKind::Contains, "q"))
            .with_edge(Edge::new("q", EdgeKind::Contains, "o"));

        let fragments = FeatureExtractor::default()
            .extract(&model, "m", Scope::Fragment, Unit::Name, Structure::Unigram)
            .unwrap();
        let keys: Vec<_> = fragments.keys().cloned().collect();
        assert_eq!(keys, vec!["m", "m_library", "m_library.shop"]);
        assert_eq!(lines(&fragments["m"]), vec!["EClass:loose"]);
        assert_eq!(fragments["m_library"].len(), 4);
        assert_eq!(lines(&fragments["m_library.shop"]), vec!["EPackage:shop", "EClass:order"]);
    }

    #[test]
    fn test_fragment_scope_drops_empty_root_fragment_and_survives_cycles() {
        let model = ModelGraph::new("cyclic")
            .with_element(Element::new("p", ElementKind::EPackage, "p"))
            .with_element(Element::new("a", ElementKind::EClass, "A"))
            .with_element(Element::new("b", ElementKind::EClass, "B"))
            .with_edge(Edge::new("a", EdgeKind::Contains, "b"))
            .with_edge(Edge::new("b", EdgeKind::Contains, "a"));
        let fragments = FeatureExtractor::default()
            .extract(&model, "m", Scope::Fragment, Unit::Name, Structure::Unigram)
            .unwrap();
        assert_eq!(fragments.keys().cloned().collect::<Vec<_>>(), vec!["m", "m_p"]);
        assert_eq!(fragments["m"].len(), 2);

        let only_package = ModelGraph::new("x").with_element(Element::new("p", ElementKind::EPackage, "p"));
        let fragments = FeatureExtractor::default()
            .extract(&only_package, "m", Scope::Fragment, Unit::Name, Structure::Unigram)
            .unwrap();
        assert_eq!(fragments.keys().cloned().collect::<Vec<_>>(), vec!["m_p"]);
    }

    #[test]
    fn test_effective_size() {
        let f = |s: &str| Feature::parse(s, Structure::Unigram).unwrap();
        let features = vec![f("EClass:a"), f("EClass:b")];
        assert_eq!(effective_size(&features, Structure::Unigram), 2);
        assert_eq!(effective_size(&features, Structure::Bigram), 3);
        assert_eq!(effective_size(&[], Structure::NTree), 1);
    }

    #[test]
    fn test_min_size_filter() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeatureStore::new(dir.path().join("features"));
        store.create().unwrap();
        let extractor = FeatureExtractor::new(ExtractOptions {
            min_size: 3,
            ..ExtractOptions::default()
        });

        let small = ModelGraph::new("small")
            .with_element(Element::new("a", ElementKind::EClass, "A"))
            .with_element(Element::new("b", ElementKind::EClass, "B"));
        let large = small.clone().with_element(Element::new("c", ElementKind::EClass, "C"));

        let mut fragments = extractor
            .extract(&small, "small", Scope::Model, Unit::Name, Structure::Unigram)
            .unwrap();
        fragments.extend(
            extractor
                .extract(&large, "large", Scope::Model, Unit::Name, Structure::Unigram)
                .unwrap(),
        );
        let (written, filtered) = extractor
            .write_features(&fragments, &store, Structure::Unigram)
            .unwrap();
        assert_eq!((written, filtered), (1, 1));
        assert_eq!(store.fragment_keys().unwrap(), vec!["large"]);
    }

    #[test]
    fn test_extract_folder_skips_malformed_models() {
        let dir = tempfile::tempdir().unwrap();
        let models = dir.path().join("models");
        fs::create_dir_all(&models).unwrap();
        fs::write(
            models.join("good.json"),
            r#"{"elements": [{"id": "c", "kind": "EClass", "name": "Book"}]}"#,
        )
        .unwrap();
        fs::write(models.join("bad.json"), "{ not json").unwrap();
        fs::write(
            models.join("dangling.json"),
            r#"{"elements": [], "edges": [{"source": "x", "kind": "contains", "target": "y"}]}"#,
        )
        .unwrap();

        let store = FeatureStore::new(dir.path().join("features"));
        store.create().unwrap();
        store.write_fragment("stale", &[]).unwrap();

        let report = FeatureExtractor::default()
            .extract_folder(&JsonModelLoader, &models, &store, Scope::Model, Unit::Name, Structure::Unigram)
            .unwrap();
        assert_eq!(report.models, 1);
        assert_eq!(report.skipped_models, 2);
        assert_eq!(report.fragments_written, 1);
        assert_eq!(store.fragment_keys().unwrap(), vec!["good"]);
        assert_eq!(
            fs::read_to_string(store.path_for("good")).unwrap(),
            "EClass:book\n"
        );
    }

    #[test]
    fn test_missing_model_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeatureStore::new(dir.path().join("features"));
        let result = FeatureExtractor::default().extract_folder(
            &JsonModelLoader,
            &dir.path().join("nope"),
            &store,
            Scope::Model,
            Unit::Name,
            Structure::Unigram,
        );
        assert!(matches!(result, Err(ExtractError::MissingInput(_))));
    }
}
