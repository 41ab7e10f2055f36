// Integration tests for samos
use samos::backend::{CloneInputs, StatsBackend};
use samos::pipeline::{Pipeline, PipelineOptions};
use samos_core::{
    ContextMatch, Frequency, Idf, NgramComparison, Parameters, Scope, Structure, Synonym,
    SynonymThreshold, TypeMatch, Unit, VsmMode, WeightScheme,
};
use samos_extract::{ExtractOptions, FeatureExtractor, JsonModelLoader};
use samos_nlp::{NlpCache, NlpOptions, NlpPreprocessor, SynonymLexicon};
use samos_storage::{format_value, Configuration, FeatureStore, Goal};
use samos_vsm::VsmBuilder;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn write_model(folder: &Path, stem: &str, model: serde_json::Value) {
    fs::create_dir_all(folder).unwrap();
    fs::write(folder.join(format!("{}.json", stem)), model.to_string()).unwrap();
}

fn library(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "elements": [
            {"id": "c", "kind": "EClass", "name": "Book"},
            {"id": "a", "kind": "EAttribute", "name": "title"}
        ],
        "edges": [{"source": "c", "kind": "contains", "target": "a"}]
    })
}

fn single_class(class: &str) -> serde_json::Value {
    json!({"elements": [{"id": "c", "kind": "EClass", "name": class}]})
}

fn raw_params(structure: Structure) -> Parameters {
    Parameters {
        scope: Scope::Model,
        unit: Unit::Name,
        structure,
        weight: WeightScheme::Raw,
        idf: Idf::None,
        type_match: TypeMatch::Strict,
        synonym: Synonym::None,
        synonym_threshold: SynonymThreshold::None,
        ngram_comparison: NgramComparison::Fixed,
        context_match: ContextMatch::Strict,
        frequency: Frequency::Sum,
        vsm_mode: VsmMode::Quadratic,
        ..Parameters::default()
    }
}

fn extract(models: &Path, features: &Path, structure: Structure) -> FeatureStore {
    let store = FeatureStore::new(features);
    FeatureExtractor::default()
        .extract_folder(&JsonModelLoader, models, &store, Scope::Model, Unit::Name, structure)
        .unwrap();
    store
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Writes fixed cluster labels, one per row of names.csv
struct LabelBackend;

impl StatsBackend for LabelBackend {
    fn cluster(&self, matrix: &Path, names: &Path, results: &Path, clusters: usize) -> anyhow::Result<()> {
        assert!(matrix.is_file());
        let rows = fs::read_to_string(names)?.lines().count();
        let mut csv = String::from("\"cluster\"\n");
        for row in 0..rows {
            csv.push_str(&format!("{}\n", row % clusters + 1));
        }
        fs::write(results.join("clusterLabels.csv"), csv)?;
        Ok(())
    }

    fn detect_clones(&self, inputs: &CloneInputs, results: &Path) -> anyhow::Result<()> {
        for input in [&inputs.full, &inputs.mask, &inputs.names, &inputs.sizes] {
            assert!(input.is_file(), "{:?} missing", input);
        }
        fs::write(results.join("clones.csv"), "")?;
        Ok(())
    }
}

#[test]
fn test_clustering_run_publishes_predictions() {
    let root = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    fs::write(root.path().join("X_attrs.json"), r#"{"xmi_folder": "models"}"#).unwrap();
    fs::write(root.path().join("hyper.json"), r#"{"hyper": {"n_clusters": 2}}"#).unwrap();
    let models = root.path().join("models");
    write_model(&models, "B", single_class("Book"));
    write_model(&models, "A", single_class("Book"));

    let config = Configuration::load(
        root.path(),
        Some(root.path().join("hyper.json").as_path()),
        work.path(),
        Goal::Cluster,
    )
    .unwrap();
    let report = Pipeline::new(config)
        .with_backend(Box::new(LabelBackend))
        .run_clustering()
        .unwrap();

    assert_eq!(report.extraction.models, 2);
    assert_eq!(report.matrices.len(), 1);

    // one shared column: EClass weight 1.0 times norm-log idf of df = N = 2
    let cell = format_value(2f64.log10());
    assert_eq!(
        read(&work.path().join("vsm/vsm-cluster.csv")),
        format!("{}\n{}\n", cell, cell)
    );
    assert_eq!(read(&work.path().join("vsm/names.csv")), "A\nB\n");
    assert!(!work.path().join("vsm/sizes.csv").exists());

    let predictions = report.predictions.unwrap();
    assert_eq!(predictions, root.path().join("y_pred.json"));
    let labels: Vec<String> = serde_json::from_str(&read(&predictions)).unwrap();
    assert_eq!(labels, vec!["1", "2"]);
}

#[test]
fn test_clustering_without_cluster_count_fails() {
    let models = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_model(models.path(), "A", single_class("Book"));

    let config = Configuration::new(models.path(), work.path(), Goal::Cluster);
    let err = Pipeline::new(config)
        .with_backend(Box::new(LabelBackend))
        .run_clustering()
        .unwrap_err();
    assert!(err.to_string().contains("cluster count"));
    // matrices are still written before the back end is consulted
    assert!(work.path().join("vsm/vsm-cluster.csv").is_file());
}

/// Exits cleanly without writing any labels
struct SilentBackend;

impl StatsBackend for SilentBackend {
    fn cluster(&self, _: &Path, _: &Path, _: &Path, _: usize) -> anyhow::Result<()> {
        Ok(())
    }

    fn detect_clones(&self, _: &CloneInputs, _: &Path) -> anyhow::Result<()> {
        Ok(())
    }
}

#[test]
fn test_labels_of_an_earlier_run_are_not_published() {
    let models = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_model(models.path(), "A", single_class("Book"));
    let results = work.path().join("results");
    fs::create_dir_all(&results).unwrap();
    fs::write(results.join("clusterLabels.csv"), "\"cluster\"\n7\n").unwrap();

    let config = Configuration::new(models.path(), work.path(), Goal::Cluster).with_clusters(1);
    let err = Pipeline::new(config)
        .with_backend(Box::new(SilentBackend))
        .run_clustering()
        .unwrap_err();
    assert!(err.to_string().contains("clusterLabels.csv"), "{}", err);
    assert!(!results.join("clusterLabels.csv").exists());
    assert!(!work.path().join("y_pred.json").exists());
}

#[test]
fn test_clone_detection_run() {
    let models = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_model(models.path(), "A", library("a"));
    write_model(models.path(), "B", library("b"));
    write_model(models.path(), "C", single_class("Car"));

    let config = Configuration::new(models.path(), work.path(), Goal::Clone);
    let report = Pipeline::new(config)
        .with_backend(Box::new(LabelBackend))
        .run_clone_detection()
        .unwrap();
    assert_eq!(report.matrices.len(), 2);
    assert!(report.predictions.is_none());

    let vsm = work.path().join("vsm");
    // columns: EClass:book, EAttribute:title, EClass:car; w1 weights, no idf
    assert_eq!(
        read(&vsm.join("vsm-cloneFull.csv")),
        "1.0,0.5,0.0\n1.0,0.5,0.0\n0.0,0.0,1.0\n"
    );
    assert_eq!(
        read(&vsm.join("vsm-cloneMask.csv")),
        "1.0,1.0,0.0\n1.0,1.0,0.0\n0.0,0.0,1.0\n"
    );
    assert_eq!(read(&vsm.join("names.csv")), "A\nB\nC\n");
    assert_eq!(read(&vsm.join("sizes.csv")), "2\n2\n1\n");
    assert!(work.path().join("results/clones.csv").is_file());
}

#[test]
fn test_synonym_aware_match() {
    let models = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_model(models.path(), "A", single_class("Book"));
    write_model(models.path(), "B", single_class("Publication"));
    let store = extract(models.path(), &work.path().join("features"), Structure::Unigram);

    let lexicon = SynonymLexicon::from_json(r#"{"pairs": [{"a": "book", "b": "publication", "score": 0.85}]}"#).unwrap();
    let nlp = NlpPreprocessor::new(Arc::new(lexicon), NlpOptions::default())
        .precompute(&store, Structure::Unigram, SynonymThreshold::Syn80)
        .unwrap();
    let params = Parameters {
        synonym: Synonym::Reduced,
        synonym_threshold: SynonymThreshold::Syn80,
        ..raw_params(Structure::Unigram)
    };

    VsmBuilder::new(params, Arc::new(nlp))
        .unwrap()
        .build(&store, &work.path().join("vsm"), "cluster")
        .unwrap();
    assert_eq!(
        read(&work.path().join("vsm/vsm-cluster.csv")),
        "1.0,0.85\n0.85,1.0\n"
    );
}

#[test]
fn test_synonyms_below_threshold_are_ignored() {
    let models = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_model(models.path(), "A", single_class("Book"));
    write_model(models.path(), "B", single_class("Publication"));
    let store = extract(models.path(), &work.path().join("features"), Structure::Unigram);

    let lexicon = SynonymLexicon::from_json(r#"{"pairs": [{"a": "book", "b": "publication", "score": 0.7}]}"#).unwrap();
    let nlp = NlpPreprocessor::new(Arc::new(lexicon), NlpOptions::default())
        .precompute(&store, Structure::Unigram, SynonymThreshold::Syn80)
        .unwrap();
    let params = Parameters {
        synonym: Synonym::Reduced,
        synonym_threshold: SynonymThreshold::Syn80,
        ..raw_params(Structure::Unigram)
    };
    let builder = VsmBuilder::new(params, Arc::new(nlp)).unwrap();
    let matrix = builder.compute(&builder.ingest(&store).unwrap()).unwrap();
    assert_eq!(matrix.dense_row(0), vec![1.0, 0.0]);
    assert_eq!(matrix.dense_row(1), vec![0.0, 1.0]);
}

#[test]
fn test_minimum_size_filter() {
    let models = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_model(models.path(), "big", library("big"));
    write_model(models.path(), "small", single_class("Car"));

    let config = Configuration::new(models.path(), work.path(), Goal::Cluster);
    let options = PipelineOptions {
        extract: ExtractOptions {
            min_size: 2,
            ..ExtractOptions::default()
        },
        ..PipelineOptions::default()
    };
    let report = Pipeline::new(config)
        .with_options(options)
        .run_clustering()
        .unwrap();

    assert_eq!(report.extraction.fragments_written, 1);
    assert_eq!(report.extraction.fragments_filtered, 1);
    assert_eq!(read(&work.path().join("vsm/names.csv")), "big\n");
    assert_eq!(report.matrices[0].rows, 1);
}

#[test]
fn test_malformed_models_are_skipped() {
    let models = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_model(models.path(), "good", single_class("Book"));
    fs::write(models.path().join("broken.json"), "{ not json").unwrap();
    fs::write(models.path().join(".hidden.json"), "{}").unwrap();

    let config = Configuration::new(models.path(), work.path(), Goal::Cluster);
    let report = Pipeline::new(config).run_clustering().unwrap();
    assert_eq!(report.extraction.models, 1);
    assert_eq!(report.extraction.skipped_models, 1);
    assert_eq!(read(&work.path().join("vsm/names.csv")), "good\n");
}

#[test]
fn test_missing_model_folder_is_fatal() {
    let work = tempfile::tempdir().unwrap();
    let config = Configuration::new(work.path().join("nowhere"), work.path(), Goal::Clone);
    assert!(Pipeline::new(config).run_clone_detection().is_err());
}

#[test]
fn test_outputs_are_deterministic() {
    let models = tempfile::tempdir().unwrap();
    for (stem, class, attribute) in [
        ("m1", "Library", "bookTitle"),
        ("m2", "Library", "title"),
        ("m3", "Shop", "itemName"),
        ("m4", "BookStore", "name"),
    ] {
        write_model(
            models.path(),
            stem,
            json!({
                "elements": [
                    {"id": "p", "kind": "EPackage", "name": "root"},
                    {"id": "c", "kind": "EClass", "name": class},
                    {"id": "a", "kind": "EAttribute", "name": attribute},
                    {"id": "r", "kind": "EReference", "name": "items"}
                ],
                "edges": [
                    {"source": "p", "kind": "contains", "target": "c"},
                    {"source": "c", "kind": "contains", "target": "a"},
                    {"source": "c", "kind": "references", "target": "c"}
                ]
            }),
        );
    }
    let lexicon = SynonymLexicon::from_json(
        r#"{"groups": [["library", "store", "shop"]], "pairs": [{"a": "title", "b": "name", "score": 0.9}]}"#,
    )
    .unwrap();

    let run = |work: &Path| {
        let store = extract(models.path(), &work.join("features"), Structure::Bigram);
        let params = Parameters {
            scope: Scope::Model,
            ..Parameters::clone_full(Unit::Name, Structure::Bigram)
        };
        let nlp = NlpPreprocessor::new(Arc::new(lexicon.clone()), NlpOptions::default())
            .precompute(&store, Structure::Bigram, params.synonym_threshold)
            .unwrap();
        VsmBuilder::new(params, Arc::new(nlp))
            .unwrap()
            .with_sizes(true)
            .build(&store, &work.join("vsm"), "cloneFull")
            .unwrap();
        ["vsm-cloneFull.csv", "names.csv", "sizes.csv"].map(|f| read(&work.join("vsm").join(f)))
    };

    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let a = run(first.path());
    let b = run(second.path());
    assert_eq!(a, b);

    for line in a[0].lines() {
        for cell in line.split(',') {
            assert!(cell.parse::<f64>().unwrap() >= 0.0);
        }
    }
}

#[test]
fn test_matrices_are_non_negative_for_every_mode() {
    let models = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_model(models.path(), "a", library("a"));
    write_model(models.path(), "b", single_class("Publication"));
    let store = extract(models.path(), &work.path().join("features"), Structure::Unigram);
    store.write_fragment("c", &[]).unwrap();
    let nlp = Arc::new(NlpCache::empty(true));

    for &weight in WeightScheme::ALL {
        for &idf in Idf::ALL {
            for &vsm_mode in VsmMode::ALL {
                for &frequency in Frequency::ALL {
                    let params = Parameters {
                        weight,
                        idf,
                        vsm_mode,
                        frequency,
                        ..Parameters::clustering(Unit::Name, Structure::Unigram)
                    };
                    let builder = VsmBuilder::new(params, nlp.clone()).unwrap();
                    let matrix = builder.compute(&builder.ingest(&store).unwrap()).unwrap();
                    assert_eq!(matrix.row_count(), 3);
                    // empty model yields a row of zeros
                    assert!(matrix.dense_row(2).iter().all(|&v| v == 0.0));
                    for row in matrix.rows() {
                        assert!(row.iter().all(|&(_, v)| v >= 0.0), "{} produced a negative cell", params.id());
                    }
                }
            }
        }
    }
}
