use anyhow::{bail, Context};
use clap::{Args as ClapArgs, Parser, Subcommand};
use samos::backend::{CommandBackend, DEFAULT_PROGRAM};
use samos::pipeline::{Pipeline, PipelineOptions};
use samos_core::{
    ContextMatch, Frequency, Idf, NgramComparison, Parameters, Scope, Structure, Synonym,
    SynonymThreshold, TypeMatch, Unit, VsmMode, WeightScheme,
};
use samos_extract::{ExtractOptions, FeatureExtractor, JsonModelLoader};
use samos_nlp::{Lexicon, NlpOptions, NlpPreprocessor, NoLexicon, SynonymLexicon};
use samos_storage::{publish_predictions, Configuration, FeatureStore, Goal};
use samos_vsm::VsmBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Clustering and clone detection of metamodels
#[derive(Parser, Debug)]
#[command(name = "samos")]
#[command(about = "Metamodel clustering and clone detection", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Synonym lexicon (JSON with "groups" and "pairs")
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,

    /// Folder for features, vsm and results
    #[arg(long, global = true, default_value = ".")]
    work_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cluster every model of a run root
    Cluster {
        /// Folder holding X_attrs.json
        root: PathBuf,
        /// Hyperparameter file with hyper.n_clusters
        hyper: PathBuf,
        /// Cluster count overriding hyper.n_clusters
        #[arg(long)]
        clusters: Option<usize>,
        #[command(flatten)]
        extraction: ExtractionArgs,
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Detect clones among the models of a run root
    Clone {
        root: PathBuf,
        #[command(flatten)]
        extraction: ExtractionArgs,
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Only extract features
    Extract {
        /// Folder of model files
        data: PathBuf,
        #[command(flatten)]
        extraction: ExtractionArgs,
    },
    /// Only build one vector space model from an existing feature folder
    Vsm {
        /// Output tag, the matrix is written to vsm-<TAG>.csv
        #[arg(long, default_value = "cluster")]
        tag: String,
        /// Also write sizes.csv
        #[arg(long)]
        sizes: bool,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Publish results/clusterLabels.csv as y_pred.json
    Publish { root: PathBuf },
}

#[derive(ClapArgs, Debug, Clone)]
struct ExtractionArgs {
    #[arg(long, default_value = "model")]
    scope: Scope,
    #[arg(long, default_value = "name")]
    unit: Unit,
    #[arg(long, default_value = "unigram")]
    structure: Structure,
    /// Minimum effective fragment size
    #[arg(long, default_value_t = 1)]
    min_size: usize,
    /// Keep names as they are instead of tokenizing them
    #[arg(long)]
    no_tokenize: bool,
    #[arg(long)]
    no_lemmatize: bool,
}

impl ExtractionArgs {
    fn options(&self) -> PipelineOptions {
        PipelineOptions {
            scope: self.scope,
            unit: self.unit,
            structure: self.structure,
            extract: ExtractOptions {
                tokenize: !self.no_tokenize,
                lemmatize: !self.no_lemmatize,
                min_size: self.min_size,
            },
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
struct BackendArgs {
    /// Statistics program
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    program: String,
    /// Folder holding cluster.R and clones.R
    #[arg(long, default_value = "r")]
    scripts: PathBuf,
    /// Stop after the vector space models are written
    #[arg(long)]
    no_backend: bool,
}

#[derive(ClapArgs, Debug, Clone)]
struct ParamArgs {
    #[arg(long, default_value = "model")]
    scope: Scope,
    #[arg(long, default_value = "name")]
    unit: Unit,
    #[arg(long, default_value = "unigram")]
    structure: Structure,
    #[arg(long, default_value = "w1")]
    weight: WeightScheme,
    #[arg(long, default_value = "norm-log")]
    idf: Idf,
    #[arg(long, default_value = "relaxed")]
    type_match: TypeMatch,
    #[arg(long, default_value = "reduced")]
    synonym: Synonym,
    #[arg(long, default_value = "80")]
    synonym_threshold: SynonymThreshold,
    #[arg(long, default_value = "fixed")]
    ngram_comparison: NgramComparison,
    #[arg(long, default_value = "strict")]
    context_match: ContextMatch,
    #[arg(long, default_value = "sum")]
    frequency: Frequency,
    #[arg(long, default_value = "quadratic")]
    vsm_mode: VsmMode,
    /// Score of different but compatible type tags under relaxed matching
    #[arg(long, default_value_t = samos_core::params::DEFAULT_RELAXED_TYPE_PENALTY)]
    relaxed_type_penalty: f64,
    #[arg(long, default_value_t = samos_core::params::DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,
    /// Tokens were not lemmatized during extraction
    #[arg(long)]
    no_lemmatize: bool,
}

impl ParamArgs {
    fn parameters(&self) -> Parameters {
        Parameters {
            scope: self.scope,
            unit: self.unit,
            structure: self.structure,
            weight: self.weight,
            idf: self.idf,
            type_match: self.type_match,
            synonym: self.synonym,
            synonym_threshold: self.synonym_threshold,
            ngram_comparison: self.ngram_comparison,
            context_match: self.context_match,
            frequency: self.frequency,
            vsm_mode: self.vsm_mode,
            relaxed_type_penalty: self.relaxed_type_penalty,
            cache_capacity: self.cache_capacity,
        }
    }
}

fn load_lexicon(path: Option<&Path>) -> anyhow::Result<Arc<dyn Lexicon>> {
    match path {
        Some(path) => {
            let lexicon = SynonymLexicon::load(path)
                .with_context(|| format!("failed to load lexicon {:?}", path))?;
            info!("Lexicon loaded from {:?}", path);
            Ok(Arc::new(lexicon))
        }
        None => Ok(Arc::new(NoLexicon)),
    }
}

fn pipeline(
    config: Configuration,
    lexicon: Arc<dyn Lexicon>,
    extraction: &ExtractionArgs,
    backend: &BackendArgs,
) -> Pipeline {
    let pipeline = Pipeline::new(config)
        .with_options(extraction.options())
        .with_lexicon(lexicon);
    if backend.no_backend {
        pipeline
    } else {
        pipeline.with_backend(Box::new(CommandBackend::new(
            backend.program.clone(),
            backend.scripts.clone(),
        )))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting samos v{}", env!("CARGO_PKG_VERSION"));
    info!("Work directory: {:?}", args.work_dir);

    let lexicon = load_lexicon(args.lexicon.as_deref())?;

    match &args.command {
        Command::Cluster {
            root,
            hyper,
            clusters,
            extraction,
            backend,
        } => {
            let mut config = Configuration::load(root, Some(hyper.as_path()), &args.work_dir, Goal::Cluster)?;
            if let Some(clusters) = *clusters {
                if clusters == 0 {
                    bail!("--clusters must be positive");
                }
                config = config.with_clusters(clusters);
            }
            let report = pipeline(config, lexicon, extraction, backend).run_clustering()?;
            if let Some(predictions) = report.predictions {
                info!("Predictions: {:?}", predictions);
            }
        }
        Command::Clone {
            root,
            extraction,
            backend,
        } => {
            let config = Configuration::load(root, None, &args.work_dir, Goal::Clone)?;
            pipeline(config, lexicon, extraction, backend).run_clone_detection()?;
        }
        Command::Extract { data, extraction } => {
            let store = FeatureStore::new(args.work_dir.join("features"));
            let report = FeatureExtractor::new(extraction.options().extract).extract_folder(
                &JsonModelLoader,
                data,
                &store,
                extraction.scope,
                extraction.unit,
                extraction.structure,
            )?;
            if report.models == 0 && report.skipped_models > 0 {
                bail!("none of the {} models could be read", report.skipped_models);
            }
        }
        Command::Vsm { tag, sizes, params } => {
            let store = FeatureStore::new(args.work_dir.join("features"));
            let parameters = params.parameters();
            let nlp = NlpPreprocessor::new(
                lexicon,
                NlpOptions {
                    lemmatize: !params.no_lemmatize,
                },
            )
            .precompute(&store, parameters.structure, parameters.synonym_threshold)?;
            VsmBuilder::new(parameters, Arc::new(nlp))?
                .with_sizes(*sizes)
                .build(&store, &args.work_dir.join("vsm"), tag)?;
        }
        Command::Publish { root } => {
            publish_predictions(&args.work_dir.join("results"), root)?;
        }
    }

    info!("Done");
    Ok(())
}
