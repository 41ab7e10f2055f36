//! End-to-end runs
//!
//! extract -> NLP precompute -> VSM build -> back end -> publish

use crate::backend::{CloneInputs, StatsBackend};
use anyhow::{anyhow, Context, Result};
use samos_core::{Parameters, Scope, Structure, Unit};
use samos_extract::{ExtractOptions, ExtractionReport, FeatureExtractor, JsonModelLoader, ModelLoader};
use samos_nlp::{Lexicon, NlpCache, NlpOptions, NlpPreprocessor, NoLexicon};
use samos_storage::{publish_predictions, Configuration, FeatureStore};
use samos_storage::export::{NAMES_FILE, SIZES_FILE};
use samos_vsm::{VsmBuilder, VsmReport};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub const CLUSTER_TAG: &str = "cluster";
pub const CLONE_FULL_TAG: &str = "cloneFull";
pub const CLONE_MASK_TAG: &str = "cloneMask";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub scope: Scope,
    pub unit: Unit,
    pub structure: Structure,
    pub extract: ExtractOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            scope: Scope::Model,
            unit: Unit::Name,
            structure: Structure::Unigram,
            extract: ExtractOptions::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub extraction: ExtractionReport,
    pub matrices: Vec<VsmReport>,
    /// `y_pred.json`, when a back end produced cluster labels
    pub predictions: Option<PathBuf>,
}

pub struct Pipeline {
    config: Configuration,
    options: PipelineOptions,
    lexicon: Arc<dyn Lexicon>,
    loader: Box<dyn ModelLoader>,
    backend: Option<Box<dyn StatsBackend>>,
}

impl Pipeline {
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            options: PipelineOptions::default(),
            lexicon: Arc::new(NoLexicon),
            loader: Box::new(JsonModelLoader),
            backend: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_lexicon(mut self, lexicon: Arc<dyn Lexicon>) -> Self {
        self.lexicon = lexicon;
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Box<dyn StatsBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    fn store(&self) -> FeatureStore {
        FeatureStore::new(&self.config.feature_folder)
    }

    /// Preset parameters with the scope of this pipeline
    fn params(&self, preset: fn(Unit, Structure) -> Parameters) -> Parameters {
        Parameters {
            scope: self.options.scope,
            ..preset(self.options.unit, self.options.structure)
        }
    }

    pub fn extract(&self) -> Result<ExtractionReport> {
        if self.loader.extension() != self.config.model_extension {
            warn!(
                "configured model extension '{}' differs from loader extension '{}'",
                self.config.model_extension,
                self.loader.extension()
            );
        }
        let extractor = FeatureExtractor::new(self.options.extract);
        extractor
            .extract_folder(
                self.loader.as_ref(),
                &self.config.data_folder,
                &self.store(),
                self.options.scope,
                self.options.unit,
                self.options.structure,
            )
            .with_context(|| format!("feature extraction from {:?} failed", self.config.data_folder))
    }

    pub fn precompute(&self, params: &Parameters) -> Result<Arc<NlpCache>> {
        let preprocessor = NlpPreprocessor::new(
            self.lexicon.clone(),
            NlpOptions {
                lemmatize: self.options.extract.lemmatize,
            },
        );
        let cache = preprocessor
            .precompute(&self.store(), params.structure, params.synonym_threshold)
            .context("NLP precomputation failed")?;
        Ok(Arc::new(cache))
    }

    pub fn build_vsm(
        &self,
        params: Parameters,
        nlp: Arc<NlpCache>,
        tag: &str,
        sizes: bool,
    ) -> Result<VsmReport> {
        VsmBuilder::new(params, nlp)?
            .with_sizes(sizes)
            .build(&self.store(), &self.config.vsm_folder, tag)
            .with_context(|| format!("building vsm-{} failed", tag))
    }

    /// Extract, build `vsm-cluster.csv`, cluster and publish the labels
    pub fn run_clustering(&self) -> Result<RunReport> {
        info!("starting clustering run on {:?}", self.config.data_folder);
        self.config.prepare()?;
        let extraction = self.extract()?;

        let params = self.params(Parameters::clustering);
        let nlp = self.precompute(&params)?;
        let matrix = self.build_vsm(params, nlp, CLUSTER_TAG, false)?;

        let mut predictions = None;
        if let Some(backend) = &self.backend {
            let clusters = self
                .config
                .clusters
                .ok_or_else(|| anyhow!("no cluster count configured for the back end"))?;
            self.config.reset_results()?;
            backend.cluster(
                &matrix.matrix_path,
                &self.config.vsm_folder.join(NAMES_FILE),
                &self.config.results_folder,
                clusters,
            )?;
            predictions = Some(publish_predictions(
                &self.config.results_folder,
                &self.config.root,
            )?);
        }

        Ok(RunReport {
            extraction,
            matrices: vec![matrix],
            predictions,
        })
    }

    /// Extract, build `vsm-cloneFull.csv` and `vsm-cloneMask.csv`, then rank clones
    pub fn run_clone_detection(&self) -> Result<RunReport> {
        info!("starting clone detection run on {:?}", self.config.data_folder);
        self.config.prepare()?;
        let extraction = self.extract()?;

        let full = self.params(Parameters::clone_full);
        let nlp = self.precompute(&full)?;
        let full = self.build_vsm(full, nlp.clone(), CLONE_FULL_TAG, false)?;
        let mask = self.build_vsm(self.params(Parameters::clone_mask), nlp, CLONE_MASK_TAG, true)?;

        if let Some(backend) = &self.backend {
            let inputs = CloneInputs {
                full: full.matrix_path.clone(),
                mask: mask.matrix_path.clone(),
                names: self.config.vsm_folder.join(NAMES_FILE),
                sizes: self.config.vsm_folder.join(SIZES_FILE),
            };
            self.config.reset_results()?;
            backend.detect_clones(&inputs, &self.config.results_folder)?;
        }

        Ok(RunReport {
            extraction,
            matrices: vec![full, mask],
            predictions: None,
        })
    }
}
