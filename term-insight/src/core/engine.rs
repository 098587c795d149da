//! The [`InsightEngine`] facade.

use tracing::instrument;

use crate::analyzers::{AnalysisResult, DataSetAnalyzer};
use crate::config::InsightConfig;
use crate::core::DataSet;
use crate::error::Result;
use crate::hypothesis::{Hypothesis, HypothesisGenerator, HypothesisTestResult, HypothesisTester};
use crate::inference::{SchemaInference, SchemaInferenceEngine};
use crate::{log_info, log_timing};
use crate::logging::LogConfig;
use crate::relationships::{RelationshipEngine, RelationshipReport};
use crate::sampling::chunked::ChunkProcessor;
use crate::sampling::{
    timed, AnalysisCache, DatasetSampler, ProcessingStrategy, ProgressCallback, Stopwatch,
};

/// Analysis of a dataset together with how it was prepared.
#[derive(Debug, Clone)]
pub struct EngineAnalysis {
    pub analysis: AnalysisResult,
    pub strategy: ProcessingStrategy,
    pub warning: Option<String>,
    /// Whether the result came from the cache
    pub cached: bool,
    /// Wall-clock time spent sampling and analyzing; 0 for cache hits
    pub elapsed_ms: f64,
}

/// Builder for [`InsightEngine`].
#[derive(Default)]
pub struct InsightEngineBuilder {
    config: InsightConfig,
    log_config: LogConfig,
    inference: Option<SchemaInferenceEngine>,
}

impl InsightEngineBuilder {
    /// Replace the whole configuration
    pub fn config(mut self, config: InsightConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the logging configuration
    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Use a custom schema inference engine, e.g. one with extra scorers
    pub fn inference_engine(mut self, engine: SchemaInferenceEngine) -> Self {
        self.inference = Some(engine);
        self
    }

    /// Validates the configuration and builds the engine.
    pub fn build(self) -> Result<InsightEngine> {
        self.config.validate()?;
        let config = self.config;
        let log_config = self.log_config;

        let inference = self.inference.unwrap_or_else(|| {
            SchemaInferenceEngine::builder()
                .config(config.inference.clone())
                .log_config(log_config.clone())
                .build()
        });

        Ok(InsightEngine {
            analyzer: DataSetAnalyzer::with_config(config.analysis.clone())
                .with_log_config(log_config.clone()),
            sampler: DatasetSampler::with_config(config.sampling.clone())
                .with_log_config(log_config.clone()),
            inference,
            generator: HypothesisGenerator::with_config(config.hypothesis.clone()),
            tester: HypothesisTester::new(),
            relationships: RelationshipEngine::with_config(config.relationships.clone()),
            cache: AnalysisCache::new(),
            config,
            log_config,
        })
    }
}

/// One entry point for every analysis the crate offers.
///
/// The engine owns an [`AnalysisCache`]; [`InsightEngine::analyze`] takes
/// `&mut self` so the cache needs no interior locking.
///
/// # Examples
///
/// ```rust
/// use term_insight::core::{CellValue, DataSet, InsightEngine};
///
/// let rows = (0..20)
///     .map(|i| vec![CellValue::from(i as f64), CellValue::from(2.0 * i as f64)])
///     .collect();
/// let ds = DataSet::new("metrics", vec!["x".into(), "y".into()], rows).unwrap();
///
/// let mut engine = InsightEngine::new();
/// let first = engine.analyze(&ds);
/// let second = engine.analyze(&ds);
/// assert!(!first.cached);
/// assert!(second.cached);
/// ```
pub struct InsightEngine {
    config: InsightConfig,
    log_config: LogConfig,
    analyzer: DataSetAnalyzer,
    sampler: DatasetSampler,
    inference: SchemaInferenceEngine,
    generator: HypothesisGenerator,
    tester: HypothesisTester,
    relationships: RelationshipEngine,
    cache: AnalysisCache,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    pub fn builder() -> InsightEngineBuilder {
        InsightEngineBuilder::default()
    }

    /// Creates an engine with default thresholds.
    pub fn new() -> Self {
        let config = InsightConfig::default();
        let log_config = LogConfig::default();
        Self {
            analyzer: DataSetAnalyzer::with_config(config.analysis.clone()),
            sampler: DatasetSampler::with_config(config.sampling.clone()),
            inference: SchemaInferenceEngine::new(),
            generator: HypothesisGenerator::with_config(config.hypothesis.clone()),
            tester: HypothesisTester::new(),
            relationships: RelationshipEngine::with_config(config.relationships.clone()),
            cache: AnalysisCache::new(),
            config,
            log_config,
        }
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut AnalysisCache {
        &mut self.cache
    }

    /// Sizing decision for a dataset under this engine's configuration.
    pub fn processing_strategy(&self, dataset: &DataSet) -> ProcessingStrategy {
        self.sampler.strategy(dataset)
    }

    /// Samples if needed, then analyzes, reusing a cached result when one is live.
    ///
    /// The cache is keyed by the original dataset, before sampling.
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name, rows = dataset.row_count()))]
    pub fn analyze(&mut self, dataset: &DataSet) -> EngineAnalysis {
        let strategy = self.sampler.strategy(dataset);

        if self.config.use_cache {
            if let Some(hit) = self.cache.get(dataset) {
                log_info!(self.log_config, "Returning cached analysis");
                return EngineAnalysis {
                    analysis: hit.clone(),
                    warning: strategy.warning.clone(),
                    strategy,
                    cached: true,
                    elapsed_ms: 0.0,
                };
            }
        }

        let stopwatch = Stopwatch::start("insight_engine.analyze");
        let prepared = self.sampler.prepare(dataset);
        let analysis = self.analyzer.analyze(&prepared.processed_data);
        let elapsed_ms = stopwatch.finish();
        log_timing!(
            self.log_config,
            dataset = %dataset.name,
            sampled = prepared.is_sampled(),
            elapsed_ms,
            "Engine analysis finished"
        );

        if self.config.use_cache {
            self.cache.set(dataset, analysis.clone());
        }

        EngineAnalysis {
            analysis,
            strategy: prepared.strategy,
            warning: prepared.warning,
            cached: false,
            elapsed_ms,
        }
    }

    /// Like [`InsightEngine::analyze`], but splits chunked tiers into blocks
    /// analyzed one after another and merged.
    pub async fn analyze_chunked(
        &mut self,
        dataset: &DataSet,
        on_progress: Option<ProgressCallback>,
    ) -> Result<EngineAnalysis> {
        let strategy = self.sampler.strategy(dataset);
        if !strategy.use_chunking {
            return Ok(self.analyze(dataset));
        }

        if self.config.use_cache {
            if let Some(hit) = self.cache.get(dataset) {
                return Ok(EngineAnalysis {
                    analysis: hit.clone(),
                    warning: strategy.warning.clone(),
                    strategy,
                    cached: true,
                    elapsed_ms: 0.0,
                });
            }
        }

        let stopwatch = Stopwatch::start("insight_engine.analyze_chunked");
        let prepared = self.sampler.prepare(dataset);
        let analysis = ChunkProcessor::new(prepared.strategy.chunk_size)
            .with_progress_callback(on_progress)
            .run(&prepared.processed_data, &self.analyzer)
            .await?;
        let elapsed_ms = stopwatch.finish();

        if self.config.use_cache {
            self.cache.set(dataset, analysis.clone());
        }

        Ok(EngineAnalysis {
            analysis,
            strategy: prepared.strategy,
            warning: prepared.warning,
            cached: false,
            elapsed_ms,
        })
    }

    pub fn infer_schema(&self, dataset: &DataSet) -> SchemaInference {
        self.inference.infer(dataset)
    }

    pub fn generate_hypotheses(
        &self,
        dataset: &DataSet,
        analysis: &AnalysisResult,
    ) -> Vec<Hypothesis> {
        self.generator.generate(dataset, analysis)
    }

    pub fn test_hypothesis(
        &self,
        dataset: &DataSet,
        hypothesis: &Hypothesis,
    ) -> HypothesisTestResult {
        self.tester.test(dataset, hypothesis)
    }

    pub fn find_relationships(&self, datasets: &[DataSet]) -> RelationshipReport {
        let (report, elapsed_ms) =
            timed("insight_engine.find_relationships", || self.relationships.find(datasets));
        log_timing!(
            self.log_config,
            datasets = datasets.len(),
            relationships = report.relationships.len(),
            elapsed_ms,
            "Relationship discovery finished"
        );
        report
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
