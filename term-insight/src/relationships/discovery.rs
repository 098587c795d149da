//! Cross-dataset join discovery.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::candidates::{extract_candidates, KeyCandidate};
use super::naming::match_type;
use super::report::{
    build_diagram, build_summary, Cardinality, MatchStatistics, OrphanAnalysis, Relationship,
    RelationshipReport,
};
use crate::core::{ConfidenceLevel, DataSet};
use crate::error::{InsightError, Result};

/// Thresholds for relationship discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipConfig {
    /// Unique ratio above which an unnamed column becomes a key candidate
    pub min_unique_ratio: f64,
    /// Uniqueness above which a join side counts as "one"
    pub one_side_uniqueness: f64,
    /// Relationships scoring below this are dropped
    pub min_confidence: f64,
    /// Orphan values reported per side
    pub max_orphan_samples: usize,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            min_unique_ratio: 0.5,
            one_side_uniqueness: 0.95,
            min_confidence: 30.0,
            max_orphan_samples: 5,
        }
    }
}

impl RelationshipConfig {
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_min_unique_ratio(mut self, ratio: f64) -> Self {
        self.min_unique_ratio = ratio;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_unique_ratio", self.min_unique_ratio),
            ("one_side_uniqueness", self.one_side_uniqueness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(InsightError::invalid_config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        if !(0.0..=100.0).contains(&self.min_confidence) {
            return Err(InsightError::invalid_config(format!(
                "min_confidence must be between 0 and 100, got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

/// Scores a candidate pair from its match type and value overlap.
pub fn relationship_confidence(base: f64, match_percentage: f64, matched_count: usize) -> f64 {
    let mut confidence = base;

    if match_percentage >= 90.0 {
        confidence += 20.0;
    } else if match_percentage >= 70.0 {
        confidence += 10.0;
    } else if match_percentage < 20.0 {
        confidence -= 20.0;
    } else if match_percentage < 50.0 {
        confidence -= 10.0;
    }

    if matched_count >= 50 {
        confidence += 10.0;
    } else if matched_count < 5 {
        confidence -= 10.0;
    }

    confidence.clamp(0.0, 100.0)
}

fn match_statistics(source: &KeyCandidate, target: &KeyCandidate) -> MatchStatistics {
    let matched_count = source.values.intersection(&target.values).count();
    let smaller = source.unique_count().min(target.unique_count());
    let match_percentage = if smaller == 0 {
        0.0
    } else {
        matched_count as f64 / smaller as f64 * 100.0
    };
    MatchStatistics {
        matched_count,
        source_unique: source.unique_count(),
        target_unique: target.unique_count(),
        source_orphans: source.unique_count() - matched_count,
        target_orphans: target.unique_count() - matched_count,
        match_percentage,
    }
}

fn orphan_reasons(side: &str, percentage: f64) -> Option<String> {
    if percentage <= 0.0 {
        None
    } else if percentage > 50.0 {
        Some(format!(
            "{percentage:.1}% of {side} values have no match: the columns may be unrelated or use different key formats"
        ))
    } else if percentage >= 10.0 {
        Some(format!(
            "{percentage:.1}% of {side} values have no match: records may be missing or deleted on the other side"
        ))
    } else {
        Some(format!(
            "{percentage:.1}% of {side} values have no match: likely data entry errors or recently added records"
        ))
    }
}

/// Finds join relationships between datasets.
#[derive(Debug, Clone, Default)]
pub struct RelationshipEngine {
    config: RelationshipConfig,
}

impl RelationshipEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RelationshipConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RelationshipConfig {
        &self.config
    }

    /// Discovers relationships across every pair of datasets.
    ///
    /// Datasets earlier in the slice become the source side. Fewer than two
    /// datasets yield an empty report that says so.
    #[instrument(skip(self, datasets), fields(datasets = datasets.len()))]
    pub fn find(&self, datasets: &[DataSet]) -> RelationshipReport {
        if datasets.len() < 2 {
            debug!("Skipping relationship discovery for a single dataset");
            return RelationshipReport::single_dataset(datasets.len());
        }

        let candidates: Vec<Vec<KeyCandidate>> = datasets
            .iter()
            .map(|ds| extract_candidates(ds, self.config.min_unique_ratio))
            .collect();

        let mut relationships = Vec::new();
        let mut orphan_analysis = Vec::new();

        for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                for source in &candidates[i] {
                    for target in &candidates[j] {
                        if let Some((rel, orphans)) = self.evaluate(source, target) {
                            relationships.push(rel);
                            orphan_analysis.extend(orphans);
                        }
                    }
                }
            }
        }

        relationships.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        info!(
            relationships = relationships.len(),
            orphan_reports = orphan_analysis.len(),
            "Relationship discovery complete"
        );

        RelationshipReport {
            diagram: build_diagram(&relationships),
            summary: build_summary(&relationships, datasets.len()),
            relationships,
            orphan_analysis,
        }
    }

    fn evaluate(
        &self,
        source: &KeyCandidate,
        target: &KeyCandidate,
    ) -> Option<(Relationship, Option<OrphanAnalysis>)> {
        let match_type = match_type(&source.column, &target.column)?;
        let statistics = match_statistics(source, target);
        let confidence = relationship_confidence(
            match_type.base_confidence(),
            statistics.match_percentage,
            statistics.matched_count,
        );

        if confidence < self.config.min_confidence {
            debug!(
                source = %source.column,
                target = %target.column,
                confidence,
                "Discarding low-confidence relationship"
            );
            return None;
        }

        let cardinality = Cardinality::from_sides(
            source.is_one_side(self.config.one_side_uniqueness),
            target.is_one_side(self.config.one_side_uniqueness),
        );
        let orphans = self.orphan_analysis(source, target, &statistics);

        let relationship = Relationship {
            source_dataset: source.dataset.clone(),
            source_column: source.column.clone(),
            target_dataset: target.dataset.clone(),
            target_column: target.column.clone(),
            cardinality,
            match_type,
            confidence,
            confidence_level: ConfidenceLevel::from_score(confidence),
            statistics,
        };
        Some((relationship, orphans))
    }

    fn orphan_analysis(
        &self,
        source: &KeyCandidate,
        target: &KeyCandidate,
        statistics: &MatchStatistics,
    ) -> Option<OrphanAnalysis> {
        if statistics.source_orphans == 0 && statistics.target_orphans == 0 {
            return None;
        }

        let percentage = |orphans: usize, unique: usize| {
            if unique == 0 {
                0.0
            } else {
                orphans as f64 / unique as f64 * 100.0
            }
        };
        let source_pct = percentage(statistics.source_orphans, statistics.source_unique);
        let target_pct = percentage(statistics.target_orphans, statistics.target_unique);

        let source_label = format!("{}.{}", source.dataset, source.column);
        let target_label = format!("{}.{}", target.dataset, target.column);
        let reasons = [
            orphan_reasons(&source_label, source_pct),
            orphan_reasons(&target_label, target_pct),
        ]
        .into_iter()
        .flatten()
        .collect();

        // BTreeSet iteration is already sorted
        let samples = |own: &KeyCandidate, other: &KeyCandidate| -> Vec<String> {
            own.values
                .difference(&other.values)
                .take(self.config.max_orphan_samples)
                .cloned()
                .collect()
        };

        Some(OrphanAnalysis {
            source_dataset: source.dataset.clone(),
            source_column: source.column.clone(),
            target_dataset: target.dataset.clone(),
            target_column: target.column.clone(),
            source_orphan_count: statistics.source_orphans,
            target_orphan_count: statistics.target_orphans,
            source_orphan_percentage: source_pct,
            target_orphan_percentage: target_pct,
            reasons,
            source_samples: samples(source, target),
            target_samples: samples(target, source),
        })
    }
}

/// Runs [`RelationshipEngine`] with default thresholds.
pub fn find_relationships(datasets: &[DataSet]) -> RelationshipReport {
    RelationshipEngine::new().find(datasets)
}
