//! Relationship result types and their text rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::naming::MatchType;
use crate::core::ConfidenceLevel;

/// Row multiplicity on each side of a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Cardinality {
    /// Builds the cardinality from whether each side holds unique keys.
    pub fn from_sides(source_is_one: bool, target_is_one: bool) -> Self {
        match (source_is_one, target_is_one) {
            (true, true) => Cardinality::OneToOne,
            (true, false) => Cardinality::OneToMany,
            (false, true) => Cardinality::ManyToOne,
            (false, false) => Cardinality::ManyToMany,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "one_to_one",
            Cardinality::OneToMany => "one_to_many",
            Cardinality::ManyToOne => "many_to_one",
            Cardinality::ManyToMany => "many_to_many",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value-level agreement between two key columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MatchStatistics {
    pub matched_count: usize,
    pub source_unique: usize,
    pub target_unique: usize,
    pub source_orphans: usize,
    pub target_orphans: usize,
    /// Matched values over the smaller distinct set, 0-100.
    pub match_percentage: f64,
}

/// A discovered join between two datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Relationship {
    pub source_dataset: String,
    pub source_column: String,
    pub target_dataset: String,
    pub target_column: String,
    pub cardinality: Cardinality,
    pub match_type: MatchType,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub statistics: MatchStatistics,
}

impl Relationship {
    /// Whether this relationship links the two named datasets, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source_dataset == a && self.target_dataset == b)
            || (self.source_dataset == b && self.target_dataset == a)
    }

    fn pair(&self) -> (&str, &str) {
        (&self.source_dataset, &self.target_dataset)
    }
}

/// Unmatched keys on either side of a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrphanAnalysis {
    pub source_dataset: String,
    pub source_column: String,
    pub target_dataset: String,
    pub target_column: String,
    pub source_orphan_count: usize,
    pub target_orphan_count: usize,
    pub source_orphan_percentage: f64,
    pub target_orphan_percentage: f64,
    pub reasons: Vec<String>,
    /// Up to five orphan values per side, sorted.
    pub source_samples: Vec<String>,
    pub target_samples: Vec<String>,
}

/// Everything discovered across a set of datasets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RelationshipReport {
    /// Highest confidence first.
    pub relationships: Vec<Relationship>,
    pub orphan_analysis: Vec<OrphanAnalysis>,
    pub diagram: String,
    pub summary: String,
}

impl RelationshipReport {
    /// Report for an input that cannot contain relationships.
    pub fn single_dataset(dataset_count: usize) -> Self {
        Self {
            summary: format!(
                "Relationship discovery needs at least 2 datasets; {dataset_count} provided"
            ),
            ..Self::default()
        }
    }

    /// Highest-confidence relationship between two datasets.
    pub fn best_between(&self, a: &str, b: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.connects(a, b))
    }
}

/// Dataset pairs in order of their best relationship.
///
/// `relationships` must already be sorted by confidence.
fn ordered_pairs(relationships: &[Relationship]) -> Vec<(&str, &str)> {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    for rel in relationships {
        let pair = rel.pair();
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }
    pairs
}

/// Plain-text diagram grouped by dataset pair.
pub fn build_diagram(relationships: &[Relationship]) -> String {
    let mut lines = Vec::new();
    for (source, target) in ordered_pairs(relationships) {
        lines.push(format!("{source} <-> {target}"));
        for rel in relationships.iter().filter(|r| r.pair() == (source, target)) {
            lines.push(format!(
                "  {}.{} --[{}, {}, {:.0}%]--> {}.{}",
                rel.source_dataset,
                rel.source_column,
                rel.cardinality,
                rel.match_type.as_str(),
                rel.confidence,
                rel.target_dataset,
                rel.target_column,
            ));
        }
    }
    lines.join("\n")
}

/// One-paragraph summary grouped by dataset pair.
pub fn build_summary(relationships: &[Relationship], dataset_count: usize) -> String {
    if relationships.is_empty() {
        return format!("No relationships found across {dataset_count} datasets");
    }

    let pairs = ordered_pairs(relationships);
    let mut lines = vec![format!(
        "Found {} relationship(s) across {} dataset pair(s)",
        relationships.len(),
        pairs.len()
    )];
    for (source, target) in pairs {
        let in_pair: Vec<&Relationship> =
            relationships.iter().filter(|r| r.pair() == (source, target)).collect();
        let best = in_pair.first().map(|r| r.confidence).unwrap_or_default();
        lines.push(format!(
            "- {source} and {target}: {} relationship(s), best confidence {best:.0}%",
            in_pair.len()
        ));
    }
    lines.join("\n")
}
