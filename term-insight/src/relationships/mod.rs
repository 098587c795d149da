//! Cross-dataset relationship discovery.
//!
//! Key candidates are extracted per dataset ([`candidates`]), paired across
//! datasets by name ([`naming`]), scored on value overlap and reported with
//! cardinality, orphan analysis and a text diagram ([`report`]).
//!
//! ```rust
//! use term_insight::core::{CellValue, DataSet};
//! use term_insight::relationships::{find_relationships, Cardinality};
//!
//! let customers = DataSet::new(
//!     "customers",
//!     vec!["customer_id".into()],
//!     (1..=10).map(|i| vec![CellValue::from(i as f64)]).collect(),
//! )
//! .unwrap();
//! let orders = DataSet::new(
//!     "orders",
//!     vec!["customer_id".into()],
//!     (0..30).map(|i| vec![CellValue::from((i % 10 + 1) as f64)]).collect(),
//! )
//! .unwrap();
//!
//! let report = find_relationships(&[customers, orders]);
//! assert_eq!(report.relationships[0].cardinality, Cardinality::OneToMany);
//! ```

pub mod candidates;
pub mod discovery;
pub mod naming;
pub mod report;

pub use candidates::{extract_candidates, KeyCandidate};
pub use discovery::{
    find_relationships, relationship_confidence, RelationshipConfig, RelationshipEngine,
};
pub use naming::{is_identifier_name, match_type, normalize_name, MatchType};
pub use report::{Cardinality, MatchStatistics, OrphanAnalysis, Relationship, RelationshipReport};
