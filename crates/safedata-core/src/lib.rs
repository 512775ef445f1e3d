//! SafeData Core - Tabular Data Privacy Library
//!
//! Pure Rust implementation of a privacy pipeline for tabular data:
//! re-identification risk assessment, anonymization, and utility
//! measurement over in-memory datasets.
//!
//! # Features
//!
//! - Equivalence-class risk profiling with prosecutor/journalist/marketer
//!   attack simulation
//! - K-anonymity (global recoding, local recoding, clustering), l-diversity,
//!   t-closeness, differential privacy, synthetic data generation
//! - Six utility metrics with an aggregate score and recommendations
//! - Fully deterministic: all randomness flows through one caller-seeded
//!   source, so identical seeds give bit-identical outputs
//!
//! # Example
//!
//! ```rust
//! use safedata_core::{Dataset, PipelineRng, RiskAssessor, RiskConfig, Value};
//!
//! let dataset = Dataset::from_rows(
//!     vec!["age".into(), "city".into()],
//!     vec![
//!         vec![Value::Number(34.0), Value::Text("Pune".into())],
//!         vec![Value::Number(34.0), Value::Text("Pune".into())],
//!         vec![Value::Number(29.0), Value::Text("Delhi".into())],
//!     ],
//! )
//! .unwrap();
//!
//! let config = RiskConfig {
//!     quasi_identifiers: vec!["age".into(), "city".into()],
//!     ..RiskConfig::default()
//! };
//! let mut rng = PipelineRng::from_seed(42);
//! let profile = RiskAssessor::new(config).unwrap().assess(&dataset, &mut rng).unwrap();
//! println!("overall risk: {:.3}", profile.overall_risk);
//! ```

pub mod anonymize;
pub mod dataset;
pub mod equivalence;
pub mod risk;
pub mod rng;
pub mod utility;

// Re-export commonly used types for convenience
pub use anonymize::{AnonymizationOutcome, Anonymizer, Technique};
pub use dataset::{ColumnType, Dataset, RecordId, Value, ValueKey};
pub use equivalence::{partition, EquivalenceClass};
pub use risk::{AttackScenario, RiskAssessor, RiskConfig, RiskLevel, RiskProfile};
pub use rng::PipelineRng;
pub use utility::{MetricId, MetricOutcome, UtilityEvaluator, UtilityLevel, UtilityReport};

use thiserror::Error as ThisError;

/// Errors that can occur across the pipeline stages
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error {
    /// A parameter is outside its documented range
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// A named column does not exist in the dataset
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    /// The operation needs at least one record
    #[error("dataset is empty")]
    EmptyDataset,
}
