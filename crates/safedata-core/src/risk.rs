//! Re-identification risk assessment
//!
//! Builds equivalence classes over the declared quasi-identifiers, derives an
//! overall risk score, simulates attacker models, and scores
//! sensitive-attribute disclosure.
//!
//! # Risk identity
//!
//! Each member of a class of size s carries an individual risk of 1/s. Summed
//! over the s members, every class contributes exactly 1, so the size-weighted
//! average collapses to:
//!
//! ```text
//! overall_risk = class_count / record_count
//! ```
//!
//! The identity is counter-intuitive but deterministic, and it bounds the
//! score to (0, 1] for any non-empty dataset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::dataset::Dataset;
use crate::equivalence::{count_k_violations, partition, EquivalenceClass};
use crate::rng::PipelineRng;
use crate::Error;

/// Attacker models for linkage-attack simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttackScenario {
    /// Attacker knows the target is in the dataset.
    Prosecutor,
    /// Attacker does not know whether the target is present
    /// (fixed 50% presence assumption).
    Journalist,
    /// Attacker wants to re-identify some fraction of a group.
    Marketer,
}

/// Risk classification via the 0.33 / 0.67 thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score <= 0.33 {
            RiskLevel::Low
        } else if score <= 0.67 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// Configuration for one assessment call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiskConfig {
    pub quasi_identifiers: Vec<String>,
    pub sensitive_attributes: Vec<String>,
    /// Classes smaller than this count as k-anonymity violations.
    pub k_threshold: usize,
    /// Fraction of records analyzed; below 1.0 a seeded subsample is drawn.
    pub sample_fraction: f64,
    pub scenarios: Vec<AttackScenario>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            quasi_identifiers: Vec::new(),
            sensitive_attributes: Vec::new(),
            k_threshold: 3,
            sample_fraction: 1.0,
            scenarios: vec![AttackScenario::Prosecutor],
        }
    }
}

/// Disclosure scores for one declared sensitive column.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SensitiveAttributeRisk {
    pub attribute: String,
    /// Size-weighted average of 1 / (distinct sensitive values per class).
    pub disclosure_risk: f64,
    /// Fraction of records whose class holds a single sensitive value.
    pub homogeneity_risk: f64,
}

/// Size statistics of the equivalence-class partition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassSummary {
    pub class_count: usize,
    pub min_size: usize,
    pub max_size: usize,
    pub singleton_count: usize,
}

impl ClassSummary {
    fn from_classes(classes: &[EquivalenceClass]) -> Self {
        ClassSummary {
            class_count: classes.len(),
            min_size: classes.first().map(EquivalenceClass::size).unwrap_or(0),
            max_size: classes.last().map(EquivalenceClass::size).unwrap_or(0),
            singleton_count: classes.iter().filter(|c| c.size() == 1).count(),
        }
    }
}

/// Result of one risk assessment. JSON-serializable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiskProfile {
    pub dataset_size: usize,
    /// Records actually analyzed (after optional subsampling).
    pub analyzed_records: usize,
    pub quasi_identifiers: Vec<String>,
    pub sensitive_attributes: Vec<String>,
    pub k_threshold: usize,
    pub classes: ClassSummary,
    pub k_violations: usize,
    pub k_anonymity_satisfied: bool,
    pub unique_records: usize,
    pub overall_risk: f64,
    pub risk_level: RiskLevel,
    pub attack_risks: BTreeMap<AttackScenario, f64>,
    /// Estimated only when the analyzed sample exceeds 100 records.
    pub population_uniqueness: Option<f64>,
    pub sensitive_attribute_risks: Vec<SensitiveAttributeRisk>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Computes [`RiskProfile`]s for datasets under a fixed configuration.
#[derive(Debug)]
pub struct RiskAssessor {
    config: RiskConfig,
}

impl RiskAssessor {
    /// Validate parameter ranges up front; column names are checked against
    /// the dataset at assessment time.
    pub fn new(config: RiskConfig) -> Result<Self, Error> {
        if config.k_threshold < 1 {
            return Err(Error::InvalidParameter {
                name: "k_threshold",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(config.sample_fraction > 0.0 && config.sample_fraction <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "sample_fraction",
                reason: format!("{} is outside (0, 1]", config.sample_fraction),
            });
        }
        Ok(RiskAssessor { config })
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Assess re-identification risk for one dataset.
    pub fn assess(&self, dataset: &Dataset, rng: &mut PipelineRng) -> Result<RiskProfile, Error> {
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }
        for name in &self.config.quasi_identifiers {
            dataset.require_column(name)?;
        }
        for name in &self.config.sensitive_attributes {
            dataset.require_column(name)?;
        }

        let sample = self.draw_sample(dataset, rng);
        let analyzed = sample.len();
        debug!(
            dataset_size = dataset.len(),
            analyzed, "running risk assessment"
        );

        let classes = partition(&sample, &self.config.quasi_identifiers)?;
        let summary = ClassSummary::from_classes(&classes);
        let k_violations = count_k_violations(&classes, self.config.k_threshold);
        let unique_records = summary.singleton_count;

        let overall_risk = if classes.is_empty() || analyzed == 0 {
            0.0
        } else {
            classes.len() as f64 / analyzed as f64
        };
        let risk_level = RiskLevel::from_score(overall_risk);

        let mut attack_risks = BTreeMap::new();
        for scenario in &self.config.scenarios {
            attack_risks.insert(*scenario, simulate_attack(*scenario, &classes, analyzed));
        }

        let population_uniqueness = if analyzed > 100 {
            Some((unique_records as f64 / analyzed as f64 * 1.5).min(1.0))
        } else {
            None
        };

        let sensitive_attribute_risks =
            assess_sensitive_attributes(&sample, &self.config.sensitive_attributes, &classes)?;

        let warnings = self.quasi_identifier_warnings(dataset);
        let recommendations = recommendations(
            risk_level,
            overall_risk,
            k_violations,
            self.config.k_threshold,
            unique_records,
            &sensitive_attribute_risks,
            self.config.quasi_identifiers.len(),
        );

        Ok(RiskProfile {
            dataset_size: dataset.len(),
            analyzed_records: analyzed,
            quasi_identifiers: self.config.quasi_identifiers.clone(),
            sensitive_attributes: self.config.sensitive_attributes.clone(),
            k_threshold: self.config.k_threshold,
            classes: summary,
            k_violations,
            k_anonymity_satisfied: k_violations == 0,
            unique_records,
            overall_risk,
            risk_level,
            attack_risks,
            population_uniqueness,
            sensitive_attribute_risks,
            warnings,
            recommendations,
        })
    }

    fn draw_sample(&self, dataset: &Dataset, rng: &mut PipelineRng) -> Dataset {
        if self.config.sample_fraction >= 1.0 {
            return dataset.clone();
        }
        let n = dataset.len();
        let take = ((n as f64) * self.config.sample_fraction).round() as usize;
        let positions = rng.sample_indices(n, take.max(1));
        dataset.select_rows(&positions)
    }

    /// A quasi-identifier that is nearly unique per record offers little
    /// grouping and a lot of risk; flag it.
    fn quasi_identifier_warnings(&self, dataset: &Dataset) -> Vec<String> {
        let mut warnings = Vec::new();
        for name in &self.config.quasi_identifiers {
            let col = match dataset.column_index(name) {
                Some(c) => c,
                None => continue,
            };
            let distinct = (0..dataset.len())
                .map(|row| dataset.value(row, col).key())
                .collect::<std::collections::HashSet<_>>()
                .len();
            let ratio = distinct as f64 / dataset.len() as f64;
            if ratio > 0.9 {
                warnings.push(format!(
                    "quasi-identifier '{}' has very high uniqueness ({:.2})",
                    name, ratio
                ));
            }
        }
        warnings
    }
}

fn simulate_attack(scenario: AttackScenario, classes: &[EquivalenceClass], records: usize) -> f64 {
    if classes.is_empty() || records == 0 {
        return 0.0;
    }
    let prosecutor = classes.len() as f64 / records as f64;
    match scenario {
        AttackScenario::Prosecutor => prosecutor,
        AttackScenario::Journalist => prosecutor * 0.5,
        AttackScenario::Marketer => {
            let in_small: usize = classes
                .iter()
                .filter(|c| c.size() <= 5)
                .map(EquivalenceClass::size)
                .sum();
            in_small as f64 / records as f64
        }
    }
}

fn assess_sensitive_attributes(
    sample: &Dataset,
    sensitive_attributes: &[String],
    classes: &[EquivalenceClass],
) -> Result<Vec<SensitiveAttributeRisk>, Error> {
    let mut risks = Vec::new();
    let total = sample.len();
    for name in sensitive_attributes {
        let col = sample.require_column(name)?;
        let mut disclosure_sum = 0.0;
        let mut homogeneous_records = 0usize;
        for class in classes {
            let distinct: std::collections::HashSet<_> = class
                .members
                .iter()
                .map(|&row| sample.value(row, col))
                .filter(|v| !v.is_null())
                .map(|v| v.key())
                .collect();
            if distinct.is_empty() {
                continue;
            }
            disclosure_sum += class.size() as f64 / distinct.len() as f64;
            if distinct.len() == 1 {
                homogeneous_records += class.size();
            }
        }
        let (disclosure_risk, homogeneity_risk) = if total > 0 {
            (
                disclosure_sum / total as f64,
                homogeneous_records as f64 / total as f64,
            )
        } else {
            (0.0, 0.0)
        };
        risks.push(SensitiveAttributeRisk {
            attribute: name.clone(),
            disclosure_risk,
            homogeneity_risk,
        });
    }
    Ok(risks)
}

fn recommendations(
    risk_level: RiskLevel,
    overall_risk: f64,
    k_violations: usize,
    k_threshold: usize,
    unique_records: usize,
    sensitive_risks: &[SensitiveAttributeRisk],
    qi_count: usize,
) -> Vec<String> {
    let mut out = Vec::new();
    match risk_level {
        RiskLevel::High => out.push(
            "HIGH RISK DETECTED: apply strong privacy enhancement techniques immediately"
                .to_string(),
        ),
        RiskLevel::Medium => {
            out.push("MEDIUM RISK: consider applying privacy enhancement techniques".to_string())
        }
        RiskLevel::Low => out.push(
            "LOW RISK: current privacy level may be acceptable for some use cases".to_string(),
        ),
    }
    if k_violations > 0 {
        out.push(format!(
            "Apply k-anonymity with k>={} to address {} violating equivalence classes",
            k_threshold, k_violations
        ));
    }
    if unique_records > 0 {
        out.push(format!(
            "Remove or generalize {} unique records that pose highest risk",
            unique_records
        ));
    }
    if overall_risk > 0.8 {
        out.push(
            "Consider synthetic data generation as original data has very high risk".to_string(),
        );
    }
    for risk in sensitive_risks {
        if risk.disclosure_risk > 0.7 {
            out.push(format!(
                "Apply l-diversity or t-closeness to sensitive attribute '{}'",
                risk.attribute
            ));
        }
    }
    if qi_count > 5 {
        out.push("Consider reducing the number of quasi-identifiers to minimize risk".to_string());
    }
    out
}
