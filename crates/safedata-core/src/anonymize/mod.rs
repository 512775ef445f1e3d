//! Anonymization techniques
//!
//! Transforms a dataset under a chosen privacy technique and parameter set.
//! Technique and method selection are closed enums matched exhaustively; the
//! parameter bundle is embedded in the technique variant so an invalid
//! combination cannot be expressed.
//!
//! Parameter ranges are validated before any computation touches the data.
//! Conditions that stop a single step but not the whole call (no numeric
//! columns for differential privacy, a missing sensitive column) are reported
//! as notes on the [`AnonymizationOutcome`], and residual k-anonymity
//! violations left behind by a capped suppression pass are surfaced in the
//! outcome metadata rather than hidden.

mod clustering;
mod diversity;
mod noise;
mod recoding;
mod synthetic;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Dataset;
use crate::rng::PipelineRng;
use crate::Error;

/// Replacement marker for suppressed cell values.
pub const WILDCARD: &str = "*";

/// Generalization strategy for k-anonymity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneralizationMethod {
    /// Rewrite whole columns: numeric columns into quantile range labels,
    /// infrequent categorical values into the wildcard.
    GlobalRecoding,
    /// Rewrite only the members of undersized equivalence classes.
    LocalRecoding,
    /// K-means over encoded quasi-identifiers; undersized clusters are
    /// collapsed onto their centroid.
    Clustering,
}

/// Diversity predicate for l-diversity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiversityMethod {
    /// Distinct sensitive values per class >= l.
    Distinct,
    /// Shannon entropy of the class's sensitive distribution >= log2(l).
    Entropy,
    /// Simplified recursive (c,l)-diversity; checks the distinct predicate.
    Recursive,
}

/// Distance between a class's sensitive distribution and the global one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMeasure {
    /// Half the L1 distance between the two distributions.
    EarthMover,
    /// Hierarchy-aware distance; currently evaluated as EarthMover.
    Hierarchical,
}

/// Noise mechanism for differential privacy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DpMechanism {
    Laplace,
    Gaussian,
}

/// Generator family for synthetic data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyntheticMethod {
    Statistical,
    /// Falls back to the statistical generator with both preservation
    /// options enabled.
    Copula,
    /// Falls back to the statistical generator with both preservation
    /// options enabled.
    GanBased,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KAnonymityParams {
    pub k: usize,
    pub quasi_identifiers: Vec<String>,
    pub method: GeneralizationMethod,
    /// Maximum fraction of records suppression may remove.
    pub suppression_limit: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LDiversityParams {
    pub l: usize,
    pub quasi_identifiers: Vec<String>,
    pub sensitive_attribute: String,
    pub method: DiversityMethod,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TClosenessParams {
    pub t: f64,
    pub quasi_identifiers: Vec<String>,
    pub sensitive_attribute: String,
    pub distance: DistanceMeasure,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DpParams {
    /// Privacy budget; lower is more private.
    pub epsilon: f64,
    /// Maximum influence of one record on a query result.
    pub sensitivity: f64,
    pub mechanism: DpMechanism,
    /// Columns to perturb; `None` selects every numeric column.
    pub columns: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyntheticParams {
    pub method: SyntheticMethod,
    /// Output size relative to the original row count.
    pub sample_fraction: f64,
    pub preserve_correlations: bool,
    pub preserve_distributions: bool,
}

/// A privacy technique with its parameter bundle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Technique {
    KAnonymity(KAnonymityParams),
    LDiversity(LDiversityParams),
    TCloseness(TClosenessParams),
    DifferentialPrivacy(DpParams),
    Synthetic(SyntheticParams),
}

impl Technique {
    /// Range-check every parameter. Runs before any computation; a failure
    /// here is fatal for the call and never retried.
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            Technique::KAnonymity(p) => {
                check_range_usize("k", p.k, 2, 20)?;
                check_suppression_limit(p.suppression_limit)
            }
            Technique::LDiversity(p) => check_range_usize("l", p.l, 2, 10),
            Technique::TCloseness(p) => {
                if !(p.t > 0.0 && p.t <= 1.0) {
                    return Err(Error::InvalidParameter {
                        name: "t",
                        reason: format!("{} is outside (0, 1]", p.t),
                    });
                }
                Ok(())
            }
            Technique::DifferentialPrivacy(p) => {
                if !(p.epsilon > 0.0 && p.epsilon <= 10.0) {
                    return Err(Error::InvalidParameter {
                        name: "epsilon",
                        reason: format!("{} is outside (0, 10]", p.epsilon),
                    });
                }
                if !(p.sensitivity > 0.0 && p.sensitivity.is_finite()) {
                    return Err(Error::InvalidParameter {
                        name: "sensitivity",
                        reason: format!("{} must be positive and finite", p.sensitivity),
                    });
                }
                Ok(())
            }
            Technique::Synthetic(p) => {
                if !(p.sample_fraction > 0.0 && p.sample_fraction <= 2.0) {
                    return Err(Error::InvalidParameter {
                        name: "sample_fraction",
                        reason: format!("{} is outside (0, 2]", p.sample_fraction),
                    });
                }
                Ok(())
            }
        }
    }
}

fn check_range_usize(name: &'static str, value: usize, lo: usize, hi: usize) -> Result<(), Error> {
    if value < lo || value > hi {
        return Err(Error::InvalidParameter {
            name,
            reason: format!("{} is outside [{}, {}]", value, lo, hi),
        });
    }
    Ok(())
}

fn check_suppression_limit(limit: f64) -> Result<(), Error> {
    if !(0.0..=1.0).contains(&limit) {
        return Err(Error::InvalidParameter {
            name: "suppression_limit",
            reason: format!("{} is outside [0, 1]", limit),
        });
    }
    Ok(())
}

/// Result of one anonymization call: the transformed dataset plus metadata
/// the caller must inspect before trusting the privacy guarantee.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnonymizationOutcome {
    pub dataset: Dataset,
    /// Records removed by suppression.
    pub suppressed_records: usize,
    /// Classes still below k after a capped suppression pass.
    pub residual_violating_classes: usize,
    /// Records in those residual classes.
    pub residual_violating_records: usize,
    /// Skipped steps and parameter advisories.
    pub notes: Vec<String>,
}

impl AnonymizationOutcome {
    fn unchanged(dataset: Dataset, note: String) -> Self {
        AnonymizationOutcome {
            dataset,
            suppressed_records: 0,
            residual_violating_classes: 0,
            residual_violating_records: 0,
            notes: vec![note],
        }
    }
}

/// Applies privacy techniques to datasets. Stateless; the random source is
/// supplied per call.
pub struct Anonymizer;

impl Anonymizer {
    /// Transform `dataset` under `technique`, returning a new dataset.
    /// The input is never mutated.
    pub fn apply(
        dataset: &Dataset,
        technique: &Technique,
        rng: &mut PipelineRng,
    ) -> Result<AnonymizationOutcome, Error> {
        technique.validate()?;
        debug!(rows = dataset.len(), "applying anonymization technique");

        match technique {
            Technique::KAnonymity(p) => apply_k_anonymity(dataset, p, rng),
            Technique::LDiversity(p) => diversity::apply_l_diversity(dataset, p),
            Technique::TCloseness(p) => diversity::apply_t_closeness(dataset, p),
            Technique::DifferentialPrivacy(p) => noise::apply_differential_privacy(dataset, p, rng),
            Technique::Synthetic(p) => synthetic::generate(dataset, p, rng),
        }
    }
}

fn apply_k_anonymity(
    dataset: &Dataset,
    params: &KAnonymityParams,
    rng: &mut PipelineRng,
) -> Result<AnonymizationOutcome, Error> {
    if params.quasi_identifiers.is_empty() {
        // No-op, not an error: nothing to generalize over.
        return Ok(AnonymizationOutcome::unchanged(
            dataset.clone(),
            "empty quasi-identifier list; dataset returned unchanged".to_string(),
        ));
    }
    for name in &params.quasi_identifiers {
        dataset.require_column(name)?;
    }

    let mut notes = Vec::new();
    if params.suppression_limit > 0.5 {
        notes.push(format!(
            "suppression_limit {} exceeds the usual 0.5 ceiling",
            params.suppression_limit
        ));
    }

    let generalized = match params.method {
        GeneralizationMethod::GlobalRecoding => {
            recoding::global_recode(dataset, params.k, &params.quasi_identifiers)?
        }
        GeneralizationMethod::LocalRecoding => {
            recoding::local_recode(dataset, params.k, &params.quasi_identifiers)?
        }
        GeneralizationMethod::Clustering => {
            clustering::cluster_generalize(dataset, params.k, &params.quasi_identifiers, rng)?
        }
    };

    let suppression = recoding::suppress(
        &generalized,
        params.k,
        &params.quasi_identifiers,
        params.suppression_limit,
    )?;

    Ok(AnonymizationOutcome {
        dataset: suppression.dataset,
        suppressed_records: suppression.suppressed_records,
        residual_violating_classes: suppression.residual_violating_classes,
        residual_violating_records: suppression.residual_violating_records,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k_anonymity(k: usize, limit: f64) -> Technique {
        Technique::KAnonymity(KAnonymityParams {
            k,
            quasi_identifiers: vec!["qi".into()],
            method: GeneralizationMethod::GlobalRecoding,
            suppression_limit: limit,
        })
    }

    #[test]
    fn test_parameter_ranges() {
        assert!(k_anonymity(2, 0.1).validate().is_ok());
        assert!(k_anonymity(1, 0.1).validate().is_err());
        assert!(k_anonymity(21, 0.1).validate().is_err());
        assert!(k_anonymity(3, -0.1).validate().is_err());
        assert!(k_anonymity(3, 1.1).validate().is_err());

        let l = Technique::LDiversity(LDiversityParams {
            l: 11,
            quasi_identifiers: vec![],
            sensitive_attribute: "s".into(),
            method: DiversityMethod::Distinct,
        });
        assert!(l.validate().is_err());

        let t = Technique::TCloseness(TClosenessParams {
            t: 0.0,
            quasi_identifiers: vec![],
            sensitive_attribute: "s".into(),
            distance: DistanceMeasure::EarthMover,
        });
        assert!(t.validate().is_err());

        let dp = Technique::DifferentialPrivacy(DpParams {
            epsilon: 10.5,
            sensitivity: 1.0,
            mechanism: DpMechanism::Laplace,
            columns: None,
        });
        assert!(dp.validate().is_err());

        let synth = Technique::Synthetic(SyntheticParams {
            method: SyntheticMethod::Statistical,
            sample_fraction: 0.0,
            preserve_correlations: true,
            preserve_distributions: true,
        });
        assert!(synth.validate().is_err());
    }

    #[test]
    fn test_empty_qi_list_is_noop() {
        use crate::dataset::{Dataset, Value};
        let ds = Dataset::from_rows(
            vec!["a".into()],
            vec![vec![Value::Number(1.0)], vec![Value::Number(2.0)]],
        )
        .unwrap();
        let technique = Technique::KAnonymity(KAnonymityParams {
            k: 3,
            quasi_identifiers: vec![],
            method: GeneralizationMethod::GlobalRecoding,
            suppression_limit: 0.1,
        });
        let mut rng = PipelineRng::from_seed(1);
        let outcome = Anonymizer::apply(&ds, &technique, &mut rng).unwrap();
        assert_eq!(outcome.dataset, ds);
        assert!(!outcome.notes.is_empty());
    }
}
