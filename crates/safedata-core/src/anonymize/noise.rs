//! Differential privacy via calibrated numeric noise
//!
//! Every non-null cell of the selected numeric columns is perturbed
//! independently. Laplace noise uses scale sensitivity/epsilon; Gaussian
//! noise uses sigma = sqrt(2 ln 1.25) * sensitivity / epsilon, the standard
//! calibration for (epsilon, delta)-DP with delta = 0.05.

use crate::anonymize::{AnonymizationOutcome, DpMechanism, DpParams};
use crate::dataset::{ColumnType, Dataset, Value};
use crate::rng::PipelineRng;
use crate::Error;

pub(super) fn apply_differential_privacy(
    dataset: &Dataset,
    params: &DpParams,
    rng: &mut PipelineRng,
) -> Result<AnonymizationOutcome, Error> {
    let target_cols: Vec<usize> = match &params.columns {
        Some(names) => {
            let mut cols = Vec::with_capacity(names.len());
            for name in names {
                let col = dataset.require_column(name)?;
                if dataset.column_type(col) == ColumnType::Numeric {
                    cols.push(col);
                }
            }
            cols
        }
        None => dataset.numeric_columns(),
    };

    if target_cols.is_empty() {
        return Ok(AnonymizationOutcome::unchanged(
            dataset.clone(),
            "no numeric columns to perturb; dataset returned unchanged".to_string(),
        ));
    }

    let mut notes = Vec::new();
    if params.epsilon > 5.0 {
        notes.push(format!(
            "epsilon {} is high; the privacy guarantee is weak",
            params.epsilon
        ));
    }
    if params.epsilon < 0.1 {
        notes.push(format!(
            "epsilon {} is very low; expect heavily degraded utility",
            params.epsilon
        ));
    }

    let mut result = dataset.clone();
    for &col in &target_cols {
        for row in 0..dataset.len() {
            if let Some(v) = dataset.value(row, col).as_number() {
                let noise = match params.mechanism {
                    DpMechanism::Laplace => rng.laplace(params.sensitivity / params.epsilon),
                    DpMechanism::Gaussian => {
                        let sigma =
                            (2.0 * 1.25f64.ln()).sqrt() * params.sensitivity / params.epsilon;
                        rng.gaussian(sigma)
                    }
                };
                result.set_value(row, col, Value::Number(v + noise));
            }
        }
    }

    Ok(AnonymizationOutcome {
        dataset: result,
        suppressed_records: 0,
        residual_violating_classes: 0,
        residual_violating_records: 0,
        notes,
    })
}
