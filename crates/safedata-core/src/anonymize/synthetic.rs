//! Synthetic data generation
//!
//! The statistical generator samples each column independently from its
//! marginal (empirical resampling when distribution preservation is on, a
//! fitted normal otherwise; frequency-weighted draws for categorical and
//! temporal columns), then optionally re-injects pairwise correlations that
//! were strong in the source. Copula and GAN generators are not implemented
//! and fall back to the statistical path with both preservation options
//! forced on.
//!
//! Synthetic records are new records: the output carries fresh record ids
//! and no row corresponds to any source individual.

use std::collections::HashMap;

use tracing::debug;

use crate::anonymize::{AnonymizationOutcome, SyntheticMethod, SyntheticParams};
use crate::dataset::{ColumnType, Dataset, Value, ValueKey};
use crate::rng::PipelineRng;
use crate::Error;

/// Minimum absolute Pearson correlation worth re-injecting.
const CORRELATION_FLOOR: f64 = 0.3;

pub(super) fn generate(
    dataset: &Dataset,
    params: &SyntheticParams,
    rng: &mut PipelineRng,
) -> Result<AnonymizationOutcome, Error> {
    if dataset.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let mut notes = Vec::new();
    let (preserve_correlations, preserve_distributions) = match params.method {
        SyntheticMethod::Statistical => {
            (params.preserve_correlations, params.preserve_distributions)
        }
        SyntheticMethod::Copula | SyntheticMethod::GanBased => {
            notes.push(
                "requested generator is not implemented; fell back to the statistical generator"
                    .to_string(),
            );
            (true, true)
        }
    };

    let out_len = (dataset.len() as f64 * params.sample_fraction).round() as usize;
    debug!(source_rows = dataset.len(), out_len, "generating synthetic data");

    let columns = dataset.column_names().to_vec();
    let mut cells: Vec<Vec<Value>> = Vec::with_capacity(columns.len());
    for col in 0..columns.len() {
        cells.push(match dataset.column_type(col) {
            ColumnType::Numeric => {
                sample_numeric_column(dataset, col, out_len, preserve_distributions, rng)
            }
            ColumnType::Categorical | ColumnType::Temporal => {
                sample_frequency_column(dataset, col, out_len, rng)
            }
        });
    }

    if preserve_correlations {
        inject_correlations(dataset, &mut cells, rng);
    }

    let rows: Vec<Vec<Value>> = (0..out_len)
        .map(|row| cells.iter().map(|col| col[row].clone()).collect())
        .collect();
    let synthetic = Dataset::from_rows(columns, rows)?;

    Ok(AnonymizationOutcome {
        dataset: synthetic,
        suppressed_records: 0,
        residual_violating_classes: 0,
        residual_violating_records: 0,
        notes,
    })
}

fn sample_numeric_column(
    dataset: &Dataset,
    col: usize,
    out_len: usize,
    preserve_distributions: bool,
    rng: &mut PipelineRng,
) -> Vec<Value> {
    let values = dataset.numeric_values(col);
    if values.is_empty() {
        return vec![Value::Null; out_len];
    }
    if preserve_distributions {
        // Empirical resampling with replacement keeps the marginal shape.
        return (0..out_len)
            .map(|_| Value::Number(values[rng.below(values.len())]))
            .collect();
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let std = if values.len() > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64).sqrt()
    } else {
        0.0
    };
    (0..out_len)
        .map(|_| Value::Number(mean + rng.gaussian(std)))
        .collect()
}

fn sample_frequency_column(
    dataset: &Dataset,
    col: usize,
    out_len: usize,
    rng: &mut PipelineRng,
) -> Vec<Value> {
    // Frequency table with one representative value per key, so timestamps
    // round-trip as timestamps rather than text.
    let mut counts: HashMap<ValueKey, (Value, usize)> = HashMap::new();
    for row in 0..dataset.len() {
        let value = dataset.value(row, col);
        if value.is_null() {
            continue;
        }
        counts
            .entry(value.key())
            .or_insert_with(|| (value.clone(), 0))
            .1 += 1;
    }
    if counts.is_empty() {
        return vec![Value::Null; out_len];
    }

    let mut entries: Vec<(Value, usize)> = counts.into_values().collect();
    entries.sort_by(|a, b| a.0.key().cmp(&b.0.key()));
    let weights: Vec<f64> = entries.iter().map(|(_, count)| *count as f64).collect();

    (0..out_len)
        .map(|_| entries[rng.weighted_index(&weights)].0.clone())
        .collect()
}

/// Re-inject strong pairwise correlations from the source into the
/// independently sampled numeric columns.
fn inject_correlations(dataset: &Dataset, cells: &mut [Vec<Value>], rng: &mut PipelineRng) {
    let numeric = dataset.numeric_columns();
    for i in 0..numeric.len() {
        for j in (i + 1)..numeric.len() {
            let r = match pairwise_pearson(dataset, numeric[i], numeric[j]) {
                Some(r) if r.abs() > CORRELATION_FLOOR => r,
                _ => continue,
            };

            let driver: Vec<f64> = cells[numeric[j]]
                .iter()
                .filter_map(Value::as_number)
                .collect();
            if driver.len() < 2 {
                continue;
            }
            let mean = driver.iter().sum::<f64>() / driver.len() as f64;
            let std = (driver.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (driver.len() - 1) as f64)
                .sqrt();

            for row in 0..cells[numeric[i]].len() {
                let (base, drive) = match (
                    cells[numeric[i]][row].as_number(),
                    cells[numeric[j]][row].as_number(),
                ) {
                    (Some(base), Some(drive)) => (base, drive),
                    _ => continue,
                };
                // The partner value is centered so the nudge leaves the
                // driven column's mean unchanged.
                let blended = base + (drive - mean) * r * 0.5 + rng.gaussian(std * 0.1);
                cells[numeric[i]][row] = Value::Number(blended);
            }
        }
    }
}

/// Pearson correlation over rows where both cells are numeric.
fn pairwise_pearson(dataset: &Dataset, a: usize, b: usize) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = (0..dataset.len())
        .filter_map(|row| {
            Some((
                dataset.value(row, a).as_number()?,
                dataset.value(row, b).as_number()?,
            ))
        })
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in &pairs {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RecordId;

    fn source_dataset(n: usize) -> Dataset {
        Dataset::from_rows(
            vec!["age".into(), "income".into(), "city".into()],
            (0..n)
                .map(|i| {
                    let age = 20.0 + (i % 40) as f64;
                    vec![
                        Value::Number(age),
                        Value::Number(age * 1000.0),
                        Value::Text(if i % 3 == 0 { "Pune" } else { "Delhi" }.into()),
                    ]
                })
                .collect(),
        )
        .unwrap()
    }

    fn statistical(fraction: f64) -> SyntheticParams {
        SyntheticParams {
            method: SyntheticMethod::Statistical,
            sample_fraction: fraction,
            preserve_correlations: true,
            preserve_distributions: true,
        }
    }

    #[test]
    fn test_output_size_follows_fraction() {
        let ds = source_dataset(100);
        let mut rng = PipelineRng::from_seed(42);
        let outcome = generate(&ds, &statistical(0.5), &mut rng).unwrap();
        assert_eq!(outcome.dataset.len(), 50);

        let mut rng = PipelineRng::from_seed(42);
        let outcome = generate(&ds, &statistical(1.5), &mut rng).unwrap();
        assert_eq!(outcome.dataset.len(), 150);
    }

    #[test]
    fn test_fresh_record_ids() {
        let ds = source_dataset(10);
        let mut rng = PipelineRng::from_seed(42);
        let outcome = generate(&ds, &statistical(1.0), &mut rng).unwrap();
        // Positional ids starting from zero, independent of the source rows.
        assert_eq!(outcome.dataset.record_id(0), RecordId(0));
        assert_eq!(outcome.dataset.record_id(9), RecordId(9));
    }

    #[test]
    fn test_categorical_values_come_from_source_domain() {
        let ds = source_dataset(60);
        let mut rng = PipelineRng::from_seed(7);
        let outcome = generate(&ds, &statistical(1.0), &mut rng).unwrap();
        for row in 0..outcome.dataset.len() {
            match outcome.dataset.value(row, 2) {
                Value::Text(s) => assert!(s == "Pune" || s == "Delhi"),
                other => panic!("unexpected categorical value {:?}", other),
            }
        }
    }

    #[test]
    fn test_strong_correlation_survives() {
        let ds = source_dataset(200);
        let mut rng = PipelineRng::from_seed(11);
        let outcome = generate(&ds, &statistical(1.0), &mut rng).unwrap();

        // Source correlation between age and income is 1.0; independent
        // resampling alone would leave roughly none.
        let r = pairwise_pearson(&outcome.dataset, 0, 1).unwrap();
        assert!(r > 0.2, "correlation {} not re-injected", r);
    }

    #[test]
    fn test_empty_dataset_is_error() {
        let ds = Dataset::from_rows(vec!["a".into()], vec![]).unwrap();
        let mut rng = PipelineRng::from_seed(1);
        let err = generate(&ds, &statistical(1.0), &mut rng).unwrap_err();
        assert!(matches!(err, Error::EmptyDataset));
    }

    #[test]
    fn test_copula_falls_back_with_note() {
        let ds = source_dataset(20);
        let mut rng = PipelineRng::from_seed(1);
        let params = SyntheticParams {
            method: SyntheticMethod::Copula,
            sample_fraction: 1.0,
            preserve_correlations: false,
            preserve_distributions: false,
        };
        let outcome = generate(&ds, &params, &mut rng).unwrap();
        assert_eq!(outcome.dataset.len(), 20);
        assert_eq!(outcome.notes.len(), 1);
    }
}
