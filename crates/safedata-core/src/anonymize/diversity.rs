//! l-diversity and t-closeness over the sensitive attribute
//!
//! l-diversity first generalizes quasi-identifiers with global recoding at
//! k = l (classes of l look-alikes are a precondition for l diverse sensitive
//! values), then further generalizes the quasi-identifiers of classes that
//! still fail the diversity predicate. t-closeness compares each class's
//! sensitive distribution against the whole dataset's and generalizes the
//! quasi-identifiers of classes whose distance exceeds t with the same
//! fallback. Both techniques leave the sensitive column itself intact:
//! numeric quasi-identifier cells collapse onto the class mean, everything
//! else onto the wildcard.

use std::collections::HashMap;

use crate::anonymize::{
    recoding, AnonymizationOutcome, DiversityMethod, LDiversityParams, TClosenessParams, WILDCARD,
};
use crate::dataset::{ColumnType, Dataset, Value, ValueKey};
use crate::equivalence::partition;
use crate::Error;

pub(super) fn apply_l_diversity(
    dataset: &Dataset,
    params: &LDiversityParams,
) -> Result<AnonymizationOutcome, Error> {
    let sensitive_col = match dataset.column_index(&params.sensitive_attribute) {
        Some(col) => col,
        None => {
            return Ok(AnonymizationOutcome::unchanged(
                dataset.clone(),
                format!(
                    "sensitive attribute '{}' not present; dataset returned unchanged",
                    params.sensitive_attribute
                ),
            ));
        }
    };
    if params.quasi_identifiers.is_empty() {
        return Ok(AnonymizationOutcome::unchanged(
            dataset.clone(),
            "empty quasi-identifier list; dataset returned unchanged".to_string(),
        ));
    }

    let mut result = recoding::global_recode(dataset, params.l, &params.quasi_identifiers)?;
    let mut qi_cols = Vec::with_capacity(params.quasi_identifiers.len());
    for name in &params.quasi_identifiers {
        qi_cols.push(result.require_column(name)?);
    }
    let classes = partition(&result, &params.quasi_identifiers)?;

    let mut adjusted_classes = 0usize;
    for class in &classes {
        let frequencies = sensitive_frequencies(&result, sensitive_col, &class.members);
        if satisfies_diversity(&frequencies, params.l, params.method) {
            continue;
        }
        adjusted_classes += 1;
        generalize_class_qi(&mut result, &class.members, &qi_cols);
    }
    result.reinfer_types();

    let mut notes = Vec::new();
    if adjusted_classes > 0 {
        notes.push(format!(
            "generalized the quasi-identifiers of {} class(es) failing {}-diversity",
            adjusted_classes, params.l
        ));
    }
    Ok(AnonymizationOutcome {
        dataset: result,
        suppressed_records: 0,
        residual_violating_classes: 0,
        residual_violating_records: 0,
        notes,
    })
}

/// Collapse the quasi-identifier cells of one class onto a representative:
/// the class mean for numeric columns, the wildcard otherwise. The sensitive
/// column is never touched.
fn generalize_class_qi(result: &mut Dataset, members: &[usize], qi_cols: &[usize]) {
    for &col in qi_cols {
        let replacement = match result.column_type(col) {
            ColumnType::Numeric => {
                let values: Vec<f64> = members
                    .iter()
                    .filter_map(|&row| result.value(row, col).as_number())
                    .collect();
                if values.is_empty() {
                    Value::Text(WILDCARD.to_string())
                } else {
                    Value::Number(values.iter().sum::<f64>() / values.len() as f64)
                }
            }
            ColumnType::Categorical | ColumnType::Temporal => Value::Text(WILDCARD.to_string()),
        };
        for &row in members {
            result.set_value(row, col, replacement.clone());
        }
    }
}

fn sensitive_frequencies(
    dataset: &Dataset,
    sensitive_col: usize,
    members: &[usize],
) -> HashMap<ValueKey, usize> {
    let mut frequencies = HashMap::new();
    for &row in members {
        let value = dataset.value(row, sensitive_col);
        if !value.is_null() {
            *frequencies.entry(value.key()).or_insert(0usize) += 1;
        }
    }
    frequencies
}

fn satisfies_diversity(
    frequencies: &HashMap<ValueKey, usize>,
    l: usize,
    method: DiversityMethod,
) -> bool {
    match method {
        // Recursive (c,l)-diversity is evaluated with the distinct predicate.
        DiversityMethod::Distinct | DiversityMethod::Recursive => frequencies.len() >= l,
        DiversityMethod::Entropy => {
            let total: usize = frequencies.values().sum();
            if total == 0 {
                return false;
            }
            let entropy: f64 = frequencies
                .values()
                .map(|&count| {
                    let p = count as f64 / total as f64;
                    -p * p.log2()
                })
                .sum();
            entropy >= (l as f64).log2()
        }
    }
}

pub(super) fn apply_t_closeness(
    dataset: &Dataset,
    params: &TClosenessParams,
) -> Result<AnonymizationOutcome, Error> {
    let sensitive_col = match dataset.column_index(&params.sensitive_attribute) {
        Some(col) => col,
        None => {
            return Ok(AnonymizationOutcome::unchanged(
                dataset.clone(),
                format!(
                    "sensitive attribute '{}' not present; dataset returned unchanged",
                    params.sensitive_attribute
                ),
            ));
        }
    };
    if params.quasi_identifiers.is_empty() {
        return Ok(AnonymizationOutcome::unchanged(
            dataset.clone(),
            "empty quasi-identifier list; dataset returned unchanged".to_string(),
        ));
    }
    let mut qi_cols = Vec::with_capacity(params.quasi_identifiers.len());
    for name in &params.quasi_identifiers {
        qi_cols.push(dataset.require_column(name)?);
    }

    let all_rows: Vec<usize> = (0..dataset.len()).collect();
    let global = normalize(&sensitive_frequencies(dataset, sensitive_col, &all_rows));

    let classes = partition(dataset, &params.quasi_identifiers)?;
    let mut result = dataset.clone();
    let mut adjusted_classes = 0usize;
    for class in &classes {
        let local = normalize(&sensitive_frequencies(dataset, sensitive_col, &class.members));
        if earth_mover_distance(&global, &local) > params.t {
            adjusted_classes += 1;
            generalize_class_qi(&mut result, &class.members, &qi_cols);
        }
    }
    result.reinfer_types();

    let mut notes = Vec::new();
    if adjusted_classes > 0 {
        notes.push(format!(
            "generalized {} class(es) whose sensitive distribution diverged beyond t = {}",
            adjusted_classes, params.t
        ));
    }
    Ok(AnonymizationOutcome {
        dataset: result,
        suppressed_records: 0,
        residual_violating_classes: 0,
        residual_violating_records: 0,
        notes,
    })
}

fn normalize(frequencies: &HashMap<ValueKey, usize>) -> HashMap<ValueKey, f64> {
    let total: usize = frequencies.values().sum();
    if total == 0 {
        return HashMap::new();
    }
    frequencies
        .iter()
        .map(|(key, &count)| (key.clone(), count as f64 / total as f64))
        .collect()
}

/// Earth mover's distance between two discrete distributions over the union
/// of their supports, computed as half the L1 distance.
fn earth_mover_distance(p: &HashMap<ValueKey, f64>, q: &HashMap<ValueKey, f64>) -> f64 {
    let mut keys: Vec<&ValueKey> = p.keys().chain(q.keys()).collect();
    keys.sort_unstable();
    keys.dedup();
    0.5 * keys
        .iter()
        .map(|key| {
            let pv = p.get(key).copied().unwrap_or(0.0);
            let qv = q.get(key).copied().unwrap_or(0.0);
            (pv - qv).abs()
        })
        .sum::<f64>()
}
