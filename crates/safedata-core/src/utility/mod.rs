//! Utility measurement
//!
//! Compares an anonymized dataset against its source across six metrics and
//! aggregates them into one report. Each metric yields an explicit
//! [`MetricOutcome`]: a computed score, a skip with its reason (not enough
//! numeric columns, no classification target), or a failure. A metric that
//! could not run is a visible variant in the report, never a silent zero.
//!
//! Before any metric runs, the two datasets are aligned: columns are
//! intersected and rows are joined on their record ids when the processed
//! dataset's ids all descend from the original (the case for every
//! suppressing or generalizing technique). Synthetic data carries fresh ids,
//! so it falls back to positional alignment over the shorter row count.

mod classify;
mod stats;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::dataset::{ColumnType, Dataset, RecordId, Value, ValueKey};
use crate::rng::PipelineRng;
use crate::Error;

/// Epsilon guarding relative-difference denominators.
const DENOM_EPS: f64 = 1e-8;

/// The six utility metrics.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MetricId {
    StatisticalSimilarity,
    CorrelationPreservation,
    DistributionSimilarity,
    InformationLoss,
    ClassificationUtility,
    QueryAccuracy,
}

impl MetricId {
    /// Every metric, in report order.
    pub const ALL: [MetricId; 6] = [
        MetricId::StatisticalSimilarity,
        MetricId::CorrelationPreservation,
        MetricId::DistributionSimilarity,
        MetricId::InformationLoss,
        MetricId::ClassificationUtility,
        MetricId::QueryAccuracy,
    ];
}

/// Qualitative banding of the overall utility score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UtilityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl UtilityLevel {
    pub fn from_score(score: f64) -> UtilityLevel {
        if score >= 0.9 {
            UtilityLevel::Excellent
        } else if score >= 0.7 {
            UtilityLevel::Good
        } else if score >= 0.5 {
            UtilityLevel::Fair
        } else if score >= 0.3 {
            UtilityLevel::Poor
        } else {
            UtilityLevel::VeryPoor
        }
    }
}

/// Scores produced by one metric.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricScores {
    /// Aggregate score in [0, 1].
    pub overall: f64,
    /// Per-column (or per-pair) breakdown.
    pub per_column: BTreeMap<String, f64>,
    /// Metric-specific side values (raw accuracies, matrix differences).
    /// Unlike `overall`, these are not bounded to [0, 1].
    pub extras: BTreeMap<String, f64>,
}

/// What one requested metric produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MetricOutcome {
    Computed(MetricScores),
    /// The metric was inapplicable to this data.
    Skipped { reason: String },
    /// The metric ran into a degenerate computation.
    Failed { reason: String },
}

impl MetricOutcome {
    pub fn overall(&self) -> Option<f64> {
        match self {
            MetricOutcome::Computed(scores) => Some(scores.overall),
            _ => None,
        }
    }
}

/// Aggregated utility measurement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UtilityReport {
    pub metrics: BTreeMap<MetricId, MetricOutcome>,
    /// Mean over the metrics that produced a score.
    pub overall_utility: f64,
    pub utility_level: UtilityLevel,
    pub recommendations: Vec<String>,
}

/// Measures how much analytic value survived anonymization. Stateless; the
/// random source (train/test splitting, ensemble bootstrapping) is supplied
/// per call.
pub struct UtilityEvaluator;

impl UtilityEvaluator {
    pub fn measure(
        original: &Dataset,
        processed: &Dataset,
        metrics: &[MetricId],
        rng: &mut PipelineRng,
    ) -> Result<UtilityReport, Error> {
        if original.is_empty() || processed.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let aligned = align(original, processed)?;
        debug!(
            rows = aligned.original.len(),
            columns = aligned.original.column_names().len(),
            "aligned datasets for utility measurement"
        );

        let mut outcomes: BTreeMap<MetricId, MetricOutcome> = BTreeMap::new();
        for &metric in metrics {
            let outcome = match metric {
                MetricId::StatisticalSimilarity => statistical_similarity(&aligned),
                MetricId::CorrelationPreservation => correlation_preservation(&aligned),
                MetricId::DistributionSimilarity => distribution_similarity(&aligned),
                MetricId::InformationLoss => information_loss(&aligned),
                MetricId::ClassificationUtility => classification_utility(&aligned, rng),
                MetricId::QueryAccuracy => query_accuracy(original, processed),
            };
            outcomes.insert(metric, outcome);
        }

        let scores: Vec<f64> = outcomes.values().filter_map(MetricOutcome::overall).collect();
        let overall_utility = stats::mean(&scores);
        let utility_level = UtilityLevel::from_score(overall_utility);
        let recommendations = recommend(utility_level, &outcomes);

        Ok(UtilityReport {
            metrics: outcomes,
            overall_utility,
            utility_level,
            recommendations,
        })
    }
}

/// Row-aligned views of the two datasets over their common columns.
struct Aligned {
    original: Dataset,
    processed: Dataset,
}

fn align(original: &Dataset, processed: &Dataset) -> Result<Aligned, Error> {
    let common: Vec<String> = original
        .column_names()
        .iter()
        .filter(|name| processed.column_index(name).is_some())
        .cloned()
        .collect();

    let original_positions: HashMap<RecordId, usize> = original
        .record_ids()
        .iter()
        .enumerate()
        .map(|(pos, &id)| (id, pos))
        .collect();
    let id_join = processed
        .record_ids()
        .iter()
        .all(|id| original_positions.contains_key(id));

    let pairs: Vec<(usize, usize)> = if id_join {
        (0..processed.len())
            .map(|p| (original_positions[&processed.record_id(p)], p))
            .collect()
    } else {
        // Fresh ids (synthetic data): no identity to join on.
        (0..original.len().min(processed.len())).map(|i| (i, i)).collect()
    };

    Ok(Aligned {
        original: project(original, &common, pairs.iter().map(|p| p.0))?,
        processed: project(processed, &common, pairs.iter().map(|p| p.1))?,
    })
}

fn project(
    source: &Dataset,
    columns: &[String],
    rows: impl Iterator<Item = usize>,
) -> Result<Dataset, Error> {
    let cols: Vec<usize> = columns
        .iter()
        .filter_map(|name| source.column_index(name))
        .collect();
    let projected: Vec<Vec<Value>> = rows
        .map(|row| cols.iter().map(|&c| source.value(row, c).clone()).collect())
        .collect();
    Dataset::from_rows(columns.to_vec(), projected)
}

fn both_numeric(aligned: &Aligned, col: usize) -> bool {
    aligned.original.column_type(col) == ColumnType::Numeric
        && aligned.processed.column_type(col) == ColumnType::Numeric
}

fn key_proportions(dataset: &Dataset, col: usize) -> HashMap<ValueKey, f64> {
    let mut counts: HashMap<ValueKey, usize> = HashMap::new();
    for row in 0..dataset.len() {
        let value = dataset.value(row, col);
        if !value.is_null() {
            *counts.entry(value.key()).or_insert(0) += 1;
        }
    }
    let total: usize = counts.values().sum();
    if total == 0 {
        return HashMap::new();
    }
    counts
        .into_iter()
        .map(|(key, count)| (key, count as f64 / total as f64))
        .collect()
}

fn relative_preservation(original: f64, processed: f64) -> f64 {
    (1.0 - (original - processed).abs() / (original.abs() + DENOM_EPS)).max(0.0)
}

fn statistical_similarity(aligned: &Aligned) -> MetricOutcome {
    let mut per_column = BTreeMap::new();
    for (col, name) in aligned.original.column_names().iter().enumerate() {
        let score = if both_numeric(aligned, col) {
            let o = aligned.original.numeric_values(col);
            let p = aligned.processed.numeric_values(col);
            if o.is_empty() || p.is_empty() {
                continue;
            }
            let mean_sim = relative_preservation(stats::mean(&o), stats::mean(&p));
            let std_sim = relative_preservation(stats::std_dev(&o), stats::std_dev(&p));
            let range = |v: &[f64]| {
                v.iter().copied().fold(f64::NEG_INFINITY, f64::max)
                    - v.iter().copied().fold(f64::INFINITY, f64::min)
            };
            let range_sim = relative_preservation(range(&o), range(&p));
            (mean_sim + std_sim + range_sim) / 3.0
        } else {
            let o = key_proportions(&aligned.original, col);
            let p = key_proportions(&aligned.processed, col);
            o.iter()
                .map(|(key, &po)| po.min(p.get(key).copied().unwrap_or(0.0)))
                .sum()
        };
        per_column.insert(name.clone(), score);
    }

    if per_column.is_empty() {
        return MetricOutcome::Skipped {
            reason: "no comparable common columns".to_string(),
        };
    }
    let overall = stats::mean(&per_column.values().copied().collect::<Vec<_>>());
    MetricOutcome::Computed(MetricScores {
        overall,
        per_column,
        extras: BTreeMap::new(),
    })
}

/// Values of two columns restricted to rows where both cells are numeric.
fn paired_columns(dataset: &Dataset, a: usize, b: usize) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for row in 0..dataset.len() {
        if let (Some(x), Some(y)) = (
            dataset.value(row, a).as_number(),
            dataset.value(row, b).as_number(),
        ) {
            xs.push(x);
            ys.push(y);
        }
    }
    (xs, ys)
}

fn correlation_preservation(aligned: &Aligned) -> MetricOutcome {
    let numeric: Vec<(usize, &String)> = aligned
        .original
        .column_names()
        .iter()
        .enumerate()
        .filter(|&(col, _)| both_numeric(aligned, col))
        .map(|(col, name)| (col, name))
        .collect();
    if numeric.len() < 2 {
        return MetricOutcome::Skipped {
            reason: "fewer than two common numeric columns".to_string(),
        };
    }

    let mut per_column = BTreeMap::new();
    let mut differences = Vec::new();
    for i in 0..numeric.len() {
        for j in (i + 1)..numeric.len() {
            let (ox, oy) = paired_columns(&aligned.original, numeric[i].0, numeric[j].0);
            let (px, py) = paired_columns(&aligned.processed, numeric[i].0, numeric[j].0);
            // Degenerate (constant) columns contribute zero correlation.
            let ro = stats::pearson(&ox, &oy).unwrap_or(0.0);
            let rp = stats::pearson(&px, &py).unwrap_or(0.0);
            let difference = (ro - rp).abs();
            differences.push(difference);
            per_column.insert(
                format!("{}~{}", numeric[i].1, numeric[j].1),
                (1.0 - difference).max(0.0),
            );
        }
    }

    let overall = stats::mean(&per_column.values().copied().collect::<Vec<_>>());
    let mut extras = BTreeMap::new();
    extras.insert(
        "mean_absolute_difference".to_string(),
        stats::mean(&differences),
    );
    MetricOutcome::Computed(MetricScores {
        overall,
        per_column,
        extras,
    })
}

fn distribution_similarity(aligned: &Aligned) -> MetricOutcome {
    let mut per_column = BTreeMap::new();
    for (col, name) in aligned.original.column_names().iter().enumerate() {
        let score = if both_numeric(aligned, col) {
            let o = aligned.original.numeric_values(col);
            let p = aligned.processed.numeric_values(col);
            if o.is_empty() || p.is_empty() {
                continue;
            }
            let ks_sim = 1.0 - stats::ks_statistic(&o, &p);
            let range = o.iter().copied().fold(f64::NEG_INFINITY, f64::max)
                - o.iter().copied().fold(f64::INFINITY, f64::min);
            let w_sim = if range > 0.0 {
                (1.0 - stats::wasserstein(&o, &p) / range).max(0.0)
            } else {
                1.0
            };
            (ks_sim + w_sim) / 2.0
        } else {
            chi_squared_similarity(aligned, col)
        };
        per_column.insert(name.clone(), score);
    }

    if per_column.is_empty() {
        return MetricOutcome::Skipped {
            reason: "no comparable common columns".to_string(),
        };
    }
    let overall = stats::mean(&per_column.values().copied().collect::<Vec<_>>());
    MetricOutcome::Computed(MetricScores {
        overall,
        per_column,
        extras: BTreeMap::new(),
    })
}

/// 1/(1 + chi-squared) over the two proportion vectors. Any category absent
/// from one side makes the statistic undefined and scores zero.
fn chi_squared_similarity(aligned: &Aligned, col: usize) -> f64 {
    let o = key_proportions(&aligned.original, col);
    let p = key_proportions(&aligned.processed, col);
    if o.is_empty() || p.is_empty() {
        return 0.0;
    }
    let mut keys: Vec<&ValueKey> = o.keys().chain(p.keys()).collect();
    keys.sort_unstable();
    keys.dedup();

    let mut chi_squared = 0.0;
    for key in keys {
        let po = o.get(key).copied().unwrap_or(0.0);
        let pp = p.get(key).copied().unwrap_or(0.0);
        if po == 0.0 || pp == 0.0 {
            return 0.0;
        }
        chi_squared += (pp - po).powi(2) / po;
    }
    1.0 / (1.0 + chi_squared)
}

fn column_entropy(dataset: &Dataset, col: usize, numeric: bool) -> f64 {
    if numeric {
        let values = dataset.numeric_values(col);
        if values.is_empty() {
            return 0.0;
        }
        let distinct = {
            let mut keys: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
            keys.sort_unstable();
            keys.dedup();
            keys.len()
        };
        let bins = distinct.min(20).max(1);
        let counts = stats::equal_width_bin_counts(&values, bins);
        let total = values.len() as f64;
        let probs: Vec<f64> = counts.iter().map(|&c| c as f64 / total).collect();
        stats::entropy_bits(&probs)
    } else {
        let probs: Vec<f64> = key_proportions(dataset, col).into_values().collect();
        stats::entropy_bits(&probs)
    }
}

fn information_loss(aligned: &Aligned) -> MetricOutcome {
    let mut per_column = BTreeMap::new();
    let mut losses = Vec::new();
    for (col, name) in aligned.original.column_names().iter().enumerate() {
        let numeric = both_numeric(aligned, col);
        let h_orig = column_entropy(&aligned.original, col, numeric);
        let h_proc = column_entropy(&aligned.processed, col, numeric);
        let loss = if h_orig > 0.0 {
            ((h_orig - h_proc) / h_orig).max(0.0)
        } else {
            0.0
        };
        losses.push(loss);
        per_column.insert(name.clone(), 1.0 - loss);
    }
    if per_column.is_empty() {
        return MetricOutcome::Skipped {
            reason: "no common columns".to_string(),
        };
    }

    let mut extras = BTreeMap::new();
    let numeric: Vec<usize> = (0..aligned.original.column_names().len())
        .filter(|&col| both_numeric(aligned, col))
        .collect();
    let mut mi_losses = Vec::new();
    for i in 0..numeric.len() {
        for j in (i + 1)..numeric.len() {
            let (ox, oy) = paired_columns(&aligned.original, numeric[i], numeric[j]);
            let mi_orig = stats::mutual_information(&ox, &oy, 10);
            if mi_orig <= 0.0 {
                continue;
            }
            let (px, py) = paired_columns(&aligned.processed, numeric[i], numeric[j]);
            let mi_proc = stats::mutual_information(&px, &py, 10);
            mi_losses.push(((mi_orig - mi_proc) / mi_orig).max(0.0));
        }
    }
    if !mi_losses.is_empty() {
        extras.insert(
            "mutual_information_preservation".to_string(),
            1.0 - stats::mean(&mi_losses),
        );
    }

    MetricOutcome::Computed(MetricScores {
        overall: 1.0 - stats::mean(&losses),
        per_column,
        extras,
    })
}

/// Distinct non-null value count, used for target selection.
fn distinct_count(dataset: &Dataset, col: usize) -> usize {
    let mut keys: Vec<ValueKey> = (0..dataset.len())
        .map(|row| dataset.value(row, col).key())
        .filter(|key| *key != ValueKey::Null)
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys.len()
}

fn classification_utility(aligned: &Aligned, rng: &mut PipelineRng) -> MetricOutcome {
    let columns = aligned.original.column_names();
    let target = columns.iter().enumerate().position(|(col, _)| {
        let distinct = distinct_count(&aligned.original, col);
        (aligned.original.column_type(col) == ColumnType::Categorical
            || aligned.original.column_type(col) == ColumnType::Numeric)
            && (2..=10).contains(&distinct)
    });
    let target = match target {
        Some(col) => col,
        None => {
            return MetricOutcome::Skipped {
                reason: "no suitable classification target".to_string(),
            };
        }
    };
    let feature_cols: Vec<usize> = (0..columns.len()).filter(|&c| c != target).collect();
    if feature_cols.is_empty() {
        return MetricOutcome::Skipped {
            reason: "no feature columns besides the target".to_string(),
        };
    }

    // Label codes come from the original data only; a processed value the
    // original never produced has no class to belong to.
    let mut label_keys: Vec<ValueKey> = (0..aligned.original.len())
        .map(|row| aligned.original.value(row, target).key())
        .filter(|key| *key != ValueKey::Null)
        .collect();
    label_keys.sort_unstable();
    label_keys.dedup();
    let label_code: HashMap<&ValueKey, usize> = label_keys
        .iter()
        .enumerate()
        .map(|(code, key)| (key, code))
        .collect();

    let usable: Vec<usize> = (0..aligned.original.len())
        .filter(|&row| {
            !aligned.original.value(row, target).is_null()
                && !aligned.processed.value(row, target).is_null()
        })
        .collect();
    if usable.len() < 10 {
        return MetricOutcome::Skipped {
            reason: "fewer than 10 usable rows".to_string(),
        };
    }

    let encode = |dataset: &Dataset| -> Vec<Vec<f64>> {
        let encoded_cols: Vec<Vec<f64>> = feature_cols
            .iter()
            .map(|&col| encode_feature(dataset, col))
            .collect();
        usable
            .iter()
            .map(|&row| encoded_cols.iter().map(|c| c[row]).collect())
            .collect()
    };
    let orig_features = encode(&aligned.original);
    let proc_features = encode(&aligned.processed);

    let orig_labels: Vec<usize> = usable
        .iter()
        .map(|&row| label_code[&aligned.original.value(row, target).key()])
        .collect();
    let mut proc_labels = Vec::with_capacity(usable.len());
    for &row in &usable {
        match label_code.get(&aligned.processed.value(row, target).key()) {
            Some(&code) => proc_labels.push(code),
            None => {
                return MetricOutcome::Failed {
                    reason: format!(
                        "processed target value '{}' does not occur in the original data",
                        aligned.processed.value(row, target)
                    ),
                };
            }
        }
    }

    // One 70/30 split shared by both models.
    let mut order: Vec<usize> = (0..usable.len()).collect();
    rng.shuffle(&mut order);
    let cut = (usable.len() * 7) / 10;
    let (train_idx, test_idx) = order.split_at(cut.max(1));

    let select = |features: &[Vec<f64>], labels: &[usize], idx: &[usize]| {
        let f: Vec<Vec<f64>> = idx.iter().map(|&i| features[i].clone()).collect();
        let l: Vec<usize> = idx.iter().map(|&i| labels[i]).collect();
        (f, l)
    };
    let accuracy_of = |features: &[Vec<f64>], labels: &[usize], rng: &mut PipelineRng| {
        let (train_f, train_l) = select(features, labels, train_idx);
        let (test_f, test_l) = select(features, labels, test_idx);
        let model = classify::StumpEnsemble::train(&train_f, &train_l, label_keys.len(), rng);
        model.accuracy(&test_f, &test_l)
    };
    // Both models receive identical randomness, so the only difference
    // between the two accuracies is the data itself.
    let model_rng = rng.fork();
    let original_accuracy = accuracy_of(&orig_features, &orig_labels, &mut model_rng.clone());
    let processed_accuracy = accuracy_of(&proc_features, &proc_labels, &mut model_rng.clone());

    if original_accuracy <= 0.0 {
        return MetricOutcome::Failed {
            reason: "baseline accuracy on the original data is zero".to_string(),
        };
    }

    let raw_ratio = processed_accuracy / original_accuracy;
    let mut extras = BTreeMap::new();
    extras.insert("original_accuracy".to_string(), original_accuracy);
    extras.insert("processed_accuracy".to_string(), processed_accuracy);
    extras.insert("raw_accuracy_ratio".to_string(), raw_ratio);
    MetricOutcome::Computed(MetricScores {
        overall: raw_ratio.min(1.0),
        per_column: BTreeMap::new(),
        extras,
    })
}

/// Numeric view of a feature column: numbers pass through (nulls imputed
/// with the column mean), everything else becomes an ordinal code.
fn encode_feature(dataset: &Dataset, col: usize) -> Vec<f64> {
    if dataset.column_type(col) == ColumnType::Numeric {
        let present = dataset.numeric_values(col);
        let mean = stats::mean(&present);
        (0..dataset.len())
            .map(|row| dataset.value(row, col).as_number().unwrap_or(mean))
            .collect()
    } else {
        let mut keys: Vec<ValueKey> = (0..dataset.len())
            .map(|row| dataset.value(row, col).key())
            .collect();
        keys.sort_unstable();
        keys.dedup();
        let code: HashMap<&ValueKey, usize> =
            keys.iter().enumerate().map(|(c, k)| (k, c)).collect();
        (0..dataset.len())
            .map(|row| code[&dataset.value(row, col).key()] as f64)
            .collect()
    }
}

/// Aggregate-query fidelity over the full, unaligned datasets: row-count,
/// per-column sum, and per-column mean preservation.
fn query_accuracy(original: &Dataset, processed: &Dataset) -> MetricOutcome {
    let count_preservation =
        (processed.len() as f64 / original.len() as f64).min(1.0);

    let mut per_column = BTreeMap::new();
    let mut sum_scores = Vec::new();
    let mut mean_scores = Vec::new();
    for (col, name) in original.column_names().iter().enumerate() {
        let proc_col = match processed.column_index(name) {
            Some(c) => c,
            None => continue,
        };
        if original.column_type(col) != ColumnType::Numeric
            || processed.column_type(proc_col) != ColumnType::Numeric
        {
            continue;
        }
        let o = original.numeric_values(col);
        let p = processed.numeric_values(proc_col);
        if o.is_empty() || p.is_empty() {
            continue;
        }
        let sum_score = relative_preservation(o.iter().sum(), p.iter().sum());
        let mean_score = relative_preservation(stats::mean(&o), stats::mean(&p));
        sum_scores.push(sum_score);
        mean_scores.push(mean_score);
        per_column.insert(name.clone(), (sum_score + mean_score) / 2.0);
    }

    let mut parts = vec![count_preservation];
    if !sum_scores.is_empty() {
        parts.push(stats::mean(&sum_scores));
        parts.push(stats::mean(&mean_scores));
    }
    let mut extras = BTreeMap::new();
    extras.insert("count_preservation".to_string(), count_preservation);
    MetricOutcome::Computed(MetricScores {
        overall: stats::mean(&parts),
        per_column,
        extras,
    })
}

fn recommend(
    level: UtilityLevel,
    outcomes: &BTreeMap<MetricId, MetricOutcome>,
) -> Vec<String> {
    let mut recommendations = Vec::new();
    match level {
        UtilityLevel::Excellent | UtilityLevel::Good => {}
        UtilityLevel::Fair => {
            recommendations
                .push("utility is moderate; review the per-metric breakdown".to_string());
        }
        UtilityLevel::Poor | UtilityLevel::VeryPoor => {
            recommendations.push(
                "overall utility is low; consider weaker privacy parameters".to_string(),
            );
        }
    }

    let below = |metric: MetricId, threshold: f64| {
        outcomes
            .get(&metric)
            .and_then(MetricOutcome::overall)
            .is_some_and(|score| score < threshold)
    };
    if below(MetricId::StatisticalSimilarity, 0.5) {
        recommendations
            .push("statistical properties diverge; reduce generalization strength".to_string());
    }
    if below(MetricId::CorrelationPreservation, 0.5) {
        recommendations.push(
            "correlation structure is degraded; lower noise levels or enable correlation preservation"
                .to_string(),
        );
    }
    if below(MetricId::InformationLoss, 0.5) {
        recommendations
            .push("substantial entropy loss; use coarser suppression or larger classes".to_string());
    }
    if below(MetricId::ClassificationUtility, 0.7) {
        recommendations.push(
            "downstream classification is degraded; consider relaxing privacy parameters"
                .to_string(),
        );
    }
    recommendations
}
