//! End-to-end tests over the full pipeline:
//! risk assessment -> anonymization -> utility measurement.

use safedata_core::anonymize::{
    DpMechanism, DpParams, GeneralizationMethod, KAnonymityParams, LDiversityParams,
    SyntheticMethod, SyntheticParams, TClosenessParams,
};
use safedata_core::anonymize::{DistanceMeasure, DiversityMethod};
use safedata_core::{
    Anonymizer, Dataset, MetricId, PipelineRng, RiskAssessor, RiskConfig, Technique,
    UtilityEvaluator, Value,
};

/// 120 synthetic patients: two quasi-identifiers, one sensitive column,
/// one free numeric column.
fn patients() -> Dataset {
    Dataset::from_rows(
        vec![
            "age".into(),
            "city".into(),
            "diagnosis".into(),
            "bill".into(),
        ],
        (0..120)
            .map(|i| {
                let age = 25.0 + (i % 12) as f64;
                let city = ["Pune", "Delhi", "Mumbai"][i % 3];
                let diagnosis = ["flu", "cold", "asthma", "flu", "cold"][i % 5];
                vec![
                    Value::Number(age),
                    Value::Text(city.into()),
                    Value::Text(diagnosis.into()),
                    Value::Number(1000.0 + (i % 30) as f64 * 50.0),
                ]
            })
            .collect(),
    )
    .unwrap()
}

fn risk_config() -> RiskConfig {
    RiskConfig {
        quasi_identifiers: vec!["age".into(), "city".into()],
        sensitive_attributes: vec!["diagnosis".into()],
        ..RiskConfig::default()
    }
}

#[test]
fn test_k_anonymity_merges_rare_categories() {
    // Counts A:1, B:1, C:1, D:7 with k=3: the three rare values merge into
    // one wildcard class and nothing needs suppression.
    let mut values = vec!["A", "B", "C"];
    values.extend(["D"; 7]);
    let ds = Dataset::from_rows(
        vec!["qi".into()],
        values
            .iter()
            .map(|v| vec![Value::Text(v.to_string())])
            .collect(),
    )
    .unwrap();

    let technique = Technique::KAnonymity(KAnonymityParams {
        k: 3,
        quasi_identifiers: vec!["qi".into()],
        method: GeneralizationMethod::GlobalRecoding,
        suppression_limit: 0.2,
    });
    let mut rng = PipelineRng::from_seed(42);
    let outcome = Anonymizer::apply(&ds, &technique, &mut rng).unwrap();

    assert_eq!(outcome.dataset.len(), 10);
    assert_eq!(outcome.suppressed_records, 0);
    assert_eq!(outcome.residual_violating_classes, 0);

    let classes = safedata_core::partition(&outcome.dataset, &["qi".into()]).unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0].size(), 3);
    assert_eq!(classes[1].size(), 7);
}

#[test]
fn test_suppression_cap_is_respected() {
    // Ten singletons that stay singletons after local recoding (their
    // numeric range labels remain distinct) plus one crowd of twenty.
    // Cap = floor(30 * 0.1) = 3, so 7 violating records must remain and
    // be reported.
    let mut rows: Vec<Vec<Value>> = (0..10)
        .map(|i| vec![Value::Text(format!("solo{}", i)), Value::Number(i as f64 * 100.0)])
        .collect();
    rows.extend((0..20).map(|_| vec![Value::Text("crowd".into()), Value::Number(5000.0)]));
    let ds = Dataset::from_rows(vec!["name".into(), "score".into()], rows).unwrap();

    let technique = Technique::KAnonymity(KAnonymityParams {
        k: 3,
        quasi_identifiers: vec!["name".into(), "score".into()],
        method: GeneralizationMethod::LocalRecoding,
        suppression_limit: 0.1,
    });
    let mut rng = PipelineRng::from_seed(1);
    let outcome = Anonymizer::apply(&ds, &technique, &mut rng).unwrap();

    assert_eq!(outcome.suppressed_records, 3);
    assert_eq!(outcome.dataset.len(), 27);
    assert_eq!(outcome.residual_violating_classes, 7);
    assert_eq!(outcome.residual_violating_records, 7);
}

#[test]
fn test_anonymization_reduces_risk() {
    let ds = patients();
    let assessor = RiskAssessor::new(risk_config()).unwrap();

    let mut rng = PipelineRng::from_seed(7);
    let before = assessor.assess(&ds, &mut rng).unwrap();

    let technique = Technique::KAnonymity(KAnonymityParams {
        k: 5,
        quasi_identifiers: vec!["age".into(), "city".into()],
        method: GeneralizationMethod::GlobalRecoding,
        suppression_limit: 0.2,
    });
    let outcome = Anonymizer::apply(&ds, &technique, &mut rng).unwrap();
    let after = assessor.assess(&outcome.dataset, &mut rng).unwrap();

    assert!(
        after.overall_risk <= before.overall_risk,
        "risk went from {} to {}",
        before.overall_risk,
        after.overall_risk
    );
    assert!(after.k_violations <= before.k_violations);
}

#[test]
fn test_l_diversity_end_to_end() {
    // One zip is homogeneous in diagnosis.
    let mut rows = Vec::new();
    for _ in 0..6 {
        rows.push(vec![Value::Text("411".into()), Value::Text("flu".into())]);
    }
    for i in 0..6 {
        rows.push(vec![
            Value::Text("412".into()),
            Value::Text(["flu", "cold", "asthma"][i % 3].into()),
        ]);
    }
    let ds = Dataset::from_rows(vec!["zip".into(), "diagnosis".into()], rows).unwrap();

    let technique = Technique::LDiversity(LDiversityParams {
        l: 2,
        quasi_identifiers: vec!["zip".into()],
        sensitive_attribute: "diagnosis".into(),
        method: DiversityMethod::Distinct,
    });
    let mut rng = PipelineRng::from_seed(1);
    let outcome = Anonymizer::apply(&ds, &technique, &mut rng).unwrap();

    // The homogeneous class loses its zip, not its diagnoses.
    assert_eq!(outcome.dataset.value(0, 0), &Value::Text("*".into()));
    assert_eq!(outcome.dataset.value(0, 1), &Value::Text("flu".into()));
    assert_eq!(outcome.dataset.value(7, 0), &Value::Text("412".into()));
    assert_eq!(outcome.dataset.value(7, 1), &Value::Text("cold".into()));
}

#[test]
fn test_t_closeness_end_to_end() {
    let ds = patients();
    let technique = Technique::TCloseness(TClosenessParams {
        t: 0.9,
        quasi_identifiers: vec!["age".into(), "city".into()],
        sensitive_attribute: "diagnosis".into(),
        distance: DistanceMeasure::EarthMover,
    });
    let mut rng = PipelineRng::from_seed(1);
    let outcome = Anonymizer::apply(&ds, &technique, &mut rng).unwrap();
    // A very loose threshold leaves the data untouched.
    assert_eq!(outcome.dataset, ds);
}

#[test]
fn test_utility_of_identical_data_is_perfect() {
    let ds = patients();
    let mut rng = PipelineRng::from_seed(5);
    let report = UtilityEvaluator::measure(&ds, &ds, &MetricId::ALL, &mut rng).unwrap();

    for metric in [
        MetricId::StatisticalSimilarity,
        MetricId::DistributionSimilarity,
    ] {
        let overall = report.metrics[&metric].overall().unwrap();
        assert!(
            (overall - 1.0).abs() < 1e-9,
            "{:?} scored {}",
            metric,
            overall
        );
    }
    assert!(report.overall_utility > 0.95);
}

#[test]
fn test_weaker_privacy_budget_preserves_more_utility() {
    let ds = patients();
    let metrics = [
        MetricId::StatisticalSimilarity,
        MetricId::DistributionSimilarity,
    ];

    let measure_at = |epsilon: f64| {
        let technique = Technique::DifferentialPrivacy(DpParams {
            epsilon,
            sensitivity: 1.0,
            mechanism: DpMechanism::Laplace,
            columns: Some(vec!["age".into()]),
        });
        let mut rng = PipelineRng::from_seed(11);
        let outcome = Anonymizer::apply(&ds, &technique, &mut rng).unwrap();
        let report =
            UtilityEvaluator::measure(&ds, &outcome.dataset, &metrics, &mut rng).unwrap();
        report.overall_utility
    };

    // Laplace scale 5 on an age span of 11 vs scale 0.1.
    assert!(measure_at(10.0) > measure_at(0.2));
}

#[test]
fn test_synthetic_pipeline_keeps_marginals() {
    let ds = patients();
    let technique = Technique::Synthetic(SyntheticParams {
        method: SyntheticMethod::Statistical,
        sample_fraction: 1.0,
        preserve_correlations: true,
        preserve_distributions: true,
    });
    let mut rng = PipelineRng::from_seed(3);
    let outcome = Anonymizer::apply(&ds, &technique, &mut rng).unwrap();
    assert_eq!(outcome.dataset.len(), ds.len());

    let report = UtilityEvaluator::measure(
        &ds,
        &outcome.dataset,
        &[MetricId::StatisticalSimilarity],
        &mut rng,
    )
    .unwrap();
    let overall = report.metrics[&MetricId::StatisticalSimilarity]
        .overall()
        .unwrap();
    assert!(overall > 0.7, "statistical similarity {}", overall);
}

#[test]
fn test_pipeline_is_bit_identical_across_reruns() {
    let run = || {
        let ds = patients();
        let assessor = RiskAssessor::new(risk_config()).unwrap();
        let mut rng = PipelineRng::from_seed(2024);

        let profile = assessor.assess(&ds, &mut rng).unwrap();
        let technique = Technique::KAnonymity(KAnonymityParams {
            k: 4,
            quasi_identifiers: vec!["age".into(), "city".into()],
            method: GeneralizationMethod::Clustering,
            suppression_limit: 0.3,
        });
        let outcome = Anonymizer::apply(&ds, &technique, &mut rng).unwrap();
        let report =
            UtilityEvaluator::measure(&ds, &outcome.dataset, &MetricId::ALL, &mut rng).unwrap();

        (
            serde_json::to_string(&profile).unwrap(),
            serde_json::to_string(&outcome).unwrap(),
            serde_json::to_string(&report).unwrap(),
        )
    };

    assert_eq!(run(), run());
}

#[test]
fn test_suppression_limit_one_clears_every_violation() {
    let ds = Dataset::from_rows(
        vec!["qi".into()],
        (0..25)
            .map(|i| vec![Value::Number(i as f64 * i as f64)])
            .collect(),
    )
    .unwrap();
    let technique = Technique::KAnonymity(KAnonymityParams {
        k: 3,
        quasi_identifiers: vec!["qi".into()],
        method: GeneralizationMethod::LocalRecoding,
        suppression_limit: 1.0,
    });
    let mut rng = PipelineRng::from_seed(1);
    let outcome = Anonymizer::apply(&ds, &technique, &mut rng).unwrap();

    assert_eq!(outcome.residual_violating_classes, 0);
    assert_eq!(outcome.residual_violating_records, 0);
    let classes = safedata_core::partition(&outcome.dataset, &["qi".into()]).unwrap();
    for class in classes {
        assert!(class.size() >= 3);
    }
}
