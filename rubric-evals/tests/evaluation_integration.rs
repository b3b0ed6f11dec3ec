//! Integration tests for evaluation runs through the public API.

use rubric_evals::metrics::{BleuOptions, RougeVariant, bleu, rouge};
use rubric_evals::{
    Dataset, DatasetItem, EvalError, EvalWarning, Evaluator, EvaluatorConfig, Metadata, Metric,
    Prediction, evaluate, random_sample,
};
use serde_json::{Value, json};

fn qa_dataset() -> Dataset {
    let mut math = Metadata::new();
    math.insert("category".to_string(), json!("math"));
    let mut geo = Metadata::new();
    geo.insert("category".to_string(), json!("geography"));

    Dataset::new(
        "mini-qa",
        "2024.1",
        vec![
            DatasetItem::new("q1", json!({"question": "2+2"}), json!("4")).with_metadata(math.clone()),
            DatasetItem::new("q2", json!({"question": "capital of France"}), json!(["Paris", "Paris, France"]))
                .with_metadata(geo),
            DatasetItem::new("q3", json!({"question": "3*3"}), json!(9)).with_metadata(math),
            DatasetItem::new("q4", json!({"question": "pick"}), json!("B")),
        ],
        Metadata::new(),
    )
    .unwrap()
}

#[test]
fn full_run_scores_mixed_answer_shapes() {
    let predictions = vec![
        Prediction::new("q1", json!({"answer": "4"})),
        Prediction::new("q2", json!("paris")),
        Prediction::new("q3", json!("9.0000001")),
        Prediction::new("q4", json!("(b)")),
    ];

    let result = evaluate(
        &predictions,
        &qa_dataset(),
        &[Metric::ExactMatch, Metric::TokenF1],
        "mini-model",
        &EvaluatorConfig::default(),
    )
    .unwrap();

    assert_eq!(result.correct_items(), 4);
    assert_eq!(result.accuracy(), 1.0);
    assert_eq!(result.metric("exact_match"), Some(1.0));
    assert!(result.incorrect_items().next().is_none());
    assert_eq!(result.item_results()[1].metadata()["category"], json!("geography"));
}

#[test]
fn failed_validation_produces_no_result() {
    let predictions = vec![
        Prediction::new("q1", json!("4")),
        Prediction::new("missing", json!("?")),
    ];

    let err = Evaluator::default()
        .evaluate(&predictions, &qa_dataset(), &[], "m")
        .unwrap_err();

    assert_eq!(err, EvalError::InvalidPredictionIds(vec!["missing".to_string()]));
    assert!(err.to_string().contains("missing"));
}

#[test]
fn result_serializes_to_stable_json() {
    let predictions = vec![Prediction::new("q1", json!("4"))];
    let result = Evaluator::default()
        .evaluate(&predictions, &qa_dataset(), &[Metric::parse("nonexistent")], "m")
        .unwrap();

    let value: Value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["dataset_name"], json!("mini-qa"));
    assert_eq!(value["total_items"], json!(1));
    assert_eq!(value["metrics"]["nonexistent"], json!(0.0));
    assert_eq!(value["warnings"][0]["kind"], json!("unknown_metric"));
    assert_eq!(
        result.warnings(),
        &[EvalWarning::UnknownMetric {
            name: "nonexistent".to_string()
        }]
    );
}

#[test]
fn sampled_dataset_can_be_evaluated() {
    let dataset = qa_dataset();
    let sample = random_sample(&dataset, 2, Some(5)).unwrap();
    let predictions: Vec<Prediction> = sample
        .items()
        .iter()
        .map(|item| Prediction::new(item.id(), item.expected().clone()))
        .collect();

    let result = Evaluator::default()
        .evaluate(&predictions, &sample, &[Metric::ExactMatch], "oracle")
        .unwrap();

    assert_eq!(result.total_items(), 2);
    assert_eq!(result.accuracy(), 1.0);
}

#[test]
fn bleu_short_candidate_is_penalized_by_brevity() {
    let options = BleuOptions {
        max_n: 2,
        ..BleuOptions::default()
    };
    let score = bleu(&json!("the cat"), &json!("the cat sat on the mat"), &options);
    assert!((score - (-2.0f64).exp()).abs() < 1e-12);
}

#[test]
fn rouge1_scores_shared_unigrams() {
    let scores = rouge(
        &json!("the cat sat on the mat"),
        &json!("the cat is on the mat"),
        &Default::default(),
    );
    let rouge1 = scores[&RougeVariant::Rouge1];

    assert!((rouge1.f1 - 5.0 / 6.0).abs() < 1e-12);
}
