//! Integration tests for the sampler through the public API.

use std::collections::HashSet;

use rubric_evals::sampling::keys;
use rubric_evals::{
    Dataset, DatasetItem, Metadata, SampleError, StratifyOptions, TestSize, k_fold, random_sample,
    stratified_sample, train_test_split,
};
use serde_json::json;

/// 100 items across three difficulty levels: 50 easy, 30 medium, 20 hard.
fn graded_dataset() -> Dataset {
    let items = (0..100)
        .map(|i| {
            let difficulty = match i % 10 {
                0 | 1 => "hard",
                2..=4 => "medium",
                _ => "easy",
            };
            let mut metadata = Metadata::new();
            metadata.insert("difficulty".to_string(), json!(difficulty));
            DatasetItem::new(format!("q{i:03}"), json!({"n": i}), json!(i * 2)).with_metadata(metadata)
        })
        .collect();

    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), json!("synthetic"));
    Dataset::new("graded", "3", items, metadata).unwrap()
}

fn ids(dataset: &Dataset) -> Vec<String> {
    dataset.ids().map(String::from).collect()
}

fn count(dataset: &Dataset, difficulty: &str) -> usize {
    dataset
        .items()
        .iter()
        .filter(|item| item.metadata()["difficulty"] == json!(difficulty))
        .count()
}

#[test]
fn samples_keep_dataset_identity_and_source_metadata() {
    let sample = random_sample(&graded_dataset(), 10, Some(1)).unwrap();

    assert_eq!(sample.name(), "graded");
    assert_eq!(sample.version(), "3");
    assert_eq!(sample.metadata()["source"], json!("synthetic"));
    assert_eq!(sample.metadata()[keys::SAMPLE_SIZE], json!(10));
}

#[test]
fn stratified_sample_matches_population_shares() {
    let sample = stratified_sample(
        &graded_dataset(),
        &StratifyOptions::new(10, "metadata.difficulty").with_seed(21),
    )
    .unwrap();

    assert_eq!(sample.len(), 10);
    assert_eq!(count(&sample, "easy"), 5);
    assert_eq!(count(&sample, "medium"), 3);
    assert_eq!(count(&sample, "hard"), 2);
}

#[test]
fn seeded_operations_are_reproducible() {
    let dataset = graded_dataset();
    let options = StratifyOptions::new(25, "difficulty").with_seed(77);

    assert_eq!(
        ids(&random_sample(&dataset, 30, Some(77)).unwrap()),
        ids(&random_sample(&dataset, 30, Some(77)).unwrap())
    );
    assert_eq!(
        ids(&stratified_sample(&dataset, &options).unwrap()),
        ids(&stratified_sample(&dataset, &options).unwrap())
    );
    assert_eq!(
        k_fold(&dataset, 5, true, Some(77)).unwrap(),
        k_fold(&dataset, 5, true, Some(77)).unwrap()
    );
    assert_eq!(
        train_test_split(&dataset, TestSize::Fraction(0.25), true, Some(77)).unwrap(),
        train_test_split(&dataset, TestSize::Fraction(0.25), true, Some(77)).unwrap()
    );
}

#[test]
fn k_fold_test_sets_partition_the_dataset() {
    let dataset = graded_dataset();
    let folds = k_fold(&dataset, 7, true, Some(3)).unwrap();

    let mut union = HashSet::new();
    for fold in &folds {
        let test: HashSet<String> = ids(&fold.test).into_iter().collect();
        let train: HashSet<String> = ids(&fold.train).into_iter().collect();

        assert!(test.is_disjoint(&train));
        assert_eq!(test.len() + train.len(), dataset.len());
        assert!(union.is_disjoint(&test));
        union.extend(test);
    }
    assert_eq!(union.len(), dataset.len());
}

#[test]
fn train_test_split_fraction_lands_near_target() {
    let split =
        train_test_split(&graded_dataset(), TestSize::Fraction(0.2), true, None).unwrap();

    assert!((15..=25).contains(&split.test.len()));
    assert_eq!(split.test.len() + split.train.len(), 100);
}

#[test]
fn sampler_errors_surface_through_public_api() {
    let dataset = graded_dataset();

    assert!(matches!(
        random_sample(&dataset, 101, None),
        Err(SampleError::SampleSizeExceeded { .. })
    ));
    assert!(matches!(
        k_fold(&dataset, 101, false, None),
        Err(SampleError::InvalidFoldCount { .. })
    ));
    assert!(matches!(
        stratified_sample(&dataset, &StratifyOptions::new(5, "expected.label")),
        Err(SampleError::MissingStrataField { .. })
    ));
}
