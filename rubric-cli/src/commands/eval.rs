//! Evaluation command.
//!
//! Scores a predictions file against a dataset file and prints a summary
//! table or the full JSON result.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use rubric_evals::{EvaluationResult, Evaluator, Metric};
use tracing::warn;

use crate::config::{ConfigLoader, RubricConfig};
use crate::io::{read_dataset, read_predictions, write_json};

/// Model name recorded when neither --model nor the config sets one
const UNNAMED_MODEL: &str = "unnamed";

/// Evaluation arguments.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Dataset JSON file
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Predictions file (JSON array or JSONL)
    #[arg(short, long)]
    pub predictions: PathBuf,

    /// Metric to compute; repeat for several, the first is primary
    /// (exact_match, token_f1, bleu, rouge)
    #[arg(short, long = "metric")]
    pub metrics: Vec<String>,

    /// Model name recorded on the result
    #[arg(long)]
    pub model: Option<String>,

    /// Minimum primary score for an item to count as correct
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Score items in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// List every incorrect item in table output
    #[arg(long)]
    pub show_items: bool,

    /// Write output to a file instead of stdout (JSON format only)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Output format for evaluation results
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Summary table
    #[default]
    Table,
    /// Full result as JSON
    Json,
}

/// Run eval command.
pub fn run(args: EvalArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let dataset = read_dataset(&args.dataset)?;
    let predictions = read_predictions(&args.predictions)?;

    let metrics = select_metrics(&args.metrics, &config);
    let model = args
        .model
        .clone()
        .or_else(|| config.evaluation.model.clone())
        .unwrap_or_else(|| UNNAMED_MODEL.to_string());

    let mut evaluator_config = config.evaluator_config();
    if let Some(threshold) = args.threshold {
        evaluator_config.correct_threshold = threshold;
    }
    evaluator_config.parallel |= args.parallel;

    let result = Evaluator::new(evaluator_config).evaluate(&predictions, &dataset, &metrics, &model)?;

    match args.format {
        OutputFormat::Json => write_json(&result, args.output.as_deref())?,
        OutputFormat::Table => {
            if args.output.is_some() {
                warn!("--output is only used with --format json; printing table to stdout");
            }
            print_summary(&result, args.show_items);
        }
    }

    Ok(())
}

/// Command-line metrics win over configured ones.
fn select_metrics(requested: &[String], config: &RubricConfig) -> Vec<Metric> {
    let names = if requested.is_empty() {
        config.evaluation.metrics.as_slice()
    } else {
        requested
    };
    names.iter().map(|name| Metric::parse(name)).collect()
}

fn print_summary(result: &EvaluationResult, show_items: bool) {
    println!("{result}");
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Metric").fg(Color::Cyan),
        Cell::new("Mean").fg(Color::Cyan),
    ]);
    table.add_row(vec![
        Cell::new("accuracy"),
        Cell::new(format!("{:.4}", result.accuracy())),
    ]);
    for (name, value) in result.metrics() {
        table.add_row(vec![Cell::new(name), Cell::new(format!("{value:.4}"))]);
    }
    println!("{table}");

    for warning in result.warnings() {
        println!("warning: {warning}");
    }

    if show_items {
        let incorrect: Vec<_> = result.incorrect_items().collect();
        if incorrect.is_empty() {
            println!("\nAll items correct.");
            return;
        }

        let mut items = Table::new();
        items.load_preset(UTF8_FULL_CONDENSED);
        items.set_content_arrangement(ContentArrangement::Dynamic);
        items.set_header(vec![
            Cell::new("Id").fg(Color::Cyan),
            Cell::new("Score").fg(Color::Cyan),
            Cell::new("Predicted").fg(Color::Cyan),
            Cell::new("Expected").fg(Color::Cyan),
        ]);
        for item in incorrect {
            items.add_row(vec![
                Cell::new(item.id()),
                Cell::new(format!("{:.4}", item.score())),
                Cell::new(item.predicted().to_string()),
                Cell::new(item.expected().to_string()),
            ]);
        }
        println!("\n{items}");
    }
}
