//! Reading datasets and predictions, writing JSON output.

use std::path::Path;

use anyhow::{Context, Result};
use rubric_evals::{Dataset, Prediction};
use serde::Serialize;
use tracing::debug;

/// Load a dataset from a JSON file.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let dataset: Dataset = serde_json::from_str(&contents)
        .with_context(|| format!("invalid dataset {}", path.display()))?;
    debug!(path = %path.display(), name = dataset.name(), items = dataset.len(), "loaded dataset");
    Ok(dataset)
}

/// Load predictions from a JSON array or a JSONL file.
pub fn read_predictions(path: &Path) -> Result<Vec<Prediction>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read predictions {}", path.display()))?;
    let predictions = parse_predictions(&contents)
        .with_context(|| format!("invalid predictions {}", path.display()))?;
    debug!(path = %path.display(), count = predictions.len(), "loaded predictions");
    Ok(predictions)
}

fn parse_predictions(contents: &str) -> Result<Vec<Prediction>> {
    if contents.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(contents)?);
    }

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}", i + 1))
        })
        .collect()
}

/// Write `value` as pretty JSON to `output`, or to stdout when unset.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            debug!(path = %path.display(), "wrote output");
        }
        None => println!("{json}"),
    }
    Ok(())
}
