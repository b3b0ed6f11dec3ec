//! Sampling and partitioning commands.
//!
//! Every command reads a dataset file and writes the derived dataset(s) as
//! JSON. Without `--seed`, the seed configured under `[sampling]` is used.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use rubric_evals::{
    StratifyOptions, TestSize, k_fold, random_sample, stratified_sample, train_test_split,
};
use tracing::info;

use crate::config::ConfigLoader;
use crate::io::{read_dataset, write_json};

/// Options shared by every sampling command.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Dataset JSON file
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SourceArgs {
    fn resolve_seed(&self) -> Result<Option<u64>> {
        if self.seed.is_some() {
            return Ok(self.seed);
        }
        Ok(ConfigLoader::load()?.sampling.seed)
    }
}

/// Sample arguments.
#[derive(Args, Debug)]
pub struct SampleArgs {
    #[command(subcommand)]
    pub command: SampleCommands,
}

/// Sample subcommands.
#[derive(Subcommand, Debug)]
pub enum SampleCommands {
    /// Draw items uniformly without replacement
    Random {
        #[command(flatten)]
        source: SourceArgs,

        /// Number of items to draw
        #[arg(short = 'n', long)]
        size: usize,
    },
    /// Draw items while preserving the share of each stratum
    Stratified {
        #[command(flatten)]
        source: SourceArgs,

        /// Number of items to draw
        #[arg(short = 'n', long)]
        size: usize,

        /// Field defining an item's stratum (e.g. metadata.category)
        #[arg(short, long)]
        field: String,
    },
}

/// K-fold arguments.
#[derive(Args, Debug)]
pub struct KfoldArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of folds
    #[arg(short, long, default_value_t = 5)]
    pub k: usize,

    /// Keep dataset order instead of shuffling before folding
    #[arg(long)]
    pub no_shuffle: bool,
}

/// Train/test split arguments.
#[derive(Args, Debug)]
pub struct SplitArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Test partition size: a fraction such as 0.2, or an item count such as 20
    #[arg(short, long, default_value = "0.2")]
    pub test_size: String,

    /// Take the test set from the start of the dataset instead of shuffling
    #[arg(long)]
    pub no_shuffle: bool,
}

/// Run sample command.
pub fn run_sample(args: SampleArgs) -> Result<()> {
    match args.command {
        SampleCommands::Random { source, size } => {
            let dataset = read_dataset(&source.dataset)?;
            let sample = random_sample(&dataset, size, source.resolve_seed()?)?;
            info!(size = sample.len(), "drew random sample");
            write_json(&sample, source.output.as_deref())
        }
        SampleCommands::Stratified {
            source,
            size,
            field,
        } => {
            let dataset = read_dataset(&source.dataset)?;
            let mut options = StratifyOptions::new(size, field);
            options.seed = source.resolve_seed()?;
            let sample = stratified_sample(&dataset, &options)?;
            info!(size = sample.len(), "drew stratified sample");
            write_json(&sample, source.output.as_deref())
        }
    }
}

/// Run kfold command.
pub fn run_kfold(args: KfoldArgs) -> Result<()> {
    let dataset = read_dataset(&args.source.dataset)?;
    let folds = k_fold(&dataset, args.k, !args.no_shuffle, args.source.resolve_seed()?)?;
    info!(folds = folds.len(), "built folds");
    write_json(&folds, args.source.output.as_deref())
}

/// Run split command.
pub fn run_split(args: SplitArgs) -> Result<()> {
    let dataset = read_dataset(&args.source.dataset)?;
    let test_size = parse_test_size(&args.test_size)?;
    let split = train_test_split(
        &dataset,
        test_size,
        !args.no_shuffle,
        args.source.resolve_seed()?,
    )?;
    info!(
        train = split.train.len(),
        test = split.test.len(),
        "split dataset"
    );
    write_json(&split, args.source.output.as_deref())
}

/// Values with a decimal point are fractions; bare integers are counts.
fn parse_test_size(value: &str) -> Result<TestSize> {
    let value = value.trim();
    if value.contains(['.', 'e', 'E']) {
        match value.parse::<f64>() {
            Ok(fraction) => Ok(TestSize::Fraction(fraction)),
            Err(_) => bail!("invalid test size: {value}"),
        }
    } else {
        match value.parse::<usize>() {
            Ok(count) => Ok(TestSize::Count(count)),
            Err(_) => bail!("invalid test size: {value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_test_size_reads_fractions() {
        assert_eq!(parse_test_size("0.25").unwrap(), TestSize::Fraction(0.25));
        assert_eq!(parse_test_size(".5").unwrap(), TestSize::Fraction(0.5));
    }

    #[test]
    fn parse_test_size_reads_counts() {
        assert_eq!(parse_test_size("20").unwrap(), TestSize::Count(20));
    }

    #[test]
    fn parse_test_size_rejects_garbage() {
        assert!(parse_test_size("a fifth").is_err());
        assert!(parse_test_size("-3").is_err());
    }
}
