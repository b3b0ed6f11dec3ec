use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod io;

#[derive(Parser)]
#[command(name = "rubric", about = "Evaluate model predictions and sample datasets")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Score predictions against a dataset
    Eval(commands::eval::EvalArgs),
    /// Partition a dataset into k cross-validation folds
    Kfold(commands::sample::KfoldArgs),
    /// Draw a random or stratified sample from a dataset
    Sample(commands::sample::SampleArgs),
    /// Split a dataset into train and test partitions
    Split(commands::sample::SplitArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Config(args) => commands::config::run(args),
        Commands::Eval(args) => commands::eval::run(args),
        Commands::Kfold(args) => commands::sample::run_kfold(args),
        Commands::Sample(args) => commands::sample::run_sample(args),
        Commands::Split(args) => commands::sample::run_split(args),
    }
}
