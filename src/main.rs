use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::info;

use pneumo_linkage::config::{LinkageConfig, PipelineConfig};
use pneumo_linkage::pipeline::{self, PipelineContext};

#[derive(Parser)]
#[command(
    name = "pneumo-linkage",
    version,
    about = "Pneumonia mortality rates and death-to-discharge record linkage"
)]
struct Cli {
    /// Directory with `deaths/` and `discharges/` extracts and an optional `population.parquet`
    #[arg(long = "input-dir", value_name = "DIR", default_value = "./data/input")]
    input_dir: PathBuf,

    /// Directory the result tables are written to
    #[arg(long = "results-dir", value_name = "DIR", default_value = "./data/results")]
    results_dir: PathBuf,

    /// Registry years to process, comma separated (default: every year found)
    #[arg(long = "years", value_delimiter = ',')]
    years: Vec<i32>,

    /// Federative units covered by the extracts, comma separated
    #[arg(long = "ufs", value_delimiter = ',')]
    ufs: Vec<String>,

    /// Compare linkage blocks on the calling thread only
    #[arg(long = "no-parallel")]
    no_parallel: bool,

    /// Number of linkage worker threads
    #[arg(long = "workers")]
    workers: Option<usize>,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let mut linkage = LinkageConfig::new().use_parallel(!self.no_parallel);
        if let Some(workers) = self.workers {
            linkage = linkage.with_workers(workers);
        }

        let mut config = PipelineConfig::new(self.years)
            .with_input_dir(self.input_dir)
            .with_results_dir(self.results_dir)
            .with_linkage(linkage);
        if !self.ufs.is_empty() {
            config = config.with_ufs(self.ufs);
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start = Instant::now();
    let config = Cli::parse().into_config();
    let results_dir = config.results_dir.clone();

    let context = PipelineContext::load(config).context("failed to load pipeline inputs")?;
    let output = pipeline::run(&context).context("failed to run pipeline")?;
    let written = pipeline::persist(&context, &output, &results_dir)
        .with_context(|| format!("failed to write results to {}", results_dir.display()))?;

    info!(
        "Wrote {} files to {} in {:?}",
        written.len(),
        results_dir.display(),
        start.elapsed()
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&output.summary).context("failed to serialize summary")?
    );
    Ok(())
}
