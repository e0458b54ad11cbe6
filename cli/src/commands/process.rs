//! Process command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;
use vantage_gpu::PerformanceProcessor;
use vantage_shared::types::trace::TraceData;
use vantage_store::config::StoreConfig;

use super::StoreArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Trace file (JSON)
    pub trace: PathBuf,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Also write the computed performance in JSON format
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Print snapshot store metrics in Prometheus text format
    #[arg(long)]
    pub print_metrics: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: ProcessArgs) -> Result<()> {
    let json = std::fs::read_to_string(&args.trace)
        .with_context(|| format!("Failed to read trace {}", args.trace.display()))?;
    let trace = TraceData::from_json(&json).context("Failed to parse trace")?;
    debug!(
        "Loaded {} slices, {} groups and {} counters",
        trace.gpu_slices.slices.len(),
        trace.gpu_slices.groups.len(),
        trace.counters.len()
    );

    let config = args.store.load_config()?;
    let store = config.store.open()?;

    let processed = PerformanceProcessor::new(store.as_ref())
        .process_trace(&trace)
        .context("Invalid trace")?;

    output::print_performance_table(&processed.crude);

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&processed.crude)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        output::info(&format!("JSON output written to {}", path.display()));
    }

    if processed.is_persisted() {
        output::success(&format!("Snapshot {}", processed.snapshot_id));
        if config.store == StoreConfig::InMemory {
            output::warning("In-memory store: the snapshot is gone once this command exits");
        }
    } else {
        output::warning("Snapshot could not be stored; results above are not queryable");
    }

    if args.print_metrics {
        print!("{}", vantage_store::metrics::encode_metrics());
    }

    Ok(())
}
