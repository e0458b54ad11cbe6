//! Query command implementation

use anyhow::{Context, Result};
use clap::Args;
use vantage_gpu::resolve_performance;
use vantage_shared::types::trace::{Command, CommandRange};
use vantage_shared::utils::parse_command_indices;
use vantage_store::config::StoreConfig;
use vantage_store::SnapshotId;

use super::StoreArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Snapshot id, as printed by `vantage process`
    pub snapshot: String,

    /// First command of the range (dotted indices, e.g. 0.2.5)
    #[arg(long)]
    pub from: String,

    /// Last command of the range; commands nested under it are included
    #[arg(long)]
    pub to: String,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Print the result in JSON format
    #[arg(long)]
    pub json: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: QueryArgs) -> Result<()> {
    let id: SnapshotId = args.snapshot.parse().context("Invalid snapshot id")?;
    let range = CommandRange::new(
        Command::new(parse_command_indices(&args.from).context("Invalid --from")?),
        Command::new(parse_command_indices(&args.to).context("Invalid --to")?),
    );

    let config = args.store.load_config()?;
    if config.store == StoreConfig::InMemory {
        anyhow::bail!("Snapshots cannot be queried from an in-memory store");
    }
    let store = config.store.open()?;

    let result = resolve_performance(store.as_ref(), &id, &range)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.group_count == 0 {
        output::warning(&format!("No commands in range {}..={}", range.from, range.to));
    } else {
        output::info(&format!(
            "{} command(s) in range {}..={}",
            result.group_count, range.from, range.to
        ));
    }
    output::print_range_performance(&result);

    Ok(())
}
