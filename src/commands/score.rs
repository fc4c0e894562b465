use anyhow::Result;
use tracing::info;

use crate::cli::{Cli, ScoreArgs};
use crate::config::PipelineConfig;
use crate::pipeline::score_network;

pub fn run(_cli: &Cli, args: &ScoreArgs) -> Result<()> {
    let cfg = PipelineConfig::default();
    info!(
        streets = %args.streets.display(),
        addresses = %args.addresses.display(),
        "scoring street network"
    );

    let summary = score_network(
        &cfg,
        &args.streets,
        &args.addresses,
        &args.output,
        &args.top_output,
    )?;

    info!(
        segments = summary.segments,
        addresses = summary.addresses,
        matched_segments = summary.matched_segments,
        "run complete"
    );
    println!("Saved:");
    println!(" - {}", args.output.display());
    println!(" - {}", args.top_output.display());
    Ok(())
}
