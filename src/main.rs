use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use street_priority::cli::{Cli, Commands};
use street_priority::commands::{profile, report, score};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose > 0 { "debug" } else { "info" };
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(default_level.parse()?));
    tracing_subscriber::registry().with(stderr_layer).init();

    match &cli.command {
        Commands::Profile(args) => profile::run(&cli, args),
        Commands::Score(args) => score::run(&cli, args),
        Commands::Report(args) => report::run(&cli, args),
    }
}
