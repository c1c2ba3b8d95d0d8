use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod build;
mod config;
mod course;
mod ingestion;
mod inspect;
mod output;
mod pipeline;
mod publish;
mod render;
mod telemetry;
mod util;

#[derive(Parser)]
#[command(name = "course-feed", about = "Publish a course listing as an RSS 2.0 feed")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Build(build::BuildCmd),
    Inspect(inspect::InspectCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and COURSE_FEED_LOG_FORMAT
    telemetry::config::init_tracing();
    let cfg = config::FeedConfig::from_env()?;

    match cli.command {
        Commands::Build(args) => build::run(cfg, args).await?,
        Commands::Inspect(args) => inspect::run(cfg, args).await?,
    }

    Ok(())
}
