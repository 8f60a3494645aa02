use aavail_ingest::Pipeline;
use aavail_ingest::config::IngestConfig;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aavail-ingest")]
#[command(about = "Merge customer and subscription stream data into a churn-modeling dataset")]
#[command(version)]
struct Cli {
    /// Database file name, resolved inside the data directory
    #[arg(short = 'd', long = "db-file")]
    db_file: String,

    /// Streams CSV file name, resolved inside the data directory
    #[arg(short = 's', long = "streams-file")]
    streams_file: String,

    /// Directory holding the input files and the clean output
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Overwrite the target dataset instead of appending to it
    #[arg(long)]
    overwrite: bool,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = IngestConfig::new(cli.data_dir, cli.db_file, cli.streams_file, cli.overwrite);
    let target = config.target_file();

    let summary = Pipeline::new(config).run().await?;

    println!("customers ingested:   {}", summary.customers);
    println!("duplicates removed:   {}", summary.duplicate_customers);
    println!("stream events kept:   {}", summary.stream_events);
    println!("missing stream ids:   {}", summary.events_missing_stream_id);
    println!("rows written:         {}", summary.rows_written);
    println!("target: {}", target.display());

    Ok(())
}
