use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Logs go to stderr so board output on stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("headsweeper=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    headsweeper::cli::run_cli()
}
