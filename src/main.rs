// src/main.rs

use clap::Parser;

use globpipe::cli::CliArgs;
use globpipe::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_level)?;

    globpipe::run(args).await?;
    Ok(())
}
