use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use tcpchat::config::{
    DEFAULT_HOST, DEFAULT_LOG_FILE, DEFAULT_PORT, LogTarget, MAX_CONNECTIONS, ServerConfig,
};
use tcpchat::{logger, server};

#[derive(Parser, Debug)]
#[command(name = "tcpchat")]
#[command(about = "Line-based TCP chat server", long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Log activity to stdout instead of the log file
    #[arg(short, long)]
    verbose: bool,

    /// Host address to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Activity log file, appended to
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Maximum number of clients connected at once
    #[arg(long, default_value_t = MAX_CONNECTIONS)]
    max_clients: usize,

    /// Keep only the newest N chat lines for replay
    #[arg(long)]
    history_limit: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let target = if args.verbose {
        LogTarget::Stdout
    } else {
        LogTarget::File(args.log_file)
    };
    logger::setup_logger(&target, "info")?;

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        max_clients: args.max_clients,
        history_limit: args.history_limit,
    };

    if let Err(err) = server::run(&config).await {
        tracing::error!("{err:#}");
        return Err(err);
    }

    Ok(())
}
