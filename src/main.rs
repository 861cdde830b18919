mod cli;
mod commands;

use crate::cli::Cli;
use clap::Parser;
use sharehub_config::Config;
use std::error::Error as StdError;
use std::fmt::Debug;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).map_err(report)?;
    init_logging(&config, cli.verbose);
    tracing::debug!(
        implicit = ?Config::default_file(),
        explicit = ?cli.config,
        ?config,
        "Configuration loaded"
    );
    commands::run(cli, config).await
}

fn init_logging(config: &Config, verbose: u8) {
    let level = match verbose {
        0 => config.log.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

/// Turn an error tree into a report showing its top-level message. The full
/// tree, with locations, goes to the debug log.
pub(crate) fn report<K>(err: exn::Exn<K>) -> miette::Report
where
    K: StdError + Debug + Send + Sync + 'static,
{
    tracing::debug!(error = ?err, "Command failed");
    miette::miette!("{}", &*err)
}
