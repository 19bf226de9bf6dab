mod cli;
mod command;
mod command_outcome;
mod commands;
mod output_utils;

use clap::Parser;
pub(crate) use cli::Cli;
pub(crate) use command::RunnableCommand;
pub(crate) use command_outcome::CommandOutcome;

#[tokio::main(flavor = "multi_thread", worker_threads = 10)]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    cli.cmd.run().await.report()
}

/// `-v` forces debug; otherwise the `QUELL_LOG` environment variable picks
/// the level (`trace`/`debug`/`info`, default `info`).
fn init_logging(verbose: bool) {
    let env = std::env::var("QUELL_LOG").ok();
    let (level, rejected) = log_level(verbose, env.as_deref());
    tracing_subscriber::fmt()
        .with_max_level(level)
        .init();
    log::trace!("Logging level set to `{level}`.");
    if let Some(rejected) = rejected {
        log::warn!("Unrecognized QUELL_LOG value `{rejected}`; using `{level}`.");
    }
}

fn log_level(verbose: bool, env: Option<&str>) -> (tracing::Level, Option<String>) {
    if verbose {
        return (tracing::Level::DEBUG, None);
    }
    match env.map(str::trim) {
        None | Some("") => (tracing::Level::INFO, None),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "trace" => (tracing::Level::TRACE, None),
            "debug" => (tracing::Level::DEBUG, None),
            "info" => (tracing::Level::INFO, None),
            other => (tracing::Level::INFO, Some(other.to_string())),
        },
    }
}
