mod cmd_heartbeat;
mod cmd_metric;
mod cmd_summary;
mod cmd_today;
mod exitcode;
mod logging;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tempo", version, about = "Developer activity tracking CLI")]
struct Cli {
    /// Base URL of the aggregation service
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record one heartbeat and deliver it, queueing offline on failure
    Heartbeat {
        /// Path of the entity the activity applies to
        #[arg(long)]
        entity: String,
        /// Unix epoch seconds of the activity (defaults to now)
        #[arg(long)]
        time: Option<i64>,
        /// Cursor position within the entity
        #[arg(long = "cursorpos")]
        cursor_position: Option<i32>,
        /// Language of the entity
        #[arg(long)]
        language: Option<String>,
        /// Line the activity occurred on
        #[arg(long = "lineno")]
        line_number: Option<i32>,
        /// Total lines in the entity
        #[arg(long = "lines-in-file")]
        lines_in_file: Option<i32>,
        /// Project name
        #[arg(long)]
        project: Option<String>,
        /// Project root path
        #[arg(long = "project-path")]
        project_path: Option<String>,
        /// Editor plugin identifier reported in the user agent
        #[arg(long, default_value = "")]
        plugin: String,
        /// Never touch the offline queue, even on delivery failure
        #[arg(long)]
        disable_offline: bool,
        /// Queue the heartbeat locally before attempting delivery
        #[arg(long)]
        local_first: bool,
        /// Offline queue file (defaults to the per-user data dir)
        #[arg(long = "offline-queue-file")]
        offline_queue_file: Option<PathBuf>,
    },
    /// Print today's tracked time
    Today,
    /// Print today's summary as JSON
    Summary,
    /// Print today's duration breakdown for a metric key as JSON
    Metric {
        /// Metric key: "project" or "lineno"
        key: String,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("command failed: {err:#}");
            eprintln!("error: {err:#}");
            exitcode::ERR_GENERIC
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Heartbeat {
            entity,
            time,
            cursor_position,
            language,
            line_number,
            lines_in_file,
            project,
            project_path,
            plugin,
            disable_offline,
            local_first,
            offline_queue_file,
        } => cmd_heartbeat::execute(cmd_heartbeat::HeartbeatCliParams {
            api_url: cli.api_url.as_deref(),
            entity,
            time,
            cursor_position,
            language,
            line_number,
            lines_in_file,
            project,
            project_path,
            plugin: &plugin,
            disable_offline,
            local_first,
            offline_queue_file,
        }),
        Command::Today => cmd_today::execute(cli.api_url.as_deref()),
        Command::Summary => cmd_summary::execute(cli.api_url.as_deref()),
        Command::Metric { key } => cmd_metric::execute(cli.api_url.as_deref(), &key),
    }
}

fn require_api_url(api_url: Option<&str>) -> anyhow::Result<tempo_api::Client> {
    let Some(url) = api_url.filter(|url| !url.is_empty()) else {
        anyhow::bail!("--api-url is required");
    };
    Ok(tempo_api::Client::new(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn api_url_must_be_present_and_non_empty() {
        assert!(require_api_url(None).is_err());
        assert!(require_api_url(Some("")).is_err());
        let client = require_api_url(Some("http://127.0.0.1:3000")).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:3000");
    }
}
