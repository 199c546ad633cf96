use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use gator_cli::{start, AggOptions, StartOptions};

#[derive(Parser, Debug)]
#[command(name = "gator", version)]
#[command(about = "Command-line RSS feed aggregator", long_about = None)]
struct Cli {
    /// Config file path (default: ~/.gatorconfig.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Deadline in seconds for fetching feeds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    timeout: u64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Command and its arguments: login <name>, register <name>, reset, users, agg [url...]
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    gator_logging::initialize(
        gator_logging::level_for_verbosity(cli.verbose),
        cli.log_file.as_deref(),
    );

    let options = StartOptions {
        config_path: cli.config,
        agg: AggOptions {
            timeout: Duration::from_secs(cli.timeout),
            ..AggOptions::default()
        },
        ..StartOptions::default()
    };

    match start(&options, &cli.command, Box::new(io::stdout())) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
