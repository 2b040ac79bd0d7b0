//! race-agent binary entry point.
//!
//! Usage: race-agent [OPTIONS] <COMMAND>...

use std::path::PathBuf;
use std::process::ExitCode;

use agent_config_and_utils::{init_logging, Config, Paths};
use clap::Parser;
use race_agent::{run_agent, AgentOptions, AgentResult};

/// Stub polkit authentication agent: runs COMMAND and answers
/// authentication requests for it on the controlling terminal.
#[derive(Parser, Debug)]
#[command(name = "race-agent")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RACE_AGENT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Base directory for config and logs. Defaults to ~/.race-agent
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Object path to export the agent at.
    #[arg(long)]
    object_path: Option<String>,

    /// Register as the fallback agent.
    #[arg(long)]
    fallback: bool,

    /// Print banners without ANSI colors.
    #[arg(long)]
    no_highlight: bool,

    /// Command to run, followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(path) = &self.object_path {
            config.object_path = path.clone();
        }
        if self.fallback {
            config.fallback = true;
        }
        if self.no_highlight {
            config.highlight = false;
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> AgentResult<()> {
    let paths = match &args.base_dir {
        Some(base) => Paths::with_base_dir(base.clone()),
        None => Paths::new()?,
    };
    let config = resolve_config(&args, &paths)?;

    init_logging(&config.log_level, Some(paths.log_file()));

    let options = AgentOptions::from_config(&config, args.command);

    // Single-threaded loop; blocking terminal reads go to the blocking pool.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run_agent(options));

    // A request may still be blocked reading the terminal; don't wait for it.
    runtime.shutdown_background();
    result
}

/// File and environment first, then flags; validated once merged.
fn resolve_config(args: &Args, paths: &Paths) -> AgentResult<Config> {
    let mut config = Config::load(paths)?;
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}
