//! ulpcl - compiles `.ulp` localization packs into `.umc` message
//! catalogs (`spec.md` §6).
//!
//! Parses the CLI surface, loads `ulpcl.toml` for any flags left
//! unspecified, initializes logging, then hands the discovered packs to
//! `ulpcl-core`'s dispatcher.

mod commands;
mod config;
mod error;
mod options;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use ulpcl_core::{DispatchCounters, ErrorModel, ThreadSetting};

use commands::compile::{run_compile, CompileArgs};
use config::Config;
use error::Result;
use options::ProgramOptions;

/// Compiles `.ulp` localization packs into `.umc` binary catalogs.
#[derive(Parser, Debug)]
#[command(name = "ulpcl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles .ulp localization packs into .umc message catalogs", long_about = None)]
struct Cli {
    /// Enable the compilation log.
    #[arg(short = 'V', long, env = "ULPCL_VERBOSE")]
    verbose: bool,

    /// Add one .ulp file to compile. May be repeated.
    #[arg(long = "input", value_name = "PATH")]
    inputs: Vec<PathBuf>,

    /// Add every .ulp file inside a directory. May be repeated.
    #[arg(long = "input-dir", value_name = "PATH")]
    input_dirs: Vec<PathBuf>,

    /// Output directory; created if missing.
    #[arg(long = "output-dir", value_name = "PATH")]
    output_dir: Option<PathBuf>,

    /// Thread pool size.
    #[arg(long, value_enum)]
    threads: Option<ThreadsArg>,

    /// Error model: whether empty files/content/groups/messages are
    /// warnings or errors.
    #[arg(long = "error-model", value_enum)]
    error_model: Option<ErrorModelArg>,

    /// Drop messages whose value is empty instead of emitting them.
    #[arg(short = 'd', long)]
    discard_empty: bool,

    /// Also emit a .sym symbol file per pack.
    #[arg(short = 's', long = "symbol-file")]
    symbol_file: bool,

    /// Path to a ulpcl.toml configuration file.
    #[arg(long, env = "ULPCL_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ThreadsArg {
    Disable,
    Auto,
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
    #[value(name = "4")]
    Four,
    #[value(name = "8")]
    Eight,
}

impl From<ThreadsArg> for ThreadSetting {
    fn from(value: ThreadsArg) -> Self {
        match value {
            ThreadsArg::Disable => ThreadSetting::Disabled,
            ThreadsArg::Auto => ThreadSetting::Auto,
            ThreadsArg::One => ThreadSetting::Fixed(1),
            ThreadsArg::Two => ThreadSetting::Fixed(2),
            ThreadsArg::Four => ThreadSetting::Fixed(4),
            ThreadsArg::Eight => ThreadSetting::Fixed(8),
        }
    }
}

fn parse_threads_str(value: &str) -> Option<ThreadSetting> {
    match value {
        "disable" => Some(ThreadSetting::Disabled),
        "auto" => Some(ThreadSetting::Auto),
        "1" => Some(ThreadSetting::Fixed(1)),
        "2" => Some(ThreadSetting::Fixed(2)),
        "4" => Some(ThreadSetting::Fixed(4)),
        "8" => Some(ThreadSetting::Fixed(8)),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ErrorModelArg {
    Soft,
    Strict,
    Default,
}

impl From<ErrorModelArg> for ErrorModel {
    fn from(value: ErrorModelArg) -> Self {
        match value {
            ErrorModelArg::Soft | ErrorModelArg::Default => ErrorModel::Soft,
            ErrorModelArg::Strict => ErrorModel::Strict,
        }
    }
}

fn parse_error_model_str(value: &str) -> Option<ErrorModel> {
    match value {
        "soft" | "default" => Some(ErrorModel::Soft),
        "strict" => Some(ErrorModel::Strict),
        _ => None,
    }
}

/// Exit code for any operational failure outside a single pack's own
/// pipeline — bad CLI arguments, an unreadable config file (`spec.md`
/// §6's "unknown exception" catch-all). Per-pack failures never reach
/// this path: `run_compile` tallies them into `DispatchCounters` and
/// still returns `Ok`, so the process exits `0` as long as it ran at
/// all. There is no code path here for `spec.md`'s other catch-all,
/// allocation failure (`-1`) — that terminates before unwinding reaches
/// `main` on every allocator this binary runs with.
const EXIT_UNKNOWN_EXCEPTION: i32 = -2;

fn main() {
    if let Err(err) = run() {
        tracing::error!(target: "ulpcl", "{err}");
        std::process::exit(EXIT_UNKNOWN_EXCEPTION);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let args = resolve_args(&cli, &config);

    ProgramOptions::install(ProgramOptions {
        inputs: args.inputs.clone(),
        input_dirs: args.input_dirs.clone(),
        output_dir: args.output_dir.clone(),
        threads: args.threads,
        error_model: args.error_model,
        discard_empty: args.discard_empty,
        symbol_file: args.symbol_file,
        verbose: cli.verbose,
    });

    let hardware_concurrency = num_cpus::get();
    let counters = run_compile(args, hardware_concurrency)?;
    report_summary(counters);

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    let _ = tracing_subscriber::registry().with(filter).with(subscriber).try_init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

fn resolve_args(cli: &Cli, config: &Config) -> CompileArgs {
    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_dir));

    let threads = cli
        .threads
        .map(ThreadSetting::from)
        .or_else(|| config.threads.as_deref().and_then(parse_threads_str))
        .unwrap_or(ThreadSetting::Disabled);

    let error_model = cli
        .error_model
        .map(ErrorModel::from)
        .or_else(|| config.error_model.as_deref().and_then(parse_error_model_str))
        .unwrap_or_default();

    CompileArgs {
        inputs: cli.inputs.clone(),
        input_dirs: cli.input_dirs.clone(),
        output_dir,
        threads,
        error_model,
        discard_empty: cli.discard_empty || config.discard_empty,
        symbol_file: cli.symbol_file || config.symbol_file,
    }
}

fn report_summary(counters: DispatchCounters) {
    tracing::info!(
        target: "ulpcl",
        "compiled {} pack(s): {} succeeded, {} failed",
        counters.succeeded + counters.failed,
        counters.succeeded,
        counters.failed
    );
}
