//! The `ulpcl` compile command: discover `.ulp` packs, resolve options,
//! and run them through `ulpcl-core`'s dispatcher (`spec.md` §6, §4.7).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ulpcl_core::dispatch::{resolve_thread_count, PackDispatcher, ParallelDispatcher, SequentialDispatcher, ThreadSetting};
use ulpcl_core::log::{BufferedSink, DirectSink, LogSink};
use ulpcl_core::{compile_pack, CompileOptions, DispatchCounters, ErrorModel};

use crate::error::{Result, UlpclError};

pub const PACK_EXTENSION: &str = "ulp";

#[derive(Debug, Clone)]
pub struct CompileArgs {
    pub inputs: Vec<PathBuf>,
    pub input_dirs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub threads: ThreadSetting,
    pub error_model: ErrorModel,
    pub discard_empty: bool,
    pub symbol_file: bool,
}

/// Collects every `.ulp` path named by `--input` and `--input-dir`,
/// validating each `--input` file exists with the right extension.
pub fn discover_inputs(args: &CompileArgs) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for path in &args.inputs {
        validate_input_file(path)?;
        inputs.push(path.clone());
    }

    for dir in &args.input_dirs {
        inputs.extend(collect_dir(dir)?);
    }

    Ok(inputs)
}

fn validate_input_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(UlpclError::Validation(format!(
            "input file does not exist: {}",
            path.display()
        )));
    }
    if path.extension().and_then(|e| e.to_str()) != Some(PACK_EXTENSION) {
        return Err(UlpclError::Validation(format!(
            "input file is not a .{} pack: {}",
            PACK_EXTENSION,
            path.display()
        )));
    }
    Ok(())
}

fn collect_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(UlpclError::Validation(format!(
            "input directory does not exist: {}",
            dir.display()
        )));
    }

    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(PACK_EXTENSION) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Compiles every discovered pack, choosing the sequential or parallel
/// dispatcher per `args.threads` and `hardware_concurrency`, and returns
/// the aggregate success/failure tally.
pub fn run_compile(args: CompileArgs, hardware_concurrency: usize) -> Result<DispatchCounters> {
    let inputs = discover_inputs(&args)?;
    std::fs::create_dir_all(&args.output_dir)?;

    let options = CompileOptions {
        model: args.error_model,
        discard_empty_messages: args.discard_empty,
        generate_symbol_file: args.symbol_file,
    };
    let output_dir = args.output_dir.clone();
    let version = env!("CARGO_PKG_VERSION");

    let thread_count = resolve_thread_count(args.threads, inputs.len(), hardware_concurrency);

    let counters = match thread_count {
        None => {
            let sink: Arc<dyn LogSink> = Arc::new(DirectSink);
            let sink_for_compile = sink.clone();
            let dispatcher = SequentialDispatcher::new(move |path: &Path| {
                compile_pack(path, &output_dir, options, version, sink_for_compile.as_ref()).success
            });
            for input in inputs {
                dispatcher.dispatch(input);
            }
            dispatcher.wait_for_completion();
            dispatcher.counters()
        }
        Some(n) => {
            let sink: Arc<dyn LogSink> = Arc::new(BufferedSink::new());
            let sink_for_compile = sink.clone();
            let dispatcher = ParallelDispatcher::new(n, move |path: &Path| {
                compile_pack(path, &output_dir, options, version, sink_for_compile.as_ref()).success
            });
            for input in inputs {
                dispatcher.dispatch(input);
            }
            dispatcher.wait_for_completion();
            dispatcher.counters()
        }
    };

    Ok(counters)
}
