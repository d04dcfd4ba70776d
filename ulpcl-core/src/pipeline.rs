//! The per-pack compilation pipeline (`spec.md` §2): byte reader → BOM
//! detector → lexer → parser → emitter → optional symbol writer.
//!
//! [`compile_pack`] is the single entry point both dispatcher variants in
//! [`crate::dispatch`] drive; it owns nothing beyond the lifetime of one
//! call and reports every diagnostic through the supplied [`LogSink`].

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::diagnostics::{Code, Diagnostic, ErrorModel, Handler, ReportCounters};
use crate::emit::write_catalog;
use crate::lexer::lex;
use crate::log::LogSink;
use crate::options::CompileOptions;
use crate::parser::parse;
use crate::source::read_and_strip_bom;
use crate::symbol::write_symbols;

/// Outcome of compiling a single `.ulp` pack.
#[derive(Debug)]
pub struct PackReport {
    pub input: PathBuf,
    pub success: bool,
    pub counters: ReportCounters,
}

/// Compiles `input` into `<output_dir>/<stem>.umc` (and, if requested,
/// `<output_dir>/<stem>.sym`), reporting every diagnostic line through
/// `sink` and returning whether the pack succeeded.
///
/// `compiler_version` is threaded through to the symbol file's header
/// comment (`spec.md` §4.6); it is the caller's own crate version, since
/// the library has no version of its own to report.
pub fn compile_pack(
    input: &Path,
    output_dir: &Path,
    options: CompileOptions,
    compiler_version: &str,
    sink: &dyn LogSink,
) -> PackReport {
    let write_line = |line: &str| sink.write(line);
    let mut handler = Handler::new(options.model, &write_line);

    let pack_name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    let success = run(input, output_dir, &pack_name, options, compiler_version, &mut handler);
    sink.request_flush();

    PackReport {
        input: input.to_path_buf(),
        success,
        counters: handler.counters(),
    }
}

fn run(
    input: &Path,
    output_dir: &Path,
    pack_name: &str,
    options: CompileOptions,
    compiler_version: &str,
    handler: &mut Handler<'_>,
) -> bool {
    let file = match File::open(input) {
        Ok(f) => f,
        Err(e) => {
            handler.record(Diagnostic::error(
                Code::E1000FileNotFound,
                format!("cannot open '{}': {}", input.display(), e),
            ));
            return false;
        }
    };

    let data = match read_and_strip_bom(file) {
        Ok(Ok(data)) => data,
        Ok(Err(())) => {
            handler.record(Diagnostic::error(
                Code::E1002UnsupportedEncoding,
                format!("'{}' has an unsupported byte-order mark", input.display()),
            ));
            return false;
        }
        Err(e) => {
            handler.record(Diagnostic::error(
                Code::E1000FileNotFound,
                format!("failed to read '{}': {}", input.display(), e),
            ));
            return false;
        }
    };

    if data.is_empty() {
        handler.record_conditional(
            Code::E1001EmptyFile,
            Code::W1000EmptyFile,
            format!("'{}' is empty", input.display()),
            None,
        );
        return !handler.counters().has_errors();
    }

    let stream = match lex(&data, handler) {
        Some(stream) => stream,
        None => return false,
    };

    let tree = match parse(&stream, pack_name, handler, options) {
        Some(tree) => tree,
        None => return false,
    };

    if handler.model() == ErrorModel::Strict && handler.counters().has_errors() {
        return false;
    }

    let umc_path = output_dir.join(format!("{}.umc", pack_name));
    let symbols = match write_catalog(&umc_path, &tree, options.generate_symbol_file, handler) {
        Some(symbols) => symbols,
        None => return false,
    };

    if options.generate_symbol_file {
        let sym_path = output_dir.join(format!("{}.sym", pack_name));
        if !write_symbols(&sym_path, &symbols, compiler_version, handler) {
            return false;
        }
    }

    !handler.counters().has_errors()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::DirectSink;
    use tempfile::tempdir;

    fn write_pack(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn compiles_minimal_pack_to_umc() {
        let dir = tempdir().unwrap();
        let input = write_pack(
            dir.path(),
            "hello.ulp",
            r#"@language : "en" @lcid : "1033" { @content { #hello : "Hello" } }"#,
        );
        let sink = DirectSink;
        let report = compile_pack(&input, dir.path(), CompileOptions::default(), "1.0.0", &sink);
        assert!(report.success);
        assert!(dir.path().join("hello.umc").exists());
    }

    #[test]
    fn writes_symbol_file_when_requested() {
        let dir = tempdir().unwrap();
        let input = write_pack(
            dir.path(),
            "hello.ulp",
            r#"@language : "en" @lcid : "1033" { @content { #hello : "Hello" } }"#,
        );
        let options = CompileOptions {
            generate_symbol_file: true,
            ..Default::default()
        };
        let sink = DirectSink;
        let report = compile_pack(&input, dir.path(), options, "1.0.0", &sink);
        assert!(report.success);
        assert!(dir.path().join("hello.sym").exists());
    }

    #[test]
    fn strict_model_fails_pack_with_errors() {
        let dir = tempdir().unwrap();
        let input = write_pack(
            dir.path(),
            "dup.ulp",
            r#"@language : "en" @lcid : "1033" { @content { #dup : "a" #dup : "b" } }"#,
        );
        let options = CompileOptions {
            model: ErrorModel::Strict,
            ..Default::default()
        };
        let sink = DirectSink;
        let report = compile_pack(&input, dir.path(), options, "1.0.0", &sink);
        assert!(!report.success);
        assert!(!dir.path().join("dup.umc").exists());
    }

    #[test]
    fn empty_file_soft_model_succeeds_with_no_output() {
        let dir = tempdir().unwrap();
        let input = write_pack(dir.path(), "empty.ulp", "");
        let sink = DirectSink;
        let report = compile_pack(&input, dir.path(), CompileOptions::default(), "1.0.0", &sink);
        assert!(report.success);
        assert_eq!(report.counters.warnings, 1);
        assert!(!dir.path().join("empty.umc").exists());
    }

    #[test]
    fn empty_file_strict_model_fails() {
        let dir = tempdir().unwrap();
        let input = write_pack(dir.path(), "empty.ulp", "");
        let options = CompileOptions {
            model: ErrorModel::Strict,
            ..Default::default()
        };
        let sink = DirectSink;
        let report = compile_pack(&input, dir.path(), options, "1.0.0", &sink);
        assert!(!report.success);
    }

    #[test]
    fn missing_file_reports_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.ulp");
        let sink = DirectSink;
        let report = compile_pack(&missing, dir.path(), CompileOptions::default(), "1.0.0", &sink);
        assert!(!report.success);
        assert_eq!(report.counters.errors, 1);
    }

    #[test]
    fn unsupported_bom_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.ulp");
        std::fs::write(&path, [0xFE, 0xFF, b'x']).unwrap();
        let sink = DirectSink;
        let report = compile_pack(&path, dir.path(), CompileOptions::default(), "1.0.0", &sink);
        assert!(!report.success);
        assert_eq!(report.counters.errors, 1);
    }
}
