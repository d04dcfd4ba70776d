//! Symbol-file writer (`spec.md` §4.6).
//!
//! Produces a textual side-file mapping each message's fully-qualified id
//! to the two absolute byte offsets `write_catalog` computed for it: its
//! lookup entry's position and its value's position within the blob.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;

use crate::diagnostics::{Code, Diagnostic, Handler};
use crate::emit::Symbol;

/// Writes `symbols` to `path` as `// generated by ULPCL <version> on
/// <dd.mm.yyyy>`, a blank line, then one `(id_offset, value_offset): id`
/// line per symbol, each offset a 16-digit uppercase hex `u64`. Returns
/// `false` on any I/O failure; a failure to write the header comment is
/// only a warning (`W4000`) and writing continues.
pub fn write_symbols(path: &Path, symbols: &[Symbol], version: &str, handler: &mut Handler<'_>) -> bool {
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            handler.record(Diagnostic::error(
                Code::E4000CreateFailed,
                format!("failed to create '{}': {}", path.display(), e),
            ));
            return false;
        }
    };
    let mut out = io::BufWriter::new(file);

    let header = format!(
        "// generated by ULPCL {} on {}\n\n",
        version,
        Local::now().format("%d.%m.%Y")
    );
    if let Err(e) = out.write_all(header.as_bytes()) {
        handler.record(
            Diagnostic::warning(
                Code::W4000CommentWriteFailed,
                format!("failed to write header comment in '{}': {}", path.display(), e),
            ),
        );
    }

    for (index, symbol) in symbols.iter().enumerate() {
        let line = format!(
            "({:016X}, {:016X}): {}",
            symbol.location.id, symbol.location.value, symbol.id
        );
        if let Err(e) = out.write_all(line.as_bytes()) {
            handler.record(Diagnostic::error(
                Code::E4002WriteFailed,
                format!("failed to write symbol '{}': {}", symbol.id, e),
            ));
            return false;
        }
        if index + 1 < symbols.len() {
            if let Err(e) = out.write_all(b"\n") {
                handler.record(Diagnostic::error(
                    Code::E4002WriteFailed,
                    format!("failed to write symbol separator: {}", e),
                ));
                return false;
            }
        }
    }

    if let Err(e) = out.flush() {
        handler.record(Diagnostic::error(
            Code::E4002WriteFailed,
            format!("failed to flush '{}': {}", path.display(), e),
        ));
        return false;
    }

    true
}
