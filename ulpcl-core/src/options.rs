//! Per-compilation options threaded explicitly through the pipeline.
//!
//! `spec.md` §9 notes the original design keeps these behind a global
//! singleton "only to avoid parameter passing"; the library crate instead
//! threads an explicit, immutable value through every call site, which
//! keeps the pipeline testable without process-wide state. The CLI binary
//! still exposes a convenience singleton at its own boundary (see
//! `ulpcl::options::ProgramOptions`) for argument parsing ergonomics.

use crate::diagnostics::ErrorModel;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub model: ErrorModel,
    pub discard_empty_messages: bool,
    pub generate_symbol_file: bool,
}
