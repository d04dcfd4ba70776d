//! Diagnostic codes, severity levels, and the per-pack report counters.
//!
//! Every error and warning the pipeline can raise is expressed as a single
//! [`Diagnostic`] value and routed through a [`Handler`], which both counts
//! it (via [`ReportCounters`]) and formats it for the log sink.

use std::fmt;

use crate::location::TokenLocation;

/// Severity of a [`Diagnostic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic code grouped by the producer that raises it.
///
/// I/O and input codes occupy `E1000-E1002`/`W1000`; lexer/parser codes
/// occupy `E2000-E2016`/`W2000-W2002`; `.umc` emission occupies
/// `E3000-E3004`; the symbol-file writer occupies `E4000-E4002`/`W4000`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Code {
    // I/O & input
    E1000FileNotFound,
    E1001EmptyFile,
    E1002UnsupportedEncoding,
    E1003LanguageNameTooLong,
    W1000EmptyFile,

    // Lexer / parser
    E2000UndefinedSymbol,
    E2001MissingOpeningBrace,
    E2002MissingClosingBrace,
    E2003InvalidContentEnvelope,
    E2004UnterminatedScope,
    E2005IncompleteMessage,
    E2006InvalidKeywordUsage,
    E2007DuplicateGroupName,
    E2008DuplicateMessageId,
    E2009InvalidGroupName,
    E2010InvalidMessageId,
    E2011InvalidLcid,
    E2012UnexpectedToken,
    E2013EmptyContent,
    E2014EmptyMessageValue,
    E2015EmptyGroup,
    E2016UnterminatedString,
    W2000EmptyContent,
    W2001EmptyMessageValue,
    W2002EmptyGroup,

    // .umc emission
    E3000CreateFailed,
    E3001OpenFailed,
    E3002HeaderWriteFailed,
    E3003TableWriteFailed,
    E3004BlobWriteFailed,

    // Symbol file
    E4000CreateFailed,
    E4001OpenFailed,
    E4002WriteFailed,
    W4000CommentWriteFailed,
}

impl Code {
    /// The wire code exactly as it appears in a formatted diagnostic line,
    /// e.g. `E1002` or `W2001`.
    pub fn as_str(self) -> &'static str {
        match self {
            Code::E1000FileNotFound => "E1000",
            Code::E1001EmptyFile => "E1001",
            Code::E1002UnsupportedEncoding => "E1002",
            Code::E1003LanguageNameTooLong => "E1003",
            Code::W1000EmptyFile => "W1000",

            Code::E2000UndefinedSymbol => "E2000",
            Code::E2001MissingOpeningBrace => "E2001",
            Code::E2002MissingClosingBrace => "E2002",
            Code::E2003InvalidContentEnvelope => "E2003",
            Code::E2004UnterminatedScope => "E2004",
            Code::E2005IncompleteMessage => "E2005",
            Code::E2006InvalidKeywordUsage => "E2006",
            Code::E2007DuplicateGroupName => "E2007",
            Code::E2008DuplicateMessageId => "E2008",
            Code::E2009InvalidGroupName => "E2009",
            Code::E2010InvalidMessageId => "E2010",
            Code::E2011InvalidLcid => "E2011",
            Code::E2012UnexpectedToken => "E2012",
            Code::E2013EmptyContent => "E2013",
            Code::E2014EmptyMessageValue => "E2014",
            Code::E2015EmptyGroup => "E2015",
            Code::E2016UnterminatedString => "E2016",
            Code::W2000EmptyContent => "W2000",
            Code::W2001EmptyMessageValue => "W2001",
            Code::W2002EmptyGroup => "W2002",

            Code::E3000CreateFailed => "E3000",
            Code::E3001OpenFailed => "E3001",
            Code::E3002HeaderWriteFailed => "E3002",
            Code::E3003TableWriteFailed => "E3003",
            Code::E3004BlobWriteFailed => "E3004",

            Code::E4000CreateFailed => "E4000",
            Code::E4001OpenFailed => "E4001",
            Code::E4002WriteFailed => "E4002",
            Code::W4000CommentWriteFailed => "W4000",
        }
    }

    /// The level a code is raised at when nothing upgrades it.
    pub fn default_level(self) -> Level {
        match self {
            Code::W1000EmptyFile
            | Code::W2000EmptyContent
            | Code::W2001EmptyMessageValue
            | Code::W2002EmptyGroup
            | Code::W4000CommentWriteFailed => Level::Warning,
            _ => Level::Error,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single error or warning produced while compiling one pack.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub code: Code,
    pub location: Option<TokenLocation>,
    pub text: String,
}

impl Diagnostic {
    pub fn error(code: Code, text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            code,
            location: None,
            text: text.into(),
        }
    }

    pub fn warning(code: Code, text: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            code,
            location: None,
            text: text.into(),
        }
    }

    pub fn with_location(mut self, location: TokenLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "({}, {}): {} {}: {}",
                loc.line, loc.column, self.level, self.code, self.text
            ),
            None => write!(f, "(?, ?): {} {}: {}", self.level, self.code, self.text),
        }
    }
}

/// Errors and warnings accumulated while compiling a single pack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportCounters {
    pub errors: usize,
    pub warnings: usize,
}

impl ReportCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Which policy governs whether a fixed set of conditions is a warning or
/// an error: empty messages/groups/packs and empty files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorModel {
    #[default]
    Soft,
    Strict,
}

/// Records diagnostics raised while compiling one pack, counting them into
/// a [`ReportCounters`] and forwarding the formatted line to a log sink.
///
/// Mirrors the two tiny capability sets the pipeline needs: recording a
/// diagnostic, and asking whether the pack has already failed.
pub struct Handler<'a> {
    model: ErrorModel,
    counters: ReportCounters,
    sink: &'a dyn Fn(&str),
}

impl<'a> Handler<'a> {
    pub fn new(model: ErrorModel, sink: &'a dyn Fn(&str)) -> Self {
        Self {
            model,
            counters: ReportCounters::new(),
            sink,
        }
    }

    /// Records a diagnostic as-is: its level and code are counted verbatim.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            Level::Error => self.counters.errors += 1,
            Level::Warning => self.counters.warnings += 1,
        }

        (self.sink)(&diagnostic.to_string());
    }

    /// Records one of a strict/soft pair of codes for the same underlying
    /// condition (empty file, empty content, empty group, empty message
    /// value), per `spec.md` §7: the strict error model does not merely
    /// raise the severity of a fixed warning, it swaps in a distinct error
    /// code.
    pub fn record_conditional(
        &mut self,
        strict_code: Code,
        soft_code: Code,
        text: impl Into<String>,
        location: Option<TokenLocation>,
    ) {
        let code = match self.model {
            ErrorModel::Strict => strict_code,
            ErrorModel::Soft => soft_code,
        };
        let diagnostic = Diagnostic {
            level: code.default_level(),
            code,
            location,
            text: text.into(),
        };
        self.record(diagnostic);
    }

    pub fn counters(&self) -> ReportCounters {
        self.counters
    }

    pub fn model(&self) -> ErrorModel {
        self.model
    }
}
