use std::{fmt, io, path::PathBuf};

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the toolchain can report.
///
/// All variants are fail-fast: the CLI boundary translates them to exit
/// code 2 and a single stderr line. Warnings (unresolved lines outside
/// strict mode, auto-split notices) are not errors and never appear here.
#[derive(Debug)]
pub enum Error {
    /// A required input file (dump, catalog, API, source) is absent.
    MissingInput(PathBuf),
    /// An I/O failure outside the missing-file case.
    Io(io::Error),
    /// Malformed JSON in a catalog/API/override file.
    Json(serde_json::Error),
    /// An ApiMap shape invariant does not hold.
    Contract(String),
    /// The DSL source could not be parsed into statements.
    Parse { line: usize, message: String },
    /// A call could not be resolved to `(module, canonical, spec)`.
    Resolve { line: usize, message: String },
    /// A value cannot be coerced to the expected parameter mode.
    Coerce { line: usize, message: String },
    /// A named enum argument is not one of the allowed option keys.
    EnumValue { line: usize, message: String },
    /// The row auto-splitter cannot satisfy the per-row budget.
    RowLimit(String),
    /// vfunc/multiselect macro expansion failure.
    Macro { line: usize, message: String },
    /// An unresolved line under `MLDSL_STRICT_UNKNOWN=1`.
    Unresolved { line: usize, text: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput(path) => write!(f, "missing input file: {}", path.display()),
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::Json(err) => write!(f, "invalid json: {err}"),
            Self::Contract(msg) => write!(f, "api contract violation: {msg}"),
            Self::Parse { line, message } => write!(f, "line {line}: parse error: {message}"),
            Self::Resolve { line, message } => write!(f, "line {line}: {message}"),
            Self::Coerce { line, message } => write!(f, "line {line}: {message}"),
            Self::EnumValue { line, message } => write!(f, "line {line}: {message}"),
            Self::RowLimit(msg) => write!(f, "row limit: {msg}"),
            Self::Macro { line, message } => write!(f, "line {line}: {message}"),
            Self::Unresolved { line, text } => write!(f, "line {line}: unresolved line: {text}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
