use std::fmt;
use std::path::PathBuf;

/// One strategy's failure inside an exhausted extraction chain.
#[derive(Debug, Clone)]
pub struct StrategyFailure {
    pub strategy: &'static str,
    pub reason: String,
}

impl fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

#[derive(Debug)]
pub enum Error {
    NotFound(PathBuf),
    EmptyFile(PathBuf),
    AmbiguousTable { tables: Vec<String> },
    TableNotFound { table: String, available: Vec<String> },
    MissingColumn { table: String, column: String },
    ExtractionFailed { attempts: Vec<StrategyFailure>, hint: &'static str },
    InvalidTable(String),
    WriteFailed(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(path) => write!(f, "file not found: {}", path.display()),
            Error::EmptyFile(path) => write!(f, "file is empty: {}", path.display()),
            Error::AmbiguousTable { tables } => write!(
                f,
                "no table specified; available tables: {}",
                tables.join(", ")
            ),
            Error::TableNotFound { table, available } => write!(
                f,
                "table '{}' not found; available tables: {}",
                table,
                available.join(", ")
            ),
            Error::MissingColumn { table, column } => {
                write!(f, "table '{}' has no column '{}'", table, column)
            }
            Error::ExtractionFailed { attempts, hint } => {
                let last = attempts
                    .last()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "no strategy attempted".to_string());
                write!(f, "all extraction strategies failed (last: {last}); {hint}")
            }
            Error::InvalidTable(msg) => write!(f, "invalid table: {msg}"),
            Error::WriteFailed(msg) => write!(f, "write failed: {msg}"),
            Error::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
