//! Error types for the cache simulator.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can surface outside the access hot path.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid cache geometry, rejected at construction
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error while reading a trace or writing a stats dump
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed trace line
    #[error("trace parse error at line {line}: {reason}")]
    Trace { line: usize, reason: String },
}

/// Geometry constraint violations. These are fatal to the instance being
/// constructed; an existing instance can never produce one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be nonzero")]
    ZeroField { field: &'static str },

    #[error("line count {n_lines} is not divisible by associativity {ways}")]
    LinesNotDivisibleByWays { n_lines: usize, ways: usize },

    #[error("line count {n_lines} is not divisible by bank count {banks}")]
    LinesNotDivisibleByBanks { n_lines: usize, banks: usize },

    #[error("per-bank line count {bank_lines} is not divisible by associativity {ways}")]
    BankLinesNotDivisibleByWays { bank_lines: usize, ways: usize },

    #[error("set count {sets} is not a power of two")]
    SetsNotPowerOfTwo { sets: usize },

    #[error("line size {line_bytes} bytes is not a power of two")]
    LineBytesNotPowerOfTwo { line_bytes: usize },

    #[error("word size {bytes_per_word} bytes is not a power of two")]
    WordBytesNotPowerOfTwo { bytes_per_word: usize },
}
