//! Error types for the grammar compiler and parser runtime.

use thiserror::Error;

/// Errors that can occur during grammar loading, table construction, and
/// parsing.
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("Invalid grammar format: {0}")]
    InvalidFormat(String),

    #[error("Invalid production format: {0}")]
    InvalidProduction(String),

    #[error("Empty grammar input")]
    EmptyInput,

    #[error("Unknown symbol '{0}' referenced in a production")]
    UnknownSymbol(String),

    #[error("Grammar has already been augmented")]
    AlreadyAugmented,

    #[error("Unresolvable conflict at state {state}, symbol {symbol}:\n  {item_a}\n  {item_b}")]
    UnresolvableConflict {
        state: usize,
        symbol: String,
        item_a: String,
        item_b: String,
    },

    #[error("Lexical error at byte offset {offset}: unexpected character '{character}'")]
    LexError { offset: usize, character: char },

    #[error("Syntax error at token {index}: unexpected {token}")]
    SyntaxError { index: usize, token: String },

    #[error("Internal error: reduce to '{nonterminal}' has no GOTO entry from state {state}")]
    InternalGoto { state: usize, nonterminal: String },

    #[error(
        "Table/grammar digest mismatch: tables were built for a different grammar \
         (expected {expected:#x}, found {found:#x})"
    )]
    TableMismatch { expected: u64, found: u64 },

    #[error("Unsupported table format version {found} (expected {expected})")]
    FormatVersionMismatch { expected: u32, found: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for `Result`s in this crate.
pub type Result<T> = std::result::Result<T, GrammarError>;
