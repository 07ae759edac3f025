//! Error types for grammar, query and file loading
//!
//! The indentation path itself never fails: missing trees, queries or
//! delimiters degrade to sentinel results. These errors only surface while
//! setting things up (registering grammars, reading files, parsing).

use std::path::PathBuf;

/// Errors raised while preparing grammars, queries and syntax trees
#[derive(Debug)]
pub enum IndentError {
    /// Reading a file failed
    Io { path: PathBuf, message: String },
    /// The parser could not be configured for a grammar
    Language { language: String, message: String },
    /// An `indents` query failed to compile
    Query { language: String, message: String },
    /// Parsing produced no tree (cancelled or misconfigured parser)
    Parse { language: String },
    /// No grammar registered under this name
    UnknownLanguage(String),
}

impl std::fmt::Display for IndentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndentError::Io { path, message } => {
                write!(f, "IO error reading {}: {message}", path.display())
            }
            IndentError::Language { language, message } => {
                write!(f, "Failed to set language {language}: {message}")
            }
            IndentError::Query { language, message } => {
                write!(f, "Invalid indents query for {language}: {message}")
            }
            IndentError::Parse { language } => write!(f, "Failed to parse {language} source"),
            IndentError::UnknownLanguage(name) => write!(f, "Unknown language: {name}"),
        }
    }
}

impl std::error::Error for IndentError {}

pub type Result<T> = std::result::Result<T, IndentError>;
