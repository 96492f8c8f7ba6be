use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum LoadError {
    /// Input path does not exist.
    NotFound(PathBuf),
    /// Unsupported extension, bad table name or unexpected container shape.
    Format(String),
    /// Content could not be decoded.
    Parse(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}
