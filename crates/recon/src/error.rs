use std::fmt;

use verger_core::{FieldError, StoreError};
use verger_io::LoadError;

#[derive(Debug)]
pub enum IdentityError {
    /// Neither a scientific nor a common name was supplied.
    MissingIdentity,
    /// Lookup failed in the backing store.
    Store(StoreError),
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIdentity => write!(f, "no scientific or common name"),
            Self::Store(e) => write!(f, "identity lookup failed: {e}"),
        }
    }
}

impl std::error::Error for IdentityError {}

impl From<StoreError> for IdentityError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Failure confined to one import row. The run continues.
#[derive(Debug)]
pub enum RowError {
    Identity(IdentityError),
    Store(StoreError),
    /// Extractor produced a value of the wrong kind for a field.
    Field(FieldError),
    /// Row content could not be interpreted.
    Invalid(String),
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "{e}"),
            Self::Field(e) => write!(f, "{e}"),
            Self::Invalid(msg) => write!(f, "invalid row: {msg}"),
        }
    }
}

impl std::error::Error for RowError {}

impl From<IdentityError> for RowError {
    fn from(e: IdentityError) -> Self {
        Self::Identity(e)
    }
}

impl From<StoreError> for RowError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<FieldError> for RowError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

/// Failure that stops a whole import run.
#[derive(Debug)]
pub enum ImportError {
    Load(LoadError),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
        }
    }
}

impl From<LoadError> for ImportError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}
