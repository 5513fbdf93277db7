use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Record not found")]
    NotFound,

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Hashing error")]
    Hashing,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IdentityError {
    /// Whether the error is the "nothing matched" signal a store may raise
    /// instead of returning an empty result.
    pub fn is_not_found(&self) -> bool {
        matches!(self, IdentityError::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, IdentityError>;
