// eduhub-core/src/error.rs
use bson::oid::ObjectId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EduHubError {
    #[error("validation failed for '{field}': {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("no document with _id {id} in '{collection}'")]
    BrokenReference {
        collection: &'static str,
        id: ObjectId,
    },

    #[error("duplicate value for unique field '{field}' in '{collection}'")]
    DuplicateKey {
        collection: &'static str,
        field: &'static str,
    },

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("BSON decode error: {0}")]
    Decode(#[from] bson::de::Error),
}

impl EduHubError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        EduHubError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn broken_reference(collection: &'static str, id: ObjectId) -> Self {
        EduHubError::BrokenReference { collection, id }
    }
}

/// True when the driver error reports a unique-index conflict (server
/// code 11000).
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => write_err.code == 11000,
        ErrorKind::Command(command_err) => command_err.code == 11000,
        _ => false,
    }
}

pub type Result<T> = std::result::Result<T, EduHubError>;
