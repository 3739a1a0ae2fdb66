use thiserror::Error;
use crate::database::DatabaseError;
use crate::journal::JournalError;
use crate::profile::ProfileError;

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("IO/Terminal error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("{0}")]
    JournalError(#[from] JournalError),

    #[error("{0}")]
    ProfileError(#[from] ProfileError),

    #[error("Invalid key binding: {0}")]
    KeyBindingError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}
