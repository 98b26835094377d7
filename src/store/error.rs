use thiserror::Error;

/// Errors surfaced by the screenshot store.
///
/// Corruption of the backing file is deliberately absent here: an unreadable
/// collection is recovered by treating it as empty (logged, never surfaced),
/// so callers only ever see validation failures or real I/O failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller-supplied input failed the save contract. Reported before any
    /// mutation is attempted.
    #[error("{reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// Filesystem read/write failure (permissions, disk full, missing
    /// directory). The previously persisted collection is left untouched.
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn missing(field: &'static str) -> Self {
        Self::Validation {
            field,
            reason: format!("Missing required field: {}", field),
        }
    }

    pub fn invalid(field: &'static str, detail: &str) -> Self {
        Self::Validation {
            field,
            reason: format!("Invalid field {}: {}", field, detail),
        }
    }
}
