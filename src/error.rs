use std::fmt;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// Unknown named argument, such as a date filter.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("task {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    BulkUpdate(#[from] BulkUpdateError),

    #[error("{context}: {source}")]
    Database {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for caller errors that should be surfaced verbatim.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidArgument(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Attach operation context to low-level errors.
pub trait ResultExt<T> {
    fn context(self, context: &str) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|source| Error::Database {
            context: context.to_string(),
            source,
        })
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|source| Error::Io {
            context: context.to_string(),
            source,
        })
    }
}

#[derive(Debug)]
pub struct BulkFailure {
    pub id: i64,
    pub error: Error,
}

/// Per-id failures of a best-effort bulk update. Ids not listed succeeded.
#[derive(Debug)]
pub struct BulkUpdateError {
    pub failures: Vec<BulkFailure>,
}

impl BulkUpdateError {
    pub fn failed_ids(&self) -> Vec<i64> {
        self.failures.iter().map(|f| f.id).collect()
    }
}

impl fmt::Display for BulkUpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bulk update failed: ")?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "task {}: {}", failure.id, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for BulkUpdateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_error_lists_every_failure() {
        let err = Error::from(BulkUpdateError {
            failures: vec![
                BulkFailure {
                    id: 7,
                    error: Error::NotFound(7),
                },
                BulkFailure {
                    id: 9,
                    error: Error::validation("title too long"),
                },
            ],
        });
        assert_eq!(
            err.to_string(),
            "bulk update failed: task 7: task 7 not found; task 9: title too long"
        );
        let Error::BulkUpdate(bulk) = err else {
            panic!("expected bulk update error");
        };
        assert_eq!(bulk.failed_ids(), vec![7, 9]);
    }

    #[test]
    fn database_errors_carry_context() {
        let res: std::result::Result<(), rusqlite::Error> =
            Err(rusqlite::Error::QueryReturnedNoRows);
        let err = res.context("failed to load task").unwrap_err();
        assert!(err.to_string().starts_with("failed to load task: "));
        assert!(!err.is_validation());
    }
}
