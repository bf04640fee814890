//! Error types for XaleDB

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("{message} at position {position}")]
    Parse { message: String, position: usize },

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Cannot open storage: {0}")]
    StorageOpen(String),

    #[error("Read failed: {0}")]
    ReadFile(String),

    #[error("Write failed: {0}")]
    WriteFile(String),

    #[error("Sync failed: {0}")]
    SyncFile(String),

    #[error("Data corruption: {0}")]
    StorageCorrupt(String),

    #[error("Invalid data: {0}")]
    DataStruct(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a well-formed statement cannot be carried out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Unknown column type: {0}")]
    UnknownColumnType(String),

    #[error("Column '{0}' not found")]
    UnknownColumn(String),

    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("Too many values: expected at most {expected}, got {got}")]
    TooManyValues { expected: usize, got: usize },

    #[error("Missing value for non-nullable column '{0}'")]
    MissingValue(String),

    #[error("Duplicate primary key {0}")]
    DuplicatePrimaryKey(String),
}

impl DbError {
    pub fn parse(message: impl Into<String>, position: usize) -> Self {
        DbError::Parse { message: message.into(), position }
    }

    /// True when the error names something that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DbError::Execution(ExecutionError::TableNotFound(_))
                | DbError::Execution(ExecutionError::UnknownColumn(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message() {
        let err = DbError::parse("Expected FROM", 9);
        assert_eq!(err.to_string(), "Expected FROM at position 9");
    }

    #[test]
    fn test_not_found_classification() {
        let err: DbError = ExecutionError::TableNotFound("t".into()).into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Table 't' not found");

        let err: DbError = ExecutionError::TableExists("t".into()).into();
        assert!(!err.is_not_found());
    }
}
