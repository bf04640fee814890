//! Primary Key Index
//!
//! In-memory ordered map from a table's primary-key value to the row's
//! position in the table. Provides:
//! - Unique constraint enforcement
//! - Fast point lookup
//!
//! The index is not persisted; tables rebuild it after load and after any
//! operation that shifts row positions.

use crate::error::{DbError, ExecutionError, Result};
use crate::types::{FieldValue, Row};
use std::collections::BTreeMap;

/// Indexable key. Floats and NULL cannot be primary keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndexKey {
    Integer(i64),
    Text(String),
}

impl IndexKey {
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Integer(n) => Some(IndexKey::Integer(*n)),
            FieldValue::Text(s) => Some(IndexKey::Text(s.clone())),
            FieldValue::Float(_) | FieldValue::Null => None,
        }
    }

    /// Like `from_value`, but a non-indexable value is an error.
    pub fn require(value: &FieldValue, column: &str) -> Result<Self> {
        Self::from_value(value).ok_or_else(|| {
            DbError::DataStruct(format!(
                "primary key column '{}' cannot hold {}",
                column, value
            ))
        })
    }
}

impl std::fmt::Display for IndexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKey::Integer(n) => write!(f, "{}", n),
            IndexKey::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// Primary Key Index
#[derive(Debug, Clone, Default)]
pub struct PrimaryKeyIndex {
    /// Column the index covers
    column: String,

    entries: BTreeMap<IndexKey, usize>,
}

impl PrimaryKeyIndex {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Insert a key. Fails if the key is already present.
    pub fn insert(&mut self, key: IndexKey, position: usize) -> Result<()> {
        if self.entries.contains_key(&key) {
            return Err(ExecutionError::DuplicatePrimaryKey(key.to_string()).into());
        }
        self.entries.insert(key, position);
        Ok(())
    }

    pub fn get(&self, key: &IndexKey) -> Option<usize> {
        self.entries.get(key).copied()
    }

    /// Rebuild from scratch against the current row positions.
    pub fn rebuild(&mut self, rows: &[Row], column_pos: usize) -> Result<()> {
        self.entries.clear();
        for (pos, row) in rows.iter().enumerate() {
            let key = match row.fields.get(column_pos) {
                Some(field) => IndexKey::require(&field.value, &self.column)?,
                None => IndexKey::require(&FieldValue::Null, &self.column)?,
            };
            self.insert(key, pos)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, FieldType};

    fn id_row(id: i64) -> Row {
        Row::new(vec![Field::new("id", FieldType::Integer, FieldValue::Integer(id))])
    }

    #[test]
    fn test_primary_key_insert() {
        let mut pk_index = PrimaryKeyIndex::new("id");

        pk_index.insert(IndexKey::Integer(1), 0).unwrap();
        pk_index.insert(IndexKey::Text("b".into()), 1).unwrap();

        assert_eq!(pk_index.get(&IndexKey::Integer(1)), Some(0));
        assert_eq!(pk_index.get(&IndexKey::Text("b".into())), Some(1));
        assert_eq!(pk_index.len(), 2);
    }

    #[test]
    fn test_unique_constraint() {
        let mut pk_index = PrimaryKeyIndex::new("id");

        pk_index.insert(IndexKey::Integer(1), 0).unwrap();
        let err = pk_index.insert(IndexKey::Integer(1), 5).unwrap_err();
        assert!(matches!(
            err,
            DbError::Execution(ExecutionError::DuplicatePrimaryKey(_))
        ));
        assert_eq!(pk_index.get(&IndexKey::Integer(1)), Some(0));
    }

    #[test]
    fn test_rebuild_tracks_positions() {
        let mut pk_index = PrimaryKeyIndex::new("id");
        let rows = vec![id_row(30), id_row(10), id_row(20)];
        pk_index.rebuild(&rows, 0).unwrap();

        assert_eq!(pk_index.get(&IndexKey::Integer(10)), Some(1));
        assert_eq!(pk_index.get(&IndexKey::Integer(20)), Some(2));
        assert_eq!(pk_index.len(), 3);
    }

    #[test]
    fn test_non_indexable_values() {
        assert!(IndexKey::from_value(&FieldValue::Null).is_none());
        assert!(IndexKey::from_value(&FieldValue::Float(1.5)).is_none());
        assert!(IndexKey::require(&FieldValue::Null, "id").is_err());
    }
}
