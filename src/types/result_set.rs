//! Read-only output of one executed statement

use super::{ColumnDefinition, Row};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub schema: Vec<ColumnDefinition>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(schema: Vec<ColumnDefinition>, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schema.is_empty() || self.rows.is_empty()
    }
}
