//! Table: a named row collection bound to a schema, plus its binary image

use super::codec::{len_u32, ByteReader, ByteWriter};
use super::{ColumnDefinition, Field, FieldType, FieldValue, Row};
use crate::error::{DbError, ExecutionError, Result};
use crate::index::{IndexKey, PrimaryKeyIndex};

#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    schema: Vec<ColumnDefinition>,
    rows: Vec<Row>,
    /// Present once the schema declares a primary-key column
    primary_index: Option<PrimaryKeyIndex>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Vec::new(),
            rows: Vec::new(),
            primary_index: None,
        }
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<ColumnDefinition>) -> Result<Self> {
        let mut table = Self::new(name);
        for column in columns {
            table.add_column(column)?;
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &[ColumnDefinition] {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.schema.iter().find(|c| c.name == name)
    }

    pub fn primary_key_column(&self) -> Option<&ColumnDefinition> {
        self.schema.iter().find(|c| c.is_primary_key)
    }

    fn primary_key_position(&self) -> Option<usize> {
        self.schema.iter().position(|c| c.is_primary_key)
    }

    /// Append a column. Existing rows receive a NULL cell for it.
    pub fn add_column(&mut self, column: ColumnDefinition) -> Result<()> {
        if self.column_index(&column.name).is_some() {
            return Err(ExecutionError::DuplicateColumn(column.name).into());
        }
        if column.is_primary_key {
            if let Some(existing) = self.primary_key_column() {
                return Err(DbError::DataStruct(format!(
                    "table '{}' already has primary key column '{}'",
                    self.name, existing.name
                )));
            }
            if !self.rows.is_empty() {
                return Err(DbError::DataStruct(format!(
                    "cannot add primary key column '{}' to non-empty table '{}'",
                    column.name, self.name
                )));
            }
            self.primary_index = Some(PrimaryKeyIndex::new(column.name.clone()));
        }

        for row in &mut self.rows {
            row.fields
                .push(Field::new(column.name.clone(), column.field_type, FieldValue::Null));
        }
        self.schema.push(column);
        Ok(())
    }

    /// Append a row. The row must have exactly one field per column and,
    /// if the table has a primary key, a key not already present.
    pub fn insert_row(&mut self, row: Row) -> Result<()> {
        if row.len() != self.schema.len() {
            return Err(DbError::DataStruct(format!(
                "row has {} fields, table '{}' has {} columns",
                row.len(),
                self.name,
                self.schema.len()
            )));
        }

        if let (Some(pos), Some(index)) = (self.primary_key_position(), self.primary_index.as_mut()) {
            let key = IndexKey::require(&row.fields[pos].value, &self.schema[pos].name)?;
            index.insert(key, self.rows.len())?;
        }

        self.rows.push(row);
        Ok(())
    }

    /// Point lookup through the primary-key index.
    pub fn find_by_primary_key(&self, value: &FieldValue) -> Option<&Row> {
        let index = self.primary_index.as_ref()?;
        let key = IndexKey::from_value(value)?;
        index.get(&key).and_then(|pos| self.rows.get(pos))
    }

    /// Rows whose `column` equals `match_value`. An unknown column matches nothing.
    pub fn find_rows(&self, column: &str, match_value: &FieldValue) -> Vec<&Row> {
        if self.primary_key_column().map(|c| c.name.as_str()) == Some(column) {
            return self.find_by_primary_key(match_value).into_iter().collect();
        }
        self.rows
            .iter()
            .filter(|row| field_equals(row, column, match_value))
            .collect()
    }

    pub fn update_rows(
        &mut self,
        column: &str,
        match_value: &FieldValue,
        updates: &[(String, FieldValue)],
    ) -> Result<usize> {
        self.update_where(|row| Ok(field_equals(row, column, match_value)), updates)
            .map(|rows| rows.len())
    }

    /// Apply `updates` to every row matching `predicate` and return the
    /// updated rows. Nothing changes if any update fails validation.
    pub fn update_where<F>(&mut self, mut predicate: F, updates: &[(String, FieldValue)]) -> Result<Vec<Row>>
    where
        F: FnMut(&Row) -> Result<bool>,
    {
        let mut resolved = Vec::with_capacity(updates.len());
        for (column, value) in updates {
            let idx = self
                .column_index(column)
                .ok_or_else(|| ExecutionError::UnknownColumn(column.clone()))?;
            resolved.push((idx, value));
        }

        let mut targets = Vec::new();
        for (pos, row) in self.rows.iter().enumerate() {
            if predicate(row)? {
                targets.push(pos);
            }
        }

        // Key changes are checked against the whole table before any write.
        let pk_pos = self.primary_key_position();
        let new_key = pk_pos.and_then(|pk| resolved.iter().rev().find(|(idx, _)| *idx == pk));
        let rebuilt = match (pk_pos, new_key, &self.primary_index) {
            (Some(pk), Some((_, value)), Some(index)) => {
                let mut next = PrimaryKeyIndex::new(index.column());
                let mut target_iter = targets.iter().peekable();
                for (pos, row) in self.rows.iter().enumerate() {
                    let current = if target_iter.peek() == Some(&&pos) {
                        target_iter.next();
                        *value
                    } else {
                        &row.fields[pk].value
                    };
                    next.insert(IndexKey::require(current, index.column())?, pos)?;
                }
                Some(next)
            }
            _ => None,
        };

        let mut updated = Vec::with_capacity(targets.len());
        for pos in targets {
            let row = &mut self.rows[pos];
            for (idx, value) in &resolved {
                row.fields[*idx].value = (*value).clone();
            }
            updated.push(row.clone());
        }
        if rebuilt.is_some() {
            self.primary_index = rebuilt;
        }
        Ok(updated)
    }

    pub fn delete_rows(&mut self, column: &str, match_value: &FieldValue) -> Result<usize> {
        self.delete_where(|row| Ok(field_equals(row, column, match_value)))
            .map(|rows| rows.len())
    }

    /// Remove every row matching `predicate` and return the removed rows.
    pub fn delete_where<F>(&mut self, mut predicate: F) -> Result<Vec<Row>>
    where
        F: FnMut(&Row) -> Result<bool>,
    {
        let mut keep = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            keep.push(!predicate(row)?);
        }

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.rows.len());
        for (row, keep) in std::mem::take(&mut self.rows).into_iter().zip(keep) {
            if keep {
                kept.push(row);
            } else {
                removed.push(row);
            }
        }
        self.rows = kept;

        if !removed.is_empty() {
            self.rebuild_index()?;
        }
        Ok(removed)
    }

    fn rebuild_index(&mut self) -> Result<()> {
        if let (Some(pos), Some(index)) = (self.primary_key_position(), self.primary_index.as_mut()) {
            index.rebuild(&self.rows, pos)?;
        }
        Ok(())
    }

    /// Encode as `name, column_count, columns, row_count, cells` (little-endian).
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut w = ByteWriter::new();
        w.put_str(&self.name)?;

        w.put_u32(len_u32(self.schema.len())?);
        for column in &self.schema {
            w.put_str(&column.name)?;
            w.put_i32(column.field_type.tag());
            w.put_u8(column.is_primary_key as u8);
            w.put_u8(column.is_nullable as u8);
        }

        w.put_u32(len_u32(self.rows.len())?);
        for row in &self.rows {
            for field in &row.fields {
                write_cell(&mut w, &field.value)?;
            }
        }
        Ok(w.into_inner())
    }

    pub fn deserialize(data: &[u8]) -> Result<Table> {
        let mut r = ByteReader::new(data);
        let name = r.get_str()?;

        let column_count = r.get_u32()?;
        let mut table = Table::new(name);
        for _ in 0..column_count {
            let col_name = r.get_str()?;
            let field_type = read_type_tag(&mut r)?;
            let is_primary_key = r.get_u8()? != 0;
            let is_nullable = r.get_u8()? != 0;
            table
                .add_column(ColumnDefinition {
                    name: col_name,
                    field_type,
                    is_primary_key,
                    is_nullable,
                })
                .map_err(|e| DbError::StorageCorrupt(e.to_string()))?;
        }

        let row_count = r.get_u32()? as usize;
        // every cell carries at least its 4-byte type tag
        let min_row_len = table.schema.len() * 4;
        if row_count > 0 && (min_row_len == 0 || row_count > r.remaining() / min_row_len) {
            return Err(DbError::StorageCorrupt(format!(
                "table '{}' claims {} rows but {} bytes remain for {} columns",
                table.name,
                row_count,
                r.remaining(),
                table.schema.len()
            )));
        }
        let mut rows = Vec::with_capacity(row_count);
        for _ in 0..row_count {
            let mut fields = Vec::with_capacity(table.schema.len());
            for column in &table.schema {
                let value = read_cell(&mut r)?;
                fields.push(Field::new(column.name.clone(), column.field_type, value));
            }
            rows.push(Row::new(fields));
        }
        if r.remaining() != 0 {
            return Err(DbError::StorageCorrupt(format!(
                "{} trailing bytes after table '{}'",
                r.remaining(),
                table.name
            )));
        }
        table.rows = rows;
        table
            .rebuild_index()
            .map_err(|e| DbError::StorageCorrupt(format!("table '{}': {}", table.name, e)))?;

        Ok(table)
    }
}

fn field_equals(row: &Row, column: &str, value: &FieldValue) -> bool {
    row.get(column).map_or(false, |f| &f.value == value)
}

fn write_cell(w: &mut ByteWriter, value: &FieldValue) -> Result<()> {
    w.put_i32(value.field_type().tag());
    match value {
        FieldValue::Integer(n) => {
            let n = i32::try_from(*n)
                .map_err(|_| DbError::DataStruct(format!("integer {} does not fit in 32 bits", n)))?;
            w.put_i32(n);
        }
        FieldValue::Float(x) => w.put_f64(*x),
        FieldValue::Text(s) => w.put_str(s)?,
        FieldValue::Null => {}
    }
    Ok(())
}

fn read_type_tag(r: &mut ByteReader<'_>) -> Result<FieldType> {
    let at = r.position();
    let tag = r.get_i32()?;
    FieldType::from_tag(tag)
        .ok_or_else(|| DbError::StorageCorrupt(format!("unknown type tag {} at offset {}", tag, at)))
}

fn read_cell(r: &mut ByteReader<'_>) -> Result<FieldValue> {
    Ok(match read_type_tag(r)? {
        FieldType::Integer => FieldValue::Integer(r.get_i32()? as i64),
        FieldType::Float => FieldValue::Float(r.get_f64()?),
        FieldType::Text => FieldValue::Text(r.get_str()?),
        FieldType::Null => FieldValue::Null,
    })
}
