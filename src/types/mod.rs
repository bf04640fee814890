//! Core value model: typed cells, rows and column definitions.

pub mod codec;
pub mod result_set;
pub mod table;

pub use result_set::ResultSet;
pub use table::Table;

use std::cmp::Ordering;
use std::fmt;

/// Declared type of a column or cell. Declaration order fixes the on-disk tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Float,
    Text,
    Null,
}

impl FieldType {
    pub fn tag(self) -> i32 {
        match self {
            FieldType::Integer => 0,
            FieldType::Float => 1,
            FieldType::Text => 2,
            FieldType::Null => 3,
        }
    }

    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(FieldType::Integer),
            1 => Some(FieldType::Float),
            2 => Some(FieldType::Text),
            3 => Some(FieldType::Null),
            _ => None,
        }
    }

    /// Maps a declared SQL type name, case-insensitively.
    pub fn from_sql_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "INT" | "INTEGER" => Some(FieldType::Integer),
            "FLOAT" | "DOUBLE" => Some(FieldType::Float),
            "STRING" | "TEXT" | "VARCHAR" => Some(FieldType::Text),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldType::Integer => "INTEGER",
            FieldType::Float => "FLOAT",
            FieldType::Text => "TEXT",
            FieldType::Null => "NULL",
        };
        f.write_str(s)
    }
}

/// Cell value.
///
/// Equality is variant-aware: `Integer(1) != Float(1.0)`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl FieldValue {
    /// Type of the value itself, independent of any column declaration.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Integer(_) => FieldType::Integer,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Null => FieldType::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Ordering is only defined between two integers or two floats.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Text(s) => write!(f, "'{}'", s),
            FieldValue::Null => f.write_str("NULL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub field_type: FieldType,
    pub is_primary_key: bool,
    pub is_nullable: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            is_primary_key: false,
            is_nullable: true,
        }
    }

    /// Marks the column as the primary key, which also makes it non-nullable.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub value: FieldValue,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType, value: FieldValue) -> Self {
        Self { name: name.into(), field_type, value }
    }
}

/// Fields in schema order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub fields: Vec<Field>,
}

impl Row {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
