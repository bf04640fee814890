//! Text rendering of result sets.

use crate::sql::StatementKind;
use crate::types::{Field, FieldType, FieldValue, ResultSet, Row};

pub const NO_QUERY: &str = "No query runned!";
pub const EMPTY_SET: &str = "Empty set";

/// Render the outcome of the last statement.
pub fn render(kind: Option<StatementKind>, results: Option<&ResultSet>) -> String {
    let (kind, rs) = match (kind, results) {
        (Some(kind), Some(rs)) => (kind, rs),
        _ => return NO_QUERY.to_string(),
    };

    match kind {
        StatementKind::Select | StatementKind::List => format_table(rs),
        StatementKind::Insert => "Query OK, 1 row inserted".to_string(),
        StatementKind::Update => format!("Query OK, {} updated", rows_phrase(rs.row_count())),
        StatementKind::Delete => format!("Query OK, {} deleted", rows_phrase(rs.row_count())),
        StatementKind::Create => "Query OK, table created".to_string(),
        StatementKind::Drop => "Query OK, table dropped".to_string(),
    }
}

fn rows_phrase(n: usize) -> String {
    if n == 1 {
        "1 row".to_string()
    } else {
        format!("{} rows", n)
    }
}

/// Bordered table with one column per schema entry, followed by the row count.
pub fn format_table(rs: &ResultSet) -> String {
    if rs.is_empty() {
        return EMPTY_SET.to_string();
    }

    let cells: Vec<Vec<String>> = rs
        .rows
        .iter()
        .map(|row| {
            rs.schema
                .iter()
                .map(|col| cell_text(row, &col.name))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = rs
        .schema
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .fold(col.name.chars().count(), usize::max)
        })
        .collect();

    let mut separator = String::from("+");
    for width in &widths {
        separator.push_str(&"-".repeat(width + 2));
        separator.push('+');
    }
    separator.push('\n');

    let mut out = String::new();
    out.push_str(&separator);
    push_line(&mut out, rs.schema.iter().map(|c| c.name.as_str()), &widths);
    out.push_str(&separator);
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out.push_str(&separator);
    out.push_str(&rows_phrase(rs.row_count()));
    out.push_str(" in set");
    out
}

fn push_line<'a>(out: &mut String, values: impl Iterator<Item = &'a str>, widths: &[usize]) {
    out.push('|');
    for (value, width) in values.zip(widths) {
        let pad = width - value.chars().count();
        out.push(' ');
        out.push_str(value);
        out.push_str(&" ".repeat(pad));
        out.push_str(" |");
    }
    out.push('\n');
}

fn cell_text(row: &Row, column: &str) -> String {
    row.get(column).map(render_cell).unwrap_or_default()
}

/// Render one cell. An Integer-declared field shows floats truncated and
/// text as `0`.
pub fn render_cell(field: &Field) -> String {
    match (&field.value, field.field_type) {
        (FieldValue::Null, _) => "NULL".to_string(),
        (FieldValue::Integer(n), _) => n.to_string(),
        (FieldValue::Float(x), FieldType::Integer) => (x.trunc() as i64).to_string(),
        (FieldValue::Text(_), FieldType::Integer) => "0".to_string(),
        (FieldValue::Float(x), _) => format_float(*x),
        (FieldValue::Text(s), _) => s.clone(),
    }
}

/// Six decimals, then trailing zeros and a trailing point removed.
pub fn format_float(x: f64) -> String {
    let s = format!("{:.6}", x);
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnDefinition;

    fn people() -> ResultSet {
        let row = |id: i64, name: &str| {
            Row::new(vec![
                Field::new("id", FieldType::Integer, FieldValue::Integer(id)),
                Field::new("name", FieldType::Text, FieldValue::Text(name.into())),
            ])
        };
        ResultSet::new(
            vec![
                ColumnDefinition::new("id", FieldType::Integer),
                ColumnDefinition::new("name", FieldType::Text),
            ],
            vec![row(1, "Alice"), row(2, "Bob")],
        )
    }

    #[test]
    fn test_two_row_table() {
        let expected = "\
+----+-------+
| id | name  |
+----+-------+
| 1  | Alice |
| 2  | Bob   |
+----+-------+
2 rows in set";
        assert_eq!(format_table(&people()), expected);
    }

    #[test]
    fn test_single_row_phrase() {
        let mut rs = people();
        rs.rows.truncate(1);
        assert!(format_table(&rs).ends_with("\n1 row in set"));
    }

    #[test]
    fn test_empty_set() {
        let mut rs = people();
        rs.rows.clear();
        assert_eq!(format_table(&rs), EMPTY_SET);
        assert_eq!(format_table(&ResultSet::empty()), EMPTY_SET);
    }

    #[test]
    fn test_float_rendering() {
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(3.0), "3");
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(1.234567891), "1.234568");
        assert_eq!(format_float(-10.25), "-10.25");
    }

    #[test]
    fn test_declared_integer_cells() {
        let f = Field::new("n", FieldType::Integer, FieldValue::Float(7.9));
        assert_eq!(render_cell(&f), "7");
        let f = Field::new("n", FieldType::Integer, FieldValue::Text("x".into()));
        assert_eq!(render_cell(&f), "0");
        let f = Field::new("n", FieldType::Integer, FieldValue::Null);
        assert_eq!(render_cell(&f), "NULL");
    }

    #[test]
    fn test_status_lines() {
        let rs = people();
        assert_eq!(render(None, None), NO_QUERY);
        assert_eq!(render(Some(StatementKind::Insert), Some(&rs)), "Query OK, 1 row inserted");
        assert_eq!(
            render(Some(StatementKind::Update), Some(&rs)),
            "Query OK, 2 rows updated"
        );
        assert_eq!(
            render(Some(StatementKind::Delete), Some(&ResultSet::empty())),
            "Query OK, 0 rows deleted"
        );
        assert_eq!(
            render(Some(StatementKind::Drop), Some(&ResultSet::empty())),
            "Query OK, table dropped"
        );
    }
}
