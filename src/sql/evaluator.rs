/// Expression and predicate evaluation against a single row
use super::ast::{BinaryOperator, Expr};
use crate::types::{FieldValue, Row};
use std::cmp::Ordering;

/// Evaluate a constant expression.
///
/// - numeric literal: `Integer` (32-bit range) or `Float` when it has a `.`;
///   unparsable text becomes `Integer(0)`
/// - string literal: `Text` without the surrounding quotes
/// - identifier: `Text` of the name, except the bare word `NULL`
/// - anything else: `Null`
pub fn evaluate_expression(expr: &Expr) -> FieldValue {
    match expr {
        Expr::NumericLiteral(raw) => parse_number(raw),
        Expr::StringLiteral(raw) => FieldValue::Text(strip_quotes(raw).to_string()),
        Expr::Identifier(name) if name.eq_ignore_ascii_case("NULL") => FieldValue::Null,
        Expr::Identifier(name) => FieldValue::Text(name.clone()),
        Expr::Wildcard | Expr::BinaryOp { .. } => FieldValue::Null,
    }
}

fn parse_number(raw: &str) -> FieldValue {
    if raw.contains('.') {
        raw.parse::<f64>()
            .map(FieldValue::Float)
            .unwrap_or(FieldValue::Integer(0))
    } else {
        raw.parse::<i32>()
            .map(|n| FieldValue::Integer(i64::from(n)))
            .unwrap_or(FieldValue::Integer(0))
    }
}

fn strip_quotes(raw: &str) -> &str {
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

/// Evaluate a WHERE comparison for `row`.
///
/// Only `identifier op literal` filters rows. The identifier resolves to the
/// row's field and a missing column makes the predicate false. Any other
/// shape matches every row.
pub fn evaluate_condition(expr: &Expr, row: &Row) -> bool {
    let (name, op, right) = match expr {
        Expr::BinaryOp { left, op, right } => match &**left {
            Expr::Identifier(name) => (name, *op, right),
            _ => return true,
        },
        _ => return true,
    };

    match row.get(name) {
        Some(field) => compare(&field.value, op, &evaluate_expression(right)),
        None => false,
    }
}

/// Apply a comparison operator. Ordering operators only hold between two
/// integers or two floats.
pub fn compare(lhs: &FieldValue, op: BinaryOperator, rhs: &FieldValue) -> bool {
    match op {
        BinaryOperator::Eq => lhs == rhs,
        BinaryOperator::Ne => lhs != rhs,
        BinaryOperator::Lt => lhs.compare(rhs) == Some(Ordering::Less),
        BinaryOperator::Gt => lhs.compare(rhs) == Some(Ordering::Greater),
        BinaryOperator::Le => matches!(lhs.compare(rhs), Some(Ordering::Less | Ordering::Equal)),
        BinaryOperator::Ge => matches!(lhs.compare(rhs), Some(Ordering::Greater | Ordering::Equal)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::parser::parse;
    use crate::sql::Statement;
    use crate::types::{Field, FieldType};

    fn row() -> Row {
        Row::new(vec![
            Field::new("id", FieldType::Integer, FieldValue::Integer(5)),
            Field::new("name", FieldType::Text, FieldValue::Text("bob".into())),
            Field::new("score", FieldType::Float, FieldValue::Float(2.5)),
        ])
    }

    fn where_of(sql: &str) -> Expr {
        match parse(sql).unwrap() {
            Statement::Select(s) => s.where_clause.unwrap(),
            _ => panic!("Expected SELECT statement"),
        }
    }

    fn holds(cond: &str) -> bool {
        let expr = where_of(&format!("SELECT * FROM t WHERE {}", cond));
        evaluate_condition(&expr, &row())
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            evaluate_expression(&Expr::NumericLiteral("42".into())),
            FieldValue::Integer(42)
        );
        assert_eq!(
            evaluate_expression(&Expr::NumericLiteral("4.50".into())),
            FieldValue::Float(4.5)
        );
        assert_eq!(
            evaluate_expression(&Expr::NumericLiteral("99999999999".into())),
            FieldValue::Integer(0)
        );
        assert_eq!(
            evaluate_expression(&Expr::StringLiteral("'hi there'".into())),
            FieldValue::Text("hi there".into())
        );
        assert_eq!(
            evaluate_expression(&Expr::StringLiteral("'open".into())),
            FieldValue::Text("'open".into())
        );
        assert_eq!(
            evaluate_expression(&Expr::Identifier("col".into())),
            FieldValue::Text("col".into())
        );
        assert_eq!(evaluate_expression(&Expr::Identifier("null".into())), FieldValue::Null);
        assert_eq!(evaluate_expression(&Expr::Wildcard), FieldValue::Null);
    }

    #[test]
    fn test_comparisons() {
        assert!(holds("id = 5"));
        assert!(holds("id >= 5"));
        assert!(!holds("id < 5"));
        assert!(holds("name = 'bob'"));
        assert!(holds("name != 'amy'"));
        assert!(holds("score > 2.0"));
    }

    #[test]
    fn test_cross_variant_never_orders() {
        assert!(!holds("score > 1"));
        assert!(!holds("score = 2"));
        assert!(holds("score != 2"));
        assert!(!holds("name < 'c'"));
    }

    #[test]
    fn test_missing_column_is_false() {
        assert!(!holds("missing = 1"));
    }

    #[test]
    fn test_literal_left_operand_matches_every_row() {
        assert!(holds("1 = 2"));
        assert!(holds("'a' = 'b'"));
    }

    #[test]
    fn test_bare_operand_matches_every_row() {
        assert!(holds("id"));
        assert!(holds("'x'"));
        assert!(holds("missing"));
    }
}
