/// Statement executor: runs one AST node against the table registry
use super::ast::*;
use super::evaluator::{evaluate_condition, evaluate_expression};
use crate::catalog::TableRegistry;
use crate::error::{ExecutionError, Result};
use crate::types::{ColumnDefinition, Field, FieldType, FieldValue, ResultSet, Row, Table};
use tracing::debug;

pub struct Executor {
    registry: TableRegistry,
}

impl Executor {
    pub fn new(registry: TableRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub fn execute(&mut self, stmt: Statement) -> Result<ResultSet> {
        debug!(kind = ?stmt.kind(), "executing statement");
        match stmt {
            Statement::Select(s) => self.execute_select(s),
            Statement::Insert(s) => self.execute_insert(s),
            Statement::Update(s) => self.execute_update(s),
            Statement::Delete(s) => self.execute_delete(s),
            Statement::CreateTable(s) => self.execute_create(s),
            Statement::DropTable(s) => self.execute_drop(s),
            Statement::List => Ok(self.execute_list()),
        }
    }

    fn table(&self, name: &str) -> Result<&Table> {
        self.registry
            .get_table(name)
            .ok_or_else(|| ExecutionError::TableNotFound(name.to_string()).into())
    }

    fn execute_select(&self, stmt: SelectStmt) -> Result<ResultSet> {
        let table = self.table(&stmt.table)?;

        let matched: Vec<&Row> = match primary_key_probe(table, stmt.where_clause.as_ref()) {
            Some(value) => table.find_by_primary_key(&value).into_iter().collect(),
            None => {
                let mut rows = Vec::new();
                for row in table.rows() {
                    if matches_where(stmt.where_clause.as_ref(), row) {
                        rows.push(row);
                    }
                }
                rows
            }
        };

        if stmt.columns.iter().any(|c| matches!(c, Expr::Wildcard)) {
            let rows = matched.into_iter().cloned().collect();
            return Ok(ResultSet::new(table.schema().to_vec(), rows));
        }

        let mut names = Vec::with_capacity(stmt.columns.len());
        for column in &stmt.columns {
            let name = match column {
                Expr::Identifier(name) => name,
                other => return Err(ExecutionError::UnknownColumn(other.to_string()).into()),
            };
            if table.column(name).is_none() {
                return Err(ExecutionError::UnknownColumn(name.clone()).into());
            }
            names.push(name.clone());
        }

        let schema = names
            .iter()
            .map(|n| ColumnDefinition::new(n.clone(), FieldType::Text))
            .collect();
        let rows = matched
            .into_iter()
            .map(|row| {
                Row::new(
                    names
                        .iter()
                        .filter_map(|n| row.get(n).cloned())
                        .collect(),
                )
            })
            .collect();
        Ok(ResultSet::new(schema, rows))
    }

    fn execute_insert(&mut self, stmt: InsertStmt) -> Result<ResultSet> {
        let schema = self.table(&stmt.table)?.schema().to_vec();
        if stmt.values.len() > schema.len() {
            return Err(ExecutionError::TooManyValues {
                expected: schema.len(),
                got: stmt.values.len(),
            }
            .into());
        }

        let mut fields = Vec::with_capacity(schema.len());
        for (i, column) in schema.iter().enumerate() {
            let value = stmt
                .values
                .get(i)
                .map(evaluate_expression)
                .unwrap_or(FieldValue::Null);
            if value.is_null() && !column.is_nullable {
                return Err(ExecutionError::MissingValue(column.name.clone()).into());
            }
            fields.push(Field::new(column.name.clone(), column.field_type, value));
        }

        let row = Row::new(fields);
        let inserted = row.clone();
        self.registry
            .modify_table(&stmt.table, move |table| table.insert_row(row))?;
        Ok(ResultSet::new(schema, vec![inserted]))
    }

    fn execute_update(&mut self, stmt: UpdateStmt) -> Result<ResultSet> {
        let schema = self.table(&stmt.table)?.schema().to_vec();
        let updates: Vec<(String, FieldValue)> = stmt
            .assignments
            .iter()
            .map(|(column, expr)| (column.clone(), evaluate_expression(expr)))
            .collect();
        for (column, value) in &updates {
            let nullable = schema
                .iter()
                .find(|c| &c.name == column)
                .map_or(true, |c| c.is_nullable);
            if value.is_null() && !nullable {
                return Err(ExecutionError::MissingValue(column.clone()).into());
            }
        }

        let where_clause = stmt.where_clause;
        let rows = self.registry.modify_table(&stmt.table, |table| {
            table.update_where(|row| Ok(matches_where(where_clause.as_ref(), row)), &updates)
        })?;
        Ok(ResultSet::new(schema, rows))
    }

    fn execute_delete(&mut self, stmt: DeleteStmt) -> Result<ResultSet> {
        let schema = self.table(&stmt.table)?.schema().to_vec();
        let where_clause = stmt.where_clause;
        let rows = self.registry.modify_table(&stmt.table, |table| {
            table.delete_where(|row| Ok(matches_where(where_clause.as_ref(), row)))
        })?;
        Ok(ResultSet::new(schema, rows))
    }

    fn execute_create(&mut self, stmt: CreateTableStmt) -> Result<ResultSet> {
        if self.registry.table_exists(&stmt.table) {
            return Err(ExecutionError::TableExists(stmt.table).into());
        }

        let mut columns = Vec::with_capacity(stmt.columns.len());
        for def in stmt.columns {
            let field_type = FieldType::from_sql_name(&def.data_type)
                .ok_or_else(|| ExecutionError::UnknownColumnType(def.data_type.clone()))?;
            columns.push(ColumnDefinition {
                name: def.name,
                field_type,
                is_primary_key: def.primary_key,
                is_nullable: def.nullable && !def.primary_key,
            });
        }

        let table = Table::with_columns(stmt.table, columns)?;
        self.registry.register_table(table)?;
        Ok(ResultSet::empty())
    }

    fn execute_drop(&mut self, stmt: DropTableStmt) -> Result<ResultSet> {
        if !self.registry.drop_table(&stmt.table)? {
            return Err(ExecutionError::TableNotFound(stmt.table).into());
        }
        Ok(ResultSet::empty())
    }

    fn execute_list(&self) -> ResultSet {
        let names = self.registry.table_names();
        if names.is_empty() {
            return ResultSet::empty();
        }
        let rows = names
            .into_iter()
            .map(|name| {
                Row::new(vec![Field::new(
                    "table_name",
                    FieldType::Text,
                    FieldValue::Text(name),
                )])
            })
            .collect();
        ResultSet::new(vec![ColumnDefinition::new("table_name", FieldType::Text)], rows)
    }
}

fn matches_where(where_clause: Option<&Expr>, row: &Row) -> bool {
    where_clause.map_or(true, |expr| evaluate_condition(expr, row))
}

/// `pk = literal` on the table's primary key can be answered by the index.
fn primary_key_probe(table: &Table, where_clause: Option<&Expr>) -> Option<FieldValue> {
    let pk = table.primary_key_column()?;
    match where_clause? {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        } => match (&**left, &**right) {
            (Expr::Identifier(name), literal) if *name == pk.name => {
                Some(evaluate_expression(literal))
            }
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::sql::parser::parse;
    use crate::storage::MemoryStore;

    fn executor() -> Executor {
        Executor::new(TableRegistry::new(Box::new(MemoryStore::new())).unwrap())
    }

    fn run(exec: &mut Executor, sql: &str) -> Result<ResultSet> {
        exec.execute(parse(sql)?)
    }

    fn seeded() -> Executor {
        let mut exec = executor();
        run(&mut exec, "CREATE TABLE users (id INT PRIMARY KEY, name TEXT, age INTEGER)").unwrap();
        run(&mut exec, "INSERT INTO users VALUES (1, 'ann', 30)").unwrap();
        run(&mut exec, "INSERT INTO users VALUES (2, 'bob', 17)").unwrap();
        run(&mut exec, "INSERT INTO users VALUES (3, 'cat', 45)").unwrap();
        exec
    }

    #[test]
    fn test_select_all_and_filtered() {
        let mut exec = seeded();
        assert_eq!(run(&mut exec, "SELECT * FROM users").unwrap().row_count(), 3);

        let rs = run(&mut exec, "SELECT name FROM users WHERE age > 18").unwrap();
        assert_eq!(rs.schema.len(), 1);
        assert_eq!(rs.schema[0].field_type, FieldType::Text);
        let names: Vec<_> = rs.rows.iter().map(|r| r.fields[0].value.clone()).collect();
        assert_eq!(
            names,
            vec![FieldValue::Text("ann".into()), FieldValue::Text("cat".into())]
        );
    }

    #[test]
    fn test_select_by_primary_key() {
        let mut exec = seeded();
        let rs = run(&mut exec, "SELECT * FROM users WHERE id = 2").unwrap();
        assert_eq!(rs.row_count(), 1);
        assert_eq!(rs.rows[0].get("name").unwrap().value, FieldValue::Text("bob".into()));

        let rs = run(&mut exec, "SELECT * FROM users WHERE id = '2'").unwrap();
        assert_eq!(rs.row_count(), 0);
    }

    #[test]
    fn test_select_errors() {
        let mut exec = seeded();
        let err = run(&mut exec, "SELECT * FROM nope").unwrap_err();
        assert!(err.is_not_found());

        let err = run(&mut exec, "SELECT ghost FROM users").unwrap_err();
        assert!(matches!(
            err,
            DbError::Execution(ExecutionError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_unfilterable_where_matches_every_row() {
        let mut exec = seeded();
        assert_eq!(run(&mut exec, "SELECT * FROM users WHERE 1 = 2").unwrap().row_count(), 3);
        assert_eq!(run(&mut exec, "SELECT * FROM users WHERE age").unwrap().row_count(), 3);

        let rs = run(&mut exec, "UPDATE users SET age = 1 WHERE 'x' = 'y'").unwrap();
        assert_eq!(rs.row_count(), 3);

        let rs = run(&mut exec, "DELETE FROM users WHERE 'x'").unwrap();
        assert_eq!(rs.row_count(), 3);
        assert_eq!(run(&mut exec, "SELECT * FROM users").unwrap().row_count(), 0);
    }

    #[test]
    fn test_insert_arity() {
        let mut exec = seeded();
        let err = run(&mut exec, "INSERT INTO users VALUES (9, 'x', 1, 2)").unwrap_err();
        assert!(matches!(
            err,
            DbError::Execution(ExecutionError::TooManyValues { expected: 3, got: 4 })
        ));

        let rs = run(&mut exec, "INSERT INTO users VALUES (9, 'short')").unwrap();
        assert!(rs.rows[0].get("age").unwrap().value.is_null());

        let err = run(&mut exec, "INSERT INTO users VALUES (NULL, 'x')").unwrap_err();
        assert!(matches!(
            err,
            DbError::Execution(ExecutionError::MissingValue(_))
        ));
        assert_eq!(run(&mut exec, "SELECT * FROM users").unwrap().row_count(), 4);
    }

    #[test]
    fn test_insert_duplicate_key() {
        let mut exec = seeded();
        let err = run(&mut exec, "INSERT INTO users VALUES (1, 'dup', 1)").unwrap_err();
        assert!(matches!(
            err,
            DbError::Execution(ExecutionError::DuplicatePrimaryKey(_))
        ));
        assert_eq!(run(&mut exec, "SELECT * FROM users").unwrap().row_count(), 3);
    }

    #[test]
    fn test_update_and_delete_with_where() {
        let mut exec = seeded();
        let rs = run(&mut exec, "UPDATE users SET age = 18 WHERE age < 20").unwrap();
        assert_eq!(rs.row_count(), 1);
        assert_eq!(rs.rows[0].get("age").unwrap().value, FieldValue::Integer(18));

        let rs = run(&mut exec, "DELETE FROM users WHERE name = 'ann'").unwrap();
        assert_eq!(rs.row_count(), 1);

        let rs = run(&mut exec, "UPDATE users SET name = 'z'").unwrap();
        assert_eq!(rs.row_count(), 2);

        let rs = run(&mut exec, "DELETE FROM users").unwrap();
        assert_eq!(rs.row_count(), 2);
        assert_eq!(run(&mut exec, "SELECT * FROM users").unwrap().row_count(), 0);
    }

    #[test]
    fn test_update_unknown_column() {
        let mut exec = seeded();
        let err = run(&mut exec, "UPDATE users SET ghost = 1").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_create_validation() {
        let mut exec = executor();
        let err = run(&mut exec, "CREATE TABLE t (a BLOB)").unwrap_err();
        assert!(matches!(
            err,
            DbError::Execution(ExecutionError::UnknownColumnType(_))
        ));
        assert!(!exec.registry().table_exists("t"));

        let err = run(&mut exec, "CREATE TABLE t (a INT, a TEXT)").unwrap_err();
        assert!(matches!(
            err,
            DbError::Execution(ExecutionError::DuplicateColumn(_))
        ));
        assert!(!exec.registry().table_exists("t"));

        run(&mut exec, "CREATE TABLE t (a varchar)").unwrap();
        let err = run(&mut exec, "CREATE TABLE t").unwrap_err();
        assert!(matches!(
            err,
            DbError::Execution(ExecutionError::TableExists(_))
        ));
    }

    #[test]
    fn test_drop_and_list() {
        let mut exec = executor();
        assert!(run(&mut exec, "LIST").unwrap().is_empty());

        run(&mut exec, "CREATE TABLE b").unwrap();
        run(&mut exec, "CREATE TABLE a").unwrap();
        let rs = run(&mut exec, "LIST").unwrap();
        assert_eq!(rs.schema[0].name, "table_name");
        assert_eq!(rs.rows[0].fields[0].value, FieldValue::Text("a".into()));

        run(&mut exec, "DROP TABLE a").unwrap();
        let err = run(&mut exec, "DROP TABLE a").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(run(&mut exec, "LIST").unwrap().row_count(), 1);
    }
}
