/// SQL Parser - recursive descent over the tokenizer's stream
use super::ast::*;
use super::lexer::Tokenizer;
use super::token::{Token, TokenKind};
use crate::error::{DbError, Result};

pub struct Parser {
    tokenizer: Tokenizer,
    current: Token,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::default(),
            current: Token::end(0),
        }
    }

    /// Parse one statement. The whole input must be consumed, apart from an
    /// optional trailing `;`.
    pub fn parse(&mut self, sql: &str) -> Result<Statement> {
        self.tokenizer.set_input(sql);
        self.advance();

        let stmt = match self.current.kind {
            TokenKind::Manipulation if self.current.is_word("SELECT") => self.parse_select()?,
            TokenKind::Manipulation if self.current.is_word("INSERT") => self.parse_insert()?,
            TokenKind::Manipulation if self.current.is_word("UPDATE") => self.parse_update()?,
            TokenKind::Manipulation if self.current.is_word("DELETE") => self.parse_delete()?,
            TokenKind::Definition if self.current.is_word("CREATE") => self.parse_create()?,
            TokenKind::Definition if self.current.is_word("DROP") => self.parse_drop()?,
            TokenKind::Definition if self.current.is_word("LIST") => self.parse_list()?,
            TokenKind::Definition => {
                return Err(self.error(&format!("{} is not supported", self.current.lexeme)))
            }
            _ => return Err(self.error("Expected SELECT, INSERT, UPDATE, DELETE, CREATE, DROP or LIST")),
        };

        if self.current.kind == TokenKind::Unknown && self.current.lexeme == ";" {
            self.advance();
        }
        if !self.current.is_end() {
            return Err(self.error(&format!("Unexpected '{}' after statement", self.current.lexeme)));
        }

        Ok(stmt)
    }

    /// SELECT ('*' | ident (',' ident)*) FROM ident [WHERE comparison]
    fn parse_select(&mut self) -> Result<Statement> {
        self.advance();

        let columns = if self.current.is_operator("*") {
            self.advance();
            vec![Expr::Wildcard]
        } else {
            let mut columns = vec![Expr::Identifier(self.parse_identifier()?)];
            while self.match_operator(",") {
                columns.push(Expr::Identifier(self.parse_identifier()?));
            }
            columns
        };

        self.expect_word("FROM")?;
        let table = self.parse_identifier()?;
        let where_clause = self.parse_where()?;

        Ok(Statement::Select(SelectStmt {
            table,
            columns,
            where_clause,
        }))
    }

    /// INSERT [INTO] ident VALUES value_list
    fn parse_insert(&mut self) -> Result<Statement> {
        self.advance();
        self.match_word("INTO");
        let table = self.parse_identifier()?;
        self.expect_word("VALUES")?;

        let values = if self.match_operator("(") {
            let values = self.parse_value_list()?;
            self.expect_operator(")")?;
            values
        } else {
            self.parse_value_list()?
        };

        Ok(Statement::Insert(InsertStmt { table, values }))
    }

    fn parse_value_list(&mut self) -> Result<Vec<Expr>> {
        let mut values = vec![self.parse_primary()?];
        while self.match_operator(",") {
            values.push(self.parse_primary()?);
        }
        Ok(values)
    }

    /// UPDATE ident SET ident '=' primary (',' ident '=' primary)* [WHERE comparison]
    fn parse_update(&mut self) -> Result<Statement> {
        self.advance();
        let table = self.parse_identifier()?;
        self.expect_word("SET")?;

        let mut assignments = Vec::new();
        loop {
            let column = self.parse_identifier()?;
            self.expect_operator("=")?;
            assignments.push((column, self.parse_primary()?));
            if !self.match_operator(",") {
                break;
            }
        }

        let where_clause = self.parse_where()?;
        Ok(Statement::Update(UpdateStmt {
            table,
            assignments,
            where_clause,
        }))
    }

    /// DELETE FROM ident [WHERE comparison]
    fn parse_delete(&mut self) -> Result<Statement> {
        self.advance();
        self.expect_word("FROM")?;
        let table = self.parse_identifier()?;
        let where_clause = self.parse_where()?;
        Ok(Statement::Delete(DeleteStmt { table, where_clause }))
    }

    /// CREATE TABLE ident ['(' column_def (',' column_def)* ')']
    fn parse_create(&mut self) -> Result<Statement> {
        self.advance();
        self.expect_word("TABLE")?;
        let table = self.parse_identifier()?;

        let mut columns = Vec::new();
        if self.match_operator("(") {
            loop {
                columns.push(self.parse_column_def()?);
                if !self.match_operator(",") {
                    break;
                }
            }
            self.expect_operator(")")?;
        }

        Ok(Statement::CreateTable(CreateTableStmt { table, columns }))
    }

    /// ident ident [PRIMARY KEY] [NOT NULL], modifiers in any order
    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.parse_identifier()?;
        let data_type = self.parse_identifier()?;
        let mut primary_key = false;
        let mut nullable = true;

        loop {
            if self.match_word("PRIMARY") {
                self.expect_word("KEY")?;
                primary_key = true;
                nullable = false;
            } else if self.match_word("NOT") {
                self.expect_word("NULL")?;
                nullable = false;
            } else {
                break;
            }
        }

        Ok(ColumnDef {
            name,
            data_type,
            primary_key,
            nullable,
        })
    }

    /// DROP TABLE ident
    fn parse_drop(&mut self) -> Result<Statement> {
        self.advance();
        self.expect_word("TABLE")?;
        let table = self.parse_identifier()?;
        Ok(Statement::DropTable(DropTableStmt { table }))
    }

    /// LIST [TABLES]
    fn parse_list(&mut self) -> Result<Statement> {
        self.advance();
        self.match_word("TABLES");
        Ok(Statement::List)
    }

    fn parse_where(&mut self) -> Result<Option<Expr>> {
        if self.match_word("WHERE") {
            Ok(Some(self.parse_comparison()?))
        } else {
            Ok(None)
        }
    }

    /// primary (cmp_op primary)?
    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_primary()?;
        if self.current.kind != TokenKind::Operator {
            return Ok(left);
        }
        let op = match BinaryOperator::from_symbol(&self.current.lexeme) {
            Some(op) => op,
            None => return Ok(left),
        };
        self.advance();
        let right = self.parse_primary()?;
        Ok(Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let expr = match self.current.kind {
            TokenKind::Identifier => Expr::Identifier(self.current.lexeme.clone()),
            TokenKind::StringLiteral => Expr::StringLiteral(self.current.lexeme.clone()),
            TokenKind::NumericLiteral => Expr::NumericLiteral(self.current.lexeme.clone()),
            _ => return Err(self.error("Expected identifier or literal")),
        };
        self.advance();
        Ok(expr)
    }

    fn parse_identifier(&mut self) -> Result<String> {
        if self.current.kind != TokenKind::Identifier {
            return Err(self.error("Expected identifier"));
        }
        let name = self.current.lexeme.clone();
        self.advance();
        Ok(name)
    }

    fn advance(&mut self) {
        self.current = self.tokenizer.next_token();
    }

    fn match_word(&mut self, word: &str) -> bool {
        if self.current.is_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_operator(&mut self, op: &str) -> bool {
        if self.current.is_operator(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        if self.match_word(word) {
            Ok(())
        } else {
            Err(self.error(&format!("Expected {}", word)))
        }
    }

    fn expect_operator(&mut self, op: &str) -> Result<()> {
        if self.match_operator(op) {
            Ok(())
        } else {
            Err(self.error(&format!("Expected '{}'", op)))
        }
    }

    fn error(&self, msg: &str) -> DbError {
        DbError::parse(msg, self.current.position)
    }
}

/// Parse a single statement with a fresh parser.
pub fn parse(sql: &str) -> Result<Statement> {
    Parser::new().parse(sql)
}
