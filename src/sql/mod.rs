/// XaleDB SQL front end
///
/// Architecture:
/// - Tokenizer: splits SQL text into tokens
/// - Parser: builds a statement AST (recursive descent, one token look-ahead)
/// - Evaluator: literal values and WHERE predicates
/// - Executor: runs statements against the table registry

pub mod ast;
pub mod evaluator;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{BinaryOperator, Expr, Statement, StatementKind};
pub use executor::Executor;
pub use lexer::Tokenizer;
pub use parser::{parse, Parser};
pub use token::{Token, TokenKind};
