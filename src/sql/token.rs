/// Token types for the SQL tokenizer

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// CREATE, ALTER, DROP, LIST
    Definition,
    /// SELECT, INSERT, UPDATE, DELETE
    Manipulation,
    /// FROM, WHERE
    Query,
    /// JOIN, LEFT, RIGHT
    Join,
    /// AND, OR, NOT
    Logical,
    Operator,
    Identifier,
    /// Single-quoted, quotes included in the lexeme
    StringLiteral,
    NumericLiteral,
    EndOfInput,
    Unknown,
}

impl TokenKind {
    /// Classify an uppercased word against the keyword sets.
    pub fn keyword(upper: &str) -> Option<TokenKind> {
        match upper {
            "CREATE" | "ALTER" | "DROP" | "LIST" => Some(TokenKind::Definition),
            "SELECT" | "INSERT" | "UPDATE" | "DELETE" => Some(TokenKind::Manipulation),
            "FROM" | "WHERE" => Some(TokenKind::Query),
            "JOIN" | "LEFT" | "RIGHT" => Some(TokenKind::Join),
            "AND" | "OR" | "NOT" => Some(TokenKind::Logical),
            _ => None,
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Definition
                | TokenKind::Manipulation
                | TokenKind::Query
                | TokenKind::Join
                | TokenKind::Logical
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text, original casing
    pub lexeme: String,
    /// Byte offset into the source
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    pub fn end(position: usize) -> Self {
        Self::new(TokenKind::EndOfInput, "", position)
    }

    /// Keyword or identifier spelled `word`, ignoring case.
    pub fn is_word(&self, word: &str) -> bool {
        (self.kind.is_keyword() || self.kind == TokenKind::Identifier)
            && self.lexeme.eq_ignore_ascii_case(word)
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.lexeme == op
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }
}
