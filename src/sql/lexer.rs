/// SQL Tokenizer - converts SQL text into tokens
///
/// Never fails: characters outside the grammar become `Unknown` tokens and
/// an unterminated string literal runs to the end of input.
use super::token::{Token, TokenKind};

const TWO_CHAR_OPERATORS: [&str; 3] = ["!=", "<=", ">="];
const ONE_CHAR_OPERATORS: [char; 7] = ['*', ',', '(', ')', '=', '<', '>'];

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    input: String,
    /// Byte offset of the next unread character
    position: usize,
    peeked: Option<Token>,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            position: 0,
            peeked: None,
        }
    }

    /// Replace the input and rewind.
    pub fn set_input(&mut self, input: &str) {
        self.input.clear();
        self.input.push_str(input);
        self.reset();
    }

    pub fn reset(&mut self) {
        self.position = 0;
        self.peeked = None;
    }

    /// Tokenize the whole input from the start. The result always ends in
    /// exactly one `EndOfInput` token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        self.reset();
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_end = token.is_end();
            tokens.push(token);
            if is_end {
                break;
            }
        }
        tokens
    }

    pub fn next_token(&mut self) -> Token {
        match self.peeked.take() {
            Some(token) => token,
            None => self.scan(),
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> &Token {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan(),
        };
        self.peeked.insert(token)
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    fn advance_while<F: Fn(char) -> bool>(&mut self, pred: F) {
        while let Some(ch) = self.current_char() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(|ch| ch.is_ascii_whitespace());
    }

    fn scan(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.position;

        let ch = match self.current_char() {
            Some(ch) => ch,
            None => return Token::end(start),
        };

        if ch.is_ascii_alphabetic() || ch == '_' {
            return self.read_identifier(start);
        }
        if ch.is_ascii_digit() {
            return self.read_number(start);
        }
        if ch == '\'' {
            return self.read_string(start);
        }

        let rest = &self.input[start..];
        if let Some(op) = TWO_CHAR_OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            self.position += op.len();
            return Token::new(TokenKind::Operator, *op, start);
        }

        self.advance();
        let kind = if ONE_CHAR_OPERATORS.contains(&ch) {
            TokenKind::Operator
        } else {
            TokenKind::Unknown
        };
        Token::new(kind, &self.input[start..self.position], start)
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        self.advance_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        let lexeme = &self.input[start..self.position];
        let kind = TokenKind::keyword(&lexeme.to_ascii_uppercase()).unwrap_or(TokenKind::Identifier);
        Token::new(kind, lexeme, start)
    }

    fn read_number(&mut self, start: usize) -> Token {
        self.advance_while(|ch| ch.is_ascii_digit());
        if self.current_char() == Some('.') {
            self.advance();
            self.advance_while(|ch| ch.is_ascii_digit());
        }
        Token::new(TokenKind::NumericLiteral, &self.input[start..self.position], start)
    }

    fn read_string(&mut self, start: usize) -> Token {
        self.advance(); // opening quote
        self.advance_while(|ch| ch != '\'');
        self.advance(); // closing quote, if any
        Token::new(TokenKind::StringLiteral, &self.input[start..self.position], start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<TokenKind> {
        Tokenizer::new(sql).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_select() {
        let tokens = Tokenizer::new("SELECT * FROM users").tokenize();

        assert_eq!(tokens.len(), 5); // SELECT, *, FROM, users, end
        assert_eq!(tokens[0].kind, TokenKind::Manipulation);
        assert!(tokens[1].is_operator("*"));
        assert_eq!(tokens[2].kind, TokenKind::Query);
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
        assert_eq!(tokens[3].position, 14);
        assert!(tokens[4].is_end());
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let tokens = Tokenizer::new("select From wHeRe left And list").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Manipulation);
        assert_eq!(tokens[0].lexeme, "select");
        assert_eq!(tokens[1].kind, TokenKind::Query);
        assert_eq!(tokens[2].kind, TokenKind::Query);
        assert_eq!(tokens[3].kind, TokenKind::Join);
        assert_eq!(tokens[4].kind, TokenKind::Logical);
        assert_eq!(tokens[5].kind, TokenKind::Definition);
    }

    #[test]
    fn test_plain_words_are_identifiers() {
        assert_eq!(
            kinds("INTO VALUES SET TABLE PRIMARY KEY _x1"),
            vec![TokenKind::Identifier; 7]
                .into_iter()
                .chain([TokenKind::EndOfInput])
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_operators_greedy() {
        let tokens = Tokenizer::new("= != < > <= >= , ( )").tokenize();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["=", "!=", "<", ">", "<=", ">=", ",", "(", ")", ""]);
        assert!(tokens[..9].iter().all(|t| t.kind == TokenKind::Operator));
    }

    #[test]
    fn test_numbers() {
        let tokens = Tokenizer::new("42 3.14 7.").tokenize();
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].lexeme, "3.14");
        assert_eq!(tokens[2].lexeme, "7.");
        assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::NumericLiteral));
    }

    #[test]
    fn test_string_literal_keeps_quotes() {
        let tokens = Tokenizer::new("name = 'John Smith'").tokenize();
        assert_eq!(tokens[2].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[2].lexeme, "'John Smith'");
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let tokens = Tokenizer::new("'abc def").tokenize();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].lexeme, "'abc def");
    }

    #[test]
    fn test_unknown_characters() {
        let tokens = Tokenizer::new("a ; ! é").tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
        assert_eq!(tokens[1].lexeme, ";");
        assert_eq!(tokens[2].kind, TokenKind::Unknown);
        assert_eq!(tokens[2].lexeme, "!");
        assert_eq!(tokens[3].lexeme, "é");
        assert!(tokens[4].is_end());
    }

    #[test]
    fn test_end_of_input_is_sticky() {
        let mut tokenizer = Tokenizer::new("x");
        tokenizer.next_token();
        assert!(tokenizer.next_token().is_end());
        assert!(tokenizer.next_token().is_end());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut tokenizer = Tokenizer::new("DROP TABLE t");
        assert_eq!(tokenizer.peek_token().lexeme, "DROP");
        assert_eq!(tokenizer.peek_token().lexeme, "DROP");
        assert_eq!(tokenizer.next_token().lexeme, "DROP");
        assert_eq!(tokenizer.next_token().lexeme, "TABLE");
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let mut tokenizer = Tokenizer::new("UPDATE t SET a = 'x' WHERE b >= 2.5");
        let first = tokenizer.tokenize();
        let second = tokenizer.tokenize();
        assert_eq!(first, second);

        tokenizer.set_input("LIST");
        assert_eq!(tokenizer.tokenize().len(), 2);
    }
}
