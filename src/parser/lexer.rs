//! Lexer for fact and formula files.

/// Token types for fact and formula syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Names: predicates, constants, variables, keywords and relation symbols
    Identifier(String),
    // Unsigned or signed integer, or a decimal weight
    Number(String),

    // Delimiters
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    LBrace,    // {
    RBrace,    // }
    Comma,     // ,
    Colon,     // :
    At,        // @
    Ampersand, // &
    Backslash, // \

    // Connectives
    Not,       // !
    And,       // ^
    Meets,     // ;
    Implies,   // ->
    Diamond,   // <>
    Less,      // <
    Greater,   // >
    Equals,    // =

    // End of input
    Eof,
}

/// Lexer state.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    /// Position where the most recent token started.
    pub token_line: usize,
    pub token_column: usize,
    /// Whether a line break was skipped before the most recent token.
    pub newline_before: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            line: 1,
            column: 1,
            token_line: 1,
            token_column: 1,
            newline_before: false,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.newline_before = false;
        self.skip_whitespace_and_comments();
        self.token_line = self.line;
        self.token_column = self.column;

        let remaining = &self.input[self.position..];
        let Some(ch) = remaining.chars().next() else {
            return Ok(Token::Eof);
        };

        let single = match ch {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            ',' => Some(Token::Comma),
            ':' => Some(Token::Colon),
            '@' => Some(Token::At),
            '&' => Some(Token::Ampersand),
            '\\' => Some(Token::Backslash),
            '!' => Some(Token::Not),
            '^' => Some(Token::And),
            ';' => Some(Token::Meets),
            '>' => Some(Token::Greater),
            '=' => Some(Token::Equals),
            _ => None,
        };
        if let Some(token) = single {
            self.advance(1);
            return Ok(token);
        }

        if remaining.starts_with("->") {
            self.advance(2);
            return Ok(Token::Implies);
        }
        if remaining.starts_with("<>") {
            self.advance(2);
            return Ok(Token::Diamond);
        }
        if ch == '<' {
            self.advance(1);
            return Ok(Token::Less);
        }

        let signed_digit = ch == '-'
            && remaining[1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit());
        if ch.is_ascii_digit() || signed_digit {
            return Ok(self.lex_number());
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(self.lex_identifier());
        }

        Err(LexError {
            message: format!("unexpected character: '{}'", ch),
            line: self.line,
            column: self.column,
        })
    }

    /// Peek at the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Token, LexError> {
        let saved = (
            self.position,
            self.line,
            self.column,
            self.token_line,
            self.token_column,
            self.newline_before,
        );

        let token = self.next_token()?;

        (
            self.position,
            self.line,
            self.column,
            self.token_line,
            self.token_column,
            self.newline_before,
        ) = saved;

        Ok(token)
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input[self.position..].chars().nth(offset)
    }

    fn advance(&mut self, bytes: usize) {
        let consumed = &self.input[self.position..self.position + bytes];
        for ch in consumed.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += bytes;
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek_char(0) {
            let remaining = &self.input[self.position..];
            if ch.is_whitespace() {
                if ch == '\n' {
                    self.newline_before = true;
                }
                self.advance(ch.len_utf8());
            } else if ch == '#' || remaining.starts_with("//") {
                // Skip to end of line
                let line_len = remaining.find('\n').unwrap_or(remaining.len());
                self.advance(line_len);
            } else {
                break;
            }
        }
    }

    fn lex_number(&mut self) -> Token {
        let start = self.position;
        if self.peek_char(0) == Some('-') {
            self.advance(1);
        }
        let mut seen_dot = false;
        while let Some(ch) = self.peek_char(0) {
            let fraction = ch == '.'
                && !seen_dot
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit());
            if ch.is_ascii_digit() {
                self.advance(1);
            } else if fraction {
                seen_dot = true;
                self.advance(1);
            } else {
                break;
            }
        }
        Token::Number(self.input[start..self.position].to_string())
    }

    /// Names may contain `-` between word characters, as in `D-P`, but
    /// never as the start of `->`.
    fn lex_identifier(&mut self) -> Token {
        let start = self.position;
        while let Some(ch) = self.peek_char(0) {
            let inner_dash = ch == '-'
                && self
                    .peek_char(1)
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
            if ch.is_ascii_alphanumeric() || ch == '_' || inner_dash {
                self.advance(1);
            } else {
                break;
            }
        }
        Token::Identifier(self.input[start..self.position].to_string())
    }
}

/// Lexer error.
#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}
