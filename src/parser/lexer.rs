//! Lexer (tokenizer) for simulator commands
//!
//! Converts one command line into a flat [`Token`] stream consumed by the
//! statement checks in [`super::syntax`] and by literal validation in the type
//! system. Every token records the byte [`Span`] it was read from so callers can
//! slice the raw source text back out (values, attribute lists, array elements).

use std::fmt;

/// Byte range of a token inside the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// 1-based character position used in diagnostics.
    pub fn position(&self) -> usize {
        self.start + 1
    }
}

/// All token variants produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Raw numeric text: digits with an optional fraction and exponent. Any
    /// letters glued to the number are kept so the type system can reject them.
    Number(String, Span),
    /// Decoded contents of a single-quoted literal (may hold any length).
    CharLiteral(String, Span),
    StringLiteral(String, Span),

    Ident(String, Span),

    // Keywords
    New(Span),
    Enter(Span),
    Leave(Span),
    Null(Span),
    True(Span),
    False(Span),

    // Signs
    Plus(Span),
    Minus(Span),

    // Punctuation
    Eq(Span),        // =
    Semicolon(Span), // ;
    Comma(Span),     // ,
    LParen(Span),    // (
    RParen(Span),    // )
    LBrace(Span),    // {
    RBrace(Span),    // }
    LBracket(Span),  // [
    RBracket(Span),  // ]

    Eof(Span),
}

impl Token {
    /// Returns the byte span this token was read from.
    pub fn span(&self) -> Span {
        match self {
            Token::Number(_, span)
            | Token::CharLiteral(_, span)
            | Token::StringLiteral(_, span)
            | Token::Ident(_, span)
            | Token::New(span)
            | Token::Enter(span)
            | Token::Leave(span)
            | Token::Null(span)
            | Token::True(span)
            | Token::False(span)
            | Token::Plus(span)
            | Token::Minus(span)
            | Token::Eq(span)
            | Token::Semicolon(span)
            | Token::Comma(span)
            | Token::LParen(span)
            | Token::RParen(span)
            | Token::LBrace(span)
            | Token::RBrace(span)
            | Token::LBracket(span)
            | Token::RBracket(span)
            | Token::Eof(span) => *span,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n, _) => write!(f, "number literal {}", n),
            Token::CharLiteral(c, _) => write!(f, "char literal '{}'", c.escape_default()),
            Token::StringLiteral(s, _) => write!(f, "string literal \"{}\"", s.escape_default()),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::New(_) => write!(f, "'new'"),
            Token::Enter(_) => write!(f, "'enter'"),
            Token::Leave(_) => write!(f, "'leave'"),
            Token::Null(_) => write!(f, "'null'"),
            Token::True(_) => write!(f, "'true'"),
            Token::False(_) => write!(f, "'false'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Eq(_) => write!(f, "'='"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Comma(_) => write!(f, "','"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::LBracket(_) => write!(f, "'['"),
            Token::RBracket(_) => write!(f, "']'"),
            Token::Eof(_) => write!(f, "end of input"),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at position {position}")]
pub struct LexError {
    pub message: String,
    pub position: usize,
}

impl LexError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            position: offset + 1,
        }
    }
}

/// Lexer for one command line
pub struct Lexer<'a> {
    source: &'a str,
    input: Vec<(usize, char)>,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            input: source.char_indices().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input. The returned stream always ends with
    /// [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                let end = self.source.len();
                tokens.push(Token::Eof(Span::new(end, end)));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let start = self.offset();
        let ch = self
            .advance()
            .ok_or_else(|| LexError::new("Unexpected end of input", start))?;

        match ch {
            '"' => self.string_literal(start),
            '\'' => self.char_literal(start),
            '0'..='9' => Ok(self.number_literal(start)),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => Ok(self.number_literal(start)),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(start)),
            '+' => self.single(start, Token::Plus),
            '-' => self.single(start, Token::Minus),
            '=' => self.single(start, Token::Eq),
            ';' => self.single(start, Token::Semicolon),
            ',' => self.single(start, Token::Comma),
            '(' => self.single(start, Token::LParen),
            ')' => self.single(start, Token::RParen),
            '{' => self.single(start, Token::LBrace),
            '}' => self.single(start, Token::RBrace),
            '[' => self.single(start, Token::LBracket),
            ']' => self.single(start, Token::RBracket),
            _ => Err(LexError::new(format!("Unexpected character: '{}'", ch), start)),
        }
    }

    fn single(&self, start: usize, token: fn(Span) -> Token) -> Result<Token, LexError> {
        Ok(token(Span::new(start, self.offset())))
    }

    fn string_literal(&mut self, start: usize) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(Token::StringLiteral(string, Span::new(start, self.offset())));
                }
                '\\' => {
                    self.advance();
                    string.push(self.escape_sequence('"')?);
                }
                _ => {
                    string.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::new("Unterminated string literal", start))
    }

    fn char_literal(&mut self, start: usize) -> Result<Token, LexError> {
        let mut contents = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '\'' => {
                    self.advance();
                    return Ok(Token::CharLiteral(contents, Span::new(start, self.offset())));
                }
                '\\' => {
                    self.advance();
                    contents.push(self.escape_sequence('\'')?);
                }
                _ => {
                    contents.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::new("Unterminated character literal", start))
    }

    /// Decode the character after a backslash. `quote` is the delimiter of the
    /// enclosing literal, which may always be escaped.
    fn escape_sequence(&mut self, quote: char) -> Result<char, LexError> {
        let at = self.offset();
        let escaped = self
            .advance()
            .ok_or_else(|| LexError::new("Unexpected end of input in escape sequence", at))?;

        match escaped {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '0' => Ok('\0'),
            '\\' => Ok('\\'),
            c if c == quote => Ok(c),
            _ => Err(LexError::new(format!("Unknown escape sequence: \\{}", escaped), at)),
        }
    }

    fn number_literal(&mut self, start: usize) -> Token {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
                // Exponent sign: 1e-5, 2.5E+3
                let is_exponent = matches!(ch, 'e' | 'E')
                    && matches!(self.peek_ahead(1), Some('+') | Some('-'))
                    && self.peek_ahead(2).is_some_and(|c| c.is_ascii_digit());
                self.advance();
                if is_exponent {
                    self.advance();
                }
            } else {
                break;
            }
        }

        let span = Span::new(start, self.offset());
        Token::Number(self.source[span.start..span.end].to_string(), span)
    }

    fn identifier_or_keyword(&mut self, start: usize) -> Token {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let span = Span::new(start, self.offset());
        match &self.source[span.start..span.end] {
            "new" => Token::New(span),
            "enter" => Token::Enter(span),
            "leave" => Token::Leave(span),
            "null" => Token::Null(span),
            "true" => Token::True(span),
            "false" => Token::False(span),
            ident => Token::Ident(ident.to_string(), span),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).map(|&(_, ch)| ch)
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).map(|&(_, ch)| ch)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Byte offset of the next unread character.
    fn offset(&self) -> usize {
        self.input
            .get(self.position)
            .map(|&(offset, _)| offset)
            .unwrap_or(self.source.len())
    }
}

/// Convenience wrapper: tokenize `source` in one call.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_declaration() {
        let tokens = tokenize("int x = 3;").unwrap();

        assert!(matches!(tokens[0], Token::Ident(ref s, _) if s == "int"));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[2], Token::Eq(_)));
        assert!(matches!(tokens[3], Token::Number(ref n, _) if n == "3"));
        assert!(matches!(tokens[4], Token::Semicolon(_)));
        assert!(matches!(tokens[5], Token::Eof(_)));
    }

    #[test]
    fn test_keywords() {
        let tokens = tokenize("new enter leave null true false newer").unwrap();

        assert!(matches!(tokens[0], Token::New(_)));
        assert!(matches!(tokens[1], Token::Enter(_)));
        assert!(matches!(tokens[2], Token::Leave(_)));
        assert!(matches!(tokens[3], Token::Null(_)));
        assert!(matches!(tokens[4], Token::True(_)));
        assert!(matches!(tokens[5], Token::False(_)));
        assert!(matches!(tokens[6], Token::Ident(ref s, _) if s == "newer"));
    }

    #[test]
    fn test_numbers_keep_raw_text() {
        let tokens = tokenize("1.5e-3 42abc .5").unwrap();

        assert!(matches!(tokens[0], Token::Number(ref n, _) if n == "1.5e-3"));
        assert!(matches!(tokens[1], Token::Number(ref n, _) if n == "42abc"));
        assert!(matches!(tokens[2], Token::Number(ref n, _) if n == ".5"));
    }

    #[test]
    fn test_string_literal() {
        let tokens = tokenize(r#""Ana, \"la\"\n""#).unwrap();

        match &tokens[0] {
            Token::StringLiteral(s, span) => {
                assert_eq!(s, "Ana, \"la\"\n");
                assert_eq!(span.start, 0);
            }
            other => panic!("Expected string literal, got {other:?}"),
        }
    }

    #[test]
    fn test_char_literal_keeps_length() {
        let tokens = tokenize(r"'a' 'ab' '\n' ''").unwrap();

        assert!(matches!(tokens[0], Token::CharLiteral(ref c, _) if c == "a"));
        assert!(matches!(tokens[1], Token::CharLiteral(ref c, _) if c == "ab"));
        assert!(matches!(tokens[2], Token::CharLiteral(ref c, _) if c == "\n"));
        assert!(matches!(tokens[3], Token::CharLiteral(ref c, _) if c.is_empty()));
    }

    #[test]
    fn test_spans_slice_source() {
        let source = "object p = new object(nombre = \"Ana\");";
        let tokens = tokenize(source).unwrap();
        let span = tokens[4].span();

        assert_eq!(&source[span.start..span.end], "object");
    }

    #[test]
    fn test_errors() {
        assert_eq!(tokenize("int x = @;").unwrap_err().position, 9);
        assert!(tokenize("String s = \"open;").is_err());
        assert!(tokenize(r"char c = '\q';").is_err());
    }
}
