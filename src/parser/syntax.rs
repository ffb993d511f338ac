//! Statement shape checks
//!
//! [`check`] decides whether a declaration line has one of the supported
//! shapes and extracts its fields as raw text. It judges structure only:
//! literal typing and ranges belong to
//! [`type_system`](crate::interpreter::type_system).
//!
//! # Shapes
//!
//! ```text
//! object      ::= type ident "=" ("new" ident)? "(" attribute ("," attribute)* ")" ";"
//! array       ::= type "[" "]" ident "=" "{" element ("," element)* "}" ";"
//! scalar      ::= type ident "=" value ";"
//! attribute   ::= type? ident "=" value
//! assignment  ::= ident "=" value ";"
//! scope       ::= "enter" ident "(" ... ")" ";" | "leave" ";"
//! ```
//!
//! Rules are applied in order and the first failure is reported:
//! empty input, missing `;`, shape recognition (object, then array, then
//! scalar), identifier grammar, chained `=`, empty values, and the `char`
//! single-character rule.

use super::ast::{AttributeSpec, CommandShape, ParsedFields, PrimitiveType, ValueSource};
use super::lexer::{tokenize, LexError, Span, Token};
use std::mem::discriminant;

/// Syntax error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("empty command")]
    Empty,

    #[error("missing terminator ';'")]
    MissingTerminator,

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found} at position {position}")]
    Expected {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("invalid identifier: expected {what}, found {found} at position {position}")]
    InvalidIdentifier {
        what: String,
        found: String,
        position: usize,
    },

    #[error("missing value after '='")]
    EmptyValue,

    #[error("unexpected '=' in value at position {position}; chained assignment is not supported")]
    ChainedAssignment { position: usize },

    #[error("char value must be exactly one character in single quotes, found {found}")]
    CharLiteral { found: String },

    #[error("empty attribute list; a constructor needs at least one attribute")]
    EmptyAttributeList,

    #[error("empty attribute #{index} in attribute list")]
    EmptyAttribute { index: usize },

    #[error("malformed attribute '{attribute}'; expected 'Type name = value'")]
    MalformedAttribute { attribute: String },

    #[error("empty element list; an array needs at least one element")]
    EmptyArray,

    #[error("empty array element #{index}")]
    EmptyElement { index: usize },

    #[error("unclosed '{open}' at position {position}")]
    Unclosed { open: char, position: usize },

    #[error("unexpected {found} after ';' at position {position}")]
    TrailingTokens { found: String, position: usize },
}

/// Check a declaration line and extract its fields.
pub fn check(line: &str) -> Result<ParsedFields, SyntaxError> {
    require_terminated(line)?;
    Cursor::new(line)?.declaration()
}

/// Classify a command line for dispatch: scope control, then pure assignment,
/// then declaration.
///
/// Lines that cannot be classified (empty, unterminated, untokenizable) are
/// reported as [`CommandShape::Declaration`] so that [`check`] produces the
/// diagnostic.
pub fn classify(line: &str) -> Result<CommandShape, SyntaxError> {
    if require_terminated(line).is_err() {
        return Ok(CommandShape::Declaration);
    }
    let Ok(mut cursor) = Cursor::new(line) else {
        return Ok(CommandShape::Declaration);
    };

    let first = cursor.peek().clone();
    match first {
        Token::Enter(_) => cursor.enter_command(),
        Token::Leave(_) => cursor.leave_command(),
        // `int = 3;` is a declaration missing its name, not an assignment
        Token::Ident(name, _)
            if PrimitiveType::from_name(&name).is_none() && matches!(cursor.peek_ahead(1), Token::Eq(_)) =>
        {
            cursor.assignment_command()
        }
        _ => Ok(CommandShape::Declaration),
    }
}

/// Decide what a right-hand side denotes: a variable, `null`, a constructor
/// call, or a literal to be typed against the target.
pub fn value_source(text: &str) -> Result<ValueSource, SyntaxError> {
    let text = text.trim();
    let mut cursor = Cursor::new(text)?;

    match (cursor.peek().clone(), cursor.peek_ahead(1).is_eof()) {
        (Token::Ident(name, _), true) => Ok(ValueSource::Variable(name)),
        (Token::Null(_), true) => Ok(ValueSource::Null),
        (Token::New(_), _) => {
            cursor.advance();
            let type_name = cursor.expect_identifier("a constructor name after 'new'")?;
            let attributes = cursor.attribute_list()?;
            cursor.expect_token(&Token::Eof(Span::default()), "end of value after ')'")?;
            Ok(ValueSource::Construct {
                type_name,
                attributes,
            })
        }
        _ => Ok(ValueSource::Literal(text.to_string())),
    }
}

/// Parse one constructor attribute: `Type name = value` or `name = value`.
pub fn parse_attribute(text: &str) -> Result<AttributeSpec, SyntaxError> {
    let malformed = || SyntaxError::MalformedAttribute {
        attribute: text.trim().to_string(),
    };

    let mut cursor = Cursor::new(text).map_err(|_| malformed())?;
    let first = cursor.expect_identifier("an attribute name").map_err(|_| malformed())?;
    let (type_name, name) = if matches!(cursor.peek(), Token::Ident(_, _)) {
        let name = cursor.expect_identifier("an attribute name").map_err(|_| malformed())?;
        (Some(first), name)
    } else {
        (None, first)
    };
    cursor
        .expect_token(&Token::Eq(Span::default()), "'=' after the attribute name")
        .map_err(|_| malformed())?;
    let (_, value_span) = cursor.value_tokens().map_err(|_| malformed())?;
    if !cursor.peek().is_eof() {
        return Err(malformed());
    }

    Ok(AttributeSpec {
        type_name,
        name,
        value: cursor.text(value_span).to_string(),
    })
}

/// Split a list on commas that are not nested in brackets or quotes.
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }

    parts.push(&text[start..]);
    parts
}

fn require_terminated(line: &str) -> Result<(), SyntaxError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Err(SyntaxError::Empty)
    } else if !trimmed.ends_with(';') {
        Err(SyntaxError::MissingTerminator)
    } else {
        Ok(())
    }
}

/// Token cursor shared by all statement checks.
struct Cursor<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Result<Self, SyntaxError> {
        Ok(Self {
            source,
            tokens: tokenize(source)?,
            position: 0,
        })
    }

    // ===== Statement shapes =====

    fn declaration(&mut self) -> Result<ParsedFields, SyntaxError> {
        let type_name = self.expect_identifier("a type name")?;

        if self.match_token(&Token::LBracket(Span::default())) {
            self.expect_token(&Token::RBracket(Span::default()), "']' after '['")?;
            let name = self.expect_identifier("a variable name")?;
            self.expect_token(&Token::Eq(Span::default()), "'=' after the variable name")?;
            return self.array_body(type_name, name);
        }

        let name = self.expect_identifier("a variable name")?;
        self.expect_token(&Token::Eq(Span::default()), "'=' after the variable name")?;

        if matches!(self.peek(), Token::LParen(_) | Token::New(_)) {
            self.object_body(type_name, name)
        } else {
            self.scalar_body(type_name, name)
        }
    }

    fn object_body(&mut self, type_name: String, name: String) -> Result<ParsedFields, SyntaxError> {
        let constructor = if self.match_token(&Token::New(Span::default())) {
            Some(self.expect_identifier("a constructor name after 'new'")?)
        } else {
            None
        };
        let attributes = self.attribute_list()?;
        self.expect_end()?;

        Ok(ParsedFields::Object {
            type_name,
            name,
            constructor,
            attributes,
        })
    }

    fn array_body(&mut self, element_type: String, name: String) -> Result<ParsedFields, SyntaxError> {
        let open = self.expect_token(&Token::LBrace(Span::default()), "'{' to open the element list")?;
        let inner = self.balanced(open, '{')?;
        self.expect_end()?;

        let elements = self.text(inner).trim();
        if elements.is_empty() {
            return Err(SyntaxError::EmptyArray);
        }
        for (index, element) in split_top_level(elements).iter().enumerate() {
            if element.trim().is_empty() {
                return Err(SyntaxError::EmptyElement { index: index + 1 });
            }
        }

        Ok(ParsedFields::Array {
            element_type,
            name,
            elements: elements.to_string(),
        })
    }

    fn scalar_body(&mut self, type_name: String, name: String) -> Result<ParsedFields, SyntaxError> {
        let (tokens, span) = self.value_tokens()?;
        self.expect_end()?;
        let value = self.text(span).to_string();

        if type_name == "char" {
            let single_char = matches!(
                tokens.as_slice(),
                [Token::CharLiteral(c, _)] if c.chars().count() == 1
            );
            if !single_char {
                return Err(SyntaxError::CharLiteral { found: value });
            }
        }

        Ok(ParsedFields::Scalar {
            type_name,
            name,
            value,
        })
    }

    fn enter_command(&mut self) -> Result<CommandShape, SyntaxError> {
        self.advance();
        let name = self.expect_identifier("a frame name after 'enter'")?;
        let open = self.expect_token(&Token::LParen(Span::default()), "'(' after the frame name")?;
        self.balanced(open, '(')?;
        self.expect_end()?;
        Ok(CommandShape::Enter { name })
    }

    fn leave_command(&mut self) -> Result<CommandShape, SyntaxError> {
        self.advance();
        self.expect_end()?;
        Ok(CommandShape::Leave)
    }

    fn assignment_command(&mut self) -> Result<CommandShape, SyntaxError> {
        let target = self.expect_identifier("a variable name")?;
        self.advance(); // '='
        let (_, span) = self.value_tokens()?;
        self.expect_end()?;
        Ok(CommandShape::Assignment {
            target,
            value: self.text(span).to_string(),
        })
    }

    /// `"(" attributes ")"`, returning the trimmed attribute text after
    /// checking that every entry has the attribute shape.
    fn attribute_list(&mut self) -> Result<String, SyntaxError> {
        let open = self.expect_token(&Token::LParen(Span::default()), "'(' to open the attribute list")?;
        let inner = self.balanced(open, '(')?;
        let attributes = self.text(inner).trim();

        if attributes.is_empty() {
            return Err(SyntaxError::EmptyAttributeList);
        }
        for (index, attribute) in split_top_level(attributes).iter().enumerate() {
            if attribute.trim().is_empty() {
                return Err(SyntaxError::EmptyAttribute { index: index + 1 });
            }
            parse_attribute(attribute)?;
        }

        Ok(attributes.to_string())
    }

    /// Collect right-hand-side tokens up to `;` or end of input. An `=` outside
    /// any brackets is a chained assignment.
    fn value_tokens(&mut self) -> Result<(Vec<Token>, Span), SyntaxError> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;

        while !matches!(self.peek(), Token::Semicolon(_) | Token::Eof(_)) {
            match self.peek() {
                Token::Eq(span) if depth == 0 => {
                    return Err(SyntaxError::ChainedAssignment {
                        position: span.position(),
                    });
                }
                Token::LParen(_) | Token::LBrace(_) | Token::LBracket(_) => depth += 1,
                Token::RParen(_) | Token::RBrace(_) | Token::RBracket(_) => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            tokens.push(self.advance().clone());
        }

        match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => {
                let span = Span::new(first.span().start, last.span().end);
                Ok((tokens, span))
            }
            _ => Err(SyntaxError::EmptyValue),
        }
    }

    /// Consume tokens through the bracket matching `open` (already consumed)
    /// and return the span strictly between the pair.
    fn balanced(&mut self, open: Span, open_char: char) -> Result<Span, SyntaxError> {
        let (opener, closer) = match open_char {
            '(' => (Token::LParen(Span::default()), Token::RParen(Span::default())),
            '[' => (Token::LBracket(Span::default()), Token::RBracket(Span::default())),
            _ => (Token::LBrace(Span::default()), Token::RBrace(Span::default())),
        };
        let mut depth = 0usize;

        loop {
            if self.peek().is_eof() {
                return Err(SyntaxError::Unclosed {
                    open: open_char,
                    position: open.position(),
                });
            }
            if self.check(&opener) {
                depth += 1;
            } else if self.check(&closer) {
                if depth == 0 {
                    let close = self.advance().span();
                    return Ok(Span::new(open.end, close.start));
                }
                depth -= 1;
            }
            self.advance();
        }
    }

    /// `;` followed by end of input.
    fn expect_end(&mut self) -> Result<(), SyntaxError> {
        self.expect_token(&Token::Semicolon(Span::default()), "';'")?;
        if !self.peek().is_eof() {
            return Err(SyntaxError::TrailingTokens {
                found: self.peek().to_string(),
                position: self.peek().span().position(),
            });
        }
        Ok(())
    }

    // ===== Helper methods =====

    fn text(&self, span: Span) -> &'a str {
        &self.source[span.start..span.end]
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek_ahead(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + n).min(last)]
    }

    fn advance(&mut self) -> &Token {
        let index = self.position;
        if !self.tokens[index].is_eof() {
            self.position += 1;
        }
        &self.tokens[index]
    }

    fn check(&self, token: &Token) -> bool {
        discriminant(self.peek()) == discriminant(token)
    }

    fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, token: &Token, expected: &str) -> Result<Span, SyntaxError> {
        if self.check(token) {
            if token.is_eof() {
                return Ok(self.peek().span());
            }
            Ok(self.advance().span())
        } else {
            Err(SyntaxError::Expected {
                expected: expected.to_string(),
                found: self.peek().to_string(),
                position: self.peek().span().position(),
            })
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String, SyntaxError> {
        match self.peek().clone() {
            Token::Ident(name, _) => {
                self.advance();
                Ok(name)
            }
            token @ (Token::Number(..)
            | Token::New(_)
            | Token::Enter(_)
            | Token::Leave(_)
            | Token::Null(_)
            | Token::True(_)
            | Token::False(_)) => Err(SyntaxError::InvalidIdentifier {
                what: what.to_string(),
                found: token.to_string(),
                position: token.span().position(),
            }),
            token => Err(SyntaxError::Expected {
                expected: what.to_string(),
                found: token.to_string(),
                position: token.span().position(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalar_declaration() {
        assert_eq!(
            check("int x = 3;").unwrap(),
            ParsedFields::Scalar {
                type_name: "int".into(),
                name: "x".into(),
                value: "3".into(),
            }
        );
        assert_eq!(
            check("  double d = -1.5e3 ;  ").unwrap(),
            ParsedFields::Scalar {
                type_name: "double".into(),
                name: "d".into(),
                value: "-1.5e3".into(),
            }
        );
    }

    #[test]
    fn test_empty_and_unterminated() {
        assert_eq!(check("   ").unwrap_err(), SyntaxError::Empty);
        assert_eq!(check("int x = 3").unwrap_err(), SyntaxError::MissingTerminator);
        assert_eq!(check("int x = 3").unwrap_err().to_string(), "missing terminator ';'");
    }

    #[test]
    fn test_identifier_grammar() {
        assert!(matches!(
            check("int 2x = 3;").unwrap_err(),
            SyntaxError::InvalidIdentifier { .. }
        ));
        assert!(matches!(
            check("int new = 3;").unwrap_err(),
            SyntaxError::InvalidIdentifier { .. }
        ));
        assert!(matches!(check("int = 3;").unwrap_err(), SyntaxError::Expected { .. }));
        assert!(check("int _under_score1 = 3;").is_ok());
    }

    #[test]
    fn test_chained_and_empty_value() {
        assert!(matches!(
            check("int x = y = 3;").unwrap_err(),
            SyntaxError::ChainedAssignment { .. }
        ));
        assert_eq!(check("int x = ;").unwrap_err(), SyntaxError::EmptyValue);
    }

    #[test]
    fn test_char_rule() {
        assert!(check("char c = 'a';").is_ok());
        assert!(check(r"char c = '\n';").is_ok());
        assert_eq!(
            check("char c = 'ab';").unwrap_err(),
            SyntaxError::CharLiteral { found: "'ab'".into() }
        );
        assert!(matches!(check("char c = a;").unwrap_err(), SyntaxError::CharLiteral { .. }));
        assert!(matches!(check("char c = '';").unwrap_err(), SyntaxError::CharLiteral { .. }));
    }

    #[test]
    fn test_object_shapes() {
        assert_eq!(
            check("object p1 = new object(nombre = \"Ana\");").unwrap(),
            ParsedFields::Object {
                type_name: "object".into(),
                name: "p1".into(),
                constructor: Some("object".into()),
                attributes: "nombre = \"Ana\"".into(),
            }
        );
        assert_eq!(
            check("Persona p = (String nombre = \"Ana, B\", int edad = 30);").unwrap(),
            ParsedFields::Object {
                type_name: "Persona".into(),
                name: "p".into(),
                constructor: None,
                attributes: "String nombre = \"Ana, B\", int edad = 30".into(),
            }
        );
    }

    #[test]
    fn test_object_rejections() {
        assert_eq!(
            check("object p = new object();").unwrap_err(),
            SyntaxError::EmptyAttributeList
        );
        assert_eq!(
            check("object p = (int a = 1,);").unwrap_err(),
            SyntaxError::EmptyAttribute { index: 2 }
        );
        assert_eq!(
            check("object p = (int a 1);").unwrap_err(),
            SyntaxError::MalformedAttribute { attribute: "int a 1".into() }
        );
        assert!(matches!(
            check("object p = new object(a = 1;").unwrap_err(),
            SyntaxError::Unclosed { open: '(', .. }
        ));
    }

    #[test]
    fn test_array_shapes() {
        assert_eq!(
            check("int[] xs = {1, 2, 3};").unwrap(),
            ParsedFields::Array {
                element_type: "int".into(),
                name: "xs".into(),
                elements: "1, 2, 3".into(),
            }
        );
        assert_eq!(check("int[] xs = {};").unwrap_err(), SyntaxError::EmptyArray);
        assert_eq!(check("int[] xs = {  };").unwrap_err(), SyntaxError::EmptyArray);
        assert_eq!(
            check("int[] xs = {1, , 3};").unwrap_err(),
            SyntaxError::EmptyElement { index: 2 }
        );
    }

    #[test]
    fn test_trailing_statement() {
        assert!(matches!(
            check("int x = 3; int y = 4;").unwrap_err(),
            SyntaxError::TrailingTokens { .. }
        ));
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify("enter foo();").unwrap(),
            CommandShape::Enter { name: "foo".into() }
        );
        assert_eq!(
            classify("enter foo(int a, 3);").unwrap(),
            CommandShape::Enter { name: "foo".into() }
        );
        assert_eq!(classify("leave;").unwrap(), CommandShape::Leave);
        assert_eq!(
            classify("x = y;").unwrap(),
            CommandShape::Assignment {
                target: "x".into(),
                value: "y".into(),
            }
        );
        assert_eq!(
            classify("p = new object(a = 1);").unwrap(),
            CommandShape::Assignment {
                target: "p".into(),
                value: "new object(a = 1)".into(),
            }
        );
        assert_eq!(classify("int x = 3;").unwrap(), CommandShape::Declaration);
        assert_eq!(classify("int = 3;").unwrap(), CommandShape::Declaration);
        assert_eq!(classify("String = \"a\";").unwrap(), CommandShape::Declaration);
        assert_eq!(
            check("int = 3;").unwrap_err(),
            SyntaxError::Expected {
                expected: "a variable name".into(),
                found: "'='".into(),
                position: 5,
            }
        );
        assert_eq!(classify("leave").unwrap(), CommandShape::Declaration);
        assert!(classify("leave now;").is_err());
        assert!(classify("enter 3();").is_err());
        assert!(matches!(
            classify("x = y = 2;").unwrap_err(),
            SyntaxError::ChainedAssignment { .. }
        ));
    }

    #[test]
    fn test_value_source() {
        assert_eq!(value_source(" y ").unwrap(), ValueSource::Variable("y".into()));
        assert_eq!(value_source("null").unwrap(), ValueSource::Null);
        assert_eq!(value_source("-3").unwrap(), ValueSource::Literal("-3".into()));
        assert_eq!(value_source("true").unwrap(), ValueSource::Literal("true".into()));
        assert_eq!(
            value_source("new object(id = 7)").unwrap(),
            ValueSource::Construct {
                type_name: "object".into(),
                attributes: "id = 7".into(),
            }
        );
        assert_eq!(
            value_source("new object()").unwrap_err(),
            SyntaxError::EmptyAttributeList
        );
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("a = \"x, y\", b = ',', c = (1, 2)"),
            vec!["a = \"x, y\"", " b = ','", " c = (1, 2)"]
        );
        assert_eq!(split_top_level("one"), vec!["one"]);
    }

    #[test]
    fn test_parse_attribute() {
        assert_eq!(
            parse_attribute(" int edad = 30 ").unwrap(),
            AttributeSpec {
                type_name: Some("int".into()),
                name: "edad".into(),
                value: "30".into(),
            }
        );
        assert_eq!(
            parse_attribute("nombre = \"Ana\"").unwrap(),
            AttributeSpec {
                type_name: None,
                name: "nombre".into(),
                value: "\"Ana\"".into(),
            }
        );
        assert!(parse_attribute("= 3").is_err());
        assert!(parse_attribute("a = b = 3").is_err());
        assert!(parse_attribute("a =").is_err());
    }
}
