use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::{Lexer, Token, TokenType};
use miette::NamedSource;
use std::sync::Arc;

/// How many objects and arrays may enclose a value, the same limit
/// `serde_json` applies.
pub const MAX_NESTING_DEPTH: usize = 128;

/// A recursive descent parser for strict JSON that records the byte span of
/// every value and key.
#[derive(Debug)]
pub struct Parser<'a> {
    source: Arc<NamedSource<String>>,
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
    source_text: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(source_text: &'a str) -> Self {
        Self::new_with_name(source_text, "document.json".to_string())
    }

    pub fn new_with_name(source_text: &'a str, name: String) -> Self {
        let source = Arc::new(NamedSource::new(name, source_text.to_string()));
        let mut lexer = Lexer::new(source_text);
        let tokens: Vec<Token> = lexer
            .lex()
            .into_iter()
            .filter(|t| t.ttype != TokenType::Whitespace)
            .collect();

        Self {
            source,
            tokens,
            position: 0,
            depth: 0,
            source_text,
        }
    }

    // === Main Parsing Methods ===

    ///    Document ::= Value EOF
    pub fn parse_document(&mut self) -> Result<JsonDocument, ParserError> {
        let root = self.parse_value()?;
        self.expect(TokenType::Eof, "end of input")?;
        Ok(JsonDocument { root })
    }

    /// Object ::= "{" [ Member { "," Member } ] "}"
    fn parse_object(&mut self) -> Result<JsonValue, ParserError> {
        let start_token = self.current_token()?.clone();
        self.enter(&start_token)?;
        self.expect(TokenType::LBrace, "'{'")?;
        let mut members = Vec::new();
        if !self.check(TokenType::RBrace) {
            members.push(self.parse_member()?);
            // JSON has no trailing commas: a comma must be followed by a member.
            while self.match_token(TokenType::Comma) {
                members.push(self.parse_member()?);
            }
        }
        let end_token = self.current_token()?.clone();
        self.expect(TokenType::RBrace, "',' or '}'")?;
        self.depth -= 1;
        Ok(JsonValue {
            kind: JsonValueKind::Object(members),
            pos_start: start_token.pos_start,
            pos_end: end_token.pos_end,
        })
    }

    /// Array ::= "[" [ Value { "," Value } ] "]"
    fn parse_array(&mut self) -> Result<JsonValue, ParserError> {
        let start_token = self.current_token()?.clone();
        self.enter(&start_token)?;
        self.expect(TokenType::LBracket, "'['")?;
        let mut values = Vec::new();
        if !self.check(TokenType::RBracket) {
            values.push(self.parse_value()?);
            while self.match_token(TokenType::Comma) {
                values.push(self.parse_value()?);
            }
        }
        let end_token = self.current_token()?.clone();
        self.expect(TokenType::RBracket, "',' or ']'")?;
        self.depth -= 1;
        Ok(JsonValue {
            kind: JsonValueKind::Array(values),
            pos_start: start_token.pos_start,
            pos_end: end_token.pos_end,
        })
    }

    /// Value ::= Object | Array | String | Number | "true" | "false" | "null"
    fn parse_value(&mut self) -> Result<JsonValue, ParserError> {
        let start_token = self.current_token()?.clone();

        let kind = match start_token.ttype {
            TokenType::LBrace => return self.parse_object(),
            TokenType::LBracket => return self.parse_array(),
            TokenType::String(s) => JsonValueKind::String(s),
            TokenType::Number(n) => JsonValueKind::Number(n),
            TokenType::True => JsonValueKind::Boolean(true),
            TokenType::False => JsonValueKind::Boolean(false),
            TokenType::Null => JsonValueKind::Null,
            _ => return self.err_unexpected("a value"),
        };
        self.advance();

        Ok(JsonValue {
            kind,
            pos_start: start_token.pos_start,
            pos_end: start_token.pos_end,
        })
    }

    /// Member ::= String ":" Value
    fn parse_member(&mut self) -> Result<Property, ParserError> {
        let key_token = self.current_token()?.clone();
        let key = match key_token.ttype {
            TokenType::String(key) => key,
            _ => return self.err_unexpected("a string key"),
        };
        self.advance();
        self.expect(TokenType::Colon, "':'")?;
        let value = self.parse_value()?;
        Ok(Property {
            key,
            key_start: key_token.pos_start,
            key_end: key_token.pos_end,
            value,
        })
    }

    // === Tokenizer Helper Methods ===

    fn current_token(&self) -> Result<&Token, ParserError> {
        self.tokens
            .get(self.position)
            .ok_or_else(|| ParserError::UnexpectedEof {
                src: (*self.source).clone(),
                span: (self.source_text.len(), 0).into(),
            })
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: TokenType, description: &str) -> Result<(), ParserError> {
        if self.check(expected) {
            self.advance();
            Ok(())
        } else {
            self.err_unexpected(description)
        }
    }

    fn match_token(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, ttype: TokenType) -> bool {
        if let Ok(token) = self.current_token() {
            std::mem::discriminant(&token.ttype) == std::mem::discriminant(&ttype)
        } else {
            false
        }
    }

    fn enter(&mut self, container: &Token) -> Result<(), ParserError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParserError::NestingTooDeep {
                src: (*self.source).clone(),
                span: (container.pos_start, container.pos_end - container.pos_start).into(),
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn err_unexpected<T>(&self, expected: &str) -> Result<T, ParserError> {
        let token = self.current_token()?;
        let span = (token.pos_start, token.pos_end - token.pos_start).into();
        let src = (*self.source).clone();
        Err(match token.ttype {
            TokenType::Eof => ParserError::UnexpectedEof { src, span },
            TokenType::Unknown => ParserError::InvalidToken { src, span },
            _ => ParserError::UnexpectedToken {
                src,
                span,
                expected: expected.to_string(),
            },
        })
    }
}
