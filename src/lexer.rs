/// Represents the different kinds of tokens the JSON lexer can produce.
#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    // == Special Tokens ==
    /// Represents the end of the input.
    Eof,
    /// A run of JSON whitespace (space, tab, newline, carriage return).
    Whitespace,
    /// Anything that is not valid JSON: unclosed strings, bad escapes,
    /// malformed numbers, stray characters.
    Unknown,

    // == Literals ==
    /// A string literal. The associated `String` holds the decoded content.
    String(String),
    /// A number literal, kept exactly as written.
    Number(String),

    // == Keywords ==
    True,
    False,
    Null,

    // == Punctuation ==
    /// Left Brace: `{`
    LBrace,
    /// Right Brace: `}`
    RBrace,
    /// Left Bracket: `[`
    LBracket,
    /// Right Bracket: `]`
    RBracket,
    /// Comma: `,`
    Comma,
    /// Colon: `:`
    Colon,
}

/// A token with its type and byte position
#[derive(Debug, Clone)]
pub struct Token {
    pub ttype: TokenType,
    pub pos_start: usize,
    pub pos_end: usize,
}

impl Token {
    pub fn new(ttype: TokenType, pos_start: usize, pos_end: usize) -> Token {
        Token {
            ttype,
            pos_start,
            pos_end,
        }
    }
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    pub fn lex(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if token.ttype == TokenType::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    pub fn next_token(&mut self) -> Token {
        let start_pos = self.position;

        let ttype = if let Some(char) = self.advance() {
            match char {
                '{' => TokenType::LBrace,
                '}' => TokenType::RBrace,
                '[' => TokenType::LBracket,
                ']' => TokenType::RBracket,
                ',' => TokenType::Comma,
                ':' => TokenType::Colon,
                '"' => self.read_string(),
                ' ' | '\t' | '\n' | '\r' => self.read_whitespace(),
                c if c.is_ascii_alphabetic() => self.read_keyword(c),
                c if c.is_ascii_digit() || c == '-' => self.read_number(c),
                _ => TokenType::Unknown,
            }
        } else {
            TokenType::Eof
        };

        Token::new(ttype, start_pos, self.position)
    }

    fn advance(&mut self) -> Option<char> {
        let char = self.chars.next();
        if let Some(c) = char {
            self.position += c.len_utf8();
        }
        char
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn read_whitespace(&mut self) -> TokenType {
        while let Some(' ' | '\t' | '\n' | '\r') = self.peek() {
            self.advance();
        }
        TokenType::Whitespace
    }

    fn read_string(&mut self) -> TokenType {
        let mut value = String::new();
        while let Some(c) = self.advance() {
            match c {
                '"' => return TokenType::String(value),
                '\\' => match self.read_escape() {
                    Some(decoded) => value.push(decoded),
                    None => return self.skip_rest_of_string(),
                },
                // Raw control characters are not allowed inside JSON strings.
                c if (c as u32) < 0x20 => return TokenType::Unknown,
                c => value.push(c),
            }
        }
        TokenType::Unknown // Unclosed string
    }

    fn read_escape(&mut self) -> Option<char> {
        let decoded = match self.advance()? {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => return self.read_unicode_escape(),
            _ => return None,
        };
        Some(decoded)
    }

    fn read_unicode_escape(&mut self) -> Option<char> {
        let high = self.read_hex4()?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high);
        }
        // High surrogate: a `\uXXXX` low surrogate must follow.
        if self.advance()? != '\\' || self.advance()? != 'u' {
            return None;
        }
        let low = self.read_hex4()?;
        if !(0xDC00..0xE000).contains(&low) {
            return None;
        }
        char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
    }

    fn read_hex4(&mut self) -> Option<u32> {
        let mut code = 0;
        for _ in 0..4 {
            code = code * 16 + self.advance()?.to_digit(16)?;
        }
        Some(code)
    }

    /// Consumes up to the closing quote of a string with a bad escape, so the
    /// error token covers the whole literal.
    fn skip_rest_of_string(&mut self) -> TokenType {
        while let Some(c) = self.advance() {
            match c {
                '"' | '\n' => break,
                '\\' => {
                    self.advance();
                }
                _ => {}
            }
        }
        TokenType::Unknown
    }

    fn read_keyword(&mut self, first_char: char) -> TokenType {
        let mut word = String::new();
        word.push(first_char);

        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }

        match word.as_str() {
            "true" => TokenType::True,
            "false" => TokenType::False,
            "null" => TokenType::Null,
            _ => TokenType::Unknown,
        }
    }

    /// Number ::= [ "-" ] Int [ Frac ] [ Exp ]
    fn read_number(&mut self, first_char: char) -> TokenType {
        let mut literal = String::new();
        literal.push(first_char);

        let leading = if first_char == '-' {
            match self.advance() {
                Some(c) if c.is_ascii_digit() => {
                    literal.push(c);
                    c
                }
                _ => return TokenType::Unknown,
            }
        } else {
            first_char
        };

        if leading == '0' {
            // A leading zero may not be followed by more digits.
            if self.read_digits(&mut literal) > 0 {
                return TokenType::Unknown;
            }
        } else {
            self.read_digits(&mut literal);
        }

        if self.peek() == Some('.') {
            literal.push('.');
            self.advance();
            if self.read_digits(&mut literal) == 0 {
                return TokenType::Unknown;
            }
        }

        if let Some(e @ ('e' | 'E')) = self.peek() {
            literal.push(e);
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                literal.push(sign);
                self.advance();
            }
            if self.read_digits(&mut literal) == 0 {
                return TokenType::Unknown;
            }
        }

        TokenType::Number(literal)
    }

    fn read_digits(&mut self, literal: &mut String) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            literal.push(c);
            self.advance();
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_types(input: &str) -> Vec<TokenType> {
        Lexer::new(input)
            .lex()
            .into_iter()
            .map(|t| t.ttype)
            .filter(|t| *t != TokenType::Whitespace)
            .collect()
    }

    #[test]
    fn test_punctuation_and_keywords() {
        assert_eq!(
            lex_types("{ } [ ] , : true false null"),
            vec![
                TokenType::LBrace,
                TokenType::RBrace,
                TokenType::LBracket,
                TokenType::RBracket,
                TokenType::Comma,
                TokenType::Colon,
                TokenType::True,
                TokenType::False,
                TokenType::Null,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            lex_types("0 -12 3.25 1e10 -0.5E-3"),
            vec![
                TokenType::Number("0".into()),
                TokenType::Number("-12".into()),
                TokenType::Number("3.25".into()),
                TokenType::Number("1e10".into()),
                TokenType::Number("-0.5E-3".into()),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_malformed_numbers() {
        assert_eq!(lex_types("01")[0], TokenType::Unknown);
        assert_eq!(lex_types("1.")[0], TokenType::Unknown);
        assert_eq!(lex_types("-")[0], TokenType::Unknown);
        assert_eq!(lex_types("2e")[0], TokenType::Unknown);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            lex_types(r#""a\"b\\c\né😀""#)[0],
            TokenType::String("a\"b\\c\né😀".into())
        );
        assert_eq!(lex_types(r#""bad \x escape""#)[0], TokenType::Unknown);
        assert_eq!(lex_types("\"unclosed")[0], TokenType::Unknown);
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let tokens = Lexer::new("{\"é\": 10}").lex();
        let key = &tokens[1];
        assert_eq!(key.ttype, TokenType::String("é".into()));
        assert_eq!((key.pos_start, key.pos_end), (1, 5));
        let number = tokens
            .iter()
            .find(|t| matches!(t.ttype, TokenType::Number(_)))
            .unwrap();
        assert_eq!((number.pos_start, number.pos_end), (7, 9));
    }

    #[test]
    fn test_unknown_words() {
        assert_eq!(lex_types("undefined")[0], TokenType::Unknown);
        assert_eq!(lex_types("// comment")[0], TokenType::Unknown);
    }
}
