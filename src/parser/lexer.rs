//! Lexer (tokenizer) for one logical line
//!
//! A single tokenizer serves all three languages; the [`Language`] only
//! switches the lexical rules that differ between them:
//!
//! - comment marker (`#` for Python, `//` and `/* */` for the brace family)
//! - single quotes (strings in Python, character literals in Java/C++)
//! - string prefixes (`f"..."`, `r"..."`) which only exist in Python
//!
//! Keywords are not separate tokens. They stay [`Token::Ident`] and the
//! statement classifier decides what they mean for the language at hand.

use super::language::Language;
use std::fmt;
use thiserror::Error;

/// All token variants produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Int(i64),
    /// Integer literal too large for `i64`, kept as its digits
    BigInt(String),
    Float(f64),
    Str(String),
    /// Python f-string body, escapes decoded, braces untouched
    FStr(String),
    Char(char),

    Ident(String),

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    Percent,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    AndAnd,
    OrOr,
    Bang,

    // Stream operators
    LtLt,
    GtGt,

    // Assignment
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,

    PlusPlus,
    MinusMinus,

    Dot,
    Arrow,
    Question,
    Colon,
    ColonColon,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Amp,
    Pipe,
}

impl Token {
    /// Whether this token opens a bracketed group
    pub fn is_open(&self) -> bool {
        matches!(self, Token::LParen | Token::LBracket | Token::LBrace)
    }

    /// Whether this token closes a bracketed group
    pub fn is_close(&self) -> bool {
        matches!(self, Token::RParen | Token::RBracket | Token::RBrace)
    }

    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, Token::Ident(s) if s == name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(n) => write!(f, "{n}"),
            Token::BigInt(digits) => f.write_str(digits),
            Token::Float(x) => write!(f, "{x:?}"),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::FStr(s) => write!(f, "f{s:?}"),
            Token::Char(c) => write!(f, "{c:?}"),
            Token::Ident(s) => f.write_str(s),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::SlashSlash => f.write_str("//"),
            Token::Percent => f.write_str("%"),
            Token::EqEq => f.write_str("=="),
            Token::NotEq => f.write_str("!="),
            Token::Lt => f.write_str("<"),
            Token::Le => f.write_str("<="),
            Token::Gt => f.write_str(">"),
            Token::Ge => f.write_str(">="),
            Token::AndAnd => f.write_str("&&"),
            Token::OrOr => f.write_str("||"),
            Token::Bang => f.write_str("!"),
            Token::LtLt => f.write_str("<<"),
            Token::GtGt => f.write_str(">>"),
            Token::Eq => f.write_str("="),
            Token::PlusEq => f.write_str("+="),
            Token::MinusEq => f.write_str("-="),
            Token::StarEq => f.write_str("*="),
            Token::SlashEq => f.write_str("/="),
            Token::PercentEq => f.write_str("%="),
            Token::PlusPlus => f.write_str("++"),
            Token::MinusMinus => f.write_str("--"),
            Token::Dot => f.write_str("."),
            Token::Arrow => f.write_str("->"),
            Token::Question => f.write_str("?"),
            Token::Colon => f.write_str(":"),
            Token::ColonColon => f.write_str("::"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBrace => f.write_str("{"),
            Token::RBrace => f.write_str("}"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::Semicolon => f.write_str(";"),
            Token::Comma => f.write_str(","),
            Token::Amp => f.write_str("&"),
            Token::Pipe => f.write_str("|"),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at column {column}")]
    UnexpectedChar { ch: char, column: usize },

    #[error("unterminated literal starting at column {column}")]
    Unterminated { column: usize },

    #[error("invalid numeric literal '{text}'")]
    InvalidNumber { text: String },
}

/// Tokenize one logical line
pub fn tokenize(line: &str, language: Language) -> Result<Vec<Token>, LexError> {
    Lexer::new(line, language).tokenize()
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    language: Language,
}

impl Lexer {
    pub fn new(input: &str, language: Language) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            language,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_block_comments()?;
            if self.is_at_end() || self.at_line_comment() {
                break;
            }
            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let column = self.position + 1;
        let ch = self
            .advance()
            .ok_or(LexError::Unterminated { column })?;

        match ch {
            '"' => self.string_literal('"', column).map(Token::Str),
            '\'' => {
                if self.language.is_brace_family() {
                    self.char_literal(column)
                } else {
                    self.string_literal('\'', column).map(Token::Str)
                }
            }
            '0'..='9' => self.number_literal(ch),
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_prefixed_string(ch, column),

            '+' => Ok(self.pick(&[('+', Token::PlusPlus), ('=', Token::PlusEq)], Token::Plus)),
            '-' => Ok(self.pick(
                &[('-', Token::MinusMinus), ('=', Token::MinusEq), ('>', Token::Arrow)],
                Token::Minus,
            )),
            '*' => Ok(self.pick(&[('=', Token::StarEq)], Token::Star)),
            '/' => {
                if self.language == Language::Python && self.peek() == Some('/') {
                    self.advance();
                    Ok(Token::SlashSlash)
                } else {
                    Ok(self.pick(&[('=', Token::SlashEq)], Token::Slash))
                }
            }
            '%' => Ok(self.pick(&[('=', Token::PercentEq)], Token::Percent)),
            '=' => Ok(self.pick(&[('=', Token::EqEq)], Token::Eq)),
            '!' => Ok(self.pick(&[('=', Token::NotEq)], Token::Bang)),
            '<' => Ok(self.pick(&[('=', Token::Le), ('<', Token::LtLt)], Token::Lt)),
            '>' => Ok(self.pick(&[('=', Token::Ge), ('>', Token::GtGt)], Token::Gt)),
            '&' => Ok(self.pick(&[('&', Token::AndAnd)], Token::Amp)),
            '|' => Ok(self.pick(&[('|', Token::OrOr)], Token::Pipe)),
            ':' => Ok(self.pick(&[(':', Token::ColonColon)], Token::Colon)),
            '.' => Ok(Token::Dot),
            '?' => Ok(Token::Question),
            '(' => Ok(Token::LParen),
            ')' => Ok(Token::RParen),
            '{' => Ok(Token::LBrace),
            '}' => Ok(Token::RBrace),
            '[' => Ok(Token::LBracket),
            ']' => Ok(Token::RBracket),
            ';' => Ok(Token::Semicolon),
            ',' => Ok(Token::Comma),

            _ => Err(LexError::UnexpectedChar { ch, column }),
        }
    }

    /// Consume the first matching follow-up character, or fall back to `single`
    fn pick(&mut self, pairs: &[(char, Token)], single: Token) -> Token {
        for (next, token) in pairs {
            if self.peek() == Some(*next) {
                self.advance();
                return token.clone();
            }
        }
        single
    }

    /// Body of a quoted literal; the opening quote is already consumed
    fn string_literal(&mut self, quote: char, column: usize) -> Result<String, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.advance() {
            if ch == quote {
                return Ok(string);
            }
            if ch == '\\' {
                let escaped = self.advance().ok_or(LexError::Unterminated { column })?;
                match escaped {
                    'n' => string.push('\n'),
                    't' => string.push('\t'),
                    'r' => string.push('\r'),
                    '0' => string.push('\0'),
                    '\\' | '"' | '\'' => string.push(escaped),
                    other => {
                        // Unknown escapes are kept verbatim
                        string.push('\\');
                        string.push(other);
                    }
                }
            } else {
                string.push(ch);
            }
        }

        Err(LexError::Unterminated { column })
    }

    fn raw_string_literal(&mut self, quote: char, column: usize) -> Result<String, LexError> {
        let mut string = String::new();
        while let Some(ch) = self.advance() {
            if ch == quote {
                return Ok(string);
            }
            string.push(ch);
        }
        Err(LexError::Unterminated { column })
    }

    fn char_literal(&mut self, column: usize) -> Result<Token, LexError> {
        let text = self.string_literal('\'', column)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Token::Char(c)),
            // Multi-character literals are not chars; treat them as strings
            _ => Ok(Token::Str(text)),
        }
    }

    fn number_literal(&mut self, first_digit: char) -> Result<Token, LexError> {
        let mut text = String::new();
        text.push(first_digit);
        let mut is_float = false;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '_' {
                if ch != '_' {
                    text.push(ch);
                }
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Java/C++ literal suffixes carry no value for tracing
        if self.language.is_brace_family() {
            match self.peek() {
                Some('L' | 'l') => {
                    self.advance();
                }
                Some('f' | 'F' | 'd' | 'D') => {
                    self.advance();
                    is_float = true;
                }
                _ => {}
            }
        }

        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| LexError::InvalidNumber { text })
        } else {
            // Every character is a digit here, so failure means overflow
            Ok(text.parse::<i64>().map_or(Token::BigInt(text), Token::Int))
        }
    }

    fn identifier_or_prefixed_string(
        &mut self,
        first_char: char,
        column: usize,
    ) -> Result<Token, LexError> {
        if self.language == Language::Python {
            if let Some(quote @ ('"' | '\'')) = self.peek() {
                match first_char {
                    'f' | 'F' => {
                        self.advance();
                        return self.string_literal(quote, column).map(Token::FStr);
                    }
                    'r' | 'R' => {
                        self.advance();
                        return self.raw_string_literal(quote, column).map(Token::Str);
                    }
                    _ => {}
                }
            }
        }

        let mut ident = String::new();
        ident.push(first_char);
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Ok(Token::Ident(ident))
    }

    fn skip_whitespace_and_block_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/')
                    if self.language.is_brace_family() && self.peek_ahead(1) == Some('*') =>
                {
                    let column = self.position + 1;
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(LexError::Unterminated { column }),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn at_line_comment(&self) -> bool {
        match self.language {
            Language::Python => self.peek() == Some('#'),
            Language::Java | Language::Cpp => {
                self.peek() == Some('/') && self.peek_ahead(1) == Some('/')
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}
