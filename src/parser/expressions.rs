//! Expression parsing
//!
//! Precedence climbing over the token stream of one line:
//!
//! ```text
//! or  →  and  →  comparison  →  additive  →  term  →  unary  →  postfix  →  primary
//! ```
//!
//! The grammar is shared by all languages. Only the spelling of a few
//! primaries differs (`True`/`true`, `None`/`null`, `[..]` vs `{..}`), and
//! that is decided by the [`Language`] passed in.

use super::ast::{BinOp, Expr, FStringPart, UnaryOp};
use super::language::Language;
use super::lexer::{tokenize, LexError, Token};
use thiserror::Error;

/// Deepest nesting of groups, calls, indexing and prefix operators
pub const MAX_EXPR_DEPTH: usize = 64;

/// Most operator nodes one expression may build
pub const MAX_EXPR_OPERATORS: usize = 512;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected '{found}' at token {position}")]
    Unexpected { found: String, position: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("integer literal {0} is out of range")]
    IntegerOutOfRange(String),

    #[error("expression nested deeper than {} levels", MAX_EXPR_DEPTH)]
    TooDeep,

    #[error("expression has more than {} operators", MAX_EXPR_OPERATORS)]
    TooLong,
}

/// Parse a complete expression; every token must be consumed
pub fn parse_expression(tokens: &[Token], language: Language) -> Result<Expr, ParseError> {
    let mut parser = ExprParser::new(tokens, language);
    let expr = parser.parse_expression()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Tokenize and parse expression text
pub fn parse_expression_text(text: &str, language: Language) -> Result<Expr, ParseError> {
    let tokens = tokenize(text, language)?;
    parse_expression(&tokens, language)
}

/// Split an f-string body into literal runs and `{...}` placeholders
pub fn parse_fstring(body: &str, language: Language) -> Vec<FStringPart> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut source = String::new();
                let mut depth = 1;
                for inner in chars.by_ref() {
                    match inner {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    source.push(inner);
                }
                if !literal.is_empty() {
                    parts.push(FStringPart::Literal(std::mem::take(&mut literal)));
                }
                let source = source.trim().to_string();
                let expr = parse_expression_text(&source, language).ok();
                parts.push(FStringPart::Placeholder { source, expr });
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        parts.push(FStringPart::Literal(literal));
    }
    parts
}

pub(crate) struct ExprParser<'a> {
    tokens: &'a [Token],
    position: usize,
    language: Language,
    depth: usize,
    operators: usize,
}

impl<'a> ExprParser<'a> {
    pub(crate) fn new(tokens: &'a [Token], language: Language) -> Self {
        Self {
            tokens,
            position: 0,
            language,
            depth: 0,
            operators: 0,
        }
    }

    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_or)
    }

    /// Run `parse` one nesting level deeper
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        if self.depth >= MAX_EXPR_DEPTH {
            return Err(ParseError::TooDeep);
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Account for one more operator node
    fn count_operator(&mut self) -> Result<(), ParseError> {
        self.operators += 1;
        if self.operators > MAX_EXPR_OPERATORS {
            return Err(ParseError::TooLong);
        }
        Ok(())
    }

    pub(crate) fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.unexpected(token)),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.match_token(&Token::OrOr) || self.match_keyword("or") {
            self.count_operator()?;
            let right = self.parse_and()?;
            left = binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        while self.match_token(&Token::AndAnd) || self.match_keyword("and") {
            self.count_operator()?;
            let right = self.parse_comparison()?;
            left = binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;
        let op = match self.peek() {
            Some(Token::EqEq) => BinOp::Eq,
            Some(Token::NotEq) => BinOp::Ne,
            Some(Token::Lt) => BinOp::Lt,
            Some(Token::Le) => BinOp::Le,
            Some(Token::Gt) => BinOp::Gt,
            Some(Token::Ge) => BinOp::Ge,
            _ => return Ok(left),
        };
        self.position += 1;
        self.count_operator()?;
        let right = self.parse_additive()?;
        Ok(binary(op, left, right))
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(left),
            };
            self.position += 1;
            self.count_operator()?;
            let right = self.parse_term()?;
            left = binary(op, left, right);
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::SlashSlash) => BinOp::FloorDiv,
                Some(Token::Percent) => BinOp::Mod,
                _ => return Ok(left),
            };
            self.position += 1;
            self.count_operator()?;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = if self.match_token(&Token::Minus) {
            Some(UnaryOp::Neg)
        } else if self.match_token(&Token::Bang) || self.match_keyword("not") {
            Some(UnaryOp::Not)
        } else {
            None
        };

        match op {
            // `-9223372036854775808` only fits once the sign is attached
            Some(UnaryOp::Neg)
                if matches!(self.peek(), Some(Token::BigInt(d)) if is_min_magnitude(d)) =>
            {
                self.position += 1;
                Ok(Expr::Int(i64::MIN))
            }
            Some(op) => {
                self.count_operator()?;
                let operand = self.nested(Self::parse_unary)?;
                // Fold negative literals so `-1` stays a literal
                Ok(match (op, operand) {
                    (UnaryOp::Neg, Expr::Int(n)) if n != i64::MIN => Expr::Int(-n),
                    (UnaryOp::Neg, Expr::Float(x)) => Expr::Float(-x),
                    (op, operand) => Expr::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                })
            }
            None => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.match_token(&Token::LBracket) {
            self.count_operator()?;
            let index = self.parse_expression()?;
            self.expect(&Token::RBracket)?;
            expr = Expr::Index {
                target: Box::new(expr),
                index: Box::new(index),
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance().ok_or(ParseError::UnexpectedEnd)?;

        match token {
            Token::Int(n) => Ok(Expr::Int(n)),
            Token::BigInt(digits) => Err(ParseError::IntegerOutOfRange(digits)),
            Token::Float(x) => Ok(Expr::Float(x)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::Char(c) => Ok(Expr::Char(c)),
            Token::FStr(body) => Ok(Expr::FString(parse_fstring(&body, self.language))),
            Token::LParen => {
                let inner = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::LBracket => {
                let items = self.parse_list(&Token::RBracket)?;
                Ok(Expr::List(items))
            }
            Token::LBrace => self.parse_braced(),
            Token::Ident(name) => self.parse_identifier(name),
            other => Err(self.unexpected(&other)),
        }
    }

    fn parse_identifier(&mut self, name: String) -> Result<Expr, ParseError> {
        match (self.language, name.as_str()) {
            (Language::Python, "True") => return Ok(Expr::Bool(true)),
            (Language::Python, "False") => return Ok(Expr::Bool(false)),
            (Language::Python, "None") => return Ok(Expr::Null),
            (Language::Java | Language::Cpp, "true") => return Ok(Expr::Bool(true)),
            (Language::Java | Language::Cpp, "false") => return Ok(Expr::Bool(false)),
            (Language::Java, "null") | (Language::Cpp, "nullptr" | "NULL") => {
                return Ok(Expr::Null)
            }
            (Language::Java | Language::Cpp, "new") => return self.parse_new(),
            _ => {}
        }

        // Dotted / scoped path: System.out, sc.nextLine, std::endl
        let mut path = vec![name];
        while matches!(self.peek(), Some(Token::Dot | Token::ColonColon)) {
            match self.peek_ahead(1) {
                Some(Token::Ident(next)) => {
                    path.push(next.clone());
                    self.position += 2;
                }
                _ => break,
            }
        }

        if self.match_token(&Token::LParen) {
            let args = self.parse_list(&Token::RParen)?;
            let name = path.pop().unwrap_or_default();
            let receiver = if path.is_empty() {
                None
            } else {
                Some(path.join("."))
            };
            return Ok(Expr::Call {
                receiver,
                name,
                args,
            });
        }

        Ok(Expr::Var(path.join(".")))
    }

    /// `new Name(args)`, `new T[n]`, `new T[]{...}`
    fn parse_new(&mut self) -> Result<Expr, ParseError> {
        let mut class = match self.advance() {
            Some(Token::Ident(name)) => name,
            Some(other) => return Err(self.unexpected(&other)),
            None => return Err(ParseError::UnexpectedEnd),
        };
        // Generic arguments such as ArrayList<Integer> are kept as text
        if self.match_token(&Token::Lt) {
            class.push('<');
            while let Some(token) = self.advance() {
                if token == Token::Gt {
                    break;
                }
                class.push_str(&token.to_string());
            }
            class.push('>');
        }

        if self.match_token(&Token::LBracket) {
            if self.match_token(&Token::RBracket) {
                self.expect(&Token::LBrace)?;
                let init = self.parse_list(&Token::RBrace)?;
                return Ok(Expr::NewArray {
                    element: class,
                    length: None,
                    init,
                });
            }
            let length = self.parse_expression()?;
            self.expect(&Token::RBracket)?;
            return Ok(Expr::NewArray {
                element: class,
                length: Some(Box::new(length)),
                init: Vec::new(),
            });
        }

        self.expect(&Token::LParen)?;
        let args = self.parse_list(&Token::RParen)?;
        Ok(Expr::New { class, args })
    }

    /// `{...}`: a dict in Python, an initializer list elsewhere
    fn parse_braced(&mut self) -> Result<Expr, ParseError> {
        if self.language.is_brace_family() {
            return Ok(Expr::Braced(self.parse_list(&Token::RBrace)?));
        }

        let mut pairs = Vec::new();
        let mut items = Vec::new();
        loop {
            if self.match_token(&Token::RBrace) {
                break;
            }
            let key = self.parse_expression()?;
            if self.match_token(&Token::Colon) {
                let value = self.parse_expression()?;
                pairs.push((key, value));
            } else {
                items.push(key);
            }
            if !self.match_token(&Token::Comma) {
                self.expect(&Token::RBrace)?;
                break;
            }
        }

        match (pairs.is_empty(), items.is_empty()) {
            // A Python set literal is shown like a list
            (true, false) => Ok(Expr::List(items)),
            (_, true) => Ok(Expr::Dict(pairs)),
            (false, false) => Err(ParseError::Unexpected {
                found: "mixed set/dict literal".to_string(),
                position: self.position,
            }),
        }
    }

    /// Comma-separated expressions up to `close`; a trailing comma is allowed
    pub(crate) fn parse_list(&mut self, close: &Token) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.match_token(close) {
                return Ok(items);
            }
            items.push(self.parse_expression()?);
            if !self.match_token(&Token::Comma) {
                self.expect(close)?;
                return Ok(items);
            }
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), ParseError> {
        match self.peek() {
            Some(t) if t == token => {
                self.position += 1;
                Ok(())
            }
            Some(other) => Err(self.unexpected(other)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn match_token(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, word: &str) -> bool {
        if self.language == Language::Python && self.peek().is_some_and(|t| t.is_ident(word)) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn peek_ahead(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.position + n)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn unexpected(&self, token: &Token) -> ParseError {
        ParseError::Unexpected {
            found: token.to_string(),
            position: self.position,
        }
    }
}

/// Digits of `i64::MIN` without its sign
fn is_min_magnitude(digits: &str) -> bool {
    digits.parse::<u64>() == Ok(i64::MIN.unsigned_abs())
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
