//! Statement classification
//!
//! Each logical line is classified exactly once into a [`StatementKind`].
//! The checks run in a fixed priority order and the first match wins:
//!
//! ```text
//! definition → assignment → read → print → return/exit → call → unrecognized
//! ```
//!
//! Python and the brace family share the priority order but not the
//! surface syntax, so each has its own small grammar below. Lines that lex
//! but fit none of the shapes (control flow, multi-statement lines, index
//! assignment, ...) are [`StatementKind::Unrecognized`].

use super::ast::{AssignOp, Expr, FunctionHeader, Param, PrintPiece, StatementKind};
use super::expressions::parse_expression;
use super::language::Language;
use super::lexer::{tokenize, Token};
use super::normalize::brace_balance;
use tracing::trace;

/// Classify one logical line
pub fn classify(text: &str, language: Language) -> StatementKind {
    let kind = match tokenize(text, language) {
        Ok(tokens) => {
            let mut kind = classify_tokens(&tokens, language);
            if let StatementKind::Definition(header) = &mut kind {
                header.inline_body = inline_body(text, language);
            }
            kind
        }
        Err(e) => {
            trace!(line = text, error = %e, "line does not lex");
            StatementKind::Unrecognized
        }
    };

    match kind {
        StatementKind::Unrecognized => {
            unparsed_assignment(text, language).unwrap_or(StatementKind::Unrecognized)
        }
        kind => kind,
    }
}

/// Classify an already tokenized statement
pub fn classify_tokens(tokens: &[Token], language: Language) -> StatementKind {
    let tokens = strip_terminator(tokens, language);
    if tokens.is_empty() {
        return StatementKind::Unrecognized;
    }

    let kind = match language {
        Language::Python => classify_python(tokens),
        Language::Java | Language::Cpp => classify_braced(tokens, language),
    };
    kind.unwrap_or(StatementKind::Unrecognized)
}

/// `if COND:` / `if (COND)` guard, with any statement tokens that follow it
/// on the same line (braces stripped)
pub fn parse_guard(tokens: &[Token], language: Language) -> Option<(Expr, Vec<Token>)> {
    if !tokens.first()?.is_ident("if") {
        return None;
    }

    match language {
        Language::Python => {
            let colon = find_top_level(tokens, |t| *t == Token::Colon)?;
            let condition = parse_expression(&tokens[1..colon], language).ok()?;
            Some((condition, tokens[colon + 1..].to_vec()))
        }
        Language::Java | Language::Cpp => {
            if tokens.get(1) != Some(&Token::LParen) {
                return None;
            }
            let close = matching_close(tokens, 1)?;
            let condition = parse_expression(&tokens[2..close], language).ok()?;
            Some((condition, strip_braces(&tokens[close + 1..]).to_vec()))
        }
    }
}

/// `else:` / `else` / `} else {`, with any statement tokens that follow it
/// on the same line. `else if` / `elif` chains are not recognized.
pub fn parse_else(tokens: &[Token], language: Language) -> Option<Vec<Token>> {
    let tokens = match tokens.first() {
        Some(Token::RBrace) => &tokens[1..],
        _ => tokens,
    };
    if !tokens.first()?.is_ident("else") {
        return None;
    }
    let rest = &tokens[1..];

    match language {
        Language::Python => match rest.split_first() {
            Some((Token::Colon, body)) => Some(body.to_vec()),
            _ => None,
        },
        Language::Java | Language::Cpp => {
            if rest.first().is_some_and(|t| t.is_ident("if")) {
                return None;
            }
            Some(strip_braces(rest).to_vec())
        }
    }
}

fn classify_python(tokens: &[Token]) -> Option<StatementKind> {
    let lang = Language::Python;

    if tokens[0].is_ident("def") {
        return python_header(tokens).map(StatementKind::Definition);
    }
    if let Some(kind) = assignment(tokens, lang) {
        return Some(kind);
    }
    if let Some(kind) = python_print(tokens) {
        return Some(kind);
    }
    if let Some(kind) = return_statement(tokens, lang) {
        return Some(kind);
    }
    call_statement(tokens, lang)
}

fn classify_braced(tokens: &[Token], lang: Language) -> Option<StatementKind> {
    if let Some(header) = braced_header(tokens) {
        return Some(StatementKind::Definition(header));
    }
    if let Some(kind) = assignment(tokens, lang) {
        return Some(kind);
    }
    if let Some(kind) = increment(tokens, lang) {
        return Some(kind);
    }
    if lang == Language::Cpp {
        if let Some(kind) = cpp_read(tokens) {
            return Some(kind);
        }
        if let Some(kind) = cpp_print(tokens) {
            return Some(kind);
        }
    }
    if lang == Language::Java {
        if let Some(kind) = java_print(tokens) {
            return Some(kind);
        }
    }
    if let Some(kind) = return_statement(tokens, lang) {
        return Some(kind);
    }
    call_statement(tokens, lang)
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// `def name(params):`
fn python_header(tokens: &[Token]) -> Option<FunctionHeader> {
    let name = ident(tokens.get(1)?)?;
    if tokens.get(2) != Some(&Token::LParen) {
        return None;
    }
    let close = matching_close(tokens, 2)?;
    let params = split_top_level(&tokens[3..close], &Token::Comma)
        .into_iter()
        .filter_map(|group| {
            let name = ident(group.first()?)?;
            let type_name = match group.get(1) {
                Some(Token::Colon) => Some(type_text(&group[2..])).filter(|t| !t.is_empty()),
                _ => None,
            };
            Some(Param { name, type_name })
        })
        .collect();

    Some(FunctionHeader {
        name,
        params,
        inline_body: None,
    })
}

/// `[modifiers] type name(params) [{ ...]`
fn braced_header(tokens: &[Token]) -> Option<FunctionHeader> {
    let open = tokens.iter().position(|t| *t == Token::LParen)?;
    let prefix = &tokens[..open];

    let idents = prefix.iter().filter(|t| matches!(t, Token::Ident(_))).count();
    if idents < 2 || !prefix.iter().all(is_type_token) {
        return None;
    }
    let first = ident(prefix.first()?)?;
    if Language::Java.is_keyword(&first) || Language::Cpp.is_keyword(&first) || first == "new" {
        return None;
    }
    let name = ident(prefix.last()?)?;
    // `std::getline(...)` is a qualified call, not a declaration
    if prefix.len() >= 2 && prefix[prefix.len() - 2] == Token::ColonColon {
        return None;
    }

    let close = matching_close(tokens, open)?;
    match &tokens[close + 1..] {
        [] => {}
        [Token::LBrace, ..] => {}
        [Token::Ident(kw), ..] if kw == "throws" || kw == "const" || kw == "noexcept" => {}
        _ => return None,
    }

    let params = split_top_level(&tokens[open + 1..close], &Token::Comma)
        .into_iter()
        .filter_map(|group| {
            let (name, type_name) = declaration(group)?;
            Some(Param {
                name,
                type_name: Some(type_name).filter(|t| !t.is_empty()),
            })
        })
        .collect();

    Some(FunctionHeader {
        name,
        params,
        inline_body: None,
    })
}

/// Split `type name` / `type name[]` into the name and normalized type text
fn declaration(tokens: &[Token]) -> Option<(String, String)> {
    let mut end = tokens.len();
    let mut array_suffix = false;
    while end >= 2 && tokens[end - 1] == Token::RBracket {
        let open = tokens[..end].iter().rposition(|t| *t == Token::LBracket)?;
        end = open;
        array_suffix = true;
    }

    let name = ident(tokens.get(end.checked_sub(1)?)?)?;
    if name == "void" {
        return None;
    }
    let mut type_name = type_text(&tokens[..end - 1]);
    if array_suffix {
        type_name.push_str("[]");
    }
    Some((name, type_name))
}

/// Text written after the header on the same line, if any
fn inline_body(text: &str, language: Language) -> Option<String> {
    let rest = match language {
        Language::Python => split_top_level_text(text, ':')?.1,
        Language::Java | Language::Cpp => {
            let rest = split_top_level_text(text, '{')?.1.trim_end();
            rest.strip_suffix('}').unwrap_or(rest)
        }
    };
    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

fn assignment(tokens: &[Token], lang: Language) -> Option<StatementKind> {
    let position = find_top_level(tokens, |t| assign_op(t).is_some())?;
    let op = assign_op(&tokens[position])?;
    let (target, declared_type) = assignment_target(&tokens[..position], lang)?;
    if op != AssignOp::Set && declared_type.is_some() {
        return None;
    }

    let value = match parse_expression(&tokens[position + 1..], lang) {
        Ok(value) => value,
        Err(e) => {
            trace!(name = %target, error = %e, "assignment value does not parse");
            return None;
        }
    };

    Some(StatementKind::Assignment {
        declared_type,
        target,
        op,
        value,
    })
}

/// `x = <text>` whose value does not lex or parse. The value is kept as
/// source text so the line still records a step.
fn unparsed_assignment(text: &str, lang: Language) -> Option<StatementKind> {
    let text = match lang {
        Language::Python if text.ends_with(':') => return None,
        Language::Python => text,
        Language::Java | Language::Cpp => text.strip_suffix(';').unwrap_or(text),
    };
    // A line that opens a block stays unrecognized so its body is skipped
    let (opens, closes) = brace_balance(text);
    if lang.is_brace_family() && opens > closes {
        return None;
    }

    // Only a plain `=`; comparisons and compound operators do not qualify
    let position = text.find('=')?;
    let before = text[..position].chars().next_back();
    let after = text[position + 1..].chars().next();
    if before.is_some_and(|c| "=!<>+-*/%&|^".contains(c)) || after == Some('=') {
        return None;
    }

    let lhs = tokenize(&text[..position], lang).ok()?;
    let (target, declared_type) = assignment_target(&lhs, lang)?;
    let value = text[position + 1..].trim();
    if value.is_empty() {
        return None;
    }

    Some(StatementKind::Assignment {
        declared_type,
        target,
        op: AssignOp::Set,
        value: Expr::Unparsed(value.to_string()),
    })
}

/// Target name and declared type of an assignment's left-hand side
fn assignment_target(lhs: &[Token], lang: Language) -> Option<(String, Option<String>)> {
    let (target, declared_type) = match lang {
        Language::Python => match lhs {
            [Token::Ident(name)] => (name.clone(), None),
            [Token::Ident(name), Token::Colon, annotation @ ..] if !annotation.is_empty() => {
                (name.clone(), Some(type_text(annotation)))
            }
            _ => return None,
        },
        Language::Java | Language::Cpp => match lhs {
            [Token::Ident(name)] => (name.clone(), None),
            _ => {
                if !lhs.iter().all(is_type_token) {
                    return None;
                }
                let (name, type_name) = declaration(lhs)?;
                if type_name.is_empty() || type_name == "[]" {
                    // `arr[0] = 5` is element assignment, not a declaration
                    return None;
                }
                (name, Some(type_name))
            }
        },
    };

    if lang.is_keyword(&target) {
        return None;
    }
    Some((target, declared_type))
}

/// `x++` / `++x` / `x--` / `--x`
fn increment(tokens: &[Token], lang: Language) -> Option<StatementKind> {
    let (name, op) = match tokens {
        [Token::Ident(name), Token::PlusPlus] | [Token::PlusPlus, Token::Ident(name)] => {
            (name, AssignOp::Add)
        }
        [Token::Ident(name), Token::MinusMinus] | [Token::MinusMinus, Token::Ident(name)] => {
            (name, AssignOp::Sub)
        }
        _ => return None,
    };
    if lang.is_keyword(name) {
        return None;
    }
    Some(StatementKind::Assignment {
        declared_type: None,
        target: name.clone(),
        op,
        value: Expr::Int(1),
    })
}

fn assign_op(token: &Token) -> Option<AssignOp> {
    match token {
        Token::Eq => Some(AssignOp::Set),
        Token::PlusEq => Some(AssignOp::Add),
        Token::MinusEq => Some(AssignOp::Sub),
        Token::StarEq => Some(AssignOp::Mul),
        Token::SlashEq => Some(AssignOp::Div),
        Token::PercentEq => Some(AssignOp::Mod),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Input and output
// ---------------------------------------------------------------------------

/// `cin >> a >> b` / `getline(cin, a)`
fn cpp_read(tokens: &[Token]) -> Option<StatementKind> {
    let rest = strip_std(tokens);
    if rest.first()?.is_ident("cin") {
        let targets = split_top_level(&rest[1..], &Token::GtGt)
            .into_iter()
            .skip(1)
            .map(|segment| match segment {
                [Token::Ident(name)] => Some(name.clone()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        return (!targets.is_empty()).then_some(StatementKind::Read { targets });
    }

    if rest.first()?.is_ident("getline") && rest.get(1) == Some(&Token::LParen) {
        let close = matching_close(rest, 1)?;
        if close != rest.len() - 1 {
            return None;
        }
        let args = split_top_level(&rest[2..close], &Token::Comma);
        return match args.as_slice() {
            [stream, [Token::Ident(name)]] if strip_std(stream).first()?.is_ident("cin") => {
                Some(StatementKind::Read {
                    targets: vec![name.clone()],
                })
            }
            _ => None,
        };
    }
    None
}

/// `cout << a << b << endl`
fn cpp_print(tokens: &[Token]) -> Option<StatementKind> {
    let rest = strip_std(tokens);
    if !rest.first()?.is_ident("cout") || rest.get(1) != Some(&Token::LtLt) {
        return None;
    }

    let pieces = split_top_level(&rest[1..], &Token::LtLt)
        .into_iter()
        .skip(1)
        .map(|segment| match strip_std(segment) {
            [endl] if endl.is_ident("endl") => Some(PrintPiece::Newline),
            _ => parse_expression(segment, Language::Cpp)
                .ok()
                .map(PrintPiece::Value),
        })
        .collect::<Option<Vec<_>>>()?;
    Some(StatementKind::Print(pieces))
}

/// `System.out.println(x)` / `System.out.print(x)`
fn java_print(tokens: &[Token]) -> Option<StatementKind> {
    let expr = parse_expression(tokens, Language::Java).ok()?;
    let Expr::Call {
        receiver: Some(receiver),
        name,
        mut args,
    } = expr
    else {
        return None;
    };
    if receiver != "System.out" || args.len() > 1 {
        return None;
    }

    let mut pieces: Vec<PrintPiece> = args.drain(..).map(PrintPiece::Value).collect();
    match name.as_str() {
        "println" => pieces.push(PrintPiece::Newline),
        "print" if !pieces.is_empty() => {}
        _ => return None,
    }
    Some(StatementKind::Print(pieces))
}

/// `print(a, b, sep=..., end=...)`
fn python_print(tokens: &[Token]) -> Option<StatementKind> {
    if !tokens.first()?.is_ident("print") || tokens.get(1) != Some(&Token::LParen) {
        return None;
    }
    if matching_close(tokens, 1)? != tokens.len() - 1 {
        return None;
    }

    let lang = Language::Python;
    let mut values = Vec::new();
    let mut sep = None;
    let mut end = None;
    for arg in split_top_level(&tokens[2..tokens.len() - 1], &Token::Comma) {
        match arg {
            [Token::Ident(kw), Token::Eq, value @ ..] => {
                let value = parse_expression(value, lang).ok()?;
                match kw.as_str() {
                    "sep" => sep = Some(value),
                    "end" => end = Some(value),
                    _ => {}
                }
            }
            [] => {}
            _ => values.push(parse_expression(arg, lang).ok()?),
        }
    }

    let sep = sep.unwrap_or_else(|| Expr::Str(" ".to_string()));
    let mut pieces = Vec::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            pieces.push(PrintPiece::Value(sep.clone()));
        }
        pieces.push(PrintPiece::Value(value));
    }
    pieces.push(match end {
        Some(end) => PrintPiece::Value(end),
        None => PrintPiece::Newline,
    });
    Some(StatementKind::Print(pieces))
}

// ---------------------------------------------------------------------------
// Return and calls
// ---------------------------------------------------------------------------

fn return_statement(tokens: &[Token], lang: Language) -> Option<StatementKind> {
    if tokens[0].is_ident("return") {
        if tokens.len() == 1 {
            return Some(StatementKind::Return(None));
        }
        return parse_expression(&tokens[1..], lang)
            .ok()
            .map(|e| StatementKind::Return(Some(e)));
    }

    let expr = parse_expression(tokens, lang).ok()?;
    let Expr::Call { receiver, name, .. } = &expr else {
        return None;
    };
    let is_exit = match (lang, receiver.as_deref(), name.as_str()) {
        (Language::Python, None, "exit" | "quit") => true,
        (Language::Python, Some("sys"), "exit") => true,
        (Language::Java, Some("System"), "exit") => true,
        (Language::Cpp, None | Some("std"), "exit") => true,
        _ => false,
    };
    is_exit.then_some(StatementKind::Return(None))
}

fn call_statement(tokens: &[Token], lang: Language) -> Option<StatementKind> {
    let expr = parse_expression(tokens, lang).ok()?;
    match &expr {
        Expr::Call { name, .. } if !lang.is_keyword(name) => Some(StatementKind::Call(expr)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Token helpers
// ---------------------------------------------------------------------------

fn ident(token: &Token) -> Option<String> {
    match token {
        Token::Ident(name) => Some(name.clone()),
        _ => None,
    }
}

fn is_type_token(token: &Token) -> bool {
    matches!(
        token,
        Token::Ident(_)
            | Token::Lt
            | Token::Gt
            | Token::GtGt
            | Token::Comma
            | Token::LBracket
            | Token::RBracket
            | Token::Int(_)
            | Token::ColonColon
            | Token::Star
            | Token::Amp
            | Token::AndAnd
            | Token::Question
    )
}

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "static", "final", "const", "constexpr", "inline",
    "virtual", "synchronized", "abstract",
];

/// Render a declared type: modifiers and `std::` dropped, `int []` joined
fn type_text(tokens: &[Token]) -> String {
    let mut text = String::new();
    let mut previous_ident = false;
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Ident(name) if name == "std" && tokens.get(i + 1) == Some(&Token::ColonColon) => {
                i += 2;
                continue;
            }
            Token::Ident(name) if MODIFIERS.contains(&name.as_str()) => {}
            Token::Ident(name) => {
                if previous_ident {
                    text.push(' ');
                }
                text.push_str(name);
                previous_ident = true;
                i += 1;
                continue;
            }
            Token::Int(_) => {}
            other => text.push_str(&other.to_string()),
        }
        previous_ident = false;
        i += 1;
    }
    text
}

/// Drop a leading `std::`
fn strip_std(tokens: &[Token]) -> &[Token] {
    match tokens {
        [Token::Ident(std), Token::ColonColon, rest @ ..] if std == "std" => rest,
        _ => tokens,
    }
}

/// Drop the trailing `;` of a brace-family statement
fn strip_terminator(tokens: &[Token], language: Language) -> &[Token] {
    match (language, tokens.split_last()) {
        (Language::Java | Language::Cpp, Some((Token::Semicolon, rest))) => rest,
        _ => tokens,
    }
}

/// Drop one enclosing `{ ... }` pair (either side may be missing) and a `;`
fn strip_braces(tokens: &[Token]) -> &[Token] {
    let mut tokens = tokens;
    if let Some((Token::LBrace, rest)) = tokens.split_first() {
        tokens = rest;
    }
    if let Some((Token::RBrace, rest)) = tokens.split_last() {
        tokens = rest;
    }
    if let Some((Token::Semicolon, rest)) = tokens.split_last() {
        tokens = rest;
    }
    tokens
}

/// Index of the bracket closing the one at `open`
fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.is_open() {
            depth += 1;
        } else if token.is_close() {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// First token at bracket depth zero matching `pred`
fn find_top_level(tokens: &[Token], pred: impl Fn(&Token) -> bool) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if token.is_open() {
            depth += 1;
        } else if token.is_close() {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && pred(token) {
            return Some(i);
        }
    }
    None
}

/// Split on `separator` at bracket depth zero
fn split_top_level<'a>(tokens: &'a [Token], separator: &Token) -> Vec<&'a [Token]> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.is_open() {
            depth += 1;
        } else if token.is_close() {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token == separator {
            parts.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    parts.push(&tokens[start..]);
    parts
}

/// Split raw text at the first `stop` outside quotes and brackets
fn split_top_level_text(text: &str, stop: char) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            _ if c == stop && depth == 0 => return Some((&text[..i], &text[i + c.len_utf8()..])),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::BinOp;

    fn py(text: &str) -> StatementKind {
        classify(text, Language::Python)
    }

    #[test]
    fn test_python_definition() {
        match py("def factorial(n):") {
            StatementKind::Definition(header) => {
                assert_eq!(header.name, "factorial");
                assert_eq!(header.params.len(), 1);
                assert_eq!(header.params[0].name, "n");
                assert_eq!(header.inline_body, None);
            }
            other => panic!("expected definition, got {other:?}"),
        }
    }

    #[test]
    fn test_python_inline_definition_body() {
        match py("def square(x: int) -> int: return x * x") {
            StatementKind::Definition(header) => {
                assert_eq!(header.params[0].type_name.as_deref(), Some("int"));
                assert_eq!(header.inline_body.as_deref(), Some("return x * x"));
            }
            other => panic!("expected definition, got {other:?}"),
        }
    }

    #[test]
    fn test_comparison_is_not_assignment() {
        assert_eq!(py("x == 5"), StatementKind::Unrecognized);
        assert_eq!(py("if x >= 5: y = 1"), StatementKind::Unrecognized);
    }

    #[test]
    fn test_python_assignment() {
        match py("total += n * 2") {
            StatementKind::Assignment { target, op, .. } => {
                assert_eq!(target, "total");
                assert_eq!(op, AssignOp::Add);
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_python_print_with_sep_and_end() {
        let StatementKind::Print(pieces) = py("print(a, b, sep='-', end='')") else {
            panic!("expected print");
        };
        assert_eq!(pieces.len(), 4);
        assert_eq!(pieces[1], PrintPiece::Value(Expr::Str("-".into())));
        assert_eq!(pieces[3], PrintPiece::Value(Expr::Str(String::new())));
    }

    #[test]
    fn test_python_exit_is_return() {
        assert_eq!(py("sys.exit(0)"), StatementKind::Return(None));
        assert_eq!(py("quit()"), StatementKind::Return(None));
    }

    #[test]
    fn test_unsupported_python_lines() {
        assert_eq!(py("for i in range(3):"), StatementKind::Unrecognized);
        assert_eq!(py("while True:"), StatementKind::Unrecognized);
        assert_eq!(py("numbers[0] = 3"), StatementKind::Unrecognized);
    }

    #[test]
    fn test_unparsable_values_keep_their_text() {
        let unparsed = |text: &str, lang: Language| match classify(text, lang) {
            StatementKind::Assignment {
                target,
                op: AssignOp::Set,
                value: Expr::Unparsed(value),
                ..
            } => (target, value),
            other => panic!("{text}: expected unparsed assignment, got {other:?}"),
        };

        assert_eq!(
            unparsed("x = [i for i in range(3)]", Language::Python),
            ("x".to_string(), "[i for i in range(3)]".to_string())
        );
        assert_eq!(
            unparsed("big = 99999999999999999999", Language::Python),
            ("big".to_string(), "99999999999999999999".to_string())
        );
        assert_eq!(
            unparsed("String s = \"open;", Language::Java),
            ("s".to_string(), "\"open".to_string())
        );
    }

    #[test]
    fn test_unparsable_lines_without_assignment_shape() {
        assert_eq!(py("x == [i for i in y]"), StatementKind::Unrecognized);
        assert_eq!(py("total += [i for i in y]"), StatementKind::Unrecognized);
        assert_eq!(py("x = lambda y:"), StatementKind::Unrecognized);
        assert_eq!(
            classify("arr[0] = [i for i in y];", Language::Cpp),
            StatementKind::Unrecognized
        );
        assert_eq!(
            classify("auto f = [&](int v) {", Language::Cpp),
            StatementKind::Unrecognized
        );
    }

    #[test]
    fn test_smallest_integer_literal() {
        match classify("long m = -9223372036854775808L;", Language::Java) {
            StatementKind::Assignment { value, .. } => assert_eq!(value, Expr::Int(i64::MIN)),
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_java_main_header() {
        let kind = classify("public static void main(String[] args) {", Language::Java);
        match kind {
            StatementKind::Definition(header) => {
                assert_eq!(header.name, "main");
                assert_eq!(header.params[0].name, "args");
                assert_eq!(header.params[0].type_name.as_deref(), Some("String[]"));
            }
            other => panic!("expected definition, got {other:?}"),
        }
    }

    #[test]
    fn test_control_flow_is_not_a_header() {
        assert_eq!(
            classify("if (n <= 1) {", Language::Java),
            StatementKind::Unrecognized
        );
        assert_eq!(
            classify("while (x > 0) {", Language::Cpp),
            StatementKind::Unrecognized
        );
    }

    #[test]
    fn test_braced_one_line_definition() {
        match classify("int square(int x) { return x * x; }", Language::Cpp) {
            StatementKind::Definition(header) => {
                assert_eq!(header.inline_body.as_deref(), Some("return x * x;"));
            }
            other => panic!("expected definition, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_types() {
        let cases = [
            ("int[] numbers = {1, 2, 3};", Language::Java, "int[]"),
            ("final int limit = 10;", Language::Java, "int"),
            ("std::vector<int> v = {1, 2};", Language::Cpp, "vector<int>"),
            ("int arr[5] = {1, 2, 3, 4, 5};", Language::Cpp, "int[]"),
            ("const std::string s = \"x\";", Language::Cpp, "string"),
        ];
        for (text, lang, expected) in cases {
            match classify(text, lang) {
                StatementKind::Assignment { declared_type, .. } => {
                    assert_eq!(declared_type.as_deref(), Some(expected), "{text}");
                }
                other => panic!("{text}: expected assignment, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_cpp_element_assignment_is_unrecognized() {
        assert_eq!(classify("arr[0] = 5;", Language::Cpp), StatementKind::Unrecognized);
    }

    #[test]
    fn test_cpp_output_pieces() {
        let kind = classify("std::cout << \"n = \" << n << std::endl;", Language::Cpp);
        let StatementKind::Print(pieces) = kind else {
            panic!("expected print");
        };
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[2], PrintPiece::Newline);
    }

    #[test]
    fn test_cpp_reads() {
        assert_eq!(
            classify("cin >> a >> b;", Language::Cpp),
            StatementKind::Read {
                targets: vec!["a".into(), "b".into()]
            }
        );
        assert_eq!(
            classify("getline(std::cin, name);", Language::Cpp),
            StatementKind::Read {
                targets: vec!["name".into()]
            }
        );
    }

    #[test]
    fn test_java_println() {
        let kind = classify("System.out.println(\"Sum: \" + sum);", Language::Java);
        let StatementKind::Print(pieces) = kind else {
            panic!("expected print");
        };
        assert!(matches!(
            &pieces[0],
            PrintPiece::Value(Expr::Binary { op: BinOp::Add, .. })
        ));
        assert_eq!(pieces[1], PrintPiece::Newline);
    }

    #[test]
    fn test_increment() {
        assert!(matches!(
            classify("count++;", Language::Java),
            StatementKind::Assignment { op: AssignOp::Add, .. }
        ));
    }

    #[test]
    fn test_return_and_call() {
        assert!(matches!(
            classify("return 0;", Language::Cpp),
            StatementKind::Return(Some(Expr::Int(0)))
        ));
        assert!(matches!(py("greet('Ada')"), StatementKind::Call(_)));
    }

    #[test]
    fn test_guards() {
        let tokens = tokenize("if n <= 1: return 1", Language::Python).unwrap();
        let (condition, rest) = parse_guard(&tokens, Language::Python).unwrap();
        assert_eq!(condition.to_string(), "n <= 1");
        assert_eq!(
            classify_tokens(&rest, Language::Python),
            StatementKind::Return(Some(Expr::Int(1)))
        );

        let tokens = tokenize("if (n <= 1) { return 1; }", Language::Java).unwrap();
        let (_, rest) = parse_guard(&tokens, Language::Java).unwrap();
        assert_eq!(
            classify_tokens(&rest, Language::Java),
            StatementKind::Return(Some(Expr::Int(1)))
        );
    }

    #[test]
    fn test_else_forms() {
        let tokens = tokenize("} else {", Language::Cpp).unwrap();
        assert_eq!(parse_else(&tokens, Language::Cpp), Some(vec![]));

        let tokens = tokenize("else if (x) {", Language::Cpp).unwrap();
        assert_eq!(parse_else(&tokens, Language::Cpp), None);

        let tokens = tokenize("else: return n", Language::Python).unwrap();
        assert_eq!(parse_else(&tokens, Language::Python).map(|t| t.len()), Some(2));
    }
}
