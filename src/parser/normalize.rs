//! Source normalization
//!
//! Turns raw source text into the [`LogicalLine`]s the recognizers walk.
//! Blank lines and full-line comments are dropped; for the brace family,
//! `/* ... */` blocks are removed and C++ preprocessor lines (`#include`,
//! `#define`, ...) are skipped, matching the lexer's no-preprocessor policy.
//!
//! Line numbers always refer to the original, unfiltered source so the
//! highlighter can point at the right row.

use super::language::Language;

/// One non-empty, non-comment source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based line number in the original source
    pub number: usize,
    /// Width of the leading whitespace (tabs count as 4)
    pub indent: usize,
    /// The trimmed line text
    pub text: String,
}

impl LogicalLine {
    pub fn new(number: usize, indent: usize, text: impl Into<String>) -> Self {
        LogicalLine {
            number,
            indent,
            text: text.into(),
        }
    }
}

/// Normalize `source` for `language`
pub fn normalize(source: &str, language: Language) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut in_block_comment = false;

    for (i, raw) in source.lines().enumerate() {
        let number = i + 1;

        let stripped;
        let raw = if language.is_brace_family() {
            stripped = strip_block_comments(raw, &mut in_block_comment);
            stripped.as_str()
        } else {
            raw
        };

        let text = raw.trim();
        if text.is_empty() || text.starts_with(language.line_comment()) {
            continue;
        }
        if language == Language::Cpp && text.starts_with('#') {
            continue;
        }

        lines.push(LogicalLine::new(number, indent_width(raw), text));
    }

    lines
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Remove `/* ... */` spans from one line, carrying the open-comment state
/// across lines. Quotes are respected so `"/*"` inside a string survives.
fn strip_block_comments(line: &str, in_block_comment: &mut bool) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if *in_block_comment {
            if c == '*' && next == Some('/') {
                *in_block_comment = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        match quote {
            Some(q) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = next {
                        out.push(escaped);
                        i += 1;
                    }
                } else if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '/' && next == Some('/') {
                    // Line comment: keep the rest verbatim, the lexer drops it
                    out.extend(&chars[i..]);
                    break;
                }
                if c == '/' && next == Some('*') {
                    *in_block_comment = true;
                    i += 2;
                    continue;
                }
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
        i += 1;
    }

    out
}

/// Count the `{` and `}` on a line, ignoring string and character literals
/// and anything after a `//` comment.
pub fn brace_balance(text: &str) -> (usize, usize) {
    let mut opens = 0;
    let mut closes = 0;
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '/' if chars.peek() == Some(&'/') => break,
                '{' => opens += 1,
                '}' => closes += 1,
                _ => {}
            },
        }
    }

    (opens, closes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_comments_and_blanks() {
        let source = "# header\n\nx = 1\n    # indented comment\nprint(x)\n";
        let lines = normalize(source, Language::Python);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], LogicalLine::new(3, 0, "x = 1"));
        assert_eq!(lines[1], LogicalLine::new(5, 0, "print(x)"));
    }

    #[test]
    fn test_python_keeps_indentation() {
        let source = "def f(n):\n    return n\n\tpass";
        let lines = normalize(source, Language::Python);

        assert_eq!(lines[1].indent, 4);
        assert_eq!(lines[2].indent, 4);
        assert_eq!(lines[1].text, "return n");
    }

    #[test]
    fn test_cpp_preprocessor_and_block_comments() {
        let source = "#include <iostream>\n/* multi\n line */\nint main() { /* inline */\n  return 0;\n}";
        let lines = normalize(source, Language::Cpp);

        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["int main() {", "return 0;", "}"]);
        assert_eq!(lines[0].number, 4);
    }

    #[test]
    fn test_comment_marker_inside_string_survives() {
        let source = "String s = \"/* not a comment */\";";
        let lines = normalize(source, Language::Java);

        assert_eq!(lines[0].text, source);
    }

    #[test]
    fn test_brace_balance_ignores_strings() {
        assert_eq!(brace_balance("if (x) { s = \"}\"; }"), (1, 1));
        assert_eq!(brace_balance("} else {"), (1, 1));
        assert_eq!(brace_balance("int main() { // {"), (1, 0));
        assert_eq!(brace_balance("char c = '{';"), (0, 0));
    }
}
