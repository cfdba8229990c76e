//! Source code pane rendering with syntax highlighting
//!
//! This module renders the traced snippet with light syntax highlighting
//! and marks the line of the current step.
//!
//! # Features
//!
//! - Keyword, type, string, number and comment highlighting per language
//! - Current line highlighting; error steps turn the pane title red
//! - The current line is kept at a fixed visual row while stepping
//!
//! # Rendering
//!
//! The pane uses a simple character-by-character scanner to apply styles
//! without running the lexer, so lines the tracer cannot lex still render.

use super::utils::pane_block;
use crate::parser::Language;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Simple syntax highlighting for one source line
fn highlight_source_code(line: &str, language: Language) -> Line<'static> {
    let mut spans = Vec::new();
    let mut current_word = String::new();
    let comment: Vec<char> = language.line_comment().chars().collect();

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Handle comments
        if chars[i..].starts_with(&comment) {
            flush_word(&mut spans, &mut current_word, false, language);
            spans.push(Span::styled(
                chars[i..].iter().collect::<String>(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        // Handle strings and character literals
        if c == '"' || c == '\'' {
            flush_word(&mut spans, &mut current_word, false, language);
            let mut end = i + 1;
            while end < chars.len() && chars[end] != c {
                end += if chars[end] == '\\' { 2 } else { 1 };
            }
            let end = (end + 1).min(chars.len());
            spans.push(Span::styled(
                chars[i..end].iter().collect::<String>(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        // Handle delimiters
        if !c.is_alphanumeric() && c != '_' {
            flush_word(&mut spans, &mut current_word, c == '(', language);
            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush_word(&mut spans, &mut current_word, false, language);
    Line::from(spans)
}

fn flush_word(spans: &mut Vec<Span<'static>>, word: &mut String, is_function: bool, language: Language) {
    if word.is_empty() {
        return;
    }
    let style = get_keyword_style(word, is_function, language);
    spans.push(Span::styled(std::mem::take(word), style));
}

fn get_keyword_style(word: &str, is_function: bool, language: Language) -> Style {
    let is_type = match language {
        Language::Python => matches!(word, "int" | "float" | "str" | "bool" | "list" | "dict"),
        Language::Java | Language::Cpp => matches!(
            word,
            "int" | "char" | "void" | "bool" | "boolean" | "float" | "double" | "long" | "short"
                | "unsigned" | "String" | "string" | "vector" | "auto"
        ),
    };
    let is_keyword = language.is_keyword(word)
        || match language {
            Language::Python => matches!(word, "in" | "not" | "and" | "or" | "is"),
            Language::Java | Language::Cpp => matches!(
                word,
                "public" | "private" | "static" | "final" | "const" | "new" | "include"
            ),
        };

    if is_type && !is_function {
        Style::default().fg(DEFAULT_THEME.type_name)
    } else if is_keyword {
        Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD)
    } else if matches!(
        word,
        "True" | "False" | "None" | "true" | "false" | "null" | "nullptr"
    ) || word.chars().all(|c| c.is_ascii_digit())
    {
        Style::default().fg(DEFAULT_THEME.number)
    } else if is_function {
        Style::default().fg(DEFAULT_THEME.function)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the current line is pinned to; centered on first render
    pub target_line_row: Option<usize>,
}

/// Data needed to render the source pane
pub struct SourceRenderData<'a> {
    pub source_code: &'a str,
    pub language: Language,
    /// 1-based line of the current step; 0 when there is none
    pub current_line: usize,
    pub is_error: bool,
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    data: SourceRenderData,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let title = format!(" Source ({}) ", data.language);
    let mut block = pane_block(&title, is_focused);
    if data.is_error {
        block = block.title_style(Style::default().fg(DEFAULT_THEME.error));
    }

    let lines: Vec<&str> = data.source_code.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    // Keep the current line at the target visual row
    if data.current_line > 0 && data.current_line <= total_lines {
        scroll_state.offset = (data.current_line - 1).saturating_sub(target_row);
        if total_lines > visible_height {
            scroll_state.offset = scroll_state.offset.min(total_lines - visible_height);
        } else {
            scroll_state.offset = 0;
        }
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == data.current_line;

            let num_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };
            let marker = if is_current { "▶" } else { " " };

            let mut content_line = highlight_source_code(line, data.language);
            if is_current {
                let bg = Style::default().bg(DEFAULT_THEME.current_line_bg);
                for span in &mut content_line.spans {
                    span.style = span.style.patch(bg);
                }
            }

            let mut final_spans = vec![Span::styled(format!("{line_num:4}{marker} "), num_style)];
            final_spans.extend(content_line.spans);
            Line::from(final_spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_python_comment_is_one_span() {
        let line = highlight_source_code("x = 1  # note", Language::Python);
        assert_eq!(texts(&line).last().map(String::as_str), Some("# note"));
    }

    #[test]
    fn test_string_keeps_escaped_quote() {
        let line = highlight_source_code(r#"cout << "a\"b";"#, Language::Cpp);
        assert!(texts(&line).contains(&r#""a\"b""#.to_string()));
    }

    #[test]
    fn test_keyword_styles() {
        let def = get_keyword_style("def", false, Language::Python);
        assert_eq!(def.fg, Some(DEFAULT_THEME.keyword));
        let call = get_keyword_style("factorial", true, Language::Java);
        assert_eq!(call.fg, Some(DEFAULT_THEME.function));
    }
}
