//! # Introduction
//!
//! stepviz produces an educational step trace for short Python, Java and
//! C++ teaching snippets. It does not run the program: it recognizes a
//! small family of statement shapes (assignments, literal construction,
//! prints, input reads, and singly-recursive functions) and records what a
//! learner would expect to see after each one.
//!
//! ## Tracing pipeline
//!
//! ```text
//! Source → Normalizer → Router → Recognizer → Steps → TUI / JSON
//! ```
//!
//! 1. [`parser`]: normalizes lines, lexes them, and classifies each one into
//!    a [`parser::ast::StatementKind`].
//! 2. [`interpreter`]: runs the recognizer for the language, evaluates
//!    expressions, and simulates recursive calls.
//! 3. [`memory`]: values, heap objects, variable tables, and the call stack.
//! 4. [`snapshot`]: the [`Step`] record and the output log.
//! 5. [`ui`]: ratatui-based viewer; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! use stepviz::{trace, Language};
//!
//! let steps = trace("x = 2\nprint(x * 21)\n", Language::Python, &[]);
//! assert_eq!(steps.last().unwrap().output, vec!["42".to_string()]);
//! ```

pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod snapshot;
pub mod ui;

pub use interpreter::engine::{trace, TraceConfig, Tracer};
pub use parser::Language;
pub use snapshot::Step;

/// Split raw program input into lines, dropping blank ones
pub fn input_lines_from_text(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Program input from an optional input file's text followed by single
/// lines given one by one. Both go through [`input_lines_from_text`].
pub fn collect_input_lines(file_text: Option<&str>, extra_lines: &[String]) -> Vec<String> {
    let mut lines = file_text.map(input_lines_from_text).unwrap_or_default();
    for line in extra_lines {
        lines.extend(input_lines_from_text(line));
    }
    lines
}
