//! Source reading for the three teaching languages
//!
//! This module turns a snippet into classified statements:
//! - [`normalize`]: Source text → logical lines (comments and blanks dropped)
//! - [`lexer`]: One logical line → tokens
//! - [`expressions`]: Tokens → expression tree
//! - [`statements`]: Tokens → [`ast::StatementKind`]
//! - [`ast`]: Expression and statement definitions
//!
//! # Supported Subset
//!
//! Only the shapes found in classroom examples are recognized:
//! - Assignments, optionally with a declared type (`int[] a = {1, 2};`)
//! - Print / output statements in each language's idiom
//! - Input reads (`input()`, `Scanner.nextLine()`, `cin >>`)
//! - Function definitions and single-expression returns
//! - No loops or general control flow at statement level
//!
//! # Parser Implementation
//!
//! Hand-written tokenizer and precedence-climbing expression parser.
//! No external parser generator dependencies.

pub mod ast;
pub mod expressions;
pub mod language;
pub mod lexer;
pub mod normalize;
pub mod statements;

pub use language::{Language, UnknownLanguage};
pub use normalize::{normalize, LogicalLine};
