//! Memory model for the tracer
//!
//! This module provides the state a trace mutates between steps:
//! - [`value`]: Typed values (Int, Float, Str, ..., HeapRef, Raw)
//! - [`stack`]: Call stack, frames, and insertion-ordered variable tables
//! - [`heap`]: Append-only heap of composite objects
//!
//! # Composite Values
//!
//! Variables never hold a list or object directly. The payload is moved
//! into a [`heap::HeapObject`] and the variable holds a reference:
//!
//! ```text
//! numbers = [1, 2, 3]   →   numbers: @1      heap #1: list [1, 2, 3]
//! ```

pub mod heap;
pub mod stack;
pub mod value;

pub use heap::{Heap, HeapId, HeapKind, HeapObject};
pub use stack::{Stack, StackFrame, Variable, VariableTable};
pub use value::Value;
