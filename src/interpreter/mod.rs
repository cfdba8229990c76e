//! Step-tracing engine
//!
//! This module provides the tracing logic:
//! - [`engine`]: the [`engine::Tracer`] entry point and the per-run interpreter
//! - [`state`]: the mutable execution state one run owns
//! - [`errors`]: fatal and recoverable error types
//!
//! # Execution Model
//!
//! The recognizer for the selected language walks the normalized lines and
//! classifies each one once. Every recognized statement mutates the
//! execution state and records one step; unrecognized lines are skipped.
//!
//! # User Functions
//!
//! Calls to user functions are simulated by the call simulator when the
//! function body is a guarded pair of returns with at most one self-call.
//! Other calls are recorded but produce no value.

pub mod constants;
pub mod engine;
pub mod errors;
pub mod state;

mod builtins;
mod calls;
mod expressions;
mod recognizers;

pub use expressions::display_value;
