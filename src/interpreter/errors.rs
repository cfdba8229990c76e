//! Error types for the tracer
//!
//! Two tiers, matching how far a failure is allowed to travel:
//!
//! - [`EvalError`]: one expression could not be resolved. Always caught by
//!   the evaluator, which falls back to the expression's source text.
//! - [`TraceError`]: the run cannot continue. The engine turns it into a
//!   single error step (`source_line = -1`) and stops, keeping the steps
//!   recorded so far.

use thiserror::Error;

/// Fatal tracing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: usize },

    #[error("call depth limit of {limit} exceeded in {function}()")]
    CallDepthExceeded { function: String, limit: usize },

    #[error("no stack frame to pop")]
    EmptyCallStack,
}

/// Failures resolving a single expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("cannot resolve operand '{0}'")]
    UnresolvedOperand(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in '{0}'")]
    Overflow(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("value is not indexable")]
    NotIndexable,

    #[error("unsupported expression '{0}'")]
    Unsupported(String),

    #[error(transparent)]
    Fatal(#[from] TraceError),
}

impl EvalError {
    /// Split a fatal error out so it can be propagated past the fallback
    pub fn into_fatal(self) -> Result<EvalError, TraceError> {
        match self {
            EvalError::Fatal(e) => Err(e),
            other => Ok(other),
        }
    }
}
