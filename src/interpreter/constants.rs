// Constants for the tracer

/// First heap object id handed out in a run
pub const HEAP_ID_START: u64 = 1;

/// Default ceiling on recorded steps per run
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Default ceiling on simulated call depth
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Largest list built by `new T[n]` or list concatenation
pub const MAX_ARRAY_LENGTH: usize = 1_000;

/// Longest string concatenation or repetition may build, in bytes
pub const MAX_STRING_LENGTH: usize = 1 << 16;
