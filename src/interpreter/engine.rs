// Trace engine: drives one recognizer over a snippet and records steps

use crate::interpreter::constants::{DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STEPS};
use crate::interpreter::errors::TraceError;
use crate::interpreter::state::ExecutionState;
use crate::memory::Value;
use crate::parser::{normalize, Language};
use crate::snapshot::{Step, StepRecorder};
use tracing::{info, warn};

/// Limits for one trace run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceConfig {
    /// Maximum number of steps before the run is aborted
    pub max_steps: usize,
    /// Maximum nesting of simulated calls
    pub max_call_depth: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        TraceConfig {
            max_steps: DEFAULT_MAX_STEPS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Reusable tracer with fixed limits
#[derive(Debug, Clone, Default)]
pub struct Tracer {
    config: TraceConfig,
}

impl Tracer {
    pub fn new(config: TraceConfig) -> Self {
        Tracer { config }
    }

    pub fn config(&self) -> TraceConfig {
        self.config
    }

    /// Trace `source` with the given program input lines
    ///
    /// Never fails: a fatal problem ends the trace with one error step
    /// (`source_line == -1`) after the steps recorded so far.
    pub fn trace(&self, source: &str, language: Language, input: &[String]) -> Vec<Step> {
        let lines = normalize(source, language);
        info!(%language, lines = lines.len(), inputs = input.len(), "starting trace");

        let interpreter = Interpreter::new(language, self.config, input.to_vec());
        interpreter.run(&lines)
    }
}

/// Trace with default limits
pub fn trace(source: &str, language: Language, input: &[String]) -> Vec<Step> {
    Tracer::default().trace(source, language, input)
}

/// The interpreter state for one run
pub struct Interpreter {
    pub(crate) state: ExecutionState,

    recorder: StepRecorder,

    pub(crate) language: Language,

    pub(crate) config: TraceConfig,

    /// Line of the statement being executed
    pub(crate) current_line: usize,

    /// While unwinding a simulated recursion, the value a self-call stands for
    pub(crate) pending_return: Option<(String, Value)>,
}

impl Interpreter {
    pub fn new(language: Language, config: TraceConfig, input: Vec<String>) -> Self {
        Interpreter {
            state: ExecutionState::new(input),
            recorder: StepRecorder::new(config.max_steps),
            language,
            config,
            current_line: 0,
            pending_return: None,
        }
    }

    /// Run the language's recognizer over `lines` and return every step
    pub fn run(mut self, lines: &[crate::parser::LogicalLine]) -> Vec<Step> {
        let result = match self.language {
            Language::Python => self.run_indented(lines),
            Language::Java | Language::Cpp => self.run_braced(lines),
        };

        if let Err(e) = result {
            warn!(error = %e, steps = self.recorder.len(), "trace aborted");
            let step = self
                .state
                .capture(self.recorder.next_index(), -1, format!("Error: {e}"), true);
            self.recorder.push_error(step);
        } else {
            info!(steps = self.recorder.len(), "trace finished");
        }

        self.recorder.into_steps()
    }

    /// Record a step for `line` with the current state
    pub(crate) fn record(
        &mut self,
        line: usize,
        description: impl Into<String>,
    ) -> Result<(), TraceError> {
        let step = self.state.capture(
            self.recorder.next_index(),
            line as i64,
            description.into(),
            false,
        );
        self.recorder.push(step)
    }

    /// Number of steps recorded so far
    pub(crate) fn steps_recorded(&self) -> usize {
        self.recorder.len()
    }
}
