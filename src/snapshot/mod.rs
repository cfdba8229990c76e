// Step recording for the trace viewer

use crate::interpreter::errors::TraceError;
use crate::memory::{HeapObject, StackFrame, Variable};
use serde::Serialize;

/// Captured program output, one entry per line
///
/// The last line stays open until a newline arrives, so consecutive prints
/// without a newline (`System.out.print`, `cout << a` without `endl`) join
/// on the same line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputLog {
    lines: Vec<String>,
    open: bool,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print without newline; embedded `\n` characters split lines
    pub fn print(&mut self, text: &str) {
        let mut segments = text.split('\n');
        if let Some(first) = segments.next() {
            self.append(first);
        }
        for segment in segments {
            self.end_line();
            self.append(segment);
        }
    }

    /// Terminate the current line; an empty line is recorded if none is open
    pub fn end_line(&mut self) {
        if self.open {
            self.open = false;
        } else {
            self.lines.push(String::new());
        }
    }

    fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.lines.last_mut() {
            Some(last) if self.open => last.push_str(text),
            _ => {
                self.lines.push(text.to_string());
                self.open = true;
            }
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Immutable snapshot of the traced program at one recognized statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub index: usize,
    /// 1-based line in the original source, or -1 for the error marker
    pub source_line: i64,
    /// Outermost frame first
    pub stack_frames: Vec<StackFrame>,
    pub heap_objects: Vec<HeapObject>,
    /// Global variables in first-assignment order
    pub variables: Vec<Variable>,
    pub output: Vec<String>,
    pub description: String,
    #[serde(rename = "errorFlag")]
    pub error: bool,
}

impl Step {
    /// Frame of the innermost active call, if any
    pub fn current_frame(&self) -> Option<&StackFrame> {
        self.stack_frames.last()
    }
}

/// Collects steps in emission order and enforces the step ceiling
#[derive(Debug)]
pub struct StepRecorder {
    steps: Vec<Step>,
    max_steps: usize,
}

impl StepRecorder {
    pub fn new(max_steps: usize) -> Self {
        StepRecorder {
            steps: Vec::new(),
            max_steps,
        }
    }

    /// Index the next recorded step will get
    pub fn next_index(&self) -> usize {
        self.steps.len()
    }

    /// Append a step
    pub fn push(&mut self, step: Step) -> Result<(), TraceError> {
        if self.steps.len() >= self.max_steps {
            return Err(TraceError::StepLimitExceeded {
                limit: self.max_steps,
            });
        }
        debug_assert_eq!(step.index, self.steps.len());
        self.steps.push(step);
        Ok(())
    }

    /// Append the terminating error marker; not subject to the ceiling
    pub fn push_error(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_step(index: usize) -> Step {
        Step {
            index,
            source_line: 1,
            stack_frames: Vec::new(),
            heap_objects: Vec::new(),
            variables: Vec::new(),
            output: Vec::new(),
            description: String::new(),
            error: false,
        }
    }

    #[test]
    fn test_output_joins_until_newline() {
        let mut out = OutputLog::new();
        out.print("a");
        out.print("b");
        out.end_line();
        out.print("c\nd");
        assert_eq!(out.lines(), &["ab", "c", "d"]);
    }

    #[test]
    fn test_output_empty_lines() {
        let mut out = OutputLog::new();
        out.end_line();
        out.print("x\n");
        out.end_line();
        assert_eq!(out.lines(), &["", "x", ""]);
    }

    #[test]
    fn test_recorder_enforces_limit() {
        let mut recorder = StepRecorder::new(2);
        recorder.push(blank_step(0)).unwrap();
        recorder.push(blank_step(1)).unwrap();
        assert_eq!(
            recorder.push(blank_step(2)),
            Err(TraceError::StepLimitExceeded { limit: 2 })
        );

        recorder.push_error(blank_step(2));
        assert_eq!(recorder.len(), 3);
    }

    #[test]
    fn test_step_json_field_names() {
        let json = serde_json::to_value(blank_step(0)).unwrap();
        for key in [
            "index",
            "sourceLine",
            "stackFrames",
            "heapObjects",
            "variables",
            "output",
            "description",
            "errorFlag",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
