//! Per-run execution state
//!
//! [`ExecutionState`] owns everything one trace mutates: the global table,
//! the heap, the call stack, the output log, the user-function registry and
//! the input cursor. A fresh instance is created for every run and nothing
//! in it is shared, so concurrent runs cannot observe each other.

use super::errors::TraceError;
use crate::memory::{Heap, HeapId, HeapKind, Stack, StackFrame, Value, Variable, VariableTable};
use crate::parser::ast::FunctionDef;
use crate::snapshot::{OutputLog, Step};
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ExecutionState {
    globals: VariableTable,
    heap: Heap,
    stack: Stack,
    output: OutputLog,
    functions: FxHashMap<String, FunctionDef>,
    input: Vec<String>,
    input_cursor: usize,
    /// Reads attempted, including ones past the end of the input
    input_requests: usize,
}

impl ExecutionState {
    pub fn new(input: Vec<String>) -> Self {
        ExecutionState {
            input,
            ..Self::default()
        }
    }

    /// Bind `name` in the innermost frame, or globally when no call is active
    pub fn set_variable(
        &mut self,
        name: &str,
        value: Value,
        type_name: impl Into<String>,
        heap_ref: Option<HeapId>,
    ) {
        let var = Variable {
            name: name.to_string(),
            value,
            type_name: type_name.into(),
            heap_ref,
        };
        match self.stack.current_frame_mut() {
            Some(frame) => frame.locals.set(var),
            None => self.globals.set(var),
        }
    }

    /// Allocate a heap object; `references` are the names that point at it
    pub fn allocate_heap_object(
        &mut self,
        kind: HeapKind,
        label: Option<String>,
        value: Value,
        references: Vec<String>,
    ) -> HeapId {
        let id = self.heap.allocate(kind, label, value, references);
        debug!(id, %kind, "allocated heap object");
        id
    }

    pub fn add_heap_reference(&mut self, id: HeapId, name: &str) {
        self.heap.add_reference(id, name);
    }

    pub fn push_frame(&mut self, function_name: &str, entry_line: usize, locals: VariableTable) {
        self.stack.push_frame(function_name, entry_line, locals);
    }

    pub fn pop_frame(&mut self) -> Result<StackFrame, TraceError> {
        self.stack.pop_frame().ok_or(TraceError::EmptyCallStack)
    }

    /// Resolve a name: innermost frame, then enclosing frames, then globals
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.stack
            .frames()
            .iter()
            .rev()
            .find_map(|frame| frame.locals.get(name))
            .or_else(|| self.globals.get(name))
    }

    /// Consume the next input line; exhausted input reads as an empty string
    pub fn read_input(&mut self) -> String {
        self.input_requests += 1;
        match self.input.get(self.input_cursor) {
            Some(line) => {
                self.input_cursor += 1;
                line.clone()
            }
            None => {
                debug!(cursor = self.input_cursor, "input exhausted");
                String::new()
            }
        }
    }

    /// Number of input lines consumed so far
    pub fn input_consumed(&self) -> usize {
        self.input_cursor
    }

    /// Number of reads so far, successful or not
    pub fn input_requests(&self) -> usize {
        self.input_requests
    }

    pub fn define_function(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.clone(), def);
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    pub fn is_user_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn print(&mut self, text: &str) {
        self.output.print(text);
    }

    pub fn end_line(&mut self) {
        self.output.end_line();
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn globals(&self) -> &VariableTable {
        &self.globals
    }

    pub fn output(&self) -> &OutputLog {
        &self.output
    }

    /// Deep copy of the current state as a step
    pub fn capture(&self, index: usize, source_line: i64, description: String, error: bool) -> Step {
        Step {
            index,
            source_line,
            stack_frames: self.stack.frames().to_vec(),
            heap_objects: self.heap.objects(),
            variables: self.globals.iter().cloned().collect(),
            output: self.output.lines().to_vec(),
            description,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_prefers_innermost_scope() {
        let mut state = ExecutionState::new(Vec::new());
        state.set_variable("n", Value::Int(1), "int", None);
        state.push_frame("f", 3, VariableTable::new());
        state.set_variable("n", Value::Int(2), "int", None);
        state.push_frame("g", 4, VariableTable::new());

        assert_eq!(state.lookup("n").unwrap().value, Value::Int(2));

        state.pop_frame().unwrap();
        state.pop_frame().unwrap();
        assert_eq!(state.lookup("n").unwrap().value, Value::Int(1));
        assert_eq!(state.pop_frame(), Err(TraceError::EmptyCallStack));
    }

    #[test]
    fn test_input_cursor() {
        let mut state = ExecutionState::new(vec!["Ada".into()]);
        assert_eq!(state.read_input(), "Ada");
        assert_eq!(state.read_input(), "");
        assert_eq!(state.input_consumed(), 1);
        assert_eq!(state.input_requests(), 2);
    }

    #[test]
    fn test_capture_is_a_copy() {
        let mut state = ExecutionState::new(Vec::new());
        state.set_variable("x", Value::Int(1), "int", None);
        let step = state.capture(0, 1, "x = 1".into(), false);
        state.set_variable("x", Value::Int(2), "int", None);

        assert_eq!(step.variables[0].value, Value::Int(1));
    }
}
