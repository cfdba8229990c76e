//! Call stack and variable tables
//!
//! This module provides:
//! - [`Variable`]: one named binding with its display type
//! - [`VariableTable`]: an insertion-ordered table of variables
//! - [`StackFrame`]: a simulated function activation with its locals
//! - [`Stack`]: the LIFO call stack
//!
//! # Ordering
//!
//! Tables are hash maps for lookup plus an explicit insertion-order list, so
//! snapshots list variables in the order they were first assigned no matter
//! how the map iterates. Reassignment overwrites in place and keeps the
//! original position.

use super::heap::HeapId;
use super::value::Value;
use rustc_hash::FxHashMap;
use serde::ser::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    pub value: Value,
    pub type_name: String,
    pub heap_ref: Option<HeapId>,
}

/// Variables of one scope (the globals, or one frame's locals)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTable {
    vars: FxHashMap<String, Variable>,
    insertion_order: Vec<String>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a variable
    pub fn set(&mut self, var: Variable) {
        if !self.vars.contains_key(&var.name) {
            self.insertion_order.push(var.name.clone());
        }
        self.vars.insert(var.name.clone(), var);
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variables in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.vars.get(name))
    }
}

impl Serialize for VariableTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Stack frame for a simulated call
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    /// `{function}_{depth}`
    pub id: String,
    pub function_name: String,
    /// Source line of the call site
    pub entry_line: usize,
    pub locals: VariableTable,
}

impl StackFrame {
    pub fn new(function_name: &str, depth: usize, entry_line: usize, locals: VariableTable) -> Self {
        StackFrame {
            id: format!("{function_name}_{depth}"),
            function_name: function_name.to_string(),
            entry_line,
            locals,
        }
    }
}

/// The call stack
#[derive(Debug, Clone, Default)]
pub struct Stack {
    frames: Vec<StackFrame>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame; its id uses the depth it lands at
    pub fn push_frame(&mut self, function_name: &str, entry_line: usize, locals: VariableTable) {
        let frame = StackFrame::new(function_name, self.frames.len(), entry_line, locals);
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) -> Option<StackFrame> {
        self.frames.pop()
    }

    pub fn current_frame(&self) -> Option<&StackFrame> {
        self.frames.last()
    }

    pub fn current_frame_mut(&mut self) -> Option<&mut StackFrame> {
        self.frames.last_mut()
    }

    /// Frames from outermost to innermost
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, n: i64) -> Variable {
        Variable {
            name: name.to_string(),
            value: Value::Int(n),
            type_name: "int".to_string(),
            heap_ref: None,
        }
    }

    #[test]
    fn test_table_keeps_first_insertion_order() {
        let mut table = VariableTable::new();
        table.set(var("b", 1));
        table.set(var("a", 2));
        table.set(var("b", 3));

        let names: Vec<&str> = table.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(table.get("b").unwrap().value, Value::Int(3));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_frame_ids_use_depth() {
        let mut stack = Stack::new();
        stack.push_frame("main", 1, VariableTable::new());
        stack.push_frame("factorial", 4, VariableTable::new());

        assert_eq!(stack.frames()[0].id, "main_0");
        assert_eq!(stack.current_frame().unwrap().id, "factorial_1");
        assert_eq!(stack.pop_frame().unwrap().entry_line, 4);
        assert_eq!(stack.depth(), 1);
    }
}
