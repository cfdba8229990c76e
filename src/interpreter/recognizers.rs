//! Statement recognizers
//!
//! Two scans walk the normalized lines, one per language family:
//!
//! - [`Interpreter::run_indented`] (Python) executes module-level lines in
//!   order. Block extent is decided by indentation.
//! - [`Interpreter::run_braced`] (Java, C++) only executes the lines nested
//!   in `main`. Block extent is decided by brace counting.
//!
//! Both classify every line once and hand the resulting [`StatementKind`]
//! to [`Interpreter::execute_statement`]. Lines outside the supported
//! subset (loops, conditionals, class bodies) are skipped without a step,
//! together with the block they open.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::TraceError;
use crate::memory::{HeapKind, Value, VariableTable};
use crate::parser::ast::{Expr, FunctionDef, FunctionHeader, PrintPiece, StatementKind};
use crate::parser::normalize::brace_balance;
use crate::parser::statements::classify;
use crate::parser::{Language, LogicalLine};
use tracing::trace;

/// Whether the scan goes on after a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

impl Interpreter {
    /// Python: module-level lines in order, definitions registered as met
    pub(crate) fn run_indented(&mut self, lines: &[LogicalLine]) -> Result<(), TraceError> {
        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            let end = indented_block_end(lines, i);
            self.current_line = line.number;

            match classify(&line.text, self.language) {
                StatementKind::Definition(header) => {
                    let mut body = Vec::new();
                    if let Some(text) = &header.inline_body {
                        body.push(LogicalLine::new(line.number, line.indent + 4, text.as_str()));
                    }
                    body.extend_from_slice(&lines[i + 1..end]);
                    let name = header.name.clone();
                    self.register_function(header, line.number, body);
                    self.record(line.number, format!("Define function: {name}"))?;
                    i = end;
                }
                StatementKind::Unrecognized => {
                    if is_main_guard(&line.text) {
                        // The guarded block runs as module-level code
                        i += 1;
                    } else if line.text.ends_with(':') {
                        trace!(line = line.number, text = %line.text, "skipping block");
                        i = end;
                    } else {
                        trace!(line = line.number, text = %line.text, "skipping line");
                        i += 1;
                    }
                }
                kind => {
                    if self.execute_statement(kind, line.number)? == Flow::Stop {
                        return Ok(());
                    }
                    i += 1;
                }
            }
        }
        Ok(())
    }

    /// Java/C++: register every function, then trace `main`
    pub(crate) fn run_braced(&mut self, lines: &[LogicalLine]) -> Result<(), TraceError> {
        // Functions may be defined after main and still be called from it
        let mut i = 0;
        while i < lines.len() {
            let end = braced_block_end(lines, i);
            match classify(&lines[i].text, self.language) {
                StatementKind::Definition(header) if header.name != "main" => {
                    if let Some(body) = braced_body(lines, i, end, &header) {
                        self.register_function(header, lines[i].number, body);
                    }
                    i = end;
                }
                StatementKind::Definition(_) => i = end,
                _ => i += 1,
            }
        }

        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            self.current_line = line.number;
            let end = braced_block_end(lines, i);

            match classify(&line.text, self.language) {
                StatementKind::Definition(header) if header.name == "main" => {
                    return self.run_main(lines, i, end);
                }
                StatementKind::Definition(header) => {
                    if braced_body(lines, i, end, &header).is_some() {
                        self.record(line.number, format!("Define function: {}", header.name))?;
                    }
                    i = end;
                }
                _ => {
                    // Class headers and declarations: keep scanning inside
                    trace!(line = line.number, text = %line.text, "outside main");
                    i += 1;
                }
            }
        }
        Ok(())
    }

    /// Trace the body of `main`, lines `start..end`
    fn run_main(&mut self, lines: &[LogicalLine], start: usize, end: usize) -> Result<(), TraceError> {
        let entry = lines[start].number;
        self.state.push_frame("main", entry, VariableTable::new());
        self.record(entry, format!("Enter {}", self.main_name()))?;

        let mut i = start + 1;
        if lines.get(i).is_some_and(|l| l.text == "{") {
            i += 1;
        }
        while i < end {
            let line = &lines[i];
            self.current_line = line.number;

            match classify(&line.text, self.language) {
                StatementKind::Unrecognized | StatementKind::Definition(_) => {
                    let (opens, closes) = brace_balance(&line.text);
                    if opens > closes {
                        trace!(line = line.number, text = %line.text, "skipping block");
                        i = braced_block_end(lines, i);
                        continue;
                    }
                    trace!(line = line.number, text = %line.text, "skipping line");
                }
                kind => {
                    if self.execute_statement(kind, line.number)? == Flow::Stop {
                        return Ok(());
                    }
                }
            }
            i += 1;
        }

        // Closing brace, or the last line when the source ends inside main
        let last = lines[end.saturating_sub(1).max(start)].number;
        self.exit_main(last)
    }

    fn exit_main(&mut self, line: usize) -> Result<(), TraceError> {
        self.state.pop_frame()?;
        self.record(line, format!("Exit {}", self.main_name()))
    }

    fn main_name(&self) -> &'static str {
        match self.language {
            Language::Java => "main method",
            Language::Python | Language::Cpp => "main function",
        }
    }

    fn register_function(&mut self, header: FunctionHeader, line: usize, body: Vec<LogicalLine>) {
        self.state.define_function(FunctionDef {
            name: header.name,
            params: header.params,
            line,
            body,
        });
    }

    /// Apply one classified statement and record its step
    pub(crate) fn execute_statement(
        &mut self,
        kind: StatementKind,
        line: usize,
    ) -> Result<Flow, TraceError> {
        match kind {
            StatementKind::Assignment {
                declared_type,
                target,
                op,
                value,
            } => {
                let expr = match op.binary() {
                    Some(op) => Expr::Binary {
                        op,
                        left: Box::new(Expr::Var(target.clone())),
                        right: Box::new(value),
                    },
                    None => value,
                };
                let requests = self.state.input_requests();
                let value = self.evaluate(&expr)?;
                let from_input = self.state.input_requests() > requests;
                self.assign(&target, declared_type.as_deref(), &expr, value, from_input, line)?;
            }
            StatementKind::Read { targets } => {
                let mut parts = Vec::with_capacity(targets.len());
                for target in &targets {
                    let text = self.state.read_input();
                    let type_name = self.state.lookup(target).map(|v| v.type_name.clone());
                    let value = input_value(text, type_name.as_deref());
                    let type_name = type_name.unwrap_or_else(|| self.type_name_of(&value));
                    parts.push(format!("{target} = \"{}\" (from input)", self.display(&value)));
                    self.state.set_variable(target, value, type_name, None);
                }
                self.record(line, parts.join("; "))?;
            }
            StatementKind::Print(pieces) => {
                let mut rendered = Vec::with_capacity(pieces.len());
                for piece in &pieces {
                    rendered.push(match piece {
                        PrintPiece::Value(expr) => {
                            let value = self.evaluate(expr)?;
                            Some(self.display(&value))
                        }
                        PrintPiece::Newline => None,
                    });
                }

                let mut text = String::new();
                for piece in rendered {
                    match piece {
                        Some(s) => {
                            self.state.print(&s);
                            text.push_str(&s);
                        }
                        None => self.state.end_line(),
                    }
                }
                let verb = match self.language {
                    Language::Cpp => "Output",
                    Language::Python | Language::Java => "Print",
                };
                self.record(line, format!("{verb}: {}", text.trim_end_matches('\n')))?;
            }
            StatementKind::Return(_) => {
                match self.language {
                    Language::Python => self.record(line, "Exit program")?,
                    Language::Java | Language::Cpp => {
                        self.record(line, "Return from main")?;
                        self.exit_main(line)?;
                    }
                }
                return Ok(Flow::Stop);
            }
            StatementKind::Call(expr) => {
                let before = self.steps_recorded();
                self.evaluate(&expr)?;
                if self.steps_recorded() == before {
                    self.record(line, format!("Call {expr}"))?;
                }
            }
            StatementKind::Definition(_) | StatementKind::Unrecognized => {}
        }
        Ok(Flow::Continue)
    }

    /// Bind `target` to an evaluated value; composites land on the heap
    fn assign(
        &mut self,
        target: &str,
        declared_type: Option<&str>,
        expr: &Expr,
        value: Value,
        from_input: bool,
        line: usize,
    ) -> Result<(), TraceError> {
        if value.is_composite() {
            let kind = self.heap_kind(&value, declared_type);
            let label = match expr {
                Expr::New { class, .. } => Some(class.clone()),
                Expr::NewArray { element, .. } => Some(format!("{element}[]")),
                _ => declared_type.map(str::to_string),
            };
            let type_name = label
                .clone()
                .unwrap_or_else(|| value.type_name(self.language).to_string());
            let shown = self.display(&value);
            let id = self
                .state
                .allocate_heap_object(kind, label, value, vec![target.to_string()]);
            self.state.set_variable(target, Value::HeapRef(id), type_name, Some(id));
            return self.record(line, format!("{target} = {shown} (heap object #{id})"));
        }

        if let Value::HeapRef(id) = value {
            self.state.add_heap_reference(id, target);
            let type_name = match declared_type {
                Some(t) => t.to_string(),
                None => self.type_name_of(&value),
            };
            let shown = self.display(&value);
            self.state.set_variable(target, value, type_name, Some(id));
            return self.record(line, format!("{target} = {shown} (heap object #{id})"));
        }

        // Brace-family variables keep their declared type on reassignment
        let type_name = match (declared_type, self.language) {
            (Some(t), _) => t.to_string(),
            (None, Language::Python) => self.type_name_of(&value),
            (None, Language::Java | Language::Cpp) => match self.state.lookup(target) {
                Some(existing) if !existing.value.is_composite() => existing.type_name.clone(),
                _ => self.type_name_of(&value),
            },
        };
        let value = match value {
            Value::Int(n) if matches!(type_name.as_str(), "double" | "float") => {
                Value::Float(n as f64)
            }
            other => other,
        };

        let shown = self.display(&value);
        let description = if from_input {
            format!("{target} = \"{shown}\" (from input)")
        } else if value.is_raw() {
            // The variable keeps its declared type; the step says what is known
            format!("{target} = {shown} (unresolved)")
        } else {
            format!("{target} = {shown} ({type_name})")
        };
        self.state.set_variable(target, value, type_name, None);
        self.record(line, description)
    }

    fn heap_kind(&self, value: &Value, declared_type: Option<&str>) -> HeapKind {
        match value {
            Value::Object(_) => HeapKind::Object,
            _ if self.language == Language::Python => HeapKind::List,
            _ => match declared_type {
                Some(t) if ["vector", "list", "List"].iter().any(|k| t.contains(k)) => {
                    HeapKind::List
                }
                _ => HeapKind::Array,
            },
        }
    }
}

/// Index one past the lines indented deeper than `lines[start]`
fn indented_block_end(lines: &[LogicalLine], start: usize) -> usize {
    let indent = lines[start].indent;
    lines[start + 1..]
        .iter()
        .position(|line| line.indent <= indent)
        .map_or(lines.len(), |offset| start + 1 + offset)
}

/// Index one past the block opened at `start`, by brace counting. A `{`
/// alone on the next line opens the block too; a line that opens nothing
/// is a block of one.
fn braced_block_end(lines: &[LogicalLine], start: usize) -> usize {
    let mut depth: i64 = 0;
    let mut opened = false;
    for (offset, line) in lines[start..].iter().enumerate() {
        if offset == 1 && !opened && !line.text.starts_with('{') {
            return start + 1;
        }
        let (opens, closes) = brace_balance(&line.text);
        depth += opens as i64 - closes as i64;
        opened |= opens > 0;
        if opened && depth <= 0 {
            return start + offset + 1;
        }
    }
    lines.len()
}

/// Body lines of a brace-family definition; `None` for a bare prototype
fn braced_body(
    lines: &[LogicalLine],
    start: usize,
    end: usize,
    header: &FunctionHeader,
) -> Option<Vec<LogicalLine>> {
    let header_line = &lines[start];
    let mut body = Vec::new();
    if let Some(text) = &header.inline_body {
        body.push(LogicalLine::new(header_line.number, header_line.indent + 4, text.as_str()));
    }
    body.extend_from_slice(&lines[start + 1..end]);

    let has_block = brace_balance(&header_line.text).0 > 0 || end > start + 1;
    has_block.then_some(body)
}

/// `if __name__ == "__main__":` in either quote style
fn is_main_guard(text: &str) -> bool {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '\'' { '"' } else { c })
        .collect();
    compact == r#"if__name__=="__main__":"#
}

/// Input text read into a variable of type `type_name`. Numeric types that
/// get non-numeric text hold it unresolved.
fn input_value(text: String, type_name: Option<&str>) -> Value {
    match type_name {
        Some("string" | "std::string") => Value::Str(text),
        Some("int" | "long" | "short" | "long long") => match text.trim().parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Raw(text),
        },
        Some("double" | "float") => match text.trim().parse::<f64>() {
            Ok(x) => Value::Float(x),
            Err(_) => Value::Raw(text),
        },
        _ => parse_input(text),
    }
}

/// Input text as the most specific scalar it spells
fn parse_input(text: String) -> Value {
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::Int(n);
    }
    if let Ok(x) = trimmed.parse::<f64>() {
        return Value::Float(x);
    }
    Value::Str(text)
}
