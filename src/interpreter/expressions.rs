//! Expression evaluation implementation
//!
//! This module resolves parsed expressions against the execution state:
//!
//! - Literals (numbers, strings, characters, booleans, null)
//! - Composite literals (lists, initializer lists, dicts, `new`)
//! - Variables, using layered lookup (innermost frame first)
//! - Binary and unary operators with per-language division semantics
//! - Indexing into lists, strings, and objects
//! - F-string interpolation
//! - Calls (user functions, built-ins, and unknown callees)
//!
//! # Fallback
//!
//! Evaluation never aborts a trace. When an expression cannot be resolved
//! (unknown name, division by zero, overflow, mismatched operand types) the
//! result is [`Value::Raw`] holding the expression's source text. Only
//! [`TraceError`]s raised by nested calls travel further.
//!
//! # Safety
//!
//! Integer arithmetic uses checked math; overflow is an evaluation failure
//! rather than a wrapped result.

use crate::interpreter::constants::{MAX_ARRAY_LENGTH, MAX_STRING_LENGTH};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{EvalError, TraceError};
use crate::memory::{Heap, Value};
use crate::parser::ast::{BinOp, Expr, FStringPart, UnaryOp};
use crate::parser::Language;
use std::cmp::Ordering;
use tracing::debug;

/// A numeric operand after promotion
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(x) => x,
        }
    }
}

impl Interpreter {
    /// Evaluate an expression, falling back to its source text on failure
    pub(crate) fn evaluate(&mut self, expr: &Expr) -> Result<Value, TraceError> {
        match self.eval(expr) {
            Ok(value) => Ok(value),
            Err(e) => {
                let e = e.into_fatal()?;
                debug!(expr = %expr, error = %e, "expression left unresolved");
                Ok(Value::Raw(expr.to_string()))
            }
        }
    }

    /// Evaluate an expression, reporting why it cannot be resolved
    pub(crate) fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(x) => Ok(Value::Float(*x)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Char(c) => Ok(Value::Char(*c)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Unparsed(text) => Err(EvalError::Unsupported(text.clone())),

            Expr::FString(parts) => {
                let mut text = String::new();
                for part in parts {
                    match part {
                        FStringPart::Literal(s) => text.push_str(s),
                        FStringPart::Placeholder {
                            expr: Some(inner), ..
                        } => {
                            let value = self.evaluate(inner)?;
                            text.push_str(&self.display(&value));
                        }
                        FStringPart::Placeholder { source, expr: None } => text.push_str(source),
                    }
                }
                Ok(Value::Str(text))
            }

            Expr::Var(name) => Ok(match self.state.lookup(name) {
                Some(var) => var.value.clone(),
                None => Value::Raw(name.clone()),
            }),

            Expr::List(items) | Expr::Braced(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.evaluate(item)?);
                }
                Ok(Value::List(values))
            }

            Expr::Dict(pairs) => {
                let mut fields = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    let key = self.evaluate(key)?;
                    let value = self.evaluate(value)?;
                    fields.push((self.display(&key), value));
                }
                Ok(Value::Object(fields))
            }

            Expr::New { class, args } => {
                let mut fields = vec![("class".to_string(), Value::Str(class.clone()))];
                for (i, arg) in args.iter().enumerate() {
                    let value = self.evaluate(arg)?;
                    fields.push((format!("arg{i}"), value));
                }
                Ok(Value::Object(fields))
            }

            Expr::NewArray {
                element,
                length,
                init,
            } => match length {
                None => {
                    let mut values = Vec::with_capacity(init.len());
                    for item in init {
                        values.push(self.evaluate(item)?);
                    }
                    Ok(Value::List(values))
                }
                Some(length) => {
                    let len = self.eval(length)?;
                    let len = len
                        .as_int()
                        .and_then(|n| usize::try_from(n).ok())
                        .ok_or_else(|| EvalError::TypeMismatch(format!("array length {len}")))?;
                    if len > MAX_ARRAY_LENGTH {
                        return Err(EvalError::Unsupported(expr.to_string()));
                    }
                    Ok(Value::List(vec![default_element(element); len]))
                }
            },

            Expr::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                self.index_value(target, index)
            }

            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                match op {
                    UnaryOp::Neg => match self.number(&value) {
                        Some(Num::Int(n)) => n
                            .checked_neg()
                            .map(Value::Int)
                            .ok_or_else(|| EvalError::Overflow(expr.to_string())),
                        Some(Num::Float(x)) => Ok(Value::Float(-x)),
                        None => Err(EvalError::TypeMismatch(format!("cannot negate {value}"))),
                    },
                    UnaryOp::Not => self
                        .truthy(&value)
                        .map(|b| Value::Bool(!b))
                        .ok_or_else(|| EvalError::TypeMismatch(format!("not a condition: {value}"))),
                }
            }

            Expr::Binary { op, left, right } => match op {
                BinOp::And | BinOp::Or => {
                    let left = self.eval(left)?;
                    let left = self
                        .truthy(&left)
                        .ok_or_else(|| EvalError::TypeMismatch(format!("not a condition: {left}")))?;
                    // Short-circuit
                    if (*op == BinOp::And && !left) || (*op == BinOp::Or && left) {
                        return Ok(Value::Bool(left));
                    }
                    let right = self.eval(right)?;
                    self.truthy(&right)
                        .map(Value::Bool)
                        .ok_or_else(|| EvalError::TypeMismatch(format!("not a condition: {right}")))
                }
                _ => {
                    let left = self.eval(left)?;
                    let right = self.eval(right)?;
                    self.binary_op(*op, left, right)
                }
            },

            Expr::Call {
                receiver,
                name,
                args,
            } => self.eval_call(expr, receiver.as_deref(), name, args),
        }
    }

    fn eval_call(
        &mut self,
        call: &Expr,
        receiver: Option<&str>,
        name: &str,
        args: &[Expr],
    ) -> Result<Value, EvalError> {
        // While unwinding a recursion the self-call stands for its result
        if receiver.is_none() {
            if let Some((function, value)) = &self.pending_return {
                if function == name {
                    return Ok(value.clone());
                }
            }
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg)?);
        }

        if receiver.is_none() && self.state.is_user_function(name) {
            let description = format!("Call {name}({})", self.display_args(&values));
            self.record(self.current_line, description)?;
            return Ok(self.call_user_function(name, values, call)?);
        }

        match self.call_builtin(receiver, name, &values) {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => {
                let e = e.into_fatal()?;
                debug!(call = %call, error = %e, "built-in call left unresolved");
                Ok(Value::Raw(call.to_string()))
            }
            None => {
                let callee = match receiver {
                    Some(receiver) => format!("{receiver}.{name}"),
                    None => name.to_string(),
                };
                let description = format!("Call {callee}({})", self.display_args(&values));
                self.record(self.current_line, description)?;
                Ok(Value::Raw(call.to_string()))
            }
        }
    }

    pub(crate) fn binary_op(&self, op: BinOp, left: Value, right: Value) -> Result<Value, EvalError> {
        let left = self.deref(left);
        let right = self.deref(right);

        match op {
            BinOp::Add => match (&left, &right) {
                (Value::Str(_), _) | (_, Value::Str(_)) => {
                    let text = format!("{}{}", self.display(&left), self.display(&right));
                    if text.len() > MAX_STRING_LENGTH {
                        return Err(EvalError::Overflow(format!("{left} + {right}")));
                    }
                    Ok(Value::Str(text))
                }
                (Value::List(a), Value::List(b)) => {
                    if a.len() + b.len() > MAX_ARRAY_LENGTH {
                        return Err(EvalError::Overflow(format!("{left} + {right}")));
                    }
                    Ok(Value::List(a.iter().chain(b.iter()).cloned().collect()))
                }
                _ => self.arithmetic(op, &left, &right),
            },
            BinOp::Mul => match (&left, &right) {
                (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s))
                    if self.language == Language::Python =>
                {
                    let count = usize::try_from(*n).unwrap_or(0);
                    match s.len().checked_mul(count) {
                        Some(len) if len <= MAX_STRING_LENGTH => Ok(Value::Str(s.repeat(count))),
                        _ => Err(EvalError::Overflow(format!("{left} * {right}"))),
                    }
                }
                _ => self.arithmetic(op, &left, &right),
            },
            BinOp::Sub | BinOp::Div | BinOp::FloorDiv | BinOp::Mod => {
                self.arithmetic(op, &left, &right)
            }
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                self.compare(op, &left, &right)
            }
            BinOp::And | BinOp::Or => {
                let l = self.truthy(&left);
                let r = self.truthy(&right);
                match (l, r) {
                    (Some(l), Some(r)) if op == BinOp::And => Ok(Value::Bool(l && r)),
                    (Some(l), Some(r)) => Ok(Value::Bool(l || r)),
                    _ => Err(EvalError::TypeMismatch(format!("{left} {} {right}", op.symbol()))),
                }
            }
        }
    }

    fn arithmetic(&self, op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
        let (a, b) = match (self.number(left), self.number(right)) {
            (Some(a), Some(b)) => (a, b),
            _ if left.is_raw() || right.is_raw() => {
                return Err(EvalError::UnresolvedOperand(format!(
                    "{left} {} {right}",
                    op.symbol()
                )))
            }
            _ => {
                return Err(EvalError::TypeMismatch(format!(
                    "{left} {} {right}",
                    op.symbol()
                )))
            }
        };

        match (a, b) {
            (Num::Int(a), Num::Int(b)) => self.int_arithmetic(op, a, b),
            _ => float_arithmetic(op, a.as_f64(), b.as_f64(), self.language),
        }
    }

    fn int_arithmetic(&self, op: BinOp, a: i64, b: i64) -> Result<Value, EvalError> {
        let python = self.language == Language::Python;
        let overflow = || EvalError::Overflow(format!("{a} {} {b}", op.symbol()));

        let result = match op {
            BinOp::Add => a.checked_add(b).ok_or_else(overflow)?,
            BinOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
            BinOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
            BinOp::Div | BinOp::FloorDiv | BinOp::Mod if b == 0 => {
                return Err(EvalError::DivisionByZero)
            }
            // Python true division always yields a float
            BinOp::Div if python => return Ok(Value::Float(a as f64 / b as f64)),
            BinOp::Div => a.checked_div(b).ok_or_else(overflow)?,
            BinOp::FloorDiv => floor_div(a, b).ok_or_else(overflow)?,
            BinOp::Mod if python => {
                let q = floor_div(a, b).ok_or_else(overflow)?;
                a - q * b
            }
            BinOp::Mod => a.checked_rem(b).ok_or_else(overflow)?,
            _ => return Err(EvalError::Unsupported(op.symbol().to_string())),
        };
        Ok(Value::Int(result))
    }

    fn compare(&self, op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
        if left.is_raw() || right.is_raw() {
            return Err(EvalError::UnresolvedOperand(format!(
                "{left} {} {right}",
                op.symbol()
            )));
        }

        let ordering = match (self.number(left), self.number(right)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => Some(a.cmp(&b)),
            (Some(a), Some(b)) => a.as_f64().partial_cmp(&b.as_f64()),
            _ => match (left, right) {
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
                (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
                _ => None,
            },
        };

        let result = match (op, ordering) {
            (BinOp::Eq, Some(o)) => o == Ordering::Equal,
            (BinOp::Ne, Some(o)) => o != Ordering::Equal,
            (BinOp::Eq, None) => left == right,
            (BinOp::Ne, None) => left != right,
            (BinOp::Lt, Some(o)) => o == Ordering::Less,
            (BinOp::Le, Some(o)) => o != Ordering::Greater,
            (BinOp::Gt, Some(o)) => o == Ordering::Greater,
            (BinOp::Ge, Some(o)) => o != Ordering::Less,
            _ => {
                return Err(EvalError::TypeMismatch(format!(
                    "{left} {} {right}",
                    op.symbol()
                )))
            }
        };
        Ok(Value::Bool(result))
    }

    fn index_value(&self, target: Value, index: Value) -> Result<Value, EvalError> {
        let target = self.deref(target);
        if target.is_raw() || index.is_raw() {
            return Err(EvalError::UnresolvedOperand(format!("{target}[{index}]")));
        }

        match (&target, &index) {
            (Value::List(items), Value::Int(i)) => {
                let position = self.resolve_index(*i, items.len())?;
                Ok(items[position].clone())
            }
            (Value::Str(s), Value::Int(i)) => {
                let chars: Vec<char> = s.chars().collect();
                let c = chars[self.resolve_index(*i, chars.len())?];
                Ok(match self.language {
                    Language::Python => Value::Str(c.to_string()),
                    Language::Java | Language::Cpp => Value::Char(c),
                })
            }
            (Value::Object(fields), key) => {
                let key = self.display(key);
                fields
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, value)| value.clone())
                    .ok_or(EvalError::UnresolvedOperand(key))
            }
            _ => Err(EvalError::NotIndexable),
        }
    }

    /// Bounds-check an index; Python also accepts negative indices
    fn resolve_index(&self, index: i64, len: usize) -> Result<usize, EvalError> {
        let resolved = if index < 0 && self.language == Language::Python {
            index + len as i64
        } else {
            index
        };
        usize::try_from(resolved)
            .ok()
            .filter(|&i| i < len)
            .ok_or(EvalError::IndexOutOfRange { index, len })
    }

    /// Condition value of `value`; `None` when it is not usable as a condition
    pub(crate) fn truthy(&self, value: &Value) -> Option<bool> {
        match (value, self.language) {
            (Value::Bool(b), _) => Some(*b),
            (Value::Int(n), Language::Python | Language::Cpp) => Some(*n != 0),
            (Value::Float(x), Language::Python | Language::Cpp) => Some(*x != 0.0),
            (Value::Null, Language::Python | Language::Cpp) => Some(false),
            (Value::Str(s), Language::Python) => Some(!s.is_empty()),
            (Value::HeapRef(_) | Value::List(_) | Value::Object(_), Language::Python) => {
                match self.deref(value.clone()) {
                    Value::List(items) => Some(!items.is_empty()),
                    Value::Object(fields) => Some(!fields.is_empty()),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn number(&self, value: &Value) -> Option<Num> {
        match value {
            Value::Int(n) => Some(Num::Int(*n)),
            Value::Float(x) => Some(Num::Float(*x)),
            Value::Char(c) if self.language.is_brace_family() => Some(Num::Int(*c as i64)),
            _ => None,
        }
    }

    /// Replace a heap reference by the object's payload
    pub(crate) fn deref(&self, value: Value) -> Value {
        match value {
            Value::HeapRef(id) => match self.state.heap().get(id) {
                Some(object) => object.value.clone(),
                None => Value::HeapRef(id),
            },
            other => other,
        }
    }

    /// Text of a value as the traced program would print it
    pub(crate) fn display(&self, value: &Value) -> String {
        display_value(value, self.state.heap(), self.language)
    }

    pub(crate) fn display_args(&self, values: &[Value]) -> String {
        values
            .iter()
            .map(|v| self.display(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Display type of a value; heap references report the object's label
    pub(crate) fn type_name_of(&self, value: &Value) -> String {
        match value {
            Value::HeapRef(id) => match self.state.heap().get(*id) {
                Some(object) => object
                    .label
                    .clone()
                    .unwrap_or_else(|| object.value.type_name(self.language).to_string()),
                None => value.type_name(self.language).to_string(),
            },
            other => other.type_name(self.language).to_string(),
        }
    }
}

/// Floor division; `None` on overflow
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

fn float_arithmetic(op: BinOp, a: f64, b: f64, language: Language) -> Result<Value, EvalError> {
    if matches!(op, BinOp::Div | BinOp::FloorDiv | BinOp::Mod) && b == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::FloorDiv => (a / b).floor(),
        BinOp::Mod if language == Language::Python => a - b * (a / b).floor(),
        BinOp::Mod => a % b,
        _ => return Err(EvalError::Unsupported(op.symbol().to_string())),
    };
    Ok(Value::Float(result))
}

/// Zero value for `new T[n]`
fn default_element(element: &str) -> Value {
    match element {
        "int" | "long" | "short" | "byte" => Value::Int(0),
        "double" | "float" => Value::Float(0.0),
        "boolean" | "bool" => Value::Bool(false),
        "char" => Value::Char('\0'),
        _ => Value::Null,
    }
}

/// Text of a value as a program in `language` would print it; heap
/// references print the object they point to
pub fn display_value(value: &Value, heap: &Heap, language: Language) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::Float(x) => match language {
            Language::Python | Language::Java => format!("{x:?}"),
            Language::Cpp => format!("{x}"),
        },
        Value::Str(s) | Value::Raw(s) => s.clone(),
        Value::Char(c) => c.to_string(),
        Value::Bool(b) => match (language, b) {
            (Language::Python, true) => "True".to_string(),
            (Language::Python, false) => "False".to_string(),
            (_, b) => b.to_string(),
        },
        Value::Null => match language {
            Language::Python => "None",
            Language::Java => "null",
            Language::Cpp => "nullptr",
        }
        .to_string(),
        Value::List(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| element_text(item, heap, language))
                .collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(key, value)| match language {
                    Language::Python => {
                        format!("'{key}': {}", element_text(value, heap, language))
                    }
                    Language::Java | Language::Cpp => {
                        format!("{key}={}", element_text(value, heap, language))
                    }
                })
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Value::HeapRef(id) => match heap.get(*id) {
            Some(object) => display_value(&object.value, heap, language),
            None => format!("@{id}"),
        },
    }
}

/// Elements inside a printed composite: strings are quoted
fn element_text(value: &Value, heap: &Heap, language: Language) -> String {
    match (value, language) {
        (Value::Str(s), Language::Python) => format!("'{s}'"),
        (Value::Str(s), _) => format!("\"{s}\""),
        (Value::Char(c), _) => format!("'{c}'"),
        _ => display_value(value, heap, language),
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::{Interpreter, TraceConfig};
    use crate::memory::Value;
    use crate::parser::expressions::parse_expression_text;
    use crate::parser::Language;

    fn eval_in(language: Language, text: &str) -> Value {
        let mut interp = Interpreter::new(language, TraceConfig::default(), Vec::new());
        let expr = parse_expression_text(text, language).unwrap();
        interp.evaluate(&expr).unwrap()
    }

    #[test]
    fn test_division_follows_language() {
        assert_eq!(eval_in(Language::Python, "7 / 2"), Value::Float(3.5));
        assert_eq!(eval_in(Language::Java, "7 / 2"), Value::Int(3));
        assert_eq!(eval_in(Language::Python, "-7 // 2"), Value::Int(-4));
        assert_eq!(eval_in(Language::Python, "-7 % 3"), Value::Int(2));
        assert_eq!(eval_in(Language::Cpp, "-7 % 3"), Value::Int(-1));
    }

    #[test]
    fn test_failures_fall_back_to_source_text() {
        assert_eq!(eval_in(Language::Python, "1 / 0"), Value::Raw("1 / 0".into()));
        assert_eq!(
            eval_in(Language::Java, "9223372036854775807 + 1"),
            Value::Raw("9223372036854775807 + 1".into())
        );
        assert_eq!(eval_in(Language::Python, "missing"), Value::Raw("missing".into()));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(
            eval_in(Language::Java, "\"Sum: \" + 3 + 4"),
            Value::Str("Sum: 34".into())
        );
        assert_eq!(
            eval_in(Language::Python, "'Flag: ' + True"),
            Value::Str("Flag: True".into())
        );
        assert_eq!(eval_in(Language::Python, "'ab' * 2"), Value::Str("abab".into()));
        assert_eq!(eval_in(Language::Python, "'ab' * -3"), Value::Str(String::new()));
    }

    #[test]
    fn test_huge_repetition_falls_back_to_source_text() {
        assert_eq!(
            eval_in(Language::Python, "'ab' * 9223372036854775807"),
            Value::Raw("\"ab\" * 9223372036854775807".into())
        );
        assert_eq!(
            eval_in(Language::Python, "3 * 'a' * 1000000000"),
            Value::Raw("3 * \"a\" * 1000000000".into())
        );
    }

    #[test]
    fn test_comparisons_and_logic() {
        assert_eq!(eval_in(Language::Python, "1 <= 1.0"), Value::Bool(true));
        assert_eq!(eval_in(Language::Java, "'a' < 'b'"), Value::Bool(true));
        assert_eq!(eval_in(Language::Python, "not 0 and 3 > 2"), Value::Bool(true));
    }

    #[test]
    fn test_indexing() {
        assert_eq!(eval_in(Language::Python, "[1, 2, 3][-1]"), Value::Int(3));
        assert_eq!(eval_in(Language::Java, "\"abc\"[1]"), Value::Char('b'));
        assert_eq!(
            eval_in(Language::Python, "[1, 2][5]"),
            Value::Raw("[1, 2][5]".into())
        );
    }

    #[test]
    fn test_fstring_keeps_unknown_names() {
        assert_eq!(
            eval_in(Language::Python, "f\"Hello {who}!\""),
            Value::Str("Hello who!".into())
        );
    }

    #[test]
    fn test_display_per_language() {
        let heap = crate::memory::Heap::new();
        let list = Value::List(vec![Value::Str("a".into()), Value::Bool(true)]);
        assert_eq!(
            super::display_value(&list, &heap, Language::Python),
            "['a', True]"
        );
        assert_eq!(
            super::display_value(&list, &heap, Language::Java),
            "[\"a\", true]"
        );
        assert_eq!(
            super::display_value(&Value::Float(5.0), &heap, Language::Cpp),
            "5"
        );
    }
}
