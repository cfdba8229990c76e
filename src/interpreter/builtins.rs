//! Built-in function implementations
//!
//! Functions the tracer resolves itself instead of treating them as
//! unknown calls.
//!
//! # Input Primitives
//!
//! Each consumes the next unread input line; exhausted input reads as `""`.
//! Numeric reads of text that is not a number yield [`Value::Raw`].
//!
//! - Python: `input(prompt?)` (the prompt is not echoed to the output)
//! - Java: `<scanner>.nextLine()`, `.next()`, `.nextInt()`, `.nextDouble()`
//! - C++: `cin >>` and `getline` are statements, see the recognizers
//!
//! # Conversions and Helpers
//!
//! - Python: `int`, `float`, `str`, `len`, `abs`, `max`, `min`
//! - Java: `Integer.parseInt`, `Double.parseDouble`, `String.valueOf`,
//!   `Math.abs`, `Math.max`, `Math.min`
//! - C++: `stoi`, `stod`, `to_string`, `abs`, `max`, `min` (with or
//!   without `std::`)
//!
//! All built-ins are implemented as methods on the [`Interpreter`] struct.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::EvalError;
use crate::memory::Value;
use crate::parser::ast::BinOp;
use crate::parser::Language;

/// Pure built-ins, resolved after the input primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    ToInt,
    ToFloat,
    ToStr,
    Len,
    Abs,
    Max,
    Min,
}

impl Interpreter {
    /// Resolve a built-in call. `None` means `name` is not a built-in.
    pub(crate) fn call_builtin(
        &mut self,
        receiver: Option<&str>,
        name: &str,
        args: &[Value],
    ) -> Option<Result<Value, EvalError>> {
        use Language::*;

        // Input primitives
        match (self.language, receiver, name) {
            (Python, None, "input") => return Some(Ok(Value::Str(self.state.read_input()))),
            (Java, Some(_), "nextLine") => return Some(Ok(Value::Str(self.state.read_input()))),
            (Java, Some(_), "next") => {
                let line = self.state.read_input();
                let word = line.split_whitespace().next().unwrap_or_default();
                return Some(Ok(Value::Str(word.to_string())));
            }
            // Text that is not a number stays unresolved rather than a string
            (Java, Some(_), "nextInt" | "nextLong") => {
                let line = self.state.read_input();
                return Some(Ok(match line.trim().parse::<i64>() {
                    Ok(n) => Value::Int(n),
                    Err(_) => Value::Raw(line),
                }));
            }
            (Java, Some(_), "nextDouble") => {
                let line = self.state.read_input();
                return Some(Ok(match line.trim().parse::<f64>() {
                    Ok(x) => Value::Float(x),
                    Err(_) => Value::Raw(line),
                }));
            }
            _ => {}
        }

        let builtin = match (self.language, receiver, name) {
            (Python, None, "int") => Builtin::ToInt,
            (Python, None, "float") => Builtin::ToFloat,
            (Python, None, "str") => Builtin::ToStr,
            (Python, None, "len") => Builtin::Len,
            (Python, None, "abs") => Builtin::Abs,
            (Python, None, "max") => Builtin::Max,
            (Python, None, "min") => Builtin::Min,

            (Java, Some("Integer"), "parseInt") => Builtin::ToInt,
            (Java, Some("Double"), "parseDouble") => Builtin::ToFloat,
            (Java, Some("String"), "valueOf") => Builtin::ToStr,
            (Java, Some("Math"), "abs") => Builtin::Abs,
            (Java, Some("Math"), "max") => Builtin::Max,
            (Java, Some("Math"), "min") => Builtin::Min,

            (Cpp, None | Some("std"), "stoi") => Builtin::ToInt,
            (Cpp, None | Some("std"), "stod") => Builtin::ToFloat,
            (Cpp, None | Some("std"), "to_string") => Builtin::ToStr,
            (Cpp, None | Some("std"), "abs") => Builtin::Abs,
            (Cpp, None | Some("std"), "max") => Builtin::Max,
            (Cpp, None | Some("std"), "min") => Builtin::Min,

            _ => return None,
        };

        if let Some(raw) = args.iter().find(|v| v.is_raw()) {
            return Some(Err(EvalError::UnresolvedOperand(raw.to_string())));
        }
        Some(self.apply_builtin(builtin, name, args))
    }

    fn apply_builtin(
        &self,
        builtin: Builtin,
        name: &str,
        args: &[Value],
    ) -> Result<Value, EvalError> {
        let single = || match args {
            [arg] => Ok(self.deref(arg.clone())),
            _ => Err(EvalError::TypeMismatch(format!(
                "{name}() takes one argument, got {}",
                args.len()
            ))),
        };

        match builtin {
            Builtin::ToInt => match single()? {
                Value::Int(n) => Ok(Value::Int(n)),
                Value::Float(x) if x.is_finite() => Ok(Value::Int(x.trunc() as i64)),
                Value::Bool(b) => Ok(Value::Int(i64::from(b))),
                Value::Str(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| EvalError::TypeMismatch(format!("invalid integer '{s}'"))),
                other => Err(EvalError::TypeMismatch(format!("{name}({other})"))),
            },
            Builtin::ToFloat => match single()? {
                Value::Int(n) => Ok(Value::Float(n as f64)),
                Value::Float(x) => Ok(Value::Float(x)),
                Value::Str(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| EvalError::TypeMismatch(format!("invalid number '{s}'"))),
                other => Err(EvalError::TypeMismatch(format!("{name}({other})"))),
            },
            Builtin::ToStr => {
                let value = single()?;
                Ok(Value::Str(self.display(&value)))
            }
            Builtin::Len => match single()? {
                Value::List(items) => Ok(Value::Int(items.len() as i64)),
                Value::Object(fields) => Ok(Value::Int(fields.len() as i64)),
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                other => Err(EvalError::TypeMismatch(format!("len({other})"))),
            },
            Builtin::Abs => match single()? {
                Value::Int(n) => n
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or_else(|| EvalError::Overflow(format!("abs({n})"))),
                Value::Float(x) => Ok(Value::Float(x.abs())),
                other => Err(EvalError::TypeMismatch(format!("abs({other})"))),
            },
            Builtin::Max | Builtin::Min => {
                // Python also accepts a single iterable
                let candidates = match args {
                    [only] => match self.deref(only.clone()) {
                        Value::List(items) => items,
                        other => vec![other],
                    },
                    _ => args.to_vec(),
                };
                let op = if builtin == Builtin::Max {
                    BinOp::Gt
                } else {
                    BinOp::Lt
                };

                let mut best: Option<Value> = None;
                for candidate in candidates {
                    best = Some(match best {
                        None => candidate,
                        Some(current) => {
                            let better = self.binary_op(op, candidate.clone(), current.clone())?;
                            if better == Value::Bool(true) {
                                candidate
                            } else {
                                current
                            }
                        }
                    });
                }
                best.ok_or_else(|| EvalError::TypeMismatch(format!("{name}() of nothing")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::{Interpreter, TraceConfig};
    use crate::memory::Value;
    use crate::parser::Language;

    fn interp(language: Language, input: &[&str]) -> Interpreter {
        Interpreter::new(
            language,
            TraceConfig::default(),
            input.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_python_input_and_exhaustion() {
        let mut i = interp(Language::Python, &["Ada"]);
        let first = i.call_builtin(None, "input", &[Value::Str("Name: ".into())]);
        assert_eq!(first, Some(Ok(Value::Str("Ada".into()))));
        let second = i.call_builtin(None, "input", &[]);
        assert_eq!(second, Some(Ok(Value::Str(String::new()))));
    }

    #[test]
    fn test_java_scanner_reads() {
        let mut i = interp(Language::Java, &["42", "3.5", "hello world"]);
        assert_eq!(
            i.call_builtin(Some("sc"), "nextInt", &[]),
            Some(Ok(Value::Int(42)))
        );
        assert_eq!(
            i.call_builtin(Some("sc"), "nextDouble", &[]),
            Some(Ok(Value::Float(3.5)))
        );
        assert_eq!(
            i.call_builtin(Some("sc"), "next", &[]),
            Some(Ok(Value::Str("hello".into())))
        );
    }

    #[test]
    fn test_java_numeric_reads_past_the_end_are_unresolved() {
        let mut i = interp(Language::Java, &["ten"]);
        assert_eq!(
            i.call_builtin(Some("sc"), "nextInt", &[]),
            Some(Ok(Value::Raw("ten".into())))
        );
        assert_eq!(
            i.call_builtin(Some("sc"), "nextDouble", &[]),
            Some(Ok(Value::Raw(String::new())))
        );
    }

    #[test]
    fn test_conversions() {
        let mut i = interp(Language::Python, &[]);
        assert_eq!(
            i.call_builtin(None, "int", &[Value::Str(" 12 ".into())]),
            Some(Ok(Value::Int(12)))
        );
        assert_eq!(
            i.call_builtin(None, "max", &[Value::Int(3), Value::Float(4.5), Value::Int(1)]),
            Some(Ok(Value::Float(4.5)))
        );
        assert!(matches!(
            i.call_builtin(None, "int", &[Value::Raw("fib(5)".into())]),
            Some(Err(_))
        ));
        assert_eq!(i.call_builtin(None, "fibonacci", &[Value::Int(3)]), None);
    }

    #[test]
    fn test_builtins_are_language_specific() {
        let mut java = interp(Language::Java, &[]);
        assert_eq!(
            java.call_builtin(Some("Integer"), "parseInt", &[Value::Str("7".into())]),
            Some(Ok(Value::Int(7)))
        );
        assert_eq!(java.call_builtin(None, "len", &[Value::Str("x".into())]), None);

        let mut cpp = interp(Language::Cpp, &[]);
        assert_eq!(
            cpp.call_builtin(Some("std"), "to_string", &[Value::Int(9)]),
            Some(Ok(Value::Str("9".into())))
        );
    }
}
