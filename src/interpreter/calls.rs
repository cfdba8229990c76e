//! Simulation of user-defined functions
//!
//! A user function is simulated when its body has one of two shapes:
//!
//! ```text
//! return E
//! if COND: return A  [else:]  return B      (brace family: if (COND) ...)
//! ```
//!
//! where each returned expression calls the function itself at most once and
//! calls no other user function. Anything else (fibonacci's double
//! recursion, loops, local variables) is left unresolved: the call step is
//! still recorded but no value is invented.
//!
//! # Execution Model
//!
//! Recursion is unrolled into a loop over an explicit stack of pending
//! frames instead of recursing on the Rust stack:
//!
//! 1. Descend: push a frame, pick the branch, and while the branch contains
//!    the self-call, remember the frame and continue with the new arguments.
//! 2. Base: evaluate the terminal branch and pop its frame.
//! 3. Unwind: re-evaluate each pending expression with the self-call
//!    standing for the value returned from below, then pop.
//!
//! The descent is bounded by `max_call_depth`.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::TraceError;
use crate::interpreter::expressions::display_value;
use crate::memory::{Value, Variable, VariableTable};
use crate::parser::ast::{Expr, FunctionDef, StatementKind};
use crate::parser::lexer::{tokenize, Token};
use crate::parser::statements::{classify_tokens, parse_else, parse_guard};
use crate::parser::Language;
use tracing::debug;

/// A `return` the simulation can take
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Branch {
    pub expr: Expr,
    pub line: usize,
}

/// Recognized function body
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shape {
    Direct(Branch),
    Guarded {
        condition: Expr,
        then_branch: Branch,
        else_branch: Branch,
    },
}

/// A frame waiting for the result of its self-call
struct Pending {
    label: String,
    expr: Expr,
    line: usize,
}

impl Interpreter {
    /// Simulate a call to the user function `name`. The `Call` step has
    /// already been recorded by the caller.
    pub(crate) fn call_user_function(
        &mut self,
        name: &str,
        args: Vec<Value>,
        call: &Expr,
    ) -> Result<Value, TraceError> {
        let unresolved = || Value::Raw(call.to_string());

        let Some(def) = self.state.function(name).cloned() else {
            return Ok(unresolved());
        };
        let shape = analyze(&def, self.language, |n| self.state.is_user_function(n));
        let Some(shape) = shape.filter(|_| def.params.len() == args.len()) else {
            debug!(function = name, "function body shape not supported");
            return Ok(unresolved());
        };

        let mut pending: Vec<Pending> = Vec::new();
        let mut args = args;
        let mut entry_line = self.current_line;

        // Descend
        let result = loop {
            if pending.len() >= self.config.max_call_depth {
                return Err(TraceError::CallDepthExceeded {
                    function: name.to_string(),
                    limit: self.config.max_call_depth,
                });
            }

            let locals = self.bind_params(&def, &args);
            self.state.push_frame(name, entry_line, locals);
            let label = format!("{name}({})", self.display_args(&args));

            let (branch, guarded) = match &shape {
                Shape::Direct(branch) => (branch, false),
                Shape::Guarded {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    let taken = match self.eval(condition) {
                        Ok(value) => self.truthy(&value),
                        Err(e) => {
                            let e = e.into_fatal()?;
                            debug!(function = name, error = %e, "guard left unresolved");
                            None
                        }
                    };
                    match taken {
                        Some(true) => (then_branch, true),
                        Some(false) => (else_branch, true),
                        None => {
                            // Abandon: unwind every frame this call pushed
                            for _ in 0..=pending.len() {
                                self.state.pop_frame()?;
                            }
                            return Ok(unresolved());
                        }
                    }
                }
            };
            self.current_line = branch.line;

            if let Some(call_args) = branch.expr.find_call_to(name) {
                let mut next_args = Vec::with_capacity(call_args.len());
                for arg in call_args {
                    next_args.push(self.evaluate(arg)?);
                }

                let rendered = {
                    let state = &self.state;
                    let language = self.language;
                    let next_text = self.display_args(&next_args);
                    branch.expr.render_with(&|e: &Expr| match e {
                        Expr::Var(v) => state
                            .lookup(v)
                            .map(|var| display_value(&var.value, state.heap(), language)),
                        Expr::Call {
                            receiver: None,
                            name: callee,
                            ..
                        } if callee == name => Some(format!("{name}({next_text})")),
                        _ => None,
                    })
                };
                self.record(
                    branch.line,
                    format!("{label}: recursive case, calculate {rendered}"),
                )?;

                pending.push(Pending {
                    label,
                    expr: branch.expr.clone(),
                    line: branch.line,
                });
                args = next_args;
                entry_line = branch.line;
                continue;
            }

            let value = self.evaluate(&branch.expr)?;
            let shown = self.display(&value);
            let description = if guarded {
                format!("{label}: base case, return {shown}")
            } else {
                format!("{label}: return {shown}")
            };
            self.record(branch.line, description)?;
            self.state.pop_frame()?;
            break value;
        };

        // Unwind
        let mut value = result;
        while let Some(frame) = pending.pop() {
            self.current_line = frame.line;
            let saved = self.pending_return.replace((name.to_string(), value));
            let evaluated = self.evaluate(&frame.expr);
            self.pending_return = saved;
            value = evaluated?;

            let shown = self.display(&value);
            self.record(frame.line, format!("{}: return {shown}", frame.label))?;
            self.state.pop_frame()?;
        }

        Ok(value)
    }

    fn bind_params(&mut self, def: &FunctionDef, args: &[Value]) -> VariableTable {
        let mut locals = VariableTable::new();
        for (param, value) in def.params.iter().zip(args) {
            let heap_ref = value.as_heap_ref();
            if let Some(id) = heap_ref {
                self.state.add_heap_reference(id, &param.name);
            }
            let type_name = match &param.type_name {
                Some(t) => t.clone(),
                None => self.type_name_of(value),
            };
            locals.set(Variable {
                name: param.name.clone(),
                value: value.clone(),
                type_name,
                heap_ref,
            });
        }
        locals
    }
}

/// Recognize the body shape of `def`. `is_user_function` tells which other
/// names are user functions, which are not allowed in the body.
pub(crate) fn analyze(
    def: &FunctionDef,
    language: Language,
    is_user_function: impl Fn(&str) -> bool,
) -> Option<Shape> {
    let mut statements: Vec<(usize, Vec<Token>)> = Vec::new();
    for line in &def.body {
        let tokens = tokenize(&line.text, language).ok()?;
        let only_punctuation = tokens
            .iter()
            .all(|t| matches!(t, Token::LBrace | Token::RBrace | Token::Semicolon));
        if !only_punctuation {
            statements.push((line.number, tokens));
        }
    }

    let shape = match statements.split_first()? {
        ((line, tokens), []) => Shape::Direct(return_branch(tokens, *line, language)?),
        ((guard_line, guard), rest) => {
            let (condition, inline) = parse_guard(guard, language)?;

            let (then_branch, rest) = if inline.is_empty() {
                let ((line, tokens), rest) = rest.split_first()?;
                (return_branch(tokens, *line, language)?, rest)
            } else {
                (return_branch(&inline, *guard_line, language)?, rest)
            };

            let ((line, tokens), rest) = rest.split_first()?;
            let (else_branch, rest) = match parse_else(tokens, language) {
                Some(inline) if !inline.is_empty() => {
                    (return_branch(&inline, *line, language)?, rest)
                }
                Some(_) => {
                    let ((line, tokens), rest) = rest.split_first()?;
                    (return_branch(tokens, *line, language)?, rest)
                }
                // Fall-through return after the guarded one
                None => (return_branch(tokens, *line, language)?, rest),
            };

            if !rest.is_empty() {
                return None;
            }
            Shape::Guarded {
                condition,
                then_branch,
                else_branch,
            }
        }
    };

    let calls_only_itself = |expr: &Expr, allow_self: bool| {
        expr.count_calls_to(&def.name) <= usize::from(allow_self)
            && expr
                .called_names()
                .iter()
                .all(|n| *n == def.name || !is_user_function(n))
    };
    let supported = match &shape {
        Shape::Direct(branch) => calls_only_itself(&branch.expr, true),
        Shape::Guarded {
            condition,
            then_branch,
            else_branch,
        } => {
            calls_only_itself(condition, false)
                && calls_only_itself(&then_branch.expr, true)
                && calls_only_itself(&else_branch.expr, true)
        }
    };
    supported.then_some(shape)
}

fn return_branch(tokens: &[Token], line: usize, language: Language) -> Option<Branch> {
    match classify_tokens(tokens, language) {
        StatementKind::Return(Some(expr)) => Some(Branch { expr, line }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Param;
    use crate::parser::LogicalLine;

    fn def(name: &str, body: &[&str]) -> FunctionDef {
        FunctionDef {
            name: name.to_string(),
            params: vec![Param {
                name: "n".into(),
                type_name: None,
            }],
            line: 1,
            body: body
                .iter()
                .enumerate()
                .map(|(i, text)| LogicalLine::new(i + 2, 4, *text))
                .collect(),
        }
    }

    #[test]
    fn test_python_if_else_shape() {
        let f = def(
            "factorial",
            &["if n <= 1:", "return 1", "else:", "return n * factorial(n - 1)"],
        );
        match analyze(&f, Language::Python, |_| false) {
            Some(Shape::Guarded {
                then_branch,
                else_branch,
                ..
            }) => {
                assert_eq!(then_branch.line, 3);
                assert_eq!(else_branch.line, 5);
            }
            other => panic!("expected guarded shape, got {other:?}"),
        }
    }

    #[test]
    fn test_braced_fall_through_shape() {
        let f = def(
            "factorial",
            &["{", "if (n <= 1) return 1;", "return n * factorial(n - 1);", "}"],
        );
        assert!(matches!(
            analyze(&f, Language::Cpp, |_| false),
            Some(Shape::Guarded { .. })
        ));
    }

    #[test]
    fn test_double_recursion_is_rejected() {
        let f = def(
            "fibonacci",
            &[
                "if n <= 1:",
                "return n",
                "else:",
                "return fibonacci(n - 1) + fibonacci(n - 2)",
            ],
        );
        assert_eq!(analyze(&f, Language::Python, |_| false), None);
    }

    #[test]
    fn test_calls_to_other_user_functions_are_rejected() {
        let f = def("twice", &["return helper(n) * 2"]);
        assert_eq!(analyze(&f, Language::Python, |n| n == "helper"), None);
        assert!(analyze(&f, Language::Python, |_| false).is_some());
    }

    #[test]
    fn test_statements_besides_returns_are_rejected() {
        let f = def("f", &["x = n + 1", "return x"]);
        assert_eq!(analyze(&f, Language::Python, |_| false), None);
    }
}
