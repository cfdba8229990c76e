// Syntax tree for the recognized statement subset

use super::normalize::LogicalLine;
use std::fmt;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// Binding strength, higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 3,
            BinOp::Add | BinOp::Sub => 4,
            BinOp::Mul | BinOp::Div | BinOp::FloorDiv | BinOp::Mod => 5,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Piece of a Python f-string
#[derive(Debug, Clone, PartialEq)]
pub enum FStringPart {
    Literal(String),
    /// `{source}`; `expr` is `None` when the placeholder text does not parse
    Placeholder { source: String, expr: Option<Expr> },
}

/// Expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
    Null,
    FString(Vec<FStringPart>),
    /// Variable reference; dotted paths such as `System.in` are kept whole
    Var(String),
    /// `[a, b]`
    List(Vec<Expr>),
    /// `{a, b}` initializer (Java/C++)
    Braced(Vec<Expr>),
    /// `{k: v}` (Python)
    Dict(Vec<(Expr, Expr)>),
    /// `new Name(args)`
    New { class: String, args: Vec<Expr> },
    /// `new T[n]` or `new T[]{...}`
    NewArray {
        element: String,
        length: Option<Box<Expr>>,
        init: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `name(args)` or `receiver.name(args)`
    Call {
        receiver: Option<String>,
        name: String,
        args: Vec<Expr>,
    },
    /// Source text of a value that does not lex or parse
    Unparsed(String),
}

impl Expr {
    /// Whether this expression is a composite literal that lands on the heap
    pub fn is_composite_literal(&self) -> bool {
        matches!(
            self,
            Expr::List(_) | Expr::Braced(_) | Expr::Dict(_) | Expr::New { .. } | Expr::NewArray { .. }
        )
    }

    /// Count calls to the unqualified function `name` anywhere in the tree
    pub fn count_calls_to(&self, name: &str) -> usize {
        let mut count = 0;
        self.visit(&mut |e| {
            if let Expr::Call {
                receiver: None,
                name: n,
                ..
            } = e
            {
                if n == name {
                    count += 1;
                }
            }
        });
        count
    }

    /// Find the first unqualified call to `name`
    pub fn find_call_to(&self, name: &str) -> Option<&[Expr]> {
        match self {
            Expr::Call {
                receiver: None,
                name: n,
                args,
            } if n == name => Some(args),
            _ => self.children().into_iter().find_map(|c| c.find_call_to(name)),
        }
    }

    /// Names of every unqualified call in the tree
    pub fn called_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.visit(&mut |e| {
            if let Expr::Call {
                receiver: None,
                name,
                ..
            } = e
            {
                names.push(name.as_str());
            }
        });
        names
    }

    fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::List(items) | Expr::Braced(items) => items.iter().collect(),
            Expr::Dict(pairs) => pairs.iter().flat_map(|(k, v)| [k, v]).collect(),
            Expr::New { args, .. } | Expr::Call { args, .. } => args.iter().collect(),
            Expr::NewArray { length, init, .. } => {
                length.iter().map(|l| l.as_ref()).chain(init.iter()).collect()
            }
            Expr::Index { target, index } => vec![target.as_ref(), index.as_ref()],
            Expr::Unary { operand, .. } => vec![operand.as_ref()],
            Expr::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expr::FString(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    FStringPart::Placeholder { expr: Some(e), .. } => Some(e),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Expr)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Render back to source-like text. `hook` may override the rendering of
    /// any node; returning `None` falls back to the default form.
    pub fn render_with(&self, hook: &dyn Fn(&Expr) -> Option<String>) -> String {
        if let Some(text) = hook(self) {
            return text;
        }
        let join = |items: &[Expr]| {
            items
                .iter()
                .map(|e| e.render_with(hook))
                .collect::<Vec<_>>()
                .join(", ")
        };

        match self {
            Expr::Int(n) => n.to_string(),
            Expr::Float(x) => format!("{x:?}"),
            Expr::Str(s) => format!("{s:?}"),
            Expr::Char(c) => format!("{c:?}"),
            Expr::Bool(b) => b.to_string(),
            Expr::Null => "null".to_string(),
            Expr::Unparsed(text) => text.clone(),
            Expr::FString(parts) => {
                let body: String = parts
                    .iter()
                    .map(|p| match p {
                        FStringPart::Literal(s) => s.clone(),
                        FStringPart::Placeholder { source, .. } => format!("{{{source}}}"),
                    })
                    .collect();
                format!("f\"{body}\"")
            }
            Expr::Var(name) => name.clone(),
            Expr::List(items) => format!("[{}]", join(items)),
            Expr::Braced(items) => format!("{{{}}}", join(items)),
            Expr::Dict(pairs) => {
                let body = pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.render_with(hook), v.render_with(hook)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{body}}}")
            }
            Expr::New { class, args } => format!("new {class}({})", join(args)),
            Expr::NewArray {
                element,
                length,
                init,
            } => match length {
                Some(len) => format!("new {element}[{}]", len.render_with(hook)),
                None => format!("new {element}[]{{{}}}", join(init)),
            },
            Expr::Index { target, index } => {
                format!("{}[{}]", target.render_with(hook), index.render_with(hook))
            }
            Expr::Unary { op, operand } => {
                let inner = operand.render_with(hook);
                let inner = if matches!(**operand, Expr::Binary { .. }) {
                    format!("({inner})")
                } else {
                    inner
                };
                match op {
                    UnaryOp::Neg => format!("-{inner}"),
                    UnaryOp::Not => format!("not {inner}"),
                }
            }
            Expr::Binary { op, left, right } => {
                let side = |e: &Expr, strict: bool| {
                    let text = e.render_with(hook);
                    match e {
                        Expr::Binary { op: inner, .. }
                            if inner.precedence() < op.precedence()
                                || (strict && inner.precedence() == op.precedence()) =>
                        {
                            format!("({text})")
                        }
                        _ => text,
                    }
                };
                format!("{} {} {}", side(left, false), op.symbol(), side(right, true))
            }
            Expr::Call {
                receiver,
                name,
                args,
            } => match receiver {
                Some(r) => format!("{r}.{name}({})", join(args)),
                None => format!("{name}({})", join(args)),
            },
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with(&|_| None))
    }
}

/// Compound assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl AssignOp {
    /// The binary operator a compound assignment applies
    pub fn binary(self) -> Option<BinOp> {
        match self {
            AssignOp::Set => None,
            AssignOp::Add => Some(BinOp::Add),
            AssignOp::Sub => Some(BinOp::Sub),
            AssignOp::Mul => Some(BinOp::Mul),
            AssignOp::Div => Some(BinOp::Div),
            AssignOp::Mod => Some(BinOp::Mod),
        }
    }
}

/// One piece of an output statement
#[derive(Debug, Clone, PartialEq)]
pub enum PrintPiece {
    Value(Expr),
    Newline,
}

/// Function parameter; brace-family parameters carry their declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub type_name: Option<String>,
}

/// Header line of a function definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionHeader {
    pub name: String,
    pub params: Vec<Param>,
    /// Body text written on the header line itself (`def f(n): return n`)
    pub inline_body: Option<String>,
}

/// A recorded user function: header plus its body lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    /// Line of the header in the original source
    pub line: usize,
    pub body: Vec<LogicalLine>,
}

/// Classification of one logical line. Produced once per line and consumed
/// by the recognizer's dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Definition(FunctionHeader),
    Assignment {
        declared_type: Option<String>,
        target: String,
        op: AssignOp,
        value: Expr,
    },
    /// `cin >> a >> b;` / `getline(cin, a);`
    Read { targets: Vec<String> },
    Print(Vec<PrintPiece>),
    Return(Option<Expr>),
    Call(Expr),
    Unrecognized,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Var(name.to_string()))
    }

    #[test]
    fn test_render_respects_precedence() {
        let expr = Expr::Binary {
            op: BinOp::Mul,
            left: var("n"),
            right: Box::new(Expr::Binary {
                op: BinOp::Sub,
                left: var("n"),
                right: Box::new(Expr::Int(1)),
            }),
        };
        assert_eq!(expr.to_string(), "n * (n - 1)");
    }

    #[test]
    fn test_count_calls() {
        let call = |arg: i64| Expr::Call {
            receiver: None,
            name: "fib".into(),
            args: vec![Expr::Int(arg)],
        };
        let expr = Expr::Binary {
            op: BinOp::Add,
            left: Box::new(call(1)),
            right: Box::new(call(2)),
        };
        assert_eq!(expr.count_calls_to("fib"), 2);
        assert_eq!(expr.find_call_to("fib"), Some(&[Expr::Int(1)][..]));
    }
}
