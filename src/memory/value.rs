//! Traced value representation
//!
//! This module defines the [`Value`] enum, the typed result of resolving an
//! expression. Values are tagged and never alias one another; composites
//! are immutable payloads that only live inside heap objects.
//!
//! # Value Types
//!
//! - [`Value::Int`] / [`Value::Float`]: numeric literals and arithmetic results
//! - [`Value::Str`] / [`Value::Char`] / [`Value::Bool`] / [`Value::Null`]
//! - [`Value::List`] / [`Value::Object`]: composite payloads (heap only)
//! - [`Value::HeapRef`]: what a variable holds for a composite, shown as `@id`
//! - [`Value::Raw`]: unresolved source text, carried through verbatim

use super::heap::HeapId;
use crate::parser::Language;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
    Null,
    List(Vec<Value>),
    Object(Vec<(String, Value)>), // Field name -> field value, in literal order
    HeapRef(HeapId),
    Raw(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_heap_ref(&self) -> Option<HeapId> {
        match self {
            Value::HeapRef(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Value::List(_) | Value::Object(_))
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Value::Raw(_))
    }

    /// Type name as the learner would write it in `language`
    pub fn type_name(&self, language: Language) -> &'static str {
        use Language::*;
        match (self, language) {
            (Value::Int(_), _) => "int",
            (Value::Float(_), Python) => "float",
            (Value::Float(_), Java | Cpp) => "double",
            (Value::Str(_), Python) => "str",
            (Value::Str(_), Java) => "String",
            (Value::Str(_), Cpp) => "string",
            (Value::Raw(_), _) => "unresolved",
            (Value::Char(_), _) => "char",
            (Value::Bool(_), Python | Cpp) => "bool",
            (Value::Bool(_), Java) => "boolean",
            (Value::Null, Python) => "NoneType",
            (Value::Null, Java) => "null",
            (Value::Null, Cpp) => "nullptr_t",
            (Value::List(_), Python) => "list",
            (Value::List(_), Java | Cpp) => "array",
            (Value::Object(_), Python) => "dict",
            (Value::Object(_), Java | Cpp) => "object",
            (Value::HeapRef(_), _) => "reference",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) | Value::Raw(s) => f.write_str(s),
            Value::Char(c) => write!(f, "{c}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => f.write_str("null"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_element(f, item)?;
                }
                f.write_str("]")
            }
            Value::Object(fields) => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: ")?;
                    write_element(f, value)?;
                }
                f.write_str("}")
            }
            Value::HeapRef(id) => write!(f, "@{id}"),
        }
    }
}

/// Strings inside a composite are quoted so `["1"]` and `[1]` differ
fn write_element(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Str(s) => write!(f, "{s:?}"),
        Value::Char(c) => write!(f, "{c:?}"),
        other => write!(f, "{other}"),
    }
}
