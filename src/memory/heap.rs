//! Heap objects for composite values
//!
//! Every composite literal (list, array, object) is allocated here and the
//! assigned variable receives a [`Value::HeapRef`]. Objects are never freed
//! or rewritten during a run: the payload is fixed at allocation and only
//! the set of referencing names grows.
//!
//! Ids start at [`HEAP_ID_START`] and increase by one per allocation, so
//! they are unique within a run and never reused.

use super::value::Value;
use crate::interpreter::constants::HEAP_ID_START;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;

/// Heap object id
pub type HeapId = u64;

/// Shape of a heap object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeapKind {
    List,
    Array,
    Object,
}

impl fmt::Display for HeapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeapKind::List => "list",
            HeapKind::Array => "array",
            HeapKind::Object => "object",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeapObject {
    pub id: HeapId,
    pub kind: HeapKind,
    /// Declared or class type, e.g. `int[]`, `vector<int>`, `Scanner`
    pub label: Option<String>,
    pub value: Value,
    /// Names of variables that refer to this object, in first-reference order
    pub references: Vec<String>,
}

/// Per-run heap table
#[derive(Debug, Clone)]
pub struct Heap {
    objects: FxHashMap<HeapId, HeapObject>,
    next_id: HeapId,
}

impl Heap {
    pub fn new() -> Self {
        Heap {
            objects: FxHashMap::default(),
            next_id: HEAP_ID_START,
        }
    }

    /// Allocate a new object and return its id
    pub fn allocate(
        &mut self,
        kind: HeapKind,
        label: Option<String>,
        value: Value,
        references: Vec<String>,
    ) -> HeapId {
        let id = self.next_id;
        self.next_id += 1;

        let mut object = HeapObject {
            id,
            kind,
            label,
            value,
            references: Vec::with_capacity(references.len()),
        };
        for name in references {
            if !object.references.contains(&name) {
                object.references.push(name);
            }
        }

        self.objects.insert(id, object);
        id
    }

    /// Record that `name` now refers to object `id`; returns false if no such object
    pub fn add_reference(&mut self, id: HeapId, name: &str) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) => {
                if !object.references.iter().any(|r| r == name) {
                    object.references.push(name.to_string());
                }
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: HeapId) -> Option<&HeapObject> {
        self.objects.get(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects in allocation order
    pub fn objects(&self) -> Vec<HeapObject> {
        let mut objects: Vec<HeapObject> = self.objects.values().cloned().collect();
        objects.sort_by_key(|o| o.id);
        objects
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase_from_start() {
        let mut heap = Heap::new();
        let a = heap.allocate(HeapKind::List, None, Value::List(vec![]), vec!["a".into()]);
        let b = heap.allocate(HeapKind::Array, None, Value::List(vec![]), vec!["b".into()]);

        assert_eq!(a, HEAP_ID_START);
        assert_eq!(b, a + 1);
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn test_references_only_grow_and_dedupe() {
        let mut heap = Heap::new();
        let id = heap.allocate(HeapKind::List, None, Value::List(vec![]), vec!["a".into()]);

        assert!(heap.add_reference(id, "b"));
        assert!(heap.add_reference(id, "a"));
        assert!(!heap.add_reference(id + 10, "c"));

        let object = heap.get(id).unwrap();
        assert_eq!(object.references, vec!["a".to_string(), "b".to_string()]);
    }
}
