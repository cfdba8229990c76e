//! Property-based tests for trace invariants
//!
//! Programs are generated from a small statement grammar per language so
//! every run exercises the recognizers, the heap, and the call simulator:
//! - Step indices are contiguous from 0
//! - Heap ids are unique and strictly increasing
//! - Frames pushed by a run are popped by its last step
//! - Tracing is deterministic

use proptest::prelude::*;
use stepviz::{trace, Language, Step};

// ============================================================================
// Program Generators
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "total", "items", "name"]).prop_map(str::to_string)
}

fn arb_python_statement() -> BoxedStrategy<String> {
    prop_oneof![
        3 => (arb_name(), -50i64..50).prop_map(|(n, v)| format!("{n} = {v}")),
        2 => (arb_name(), prop::collection::vec(0i64..10, 0..5)).prop_map(|(n, items)| {
            let items: Vec<String> = items.iter().map(i64::to_string).collect();
            format!("{n} = [{}]", items.join(", "))
        }),
        2 => (arb_name(), arb_name()).prop_map(|(a, b)| format!("{a} = {b}")),
        2 => arb_name().prop_map(|n| format!("print(f\"value: {{{n}}}\")")),
        1 => arb_name().prop_map(|n| format!("{n} = input()")),
        1 => (arb_name(), 0i64..8).prop_map(|(n, k)| format!("{n} = factorial({k})")),
        1 => Just("for i in range(3):\n    print(i)".to_string()),
    ]
    .boxed()
}

fn arb_python_program() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_python_statement(), 0..12).prop_map(|body| {
        let mut source = String::from(
            "def factorial(n):\n    if n <= 1:\n        return 1\n    return n * factorial(n - 1)\n",
        );
        for line in body {
            source.push_str(&line);
            source.push('\n');
        }
        source
    })
}

fn arb_cpp_statement() -> BoxedStrategy<String> {
    prop_oneof![
        3 => (arb_name(), -50i64..50).prop_map(|(n, v)| format!("    int {n}_v = {v};")),
        2 => (arb_name(), prop::collection::vec(0i64..10, 1..5)).prop_map(|(n, items)| {
            let items: Vec<String> = items.iter().map(i64::to_string).collect();
            format!("    int {n}_arr[] = {{{}}};", items.join(", "))
        }),
        2 => arb_name().prop_map(|n| format!("    cout << \"{n}\" << endl;")),
        1 => (arb_name(), 0i64..8).prop_map(|(n, k)| format!("    int {n}_f = factorial({k});")),
    ]
    .boxed()
}

fn arb_cpp_program() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_cpp_statement(), 0..10).prop_map(|body| {
        let mut source = String::from(
            "int factorial(int n) {\n    if (n <= 1) return 1;\n    return n * factorial(n - 1);\n}\n\nint main() {\n",
        );
        for line in body {
            source.push_str(&line);
            source.push('\n');
        }
        source.push_str("    return 0;\n}\n");
        source
    })
}

fn arb_input() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{0,6}", 0..3)
}

// ============================================================================
// Invariant Checks
// ============================================================================

fn assert_indices_contiguous(steps: &[Step]) -> Result<(), TestCaseError> {
    for (i, step) in steps.iter().enumerate() {
        prop_assert_eq!(step.index, i);
    }
    Ok(())
}

fn assert_heap_ids_increase(steps: &[Step]) -> Result<(), TestCaseError> {
    for step in steps {
        for pair in step.heap_objects.windows(2) {
            prop_assert!(pair[0].id < pair[1].id);
        }
    }
    // Objects are never dropped, so each step extends the previous one
    for pair in steps.windows(2) {
        let before = &pair[0].heap_objects;
        let after = &pair[1].heap_objects;
        prop_assert!(after.len() >= before.len());
        for (old, new) in before.iter().zip(after) {
            prop_assert_eq!(old.id, new.id);
            prop_assert_eq!(&old.value, &new.value);
        }
    }
    Ok(())
}

fn assert_frames_balanced(steps: &[Step]) -> Result<(), TestCaseError> {
    if let Some(last) = steps.last() {
        if !last.error {
            prop_assert!(last.stack_frames.is_empty());
        }
    }
    Ok(())
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_python_trace_invariants(source in arb_python_program(), input in arb_input()) {
        let steps = trace(&source, Language::Python, &input);
        assert_indices_contiguous(&steps)?;
        assert_heap_ids_increase(&steps)?;
        assert_frames_balanced(&steps)?;
        prop_assert!(steps.iter().all(|s| !s.error));
    }

    #[test]
    fn prop_cpp_trace_invariants(source in arb_cpp_program()) {
        let steps = trace(&source, Language::Cpp, &[]);
        assert_indices_contiguous(&steps)?;
        assert_heap_ids_increase(&steps)?;
        assert_frames_balanced(&steps)?;
        prop_assert_eq!(
            steps.last().map(|s| s.description.as_str()),
            Some("Exit main function")
        );
    }

    #[test]
    fn prop_trace_is_deterministic(source in arb_python_program(), input in arb_input()) {
        let first = trace(&source, Language::Python, &input);
        let second = trace(&source, Language::Python, &input);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_arbitrary_text_never_panics(source in "[ -~\n]{0,200}", lang in 0usize..3) {
        let language = Language::ALL[lang];
        let steps = trace(&source, language, &[]);
        assert_indices_contiguous(&steps)?;
    }
}
