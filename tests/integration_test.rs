// Integration tests for the step tracer

use pretty_assertions::assert_eq;
use stepviz::memory::{HeapKind, Value};
use stepviz::{input_lines_from_text, trace, Language, Step, TraceConfig, Tracer};

const PYTHON_FACTORIAL: &str = r#"
def factorial(n):
    if n <= 1:
        return 1
    else:
        return n * factorial(n - 1)

result = factorial(5)
print(f"Factorial of 5 is: {result}")
"#;

const JAVA_FACTORIAL: &str = r#"
public class MathOperations {
    public static int factorial(int n) {
        if (n <= 1) {
            return 1;
        }
        return n * factorial(n - 1);
    }

    public static void main(String[] args) {
        int result = factorial(5);
        System.out.println("Factorial of 5 is: " + result);
    }
}
"#;

const CPP_FACTORIAL: &str = r#"
#include <iostream>
using namespace std;

int factorial(int n) {
    if (n <= 1) return 1;
    return n * factorial(n - 1);
}

int main() {
    int result = factorial(5);
    cout << "Factorial of 5 is: " << result << endl;
    return 0;
}
"#;

fn no_input() -> Vec<String> {
    Vec::new()
}

fn descriptions(steps: &[Step]) -> Vec<&str> {
    steps.iter().map(|s| s.description.as_str()).collect()
}

fn final_output(steps: &[Step]) -> Vec<String> {
    steps.last().map(|s| s.output.clone()).unwrap_or_default()
}

/// Descriptions of the steps taken inside `factorial` frames
fn recursion_steps(steps: &[Step]) -> Vec<&str> {
    steps
        .iter()
        .filter(|s| {
            s.current_frame()
                .is_some_and(|f| f.function_name == "factorial")
                || s.description.starts_with("factorial(")
        })
        .map(|s| s.description.as_str())
        .collect()
}

#[test]
fn test_python_factorial_scenario() {
    let steps = trace(PYTHON_FACTORIAL, Language::Python, &no_input());

    assert_eq!(
        descriptions(&steps),
        vec![
            "Define function: factorial",
            "Call factorial(5)",
            "factorial(5): recursive case, calculate 5 * factorial(4)",
            "factorial(4): recursive case, calculate 4 * factorial(3)",
            "factorial(3): recursive case, calculate 3 * factorial(2)",
            "factorial(2): recursive case, calculate 2 * factorial(1)",
            "factorial(1): base case, return 1",
            "factorial(2): return 2",
            "factorial(3): return 6",
            "factorial(4): return 24",
            "factorial(5): return 120",
            "result = 120 (int)",
            "Print: Factorial of 5 is: 120",
        ]
    );
    assert_eq!(final_output(&steps), vec!["Factorial of 5 is: 120"]);

    // Descent visits depth 1..5, the unwind pops back to 0
    let depths: Vec<usize> = steps[2..11].iter().map(|s| s.stack_frames.len()).collect();
    assert_eq!(depths, vec![1, 2, 3, 4, 5, 4, 3, 2, 1]);
    assert!(steps.last().unwrap().stack_frames.is_empty());

    // Steps point at the return that was taken
    assert_eq!(steps[2].source_line, 6);
    assert_eq!(steps[6].source_line, 4);
}

#[test]
fn test_java_and_cpp_factorial_match_python_output() {
    for (source, language, enter, exit) in [
        (JAVA_FACTORIAL, Language::Java, "Enter main method", "Exit main method"),
        (CPP_FACTORIAL, Language::Cpp, "Enter main function", "Exit main function"),
    ] {
        let steps = trace(source, language, &no_input());

        assert_eq!(final_output(&steps), vec!["Factorial of 5 is: 120"]);
        let all = descriptions(&steps);
        assert_eq!(all[0], "Define function: factorial");
        assert_eq!(all[1], enter);
        assert_eq!(*all.last().unwrap(), exit);
        assert!(all.contains(&"factorial(1): base case, return 1"));
        assert!(all.contains(&"factorial(5): return 120"));
        assert!(all.contains(&"result = 120 (int)"));
        assert!(steps.last().unwrap().stack_frames.is_empty());

        // main stays underneath the recursion
        let deepest = steps.iter().map(|s| s.stack_frames.len()).max().unwrap();
        assert_eq!(deepest, 6);
    }
}

#[test]
fn test_recursion_values_unwind_in_order() {
    let steps = trace(PYTHON_FACTORIAL, Language::Python, &no_input());
    let returns: Vec<&str> = recursion_steps(&steps)
        .into_iter()
        .filter(|d| d.contains("return"))
        .collect();
    assert_eq!(
        returns,
        vec![
            "factorial(1): base case, return 1",
            "factorial(2): return 2",
            "factorial(3): return 6",
            "factorial(4): return 24",
            "factorial(5): return 120",
        ]
    );
}

#[test]
fn test_list_literal_lands_on_heap() {
    let steps = trace("numbers = [1, 2, 3, 4, 5]\n", Language::Python, &no_input());
    assert_eq!(steps.len(), 1);

    let step = &steps[0];
    assert_eq!(step.heap_objects.len(), 1);
    let object = &step.heap_objects[0];
    assert_eq!(object.kind, HeapKind::List);
    assert_eq!(
        object.value,
        Value::List((1..=5).map(Value::Int).collect())
    );
    assert_eq!(object.references, vec!["numbers".to_string()]);

    let var = &step.variables[0];
    assert_eq!(var.name, "numbers");
    assert_eq!(var.value, Value::HeapRef(object.id));
    assert_eq!(var.heap_ref, Some(object.id));
    assert_eq!(step.description, format!("numbers = [1, 2, 3, 4, 5] (heap object #{})", object.id));
}

#[test]
fn test_brace_family_composites_use_the_same_heap_policy() {
    let java = r#"
public class Main {
    public static void main(String[] args) {
        int[] numbers = {1, 2, 3};
    }
}
"#;
    let steps = trace(java, Language::Java, &no_input());
    let object = &steps[1].heap_objects[0];
    assert_eq!(object.kind, HeapKind::Array);
    assert_eq!(object.label.as_deref(), Some("int[]"));
    let local = steps[1].current_frame().unwrap().locals.get("numbers").unwrap();
    assert_eq!(local.value, Value::HeapRef(object.id));

    let cpp = r#"
int main() {
    vector<int> numbers = {4, 5};
    return 0;
}
"#;
    let steps = trace(cpp, Language::Cpp, &no_input());
    let object = &steps[1].heap_objects[0];
    assert_eq!(object.kind, HeapKind::List);
    assert_eq!(object.value, Value::List(vec![Value::Int(4), Value::Int(5)]));
}

#[test]
fn test_unsupported_call_is_recorded_without_a_value() {
    let source = r#"
def fibonacci(n):
    if n <= 1:
        return n
    return fibonacci(n - 1) + fibonacci(n - 2)

print(fibonacci(10))
"#;
    let steps = trace(source, Language::Python, &no_input());

    assert_eq!(
        descriptions(&steps),
        vec![
            "Define function: fibonacci",
            "Call fibonacci(10)",
            "Print: fibonacci(10)",
        ]
    );
    assert!(steps.iter().all(|s| !s.error));
    assert!(!final_output(&steps).iter().any(|line| line.contains("55")));
}

#[test]
fn test_unknown_function_call_statement() {
    let steps = trace("draw_chart(3, 'x')\n", Language::Python, &no_input());
    assert_eq!(descriptions(&steps), vec!["Call draw_chart(3, x)"]);
    assert!(final_output(&steps).is_empty());
}

#[test]
fn test_input_interpolation() {
    let source = r#"
name = input("Enter your name: ")
print(f"{name}")
other = input()
"#;
    let input = vec!["Ada".to_string(), "Grace".to_string()];
    let steps = trace(source, Language::Python, &input);

    assert_eq!(
        descriptions(&steps),
        vec![
            r#"name = "Ada" (from input)"#,
            "Print: Ada",
            r#"other = "Grace" (from input)"#,
        ]
    );
    assert_eq!(steps[1].output, vec!["Ada"]);
}

#[test]
fn test_exhausted_input_reads_empty_string() {
    let steps = trace("name = input()\n", Language::Python, &no_input());
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].variables[0].value, Value::Str(String::new()));
    assert!(!steps[0].error);
}

#[test]
fn test_java_scanner_input() {
    let source = r#"
import java.util.Scanner;

public class Main {
    public static void main(String[] args) {
        Scanner sc = new Scanner(System.in);
        String name = sc.nextLine();
        System.out.println("Hello, " + name);
    }
}
"#;
    let steps = trace(source, Language::Java, &input_lines_from_text("Ada\n"));
    let all = descriptions(&steps);
    assert!(all.contains(&r#"name = "Ada" (from input)"#));
    assert_eq!(final_output(&steps), vec!["Hello, Ada"]);
}

#[test]
fn test_cpp_getline_and_stream_output() {
    let source = r#"
#include <iostream>
#include <string>
using namespace std;

int main() {
    string name;
    cout << "Enter your name: ";
    getline(cin, name);
    cout << "Hello, " << name << "!" << endl;
    return 0;
}
"#;
    let steps = trace(source, Language::Cpp, &["Ada".to_string()]);

    assert_eq!(
        descriptions(&steps),
        vec![
            "Enter main function",
            "Output: Enter your name: ",
            r#"name = "Ada" (from input)"#,
            "Output: Hello, Ada!",
            "Return from main",
            "Exit main function",
        ]
    );
    assert_eq!(final_output(&steps), vec!["Enter your name: Hello, Ada!"]);
}

#[test]
fn test_frame_local_shadows_global() {
    let source = r#"
n = 100
def square(n):
    return n * n
x = square(7)
print(n, x)
"#;
    let steps = trace(source, Language::Python, &no_input());
    assert!(descriptions(&steps).contains(&"square(7): return 49"));
    assert_eq!(final_output(&steps), vec!["100 49"]);
}

#[test]
fn test_reference_assignment_shares_object() {
    let source = "a = [1, 2]\nb = a\n";
    let steps = trace(source, Language::Python, &no_input());
    let last = steps.last().unwrap();

    assert_eq!(last.heap_objects.len(), 1);
    assert_eq!(
        last.heap_objects[0].references,
        vec!["a".to_string(), "b".to_string()]
    );
    // The earlier snapshot is unaffected
    assert_eq!(steps[0].heap_objects[0].references, vec!["a".to_string()]);
}

#[test]
fn test_skipped_lines_produce_no_steps() {
    let source = r#"
for i in range(3):
    print(i)
x = 1
"#;
    let steps = trace(source, Language::Python, &no_input());
    assert_eq!(descriptions(&steps), vec!["x = 1 (int)"]);
    assert_eq!(steps[0].source_line, 4);
}

#[test]
fn test_unrecognized_block_openers_skip_their_body() {
    let python = r#"
while True:
    x = 1
y = 2
"#;
    let steps = trace(python, Language::Python, &no_input());
    assert_eq!(descriptions(&steps), vec!["y = 2 (int)"]);

    let cpp = r#"
int main() {
    for (int i = 0; i < 3; i++) {
        int x = i;
    }
    int y = 2;
    return 0;
}
"#;
    let steps = trace(cpp, Language::Cpp, &no_input());
    let all = descriptions(&steps);
    assert!(all.contains(&"y = 2 (int)"));
    assert!(!all.iter().any(|d| d.starts_with("x = ")));
}

#[test]
fn test_huge_string_repetition_is_unresolved() {
    let steps = trace("s = 'ab' * 9223372036854775807\n", Language::Python, &no_input());
    assert_eq!(
        descriptions(&steps),
        vec![r#"s = "ab" * 9223372036854775807 (unresolved)"#]
    );
    assert!(!steps[0].error);
}

#[test]
fn test_deeply_nested_value_keeps_its_text() {
    let nested = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
    let source = format!("x = {nested}\ny = 2\n");
    let steps = trace(&source, Language::Python, &no_input());

    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].description, format!("x = {nested} (unresolved)"));
    assert_eq!(steps[1].description, "y = 2 (int)");
}

#[test]
fn test_unparsable_assignments_still_produce_steps() {
    let source = r#"
big = 99999999999999999999
low = -9223372036854775808
squares = [i for i in range(3)]
"#;
    let steps = trace(source, Language::Python, &no_input());
    assert_eq!(
        descriptions(&steps),
        vec![
            "big = 99999999999999999999 (unresolved)",
            "low = -9223372036854775808 (int)",
            "squares = [i for i in range(3)] (unresolved)",
        ]
    );
    assert_eq!(steps[1].variables[1].value, Value::Int(i64::MIN));
    assert_eq!(steps[0].variables[0].type_name, "unresolved");
}

#[test]
fn test_java_numeric_read_without_input_is_unresolved() {
    let source = r#"
import java.util.Scanner;

public class Main {
    public static void main(String[] args) {
        Scanner sc = new Scanner(System.in);
        int n = sc.nextInt();
        n = n + 1;
    }
}
"#;
    let steps = trace(source, Language::Java, &no_input());
    let all = descriptions(&steps);
    assert!(all.contains(&r#"n = "" (from input)"#));
    assert!(all.contains(&"n = n + 1 (unresolved)"));

    let last = steps
        .iter()
        .rev()
        .find(|s| s.description.starts_with("n = n + 1"))
        .unwrap();
    let n = last
        .current_frame()
        .and_then(|f| f.locals.get("n"))
        .unwrap();
    assert_eq!(n.value, Value::Raw("n + 1".into()));
    assert_eq!(n.type_name, "int");
}

#[test]
fn test_python_exit_stops_the_trace() {
    let source = "print('a')\nexit()\nprint('b')\n";
    let steps = trace(source, Language::Python, &no_input());
    assert_eq!(descriptions(&steps), vec!["Print: a", "Exit program"]);
}

#[test]
fn test_depth_limit_produces_error_marker() {
    let tracer = Tracer::new(TraceConfig {
        max_call_depth: 3,
        ..TraceConfig::default()
    });
    let steps = tracer.trace(PYTHON_FACTORIAL, Language::Python, &no_input());

    let last = steps.last().unwrap();
    assert!(last.error);
    assert_eq!(last.source_line, -1);
    assert_eq!(
        last.description,
        "Error: call depth limit of 3 exceeded in factorial()"
    );
    assert!(final_output(&steps).is_empty());
}

#[test]
fn test_step_limit_keeps_prefix() {
    let tracer = Tracer::new(TraceConfig {
        max_steps: 4,
        ..TraceConfig::default()
    });
    let full = trace(PYTHON_FACTORIAL, Language::Python, &no_input());
    let cut = tracer.trace(PYTHON_FACTORIAL, Language::Python, &no_input());

    assert_eq!(cut.len(), 5);
    assert_eq!(&cut[..4], &full[..4]);
    assert!(cut[4].error);
}

#[test]
fn test_trace_is_deterministic() {
    for (source, language) in [
        (PYTHON_FACTORIAL, Language::Python),
        (JAVA_FACTORIAL, Language::Java),
        (CPP_FACTORIAL, Language::Cpp),
    ] {
        let first = trace(source, language, &no_input());
        let second = trace(source, language, &no_input());
        assert_eq!(first, second);
    }
}

#[test]
fn test_json_uses_wire_field_names() {
    let steps = trace("x = 1\n", Language::Python, &no_input());
    let json = serde_json::to_value(&steps).unwrap();
    let step = &json[0];

    for field in [
        "index",
        "sourceLine",
        "stackFrames",
        "heapObjects",
        "variables",
        "output",
        "description",
        "errorFlag",
    ] {
        assert!(step.get(field).is_some(), "missing field {field}");
    }
}
