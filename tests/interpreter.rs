//! End-to-end tests: source text in, inspected value or error out.

use raiton::comparator::compare_scopes;
use raiton::{EvalError, Evaluator, ParseError, Value};

fn eval(source: &str) -> Result<Value, EvalError> {
    let scope = match raiton::parse(source) {
        Ok(scope) => scope,
        Err(error) => panic!("parse failed: {error}"),
    };
    Evaluator::new().evaluate_scope(&scope)
}

fn inspect(source: &str) -> String {
    match eval(source) {
        Ok(value) => value.inspect(),
        Err(error) => panic!("evaluation failed: {error}"),
    }
}

#[test]
fn integer_literal() {
    assert_eq!(inspect("5"), "5");
}

#[test]
fn boolean_literal() {
    assert_eq!(inspect("true"), "true");
    assert_eq!(inspect("false"), "false");
}

#[test]
fn sized_array() {
    assert_eq!(inspect("[3: 1 2 3]"), "[3: 1 2 3]");
}

#[test]
fn list() {
    assert_eq!(inspect("[1 2 3]"), "[1 2 3]");
}

#[test]
fn function_literal_call() {
    assert_eq!(inspect("add_two: \\x { (add x 2) }\n(add_two 40)"), "42");
}

#[test]
fn partial_application() {
    assert_eq!(inspect("fn sum a b { (add a b) }\n((sum 10) 5)"), "15");
}

#[test]
fn conditional() {
    assert_eq!(inspect("if (eq 1 1) : 10 else : 20"), "10");
    assert_eq!(inspect("if (eq 1 2) : 10 else : 20"), "20");
}

#[test]
fn map_over_list() {
    assert_eq!(inspect("(map \\x: (add x 1) [1 2 3])"), "[2 3 4]");
}

#[test]
fn record_field_access() {
    assert_eq!(inspect("r: { name: \"ada\" age: 36 }\nr.age"), "36");
}

#[test]
fn array_size_mismatch_is_a_range_error() {
    let error = eval("[2: 1 2 3]").unwrap_err();
    assert!(matches!(error, EvalError::ArraySize { declared: 2, got: 3 }));
}

#[test]
fn unbound_name() {
    let error = eval("xyz").unwrap_err();
    assert!(matches!(error, EvalError::Unbound(name) if name == "xyz"));
}

#[test]
fn unterminated_string_is_a_parse_error() {
    let error = raiton::parse("\"oops").unwrap_err();
    assert!(matches!(error, ParseError::Expected { .. }));
}

// Invariants

#[test]
fn pretty_printed_source_parses_to_the_same_tree() {
    let sources = [
        "a: 1 b: 2.5 (add a b)",
        "fn sum a b { (add a b) } (sum 1 2)",
        "r: { name: \"ada\" tags: [\"x\" \"y\"] } r.tags.1",
        "[3: 1 -2 3] [1 2] if (eq 1 1): \"yes\" else: \"no\"",
        "outer { inner: \\x: (add x 1) (inner 41) }",
        "(map \\x { (add x x) } [: 1 2])",
    ];
    for source in sources {
        let first = raiton::parse(source).unwrap_or_else(|error| panic!("{error}"));
        let printed = first.to_string();
        let second = raiton::parse(&printed)
            .unwrap_or_else(|error| panic!("reparse of `{printed}` failed: {error}"));
        if let Err(mismatch) = compare_scopes(&second, &first) {
            panic!("roundtrip of `{source}` via `{printed}`: {mismatch}");
        }
    }
}

#[test]
fn arrays_always_carry_their_true_size() {
    for source in ["[: 1 2 3]", "[2: 1 2]", "(map \\x: x [3: 1 2 3])"] {
        match eval(source) {
            Ok(Value::Array { size, elements }) => {
                assert_eq!(size, elements.len() as u64, "for {source}");
            }
            other => panic!("expected an array from {source}, got {other:?}"),
        }
    }
}

#[test]
fn closure_sees_bindings_added_after_capture() {
    assert_eq!(
        inspect("fn call_late: (late) fn late: 99 (call_late)"),
        "99"
    );
}

#[test]
fn partial_application_law() {
    let full = inspect("fn f a b c: [a b c] (f 1 2 3)");
    let curried = inspect("fn f a b c: [a b c] g: (f 1) (g 2 3)");
    let curried_twice = inspect("fn f a b c: [a b c] g: ((f 1) 2) (g 3)");
    assert_eq!(full, "[1 2 3]");
    assert_eq!(curried, full);
    assert_eq!(curried_twice, full);
}

#[test]
fn selector_composition() {
    let composed = inspect("r: { k: { j: 7 } } r.k.j");
    let stepwise = inspect("r: { k: { j: 7 } } inner: r.k inner.j");
    assert_eq!(composed, "7");
    assert_eq!(stepwise, composed);
}

#[test]
fn nested_data_roundtrips_through_inspect() {
    assert_eq!(
        inspect("{ id: 1 tags: [\"a\" \"b\"] point: [2: 0.5 1.5] }"),
        "{ id: 1 point: [2: 0.5 1.5] tags: [\"a\" \"b\"] }"
    );
}

#[test]
fn strings_with_escapes() {
    assert_eq!(inspect("\"line\\none\""), "\"line\\none\"");
    assert_eq!(inspect("'single'"), "\"single\"");
    assert_eq!(inspect("\"\""), "\"\"");
}

#[test]
fn comments_are_ignored() {
    assert_eq!(inspect("# a comment\na: 1 # trailing\na"), "1");
}
