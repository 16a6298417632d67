//! End-to-end checks of whole programs through the public API.

use pretty_assertions::assert_eq;
use quill::prelude::*;

fn diagnostics(source: &str) -> Vec<String> {
    check_source(source)
        .diagnostics
        .diagnostics()
        .iter()
        .map(|d| format!("{}: {}", d.kind.code(), d.message()))
        .collect()
}

fn binding(program: &Program, name: &str) -> String {
    program
        .scopes
        .find(program.scope, name)
        .unwrap_or_else(|| panic!("no binding '{name}'"))
        .typing
        .to_string()
}

#[test]
fn a_clean_program_produces_no_diagnostics() {
    let source = r#"use log from "io"

Point :: { x number, y number }

(p Point).norm :: () => number {
    p.x * p.x + p.y * p.y
}

origin :: () => Point {
    Point{x: 0, y: 0}
}

main :: () => number {
    p := origin()
    total := p.norm()
    log(total)
    total
}

main
"#;
    assert_eq!(diagnostics(source), Vec::<String>::new());
}

#[test]
fn diagnostics_accumulate_without_aborting() {
    // several independent mistakes are all reported in one run
    let source = "a := 1 + \"x\"\nb := true && 2\nc\na\nb";
    let program = check_source(source);
    assert_eq!(program.diagnostics.error_count(), 3);
    // a best-effort tree is still produced
    assert_eq!(program.statements.len(), 5);
    assert!(!program.is_check_clean());
}

#[test]
fn sum_types_drive_exhaustive_matching() {
    let source = r#"Shape :: | Circle(number) | Square(number)

area :: (s Shape) => number {
    match s {
    case c Circle:
        c * c
    case sq Square:
        sq * sq
    }
}

area
"#;
    assert_eq!(diagnostics(source), Vec::<String>::new());
}

#[test]
fn missing_constructors_are_diagnosed_by_name() {
    let source = r#"Shape :: | Circle(number) | Square(number)

partial :: (s Shape) => number {
    match s {
    case c Circle:
        c
    }
}

partial
"#;
    let rendered = diagnostics(source);
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].contains("Missing constructor 'Square'"));
}

#[test]
fn results_flow_through_try_and_catch() {
    let source = r#"parse :: (raw number) => number ! string {
    if raw < 0 {
        throw "negative"
    }
    return raw
}

double :: (raw number) => number ! string {
    v := try parse(raw)
    return v * 2
}

fallback :: (raw number) => number {
    parse(raw) catch err {
        0
    }
}

double
fallback
"#;
    let program = check_source(source);
    assert!(
        !program.diagnostics.has_errors(),
        "unexpected errors: {:?}",
        program.diagnostics.diagnostics()
    );
    // the unused catch binder is the only warning
    assert_eq!(program.diagnostics.warning_count(), 1);
}

#[test]
fn generic_calls_pin_parameters_left_to_right() {
    let source = "pair :: [T](a T, b T) => T {\n    a\n}\nn := pair(1, 2)\nn";
    let program = check_source(source);
    assert!(
        program.diagnostics.is_empty(),
        "unexpected: {:?}",
        program.diagnostics.diagnostics()
    );
    assert_eq!(binding(&program, "n"), "number");
}

#[test]
fn inconsistent_generic_arguments_are_rejected() {
    // T is pinned by the first argument; the second must be consistent
    let source = "pair :: [T](a T, b T) => T {\n    a\n}\npair(1, \"x\")";
    let program = check_source(source);
    assert!(program.diagnostics.has_errors());
    let rendered: Vec<String> = program
        .diagnostics
        .diagnostics()
        .iter()
        .map(|d| d.message())
        .collect();
    assert!(
        rendered.iter().any(|m| m.contains("number")),
        "expected a mismatch against the pinned parameter, got {rendered:?}"
    );
}

#[test]
fn spans_point_into_the_source() {
    let source = "n := 42\nx = 1\n";
    let program = check_source(source);
    let errors: Vec<&Diagnostic> = program
        .diagnostics
        .diagnostics()
        .iter()
        .filter(|d| d.is_error())
        .collect();
    assert_eq!(errors.len(), 1);
    // `x` is unknown, on line 2
    assert_eq!(errors[0].span.start.line, 2);
    assert_eq!(errors[0].span.start.column, 1);
}

#[test]
fn rendered_diagnostics_are_human_readable() {
    let program = check_source("x\n");
    let text = program.diagnostics.render("demo.qu");
    assert!(text.contains("error[E302]: Cannot find name 'x'"));
    assert!(text.contains("demo.qu:1:1"));
}

#[test]
fn json_output_is_machine_readable() {
    let program = check_source("x\n");
    let json = program.diagnostics.to_json();
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert_eq!(parsed[0]["kind"], "CannotFind");
    assert_eq!(parsed[0]["severity"], "error");
}

#[test]
fn checking_a_file_from_disk() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "n := 42\nn").expect("write source");
    let source = std::fs::read_to_string(file.path()).expect("read back");
    let program = check_source(&source);
    assert!(program.diagnostics.is_empty());
}

#[test]
fn modules_resolve_through_use_directives() {
    let source = "use * as io from \"io\"\nio.log(\"hello\")";
    assert_eq!(diagnostics(source), Vec::<String>::new());
}

#[test]
fn the_scope_of_a_block_survives_the_run() {
    let source = "f :: () => number {\n    local := 2\n    local\n}\nf";
    let program = check_source(source);
    assert!(program.diagnostics.is_empty());
    // the emitter can reach bindings through the block's scope handle
    let quill::parser::ast::Stmt::Assignment(assignment) = &program.statements[0] else {
        panic!("expected the function definition");
    };
    let quill::parser::ast::Expr::Function(function) = &assignment.value else {
        panic!("expected a function value");
    };
    let body = function.body.as_ref().expect("value form has a body");
    let scope = body.scope.expect("checked blocks carry their scope");
    assert!(program.scopes.find(scope, "local").is_some());
}
