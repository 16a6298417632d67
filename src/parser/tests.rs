use super::ast::*;
use super::*;
use crate::diagnostics::ErrorKind;
use crate::types::ExpressionType;

fn check(source: &str) -> Program {
    check_source(source)
}

fn kinds(program: &Program) -> Vec<ErrorKind> {
    program
        .diagnostics
        .diagnostics()
        .iter()
        .map(|d| d.kind.clone())
        .collect()
}

fn errors(program: &Program) -> Vec<ErrorKind> {
    program
        .diagnostics
        .diagnostics()
        .iter()
        .filter(|d| d.is_error())
        .map(|d| d.kind.clone())
        .collect()
}

fn assert_clean(source: &str) {
    let program = check(source);
    assert!(
        program.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        program.diagnostics.diagnostics()
    );
}

fn assert_no_errors(source: &str) -> Program {
    let program = check(source);
    assert!(
        !program.diagnostics.has_errors(),
        "unexpected errors: {:?}",
        program.diagnostics.diagnostics()
    );
    program
}

fn binding_type(program: &Program, name: &str) -> ExpressionType {
    program
        .scopes
        .find(program.scope, name)
        .unwrap_or_else(|| panic!("no binding '{name}'"))
        .typing
        .clone()
}

/*  Declarations  */

#[test]
fn declaration_binds_initializer_type() {
    let program = assert_no_errors("n := 42\ns := \"str\"\nb := true\nn\ns\nb");
    assert_eq!(binding_type(&program, "n"), ExpressionType::Number);
    assert_eq!(binding_type(&program, "s"), ExpressionType::String);
    assert_eq!(binding_type(&program, "b"), ExpressionType::Boolean);
}

#[test]
fn tuple_declaration_and_reassignment() {
    // end-to-end: both identifiers keep their types, zero diagnostics
    let source = "n := 42\ns := \"str\"\n(n, s) = (1, \"x\")";
    let program = check(source);
    assert!(
        program.diagnostics.is_empty(),
        "unexpected: {:?}",
        program.diagnostics.diagnostics()
    );
    assert_eq!(binding_type(&program, "n"), ExpressionType::Number);
    assert_eq!(binding_type(&program, "s"), ExpressionType::String);
}

#[test]
fn assignment_requires_extending_type() {
    let program = check("n := 42\nn = \"str\"");
    assert!(errors(&program)
        .iter()
        .any(|k| matches!(k, ErrorKind::CannotAssignType { .. })));
}

#[test]
fn declaring_nil_is_reported() {
    let program = check("use log from \"io\"\nn := log(1)");
    assert_eq!(errors(&program), vec![ErrorKind::VoidAssignment]);
}

#[test]
fn declaring_a_result_is_reported() {
    let source = "may :: () => number ! string { return 1 }\nr := may()";
    let program = check(source);
    assert_eq!(errors(&program), vec![ErrorKind::ResultDeclaration]);
}

#[test]
fn reserved_names_cannot_be_declared() {
    let program = check("Option := 1");
    assert_eq!(
        kinds(&program),
        vec![ErrorKind::ReservedName {
            name: "Option".to_string()
        }]
    );
}

#[test]
fn unknown_identifier_is_reported() {
    let program = check("missing");
    assert_eq!(
        kinds(&program),
        vec![ErrorKind::CannotFind {
            name: "missing".to_string()
        }]
    );
}

/*  Unused variables  */

#[test]
fn unused_variable_is_reported_once() {
    let program = check("n := 42");
    assert_eq!(
        kinds(&program),
        vec![ErrorKind::UnusedVariable {
            name: "n".to_string()
        }]
    );
}

#[test]
fn reading_a_variable_clears_the_unused_report() {
    assert_clean("n := 42\nn");
}

/*  Binary & unary expressions  */

#[test]
fn arithmetic_requires_numbers() {
    let program = check("x := 1 + \"a\"\nx");
    assert_eq!(
        errors(&program),
        vec![ErrorKind::NumberExpected {
            found: "string".to_string()
        }]
    );
}

#[test]
fn logical_operators_require_booleans() {
    let program = check("x := true && 1\nx");
    assert_eq!(
        errors(&program),
        vec![ErrorKind::BooleanExpected {
            found: "number".to_string()
        }]
    );
}

#[test]
fn equality_requires_matching_types() {
    let program = check("x := 1 == \"a\"\nx");
    assert!(errors(&program)
        .iter()
        .any(|k| matches!(k, ErrorKind::MismatchedTypes { .. })));
}

#[test]
fn comparison_yields_boolean() {
    let program = assert_no_errors("x := 1 < 2\nx");
    assert_eq!(binding_type(&program, "x"), ExpressionType::Boolean);
}

#[test]
fn concat_accepts_strings_and_lists() {
    let program = assert_no_errors("s := \"a\" ++ \"b\"\nl := [1] ++ [2]\ns\nl");
    assert_eq!(binding_type(&program, "s"), ExpressionType::String);
    assert_eq!(binding_type(&program, "l").to_string(), "[]number");
}

#[test]
fn concat_rejects_numbers() {
    let program = check("x := 1 ++ 2\nx");
    assert_eq!(
        errors(&program),
        vec![
            ErrorKind::ConcatenableExpected {
                found: "number".to_string()
            },
            ErrorKind::ConcatenableExpected {
                found: "number".to_string()
            },
        ]
    );
}

#[test]
fn exponentiation_is_right_associative() {
    let program = assert_no_errors("x := 2 ** 3 ** 2\nx");
    let Stmt::Assignment(assignment) = &program.statements[0] else {
        panic!("expected an assignment");
    };
    let Expr::Binary(outer) = &assignment.value else {
        panic!("expected a binary expression");
    };
    assert_eq!(outer.operator.kind, TokenKind::Pow);
    assert!(
        matches!(&outer.right, Expr::Binary(inner) if inner.operator.kind == TokenKind::Pow),
        "the right operand should be the nested power"
    );
}

#[test]
fn references_and_dereference() {
    let program = assert_no_errors("x := 1\nr := &x\ny := *r\ny");
    assert_eq!(binding_type(&program, "r").to_string(), "&number");
    assert_eq!(binding_type(&program, "y"), ExpressionType::Number);
}

#[test]
fn referencing_a_literal_is_reported() {
    let program = check("r := &1\nr");
    assert_eq!(errors(&program), vec![ErrorKind::NotReferenceable]);
}

/*  Blocks & unreachable code  */

#[test]
fn unreachable_code_after_return() {
    let source = "f :: () => number {\n    return 1\n    2\n}\nf";
    let program = check(source);
    assert_eq!(kinds(&program), vec![ErrorKind::UnreachableCode]);
}

#[test]
fn block_expression_takes_trailing_type() {
    let program = assert_no_errors("v := {\n    1\n    2\n}\nv");
    assert_eq!(binding_type(&program, "v"), ExpressionType::Number);
}

/*  Exits  */

#[test]
fn exits_are_illegal_outside_their_scopes() {
    assert_eq!(kinds(&check("break")), vec![ErrorKind::IllegalBreak]);
    assert_eq!(kinds(&check("continue")), vec![ErrorKind::IllegalContinue]);
    assert_eq!(kinds(&check("return")), vec![ErrorKind::IllegalReturn]);
    assert_eq!(kinds(&check("throw 1")), vec![ErrorKind::IllegalThrow]);
}

#[test]
fn continue_value_is_unexpected() {
    let source = "for true {\n    continue 1\n}";
    let program = check(source);
    assert_eq!(kinds(&program), vec![ErrorKind::UnexpectedExpression]);
}

/*  If  */

#[test]
fn if_condition_must_be_boolean() {
    let program = check("if 1 {\n}");
    assert_eq!(
        kinds(&program),
        vec![ErrorKind::BooleanExpected {
            found: "number".to_string()
        }]
    );
}

#[test]
fn if_without_else_is_an_option() {
    let program = assert_no_errors("o := if true {\n    42\n}\no");
    assert_eq!(binding_type(&program, "o").to_string(), "Option[number]");
}

#[test]
fn if_with_else_takes_the_alternate_type() {
    let program = assert_no_errors("x := if true {\n    1\n} else {\n    2\n}\nx");
    assert_eq!(binding_type(&program, "x"), ExpressionType::Number);
}

#[test]
fn if_branches_must_match() {
    let program = check("x := if true {\n    1\n} else {\n    \"a\"\n}\nx");
    assert!(errors(&program)
        .iter()
        .any(|k| matches!(k, ErrorKind::MismatchedTypes { .. })));
}

/*  For  */

#[test]
fn for_in_list_has_nil_type() {
    // end-to-end: zero diagnostics, loop type is nil without breaks
    let source = "for x in [1, 2, 3] {\n    x\n}";
    let program = check(source);
    assert!(
        program.diagnostics.is_empty(),
        "unexpected: {:?}",
        program.diagnostics.diagnostics()
    );
    let Stmt::Expr(Expr::For(for_expr)) = &program.statements[0] else {
        panic!("expected a for expression");
    };
    assert_eq!(for_expr.ty, ExpressionType::Nil);
}

#[test]
fn for_binds_element_and_index() {
    assert_clean("xs := [10, 20]\nfor (x, i) in xs {\n    x + i\n}");
}

#[test]
fn for_over_a_range() {
    assert_clean("for i in 0..10 {\n    i\n}");
}

#[test]
fn for_over_a_list_reference() {
    assert_clean("xs := [1, 2]\nrs := &xs\nfor x in rs {\n    x\n}");
}

#[test]
fn for_requires_an_iterable() {
    let program = check("for x in 42 {\n    x\n}");
    assert_eq!(
        kinds(&program),
        vec![ErrorKind::IterableExpected {
            found: "number".to_string()
        }]
    );
}

#[test]
fn loop_type_comes_from_break_values() {
    let program = assert_no_errors("v := for {\n    break 42\n}\nv");
    assert_eq!(binding_type(&program, "v"), ExpressionType::Number);
}

#[test]
fn break_values_must_agree_with_the_first() {
    let source = "b := true\nfor {\n    if b {\n        break 1\n    }\n    break \"a\"\n}";
    let program = check(source);
    assert_eq!(
        errors(&program),
        vec![ErrorKind::MismatchedTypes {
            left: "number".to_string(),
            right: "string".to_string()
        }]
    );
}

/*  Tuples & property access  */

#[test]
fn tuple_index_access() {
    let program = assert_no_errors("t := (1, \"a\")\nv := t.0\nw := t.1\nv\nw");
    assert_eq!(binding_type(&program, "v"), ExpressionType::Number);
    assert_eq!(binding_type(&program, "w"), ExpressionType::String);
}

#[test]
fn tuple_index_out_of_range() {
    let program = check("t := (1, \"a\")\nv := t.3\nv");
    assert_eq!(
        errors(&program),
        vec![ErrorKind::OutOfRange {
            max: 1,
            index: "3".to_string()
        }]
    );
}

/*  Lists & computed access  */

#[test]
fn list_literals_are_homogeneous() {
    let program = check("xs := [1, \"a\"]\nxs");
    assert!(errors(&program)
        .iter()
        .any(|k| matches!(k, ErrorKind::MismatchedTypes { .. })));
}

#[test]
fn list_index_by_number_and_range() {
    let program = assert_no_errors("xs := [1, 2, 3]\na := xs[0]\nb := xs[0..2]\na\nb");
    assert_eq!(binding_type(&program, "a"), ExpressionType::Number);
    assert_eq!(binding_type(&program, "b").to_string(), "[]number");
}

#[test]
fn list_index_must_be_number_or_range() {
    let program = check("xs := [1, 2]\na := xs[\"a\"]\na");
    assert_eq!(
        errors(&program),
        vec![ErrorKind::IndexExpected {
            found: "string".to_string()
        }]
    );
}

#[test]
fn subscripting_a_number_is_reported() {
    let program = check("n := 1\nm := n[0]\nm");
    assert_eq!(
        errors(&program),
        vec![ErrorKind::NotSubscriptable {
            found: "number".to_string()
        }]
    );
}

/*  Functions & calls  */

#[test]
fn generic_function_call_resolves_type_params() {
    // end-to-end: id[T](x T) -> T called with a number yields a number
    let source = "id :: [T](x T) => T {\n    x\n}\nn := id(42)\nn";
    let program = check(source);
    assert!(
        program.diagnostics.is_empty(),
        "unexpected: {:?}",
        program.diagnostics.diagnostics()
    );
    assert_eq!(binding_type(&program, "n"), ExpressionType::Number);
}

#[test]
fn generic_option_return_is_fully_applied() {
    let source = "wrap :: [T](x T) => ?T {\n    if true {\n        x\n    }\n}\no := wrap(42)\no";
    let program = assert_no_errors(source);
    assert_eq!(binding_type(&program, "o").to_string(), "Option[number]");
}

#[test]
fn call_argument_count_is_checked() {
    let source = "f :: (x number) => number {\n    x\n}\nf(1, 2)\nf()";
    let program = check(source);
    assert_eq!(
        errors(&program),
        vec![
            ErrorKind::TooManyElements {
                expected: 1,
                received: 2
            },
            ErrorKind::MissingElements {
                expected: 1,
                received: 0
            },
        ]
    );
}

#[test]
fn call_arguments_must_extend_parameters() {
    let source = "f :: (x number) => number {\n    x\n}\nf(\"a\")";
    let program = check(source);
    assert!(errors(&program)
        .iter()
        .any(|k| matches!(k, ErrorKind::CannotAssignType { .. })));
}

#[test]
fn calling_a_non_function_is_reported() {
    let program = check("n := 1\nn(2)");
    assert_eq!(
        errors(&program),
        vec![ErrorKind::FunctionExpected {
            found: "number".to_string()
        }]
    );
}

#[test]
fn function_without_annotation_rejects_return() {
    let source = "f :: (x number) => {\n    return x\n}\nf";
    let program = check(source);
    assert!(kinds(&program).contains(&ErrorKind::IllegalReturn));
}

#[test]
fn return_values_must_extend_the_annotation() {
    let source = "f :: () => number {\n    return \"a\"\n}\nf";
    let program = check(source);
    assert!(errors(&program)
        .iter()
        .any(|k| matches!(k, ErrorKind::CannotAssignType { .. })));
}

#[test]
fn duplicate_parameters_are_reported_at_each_occurrence() {
    let source = "f :: (x number, x string) => number {\n    x\n}\nf";
    let program = check(source);
    let duplicates: Vec<_> = kinds(&program)
        .into_iter()
        .filter(|k| matches!(k, ErrorKind::DuplicateIdentifier { .. }))
        .collect();
    assert_eq!(duplicates.len(), 2);
}

/*  Sum types & match  */

#[test]
fn sum_definition_round_trip() {
    let program = assert_no_errors("Pick :: | A(number) | B\np := Pick.A(1)\np");
    let ExpressionType::Type(inner) = binding_type(&program, "Pick") else {
        panic!("expected a type binding");
    };
    let ExpressionType::Alias(alias) = *inner else {
        panic!("expected an alias");
    };
    let ExpressionType::Sum(sum) = alias.reference.as_ref() else {
        panic!("expected a sum type");
    };
    let a = sum.get("A").expect("constructor A");
    assert_eq!(a.params, vec![ExpressionType::Number]);
    let b = sum.get("B").expect("constructor B");
    assert!(b.params.is_empty());
}

#[test]
fn sum_types_need_two_constructors() {
    let program = check("Lonely :: | A(number)\nLonely");
    assert_eq!(
        errors(&program),
        vec![ErrorKind::MissingElements {
            expected: 2,
            received: 1
        }]
    );
}

#[test]
fn multiline_sum_definition() {
    assert_clean("Shape :: | Circle(number)\n         | Square(number)\nShape");
}

#[test]
fn match_binds_constructor_payloads() {
    let source = "\
Pick :: | A(number) | B
p := Pick.A(1)
match p {
case a A:
    a
case B:
}";
    assert_clean(source);
}

#[test]
fn non_exhaustive_match_reports_each_missing_constructor() {
    let source = "o := if true {\n    42\n}\nmatch o {\ncase n Some:\n    n\n}";
    let program = check(source);
    assert_eq!(
        kinds(&program),
        vec![ErrorKind::MissingConstructor {
            name: "None".to_string()
        }]
    );
}

#[test]
fn covering_every_constructor_is_exhaustive() {
    let source = "o := if true {\n    42\n}\nmatch o {\ncase n Some:\n    n\ncase None:\n}";
    assert_clean(source);
}

#[test]
fn a_catchall_is_exhaustive() {
    let source = "o := if true {\n    42\n}\nmatch o {\ncase n Some:\n    n\ncase _:\n}";
    assert_clean(source);
}

#[test]
fn a_catchall_must_be_last() {
    let source = "o := if true {\n    42\n}\nmatch o {\ncase _:\ncase n Some:\n    n\n}";
    let program = check(source);
    assert_eq!(kinds(&program), vec![ErrorKind::CatchallNotLast]);
}

#[test]
fn duplicate_cases_are_reported_at_each_occurrence() {
    let source =
        "o := if true {\n    42\n}\nmatch o {\ncase n Some:\n    n\ncase m Some:\n    m\ncase None:\n}";
    let program = check(source);
    let duplicates: Vec<_> = kinds(&program)
        .into_iter()
        .filter(|k| matches!(k, ErrorKind::DuplicateIdentifier { .. }))
        .collect();
    assert_eq!(duplicates.len(), 2);
}

#[test]
fn matching_a_number_is_reported() {
    let program = check("n := 1\nmatch n {\ncase _:\n}");
    assert_eq!(
        errors(&program),
        vec![ErrorKind::Unmatchable {
            found: "number".to_string()
        }]
    );
}

/*  Objects, instances & methods  */

#[test]
fn struct_definition_and_instantiation() {
    let source = "Point :: { x number, y number }\np := Point{x: 1, y: 2}\nv := p.x\nv";
    let program = assert_no_errors(source);
    assert_eq!(binding_type(&program, "v"), ExpressionType::Number);
}

#[test]
fn missing_members_are_reported() {
    let source = "Point :: { x number, y number }\np := Point{x: 1}\np";
    let program = check(source);
    assert_eq!(
        errors(&program),
        vec![ErrorKind::MissingKeys {
            keys: "'y'".to_string()
        }]
    );
}

#[test]
fn default_members_are_optional() {
    let source = "Point :: { x number, y: 2 }\np := Point{x: 1}\np";
    assert_clean(source);
}

#[test]
fn excess_members_are_reported() {
    let source = "Point :: { x number }\np := Point{x: 1, z: 2}\np";
    let program = check(source);
    assert_eq!(
        errors(&program),
        vec![ErrorKind::PropertyDoesNotExist {
            name: "z".to_string(),
            parent: "Point".to_string()
        }]
    );
}

#[test]
fn member_values_must_extend_member_types() {
    let source = "Point :: { x number }\np := Point{x: \"a\"}\np";
    let program = check(source);
    assert!(errors(&program)
        .iter()
        .any(|k| matches!(k, ErrorKind::CannotAssignType { .. })));
}

#[test]
fn duplicate_members_are_reported_at_each_occurrence() {
    let source = "Point :: { x number, x string }\nPoint";
    let program = check(source);
    assert_eq!(
        kinds(&program),
        vec![
            ErrorKind::DuplicateIdentifier {
                name: "x".to_string()
            },
            ErrorKind::DuplicateIdentifier {
                name: "x".to_string()
            },
        ]
    );
}

#[test]
fn unknown_property_is_reported() {
    let source = "Point :: { x number }\np := Point{x: 1}\np.z";
    let program = check(source);
    assert_eq!(
        errors(&program),
        vec![ErrorKind::PropertyDoesNotExist {
            name: "z".to_string(),
            parent: "Point".to_string()
        }]
    );
}

#[test]
fn generic_struct_definition_and_instantiation() {
    let source = "Box[T] :: { value T }\nb := Box[number]{value: 5}\nn := b.value\nn";
    let program = assert_no_errors(source);
    assert_eq!(binding_type(&program, "n"), ExpressionType::Number);
}

#[test]
fn methods_and_traits() {
    let source = "\
Circle :: { radius number }
(c Circle).area :: () => number {
    c.radius * c.radius
}
Shape :: (S).( area () -> number )
describe :: (s Shape) => number {
    match s {
    case c Circle:
        c.area()
    case _:
        0
    }
}
describe";
    assert_clean(source);
}

#[test]
fn non_implementing_type_in_trait_match() {
    let source = "\
Blob :: { size number }
Shape :: (S).( area () -> number )
describe :: (s Shape) => number {
    match s {
    case b Blob:
        b.size
    case _:
        0
    }
}
describe";
    let program = check(source);
    assert!(errors(&program)
        .iter()
        .any(|k| matches!(k, ErrorKind::TypeDoesNotImplement { .. })));
}

/*  Maps  */

#[test]
fn map_instantiation_and_methods() {
    let source = "m := Map[string, number]{\"a\": 1}\nv := m.get(\"a\")\nv";
    let program = assert_no_errors(source);
    assert_eq!(binding_type(&program, "m").to_string(), "Map[string, number]");
    assert_eq!(binding_type(&program, "v").to_string(), "Option[number]");
}

#[test]
fn empty_map_without_type_args_is_unresolved() {
    let program = check("m := Map{}\nm");
    assert!(errors(&program).contains(&ErrorKind::MissingTypeArgs));
}

/*  Results, try & catch  */

#[test]
fn result_functions_check_throw_and_return() {
    let source = "\
safe :: (b number) => number ! string {
    if b == 0 {
        throw \"zero\"
    }
    return b
}
safe";
    assert_clean(source);
}

#[test]
fn thrown_values_must_extend_the_error_type() {
    let source = "f :: () => number ! string {\n    throw 1\n}\nf";
    let program = check(source);
    assert!(errors(&program)
        .iter()
        .any(|k| matches!(k, ErrorKind::CannotAssignType { .. })));
}

#[test]
fn catch_unwraps_the_ok_type() {
    let source = "\
safe :: () => number ! string {
    return 1
}
r := safe() catch e {
    0
}
r";
    let program = assert_no_errors(source);
    assert_eq!(binding_type(&program, "r"), ExpressionType::Number);
    // the unused error binder is still tracked
    assert!(kinds(&program).contains(&ErrorKind::UnusedVariable {
        name: "e".to_string()
    }));
}

#[test]
fn catch_on_a_non_result_is_unneeded() {
    let source = "n := 1\nr := n catch e {\n    0\n}\nr";
    let program = check(source);
    assert!(kinds(&program).contains(&ErrorKind::UnneededCatch));
}

#[test]
fn try_propagates_inside_result_functions() {
    let source = "\
may :: () => number ! string {
    return 1
}
wrap :: () => number ! string {
    v := try may()
    return v
}
wrap";
    assert_clean(source);
}

#[test]
fn try_outside_a_function_is_illegal() {
    let program = check("x := try 1\nx");
    let kinds = kinds(&program);
    assert!(kinds.contains(&ErrorKind::IllegalResult));
    assert!(kinds
        .iter()
        .any(|k| matches!(k, ErrorKind::ResultExpected { .. })));
}

/*  Async & await  */

#[test]
fn async_on_a_plain_function_is_unneeded() {
    let source = "f :: () => number {\n    1\n}\np := async f()\np";
    let program = check(source);
    assert_eq!(kinds(&program), vec![ErrorKind::UnneededAsync]);
    assert_eq!(binding_type(&program, "p").to_string(), "Promise[number]");
}

#[test]
fn await_requires_a_promise() {
    let program = check("x := 1\ny := await x\ny");
    assert_eq!(
        errors(&program),
        vec![ErrorKind::PromiseExpected {
            found: "number".to_string()
        }]
    );
}

#[test]
fn awaiting_functions_become_async() {
    let source = "\
g :: () => number {
    1
}
h :: () => number {
    await (async g())
}
main :: () => number {
    await (async h())
}
main";
    let program = check(source);
    // only the call to the non-async g is flagged
    assert_eq!(kinds(&program), vec![ErrorKind::UnneededAsync]);
}

/*  Use directives  */

#[test]
fn use_binds_module_members() {
    assert_clean("use log from \"io\"\nlog(1)");
}

#[test]
fn use_star_binds_a_namespace() {
    assert_clean("use * as io from \"io\"\nio.log(1)");
}

#[test]
fn unknown_module_member_is_reported() {
    let source = "use (log, nope) from \"io\"\nlog(1)\nnope";
    let program = check(source);
    assert_eq!(
        errors(&program),
        vec![ErrorKind::NotInModule {
            name: "nope".to_string()
        }]
    );
}

#[test]
fn unknown_module_path_is_reported() {
    let source = "use x from \"mystery\"\nx";
    let program = check(source);
    assert_eq!(
        errors(&program),
        vec![ErrorKind::CannotResolvePath {
            path: "mystery".to_string()
        }]
    );
}

/*  Program surface  */

#[test]
fn warnings_do_not_block_emission() {
    let program = check("n := 42");
    assert!(program.is_check_clean());
    let program = check("n := \"a\" + 1\nn");
    assert!(!program.is_check_clean());
}

#[test]
fn blocks_expose_their_scope() {
    let program = assert_no_errors("v := {\n    inner := 1\n    inner\n}\nv");
    let Stmt::Assignment(assignment) = &program.statements[0] else {
        panic!("expected an assignment");
    };
    let Expr::Block(block) = &assignment.value else {
        panic!("expected a block value");
    };
    let scope = block.scope.expect("checked blocks carry their scope");
    assert!(program.scopes.find(scope, "inner").is_some());
}
