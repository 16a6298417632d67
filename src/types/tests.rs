use super::builtins::*;
use super::*;
use crate::scope::{ScopeArena, ScopeKind};
use pretty_assertions::assert_eq;

fn number() -> ExpressionType {
    ExpressionType::Number
}

fn list_of(t: ExpressionType) -> ExpressionType {
    ExpressionType::List(Box::new(t))
}

#[test]
fn primitives_extend_only_themselves() {
    assert!(number().extends(&number()));
    assert!(!number().extends(&ExpressionType::String));
    assert!(!ExpressionType::Boolean.extends(&ExpressionType::Nil));
}

#[test]
fn unknown_is_a_wildcard_on_both_sides() {
    assert!(ExpressionType::Unknown.extends(&number()));
    assert!(number().extends(&ExpressionType::Unknown));
}

#[test]
fn lists_are_covariant() {
    assert!(list_of(number()).extends(&list_of(number())));
    assert!(!list_of(number()).extends(&list_of(ExpressionType::String)));
    assert!(!list_of(number()).extends(&number()));
}

#[test]
fn tuple_extends_requires_equal_arity() {
    let pair = ExpressionType::Tuple(vec![number(), ExpressionType::String]);
    let pair2 = ExpressionType::Tuple(vec![number(), ExpressionType::String]);
    let triple = ExpressionType::Tuple(vec![
        number(),
        ExpressionType::String,
        ExpressionType::Boolean,
    ]);
    assert!(pair.extends(&pair2));
    assert!(!pair.extends(&triple));
    assert!(!triple.extends(&pair));
}

#[test]
fn single_element_tuple_unwraps_to_its_element() {
    let single = ExpressionType::Tuple(vec![number()]);
    assert!(single.extends(&number()));
    assert!(number().extends(&single));
    assert!(!single.extends(&ExpressionType::String));
}

#[test]
fn objects_extend_structurally() {
    let mut small = Object::default();
    small.add_member("x", number());

    let mut big = Object::default();
    big.add_member("x", number());
    big.add_member("y", ExpressionType::String);

    // the subtype may have more members, never fewer
    assert!(ExpressionType::Object(big.clone()).extends(&ExpressionType::Object(small.clone())));
    assert!(!ExpressionType::Object(small).extends(&ExpressionType::Object(big)));
}

#[test]
fn aliases_compare_nominally() {
    let a = ExpressionType::Alias(make_option(Some(number())));
    let b = ExpressionType::Alias(make_option(Some(number())));
    let c = ExpressionType::Alias(make_option(Some(ExpressionType::String)));
    let r = ExpressionType::Alias(make_result(Some(number()), Some(number())));

    assert!(a.extends(&b));
    assert!(!a.extends(&c));
    assert!(!a.extends(&r));
}

#[test]
fn unapplied_alias_params_accept_anything() {
    let unapplied = ExpressionType::Alias(make_option(None));
    let applied = ExpressionType::Alias(make_option(Some(number())));
    assert!(applied.extends(&unapplied));
    assert!(unapplied.extends(&applied));
}

#[test]
fn functions_extend_pairwise() {
    let f = ExpressionType::Function(Function::new(vec![number()], ExpressionType::Boolean));
    let g = ExpressionType::Function(Function::new(vec![number()], ExpressionType::Boolean));
    let h = ExpressionType::Function(Function::new(
        vec![number(), number()],
        ExpressionType::Boolean,
    ));
    assert!(f.extends(&g));
    assert!(!f.extends(&h));
}

#[test]
fn unconstrained_generics_extend_everything() {
    let t = ExpressionType::Generic(Generic::named("T"));
    assert!(t.extends(&number()));
    assert!(t.extends(&list_of(ExpressionType::String)));
    assert!(number().extends(&t));
}

#[test]
fn matches_is_mutual_extension() {
    let pairs = [
        (number(), number(), true),
        (number(), ExpressionType::String, false),
        (list_of(number()), list_of(number()), true),
        (
            ExpressionType::Alias(make_option(Some(number()))),
            ExpressionType::Alias(make_option(Some(number()))),
            true,
        ),
    ];
    for (a, b, expected) in pairs {
        assert_eq!(matches(&a, &b), expected, "matches({a}, {b})");
        assert_eq!(matches(&a, &b), a.extends(&b) && b.extends(&a));
    }
}

#[test]
fn trait_conformance_checks_every_member() {
    let error = make_error_trait();
    let mut alias = Alias::new("Oops", ExpressionType::Object(Object::default()));
    assert!(!alias.implements(&error));

    alias.register_method(
        "error",
        ExpressionType::Function(Function::new(vec![], ExpressionType::String)),
    );
    assert!(alias.implements(&error));
}

#[test]
fn sum_payload_shapes() {
    let sum = Sum {
        members: vec![
            SumMember {
                name: "A".to_string(),
                params: vec![number()],
            },
            SumMember {
                name: "B".to_string(),
                params: vec![],
            },
            SumMember {
                name: "C".to_string(),
                params: vec![number(), ExpressionType::String],
            },
        ],
    };
    assert_eq!(sum.payload("A"), Some(number()));
    assert_eq!(sum.payload("B"), None);
    assert_eq!(
        sum.payload("C"),
        Some(ExpressionType::Tuple(vec![
            number(),
            ExpressionType::String
        ]))
    );
    assert_eq!(sum.payload("D"), None);
}

#[test]
fn display_renders_source_like_text() {
    assert_eq!(number().to_string(), "number");
    assert_eq!(list_of(number()).to_string(), "[]number");
    assert_eq!(
        ExpressionType::Tuple(vec![number(), ExpressionType::String]).to_string(),
        "(number, string)"
    );
    assert_eq!(
        ExpressionType::Alias(make_option(Some(number()))).to_string(),
        "Option[number]"
    );
    assert_eq!(
        ExpressionType::Alias(make_option(None)).to_string(),
        "Option"
    );
    assert_eq!(
        ExpressionType::Ref(Box::new(list_of(number()))).to_string(),
        "&[]number"
    );
}

#[test]
fn build_resolves_generic_from_compared_argument() {
    let mut arena = ScopeArena::new();
    let scope = arena.push(ScopeKind::Program, arena.root());
    let t = Generic::named("T");
    arena.add(
        scope,
        "T",
        Default::default(),
        ExpressionType::Type(Box::new(ExpressionType::Generic(t.clone()))),
    );

    // first use pins the parameter down
    let (built, ok) = ExpressionType::Generic(t.clone()).build(&mut arena, scope, Some(&number()));
    assert!(ok);
    assert_eq!(built, number());

    // later uses see the binding, and never re-bind
    let (again, ok) =
        ExpressionType::Generic(t).build(&mut arena, scope, Some(&ExpressionType::String));
    assert!(ok);
    assert_eq!(again, number());
}

#[test]
fn build_without_binding_is_unresolved() {
    let mut arena = ScopeArena::new();
    let scope = arena.push(ScopeKind::Program, arena.root());
    let t = Generic::named("T");
    arena.add(
        scope,
        "T",
        Default::default(),
        ExpressionType::Type(Box::new(ExpressionType::Generic(t.clone()))),
    );

    let (built, ok) = ExpressionType::Generic(t).build(&mut arena, scope, None);
    assert!(!ok);
    assert_eq!(built, ExpressionType::Unknown);
}

#[test]
fn build_is_idempotent_once_resolved() {
    let mut arena = ScopeArena::new();
    let scope = arena.push(ScopeKind::Program, arena.root());
    let concrete = ExpressionType::Tuple(vec![number(), list_of(ExpressionType::String)]);
    let (built, ok) = concrete.build(&mut arena, scope, Some(&concrete));
    assert!(ok);
    assert_eq!(built, concrete);

    let (again, ok) = built.build(&mut arena, scope, Some(&built));
    assert!(ok);
    assert_eq!(again, built);
}

#[test]
fn build_recurses_through_composites() {
    let mut arena = ScopeArena::new();
    let scope = arena.push(ScopeKind::Program, arena.root());
    let t = Generic::named("T");
    arena.add(
        scope,
        "T",
        Default::default(),
        ExpressionType::Type(Box::new(ExpressionType::Generic(t.clone()))),
    );

    let list = list_of(ExpressionType::Generic(t));
    let (built, ok) = list.build(&mut arena, scope, Some(&list_of(number())));
    assert!(ok);
    assert_eq!(built, list_of(number()));
}

#[test]
fn build_resolves_option_alias_params() {
    let mut arena = ScopeArena::new();
    let scope = arena.push(ScopeKind::Program, arena.root());
    let t = Generic::named("T");
    arena.add(
        scope,
        "T",
        Default::default(),
        ExpressionType::Type(Box::new(ExpressionType::Generic(t.clone()))),
    );
    // pin T down first, as a call argument would
    let (_, ok) = ExpressionType::Generic(t.clone()).build(&mut arena, scope, Some(&number()));
    assert!(ok);

    let option = ExpressionType::Alias(make_option(Some(ExpressionType::Generic(t))));
    let (built, ok) = option.build(&mut arena, scope, None);
    assert!(ok);
    assert_eq!(built.to_string(), "Option[number]");
}
