//! Property-based tests for the type algebra.
//!
//! These use proptest to generate concrete types and verify the invariants
//! the rest of the checker relies on.

use proptest::prelude::*;
use quill::scope::{ScopeArena, ScopeKind};
use quill::types::{matches, ExpressionType};

fn leaf() -> impl Strategy<Value = ExpressionType> {
    prop_oneof![
        Just(ExpressionType::Nil),
        Just(ExpressionType::Number),
        Just(ExpressionType::Boolean),
        Just(ExpressionType::String),
    ]
}

/// Fully concrete composite types: no generics, no aliases, no unknowns.
fn concrete_type() -> impl Strategy<Value = ExpressionType> {
    leaf().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            inner
                .clone()
                .prop_map(|t| ExpressionType::List(Box::new(t))),
            inner
                .clone()
                .prop_map(|t| ExpressionType::Range(Box::new(t))),
            inner.clone().prop_map(|t| ExpressionType::Ref(Box::new(t))),
            prop::collection::vec(inner.clone(), 2..4).prop_map(ExpressionType::Tuple),
            (inner.clone(), inner).prop_map(|(k, v)| {
                ExpressionType::Map(Box::new(k), Box::new(v))
            }),
        ]
    })
}

proptest! {
    #[test]
    fn extends_is_reflexive(t in concrete_type()) {
        prop_assert!(t.extends(&t));
    }

    #[test]
    fn matches_is_mutual_extension(a in concrete_type(), b in concrete_type()) {
        prop_assert_eq!(matches(&a, &b), a.extends(&b) && b.extends(&a));
    }

    #[test]
    fn unknown_is_a_wildcard_on_both_sides(t in concrete_type()) {
        prop_assert!(ExpressionType::Unknown.extends(&t));
        prop_assert!(t.extends(&ExpressionType::Unknown));
    }

    #[test]
    fn single_tuples_unwrap_to_their_element(t in concrete_type()) {
        let single = ExpressionType::Tuple(vec![t.clone()]);
        prop_assert!(single.extends(&t));
        prop_assert!(t.extends(&single));
    }

    #[test]
    fn tuple_extends_requires_equal_arity(
        a in prop::collection::vec(leaf(), 2..5),
        b in prop::collection::vec(leaf(), 2..5),
    ) {
        let ta = ExpressionType::Tuple(a.clone());
        let tb = ExpressionType::Tuple(b.clone());
        if a.len() != b.len() {
            prop_assert!(!ta.extends(&tb));
            prop_assert!(!tb.extends(&ta));
        }
    }

    #[test]
    fn build_is_idempotent_once_concrete(t in concrete_type()) {
        let mut arena = ScopeArena::new();
        let scope = arena.push(ScopeKind::Program, arena.root());

        let (built, resolved) = t.build(&mut arena, scope, Some(&t));
        prop_assert!(resolved);
        prop_assert_eq!(&built, &t);

        let (again, resolved) = built.build(&mut arena, scope, Some(&built));
        prop_assert!(resolved);
        prop_assert_eq!(again, built);
    }

    #[test]
    fn extends_ignores_the_compared_argument_order_for_equal_types(t in concrete_type()) {
        // a type always matches itself
        prop_assert!(matches(&t, &t));
    }
}
