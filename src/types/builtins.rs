//! Built-in types and the standard bindings
//!
//! `Option`, `Result`, `Map` and `Promise` are ordinary aliases constructed
//! once per compilation run and bound in the immutable root scope, together
//! with the `Error` trait and the built-in modules.

use crate::types::{
    Alias, ExpressionType, Function, Generic, Object, Sum, SumMember, Trait,
};

fn generic_ref(name: &str, value: Option<ExpressionType>) -> ExpressionType {
    ExpressionType::Generic(Generic::with_value(name, value))
}

/// `Option[T] = Some(T) | None`
pub fn make_option(value: Option<ExpressionType>) -> Alias {
    Alias {
        name: "Option".to_string(),
        params: vec![Generic::with_value("T", value.clone())],
        reference: Box::new(ExpressionType::Sum(Sum {
            members: vec![
                SumMember {
                    name: "Some".to_string(),
                    params: vec![generic_ref("T", value)],
                },
                SumMember {
                    name: "None".to_string(),
                    params: vec![],
                },
            ],
        })),
        methods: Vec::new(),
    }
}

/// `Result[Ok, Err] = Ok(Ok) | Err(Err)`
pub fn make_result(ok: Option<ExpressionType>, err: Option<ExpressionType>) -> Alias {
    Alias {
        name: "Result".to_string(),
        params: vec![
            Generic::with_value("Ok", ok.clone()),
            Generic::with_value("Err", err.clone()),
        ],
        reference: Box::new(ExpressionType::Sum(Sum {
            members: vec![
                SumMember {
                    name: "Ok".to_string(),
                    params: vec![generic_ref("Ok", ok)],
                },
                SumMember {
                    name: "Err".to_string(),
                    params: vec![generic_ref("Err", err)],
                },
            ],
        })),
        methods: Vec::new(),
    }
}

/// `Map[Key, Value]` with its `has`/`get`/`set` methods.
pub fn make_map(key: Option<ExpressionType>, value: Option<ExpressionType>) -> Alias {
    let methods = vec![
        (
            "has".to_string(),
            ExpressionType::Function(Function::new(
                vec![generic_ref("Key", key.clone())],
                ExpressionType::Boolean,
            )),
        ),
        (
            "get".to_string(),
            ExpressionType::Function(Function::new(
                vec![generic_ref("Key", key.clone())],
                ExpressionType::Alias(make_option(Some(generic_ref("Value", value.clone())))),
            )),
        ),
        (
            "set".to_string(),
            ExpressionType::Function(Function::new(
                vec![
                    generic_ref("Key", key.clone()),
                    generic_ref("Value", value.clone()),
                ],
                ExpressionType::Nil,
            )),
        ),
    ];
    Alias {
        name: "Map".to_string(),
        params: vec![
            Generic::with_value("Key", key.clone()),
            Generic::with_value("Value", value.clone()),
        ],
        reference: Box::new(ExpressionType::Map(
            Box::new(generic_ref("Key", key)),
            Box::new(generic_ref("Value", value)),
        )),
        methods,
    }
}

/// `Promise[T]`, the type of `async` call results.
pub fn make_promise(value: Option<ExpressionType>) -> Alias {
    let mut object = Object::default();
    object.add_member("value", generic_ref("T", value.clone()));
    Alias {
        name: "Promise".to_string(),
        params: vec![Generic::with_value("T", value)],
        reference: Box::new(ExpressionType::Object(object)),
        methods: Vec::new(),
    }
}

/// The `Error` trait: anything with an `error() -> string` method.
pub fn make_error_trait() -> Trait {
    Trait {
        self_name: "Self".to_string(),
        members: vec![(
            "error".to_string(),
            ExpressionType::Function(Function::new(vec![], ExpressionType::String)),
        )],
    }
}

/// Resolve a built-in module by import path.
pub fn find_module(path: &str) -> Option<ExpressionType> {
    match path {
        "io" => {
            let mut module = Object::default();
            module.add_member(
                "log",
                ExpressionType::Function(Function::new(
                    vec![ExpressionType::Unknown],
                    ExpressionType::Nil,
                )),
            );
            Some(ExpressionType::Object(module))
        }
        _ => None,
    }
}

/// The bindings of the root scope, built once per compilation run.
pub fn root_bindings() -> Vec<(String, ExpressionType)> {
    fn entry(name: &str, alias: Alias) -> (String, ExpressionType) {
        (
            name.to_string(),
            ExpressionType::Type(Box::new(ExpressionType::Alias(alias))),
        )
    }
    vec![
        entry("Option", make_option(None)),
        entry("Result", make_result(None, None)),
        entry("Map", make_map(None, None)),
        entry("Promise", make_promise(None)),
        (
            "Error".to_string(),
            ExpressionType::Type(Box::new(ExpressionType::Trait(make_error_trait()))),
        ),
    ]
}
