//! The closed catalogue of diagnostics the checker can emit.
//!
//! Every kind carries the payloads its message needs, already rendered to
//! plain text. A stable code identifies the kind across releases:
//! `E0xx` syntax, `E1xx` typing, `E2xx` control flow, `E3xx` naming,
//! `E4xx` patterns and shapes, `W0xx` warnings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ErrorKind {
    // Syntax
    #[error("'{token}' expected")]
    TokenExpected { token: String },
    #[error("'{{' expected")]
    LeftBraceExpected,
    #[error("'}}' expected")]
    RightBraceExpected,
    #[error("']' expected")]
    RightBracketExpected,
    #[error("')' expected")]
    RightParenExpected,
    #[error("Expression expected")]
    ExpressionExpected,
    #[error("No expression expected")]
    UnexpectedExpression,
    #[error("Integer expected")]
    IntegerExpected,
    #[error("String literal expected")]
    StringLiteralExpected,
    #[error("Identifier expected")]
    IdentifierExpected,
    #[error("Type identifier expected")]
    TypeIdentifierExpected,
    #[error("Call expression expected")]
    CallExpressionExpected,
    #[error("Function expression expected")]
    FunctionExpressionExpected,
    #[error("Receiver param expected")]
    ReceiverExpected,
    #[error("Parameter expected")]
    ParameterExpected,
    #[error("Field key expected (identifier, literal or brackets)")]
    FieldKeyExpected,

    // Typing
    #[error("Type expected, got value")]
    TypeExpected,
    #[error("Value expected, got type")]
    ValueExpected,
    #[error("boolean expected, got {found}")]
    BooleanExpected { found: String },
    #[error("number expected, got {found}")]
    NumberExpected { found: String },
    #[error("Type or boolean expected, got {found}")]
    TypeOrBoolExpected { found: String },
    #[error("number or range expected, got {found}")]
    IndexExpected { found: String },
    #[error("Concatenable (string or list) expected, got {found}")]
    ConcatenableExpected { found: String },
    #[error("Iterable (list or range) expected, got {found}")]
    IterableExpected { found: String },
    #[error("Function expected, got {found}")]
    FunctionExpected { found: String },
    #[error("Function type expected, got {found}")]
    FunctionTypeExpected { found: String },
    #[error("Object type expected, got {found}")]
    ObjectTypeExpected { found: String },
    #[error("Promise expected, got {found}")]
    PromiseExpected { found: String },
    #[error("Result expected, got {found}")]
    ResultExpected { found: String },
    #[error("Reference expected, got {found}")]
    RefExpected { found: String },
    #[error("Index out of range: max {max}, got {index}")]
    OutOfRange { max: usize, index: String },
    #[error("Cannot fully determine type; probably missing some type arguments")]
    MissingTypeArgs,
    #[error("No type arguments expected for this type")]
    UnexpectedTypeArgs,
    #[error("Cannot use value of type {received} as type {expected}")]
    CannotAssignType { expected: String, received: String },
    #[error("Type {found} is not subscriptable")]
    NotSubscriptable { found: String },
    #[error("Type {found} cannot be instantiated")]
    NotInstanceable { found: String },
    #[error("Cannot match against type {found}")]
    Unmatchable { found: String },
    #[error("Cannot reference such an expression")]
    NotReferenceable,
    #[error("Types {left} and {right} do not match")]
    MismatchedTypes { left: String, right: String },
    #[error("Property '{name}' does not exist on type {parent}")]
    PropertyDoesNotExist { name: String, parent: String },
    #[error("Type {name} does not implement this trait")]
    TypeDoesNotImplement { name: String },
    #[error("Cannot declare a variable as nil value; consider using the option type")]
    VoidAssignment,
    #[error("Cannot declare a variable as a result type; consider using 'try' or 'catch'")]
    ResultDeclaration,

    // Control flow
    #[error("Cannot use 'break' keyword outside of a loop")]
    IllegalBreak,
    #[error("Cannot use 'continue' keyword outside of a loop")]
    IllegalContinue,
    #[error("Cannot use 'return' keyword outside of functions with explicit returns")]
    IllegalReturn,
    #[error("Cannot use 'throw' keyword outside of functions with explicit returns")]
    IllegalThrow,
    #[error("Cannot use failable expressions outside of functions with explicit returns")]
    IllegalResult,

    // Naming
    #[error("'{name}' is a reserved name")]
    ReservedName { name: String },
    #[error("Duplicate identifier '{name}'")]
    DuplicateIdentifier { name: String },
    #[error("Cannot find name '{name}'")]
    CannotFind { name: String },
    #[error("Variable '{name}' does not exist in this module")]
    NotInModule { name: String },
    #[error("Cannot resolve path to {path}")]
    CannotResolvePath { path: String },

    // Patterns & shapes
    #[error("Invalid pattern")]
    InvalidPattern,
    #[error("Got too many elements: expected {expected}, got {received}")]
    TooManyElements { expected: usize, received: usize },
    #[error("Got too few elements: expected {expected}, got {received}")]
    MissingElements { expected: usize, received: usize },
    #[error("Catch-all case should be last")]
    CatchallNotLast,
    #[error("Non-exhaustive match, consider adding a catch-all case")]
    NotExhaustive,
    #[error("Missing constructor '{name}'")]
    MissingConstructor { name: String },
    #[error("Missing key(s) {keys}")]
    MissingKeys { keys: String },

    // Usage warnings
    #[error("Unused variable '{name}'")]
    UnusedVariable { name: String },
    #[error("Unreachable code detected")]
    UnreachableCode,
    #[error("Unneeded catch (lhs is not a result type)")]
    UnneededCatch,
    #[error("Unneeded 'async' keyword")]
    UnneededAsync,
}

impl ErrorKind {
    /// Stable code for this kind.
    pub fn code(&self) -> &'static str {
        use ErrorKind::*;
        match self {
            TokenExpected { .. } => "E001",
            LeftBraceExpected => "E002",
            RightBraceExpected => "E003",
            RightBracketExpected => "E004",
            RightParenExpected => "E005",
            ExpressionExpected => "E006",
            UnexpectedExpression => "E007",
            IntegerExpected => "E008",
            StringLiteralExpected => "E009",
            IdentifierExpected => "E010",
            TypeIdentifierExpected => "E011",
            CallExpressionExpected => "E012",
            FunctionExpressionExpected => "E013",
            ReceiverExpected => "E014",
            FieldKeyExpected => "E015",
            ParameterExpected => "E016",

            TypeExpected => "E100",
            ValueExpected => "E101",
            BooleanExpected { .. } => "E102",
            NumberExpected { .. } => "E103",
            TypeOrBoolExpected { .. } => "E104",
            IndexExpected { .. } => "E105",
            ConcatenableExpected { .. } => "E106",
            IterableExpected { .. } => "E107",
            FunctionExpected { .. } => "E108",
            FunctionTypeExpected { .. } => "E109",
            ObjectTypeExpected { .. } => "E110",
            PromiseExpected { .. } => "E111",
            ResultExpected { .. } => "E112",
            RefExpected { .. } => "E113",
            OutOfRange { .. } => "E114",
            MissingTypeArgs => "E115",
            UnexpectedTypeArgs => "E116",
            CannotAssignType { .. } => "E117",
            NotSubscriptable { .. } => "E118",
            NotInstanceable { .. } => "E119",
            Unmatchable { .. } => "E120",
            NotReferenceable => "E121",
            MismatchedTypes { .. } => "E122",
            PropertyDoesNotExist { .. } => "E123",
            TypeDoesNotImplement { .. } => "E124",
            VoidAssignment => "E125",
            ResultDeclaration => "E126",

            IllegalBreak => "E200",
            IllegalContinue => "E201",
            IllegalReturn => "E202",
            IllegalThrow => "E203",
            IllegalResult => "E204",

            ReservedName { .. } => "E300",
            DuplicateIdentifier { .. } => "E301",
            CannotFind { .. } => "E302",
            NotInModule { .. } => "E303",
            CannotResolvePath { .. } => "E304",

            InvalidPattern => "E400",
            TooManyElements { .. } => "E401",
            MissingElements { .. } => "E402",
            CatchallNotLast => "E403",
            NotExhaustive => "E404",
            MissingConstructor { .. } => "E405",
            MissingKeys { .. } => "E406",

            UnusedVariable { .. } => "W001",
            UnreachableCode => "W002",
            UnneededCatch => "W003",
            UnneededAsync => "W004",
        }
    }

    /// Warnings never prevent the checked program from being emitted.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ErrorKind::UnusedVariable { .. }
                | ErrorKind::UnreachableCode
                | ErrorKind::UnneededCatch
                | ErrorKind::UnneededAsync
        )
    }
}
