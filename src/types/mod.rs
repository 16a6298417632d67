//! The Quill type system
//!
//! Types are a closed variant family. Structural relationships are decided
//! by [`ExpressionType::extends`] (may a value of one type be used where the
//! other is expected) and [`matches`] (symmetric agreement). Generic
//! instantiation lives in [`build`](crate::types::build).

use std::fmt;

pub mod build;
pub mod builtins;

/// A member of an object type.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMember {
    pub name: String,
    pub typing: ExpressionType,
}

/// A structural object type: named members, members with default values,
/// and embedded (flattened) aliases.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    pub embedded: Vec<ObjectMember>,
    pub members: Vec<ObjectMember>,
    pub defaults: Vec<ObjectMember>,
}

impl Object {
    pub fn add_member(&mut self, name: impl Into<String>, typing: ExpressionType) {
        self.members.push(ObjectMember {
            name: name.into(),
            typing,
        });
    }

    pub fn add_default(&mut self, name: impl Into<String>, typing: ExpressionType) {
        self.defaults.push(ObjectMember {
            name: name.into(),
            typing,
        });
    }

    pub fn add_embedded(&mut self, name: impl Into<String>, typing: ExpressionType) {
        self.embedded.push(ObjectMember {
            name: name.into(),
            typing,
        });
    }

    /// Find a member declared directly on this object.
    pub fn get_owned(&self, name: &str) -> Option<&ExpressionType> {
        self.embedded
            .iter()
            .chain(self.members.iter())
            .chain(self.defaults.iter())
            .find(|m| m.name == name)
            .map(|m| &m.typing)
    }

    /// All members, with embedded aliases expanded.
    pub fn flatten(&self) -> Vec<ObjectMember> {
        let mut members = Vec::new();
        for embedded in &self.embedded {
            if let ExpressionType::Alias(alias) = &embedded.typing {
                if let ExpressionType::Object(object) = alias.reference.as_ref() {
                    members.extend(object.flatten());
                }
            }
        }
        members.extend(self.members.iter().cloned());
        members.extend(self.defaults.iter().cloned());
        members
    }
}

/// One constructor of a sum type: a name and its payload types.
#[derive(Debug, Clone, PartialEq)]
pub struct SumMember {
    pub name: String,
    pub params: Vec<ExpressionType>,
}

/// A tagged union. Constructors are ordinary functions returning the
/// enclosing alias; they are synthesized on access so that the type value
/// stays finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Sum {
    pub members: Vec<SumMember>,
}

impl Sum {
    pub fn get(&self, name: &str) -> Option<&SumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// The type a match-case binder receives for a constructor.
    /// A bare constructor has no payload; one parameter binds directly;
    /// several bind as a tuple. Applied type parameters are unwrapped to
    /// their values.
    pub fn payload(&self, name: &str) -> Option<ExpressionType> {
        let member = self.get(name)?;
        let mut params: Vec<ExpressionType> =
            member.params.iter().map(resolve_applied).collect();
        match params.len() {
            0 => None,
            1 => params.pop(),
            _ => Some(ExpressionType::Tuple(params)),
        }
    }

    fn payload_or_nil(member: &SumMember) -> ExpressionType {
        match member.params.len() {
            0 => ExpressionType::Nil,
            1 => member.params[0].clone(),
            _ => ExpressionType::Tuple(member.params.clone()),
        }
    }
}

/// A structural interface: required member signatures over a receiver
/// placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Trait {
    pub self_name: String,
    pub members: Vec<(String, ExpressionType)>,
}

impl Trait {
    pub fn get(&self, name: &str) -> Option<&ExpressionType> {
        self.members
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    /// Does a type carrying `methods` satisfy every member of this trait?
    pub fn satisfied_by(&self, methods: &[(String, ExpressionType)]) -> bool {
        self.members.iter().all(|(name, signature)| {
            methods
                .iter()
                .find(|(n, _)| n == name)
                .is_some_and(|(_, method)| signature.extends(method))
        })
    }
}

/// A function type. `params` behaves as a tuple; `is_async` marks functions
/// that may be called with `async`.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub type_params: Vec<Generic>,
    pub params: Vec<ExpressionType>,
    pub returned: Box<ExpressionType>,
    pub is_async: bool,
}

impl Function {
    pub fn new(params: Vec<ExpressionType>, returned: ExpressionType) -> Self {
        Self {
            type_params: Vec::new(),
            params,
            returned: Box::new(returned),
            is_async: false,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A type parameter. `value` holds the statically-applied argument, if any;
/// call-site resolution goes through the scope's single-assignment slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Generic {
    pub name: String,
    pub constraint: Option<Box<ExpressionType>>,
    pub value: Option<Box<ExpressionType>>,
}

impl Generic {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: Option<ExpressionType>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            value: value.map(Box::new),
        }
    }
}

/// A nominal alias over a structural reference, carrying type parameters
/// and registered methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub name: String,
    pub params: Vec<Generic>,
    pub reference: Box<ExpressionType>,
    pub methods: Vec<(String, ExpressionType)>,
}

impl Alias {
    pub fn new(name: impl Into<String>, reference: ExpressionType) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            reference: Box::new(reference),
            methods: Vec::new(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&ExpressionType> {
        self.methods
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn register_method(&mut self, name: impl Into<String>, signature: ExpressionType) {
        self.methods.push((name.into(), signature));
    }

    /// Does this alias implement every member of the trait?
    pub fn implements(&self, required: &Trait) -> bool {
        if let ExpressionType::Trait(own) = self.reference.as_ref() {
            return required.satisfied_by(&own.members);
        }
        required.satisfied_by(&self.methods)
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let applied: Vec<&Generic> =
            self.params.iter().take_while(|p| p.value.is_some()).collect();
        if applied.is_empty() {
            return write!(f, "{}", self.name);
        }
        write!(f, "{}[", self.name)?;
        for (i, param) in applied.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param.value.as_ref().unwrap())?;
        }
        write!(f, "]")
    }
}

/// The closed family of Quill types. Exactly one variant is active per
/// instance; `Unknown` is the wildcard used for error recovery.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionType {
    Unknown,
    Nil,
    Number,
    Boolean,
    String,
    /// A value that denotes a type rather than a runtime value.
    Type(Box<ExpressionType>),
    List(Box<ExpressionType>),
    Map(Box<ExpressionType>, Box<ExpressionType>),
    Tuple(Vec<ExpressionType>),
    Range(Box<ExpressionType>),
    Ref(Box<ExpressionType>),
    Object(Object),
    Sum(Sum),
    Trait(Trait),
    Function(Function),
    Generic(Generic),
    Alias(Alias),
}

impl ExpressionType {
    /// True if a value of `self` may be used where `other` is expected.
    pub fn extends(&self, other: &ExpressionType) -> bool {
        use ExpressionType::*;
        match (self, other) {
            (Unknown, _) | (_, Unknown) => true,

            (Nil, Nil) | (Number, Number) | (Boolean, Boolean) | (String, String) => true,

            (Type(a), Type(b)) => a.extends(b),

            (List(a), List(b)) => a.extends(b),
            (Range(a), Range(b)) => a.extends(b),
            (Ref(a), Ref(b)) => a.extends(b),
            (Map(ka, va), Map(kb, vb)) => ka.extends(kb) && va.extends(vb),

            (Tuple(a), Tuple(b)) => {
                if a.len() != b.len() {
                    // a single element and its 1-tuple are interchangeable
                    if a.len() == 1 {
                        return a[0].extends(other);
                    }
                    if b.len() == 1 {
                        return self.extends(&b[0]);
                    }
                    return false;
                }
                a.iter().zip(b.iter()).all(|(x, y)| x.extends(y))
            }
            (Tuple(a), _) if a.len() == 1 => a[0].extends(other),
            (_, Tuple(b)) if b.len() == 1 => self.extends(&b[0]),

            (Object(a), Object(b)) => {
                // every member of the expected type must exist here,
                // with an extending type; extra members are fine
                let own = a.flatten();
                b.flatten().iter().all(|required| {
                    own.iter()
                        .find(|m| m.name == required.name)
                        .is_some_and(|m| m.typing.extends(&required.typing))
                })
            }

            (Sum(a), Sum(b)) => b.members.iter().all(|required| {
                a.get(&required.name).is_some_and(|member| {
                    member.params.len() == required.params.len()
                        && member
                            .params
                            .iter()
                            .zip(required.params.iter())
                            .all(|(x, y)| x.extends(y))
                })
            }),
            // used for pattern-target resolution: a sum reaches a type if
            // exactly one of its constructors does
            (Sum(sum), _) => {
                sum.members
                    .iter()
                    .filter(|m| crate::types::Sum::payload_or_nil(m).extends(other))
                    .count()
                    == 1
            }

            (Trait(a), Trait(b)) => a.satisfied_by(&b.members),
            (Trait(a), Alias(b)) => b.implements(a),

            (Function(a), Function(b)) => {
                a.arity() == b.arity()
                    && a.params
                        .iter()
                        .zip(b.params.iter())
                        .all(|(x, y)| x.extends(y))
                    && a.returned.extends(&b.returned)
            }

            (Generic(g), _) => match &g.constraint {
                None => true,
                Some(constraint) => {
                    if let Generic(other) = other {
                        match &other.constraint {
                            Some(c) => constraint.extends(c),
                            None => true,
                        }
                    } else {
                        constraint.extends(other)
                    }
                }
            },
            (_, Generic(g)) => match &g.constraint {
                None => true,
                Some(constraint) => self.extends(constraint),
            },

            (Alias(a), Alias(b)) => {
                if let Trait(required) = a.reference.as_ref() {
                    return a.name == b.name || b.implements(required);
                }
                if a.name != b.name {
                    return false;
                }
                a.params.iter().zip(b.params.iter()).all(|(pa, pb)| {
                    match (&pa.value, &pb.value) {
                        (Some(va), Some(vb)) => va.extends(vb),
                        _ => true,
                    }
                })
            }
            (Alias(a), Trait(required)) => a.implements(required),
            (Alias(a), _) => a.reference.extends(other),
            (_, Alias(b)) => self.extends(&b.reference),

            _ => false,
        }
    }

    /// Unwrap a reference type, if any.
    pub fn deref(&self) -> &ExpressionType {
        match self {
            ExpressionType::Ref(to) => to,
            other => other,
        }
    }

    /// Unwrap an alias down to its structural reference.
    pub fn unalias(&self) -> &ExpressionType {
        match self {
            ExpressionType::Alias(alias) => alias.reference.unalias(),
            other => other,
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(self, ExpressionType::Type(_))
    }
}

/// Unwrap an applied type parameter down to its value.
fn resolve_applied(t: &ExpressionType) -> ExpressionType {
    match t {
        ExpressionType::Generic(g) => match &g.value {
            Some(value) => resolve_applied(value),
            None => t.clone(),
        },
        other => other.clone(),
    }
}

/// Symmetric type agreement, used where two branches must produce the same
/// type. `Unknown` agrees with everything.
pub fn matches(a: &ExpressionType, b: &ExpressionType) -> bool {
    if matches!(a, ExpressionType::Unknown) || matches!(b, ExpressionType::Unknown) {
        return true;
    }
    a.extends(b) && b.extends(a)
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ExpressionType::*;
        match self {
            Unknown => write!(f, "unknown"),
            Nil => write!(f, "nil"),
            Number => write!(f, "number"),
            Boolean => write!(f, "boolean"),
            String => write!(f, "string"),
            Type(value) => write!(f, "({value})"),
            List(element) => write!(f, "[]{element}"),
            Map(key, value) => write!(f, "Map[{key}, {value}]"),
            Tuple(elements) => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ")")
            }
            Range(operand) => write!(f, "..{operand}"),
            Ref(to) => write!(f, "&{to}"),
            Object(object) => {
                write!(f, "{{")?;
                for (i, member) in object.flatten().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", member.name, member.typing)?;
                }
                write!(f, "}}")
            }
            Sum(sum) => {
                write!(f, "(")?;
                for (i, member) in sum.members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "| {}", member.name)?;
                    if !member.params.is_empty() {
                        write!(f, "(")?;
                        for (j, param) in member.params.iter().enumerate() {
                            if j > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{param}")?;
                        }
                        write!(f, ")")?;
                    }
                }
                write!(f, ")")
            }
            Trait(t) => {
                write!(f, "(")?;
                for (i, (name, member)) in t.members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {member}")?;
                }
                write!(f, ")")
            }
            Function(function) => {
                write!(f, "(")?;
                for (i, param) in function.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {}", function.returned)
            }
            Generic(generic) => match &generic.value {
                Some(value) => write!(f, "{value}"),
                None => write!(f, "{}", generic.name),
            },
            Alias(alias) => write!(f, "{alias}"),
        }
    }
}

#[cfg(test)]
mod tests;
