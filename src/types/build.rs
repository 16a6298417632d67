//! Generic instantiation
//!
//! `build` resolves the type parameters inside a type against a scope and an
//! optional compared type, realizing one-shot left-to-right unification: a
//! type parameter is fixed by the first usage that pins it down, through the
//! variable's single-assignment slot. Later usages are checked with
//! `extends`, never re-bound. The returned flag is false while some
//! parameter is still unresolved.

use crate::parser::span::Span;
use crate::scope::{ScopeArena, ScopeId, ScopeKind};
use crate::types::{ExpressionType, Generic, Sum, SumMember};

impl ExpressionType {
    /// Resolve this type's generics in `scope`, using `compared` to bind
    /// parameters positionally. Returns the resolved type and whether it is
    /// fully concrete.
    pub fn build(
        &self,
        scope: &mut ScopeArena,
        at: ScopeId,
        compared: Option<&ExpressionType>,
    ) -> (ExpressionType, bool) {
        use ExpressionType::*;
        match self {
            Unknown | Nil | Number | Boolean | String => (self.clone(), true),

            Type(value) => {
                let inner = match compared {
                    Some(Type(c)) => Some(c.as_ref()),
                    _ => None,
                };
                let (built, ok) = value.build(scope, at, inner);
                (Type(Box::new(built)), ok)
            }

            List(element) => {
                let inner = match compared {
                    Some(List(c)) => Some(c.as_ref()),
                    _ => None,
                };
                let (built, ok) = element.build(scope, at, inner);
                (List(Box::new(built)), ok)
            }

            Range(operand) => {
                let inner = match compared {
                    Some(Range(c)) => Some(c.as_ref()),
                    _ => None,
                };
                let (built, ok) = operand.build(scope, at, inner);
                (Range(Box::new(built)), ok)
            }

            Ref(to) => match compared {
                Some(Ref(c)) => {
                    let (built, ok) = to.build(scope, at, Some(c));
                    (Ref(Box::new(built)), ok)
                }
                _ => {
                    let (built, ok) = to.build(scope, at, None);
                    (Ref(Box::new(built)), ok)
                }
            },

            Map(key, value) => {
                let (ck, cv) = match compared {
                    Some(Map(k, v)) => (Some(k.as_ref()), Some(v.as_ref())),
                    _ => (None, None),
                };
                let (key, kk) = key.build(scope, at, ck);
                let (value, vk) = value.build(scope, at, cv);
                (Map(Box::new(key), Box::new(value)), kk && vk)
            }

            Tuple(elements) => {
                let compared = match compared {
                    Some(Tuple(c)) => Some(c),
                    _ => None,
                };
                let mut ok = true;
                let mut built = Vec::with_capacity(elements.len());
                for (i, element) in elements.iter().enumerate() {
                    let other = compared.and_then(|c| c.get(i));
                    let (b, k) = element.build(scope, at, other);
                    ok = ok && k;
                    built.push(b);
                }
                (Tuple(built), ok)
            }

            Object(object) => {
                let compared = match compared {
                    Some(Object(c)) => Some(c),
                    _ => None,
                };
                let mut ok = true;
                let mut built = object.clone();
                for member in built
                    .embedded
                    .iter_mut()
                    .chain(built.members.iter_mut())
                    .chain(built.defaults.iter_mut())
                {
                    // compare against the member of the same name, not the
                    // whole compared object
                    let other = compared.and_then(|c| c.get_owned(&member.name));
                    let (b, k) = member.typing.build(scope, at, other);
                    ok = ok && k;
                    member.typing = b;
                }
                (Object(built), ok)
            }

            Sum(sum) => {
                let compared = match compared {
                    Some(Sum(c)) => Some(c),
                    _ => None,
                };
                let mut ok = true;
                let mut members = Vec::with_capacity(sum.members.len());
                for member in &sum.members {
                    let other = compared.and_then(|c| c.get(&member.name));
                    let mut params = Vec::with_capacity(member.params.len());
                    for (i, param) in member.params.iter().enumerate() {
                        let compared_param = other.and_then(|m| m.params.get(i));
                        let (b, k) = param.build(scope, at, compared_param);
                        ok = ok && k;
                        params.push(b);
                    }
                    members.push(SumMember {
                        name: member.name.clone(),
                        params,
                    });
                }
                (Sum(crate::types::Sum { members }), ok)
            }

            Trait(_) => (self.clone(), true),

            Function(function) => {
                let inner = scope.push(ScopeKind::Program, at);
                for param in &function.type_params {
                    scope.add(
                        inner,
                        &param.name,
                        Span::default(),
                        Type(Box::new(Generic(param.clone()))),
                    );
                }
                let compared = match compared {
                    Some(Function(c)) => Some(c),
                    _ => None,
                };
                let mut ok = true;
                let mut params = Vec::with_capacity(function.params.len());
                for (i, param) in function.params.iter().enumerate() {
                    let other = compared.and_then(|c| c.params.get(i));
                    let (b, k) = param.build(scope, inner, other);
                    ok = ok && k;
                    params.push(b);
                }
                let (returned, k) = function.returned.build(
                    scope,
                    inner,
                    compared.map(|c| c.returned.as_ref()),
                );
                ok = ok && k;
                let mut built = function.clone();
                built.params = params;
                built.returned = Box::new(returned);
                (Function(built), ok)
            }

            Generic(generic) => build_generic(generic, scope, at, compared),

            Alias(alias) => {
                let inner = scope.push(ScopeKind::Program, at);
                // applied params resolve through their own value; binding
                // them here would shadow the scope that pins them down
                for param in alias.params.iter().filter(|p| p.value.is_none()) {
                    scope.add(
                        inner,
                        &param.name,
                        Span::default(),
                        Type(Box::new(Generic(param.clone()))),
                    );
                }
                let compared = match compared {
                    Some(Alias(c)) => Some(c.reference.as_ref()),
                    _ => None,
                };
                let (reference, ok) = alias.reference.build(scope, inner, compared);
                let mut built = alias.clone();
                built.reference = Box::new(reference);
                for param in built.params.iter_mut() {
                    match param.value.take() {
                        Some(value) => {
                            let (value, _) = value.build(scope, inner, None);
                            param.value = Some(Box::new(value));
                        }
                        None => {
                            let (value, resolved) =
                                Generic(param.clone()).build(scope, inner, None);
                            if resolved {
                                param.value = Some(Box::new(value));
                            }
                        }
                    }
                }
                (Alias(built), ok)
            }
        }
    }
}

fn build_generic(
    generic: &Generic,
    scope: &mut ScopeArena,
    at: ScopeId,
    compared: Option<&ExpressionType>,
) -> (ExpressionType, bool) {
    // a statically-applied argument may itself be generic, so keep building
    if let Some(value) = &generic.value {
        return value.build(scope, at, compared);
    }
    let Some(variable) = scope.find_mut(at, &generic.name) else {
        return (ExpressionType::Unknown, false);
    };
    variable.read_at(Span::default());

    let found = match &variable.typing {
        ExpressionType::Type(inner) => match inner.as_ref() {
            ExpressionType::Generic(g) => g.clone(),
            other => return (other.clone(), true),
        },
        other => return (other.clone(), true),
    };
    if let Some(value) = found.value {
        return value.build(scope, at, compared);
    }

    let variable = scope
        .find_mut(at, &generic.name)
        .expect("binding just found");
    if let Some(bound) = variable.binding.get() {
        return (bound.clone(), true);
    }
    match compared {
        Some(value) => {
            // first writer wins; a concurrent earlier write is kept
            let _ = variable.binding.set(value.clone());
            (
                variable
                    .binding
                    .get()
                    .cloned()
                    .expect("slot was just written"),
                true,
            )
        }
        None => (ExpressionType::Unknown, false),
    }
}
