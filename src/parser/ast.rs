//! Abstract syntax tree for Quill
//!
//! Nodes form two closed families, [`Expr`] and [`Stmt`]. Every node knows
//! its source span; expression nodes expose their computed type. Types are
//! resolved by the parser immediately after each node is built, so a checked
//! tree is ready for an emitter without a second pass.

use crate::parser::lexer::{Token, TokenKind};
use crate::parser::span::Span;
use crate::scope::ScopeId;
use crate::types::{self, ExpressionType};

/// A literal token: number, string, boolean, or a type keyword.
#[derive(Debug, Clone)]
pub struct Literal {
    pub token: Token,
}

impl Literal {
    pub fn ty(&self) -> ExpressionType {
        match self.token.kind {
            TokenKind::NumberLiteral => ExpressionType::Number,
            TokenKind::BooleanLiteral => ExpressionType::Boolean,
            TokenKind::StringLiteral => ExpressionType::String,
            TokenKind::NumberKeyword => ExpressionType::Type(Box::new(ExpressionType::Number)),
            TokenKind::StringKeyword => ExpressionType::Type(Box::new(ExpressionType::String)),
            TokenKind::BooleanKeyword => ExpressionType::Type(Box::new(ExpressionType::Boolean)),
            _ => ExpressionType::Unknown,
        }
    }
}

/// A name. Type identifiers start with an uppercase letter.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub token: Token,
    pub ty: ExpressionType,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            ty: ExpressionType::Unknown,
        }
    }

    pub fn name(&self) -> &str {
        &self.token.text
    }

    pub fn is_type(&self) -> bool {
        self.name()
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
    }
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Expr,
    pub right: Expr,
    pub operator: Token,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub operator: Token,
    pub operand: Expr,
}

/// `left..right` or `left..=right`
#[derive(Debug, Clone)]
pub struct RangeExpr {
    pub left: Expr,
    pub operator: Token,
    pub right: Expr,
}

#[derive(Debug, Clone)]
pub struct TupleExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
    pub ty: ExpressionType,
}

impl TupleExpr {
    /// Wrap an expression in a 1-tuple if it is not already a tuple.
    pub fn wrap(expr: Option<Expr>, span: Span) -> TupleExpr {
        match expr {
            None => TupleExpr {
                elements: Vec::new(),
                span,
                ty: ExpressionType::Nil,
            },
            Some(Expr::Tuple(tuple)) => *tuple,
            Some(other) => TupleExpr {
                span: other.span(),
                elements: vec![other],
                ty: ExpressionType::Unknown,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParenExpr {
    pub expr: Option<Expr>,
    pub span: Span,
}

/// `name Type` — a typed pair, as in parameter lists and object members.
#[derive(Debug, Clone)]
pub struct ParamExpr {
    pub name: Identifier,
    pub typing: Expr,
}

/// `key: value` — an entry, as in struct or map instances and defaults.
#[derive(Debug, Clone)]
pub struct EntryExpr {
    pub key: Option<Expr>,
    pub value: Expr,
    pub span: Span,
}

/// `[]Element` — a list type expression.
#[derive(Debug, Clone)]
pub struct ListTypeExpr {
    pub element: Expr,
    pub span: Span,
}

/// `[a, b, c]` — a list literal.
#[derive(Debug, Clone)]
pub struct ListExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
    pub ty: ExpressionType,
}

/// An expression between brackets, as in type arguments.
#[derive(Debug, Clone)]
pub struct BracketedExpr {
    pub expr: Option<Expr>,
    pub span: Span,
}

/// An object definition body: `{ member Type, other: default, Embedded }`.
#[derive(Debug, Clone)]
pub struct BracedExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

impl BracedExpr {
    /// The object type this definition denotes. Meaningful once elements
    /// have been checked.
    pub fn object_type(&self) -> types::Object {
        let mut object = types::Object::default();
        for element in &self.elements {
            match element {
                Expr::Identifier(identifier) if identifier.is_type() => {
                    let typing = match &identifier.ty {
                        ExpressionType::Type(inner) => inner.as_ref().clone(),
                        _ => ExpressionType::Unknown,
                    };
                    object.add_embedded(identifier.name(), typing);
                }
                Expr::Param(param) => {
                    let typing = match param.typing.ty() {
                        ExpressionType::Type(inner) => *inner,
                        _ => ExpressionType::Unknown,
                    };
                    object.add_member(param.name.name(), typing);
                }
                Expr::Entry(entry) => {
                    if let Some(Expr::Identifier(key)) = &entry.key {
                        object.add_default(key.name(), entry.value.ty());
                    }
                }
                _ => {}
            }
        }
        object
    }
}

/// A function expression: value form `(params) => [Type] { body }` or type
/// form `(params) -> Type`.
#[derive(Debug, Clone)]
pub struct FunctionExpr {
    pub type_params: Option<BracketedExpr>,
    pub params: Vec<Expr>,
    pub params_span: Span,
    pub arrow: Token,
    pub return_type: Option<Expr>,
    pub body: Option<Block>,
    pub ty: ExpressionType,
}

impl FunctionExpr {
    pub fn is_type_form(&self) -> bool {
        self.arrow.kind == TokenKind::SlimArrow
    }
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: TupleExpr,
    pub ty: ExpressionType,
}

/// `Type{...}` — struct, map, or list construction.
#[derive(Debug, Clone)]
pub struct InstanceExpr {
    pub typing: Expr,
    pub args: Vec<Expr>,
    pub args_span: Span,
    pub ty: ExpressionType,
}

/// `expr.property`
#[derive(Debug, Clone)]
pub struct PropertyExpr {
    pub object: Expr,
    pub property: Option<Expr>,
    pub ty: ExpressionType,
}

/// `expr[index]`
#[derive(Debug, Clone)]
pub struct ComputedExpr {
    pub object: Expr,
    pub index: BracketedExpr,
    pub ty: ExpressionType,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
    /// The scope this block was checked in, for consumers that need to
    /// inspect bindings after the run.
    pub scope: Option<ScopeId>,
}

impl Block {
    pub fn ty(&self) -> ExpressionType {
        match self.statements.last() {
            Some(Stmt::Expr(expr)) => expr.ty(),
            _ => ExpressionType::Nil,
        }
    }

    /// Where a diagnostic about this block's value should point.
    pub fn report_span(&self) -> Span {
        self.statements
            .last()
            .map(|s| s.span())
            .unwrap_or(self.span)
    }
}

#[derive(Debug, Clone)]
pub enum ElseBranch {
    Block(Block),
    If(Box<IfExpr>),
}

impl ElseBranch {
    pub fn ty(&self) -> ExpressionType {
        match self {
            ElseBranch::Block(block) => block.ty(),
            ElseBranch::If(inner) => inner.ty.clone(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ElseBranch::Block(block) => block.span,
            ElseBranch::If(inner) => inner.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IfExpr {
    pub condition: Expr,
    pub body: Block,
    pub alternate: Option<ElseBranch>,
    pub span: Span,
    pub ty: ExpressionType,
}

#[derive(Debug, Clone)]
pub enum ForHead {
    /// `for { ... }`
    Infinite,
    /// `for condition { ... }`
    Condition(Expr),
    /// `for pattern in iterable { ... }`
    In { pattern: Expr, iterable: Expr },
}

#[derive(Debug, Clone)]
pub struct ForExpr {
    pub head: ForHead,
    pub body: Block,
    pub span: Span,
    pub ty: ExpressionType,
}

#[derive(Debug, Clone)]
pub struct MatchCase {
    pub pattern: Option<Expr>,
    pub statements: Vec<Stmt>,
    pub span: Span,
    pub scope: Option<ScopeId>,
}

#[derive(Debug, Clone)]
pub struct MatchExpr {
    pub scrutinee: Expr,
    pub cases: Vec<MatchCase>,
    pub span: Span,
    pub ty: ExpressionType,
}

/// `expr catch err { ... }`
#[derive(Debug, Clone)]
pub struct CatchExpr {
    pub left: Expr,
    pub identifier: Option<Identifier>,
    pub body: Block,
    pub span: Span,
    pub ty: ExpressionType,
}

#[derive(Debug, Clone)]
pub struct SumConstructor {
    pub name: Option<Identifier>,
    pub params: Option<(Vec<Expr>, Span)>,
    pub span: Span,
}

/// `| A(number) | B` — a sum type definition.
#[derive(Debug, Clone)]
pub struct SumTypeExpr {
    pub constructors: Vec<SumConstructor>,
    pub span: Span,
    pub ty: ExpressionType,
}

/// `(Receiver).(member (Receiver) -> Type, ...)` — a trait definition.
#[derive(Debug, Clone)]
pub struct TraitExpr {
    pub receiver: Identifier,
    pub members: Vec<Expr>,
    pub span: Span,
}

impl TraitExpr {
    pub fn trait_type(&self) -> types::Trait {
        let mut members = Vec::new();
        for member in &self.members {
            if let Expr::Param(param) = member {
                let typing = match param.typing.ty() {
                    ExpressionType::Type(inner) => *inner,
                    _ => ExpressionType::Unknown,
                };
                members.push((param.name.name().to_string(), typing));
            }
        }
        types::Trait {
            self_name: self.receiver.name().to_string(),
            members,
        }
    }
}

/// The closed expression family.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Identifier(Identifier),
    /// Placeholder for a missing operand; carries `Unknown` type so
    /// checking can continue.
    Missing(Span),
    Binary(Box<BinaryExpr>),
    Unary(Box<UnaryExpr>),
    Range(Box<RangeExpr>),
    Tuple(Box<TupleExpr>),
    Paren(Box<ParenExpr>),
    Param(Box<ParamExpr>),
    Entry(Box<EntryExpr>),
    ListType(Box<ListTypeExpr>),
    List(Box<ListExpr>),
    Braced(Box<BracedExpr>),
    Function(Box<FunctionExpr>),
    Call(Box<CallExpr>),
    Instance(Box<InstanceExpr>),
    Property(Box<PropertyExpr>),
    Computed(Box<ComputedExpr>),
    Block(Box<Block>),
    If(Box<IfExpr>),
    For(Box<ForExpr>),
    Match(Box<MatchExpr>),
    Catch(Box<CatchExpr>),
    Sum(Box<SumTypeExpr>),
    Trait(Box<TraitExpr>),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(l) => l.token.span,
            Expr::Identifier(i) => i.token.span,
            Expr::Missing(span) => *span,
            Expr::Binary(b) => b.left.span().merge(&b.right.span()),
            Expr::Unary(u) => u.operator.span.merge(&u.operand.span()),
            Expr::Range(r) => r.left.span().merge(&r.right.span()),
            Expr::Tuple(t) => t.span,
            Expr::Paren(p) => p.span,
            Expr::Param(p) => p.name.token.span.merge(&p.typing.span()),
            Expr::Entry(e) => e.span,
            Expr::ListType(l) => l.span,
            Expr::List(l) => l.span,
            Expr::Braced(b) => b.span,
            Expr::Function(f) => {
                let start = match &f.type_params {
                    Some(brackets) => brackets.span,
                    None => f.params_span,
                };
                match &f.body {
                    Some(body) => start.merge(&body.span),
                    None => match &f.return_type {
                        Some(expr) => start.merge(&expr.span()),
                        None => start.merge(&f.arrow.span),
                    },
                }
            }
            Expr::Call(c) => c.callee.span().merge(&c.args.span),
            Expr::Instance(i) => i.typing.span().merge(&i.args_span),
            Expr::Property(p) => match &p.property {
                Some(property) => p.object.span().merge(&property.span()),
                None => p.object.span(),
            },
            Expr::Computed(c) => c.object.span().merge(&c.index.span),
            Expr::Block(b) => b.span,
            Expr::If(i) => i.span,
            Expr::For(f) => f.span,
            Expr::Match(m) => m.span,
            Expr::Catch(c) => c.span,
            Expr::Sum(s) => s.span,
            Expr::Trait(t) => t.span,
        }
    }

    /// The computed type of this expression. Valid once the node has been
    /// checked; unchecked nodes read as `Unknown`.
    pub fn ty(&self) -> ExpressionType {
        match self {
            Expr::Literal(l) => l.ty(),
            Expr::Identifier(i) => i.ty.clone(),
            Expr::Missing(_) => ExpressionType::Unknown,
            Expr::Binary(b) => binary_type(b),
            Expr::Unary(u) => unary_type(u),
            Expr::Range(r) => {
                let operand = match r.left.ty() {
                    ExpressionType::Unknown => r.right.ty(),
                    other => other,
                };
                ExpressionType::Range(Box::new(operand))
            }
            Expr::Tuple(t) => t.ty.clone(),
            Expr::Paren(p) => paren_type(p),
            Expr::Param(p) => match p.typing.ty() {
                ExpressionType::Type(inner) => *inner,
                _ => ExpressionType::Unknown,
            },
            Expr::Entry(e) => e.value.ty(),
            Expr::ListType(l) => {
                let element = match l.element.ty() {
                    ExpressionType::Type(inner) => *inner,
                    _ => ExpressionType::Unknown,
                };
                ExpressionType::Type(Box::new(ExpressionType::List(Box::new(element))))
            }
            Expr::List(l) => l.ty.clone(),
            Expr::Braced(b) => ExpressionType::Type(Box::new(ExpressionType::Object(
                b.object_type(),
            ))),
            Expr::Function(f) => f.ty.clone(),
            Expr::Call(c) => c.ty.clone(),
            Expr::Instance(i) => i.ty.clone(),
            Expr::Property(p) => p.ty.clone(),
            Expr::Computed(c) => c.ty.clone(),
            Expr::Block(b) => b.ty(),
            Expr::If(i) => i.ty.clone(),
            Expr::For(f) => f.ty.clone(),
            Expr::Match(m) => m.ty.clone(),
            Expr::Catch(c) => c.ty.clone(),
            Expr::Sum(s) => s.ty.clone(),
            Expr::Trait(t) => {
                ExpressionType::Type(Box::new(ExpressionType::Trait(t.trait_type())))
            }
        }
    }
}

fn binary_type(b: &BinaryExpr) -> ExpressionType {
    use TokenKind::*;
    match b.operator.kind {
        Add | Sub | Mul | Pow | Div | Mod => ExpressionType::Number,
        Concat => b.left.ty(),
        LogicalAnd | LogicalOr | Less | Greater | LessEqual | GreaterEqual | Equal | NotEqual => {
            ExpressionType::Boolean
        }
        // `Ok ! Err` denotes a result type
        Bang => {
            let unwrap = |e: &Expr| match e.ty() {
                ExpressionType::Type(inner) => Some(*inner),
                _ => None,
            };
            ExpressionType::Type(Box::new(ExpressionType::Alias(
                crate::types::builtins::make_result(unwrap(&b.left), unwrap(&b.right)),
            )))
        }
        _ => ExpressionType::Unknown,
    }
}

fn unary_type(u: &UnaryExpr) -> ExpressionType {
    use TokenKind::*;
    let operand = u.operand.ty();
    match u.operator.kind {
        QuestionMark => {
            let inner = match operand {
                ExpressionType::Type(inner) => Some(*inner),
                _ => None,
            };
            ExpressionType::Type(Box::new(ExpressionType::Alias(
                crate::types::builtins::make_option(inner),
            )))
        }
        Bang => match operand {
            ExpressionType::Type(inner) => ExpressionType::Type(Box::new(ExpressionType::Alias(
                crate::types::builtins::make_result(Some(*inner), None),
            ))),
            ExpressionType::Boolean => ExpressionType::Boolean,
            _ => ExpressionType::Unknown,
        },
        BinaryAnd => match operand {
            ExpressionType::Type(inner) => {
                ExpressionType::Type(Box::new(ExpressionType::Ref(inner)))
            }
            other => ExpressionType::Ref(Box::new(other)),
        },
        Mul => match operand {
            ExpressionType::Ref(to) => *to,
            _ => ExpressionType::Unknown,
        },
        AsyncKeyword => ExpressionType::Alias(crate::types::builtins::make_promise(Some(operand))),
        AwaitKeyword => match &operand {
            ExpressionType::Alias(alias) if alias.name == "Promise" => alias
                .params
                .first()
                .and_then(|p| p.value.as_deref().cloned())
                .unwrap_or(ExpressionType::Unknown),
            _ => operand,
        },
        TryKeyword => match &operand {
            ExpressionType::Alias(alias) if alias.name == "Result" => {
                match alias.reference.as_ref() {
                    ExpressionType::Sum(sum) => {
                        sum.payload("Ok").unwrap_or(ExpressionType::Unknown)
                    }
                    _ => ExpressionType::Unknown,
                }
            }
            _ => ExpressionType::Unknown,
        },
        _ => ExpressionType::Unknown,
    }
}

fn paren_type(p: &ParenExpr) -> ExpressionType {
    match &p.expr {
        None => ExpressionType::Nil,
        // `(name Type)` denotes a single-member object type
        Some(Expr::Param(param)) => {
            let typing = match param.typing.ty() {
                ExpressionType::Type(inner) => *inner,
                _ => ExpressionType::Nil,
            };
            let mut object = types::Object::default();
            object.add_member(param.name.name(), typing);
            ExpressionType::Type(Box::new(ExpressionType::Object(object)))
        }
        Some(inner) => inner.ty(),
    }
}

/// An assignment, declaration, or definition statement, distinguished by
/// its operator (`=`, `:=`, `::`, or a compound form).
#[derive(Debug, Clone)]
pub struct Assignment {
    pub pattern: Expr,
    pub value: Expr,
    pub operator: Token,
}

/// `return`/`break`/`continue`/`throw`, with an optional value.
#[derive(Debug, Clone)]
pub struct ExitStmt {
    pub keyword: Token,
    pub value: Option<Expr>,
}

impl ExitStmt {
    pub fn span(&self) -> Span {
        match &self.value {
            Some(value) => self.keyword.span.merge(&value.span()),
            None => self.keyword.span,
        }
    }
}

/// `use a from "io"` / `use (a, b) from "io"` / `use * as ns from "io"`
#[derive(Debug, Clone)]
pub struct UseDirective {
    pub names: Option<Expr>,
    pub star: bool,
    pub source: Option<Literal>,
    pub span: Span,
}

/// The closed statement family.
#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Assignment(Box<Assignment>),
    Exit(Box<ExitStmt>),
    Use(Box<UseDirective>),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(expr) => expr.span(),
            Stmt::Assignment(a) => a.pattern.span().merge(&a.value.span()),
            Stmt::Exit(e) => e.span(),
            Stmt::Use(u) => u.span,
        }
    }

    /// Does this statement unconditionally leave the enclosing block?
    pub fn is_exit(&self) -> bool {
        matches!(self, Stmt::Exit(_))
    }
}

/// Signal returned by a walk callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    SkipChildren,
    Stop,
}

/// A node handed to a walk callback.
#[derive(Debug, Clone, Copy)]
pub enum WalkNode<'a> {
    Expr(&'a Expr),
    Stmt(&'a Stmt),
}

/// Walk a block's statements depth-first. The callback can prune subtrees
/// with [`Flow::SkipChildren`] or abort with [`Flow::Stop`].
pub fn walk_block(block: &Block, f: &mut dyn FnMut(WalkNode) -> Flow) -> Flow {
    for statement in &block.statements {
        if walk_stmt(statement, f) == Flow::Stop {
            return Flow::Stop;
        }
    }
    Flow::Continue
}

pub fn walk_stmt(stmt: &Stmt, f: &mut dyn FnMut(WalkNode) -> Flow) -> Flow {
    match f(WalkNode::Stmt(stmt)) {
        Flow::Stop => return Flow::Stop,
        Flow::SkipChildren => return Flow::Continue,
        Flow::Continue => {}
    }
    let children: Vec<&Expr> = match stmt {
        Stmt::Expr(expr) => vec![expr],
        Stmt::Assignment(a) => vec![&a.pattern, &a.value],
        Stmt::Exit(e) => e.value.iter().collect(),
        Stmt::Use(u) => u.names.iter().collect(),
    };
    for child in children {
        if walk_expr(child, f) == Flow::Stop {
            return Flow::Stop;
        }
    }
    Flow::Continue
}

pub fn walk_expr(expr: &Expr, f: &mut dyn FnMut(WalkNode) -> Flow) -> Flow {
    match f(WalkNode::Expr(expr)) {
        Flow::Stop => return Flow::Stop,
        Flow::SkipChildren => return Flow::Continue,
        Flow::Continue => {}
    }

    match expr {
        Expr::Literal(_) | Expr::Identifier(_) | Expr::Missing(_) => Flow::Continue,
        Expr::Binary(b) => walk_all(&[&b.left, &b.right], f),
        Expr::Unary(u) => walk_expr(&u.operand, f),
        Expr::Range(r) => walk_all(&[&r.left, &r.right], f),
        Expr::Tuple(t) => walk_each(&t.elements, f),
        Expr::Paren(p) => match &p.expr {
            Some(inner) => walk_expr(inner, f),
            None => Flow::Continue,
        },
        Expr::Param(p) => walk_expr(&p.typing, f),
        Expr::Entry(e) => match &e.key {
            Some(key) => walk_all(&[key, &e.value], f),
            None => walk_expr(&e.value, f),
        },
        Expr::ListType(l) => walk_expr(&l.element, f),
        Expr::List(l) => walk_each(&l.elements, f),
        Expr::Braced(b) => walk_each(&b.elements, f),
        Expr::Function(func) => {
            if let Some(return_type) = &func.return_type {
                if walk_expr(return_type, f) == Flow::Stop {
                    return Flow::Stop;
                }
            }
            match &func.body {
                Some(body) => walk_block(body, f),
                None => Flow::Continue,
            }
        }
        Expr::Call(c) => {
            if walk_expr(&c.callee, f) == Flow::Stop {
                return Flow::Stop;
            }
            walk_each(&c.args.elements, f)
        }
        Expr::Instance(i) => {
            if walk_expr(&i.typing, f) == Flow::Stop {
                return Flow::Stop;
            }
            walk_each(&i.args, f)
        }
        Expr::Property(p) => walk_expr(&p.object, f),
        Expr::Computed(c) => {
            if walk_expr(&c.object, f) == Flow::Stop {
                return Flow::Stop;
            }
            match &c.index.expr {
                Some(index) => walk_expr(index, f),
                None => Flow::Continue,
            }
        }
        Expr::Block(b) => walk_block(b, f),
        Expr::If(i) => walk_if(i, f),
        Expr::For(l) => {
            let head = match &l.head {
                ForHead::Infinite => Flow::Continue,
                ForHead::Condition(cond) => walk_expr(cond, f),
                ForHead::In { pattern, iterable } => walk_all(&[pattern, iterable], f),
            };
            if head == Flow::Stop {
                return Flow::Stop;
            }
            walk_block(&l.body, f)
        }
        Expr::Match(m) => {
            if walk_expr(&m.scrutinee, f) == Flow::Stop {
                return Flow::Stop;
            }
            for case in &m.cases {
                for statement in &case.statements {
                    if walk_stmt(statement, f) == Flow::Stop {
                        return Flow::Stop;
                    }
                }
            }
            Flow::Continue
        }
        Expr::Catch(c) => {
            if walk_expr(&c.left, f) == Flow::Stop {
                return Flow::Stop;
            }
            walk_block(&c.body, f)
        }
        Expr::Sum(s) => {
            for constructor in &s.constructors {
                if let Some((params, _)) = &constructor.params {
                    if walk_each(params, f) == Flow::Stop {
                        return Flow::Stop;
                    }
                }
            }
            Flow::Continue
        }
        Expr::Trait(t) => walk_each(&t.members, f),
    }
}

fn walk_if(i: &IfExpr, f: &mut dyn FnMut(WalkNode) -> Flow) -> Flow {
    if walk_expr(&i.condition, f) == Flow::Stop {
        return Flow::Stop;
    }
    if walk_block(&i.body, f) == Flow::Stop {
        return Flow::Stop;
    }
    match &i.alternate {
        Some(ElseBranch::Block(block)) => walk_block(block, f),
        Some(ElseBranch::If(inner)) => walk_if(inner, f),
        None => Flow::Continue,
    }
}

fn walk_all(exprs: &[&Expr], f: &mut dyn FnMut(WalkNode) -> Flow) -> Flow {
    for expr in exprs {
        if walk_expr(expr, f) == Flow::Stop {
            return Flow::Stop;
        }
    }
    Flow::Continue
}

fn walk_each(exprs: &[Expr], f: &mut dyn FnMut(WalkNode) -> Flow) -> Flow {
    for expr in exprs {
        if walk_expr(expr, f) == Flow::Stop {
            return Flow::Stop;
        }
    }
    Flow::Continue
}
