//! Definitions
//!
//! Function expressions (`=>` value form and `->` type form), sum-type,
//! object and trait definitions, and the `::` definition statement with its
//! method form `(receiver Type).name :: ...`. Type parameters are bound as
//! fresh generics before parameter types are resolved, so signatures may
//! reference them.

use crate::diagnostics::ErrorKind;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parser::Parser;
use crate::parser::span::Span;
use crate::scope::ScopeKind;
use crate::types::{self, ExpressionType, Generic, Sum, SumMember};

impl Parser {
    /*  Function expressions  */

    /// Parse a function expression after optional bracketed type params.
    /// The cursor sits on `(`.
    pub(crate) fn parse_function(&mut self, type_params: Option<BracketedExpr>) -> Expr {
        let paren = self.parse_parenthesized();
        if self.at(TokenKind::SlimArrow) || self.at(TokenKind::FatArrow) {
            return self.parse_function_with(type_params, paren);
        }
        // not a function after all; keep the grouping
        if let Some(brackets) = type_params {
            self.report(ErrorKind::UnexpectedExpression, brackets.span);
        }
        Expr::Paren(Box::new(paren))
    }

    /// The cursor sits on `->` or `=>`.
    pub(crate) fn parse_function_with(
        &mut self,
        type_params: Option<BracketedExpr>,
        paren: ParenExpr,
    ) -> Expr {
        let arrow = self.consume();
        let params_span = paren.span;
        let params = match paren.expr {
            None => Vec::new(),
            Some(Expr::Tuple(tuple)) => tuple.elements,
            Some(other) => vec![other],
        };

        let (return_type, body) = if arrow.kind == TokenKind::SlimArrow {
            let outer = self.allow_brace;
            self.allow_brace = false;
            let return_type = self.parse_range();
            self.allow_brace = outer;
            if return_type.is_none() {
                self.report(ErrorKind::TypeExpected, arrow.span.after());
            }
            (return_type, None)
        } else if self.at(TokenKind::LeftBrace) {
            (None, Some(self.parse_block()))
        } else {
            let outer = self.allow_brace;
            self.allow_brace = false;
            let return_type = self.parse_range();
            self.allow_brace = outer;
            (return_type, Some(self.parse_block()))
        };

        Expr::Function(Box::new(FunctionExpr {
            type_params,
            params,
            params_span,
            arrow,
            return_type,
            body,
            ty: ExpressionType::Unknown,
        }))
    }

    pub(crate) fn check_function(&mut self, function: &mut FunctionExpr) {
        self.push_scope(ScopeKind::Function);

        let type_params = self.bind_type_params(function.type_params.as_ref().cloned());
        let param_types = self.check_function_params(function);

        let mut annotation = None;
        if let Some(return_type) = &mut function.return_type {
            self.check_expr(return_type);
            match return_type.ty() {
                ExpressionType::Type(inner) => annotation = Some(*inner),
                _ => {
                    let span = return_type.span();
                    self.report(ErrorKind::TypeExpected, span);
                }
            }
        }

        if function.is_type_form() {
            let returned = annotation.unwrap_or(ExpressionType::Unknown);
            function.ty = ExpressionType::Type(Box::new(ExpressionType::Function(
                types::Function {
                    type_params,
                    params: param_types,
                    returned: Box::new(returned),
                    is_async: false,
                },
            )));
            self.drop_scope();
            return;
        }

        let Some(body) = &mut function.body else {
            self.drop_scope();
            return;
        };
        self.check_block_statements(body);

        let exits = collect_exits(body);
        let returned = match annotation {
            None => {
                for (_, span) in &exits.returns {
                    self.report(ErrorKind::IllegalReturn, *span);
                }
                for (_, span) in &exits.throws {
                    self.report(ErrorKind::IllegalThrow, *span);
                }
                for (_, span) in &exits.tries {
                    self.report(ErrorKind::IllegalResult, *span);
                }
                body.ty()
            }
            Some(declared) => {
                self.check_function_exits(&declared, &exits, body);
                declared
            }
        };

        let is_async = contains_await(body);
        function.ty = ExpressionType::Function(types::Function {
            type_params,
            params: param_types,
            returned: Box::new(returned),
            is_async,
        });
        self.drop_scope();
    }

    /// Bind bracketed type parameters as fresh generics in the current
    /// scope, reporting duplicates at every occurrence.
    fn bind_type_params(&mut self, brackets: Option<BracketedExpr>) -> Vec<Generic> {
        let Some(brackets) = brackets else {
            return Vec::new();
        };
        let names: Vec<Identifier> = match brackets.expr {
            None => Vec::new(),
            Some(Expr::Tuple(tuple)) => tuple
                .elements
                .into_iter()
                .filter_map(|e| match e {
                    Expr::Identifier(identifier) => Some(identifier),
                    other => {
                        self.report(ErrorKind::TypeIdentifierExpected, other.span());
                        None
                    }
                })
                .collect(),
            Some(Expr::Identifier(identifier)) => vec![identifier],
            Some(other) => {
                self.report(ErrorKind::TypeIdentifierExpected, other.span());
                Vec::new()
            }
        };

        report_duplicates(self, names.iter().map(|n| (n.name(), n.token.span)));
        let mut params = Vec::new();
        for identifier in &names {
            if !identifier.is_type() {
                self.report(ErrorKind::TypeIdentifierExpected, identifier.token.span);
            }
            let generic = Generic::named(identifier.name());
            self.scopes.add(
                self.scope,
                identifier.name(),
                identifier.token.span,
                ExpressionType::Type(Box::new(ExpressionType::Generic(generic.clone()))),
            );
            params.push(generic);
        }
        params
    }

    /// Resolve parameter types and, for the value form, bind the parameter
    /// names in the function scope.
    fn check_function_params(&mut self, function: &mut FunctionExpr) -> Vec<ExpressionType> {
        let value_form = !function.is_type_form();
        let mut names: Vec<(String, Span)> = Vec::new();
        let mut param_types = Vec::new();

        for param in &mut function.params {
            match param {
                Expr::Param(p) => {
                    self.check_expr(&mut p.typing);
                    let typing = match p.typing.ty() {
                        ExpressionType::Type(inner) => *inner,
                        _ => {
                            let span = p.typing.span();
                            self.report(ErrorKind::TypeExpected, span);
                            ExpressionType::Unknown
                        }
                    };
                    names.push((p.name.name().to_string(), p.name.token.span));
                    if value_form {
                        self.scopes.add(
                            self.scope,
                            p.name.name(),
                            p.name.token.span,
                            typing.clone(),
                        );
                    }
                    param_types.push(typing);
                }
                other if value_form => {
                    self.report(ErrorKind::ParameterExpected, other.span());
                    param_types.push(ExpressionType::Unknown);
                }
                other => {
                    self.check_expr(other);
                    let typing = match other.ty() {
                        ExpressionType::Type(inner) => *inner,
                        _ => {
                            self.report(ErrorKind::TypeExpected, other.span());
                            ExpressionType::Unknown
                        }
                    };
                    param_types.push(typing);
                }
            }
        }

        report_duplicates(self, names.iter().map(|(n, s)| (n.as_str(), *s)));
        param_types
    }

    /// With an explicit return annotation, every `return`, `throw` and
    /// `try` reachable in the body must agree with it.
    fn check_function_exits(&mut self, declared: &ExpressionType, exits: &Exits, body: &Block) {
        let (ok_type, err_type) = split_result(declared);

        for (value, span) in &exits.returns {
            let received = value.clone().unwrap_or(ExpressionType::Nil);
            if !ok_type.extends(&received) {
                self.report(
                    ErrorKind::CannotAssignType {
                        expected: ok_type.to_string(),
                        received: received.to_string(),
                    },
                    *span,
                );
            }
        }
        for (value, span) in &exits.throws {
            match &err_type {
                Some(err_type) => {
                    let received = value.clone().unwrap_or(ExpressionType::Nil);
                    if !err_type.extends(&received) {
                        self.report(
                            ErrorKind::CannotAssignType {
                                expected: err_type.to_string(),
                                received: received.to_string(),
                            },
                            *span,
                        );
                    }
                }
                None => self.report(ErrorKind::IllegalThrow, *span),
            }
        }
        for (error, span) in &exits.tries {
            match &err_type {
                Some(err_type) => {
                    if !err_type.extends(error) {
                        self.report(
                            ErrorKind::CannotAssignType {
                                expected: err_type.to_string(),
                                received: error.to_string(),
                            },
                            *span,
                        );
                    }
                }
                None => self.report(ErrorKind::IllegalResult, *span),
            }
        }

        // the trailing expression is the implicit return value
        if !matches!(body.statements.last(), Some(stmt) if stmt.is_exit()) {
            let trailing = body.ty();
            if !ok_type.extends(&trailing) {
                self.report(
                    ErrorKind::CannotAssignType {
                        expected: ok_type.to_string(),
                        received: trailing.to_string(),
                    },
                    body.report_span(),
                );
            }
        }
    }

    /*  Sum types  */

    pub(crate) fn parse_sum_type(&mut self) -> Option<Expr> {
        if !self.at(TokenKind::BinaryOr) {
            return self.parse_tagged();
        }
        let start = self.peek().span;
        let mut end = start;
        let mut constructors = Vec::new();
        while self.at(TokenKind::BinaryOr) {
            self.consume();
            let constructor = self.parse_sum_constructor();
            end = constructor.span;
            constructors.push(constructor);
            if !self.at(TokenKind::BinaryOr)
                && !self.at(TokenKind::Eol)
                && !self.at(TokenKind::Eof)
            {
                self.recover_to(TokenKind::BinaryOr);
            }
            // constructors may continue on the next lines
            if self.at(TokenKind::Eol)
                && self.peek_past_line_breaks().kind == TokenKind::BinaryOr
            {
                self.discard_line_breaks();
            }
        }
        Some(Expr::Sum(Box::new(SumTypeExpr {
            constructors,
            span: start.merge(&end),
            ty: ExpressionType::Unknown,
        })))
    }

    fn parse_sum_constructor(&mut self) -> SumConstructor {
        let mut span = self.peek().span;
        let outer = self.allow_empty;
        self.allow_empty = true;
        let token = self.parse_token();
        self.allow_empty = outer;
        let name = match token {
            Some(Expr::Identifier(identifier)) => {
                span = identifier.token.span;
                Some(identifier)
            }
            Some(other) => {
                self.report(ErrorKind::TypeIdentifierExpected, other.span());
                None
            }
            None => {
                self.report(ErrorKind::TypeIdentifierExpected, span);
                None
            }
        };
        let params = if self.at(TokenKind::LeftParenthesis) {
            let paren = self.parse_parenthesized();
            span = span.merge(&paren.span);
            let elements = match paren.expr {
                None => Vec::new(),
                Some(Expr::Tuple(tuple)) => tuple.elements,
                Some(other) => vec![other],
            };
            Some((elements, paren.span))
        } else {
            None
        };
        SumConstructor { name, params, span }
    }

    pub(crate) fn check_sum_type(&mut self, sum: &mut SumTypeExpr) {
        if sum.constructors.len() < 2 {
            self.report(
                ErrorKind::MissingElements {
                    expected: 2,
                    received: sum.constructors.len(),
                },
                sum.span,
            );
        }

        let names = sum.constructors.iter().filter_map(|c| {
            c.name.as_ref().map(|n| (n.name(), n.token.span))
        });
        let names: Vec<(String, Span)> = names.map(|(n, s)| (n.to_string(), s)).collect();
        report_duplicates(self, names.iter().map(|(n, s)| (n.as_str(), *s)));

        let mut members = Vec::new();
        for constructor in &mut sum.constructors {
            let Some(name) = &constructor.name else {
                continue;
            };
            if !name.is_type() {
                self.report(ErrorKind::TypeIdentifierExpected, name.token.span);
            }
            let mut params = Vec::new();
            if let Some((exprs, _)) = &mut constructor.params {
                for expr in exprs.iter_mut() {
                    self.check_expr(expr);
                    match expr.ty() {
                        ExpressionType::Type(inner) => params.push(*inner),
                        _ => {
                            self.report(ErrorKind::TypeExpected, expr.span());
                            params.push(ExpressionType::Unknown);
                        }
                    }
                }
            }
            members.push(SumMember {
                name: name.name().to_string(),
                params,
            });
        }
        sum.ty = ExpressionType::Type(Box::new(ExpressionType::Sum(Sum { members })));
    }

    /*  Object definitions  */

    /// `{ member Type, other: default, Embedded }`
    pub(crate) fn check_object_definition(&mut self, braced: &mut BracedExpr) {
        let mut names: Vec<(String, Span)> = Vec::new();
        for element in &mut braced.elements {
            match element {
                Expr::Identifier(identifier) => {
                    let span = identifier.token.span;
                    if identifier.is_type() {
                        self.check_identifier(identifier);
                        names.push((identifier.name().to_string(), span));
                    } else {
                        self.report(ErrorKind::TypeExpected, span);
                    }
                }
                Expr::Param(param) => {
                    self.check_expr(&mut param.typing);
                    if !param.typing.ty().is_type() {
                        let span = param.typing.span();
                        self.report(ErrorKind::TypeExpected, span);
                    }
                    names.push((param.name.name().to_string(), param.name.token.span));
                }
                Expr::Entry(entry) => {
                    self.check_expr(&mut entry.value);
                    if entry.value.ty().is_type() {
                        let span = entry.value.span();
                        self.report(ErrorKind::ValueExpected, span);
                    }
                    match &entry.key {
                        Some(Expr::Identifier(key)) => {
                            names.push((key.name().to_string(), key.token.span));
                        }
                        Some(other) => {
                            let span = other.span();
                            self.report(ErrorKind::IdentifierExpected, span);
                        }
                        None => {}
                    }
                }
                other => {
                    let span = other.span();
                    self.report(ErrorKind::InvalidPattern, span);
                }
            }
        }
        report_duplicates(self, names.iter().map(|(n, s)| (n.as_str(), *s)));
    }

    /*  Traits  */

    /// The cursor sits on `(` after `(Receiver).`.
    pub(crate) fn parse_trait_expression(&mut self, left: Expr) -> Expr {
        let receiver = match &left {
            Expr::Paren(paren) => match &paren.expr {
                Some(Expr::Identifier(identifier)) => Some(identifier.clone()),
                _ => None,
            },
            _ => None,
        };
        let receiver = match receiver {
            Some(receiver) => receiver,
            None => {
                self.report(ErrorKind::ReceiverExpected, left.span());
                Identifier::new(crate::parser::lexer::Token {
                    kind: TokenKind::Name,
                    text: "Self".to_string(),
                    span: left.span(),
                })
            }
        };
        let paren = self.parse_parenthesized();
        let members = match paren.expr {
            None => Vec::new(),
            Some(Expr::Tuple(tuple)) => tuple.elements,
            Some(other) => vec![other],
        };
        let span = left.span().merge(&paren.span);
        Expr::Trait(Box::new(TraitExpr {
            receiver,
            members,
            span,
        }))
    }

    pub(crate) fn check_trait_expression(&mut self, trait_expr: &mut TraitExpr) {
        self.push_scope(ScopeKind::Program);
        let receiver = Generic::named(trait_expr.receiver.name());
        self.scopes.add(
            self.scope,
            trait_expr.receiver.name(),
            trait_expr.receiver.token.span,
            ExpressionType::Type(Box::new(ExpressionType::Generic(receiver))),
        );
        // member signatures need not mention the receiver
        if let Some(variable) = self
            .scopes
            .find_mut(self.scope, trait_expr.receiver.name())
        {
            variable.read_at(trait_expr.receiver.token.span);
        }

        let mut names: Vec<(String, Span)> = Vec::new();
        for member in &mut trait_expr.members {
            let Expr::Param(param) = member else {
                continue;
            };
            self.check_expr(&mut param.typing);
            let typing = param.typing.ty();
            let is_function_type = matches!(
                &typing,
                ExpressionType::Type(inner) if matches!(inner.as_ref(), ExpressionType::Function(_))
            );
            if !is_function_type {
                self.report(
                    ErrorKind::FunctionTypeExpected {
                        found: typing.to_string(),
                    },
                    param.typing.span(),
                );
            }
            names.push((param.name.name().to_string(), param.name.token.span));
        }
        report_duplicates(self, names.iter().map(|(n, s)| (n.as_str(), *s)));
        self.drop_scope();
    }

    /*  `::` definitions  */

    pub(crate) fn check_definition(&mut self, assignment: &mut Assignment) {
        match &assignment.pattern {
            Expr::Identifier(identifier) => {
                let identifier = identifier.clone();
                self.check_expr(&mut assignment.value);
                self.define_identifier(&identifier, &assignment.value);
            }
            Expr::Computed(_) => self.check_generic_type_definition(assignment),
            Expr::Property(_) => self.check_method_definition(assignment),
            other => {
                let span = other.span();
                self.report(ErrorKind::InvalidPattern, span);
                self.check_expr(&mut assignment.value);
            }
        }
    }

    fn define_identifier(&mut self, identifier: &Identifier, value: &Expr) {
        let name = identifier.name();
        if self.scopes.is_reserved(name) {
            self.report(
                ErrorKind::ReservedName {
                    name: name.to_string(),
                },
                identifier.token.span,
            );
            return;
        }
        if identifier.is_type() {
            // a type alias definition
            let typing = match value.ty() {
                ExpressionType::Type(inner) => {
                    ExpressionType::Type(Box::new(ExpressionType::Alias(types::Alias::new(
                        name, *inner,
                    ))))
                }
                _ => {
                    self.report(ErrorKind::TypeExpected, value.span());
                    ExpressionType::Unknown
                }
            };
            self.scopes
                .add(self.scope, name, identifier.token.span, typing);
        } else {
            // a function (or constant) definition
            let typing = value.ty();
            if !matches!(typing, ExpressionType::Function(_)) {
                self.report(
                    ErrorKind::FunctionTypeExpected {
                        found: typing.to_string(),
                    },
                    value.span(),
                );
            }
            self.scopes
                .add(self.scope, name, identifier.token.span, typing);
        }
    }

    /// `Name[T] :: { value T }` — a generic type definition.
    fn check_generic_type_definition(&mut self, assignment: &mut Assignment) {
        let Expr::Computed(computed) = &assignment.pattern else {
            return;
        };
        let name = match computed.object.clone() {
            Expr::Identifier(identifier) if identifier.is_type() => Some(identifier),
            other => {
                self.report(ErrorKind::TypeIdentifierExpected, other.span());
                None
            }
        };
        let index = computed.index.clone();

        self.push_scope(ScopeKind::Program);
        let params = self.bind_type_params(Some(index));
        self.check_expr(&mut assignment.value);
        self.drop_scope();

        let Some(name) = name else {
            return;
        };
        if self.scopes.is_reserved(name.name()) {
            self.report(
                ErrorKind::ReservedName {
                    name: name.name().to_string(),
                },
                name.token.span,
            );
            return;
        }
        let typing = match assignment.value.ty() {
            ExpressionType::Type(inner) => {
                let alias = types::Alias {
                    name: name.name().to_string(),
                    params,
                    reference: Box::new(*inner),
                    methods: Vec::new(),
                };
                ExpressionType::Type(Box::new(ExpressionType::Alias(alias)))
            }
            _ => {
                self.report(ErrorKind::TypeExpected, assignment.value.span());
                ExpressionType::Unknown
            }
        };
        self.scopes
            .add(self.scope, name.name(), name.token.span, typing);
    }

    /// `(receiver Type).name :: function` — a method definition. The
    /// signature is registered on the type alias itself.
    fn check_method_definition(&mut self, assignment: &mut Assignment) {
        let Expr::Property(property) = &assignment.pattern else {
            return;
        };

        // the receiver is `(name Type)` with Type naming an alias
        let receiver = match &property.object {
            Expr::Paren(paren) => match &paren.expr {
                Some(Expr::Param(param)) => match &param.typing {
                    Expr::Identifier(typing) => {
                        Some((param.name.clone(), typing.clone()))
                    }
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        };
        let Some((receiver_name, receiver_typing)) = receiver else {
            self.report(ErrorKind::ReceiverExpected, property.object.span());
            self.check_expr(&mut assignment.value);
            return;
        };

        let method_name = match &property.property {
            Some(Expr::Identifier(identifier)) => Some(identifier.clone()),
            Some(other) => {
                self.report(ErrorKind::IdentifierExpected, other.span());
                None
            }
            None => None,
        };

        let alias = match self.scopes.find(self.scope, receiver_typing.name()) {
            Some(variable) => match &variable.typing {
                ExpressionType::Type(inner) => match inner.as_ref() {
                    ExpressionType::Alias(alias) => Some(alias.clone()),
                    _ => None,
                },
                _ => None,
            },
            None => None,
        };
        if alias.is_none() {
            self.report(
                ErrorKind::CannotFind {
                    name: receiver_typing.name().to_string(),
                },
                receiver_typing.token.span,
            );
        }

        // the receiver is bound as a value of its type while checking the
        // method body
        self.push_scope(ScopeKind::Program);
        if let Some(alias) = &alias {
            self.scopes.add(
                self.scope,
                receiver_name.name(),
                receiver_name.token.span,
                ExpressionType::Alias(alias.clone()),
            );
            // the receiver itself may legitimately go unused
            if let Some(variable) = self.scopes.find_mut(self.scope, receiver_name.name()) {
                variable.read_at(receiver_name.token.span);
            }
        }
        self.check_expr(&mut assignment.value);
        self.drop_scope();

        let signature = assignment.value.ty();
        if !matches!(signature, ExpressionType::Function(_)) {
            self.report(
                ErrorKind::FunctionTypeExpected {
                    found: signature.to_string(),
                },
                assignment.value.span(),
            );
            return;
        }
        if let (Some(alias), Some(method_name)) = (alias, method_name) {
            self.scopes.register_method(
                self.scope,
                &alias.name,
                method_name.name(),
                signature,
            );
        }
    }
}

struct Exits {
    returns: Vec<(Option<ExpressionType>, Span)>,
    throws: Vec<(Option<ExpressionType>, Span)>,
    tries: Vec<(ExpressionType, Span)>,
}

/// Returns, throws and tries reachable in a function body, not crossing
/// into nested function expressions.
fn collect_exits(body: &Block) -> Exits {
    let mut exits = Exits {
        returns: Vec::new(),
        throws: Vec::new(),
        tries: Vec::new(),
    };
    walk_block(body, &mut |node| match node {
        WalkNode::Stmt(Stmt::Exit(exit)) => {
            let value = exit.value.as_ref().map(|v| v.ty());
            match exit.keyword.kind {
                TokenKind::ReturnKeyword => exits.returns.push((value, exit.span())),
                TokenKind::ThrowKeyword => exits.throws.push((value, exit.span())),
                _ => {}
            }
            Flow::Continue
        }
        WalkNode::Expr(Expr::Unary(unary)) if unary.operator.kind == TokenKind::TryKeyword => {
            let error = match unary.operand.ty() {
                ExpressionType::Alias(alias) if alias.name == "Result" => {
                    match alias.reference.as_ref() {
                        ExpressionType::Sum(sum) => {
                            sum.payload("Err").unwrap_or(ExpressionType::Unknown)
                        }
                        _ => ExpressionType::Unknown,
                    }
                }
                _ => ExpressionType::Unknown,
            };
            exits.tries.push((error, unary.operator.span));
            Flow::Continue
        }
        WalkNode::Expr(Expr::Function(_)) => Flow::SkipChildren,
        _ => Flow::Continue,
    });
    exits
}

/// Does the body await anything? Such a function may be called with
/// `async`.
fn contains_await(body: &Block) -> bool {
    let mut found = false;
    walk_block(body, &mut |node| match node {
        WalkNode::Expr(Expr::Unary(unary)) if unary.operator.kind == TokenKind::AwaitKeyword => {
            found = true;
            Flow::Stop
        }
        WalkNode::Expr(Expr::Function(_)) => Flow::SkipChildren,
        _ => Flow::Continue,
    });
    found
}

/// Split a declared return type into its success type and, for results,
/// its error type.
fn split_result(declared: &ExpressionType) -> (ExpressionType, Option<ExpressionType>) {
    if let ExpressionType::Alias(alias) = declared {
        if alias.name == "Result" {
            if let ExpressionType::Sum(sum) = alias.reference.as_ref() {
                return (
                    sum.payload("Ok").unwrap_or(ExpressionType::Unknown),
                    Some(sum.payload("Err").unwrap_or(ExpressionType::Unknown)),
                );
            }
        }
    }
    (declared.clone(), None)
}

/// Report every occurrence of a duplicated name in a declaration group.
fn report_duplicates<'a>(
    parser: &mut Parser,
    names: impl Iterator<Item = (&'a str, Span)>,
) {
    let names: Vec<(&str, Span)> = names.collect();
    for (i, (name, span)) in names.iter().enumerate() {
        let duplicated = names
            .iter()
            .enumerate()
            .any(|(j, (other, _))| i != j && name == other);
        if duplicated {
            parser.report(
                ErrorKind::DuplicateIdentifier {
                    name: name.to_string(),
                },
                *span,
            );
        }
    }
}
