//! Control-flow constructs
//!
//! Blocks, `if`/`else`, the three `for` forms, `match` with exhaustiveness
//! checking, and `catch`. Loop and match bodies are checked inside pushed
//! scopes; unreachable statements after an exit are reported per block.

use crate::diagnostics::ErrorKind;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parser::Parser;
use crate::parser::span::Span;
use crate::scope::ScopeKind;
use crate::types::{builtins, matches, ExpressionType};

impl Parser {
    /*  Blocks  */

    pub(crate) fn parse_block(&mut self) -> Block {
        if !self.at(TokenKind::LeftBrace) {
            let span = self.peek().span;
            self.report(ErrorKind::LeftBraceExpected, span);
            return Block {
                statements: Vec::new(),
                span,
                scope: None,
            };
        }
        let mut span = self.consume().span;
        self.discard_line_breaks();

        let mut statements = Vec::new();
        while !self.at(TokenKind::RightBrace) && !self.at(TokenKind::Eof) {
            statements.push(self.parse_statement());
            if !self.at(TokenKind::Eol)
                && !self.at(TokenKind::RightBrace)
                && !self.at(TokenKind::Eof)
            {
                self.recover_to(TokenKind::RightBrace);
            }
            self.discard_line_breaks();
        }

        if self.at(TokenKind::RightBrace) {
            span = span.merge(&self.consume().span);
        } else {
            let at = self.peek().span;
            self.report(ErrorKind::RightBraceExpected, at);
        }
        Block {
            statements,
            span,
            scope: None,
        }
    }

    /// Check a block inside a freshly pushed scope of the given kind.
    pub(crate) fn check_block_scoped(&mut self, block: &mut Block, kind: ScopeKind) {
        self.push_scope(kind);
        self.check_block_statements(block);
        self.drop_scope();
    }

    /// Check a block's statements in the current scope and report
    /// unreachable code after an exit.
    pub(crate) fn check_block_statements(&mut self, block: &mut Block) {
        block.scope = Some(self.scope);
        for statement in &mut block.statements {
            self.check_stmt(statement);
        }
        self.report_unreachable(&block.statements);
    }

    pub(crate) fn report_unreachable(&mut self, statements: &[Stmt]) {
        let Some(exit_at) = statements.iter().position(|s| s.is_exit()) else {
            return;
        };
        let unreachable = &statements[exit_at + 1..];
        if unreachable.is_empty() {
            return;
        }
        let span = unreachable[0]
            .span()
            .merge(&unreachable[unreachable.len() - 1].span());
        self.report(ErrorKind::UnreachableCode, span);
    }

    /*  If  */

    pub(crate) fn parse_if(&mut self) -> Expr {
        let keyword = self.consume();
        let condition = self.parse_condition();
        let body = self.parse_block();
        let alternate = self.parse_alternate();
        let end = match &alternate {
            Some(alternate) => alternate.span(),
            None => body.span,
        };
        Expr::If(Box::new(IfExpr {
            condition,
            body,
            alternate,
            span: keyword.span.merge(&end),
            ty: ExpressionType::Unknown,
        }))
    }

    fn parse_condition(&mut self) -> Expr {
        let outer = self.allow_brace;
        self.allow_brace = false;
        let condition = self.parse_expression();
        self.allow_brace = outer;
        condition.unwrap_or_else(|| {
            let span = self.peek().span;
            self.report(ErrorKind::ExpressionExpected, span);
            Expr::Missing(span)
        })
    }

    fn parse_alternate(&mut self) -> Option<ElseBranch> {
        if !self.at(TokenKind::ElseKeyword) {
            return None;
        }
        self.consume();
        match self.peek().kind {
            TokenKind::IfKeyword => match self.parse_if() {
                Expr::If(inner) => Some(ElseBranch::If(inner)),
                _ => None,
            },
            TokenKind::LeftBrace => Some(ElseBranch::Block(self.parse_block())),
            _ => {
                let span = self.peek().span;
                self.report(ErrorKind::LeftBraceExpected, span);
                None
            }
        }
    }

    pub(crate) fn check_if(&mut self, if_expr: &mut IfExpr) {
        self.check_expr(&mut if_expr.condition);
        if !matches!(if_expr.condition, Expr::Missing(_)) {
            let found = if_expr.condition.ty();
            if !ExpressionType::Boolean.extends(&found) {
                self.report(
                    ErrorKind::BooleanExpected {
                        found: found.to_string(),
                    },
                    if_expr.condition.span(),
                );
            }
        }

        self.check_block_scoped(&mut if_expr.body, ScopeKind::Block);

        match &mut if_expr.alternate {
            None => {
                if_expr.ty = ExpressionType::Alias(builtins::make_option(Some(
                    if_expr.body.ty(),
                )));
            }
            Some(alternate) => {
                match alternate {
                    ElseBranch::Block(block) => self.check_block_scoped(block, ScopeKind::Block),
                    ElseBranch::If(inner) => self.check_if(inner),
                }
                let body_type = if_expr.body.ty();
                let alternate_type = alternate.ty();
                if !matches(&body_type, &alternate_type) {
                    self.report(
                        ErrorKind::MismatchedTypes {
                            left: body_type.to_string(),
                            right: alternate_type.to_string(),
                        },
                        if_expr.span,
                    );
                }
                if_expr.ty = alternate_type;
            }
        }
    }

    /*  For  */

    pub(crate) fn parse_for(&mut self) -> Expr {
        let keyword = self.consume();
        let head = if self.at(TokenKind::LeftBrace) {
            ForHead::Infinite
        } else {
            let expr = self.parse_condition();
            if self.at(TokenKind::InKeyword) {
                self.consume();
                let iterable = self.parse_condition();
                ForHead::In {
                    pattern: expr,
                    iterable,
                }
            } else {
                ForHead::Condition(expr)
            }
        };
        let body = self.parse_block();
        let span = keyword.span.merge(&body.span);
        Expr::For(Box::new(ForExpr {
            head,
            body,
            span,
            ty: ExpressionType::Unknown,
        }))
    }

    pub(crate) fn check_for(&mut self, for_expr: &mut ForExpr) {
        self.push_scope(ScopeKind::Loop);
        match &mut for_expr.head {
            ForHead::Infinite => {}
            ForHead::Condition(condition) => {
                self.check_expr(condition);
                if !matches!(condition, Expr::Missing(_)) {
                    let found = condition.ty();
                    if !ExpressionType::Boolean.extends(&found) {
                        self.report(
                            ErrorKind::BooleanExpected {
                                found: found.to_string(),
                            },
                            condition.span(),
                        );
                    }
                }
            }
            ForHead::In { pattern, iterable } => {
                self.check_expr(iterable);
                let iterable_type = iterable.ty();
                let item = match iterable_type.deref() {
                    ExpressionType::List(element) => element.as_ref().clone(),
                    ExpressionType::Range(operand) => operand.as_ref().clone(),
                    ExpressionType::Unknown => ExpressionType::Unknown,
                    other => {
                        self.report(
                            ErrorKind::IterableExpected {
                                found: other.to_string(),
                            },
                            iterable.span(),
                        );
                        ExpressionType::Unknown
                    }
                };
                let pattern = crate::parser::parser::unwrap_paren(pattern.clone());
                self.bind_loop_pattern(&pattern, item);
            }
        }
        self.check_block_statements(&mut for_expr.body);
        self.drop_scope();

        for_expr.ty = self.loop_type(&for_expr.body);
    }

    /// Bind `for x in ...` or `for (x, i) in ...` inside the loop scope.
    fn bind_loop_pattern(&mut self, pattern: &Expr, item: ExpressionType) {
        match pattern {
            Expr::Identifier(identifier) => {
                self.scopes
                    .add(self.scope, identifier.name(), identifier.token.span, item);
            }
            Expr::Tuple(tuple) => {
                if tuple.elements.len() != 2 {
                    self.report(ErrorKind::InvalidPattern, tuple.span);
                    return;
                }
                let types = [item, ExpressionType::Number];
                for (element, typing) in tuple.elements.iter().zip(types.into_iter()) {
                    match element {
                        Expr::Identifier(identifier) => {
                            self.scopes.add(
                                self.scope,
                                identifier.name(),
                                identifier.token.span,
                                typing,
                            );
                        }
                        other => self.report(ErrorKind::IdentifierExpected, other.span()),
                    }
                }
            }
            other => self.report(ErrorKind::InvalidPattern, other.span()),
        }
    }

    /// A loop's type is the common type of its `break` values; `Nil` when
    /// no break carries one.
    fn loop_type(&mut self, body: &Block) -> ExpressionType {
        let breaks = collect_breaks(body);
        let Some((first, _)) = breaks.first() else {
            return ExpressionType::Nil;
        };
        let common = first.clone().unwrap_or(ExpressionType::Nil);
        for (value, span) in breaks.iter().skip(1) {
            let value_type = value.clone().unwrap_or(ExpressionType::Nil);
            if matches!(common, ExpressionType::Nil) {
                if value.is_some() {
                    self.report(ErrorKind::UnexpectedExpression, *span);
                }
            } else if !common.extends(&value_type) {
                self.report(
                    ErrorKind::MismatchedTypes {
                        left: common.to_string(),
                        right: value_type.to_string(),
                    },
                    *span,
                );
            }
        }
        common
    }

    /*  Match  */

    pub(crate) fn parse_match(&mut self) -> Expr {
        let keyword = self.consume();
        let scrutinee = self.parse_condition();
        let mut end = scrutinee.span();
        if !self.at(TokenKind::LeftBrace) && !self.recover_to(TokenKind::LeftBrace) {
            return Expr::Match(Box::new(MatchExpr {
                scrutinee,
                cases: Vec::new(),
                span: keyword.span.merge(&end),
                ty: ExpressionType::Unknown,
            }));
        }
        self.consume(); // '{'
        self.discard_line_breaks();

        let mut cases = Vec::new();
        while !self.at(TokenKind::RightBrace) && !self.at(TokenKind::Eof) {
            cases.push(self.parse_match_case());
        }
        if self.at(TokenKind::RightBrace) {
            end = self.consume().span;
        } else {
            let at = self.peek().span;
            self.report(ErrorKind::RightBraceExpected, at);
        }
        Expr::Match(Box::new(MatchExpr {
            scrutinee,
            cases,
            span: keyword.span.merge(&end),
            ty: ExpressionType::Unknown,
        }))
    }

    fn parse_match_case(&mut self) -> MatchCase {
        let mut span = self.peek().span;
        let pattern = if self.at(TokenKind::CaseKeyword) {
            self.consume();
            let outer_call = self.allow_call;
            let outer_colon = self.prevent_colon;
            self.allow_call = false;
            self.prevent_colon = true;
            let pattern = self.parse_condition();
            self.allow_call = outer_call;
            self.prevent_colon = outer_colon;
            if self.at(TokenKind::Colon) {
                self.consume();
            } else {
                let at = self.peek().span;
                self.report(
                    ErrorKind::TokenExpected {
                        token: ":".to_string(),
                    },
                    at,
                );
            }
            span = span.merge(&pattern.span());
            Some(pattern)
        } else {
            self.report(
                ErrorKind::TokenExpected {
                    token: "case".to_string(),
                },
                span,
            );
            None
        };

        let mut statements = Vec::new();
        self.discard_line_breaks();
        while !self.at(TokenKind::CaseKeyword)
            && !self.at(TokenKind::RightBrace)
            && !self.at(TokenKind::Eof)
        {
            statements.push(self.parse_statement());
            self.discard_line_breaks();
        }
        if let Some(last) = statements.last() {
            span = span.merge(&last.span());
        }
        MatchCase {
            pattern,
            statements,
            span,
            scope: None,
        }
    }

    pub(crate) fn check_match(&mut self, match_expr: &mut MatchExpr) {
        self.check_expr(&mut match_expr.scrutinee);
        let scrutinee_type = match_expr.scrutinee.ty();
        let matched = scrutinee_type.unalias().clone();
        match matched {
            ExpressionType::Sum(_) | ExpressionType::Trait(_) | ExpressionType::Unknown => {}
            ref other => {
                self.report(
                    ErrorKind::Unmatchable {
                        found: other.to_string(),
                    },
                    match_expr.scrutinee.span(),
                );
            }
        }

        let mut covered: Vec<(String, Span)> = Vec::new();
        let mut catchall: Option<(usize, Span)> = None;
        let mut case_types: Vec<(ExpressionType, Span)> = Vec::new();
        let case_count = match_expr.cases.len();
        for (index, case) in match_expr.cases.iter_mut().enumerate() {
            self.push_scope(ScopeKind::Block);
            case.scope = Some(self.scope);

            if let Some(pattern) = &mut case.pattern {
                if is_catchall(pattern) {
                    if catchall.is_none() {
                        catchall = Some((index, pattern.span()));
                        if index + 1 < case_count {
                            self.report(ErrorKind::CatchallNotLast, pattern.span());
                        }
                    }
                } else {
                    let pattern = pattern.clone();
                    if let Some(name) =
                        self.bind_case_pattern(&pattern, &matched, &scrutinee_type)
                    {
                        covered.push((name, pattern.span()));
                    }
                }
            }

            for statement in &mut case.statements {
                self.check_stmt(statement);
            }
            self.report_unreachable(&case.statements);
            let case_type = match case.statements.last() {
                Some(Stmt::Expr(expr)) => expr.ty(),
                _ => ExpressionType::Nil,
            };
            case_types.push((case_type, case.span));
            self.drop_scope();
        }

        // duplicate constructors are reported at every occurrence
        let mut reported: Vec<usize> = Vec::new();
        for (i, (name, span)) in covered.iter().enumerate() {
            let duplicated = covered
                .iter()
                .enumerate()
                .any(|(j, (other, _))| i != j && name == other);
            if duplicated && !reported.contains(&i) {
                reported.push(i);
                self.report(
                    ErrorKind::DuplicateIdentifier { name: name.clone() },
                    *span,
                );
            }
        }

        if catchall.is_none() {
            match &matched {
                ExpressionType::Sum(sum) => {
                    for member in &sum.members {
                        if !covered.iter().any(|(name, _)| *name == member.name) {
                            self.report(
                                ErrorKind::MissingConstructor {
                                    name: member.name.clone(),
                                },
                                match_expr.span,
                            );
                        }
                    }
                }
                ExpressionType::Trait(_) => {
                    if !match_expr.cases.is_empty() {
                        self.report(ErrorKind::NotExhaustive, match_expr.span);
                    }
                }
                _ => {}
            }
        }

        match_expr.ty = match case_types.first() {
            Some((first, _)) => first.clone(),
            None => ExpressionType::Nil,
        };
    }

    /// Bind a case pattern inside the case scope. Returns the constructor
    /// name the case covers, if any.
    fn bind_case_pattern(
        &mut self,
        pattern: &Expr,
        matched: &ExpressionType,
        scrutinee_type: &ExpressionType,
    ) -> Option<String> {
        match pattern {
            // `case Constructor:` or `case Type:` without a binder
            Expr::Identifier(identifier) => {
                if !identifier.is_type() {
                    self.report(ErrorKind::TypeIdentifierExpected, identifier.token.span);
                    return None;
                }
                self.check_case_typing(identifier, matched, scrutinee_type)
                    .map(|_| identifier.name().to_string())
            }
            // `case binder Constructor:`
            Expr::Param(param) => {
                let Expr::Identifier(typing) = &param.typing else {
                    self.report(ErrorKind::TypeIdentifierExpected, param.typing.span());
                    return None;
                };
                if !typing.is_type() {
                    self.report(ErrorKind::TypeIdentifierExpected, typing.token.span);
                    return None;
                }
                let bound = self.check_case_typing(typing, matched, scrutinee_type);
                if let Some(typing) = bound {
                    self.scopes.add(
                        self.scope,
                        param.name.name(),
                        param.name.token.span,
                        typing,
                    );
                }
                Some(typing.name().to_string())
            }
            other => {
                self.report(ErrorKind::InvalidPattern, other.span());
                None
            }
        }
    }

    /// Resolve what a case binder receives: the constructor payload for
    /// sums, the concrete implementing alias for traits.
    fn check_case_typing(
        &mut self,
        identifier: &Identifier,
        matched: &ExpressionType,
        scrutinee_type: &ExpressionType,
    ) -> Option<ExpressionType> {
        let name = identifier.name().to_string();
        match matched {
            ExpressionType::Sum(sum) => {
                if sum.get(&name).is_none() {
                    self.report(
                        ErrorKind::PropertyDoesNotExist {
                            name,
                            parent: scrutinee_type.to_string(),
                        },
                        identifier.token.span,
                    );
                    return Some(ExpressionType::Unknown);
                }
                match sum.payload(&name) {
                    Some(payload) => {
                        let scope = self.scope;
                        let (built, _) = payload.build(&mut self.scopes, scope, None);
                        Some(built)
                    }
                    None => Some(scrutinee_type.clone()),
                }
            }
            ExpressionType::Trait(trait_type) => {
                let typing = match self.scopes.find(self.scope, &name) {
                    Some(variable) => variable.typing.clone(),
                    None => {
                        self.report(
                            ErrorKind::CannotFind { name },
                            identifier.token.span,
                        );
                        return Some(ExpressionType::Unknown);
                    }
                };
                let ExpressionType::Type(inner) = typing else {
                    self.report(ErrorKind::TypeIdentifierExpected, identifier.token.span);
                    return Some(ExpressionType::Unknown);
                };
                match *inner {
                    ExpressionType::Alias(alias) if alias.implements(trait_type) => {
                        Some(ExpressionType::Alias(alias))
                    }
                    other => {
                        self.report(
                            ErrorKind::TypeDoesNotImplement {
                                name: other.to_string(),
                            },
                            identifier.token.span,
                        );
                        Some(ExpressionType::Unknown)
                    }
                }
            }
            _ => Some(ExpressionType::Unknown),
        }
    }

    /*  Catch  */

    /// `expr catch err { ... }` sits between exponentiation and instances
    /// in the precedence chain.
    pub(crate) fn parse_catch(&mut self) -> Option<Expr> {
        let expr = self.parse_instance()?;
        if !self.at(TokenKind::CatchKeyword) {
            return Some(expr);
        }
        self.consume();

        let outer = self.allow_brace;
        self.allow_brace = false;
        let saved_empty = self.allow_empty;
        self.allow_empty = true;
        let token = self.parse_token();
        self.allow_empty = saved_empty;
        self.allow_brace = outer;
        let identifier = match token {
            Some(Expr::Identifier(identifier)) => Some(identifier),
            Some(other) => {
                self.report(ErrorKind::IdentifierExpected, other.span());
                None
            }
            None => None,
        };

        if !self.at(TokenKind::LeftBrace) {
            self.recover_to(TokenKind::LeftBrace);
        }
        let body = self.parse_block();
        let span = expr.span().merge(&body.span);
        Some(Expr::Catch(Box::new(CatchExpr {
            left: expr,
            identifier,
            body,
            span,
            ty: ExpressionType::Unknown,
        })))
    }

    pub(crate) fn check_catch(&mut self, catch: &mut CatchExpr) {
        self.check_expr(&mut catch.left);
        let left_type = catch.left.ty();

        let (happy, error) = match &left_type {
            ExpressionType::Alias(alias) if alias.name == "Result" => {
                match alias.reference.as_ref() {
                    ExpressionType::Sum(sum) => (
                        sum.payload("Ok").unwrap_or(ExpressionType::Unknown),
                        sum.payload("Err").unwrap_or(ExpressionType::Unknown),
                    ),
                    _ => (ExpressionType::Unknown, ExpressionType::Unknown),
                }
            }
            ExpressionType::Unknown => (ExpressionType::Unknown, ExpressionType::Unknown),
            _ => {
                self.report(ErrorKind::UnneededCatch, catch.span);
                (left_type.clone(), ExpressionType::Unknown)
            }
        };

        self.push_scope(ScopeKind::Block);
        if let Some(identifier) = &catch.identifier {
            self.scopes.add(
                self.scope,
                identifier.name(),
                identifier.token.span,
                error,
            );
        }
        self.check_block_statements(&mut catch.body);
        self.drop_scope();

        let body_type = catch.body.ty();
        if !happy.extends(&body_type) {
            self.report(
                ErrorKind::CannotAssignType {
                    expected: happy.to_string(),
                    received: body_type.to_string(),
                },
                catch.body.report_span(),
            );
        }
        catch.ty = happy;
    }
}

fn is_catchall(pattern: &Expr) -> bool {
    matches!(pattern, Expr::Identifier(identifier) if identifier.name() == "_")
}

/// Break values inside a loop body, not crossing into nested loops or
/// functions.
pub(crate) fn collect_breaks(body: &Block) -> Vec<(Option<ExpressionType>, Span)> {
    let mut breaks = Vec::new();
    walk_block(body, &mut |node| match node {
        WalkNode::Stmt(Stmt::Exit(exit)) if exit.keyword.kind == TokenKind::BreakKeyword => {
            breaks.push((exit.value.as_ref().map(|v| v.ty()), exit.span()));
            Flow::Continue
        }
        WalkNode::Expr(Expr::For(_)) | WalkNode::Expr(Expr::Function(_)) => Flow::SkipChildren,
        _ => Flow::Continue,
    });
    breaks
}
