//! Expression parsing and checking
//!
//! Expression parsing uses precedence climbing; each node form performs its
//! own type check immediately after construction. A missing operand is
//! reported and replaced by a placeholder so checking can continue.

use crate::diagnostics::ErrorKind;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parser::Parser;
use crate::parser::span::Span;
use crate::scope::ScopeKind;
use crate::types::{builtins, matches, Alias, ExpressionType, Function, SumMember};

impl Parser {
    /*  Parsing  */

    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        match self.peek().kind {
            TokenKind::ForKeyword => Some(self.parse_for()),
            TokenKind::IfKeyword => Some(self.parse_if()),
            TokenKind::MatchKeyword => Some(self.parse_match()),
            _ => self.parse_tuple(),
        }
    }

    pub(crate) fn parse_tuple(&mut self) -> Option<Expr> {
        let outer = self.allow_empty;
        self.allow_empty = true;
        let mut elements = Vec::new();
        while !self.at(TokenKind::Eof) {
            let Some(element) = self.parse_sum_type() else {
                break;
            };
            elements.push(element);
            if !self.at(TokenKind::Comma) {
                break;
            }
            self.consume();
            if self.multiline {
                self.discard_line_breaks();
            }
        }
        self.allow_empty = outer;

        match elements.len() {
            0 => None,
            1 => elements.pop(),
            _ => {
                let span = elements[0]
                    .span()
                    .merge(&elements[elements.len() - 1].span());
                Some(Expr::Tuple(Box::new(TupleExpr {
                    elements,
                    span,
                    ty: ExpressionType::Unknown,
                })))
            }
        }
    }

    /// `name Type`, `key: value`, or a plain expression.
    pub(crate) fn parse_tagged(&mut self) -> Option<Expr> {
        let expr = self.parse_range()?;
        if self.at(TokenKind::Colon) && !self.prevent_colon {
            return Some(self.parse_entry(expr));
        }
        if let Expr::Identifier(identifier) = expr {
            let outer = self.allow_empty;
            self.allow_empty = true;
            let complement = self.parse_range();
            self.allow_empty = outer;
            return Some(match complement {
                Some(typing) => Expr::Param(Box::new(ParamExpr {
                    name: identifier,
                    typing,
                })),
                None => Expr::Identifier(identifier),
            });
        }
        Some(expr)
    }

    fn parse_entry(&mut self, key: Expr) -> Expr {
        self.consume(); // ':'
        let key = match key {
            Expr::Identifier(_) | Expr::Literal(_) | Expr::Computed(_) | Expr::List(_) => {
                Some(key)
            }
            other => {
                self.report(ErrorKind::FieldKeyExpected, other.span());
                None
            }
        };
        let value = match self.parse_range() {
            Some(value) => value,
            None => {
                let span = self.peek().span;
                self.report(ErrorKind::ExpressionExpected, span);
                Expr::Missing(span)
            }
        };
        let span = match &key {
            Some(key) => key.span().merge(&value.span()),
            None => value.span(),
        };
        Expr::Entry(Box::new(EntryExpr { key, value, span }))
    }

    /// Ranges `a..b` and result-type sugar `Ok ! Err` sit loosest in the
    /// binary ladder.
    pub(crate) fn parse_range(&mut self) -> Option<Expr> {
        let left = self.parse_binary()?;
        match self.peek().kind {
            TokenKind::ExclusiveRange | TokenKind::InclusiveRange => {
                let operator = self.consume();
                let right = self.parse_rhs(Self::parse_binary);
                Some(Expr::Range(Box::new(RangeExpr {
                    left,
                    operator,
                    right,
                })))
            }
            TokenKind::Bang => {
                let operator = self.consume();
                let right = self.parse_rhs(Self::parse_binary);
                Some(Expr::Binary(Box::new(BinaryExpr {
                    left,
                    right,
                    operator,
                })))
            }
            _ => Some(left),
        }
    }

    pub(crate) fn parse_binary(&mut self) -> Option<Expr> {
        self.parse_logical_or()
    }

    fn parse_binary_level(
        &mut self,
        operators: &[TokenKind],
        next: fn(&mut Self) -> Option<Expr>,
    ) -> Option<Expr> {
        let mut expression = next(self);
        while operators.contains(&self.peek().kind) {
            let operator = self.consume();
            let left = expression.unwrap_or_else(|| {
                self.report(ErrorKind::ExpressionExpected, operator.span);
                Expr::Missing(operator.span)
            });
            let right = self.parse_rhs(next);
            expression = Some(Expr::Binary(Box::new(BinaryExpr {
                left,
                right,
                operator,
            })));
        }
        expression
    }

    fn parse_rhs(&mut self, next: fn(&mut Self) -> Option<Expr>) -> Expr {
        let outer = self.allow_brace;
        self.allow_brace = false;
        let right = next(self);
        self.allow_brace = outer;
        right.unwrap_or_else(|| {
            let span = self.peek().span;
            self.report(ErrorKind::ExpressionExpected, span);
            Expr::Missing(span)
        })
    }

    fn parse_logical_or(&mut self) -> Option<Expr> {
        self.parse_binary_level(&[TokenKind::LogicalOr], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> Option<Expr> {
        self.parse_binary_level(&[TokenKind::LogicalAnd], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Option<Expr> {
        self.parse_binary_level(&[TokenKind::Equal, TokenKind::NotEqual], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Option<Expr> {
        self.parse_binary_level(
            &[
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Greater,
            ],
            Self::parse_addition,
        )
    }

    fn parse_addition(&mut self) -> Option<Expr> {
        self.parse_binary_level(
            &[TokenKind::Add, TokenKind::Concat, TokenKind::Sub],
            Self::parse_multiplication,
        )
    }

    fn parse_multiplication(&mut self) -> Option<Expr> {
        self.parse_binary_level(
            &[TokenKind::Mul, TokenKind::Div, TokenKind::Mod],
            Self::parse_exponentiation,
        )
    }

    /// Exponentiation is right-associative.
    fn parse_exponentiation(&mut self) -> Option<Expr> {
        let expression = self.parse_catch()?;
        if !self.at(TokenKind::Pow) {
            return Some(expression);
        }
        let operator = self.consume();
        let right = match self.parse_exponentiation() {
            Some(right) => right,
            None => {
                let span = self.peek().span;
                self.report(ErrorKind::ExpressionExpected, span);
                Expr::Missing(span)
            }
        };
        Some(Expr::Binary(Box::new(BinaryExpr {
            left: expression,
            right,
            operator,
        })))
    }

    /// `Type{...}` construction binds tighter than binary operators.
    pub(crate) fn parse_instance(&mut self) -> Option<Expr> {
        let expr = self.parse_unary()?;
        if !self.at(TokenKind::LeftBrace) || !self.allow_brace || matches!(expr, Expr::Block(_))
        {
            return Some(expr);
        }
        let braced = self.parse_braced();
        let args_span = braced.span;
        Some(Expr::Instance(Box::new(InstanceExpr {
            typing: expr,
            args: braced.elements,
            args_span,
            ty: ExpressionType::Unknown,
        })))
    }

    pub(crate) fn parse_unary(&mut self) -> Option<Expr> {
        match self.peek().kind {
            TokenKind::AsyncKeyword
            | TokenKind::AwaitKeyword
            | TokenKind::Bang
            | TokenKind::BinaryAnd
            | TokenKind::Mul
            | TokenKind::QuestionMark
            | TokenKind::TryKeyword => {
                let operator = self.consume();
                let operand = match self.parse_inner_unary() {
                    Some(operand) => operand,
                    None => {
                        let span = self.peek().span;
                        self.report(ErrorKind::ExpressionExpected, span);
                        Expr::Missing(span)
                    }
                };
                Some(Expr::Unary(Box::new(UnaryExpr { operator, operand })))
            }
            TokenKind::LeftBracket => Some(self.parse_list_type()),
            _ => self.parse_access(),
        }
    }

    fn parse_inner_unary(&mut self) -> Option<Expr> {
        let outer = self.allow_brace;
        self.allow_brace = false;
        let expr = self.parse_unary();
        self.allow_brace = outer;
        expr
    }

    /// A leading `[` starts a list literal `[a, b]`, a list type `[]T`, or
    /// the bracketed type-parameter list of a function expression.
    fn parse_list_type(&mut self) -> Expr {
        let brackets = self.parse_bracketed();
        if self.at(TokenKind::LeftParenthesis) {
            return self.parse_function(Some(brackets));
        }
        if let Some(content) = brackets.expr {
            let elements = match content {
                Expr::Tuple(tuple) => tuple.elements,
                other => vec![other],
            };
            return Expr::List(Box::new(ListExpr {
                elements,
                span: brackets.span,
                ty: ExpressionType::Unknown,
            }));
        }
        let outer = self.allow_empty;
        self.allow_empty = true;
        let element = self.parse_inner_unary();
        self.allow_empty = outer;
        match element {
            Some(element) => {
                let span = brackets.span.merge(&element.span());
                Expr::ListType(Box::new(ListTypeExpr { element, span }))
            }
            // a bare `[]` is an empty list literal
            None => Expr::List(Box::new(ListExpr {
                elements: Vec::new(),
                span: brackets.span,
                ty: ExpressionType::List(Box::new(ExpressionType::Unknown)),
            })),
        }
    }

    /// Access chains: calls, property access, computed access.
    fn parse_access(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.consume();
                    if matches!(expr, Expr::Paren(_)) && self.at(TokenKind::LeftParenthesis) {
                        expr = self.parse_trait_expression(expr);
                        continue;
                    }
                    let property = self.parse_token();
                    if let Some(property) = &property {
                        if !matches!(property, Expr::Identifier(_) | Expr::Literal(_)) {
                            self.report(ErrorKind::IdentifierExpected, property.span());
                        }
                    }
                    expr = Expr::Property(Box::new(PropertyExpr {
                        object: expr,
                        property,
                        ty: ExpressionType::Unknown,
                    }));
                }
                TokenKind::LeftParenthesis if self.allow_call => {
                    let paren = self.parse_parenthesized();
                    let args = TupleExpr::wrap(paren.expr, paren.span);
                    expr = Expr::Call(Box::new(CallExpr {
                        callee: expr,
                        args,
                        ty: ExpressionType::Unknown,
                    }));
                }
                TokenKind::LeftBracket => {
                    let index = self.parse_bracketed();
                    expr = Expr::Computed(Box::new(ComputedExpr {
                        object: expr,
                        index,
                        ty: ExpressionType::Unknown,
                    }));
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        match self.peek().kind {
            TokenKind::LeftParenthesis => {
                let paren = self.parse_parenthesized();
                if self.at(TokenKind::SlimArrow) || self.at(TokenKind::FatArrow) {
                    return Some(self.parse_function_with(None, paren));
                }
                Some(Expr::Paren(Box::new(paren)))
            }
            TokenKind::LeftBrace if self.allow_brace => Some(Expr::Block(Box::new(
                self.parse_block(),
            ))),
            _ => self.parse_token(),
        }
    }

    /// A literal, type keyword, or identifier.
    pub(crate) fn parse_token(&mut self) -> Option<Expr> {
        match self.peek().kind {
            TokenKind::BooleanLiteral
            | TokenKind::NumberLiteral
            | TokenKind::StringLiteral
            | TokenKind::NumberKeyword
            | TokenKind::StringKeyword
            | TokenKind::BooleanKeyword => {
                let token = self.consume();
                Some(Expr::Literal(Literal { token }))
            }
            TokenKind::Name => {
                let token = self.consume();
                Some(Expr::Identifier(Identifier::new(token)))
            }
            _ => {
                if !self.allow_empty {
                    let span = self.peek().span;
                    self.report(ErrorKind::ExpressionExpected, span);
                }
                None
            }
        }
    }

    /*  Groupings  */

    pub(crate) fn parse_parenthesized(&mut self) -> ParenExpr {
        let mut span = self.consume().span; // '('
        self.discard_line_breaks();
        if self.at(TokenKind::RightParenthesis) {
            span = span.merge(&self.consume().span);
            return ParenExpr { expr: None, span };
        }

        let outer_brace = self.allow_brace;
        let outer_multiline = self.multiline;
        self.allow_brace = true;
        self.multiline = true;
        let expr = self.parse_tuple();
        self.allow_brace = outer_brace;
        self.multiline = outer_multiline;

        self.discard_line_breaks();
        if self.at(TokenKind::RightParenthesis) {
            span = span.merge(&self.consume().span);
        } else {
            let at = self.peek().span;
            self.report(ErrorKind::RightParenExpected, at);
            if let Some(expr) = &expr {
                span = span.merge(&expr.span());
            }
        }
        ParenExpr { expr, span }
    }

    pub(crate) fn parse_braced(&mut self) -> BracedExpr {
        let mut span = self.consume().span; // '{'
        self.discard_line_breaks();

        let outer_multiline = self.multiline;
        let outer_empty = self.allow_empty;
        self.multiline = true;
        self.allow_empty = true;
        let expr = self.parse_tuple();
        self.multiline = outer_multiline;
        self.allow_empty = outer_empty;

        self.discard_line_breaks();
        if self.at(TokenKind::RightBrace) {
            span = span.merge(&self.consume().span);
        } else {
            let at = self.peek().span;
            self.report(ErrorKind::RightBraceExpected, at);
            if let Some(expr) = &expr {
                span = span.merge(&expr.span());
            }
        }
        let elements = match expr {
            None => Vec::new(),
            Some(Expr::Tuple(tuple)) => tuple.elements,
            Some(other) => vec![other],
        };
        BracedExpr { elements, span }
    }

    pub(crate) fn parse_bracketed(&mut self) -> BracketedExpr {
        let mut span = self.consume().span; // '['

        let outer = self.allow_empty;
        self.allow_empty = true;
        let expr = self.parse_expression();
        self.allow_empty = outer;

        if self.at(TokenKind::RightBracket) {
            span = span.merge(&self.consume().span);
        } else {
            let at = self.peek().span;
            self.report(ErrorKind::RightBracketExpected, at);
            if let Some(expr) = &expr {
                span = span.merge(&expr.span());
            }
        }
        BracketedExpr { expr, span }
    }

    /*  Checking  */

    pub(crate) fn check_expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Literal(_) | Expr::Missing(_) => {}
            Expr::Identifier(identifier) => self.check_identifier(identifier),
            Expr::Binary(binary) => self.check_binary(binary),
            Expr::Unary(unary) => self.check_unary(unary),
            Expr::Range(range) => self.check_range(range),
            Expr::Tuple(tuple) => self.check_tuple(tuple),
            Expr::Paren(paren) => {
                if let Some(inner) = &mut paren.expr {
                    self.check_expr(inner);
                }
            }
            Expr::Param(param) => self.check_param(param),
            Expr::Entry(entry) => self.check_entry(entry),
            Expr::ListType(list) => self.check_list_type(list),
            Expr::List(list) => self.check_list_literal(list),
            Expr::Braced(braced) => self.check_object_definition(braced),
            Expr::Function(function) => self.check_function(function),
            Expr::Call(call) => self.check_call(call),
            Expr::Instance(instance) => self.check_instance(instance),
            Expr::Property(property) => self.check_property(property),
            Expr::Computed(computed) => self.check_computed(computed),
            Expr::Block(block) => self.check_block_scoped(block, ScopeKind::Block),
            Expr::If(if_expr) => self.check_if(if_expr),
            Expr::For(for_expr) => self.check_for(for_expr),
            Expr::Match(match_expr) => self.check_match(match_expr),
            Expr::Catch(catch) => self.check_catch(catch),
            Expr::Sum(sum) => self.check_sum_type(sum),
            Expr::Trait(trait_expr) => self.check_trait_expression(trait_expr),
        }
    }

    pub(crate) fn check_identifier(&mut self, identifier: &mut Identifier) {
        let name = identifier.name().to_string();
        if name == "_" {
            identifier.ty = ExpressionType::Unknown;
            return;
        }
        let span = identifier.token.span;
        let writing = self.writing;
        match self.scopes.find_mut(self.scope, &name) {
            Some(variable) => {
                if writing {
                    variable.write_at(span);
                } else {
                    variable.read_at(span);
                }
                identifier.ty = variable.typing.clone();
            }
            None => {
                self.report(ErrorKind::CannotFind { name }, span);
                identifier.ty = ExpressionType::Unknown;
            }
        }
    }

    fn check_binary(&mut self, binary: &mut BinaryExpr) {
        // the pattern side of an assignment never reaches binary operands
        let writing = std::mem::replace(&mut self.writing, false);
        self.check_expr(&mut binary.left);
        self.check_expr(&mut binary.right);
        self.writing = writing;

        use TokenKind::*;
        match binary.operator.kind {
            Add | Sub | Mul | Pow | Div | Mod | Less | Greater | LessEqual | GreaterEqual => {
                self.check_arithmetic_operand(&binary.left);
                self.check_arithmetic_operand(&binary.right);
            }
            Concat => {
                self.check_concat_operands(
                    &binary.left.ty(),
                    binary.left.span(),
                    &binary.right.ty(),
                    binary.right.span(),
                );
            }
            LogicalAnd | LogicalOr => {
                self.check_boolean_operand(&binary.left);
                self.check_boolean_operand(&binary.right);
            }
            Equal | NotEqual => {
                let left = binary.left.ty();
                let right = binary.right.ty();
                if !matches(&left, &right) {
                    let span = binary.left.span().merge(&binary.right.span());
                    self.report(
                        ErrorKind::MismatchedTypes {
                            left: left.to_string(),
                            right: right.to_string(),
                        },
                        span,
                    );
                }
            }
            Bang => {
                if !matches!(binary.left, Expr::Missing(_)) && !binary.left.ty().is_type() {
                    self.report(ErrorKind::TypeExpected, binary.left.span());
                }
                if !matches!(binary.right, Expr::Missing(_)) && !binary.right.ty().is_type() {
                    self.report(ErrorKind::TypeExpected, binary.right.span());
                }
            }
            _ => unreachable!("not a binary operator"),
        }
    }

    fn check_arithmetic_operand(&mut self, operand: &Expr) {
        if matches!(operand, Expr::Missing(_)) {
            return;
        }
        let found = operand.ty();
        if !ExpressionType::Number.extends(&found) {
            self.report(
                ErrorKind::NumberExpected {
                    found: found.to_string(),
                },
                operand.span(),
            );
        }
    }

    fn check_boolean_operand(&mut self, operand: &Expr) {
        if matches!(operand, Expr::Missing(_)) {
            return;
        }
        let found = operand.ty();
        if !ExpressionType::Boolean.extends(&found) {
            self.report(
                ErrorKind::BooleanExpected {
                    found: found.to_string(),
                },
                operand.span(),
            );
        }
    }

    pub(crate) fn check_concat_operands(
        &mut self,
        left: &ExpressionType,
        left_span: Span,
        right: &ExpressionType,
        right_span: Span,
    ) {
        let concatenable = |t: &ExpressionType| {
            ExpressionType::String.extends(t)
                || ExpressionType::List(Box::new(ExpressionType::Unknown)).extends(t)
        };
        if !concatenable(left) {
            self.report(
                ErrorKind::ConcatenableExpected {
                    found: left.to_string(),
                },
                left_span,
            );
        }
        if !concatenable(right) {
            self.report(
                ErrorKind::ConcatenableExpected {
                    found: right.to_string(),
                },
                right_span,
            );
        }
        if let (ExpressionType::List(left_el), ExpressionType::List(right_el)) = (left, right) {
            if !left_el.extends(right_el) {
                self.report(
                    ErrorKind::MismatchedTypes {
                        left: left.to_string(),
                        right: right.to_string(),
                    },
                    left_span.merge(&right_span),
                );
            }
        }
    }

    fn check_unary(&mut self, unary: &mut UnaryExpr) {
        self.check_expr(&mut unary.operand);
        if matches!(unary.operand, Expr::Missing(_)) {
            return;
        }
        let span = unary.operator.span.merge(&unary.operand.span());
        match unary.operator.kind {
            TokenKind::AsyncKeyword => {
                let Expr::Call(call) = &unary.operand else {
                    self.report(ErrorKind::CallExpressionExpected, unary.operand.span());
                    return;
                };
                if let ExpressionType::Function(function) = call.callee.ty() {
                    if !function.is_async {
                        self.report(ErrorKind::UnneededAsync, span);
                    }
                }
            }
            TokenKind::AwaitKeyword => {
                let found = unary.operand.ty();
                let is_promise =
                    matches!(&found, ExpressionType::Alias(alias) if alias.name == "Promise");
                if !is_promise {
                    self.report(
                        ErrorKind::PromiseExpected {
                            found: found.to_string(),
                        },
                        unary.operand.span(),
                    );
                }
            }
            TokenKind::Bang => {
                let found = unary.operand.ty();
                if !matches!(found, ExpressionType::Type(_) | ExpressionType::Boolean) {
                    self.report(
                        ErrorKind::TypeOrBoolExpected {
                            found: found.to_string(),
                        },
                        unary.operand.span(),
                    );
                }
            }
            TokenKind::BinaryAnd => {
                if unary.operand.ty().is_type() {
                    return;
                }
                match referenced_identifier(&unary.operand) {
                    Some(name) => {
                        let name = name.to_string();
                        if let Some(variable) = self.scopes.find_mut(self.scope, &name) {
                            variable.read_at(span);
                            variable.write_at(span);
                        }
                    }
                    None => self.report(ErrorKind::NotReferenceable, unary.operand.span()),
                }
            }
            TokenKind::Mul => {
                let found = unary.operand.ty();
                if !matches!(found, ExpressionType::Ref(_)) {
                    self.report(
                        ErrorKind::RefExpected {
                            found: found.to_string(),
                        },
                        unary.operand.span(),
                    );
                }
            }
            TokenKind::QuestionMark => {
                if !unary.operand.ty().is_type() {
                    self.report(ErrorKind::TypeExpected, unary.operand.span());
                }
            }
            TokenKind::TryKeyword => {
                let found = unary.operand.ty();
                let is_result =
                    matches!(&found, ExpressionType::Alias(alias) if alias.name == "Result");
                if !is_result {
                    self.report(
                        ErrorKind::ResultExpected {
                            found: found.to_string(),
                        },
                        unary.operand.span(),
                    );
                }
                if !self.scopes.is_in(self.scope, ScopeKind::Function) {
                    self.report(ErrorKind::IllegalResult, span);
                }
            }
            _ => unreachable!("not a unary operator"),
        }
    }

    fn check_range(&mut self, range: &mut RangeExpr) {
        self.check_expr(&mut range.left);
        self.check_expr(&mut range.right);
        let left = range.left.ty();
        let right = range.right.ty();
        if !matches(&left, &right) {
            let span = range.left.span().merge(&range.right.span());
            self.report(
                ErrorKind::MismatchedTypes {
                    left: left.to_string(),
                    right: right.to_string(),
                },
                span,
            );
        }
    }

    pub(crate) fn check_tuple(&mut self, tuple: &mut TupleExpr) {
        for element in &mut tuple.elements {
            self.check_expr(element);
        }
        tuple.ty = match tuple.elements.len() {
            0 => ExpressionType::Nil,
            1 => tuple.elements[0].ty(),
            _ => ExpressionType::Tuple(tuple.elements.iter().map(|e| e.ty()).collect()),
        };
    }

    fn check_param(&mut self, param: &mut ParamExpr) {
        self.check_expr(&mut param.typing);
        if !param.typing.ty().is_type() {
            self.report(ErrorKind::TypeExpected, param.typing.span());
        }
    }

    fn check_entry(&mut self, entry: &mut EntryExpr) {
        self.check_expr(&mut entry.value);
        if entry.value.ty().is_type() {
            self.report(ErrorKind::ValueExpected, entry.value.span());
        }
    }

    fn check_list_literal(&mut self, list: &mut ListExpr) {
        for element in &mut list.elements {
            self.check_expr(element);
        }
        let Some(first) = list.elements.first() else {
            list.ty = ExpressionType::List(Box::new(ExpressionType::Unknown));
            return;
        };
        let element_type = first.ty();
        if element_type.is_type() {
            self.report(ErrorKind::ValueExpected, first.span());
            list.ty = ExpressionType::List(Box::new(ExpressionType::Unknown));
            return;
        }
        for element in list.elements.iter().skip(1) {
            let received = element.ty();
            if !element_type.extends(&received) {
                self.report(
                    ErrorKind::MismatchedTypes {
                        left: element_type.to_string(),
                        right: received.to_string(),
                    },
                    element.span(),
                );
            }
        }
        list.ty = ExpressionType::List(Box::new(element_type));
    }

    fn check_list_type(&mut self, list: &mut ListTypeExpr) {
        self.check_expr(&mut list.element);
        if matches!(list.element, Expr::Missing(_)) {
            return;
        }
        if !list.element.ty().is_type() {
            self.report(ErrorKind::TypeExpected, list.element.span());
        }
    }

    /*  Access chains  */

    fn check_property(&mut self, property: &mut PropertyExpr) {
        self.check_expr(&mut property.object);
        let object_type = property.object.ty();
        property.ty = ExpressionType::Unknown;

        // tuple index access: `pair.0`
        if let ExpressionType::Tuple(elements) = object_type.deref() {
            let Some(Expr::Literal(literal)) = &property.property else {
                self.report(
                    ErrorKind::IntegerExpected,
                    property
                        .property
                        .as_ref()
                        .map(|p| p.span())
                        .unwrap_or_else(|| property.object.span()),
                );
                return;
            };
            let text = literal.token.text.clone();
            match text.parse::<usize>() {
                Ok(index) if index < elements.len() => {
                    property.ty = elements[index].clone();
                }
                Ok(_) => {
                    self.report(
                        ErrorKind::OutOfRange {
                            max: elements.len() - 1,
                            index: text,
                        },
                        literal.token.span,
                    );
                }
                Err(_) => {
                    self.report(ErrorKind::IntegerExpected, literal.token.span);
                }
            }
            return;
        }

        let Some(Expr::Identifier(name)) = &property.property else {
            if let Some(p) = &property.property {
                let span = p.span();
                self.report(ErrorKind::IdentifierExpected, span);
            }
            return;
        };
        let name = name.name().to_string();
        let property_span = property
            .property
            .as_ref()
            .map(|p| p.span())
            .unwrap_or_else(|| property.object.span());

        match object_type.deref() {
            // `SumType.Constructor`
            ExpressionType::Type(inner) => match inner.as_ref() {
                ExpressionType::Alias(alias) => {
                    if let ExpressionType::Sum(sum) = alias.reference.as_ref() {
                        match sum.get(&name) {
                            Some(member) => {
                                property.ty = sum_constructor_type(alias, member);
                            }
                            None => self.report(
                                ErrorKind::PropertyDoesNotExist {
                                    name,
                                    parent: inner.to_string(),
                                },
                                property_span,
                            ),
                        }
                    } else {
                        self.report(
                            ErrorKind::PropertyDoesNotExist {
                                name,
                                parent: inner.to_string(),
                            },
                            property_span,
                        );
                    }
                }
                _ => self.report(
                    ErrorKind::PropertyDoesNotExist {
                        name,
                        parent: inner.to_string(),
                    },
                    property_span,
                ),
            },

            ExpressionType::Alias(alias) => {
                if let Some(method) = alias.method(&name) {
                    property.ty = method.clone();
                    return;
                }
                match alias.reference.as_ref() {
                    ExpressionType::Object(object) => match object.get_owned(&name) {
                        Some(typing) => property.ty = typing.clone(),
                        None => self.report(
                            ErrorKind::PropertyDoesNotExist {
                                name,
                                parent: object_type.to_string(),
                            },
                            property_span,
                        ),
                    },
                    ExpressionType::Trait(trait_type) => match trait_type.get(&name) {
                        Some(typing) => property.ty = typing.clone(),
                        None => self.report(
                            ErrorKind::PropertyDoesNotExist {
                                name,
                                parent: object_type.to_string(),
                            },
                            property_span,
                        ),
                    },
                    _ => self.report(
                        ErrorKind::PropertyDoesNotExist {
                            name,
                            parent: object_type.to_string(),
                        },
                        property_span,
                    ),
                }
            }

            ExpressionType::Trait(trait_type) => match trait_type.get(&name) {
                Some(typing) => property.ty = typing.clone(),
                None => self.report(
                    ErrorKind::PropertyDoesNotExist {
                        name,
                        parent: object_type.to_string(),
                    },
                    property_span,
                ),
            },

            // module access goes through its object type
            ExpressionType::Object(object) => match object.get_owned(&name) {
                Some(typing) => property.ty = typing.clone(),
                None => self.report(
                    ErrorKind::PropertyDoesNotExist {
                        name,
                        parent: object_type.to_string(),
                    },
                    property_span,
                ),
            },

            ExpressionType::Unknown => {}

            other => self.report(
                ErrorKind::PropertyDoesNotExist {
                    name,
                    parent: other.to_string(),
                },
                property_span,
            ),
        }
    }

    fn check_computed(&mut self, computed: &mut ComputedExpr) {
        self.check_expr(&mut computed.object);
        if let Some(index) = &mut computed.index.expr {
            self.check_expr(index);
        }
        let object_type = computed.object.ty();
        computed.ty = ExpressionType::Unknown;

        match object_type.deref() {
            // generic type instantiation: `Name[Args]`
            ExpressionType::Type(inner) => {
                let ExpressionType::Alias(alias) = inner.as_ref() else {
                    self.report(ErrorKind::UnexpectedTypeArgs, computed.index.span);
                    return;
                };
                if alias.params.is_empty() {
                    self.report(ErrorKind::UnexpectedTypeArgs, computed.index.span);
                    return;
                }
                let applied = self.apply_type_args(alias, &computed.index);
                computed.ty = ExpressionType::Type(Box::new(ExpressionType::Alias(applied)));
            }

            // generic function specialization: `f[Args]`
            ExpressionType::Function(function) => {
                if function.type_params.is_empty() {
                    self.report(ErrorKind::UnexpectedTypeArgs, computed.index.span);
                    return;
                }
                let mut specialized = function.clone();
                self.assign_type_args(&mut specialized.type_params, &computed.index);
                let outer = self.scope;
                self.push_scope(ScopeKind::Program);
                for param in &specialized.type_params {
                    self.scopes.add(
                        self.scope,
                        &param.name,
                        Span::default(),
                        ExpressionType::Type(Box::new(ExpressionType::Generic(param.clone()))),
                    );
                }
                let scope = self.scope;
                for param in specialized.params.iter_mut() {
                    let (built, _) = param.build(&mut self.scopes, scope, None);
                    *param = built;
                }
                let (returned, _) = specialized.returned.build(&mut self.scopes, scope, None);
                specialized.returned = Box::new(returned);
                self.scope = outer;
                computed.ty = ExpressionType::Function(specialized);
            }

            // list indexing
            ExpressionType::List(element) => {
                let index_type = computed
                    .index
                    .expr
                    .as_ref()
                    .map(|e| e.ty())
                    .unwrap_or(ExpressionType::Unknown);
                match index_type {
                    ExpressionType::Number | ExpressionType::Unknown => {
                        computed.ty = element.as_ref().clone();
                    }
                    ExpressionType::Range(_) => {
                        computed.ty = ExpressionType::List(element.clone());
                    }
                    other => {
                        self.report(
                            ErrorKind::IndexExpected {
                                found: other.to_string(),
                            },
                            computed.index.span,
                        );
                        computed.ty = element.as_ref().clone();
                    }
                }
            }

            ExpressionType::Unknown => {}

            other => self.report(
                ErrorKind::NotSubscriptable {
                    found: other.to_string(),
                },
                computed.object.span(),
            ),
        }
    }

    /// Bind bracketed type arguments onto an alias's parameters and rebuild
    /// its reference.
    fn apply_type_args(&mut self, alias: &Alias, index: &BracketedExpr) -> Alias {
        let mut applied = alias.clone();
        self.assign_type_args(&mut applied.params, index);

        let outer = self.scope;
        self.push_scope(ScopeKind::Program);
        let scope = self.scope;
        for param in &applied.params {
            self.scopes.add(
                scope,
                &param.name,
                Span::default(),
                ExpressionType::Type(Box::new(ExpressionType::Generic(param.clone()))),
            );
        }
        let (reference, _) = applied.reference.build(&mut self.scopes, scope, None);
        applied.reference = Box::new(reference);
        self.scope = outer;
        applied
    }

    /// Assign the bracketed type arguments to the given parameters,
    /// reporting shape errors.
    fn assign_type_args(
        &mut self,
        params: &mut [crate::types::Generic],
        index: &BracketedExpr,
    ) {
        let args: Vec<&Expr> = match &index.expr {
            None => Vec::new(),
            Some(Expr::Tuple(tuple)) => tuple.elements.iter().collect(),
            Some(other) => vec![other],
        };
        if args.len() > params.len() {
            self.report(
                ErrorKind::TooManyElements {
                    expected: params.len(),
                    received: args.len(),
                },
                index.span,
            );
        }
        let scope = self.scope;
        for (param, arg) in params.iter_mut().zip(args.iter()) {
            match arg.ty() {
                ExpressionType::Type(inner) => {
                    // resolve outer generics now so the value is concrete
                    let (value, _) = inner.build(&mut self.scopes, scope, None);
                    param.value = Some(Box::new(value));
                }
                _ => {
                    self.report(ErrorKind::TypeExpected, arg.span());
                    param.value = Some(Box::new(ExpressionType::Unknown));
                }
            }
        }
    }

    /*  Calls & instances  */

    fn check_call(&mut self, call: &mut CallExpr) {
        self.check_expr(&mut call.callee);
        let callee_type = call.callee.ty();

        let function = match callee_type {
            ExpressionType::Function(function) => function,
            ExpressionType::Unknown => {
                self.check_tuple(&mut call.args);
                call.ty = ExpressionType::Unknown;
                return;
            }
            other => {
                self.report(
                    ErrorKind::FunctionExpected {
                        found: other.to_string(),
                    },
                    call.callee.span(),
                );
                self.check_tuple(&mut call.args);
                call.ty = ExpressionType::Unknown;
                return;
            }
        };

        // a fresh scope holds the callee's type parameters for resolution
        let outer = self.scope;
        self.push_scope(ScopeKind::Program);
        let scope = self.scope;
        for param in &function.type_params {
            self.scopes.add(
                scope,
                &param.name,
                Span::default(),
                ExpressionType::Type(Box::new(ExpressionType::Generic(param.clone()))),
            );
        }

        self.check_tuple(&mut call.args);
        let received = call.args.elements.len();
        let expected = function.arity();
        for (param, arg) in function.params.iter().zip(call.args.elements.iter()) {
            let arg_type = arg.ty();
            let (built, resolved) = param.build(&mut self.scopes, scope, Some(&arg_type));
            if !resolved {
                self.report(ErrorKind::MissingTypeArgs, arg.span());
            }
            if !built.extends(&arg_type) {
                self.report(
                    ErrorKind::CannotAssignType {
                        expected: built.to_string(),
                        received: arg_type.to_string(),
                    },
                    arg.span(),
                );
            }
        }
        if received > expected {
            self.report(
                ErrorKind::TooManyElements {
                    expected,
                    received,
                },
                call.args.span,
            );
        }
        if received < expected {
            self.report(
                ErrorKind::MissingElements {
                    expected,
                    received,
                },
                call.args.span,
            );
        }

        let (returned, resolved) = function.returned.build(&mut self.scopes, scope, None);
        self.scope = outer;
        if resolved {
            call.ty = returned;
        } else {
            let span = call.callee.span().merge(&call.args.span);
            self.report(ErrorKind::MissingTypeArgs, span);
            call.ty = ExpressionType::Unknown;
        }
    }

    fn check_instance(&mut self, instance: &mut InstanceExpr) {
        self.check_expr(&mut instance.typing);
        let typing = instance.typing.ty();
        instance.ty = ExpressionType::Unknown;

        let ExpressionType::Type(inner) = typing else {
            self.report(ErrorKind::TypeExpected, instance.typing.span());
            for arg in &mut instance.args {
                self.check_expr(arg);
            }
            return;
        };

        match *inner {
            ExpressionType::Alias(alias) if alias.name == "Map" => {
                self.check_map_instance(instance, alias);
            }
            ExpressionType::Alias(alias) => match alias.reference.as_ref() {
                ExpressionType::Object(_) => self.check_struct_instance(instance, alias),
                _ => {
                    self.report(
                        ErrorKind::ObjectTypeExpected {
                            found: alias.to_string(),
                        },
                        instance.typing.span(),
                    );
                }
            },
            ExpressionType::List(element) => self.check_list_instance(instance, *element),
            other => {
                self.report(
                    ErrorKind::NotInstanceable {
                        found: other.to_string(),
                    },
                    instance.typing.span(),
                );
            }
        }
    }

    fn check_struct_instance(&mut self, instance: &mut InstanceExpr, alias: Alias) {
        let ExpressionType::Object(object) = alias.reference.as_ref().clone() else {
            return;
        };
        let members = object.flatten();
        let mut given: Vec<String> = Vec::new();

        for arg in &mut instance.args {
            let (key, value): (Option<Identifier>, &mut Expr) = match arg {
                Expr::Entry(entry) => {
                    let key = match &entry.key {
                        Some(Expr::Identifier(identifier)) => Some(identifier.clone()),
                        Some(other) => {
                            let span = other.span();
                            self.report(ErrorKind::IdentifierExpected, span);
                            None
                        }
                        None => None,
                    };
                    (key, &mut entry.value)
                }
                Expr::Param(param) => {
                    let span = param.name.token.span;
                    self.report(
                        ErrorKind::TokenExpected {
                            token: ":".to_string(),
                        },
                        span,
                    );
                    (Some(param.name.clone()), &mut param.typing)
                }
                other => {
                    let span = other.span();
                    self.report(ErrorKind::FieldKeyExpected, span);
                    self.check_expr(other);
                    continue;
                }
            };
            self.check_expr(value);
            let Some(key) = key else { continue };
            let name = key.name().to_string();
            given.push(name.clone());
            match members.iter().find(|m| m.name == name) {
                Some(member) => {
                    let received = value.ty();
                    if !member.typing.extends(&received) {
                        self.report(
                            ErrorKind::CannotAssignType {
                                expected: member.typing.to_string(),
                                received: received.to_string(),
                            },
                            key.token.span.merge(&value.span()),
                        );
                    }
                }
                None => {
                    self.report(
                        ErrorKind::PropertyDoesNotExist {
                            name,
                            parent: alias.to_string(),
                        },
                        key.token.span,
                    );
                }
            }
        }

        // defaults are optional; everything else must be provided
        let default_names: Vec<&str> =
            object.defaults.iter().map(|m| m.name.as_str()).collect();
        let missing: Vec<String> = members
            .iter()
            .filter(|m| !default_names.contains(&m.name.as_str()))
            .filter(|m| !given.contains(&m.name))
            .map(|m| format!("'{}'", m.name))
            .collect();
        if !missing.is_empty() {
            self.report(
                ErrorKind::MissingKeys {
                    keys: missing.join(", "),
                },
                instance.args_span,
            );
        }
        instance.ty = ExpressionType::Alias(alias);
    }

    fn check_map_instance(&mut self, instance: &mut InstanceExpr, alias: Alias) {
        if alias.params.len() < 2 {
            return;
        }
        // normalize entries, then pin the key/value parameters on the first
        let mut first: Option<(ExpressionType, ExpressionType)> = None;
        let mut entries: Vec<(ExpressionType, Span, ExpressionType, Span)> = Vec::new();
        for arg in &mut instance.args {
            match arg {
                Expr::Entry(entry) => {
                    if let Some(Expr::Identifier(identifier)) = &entry.key {
                        let span = identifier.token.span;
                        self.report(ErrorKind::FieldKeyExpected, span);
                        entry.key = None;
                    }
                    if let Some(key) = &mut entry.key {
                        self.check_expr(key);
                    }
                    self.check_expr(&mut entry.value);
                    let key_type = match &entry.key {
                        // a bracketed key denotes its inner expression
                        Some(Expr::List(list)) => list
                            .elements
                            .first()
                            .map(|e| e.ty())
                            .unwrap_or(ExpressionType::Unknown),
                        Some(key) => key.ty(),
                        None => ExpressionType::Unknown,
                    };
                    let key_span = entry
                        .key
                        .as_ref()
                        .map(|k| k.span())
                        .unwrap_or(entry.span);
                    let value_type = entry.value.ty();
                    let value_span = entry.value.span();
                    if first.is_none() {
                        first = Some((key_type.clone(), value_type.clone()));
                    }
                    entries.push((key_type, key_span, value_type, value_span));
                }
                Expr::Param(param) => {
                    let span = param.name.token.span;
                    self.report(
                        ErrorKind::TokenExpected {
                            token: ":".to_string(),
                        },
                        span,
                    );
                    self.check_expr(&mut param.typing);
                }
                other => {
                    let span = other.span();
                    self.report(ErrorKind::FieldKeyExpected, span);
                    self.check_expr(other);
                }
            }
        }

        let outer = self.scope;
        self.push_scope(ScopeKind::Program);
        let scope = self.scope;
        for param in &alias.params {
            self.scopes.add(
                scope,
                &param.name,
                Span::default(),
                ExpressionType::Type(Box::new(ExpressionType::Generic(param.clone()))),
            );
        }
        let (first_key, first_value) = match &first {
            Some((k, v)) => (Some(k), Some(v)),
            None => (None, None),
        };
        let (key_type, key_ok) = ExpressionType::Generic(alias.params[0].clone()).build(
            &mut self.scopes,
            scope,
            first_key,
        );
        let (value_type, value_ok) = ExpressionType::Generic(alias.params[1].clone()).build(
            &mut self.scopes,
            scope,
            first_value,
        );
        self.scope = outer;
        if !key_ok || !value_ok {
            let span = instance.typing.span().merge(&instance.args_span);
            self.report(ErrorKind::MissingTypeArgs, span);
        }

        for (entry_key, key_span, entry_value, value_span) in entries {
            if !key_type.extends(&entry_key) {
                self.report(
                    ErrorKind::CannotAssignType {
                        expected: key_type.to_string(),
                        received: entry_key.to_string(),
                    },
                    key_span,
                );
            }
            if !value_type.extends(&entry_value) {
                self.report(
                    ErrorKind::CannotAssignType {
                        expected: value_type.to_string(),
                        received: entry_value.to_string(),
                    },
                    value_span,
                );
            }
        }

        instance.ty =
            ExpressionType::Alias(builtins::make_map(Some(key_type), Some(value_type)));
    }

    fn check_list_instance(&mut self, instance: &mut InstanceExpr, element: ExpressionType) {
        for arg in &mut instance.args {
            self.check_expr(arg);
        }
        if instance.args.is_empty() {
            instance.ty = ExpressionType::List(Box::new(element));
            return;
        }

        // the element type may be generic; the first element pins it down
        let first_type = instance.args[0].ty();
        let outer = self.scope;
        self.push_scope(ScopeKind::Program);
        let scope = self.scope;
        if let ExpressionType::Alias(alias) = &element {
            for param in &alias.params {
                self.scopes.add(
                    scope,
                    &param.name,
                    Span::default(),
                    ExpressionType::Type(Box::new(ExpressionType::Generic(param.clone()))),
                );
            }
        }
        let (element, _) = element.build(&mut self.scopes, scope, Some(&first_type));
        self.scope = outer;

        for arg in instance.args.iter().skip(1) {
            let received = arg.ty();
            if !element.extends(&received) {
                self.report(
                    ErrorKind::CannotAssignType {
                        expected: element.to_string(),
                        received: received.to_string(),
                    },
                    arg.span(),
                );
            }
        }
        instance.ty = ExpressionType::List(Box::new(element));
    }
}

/// The synthesized type of a sum constructor access. A bare constructor is
/// a value of the alias; a payload-carrying one is a function returning the
/// alias, generic over the alias's parameters.
fn sum_constructor_type(alias: &Alias, member: &SumMember) -> ExpressionType {
    let mut returned = alias.clone();
    for param in returned.params.iter_mut() {
        if param.value.is_none() {
            // refer to the parameter by name so call-site resolution can
            // find it in the instantiation scope
            param.value = Some(Box::new(ExpressionType::Generic(
                crate::types::Generic::named(param.name.clone()),
            )));
        }
    }
    if member.params.is_empty() {
        return ExpressionType::Alias(returned);
    }
    ExpressionType::Function(Function {
        type_params: alias.params.clone(),
        params: member.params.clone(),
        returned: Box::new(ExpressionType::Alias(returned)),
        is_async: false,
    })
}

/// The identifier ultimately referenced by `&expr`, if the expression is
/// referencable at all.
fn referenced_identifier(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Identifier(identifier) => Some(identifier.name()),
        Expr::Property(property) => referenced_identifier(&property.object),
        Expr::Computed(computed) => referenced_identifier(&computed.object),
        Expr::Paren(paren) => paren.expr.as_ref().and_then(referenced_identifier),
        _ => None,
    }
}

