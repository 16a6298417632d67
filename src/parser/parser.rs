//! The Quill parser
//!
//! A recursive-descent parser fused with the type checker: the caller pulls
//! top-level statements one at a time, and each statement resolves its types
//! and scope effects immediately after being built. Errors are reported into
//! the diagnostic bag and replaced by placeholders, so a malformed program
//! still yields a best-effort tree.

use crate::diagnostics::{DiagnosticBag, ErrorKind};
use crate::parser::ast::*;
use crate::parser::lexer::{Token, TokenKind, TokenStream};
use crate::parser::span::Span;
use crate::scope::{ScopeArena, ScopeId, ScopeKind};
use crate::types::ExpressionType;

pub struct Parser {
    tokens: TokenStream,
    pub(crate) scopes: ScopeArena,
    pub(crate) scope: ScopeId,
    top_scope: ScopeId,
    pub(crate) diagnostics: DiagnosticBag,
    // contextual flags, saved and restored around sub-parses
    pub(crate) allow_brace: bool,
    pub(crate) allow_empty: bool,
    pub(crate) allow_call: bool,
    pub(crate) multiline: bool,
    // don't parse expressions like `identifier: value`
    pub(crate) prevent_colon: bool,
    // true while checking the pattern side of an assignment
    pub(crate) writing: bool,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        let scope = scopes.push(ScopeKind::Program, root);
        Self {
            tokens: TokenStream::new(source),
            scopes,
            scope,
            top_scope: scope,
            diagnostics: DiagnosticBag::new(),
            allow_brace: true,
            allow_empty: false,
            allow_call: true,
            multiline: false,
            prevent_colon: false,
            writing: false,
        }
    }

    pub(crate) fn report(&mut self, kind: ErrorKind, span: Span) {
        self.diagnostics.report(kind, span);
    }

    pub(crate) fn peek(&self) -> &Token {
        self.tokens.peek()
    }

    pub(crate) fn consume(&mut self) -> Token {
        self.tokens.consume()
    }

    pub(crate) fn discard_line_breaks(&mut self) {
        self.tokens.discard_line_breaks();
    }

    pub(crate) fn peek_past_line_breaks(&self) -> &Token {
        self.tokens.peek_past_line_breaks()
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Skip tokens until the given kind, a line break, or EOF.
    /// Returns true if the target was found.
    pub(crate) fn recover_to(&mut self, kind: TokenKind) -> bool {
        let start = self.peek().span;
        let mut end = start;
        while !self.at(kind) && !self.at(TokenKind::Eol) && !self.at(TokenKind::Eof) {
            end = self.consume().span;
        }
        self.report(
            ErrorKind::TokenExpected {
                token: kind_text(kind).to_string(),
            },
            start.merge(&end),
        );
        self.at(kind)
    }

    pub(crate) fn push_scope(&mut self, kind: ScopeKind) {
        self.scope = self.scopes.push(kind, self.scope);
    }

    /// Pop the current scope. Any variable never read in it is reported as
    /// unused; this is the pop-time side effect of the symbol table.
    pub(crate) fn drop_scope(&mut self) {
        for (name, span) in self.scopes.unused(self.scope) {
            self.report(ErrorKind::UnusedVariable { name }, span);
        }
        self.scope = self
            .scopes
            .parent(self.scope)
            .unwrap_or_else(|| self.scopes.root());
    }

    /// Parse and check the whole token stream.
    pub fn parse_program(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        loop {
            self.discard_line_breaks();
            if self.at(TokenKind::Eof) {
                break;
            }
            let mut statement = self.parse_statement();
            self.check_stmt(&mut statement);
            statements.push(statement);

            if !self.at(TokenKind::Eol) && !self.at(TokenKind::Eof) {
                let start = self.peek().span;
                let mut end = start;
                while !self.at(TokenKind::Eol) && !self.at(TokenKind::Eof) {
                    end = self.consume().span;
                }
                self.report(
                    ErrorKind::TokenExpected {
                        token: "end of line".to_string(),
                    },
                    start.merge(&end),
                );
            }
        }
        self.drop_scope();
        statements
    }

    pub fn diagnostics(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (ScopeArena, DiagnosticBag, ScopeId) {
        (self.scopes, self.diagnostics, self.top_scope)
    }

    /*  Statements  */

    pub(crate) fn parse_statement(&mut self) -> Stmt {
        match self.peek().kind {
            TokenKind::BreakKeyword
            | TokenKind::ContinueKeyword
            | TokenKind::ReturnKeyword
            | TokenKind::ThrowKeyword => self.parse_exit(),
            TokenKind::UseKeyword => self.parse_use_directive(),
            _ => self.parse_assignment(),
        }
    }

    fn parse_assignment(&mut self) -> Stmt {
        let expr = self.parse_expression();
        let next = self.peek().kind;
        if !is_assignment_operator(next) {
            return match expr {
                Some(expr) => Stmt::Expr(expr),
                None => {
                    let span = self.peek().span;
                    self.report(ErrorKind::ExpressionExpected, span);
                    // skip the offending token so parsing can make progress
                    self.consume();
                    Stmt::Expr(Expr::Missing(span))
                }
            };
        }
        let operator = self.consume();
        let pattern = match expr {
            Some(expr) if operator.kind != TokenKind::Define => unwrap_paren(expr),
            Some(expr) => expr,
            None => {
                self.report(ErrorKind::ExpressionExpected, operator.span);
                Expr::Missing(operator.span)
            }
        };
        // `Name :: { ... }` defines an object type, not a block
        let value = if operator.kind == TokenKind::Define && self.at(TokenKind::LeftBrace) {
            Expr::Braced(Box::new(self.parse_braced()))
        } else {
            match self.parse_expression() {
                Some(value) => value,
                None => {
                    let span = self.peek().span;
                    self.report(ErrorKind::ExpressionExpected, span);
                    Expr::Missing(span)
                }
            }
        };
        Stmt::Assignment(Box::new(Assignment {
            pattern,
            value,
            operator,
        }))
    }

    fn parse_exit(&mut self) -> Stmt {
        let keyword = self.consume();
        let value = if self.at(TokenKind::Eol)
            || self.at(TokenKind::Eof)
            || self.at(TokenKind::RightBrace)
        {
            None
        } else {
            self.parse_expression()
        };
        Stmt::Exit(Box::new(ExitStmt { keyword, value }))
    }

    fn parse_use_directive(&mut self) -> Stmt {
        let start = self.consume().span; // 'use'
        let mut star = false;
        if self.at(TokenKind::Mul) {
            self.consume();
            star = true;
            if !self.at(TokenKind::AsKeyword) {
                self.recover_to(TokenKind::AsKeyword);
            }
            if self.at(TokenKind::AsKeyword) {
                self.consume();
            }
        }
        let names = self.parse_expression().map(unwrap_paren);
        if !self.at(TokenKind::FromKeyword) {
            self.recover_to(TokenKind::FromKeyword);
        }
        if self.at(TokenKind::FromKeyword) {
            self.consume();
        }
        let source_expr = self.parse_expression();
        let mut end = start;
        let source = match source_expr {
            Some(Expr::Literal(literal))
                if literal.token.kind == TokenKind::StringLiteral =>
            {
                end = literal.token.span;
                Some(literal)
            }
            Some(other) => {
                self.report(ErrorKind::StringLiteralExpected, other.span());
                end = other.span();
                None
            }
            None => {
                let span = self.peek().span;
                self.report(ErrorKind::StringLiteralExpected, span);
                None
            }
        };

        let mut directive = UseDirective {
            names,
            star,
            source,
            span: start.merge(&end),
        };
        self.validate_use_names(&mut directive);
        Stmt::Use(Box::new(directive))
    }

    fn validate_use_names(&mut self, directive: &mut UseDirective) {
        match &mut directive.names {
            Some(Expr::Identifier(_)) => {}
            Some(Expr::Tuple(tuple)) if !directive.star => {
                for element in &tuple.elements {
                    if !matches!(element, Expr::Identifier(_)) {
                        self.report(ErrorKind::IdentifierExpected, element.span());
                    }
                }
            }
            Some(other) => {
                self.report(ErrorKind::IdentifierExpected, other.span());
                directive.names = None;
            }
            None => {
                self.report(ErrorKind::IdentifierExpected, directive.span);
            }
        }
    }

    /*  Statement checking  */

    pub(crate) fn check_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Expr(expr) => self.check_expr(expr),
            Stmt::Assignment(assignment) => self.check_assignment(assignment),
            Stmt::Exit(exit) => self.check_exit(exit),
            Stmt::Use(directive) => self.check_use(directive),
        }
    }

    fn check_assignment(&mut self, assignment: &mut Assignment) {
        match assignment.operator.kind {
            TokenKind::Declare => self.check_declaration(assignment),
            TokenKind::Define => self.check_definition(assignment),
            TokenKind::Assign => self.check_plain_assignment(assignment),
            _ => self.check_compound_assignment(assignment),
        }
    }

    /// `pattern := value` — a fresh declaration.
    fn check_declaration(&mut self, assignment: &mut Assignment) {
        self.check_expr(&mut assignment.value);
        let value_type = assignment.value.ty();
        if matches!(value_type, ExpressionType::Nil) {
            self.report(ErrorKind::VoidAssignment, assignment.value.span());
        }
        if let ExpressionType::Alias(alias) = &value_type {
            if alias.name == "Result" {
                self.report(ErrorKind::ResultDeclaration, assignment.value.span());
            }
        }

        match &assignment.pattern {
            Expr::Identifier(identifier) => {
                self.declare_identifier(identifier, &assignment.value, value_type);
            }
            Expr::Tuple(tuple) => {
                let ExpressionType::Tuple(value_types) = &value_type else {
                    self.report(ErrorKind::InvalidPattern, assignment.pattern.span());
                    return;
                };
                if tuple.elements.len() > value_types.len() {
                    self.report(
                        ErrorKind::TooManyElements {
                            expected: value_types.len(),
                            received: tuple.elements.len(),
                        },
                        assignment.pattern.span(),
                    );
                } else if tuple.elements.len() < value_types.len() {
                    self.report(
                        ErrorKind::MissingElements {
                            expected: value_types.len(),
                            received: tuple.elements.len(),
                        },
                        assignment.pattern.span(),
                    );
                }
                for (element, element_type) in tuple.elements.iter().zip(value_types.iter()) {
                    match element {
                        Expr::Identifier(identifier) => {
                            self.declare_identifier(
                                identifier,
                                &assignment.value,
                                element_type.clone(),
                            );
                        }
                        other => self.report(ErrorKind::IdentifierExpected, other.span()),
                    }
                }
            }
            other => self.report(ErrorKind::InvalidPattern, other.span()),
        }
    }

    fn declare_identifier(
        &mut self,
        identifier: &Identifier,
        value: &Expr,
        typing: ExpressionType,
    ) {
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
        if identifier.is_type() && !typing.is_type() {
            self.report(ErrorKind::TypeExpected, value.span());
        }
        if !identifier.is_type() && typing.is_type() {
            self.report(ErrorKind::ValueExpected, value.span());
        }
        self.scopes
            .add(self.scope, name, identifier.token.span, typing);
    }

    /// `pattern = value` — assignment to an existing binding.
    fn check_plain_assignment(&mut self, assignment: &mut Assignment) {
        self.check_expr(&mut assignment.value);
        self.writing = true;
        self.check_expr(&mut assignment.pattern);
        self.writing = false;

        match &assignment.pattern {
            Expr::Literal(literal) => {
                self.report(ErrorKind::IdentifierExpected, literal.token.span);
                return;
            }
            Expr::Tuple(tuple) => {
                for element in &tuple.elements {
                    if !matches!(element, Expr::Identifier(_)) {
                        self.report(ErrorKind::IdentifierExpected, element.span());
                    }
                }
            }
            Expr::Identifier(_) | Expr::Property(_) | Expr::Computed(_) => {}
            other => {
                self.report(ErrorKind::InvalidPattern, other.span());
                return;
            }
        }

        let expected = assignment.pattern.ty();
        let received = assignment.value.ty();
        if !expected.extends(&received) {
            let span = assignment.pattern.span().merge(&assignment.value.span());
            self.report(
                ErrorKind::CannotAssignType {
                    expected: expected.to_string(),
                    received: received.to_string(),
                },
                span,
            );
        }
    }

    /// `pattern op= value` — compound assignment reusing the binary rules.
    fn check_compound_assignment(&mut self, assignment: &mut Assignment) {
        self.check_expr(&mut assignment.value);
        self.writing = true;
        self.check_expr(&mut assignment.pattern);
        self.writing = false;
        // a compound assignment also reads its target
        if let Expr::Identifier(identifier) = &assignment.pattern {
            let span = identifier.token.span;
            if let Some(variable) = self.scopes.find_mut(self.scope, identifier.name()) {
                variable.read_at(span);
            }
        }

        let pattern_type = assignment.pattern.ty();
        let value_type = assignment.value.ty();
        match assignment.operator.kind {
            TokenKind::AddAssign
            | TokenKind::SubAssign
            | TokenKind::MulAssign
            | TokenKind::PowAssign
            | TokenKind::DivAssign
            | TokenKind::ModAssign => {
                if !ExpressionType::Number.extends(&pattern_type) {
                    self.report(
                        ErrorKind::NumberExpected {
                            found: pattern_type.to_string(),
                        },
                        assignment.pattern.span(),
                    );
                }
                if !ExpressionType::Number.extends(&value_type) {
                    self.report(
                        ErrorKind::NumberExpected {
                            found: value_type.to_string(),
                        },
                        assignment.value.span(),
                    );
                }
            }
            TokenKind::ConcatAssign => {
                self.check_concat_operands(
                    &pattern_type,
                    assignment.pattern.span(),
                    &value_type,
                    assignment.value.span(),
                );
            }
            TokenKind::LogicalAndAssign | TokenKind::LogicalOrAssign => {
                if !ExpressionType::Boolean.extends(&pattern_type) {
                    self.report(
                        ErrorKind::BooleanExpected {
                            found: pattern_type.to_string(),
                        },
                        assignment.pattern.span(),
                    );
                }
                if !ExpressionType::Boolean.extends(&value_type) {
                    self.report(
                        ErrorKind::BooleanExpected {
                            found: value_type.to_string(),
                        },
                        assignment.value.span(),
                    );
                }
            }
            _ => unreachable!("not a compound assignment operator"),
        }
    }

    fn check_exit(&mut self, exit: &mut ExitStmt) {
        if let Some(value) = &mut exit.value {
            self.check_expr(value);
        }
        match exit.keyword.kind {
            TokenKind::ContinueKeyword => {
                if let Some(value) = &exit.value {
                    self.report(ErrorKind::UnexpectedExpression, value.span());
                }
            }
            TokenKind::ThrowKeyword => {
                if exit.value.is_none() {
                    self.report(ErrorKind::ExpressionExpected, exit.keyword.span.after());
                }
            }
            _ => {}
        }

        let span = exit.span();
        let in_loop = self.scopes.is_in(self.scope, ScopeKind::Loop);
        let in_function = self.scopes.is_in(self.scope, ScopeKind::Function);
        match exit.keyword.kind {
            TokenKind::BreakKeyword if !in_loop => self.report(ErrorKind::IllegalBreak, span),
            TokenKind::ContinueKeyword if !in_loop => {
                self.report(ErrorKind::IllegalContinue, span)
            }
            TokenKind::ReturnKeyword if !in_function => {
                self.report(ErrorKind::IllegalReturn, span)
            }
            TokenKind::ThrowKeyword if !in_function => self.report(ErrorKind::IllegalThrow, span),
            _ => {}
        }
    }

    fn check_use(&mut self, directive: &mut UseDirective) {
        let Some(source) = &directive.source else {
            return;
        };
        let path = source.token.text.trim_matches('"').to_string();
        let module = crate::types::builtins::find_module(&path);
        if module.is_none() {
            self.report(ErrorKind::CannotResolvePath { path }, source.token.span);
        }

        if directive.star {
            if let Some(Expr::Identifier(identifier)) = &directive.names {
                self.scopes.add(
                    self.scope,
                    identifier.name(),
                    identifier.token.span,
                    module.unwrap_or(ExpressionType::Unknown),
                );
            }
            return;
        }

        let names: Vec<&Identifier> = match &directive.names {
            Some(Expr::Identifier(identifier)) => vec![identifier],
            Some(Expr::Tuple(tuple)) => tuple
                .elements
                .iter()
                .filter_map(|e| match e {
                    Expr::Identifier(identifier) => Some(identifier),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        let mut additions = Vec::new();
        for identifier in names {
            let typing = match &module {
                Some(ExpressionType::Object(object)) => {
                    match object.get_owned(identifier.name()) {
                        Some(typing) => typing.clone(),
                        None => {
                            additions.push((
                                identifier.name().to_string(),
                                identifier.token.span,
                                ExpressionType::Unknown,
                            ));
                            self.report(
                                ErrorKind::NotInModule {
                                    name: identifier.name().to_string(),
                                },
                                identifier.token.span,
                            );
                            continue;
                        }
                    }
                }
                _ => ExpressionType::Unknown,
            };
            additions.push((identifier.name().to_string(), identifier.token.span, typing));
        }
        for (name, span, typing) in additions {
            self.scopes.add(self.scope, &name, span, typing);
        }
    }
}

pub(crate) fn is_assignment_operator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Assign
            | TokenKind::Declare
            | TokenKind::Define
            | TokenKind::AddAssign
            | TokenKind::ConcatAssign
            | TokenKind::SubAssign
            | TokenKind::MulAssign
            | TokenKind::PowAssign
            | TokenKind::DivAssign
            | TokenKind::ModAssign
            | TokenKind::LogicalAndAssign
            | TokenKind::LogicalOrAssign
    )
}

/// Unwrap parenthesized expressions down to their content.
pub(crate) fn unwrap_paren(expr: Expr) -> Expr {
    match expr {
        Expr::Paren(paren) => match paren.expr {
            Some(inner) => unwrap_paren(inner),
            None => Expr::Paren(Box::new(ParenExpr {
                expr: None,
                span: paren.span,
            })),
        },
        other => other,
    }
}

pub(crate) fn kind_text(kind: TokenKind) -> &'static str {
    use TokenKind::*;
    match kind {
        LeftBracket => "[",
        RightBracket => "]",
        LeftParenthesis => "(",
        RightParenthesis => ")",
        LeftBrace => "{",
        RightBrace => "}",
        Comma => ",",
        Colon => ":",
        Dot => ".",
        Assign => "=",
        Declare => ":=",
        Define => "::",
        SlimArrow => "->",
        FatArrow => "=>",
        CaseKeyword => "case",
        InKeyword => "in",
        AsKeyword => "as",
        FromKeyword => "from",
        Eol => "end of line",
        _ => "token",
    }
}
