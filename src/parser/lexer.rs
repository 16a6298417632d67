//! Lexer for the Quill programming language
//!
//! Produces the token stream consumed by the parser. Quill is line-oriented,
//! so newlines are tokens rather than trivia; the parser discards them
//! explicitly where the grammar allows.

use logos::Logos;

use crate::parser::span::{Position, Span};

/// Token types for Quill
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    // Keywords
    #[token("if")]
    IfKeyword,
    #[token("else")]
    ElseKeyword,
    #[token("match")]
    MatchKeyword,
    #[token("case")]
    CaseKeyword,
    #[token("for")]
    ForKeyword,
    #[token("in")]
    InKeyword,
    #[token("break")]
    BreakKeyword,
    #[token("continue")]
    ContinueKeyword,
    #[token("return")]
    ReturnKeyword,
    #[token("try")]
    TryKeyword,
    #[token("throw")]
    ThrowKeyword,
    #[token("catch")]
    CatchKeyword,
    #[token("async")]
    AsyncKeyword,
    #[token("await")]
    AwaitKeyword,
    #[token("use")]
    UseKeyword,
    #[token("from")]
    FromKeyword,
    #[token("as")]
    AsKeyword,

    // Type keywords
    #[token("number")]
    NumberKeyword,
    #[token("string")]
    StringKeyword,
    #[token("boolean")]
    BooleanKeyword,

    // Literals
    #[token("true")]
    #[token("false")]
    BooleanLiteral,
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    NumberLiteral,
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral,
    #[regex(r"[a-zA-Z][a-zA-Z0-9]*|_")]
    Name,

    // Operators
    #[token("+")]
    Add,
    #[token("++")]
    Concat,
    #[token("-")]
    Sub,
    #[token("*")]
    Mul,
    #[token("**")]
    Pow,
    #[token("/")]
    Div,
    #[token("%")]
    Mod,
    #[token("&&")]
    LogicalAnd,
    #[token("||")]
    LogicalOr,
    #[token("!")]
    Bang,
    #[token("&")]
    BinaryAnd,
    #[token("|")]
    BinaryOr,
    #[token("?")]
    QuestionMark,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("==")]
    Equal,
    #[token("!=")]
    NotEqual,
    #[token("::")]
    Define,
    #[token(":=")]
    Declare,
    #[token("=")]
    Assign,
    #[token("..")]
    ExclusiveRange,
    #[token("..=")]
    InclusiveRange,
    #[token("->")]
    SlimArrow,
    #[token("=>")]
    FatArrow,
    #[token("+=")]
    AddAssign,
    #[token("++=")]
    ConcatAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("**=")]
    PowAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    ModAssign,
    #[token("&&=")]
    LogicalAndAssign,
    #[token("||=")]
    LogicalOrAssign,

    // Punctuation
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("(")]
    LeftParenthesis,
    #[token(")")]
    RightParenthesis,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    #[regex(r"\n")]
    Eol,

    // Synthetic kinds, never produced by the logos patterns
    Eof,
    Illegal,
}

/// A classified piece of source text with its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    /// The end-of-input sentinel. Never an error: the parser stops on it.
    fn eof(at: Position) -> Self {
        Token {
            kind: TokenKind::Eof,
            text: String::new(),
            span: Span::new(at, at),
        }
    }
}

/// An ordered token sequence with single-token lookahead.
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenStream {
    /// Tokenize a whole source text.
    pub fn new(source: &str) -> Self {
        let line_starts: Vec<usize> = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        let position = |offset: usize| -> Position {
            let line = line_starts.partition_point(|&start| start <= offset);
            let column = offset - line_starts[line - 1] + 1;
            Position::new(line, column)
        };

        let mut tokens = Vec::new();
        let mut lexer = TokenKind::lexer(source);
        while let Some(result) = lexer.next() {
            let range = lexer.span();
            let kind = result.unwrap_or(TokenKind::Illegal);
            tokens.push(Token {
                kind,
                text: lexer.slice().to_string(),
                span: Span::new(position(range.start), position(range.end)),
            });
        }
        tokens.push(Token::eof(position(source.len())));

        Self { tokens, cursor: 0 }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> &Token {
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    /// Consume and return the next token.
    pub fn consume(&mut self) -> Token {
        let token = self.tokens[self.cursor.min(self.tokens.len() - 1)].clone();
        if self.cursor < self.tokens.len() - 1 {
            self.cursor += 1;
        }
        token
    }

    /// Skip any run of line breaks.
    pub fn discard_line_breaks(&mut self) {
        while self.peek().kind == TokenKind::Eol {
            self.consume();
        }
    }

    /// Look at the first token past any run of line breaks, without
    /// consuming anything.
    pub fn peek_past_line_breaks(&self) -> &Token {
        let mut cursor = self.cursor;
        while cursor < self.tokens.len() - 1 && self.tokens[cursor].kind == TokenKind::Eol {
            cursor += 1;
        }
        &self.tokens[cursor]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut stream = TokenStream::new(source);
        let mut kinds = Vec::new();
        loop {
            let token = stream.consume();
            if token.kind == TokenKind::Eof {
                break;
            }
            kinds.push(token.kind);
        }
        kinds
    }

    #[test]
    fn lexes_declaration() {
        use TokenKind::*;
        assert_eq!(
            kinds("n := 42\n"),
            vec![Name, Declare, NumberLiteral, Eol]
        );
    }

    #[test]
    fn longest_operator_wins() {
        use TokenKind::*;
        assert_eq!(kinds("a ++= b"), vec![Name, ConcatAssign, Name]);
        assert_eq!(kinds("a **= b"), vec![Name, PowAssign, Name]);
        assert_eq!(kinds("0..=10"), vec![NumberLiteral, InclusiveRange, NumberLiteral]);
        assert_eq!(kinds("0..10"), vec![NumberLiteral, ExclusiveRange, NumberLiteral]);
    }

    #[test]
    fn keywords_are_not_names() {
        use TokenKind::*;
        assert_eq!(
            kinds("for x in xs"),
            vec![ForKeyword, Name, InKeyword, Name]
        );
        assert_eq!(kinds("forx"), vec![Name]);
    }

    #[test]
    fn string_literals_allow_escapes() {
        let mut stream = TokenStream::new(r#""a \"quoted\" part""#);
        let token = stream.consume();
        assert_eq!(token.kind, TokenKind::StringLiteral);
        assert_eq!(token.text, r#""a \"quoted\" part""#);
    }

    #[test]
    fn spans_are_one_based() {
        let mut stream = TokenStream::new("a\n  b");
        let a = stream.consume();
        assert_eq!(a.span.start, Position::new(1, 1));
        stream.discard_line_breaks();
        let b = stream.consume();
        assert_eq!(b.span.start, Position::new(2, 3));
    }

    #[test]
    fn eof_is_a_sentinel_not_an_error() {
        let mut stream = TokenStream::new("");
        assert_eq!(stream.peek().kind, TokenKind::Eof);
        // consuming past the end keeps yielding EOF
        assert_eq!(stream.consume().kind, TokenKind::Eof);
        assert_eq!(stream.consume().kind, TokenKind::Eof);
    }

    #[test]
    fn underscore_is_a_name() {
        assert_eq!(kinds("_"), vec![TokenKind::Name]);
    }
}
