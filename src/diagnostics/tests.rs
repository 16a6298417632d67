use super::*;
use crate::parser::span::Position;

fn span(line: usize, column: usize) -> Span {
    Span::new(Position::new(line, column), Position::new(line, column + 1))
}

#[test]
fn severity_derived_from_kind() {
    let err = Diagnostic::new(ErrorKind::ExpressionExpected, span(1, 1));
    assert_eq!(err.severity, Severity::Error);

    let warn = Diagnostic::new(
        ErrorKind::UnusedVariable {
            name: "n".to_string(),
        },
        span(1, 1),
    );
    assert_eq!(warn.severity, Severity::Warning);
}

#[test]
fn bag_counts_errors_and_warnings() {
    let mut bag = DiagnosticBag::new();
    assert!(!bag.has_errors());

    bag.report(ErrorKind::UnreachableCode, span(2, 1));
    assert!(!bag.has_errors());
    assert_eq!(bag.warning_count(), 1);

    bag.report(
        ErrorKind::CannotFind {
            name: "x".to_string(),
        },
        span(3, 5),
    );
    assert!(bag.has_errors());
    assert_eq!(bag.error_count(), 1);
    assert_eq!(bag.len(), 2);
}

#[test]
fn messages_interpolate_payloads() {
    let d = Diagnostic::new(
        ErrorKind::CannotAssignType {
            expected: "number".to_string(),
            received: "string".to_string(),
        },
        span(1, 1),
    );
    assert_eq!(
        d.message(),
        "Cannot use value of type string as type number"
    );
    assert_eq!(d.kind.code(), "E117");
}

#[test]
fn render_points_at_one_based_position() {
    let d = Diagnostic::new(
        ErrorKind::TokenExpected {
            token: "}".to_string(),
        },
        span(4, 7),
    );
    let text = d.render("main.qu");
    assert!(text.contains("error[E001]: '}' expected"));
    assert!(text.contains("main.qu:4:7"));
}

#[test]
fn json_round_trip() {
    let d = Diagnostic::new(
        ErrorKind::DuplicateIdentifier {
            name: "x".to_string(),
        },
        span(2, 3),
    );
    let json = d.to_json();
    let back: Diagnostic = serde_json::from_str(&json).expect("round trip");
    assert_eq!(back, d);
}

#[test]
fn bags_merge_in_order() {
    let mut a = DiagnosticBag::new();
    a.report(ErrorKind::ExpressionExpected, span(1, 1));
    let mut b = DiagnosticBag::new();
    b.report(ErrorKind::UnreachableCode, span(2, 1));
    a.merge(b);
    assert_eq!(a.len(), 2);
    assert_eq!(a.diagnostics()[0].kind, ErrorKind::ExpressionExpected);
    assert_eq!(a.diagnostics()[1].kind, ErrorKind::UnreachableCode);
}
