use shall_ast::{ExprKind, StmtKind};
use shall_parsing::lexer::Lexer;
use shall_parsing::parse;
use shall_tokens::token::TokenTag;
use test_log::test;

static PROGRAM: &str = r#"
declare a : int = 2.
declare b : int = 3.

fn scale(x : double, factor : double) : double {
    shall result : double = x * factor.
    return result
}

a + b.
"#;

#[test]
fn parse_whole_program() {
    let parsed = parse(PROGRAM);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    let tags = parsed
        .program
        .statements
        .iter()
        .map(|stmt| <&'static str>::from(&stmt.kind))
        .collect::<Vec<_>>();
    assert_eq!(tags, ["Shall", "Shall", "Function", "Expression"]);
    assert!(parsed.program.function("scale").is_some());
}

#[test]
fn token_stream_ends_with_single_eof() {
    let tokens = Lexer::new(PROGRAM).collect::<Vec<_>>();
    let eofs = tokens
        .iter()
        .filter(|token| token.tag() == TokenTag::Eof)
        .count();
    assert_eq!(eofs, 1);
    assert_eq!(tokens.last().map(|t| t.tag()), Some(TokenTag::Eof));
    assert_eq!(tokens.last().map(|t| t.line()), Some(11));
}

#[test]
fn errors_render_with_source() {
    let source = "shall a : int = 1\n2.";
    let parsed = parse(source);
    assert_eq!(parsed.errors.len(), 1);
    let report = parsed.errors[0].with_source(source).to_string();
    assert!(report.starts_with("expected next token to be Dot, got Integer(2) instead"));
    assert!(report.contains("2:0"), "{report}");
}

#[test]
fn expression_values_survive_parsing() {
    let parsed = parse("12,75.");
    let StmtKind::Expression(expr) = &parsed.program.statements[0].kind else {
        panic!("expected expression")
    };
    assert_eq!(expr.kind, ExprKind::Double(12.75));
}
