use epubcheck_css::location::NO_SOURCE_ID;
use epubcheck_css::tokenizer::{quote_string, scan_str};
use epubcheck_css::{CssErrorCode, CssParser, DiagnosticCollector, ParserConfig, TokenType};
use test_case::test_case;

fn scan(css: &str) -> Vec<(TokenType, String)> {
    let mut errors = DiagnosticCollector::new();
    scan_str(css, NO_SOURCE_ID, &mut errors)
        .unwrap()
        .iter()
        .map(|t| (t.token_type, t.text.clone()))
        .collect()
}

#[test]
fn cdc_after_ident() {
    assert_eq!(
        scan("red-->"),
        vec![
            (TokenType::Ident, "red--".to_string()),
            (TokenType::Char, ">".to_string()),
        ]
    );
}

#[test]
fn dimension_is_one_token() {
    assert_eq!(
        scan("10em10em"),
        vec![(TokenType::QntyDimen, "10em10em".to_string())]
    );
}

/// Canonical text of a token, with the delimiters the scanner strips put back
fn render(token_type: TokenType, text: &str) -> String {
    match token_type {
        TokenType::QuotedString => quote_string(text),
        TokenType::Comment => format!("/*{text}*/"),
        _ => text.to_string(),
    }
}

#[test_case("a.b > #c[d|='e'] { f: url( \"g.png\" ) 10PX \\41 bc; }"; "selectors and escapes")]
#[test_case(r#"p::after { content: "it's" 'say "hi"' "a\"b" 'c\'d' }"#; "quotes inside strings")]
#[test_case(r#"div { background: url("it's.png") url(plain.png) url( 'x y.png' ) }"#; "uris")]
#[test_case("li:nth-child(2n+1), a[href$='.pdf'] { margin: -1.5em +2px 0 .5% ! important }"; "numbers")]
#[test_case("@font-face { unicode-range: U+0-7F, U+4??; src: local(Foo) format('woff') }"; "functions and ranges")]
#[test_case("<!-- /* note */ @media screen and (max-width: 30em) { p { x: y } } -->"; "comments and cdo")]
fn rescanning_canonical_text(css: &str) {
    let first = scan(css);
    let canonical: String = first
        .iter()
        .map(|(token_type, text)| render(*token_type, text))
        .collect();

    assert_eq!(scan(&canonical), first, "{canonical}");
}

#[test]
fn scanner_diagnostics_reach_handler() {
    let parser = CssParser::new(ParserConfig::stylesheet("broken.css"));
    let mut errors = DiagnosticCollector::new();
    let tokens = parser.scan("/* open", &mut errors).unwrap();

    assert_eq!(tokens.len(), 1);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.diagnostics[0].code, CssErrorCode::ScannerPrematureEof);
    assert_eq!(errors.diagnostics[0].location.to_string(), "broken.css:1:8");
    assert_eq!(tokens.tokens()[0].errors, errors.diagnostics);
}

#[test]
fn empty_input_has_no_tokens() {
    assert!(scan("").is_empty());
    assert_eq!(scan(" \n ").len(), 1);
}
