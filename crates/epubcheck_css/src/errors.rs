//! Diagnostics reported by the scanner and the grammar parser
use crate::location::CssLocation;
use serde::Serialize;
use std::fmt;

/// Identifies the kind of problem a diagnostic reports. The scanner codes are attached to tokens,
/// the grammar codes are reported while building constructs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CssErrorCode {
    ScannerIllegalSyntax,
    ScannerIllegalChar,
    ScannerMalformedEscape,
    ScannerIllegalUrange,
    ScannerPrematureEof,
    GrammarPrematureEof,
    GrammarUnexpectedToken,
    GrammarExpectingToken,
}

impl CssErrorCode {
    /// Stable message key of this code
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            CssErrorCode::ScannerIllegalSyntax => "css.scanner.token.syntax",
            CssErrorCode::ScannerIllegalChar => "css.scanner.token.syntax.char",
            CssErrorCode::ScannerMalformedEscape => "css.scanner.token.syntax.escape",
            CssErrorCode::ScannerIllegalUrange => "css.scanner.token.syntax.urange",
            CssErrorCode::ScannerPrematureEof => "css.scanner.prematureEOF",
            CssErrorCode::GrammarPrematureEof => "css.grammar.prematureEOF",
            CssErrorCode::GrammarUnexpectedToken => "css.grammar.token.unexpected",
            CssErrorCode::GrammarExpectingToken => "css.grammar.token.expecting",
        }
    }

    /// Name of this code, in the form `SCANNER_ILLEGAL_CHAR`
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CssErrorCode::ScannerIllegalSyntax => "SCANNER_ILLEGAL_SYNTAX",
            CssErrorCode::ScannerIllegalChar => "SCANNER_ILLEGAL_CHAR",
            CssErrorCode::ScannerMalformedEscape => "SCANNER_MALFORMED_ESCAPE",
            CssErrorCode::ScannerIllegalUrange => "SCANNER_ILLEGAL_URANGE",
            CssErrorCode::ScannerPrematureEof => "SCANNER_PREMATURE_EOF",
            CssErrorCode::GrammarPrematureEof => "GRAMMAR_PREMATURE_EOF",
            CssErrorCode::GrammarUnexpectedToken => "GRAMMAR_UNEXPECTED_TOKEN",
            CssErrorCode::GrammarExpectingToken => "GRAMMAR_EXPECTING_TOKEN",
        }
    }

    /// Returns true for codes raised while tokenizing
    #[must_use]
    pub fn is_scanner_error(&self) -> bool {
        matches!(
            self,
            CssErrorCode::ScannerIllegalSyntax
                | CssErrorCode::ScannerIllegalChar
                | CssErrorCode::ScannerMalformedEscape
                | CssErrorCode::ScannerPrematureEof
                | CssErrorCode::ScannerIllegalUrange
        )
    }
}

impl fmt::Display for CssErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single problem found in the CSS, with the location it applies to
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CssDiagnostic {
    pub code: CssErrorCode,
    pub location: CssLocation,
    pub message: String,
}

impl CssDiagnostic {
    pub fn new(code: CssErrorCode, location: CssLocation, message: impl Into<String>) -> Self {
        Self {
            code,
            location,
            message: message.into(),
        }
    }

    /// A token that is not allowed at this position
    #[must_use]
    pub fn unexpected_token(location: CssLocation, found: &str) -> Self {
        Self::new(
            CssErrorCode::GrammarUnexpectedToken,
            location,
            format!("Token '{found}' not allowed here"),
        )
    }

    /// Another token was expected at this position. `expected` is a human readable description,
    /// such as `a property name` or `':'`.
    #[must_use]
    pub fn expecting_token(location: CssLocation, found: &str, expected: &str) -> Self {
        Self::new(
            CssErrorCode::GrammarExpectingToken,
            location,
            format!("Found '{found}' while expecting {expected}"),
        )
    }

    /// The token list ended while a construct was still open
    #[must_use]
    pub fn premature_eof(location: CssLocation, expected: &str) -> Self {
        Self::new(
            CssErrorCode::GrammarPrematureEof,
            location,
            format!("Premature end of file, expecting {expected}"),
        )
    }

    #[must_use]
    pub fn scanner_eof(location: CssLocation) -> Self {
        Self::new(
            CssErrorCode::ScannerPrematureEof,
            location,
            "Premature end of file while scanning token",
        )
    }

    #[must_use]
    pub fn illegal_char(location: CssLocation, found: &str, context: &str) -> Self {
        Self::new(
            CssErrorCode::ScannerIllegalChar,
            location,
            format!("Illegal character {found} in {context}"),
        )
    }

    #[must_use]
    pub fn illegal_syntax(location: CssLocation, found: &str) -> Self {
        Self::new(
            CssErrorCode::ScannerIllegalSyntax,
            location,
            format!("Illegal syntax in token '{found}'"),
        )
    }

    #[must_use]
    pub fn malformed_escape(location: CssLocation, sequence: &str) -> Self {
        Self::new(
            CssErrorCode::ScannerMalformedEscape,
            location,
            format!("Escape '{sequence}' does not denote a valid character"),
        )
    }

    #[must_use]
    pub fn illegal_urange(location: CssLocation, found: &str) -> Self {
        Self::new(
            CssErrorCode::ScannerIllegalUrange,
            location,
            format!("Illegal unicode range '{found}'"),
        )
    }
}

impl fmt::Display for CssDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.location, self.code, self.message)
    }
}
