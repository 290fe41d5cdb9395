//! Callbacks the parser reports its findings to
use crate::errors::CssDiagnostic;
use crate::node::{AtRule, Declaration, Selector};
use epubcheck_shared::errors::{CssError, CssResult};

/// Receives the constructs of a stylesheet or style attribute in document order
pub trait ContentHandler {
    fn start_document(&mut self) {}

    fn end_document(&mut self) {}

    fn start_at_rule(&mut self, _at_rule: &AtRule) {}

    fn end_at_rule(&mut self, _name: &str) {}

    /// Start of a rule set with the given selector list
    fn selectors(&mut self, _selectors: &[Selector]) {}

    fn end_selectors(&mut self, _selectors: &[Selector]) {}

    fn declaration(&mut self, _declaration: &Declaration) {}
}

/// Receives every diagnostic. Returning an error aborts the parse.
pub trait ErrorHandler {
    fn error(&mut self, diagnostic: CssDiagnostic) -> CssResult<()>;
}

/// Content handler that ignores everything
#[derive(Debug, Default)]
pub struct NoopContentHandler;

impl ContentHandler for NoopContentHandler {}

/// Keeps every diagnostic it receives
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    pub diagnostics: Vec<CssDiagnostic>,
}

impl DiagnosticCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl ErrorHandler for DiagnosticCollector {
    fn error(&mut self, diagnostic: CssDiagnostic) -> CssResult<()> {
        self.diagnostics.push(diagnostic);
        Ok(())
    }
}

/// Logs each diagnostic and carries on
#[derive(Debug, Default)]
pub struct ForgivingErrorHandler;

impl ErrorHandler for ForgivingErrorHandler {
    fn error(&mut self, diagnostic: CssDiagnostic) -> CssResult<()> {
        log::debug!("{diagnostic}");
        Ok(())
    }
}

/// Aborts the parse on the first diagnostic
#[derive(Debug, Default)]
pub struct FailFastErrorHandler;

impl ErrorHandler for FailFastErrorHandler {
    fn error(&mut self, diagnostic: CssDiagnostic) -> CssResult<()> {
        Err(CssError::with_location(
            &format!("{} {}", diagnostic.code, diagnostic.message),
            diagnostic.location.location(),
        ))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParseEvent {
    StartDocument,
    EndDocument,
    StartAtRule(AtRule),
    EndAtRule(String),
    Selectors(Vec<Selector>),
    EndSelectors(Vec<Selector>),
    Declaration(Declaration),
}

/// Content handler that records each callback as a [`ParseEvent`]
#[derive(Debug, Default)]
pub struct EventRecorder {
    pub events: Vec<ParseEvent>,
}

impl EventRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All declarations, in document order
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.events.iter().filter_map(|event| match event {
            ParseEvent::Declaration(declaration) => Some(declaration),
            _ => None,
        })
    }

    /// Selector lists of all rule sets, in document order
    pub fn selector_lists(&self) -> impl Iterator<Item = &[Selector]> {
        self.events.iter().filter_map(|event| match event {
            ParseEvent::Selectors(selectors) => Some(selectors.as_slice()),
            _ => None,
        })
    }

    pub fn at_rules(&self) -> impl Iterator<Item = &AtRule> {
        self.events.iter().filter_map(|event| match event {
            ParseEvent::StartAtRule(at_rule) => Some(at_rule),
            _ => None,
        })
    }
}

impl ContentHandler for EventRecorder {
    fn start_document(&mut self) {
        self.events.push(ParseEvent::StartDocument);
    }

    fn end_document(&mut self) {
        self.events.push(ParseEvent::EndDocument);
    }

    fn start_at_rule(&mut self, at_rule: &AtRule) {
        self.events.push(ParseEvent::StartAtRule(at_rule.clone()));
    }

    fn end_at_rule(&mut self, name: &str) {
        self.events.push(ParseEvent::EndAtRule(name.to_string()));
    }

    fn selectors(&mut self, selectors: &[Selector]) {
        self.events.push(ParseEvent::Selectors(selectors.to_vec()));
    }

    fn end_selectors(&mut self, selectors: &[Selector]) {
        self.events.push(ParseEvent::EndSelectors(selectors.to_vec()));
    }

    fn declaration(&mut self, declaration: &Declaration) {
        self.events.push(ParseEvent::Declaration(declaration.clone()));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::CssErrorCode;
    use crate::location::CssLocation;

    fn diagnostic() -> CssDiagnostic {
        CssDiagnostic::unexpected_token(CssLocation::default(), "}")
    }

    #[test]
    fn collector_keeps_diagnostics() {
        let mut collector = DiagnosticCollector::new();
        assert!(collector.error(diagnostic()).is_ok());
        assert!(collector.error(diagnostic()).is_ok());

        assert_eq!(collector.len(), 2);
        assert_eq!(
            collector.diagnostics[0].code,
            CssErrorCode::GrammarUnexpectedToken
        );
    }

    #[test]
    fn fail_fast_aborts() {
        let mut handler = FailFastErrorHandler;
        let err = handler.error(diagnostic()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "GRAMMAR_UNEXPECTED_TOKEN Token '}' not allowed here at (1:1)"
        );
        assert!(ForgivingErrorHandler.error(diagnostic()).is_ok());
    }

    #[test]
    fn recorder_filters_events() {
        let mut recorder = EventRecorder::new();
        recorder.start_document();
        recorder.start_at_rule(&AtRule::new("@page", CssLocation::default()));
        recorder.declaration(&Declaration::new("margin", CssLocation::default()));
        recorder.end_at_rule("@page");
        recorder.end_document();

        assert_eq!(recorder.events.len(), 5);
        assert_eq!(recorder.declarations().count(), 1);
        assert_eq!(recorder.at_rules().map(|a| a.name.as_str()).collect::<Vec<_>>(), vec!["@page"]);
        assert_eq!(recorder.selector_lists().count(), 0);
        assert_eq!(recorder.events[3], ParseEvent::EndAtRule("@page".to_string()));
    }
}
