//! CSS 2.1 scanner and grammar parser used to validate the stylesheets and `style` attributes
//! of EPUB publications.
//!
//! The scanner turns the input into a flat token list. The parser walks that list and reports
//! every complete construct (at-rules, rule sets and declarations) to a [`ContentHandler`] and
//! every problem to an [`ErrorHandler`]. Malformed input never stops the parse: invalid
//! constructs are skipped and parsing resumes at the next construct.
use crate::parser::{ConfiguredErrorHandler, Css21};
use crate::parser_config::Context;
use crate::tokenizer::Tokenizer;
use epubcheck_shared::byte_stream::CharStream;
use epubcheck_shared::errors::CssResult;

pub mod errors;
pub mod handler;
pub mod input_stream;
pub mod location;
pub mod node;
mod parser;
pub mod parser_config;
pub mod token_list;
pub mod tokenizer;
mod unicode;
pub mod walker;

pub use errors::{CssDiagnostic, CssErrorCode};
pub use handler::{
    ContentHandler, DiagnosticCollector, ErrorHandler, EventRecorder, FailFastErrorHandler,
    ForgivingErrorHandler, NoopContentHandler, ParseEvent,
};
pub use input_stream::{sniff, CssSource, Sniffed};
pub use location::CssLocation;
pub use parser_config::ParserConfig;
pub use token_list::CssTokenList;
pub use tokenizer::{Token, TokenType};

/// Entry point for scanning and parsing CSS with a given configuration
#[derive(Clone, Debug, Default)]
pub struct CssParser {
    config: ParserConfig,
}

impl CssParser {
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Scans the text into tokens without parsing them
    pub fn scan(&self, css: &str, errors: &mut dyn ErrorHandler) -> CssResult<CssTokenList> {
        let mut errors = ConfiguredErrorHandler::new(errors, self.config.ignore_errors);
        self.tokenize(css, &mut errors)
    }

    /// Parses the text with the grammar selected by the configured context
    pub fn parse(
        &self,
        css: &str,
        content: &mut dyn ContentHandler,
        errors: &mut dyn ErrorHandler,
    ) -> CssResult<()> {
        self.run(css, self.config.context, content, errors)
    }

    /// Parses a complete stylesheet
    pub fn parse_stylesheet(
        &self,
        css: &str,
        content: &mut dyn ContentHandler,
        errors: &mut dyn ErrorHandler,
    ) -> CssResult<()> {
        self.run(css, Context::Stylesheet, content, errors)
    }

    /// Parses the declarations of a `style` attribute
    pub fn parse_style_attribute(
        &self,
        css: &str,
        content: &mut dyn ContentHandler,
        errors: &mut dyn ErrorHandler,
    ) -> CssResult<()> {
        self.run(css, Context::StyleAttribute, content, errors)
    }

    /// Decodes the raw bytes of a stylesheet and parses them. Locations are reported with the
    /// id of the source.
    pub fn parse_source(
        &self,
        source: &CssSource,
        content: &mut dyn ContentHandler,
        errors: &mut dyn ErrorHandler,
    ) -> CssResult<()> {
        let css = source.decode()?;

        let parser = CssParser::new(ParserConfig {
            source_id: source.source_id().to_string(),
            ..self.config.clone()
        });
        parser.parse_stylesheet(&css, content, errors)
    }

    fn tokenize(&self, css: &str, errors: &mut dyn ErrorHandler) -> CssResult<CssTokenList> {
        let mut stream = CharStream::new(self.config.location.clone());
        stream.read_from_str(css);

        Tokenizer::new(&mut stream, &self.config.source_id).scan(errors)
    }

    fn run(
        &self,
        css: &str,
        context: Context,
        content: &mut dyn ContentHandler,
        errors: &mut dyn ErrorHandler,
    ) -> CssResult<()> {
        log::debug!("parsing {} as {:?}", self.config.source_id, context);

        let mut errors = ConfiguredErrorHandler::new(errors, self.config.ignore_errors);
        let tokens = self.tokenize(css, &mut errors)?;

        let mut parser = Css21::new(&tokens, content, &mut errors, &self.config);
        match context {
            Context::Stylesheet => parser.parse_stylesheet(),
            Context::StyleAttribute => parser.parse_style_attribute(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epubcheck_shared::byte_stream::Location;

    #[test]
    fn parse_dispatches_on_context() {
        let parser = CssParser::new(ParserConfig::style_attribute("doc.xhtml", Location::default()));
        let mut events = EventRecorder::new();
        let mut errors = DiagnosticCollector::new();
        parser.parse("color: red", &mut events, &mut errors).unwrap();

        assert!(errors.is_empty());
        assert_eq!(events.declarations().count(), 1);
        assert_eq!(events.selector_lists().count(), 0);
    }

    #[test]
    fn locations_start_at_configured_location() {
        let parser = CssParser::new(ParserConfig::style_attribute(
            "doc.xhtml",
            Location::new(12, 20, 300),
        ));
        let mut events = EventRecorder::new();
        let mut errors = DiagnosticCollector::new();
        parser
            .parse_style_attribute("color: red; : x", &mut events, &mut errors)
            .unwrap();

        let declaration = events.declarations().next().unwrap();
        assert_eq!(declaration.location.to_string(), "doc.xhtml:12:20");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.diagnostics[0].location.to_string(), "doc.xhtml:12:32");
    }

    #[test]
    fn aborting_error_handler_stops_parse() {
        let parser = CssParser::default();
        let mut events = EventRecorder::new();
        let result = parser.parse_stylesheet("E { : x } F { a: b }", &mut events, &mut FailFastErrorHandler);

        assert!(result.is_err());
        assert_eq!(events.declarations().count(), 0);
    }

    #[test]
    fn ignore_errors_keeps_going() {
        let parser = CssParser::new(ParserConfig {
            ignore_errors: true,
            ..ParserConfig::default()
        });
        let mut events = EventRecorder::new();
        let result = parser.parse_stylesheet("E { : x } F { a: b }", &mut events, &mut FailFastErrorHandler);

        assert!(result.is_ok());
        assert_eq!(events.declarations().count(), 1);
        assert_eq!(events.events.last(), Some(&ParseEvent::EndDocument));
    }

    #[test]
    fn parse_source_uses_source_id() {
        let source = CssSource::new("OEBPS/style.css", b"\xEF\xBB\xBFp { : x }".to_vec());
        let mut events = EventRecorder::new();
        let mut errors = DiagnosticCollector::new();
        CssParser::default()
            .parse_source(&source, &mut events, &mut errors)
            .unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.diagnostics[0].location.to_string(), "OEBPS/style.css:1:5");
    }
}
