use crate::errors::CssDiagnostic;
use crate::handler::{ContentHandler, ErrorHandler};
use crate::location::CssLocation;
use crate::parser_config::ParserConfig;
use crate::token_list::{filter_s_cmnt, CssTokenIterator, CssTokenList, TokenFilter};
use crate::tokenizer::Token;
use epubcheck_shared::errors::{CssError, CssResult};
use std::sync::Arc;

mod at_rule;
mod block;
mod declaration;
mod pseudo;
mod rule;
mod selector;
mod selector_list;
mod stylesheet;
mod value;

/// Reasons a grammar routine stops before its construct is complete
#[derive(Debug)]
pub(crate) enum Interrupt {
    /// The token list ran out. The routine that owns the open construct reports it.
    Exhausted,
    /// The token list ran out and the premature end has been reported
    PrematureEof,
    /// The error handler asked to stop
    Abort(CssError),
}

impl From<CssError> for Interrupt {
    fn from(err: CssError) -> Self {
        Interrupt::Abort(err)
    }
}

pub(crate) type ParseResult<T> = Result<T, Interrupt>;

/// Passes diagnostics on to the caller's error handler. With `ignore_errors` set, a request
/// to abort is logged and dropped.
pub(crate) struct ConfiguredErrorHandler<'h> {
    handler: &'h mut dyn ErrorHandler,
    ignore_errors: bool,
}

impl<'h> ConfiguredErrorHandler<'h> {
    pub(crate) fn new(handler: &'h mut dyn ErrorHandler, ignore_errors: bool) -> Self {
        Self {
            handler,
            ignore_errors,
        }
    }
}

impl ErrorHandler for ConfiguredErrorHandler<'_> {
    fn error(&mut self, diagnostic: CssDiagnostic) -> CssResult<()> {
        match self.handler.error(diagnostic) {
            Err(err) if self.ignore_errors => {
                log::warn!("Ignoring error in error handler: {err}");
                Ok(())
            }
            result => result,
        }
    }
}

/// CSS 2.1 grammar parser over a scanned token list. Constructs are reported to the content
/// handler as soon as they are complete.
pub(crate) struct Css21<'a> {
    iter: CssTokenIterator<'a>,
    content: &'a mut dyn ContentHandler,
    errors: &'a mut dyn ErrorHandler,
    config: &'a ParserConfig,
    source_id: Arc<str>,
}

impl<'a> Css21<'a> {
    pub(crate) fn new(
        tokens: &'a CssTokenList,
        content: &'a mut dyn ContentHandler,
        errors: &'a mut dyn ErrorHandler,
        config: &'a ParserConfig,
    ) -> Self {
        Self {
            iter: tokens.cursor(filter_s_cmnt),
            content,
            errors,
            config,
            source_id: Arc::from(config.source_id.as_str()),
        }
    }

    /// Consumes the next token that passes the default filter
    fn next_token(&mut self) -> ParseResult<&'a Token> {
        self.iter.next().ok_or(Interrupt::Exhausted)
    }

    fn next_token_with(&mut self, filter: TokenFilter) -> ParseResult<&'a Token> {
        self.iter.next_with(filter).ok_or(Interrupt::Exhausted)
    }

    fn peek_token(&self) -> ParseResult<&'a Token> {
        self.iter.peek().ok_or(Interrupt::Exhausted)
    }

    fn peek_token_with(&self, filter: TokenFilter) -> ParseResult<&'a Token> {
        self.iter.peek_with(filter).ok_or(Interrupt::Exhausted)
    }

    /// Location of the token most recently consumed, or the start of the input
    fn last_location(&self) -> CssLocation {
        match self.iter.last_token() {
            Some(token) => token.location.clone(),
            None => CssLocation::new(self.source_id.clone(), &self.config.location),
        }
    }

    fn last_text(&self) -> &'a str {
        self.iter.last_token().map(|t| t.text.as_str()).unwrap_or_default()
    }

    fn report(&mut self, diagnostic: CssDiagnostic) -> ParseResult<()> {
        log::debug!("{diagnostic}");
        self.errors.error(diagnostic)?;
        Ok(())
    }

    /// Reports the token most recently consumed as not allowed at its position
    fn unexpected_last(&mut self) -> ParseResult<()> {
        let diagnostic = CssDiagnostic::unexpected_token(self.last_location(), self.last_text());
        self.report(diagnostic)
    }

    fn expecting(&mut self, location: CssLocation, found: &Token, expected: &str) -> ParseResult<()> {
        self.report(CssDiagnostic::expecting_token(location, &found.text, expected))
    }

    /// Reports a premature end of the token list and starts unwinding
    fn premature_eof<T>(&mut self, expected: &str) -> ParseResult<T> {
        let diagnostic = CssDiagnostic::premature_eof(self.last_location(), expected);
        self.report(diagnostic)?;
        Err(Interrupt::PrematureEof)
    }

    /// Turns an exhausted token list into a reported premature end, expecting `expected`
    fn on_exhausted<T>(&mut self, result: ParseResult<T>, expected: &str) -> ParseResult<T> {
        match result {
            Err(Interrupt::Exhausted) => self.premature_eof(expected),
            other => other,
        }
    }
}
