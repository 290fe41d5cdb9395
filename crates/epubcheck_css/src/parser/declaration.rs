use crate::node::Declaration;
use crate::parser::value::ValueContext;
use crate::parser::{Css21, ParseResult};
use crate::token_list::{match_close_brace, match_colon, match_semi, match_semi_close_brace};
use crate::tokenizer::{Token, TokenType};

impl<'a> Css21<'a> {
    /// Parses a single `name : value [!important]` declaration starting at `name`. Returns
    /// `None` after reporting an invalid declaration; the caller decides how to resynchronize.
    pub(crate) fn parse_declaration(
        &mut self,
        name: &'a Token,
        is_style_attribute: bool,
    ) -> ParseResult<Option<Declaration>> {
        log::trace!("parse_declaration");

        if !name.is_ident() {
            self.expecting(name.location.clone(), name, "a property name")?;
            return Ok(None);
        }

        let mut declaration = Declaration::new(&name.text, name.location.clone());

        let colon = self.next_token();
        let colon = self.on_exhausted(colon, "':'")?;
        if !match_colon(colon) {
            self.expecting(name.location.clone(), colon, "':'")?;
            return Ok(None);
        }

        let result = self.parse_declaration_value(&mut declaration, is_style_attribute);
        match self.on_exhausted(result, "';' or '}'")? {
            true => Ok(Some(declaration)),
            false => Ok(None),
        }
    }

    fn parse_declaration_value(
        &mut self,
        declaration: &mut Declaration,
        is_style_attribute: bool,
    ) -> ParseResult<bool> {
        loop {
            let value = self.next_token()?;
            if match_semi_close_brace(value) {
                if declaration.components.is_empty() {
                    self.expecting(self.last_location(), value, "a property value")?;
                    return Ok(false);
                }
                return Ok(true);
            }

            if !self.parse_property_value(declaration, value, is_style_attribute)? {
                self.unexpected_last()?;
                return Ok(false);
            }

            if is_style_attribute && !self.iter.has_next() {
                return Ok(true);
            }
        }
    }

    /// Collects value components into the declaration until the next token ends the value.
    /// Returns false when a component can not be built.
    fn parse_property_value(
        &mut self,
        declaration: &mut Declaration,
        start: &'a Token,
        is_style_attribute: bool,
    ) -> ParseResult<bool> {
        log::trace!("parse_property_value");

        let mut start = start;
        loop {
            if start.token_type == TokenType::Important {
                declaration.important = true;
            } else {
                let construct = self.parse_construct(
                    start,
                    match_semi_close_brace,
                    ValueContext::PropertyValue,
                )?;
                match construct {
                    Some(construct) => declaration.components.push(construct),
                    None => return Ok(false),
                }
            }

            if (is_style_attribute && !self.iter.has_next())
                || match_semi(self.peek_token()?)
                || (!is_style_attribute && match_close_brace(self.peek_token()?))
            {
                return Ok(!declaration.components.is_empty());
            }

            start = self.next_token()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::CssErrorCode;
    use crate::handler::{DiagnosticCollector, EventRecorder};
    use crate::parser_config::ParserConfig;
    use crate::CssParser;
    use epubcheck_shared::byte_stream::Location;

    fn parse_style(css: &str) -> (EventRecorder, DiagnosticCollector) {
        let parser = CssParser::new(ParserConfig::style_attribute("doc", Location::default()));
        let mut events = EventRecorder::new();
        let mut errors = DiagnosticCollector::new();
        parser
            .parse_style_attribute(css, &mut events, &mut errors)
            .unwrap();
        (events, errors)
    }

    fn parse_sheet(css: &str) -> (EventRecorder, DiagnosticCollector) {
        let parser = CssParser::new(ParserConfig::default());
        let mut events = EventRecorder::new();
        let mut errors = DiagnosticCollector::new();
        parser.parse_stylesheet(css, &mut events, &mut errors).unwrap();
        (events, errors)
    }

    #[test]
    fn test_declaration_values() {
        let (events, errors) = parse_sheet("E { Font-Family: \"Times\", serif !important }");
        let declaration = events.declarations().next().unwrap();
        assert_eq!(declaration.name, "font-family");
        assert!(declaration.important);
        assert_eq!(declaration.components.len(), 3);
        assert_eq!(
            declaration.to_css_string(),
            "font-family : 'Times' , serif !important ;"
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_invalid_names() {
        let (events, errors) = parse_style("{color:black}");
        assert_eq!(events.declarations().count(), 0);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.diagnostics[0].code, CssErrorCode::GrammarExpectingToken);

        let (_, errors) = parse_style(": color");
        assert_eq!(errors.diagnostics[0].code, CssErrorCode::GrammarExpectingToken);
    }

    #[test]
    fn test_missing_colon() {
        let (events, errors) = parse_style("color");
        assert_eq!(events.declarations().count(), 0);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.diagnostics[0].code, CssErrorCode::GrammarPrematureEof);

        let (_, errors) = parse_sheet("E { color red }");
        assert_eq!(errors.diagnostics[0].code, CssErrorCode::GrammarExpectingToken);
        assert_eq!(errors.diagnostics[0].location.column, 5);
    }

    #[test]
    fn test_style_attribute_values() {
        let (events, errors) = parse_style(";font-size:83%;");
        assert_eq!(events.declarations().count(), 1);
        assert!(errors.is_empty());

        let (events, errors) = parse_style(" color:black !important");
        let declaration = events.declarations().next().unwrap();
        assert!(declaration.important);
        assert!(errors.is_empty());
    }
}
