use crate::parser::{Css21, Interrupt};
use crate::token_list::{filter_s_cmnt_cdo_cdc, match_semi};
use crate::tokenizer::TokenType;
use epubcheck_shared::errors::CssResult;

impl Css21<'_> {
    /// Parses the token list as a stylesheet: a sequence of at-rules and rule sets
    pub(crate) fn parse_stylesheet(&mut self) -> CssResult<()> {
        log::trace!("parse_stylesheet");

        self.content.start_document();

        while let Some(token) = self.iter.next_with(filter_s_cmnt_cdo_cdc) {
            let result = if token.token_type == TokenType::AtKeyword {
                self.parse_at_rule(token)
            } else {
                self.parse_rule_set(token)
            };

            match result {
                Ok(()) => {}
                Err(Interrupt::Exhausted | Interrupt::PrematureEof) => break,
                Err(Interrupt::Abort(err)) => return Err(err),
            }
        }

        self.content.end_document();
        Ok(())
    }

    /// Parses the token list as the contents of a `style` attribute: declarations separated
    /// by semicolons, without braces. The first invalid declaration ends the parse.
    pub(crate) fn parse_style_attribute(&mut self) -> CssResult<()> {
        log::trace!("parse_style_attribute");

        self.content.start_document();

        while let Some(token) = self.iter.next() {
            if match_semi(token) {
                continue;
            }

            match self.parse_declaration(token, true) {
                Ok(Some(declaration)) => self.content.declaration(&declaration),
                Ok(None) => return Ok(()),
                Err(Interrupt::Exhausted | Interrupt::PrematureEof) => break,
                Err(Interrupt::Abort(err)) => return Err(err),
            }
        }

        self.content.end_document();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::handler::{DiagnosticCollector, EventRecorder};
    use crate::parser_config::ParserConfig;
    use crate::walker::Walker;
    use crate::CssParser;

    macro_rules! test {
        ($input:expr, $expected:expr, $errors:expr) => {
            let parser = CssParser::new(ParserConfig::default());
            let mut events = EventRecorder::new();
            let mut errors = DiagnosticCollector::new();
            parser
                .parse_stylesheet($input, &mut events, &mut errors)
                .unwrap();

            let w = Walker::new(&events.events);
            assert_eq!(w.walk_to_string(), $expected);
            assert_eq!(errors.len(), $errors, "{:?}", errors.diagnostics);
        };
    }

    #[test]
    fn test_parse_stylesheet() {
        test!(
            "body { color: red }",
            "[Document]\n  [RuleSet (1)] body\n    [Declaration] color : red ;\n",
            0
        );
        test!("", "[Document]\n", 0);
        test!(
            "<!-- p{} --> q{}",
            "[Document]\n  [RuleSet (1)] p\n  [RuleSet (1)] q\n",
            0
        );
        test!(
            "@import url(a.css); p { margin: 0 }",
            "[Document]\n  [AtRule] @import url(a.css)\n  [RuleSet (1)] p\n    [Declaration] margin : 0 ;\n",
            0
        );
    }

    #[test]
    fn test_premature_end() {
        test!("E { color: red", "[Document]\n  [RuleSet (1)] E\n", 1);
        test!("E ", "[Document]\n", 1);
    }

    #[test]
    fn test_parse_style_attribute() {
        let parser = CssParser::new(ParserConfig::style_attribute(
            "doc.xhtml",
            Default::default(),
        ));
        let mut events = EventRecorder::new();
        let mut errors = DiagnosticCollector::new();
        parser
            .parse_style_attribute(" color:black; color:green; color : blue ; ", &mut events, &mut errors)
            .unwrap();

        let w = Walker::new(&events.events);
        assert_eq!(
            w.walk_to_string(),
            "[Document]\n  [Declaration] color : black ;\n  [Declaration] color : green ;\n  [Declaration] color : blue ;\n"
        );
        assert!(errors.is_empty());
    }
}
