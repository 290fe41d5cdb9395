use crate::parser::{Css21, Interrupt, ParseResult};
use crate::token_list::match_close_brace;
use crate::tokenizer::Token;

impl<'a> Css21<'a> {
    /// Parses a rule set: a selector list followed by a declaration block. When the selector
    /// list is invalid, everything up to the next `}` is skipped.
    pub(crate) fn parse_rule_set(&mut self, start: &'a Token) -> ParseResult<()> {
        log::trace!("parse_rule_set");

        let selectors = match self.parse_selector_list(start) {
            Ok(selectors) => selectors,
            Err(Interrupt::Exhausted) => return self.premature_eof("'{'"),
            Err(err) => return Err(err),
        };

        let Some(selectors) = selectors else {
            let skipped = self.next_token_with(match_close_brace);
            let token = self.on_exhausted(skipped, "'}'")?;
            log::trace!("skipped invalid rule set up to {:?}", token.location);
            return Ok(());
        };

        self.content.selectors(&selectors);

        let block = match self.next_token() {
            Ok(start) => self.parse_declaration_block(start),
            Err(err) => Err(err),
        };
        self.on_exhausted(block, "'}'")?;

        self.content.end_selectors(&selectors);
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
    fn test_parse_rule_set() {
        test!(
            "body { }",
            "[Document]\n  [RuleSet (1)] body\n",
            0
        );
        test!(
            "h1, h2 > a { font-weight: bold; }",
            "[Document]\n  [RuleSet (2)] h1, h2>a\n    [Declaration] font-weight : bold ;\n",
            0
        );
    }

    #[test]
    fn test_invalid_selector_skips_rule_set() {
        test!(
            "E1,E2, {n:v} F {n2:v2}",
            "[Document]\n  [RuleSet (1)] F\n    [Declaration] n2 : v2 ;\n",
            1
        );
        // the skip stops at the first closing brace, so the stray one takes the next rule set
        test!("$ { a { b: c } } F {n:v}", "[Document]\n", 2);
    }
}
