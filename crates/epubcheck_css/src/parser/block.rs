use crate::node::Declaration;
use crate::parser::{Css21, ParseResult};
use crate::token_list::{match_close_brace, match_semi, match_semi_close_brace};
use crate::tokenizer::Token;

impl<'a> Css21<'a> {
    /// Parses the declarations of a block, starting at the first token after the `{`. An
    /// invalid declaration is skipped up to the next `;` or `}`.
    pub(crate) fn parse_declaration_block(&mut self, start: &'a Token) -> ParseResult<()> {
        log::trace!("parse_declaration_block");

        let mut start = start;
        loop {
            if match_close_brace(start) {
                return Ok(());
            }

            let declaration = self.parse_declaration(start, false)?;
            let step = self.next_declaration_start(declaration);
            match self.on_exhausted(step, "';' or '}'")? {
                Some(next) => start = next,
                None => return Ok(()),
            }
        }
    }

    /// Reports a parsed declaration and finds the token the next one starts at. Returns
    /// `None` when the block is closed.
    fn next_declaration_start(
        &mut self,
        declaration: Option<Declaration>,
    ) -> ParseResult<Option<&'a Token>> {
        let Some(declaration) = declaration else {
            let token = self.next_token_with(match_semi_close_brace)?;
            log::trace!("skipped invalid declaration up to {:?}", token.location);
            if match_semi(token) {
                return Ok(Some(self.next_token()?));
            }
            return Ok(Some(token));
        };

        self.content.declaration(&declaration);

        let last = self.iter.last_token();
        if last.is_some_and(match_close_brace) {
            return Ok(None);
        }
        if last.is_some_and(match_semi) && match_close_brace(self.peek_token()?) {
            self.next_token()?;
            return Ok(None);
        }
        Ok(Some(self.next_token()?))
    }
}

#[cfg(test)]
mod tests {
    use crate::handler::{DiagnosticCollector, EventRecorder};
    use crate::parser_config::ParserConfig;
    use crate::CssParser;

    fn parse(css: &str) -> (Vec<String>, usize) {
        let parser = CssParser::new(ParserConfig::default());
        let mut events = EventRecorder::new();
        let mut errors = DiagnosticCollector::new();
        parser.parse_stylesheet(css, &mut events, &mut errors).unwrap();

        let declarations = events
            .declarations()
            .map(|d| d.to_css_string())
            .collect();
        (declarations, errors.len())
    }

    #[test]
    fn test_declaration_block() {
        let (declarations, errors) = parse("E { a: 1; b: 2 }");
        assert_eq!(declarations, vec!["a : 1 ;", "b : 2 ;"]);
        assert_eq!(errors, 0);

        // an empty declaration is invalid and takes the next one with it
        let (declarations, errors) = parse("E { a: 1;; b: 2 }");
        assert_eq!(declarations, vec!["a : 1 ;"]);
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_block_recovery() {
        let (declarations, errors) = parse(" E {{ p1 : v1 ; p2 : v2; }");
        assert_eq!(declarations, vec!["p2 : v2 ;"]);
        assert_eq!(errors, 1);

        let (declarations, errors) = parse("E { foo : {23 } E2 {foo2:bar}");
        assert_eq!(declarations, vec!["foo2 : bar ;"]);
        assert_eq!(errors, 1);

        let (declarations, errors) = parse(" E { name1 : ; name2 : value2 }");
        assert!(declarations.is_empty());
        assert_eq!(errors, 1);
    }
}
