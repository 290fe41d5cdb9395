use crate::node::{Combinator, CombinatorKind, Selector};
use crate::parser::{Css21, ParseResult};
use crate::token_list::{match_comma, match_open_brace};
use crate::tokenizer::Token;

impl<'a> Css21<'a> {
    /// Parses a comma separated selector list up to and including the `{` that opens the
    /// declaration block. A single invalid selector invalidates the whole list.
    pub(crate) fn parse_selector_list(
        &mut self,
        start: &'a Token,
    ) -> ParseResult<Option<Vec<Selector>>> {
        log::trace!("parse_selector_list");

        let mut selectors = Vec::new();
        let mut start = start;

        loop {
            let mut selector = Selector::new(start.location.clone());

            let at_block = loop {
                let Some(sequence) = self.parse_simple_selector_sequence(start)? else {
                    return Ok(None);
                };
                selector.push_sequence(sequence);

                let index = self.iter.index();
                start = self.next_token()?;

                if match_open_brace(start) {
                    break true;
                }
                if match_comma(start) {
                    break false;
                }

                if let Some(kind) = start.char_value().and_then(CombinatorKind::from_char) {
                    selector.push_combinator(Combinator {
                        kind,
                        location: start.location.clone(),
                    });
                    start = self.next_token()?;
                } else if self.followed_by_whitespace(index) {
                    selector.push_combinator(Combinator {
                        kind: CombinatorKind::Descendant,
                        location: start.location.clone(),
                    });
                } else {
                    self.unexpected_last()?;
                    return Ok(None);
                }
            };

            selectors.push(selector);
            if at_block {
                break;
            }
            start = self.next_token()?;
        }

        Ok(Some(selectors))
    }

    /// Returns true when the raw token after `index` is whitespace
    fn followed_by_whitespace(&self, index: Option<usize>) -> bool {
        index
            .and_then(|i| self.iter.get(i + 1))
            .is_some_and(|t| t.is_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use crate::handler::{DiagnosticCollector, EventRecorder};
    use crate::node::{CombinatorKind, SelectorPart};
    use crate::parser_config::ParserConfig;
    use crate::CssParser;
    use test_case::test_case;

    fn parse(css: &str) -> (EventRecorder, usize) {
        let parser = CssParser::new(ParserConfig::default());
        let mut events = EventRecorder::new();
        let mut errors = DiagnosticCollector::new();
        parser.parse_stylesheet(css, &mut events, &mut errors).unwrap();
        (events, errors.len())
    }

    #[test_case("A B {}", CombinatorKind::Descendant)]
    #[test_case("A > B {}", CombinatorKind::Child; "child with spaces")]
    #[test_case("A>B {}", CombinatorKind::Child; "child without spaces")]
    #[test_case("A + B {}", CombinatorKind::AdjacentSibling)]
    #[test_case("A~B {}", CombinatorKind::GeneralSibling)]
    fn test_combinators(css: &str, kind: CombinatorKind) {
        let (events, errors) = parse(css);
        assert_eq!(errors, 0);

        let selectors = events.selector_lists().next().unwrap();
        assert_eq!(selectors.len(), 1);
        assert_eq!(selectors[0].parts.len(), 3);
        assert!(matches!(&selectors[0].parts[1], SelectorPart::Combinator(c) if c.kind == kind));
    }

    #[test]
    fn test_selector_list() {
        let (events, errors) = parse("E1 , E2 E3,E4 {}");
        assert_eq!(errors, 0);

        let selectors = events.selector_lists().next().unwrap();
        let rendered: Vec<String> = selectors.iter().map(|s| s.to_css_string()).collect();
        assert_eq!(rendered, vec!["E1", "E2 E3", "E4"]);
    }

    #[test_case("E1,E2, {}"; "trailing comma")]
    #[test_case(",E1,E2 {}"; "leading comma")]
    #[test_case("E1,E2 $ {}"; "stray dollar")]
    #[test_case("E1 E2 % {}"; "stray percent")]
    fn test_invalid_selector_list(css: &str) {
        let (events, errors) = parse(css);
        assert_eq!(errors, 1);
        assert_eq!(events.selector_lists().count(), 0);
    }
}
