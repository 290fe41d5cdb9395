use crate::node::{PseudoArgument, PseudoKind, PseudoSelector};
use crate::parser::value::ValueContext;
use crate::parser::{Css21, ParseResult};
use crate::token_list::{filter_none, match_close_paren, match_colon, match_open_brace};
use crate::tokenizer::{Token, TokenType};

impl<'a> Css21<'a> {
    /// Parses a pseudo class or pseudo element, starting at its first colon
    pub(crate) fn parse_pseudo_selector(
        &mut self,
        start: &'a Token,
    ) -> ParseResult<Option<PseudoSelector>> {
        log::trace!("parse_pseudo_selector");

        let mut name = start.text.clone();
        let mut kind = PseudoKind::Class;

        let mut next = self.next_token_with(filter_none)?;
        if match_colon(next) {
            kind = PseudoKind::Element;
            name.push_str(&next.text);
            next = self.next_token_with(filter_none)?;
        }

        let mut pseudo = PseudoSelector {
            kind,
            name,
            argument: None,
            location: start.location.clone(),
        };

        match next.token_type {
            TokenType::Ident => {
                pseudo.name.push_str(&next.text);
                Ok(Some(pseudo))
            }
            TokenType::Function => {
                let function = next.text.strip_suffix('(').unwrap_or(&next.text);
                pseudo.name.push_str(function);

                let argument = if function.eq_ignore_ascii_case("not") {
                    self.parse_negation()?
                } else {
                    self.parse_pseudo_arguments()?
                };

                match argument {
                    Some(argument) => {
                        pseudo.argument = Some(argument);
                        Ok(Some(pseudo))
                    }
                    None => {
                        self.unexpected_last()?;
                        Ok(None)
                    }
                }
            }
            _ => {
                self.unexpected_last()?;
                Ok(None)
            }
        }
    }

    /// Arguments of a functional pseudo class, such as the `2n+1` of `:nth-child(2n+1)`
    fn parse_pseudo_arguments(&mut self) -> ParseResult<Option<PseudoArgument>> {
        log::trace!("parse_pseudo_arguments");

        let mut components = Vec::new();
        let mut token = self.next_token()?;
        while !match_close_paren(token) {
            if match_open_brace(token) {
                return Ok(None);
            }
            let construct =
                self.parse_construct(token, match_open_brace, ValueContext::PseudoFunctional)?;
            let Some(construct) = construct else {
                return Ok(None);
            };
            components.push(construct);
            token = self.next_token()?;
        }

        Ok(Some(PseudoArgument::Functional(components)))
    }

    /// The single simple selector of `:not(...)`, followed by the closing parenthesis
    fn parse_negation(&mut self) -> ParseResult<Option<PseudoArgument>> {
        log::trace!("parse_negation");

        let token = self.next_token()?;
        if token.token_type == TokenType::QntyPercentage {
            return Ok(None);
        }

        let Some(selector) = self.parse_simple_selector(token)? else {
            return Ok(None);
        };
        if !match_close_paren(self.next_token()?) {
            return Ok(None);
        }

        Ok(Some(PseudoArgument::Negation(Box::new(selector))))
    }
}
