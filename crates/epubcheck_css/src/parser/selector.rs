use crate::node::{
    Atom, AttributeMatch, AttributeMatchKind, AttributeSelector, Quantity, QuantityUnit,
    SimpleSelector, SimpleSelectorSequence, TypeSelector,
};
use crate::parser::value::ValueContext;
use crate::parser::{Css21, ParseResult};
use crate::token_list::{
    filter_none, match_close_bracket, match_combinator_char, match_comma, match_open_brace,
    match_pipe, match_star,
};
use crate::tokenizer::{Token, TokenType};
use crate::CssDiagnostic;

impl<'a> Css21<'a> {
    /// Parses simple selectors for as long as they are not separated by whitespace, a comma,
    /// a `{` or a combinator
    pub(crate) fn parse_simple_selector_sequence(
        &mut self,
        start: &'a Token,
    ) -> ParseResult<Option<SimpleSelectorSequence>> {
        log::trace!("parse_simple_selector_sequence");

        let mut sequence = SimpleSelectorSequence::new(start.location.clone());
        let Some(selector) = self.parse_simple_selector(start)? else {
            return Ok(None);
        };
        sequence.selectors.push(selector);

        let mut next = self.peek_token_with(filter_none)?;
        while !next.is_whitespace()
            && !match_comma(next)
            && !match_open_brace(next)
            && !match_combinator_char(next)
        {
            let token = self.next_token_with(filter_none)?;
            let Some(selector) = self.parse_simple_selector(token)? else {
                return Ok(None);
            };
            sequence.selectors.push(selector);
            next = self.peek_token_with(filter_none)?;
        }

        Ok(Some(sequence))
    }

    pub(crate) fn parse_simple_selector(
        &mut self,
        start: &'a Token,
    ) -> ParseResult<Option<SimpleSelector>> {
        log::trace!("parse_simple_selector");

        match start.token_type {
            TokenType::Ident => {
                return Ok(self.parse_type_selector(start)?.map(SimpleSelector::Type));
            }
            TokenType::HashName => {
                let id = Atom::new(&start.text, start.location.clone());
                return Ok(Some(SimpleSelector::Id(id)));
            }
            TokenType::QntyPercentage => {
                return Ok(Some(SimpleSelector::KeyframePercentage(Quantity {
                    value: start.text.clone(),
                    unit: QuantityUnit::Percentage,
                    location: start.location.clone(),
                })));
            }
            _ => {}
        }

        match start.char_value() {
            Some('*' | '|') => Ok(self.parse_type_selector(start)?.map(SimpleSelector::Type)),
            Some('.') => {
                let next = self.peek_token_with(filter_none)?;
                if !next.is_ident() {
                    self.report(CssDiagnostic::unexpected_token(
                        start.location.clone(),
                        &start.text,
                    ))?;
                    return Ok(None);
                }
                let name = self.next_token_with(filter_none)?;
                let class = Atom::new(&format!(".{}", name.text), start.location.clone());
                Ok(Some(SimpleSelector::Class(class)))
            }
            Some('[') => {
                let name = self.next_token()?;
                Ok(self
                    .parse_attribute_selector(start, name)?
                    .map(SimpleSelector::Attribute))
            }
            Some(':') => Ok(self.parse_pseudo_selector(start)?.map(SimpleSelector::Pseudo)),
            _ => {
                self.report(CssDiagnostic::unexpected_token(
                    start.location.clone(),
                    &start.text,
                ))?;
                Ok(None)
            }
        }
    }

    /// Parses `E`, `*`, `ns|E`, `*|E`, `|E` and the other namespace prefix combinations
    fn parse_type_selector(&mut self, start: &'a Token) -> ParseResult<Option<TypeSelector>> {
        log::trace!("parse_type_selector");

        const EXPECTED: &str = "a type or universal selector";

        if !start.is_ident() && !match_star(start) && !match_pipe(start) {
            self.expecting(start.location.clone(), start, EXPECTED)?;
            return Ok(None);
        }

        let mut name = start.text.clone();
        if match_pipe(start) {
            let next = self.peek_token_with(filter_none)?;
            if !next.is_ident() && !match_star(next) {
                self.expecting(next.location.clone(), next, EXPECTED)?;
                return Ok(None);
            }
            name.push_str(&self.next_token_with(filter_none)?.text);
        } else if match_pipe(self.peek_token_with(filter_none)?) {
            name.push_str(&self.next_token_with(filter_none)?.text);
            let next = self.next_token_with(filter_none)?;
            if !next.is_ident() && !match_star(next) {
                self.expecting(start.location.clone(), next, EXPECTED)?;
                return Ok(None);
            }
            name.push_str(&next.text);
        } else if self.peek_token_with(filter_none)?.is_ident() {
            name.push_str(&self.next_token_with(filter_none)?.text);
        }

        Ok(Some(TypeSelector {
            name,
            location: start.location.clone(),
        }))
    }

    /// Parses the part of an attribute selector after the `[`, starting at the attribute name
    fn parse_attribute_selector(
        &mut self,
        open: &'a Token,
        name: &'a Token,
    ) -> ParseResult<Option<AttributeSelector>> {
        log::trace!("parse_attribute_selector");

        let Some(name) = self.parse_type_selector(name)? else {
            return Ok(None);
        };
        let mut selector = AttributeSelector {
            name,
            matcher: None,
            value: None,
            location: open.location.clone(),
        };

        let token = self.next_token()?;
        if match_close_bracket(token) {
            return Ok(Some(selector));
        }

        let kind = match token.char_value() {
            Some('=') => Some(AttributeMatchKind::Equals),
            _ => AttributeMatchKind::from_token_type(token.token_type),
        };
        let Some(kind) = kind else {
            self.expecting(token.location.clone(), token, "an attribute value matcher")?;
            return Ok(None);
        };
        selector.matcher = Some(AttributeMatch {
            kind,
            location: token.location.clone(),
        });

        let token = self.next_token()?;
        let value = self.parse_construct(
            token,
            match_close_bracket,
            ValueContext::AttributeSelectorValue,
        )?;
        let Some(value) = value else {
            self.expecting(token.location.clone(), token, "a string or identifier")?;
            return Ok(None);
        };
        selector.value = Some(value);

        let token = self.next_token()?;
        if !match_close_bracket(token) {
            self.expecting(token.location.clone(), token, "']'")?;
            return Ok(None);
        }

        Ok(Some(selector))
    }
}
