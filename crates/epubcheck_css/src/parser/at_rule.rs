use crate::errors::CssDiagnostic;
use crate::node::AtRule;
use crate::parser::value::ValueContext;
use crate::parser::{Css21, Interrupt, ParseResult};
use crate::token_list::{
    match_close_brace, match_open_brace, match_semi, match_semi_close_brace,
    match_semi_open_brace,
};
use crate::tokenizer::{Token, TokenType};

impl<'a> Css21<'a> {
    /// Parses an at-rule starting at its at-keyword: the prelude up to `;` or `{`, and the
    /// block if there is one. A block holds either nested rules or declarations.
    pub(crate) fn parse_at_rule(&mut self, start: &'a Token) -> ParseResult<()> {
        log::trace!("parse_at_rule");

        let mut at_rule = AtRule::new(&start.text, start.location.clone());

        match self.parse_at_rule_prelude(&mut at_rule) {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(Interrupt::Exhausted) => {
                self.content.start_at_rule(&at_rule);
                let diagnostic = CssDiagnostic::premature_eof(self.last_location(), "';' or '{'");
                self.report(diagnostic)?;
                self.content.end_at_rule(&at_rule.name);
                return Err(Interrupt::PrematureEof);
            }
            Err(err) => return Err(err),
        }

        self.content.start_at_rule(&at_rule);

        if at_rule.has_block {
            match self.parse_at_rule_body() {
                Ok(()) => {}
                Err(Interrupt::Exhausted) => {
                    let diagnostic = CssDiagnostic::premature_eof(self.last_location(), "'}'");
                    self.report(diagnostic)?;
                    self.content.end_at_rule(&at_rule.name);
                    return Err(Interrupt::PrematureEof);
                }
                Err(err) => return Err(err),
            }
        }

        self.content.end_at_rule(&at_rule.name);
        Ok(())
    }

    /// Collects the prelude components. Returns false when an invalid component was found
    /// and the rest of the at-rule has been skipped.
    fn parse_at_rule_prelude(&mut self, at_rule: &mut AtRule) -> ParseResult<bool> {
        loop {
            let token = self.next_token()?;
            if match_semi_open_brace(token) {
                at_rule.has_block = match_open_brace(token);
                return Ok(true);
            }

            match self.parse_construct(token, match_semi_open_brace, ValueContext::AtRuleParam)? {
                Some(construct) => at_rule.components.push(construct),
                None => {
                    self.unexpected_last()?;
                    self.skip_at_rule()?;
                    return Ok(false);
                }
            }
        }
    }

    /// Skips to the `;` that ends a statement at-rule, or past the closing brace of its block.
    /// Inner blocks are skipped as a whole.
    fn skip_at_rule(&mut self) -> ParseResult<()> {
        let mut depth: i32 = 0;
        loop {
            let token = self.next_token()?;
            if match_semi(token) && depth == 0 {
                return Ok(());
            } else if match_open_brace(token) {
                depth += 1;
            } else if match_close_brace(token) {
                if depth == 1 {
                    return Ok(());
                }
                depth -= 1;
            }
        }
    }

    fn parse_at_rule_body(&mut self) -> ParseResult<()> {
        if !self.has_rule_set() {
            let start = self.next_token()?;
            return self.parse_declaration_block(start);
        }

        loop {
            let token = self.next_token()?;
            if match_close_brace(token) {
                return Ok(());
            }
            if token.token_type == TokenType::AtKeyword {
                self.parse_at_rule(token)?;
            } else {
                self.parse_rule_set(token)?;
            }
        }
    }

    /// With the cursor just past a `{`, tells whether the block holds rule sets: another `{`
    /// comes before any `;` or `}`.
    fn has_rule_set(&self) -> bool {
        self.iter
            .remaining()
            .iter()
            .find(|t| match_open_brace(t) || match_semi_close_brace(t))
            .is_some_and(match_open_brace)
    }
}
