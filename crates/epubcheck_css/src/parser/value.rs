use crate::node::{Atom, Construct, Function, Quantity, QuantityUnit, ScopeKind, ScopedGroup, Symbol, Uri};
use crate::parser::{Css21, ParseResult};
use crate::token_list::TokenFilter;
use crate::tokenizer::{Token, TokenType};

/// Position a component value is built for. It decides which constructs are permitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ValueContext {
    Function,
    AtRuleParam,
    PropertyValue,
    /// Value of an attribute selector: keywords and strings
    AttributeSelectorValue,
    /// Arguments of a functional pseudo class: keywords, strings, quantities, `+` and `-`
    PseudoFunctional,
}

impl ValueContext {
    pub(crate) fn permits(&self, construct: &Construct) -> bool {
        match self {
            ValueContext::Function | ValueContext::AtRuleParam | ValueContext::PropertyValue => true,
            ValueContext::AttributeSelectorValue => {
                matches!(construct, Construct::Keyword(_) | Construct::String(_))
            }
            ValueContext::PseudoFunctional => match construct {
                Construct::Keyword(_) | Construct::String(_) | Construct::Quantity(_) => true,
                Construct::Symbol(symbol) => matches!(symbol.symbol, '+' | '-'),
                _ => false,
            },
        }
    }
}

impl<'a> Css21<'a> {
    /// Builds the component value that starts at `start`. Returns `None` when the token can
    /// not start a value, when the construct is not permitted in `context`, or when a nested
    /// function or group runs into a token matching `limit` before it is closed.
    pub(crate) fn parse_construct(
        &mut self,
        start: &'a Token,
        limit: TokenFilter,
        context: ValueContext,
    ) -> ParseResult<Option<Construct>> {
        log::trace!("parse_construct");

        let location = start.location.clone();
        let construct = match start.token_type {
            TokenType::Function => {
                let name = start.text.strip_suffix('(').unwrap_or(&start.text);
                let function = Function::new(name, location);
                return self.parse_function(function, limit, context);
            }
            TokenType::Char => match start.char_value() {
                Some('{' | '}' | ';') | None => return Ok(None),
                Some('(') => return self.parse_scoped_group(ScopeKind::Paren, start, limit, context),
                Some('[') => {
                    return self.parse_scoped_group(ScopeKind::Bracket, start, limit, context)
                }
                Some(symbol) => Construct::Symbol(Symbol { symbol, location }),
            },
            TokenType::Ident | TokenType::And | TokenType::Not | TokenType::Only => {
                Construct::Keyword(Atom::new(&start.text, location))
            }
            TokenType::QuotedString => Construct::String(Atom::new(&start.text, location)),
            TokenType::HashName => Construct::HashName(Atom::new(&start.text, location)),
            TokenType::Urange => Construct::UnicodeRange(Atom::new(&start.text, location)),
            TokenType::Uri => Construct::Uri(Uri {
                value: start.text.clone(),
                location,
            }),
            token_type => match QuantityUnit::from_token_type(token_type) {
                Some(unit) => Construct::Quantity(Quantity {
                    value: start.text.clone(),
                    unit,
                    location,
                }),
                None => return Ok(None),
            },
        };

        if !context.permits(&construct) {
            return Ok(None);
        }
        Ok(Some(construct))
    }

    /// Collects the arguments of a function up to its closing parenthesis
    fn parse_function(
        &mut self,
        mut function: Function,
        limit: TokenFilter,
        context: ValueContext,
    ) -> ParseResult<Option<Construct>> {
        log::trace!("parse_function");

        match self.parse_components(')', limit, context)? {
            Some(components) => {
                function.components = components;
                Ok(Some(Construct::Function(function)))
            }
            None => Ok(None),
        }
    }

    fn parse_scoped_group(
        &mut self,
        kind: ScopeKind,
        start: &'a Token,
        limit: TokenFilter,
        context: ValueContext,
    ) -> ParseResult<Option<Construct>> {
        log::trace!("parse_scoped_group");

        let group = self
            .parse_components(kind.close(), limit, context)?
            .map(|components| {
                Construct::ScopedGroup(ScopedGroup {
                    kind,
                    components,
                    location: start.location.clone(),
                })
            });
        if group.as_ref().is_some_and(|g| !context.permits(g)) {
            return Ok(None);
        }
        Ok(group)
    }

    /// Builds nested components up to the `close` character
    fn parse_components(
        &mut self,
        close: char,
        limit: TokenFilter,
        context: ValueContext,
    ) -> ParseResult<Option<Vec<Construct>>> {
        let mut components = Vec::new();

        let mut token = self.next_token()?;
        while !token.is_char(close) {
            if limit(token) {
                return Ok(None);
            }

            match self.parse_construct(token, limit, ValueContext::Function)? {
                Some(construct) if context.permits(&construct) => components.push(construct),
                _ => return Ok(None),
            }
            token = self.next_token()?;
        }

        Ok(Some(components))
    }
}
