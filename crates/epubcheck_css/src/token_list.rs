//! Token list produced by the scanner and the filtering cursor the grammar parser walks it with
use crate::tokenizer::{Token, TokenType};

/// Decides whether a token is visible to a cursor, or whether a token is the one being searched for
pub type TokenFilter = fn(&Token) -> bool;

/// Hides whitespace and comments. This is the default filter.
pub fn filter_s_cmnt(token: &Token) -> bool {
    !token.is_whitespace() && !token.is_comment()
}

/// Hides whitespace, comments and the `<!--` / `-->` markers
pub fn filter_s_cmnt_cdo_cdc(token: &Token) -> bool {
    filter_s_cmnt(token) && !matches!(token.token_type, TokenType::Cdo | TokenType::Cdc)
}

/// Shows every token
pub fn filter_none(_token: &Token) -> bool {
    true
}

pub fn match_semi(token: &Token) -> bool {
    token.is_char(';')
}

pub fn match_open_brace(token: &Token) -> bool {
    token.is_char('{')
}

pub fn match_close_brace(token: &Token) -> bool {
    token.is_char('}')
}

pub fn match_semi_close_brace(token: &Token) -> bool {
    match_semi(token) || match_close_brace(token)
}

pub fn match_semi_open_brace(token: &Token) -> bool {
    match_semi(token) || match_open_brace(token)
}

pub fn match_comma(token: &Token) -> bool {
    token.is_char(',')
}

pub fn match_colon(token: &Token) -> bool {
    token.is_char(':')
}

pub fn match_close_paren(token: &Token) -> bool {
    token.is_char(')')
}

pub fn match_close_bracket(token: &Token) -> bool {
    token.is_char(']')
}

pub fn match_pipe(token: &Token) -> bool {
    token.is_char('|')
}

pub fn match_star(token: &Token) -> bool {
    token.is_char('*')
}

/// Matches the explicit combinators `>`, `+` and `~`
pub fn match_combinator_char(token: &Token) -> bool {
    matches!(token.char_value(), Some('>' | '+' | '~'))
}

/// Ordered sequence of tokens as produced by the scanner
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CssTokenList {
    tokens: Vec<Token>,
}

impl CssTokenList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at the given raw index, ignoring any filter
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Token> {
        self.tokens
    }

    /// Returns a cursor over this list that shows only the tokens passing `filter`
    #[must_use]
    pub fn cursor(&self, filter: TokenFilter) -> CssTokenIterator<'_> {
        CssTokenIterator::new(&self.tokens, filter)
    }
}

impl From<Vec<Token>> for CssTokenList {
    fn from(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

impl<'a> IntoIterator for &'a CssTokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Saved cursor position, see [`CssTokenIterator::mark`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorMark {
    next: usize,
    last_ret: Option<usize>,
    last: Option<usize>,
}

/// Cursor over a token list. The default filter is applied by [`Iterator::next`]; every
/// lookup can also be done with an explicit filter. When the list is exhausted the cursor
/// stays at the end and keeps returning `None`.
#[derive(Clone, Debug)]
pub struct CssTokenIterator<'a> {
    tokens: &'a [Token],
    filter: TokenFilter,
    /// Raw index of the next token to examine
    next: usize,
    /// Raw index of the last token returned
    last_ret: Option<usize>,
    /// Raw index of the last token returned that passed the filter in use
    last: Option<usize>,
}

impl<'a> CssTokenIterator<'a> {
    #[must_use]
    pub fn new(tokens: &'a [Token], filter: TokenFilter) -> Self {
        Self {
            tokens,
            filter,
            next: 0,
            last_ret: None,
            last: None,
        }
    }

    /// Returns the next token that passes `filter` and moves the cursor past it
    pub fn next_with(&mut self, filter: TokenFilter) -> Option<&'a Token> {
        while self.next < self.tokens.len() {
            let index = self.next;
            self.next += 1;
            self.last_ret = Some(index);

            if filter(&self.tokens[index]) {
                self.last = Some(index);
                return Some(&self.tokens[index]);
            }
        }
        None
    }

    /// Returns the next token that passes `filter` without moving the cursor
    #[must_use]
    pub fn peek_with(&self, filter: TokenFilter) -> Option<&'a Token> {
        self.tokens[self.next.min(self.tokens.len())..]
            .iter()
            .find(|t| filter(t))
    }

    #[must_use]
    pub fn peek(&self) -> Option<&'a Token> {
        self.peek_with(self.filter)
    }

    #[must_use]
    pub fn has_next_with(&self, filter: TokenFilter) -> bool {
        self.peek_with(filter).is_some()
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.has_next_with(self.filter)
    }

    /// Raw index of the token most recently returned
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.last_ret
    }

    /// The token most recently returned
    #[must_use]
    pub fn last_token(&self) -> Option<&'a Token> {
        self.last.and_then(|i| self.tokens.get(i))
    }

    /// Token at the given raw index, ignoring the filter
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a Token> {
        self.tokens.get(index)
    }

    /// All tokens after the most recently returned one, unfiltered
    #[must_use]
    pub fn remaining(&self) -> &'a [Token] {
        &self.tokens[self.next.min(self.tokens.len())..]
    }

    #[must_use]
    pub fn filter(&self) -> TokenFilter {
        self.filter
    }

    #[must_use]
    pub fn mark(&self) -> CursorMark {
        CursorMark {
            next: self.next,
            last_ret: self.last_ret,
            last: self.last,
        }
    }

    pub fn reset(&mut self, mark: CursorMark) {
        self.next = mark.next;
        self.last_ret = mark.last_ret;
        self.last = mark.last;
    }
}

impl<'a> Iterator for CssTokenIterator<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_with(self.filter)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::handler::DiagnosticCollector;
    use crate::location::NO_SOURCE_ID;
    use crate::tokenizer::scan_str;

    fn tokens(css: &str) -> CssTokenList {
        scan_str(css, NO_SOURCE_ID, &mut DiagnosticCollector::default()).unwrap()
    }

    #[test]
    fn default_filter_skips_whitespace_and_comments() {
        let list = tokens("a /* x */ b");
        assert_eq!(list.len(), 5);

        let texts: Vec<&str> = list
            .cursor(filter_s_cmnt)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn cdo_cdc_filter() {
        let list = tokens("<!-- a -->");
        let mut iter = list.cursor(filter_s_cmnt_cdo_cdc);
        assert_eq!(iter.next().map(|t| t.text.as_str()), Some("a"));
        assert!(iter.next().is_none());

        let mut iter = list.cursor(filter_s_cmnt);
        assert_eq!(iter.next().map(|t| t.token_type), Some(TokenType::Cdo));
    }

    #[test]
    fn peek_does_not_move() {
        let list = tokens("a b");
        let mut iter = list.cursor(filter_s_cmnt);

        assert_eq!(iter.peek().map(|t| t.text.as_str()), Some("a"));
        assert_eq!(iter.peek_with(filter_none).map(|t| t.text.as_str()), Some("a"));
        assert!(iter.last_token().is_none());

        iter.next();
        assert_eq!(iter.peek_with(filter_none).map(|t| t.token_type), Some(TokenType::S));
        assert_eq!(iter.peek().map(|t| t.text.as_str()), Some("b"));
        assert_eq!(iter.index(), Some(0));
    }

    #[test]
    fn index_and_last() {
        let list = tokens("a ; b");
        let mut iter = list.cursor(filter_s_cmnt);

        assert!(iter.next_with(match_semi).is_some());
        assert_eq!(iter.index(), Some(2));
        assert!(iter.last_token().is_some_and(match_semi));
        assert_eq!(iter.get(3).map(|t| t.token_type), Some(TokenType::S));

        // a failed search leaves the cursor at the end
        assert!(iter.next_with(match_close_brace).is_none());
        assert!(!iter.has_next());
        assert!(iter.next().is_none());
        assert!(iter.last_token().is_some_and(match_semi));
        assert_eq!(iter.index(), Some(4));
    }

    #[test]
    fn mark_and_reset() {
        let list = tokens("a b c");
        let mut iter = list.cursor(filter_s_cmnt);
        iter.next();

        let mark = iter.mark();
        iter.next();
        iter.next();
        assert!(!iter.has_next());

        iter.reset(mark);
        assert_eq!(iter.next().map(|t| t.text.as_str()), Some("b"));
        assert_eq!(iter.remaining().len(), 2);
    }

    #[test]
    fn match_filters() {
        let list = tokens("> + ~ | * ) ]");
        let chars: Vec<&Token> = list.cursor(filter_s_cmnt).collect();

        assert!(chars[..3].iter().all(|t| match_combinator_char(t)));
        assert!(match_pipe(chars[3]));
        assert!(match_star(chars[4]));
        assert!(match_close_paren(chars[5]));
        assert!(match_close_bracket(chars[6]));
        assert!(!match_combinator_char(chars[3]));
    }
}
