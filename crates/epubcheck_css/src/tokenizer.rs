use crate::errors::CssDiagnostic;
use crate::handler::ErrorHandler;
use crate::location::CssLocation;
use crate::token_list::CssTokenList;
use crate::unicode::UnicodeChar;
use epubcheck_shared::byte_stream::Character::{Ch, StreamEnd};
use epubcheck_shared::byte_stream::{CharStream, Character, CHAR_CR, CHAR_LF};
use epubcheck_shared::errors::CssResult;
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Longest unit name that maps onto a specific quantity type
const MAX_UNIT_LENGTH: usize = 4;

lazy_static! {
    static ref UNITS: HashMap<&'static str, TokenType> = HashMap::from([
        ("dpcm", TokenType::QntyResolution),
        ("dppx", TokenType::QntyResolution),
        ("dpi", TokenType::QntyResolution),
        ("grad", TokenType::QntyAngle),
        ("turn", TokenType::QntyAngle),
        ("deg", TokenType::QntyAngle),
        ("rad", TokenType::QntyAngle),
        ("vmin", TokenType::QntyLength),
        ("cm", TokenType::QntyLength),
        ("px", TokenType::QntyLength),
        ("mm", TokenType::QntyLength),
        ("in", TokenType::QntyLength),
        ("pt", TokenType::QntyLength),
        ("pc", TokenType::QntyLength),
        ("ch", TokenType::QntyLength),
        ("vw", TokenType::QntyLength),
        ("vh", TokenType::QntyLength),
        ("khz", TokenType::QntyFreq),
        ("hz", TokenType::QntyFreq),
        ("rem", TokenType::QntyRems),
        ("em", TokenType::QntyEms),
        ("ex", TokenType::QntyExs),
        ("ms", TokenType::QntyTime),
        ("s", TokenType::QntyTime),
        ("%", TokenType::QntyPercentage),
    ]);
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    /// A run of whitespace, always represented by a single space
    S,
    /// A `/* ... */` comment. The text does not include the delimiters.
    Comment,
    /// `<!--`
    Cdo,
    /// `-->`
    Cdc,
    /// A quoted string. The text does not include the quotes.
    QuotedString,
    Ident,
    /// An at-keyword. The text includes the `@` marker.
    AtKeyword,
    /// A `#name`. The text includes the `#` marker.
    HashName,
    /// A function name. The text includes the opening parenthesis.
    Function,
    /// A `url(...)` reference
    Uri,
    Integer,
    Number,
    QntyEms,
    QntyRems,
    QntyExs,
    QntyPercentage,
    QntyLength,
    QntyAngle,
    QntyTime,
    QntyFreq,
    QntyResolution,
    /// A number with a unit that is not known to the scanner
    QntyDimen,
    /// A unicode range like `U+0-7F` or `U+4??`
    Urange,
    /// `!important`
    Important,
    Only,
    Not,
    And,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    PrefixMatch,
    /// `$=`
    SuffixMatch,
    /// `*=`
    SubstringMatch,
    /// Any other single character
    Char,
}

impl TokenType {
    /// Returns true for numbers and numbers with a unit
    #[must_use]
    pub fn is_quantity(&self) -> bool {
        matches!(
            self,
            TokenType::Integer
                | TokenType::Number
                | TokenType::QntyEms
                | TokenType::QntyRems
                | TokenType::QntyExs
                | TokenType::QntyPercentage
                | TokenType::QntyLength
                | TokenType::QntyAngle
                | TokenType::QntyTime
                | TokenType::QntyFreq
                | TokenType::QntyResolution
                | TokenType::QntyDimen
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenType::S => "S",
            TokenType::Comment => "COMMENT",
            TokenType::Cdo => "CDO",
            TokenType::Cdc => "CDC",
            TokenType::QuotedString => "STRING",
            TokenType::Ident => "IDENT",
            TokenType::AtKeyword => "ATKEYWORD",
            TokenType::HashName => "HASHNAME",
            TokenType::Function => "FUNCTION",
            TokenType::Uri => "URI",
            TokenType::Integer => "INTEGER",
            TokenType::Number => "NUMBER",
            TokenType::QntyEms => "QNTY_EMS",
            TokenType::QntyRems => "QNTY_REMS",
            TokenType::QntyExs => "QNTY_EXS",
            TokenType::QntyPercentage => "QNTY_PERCENTAGE",
            TokenType::QntyLength => "QNTY_LENGTH",
            TokenType::QntyAngle => "QNTY_ANGLE",
            TokenType::QntyTime => "QNTY_TIME",
            TokenType::QntyFreq => "QNTY_FREQ",
            TokenType::QntyResolution => "QNTY_RESOLUTION",
            TokenType::QntyDimen => "QNTY_DIMEN",
            TokenType::Urange => "URANGE",
            TokenType::Important => "IMPORTANT",
            TokenType::Only => "ONLY",
            TokenType::Not => "NOT",
            TokenType::And => "AND",
            TokenType::Includes => "INCLUDES",
            TokenType::DashMatch => "DASHMATCH",
            TokenType::PrefixMatch => "PREFIXMATCH",
            TokenType::SuffixMatch => "SUFFIXMATCH",
            TokenType::SubstringMatch => "SUBSTRINGMATCH",
            TokenType::Char => "CHAR",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Token {
    /// Type of the token
    pub token_type: TokenType,
    /// Normalized text of the token
    pub text: String,
    /// Location of the first character of the token
    pub location: CssLocation,
    /// Problems found while scanning this token
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<CssDiagnostic>,
}

impl Token {
    /// Returns a new token for the given type on the given location
    #[must_use]
    pub fn new(token_type: TokenType, text: &str, location: CssLocation) -> Token {
        Token {
            token_type,
            text: text.to_string(),
            location,
            errors: Vec::new(),
        }
    }

    /// Returns true when this is a `Char` token holding the given character
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        self.char_value() == Some(c)
    }

    /// The character of a `Char` token
    #[must_use]
    pub fn char_value(&self) -> Option<char> {
        if self.token_type != TokenType::Char {
            return None;
        }
        self.text.chars().next()
    }

    pub(crate) fn is_whitespace(&self) -> bool {
        self.token_type == TokenType::S
    }

    pub(crate) fn is_comment(&self) -> bool {
        self.token_type == TokenType::Comment
    }

    pub(crate) fn is_ident(&self) -> bool {
        self.token_type == TokenType::Ident
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Returns true for characters that may start a name
pub(crate) fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c >= UnicodeChar::NON_ASCII_START
}

/// Returns true for characters that may appear inside a name
pub(crate) fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}

/// Returns true for characters that may start a unit
fn is_unit_start(c: char) -> bool {
    is_name_start(c) || c == '%'
}

fn is_urange_char(c: char) -> bool {
    c.is_ascii_hexdigit() || c == '?' || c == '-'
}

fn is_terminator(c: char) -> bool {
    matches!(c, ';' | '{' | '}')
}

fn matches_char(c: Character, f: fn(char) -> bool) -> bool {
    matches!(c, Ch(c) if f(c))
}

/// Quotes scanned string contents. Single quotes are used unless the contents hold an
/// unescaped `'`, in which case every `"` in them is escaped already.
pub fn quote_string(value: &str) -> String {
    let quote = if contains_unescaped(value, '\'') { '"' } else { '\'' };
    format!("{quote}{value}{quote}")
}

fn contains_unescaped(value: &str, quote: char) -> bool {
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return true;
        }
    }
    false
}

/// A backslash escape as found in the stream
struct Escape {
    /// The raw escape, including the backslash and the whitespace that ends a hex escape
    sequence: String,
    /// The character the escape stands for, when it denotes a valid code point
    character: Option<char>,
}

impl Escape {
    /// Number of characters consumed by the escape
    fn len(&self) -> usize {
        self.sequence.chars().count()
    }

    /// Renders the escape as its character when that character is valid at this position,
    /// and as the raw sequence otherwise
    fn render(&self, text: &mut String, valid: fn(char) -> bool) {
        match self.character {
            Some(c) if valid(c) => text.push(c),
            _ => text.push_str(&self.sequence),
        }
    }
}

/// CSS 2.1 scanner. Turns a character stream into a flat list of tokens, attaching scanner
/// errors to the token they were found in.
pub struct Tokenizer<'stream> {
    /// Stream of input characters
    stream: &'stream mut CharStream,
    /// Source id recorded in every token location
    source_id: Arc<str>,
    /// Errors found in the token that is being scanned
    pending: Vec<CssDiagnostic>,
}

impl<'stream> Tokenizer<'stream> {
    /// Creates a new tokenizer with the given stream. Token locations start at the location
    /// of the stream.
    pub fn new(stream: &'stream mut CharStream, source_id: &str) -> Self {
        Self {
            stream,
            source_id: Arc::from(source_id),
            pending: Vec::new(),
        }
    }

    /// Returns the current location (line/col) of the tokenizer
    #[must_use]
    pub fn current_location(&self) -> CssLocation {
        CssLocation::new(self.source_id.clone(), &self.stream.location())
    }

    /// Scans the whole stream. Every token error is passed to the error handler as soon as
    /// its token is complete.
    pub fn scan(mut self, errors: &mut dyn ErrorHandler) -> CssResult<CssTokenList> {
        let mut tokens = CssTokenList::new();

        while !self.stream.eof() {
            let token = self.consume_token();
            log::trace!("{:?} {:?}", token.token_type, token.text);

            for diagnostic in &token.errors {
                errors.error(diagnostic.clone())?;
            }
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Consumes a single token from the stream
    pub fn consume_token(&mut self) -> Token {
        let location = self.current_location();
        let (token_type, text) = self.consume_token_text();

        let mut token = Token::new(token_type, &text, location);
        token.errors = std::mem::take(&mut self.pending);
        token
    }

    fn consume_token_text(&mut self) -> (TokenType, String) {
        let current = self.stream.read();
        let next = self.stream.look_ahead(1);

        if current.is_whitespace() {
            while self.stream.read().is_whitespace() {
                self.stream.read_and_next();
            }
            return (TokenType::S, " ".to_string());
        }

        if self.stream.get_slice(3) == "-->" {
            self.stream.next_n(3);
            return (TokenType::Cdc, "-->".to_string());
        }

        if self.stream.get_slice(4).eq_ignore_ascii_case("url(") {
            return self.consume_uri();
        }

        if matches!(current, Ch('U' | 'u'))
            && next == Ch('+')
            && matches_char(self.stream.look_ahead(2), |c| {
                c.is_ascii_hexdigit() || c == '?'
            })
        {
            return self.consume_urange();
        }

        if self.is_ident_start(0) {
            return self.consume_ident_like();
        }

        if current == Ch('@') && self.is_at_keyword_start() {
            return self.consume_at_keyword();
        }

        if self.is_number_start() {
            return self.consume_numeric();
        }

        if self.stream.get_slice(4) == "<!--" {
            self.stream.next_n(4);
            return (TokenType::Cdo, "<!--".to_string());
        }

        if self.stream.get_slice(2) == "/*" {
            return (TokenType::Comment, self.consume_comment());
        }

        if matches!(current, Ch('"' | '\'')) {
            let mut text = String::new();
            self.consume_string(&mut text);
            return (TokenType::QuotedString, text);
        }

        if current == Ch('#') && (matches_char(next, is_name_char) || self.escape_at(1).is_some()) {
            self.stream.read_and_next();
            let mut text = "#".to_string();
            self.consume_name_chars(&mut text);
            return (TokenType::HashName, text);
        }

        if current == Ch('!') {
            if let Some(len) = self.important_length() {
                self.stream.next_n(len);
                return (TokenType::Important, "!important".to_string());
            }
        }

        if next == Ch('=') {
            let token_type = match current {
                Ch('~') => Some(TokenType::Includes),
                Ch('|') => Some(TokenType::DashMatch),
                Ch('^') => Some(TokenType::PrefixMatch),
                Ch('$') => Some(TokenType::SuffixMatch),
                Ch('*') => Some(TokenType::SubstringMatch),
                _ => None,
            };
            if let Some(token_type) = token_type {
                let text = self.stream.get_slice(2);
                self.stream.next_n(2);
                return (token_type, text);
            }
        }

        if current == Ch('\\') && next == StreamEnd {
            self.add_error(CssDiagnostic::scanner_eof(self.current_location()));
        }
        self.stream.read_and_next();
        (TokenType::Char, char::from(current).to_string())
    }

    fn add_error(&mut self, diagnostic: CssDiagnostic) {
        log::debug!("scanner error: {diagnostic}");
        self.pending.push(diagnostic);
    }

    /// Reads the escape that starts at the given offset, if any. A backslash followed by a
    /// newline or by the end of the stream does not start an escape.
    fn escape_at(&self, offset: usize) -> Option<Escape> {
        if self.stream.look_ahead(offset) != Ch('\\') {
            return None;
        }

        let first = match self.stream.look_ahead(offset + 1) {
            StreamEnd => return None,
            c if c.is_newline() => return None,
            Ch(c) => c,
        };

        if !first.is_ascii_hexdigit() {
            return Some(Escape {
                sequence: format!("\\{first}"),
                character: Some(first),
            });
        }

        let mut sequence = "\\".to_string();
        let mut pos = offset + 1;
        while sequence.len() < 7 {
            match self.stream.look_ahead(pos) {
                Ch(c) if c.is_ascii_hexdigit() => {
                    sequence.push(c);
                    pos += 1;
                }
                _ => break,
            }
        }

        let code_point = u32::from_str_radix(&sequence[1..], 16).ok();

        // a single whitespace ends the escape, CR+LF counts as one
        match (self.stream.look_ahead(pos), self.stream.look_ahead(pos + 1)) {
            (Ch(CHAR_CR), Ch(CHAR_LF)) => sequence.push_str("\r\n"),
            (c, _) if c.is_whitespace() => sequence.push(char::from(c)),
            _ => {}
        }

        let character = code_point
            .and_then(char::from_u32)
            .filter(|c| *c != UnicodeChar::NULL);

        Some(Escape {
            sequence,
            character,
        })
    }

    /// Returns true when an identifier starts at the given offset
    fn is_ident_start(&self, offset: usize) -> bool {
        let current = self.stream.look_ahead(offset);
        let next = self.stream.look_ahead(offset + 1);

        matches_char(current, is_name_start)
            || (current == Ch('-') && matches_char(next, is_name_start))
            || self.escape_at(offset).is_some()
            || (current == Ch('-') && self.escape_at(offset + 1).is_some())
    }

    fn is_at_keyword_start(&self) -> bool {
        let next = self.stream.look_ahead(1);

        matches_char(next, is_name_start)
            || self.escape_at(1).is_some()
            || (next == Ch('-')
                && (matches_char(self.stream.look_ahead(2), is_name_start)
                    || self.escape_at(2).is_some()))
    }

    fn is_number_start(&self) -> bool {
        let current = self.stream.read();
        let next = self.stream.look_ahead(1);

        current.is_numeric()
            || (matches!(current, Ch('.' | '+' | '-')) && next.is_numeric())
            || (matches!(current, Ch('+' | '-'))
                && next == Ch('.')
                && self.stream.look_ahead(2).is_numeric())
    }

    /// Consumes a single name start character or escape
    fn consume_name_start(&mut self, text: &mut String, valid: fn(char) -> bool) {
        if let Some(escape) = self.escape_at(0) {
            self.consume_escape(&escape, text, valid);
        } else if let Ch(c) = self.stream.read_and_next() {
            text.push(c);
        }
    }

    fn consume_escape(&mut self, escape: &Escape, text: &mut String, valid: fn(char) -> bool) {
        if escape.character.is_none() {
            let location = self.current_location();
            self.add_error(CssDiagnostic::malformed_escape(location, escape.sequence.trim_end()));
        }
        escape.render(text, valid);
        self.stream.next_n(escape.len());
    }

    /// Consumes name characters and escapes for as long as they are found
    fn consume_name_chars(&mut self, text: &mut String) {
        loop {
            match self.stream.read() {
                Ch(c) if is_name_char(c) => {
                    text.push(c);
                    self.stream.read_and_next();
                }
                Ch('\\') => match self.escape_at(0) {
                    Some(escape) => self.consume_escape(&escape, text, is_name_char),
                    None => break,
                },
                _ => break,
            }
        }
    }

    /// Consumes an identifier, which may turn out to be a function name or one of the
    /// `only`, `not` and `and` keywords
    fn consume_ident_like(&mut self) -> (TokenType, String) {
        let mut text = String::new();
        if self.stream.read() == Ch('-') {
            text.push('-');
            self.stream.read_and_next();
        }
        self.consume_name_start(&mut text, is_name_start);
        self.consume_name_chars(&mut text);

        if self.stream.read() == Ch('(') {
            self.stream.read_and_next();
            text.push('(');
            return (TokenType::Function, text);
        }

        let keyword = match text.to_ascii_lowercase().as_str() {
            "only" => Some(TokenType::Only),
            "not" => Some(TokenType::Not),
            "and" => Some(TokenType::And),
            _ => None,
        };
        match keyword {
            Some(token_type) => (token_type, text.to_ascii_lowercase()),
            None => (TokenType::Ident, text),
        }
    }

    fn consume_at_keyword(&mut self) -> (TokenType, String) {
        self.stream.read_and_next();
        let mut text = "@".to_string();
        if self.stream.read() == Ch('-') {
            text.push('-');
            self.stream.read_and_next();
        }
        self.consume_name_start(&mut text, is_name_start);
        self.consume_name_chars(&mut text);

        (TokenType::AtKeyword, text)
    }

    fn consume_digits(&mut self, text: &mut String) {
        while let Ch(c) = self.stream.read() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.stream.read_and_next();
        }
    }

    /// Consumes a number and, when present, its unit
    fn consume_numeric(&mut self) -> (TokenType, String) {
        let mut text = String::new();
        if let Ch(c @ ('+' | '-')) = self.stream.read() {
            text.push(c);
            self.stream.read_and_next();
        }

        self.consume_digits(&mut text);
        let mut token_type = TokenType::Integer;
        if self.stream.read() == Ch('.') && self.stream.look_ahead(1).is_numeric() {
            text.push('.');
            self.stream.read_and_next();
            self.consume_digits(&mut text);
            token_type = TokenType::Number;
        }

        let unit_follows =
            matches_char(self.stream.read(), is_unit_start) || self.escape_at(0).is_some();
        if !unit_follows {
            return (token_type, text);
        }

        let mut unit = String::new();
        if self.stream.read() == Ch('%') {
            self.stream.read_and_next();
            unit.push('%');
        } else {
            self.consume_name_start(&mut unit, is_unit_start);
            self.consume_name_chars(&mut unit);
        }

        let lower = unit.to_ascii_lowercase();
        let known = if unit.chars().count() <= MAX_UNIT_LENGTH {
            UNITS.get(lower.as_str()).copied()
        } else {
            None
        };

        match known {
            Some(token_type) => (token_type, text + &lower),
            None => (TokenType::QntyDimen, text + &unit),
        }
    }

    /// Consumes a unicode range. Each side of the range holds at most six characters.
    fn consume_urange(&mut self) -> (TokenType, String) {
        let location = self.current_location();
        self.stream.next_n(2);

        let mut text = "U+".to_string();
        let mut count = 0;
        while let Ch(c) = self.stream.read() {
            if !is_urange_char(c) {
                break;
            }
            count = if c == '-' { 0 } else { count + 1 };
            text.push(c);
            self.stream.read_and_next();

            if count == 7 {
                self.add_error(CssDiagnostic::illegal_urange(location.clone(), &text));
            }
        }

        (TokenType::Urange, text)
    }

    /// Returns the number of characters that make up `!important` when the stream holds one.
    /// Whitespace and comments may appear between the `!` and the keyword.
    fn important_length(&self) -> Option<usize> {
        let mut pos = 1;
        loop {
            let c = self.stream.look_ahead(pos);
            if c.is_whitespace() {
                pos += 1;
            } else if c == Ch('/') && self.stream.look_ahead(pos + 1) == Ch('*') {
                pos += 2;
                loop {
                    match self.stream.look_ahead(pos) {
                        StreamEnd => return None,
                        Ch('*') if self.stream.look_ahead(pos + 1) == Ch('/') => {
                            pos += 2;
                            break;
                        }
                        _ => pos += 1,
                    }
                }
            } else {
                break;
            }
        }

        let keyword: String = (pos..pos + 9)
            .map(|i| char::from(self.stream.look_ahead(i)))
            .collect();
        keyword
            .eq_ignore_ascii_case("important")
            .then_some(pos + 9)
    }

    /// 4.3.2. Consume comments. Returns the text between the delimiters.
    fn consume_comment(&mut self) -> String {
        self.stream.next_n(2);

        let mut text = String::new();
        let mut prev = None;
        loop {
            match self.stream.read() {
                StreamEnd => {
                    self.add_error(CssDiagnostic::scanner_eof(self.current_location()));
                    break;
                }
                Ch('*') if self.stream.look_ahead(1) == Ch('/') && prev != Some('\\') => {
                    self.stream.next_n(2);
                    break;
                }
                Ch(c) => {
                    text.push(c);
                    prev = Some(c);
                    self.stream.read_and_next();
                }
            }
        }

        text
    }

    /// Consumes a quoted string and appends its contents, without the quotes, to `text`.
    /// An escaped newline is removed. An unescaped newline ends the string with an error, and
    /// the scanner resumes at the next `;`, `{` or `}`.
    fn consume_string(&mut self, text: &mut String) {
        let quote = char::from(self.stream.read_and_next());

        loop {
            match self.stream.read() {
                StreamEnd => {
                    self.add_error(CssDiagnostic::scanner_eof(self.current_location()));
                    return;
                }
                c if c.is_newline() => {
                    self.add_error(CssDiagnostic::illegal_char(
                        self.current_location(),
                        "NEWLINE",
                        "STRING",
                    ));
                    self.stream.read_and_next();
                    self.skip_to_terminator();
                    return;
                }
                Ch('\\') => {
                    let next = self.stream.look_ahead(1);
                    if next == Ch(CHAR_CR) && self.stream.look_ahead(2) == Ch(CHAR_LF) {
                        self.stream.next_n(3);
                    } else if next.is_newline() {
                        self.stream.next_n(2);
                    } else {
                        text.push('\\');
                        self.stream.read_and_next();
                        if let Ch(c) = self.stream.read_and_next() {
                            text.push(c);
                        }
                    }
                }
                Ch(c) if c == quote => {
                    self.stream.read_and_next();
                    return;
                }
                Ch(c) => {
                    text.push(c);
                    self.stream.read_and_next();
                }
            }
        }
    }

    /// Skips up to (not including) the next unescaped `;`, `{` or `}`
    fn skip_to_terminator(&mut self) {
        let mut prev = None;
        while let Ch(c) = self.stream.read() {
            if is_terminator(c) && prev != Some('\\') {
                break;
            }
            prev = Some(c);
            self.stream.read_and_next();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.stream.read().is_whitespace() {
            self.stream.read_and_next();
        }
    }

    /// Consumes a `url(...)` token. Whitespace around the address is dropped, a quoted
    /// address is requoted with [`quote_string`].
    fn consume_uri(&mut self) -> (TokenType, String) {
        self.stream.next_n(4);
        self.skip_whitespace();

        let mut text = "url(".to_string();
        match self.stream.read() {
            StreamEnd => {
                self.add_error(CssDiagnostic::scanner_eof(self.current_location()));
            }
            Ch('"' | '\'') => {
                let mut value = String::new();
                self.consume_string(&mut value);
                text.push_str(&quote_string(&value));

                self.skip_whitespace();
                let location = self.current_location();
                let closing = self.stream.read_and_next();
                if closing != Ch(')') && self.pending.is_empty() {
                    match closing {
                        StreamEnd => self.add_error(CssDiagnostic::scanner_eof(location)),
                        _ => self.add_error(CssDiagnostic::illegal_syntax(location, &text)),
                    }
                }
            }
            Ch(_) => {
                let mut value = String::new();
                loop {
                    match self.stream.read_and_next() {
                        Ch(')') => break,
                        Ch(c) => value.push(c),
                        StreamEnd => {
                            self.add_error(CssDiagnostic::scanner_eof(self.current_location()));
                            break;
                        }
                    }
                }
                text.push_str(value.trim_end_matches(|c| Ch(c).is_whitespace()));
            }
        }

        text.push(')');
        (TokenType::Uri, text)
    }
}

/// Scans the given CSS text into a token list
pub fn scan_str(
    css: &str,
    source_id: &str,
    errors: &mut dyn ErrorHandler,
) -> CssResult<CssTokenList> {
    let mut stream = CharStream::default();
    stream.read_from_str(css);

    Tokenizer::new(&mut stream, source_id).scan(errors)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::handler::DiagnosticCollector;
    use crate::location::NO_SOURCE_ID;
    use test_case::test_case;

    macro_rules! assert_token_eq {
        ($token:expr, $token_type:expr, $text:expr) => {
            assert_eq!(($token.token_type, $token.text.as_str()), ($token_type, $text))
        };
    }

    fn scan(css: &str) -> Vec<Token> {
        let mut errors = DiagnosticCollector::default();
        scan_str(css, NO_SOURCE_ID, &mut errors).unwrap().into_vec()
    }

    fn scan_one(css: &str) -> Token {
        let tokens = scan(css);
        assert_eq!(tokens.len(), 1, "expected a single token for {css:?}: {tokens:?}");
        tokens[0].clone()
    }

    fn error_count(tokens: &[Token]) -> usize {
        tokens.iter().map(|t| t.errors.len()).sum()
    }

    #[test]
    fn parse_comment() {
        let token = scan_one("/* css comment */");
        assert_token_eq!(token, TokenType::Comment, " css comment ");
        assert!(token.errors.is_empty());

        let token = scan_one("/* *\\/*/");
        assert_token_eq!(token, TokenType::Comment, " *\\/");

        let token = scan_one("/* open");
        assert_eq!(token.errors.len(), 1);
        assert_eq!(
            token.errors[0].code,
            crate::errors::CssErrorCode::ScannerPrematureEof
        );
    }

    #[test]
    fn whitespace_collapses() {
        let tokens = scan(" \t\r\n\u{000C}a");
        assert_token_eq!(tokens[0], TokenType::S, " ");
        assert_token_eq!(tokens[1], TokenType::Ident, "a");
        assert_eq!(tokens[1].location.line, 3);
    }

    #[test_case("12", TokenType::Integer, "12")]
    #[test_case("+34", TokenType::Integer, "+34")]
    #[test_case("-5.6", TokenType::Number, "-5.6")]
    #[test_case(".5", TokenType::Number, ".5"; "leading dot")]
    #[test_case("-.5", TokenType::Number, "-.5"; "negative leading dot")]
    #[test_case("10PX", TokenType::QntyLength, "10px")]
    #[test_case("1.5em", TokenType::QntyEms, "1.5em")]
    #[test_case("2rem", TokenType::QntyRems, "2rem")]
    #[test_case("3ex", TokenType::QntyExs, "3ex")]
    #[test_case("50%", TokenType::QntyPercentage, "50%")]
    #[test_case("90deg", TokenType::QntyAngle, "90deg")]
    #[test_case("200ms", TokenType::QntyTime, "200ms")]
    #[test_case("2s", TokenType::QntyTime, "2s")]
    #[test_case("44kHz", TokenType::QntyFreq, "44khz")]
    #[test_case("96dpi", TokenType::QntyResolution, "96dpi")]
    #[test_case("1vmin", TokenType::QntyLength, "1vmin")]
    #[test_case("3Foo", TokenType::QntyDimen, "3Foo")]
    #[test_case("10em10em", TokenType::QntyDimen, "10em10em")]
    #[test_case("1pxx", TokenType::QntyDimen, "1pxx")]
    fn parse_numbers(css: &str, token_type: TokenType, text: &str) {
        assert_token_eq!(scan_one(css), token_type, text);
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        let tokens = scan("1.");
        assert_token_eq!(tokens[0], TokenType::Integer, "1");
        assert_token_eq!(tokens[1], TokenType::Char, ".");
    }

    #[test_case("foo", TokenType::Ident, "foo")]
    #[test_case("-moz-box", TokenType::Ident, "-moz-box")]
    #[test_case("_x", TokenType::Ident, "_x")]
    #[test_case("\\41 bc", TokenType::Ident, "Abc")]
    #[test_case("a\\:b", TokenType::Ident, "a\\:b")]
    #[test_case("\\000020 red", TokenType::Ident, "\\000020 red")]
    #[test_case("rgb(", TokenType::Function, "rgb(")]
    #[test_case("ONLY", TokenType::Only, "only")]
    #[test_case("not", TokenType::Not, "not")]
    #[test_case("And", TokenType::And, "and")]
    #[test_case("@media", TokenType::AtKeyword, "@media")]
    #[test_case("@-epub-foo", TokenType::AtKeyword, "@-epub-foo")]
    #[test_case("#name\\name", TokenType::HashName, "#namename")]
    #[test_case("#123", TokenType::HashName, "#123")]
    fn parse_ident_tokens(css: &str, token_type: TokenType, text: &str) {
        assert_token_eq!(scan_one(css), token_type, text);
    }

    #[test]
    fn keyword_function() {
        let tokens = scan("not(");
        assert_token_eq!(tokens[0], TokenType::Function, "not(");
    }

    #[test]
    fn at_without_name() {
        let tokens = scan("@- ");
        assert_eq!(tokens.len(), 3);
        assert_token_eq!(tokens[0], TokenType::Char, "@");
        assert_token_eq!(tokens[1], TokenType::Char, "-");

        let tokens = scan("#");
        assert_token_eq!(tokens[0], TokenType::Char, "#");
    }

    #[test_case("'foo'", "foo"; "single quoted")]
    #[test_case("\"foo\"", "foo"; "double quoted")]
    #[test_case("'it\\'s'", "it\\'s")]
    #[test_case("\"a\\\nb\"", "ab")]
    #[test_case("\"a\\\r\nb\"", "ab")]
    #[test_case("'\\41'", "\\41")]
    fn parse_strings(css: &str, text: &str) {
        let token = scan_one(css);
        assert_token_eq!(token, TokenType::QuotedString, text);
        assert!(token.errors.is_empty());
    }

    #[test]
    fn unterminated_string() {
        let tokens = scan("'foo\n bar; x");
        assert_token_eq!(tokens[0], TokenType::QuotedString, "foo");
        assert_eq!(tokens[0].errors.len(), 1);
        assert_eq!(
            tokens[0].errors[0].code,
            crate::errors::CssErrorCode::ScannerIllegalChar
        );
        assert_token_eq!(tokens[1], TokenType::Char, ";");

        let token = scan_one("'foo");
        assert_eq!(
            token.errors[0].code,
            crate::errors::CssErrorCode::ScannerPrematureEof
        );
    }

    #[test_case("url(foo.png)", "url(foo.png)"; "plain")]
    #[test_case("URL( foo.png )", "url(foo.png)"; "uppercase with spaces")]
    #[test_case("url(\"foo.png\")", "url('foo.png')"; "double quoted")]
    #[test_case("url( 'foo.png' )", "url('foo.png')"; "single quoted with spaces")]
    #[test_case("url(\"it's.png\")", "url(\"it's.png\")"; "double quoted apostrophe")]
    #[test_case("url('it\\'s.png')", "url('it\\'s.png')"; "escaped apostrophe")]
    #[test_case("url(it's.png)", "url(it's.png)"; "unquoted apostrophe")]
    fn parse_uris(css: &str, text: &str) {
        let token = scan_one(css);
        assert_token_eq!(token, TokenType::Uri, text);
        assert!(token.errors.is_empty());
    }

    #[test_case("UTF-8", "'UTF-8'")]
    #[test_case("it's", "\"it's\""; "apostrophe")]
    #[test_case("say \"hi\"", "'say \"hi\"'")]
    #[test_case("it\\'s", "'it\\'s'"; "escaped apostrophe")]
    #[test_case("", "''")]
    fn quoting(value: &str, quoted: &str) {
        assert_eq!(quote_string(value), quoted);

        let token = scan_one(quoted);
        assert_token_eq!(token, TokenType::QuotedString, value);
    }

    #[test]
    fn broken_uris() {
        let token = scan_one("url(pic.png");
        assert_eq!(token.errors.len(), 1);

        let tokens = scan("url('pic.png' foo");
        assert_eq!(tokens.len(), 2);
        assert_eq!(error_count(&tokens), 1);
        assert_eq!(
            tokens[0].errors[0].code,
            crate::errors::CssErrorCode::ScannerIllegalSyntax
        );

        let token = scan_one("url('pic.png) foo");
        assert_eq!(token.errors.len(), 1);
    }

    #[test_case("U+0-7F", "U+0-7F")]
    #[test_case("u+4??", "U+4??")]
    #[test_case("U+0025-00FF", "U+0025-00FF")]
    fn parse_ranges(css: &str, text: &str) {
        let token = scan_one(css);
        assert_token_eq!(token, TokenType::Urange, text);
        assert!(token.errors.is_empty());
    }

    #[test]
    fn broken_ranges() {
        let tokens = scan("U+0?????? ");
        assert_eq!(tokens[0].token_type, TokenType::Urange);
        assert_eq!(error_count(&tokens), 1);

        let tokens = scan("U+ ");
        assert_token_eq!(tokens[0], TokenType::Ident, "U");
        assert_token_eq!(tokens[1], TokenType::Char, "+");

        let tokens = scan("\\U+A U+A");
        let ranges = tokens
            .iter()
            .filter(|t| t.token_type == TokenType::Urange)
            .count();
        assert_eq!(ranges, 1);
    }

    #[test_case("!important"; "plain")]
    #[test_case("! important"; "space after bang")]
    #[test_case("!IMPORTANT"; "uppercase")]
    #[test_case("! /* x */ important")]
    fn parse_important(css: &str) {
        assert_token_eq!(scan_one(css), TokenType::Important, "!important");
    }

    #[test]
    fn incomplete_important() {
        let tokens = scan("!importan  ");
        assert_eq!(tokens.len(), 3);
        assert_token_eq!(tokens[0], TokenType::Char, "!");
        assert_token_eq!(tokens[1], TokenType::Ident, "importan");
    }

    #[test_case("~=", TokenType::Includes)]
    #[test_case("|=", TokenType::DashMatch)]
    #[test_case("^=", TokenType::PrefixMatch)]
    #[test_case("$=", TokenType::SuffixMatch)]
    #[test_case("*=", TokenType::SubstringMatch)]
    #[test_case("<!--", TokenType::Cdo)]
    #[test_case("-->", TokenType::Cdc)]
    fn parse_operators(css: &str, token_type: TokenType) {
        assert_token_eq!(scan_one(css), token_type, css);
    }

    #[test]
    fn invalid_escape() {
        let token = scan_one("a\\0 b");
        assert_token_eq!(token, TokenType::Ident, "a\\0 b");
        assert_eq!(token.errors.len(), 1);
        assert_eq!(
            token.errors[0].code,
            crate::errors::CssErrorCode::ScannerMalformedEscape
        );
    }

    #[test]
    fn class_is_char_and_ident() {
        let tokens = scan(".foo");
        assert_token_eq!(tokens[0], TokenType::Char, ".");
        assert_token_eq!(tokens[1], TokenType::Ident, "foo");
    }

    #[test]
    fn trailing_backslash() {
        let token = scan_one("\\");
        assert_token_eq!(token, TokenType::Char, "\\");
        assert_eq!(token.errors.len(), 1);
    }

    #[test]
    fn token_locations() {
        let tokens = scan("a {\n  b: c }");
        let b = &tokens[4];
        assert_token_eq!(b, TokenType::Ident, "b");
        assert_eq!((b.location.line, b.location.column), (2, 3));
        assert_eq!(b.location.offset, 6);
        assert_eq!(&*b.location.source_id, NO_SOURCE_ID);
    }

    #[test]
    fn token_helpers() {
        let tokens = scan("{ x");
        assert!(tokens[0].is_char('{'));
        assert_eq!(tokens[0].char_value(), Some('{'));
        assert!(tokens[1].is_whitespace());
        assert!(tokens[2].is_ident());
        assert_eq!(tokens[2].char_value(), None);
        assert!(TokenType::QntyDimen.is_quantity());
        assert!(!TokenType::Urange.is_quantity());
    }

    fn kinds(tokens: &[Token]) -> Vec<(TokenType, &str)> {
        tokens.iter().map(|t| (t.token_type, t.text.as_str())).collect()
    }

    #[test_case("-5.6 .5 10PX 44kHz 3Foo 10em10em 1pxx"; "numbers and units")]
    #[test_case("\\41 bc a\\:b \\000020 red #name\\name ONLY @-epub-foo"; "idents and escapes")]
    #[test_case("'foo' \"foo\" 'it\\'s' \"a\\\nb\" '\\41' \"it's\" 'say \"hi\"'"; "strings")]
    #[test_case("URL( foo.png ) url(\"it's.png\") url('it\\'s.png') url(it's.png)"; "uris")]
    #[test_case("u+4?? U+0025-00FF ! /* x */ important ~= |= <!-- -->"; "ranges and operators")]
    fn rescan_is_stable(css: &str) {
        let first = scan(css);
        let canonical: String = first
            .iter()
            .map(|t| match t.token_type {
                TokenType::QuotedString => quote_string(&t.text),
                TokenType::Comment => format!("/*{}*/", t.text),
                _ => t.text.clone(),
            })
            .collect();

        let second = scan(&canonical);
        assert_eq!(kinds(&second), kinds(&first), "{canonical}");
        assert_eq!(error_count(&second), 0);
    }
}
