use derive_more::Display;
use serde::Serialize;
use std::fmt;
use std::fmt::{Debug, Formatter};

pub const CHAR_LF: char = '\u{000A}';
pub const CHAR_CR: char = '\u{000D}';
pub const CHAR_FF: char = '\u{000C}';
pub const CHAR_TAB: char = '\u{0009}';
pub const CHAR_SPACE: char = '\u{0020}';

/// Encodings that can be announced by a byte order mark at the start of a stylesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum Encoding {
    /// Stream is of UTF8 characters
    #[display("UTF-8")]
    UTF8,
    // Stream consists of 16-bit UTF characters (Little Endian)
    #[display("UTF-16LE")]
    UTF16LE,
    // Stream consists of 16-bit UTF characters (Big Endian)
    #[display("UTF-16BE")]
    UTF16BE,
}

impl Encoding {
    /// Byte order mark that announces this encoding
    #[must_use]
    pub fn bom(&self) -> &'static [u8] {
        match self {
            Encoding::UTF8 => b"\xEF\xBB\xBF",
            Encoding::UTF16LE => b"\xFF\xFE",
            Encoding::UTF16BE => b"\xFE\xFF",
        }
    }

    /// Number of bytes in a single code unit
    #[must_use]
    pub fn unit_size(&self) -> usize {
        match self {
            Encoding::UTF8 => 1,
            Encoding::UTF16LE | Encoding::UTF16BE => 2,
        }
    }

    /// The decoder for this encoding
    #[must_use]
    pub fn decoder(&self) -> &'static encoding_rs::Encoding {
        match self {
            Encoding::UTF8 => encoding_rs::UTF_8,
            Encoding::UTF16LE => encoding_rs::UTF_16LE,
            Encoding::UTF16BE => encoding_rs::UTF_16BE,
        }
    }
}

/// Defines a single character in the stream. End of stream is denoted as a separate element so
/// lookahead past the end never fails.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Character {
    /// Standard UTF character
    Ch(char),
    /// Stream buffer empty and closed
    StreamEnd,
}

use Character::*;

/// Converts the given character to a char. End of stream is converted to 0x0000
impl From<Character> for char {
    fn from(c: Character) -> Self {
        match c {
            Ch(c) => c,
            StreamEnd => 0x0000 as char,
        }
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Ch(ch) => write!(f, "{ch}"),
            StreamEnd => write!(f, "StreamEnd"),
        }
    }
}

impl Character {
    /// Returns true when the character is whitespace in the CSS sense (space, tab, lf, cr, ff)
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Ch(CHAR_SPACE | CHAR_TAB | CHAR_LF | CHAR_CR | CHAR_FF))
    }

    /// Returns true when the character is an ASCII digit
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Ch(c) if c.is_ascii_digit())
    }

    /// Returns true when the character is a CSS newline (lf, cr or ff)
    #[must_use]
    pub fn is_newline(&self) -> bool {
        matches!(self, Ch(CHAR_LF | CHAR_CR | CHAR_FF))
    }
}

/// A fully decoded stream of characters with arbitrary lookahead. The scanner reads the whole
/// input in one pass, so the stream only ever moves forward.
pub struct CharStream {
    /// Decoded characters
    buffer: Vec<char>,
    /// Index of the next character to read
    position: usize,
    /// Keeps track of the line/column of the next character
    location: LocationHandler,
}

impl Default for CharStream {
    fn default() -> Self {
        Self::new(Location::default())
    }
}

impl CharStream {
    /// Create a new empty stream. The start location is reported for the first character.
    #[must_use]
    pub fn new(start_location: Location) -> Self {
        Self {
            buffer: Vec::new(),
            position: 0,
            location: LocationHandler::new(start_location),
        }
    }

    /// Populates the stream with the characters of the given string and rewinds it
    pub fn read_from_str(&mut self, s: &str) {
        self.buffer = s.chars().collect();
        self.reset_stream();
    }

    /// Moves back to the start of the stream
    pub fn reset_stream(&mut self) {
        self.position = 0;
        let start = self.location.start_location.clone();
        self.location = LocationHandler::new(start);
    }

    /// Returns the character at the current position without consuming it
    #[must_use]
    pub fn read(&self) -> Character {
        self.look_ahead(0)
    }

    /// Returns the character at `offset` positions from the current one without consuming it
    #[must_use]
    pub fn look_ahead(&self, offset: usize) -> Character {
        match self.buffer.get(self.position + offset) {
            Some(c) => Ch(*c),
            None => StreamEnd,
        }
    }

    /// Consumes and returns the current character
    pub fn read_and_next(&mut self) -> Character {
        let c = self.read();
        if let Ch(_) = c {
            self.position += 1;
            self.location.inc(c);
        }
        c
    }

    /// Skips `n` characters, or less when the end of the stream is reached first
    pub fn next_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.read_and_next() == StreamEnd {
                break;
            }
        }
    }

    /// Returns true when all characters have been consumed
    #[must_use]
    pub fn eof(&self) -> bool {
        self.position >= self.buffer.len()
    }

    /// Index of the next character to read
    #[must_use]
    pub fn tell(&self) -> usize {
        self.position
    }

    /// Location of the next character to read
    #[must_use]
    pub fn location(&self) -> Location {
        self.location.cur_location.clone()
    }

    /// Returns the next `len` characters as a string, without consuming them
    #[must_use]
    pub fn get_slice(&self, len: usize) -> String {
        let end = (self.position + len).min(self.buffer.len());
        self.buffer[self.position..end].iter().collect()
    }
}

/// Location holds the start position of the given element in the data source
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Line number, starting with 1
    pub line: usize,
    /// Column number, starting with 1
    pub column: usize,
    /// Character offset, starting with 0
    pub offset: usize,
}

impl Default for Location {
    /// Default to line 1, column 1
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl Location {
    /// Create a new Location
    #[must_use]
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Debug for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

/// LocationHandler is a wrapper that will deal with line/column locations in the stream
pub struct LocationHandler {
    /// The start offset of the location. Normally this is 1:1, but can be different in case of inline streams
    pub start_location: Location,
    /// The current location of the stream
    pub cur_location: Location,
    /// Previously consumed character, needed to fold CR+LF into one line break
    prev: Option<char>,
}

impl LocationHandler {
    /// Create a new LocationHandler. Start_location can be set in case the stream is
    /// not starting at 1:1
    #[must_use]
    pub fn new(start_location: Location) -> Self {
        Self {
            cur_location: start_location.clone(),
            start_location,
            prev: None,
        }
    }

    /// Will increase the current location based on the given (consumed) character
    pub fn inc(&mut self, ch: Character) {
        match ch {
            Ch(CHAR_LF) if self.prev == Some(CHAR_CR) => {
                // second half of a CR+LF pair
                self.cur_location.offset += 1;
            }
            Ch(CHAR_LF | CHAR_CR | CHAR_FF) => {
                self.cur_location.line += 1;
                self.cur_location.column = 1;
                self.cur_location.offset += 1;
            }
            Ch(_) => {
                self.cur_location.column += 1;
                self.cur_location.offset += 1;
            }
            StreamEnd => {}
        }

        if let Ch(c) = ch {
            self.prev = Some(c);
        }
    }
}
