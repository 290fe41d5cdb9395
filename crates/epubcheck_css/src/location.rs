use epubcheck_shared::byte_stream::Location;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Source id used when the CSS has no system identifier of its own (inline or generated data)
pub const NO_SOURCE_ID: &str = "VIRTUAL";

/// Position of a token, construct or diagnostic, together with the source it was found in.
/// The source id tells a style attribute's host document apart from a linked stylesheet.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CssLocation {
    pub source_id: Arc<str>,
    /// Line number, starting with 1
    pub line: usize,
    /// Column number, starting with 1
    pub column: usize,
    /// Character offset, starting with 0
    pub offset: usize,
}

impl CssLocation {
    #[must_use]
    pub fn new(source_id: Arc<str>, location: &Location) -> Self {
        Self {
            source_id,
            line: location.line,
            column: location.column,
            offset: location.offset,
        }
    }

    /// Returns the line/column part of this location
    #[must_use]
    pub fn location(&self) -> Location {
        Location::new(self.line, self.column, self.offset)
    }
}

impl Default for CssLocation {
    fn default() -> Self {
        Self::new(Arc::from(NO_SOURCE_ID), &Location::default())
    }
}

impl fmt::Debug for CssLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{}:{})", self.source_id, self.line, self.column)
    }
}

impl fmt::Display for CssLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_id, self.line, self.column)
    }
}
