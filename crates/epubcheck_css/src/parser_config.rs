use crate::location::NO_SOURCE_ID;
use epubcheck_shared::byte_stream::Location;

/// Context defines which grammar the input is parsed with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Context {
    /// A complete stylesheet, linked or embedded in a `<style>` element
    #[default]
    Stylesheet,
    /// The declarations of a `style` attribute
    StyleAttribute,
}

/// ParserConfig holds the configuration for the parser
#[derive(Clone, Debug, PartialEq)]
pub struct ParserConfig {
    /// Context defines how the data needs to be parsed
    pub context: Context,
    /// Id of the source, reported in every location
    pub source_id: String,
    /// Location of the first character. A style attribute reports positions relative to
    /// its host document.
    pub location: Location,
    /// Log errors the error handler wants to abort on, and continue parsing
    pub ignore_errors: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            context: Context::Stylesheet,
            source_id: NO_SOURCE_ID.to_string(),
            location: Location::default(),
            ignore_errors: false,
        }
    }
}

impl ParserConfig {
    /// Configuration for a stylesheet with the given source id
    #[must_use]
    pub fn stylesheet(source_id: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            ..Self::default()
        }
    }

    /// Configuration for a style attribute found at `location` in the given document
    #[must_use]
    pub fn style_attribute(source_id: &str, location: Location) -> Self {
        Self {
            context: Context::StyleAttribute,
            source_id: source_id.to_string(),
            location,
            ignore_errors: false,
        }
    }
}
