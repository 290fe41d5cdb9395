pub struct UnicodeChar;

impl UnicodeChar {
    pub const NULL: char = '\u{0000}';
    /// First code point that counts as a name character without escaping
    pub const NON_ASCII_START: char = '\u{0080}';
}
