//! Input stage: byte order mark and `@charset` detection on raw stylesheet bytes
use epubcheck_shared::byte_stream::Encoding;
use epubcheck_shared::errors::{CssError, CssResult};

/// Maximum number of bytes examined while looking for a `@charset` rule
const MAX_CHARSET_BYTES: usize = 256;

/// BOMs in the order they are tried
const BOM_ENCODINGS: [Encoding; 3] = [Encoding::UTF8, Encoding::UTF16BE, Encoding::UTF16LE];

/// What the first bytes of a stylesheet announce about its encoding. Both values are advisory:
/// reconciling a BOM with a conflicting `@charset` is left to the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sniffed {
    pub bom: Option<Encoding>,
    /// Value of a leading `@charset "..."` rule
    pub charset: Option<String>,
}

/// Detects the byte order mark and the `@charset` declaration of a stylesheet
#[must_use]
pub fn sniff(bytes: &[u8]) -> Sniffed {
    let bom = detect_bom(bytes);
    let offset = bom.map_or(0, |encoding| encoding.bom().len());
    let charset = detect_charset(&bytes[offset..], bom.unwrap_or(Encoding::UTF8));

    log::debug!("detected BOM: {bom:?}, charset: {charset:?}");
    Sniffed { bom, charset }
}

fn detect_bom(bytes: &[u8]) -> Option<Encoding> {
    BOM_ENCODINGS
        .into_iter()
        .find(|encoding| bytes.starts_with(encoding.bom()))
}

/// Reads characters one code unit at a time, looking for `@charset "name"`. Only the
/// low-order byte of a UTF-16 unit is looked at.
fn detect_charset(bytes: &[u8], encoding: Encoding) -> Option<String> {
    let unit_size = encoding.unit_size();
    let limit = bytes.len().min(MAX_CHARSET_BYTES);

    let mut seen = String::new();
    let mut count = 0;
    let mut open_quote: Option<(char, usize)> = None;

    for unit in bytes[..limit].chunks_exact(unit_size) {
        let byte = match encoding {
            Encoding::UTF16BE => unit[unit_size - 1],
            Encoding::UTF8 | Encoding::UTF16LE => unit[0],
        };
        let c = char::from(byte);
        seen.push(c);
        count += 1;

        if (count == 1 && c != '@')
            || matches!(c, ';' | '{' | '}')
            || (count == 8 && seen != "@charset")
        {
            return None;
        }

        match open_quote {
            None if matches!(c, '"' | '\'') => open_quote = Some((c, seen.len())),
            Some((quote, start)) if quote == c => {
                let value = &seen[start..seen.len() - 1];
                return (!value.is_empty()).then(|| value.to_string());
            }
            _ => {}
        }
    }

    None
}

/// Raw bytes of a stylesheet together with what has been sniffed from them
#[derive(Clone, Debug)]
pub struct CssSource {
    source_id: String,
    bytes: Vec<u8>,
    sniffed: Sniffed,
}

impl CssSource {
    #[must_use]
    pub fn new(source_id: &str, bytes: Vec<u8>) -> Self {
        let sniffed = sniff(&bytes);
        Self {
            source_id: source_id.to_string(),
            bytes,
            sniffed,
        }
    }

    /// Source for text that has already been decoded
    #[must_use]
    pub fn from_str(source_id: &str, text: &str) -> Self {
        Self::new(source_id, text.as_bytes().to_vec())
    }

    #[must_use]
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    #[must_use]
    pub fn bom(&self) -> Option<Encoding> {
        self.sniffed.bom
    }

    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.sniffed.charset.as_deref()
    }

    /// Decodes the bytes with the encoding of the BOM, or else the declared charset, or else
    /// UTF-8. The BOM itself is not part of the result.
    pub fn decode(&self) -> CssResult<String> {
        let (encoding, bytes) = match self.sniffed.bom {
            Some(bom) => (bom.decoder(), &self.bytes[bom.bom().len()..]),
            None => (self.charset_encoding(), self.bytes.as_slice()),
        };

        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if had_errors {
            return Err(CssError::new(&format!(
                "{} can not be decoded as {}",
                self.source_id,
                encoding.name()
            )));
        }

        Ok(text.into_owned())
    }

    fn charset_encoding(&self) -> &'static encoding_rs::Encoding {
        let Some(label) = self.charset() else {
            return encoding_rs::UTF_8;
        };

        match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(encoding) => encoding,
            None => {
                log::warn!(
                    "{}: unknown charset '{label}', decoding as UTF-8",
                    self.source_id
                );
                encoding_rs::UTF_8
            }
        }
    }
}
