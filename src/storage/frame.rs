//! Self-delimiting field frames.
//!
//! A frame is `<length>#<payload>`, where `length` is the decimal byte length
//! of the payload. Before framing, the field text is escaped so that a record
//! never spans more than one line:
//!
//! | text | payload |
//! |------|---------|
//! | `\`  | `\\`    |
//! | LF   | `\n`    |
//! | CR   | `\r`    |
//!
//! Any other character, including `#` and digits, is stored verbatim; the
//! length prefix alone determines where the field ends.


const MARKER: char = '#';

/// Errors that can occur when decoding a sequence of frames.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// A frame did not start with a decimal length.
    #[error("expected a field length at byte {0}")]
    MissingLength(usize),
    /// The length prefix was not terminated by the marker.
    #[error("field length at byte {0} is not followed by '#'")]
    MissingMarker(usize),
    /// The length prefix does not fit in memory.
    #[error("field length at byte {0} is too large")]
    LengthOverflow(usize),
    /// The payload is shorter than its declared length.
    #[error("field at byte {offset} declares {expected} bytes but only {available} remain")]
    Truncated {
        /// Byte offset of the frame's payload.
        offset: usize,
        /// Declared payload length.
        expected: usize,
        /// Bytes remaining in the input.
        available: usize,
    },
    /// The declared length ends inside a multi-byte character.
    #[error("field at byte {0} ends inside a character")]
    SplitCharacter(usize),
    /// The payload contains an unknown or dangling escape sequence.
    #[error("invalid escape sequence in field at byte {0}")]
    InvalidEscape(usize),
}

/// Encodes field values into frames.
#[derive(Debug, Default, Clone)]
pub struct Serialiser {
    buffer: String,
}

impl Serialiser {
    /// Creates an empty serialiser.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Appends one framed field.
    pub fn field(&mut self, value: &str) -> &mut Self {
        let payload = escape(value);
        self.buffer.push_str(&payload.len().to_string());
        self.buffer.push(MARKER);
        self.buffer.push_str(&payload);
        self
    }

    /// Returns the encoded text.
    #[must_use]
    pub fn finish(self) -> String {
        self.buffer
    }
}

/// Frames a single field value.
#[must_use]
pub fn encode_field(value: &str) -> String {
    let mut serialiser = Serialiser::new();
    serialiser.field(value);
    serialiser.finish()
}

/// Decodes a sequence of frames one at a time.
///
/// Iteration stops after the first error.
#[derive(Debug, Clone)]
pub struct Deserialiser<'a> {
    input: &'a str,
    offset: usize,
    failed: bool,
}

impl<'a> Deserialiser<'a> {
    /// Creates a deserialiser over the given text.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            failed: false,
        }
    }

    /// Returns `true` if all input has been consumed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// The input that has not been decoded yet.
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        &self.input[self.offset..]
    }

    /// Decodes the next frame, if any input remains.
    ///
    /// # Errors
    ///
    /// Returns an error if the next frame is malformed.
    pub fn next_field(&mut self) -> Result<Option<String>, FrameError> {
        if self.is_finished() {
            return Ok(None);
        }
        let (offset, raw) = self.next_raw()?;
        unescape(raw, offset).map(Some)
    }

    /// Returns the offset and payload of the next frame without unescaping it.
    fn next_raw(&mut self) -> Result<(usize, &'a str), FrameError> {
        let start = self.offset;
        let rest = &self.input[start..];

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(FrameError::MissingLength(start));
        }
        if !rest[digits..].starts_with(MARKER) {
            return Err(FrameError::MissingMarker(start));
        }
        let expected: usize = rest[..digits]
            .parse()
            .map_err(|_| FrameError::LengthOverflow(start))?;

        let payload_start = start + digits + MARKER.len_utf8();
        let available = self.input.len() - payload_start;
        if expected > available {
            return Err(FrameError::Truncated {
                offset: payload_start,
                expected,
                available,
            });
        }

        let payload = self
            .input
            .get(payload_start..payload_start + expected)
            .ok_or(FrameError::SplitCharacter(payload_start))?;
        self.offset = payload_start + expected;
        Ok((payload_start, payload))
    }
}

impl Iterator for Deserialiser<'_> {
    type Item = Result<String, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_field().transpose();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

/// Decodes a full line of frames into its field values.
///
/// # Errors
///
/// Returns an error if any frame is malformed.
pub fn decode_fields(input: &str) -> Result<Vec<String>, FrameError> {
    Deserialiser::new(input).collect()
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn unescape(payload: &str, offset: usize) -> Result<String, FrameError> {
    let mut value = String::with_capacity(payload.len());
    let mut chars = payload.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => value.push('\\'),
            Some('n') => value.push('\n'),
            Some('r') => value.push('\r'),
            _ => return Err(FrameError::InvalidEscape(offset)),
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn frames_are_length_prefixed() {
        assert_eq!(encode_field("CS2113"), "6#CS2113");
        assert_eq!(encode_field(""), "0#");
    }

    #[test_case(""; "empty")]
    #[test_case("Software Engineering"; "plain")]
    #[test_case("12#34#"; "looks like a frame")]
    #[test_case("back\\slash"; "backslash")]
    #[test_case("line\nbreak\r\n"; "newlines")]
    #[test_case("Théorie des nombres: 数论"; "multi-byte")]
    fn single_field_survives(value: &str) {
        let encoded = encode_field(value);
        assert!(!encoded.contains('\n'));
        assert_eq!(decode_fields(&encoded).unwrap(), vec![value.to_string()]);
    }

    #[test]
    fn many_fields_survive_concatenation() {
        let values = ["a#b", "", "3#xyz", "\\n"];
        let mut serialiser = Serialiser::new();
        for value in values {
            serialiser.field(value);
        }
        let encoded = serialiser.finish();

        assert_eq!(decode_fields(&encoded).unwrap(), values);
    }

    #[test]
    fn empty_input_has_no_fields() {
        assert_eq!(decode_fields("").unwrap(), Vec::<String>::new());
    }

    #[test_case("abc", FrameError::MissingLength(0); "no length")]
    #[test_case("3abc", FrameError::MissingMarker(0); "no marker")]
    #[test_case("2#ab5#abc", FrameError::Truncated { offset: 6, expected: 5, available: 3 }; "truncated")]
    #[test_case("99999999999999999999999#", FrameError::LengthOverflow(0); "overflow")]
    #[test_case("1#é", FrameError::SplitCharacter(2); "split character")]
    #[test_case("2#\\x", FrameError::InvalidEscape(2); "unknown escape")]
    #[test_case("1#\\", FrameError::InvalidEscape(2); "dangling escape")]
    fn malformed_input_is_rejected(input: &str, expected: FrameError) {
        assert_eq!(decode_fields(input), Err(expected));
    }

    #[test]
    fn iteration_stops_after_error() {
        let mut fields = Deserialiser::new("1#a#");
        assert_eq!(fields.next(), Some(Ok("a".to_string())));
        assert!(matches!(fields.next(), Some(Err(_))));
        assert_eq!(fields.next(), None);
    }
}
