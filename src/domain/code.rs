use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// A validated module code such as `CS2113` or `CS1010S`.
///
/// Codes are case-normalized: surrounding whitespace is trimmed and letters
/// are upper-cased before validation. After normalization the code must be
/// non-empty and contain only ASCII letters and digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModuleCode(NonEmptyString);

impl ModuleCode {
    /// Creates a new `ModuleCode` from a string, normalizing its case.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCodeError` if the normalized string is empty or
    /// contains characters other than ASCII letters and digits.
    pub fn new(s: String) -> Result<Self, InvalidCodeError> {
        let normalized = s.trim().to_ascii_uppercase();

        if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidCodeError(s));
        }

        let non_empty = NonEmptyString::new(normalized).map_err(|_| InvalidCodeError(s))?;

        Ok(Self(non_empty))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for ModuleCode {
    type Error = InvalidCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ModuleCode {
    type Error = InvalidCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl AsRef<str> for ModuleCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for ModuleCode {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for ModuleCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for ModuleCode {
    type Err = InvalidCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Error returned when a string is not a valid module code.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid module code '{0}': must be non-empty and contain only letters and digits")]
pub struct InvalidCodeError(String);

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("CS2113", "CS2113"; "already uppercase")]
    #[test_case("cs1010s", "CS1010S"; "lowercase is normalized")]
    #[test_case("  ma1521 ", "MA1521"; "whitespace is trimmed")]
    fn valid_codes(input: &str, expected: &str) {
        let code = ModuleCode::from_str(input).unwrap();
        assert_eq!(code.as_str(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "only whitespace")]
    #[test_case("CS 2113"; "inner space")]
    #[test_case("CS2040%"; "wildcard")]
    #[test_case("CS1010:D"; "grade suffix")]
    fn invalid_codes(input: &str) {
        assert!(ModuleCode::from_str(input).is_err());
    }

    #[test]
    fn error_keeps_original_input() {
        let error = ModuleCode::from_str("cs 1").unwrap_err();
        assert_eq!(error, InvalidCodeError("cs 1".to_string()));
    }

    #[test]
    fn codes_compare_after_normalization() {
        let a: ModuleCode = "cs2030".parse().unwrap();
        let b: ModuleCode = "CS2030".parse().unwrap();
        assert_eq!(a, b);
    }
}
