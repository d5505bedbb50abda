//! Station code types.

use std::fmt;

/// Error returned when parsing an invalid station code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code {input:?}: {reason}")]
pub struct InvalidStationCode {
    input: String,
    reason: &'static str,
}

impl InvalidStationCode {
    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A 4-character ICAO station code, e.g. `EGLL`.
///
/// Every character is an ASCII letter or digit, so the code can be
/// substituted into an upstream URL as-is. Case is preserved.
///
/// # Examples
///
/// ```
/// use metar_server::domain::StationCode;
///
/// let egll = StationCode::parse("EGLL").unwrap();
/// assert_eq!(egll.as_str(), "EGLL");
///
/// // Wrong length is rejected
/// assert!(StationCode::parse("EGL").is_err());
/// assert!(StationCode::parse("EGLLX").is_err());
///
/// // The normalising parser trims and upper-cases first
/// assert_eq!(StationCode::parse_normalized(" egll ").unwrap(), egll);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StationCode([u8; 4]);

impl StationCode {
    /// Parse a station code.
    ///
    /// The input must be exactly 4 ASCII alphanumeric characters.
    pub fn parse(s: &str) -> Result<Self, InvalidStationCode> {
        let reject = |reason| InvalidStationCode {
            input: s.to_string(),
            reason,
        };

        let bytes = s.as_bytes();

        if bytes.is_empty() {
            return Err(reject("must not be empty"));
        }

        if bytes.len() != 4 {
            return Err(reject("must be exactly 4 characters"));
        }

        if !bytes.iter().all(u8::is_ascii_alphanumeric) {
            return Err(reject("must be ASCII letters or digits"));
        }

        Ok(StationCode([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Parse after trimming whitespace and converting to uppercase.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidStationCode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII alphanumerics are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.as_str())
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Roundtrip: parse then as_str returns the original
        #[test]
        fn roundtrip(s in "[A-Za-z0-9]{4}") {
            let code = StationCode::parse(&s).unwrap();
            prop_assert_eq!(code.as_str(), s.as_str());
        }

        /// Wrong-length strings are always rejected
        #[test]
        fn wrong_length_rejected(s in "[A-Z]{0,3}|[A-Z]{5,10}") {
            prop_assert!(StationCode::parse(&s).is_err());
        }

        /// Any non-alphanumeric character is rejected
        #[test]
        fn punctuation_rejected(s in "[A-Z]{3}[-/?&#%. ]") {
            prop_assert!(StationCode::parse(&s).is_err());
        }
    }
}
