//! Installed software version
//!
//! Only the leading `major.minor` component matters for configuration rules.
//! Parsing is permissive: whatever numeric prefix can be read is used, and a
//! string without one becomes `0.0`, at which no rule applies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `major.minor` software version, ordered numerically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    /// Major component
    pub major: u32,
    /// Minor component
    pub minor: u32,
}

/// Outcome of a permissive version parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedVersion {
    /// Best-effort version
    pub version: Version,
    /// False when part of the input had to be ignored or defaulted
    pub exact: bool,
}

impl Version {
    /// Creates a version from its components
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parses the leading `major.minor` of a dotted version string
    ///
    /// `"4.0.12"` → `4.0`, `"3"` → `3.0`, `"5.0beta1"` → `5.0`,
    /// `"latest"` → `0.0`. The `exact` flag tells callers whether to warn.
    ///
    /// # Examples
    ///
    /// ```
    /// use zbx_provision::domain::Version;
    ///
    /// let parsed = Version::parse_lenient("3.4.15");
    /// assert_eq!(parsed.version, Version::new(3, 4));
    /// assert!(parsed.exact);
    ///
    /// let parsed = Version::parse_lenient("trunk");
    /// assert_eq!(parsed.version, Version::new(0, 0));
    /// assert!(!parsed.exact);
    /// ```
    pub fn parse_lenient(input: &str) -> ParsedVersion {
        let input = input.trim();
        let (major, rest) = leading_number(input);
        let Some(major) = major else {
            return ParsedVersion {
                version: Version::new(0, 0),
                exact: false,
            };
        };

        let (minor, rest) = match rest.strip_prefix('.') {
            Some(after_dot) => leading_number(after_dot),
            None => (None, rest),
        };

        // Anything after major.minor other than further dotted numbers is noise.
        let tail_ok = rest.is_empty()
            || (rest.starts_with('.')
                && rest[1..]
                    .split('.')
                    .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())));

        ParsedVersion {
            version: Version::new(major, minor.unwrap_or(0)),
            exact: minor.is_some() && tail_ok,
        }
    }
}

fn leading_number(input: &str) -> (Option<u32>, &str) {
    let end = input
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    if end == 0 {
        return (None, input);
    }
    (input[..end].parse().ok(), &input[end..])
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("3.0", 3, 0, true; "plain")]
    #[test_case("4.0.12", 4, 0, true; "patch level")]
    #[test_case("3.10", 3, 10, true; "two digit minor")]
    #[test_case("3", 3, 0, false; "major only")]
    #[test_case("5.0beta1", 5, 0, false; "suffix")]
    #[test_case("", 0, 0, false; "empty")]
    #[test_case("latest", 0, 0, false; "non numeric")]
    fn test_parse_lenient(input: &str, major: u32, minor: u32, exact: bool) {
        let parsed = Version::parse_lenient(input);
        assert_eq!(parsed.version, Version::new(major, minor));
        assert_eq!(parsed.exact, exact);
    }

    #[test]
    fn test_numeric_not_lexical_ordering() {
        assert!(Version::new(3, 10) > Version::new(3, 4));
        assert!(Version::new(10, 0) > Version::new(9, 9));
        assert!(Version::new(3, 4) >= Version::new(3, 4));
    }

    #[test]
    fn test_display() {
        assert_eq!(Version::new(3, 4).to_string(), "3.4");
    }
}
