//! Student identifier value object.
//!
//! A student identifier is `<MAJOR CODE><YYYY><NNN>`, e.g. `CS2024007`:
//! uppercased major code, four-digit enrollment year, three-digit
//! zero-padded sequence. Sequence numbers are scoped by (major, year),
//! monotonically increasing and never reused.

use serde::{Deserialize, Serialize};

use crate::config::{STUDENT_ID_MAX_SEQUENCE, STUDENT_ID_SEQUENCE_WIDTH};
use crate::errors::{AppError, AppResult};

/// Rendered student identifier. Computed once at registration, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentIdentifier(String);

impl StudentIdentifier {
    /// Compose an identifier from its scope and sequence number.
    ///
    /// Sequence numbers above 999 no longer fit the fixed-width format;
    /// overflow is an explicit `SequenceExhausted` failure rather than a
    /// silently widened string.
    pub fn compose(major_code: &str, year: i32, sequence: u32) -> AppResult<Self> {
        if sequence == 0 || sequence > STUDENT_ID_MAX_SEQUENCE {
            return Err(AppError::SequenceExhausted);
        }
        if !(1000..=9999).contains(&year) {
            return Err(AppError::validation("Enrollment year must have four digits"));
        }

        Ok(Self(format!(
            "{}{}{:0width$}",
            major_code.to_uppercase(),
            year,
            sequence,
            width = STUDENT_ID_SEQUENCE_WIDTH
        )))
    }

    /// Wrap an identifier already stored in the database.
    pub fn from_string(value: String) -> Self {
        Self(value)
    }

    /// The trailing sequence number encoded in the identifier.
    ///
    /// Zero when the identifier does not end in digits.
    pub fn sequence(&self) -> u32 {
        let start = self
            .0
            .char_indices()
            .rev()
            .nth(STUDENT_ID_SEQUENCE_WIDTH - 1)
            .map_or(0, |(index, _)| index);
        self.0[start..].parse().unwrap_or(0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for StudentIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
