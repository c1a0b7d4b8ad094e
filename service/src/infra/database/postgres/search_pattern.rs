//! [`SearchPattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// Characters having a special meaning in a Postgres regular expression.
const REGEX_METACHARACTERS: &[char] = &[
    '\\', '.', '^', '$', '|', '?', '*', '+', '(', ')', '[', ']', '{', '}',
];

/// Case-insensitive regular expression (`~*`) matching any text containing
/// the literal input.
///
/// The pattern is left unanchored, so a match anywhere in the text counts.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct SearchPattern(String);

impl SearchPattern {
    /// Creates a new [`SearchPattern`] out of the given `input`, escaping
    /// every regular expression metacharacter in it.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let mut pattern = String::with_capacity(input.len() * 2);
        for c in input.chars() {
            if REGEX_METACHARACTERS.contains(&c) {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        Self(pattern)
    }
}

impl AsRef<str> for SearchPattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
