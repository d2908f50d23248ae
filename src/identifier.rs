//! The `Identifier` type: one canonical, email-shaped record.

use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;

/// A trimmed, lowercased token of the shape `local@domain.tld`. Two raw
/// strings that differ only by case or surrounding whitespace produce equal
/// `Identifier`s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Canonicalise `raw`, returning `None` if it doesn't have identifier shape.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Identifier> {
        let trimmed = raw.trim();
        if has_identifier_shape(trimmed) {
            Some(Identifier(trimmed.to_lowercase()))
        } else {
            None
        }
    }

    /// Wrap a string the caller built in canonical form already.
    pub(crate) fn from_canonical(canonical: String) -> Identifier {
        debug_assert!(has_identifier_shape(&canonical), "not an identifier: {canonical}");
        debug_assert_eq!(canonical, canonical.trim().to_lowercase());
        Identifier(canonical)
    }

    /// The canonical text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the canonical `String`
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Matches `non-space+ "@" non-space+ "." non-space+`, where no part may
/// itself contain an `@`.
fn has_identifier_shape(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else { return false };
    let plain = |part: &str| {
        !part.is_empty() && !part.contains(|c: char| c == '@' || c.is_whitespace())
    };
    if !plain(local) || !plain(domain) {
        return false;
    }
    // Some dot in the domain must have a character on each side of it
    let domain = domain.as_bytes();
    domain.len() >= 3 && domain[1..domain.len() - 1].contains(&b'.')
}

#[allow(clippy::pedantic)]
#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_trims_and_lowercases() {
        let id = Identifier::parse("  Alice.Smith@Example.COM \t").unwrap();
        assert_eq!(id.as_str(), "alice.smith@example.com");
        assert_eq!(Identifier::parse("ALICE.SMITH@example.com"), Some(id));
    }

    #[test]
    fn accepts_minimal_shapes() {
        for ok in ["a@b.c", "user+tag@mail.example.org", "x@y.z.", "x@.y.z", "ünï@cödé.de"] {
            assert!(Identifier::parse(ok).is_some(), "should accept {ok:?}");
        }
    }

    #[test]
    fn rejects_everything_else() {
        for bad in [
            "",
            "   ",
            "email",
            "plainaddress",
            "@example.com",
            "user@",
            "user@example",
            "user@.com",
            "user@example.",
            "a@@b.c",
            "a@b@c.d",
            "first last@example.com",
            "user@exa mple.com",
        ] {
            assert!(Identifier::parse(bad).is_none(), "should reject {bad:?}");
        }
    }
}
