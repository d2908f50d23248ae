//! SHA-256 digests of identifiers.
//!
//! A `DigestToken` is only ever used as a comparison key. It gives no privacy
//! against whoever supplied the other dataset: anyone holding a candidate
//! identifier can hash it and test for membership.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::identifier::Identifier;

/// Width of a token in bytes
pub const TOKEN_LEN: usize = 32;

/// The SHA-256 digest of an identifier's canonical form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DigestToken([u8; TOKEN_LEN]);

impl DigestToken {
    /// The raw digest bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; TOKEN_LEN] {
        &self.0
    }

    /// Lowercase hex, 64 characters
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for DigestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DigestToken({})", self.to_hex())
    }
}

impl fmt::Display for DigestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash `id`. An `Identifier` is already trimmed and lowercased, so equal
/// identifiers always give equal tokens, in any process.
#[must_use]
pub fn digest(id: &Identifier) -> DigestToken {
    DigestToken(Sha256::digest(id.as_str().as_bytes()).into())
}
