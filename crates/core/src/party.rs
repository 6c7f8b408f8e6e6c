//! Identities: opaque public keys and the parties that own them.
//!
//! Keys are already-resolved identities handed over by the host platform. No
//! cryptography happens here; a key is compared by its bytes only.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Opaque 32-byte public key.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// The all-zero key owned by nobody.
    pub const NULL: PublicKey = PublicKey([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Short fingerprint for logs (first 8 bytes, hex).
    pub fn fingerprint(&self) -> String {
        self.0[..8].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.fingerprint())
    }
}

/// A well-known ledger participant: a display name plus its owning key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Party {
    name: String,
    owning_key: PublicKey,
}

impl Party {
    pub fn new(name: impl Into<String>, owning_key: PublicKey) -> Self {
        Self {
            name: name.into(),
            owning_key,
        }
    }

    /// Placeholder party holding the null key.
    pub fn null() -> Self {
        Self::new("", PublicKey::NULL)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owning_key(&self) -> PublicKey {
        self.owning_key
    }

    pub fn is_null(&self) -> bool {
        self.owning_key.is_null()
    }
}

impl ValueObject for Party {}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("<null>");
        }
        write!(f, "{} ({})", self.name, self.owning_key.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_party_is_detected() {
        assert!(Party::null().is_null());
        assert!(!Party::new("Bank", PublicKey::from_bytes([7; 32])).is_null());
    }

    #[test]
    fn fingerprint_is_hex_prefix() {
        let key = PublicKey::from_bytes([0xab; 32]);
        assert_eq!(key.fingerprint(), "abababababababab");
        assert_eq!(key.to_string().len(), 64);
    }

    #[test]
    fn parties_compare_by_name_and_key() {
        let key = PublicKey::from_bytes([1; 32]);
        assert_eq!(Party::new("Alice", key), Party::new("Alice", key));
        assert_ne!(Party::new("Alice", key), Party::new("Alias", key));
    }
}
