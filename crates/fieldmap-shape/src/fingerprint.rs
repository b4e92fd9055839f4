//! Content fingerprints
//!
//! Provides [`Fingerprint`], a 32-byte Blake3 digest used to key derived
//! artifacts (resolution plans) by the content of their inputs.

use std::fmt::{self, Display, Formatter};

/// A 32-byte content digest (Blake3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Create from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Digest arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Digest a serializable value (JSON encoding)
    ///
    /// # Errors
    /// Returns error if serialization fails
    #[inline]
    pub fn of<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_vec(value)?;
        Ok(Self::compute(&json))
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl serde::Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

/// Incremental fingerprint over several inputs
///
/// Each part is length-prefixed so adjacent parts cannot alias.
#[derive(Debug, Default)]
pub struct FingerprintBuilder {
    hasher: blake3::Hasher,
}

impl FingerprintBuilder {
    /// Start an empty fingerprint
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add raw bytes
    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.hasher.update(&(data.len() as u64).to_le_bytes());
        self.hasher.update(data);
        self
    }

    /// Add a serializable value (JSON encoding)
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn value<T: serde::Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> Result<&mut Self, serde_json::Error> {
        let json = serde_json::to_vec(value)?;
        Ok(self.bytes(&json))
    }

    /// Finish the digest
    #[must_use]
    pub fn finish(&self) -> Fingerprint {
        Fingerprint(*self.hasher.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_deterministic() {
        assert_eq!(Fingerprint::compute(b"shape"), Fingerprint::compute(b"shape"));
        assert_ne!(Fingerprint::compute(b"a"), Fingerprint::compute(b"b"));
    }

    #[test]
    fn fingerprint_short_is_prefix() {
        let fp = Fingerprint::compute(b"test");
        assert_eq!(fp.short().len(), 16);
        assert!(fp.to_string().starts_with(&fp.short()));
    }

    #[test]
    fn builder_parts_do_not_alias() {
        let ab = FingerprintBuilder::new().bytes(b"ab").bytes(b"c").finish();
        let a_bc = FingerprintBuilder::new().bytes(b"a").bytes(b"bc").finish();
        assert_ne!(ab, a_bc);
    }

    #[test]
    fn builder_accepts_serializable() {
        let mut builder = FingerprintBuilder::new();
        builder.value(&["Id", "Name"]).unwrap();
        let fp = builder.finish();
        assert_eq!(fp, FingerprintBuilder::new().value(&["Id", "Name"]).unwrap().finish());
    }

    #[test]
    fn fingerprint_serializes_as_hex() {
        let fp = Fingerprint::compute(b"test");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{fp}\""));
    }
}
