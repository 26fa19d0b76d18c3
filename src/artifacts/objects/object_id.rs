//! Object identifier (SHA-1 hash)
//!
//! Object ids are 40-character lowercase hexadecimal SHA-1 digests. They
//! uniquely identify all objects (blobs, trees, commits, tags).
//!
//! ## Storage
//!
//! Objects are stored at `.git/objects/<first-2-chars>/<remaining-38-chars>`.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use std::io;
use std::path::PathBuf;

/// Minimum prefix length accepted when resolving a short hash.
pub const MIN_SHORT_OID_LEN: usize = 4;

/// Object identifier (SHA-1 hash)
///
/// A 40-character lowercase hexadecimal string that uniquely identifies an
/// object. Parsing lower-cases and validates on construction, so a valid
/// `ObjectId` is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate a full 40-character object id from a string.
    pub fn try_parse(id: impl AsRef<str>) -> anyhow::Result<Self> {
        let id = id.as_ref();
        if id.len() != OBJECT_ID_LENGTH {
            anyhow::bail!("invalid object id length: {} (want {})", id.len(), OBJECT_ID_LENGTH);
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("invalid object id characters: {}", id);
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Write the object id in binary format (20 bytes), big-endian nibble pairs.
    pub fn write_h40_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        let hex40 = self.as_ref();

        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&hex40[i..i + 2], 16)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid hex digit"))?;
            writer.write_all(&[byte])?;
        }

        Ok(())
    }

    /// Read an object id from its 20-byte binary form.
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut hex40 = String::with_capacity(OBJECT_ID_LENGTH);
        let mut buffer = [0; 1];

        for _ in 0..(OBJECT_ID_LENGTH / 2) {
            reader.read_exact(&mut buffer)?;
            hex40.push_str(&format!("{:02x}", buffer[0]));
        }

        Self::try_parse(hex40)
    }

    /// Split into the `objects/<xx>/<rest>` shard path, relative to `objects/`.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// Render the shortest unambiguous-looking abbreviation a caller asked
    /// for; callers are responsible for checking the prefix actually
    /// resolves uniquely (see `artifacts::revision`).
    pub fn short(&self, len: usize) -> &str {
        let len = len.clamp(MIN_SHORT_OID_LEN, OBJECT_ID_LENGTH);
        &self.0[..len]
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        assert!(ObjectId::try_parse("abc").is_err());
    }

    #[test]
    fn rejects_non_hex() {
        let bad = "z".repeat(40);
        assert!(ObjectId::try_parse(bad).is_err());
    }

    #[test]
    fn lowercases_on_parse() {
        let upper = "CE013625030BA8DBA906F756967F9E9CA394464A";
        let oid = ObjectId::try_parse(upper).unwrap();
        assert_eq!(oid.as_ref(), "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn binary_round_trip() {
        let oid = ObjectId::try_parse("ce013625030ba8dba906f756967f9e9ca394464a").unwrap();
        let mut buf = Vec::new();
        oid.write_h40_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 20);
        let back = ObjectId::read_h40_from(&mut buf.as_slice()).unwrap();
        assert_eq!(oid, back);
    }

    #[test]
    fn to_path_splits_first_two_chars() {
        let oid = ObjectId::try_parse("ce013625030ba8dba906f756967f9e9ca394464a").unwrap();
        assert_eq!(oid.to_path(), PathBuf::from("ce/013625030ba8dba906f756967f9e9ca394464a"));
    }
}
