//! Blob object — an opaque byte sequence with no internal structure.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(self.content.len() + 16);
        write!(bytes, "{} {}\0", self.object_type().as_str(), self.content.len())?;
        bytes.extend_from_slice(&self.content);
        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for Blob {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        Ok(Self::new(content))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_to_known_blob_id() {
        let blob = Blob::new(Bytes::from_static(b"hello\n"));
        let id = blob.object_id().unwrap();
        assert_eq!(id.as_ref(), "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn round_trips_payload() {
        let blob = Blob::new(Bytes::from_static(b"some file content\n"));
        let frame = blob.serialize().unwrap();
        let header_end = frame.iter().position(|&b| b == 0).unwrap();
        let decoded = Blob::deserialize(&frame[header_end + 1..]).unwrap();
        assert_eq!(decoded, blob);
    }
}
