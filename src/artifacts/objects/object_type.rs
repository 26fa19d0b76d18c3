//! Object kind — a closed enumeration of the four on-disk object kinds.

use crate::error::ObjectError;
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
        }
    }

    /// Read `<kind> SP <len> NUL` from the front of a frame and return the
    /// kind. The length field is consumed but not validated here; callers
    /// check the declared length against the remaining bytes.
    pub fn parse_object_type(data_reader: &mut impl BufRead) -> anyhow::Result<ObjectType> {
        let mut kind = Vec::new();
        data_reader.read_until(b' ', &mut kind)?;
        if kind.last() != Some(&b' ') {
            return Err(ObjectError::Malformed("unexpected EOF reading object kind".into()).into());
        }
        kind.pop();
        let kind = String::from_utf8(kind)
            .map_err(|e| ObjectError::Malformed(format!("non-utf8 object kind: {e}")))?;

        let mut len = Vec::new();
        data_reader.read_until(b'\0', &mut len)?;
        if len.last() != Some(&0) {
            return Err(ObjectError::Malformed("unexpected EOF reading object length".into()).into());
        }

        ObjectType::try_from(kind.as_str())
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            "tag" => Ok(ObjectType::Tag),
            other => Err(ObjectError::UnknownKind(other.to_string()).into()),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_each_known_kind() {
        for kind in ["blob", "tree", "commit", "tag"] {
            let frame = format!("{kind} 5\0hello");
            let mut reader = Cursor::new(frame.into_bytes());
            let parsed = ObjectType::parse_object_type(&mut reader).unwrap();
            assert_eq!(parsed.as_str(), kind);
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(ObjectType::try_from("blorb").is_err());
    }
}
