//! Tree object — an ordered sequence of `(mode, name, object id)` entries.
//!
//! Entry order is on-disk file order, not lexicographic: the wire format is
//! simply the concatenation of entries, and this port has no staging index
//! to reconcile against, so it preserves whatever order the entries were
//! given in rather than sorting them into a map.

use crate::artifacts::objects::mode::Mode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::ObjectError;
use bytes::Bytes;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: Mode,
    pub name: String,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: Mode, name: String, oid: ObjectId) -> Self {
        Self { mode, name, oid }
    }

    pub fn is_tree(&self) -> bool {
        self.mode.is_directory()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut body = Vec::new();
        for entry in &self.entries {
            write!(body, "{} {}", entry.mode.as_str(), entry.name)?;
            body.push(0);
            entry.oid.write_h40_to(&mut body)?;
        }

        let mut bytes = Vec::with_capacity(body.len() + 16);
        write!(bytes, "{} {}\0", self.object_type().as_str(), body.len())?;
        bytes.write_all(&body)?;
        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = Vec::new();
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break;
            }
            if mode_bytes.last() != Some(&b' ') {
                return Err(ObjectError::Malformed("unexpected EOF reading tree mode".into()).into());
            }
            mode_bytes.pop();
            let mode = Mode::try_parse(
                std::str::from_utf8(&mode_bytes)
                    .map_err(|e| ObjectError::Malformed(format!("non-utf8 tree mode: {e}")))?,
            )?;

            name_bytes.clear();
            let n = reader.read_until(0, &mut name_bytes)?;
            if n == 0 || name_bytes.last() != Some(&0) {
                return Err(ObjectError::Malformed("unexpected EOF reading tree name".into()).into());
            }
            name_bytes.pop();
            let name = String::from_utf8(name_bytes.clone())
                .map_err(|e| ObjectError::Malformed(format!("non-utf8 tree entry name: {e}")))?;

            let oid = ObjectId::read_h40_from(&mut reader)
                .map_err(|_| ObjectError::Malformed("unexpected EOF reading tree entry id".into()))?;

            entries.push(TreeEntry::new(mode, name, oid));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let kind = if entry.is_tree() { "tree" } else { "blob" };
                format!("{:0>6} {} {}\t{}", entry.mode.as_str(), kind, entry.oid, entry.name)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(byte: u8) -> ObjectId {
        ObjectId::try_parse(format!("{:02x}{}", byte, "0".repeat(38))).unwrap()
    }

    #[test]
    fn preserves_file_order_not_lexicographic() {
        let entries = vec![
            TreeEntry::new(Mode::regular_file(), "zeta".into(), oid(1)),
            TreeEntry::new(Mode::regular_file(), "alpha".into(), oid(2)),
        ];
        let tree = Tree::new(entries.clone());
        let frame = tree.serialize().unwrap();
        let header_end = frame.iter().position(|&b| b == 0).unwrap();
        let decoded = Tree::deserialize(&frame[header_end + 1..]).unwrap();
        assert_eq!(decoded.entries(), entries.as_slice());
    }

    #[test]
    fn accepts_five_and_six_digit_modes() {
        let entries = vec![
            TreeEntry::new(Mode::directory(), "sub".into(), oid(3)),
            TreeEntry::new(Mode::regular_file(), "file".into(), oid(4)),
        ];
        let tree = Tree::new(entries.clone());
        let frame = tree.serialize().unwrap();
        let header_end = frame.iter().position(|&b| b == 0).unwrap();
        let decoded = Tree::deserialize(&frame[header_end + 1..]).unwrap();
        assert_eq!(decoded.entries(), entries.as_slice());
    }
}
