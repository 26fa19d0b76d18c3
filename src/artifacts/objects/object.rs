//! Shared object traits and the type-erased `ObjectBox`.
//!
//! All four object kinds serialize to the same frame
//! (`<kind> SP <len> NUL <payload>`) and hash to the same place: the SHA-1 of
//! that frame.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;

/// Serializes an object to its full on-disk frame (header + payload).
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Deserializes an object's payload from a reader positioned just past the
/// frame header.
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// Common operations every object kind supports.
pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    /// Human-readable rendering (used by `cat-file` without `-t`).
    fn display(&self) -> String;

    /// The object's id: SHA-1 of its serialized frame.
    fn object_id(&self) -> Result<ObjectId> {
        let content = self.serialize()?;
        let mut hasher = Sha1::new();
        hasher.update(&content);
        let oid = hasher.finalize();
        ObjectId::try_parse(format!("{oid:x}"))
    }
}

/// Type-erased object, used wherever the kind isn't known until the frame
/// header is read (e.g. the object store's generic `read`).
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
    Tag(Box<Tag>),
}

impl ObjectBox {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectBox::Blob(_) => ObjectType::Blob,
            ObjectBox::Tree(_) => ObjectType::Tree,
            ObjectBox::Commit(_) => ObjectType::Commit,
            ObjectBox::Tag(_) => ObjectType::Tag,
        }
    }

    pub fn display(&self) -> String {
        match self {
            ObjectBox::Blob(o) => o.display(),
            ObjectBox::Tree(o) => o.display(),
            ObjectBox::Commit(o) => o.display(),
            ObjectBox::Tag(o) => o.display(),
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            ObjectBox::Commit(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            ObjectBox::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            ObjectBox::Tag(t) => Some(t),
            _ => None,
        }
    }
}
