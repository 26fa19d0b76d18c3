//! `hash-object [-w] [-t <kind>] <file>` — print (and optionally persist) the
//! object id a file's content would have under a given kind.

use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use std::io::Write;
use std::path::Path;

/// A payload paired with a claimed kind, framed and hashed without being
/// decoded into a concrete `Blob`/`Tree`/`Commit`/`Tag`. `hash-object` trusts
/// the caller's `-t` flag rather than re-validating the file's structure,
/// matching the reference implementation's behavior.
struct RawObject {
    kind: ObjectType,
    content: Bytes,
}

impl Packable for RawObject {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(self.content.len() + 16);
        write!(bytes, "{} {}\0", self.kind.as_str(), self.content.len())?;
        bytes.extend_from_slice(&self.content);
        Ok(Bytes::from(bytes))
    }
}

impl Object for RawObject {
    fn object_type(&self) -> ObjectType {
        self.kind
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

pub fn run(repo: &Repository, write: bool, kind: Option<&str>, file: &Path) -> anyhow::Result<()> {
    let kind = kind.map(ObjectType::try_from).transpose()?.unwrap_or(ObjectType::Blob);
    let content = std::fs::read(file)?;
    let object = RawObject { kind, content: content.into() };

    let id = repo.database().write(&object, write)?;
    writeln!(repo.writer(), "{id}")?;
    Ok(())
}
