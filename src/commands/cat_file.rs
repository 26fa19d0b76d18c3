//! `cat-file <kind> <obj>` / `cat-file -t <obj>` — print an object's payload
//! or its declared kind.

use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{ObjectBox, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision;
use crate::error::ObjectError;
use bytes::Bytes;
use std::io::Write;

pub fn run(repo: &Repository, kind: Option<&str>, show_type: bool, object: &str) -> anyhow::Result<()> {
    if show_type {
        let id = revision::resolve(repo, object, None, true)?;
        let obj = repo.database().read(&id)?;
        writeln!(repo.writer(), "{}", obj.object_type())?;
        return Ok(());
    }

    let expected = kind
        .map(ObjectType::try_from)
        .transpose()?
        .unwrap_or(ObjectType::Blob);
    let id = revision::resolve(repo, object, Some(expected), true)?;
    let obj = repo.database().read(&id)?;

    // Write the raw payload, not a lossy textual rendering: blobs (and the
    // binary object-id bytes inside trees) aren't guaranteed to be UTF-8.
    let payload = match &obj {
        ObjectBox::Blob(blob) => Bytes::copy_from_slice(blob.content()),
        ObjectBox::Tree(tree) => raw_payload(tree.as_ref())?,
        ObjectBox::Commit(commit) => raw_payload(commit.as_ref())?,
        ObjectBox::Tag(tag) => raw_payload(tag.as_ref())?,
    };
    repo.writer().write_all(&payload)?;
    Ok(())
}

/// Strips the `<kind> SP <len> NUL` frame header off a serialized object,
/// leaving just its payload bytes.
fn raw_payload(object: &impl Packable) -> anyhow::Result<Bytes> {
    let frame = object.serialize()?;
    let nul = frame
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| ObjectError::Malformed("serialized frame missing NUL header terminator".into()))?;
    Ok(frame.slice(nul + 1..))
}
