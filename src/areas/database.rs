//! Object store — content-addressed read/write over `objects/`.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use crate::error::ObjectError;
use anyhow::Context;
use bytes::Bytes;
use std::io::{Cursor, Read, Write};
use std::path::Path;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Reads and decodes the object at `id`, dispatching on its declared kind.
    pub fn read(&self, id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (kind, reader) = self.read_frame(id)?;
        Ok(match kind {
            ObjectType::Blob => ObjectBox::Blob(Box::new(Blob::deserialize(reader)?)),
            ObjectType::Tree => ObjectBox::Tree(Box::new(Tree::deserialize(reader)?)),
            ObjectType::Commit => ObjectBox::Commit(Box::new(Commit::deserialize(reader)?)),
            ObjectType::Tag => ObjectBox::Tag(Box::new(Tag::deserialize(reader)?)),
        })
    }

    pub fn read_commit(&self, id: &ObjectId) -> anyhow::Result<Commit> {
        match self.read(id)? {
            ObjectBox::Commit(commit) => Ok(*commit),
            other => Err(ObjectError::Malformed(format!(
                "{id} is a {}, not a commit",
                other.object_type()
            ))
            .into()),
        }
    }

    pub fn read_tree(&self, id: &ObjectId) -> anyhow::Result<Tree> {
        match self.read(id)? {
            ObjectBox::Tree(tree) => Ok(*tree),
            other => Err(ObjectError::Malformed(format!(
                "{id} is a {}, not a tree",
                other.object_type()
            ))
            .into()),
        }
    }

    pub fn read_tag(&self, id: &ObjectId) -> anyhow::Result<Tag> {
        match self.read(id)? {
            ObjectBox::Tag(tag) => Ok(*tag),
            other => Err(ObjectError::Malformed(format!(
                "{id} is a {}, not a tag",
                other.object_type()
            ))
            .into()),
        }
    }

    /// Returns the kind of the object at `id` without fully decoding it.
    pub fn kind_of(&self, id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (kind, _) = self.read_frame(id)?;
        Ok(kind)
    }

    /// Serializes, hashes, and (unless `actually_write` is false) atomically
    /// writes `object`. Writing an id that already exists on disk is a no-op.
    pub fn write(&self, object: &impl Object, actually_write: bool) -> anyhow::Result<ObjectId> {
        let id = object.object_id()?;

        if actually_write {
            let object_path = self.path.join(id.to_path());
            if !object_path.exists() {
                std::fs::create_dir_all(
                    object_path
                        .parent()
                        .with_context(|| format!("invalid object path {}", object_path.display()))?,
                )?;
                self.write_frame(&object_path, object.serialize()?)?;
            }
        }

        Ok(id)
    }

    fn read_frame(&self, id: &ObjectId) -> anyhow::Result<(ObjectType, Cursor<Bytes>)> {
        let object_path = self.path.join(id.to_path());
        let raw = std::fs::read(&object_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::Error::from(ObjectError::NotFound(id.to_string()))
            } else {
                e.into()
            }
        })?;
        let content = Self::decompress(raw.into())?;

        let nul = content
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| ObjectError::Malformed("missing frame NUL terminator".into()))?;
        let header = std::str::from_utf8(&content[..nul])
            .map_err(|e| ObjectError::Malformed(format!("non-utf8 frame header: {e}")))?;
        let (kind, len) = header
            .split_once(' ')
            .ok_or_else(|| ObjectError::Malformed("missing frame length".into()))?;
        let len: usize = len
            .parse()
            .map_err(|_| ObjectError::Malformed(format!("invalid frame length: {len:?}")))?;
        if len != content.len() - nul - 1 {
            return Err(ObjectError::Malformed(format!(
                "frame declares length {len} but payload is {} bytes",
                content.len() - nul - 1
            ))
            .into());
        }
        let kind = ObjectType::try_from(kind)?;

        let mut reader = Cursor::new(content);
        reader.set_position((nul + 1) as u64);

        Ok((kind, reader))
    }

    fn write_frame(&self, object_path: &Path, content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .with_context(|| format!("invalid object path {}", object_path.display()))?;
        let temp_path = object_dir.join(Self::temp_name());

        let compressed = Self::compress(content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("unable to open {}", temp_path.display()))?;
        file.write_all(&compressed)
            .with_context(|| format!("unable to write {}", temp_path.display()))?;

        std::fs::rename(&temp_path, object_path)
            .with_context(|| format!("unable to rename into {}", object_path.display()))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&data)?;
        Ok(encoder.finish()?.into())
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        Ok(decompressed.into())
    }

    fn temp_name() -> String {
        use sha1::{Digest, Sha1};
        let mut hasher = Sha1::new();
        hasher.update(std::process::id().to_le_bytes());
        hasher.update(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
                .to_le_bytes(),
        );
        format!("tmp-obj-{:x}", hasher.finalize())
    }

    /// Finds every object whose id starts with `prefix`. Used by the
    /// revision resolver, which treats more than one match as ambiguous.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let mut matches = Vec::new();

        if prefix.len() >= 2 {
            let dir_name = &prefix[..2];
            let file_prefix = &prefix[2..];
            let dir_path = self.path.join(dir_name);

            if dir_path.is_dir() {
                for entry in std::fs::read_dir(&dir_path)? {
                    let entry = entry?;
                    let file_name = entry.file_name();
                    let file_name_str = file_name.to_string_lossy();
                    if file_name_str.starts_with(file_prefix) {
                        let full = format!("{dir_name}{file_name_str}");
                        if let Ok(id) = ObjectId::try_parse(full) {
                            matches.push(id);
                        }
                    }
                }
            }
        } else {
            for i in 0..=255u16 {
                let dir_name = format!("{i:02x}");
                let dir_path = self.path.join(&dir_name);
                if !dir_path.is_dir() {
                    continue;
                }
                for entry in std::fs::read_dir(&dir_path)? {
                    let entry = entry?;
                    let file_name = entry.file_name();
                    let file_name_str = file_name.to_string_lossy();
                    let full = format!("{dir_name}{file_name_str}");
                    if full.starts_with(prefix)
                        && let Ok(id) = ObjectId::try_parse(full)
                    {
                        matches.push(id);
                    }
                }
            }
        }

        matches.sort();
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trips_and_is_content_addressed() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().to_path_buf().into_boxed_path());
        let blob = Blob::new(Bytes::from_static(b"hello\n"));

        let id = db.write(&blob, true).unwrap();
        assert_eq!(id.as_ref(), "ce013625030ba8dba906f756967f9e9ca394464a");

        let stored_path = dir.path().join("ce/013625030ba8dba906f756967f9e9ca394464a");
        assert!(stored_path.exists());

        match db.read(&id).unwrap() {
            ObjectBox::Blob(b) => assert_eq!(b.content(), b"hello\n"),
            _ => panic!("expected a blob"),
        }
    }

    #[test]
    fn find_objects_by_prefix_reports_every_match() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().to_path_buf().into_boxed_path());
        db.write(&Blob::new(Bytes::from_static(b"one\n")), true).unwrap();
        db.write(&Blob::new(Bytes::from_static(b"two\n")), true).unwrap();

        let all = db.find_objects_by_prefix("").unwrap();
        assert_eq!(all.len(), 2);
    }
}
