//! Reference store — small text files that hold either a hex hash or an
//! indirection line (`ref: <path>\n`), plus HEAD attach/detach semantics.

use crate::artifacts::objects::object_id::ObjectId;
use crate::error::RefError;
use anyhow::Context;
use file_guard::Lock;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Bound on ref indirection chains; the reference implementation this is
/// ported from does not cap this and will happily spin on a cyclic ref.
const MAX_INDIRECTION_DEPTH: u32 = 8;

/// A node in the listing returned by `list`: either a resolved leaf or a
/// directory of further nodes, in the order they were read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefNode {
    Leaf(ObjectId),
    Dir(Vec<(String, RefNode)>),
}

#[derive(Debug)]
pub struct Refs {
    git_dir: Box<Path>,
}

impl Refs {
    pub fn new(git_dir: Box<Path>) -> Self {
        Refs { git_dir }
    }

    pub fn head_path(&self) -> PathBuf {
        self.git_dir.join("HEAD")
    }

    pub fn refs_dir(&self) -> PathBuf {
        self.git_dir.join("refs")
    }

    pub fn heads_dir(&self) -> PathBuf {
        self.refs_dir().join("heads")
    }

    pub fn tags_dir(&self) -> PathBuf {
        self.refs_dir().join("tags")
    }

    pub fn remotes_dir(&self) -> PathBuf {
        self.refs_dir().join("remotes")
    }

    /// Resolves a ref given as a path relative to the metadata directory
    /// (e.g. `"HEAD"` or `"refs/heads/main"`) to a 40-char hex object id,
    /// following indirection up to `MAX_INDIRECTION_DEPTH` times.
    pub fn resolve(&self, rel_path: &str) -> anyhow::Result<ObjectId> {
        let mut current = rel_path.to_string();

        for _ in 0..=MAX_INDIRECTION_DEPTH {
            let content = self.read_raw(&current)?;
            match content.strip_prefix("ref: ") {
                Some(target) => current = target.to_string(),
                None => return ObjectId::try_parse(&content),
            }
        }

        Err(RefError::TooDeep(rel_path.to_string(), MAX_INDIRECTION_DEPTH).into())
    }

    /// Reads the raw trimmed content of the ref file at `rel_path`, without
    /// following indirection.
    fn read_raw(&self, rel_path: &str) -> anyhow::Result<String> {
        let full_path = self.git_dir.join(rel_path);
        let content = std::fs::read_to_string(&full_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::Error::from(RefError::NotFound(rel_path.to_string()))
            } else {
                e.into()
            }
        })?;
        Ok(content.trim_end_matches('\n').to_string())
    }

    /// Writes `id + LF` to `refs/<rel_path>`, creating parent directories.
    pub fn create(&self, rel_path_under_refs: &str, id: &ObjectId) -> anyhow::Result<()> {
        let path = self.refs_dir().join(rel_path_under_refs);
        self.write_locked(&path, format!("{id}\n"))
    }

    /// Attaches HEAD to `refs/heads/<branch>` (branch need not yet exist).
    pub fn attach_head(&self, branch: &str) -> anyhow::Result<()> {
        self.write_locked(&self.head_path(), format!("ref: refs/heads/{branch}\n"))
    }

    /// Detaches HEAD, pointing it directly at `id`.
    pub fn detach_head(&self, id: &ObjectId) -> anyhow::Result<()> {
        self.write_locked(&self.head_path(), format!("{id}\n"))
    }

    /// `Some(branch)` when HEAD indirects to `refs/heads/<branch>`
    /// (attached); `None` when it holds a raw id (detached).
    pub fn head_branch(&self) -> anyhow::Result<Option<String>> {
        let content = self.read_raw("HEAD")?;
        Ok(content
            .strip_prefix("ref: refs/heads/")
            .map(|name| name.to_string()))
    }

    fn write_locked(&self, path: &Path, content: String) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut lock = file_guard::lock(&mut file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(content.as_bytes())?;

        Ok(())
    }

    /// Walks `refs/<subdir?>` in lexicographic order, returning a nested
    /// ordered tree of resolved leaves. Unresolvable refs (dangling or
    /// malformed) are skipped rather than aborting the whole listing.
    pub fn list(&self, subdir: Option<&str>) -> anyhow::Result<Vec<(String, RefNode)>> {
        let root = match subdir {
            Some(sub) => self.refs_dir().join(sub),
            None => self.refs_dir(),
        };
        self.list_dir(&root)
    }

    fn list_dir(&self, dir: &Path) -> anyhow::Result<Vec<(String, RefNode)>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();

        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let child = dir.join(&name);
            if child.is_dir() {
                let sub = self.list_dir(&child)?;
                out.push((name, RefNode::Dir(sub)));
            } else {
                let rel = child
                    .strip_prefix(&*self.git_dir)
                    .unwrap_or(&child)
                    .to_string_lossy()
                    .replace('\\', "/");
                if let Ok(id) = self.resolve(&rel) {
                    out.push((name, RefNode::Leaf(id)));
                }
            }
        }

        Ok(out)
    }

    /// Deletes the branch ref at `refs/heads/<name>`, pruning any now-empty
    /// parent directories it leaves behind.
    pub fn delete_branch(&self, name: &str) -> anyhow::Result<ObjectId> {
        let path = self.heads_dir().join(name);
        let id = self.resolve(
            path.strip_prefix(&*self.git_dir)
                .unwrap_or(&path)
                .to_string_lossy()
                .as_ref(),
        )?;
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to delete branch file at {}", path.display()))?;
        self.prune_empty_parents(&path);
        Ok(id)
    }

    fn prune_empty_parents(&self, path: &Path) {
        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir == self.heads_dir() {
                break;
            }
            match std::fs::read_dir(dir) {
                Ok(mut entries) if entries.next().is_none() => {
                    let _ = std::fs::remove_dir(dir);
                    parent = dir.parent();
                }
                _ => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn oid() -> ObjectId {
        ObjectId::try_parse("ce013625030ba8dba906f756967f9e9ca394464a").unwrap()
    }

    #[test]
    fn attach_then_detach_head() {
        let dir = tempdir().unwrap();
        let refs = Refs::new(dir.path().to_path_buf().into_boxed_path());

        refs.attach_head("main").unwrap();
        assert_eq!(refs.head_branch().unwrap(), Some("main".to_string()));

        refs.detach_head(&oid()).unwrap();
        assert_eq!(refs.head_branch().unwrap(), None);
    }

    #[test]
    fn resolve_follows_indirection() {
        let dir = tempdir().unwrap();
        let refs = Refs::new(dir.path().to_path_buf().into_boxed_path());

        refs.create("heads/main", &oid()).unwrap();
        refs.attach_head("main").unwrap();

        assert_eq!(refs.resolve("HEAD").unwrap(), oid());
    }

    #[test]
    fn resolve_rejects_cycles() {
        let dir = tempdir().unwrap();
        let refs = Refs::new(dir.path().to_path_buf().into_boxed_path());

        refs.write_locked(&refs.head_path(), "ref: a\n".to_string()).unwrap();
        refs.write_locked(&dir.path().join("a"), "ref: HEAD\n".to_string()).unwrap();

        assert!(refs.resolve("HEAD").is_err());
    }

    #[test]
    fn list_is_lexicographic_and_nested() {
        let dir = tempdir().unwrap();
        let refs = Refs::new(dir.path().to_path_buf().into_boxed_path());

        refs.create("heads/main", &oid()).unwrap();
        refs.create("tags/v1", &oid()).unwrap();

        let listing = refs.list(None).unwrap();
        let names: Vec<&str> = listing.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["heads", "tags"]);
    }
}
