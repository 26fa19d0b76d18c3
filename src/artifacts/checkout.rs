//! Tree walker and checkout — recurses a tree through the object store.

use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::error::{ObjectError, RepoError};
use std::path::Path;

/// One emitted line from `walk`: a leaf entry (or, with `recurse` off, a
/// subtree) reached from the root, with its path relative to the root.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub mode: String,
    pub kind: ObjectType,
    pub id: ObjectId,
    pub path: String,
}

/// Lists `tree`'s entries; when `recurse` is set, descends into subtrees
/// instead of emitting a line for the subtree itself.
pub fn walk(repo: &Repository, tree: &Tree, recurse: bool) -> anyhow::Result<Vec<WalkEntry>> {
    walk_prefixed(repo, tree, recurse, "")
}

fn walk_prefixed(
    repo: &Repository,
    tree: &Tree,
    recurse: bool,
    prefix: &str,
) -> anyhow::Result<Vec<WalkEntry>> {
    let mut out = Vec::new();

    for entry in tree.entries() {
        let full_path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}/{}", entry.name)
        };

        if entry.is_tree() && recurse {
            let child = repo.database().read_tree(&entry.oid)?;
            out.extend(walk_prefixed(repo, &child, recurse, &full_path)?);
        } else {
            let kind = if entry.is_tree() { ObjectType::Tree } else { ObjectType::Blob };
            out.push(WalkEntry {
                mode: entry.mode.as_str().to_string(),
                kind,
                id: entry.oid.clone(),
                path: full_path,
            });
        }
    }

    Ok(out)
}

/// Materializes `tree` into `dest`, which must be absent or an empty
/// directory. Creates `dest` if absent.
pub fn checkout(repo: &Repository, tree: &Tree, dest: &Path) -> anyhow::Result<()> {
    if dest.exists() {
        let non_empty = !dest.is_dir() || std::fs::read_dir(dest)?.next().is_some();
        if non_empty {
            return Err(RepoError::NotEmpty(dest.to_path_buf()).into());
        }
    } else {
        std::fs::create_dir_all(dest)?;
    }

    checkout_into(repo, tree, dest)
}

fn checkout_into(repo: &Repository, tree: &Tree, dest: &Path) -> anyhow::Result<()> {
    for entry in tree.entries() {
        let target = dest.join(&entry.name);
        match repo.database().read(&entry.oid)? {
            ObjectBox::Tree(child) => {
                std::fs::create_dir_all(&target)?;
                checkout_into(repo, &child, &target)?;
            }
            ObjectBox::Blob(blob) => {
                std::fs::write(&target, blob.content())?;
            }
            other => {
                return Err(ObjectError::Malformed(format!(
                    "tree entry {:?} is a {}, expected blob or tree",
                    entry.name,
                    other.object_type()
                ))
                .into());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::mode::Mode;
    use crate::artifacts::objects::tree::TreeEntry;
    use tempfile::tempdir;

    fn repo() -> (tempfile::TempDir, Repository) {
        let dir = tempdir().unwrap();
        let worktree = dir.path().join("r1");
        let repo = Repository::init(&worktree, Box::new(std::io::sink())).unwrap();
        (dir, repo)
    }

    #[test]
    fn walk_without_recurse_stops_at_subtrees() {
        let (_dir, repo) = repo();
        let blob = Blob::new(bytes::Bytes::from_static(b"hi\n"));
        let blob_id = repo.database().write(&blob, true).unwrap();
        let sub = Tree::new(vec![TreeEntry::new(Mode::regular_file(), "a.txt".into(), blob_id.clone())]);
        let sub_id = repo.database().write(&sub, true).unwrap();
        let root = Tree::new(vec![TreeEntry::new(Mode::directory(), "sub".into(), sub_id.clone())]);

        let entries = walk(&repo, &root, false).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ObjectType::Tree);
        assert_eq!(entries[0].id, sub_id);
    }

    #[test]
    fn walk_with_recurse_lists_nested_blobs() {
        let (_dir, repo) = repo();
        let blob = Blob::new(bytes::Bytes::from_static(b"hi\n"));
        let blob_id = repo.database().write(&blob, true).unwrap();
        let sub = Tree::new(vec![TreeEntry::new(Mode::regular_file(), "a.txt".into(), blob_id.clone())]);
        let sub_id = repo.database().write(&sub, true).unwrap();
        let root = Tree::new(vec![TreeEntry::new(Mode::directory(), "sub".into(), sub_id)]);

        let entries = walk(&repo, &root, true).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ObjectType::Blob);
        assert_eq!(entries[0].path, "sub/a.txt");
        assert_eq!(entries[0].id, blob_id);
    }

    #[test]
    fn checkout_materializes_nested_files() {
        let (dir, repo) = repo();
        let blob = Blob::new(bytes::Bytes::from_static(b"hi\n"));
        let blob_id = repo.database().write(&blob, true).unwrap();
        let sub = Tree::new(vec![TreeEntry::new(Mode::regular_file(), "a.txt".into(), blob_id)]);
        let sub_id = repo.database().write(&sub, true).unwrap();
        let root = Tree::new(vec![TreeEntry::new(Mode::directory(), "sub".into(), sub_id)]);

        let dest = dir.path().join("out");
        checkout(&repo, &root, &dest).unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("sub").join("a.txt")).unwrap(), "hi\n");
    }

    #[test]
    fn checkout_refuses_non_empty_destination() {
        let (dir, repo) = repo();
        let dest = dir.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("existing"), "data").unwrap();

        let root = Tree::new(vec![]);
        assert!(checkout(&repo, &root, &dest).is_err());
    }
}
