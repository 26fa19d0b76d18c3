//! `checkout <commit-or-tree> <empty-dir>` — materialize a tree into a
//! directory.

use crate::areas::repository::Repository;
use crate::artifacts::checkout;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision;
use std::path::Path;

pub fn run(repo: &Repository, target: &str, dest: &Path) -> anyhow::Result<()> {
    let tree_id = revision::resolve(repo, target, Some(ObjectType::Tree), true)?;
    let tree = repo.database().read_tree(&tree_id)?;
    checkout::checkout(repo, &tree, dest)
}
