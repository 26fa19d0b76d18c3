//! `ls-tree [-r] <tree-ish>` — print tree entries, recursing into subtrees
//! when `-r` is set.

use crate::areas::repository::Repository;
use crate::artifacts::checkout;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision;
use std::io::Write;

pub fn run(repo: &Repository, recurse: bool, tree_ish: &str) -> anyhow::Result<()> {
    let tree_id = revision::resolve(repo, tree_ish, Some(ObjectType::Tree), true)?;
    let tree = repo.database().read_tree(&tree_id)?;

    for entry in checkout::walk(repo, &tree, recurse)? {
        writeln!(repo.writer(), "{:0>6} {} {}\t{}", entry.mode, entry.kind, entry.id, entry.path)?;
    }

    Ok(())
}
