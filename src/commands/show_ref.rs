//! `show-ref` — print every reference with its resolved object id.

use crate::areas::refs::RefNode;
use crate::areas::repository::Repository;
use std::io::Write;

pub fn run(repo: &Repository) -> anyhow::Result<()> {
    print_refs(repo, repo.refs().list(None)?, "refs")
}

fn print_refs(repo: &Repository, nodes: Vec<(String, RefNode)>, prefix: &str) -> anyhow::Result<()> {
    for (name, node) in nodes {
        let path = format!("{prefix}/{name}");
        match node {
            RefNode::Leaf(id) => writeln!(repo.writer(), "{id} {path}")?,
            RefNode::Dir(children) => print_refs(repo, children, &path)?,
        }
    }
    Ok(())
}
