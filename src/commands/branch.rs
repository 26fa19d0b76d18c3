//! `branch [<name> [<startpoint>]]` — list branches, marking the attached
//! one, or create a branch pointing at `<startpoint>` (default `HEAD`).

use crate::areas::refs::RefNode;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision;
use colored::Colorize;
use std::io::Write;

pub fn run(repo: &Repository, name: Option<&str>, startpoint: Option<&str>) -> anyhow::Result<()> {
    match name {
        None => list_branches(repo),
        Some(name) => create_branch(repo, name, startpoint),
    }
}

fn list_branches(repo: &Repository) -> anyhow::Result<()> {
    let attached = repo.refs().head_branch()?;

    for (name, node) in repo.refs().list(Some("heads"))? {
        if !matches!(node, RefNode::Leaf(_)) {
            continue;
        }
        if attached.as_deref() == Some(name.as_str()) {
            writeln!(repo.writer(), "* {}", name.green())?;
        } else {
            writeln!(repo.writer(), "  {name}")?;
        }
    }

    Ok(())
}

fn create_branch(repo: &Repository, name: &str, startpoint: Option<&str>) -> anyhow::Result<()> {
    let start = startpoint.unwrap_or("HEAD");
    let id = revision::resolve(repo, start, Some(ObjectType::Commit), true)?;
    repo.refs().create(&format!("heads/{name}"), &id)
}
