//! `tag [-a] [<name> [<obj>]]` — list tags, or create a lightweight or
//! annotated tag.

use crate::areas::refs::RefNode;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::revision;
use std::io::Write;

pub fn run(
    repo: &Repository,
    annotate: bool,
    name: Option<&str>,
    object: Option<&str>,
    message: Option<String>,
) -> anyhow::Result<()> {
    match name {
        None => list_tags(repo),
        Some(name) => create_tag(repo, annotate, name, object, message),
    }
}

fn list_tags(repo: &Repository) -> anyhow::Result<()> {
    for (name, node) in repo.refs().list(Some("tags"))? {
        if matches!(node, RefNode::Leaf(_)) {
            writeln!(repo.writer(), "{name}")?;
        }
    }
    Ok(())
}

fn create_tag(
    repo: &Repository,
    annotate: bool,
    name: &str,
    object: Option<&str>,
    message: Option<String>,
) -> anyhow::Result<()> {
    let target_name = object.unwrap_or("HEAD");
    let target_id = revision::resolve(repo, target_name, None, true)?;

    if annotate {
        let kind = repo.database().kind_of(&target_id)?;
        let tagger = Author::load_from_env().ok().map(|a| a.display());
        let message = message.unwrap_or_else(|| format!("{name}\n"));
        let tag = Tag::new(target_id, kind, name.to_string(), tagger, message);
        let tag_id = repo.database().write(&tag, true)?;
        repo.refs().create(&format!("tags/{name}"), &tag_id)
    } else {
        repo.refs().create(&format!("tags/{name}"), &target_id)
    }
}
