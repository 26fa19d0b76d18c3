//! `rev-parse [--wyag-type <kind>] <name>` — print the resolved object id,
//! optionally following to a requested kind.

use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision;
use std::io::Write;

pub fn run(repo: &Repository, kind: Option<&str>, name: &str) -> anyhow::Result<()> {
    let expected = kind.map(ObjectType::try_from).transpose()?;
    let id = revision::resolve(repo, name, expected, true)?;
    writeln!(repo.writer(), "{id}")?;
    Ok(())
}
