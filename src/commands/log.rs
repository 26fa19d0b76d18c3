//! `log <commit>` — emit a graphviz `digraph` of commit parent edges
//! reachable from `<commit>`.

use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision;
use std::collections::HashSet;
use std::io::Write;

pub fn run(repo: &Repository, commit_ish: &str) -> anyhow::Result<()> {
    let start = revision::resolve(repo, commit_ish, Some(ObjectType::Commit), true)?;

    writeln!(repo.writer(), "digraph wyaglog{{")?;
    writeln!(repo.writer(), "  node[shape=rect]")?;

    // Depth-first, deduplicated via `seen` so diamond histories don't cause
    // exponential re-traversal.
    let mut seen = HashSet::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if !seen.insert(id.clone()) {
            continue;
        }

        let commit = repo.database().read_commit(&id)?;
        let label = commit.short_message().replace('\\', "\\\\").replace('"', "\\\"");
        writeln!(repo.writer(), "  c_{id} [label=\"{}: {label}\"]", id.short(7))?;

        for parent in commit.parents()? {
            writeln!(repo.writer(), "  c_{id} -> c_{parent}")?;
            stack.push(parent);
        }
    }

    writeln!(repo.writer(), "}}")?;
    Ok(())
}
