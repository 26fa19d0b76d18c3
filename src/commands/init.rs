//! `init [<dir>]` — initialize a new repository at `dir` (default `.`).

use crate::areas::repository::Repository;

pub fn run(path: Option<&str>) -> anyhow::Result<()> {
    let target = match path {
        Some(path) => std::path::PathBuf::from(path),
        None => std::env::current_dir()?,
    };

    Repository::init(&target, Box::new(std::io::stdout()))?;
    Ok(())
}
