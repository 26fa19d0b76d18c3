//! Repository handle — path locator, discovery/init, and config.
//!
//! Owns nothing but paths, a parsed `config`, an output sink, and handles to
//! the object store and reference store; it never caches a decoded object.

use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::error::RepoError;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

pub const METADATA_DIR: &str = ".git";
const DATABASE_DIR: &str = "objects";

pub struct Repository {
    worktree: Box<Path>,
    git_dir: Box<Path>,
    config: ini::Ini,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    refs: Refs,
}

impl Repository {
    fn open(worktree: PathBuf, git_dir: PathBuf, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let config_path = git_dir.join("config");
        let config = ini::Ini::load_from_file(&config_path)
            .map_err(|_| RepoError::ConfigMissing(config_path.clone()))?;
        let version = config
            .get_from(Some("core"), "repositoryformatversion")
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| RepoError::ConfigMissing(config_path.clone()))?;
        if version != 0 {
            return Err(RepoError::BadVersion(version).into());
        }

        let database = Database::new(git_dir.join(DATABASE_DIR).into_boxed_path());
        let refs = Refs::new(git_dir.clone().into_boxed_path());

        Ok(Repository {
            worktree: worktree.into_boxed_path(),
            git_dir: git_dir.into_boxed_path(),
            config,
            writer: RefCell::new(writer),
            database,
            refs,
        })
    }

    /// Walks upward from `start` until a `.git` metadata directory is found.
    pub fn discover(start: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let start = start
            .canonicalize()
            .with_context(|| format!("cannot access {}", start.display()))?;

        let mut current = start.as_path();
        loop {
            let candidate = current.join(METADATA_DIR);
            if candidate.is_dir() {
                return Self::open(current.to_path_buf(), candidate, writer);
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Err(RepoError::NotARepository(start).into()),
            }
        }
    }

    /// Initializes a fresh repository at `worktree`, creating it if absent.
    /// Refuses a `worktree` that already exists and is non-empty.
    pub fn init(worktree: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        if worktree.exists() {
            let non_empty = !worktree.is_dir() || std::fs::read_dir(worktree)?.next().is_some();
            if non_empty {
                return Err(RepoError::NotEmpty(worktree.to_path_buf()).into());
            }
        } else {
            std::fs::create_dir_all(worktree)?;
        }

        let worktree = worktree
            .canonicalize()
            .with_context(|| format!("cannot access {}", worktree.display()))?;
        let git_dir = worktree.join(METADATA_DIR);

        std::fs::create_dir_all(git_dir.join("branches"))?;
        std::fs::create_dir_all(git_dir.join(DATABASE_DIR))?;
        std::fs::create_dir_all(git_dir.join("refs").join("heads"))?;
        std::fs::create_dir_all(git_dir.join("refs").join("tags"))?;
        std::fs::create_dir_all(git_dir.join("refs").join("remotes"))?;

        std::fs::write(
            git_dir.join("description"),
            "Unnamed repository; edit this file 'description' to name the repository.\n",
        )?;
        std::fs::write(git_dir.join("HEAD"), "ref: refs/heads/main\n")?;
        std::fs::write(git_dir.join("config"), Self::default_config_text())?;

        Self::open(worktree, git_dir, writer)
    }

    fn default_config_text() -> &'static str {
        "[core]\nrepositoryformatversion = 0\nfilemode = false\nbare = false\n"
    }

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Joins `parts` under the metadata directory. Purely computational.
    pub fn path(&self, parts: &[&str]) -> PathBuf {
        parts
            .iter()
            .fold(self.git_dir.to_path_buf(), |acc, part| acc.join(part))
    }

    /// Like `path`, but asserts the result is a directory if it exists,
    /// creating it (and all parents) when `create` is set.
    pub fn dir(&self, parts: &[&str], create: bool) -> anyhow::Result<Option<PathBuf>> {
        let path = self.path(parts);
        if path.exists() {
            if !path.is_dir() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("{} exists and is not a directory", path.display()),
                )
                .into());
            }
            return Ok(Some(path));
        }
        if create {
            std::fs::create_dir_all(&path)?;
            return Ok(Some(path));
        }
        Ok(None)
    }

    /// Like `path`, ensuring the parent directory exists when `create` is
    /// set. Returns `None` when the parent is absent and `create` is false.
    pub fn file(&self, parts: &[&str], create: bool) -> anyhow::Result<Option<PathBuf>> {
        match parts.split_last() {
            None => Ok(Some(self.path(parts))),
            Some((_, dir_parts)) => {
                if self.dir(dir_parts, create)?.is_some() || dir_parts.is_empty() {
                    Ok(Some(self.path(parts)))
                } else {
                    Ok(None)
                }
            }
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn config_bool(&self, key: &str) -> bool {
        self.config
            .get_from(Some("core"), key)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    pub fn writer(&self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_writes_canonical_layout() {
        let dir = tempdir().unwrap();
        let worktree = dir.path().join("r1");
        let repo = Repository::init(&worktree, Box::new(std::io::sink())).unwrap();

        assert_eq!(std::fs::read_to_string(repo.git_dir().join("HEAD")).unwrap(), "ref: refs/heads/main\n");
        let config = std::fs::read_to_string(repo.git_dir().join("config")).unwrap();
        assert!(config.contains("repositoryformatversion = 0"));
    }

    #[test]
    fn init_refuses_non_empty_worktree() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("existing"), "data").unwrap();
        assert!(Repository::init(dir.path(), Box::new(std::io::sink())).is_err());
    }

    #[test]
    fn discover_walks_up_to_parent() {
        let dir = tempdir().unwrap();
        let worktree = dir.path().join("r1");
        Repository::init(&worktree, Box::new(std::io::sink())).unwrap();

        let nested = worktree.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let repo = Repository::discover(&nested, Box::new(std::io::sink())).unwrap();
        assert_eq!(repo.worktree(), worktree.canonicalize().unwrap());
    }
}
