//! Commit object — a KVLM payload with conventional `tree`/`parent`/
//! `author`/`committer` keys plus a message.

use crate::artifacts::objects::kvlm::Kvlm;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::ObjectError;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// An author/committer line: `name <email> timestamp timezone`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Reads `GIT_AUTHOR_NAME`/`GIT_AUTHOR_EMAIL`/`GIT_AUTHOR_DATE`, falling
    /// back to the current time when no date is set.
    pub fn load_from_env() -> anyhow::Result<Self> {
        let name = std::env::var("GIT_AUTHOR_NAME").context("GIT_AUTHOR_NAME not set")?;
        let email = std::env::var("GIT_AUTHOR_EMAIL").context("GIT_AUTHOR_EMAIL not set")?;
        let timestamp = std::env::var("GIT_AUTHOR_DATE").ok().and_then(|date_str| {
            chrono::DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        });

        match timestamp {
            Some(ts) => Ok(Author::new_with_timestamp(name, email, ts)),
            None => Ok(Author::new(name, email)),
        }
    }

    pub fn readable_timestamp(&self) -> String {
        self.timestamp.format("%a %b %-d %H:%M:%S %Y %z").to_string()
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(ObjectError::Malformed(format!("invalid author line: {value:?}")).into());
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| ObjectError::Malformed(format!("invalid author timestamp: {value:?}")))?;
        let name_email_part = parts[2];

        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| ObjectError::Malformed(format!("author line missing '<': {value:?}")))?;
        let email_end = name_email_part
            .find('>')
            .ok_or_else(|| ObjectError::Malformed(format!("author line missing '>': {value:?}")))?;

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        let datetime = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| ObjectError::Malformed(format!("invalid author timestamp: {value:?}")))?;
        let datetime = chrono::DateTime::parse_from_str(
            &format!("{} {}", datetime.format("%Y-%m-%d %H:%M:%S"), timezone),
            "%Y-%m-%d %H:%M:%S %z",
        )
        .map_err(|_| ObjectError::Malformed(format!("invalid author timezone: {value:?}")))?;

        Ok(Author {
            name,
            email,
            timestamp: datetime,
        })
    }
}

/// A commit snapshot: a tree, zero or more parents, author/committer, and a
/// message. Parents are exposed in full (not just the first) so merge
/// commits round-trip.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    kvlm: Kvlm,
}

impl Commit {
    pub fn new(
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        committer: Author,
        message: String,
    ) -> Self {
        let mut kvlm = Kvlm::new();
        kvlm.insert("tree", tree_oid.as_ref());
        for parent in &parents {
            kvlm.insert("parent", parent.as_ref());
        }
        kvlm.insert("author", author.display());
        kvlm.insert("committer", committer.display());
        kvlm.set_message(message);
        Commit { kvlm }
    }

    pub fn short_message(&self) -> String {
        self.kvlm.message().lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        self.kvlm.message()
    }

    pub fn tree_oid(&self) -> anyhow::Result<ObjectId> {
        let raw = self
            .kvlm
            .get("tree")
            .ok_or_else(|| ObjectError::Malformed("commit missing tree key".into()))?;
        ObjectId::try_parse(raw)
    }

    /// All parents, in file order; empty for a root commit.
    pub fn parents(&self) -> anyhow::Result<Vec<ObjectId>> {
        self.kvlm
            .get_all("parent")
            .iter()
            .map(ObjectId::try_parse)
            .collect()
    }

    pub fn author(&self) -> anyhow::Result<Author> {
        let raw = self
            .kvlm
            .get("author")
            .ok_or_else(|| ObjectError::Malformed("commit missing author key".into()))?;
        Author::try_from(raw)
    }

    pub fn timestamp(&self) -> anyhow::Result<chrono::DateTime<chrono::FixedOffset>> {
        Ok(self.author()?.timestamp())
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let body = self.kvlm.serialize();
        let mut bytes = Vec::with_capacity(body.len() + 16);
        write!(bytes, "{} {}\0", self.object_type().as_str(), body.len())?;
        bytes.write_all(body.as_bytes())?;
        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        let content = String::from_utf8(content)
            .map_err(|e| ObjectError::Malformed(format!("non-utf8 commit payload: {e}")))?;
        let kvlm = Kvlm::parse(&content)?;
        Ok(Commit { kvlm })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.kvlm.serialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_id() -> ObjectId {
        ObjectId::try_parse("1111111111111111111111111111111111111111").unwrap()
    }

    fn parent_id(n: u8) -> ObjectId {
        ObjectId::try_parse(format!("{:02x}{}", n, "2".repeat(38))).unwrap()
    }

    fn author() -> Author {
        Author::new_with_timestamp(
            "A U Thor".into(),
            "author@example.com".into(),
            chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00+00:00").unwrap(),
        )
    }

    #[test]
    fn round_trips_multiple_parents_in_order() {
        let parents = vec![parent_id(1), parent_id(2)];
        let commit = Commit::new(
            parents.clone(),
            tree_id(),
            author(),
            author(),
            "merge\n".into(),
        );
        let frame = commit.serialize().unwrap();
        let header_end = frame.iter().position(|&b| b == 0).unwrap();
        let decoded = Commit::deserialize(&frame[header_end + 1..]).unwrap();
        assert_eq!(decoded.parents().unwrap(), parents);
        assert_eq!(decoded.tree_oid().unwrap(), tree_id());
    }

    #[test]
    fn root_commit_has_no_parents() {
        let commit = Commit::new(vec![], tree_id(), author(), author(), "root\n".into());
        assert!(commit.parents().unwrap().is_empty());
    }
}
