//! Annotated tag object — a KVLM payload naming the tagged object, its kind,
//! the tag name, and an optional tagger line, plus a message.
//!
//! Lightweight tags (a ref pointing directly at a commit) are not a
//! distinct object kind and are handled entirely by the reference store;
//! this type only covers annotated tags, which are real objects.

use crate::artifacts::objects::kvlm::Kvlm;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::ObjectError;
use bytes::Bytes;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tag {
    kvlm: Kvlm,
}

impl Tag {
    pub fn new(
        object: ObjectId,
        object_type: ObjectType,
        name: String,
        tagger: Option<String>,
        message: String,
    ) -> Self {
        let mut kvlm = Kvlm::new();
        kvlm.insert("object", object.as_ref());
        kvlm.insert("type", object_type.as_str());
        kvlm.insert("tag", name);
        if let Some(tagger) = tagger {
            kvlm.insert("tagger", tagger);
        }
        kvlm.set_message(message);
        Tag { kvlm }
    }

    pub fn object(&self) -> anyhow::Result<ObjectId> {
        let raw = self
            .kvlm
            .get("object")
            .ok_or_else(|| ObjectError::Malformed("tag missing object key".into()))?;
        ObjectId::try_parse(raw)
    }

    pub fn object_kind(&self) -> anyhow::Result<ObjectType> {
        let raw = self
            .kvlm
            .get("type")
            .ok_or_else(|| ObjectError::Malformed("tag missing type key".into()))?;
        ObjectType::try_from(raw)
    }

    pub fn name(&self) -> anyhow::Result<&str> {
        self.kvlm
            .get("tag")
            .ok_or_else(|| ObjectError::Malformed("tag missing tag key".into()).into())
    }

    pub fn tagger(&self) -> Option<&str> {
        self.kvlm.get("tagger")
    }

    pub fn message(&self) -> &str {
        self.kvlm.message()
    }
}

impl Packable for Tag {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let body = self.kvlm.serialize();
        let mut bytes = Vec::with_capacity(body.len() + 16);
        write!(bytes, "{} {}\0", self.object_type().as_str(), body.len())?;
        bytes.write_all(body.as_bytes())?;
        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for Tag {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        let content = String::from_utf8(content)
            .map_err(|e| ObjectError::Malformed(format!("non-utf8 tag payload: {e}")))?;
        let kvlm = Kvlm::parse(&content)?;
        Ok(Tag { kvlm })
    }
}

impl Object for Tag {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tag
    }

    fn display(&self) -> String {
        self.kvlm.serialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_annotated_tag() {
        let target = ObjectId::try_parse("1111111111111111111111111111111111111111").unwrap();
        let tag = Tag::new(
            target.clone(),
            ObjectType::Commit,
            "v1".into(),
            Some("A U Thor <a@x> 0 +0000".into()),
            "release\n".into(),
        );
        let frame = tag.serialize().unwrap();
        let header_end = frame.iter().position(|&b| b == 0).unwrap();
        let decoded = Tag::deserialize(&frame[header_end + 1..]).unwrap();
        assert_eq!(decoded.object().unwrap(), target);
        assert_eq!(decoded.object_kind().unwrap(), ObjectType::Commit);
        assert_eq!(decoded.name().unwrap(), "v1");
        assert_eq!(decoded.message(), "release\n");
    }
}
