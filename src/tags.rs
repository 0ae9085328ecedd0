//! # Catalog tags
//!
//! Ground truth attached to each object by an external catalog cross-match: the catalog
//! period (may be absent), the catalog the period comes from (`source`), and optionally the
//! variability class. Tags are read-only reference data; the tag order drives object sampling.
//!
//! ```text
//! oid,period,source,class
//! ZTF18aaiopei,0.5512,CATALINA,RRL
//! ZTF18abcdefg,,ASASSN,RRL
//! ```
use std::fs::File;
use std::io::{Read, Write};

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::constants::{FastHashMap, ObjectId};
use crate::ppem_errors::PpemError;

/// Ground truth for one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub oid: ObjectId,
    /// Catalog period in days.
    pub period: Option<f64>,
    /// Name of the catalog the period was taken from.
    pub source: String,
    #[serde(default)]
    pub class: Option<String>,
}

/// Ordered tag table with an `oid` index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSet {
    tags: Vec<Tag>,
    index: FastHashMap<ObjectId, usize>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag; a tag with an already known id replaces the previous one in place.
    pub fn push(&mut self, tag: Tag) {
        match self.index.get(&tag.oid) {
            Some(&pos) => self.tags[pos] = tag,
            None => {
                self.index.insert(tag.oid.clone(), self.tags.len());
                self.tags.push(tag);
            }
        }
    }

    pub fn get(&self, oid: &str) -> Option<&Tag> {
        self.index.get(oid).map(|&pos| &self.tags[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    /// Object ids in table order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.tags.iter().map(|t| t.oid.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags of the given objects, in the order of `oids`.
    ///
    /// Return
    /// ----------
    /// * `Err(PpemError::MissingTag)` for the first id without a tag.
    pub fn subset<S: AsRef<str>>(&self, oids: &[S]) -> Result<TagSet, PpemError> {
        let mut out = TagSet::new();
        for oid in oids {
            let tag = self
                .get(oid.as_ref())
                .ok_or_else(|| PpemError::MissingTag(oid.as_ref().to_string()))?;
            out.push(tag.clone());
        }
        Ok(out)
    }

    pub fn read_csv<R: Read>(reader: R) -> Result<TagSet, PpemError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut tags = TagSet::new();
        for row in csv_reader.deserialize::<Tag>() {
            tags.push(row?);
        }
        Ok(tags)
    }

    pub fn load_csv(path: &Utf8Path) -> Result<TagSet, PpemError> {
        TagSet::read_csv(File::open(path)?)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PpemError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for tag in &self.tags {
            csv_writer.serialize(tag)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Utf8Path) -> Result<(), PpemError> {
        self.write_csv(File::create(path)?)
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for tag in iter {
            tags.push(tag);
        }
        tags
    }
}

#[cfg(test)]
mod tags_test {
    use super::*;

    fn tag(oid: &str, period: Option<f64>, source: &str) -> Tag {
        Tag {
            oid: oid.into(),
            period,
            source: source.into(),
            class: None,
        }
    }

    #[test]
    fn test_read_optional_columns() {
        let data = "oid,period,source\nA,0.5,CATALINA\nB,,ASASSN\n";
        let tags = TagSet::read_csv(data.as_bytes()).unwrap();
        assert_eq!(tags.ids(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(tags.get("A").unwrap().period, Some(0.5));
        assert_eq!(tags.get("B").unwrap().period, None);
        assert_eq!(tags.get("B").unwrap().class, None);
    }

    #[test]
    fn test_subset_order_and_missing() {
        let tags: TagSet = vec![
            tag("A", Some(1.0), "X"),
            tag("B", Some(2.0), "Y"),
            tag("C", None, "X"),
        ]
        .into_iter()
        .collect();

        let sub = tags.subset(&["C", "A"]).unwrap();
        assert_eq!(sub.ids(), vec!["C".to_string(), "A".to_string()]);

        let err = tags.subset(&["A", "Z"]).unwrap_err();
        assert!(matches!(err, PpemError::MissingTag(ref oid) if oid == "Z"));
    }

    #[test]
    fn test_write_then_read() {
        let tags: TagSet = vec![tag("A", Some(0.123456789), "X"), tag("B", None, "Y")]
            .into_iter()
            .collect();
        let mut buffer = Vec::new();
        tags.write_csv(&mut buffer).unwrap();
        assert_eq!(TagSet::read_csv(buffer.as_slice()).unwrap(), tags);
    }
}
