//! # Detection stores
//!
//! A **detection store** answers one query: *give me every detection of object `oid`*. The
//! sampling layer only depends on the [`DetectionStore`] trait; concrete backends live in the
//! submodules.
//!
//! Backends
//! -----------------
//! * [`MemoryStore`] – objects held in memory. Individual ids can be marked unreachable to
//!   exercise connection-failure paths.
//! * [`csv_store::CsvDetectionStore`] – a CSV export of the detection table; the file is
//!   opened and closed within each query.
//! * `sqlite_store::SqliteDetectionStore` *(feature `sqlite`)* – a `detection` table in a
//!   SQLite database; one connection per query.
//!
//! Contract
//! -----------------
//! * Each query acquires its resource (file handle, connection) inside the call and releases
//!   it before returning, on success and on failure alike.
//! * An id unknown to the store yields an **empty** [`ObjectDetections`], not an error.
//! * Failing to reach the backend yields [`PpemError::StoreConnection`].
use std::collections::HashSet;

use crate::constants::{FastHashMap, ObjectId};
use crate::detections::{Detection, DetectionSet, ObjectDetections};
use crate::ppem_errors::PpemError;

pub mod csv_store;
#[cfg(feature = "sqlite")]
pub mod sqlite_store;

/// Source of per-object detections.
pub trait DetectionStore {
    /// Fetch every detection of `oid`, in store order.
    fn query(&self, oid: &str) -> Result<ObjectDetections, PpemError>;
}

impl<S: DetectionStore + ?Sized> DetectionStore for &S {
    fn query(&self, oid: &str) -> Result<ObjectDetections, PpemError> {
        (**self).query(oid)
    }
}

impl<S: DetectionStore + ?Sized> DetectionStore for Box<S> {
    fn query(&self, oid: &str) -> Result<ObjectDetections, PpemError> {
        (**self).query(oid)
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: FastHashMap<ObjectId, Vec<Detection>>,
    unreachable: HashSet<ObjectId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store every object of a detection set.
    pub fn from_set(set: &DetectionSet) -> Self {
        let mut store = MemoryStore::new();
        for object in set {
            store.insert(object.clone());
        }
        store
    }

    pub fn insert(&mut self, object: ObjectDetections) {
        let oid = object.oid().to_string();
        self.objects.insert(oid, object.into_detections());
    }

    /// Make every later query of `oid` fail with a connection error.
    pub fn mark_unreachable(&mut self, oid: impl Into<ObjectId>) {
        self.unreachable.insert(oid.into());
    }
}

impl DetectionStore for MemoryStore {
    fn query(&self, oid: &str) -> Result<ObjectDetections, PpemError> {
        if self.unreachable.contains(oid) {
            return Err(PpemError::StoreConnection {
                oid: oid.to_string(),
                reason: "connection refused".into(),
            });
        }
        match self.objects.get(oid) {
            Some(rows) => ObjectDetections::new(oid, rows.clone()),
            None => Ok(ObjectDetections::empty(oid)),
        }
    }
}

#[cfg(test)]
mod memory_store_test {
    use super::*;
    use crate::detections::test_detections::det;

    #[test]
    fn test_unknown_id_is_empty() {
        let store = MemoryStore::new();
        let obj = store.query("nobody").unwrap();
        assert_eq!(obj.oid(), "nobody");
        assert!(obj.is_empty());
    }

    #[test]
    fn test_unreachable_id() {
        let mut store = MemoryStore::new();
        store.insert(ObjectDetections::new("a", vec![det("a", 1, 1.0, 1, 0.1)]).unwrap());
        store.mark_unreachable("a");
        assert!(matches!(
            store.query("a"),
            Err(PpemError::StoreConnection { ref oid, .. }) if oid == "a"
        ));
    }

    #[test]
    fn test_query_through_reference() {
        let mut store = MemoryStore::new();
        store.insert(ObjectDetections::new("a", vec![det("a", 1, 1.0, 1, 0.1)]).unwrap());
        let by_ref: &dyn DetectionStore = &store;
        assert_eq!(by_ref.query("a").unwrap().len(), 1);
    }
}
