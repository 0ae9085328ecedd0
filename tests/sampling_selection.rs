mod common;

use camino::Utf8Path;
use common::{synthetic_object, tags_for};
use ppem::detections::detection_file::DetectionFile;
use ppem::detections::DetectionSet;
use ppem::sampling::{select_objects, ClassSample, SamplingParams};
use ppem::store::csv_store::CsvDetectionStore;
use ppem::store::MemoryStore;
use ppem::{Band, PpemError};

fn store_with(objects: &[(&str, usize, usize)]) -> MemoryStore {
    let mut store = MemoryStore::new();
    for &(oid, n_g, n_r) in objects {
        store.insert(synthetic_object(oid, n_g, n_r, 0.6));
    }
    store
}

#[test]
fn test_rejects_only_undersized_band() {
    let store = store_with(&[("A", 15, 20), ("B", 5, 30), ("C", 25, 25)]);
    let params = SamplingParams::builder().min_detections(10).build().unwrap();

    let set = select_objects(&store, &["A", "B", "C"], &params).unwrap();
    assert_eq!(set.object_ids(), vec!["A".to_string(), "C".to_string()]);
    for object in &set {
        assert!(object.count(Band::Green) >= 10);
        assert!(object.count(Band::Red) >= 10);
    }
}

#[test]
fn test_never_more_than_target_count() {
    let ids: Vec<String> = (0..20).map(|i| format!("ZTF{i:02}")).collect();
    let mut store = MemoryStore::new();
    for oid in &ids {
        store.insert(synthetic_object(oid, 12, 12, 0.6));
    }

    let params = SamplingParams::builder()
        .target_count(7)
        .min_detections(10)
        .build()
        .unwrap();
    let set = select_objects(&store, &ids, &params).unwrap();
    assert_eq!(set.len(), 7);
    assert_eq!(set.object_ids(), ids[..7].to_vec());

    // exhausting the ids before the target is reached is not an error
    let short = select_objects(&store, &ids[..3], &params).unwrap();
    assert_eq!(short.len(), 3);
}

#[test]
fn test_store_failure_skips_single_id() {
    let mut store = store_with(&[("A", 12, 12), ("B", 12, 12)]);
    store.mark_unreachable("A");
    let params = SamplingParams::builder().min_detections(10).build().unwrap();

    let set = select_objects(&store, &["A", "B"], &params).unwrap();
    assert_eq!(set.object_ids(), vec!["B".to_string()]);
}

#[test]
fn test_missing_csv_store_is_unavailable() {
    let store = CsvDetectionStore::new("/nonexistent/ppem/detections.csv");
    let res = select_objects(&store, &["A", "B", "C"], &SamplingParams::default());
    assert!(matches!(res, Err(PpemError::StoreUnavailable { attempted: 3, .. })));
}

#[test]
fn test_persisted_sample_round_trip() {
    let store = store_with(&[("A", 12, 11), ("B", 3, 30), ("C", 14, 10)]);
    let tags = tags_for(&[("A", 0.6, "CATALINA"), ("B", 0.6, "ASASSN"), ("C", 0.6, "GAIA")]);
    let params = SamplingParams::builder().min_detections(10).build().unwrap();
    let sample = ClassSample::from_store("RRL", &store, &tags, &params).unwrap();
    assert_eq!(sample.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let dir = Utf8Path::from_path(dir.path()).unwrap();
    sample.objects().save_csv(&dir.join("objects.csv")).unwrap();
    sample.tags().save_csv(&dir.join("tags.csv")).unwrap();

    // the persisted file also works as a detection store
    let file_store = CsvDetectionStore::new(dir.join("objects.csv"));
    assert_eq!(
        select_objects(&file_store, &["C"], &params).unwrap().total_detections(),
        24
    );

    let objects = DetectionSet::new_from_csv(&dir.join("objects.csv")).unwrap();
    let reloaded = ClassSample::from_parts("RRL", objects, &tags).unwrap();
    assert_eq!(reloaded.objects().object_ids(), sample.objects().object_ids());
    assert_eq!(reloaded.tags(), sample.tags());
    assert_eq!(
        reloaded.objects().get("A").unwrap().detections(),
        sample.objects().get("A").unwrap().detections()
    );

    let partial_tags = tags_for(&[("A", 0.6, "CATALINA")]);
    let objects = DetectionSet::new_from_csv(&dir.join("objects.csv")).unwrap();
    assert!(matches!(
        ClassSample::from_parts("RRL", objects, &partial_tags),
        Err(PpemError::MissingTag(ref oid)) if oid == "C"
    ));
}
