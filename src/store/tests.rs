use std::collections::HashSet;
use std::fs;
use std::thread::sleep;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use crate::store::{JsonFileBackend, SaveRequest, ScreenshotStore, StoreError};

fn store_in(dir: &TempDir) -> (ScreenshotStore, std::path::PathBuf) {
    let path = dir.path().join("screenshots.json");
    let store = ScreenshotStore::new(Box::new(JsonFileBackend::new(path.clone())));
    (store, path)
}

fn request(value: serde_json::Value) -> SaveRequest {
    serde_json::from_value(value).expect("request should deserialize")
}

fn sample_request(robot_id: i64) -> SaveRequest {
    request(json!({
        "robotId": robot_id,
        "image": "data:image/png;base64,iVBORw0KGgo=",
        "segmentData": {"segmentId": robot_id, "water": 0.42, "light": 0.9},
        "position": [132.0, 245.5],
    }))
}

fn field_of(err: StoreError) -> &'static str {
    match err {
        StoreError::Validation { field, .. } => field,
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_save_assigns_unique_ids() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store_in(&dir);

    let mut ids = HashSet::new();
    for i in 0..5 {
        let record = store.save(sample_request(i)).unwrap();
        ids.insert(record.id);
    }
    assert_eq!(ids.len(), 5);
}

#[test]
fn test_robot_id_zero_is_accepted() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store_in(&dir);

    let record = store.save(sample_request(0)).unwrap();
    assert_eq!(record.robot_id, 0);

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].robot_id, 0);
}

#[test]
fn test_save_then_list_round_trips_all_fields() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store_in(&dir);

    // Include an extra sensor field beyond the minimum contract
    let saved = store
        .save(request(json!({
            "robotId": 7,
            "image": "data:image/jpeg;base64,/9j/4AAQSkZJRg==",
            "segmentData": {"segmentId": 3, "water": 1.25, "light": 0.05, "flow": "high"},
            "position": [12.5, 40.0],
        })))
        .unwrap();

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);

    let record = &listed[0];
    assert_eq!(record.id, saved.id);
    assert_eq!(record.robot_id, 7);
    assert_eq!(record.image, "data:image/jpeg;base64,/9j/4AAQSkZJRg==");
    assert_eq!(record.segment_data.segment_id, 3);
    assert_eq!(record.segment_data.water, 1.25);
    assert_eq!(record.segment_data.light, 0.05);
    assert_eq!(record.segment_data.extra.get("flow"), Some(&json!("high")));
    assert_eq!(record.position, Some([12.5, 40.0]));
    assert_eq!(record.timestamp, saved.timestamp);
}

#[test]
fn test_position_is_optional() {
    let dir = TempDir::new().unwrap();
    let (store, path) = store_in(&dir);

    store
        .save(request(json!({
            "robotId": 1,
            "image": "data:image/png;base64,AAAA",
            "segmentData": {"segmentId": 1, "water": 0.0, "light": 0.0},
        })))
        .unwrap();

    assert_eq!(store.list().unwrap()[0].position, None);

    // An absent position must stay absent on disk, not become null
    let raw = fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(parsed[0].get("position").is_none());
}

#[test]
fn test_invalid_requests_are_rejected_without_write() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store_in(&dir);

    store.save(sample_request(1)).unwrap();

    let cases = vec![
        (
            json!({"image": "data:image/png;base64,AAAA", "segmentData": {"segmentId": 1}}),
            "robotId",
        ),
        (json!({"robotId": 2, "segmentData": {"segmentId": 1}}), "image"),
        (
            json!({"robotId": 2, "image": "", "segmentData": {"segmentId": 1}}),
            "image",
        ),
        (
            json!({"robotId": 2, "image": "iVBORw0KGgo=", "segmentData": {"segmentId": 1}}),
            "image",
        ),
        (json!({"robotId": 2, "image": "data:image/png;base64,AAAA"}), "segmentData"),
        (
            json!({"robotId": 2, "image": "data:image/png;base64,AAAA", "segmentData": {"water": 0.5}}),
            "segmentData.segmentId",
        ),
        (
            json!({"robotId": 2, "image": "data:image/png;base64,AAAA", "segmentData": {"segmentId": "four"}}),
            "segmentData.segmentId",
        ),
        (
            json!({"robotId": 2, "image": "data:image/png;base64,AAAA", "segmentData": {"segmentId": 1}, "position": [1.0]}),
            "position",
        ),
    ];

    for (body, expected_field) in cases {
        let err = store.save(request(body)).unwrap_err();
        assert_eq!(field_of(err), expected_field);
    }

    // None of the rejected requests may have touched the collection
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_clear_then_list_is_empty() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store_in(&dir);

    store.save(sample_request(1)).unwrap();
    store.save(sample_request(2)).unwrap();

    let removed = store.clear().unwrap();
    assert_eq!(removed, 2);
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_corrupted_store_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    let (store, path) = store_in(&dir);

    store.save(sample_request(1)).unwrap();

    // Truncate the file to invalid JSON
    fs::write(&path, "[{\"id\": \"17").unwrap();
    assert!(store.list().unwrap().is_empty());

    // A save after corruption proceeds against the empty base collection
    store.save(sample_request(2)).unwrap();
    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].robot_id, 2);
}

#[test]
fn test_list_returns_newest_first() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store_in(&dir);

    let mut saved_ids = Vec::new();
    for robot_id in 0..3 {
        saved_ids.push(store.save(sample_request(robot_id)).unwrap().id);
        sleep(Duration::from_millis(5));
    }

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 3);

    // Newest first, and every record still reachable by its id
    let listed_ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(listed_ids, vec![saved_ids[2].as_str(), saved_ids[1].as_str(), saved_ids[0].as_str()]);
    for id in &saved_ids {
        assert!(listed.iter().any(|r| &r.id == id));
    }
}
