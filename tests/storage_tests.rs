use chrono::{SubsecRound, Utc};
use file_depot::storage::models::object_key;
use file_depot::storage::{FilePatch, FileRecord, MetadataStore};

fn test_store() -> (tempfile::TempDir, MetadataStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = MetadataStore::open(dir.path().join("uploads")).unwrap();
    (dir, store)
}

fn sample_file(id: &str, folder: &str) -> FileRecord {
    let filename = format!("1700000000000-{id}.png");
    FileRecord {
        id: id.to_string(),
        url: format!("/uploads/{}", object_key(folder, &filename)),
        storage_key: object_key(folder, &filename),
        filename,
        original_name: "photo.png".to_string(),
        mimetype: "image/png".to_string(),
        size: 1024,
        folder: folder.to_string(),
        description: Some("test file".to_string()),
        created_at: Utc::now().trunc_subsecs(3),
    }
}

#[test]
fn test_open_creates_empty_index() {
    let (dir, store) = test_store();

    let index = dir.path().join("uploads").join(".meta").join("files.json");
    assert_eq!(store.index_path(), index.as_path());
    assert_eq!(std::fs::read_to_string(&index).unwrap(), "[]");
    assert!(store.get_all().is_empty());
}

#[test]
fn test_add_and_find_by_id() {
    let (_dir, store) = test_store();
    let file = sample_file("file-1", "general");

    store.add(file.clone()).unwrap();

    let retrieved = store.find_by_id("file-1").expect("file should exist");
    assert_eq!(retrieved, file);
}

#[test]
fn test_find_by_id_not_found() {
    let (_dir, store) = test_store();
    assert!(store.find_by_id("nonexistent").is_none());
}

#[test]
fn test_get_all_keeps_insertion_order() {
    let (_dir, store) = test_store();
    for id in ["c", "a", "b"] {
        store.add(sample_file(id, "general")).unwrap();
    }

    let ids: Vec<String> = store.get_all().into_iter().map(|f| f.id).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[test]
fn test_find_by_folder() {
    let (_dir, store) = test_store();
    store.add(sample_file("a", "docs")).unwrap();
    store.add(sample_file("b", "general")).unwrap();
    store.add(sample_file("c", "docs")).unwrap();

    let docs = store.find_by_folder("docs");
    assert_eq!(docs.len(), 2);
    assert_eq!(docs, store.find_by_folder("docs"));
    assert!(store.find_by_folder("missing").is_empty());
}

#[test]
fn test_find_by_location() {
    let (_dir, store) = test_store();
    let file = sample_file("loc", "docs");
    store.add(file.clone()).unwrap();

    assert_eq!(store.find_by_location("docs", &file.filename), Some(file.clone()));
    assert!(store.find_by_location("general", &file.filename).is_none());
}

#[test]
fn test_update_merges_fields() {
    let (_dir, store) = test_store();
    let file = sample_file("file-2", "general");
    store.add(file.clone()).unwrap();

    let updated = store
        .update(
            "file-2",
            FilePatch {
                folder: Some("docs".to_string()),
                storage_key: Some(object_key("docs", &file.filename)),
                url: Some(format!("/uploads/docs/{}", file.filename)),
                ..Default::default()
            },
        )
        .unwrap()
        .expect("file should exist");

    assert_eq!(updated.folder, "docs");
    assert_eq!(updated.storage_key, format!("docs/{}", file.filename));
    assert_eq!(updated.description, file.description);
    assert_eq!(updated.created_at, file.created_at);
    assert_eq!(store.find_by_id("file-2"), Some(updated));
}

#[test]
fn test_update_description_only() {
    let (_dir, store) = test_store();
    store.add(sample_file("file-3", "general")).unwrap();

    let updated = store
        .update("file-3", FilePatch::description("new words"))
        .unwrap()
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("new words"));
    assert_eq!(updated.folder, "general");
}

#[test]
fn test_update_not_found() {
    let (_dir, store) = test_store();
    assert!(store
        .update("nonexistent", FilePatch::description("x"))
        .unwrap()
        .is_none());
}

#[test]
fn test_remove_by_id() {
    let (_dir, store) = test_store();
    store.add(sample_file("keep", "general")).unwrap();
    store.add(sample_file("drop", "general")).unwrap();

    let removed = store.remove_by_id("drop").unwrap().expect("file should exist");
    assert_eq!(removed.id, "drop");
    assert!(store.find_by_id("drop").is_none());
    assert!(store.get_all().iter().all(|f| f.id != "drop"));
    assert_eq!(store.get_all().len(), 1);

    assert!(store.remove_by_id("drop").unwrap().is_none());
}

#[test]
fn test_remove_by_folder() {
    let (_dir, store) = test_store();
    for id in ["a", "b", "c"] {
        store.add(sample_file(id, "batch")).unwrap();
    }
    store.add(sample_file("other", "general")).unwrap();

    let removed = store.remove_by_folder("batch").unwrap();
    assert_eq!(removed.len(), 3);
    assert!(store.find_by_folder("batch").is_empty());
    assert_eq!(store.get_all().len(), 1);
}

#[test]
fn test_clear_all() {
    let (_dir, store) = test_store();
    store.add(sample_file("p1", "general")).unwrap();
    store.add(sample_file("p2", "docs")).unwrap();

    let removed = store.clear_all().unwrap();
    assert_eq!(removed.len(), 2);
    assert!(store.get_all().is_empty());
}

#[test]
fn test_index_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("uploads");
    let file = sample_file("persisted", "docs");
    {
        let store = MetadataStore::open(&root).unwrap();
        store.add(file.clone()).unwrap();
        store.add(sample_file("gone", "docs")).unwrap();
        store.remove_by_id("gone").unwrap();
    }

    let store = MetadataStore::open(&root).unwrap();
    assert_eq!(store.get_all(), vec![file]);
}

#[test]
fn test_index_document_format() {
    let (_dir, store) = test_store();
    store.add(sample_file("fmt", "docs")).unwrap();

    let raw = std::fs::read_to_string(store.index_path()).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &doc[0];
    assert_eq!(entry["id"], "fmt");
    assert_eq!(entry["originalName"], "photo.png");
    assert_eq!(entry["storageKey"], "docs/1700000000000-fmt.png");
    assert!(entry["createdAt"].is_i64());
}

#[test]
fn test_malformed_index_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("uploads");
    let store = MetadataStore::open(&root).unwrap();
    std::fs::write(store.index_path(), "{ not json").unwrap();

    let store = MetadataStore::open(&root).unwrap();
    assert!(store.get_all().is_empty());

    store.add(sample_file("fresh", "general")).unwrap();
    assert_eq!(store.get_all().len(), 1);
    assert_eq!(
        std::fs::read_to_string(store.backup_path()).unwrap(),
        "{ not json"
    );
}

#[test]
fn test_undecodable_record_keeps_previous_index() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("uploads");
    {
        let store = MetadataStore::open(&root).unwrap();
        store.add(sample_file("one", "docs")).unwrap();
        store.add(sample_file("two", "docs")).unwrap();
    }

    // Break a single record
    let index = root.join(".meta").join("files.json");
    let mut doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&index).unwrap()).unwrap();
    doc[1]["size"] = serde_json::json!("large");
    let broken = serde_json::to_string(&doc).unwrap();
    std::fs::write(&index, &broken).unwrap();

    let store = MetadataStore::open(&root).unwrap();
    assert!(store.get_all().is_empty());
    store.add(sample_file("three", "docs")).unwrap();

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.backup_path()).unwrap()).unwrap();
    assert_eq!(saved[0]["id"], "one");
    assert_eq!(saved[1]["id"], "two");
}

#[test]
fn test_legacy_records_without_storage_key() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("uploads");
    let store = MetadataStore::open(&root).unwrap();
    std::fs::write(
        store.index_path(),
        r#"[
          {
            "id": "legacy",
            "filename": "1700000000000-42.pdf",
            "originalName": "cv.pdf",
            "mimetype": "application/pdf",
            "size": 10,
            "folder": "docs",
            "url": "/uploads/docs/1700000000000-42.pdf",
            "description": null,
            "createdAt": 1700000000000
          },
          {
            "id": "blob",
            "filename": "1700000000001-7.png",
            "originalName": "a.png",
            "mimetype": "image/png",
            "size": 3,
            "folder": "general",
            "url": "https://store.public.blob.vercel-storage.com/general/1700000000001-7.png",
            "blobPathname": "general/1700000000001-7.png",
            "description": "from blob",
            "createdAt": 1700000000001
          }
        ]"#,
    )
    .unwrap();

    let store = MetadataStore::open(&root).unwrap();
    let legacy = store.find_by_id("legacy").unwrap();
    assert_eq!(legacy.storage_key, "docs/1700000000000-42.pdf");
    assert_eq!(legacy.created_at.timestamp_millis(), 1_700_000_000_000);

    let blob = store.find_by_id("blob").unwrap();
    assert_eq!(blob.storage_key, "general/1700000000001-7.png");
}

#[test]
fn test_failed_write_keeps_snapshot() {
    let (_dir, store) = test_store();
    store.add(sample_file("before", "general")).unwrap();

    // A directory where the temp file would go makes the rewrite fail
    let tmp_path = store.index_path().with_extension("json.tmp");
    std::fs::create_dir_all(&tmp_path).unwrap();

    assert!(store.add(sample_file("after", "general")).is_err());
    assert!(store.find_by_id("after").is_none());
    assert_eq!(store.get_all().len(), 1);
}
