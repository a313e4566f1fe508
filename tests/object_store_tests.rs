use bytes::Bytes;
use file_depot::object_store::{LocalStore, ObjectStore, ObjectStoreError};

fn local_store(dir: &tempfile::TempDir) -> LocalStore {
    LocalStore::new(dir.path(), "/uploads").unwrap()
}

#[tokio::test]
async fn test_local_store_put_get() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);

    let data = Bytes::from("hello world");
    store
        .put("general/test.png", data.clone(), "image/png")
        .await
        .unwrap();

    assert!(dir.path().join("general").join("test.png").exists());
    let retrieved = store.get("general/test.png").await.unwrap();
    assert_eq!(retrieved, data);
}

#[tokio::test]
async fn test_local_store_public_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), "/static/").unwrap();
    assert_eq!(store.public_url("docs/a.pdf"), "/static/docs/a.pdf");
    assert_eq!(store.name(), "local");
}

#[tokio::test]
async fn test_local_store_exists() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);

    assert!(!store.exists("general/missing.png").await.unwrap());

    store
        .put("general/present.png", Bytes::from("data"), "image/png")
        .await
        .unwrap();
    assert!(store.exists("general/present.png").await.unwrap());
}

#[tokio::test]
async fn test_local_store_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);

    store
        .put("general/to-delete.png", Bytes::from("data"), "image/png")
        .await
        .unwrap();
    store.delete("general/to-delete.png").await.unwrap();
    assert!(!store.exists("general/to-delete.png").await.unwrap());
}

#[tokio::test]
async fn test_local_store_delete_nonexistent() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);

    // Deleting a nonexistent key should not error
    store.delete("general/nonexistent.png").await.unwrap();
}

#[tokio::test]
async fn test_local_store_get_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);

    let result = store.get("general/missing.png").await;
    assert!(matches!(result, Err(ObjectStoreError::NotFound(_))));
}

#[tokio::test]
async fn test_local_store_relocate() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);

    store
        .put("general/move-me.pdf", Bytes::from("%PDF"), "application/pdf")
        .await
        .unwrap();
    store
        .relocate("general/move-me.pdf", "docs/move-me.pdf", "application/pdf")
        .await
        .unwrap();

    assert!(!dir.path().join("general").join("move-me.pdf").exists());
    assert_eq!(
        store.get("docs/move-me.pdf").await.unwrap(),
        Bytes::from("%PDF")
    );
}

#[tokio::test]
async fn test_local_store_relocate_missing_source_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);

    store
        .relocate("general/ghost.png", "docs/ghost.png", "image/png")
        .await
        .unwrap();

    assert!(dir.path().join("docs").is_dir());
    assert!(!store.exists("docs/ghost.png").await.unwrap());
}

#[tokio::test]
async fn test_local_store_delete_folder() {
    let dir = tempfile::tempdir().unwrap();
    let store = local_store(&dir);

    store
        .put("batch/a.png", Bytes::from("a"), "image/png")
        .await
        .unwrap();
    store.delete_folder("batch").await.unwrap();
    assert!(!dir.path().join("batch").exists());

    // Missing folders are fine
    store.delete_folder("never-created").await.unwrap();
}
