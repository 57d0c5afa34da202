use speshal_core::session::{Session, SessionManager, TokenStore};
use speshal_infrastructure::FileTokenStore;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_missing_file_is_empty_session() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileTokenStore::new(Some(temp_dir.path())).unwrap();

    let session = store.load().await.unwrap();
    assert_eq!(session, Session::default());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_tokens_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();

    let store = FileTokenStore::new(Some(temp_dir.path())).unwrap();
    store.save(&Session::new("access-1", "refresh-1")).await.unwrap();
    drop(store);

    let reopened = FileTokenStore::new(Some(temp_dir.path())).unwrap();
    assert_eq!(
        reopened.load().await.unwrap(),
        Session::new("access-1", "refresh-1")
    );
}

#[tokio::test]
async fn test_file_holds_only_the_two_keys() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileTokenStore::new(Some(temp_dir.path())).unwrap();
    store.save(&Session::new("a", "r")).await.unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["__access_token__", "__refresh_token__"]);
}

#[tokio::test]
async fn test_clear_removes_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileTokenStore::new(Some(temp_dir.path())).unwrap();
    store.save(&Session::new("a", "r")).await.unwrap();

    store.clear().await.unwrap();
    assert!(!store.path().exists());
    assert_eq!(store.load().await.unwrap(), Session::default());

    // Clearing twice is fine.
    store.clear().await.unwrap();
}

#[tokio::test]
async fn test_session_manager_over_file_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileTokenStore::new(Some(temp_dir.path())).unwrap());
    let manager = SessionManager::load(store.clone()).await.unwrap();

    manager.set_tokens("a", "r").await.unwrap();
    manager.rotate_access_token("a2", None).await.unwrap();

    assert_eq!(store.load().await.unwrap(), Session::new("a2", "r"));
    assert!(manager.observer().is_authenticated());
}
