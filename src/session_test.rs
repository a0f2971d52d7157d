use super::*;

fn pair(access: &str, refresh: &str) -> TokenPair {
    TokenPair { access_token: access.into(), refresh_token: refresh.into() }
}

fn user(id: &str) -> UserInfo {
    UserInfo { id: id.into(), email: format!("{id}@example.com"), ..UserInfo::default() }
}

// =============================================================================
// MemoryTokenStore
// =============================================================================

#[test]
fn memory_store_starts_empty() {
    let store = MemoryTokenStore::new();
    assert!(store.get().is_none());
    assert!(store.user().is_none());
    assert!(!store.has_session());
}

#[test]
fn memory_store_set_then_get() {
    let store = MemoryTokenStore::new();
    store.set(pair("a1", "r1"));
    assert_eq!(store.get(), Some(pair("a1", "r1")));
    assert!(store.has_session());
}

#[test]
fn memory_store_set_replaces_previous_pair() {
    let store = MemoryTokenStore::with_tokens(pair("a1", "r1"));
    store.set(pair("a2", "r2"));
    assert_eq!(store.get(), Some(pair("a2", "r2")));
}

#[test]
fn memory_store_clear_removes_tokens_and_user() {
    let store = MemoryTokenStore::with_tokens(pair("a1", "r1"));
    store.set_user(user("u1"));
    store.clear();
    assert!(store.get().is_none());
    assert!(store.user().is_none());
}

#[test]
fn memory_store_clear_is_idempotent() {
    let store = MemoryTokenStore::new();
    store.clear();
    store.clear();
    assert!(store.get().is_none());
}

#[test]
fn memory_store_user_round_trip() {
    let store = MemoryTokenStore::new();
    store.set_user(user("u9"));
    assert_eq!(store.user().unwrap().id, "u9");
    // Cached user info alone is not a session.
    assert!(!store.has_session());
}

#[test]
fn empty_access_token_is_not_a_session() {
    let store = MemoryTokenStore::with_tokens(pair("", "r"));
    assert!(store.get().is_none());
}

// =============================================================================
// FileTokenStore
// =============================================================================

#[test]
fn file_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("session.json"));
    assert!(store.get().is_none());
    assert!(store.user().is_none());
}

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    {
        let store = FileTokenStore::new(&path);
        store.set(pair("a1", "r1"));
        store.set_user(user("u1"));
    }
    let reopened = FileTokenStore::new(&path);
    assert_eq!(reopened.get(), Some(pair("a1", "r1")));
    assert_eq!(reopened.user().unwrap().id, "u1");
}

#[test]
fn file_store_writes_camel_case_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileTokenStore::new(&path);
    store.set(pair("a1", "r1"));
    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["accessToken"], "a1");
    assert_eq!(value["refreshToken"], "r1");
}

#[test]
fn file_store_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("session.json");
    let store = FileTokenStore::new(&path);
    store.set(pair("a1", "r1"));
    assert!(path.exists());
}

#[test]
fn file_store_clear_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileTokenStore::new(&path);
    store.set(pair("a1", "r1"));
    store.clear();
    assert!(!path.exists());
    assert!(store.get().is_none());
    store.clear();
}

#[test]
fn file_store_corrupt_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();
    let store = FileTokenStore::new(&path);
    assert!(store.get().is_none());
    // A later write recovers the file.
    store.set(pair("a2", "r2"));
    assert_eq!(store.get(), Some(pair("a2", "r2")));
}

#[test]
fn file_store_partial_session_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, r#"{"accessToken":"only-access"}"#).unwrap();
    let store = FileTokenStore::new(&path);
    assert!(store.get().is_none());
}

#[test]
fn file_store_works_through_shared_handle() {
    let dir = tempfile::tempdir().unwrap();
    let shared: SharedTokenStore = Arc::new(FileTokenStore::new(dir.path().join("s.json")));
    shared.set(pair("a", "r"));
    assert!(shared.has_session());
}

// =============================================================================
// open_store
// =============================================================================

#[test]
fn open_store_without_token_file_is_memory_only() {
    let store = open_store(&ClientConfig::default());
    store.set(pair("a", "r"));
    assert!(store.has_session());
}

#[test]
fn open_store_with_token_file_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let config = ClientConfig { token_file: Some(path.clone()), ..ClientConfig::default() };
    open_store(&config).set(pair("a", "r"));
    assert!(path.exists());
    assert_eq!(open_store(&config).get(), Some(pair("a", "r")));
}
