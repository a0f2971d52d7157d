use super::*;

#[test]
fn paths() {
    assert_eq!(Route::Home.path(), "/");
    assert_eq!(Route::AdminLogin.path(), "/admin");
    assert_eq!(Route::AdminDashboard.path(), "/admin/dashboard");
}

#[test]
fn admin_entry_paths() {
    assert!(is_admin_entry_path("/admin"));
    assert!(is_admin_entry_path("/admin/"));
    assert!(is_admin_entry_path("/admin/login"));
    assert!(is_admin_entry_path("/admin?next=x"));
    assert!(is_admin_entry_path("/admin/login#top"));
}

#[test]
fn non_admin_entry_paths() {
    assert!(!is_admin_entry_path("/"));
    assert!(!is_admin_entry_path(""));
    assert!(!is_admin_entry_path("/admin/dashboard"));
    assert!(!is_admin_entry_path("/administrator"));
    assert!(!is_admin_entry_path("/dashboard"));
}

#[test]
fn memory_history_tracks_entries_and_reads() {
    let history = MemoryHistory::new("/admin");
    assert_eq!(history.current(), "/admin");
    history.push("/admin/dashboard");
    assert_eq!(history.entries(), vec!["/admin".to_owned(), "/admin/dashboard".to_owned()]);
    assert_eq!(history.reads(), 1);
}

#[test]
fn memory_history_default_is_root() {
    assert_eq!(MemoryHistory::default().entries(), vec!["/".to_owned()]);
}
