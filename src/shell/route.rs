//! Address-bar mirror.
//!
//! The route is a one-way projection of shell state. The shell reads the
//! current path once at mount and only writes afterwards.

use std::sync::{Mutex, PoisonError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    AdminLogin,
    AdminDashboard,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::AdminLogin => "/admin",
            Self::AdminDashboard => "/admin/dashboard",
        }
    }
}

/// Whether a startup path should open the admin login screen.
#[must_use]
pub fn is_admin_entry_path(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    matches!(trimmed, "/admin" | "/admin/login")
}

/// Browser-history-like sink for the mirrored path.
pub trait History: Send + Sync {
    /// Current path.
    fn current(&self) -> String;
    /// Push a new entry.
    fn push(&self, path: &str);
}

/// In-process history for tests and headless embedding.
#[derive(Debug)]
pub struct MemoryHistory {
    inner: Mutex<HistoryLog>,
}

#[derive(Debug, Default)]
struct HistoryLog {
    entries: Vec<String>,
    reads: usize,
}

impl MemoryHistory {
    #[must_use]
    pub fn new(initial: &str) -> Self {
        Self { inner: Mutex::new(HistoryLog { entries: vec![initial.to_owned()], reads: 0 }) }
    }

    /// Every entry, oldest first, including the initial one.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone()
    }

    /// How many times [`History::current`] was called.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).reads
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(Route::Home.path())
    }
}

impl History for MemoryHistory {
    fn current(&self) -> String {
        let mut log = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        log.reads += 1;
        log.entries.last().cloned().unwrap_or_default()
    }

    fn push(&self, path: &str) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .push(path.to_owned());
    }
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
