//! Shell state and the view projection.
//!
//! DESIGN
//! ======
//! The open-flags are kept as plain fields, but nothing renders from them
//! directly: [`ShellState::view`] is the single projection that resolves
//! overlapping flags by a fixed precedence, so two screens can never be
//! "open" at once from the renderer's point of view.

use serde::Serialize;

use super::route::Route;
use crate::net::types::{Roles, UserProfile, has_admin_role};

pub const DEFAULT_DASHBOARD_TAB: &str = "overview";
pub const BILLING_TAB: &str = "billing";
pub const DEFAULT_SCAN_PLATFORM: &str = "instagram";

/// The single top-level screen being shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Loading,
    AdminLogin,
    UnauthenticatedGate,
    AdminPanel,
    UserDashboard,
    Landing,
}

/// A scan requested for a specific account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeepLink {
    pub username: String,
    pub platform: String,
}

impl DeepLink {
    /// Build a deep link; a blank platform falls back to
    /// [`DEFAULT_SCAN_PLATFORM`].
    #[must_use]
    pub fn new(username: &str, platform: Option<&str>) -> Self {
        let platform = platform
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_SCAN_PLATFORM);
        Self { username: username.trim().to_owned(), platform: platform.to_owned() }
    }
}

/// The quick-scan overlay on the landing screen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanOverlay {
    pub prefill: Option<DeepLink>,
}

/// Everything the shell knows. Only the shell's transitions mutate it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShellState {
    pub loading: bool,
    pub authenticated: bool,
    pub roles: Roles,
    pub profile: Option<UserProfile>,
    pub admin_login_open: bool,
    pub admin_open: bool,
    pub dashboard_open: bool,
    pub dashboard_tab: String,
    pub pending_deep_link: Option<DeepLink>,
    pub scan: Option<ScanOverlay>,
    /// Last screen-level error message.
    pub error: Option<String>,
    /// Bumped whenever the session is torn down; async results tagged with
    /// an older value are discarded.
    pub generation: u64,
    /// Path last written to the address bar.
    pub mirrored_path: String,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            loading: true,
            authenticated: false,
            roles: Roles::new(),
            profile: None,
            admin_login_open: false,
            admin_open: false,
            dashboard_open: false,
            dashboard_tab: DEFAULT_DASHBOARD_TAB.to_owned(),
            pending_deep_link: None,
            scan: None,
            error: None,
            generation: 0,
            mirrored_path: Route::Home.path().to_owned(),
        }
    }
}

impl ShellState {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        has_admin_role(&self.roles)
    }

    /// Resolve the flags into the one visible screen.
    ///
    /// Loading > AdminLogin > UnauthenticatedGate > AdminPanel (admin only)
    /// > UserDashboard > Landing. A non-admin with the admin flag set falls
    /// through without error.
    #[must_use]
    pub fn view(&self) -> View {
        if self.loading {
            View::Loading
        } else if self.admin_login_open {
            View::AdminLogin
        } else if !self.authenticated {
            View::UnauthenticatedGate
        } else if self.admin_open && self.is_admin() {
            View::AdminPanel
        } else if self.dashboard_open {
            View::UserDashboard
        } else {
            View::Landing
        }
    }

    /// Path the address bar should show, or `None` to leave it alone.
    #[must_use]
    pub fn route(&self) -> Option<Route> {
        if self.admin_login_open {
            Some(Route::AdminLogin)
        } else if self.view() == View::AdminPanel {
            Some(Route::AdminDashboard)
        } else if !self.dashboard_open && !self.admin_open {
            Some(Route::Home)
        } else {
            None
        }
    }

    /// Whether the scan overlay is showing on top of the current screen.
    #[must_use]
    pub fn scan_visible(&self) -> bool {
        self.scan.is_some() && self.view() == View::Landing
    }

    /// Record a verified profile.
    pub fn apply_profile(&mut self, profile: UserProfile) {
        self.roles = profile.roles.clone();
        self.profile = Some(profile);
    }

    /// Mark the user signed in and surface any pending deep link.
    pub fn sign_in(&mut self) {
        self.authenticated = true;
        self.loading = false;
        self.error = None;
        if let Some(link) = self.pending_deep_link.take() {
            self.scan = Some(ScanOverlay { prefill: Some(link) });
        }
    }

    /// Drop the session: identity, roles, protected screens, and the
    /// pending deep link. Invalidates in-flight results.
    pub fn sign_out(&mut self) {
        self.generation += 1;
        self.authenticated = false;
        self.roles.clear();
        self.profile = None;
        self.admin_open = false;
        self.dashboard_open = false;
        self.pending_deep_link = None;
        self.scan = None;
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
