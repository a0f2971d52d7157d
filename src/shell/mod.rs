//! Application shell: the top-level navigation and auth state machine.
//!
//! ARCHITECTURE
//! ============
//! [`Shell`] owns a [`ShellState`] and exposes one method per user event.
//! Each method applies its transition, then mirrors the result into the
//! [`History`] sink. The visible screen is always [`ShellState::view`].
//!
//! CONCURRENCY
//! ===========
//! Methods take `&self` and may interleave on one task. The state mutex is
//! never held across an `.await`. Every async transition captures the
//! generation when it starts; logout and forced sign-out bump it, and a
//! result that comes back under an older generation is dropped.
//!
//! The startup path is read exactly once, synchronously, inside
//! [`Shell::mount`] before verification is issued.

pub mod route;
pub mod state;

pub use route::{History, MemoryHistory, Route, is_admin_entry_path};
pub use state::{DeepLink, ScanOverlay, ShellState, View};

use std::sync::{Mutex, MutexGuard, PoisonError};

use state::{BILLING_TAB, DEFAULT_DASHBOARD_TAB};

use crate::auth::{AuthApi, Outcome};
use crate::net::error::ErrorKind;
use crate::net::types::UserProfile;

const ADMIN_REQUIRED: &str = "Admin access required";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    /// The transition needs a signed-in user.
    #[error("Sign in required")]
    NotAuthenticated,

    /// The transition needs the admin role.
    #[error("Admin access required")]
    Forbidden,

    /// The auth call failed; `message` is what the screen shows.
    #[error("{message}")]
    Rejected { kind: Option<ErrorKind>, message: String },

    /// A logout landed while this operation was in flight.
    #[error("superseded by a newer session change")]
    Superseded,
}

impl ShellError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "E_NOT_AUTHENTICATED",
            Self::Forbidden => "E_FORBIDDEN",
            Self::Rejected { .. } => "E_AUTH_REJECTED",
            Self::Superseded => "E_SUPERSEDED",
        }
    }

    fn rejected<T>(outcome: &Outcome<T>, fallback: &str) -> Self {
        Self::Rejected { kind: outcome.error, message: outcome.message_or(fallback) }
    }
}

// =============================================================================
// SHELL
// =============================================================================

pub struct Shell<A, H> {
    auth: A,
    history: H,
    state: Mutex<ShellState>,
}

impl<A: AuthApi, H: History> Shell<A, H> {
    #[must_use]
    pub fn new(auth: A, history: H) -> Self {
        Self { auth, history, state: Mutex::new(ShellState::default()) }
    }

    #[must_use]
    pub fn auth(&self) -> &A {
        &self.auth
    }

    #[must_use]
    pub fn history(&self) -> &H {
        &self.history
    }

    /// Copy of the full state.
    #[must_use]
    pub fn snapshot(&self) -> ShellState {
        self.lock().clone()
    }

    /// The one screen to render.
    #[must_use]
    pub fn view(&self) -> View {
        self.lock().view()
    }

    /// Path the address bar was last synced to.
    #[must_use]
    pub fn route(&self) -> String {
        self.lock().mirrored_path.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ShellState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` to the state and mirror the result into history.
    fn transition<R>(&self, f: impl FnOnce(&mut ShellState) -> R) -> R {
        let mut state = self.lock();
        let before = state.view();
        let out = f(&mut state);
        let after = state.view();
        if before != after {
            tracing::debug!(?before, ?after, "view changed");
        }
        self.sync_route(&mut state);
        out
    }

    /// Like [`Self::transition`], but only if `generation` is still current.
    fn transition_if_current<R>(
        &self,
        generation: u64,
        what: &str,
        f: impl FnOnce(&mut ShellState) -> Result<R, ShellError>,
    ) -> Result<R, ShellError> {
        self.transition(|state| {
            if state.generation != generation {
                tracing::debug!(what, generation, current = state.generation, "discarding stale result");
                return Err(ShellError::Superseded);
            }
            f(state)
        })
    }

    fn sync_route(&self, state: &mut ShellState) {
        let Some(route) = state.route() else {
            return;
        };
        if state.mirrored_path != route.path() {
            self.history.push(route.path());
            state.mirrored_path = route.path().to_owned();
        }
    }

    /// Clear errors and capture the generation an async transition runs
    /// under.
    fn begin(&self) -> u64 {
        let mut state = self.lock();
        state.error = None;
        state.generation
    }

    /// A sign-in that completed after a logout has written a session the
    /// user already asked to end. Revoke it and clear the store again.
    async fn revoke_stale_session(&self, stale: ShellError) -> ShellError {
        tracing::debug!("revoking session from superseded sign-in");
        self.auth.logout().await;
        stale
    }

    fn record_failure<T>(&self, generation: u64, outcome: &Outcome<T>, fallback: &str) -> ShellError {
        let err = ShellError::rejected(outcome, fallback);
        let message = err.to_string();
        let forced = outcome.is_unauthorized();
        let result = self.transition_if_current(generation, fallback, |state| {
            if forced {
                state.sign_out();
            }
            state.error = Some(message);
            Ok(())
        });
        match result {
            Err(stale) => stale,
            Ok(()) => err,
        }
    }

    // -------------------------------------------------------------------------
    // startup
    // -------------------------------------------------------------------------

    /// Start the shell: read the startup path once, then verify any stored
    /// session.
    ///
    /// A valid session lands on Landing, closing an admin login opened by
    /// the path. Anything else leaves the user unauthenticated, with the
    /// admin login still open if the path asked for it.
    pub async fn mount(&self) {
        let start_path = self.history.current();
        let generation = {
            let mut state = self.lock();
            state.loading = true;
            state.mirrored_path = start_path.clone();
            if is_admin_entry_path(&start_path) {
                state.admin_login_open = true;
            }
            self.sync_route(&mut state);
            state.generation
        };
        tracing::info!(path = %start_path, "shell mounted");

        let outcome = self.auth.get_user_profile().await;
        if !outcome.success && !outcome.is_unauthorized() {
            tracing::warn!(message = ?outcome.message, "session verification failed");
        }
        let verified = if outcome.success { outcome.data } else { None };
        let _ = self.transition_if_current(generation, "startup verification", |state| {
            state.loading = false;
            match verified {
                Some(profile) => {
                    state.admin_login_open = false;
                    state.apply_profile(profile);
                    state.sign_in();
                    tracing::info!(admin = state.is_admin(), "stored session verified");
                }
                // Only a 401 clears the stored tokens; a network or server
                // failure leaves them for the next mount.
                None => {
                    state.authenticated = false;
                    state.roles.clear();
                    state.profile = None;
                }
            }
            Ok(())
        });
    }

    // -------------------------------------------------------------------------
    // authentication
    // -------------------------------------------------------------------------

    /// Sign in from the gate. On success the user lands on Landing, with
    /// the scan overlay open if a deep link was pending.
    ///
    /// # Errors
    ///
    /// [`ShellError::Rejected`] with the message to show, or
    /// [`ShellError::Superseded`] if a logout raced it.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ShellError> {
        let generation = self.begin();
        let outcome = self.auth.login(email, password).await;
        if !outcome.success {
            return Err(self.record_failure(generation, &outcome, "Login failed"));
        }
        self.complete_sign_in(generation).await
    }

    /// Create an account and sign in with it.
    ///
    /// When the registration response carries no session, the same
    /// credentials are used to log in.
    ///
    /// # Errors
    ///
    /// Same as [`Self::login`].
    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<(), ShellError> {
        let generation = self.begin();
        let outcome = self.auth.register(email, username, password).await;
        if !outcome.success {
            return Err(self.record_failure(generation, &outcome, "Registration failed"));
        }

        let session_established = outcome
            .data
            .as_ref()
            .is_some_and(|r| r.session_established);
        if !session_established {
            tracing::debug!("registration returned no session, signing in");
            let login = self.auth.login(email, password).await;
            if !login.success {
                return Err(self.record_failure(generation, &login, "Login failed"));
            }
        }
        self.complete_sign_in(generation).await
    }

    async fn complete_sign_in(&self, generation: u64) -> Result<(), ShellError> {
        let signed_in = self.transition_if_current(generation, "login", |state| {
            state.sign_in();
            Ok(())
        });
        if let Err(stale) = signed_in {
            return Err(self.revoke_stale_session(stale).await);
        }

        let profile = self.auth.get_user_profile().await;
        let expired = profile
            .is_unauthorized()
            .then(|| ShellError::rejected(&profile, "Session expired"));
        if !profile.success && expired.is_none() {
            tracing::warn!(message = ?profile.message, "profile fetch failed after login, continuing without roles");
        }
        let fetched = if profile.success { profile.data } else { None };
        self.transition_if_current(generation, "post-login profile", |state| {
            if let Some(err) = expired {
                state.sign_out();
                state.error = Some(err.to_string());
                return Err(err);
            }
            match fetched {
                Some(p) => state.apply_profile(p),
                None => state.roles.clear(),
            }
            Ok(())
        })
    }

    /// Sign in from the admin login screen. Succeeds only for accounts the
    /// profile confirms as admin; anyone else is signed straight back out.
    ///
    /// # Errors
    ///
    /// [`ShellError::Forbidden`] for a non-admin account,
    /// [`ShellError::Rejected`] for bad credentials, or
    /// [`ShellError::Superseded`].
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<(), ShellError> {
        let generation = self.begin();
        let outcome = self.auth.login(email, password).await;
        if !outcome.success {
            return Err(self.record_failure(generation, &outcome, "Login failed"));
        }

        let profile = self.auth.get_user_profile().await;
        let admin: Option<UserProfile> = if profile.success { profile.data } else { None };
        let admin = admin.filter(UserProfile::is_admin);
        if let Some(profile) = admin {
            let signed_in = self.transition_if_current(generation, "admin login", |state| {
                state.apply_profile(profile);
                state.sign_in();
                state.admin_login_open = false;
                state.admin_open = true;
                tracing::info!("admin signed in");
                Ok(())
            });
            return match signed_in {
                Err(stale) => Err(self.revoke_stale_session(stale).await),
                Ok(()) => Ok(()),
            };
        }

        let current = self.lock().generation;
        if current != generation {
            tracing::debug!(generation, current, "discarding stale admin login");
            return Err(self.revoke_stale_session(ShellError::Superseded).await);
        }
        tracing::warn!("admin login rejected, account lacks admin role");
        self.auth.logout().await;
        self.transition(|state| {
            state.sign_out();
            state.admin_login_open = true;
            state.error = Some(ADMIN_REQUIRED.to_owned());
        });
        Err(ShellError::Forbidden)
    }

    /// Sign out. Local state is cleared before the server is told, so any
    /// request still in flight comes back stale. Calling it again is
    /// harmless.
    pub async fn logout(&self) {
        self.transition(|state| {
            state.sign_out();
            state.loading = false;
            state.admin_login_open = false;
            state.error = None;
        });
        self.auth.logout().await;
        tracing::info!("signed out");
    }

    // -------------------------------------------------------------------------
    // navigation
    // -------------------------------------------------------------------------

    /// Open the user dashboard on `tab` (blank means the default tab).
    ///
    /// # Errors
    ///
    /// [`ShellError::NotAuthenticated`] when nobody is signed in.
    pub fn enter_dashboard(&self, tab: &str) -> Result<(), ShellError> {
        self.transition(|state| {
            if !state.authenticated {
                return Err(ShellError::NotAuthenticated);
            }
            let tab = tab.trim();
            state.dashboard_tab = if tab.is_empty() { DEFAULT_DASHBOARD_TAB } else { tab }.to_owned();
            state.dashboard_open = true;
            state.admin_open = false;
            Ok(())
        })
    }

    /// Leave the dashboard for the landing screen.
    pub fn go_home(&self) {
        self.transition(|state| {
            state.dashboard_open = false;
            state.admin_open = false;
        });
    }

    /// Open the admin panel over the current screen.
    ///
    /// # Errors
    ///
    /// [`ShellError::NotAuthenticated`] or [`ShellError::Forbidden`]; the
    /// visible screen does not change.
    pub fn open_admin(&self) -> Result<(), ShellError> {
        self.transition(|state| {
            if !state.authenticated {
                return Err(ShellError::NotAuthenticated);
            }
            if !state.is_admin() {
                tracing::debug!("open admin refused, missing admin role");
                return Err(ShellError::Forbidden);
            }
            state.admin_open = true;
            Ok(())
        })
    }

    /// Close the admin panel, returning to whichever screen was under it.
    pub fn back_from_admin(&self) {
        self.transition(|state| state.admin_open = false);
    }

    /// Show the admin login screen.
    pub fn open_admin_login(&self) {
        self.transition(|state| {
            state.admin_login_open = true;
            state.error = None;
        });
    }

    /// Leave the admin login screen.
    pub fn back_to_home(&self) {
        self.transition(|state| {
            state.admin_login_open = false;
            state.admin_open = false;
            state.dashboard_open = false;
            state.error = None;
        });
    }

    // -------------------------------------------------------------------------
    // quick scan
    // -------------------------------------------------------------------------

    /// Request the quick-scan overlay, optionally for a specific account.
    ///
    /// Signed in, the overlay opens now. Signed out, a targeted request is
    /// remembered and surfaces once after the next sign-in.
    pub fn open_quick_scan(&self, username: Option<&str>, platform: Option<&str>) {
        let link = username
            .filter(|u| !u.trim().is_empty())
            .map(|u| DeepLink::new(u, platform));
        self.transition(|state| {
            if state.authenticated {
                state.scan = Some(ScanOverlay { prefill: link });
            } else if let Some(link) = link {
                tracing::debug!(username = %link.username, platform = %link.platform, "deep link pending sign-in");
                state.pending_deep_link = Some(link);
            }
        });
    }

    /// Close the overlay and forget any deep link.
    pub fn close_quick_scan(&self) {
        self.transition(|state| {
            state.scan = None;
            state.pending_deep_link = None;
        });
    }

    /// Leave the overlay for the dashboard's billing tab.
    ///
    /// # Errors
    ///
    /// [`ShellError::NotAuthenticated`] when nobody is signed in.
    pub fn upgrade_from_scan(&self) -> Result<(), ShellError> {
        self.transition(|state| {
            if !state.authenticated {
                return Err(ShellError::NotAuthenticated);
            }
            state.scan = None;
            state.dashboard_tab = BILLING_TAB.to_owned();
            state.dashboard_open = true;
            state.admin_open = false;
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
