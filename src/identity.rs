//! Sign-in sessions over a pluggable identity provider.
//!
//! The provider itself is a black box behind [`IdentityProvider`]. An
//! [`IdentitySession`] drives it through `init` → `login` → `logout`, makes
//! sure every signed-in email has a matching user row, and turns failures
//! into a dismissible banner message instead of propagating them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::ANONYMOUS_USER_NAME;
use crate::error::{Result, SwachhError};
use crate::models::User;
use crate::queries::UserQuery;

/// What the provider knows about the signed-in person.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IdentityUser {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Contract of an external identity provider.
pub trait IdentityProvider {
    /// Prepare the provider; may restore a previous session.
    fn init(&mut self) -> Result<()>;

    /// Start a sign-in and return the resulting identity.
    fn connect(&mut self) -> Result<IdentityUser>;

    fn user_info(&self) -> Result<IdentityUser>;

    fn logout(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Uninitialized,
    Disconnected,
    Connected,
}

// ---------------------------------------------------------------------------
// IdentitySession
// ---------------------------------------------------------------------------

pub struct IdentitySession<P: IdentityProvider> {
    provider: P,
    status: SessionStatus,
    identity: Option<IdentityUser>,
    user: Option<User>,
    balance: i64,
    error: Option<String>,
}

impl<P: IdentityProvider> IdentitySession<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            status: SessionStatus::Uninitialized,
            identity: None,
            user: None,
            balance: 0,
            error: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected && self.provider.is_connected()
    }

    /// The provider's view of the signed-in person.
    pub fn identity(&self) -> Option<&IdentityUser> {
        self.identity.as_ref()
    }

    /// The stored user backing the session, once one has been ensured.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Current banner message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn report(&mut self, context: &str, err: &SwachhError) {
        error!(context, error = %err, "identity session error");
        self.error = Some(format!("{}: {}", context, err));
    }

    /// Initialize the provider, picking up a session it already holds.
    pub fn init(&mut self, users: &UserQuery<'_>) {
        if let Err(e) = self.provider.init() {
            self.status = SessionStatus::Disconnected;
            self.report("Error initializing identity provider", &e);
            return;
        }
        if !self.provider.is_connected() {
            self.status = SessionStatus::Disconnected;
            return;
        }
        info!("identity provider already connected");
        self.status = SessionStatus::Connected;
        match self.provider.user_info() {
            Ok(identity) => self.adopt(identity, users),
            Err(e) => self.report("Error fetching user info", &e),
        }
    }

    /// Sign in through the provider. Returns whether the session ended up
    /// connected; failures land in [`error`](Self::error).
    pub fn login(&mut self, users: &UserQuery<'_>) -> bool {
        if self.status == SessionStatus::Uninitialized {
            self.error = Some("Identity provider not initialized".to_string());
            return false;
        }
        self.clear_error();

        let identity = match self.provider.connect() {
            Ok(identity) => identity,
            Err(e) => {
                self.report("Login failed", &e);
                return false;
            }
        };
        if !self.provider.is_connected() {
            self.report(
                "Login failed",
                &SwachhError::Auth("provider not connected after login attempt".into()),
            );
            return false;
        }

        self.status = SessionStatus::Connected;
        self.adopt(identity, users);
        info!(email = ?self.identity.as_ref().and_then(|i| i.email.as_deref()), "login successful");
        true
    }

    /// Re-read the provider's identity and ensure the user again.
    pub fn refresh_user_info(&mut self, users: &UserQuery<'_>) {
        if !self.is_connected() {
            self.error = Some("Not connected. Please login first.".to_string());
            return;
        }
        self.clear_error();
        match self.provider.user_info() {
            Ok(identity) => self.adopt(identity, users),
            Err(e) => self.report("Error fetching user info", &e),
        }
    }

    /// Reload the signed-in user's point balance.
    pub fn refresh_balance(&mut self, users: &UserQuery<'_>) {
        let Some(user_id) = self.user.as_ref().map(|u| u.id) else {
            return;
        };
        match users.balance(user_id) {
            Ok(balance) => self.balance = balance,
            Err(e) => self.report("Error fetching balance", &e),
        }
    }

    pub fn logout(&mut self) {
        if self.status == SessionStatus::Uninitialized {
            self.error = Some("Identity provider not initialized".to_string());
            return;
        }
        self.clear_error();
        if let Err(e) = self.provider.logout() {
            self.report("Logout failed", &e);
            return;
        }
        self.reset();
        info!("logout successful");
    }

    /// Tear the session down, signing out if still connected, and hand the
    /// provider back.
    pub fn dispose(mut self) -> P {
        if self.provider.is_connected() {
            if let Err(e) = self.provider.logout() {
                warn!(error = %e, "logout during dispose failed");
            }
        }
        self.reset();
        self.provider
    }

    fn reset(&mut self) {
        self.status = SessionStatus::Disconnected;
        self.identity = None;
        self.user = None;
        self.balance = 0;
    }

    /// Record the identity and make sure a user row exists for its email.
    fn adopt(&mut self, identity: IdentityUser, users: &UserQuery<'_>) {
        let email = identity.email.clone().filter(|e| !e.trim().is_empty());
        let name = identity
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS_USER_NAME.to_string());
        self.identity = Some(identity);

        let Some(email) = email else {
            return;
        };
        match users.get_or_create(&email, &name) {
            Ok(user) => {
                self.user = Some(user);
                self.refresh_balance(users);
            }
            Err(e) => self.report("Error creating user", &e),
        }
    }
}

// ---------------------------------------------------------------------------
// EmailIdentity
// ---------------------------------------------------------------------------

/// Email sign-in with an optional on-disk record of the signed-in identity,
/// so a later `init` restores the session.
#[derive(Debug, Clone)]
pub struct EmailIdentity {
    candidate: IdentityUser,
    store: Option<PathBuf>,
    current: Option<IdentityUser>,
    initialized: bool,
}

impl EmailIdentity {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            candidate: IdentityUser {
                email: Some(email.into()),
                name,
            },
            store: None,
            current: None,
            initialized: false,
        }
    }

    /// A provider that only restores a remembered identity and has nobody
    /// to sign in as until [`set_candidate`](Self::set_candidate).
    pub fn remembered<P: AsRef<Path>>(store: P) -> Self {
        Self {
            candidate: IdentityUser::default(),
            store: Some(store.as_ref().to_path_buf()),
            current: None,
            initialized: false,
        }
    }

    /// Remember the signed-in identity in `path`.
    pub fn with_store<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.store = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn set_candidate(&mut self, email: impl Into<String>, name: Option<String>) {
        self.candidate = IdentityUser {
            email: Some(email.into()),
            name,
        };
    }
}

impl IdentityProvider for EmailIdentity {
    fn init(&mut self) -> Result<()> {
        self.initialized = true;
        if let Some(path) = &self.store {
            if path.exists() {
                let data = std::fs::read_to_string(path)?;
                self.current = Some(serde_json::from_str(&data)?);
            }
        }
        Ok(())
    }

    fn connect(&mut self) -> Result<IdentityUser> {
        if !self.initialized {
            return Err(SwachhError::Auth("provider not initialized".into()));
        }
        let email = self.candidate.email.as_deref().unwrap_or("").trim();
        if email.is_empty() || !email.contains('@') {
            return Err(SwachhError::Auth(format!("invalid email address: {:?}", email)));
        }
        let identity = self.candidate.clone();
        if let Some(path) = &self.store {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, serde_json::to_string(&identity)?)?;
        }
        self.current = Some(identity.clone());
        Ok(identity)
    }

    fn user_info(&self) -> Result<IdentityUser> {
        self.current
            .clone()
            .ok_or_else(|| SwachhError::Auth("not connected".into()))
    }

    fn logout(&mut self) -> Result<()> {
        if let Some(path) = &self.store {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        self.current = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.current.is_some()
    }
}
