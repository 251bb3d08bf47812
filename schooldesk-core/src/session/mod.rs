//! Session lifecycle: the bearer token and profile of the signed-in user.
//!
//! A [`SessionManager`] is a cheap, clonable handle over one shared session.
//! Callers never touch the state directly; they go through `sign_in`,
//! `sign_out`, `token` and `profile`. Expiry is detected by decoding the
//! token's `exp` claim, immediately on every sign-in and periodically through
//! an [`ExpiryWatcher`].

mod clock;
mod token;
mod watcher;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{info, warn};

pub use clock::{Clock, FixedClock, SystemClock};
pub use token::{TokenClaims, decode_claims};
pub use watcher::{DEFAULT_CHECK_INTERVAL, ExpiryWatcher};

/// Whether a user is currently signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    SignedIn,
}

/// Outcome of one expiry check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExpiryCheck {
    /// No token was held; the session is (still) signed out.
    NoSession,
    /// The token is still valid. `exp` is the claim in Unix seconds.
    Valid { exp: f64 },
    /// The token's expiry has passed; the session was signed out.
    Expired { exp: f64 },
    /// The token could not be decoded; the session was signed out.
    Undecodable,
}

#[derive(Default)]
struct Session {
    token: Option<String>,
    profile: Option<Value>,
}

struct Inner {
    session: RwLock<Session>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<SessionState>,
}

/// Handle to the process-wide session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a signed-out session that reads time from `clock`.
    pub fn new(clock: impl Clock) -> Self {
        let (state, _) = watch::channel(SessionState::SignedOut);
        SessionManager {
            inner: Arc::new(Inner {
                session: RwLock::new(Session::default()),
                clock: Arc::new(clock),
                state,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a new token and profile, replacing whatever was there, then check
    /// the new token's expiry right away.
    pub fn sign_in(&self, token: impl Into<String>, profile: Value) -> ExpiryCheck {
        {
            let mut session = self.write();
            session.token = Some(token.into());
            session.profile = Some(profile);
        }
        info!("Signed in");
        self.inner.state.send_replace(SessionState::SignedIn);

        self.check_expiry()
    }

    /// Clear the session. Safe to call when already signed out.
    pub fn sign_out(&self) {
        let was_signed_in = {
            let mut session = self.write();
            let was_signed_in = session.token.is_some();
            *session = Session::default();
            was_signed_in
        };
        if was_signed_in {
            info!("Signed out");
        }
        self.publish_signed_out();
    }

    /// Sign out only if `token` is still the current token, so a check racing
    /// with a fresh sign-in cannot discard the new session.
    fn sign_out_if_current(&self, token: &str) {
        {
            let mut session = self.write();
            if session.token.as_deref() != Some(token) {
                return;
            }
            *session = Session::default();
        }
        info!("Signed out");
        self.publish_signed_out();
    }

    fn publish_signed_out(&self) {
        self.inner.state.send_if_modified(|state| {
            let changed = *state != SessionState::SignedOut;
            *state = SessionState::SignedOut;
            changed
        });
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn profile(&self) -> Option<Value> {
        self.read().profile.clone()
    }

    pub fn state(&self) -> SessionState {
        if self.read().token.is_some() {
            SessionState::SignedIn
        } else {
            SessionState::SignedOut
        }
    }

    /// Watch sign-in and sign-out transitions, e.g. to redirect to a login
    /// screen once the session ends.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Expiry of the current token, if there is one and it decodes.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let token = self.token()?;
        decode_claims(&token).ok()?.expires_at()
    }

    /// Sign out if there is no token, if it cannot be decoded, or if its expiry
    /// has been reached. Never fails: a corrupt token counts as expired.
    pub fn check_expiry(&self) -> ExpiryCheck {
        let Some(token) = self.token() else {
            self.sign_out();
            return ExpiryCheck::NoSession;
        };

        let claims = match decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "Session token could not be decoded, signing out");
                self.sign_out_if_current(&token);
                return ExpiryCheck::Undecodable;
            }
        };

        if claims.is_expired_at(self.inner.clock.now()) {
            warn!(exp = claims.exp, "Session token expired, signing out");
            self.sign_out_if_current(&token);
            ExpiryCheck::Expired { exp: claims.exp }
        } else {
            ExpiryCheck::Valid { exp: claims.exp }
        }
    }
}
