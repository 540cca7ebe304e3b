//! Authenticated session store.
//!
//! Holds the current identity (or its absence) plus the initial-check
//! loading flag, and delegates every credential operation to the injected
//! [`AuthGateway`]. The store owns session state exclusively; other
//! components only read it.

use tokio::sync::watch;

use velvet_mango_core::Email;

use crate::backend::{AuthError, AuthGateway, AuthUser};
use crate::telemetry;

/// Minimum password length accepted before the auth plane is consulted.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Observable session state.
///
/// `loading` is true only between store construction and the completion of
/// the first [`SessionStore::check_session`]; it never becomes true again
/// for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// The authenticated identity, absent when signed out.
    pub user: Option<AuthUser>,
    /// Whether the initial session check is still outstanding.
    pub loading: bool,
}

impl SessionState {
    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Store for the current authenticated session.
pub struct SessionStore<A> {
    auth: A,
    state: watch::Sender<SessionState>,
}

impl<A: AuthGateway> SessionStore<A> {
    /// Create a session store over an auth gateway.
    ///
    /// Starts unauthenticated with `loading` set, meaning "authentication
    /// status not yet determined" rather than "no user".
    #[must_use]
    pub fn new(auth: A) -> Self {
        Self {
            auth,
            state: watch::Sender::new(SessionState {
                user: None,
                loading: true,
            }),
        }
    }

    /// Subscribe to session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Snapshot of the current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.state.borrow().user.clone()
    }

    /// Whether the initial session check is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Resolve the session held by the auth gateway.
    ///
    /// An active session populates the user; no session leaves it absent. A
    /// failed check also leaves it absent: the error is logged and captured
    /// but never propagated, so a transient backend problem degrades to the
    /// signed-out experience instead of blocking it. The `loading` flag is
    /// cleared in every outcome.
    pub async fn check_session(&self) {
        match self.auth.current_session().await {
            Ok(Some(user)) => {
                telemetry::set_sentry_user(user.id, user.email.as_ref().map(Email::as_str));
                self.state.send_modify(|s| s.user = Some(user));
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(error = %err, "Session check failed");
                sentry::capture_error(&err);
            }
        }

        self.state.send_modify(|s| s.loading = false);
    }

    /// Create an account with email and password.
    ///
    /// Local session state is untouched; an account only becomes the
    /// current session through [`sign_in`](Self::sign_in) and a subsequent
    /// [`check_session`](Self::check_session).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] or [`AuthError::WeakPassword`]
    /// before any network call, and whatever the auth plane rejects with
    /// after one.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        self.auth.sign_up(&email, password).await
    }

    /// Authenticate with email and password.
    ///
    /// Successful sign-in does not update local session state; the caller
    /// follows up with [`check_session`](Self::check_session) (or a
    /// navigation that triggers one). Sign-out, by contrast, updates state
    /// directly.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] before any network call, and
    /// [`AuthError::InvalidCredentials`] or transport failures after one.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;

        self.auth.sign_in(&email, password).await
    }

    /// Invalidate the current session.
    ///
    /// On success the local user is cleared. On failure local state is left
    /// unchanged; the stale session stays visible until a later
    /// [`check_session`](Self::check_session) resolves it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the auth plane rejects the revocation.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.auth.sign_out().await?;

        self.state.send_modify(|s| s.user = None);
        telemetry::clear_sentry_user();
        Ok(())
    }
}

/// Validate a password before handing it to the auth plane.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use velvet_mango_core::UserId;

    /// Gateway stub with a scripted session and call counting.
    struct StubAuth {
        session: Option<AuthUser>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubAuth {
        fn with_session(session: Option<AuthUser>) -> Self {
            Self {
                session,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                session: None,
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AuthGateway for StubAuth {
        async fn sign_up(&self, _email: &Email, _password: &str) -> Result<(), AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn sign_in(&self, _email: &Email, _password: &str) -> Result<(), AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AuthError::InvalidCredentials);
            }
            Ok(())
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AuthError::Api {
                    status: 500,
                    message: "revocation failed".to_string(),
                });
            }
            Ok(())
        }

        async fn current_session(&self) -> Result<Option<AuthUser>, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AuthError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(self.session.clone())
        }
    }

    fn user() -> AuthUser {
        AuthUser {
            id: UserId::generate(),
            email: Some(Email::parse("a@b.com").unwrap()),
        }
    }

    #[test]
    fn test_initial_state_is_loading_and_unauthenticated() {
        let store = SessionStore::new(StubAuth::with_session(None));
        let state = store.state();
        assert!(state.loading);
        assert!(!state.is_authenticated());
    }

    #[tokio::test]
    async fn test_check_session_with_active_session() {
        let expected = user();
        let store = SessionStore::new(StubAuth::with_session(Some(expected.clone())));

        store.check_session().await;

        let state = store.state();
        assert_eq!(state.user, Some(expected));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_check_session_without_session() {
        let store = SessionStore::new(StubAuth::with_session(None));

        store.check_session().await;

        let state = store.state();
        assert_eq!(state.user, None);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_check_session_failure_degrades_to_unauthenticated() {
        let store = SessionStore::new(StubAuth::failing());

        store.check_session().await;

        let state = store.state();
        assert_eq!(state.user, None);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_invalid_email_before_gateway() {
        let store = SessionStore::new(StubAuth::with_session(None));

        let err = store.sign_up("not-an-email", "long-enough-pw").await;
        assert!(matches!(err, Err(AuthError::InvalidEmail(_))));
        assert_eq!(store.auth.calls(), 0);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_short_password_before_gateway() {
        let store = SessionStore::new(StubAuth::with_session(None));

        let err = store.sign_up("a@b.com", "short").await;
        assert!(matches!(err, Err(AuthError::WeakPassword(_))));
        assert_eq!(store.auth.calls(), 0);
    }

    #[tokio::test]
    async fn test_sign_in_does_not_touch_local_state() {
        let store = SessionStore::new(StubAuth::with_session(Some(user())));

        store.sign_in("a@b.com", "password123").await.unwrap();

        // Still unauthenticated locally until a check_session runs
        assert_eq!(store.current_user(), None);
    }

    #[tokio::test]
    async fn test_sign_in_propagates_invalid_credentials() {
        let store = SessionStore::new(StubAuth::failing());

        let err = store.sign_in("a@b.com", "password123").await;
        assert!(matches!(err, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_sign_out_clears_user() {
        let store = SessionStore::new(StubAuth::with_session(Some(user())));
        store.check_session().await;
        assert!(store.state().is_authenticated());

        store.sign_out().await.unwrap();
        assert_eq!(store.current_user(), None);
    }

    #[tokio::test]
    async fn test_sign_out_failure_keeps_user() {
        let seeded = user();
        let failing = SessionStore::new(StubAuth::failing());
        failing.state.send_modify(|s| {
            s.user = Some(seeded.clone());
            s.loading = false;
        });

        let err = failing.sign_out().await;
        assert!(err.is_err());
        assert_eq!(failing.current_user(), Some(seeded));
    }
}
