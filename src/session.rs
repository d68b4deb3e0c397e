//! Session store.
//!
//! Single owner of the current [`Identity`]. Every network call that creates
//! or invalidates the identity goes through here.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::http::HttpClient;
use crate::identity::{Credentials, Identity, Role};

const LOGIN_PATH: &str = "/api/auth/login/";
const LOGOUT_PATH: &str = "/api/auth/logout/";
const WHOAMI_PATH: &str = "/api/usuarios/yo/";
const LOGIN_FALLBACK: &str = "Error al iniciar sesión";

/// Outbound port to the authentication endpoints.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Open a session with credentials.
    async fn login(&self, credentials: &Credentials) -> Result<Identity>;

    /// Destroy the backend session.
    async fn logout(&self) -> Result<()>;

    /// Ask the backend who owns the current session.
    async fn whoami(&self) -> Result<Identity>;
}

#[derive(Deserialize)]
struct LoginResponse {
    usuario: Identity,
}

#[async_trait]
impl AuthBackend for HttpClient {
    async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        let response: LoginResponse =
            self.post(LOGIN_PATH, credentials).await?.into_json()?;
        Ok(response.usuario)
    }

    async fn logout(&self) -> Result<()> {
        // body is irrelevant.
        self.post_empty(LOGOUT_PATH).await?;
        Ok(())
    }

    async fn whoami(&self) -> Result<Identity> {
        self.get(WHOAMI_PATH).await?.into_json()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    identity: Option<Identity>,
    error: Option<String>,
}

/// Holds the current identity.
///
/// Built once and shared (`Arc`) between the navigator and the views.
/// Overlapping operations are allowed; the last one to finish wins.
pub struct SessionStore {
    backend: Arc<dyn AuthBackend>,
    state: RwLock<SessionState>,
    in_flight: AtomicUsize,
}

/// Marks an operation as running until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn record(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "session_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

impl SessionStore {
    /// Create an anonymous [`SessionStore`].
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(SessionState::default()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Start an operation: clear the last error and raise `loading`.
    fn begin(&self) -> InFlight<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.write().error = None;
        InFlight(&self.in_flight)
    }

    /// Establish a session.
    ///
    /// The error is recorded for display and also returned to the caller.
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        let _in_flight = self.begin();

        match self.backend.login(credentials).await {
            Ok(identity) => {
                tracing::info!(user = %identity.username, role = ?identity.role, "session established");
                record("login", "success");
                self.state.write().identity = Some(identity.clone());
                Ok(identity)
            },
            Err(err) => {
                let message = err.display_message(LOGIN_FALLBACK);
                tracing::warn!(legajo = %credentials.legajo, error = %message, "login rejected");
                record("login", "failure");
                self.state.write().error = Some(message);
                Err(err)
            },
        }
    }

    /// Destroy the session.
    ///
    /// The identity is cleared before the backend is contacted and a backend
    /// failure is only logged.
    pub async fn logout(&self) {
        let _in_flight = self.begin();
        self.state.write().identity = None;

        match self.backend.logout().await {
            Ok(()) => record("logout", "success"),
            Err(err) => {
                tracing::warn!(error = %err, "backend logout failed, session dropped locally");
                record("logout", "failure");
            },
        }
    }

    /// Probe the backend for the session owner.
    ///
    /// Never fails: any error, including an authentication refusal, leaves
    /// the store anonymous.
    pub async fn refresh_identity(&self) -> Option<Identity> {
        let _in_flight = self.begin();

        match self.backend.whoami().await {
            Ok(identity) => {
                tracing::debug!(user = %identity.username, "identity refreshed");
                record("refresh", "success");
                self.state.write().identity = Some(identity.clone());
                Some(identity)
            },
            Err(err) => {
                tracing::debug!(error = %err, unauthorized = err.is_unauthorized(), "no identity");
                record("refresh", "failure");
                self.state.write().identity = None;
                None
            },
        }
    }

    /// React to a refused authenticated fetch.
    ///
    /// 401 means the backend session is gone and the identity is dropped.
    /// 403 is also what the backend answers to anonymous requests, so the
    /// session is probed once to tell an expired session from a missing
    /// permission.
    pub(crate) async fn observe(&self, err: &ClientError) {
        match err.status() {
            Some(StatusCode::UNAUTHORIZED) => self.invalidate(),
            Some(StatusCode::FORBIDDEN) if self.is_authenticated() => {
                self.refresh_identity().await;
            },
            _ => {},
        }
    }

    /// Drop the identity without contacting the backend.
    fn invalidate(&self) {
        let previous = self.state.write().identity.take();
        if let Some(identity) = previous {
            tracing::info!(user = %identity.username, "session expired");
            record("refresh", "expired");
        }
    }

    /// Snapshot of the current identity.
    pub fn identity(&self) -> Option<Identity> {
        self.state.read().identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().identity.is_some()
    }

    /// Full name of the user, empty when anonymous.
    pub fn display_name(&self) -> String {
        self.state
            .read()
            .identity
            .as_ref()
            .map(|identity| identity.full_name.clone())
            .unwrap_or_default()
    }

    pub fn role(&self) -> Option<Role> {
        self.state.read().identity.as_ref().map(|identity| identity.role)
    }

    /// Message of the last failed login.
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// Whether an auth operation is running.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}
