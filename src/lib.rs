//! Notas is a session-aware client for the notas case management backend.

#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod notes;
pub mod router;
pub mod session;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use clock::SystemClock;
use config::Configuration;
use error::Result;
use http::HttpClient;
use notes::{Calendar, NotesApi};
use router::{Navigator, RouteTable};
use session::SessionStore;

/// State shared between views.
///
/// Every component talks to the backend through the same cookie jar, so the
/// session opened by [`SessionStore::login`] authenticates [`NotesApi`] too.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Configuration>,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<Navigator>,
    pub notes: NotesApi,
    pub calendar: Calendar,
}

/// Initialize the application state.
pub fn initialize_state(config: Arc<Configuration>) -> Result<AppState> {
    let http = HttpClient::new(&config.url, Duration::from_secs(config.timeout))?;

    let session = Arc::new(SessionStore::new(Arc::new(http.clone())));
    let notes = NotesApi::new(http, Arc::clone(&session));
    let navigator = Arc::new(Navigator::new(
        Arc::clone(&session),
        RouteTable::default(),
        config.routes.clone(),
    ));

    tracing::debug!(url = %config.url, "state initialized");

    Ok(AppState {
        config,
        session,
        navigator,
        notes,
        calendar: Calendar::new(Arc::new(SystemClock::new())),
    })
}
