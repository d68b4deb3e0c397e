//! Runs the guard for each transition, probing the session when asked to.

use std::sync::Arc;

use crate::config::Routes;
use crate::session::SessionStore;

use super::guard::{self, Step, Verdict};
use super::{Route, RouteTable};

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Render the requested route.
    Proceed(Route),
    /// Go elsewhere instead.
    Redirect { verdict: Verdict, to: String },
}

impl Navigation {
    pub fn verdict(&self) -> Verdict {
        match self {
            Navigation::Proceed(_) => Verdict::Proceed,
            Navigation::Redirect { verdict, .. } => *verdict,
        }
    }
}

/// Applies the guard against a shared [`SessionStore`].
pub struct Navigator {
    session: Arc<SessionStore>,
    routes: RouteTable,
    targets: Routes,
}

impl Navigator {
    pub fn new(session: Arc<SessionStore>, routes: RouteTable, targets: Routes) -> Self {
        Self {
            session,
            routes,
            targets,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decide whether `path` may be opened.
    ///
    /// At most one identity probe per call; a failed probe sends the user to
    /// the login route.
    pub async fn navigate(&self, path: &str) -> Navigation {
        let route = self.routes.resolve(path);

        let verdict = match guard::evaluate(route.access(), self.session.is_authenticated()) {
            Step::Done(verdict) => verdict,
            Step::Refresh => {
                self.session.refresh_identity().await;
                guard::after_refresh(self.session.is_authenticated())
            },
        };

        tracing::debug!(path = %route.path, %verdict, "navigation evaluated");
        metrics::counter!("navigation_verdicts_total", "verdict" => verdict.as_str())
            .increment(1);

        match verdict {
            Verdict::Proceed => Navigation::Proceed(route),
            Verdict::RedirectToLogin => Navigation::Redirect {
                verdict,
                to: self.targets.login.clone(),
            },
            Verdict::RedirectToHome => Navigation::Redirect {
                verdict,
                to: self.targets.home.clone(),
            },
        }
    }
}
