//! Navigation guard.
//!
//! Pure decision over an identity snapshot. The identity probe it may ask for
//! is performed by the [`Navigator`](super::Navigator).

use std::fmt;

use super::Access;

/// Routing decision for one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Proceed,
    RedirectToLogin,
    RedirectToHome,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Proceed => "proceed",
            Verdict::RedirectToLogin => "redirect_to_login",
            Verdict::RedirectToHome => "redirect_to_home",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Next step of a guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Apply this verdict.
    Done(Verdict),
    /// Probe the backend for an identity, then call [`after_refresh`].
    Refresh,
}

/// First evaluation of a transition towards a route of class `access`.
pub fn evaluate(access: Access, authenticated: bool) -> Step {
    match (access, authenticated) {
        (Access::Public, true) => Step::Done(Verdict::RedirectToHome),
        (Access::Public, false) => Step::Done(Verdict::Proceed),
        (Access::RequiresAuth, true) => Step::Done(Verdict::Proceed),
        (Access::RequiresAuth, false) => Step::Refresh,
    }
}

/// Conclusive verdict once the probe resolved. Never asks for another probe.
pub fn after_refresh(authenticated: bool) -> Verdict {
    if authenticated {
        Verdict::Proceed
    } else {
        Verdict::RedirectToLogin
    }
}
