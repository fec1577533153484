//! Route Guards
//!
//! Pure navigation predicates over the controller's snapshot. Guards never
//! render and never talk to the network: they map (auth view, navigation
//! request) to a decision the router acts on.
//!
//! The "explicit" flag on a navigation request is how a logged-in user can
//! still open a guest-only page by clicking its link deliberately, instead
//! of being bounced by the redirect rule. The router passes it through; the
//! guard never infers it.

use crate::auth::controller::AuthView;

/// Login entry point protected routes redirect to
pub const LOGIN_PATH: &str = "/login";

/// Landing page used when a guest-only redirect has no return path
pub const DEFAULT_LANDING_PATH: &str = "/";

/// A navigation the router is about to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavRequest {
    /// The path being navigated to
    pub path: String,
    /// True when the user asked for this page directly (e.g. clicked
    /// "Login" in the nav menu), false for automatic redirects
    pub explicit: bool,
    /// Where to send the user back after login, when known
    pub return_to: Option<String>,
}

impl NavRequest {
    /// An automatic (non-user-initiated) navigation to `path`
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            explicit: false,
            return_to: None,
        }
    }

    /// Mark this navigation as user-initiated
    pub fn explicit(mut self) -> Self {
        self.explicit = true;
        self
    }

    /// Attach a return path
    pub fn returning_to(mut self, path: impl Into<String>) -> Self {
        self.return_to = Some(path.into());
        self
    }
}

/// What the router should do with a guarded navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the wrapped content
    Allow,
    /// Session state unknown (still loading); hold the navigation
    Defer,
    /// Navigate elsewhere, optionally carrying the originally requested
    /// path so login can return the user there
    Redirect {
        to: String,
        return_to: Option<String>,
    },
}

/// Route guard variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    /// Requires a session; redirects guests to the login page
    Protected,
    /// For login/register pages; redirects logged-in users away unless they
    /// navigated here explicitly
    GuestOnly,
}

impl RouteGuard {
    /// Decide what to do with `nav` given the current auth snapshot
    pub fn evaluate(&self, view: AuthView, nav: &NavRequest) -> GuardDecision {
        if view.loading {
            return GuardDecision::Defer;
        }
        match self {
            RouteGuard::Protected => {
                if view.logged_in {
                    GuardDecision::Allow
                } else {
                    GuardDecision::Redirect {
                        to: LOGIN_PATH.to_string(),
                        return_to: Some(nav.path.clone()),
                    }
                }
            }
            RouteGuard::GuestOnly => {
                if view.logged_in && !nav.explicit {
                    GuardDecision::Redirect {
                        to: nav
                            .return_to
                            .clone()
                            .unwrap_or_else(|| DEFAULT_LANDING_PATH.to_string()),
                        return_to: None,
                    }
                } else {
                    GuardDecision::Allow
                }
            }
        }
    }
}
