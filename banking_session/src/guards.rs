//! Navigation guards evaluated against session snapshots.

use tokio::sync::watch;

use crate::config::RouteTargets;
use crate::session::{Session, SessionStatus};

/// Where a blocked navigation is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    /// Originally requested location, set when an anonymous user is sent to
    /// the login entry point.
    pub from: Option<String>,
}

/// Outcome of evaluating a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision<V> {
    /// The session has not settled yet; show a neutral loading indicator.
    Pending,
    Render(V),
    Redirect(Redirect),
}

impl<V> GuardDecision<V> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePolicy {
    /// Only authenticated users may see the view.
    RequireAuthenticated,
    /// Only anonymous users may see the view, e.g. login and sign-up.
    RequireAnonymous,
}

impl RoutePolicy {
    pub fn evaluate<V>(
        self,
        session: &Session,
        targets: &RouteTargets,
        requested: &str,
        view: V,
    ) -> GuardDecision<V> {
        match (self, session.status()) {
            (_, SessionStatus::Uninitialized | SessionStatus::Verifying) => GuardDecision::Pending,
            (Self::RequireAuthenticated, SessionStatus::Authenticated)
            | (Self::RequireAnonymous, SessionStatus::Anonymous) => GuardDecision::Render(view),
            (Self::RequireAuthenticated, SessionStatus::Anonymous) => {
                GuardDecision::Redirect(Redirect {
                    to: targets.login.clone(),
                    from: Some(requested.to_string()),
                })
            }
            (Self::RequireAnonymous, SessionStatus::Authenticated) => {
                GuardDecision::Redirect(Redirect {
                    to: targets.home.clone(),
                    from: None,
                })
            }
        }
    }
}

pub fn require_authenticated<V>(
    session: &Session,
    targets: &RouteTargets,
    requested: &str,
    view: V,
) -> GuardDecision<V> {
    RoutePolicy::RequireAuthenticated.evaluate(session, targets, requested, view)
}

pub fn require_anonymous<V>(
    session: &Session,
    targets: &RouteTargets,
    requested: &str,
    view: V,
) -> GuardDecision<V> {
    RoutePolicy::RequireAnonymous.evaluate(session, targets, requested, view)
}

/// Waits until the published session settles, then evaluates `policy`.
///
/// Returns `Pending` only if the manager was dropped before settling.
pub async fn wait_for_decision<V>(
    rx: &mut watch::Receiver<Session>,
    policy: RoutePolicy,
    targets: &RouteTargets,
    requested: &str,
    view: V,
) -> GuardDecision<V> {
    let session = match rx.wait_for(Session::is_settled).await {
        Ok(session) => session.clone(),
        Err(_) => {
            tracing::warn!("Session channel closed before the session settled");
            return GuardDecision::Pending;
        }
    };
    policy.evaluate(&session, targets, requested, view)
}
