//! Route guard predicates.
//!
//! DESIGN
//! ======
//! `decide` is a pure function of one stable session snapshot. `evaluate`
//! is the async wrapper: it skips every snapshot whose loading flag is set,
//! takes the first one that is not, and decides once. Guards never fail; a
//! closed session stream counts as logged out.

#[cfg(test)]
#[path = "guards_test.rs"]
mod guards_test;

use tokio::sync::watch;

use super::Route;
use crate::state::auth::SessionState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Guard {
    Admin,
    Home,
    Welcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(Route),
}

/// Decide a guard against a settled session. First matching row wins.
#[must_use]
pub fn decide(guard: Guard, state: &SessionState) -> GuardOutcome {
    let Some(user) = state.signed_in_user() else {
        return GuardOutcome::Redirect(Route::Login);
    };
    match guard {
        Guard::Admin if !state.is_admin() => GuardOutcome::Redirect(Route::Home),
        Guard::Admin => GuardOutcome::Allow,
        Guard::Home | Guard::Welcome if state.is_admin() => GuardOutcome::Redirect(Route::Admin),
        Guard::Home if user.needs_onboarding() => GuardOutcome::Redirect(Route::Welcome),
        Guard::Welcome if !user.needs_onboarding() => GuardOutcome::Redirect(Route::Home),
        Guard::Home | Guard::Welcome => GuardOutcome::Allow,
    }
}

/// Wait out any loading window on `rx`, then decide.
pub async fn evaluate(guard: Guard, rx: &mut watch::Receiver<SessionState>) -> GuardOutcome {
    let outcome = rx
        .wait_for(|state| !state.is_loading())
        .await
        .map_or(GuardOutcome::Redirect(Route::Login), |state| decide(guard, &state));
    tracing::debug!(?guard, ?outcome, "guard decided");
    outcome
}
