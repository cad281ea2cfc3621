//! Navigation between workspace views
//!
//! Selecting a view is an explicit event. The only view with a side effect is
//! the Vault, whose every entry asks for one listing refresh. Studio has no
//! entry precondition: it can be selected at any time and renders
//! [`StudioView::Locked`](crate::state::StudioView::Locked) until certified.

use crate::state::{Effect, SessionState, View};

/// Enter a view, returning the remote work the entry requires
pub fn enter(state: &mut SessionState, view: View) -> Option<Effect> {
    tracing::debug!(from = %state.view, to = %view, "entering view");
    state.view = view;
    match view {
        View::Vault => Some(Effect::RefreshVault),
        View::Origin | View::Audit | View::Studio => None,
    }
}

/// Follow the "proceed to studio" affordance of a passed audit
///
/// Returns `false` and leaves the view unchanged unless the active view is
/// Audit and the draft is certified.
pub fn proceed_to_studio(state: &mut SessionState) -> bool {
    if state.view != View::Audit || !state.is_certified() {
        return false;
    }
    state.view = View::Studio;
    true
}
