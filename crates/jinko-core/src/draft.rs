//! Draft pipeline transitions
//!
//! generate -> edit -> audit -> (FAIL) remediate -> re-audit -> certified.
//!
//! Each function applies the outcome of one step to [`SessionState`]. Any
//! change to the draft text drops the retained audit result, which is what
//! revokes certification.

use crate::state::{SessionState, View};
use crate::types::{AuditResult, GenerationRequest};

/// Retain the Origin form
pub fn update_form(state: &mut SessionState, request: GenerationRequest) {
    state.form = request;
}

/// Apply a generated draft: replace the text, drop the audit, move to Audit
pub fn generated(state: &mut SessionState, text: String) {
    state.draft.text = text;
    state.audit = None;
    state.view = View::Audit;
}

/// Apply a manual edit
///
/// Returns `false` if the text is unchanged, in which case the audit result
/// (and certification) is kept.
pub fn edit(state: &mut SessionState, text: String) -> bool {
    if state.draft.text == text {
        return false;
    }
    state.draft.text = text;
    state.audit = None;
    true
}

/// Optimistic reset before an audit call
pub fn begin_audit(state: &mut SessionState) {
    state.audit = None;
}

/// Apply an audit response
pub fn audited(state: &mut SessionState, result: AuditResult) {
    tracing::debug!(
        status = ?result.status,
        violations = result.violations.len(),
        "audit result recorded"
    );
    state.audit = Some(result);
}

/// Replace the draft with the rewrite suggested by a failed audit
///
/// No-op returning `false` unless the retained result failed with a
/// non-empty rewrite. The result is cleared afterwards so the rewrite must be
/// audited before it can be certified.
pub fn apply_remediation(state: &mut SessionState) -> bool {
    let Some(rewrite) = state
        .audit
        .as_ref()
        .and_then(AuditResult::remediation)
        .map(str::to_owned)
    else {
        return false;
    };
    state.draft.text = rewrite;
    state.audit = None;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Violation;
    use pretty_assertions::assert_eq;

    #[test]
    fn generated_replaces_draft_and_moves_to_audit() {
        let mut state = SessionState::new();
        state.audit = Some(AuditResult::pass("old"));

        generated(&mut state, "Welcome to 123 Oak St...".to_string());

        assert_eq!(state.draft().text, "Welcome to 123 Oak St...");
        assert_eq!(state.view(), View::Audit);
        assert!(state.audit().is_none());
        assert!(!state.is_certified());
    }

    #[test]
    fn edit_revokes_certification() {
        let mut state = SessionState::new();
        state.draft.text = "certified text".to_string();
        state.audit = Some(AuditResult::pass("certified text"));

        assert!(edit(&mut state, "certified text, tweaked".to_string()));
        assert!(!state.is_certified());
        assert!(state.audit().is_none());
    }

    #[test]
    fn identical_edit_is_noop() {
        let mut state = SessionState::new();
        state.draft.text = "same".to_string();
        state.audit = Some(AuditResult::pass("same"));

        assert!(!edit(&mut state, "same".to_string()));
        assert!(state.is_certified());
    }

    #[test]
    fn audit_sets_certification_from_status() {
        let mut state = SessionState::new();
        begin_audit(&mut state);
        audited(&mut state, AuditResult::pass("text"));
        assert!(state.is_certified());

        begin_audit(&mut state);
        assert!(!state.is_certified());
        audited(
            &mut state,
            AuditResult::fail("rewrite", vec![Violation::new("x", "y")]),
        );
        assert!(!state.is_certified());
    }

    #[test]
    fn remediation_copies_rewrite_and_clears_result() {
        let mut state = SessionState::new();
        state.draft.text = "no kids allowed".to_string();
        state.audit = Some(AuditResult::fail(
            "...revised...",
            vec![Violation::new(
                "no kids allowed",
                "familial status discrimination",
            )],
        ));

        assert!(apply_remediation(&mut state));
        assert_eq!(state.draft().text, "...revised...");
        assert!(state.audit().is_none());
        assert!(!state.is_certified());
    }

    #[test]
    fn remediation_noop_without_failed_result() {
        let mut state = SessionState::new();
        state.draft.text = "draft".to_string();
        assert!(!apply_remediation(&mut state));

        state.audit = Some(AuditResult::pass("draft"));
        assert!(!apply_remediation(&mut state));
        assert!(state.is_certified());

        state.audit = Some(AuditResult::fail("", vec![]));
        assert!(!apply_remediation(&mut state));
        assert_eq!(state.draft().text, "draft");
        assert!(state.audit().is_some());
    }

    #[test]
    fn form_is_retained() {
        let mut state = SessionState::new();
        let request = GenerationRequest::new("123 Oak St", "3/2/1800", "pool");
        update_form(&mut state, request.clone());
        assert_eq!(state.form(), &request);
    }
}
