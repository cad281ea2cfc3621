//! Property tests for the certification invariant.
//!
//! Random sequences of draft-pipeline outcomes are applied to a fresh
//! SessionState; after every step the session must be certified iff the most
//! recent audit passed and no generate, edit, audit or remediation has
//! happened since.

use jinko_core::{draft, AuditResult, SessionState, Violation};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Generate(String),
    Edit(String),
    AuditPass,
    AuditFail(String),
    AuditTransportFailure,
    Remediate,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        "[a-z ]{0,12}".prop_map(Step::Generate),
        "[a-z ]{0,12}".prop_map(Step::Edit),
        Just(Step::AuditPass),
        "[a-z ]{0,12}".prop_map(Step::AuditFail),
        Just(Step::AuditTransportFailure),
        Just(Step::Remediate),
    ]
}

proptest! {
    #[test]
    fn certified_iff_last_audit_passed_without_later_mutation(
        steps in prop::collection::vec(step(), 0..40)
    ) {
        let mut state = SessionState::new();
        // Model: certified after a pass, revoked by any mutation of the draft
        // or any new audit submission.
        let mut expected = false;

        for step in steps {
            match step {
                Step::Generate(text) => {
                    draft::generated(&mut state, text);
                    expected = false;
                }
                Step::Edit(text) => {
                    if draft::edit(&mut state, text) {
                        expected = false;
                    }
                }
                Step::AuditPass => {
                    draft::begin_audit(&mut state);
                    let text = state.draft().text.clone();
                    draft::audited(&mut state, AuditResult::pass(text));
                    expected = true;
                }
                Step::AuditFail(rewrite) => {
                    draft::begin_audit(&mut state);
                    draft::audited(
                        &mut state,
                        AuditResult::fail(rewrite, vec![Violation::new("phrase", "reason")]),
                    );
                    expected = false;
                }
                Step::AuditTransportFailure => {
                    draft::begin_audit(&mut state);
                    expected = false;
                }
                Step::Remediate => {
                    let applicable = state.audit().and_then(AuditResult::remediation).is_some();
                    let applied = draft::apply_remediation(&mut state);
                    prop_assert_eq!(applied, applicable);
                    if applied {
                        prop_assert!(state.audit().is_none());
                        expected = false;
                    }
                }
            }
            prop_assert_eq!(state.is_certified(), expected);
        }
    }
}
