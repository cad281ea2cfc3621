//! Asset pipeline transitions
//!
//! upload slot -> transfer -> identity recorded -> render submitted.
//!
//! The `check_*` functions are the call-site guards: they run before any
//! network call and refuse gated actions with a [`PreconditionError`].

use crate::error::PreconditionError;
use crate::state::SessionState;
use crate::types::{FileKey, IdentityAsset, JobId, RenderJob};

/// Inputs of a render submission, captured under the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderInput {
    /// Script to render
    pub prompt: String,
    /// Identity image key
    pub image_key: FileKey,
}

/// Guard an identity upload
///
/// # Errors
/// - `NotCertified` if the draft is not certified
/// - `UnsupportedContentType` if `content_type` is not accepted
pub fn check_upload(
    state: &SessionState,
    content_type: &str,
    accepted: &[String],
) -> Result<(), PreconditionError> {
    if !state.is_certified() {
        return Err(PreconditionError::NotCertified);
    }
    if !accepted.iter().any(|t| t.eq_ignore_ascii_case(content_type)) {
        return Err(PreconditionError::UnsupportedContentType(
            content_type.to_string(),
        ));
    }
    Ok(())
}

/// Record a transferred identity, replacing any previous one
pub fn uploaded(state: &mut SessionState, asset: IdentityAsset) {
    state.identity = Some(asset);
}

/// Guard a render submission
///
/// # Errors
/// - `NotCertified` if the draft is not certified
/// - `MissingIdentity` if no identity has been uploaded
/// - `RenderActive` if a job id is already tracked
pub fn check_render(state: &SessionState) -> Result<RenderInput, PreconditionError> {
    if !state.is_certified() {
        return Err(PreconditionError::NotCertified);
    }
    let identity = state
        .identity
        .as_ref()
        .ok_or(PreconditionError::MissingIdentity)?;
    if let Some(job) = &state.render_job {
        return Err(PreconditionError::RenderActive(job.job_id.clone()));
    }
    Ok(RenderInput {
        prompt: state.draft.text.clone(),
        image_key: identity.file_key.clone(),
    })
}

/// Record an accepted render job
pub fn render_started(state: &mut SessionState, job_id: JobId) {
    state.render_job = Some(RenderJob { job_id });
}
