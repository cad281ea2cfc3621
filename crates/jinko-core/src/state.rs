//! Session state of the workflow
//!
//! [`SessionState`] is the single serializable record of everything the
//! controller knows. It is only mutated through the transition functions in
//! [`crate::navigation`], [`crate::draft`], [`crate::asset`] and
//! [`crate::vault`], which keep the certification invariant:
//!
//! the session is certified iff the retained audit result passed and nothing
//! has mutated the draft since. Every mutation of the draft drops the audit
//! result, so certification is derived rather than stored.

use crate::types::{
    AuditResult, DraftScript, FileKey, GenerationRequest, IdentityAsset, JobId, RenderJob,
    VaultEntry,
};
use serde::{Deserialize, Serialize};

/// Workspace views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum View {
    /// Stored assets (home)
    #[default]
    Vault,
    /// Draft generation
    Origin,
    /// Compliance audit
    Audit,
    /// Identity upload and render
    Studio,
}

impl View {
    /// All views in navigation order
    pub const ALL: [View; 4] = [View::Vault, View::Origin, View::Audit, View::Studio];
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            View::Vault => "vault",
            View::Origin => "origin",
            View::Audit => "audit",
            View::Studio => "studio",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vault" => Ok(View::Vault),
            "origin" => Ok(View::Origin),
            "audit" => Ok(View::Audit),
            "studio" => Ok(View::Studio),
            other => Err(format!("unknown view: {other}")),
        }
    }
}

/// Remote work requested by a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Reload the vault listing
    RefreshVault,
}

/// What the Studio view renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudioView {
    /// Placeholder shown until the script is certified
    Locked,
    /// Certified, no identity uploaded yet
    AwaitingIdentity,
    /// Identity uploaded, render can be deployed
    ReadyToDeploy(FileKey),
    /// Render submitted
    Rendering(JobId),
}

/// User affordances of the active view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Reload the vault
    RefreshVault,
    /// Submit the Origin form
    Generate,
    /// Edit the draft text
    EditDraft,
    /// Audit the draft
    Audit,
    /// Replace the draft with the suggested rewrite
    ApplyRemediation,
    /// Move from a passed audit to the Studio
    ProceedToStudio,
    /// Leave the locked Studio for the Audit view
    ReturnToAudit,
    /// Upload an identity image
    Upload,
    /// Submit a render
    Deploy,
    /// Narrate the draft
    Narrate,
}

/// Everything the controller tracks for one session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub(crate) view: View,
    pub(crate) form: GenerationRequest,
    pub(crate) draft: DraftScript,
    pub(crate) audit: Option<AuditResult>,
    pub(crate) identity: Option<IdentityAsset>,
    pub(crate) render_job: Option<RenderJob>,
    pub(crate) vault: Vec<VaultEntry>,
}

impl SessionState {
    /// Create empty state on the Vault view
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active view
    #[inline]
    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    /// Last submitted Origin form
    #[inline]
    #[must_use]
    pub fn form(&self) -> &GenerationRequest {
        &self.form
    }

    /// Working draft
    #[inline]
    #[must_use]
    pub fn draft(&self) -> &DraftScript {
        &self.draft
    }

    /// Retained audit result
    #[inline]
    #[must_use]
    pub fn audit(&self) -> Option<&AuditResult> {
        self.audit.as_ref()
    }

    /// Check if the current draft is certified
    #[inline]
    #[must_use]
    pub fn is_certified(&self) -> bool {
        self.audit.as_ref().is_some_and(AuditResult::is_pass)
    }

    /// Uploaded identity
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Option<&IdentityAsset> {
        self.identity.as_ref()
    }

    /// Active render job
    #[inline]
    #[must_use]
    pub fn render_job(&self) -> Option<&RenderJob> {
        self.render_job.as_ref()
    }

    /// Cached vault listing, in server order
    #[inline]
    #[must_use]
    pub fn vault(&self) -> &[VaultEntry] {
        &self.vault
    }

    /// What the Studio view shows
    #[must_use]
    pub fn studio_view(&self) -> StudioView {
        if !self.is_certified() {
            return StudioView::Locked;
        }
        if let Some(job) = &self.render_job {
            return StudioView::Rendering(job.job_id.clone());
        }
        match &self.identity {
            Some(identity) => StudioView::ReadyToDeploy(identity.file_key.clone()),
            None => StudioView::AwaitingIdentity,
        }
    }

    /// Affordances of the active view
    #[must_use]
    pub fn available_actions(&self) -> Vec<Action> {
        match self.view {
            View::Vault => vec![Action::RefreshVault],
            View::Origin => vec![Action::Generate],
            View::Audit => {
                let mut actions = vec![Action::EditDraft, Action::Audit, Action::Narrate];
                if self.audit.as_ref().is_some_and(|a| a.remediation().is_some()) {
                    actions.push(Action::ApplyRemediation);
                }
                if self.is_certified() {
                    actions.push(Action::ProceedToStudio);
                }
                actions
            }
            View::Studio => match self.studio_view() {
                StudioView::Locked => vec![Action::ReturnToAudit],
                StudioView::AwaitingIdentity => vec![Action::Upload],
                StudioView::ReadyToDeploy(_) => vec![Action::Upload, Action::Deploy],
                StudioView::Rendering(_) => vec![Action::Upload],
            },
        }
    }
}
