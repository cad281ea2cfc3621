//! Workflow Controller
//!
//! Owns the session state and mediates every remote call:
//! - Session gate: every operation is inert until an agent is signed in
//! - Busy flag: one remote operation at a time, overlapping calls are refused
//! - Guards: gated actions are refused before any network call
//! - Notices: every outcome the user should hear about is queued
//!
//! State is held behind a mutex that is never held across an `.await`; the
//! busy flag guarantees no other mutation happens while a call is in flight.

use crate::api::VaultApi;
use crate::asset;
use crate::auth::{AuthProvider, Session};
use crate::draft;
use crate::error::{ControllerError, PreconditionError};
use crate::navigation;
use crate::notice::{Notice, Operation, Severity};
use crate::state::{Effect, SessionState, View};
use crate::types::{
    AuditContext, AuditResult, GenerationRequest, IdentityAsset, IdentityFile, Narration,
    OperationId, RenderResponse, ServiceHealth,
};
use crate::vault;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Context sent with every audit
    pub audit_context: AuditContext,
    /// MIME types accepted for identity uploads
    pub accepted_content_types: Vec<String>,
}

impl ControllerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With audit context
    #[inline]
    #[must_use]
    pub fn with_audit_context(mut self, context: AuditContext) -> Self {
        self.audit_context = context;
        self
    }

    /// With accepted upload types
    #[inline]
    #[must_use]
    pub fn with_accepted_content_types(mut self, types: Vec<String>) -> Self {
        self.accepted_content_types = types;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            audit_context: AuditContext::default(),
            accepted_content_types: vec!["image/png".to_string(), "image/jpeg".to_string()],
        }
    }
}

/// Clears the busy flag when dropped
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The central workflow controller
pub struct WorkflowController<A, P> {
    api: A,
    auth: P,
    config: ControllerConfig,
    session: RwLock<Session>,
    state: Mutex<SessionState>,
    busy: AtomicBool,
    notices: Mutex<Vec<Notice>>,
}

impl<A, P> std::fmt::Debug for WorkflowController<A, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowController")
            .field("config", &self.config)
            .field("session", &*self.session.read())
            .field("state", &*self.state.lock())
            .field("busy", &self.busy.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl<A: VaultApi, P: AuthProvider> WorkflowController<A, P> {
    /// Create controller
    ///
    /// The session starts signed out; call [`Self::refresh_session`] to read
    /// the identity provider.
    #[must_use]
    pub fn new(api: A, auth: P, config: ControllerConfig) -> Self {
        Self {
            api,
            auth,
            config,
            session: RwLock::new(Session::anonymous()),
            state: Mutex::new(SessionState::new()),
            busy: AtomicBool::new(false),
            notices: Mutex::new(Vec::new()),
        }
    }

    // ----- session gate -----

    /// Re-read the identity provider
    ///
    /// Fails closed: a provider error yields a signed-out session. A change of
    /// agent discards the previous agent's workspace.
    pub async fn refresh_session(&self) -> Session {
        let session = match self.auth.current_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("auth state unavailable, signing out: {}", e);
                Session::anonymous()
            }
        };

        let mut current = self.session.write();
        if current.agent_name != session.agent_name {
            tracing::info!(
                agent = session.agent_name.as_deref().unwrap_or("-"),
                "session changed"
            );
            *self.state.lock() = SessionState::new();
        }
        *current = session.clone();
        session
    }

    /// Check if an agent is signed in
    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_authenticated()
    }

    /// Current session
    #[must_use]
    pub fn session(&self) -> Session {
        self.session.read().clone()
    }

    // ----- read access -----

    /// Copy of the session state
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// Check if a remote operation is outstanding
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Take all queued notices
    pub fn drain_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // ----- navigation -----

    /// Select a view
    ///
    /// Entering the Vault issues exactly one listing refresh; a refresh
    /// failure is reported as a notice and does not undo the navigation.
    ///
    /// # Errors
    /// - `Unauthenticated` when signed out
    /// - `Busy` while another operation is outstanding
    pub async fn navigate(&self, view: View) -> Result<(), ControllerError> {
        self.ensure_authenticated()?;
        let _busy = self.acquire_busy()?;

        let effect = navigation::enter(&mut self.state.lock(), view);
        if effect == Some(Effect::RefreshVault) {
            // failure is already queued as a notice
            let _ = self.reload_vault(OperationId::new()).await;
        }
        Ok(())
    }

    /// Follow the "proceed to studio" affordance of a passed audit
    ///
    /// # Errors
    /// - `Unauthenticated` when signed out
    /// - `Busy` while another operation is outstanding
    pub fn proceed_to_studio(&self) -> Result<bool, ControllerError> {
        self.ensure_authenticated()?;
        let _busy = self.acquire_busy()?;
        Ok(navigation::proceed_to_studio(&mut self.state.lock()))
    }

    // ----- vault -----

    /// Replace the vault listing with the server's
    ///
    /// On failure the previous listing stays in place.
    ///
    /// # Errors
    /// - `Unauthenticated`, `Busy`
    /// - `Api` if the listing could not be fetched
    pub async fn refresh_vault(&self) -> Result<usize, ControllerError> {
        self.ensure_authenticated()?;
        let _busy = self.acquire_busy()?;
        self.reload_vault(OperationId::new()).await
    }

    /// Fetch the listing; the caller holds the busy flag
    async fn reload_vault(&self, id: OperationId) -> Result<usize, ControllerError> {
        match self.api.list_vault().await {
            Ok(entries) => {
                let count = entries.len();
                vault::refreshed(&mut self.state.lock(), entries);
                tracing::info!(op_id = %id, count, "vault refreshed");
                Ok(count)
            }
            Err(source) => {
                tracing::warn!(op_id = %id, "vault refresh failed: {}", source);
                Err(self.fail(id, ControllerError::api(Operation::RefreshVault, source)))
            }
        }
    }

    // ----- draft pipeline -----

    /// Retain the Origin form without submitting it
    ///
    /// # Errors
    /// - `Unauthenticated`, `Busy`
    pub fn update_form(&self, request: GenerationRequest) -> Result<(), ControllerError> {
        self.ensure_authenticated()?;
        let _busy = self.acquire_busy()?;
        draft::update_form(&mut self.state.lock(), request);
        Ok(())
    }

    /// Generate a draft from the request
    ///
    /// Fields are forwarded as entered. On success the draft is replaced,
    /// certification is revoked and the Audit view becomes active.
    ///
    /// # Errors
    /// - `Unauthenticated`, `Busy`
    /// - `Api` on transport failure; the draft and audit are untouched
    pub async fn generate(&self, request: GenerationRequest) -> Result<String, ControllerError> {
        self.ensure_authenticated()?;
        let _busy = self.acquire_busy()?;
        let id = OperationId::new();

        draft::update_form(&mut self.state.lock(), request.clone());
        tracing::info!(op_id = %id, address = %request.address, tone = %request.tone, "generating draft");

        match self.api.generate(&request).await {
            Ok(text) => {
                draft::generated(&mut self.state.lock(), text.clone());
                tracing::info!(op_id = %id, chars = text.len(), "draft generated");
                Ok(text)
            }
            Err(source) => {
                tracing::error!(op_id = %id, "generation failed: {}", source);
                Err(self.fail(id, ControllerError::api(Operation::Generate, source)))
            }
        }
    }

    /// Replace the draft text by hand
    ///
    /// Returns `true` if the text changed, which revokes certification.
    ///
    /// # Errors
    /// - `Unauthenticated`, `Busy`
    pub fn edit_draft(&self, text: impl Into<String>) -> Result<bool, ControllerError> {
        self.ensure_authenticated()?;
        let _busy = self.acquire_busy()?;
        Ok(draft::edit(&mut self.state.lock(), text.into()))
    }

    /// Audit the current draft under the configured context
    ///
    /// The previous result is dropped before the call, so a failed call
    /// leaves the session uncertified.
    ///
    /// # Errors
    /// - `Unauthenticated`, `Busy`
    /// - `Api` on transport failure
    pub async fn audit(&self) -> Result<AuditResult, ControllerError> {
        self.ensure_authenticated()?;
        let _busy = self.acquire_busy()?;
        let id = OperationId::new();

        let text = {
            let mut state = self.state.lock();
            draft::begin_audit(&mut state);
            state.draft().text.clone()
        };
        tracing::info!(op_id = %id, chars = text.len(), state = %self.config.audit_context.state, "auditing draft");

        match self.api.audit(&text, &self.config.audit_context).await {
            Ok(result) => {
                draft::audited(&mut self.state.lock(), result.clone());
                if result.is_pass() {
                    self.notify(id, Severity::Info, "CERTIFICATION GRANTED");
                } else {
                    self.notify(
                        id,
                        Severity::Warning,
                        format!("VIOLATIONS DETECTED: {}", result.violations.len()),
                    );
                }
                tracing::info!(op_id = %id, status = ?result.status, "audit completed");
                Ok(result)
            }
            Err(source) => {
                tracing::error!(op_id = %id, "audit failed: {}", source);
                Err(self.fail(id, ControllerError::api(Operation::Audit, source)))
            }
        }
    }

    /// Adopt the rewrite suggested by a failed audit
    ///
    /// Returns `false` (no-op) unless the retained result failed with a
    /// non-empty rewrite. The result is cleared so the rewrite must be
    /// re-audited.
    ///
    /// # Errors
    /// - `Unauthenticated`, `Busy`
    pub fn apply_remediation(&self) -> Result<bool, ControllerError> {
        self.ensure_authenticated()?;
        let _busy = self.acquire_busy()?;
        let applied = draft::apply_remediation(&mut self.state.lock());
        if applied {
            tracing::info!("remediation applied, re-audit required");
        }
        Ok(applied)
    }

    /// Narrate the current draft
    ///
    /// # Errors
    /// - `Unauthenticated`, `Busy`
    /// - `Api` on transport or decode failure
    pub async fn narrate(&self, voice_id: &str) -> Result<Narration, ControllerError> {
        self.ensure_authenticated()?;
        let _busy = self.acquire_busy()?;
        let id = OperationId::new();

        let text = self.state.lock().draft().text.clone();
        match self.api.narrate(&text, voice_id).await {
            Ok(narration) => {
                tracing::info!(op_id = %id, voice_id, bytes = narration.audio.len(), "narration ready");
                Ok(narration)
            }
            Err(source) => {
                tracing::error!(op_id = %id, "narration failed: {}", source);
                Err(self.fail(id, ControllerError::api(Operation::Narrate, source)))
            }
        }
    }

    // ----- asset pipeline -----

    /// Upload an identity image: upload slot, transfer, record
    ///
    /// # Errors
    /// - `Unauthenticated`, `Busy`
    /// - `Precondition` if uncertified or the content type is not accepted
    /// - `Api` if either step fails; the previous identity is kept
    pub async fn upload_identity(&self, file: IdentityFile) -> Result<IdentityAsset, ControllerError> {
        self.ensure_authenticated()?;
        let _busy = self.acquire_busy()?;
        let id = OperationId::new();

        let checked = asset::check_upload(
            &self.state.lock(),
            &file.content_type,
            &self.config.accepted_content_types,
        );
        if let Err(e) = checked {
            tracing::warn!(op_id = %id, "upload refused: {}", e);
            return Err(self.fail(id, e.into()));
        }

        tracing::info!(op_id = %id, filename = %file.filename, content_type = %file.content_type, "requesting upload slot");
        let slot = match self
            .api
            .request_upload_slot(&file.filename, &file.content_type)
            .await
        {
            Ok(slot) => slot,
            Err(source) => {
                tracing::error!(op_id = %id, "upload slot request failed: {}", source);
                return Err(self.fail(id, ControllerError::api(Operation::Upload, source)));
            }
        };

        tracing::debug!(op_id = %id, file_key = %slot.file_key, bytes = file.bytes.len(), "transferring identity");
        if let Err(source) = self
            .api
            .transfer(&slot.upload_url, file.bytes, &file.content_type)
            .await
        {
            tracing::error!(op_id = %id, "transfer failed: {}", source);
            return Err(self.fail(id, ControllerError::api(Operation::Upload, source)));
        }

        let identity = IdentityAsset {
            file_key: slot.file_key,
            content_type: file.content_type,
        };
        asset::uploaded(&mut self.state.lock(), identity.clone());
        self.notify(
            id,
            Severity::Info,
            "Identity Uploaded. It will appear in the Asset Vault shortly.",
        );
        tracing::info!(op_id = %id, file_key = %identity.file_key, "identity recorded");
        Ok(identity)
    }

    /// Submit a render of the certified draft with the uploaded identity
    ///
    /// Completion is not polled; the rendered video shows up in the vault.
    /// A refused job is `Ok(RenderResponse::Rejected)`.
    ///
    /// # Errors
    /// - `Unauthenticated`, `Busy`
    /// - `Precondition` if uncertified, without identity, or with a job active;
    ///   no network call is made
    /// - `Api` on transport failure
    pub async fn render(&self) -> Result<RenderResponse, ControllerError> {
        self.ensure_authenticated()?;
        let _busy = self.acquire_busy()?;
        let id = OperationId::new();

        let checked = asset::check_render(&self.state.lock());
        let input = match checked {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(op_id = %id, "render refused: {}", e);
                return Err(self.fail(id, e.into()));
            }
        };

        tracing::info!(op_id = %id, image_key = %input.image_key, "submitting render");
        match self.api.render(&input.prompt, &input.image_key).await {
            Ok(RenderResponse::Started(job_id)) => {
                asset::render_started(&mut self.state.lock(), job_id.clone());
                self.notify(
                    id,
                    Severity::Info,
                    "Render Initialized. Check Asset Vault in ~5 minutes.",
                );
                tracing::info!(op_id = %id, job_id = %job_id, "render started");
                Ok(RenderResponse::Started(job_id))
            }
            Ok(RenderResponse::Rejected(message)) => {
                self.notify(id, Severity::Warning, format!("Render Error: {message}"));
                tracing::warn!(op_id = %id, "render rejected: {}", message);
                Ok(RenderResponse::Rejected(message))
            }
            Err(source) => {
                tracing::error!(op_id = %id, "render failed: {}", source);
                Err(self.fail(id, ControllerError::api(Operation::Render, source)))
            }
        }
    }

    // ----- diagnostics -----

    /// Health of the remote service; not gated by the session
    ///
    /// # Errors
    /// Transport failure
    pub async fn health(&self) -> Result<ServiceHealth, crate::error::ApiError> {
        self.api.health().await
    }

    // ----- internals -----

    fn ensure_authenticated(&self) -> Result<(), ControllerError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(ControllerError::Unauthenticated)
        }
    }

    fn acquire_busy(&self) -> Result<BusyGuard<'_>, ControllerError> {
        BusyGuard::acquire(&self.busy).ok_or(ControllerError::Busy)
    }

    fn notify(&self, id: OperationId, severity: Severity, message: impl Into<String>) {
        self.notices.lock().push(Notice::new(id, severity, message));
    }

    /// Queue the notice for a failure and hand the error back
    fn fail(&self, id: OperationId, error: ControllerError) -> ControllerError {
        let message = match &error {
            ControllerError::Api { operation, .. } => operation.failure_message().to_string(),
            ControllerError::Precondition(PreconditionError::NotCertified) => {
                "SECURITY PROTOCOL: Script must be Jinko Certified first.".to_string()
            }
            other => other.to_string(),
        };
        self.notify(id, error.notice_severity(), message);
        error
    }
}
