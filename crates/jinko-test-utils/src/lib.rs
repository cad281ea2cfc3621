//! Testing utilities for the Jinko workspace
//!
//! Shared fixtures and [`ScriptedApi`], a [`VaultApi`] that replays queued
//! responses and records every call it receives.

#![allow(missing_docs)]

use async_trait::async_trait;
use jinko_core::{
    ApiError, AssetKind, AuditContext, AuditResult, ControllerConfig, FileKey, GenerationRequest,
    IdentityFile, JobId, Narration, RenderResponse, ServiceHealth, StaticAuth, UploadSlot,
    VaultApi, VaultEntry, Violation, WorkflowController,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

/// A call received by [`ScriptedApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListVault,
    Generate(GenerationRequest),
    Audit { text: String, context: AuditContext },
    RequestUploadSlot { filename: String, content_type: String },
    Transfer { upload_url: String, len: usize, content_type: String },
    Render { prompt: String, image_key: FileKey },
    Narrate { text: String, voice_id: String },
    Health,
}

#[derive(Debug, Default)]
struct Script {
    vault: VecDeque<Result<Vec<VaultEntry>, ApiError>>,
    generate: VecDeque<Result<String, ApiError>>,
    audit: VecDeque<Result<AuditResult, ApiError>>,
    upload_slot: VecDeque<Result<UploadSlot, ApiError>>,
    transfer: VecDeque<Result<(), ApiError>>,
    render: VecDeque<Result<RenderResponse, ApiError>>,
    narrate: VecDeque<Result<Narration, ApiError>>,
    health: VecDeque<Result<ServiceHealth, ApiError>>,
}

/// Holds calls until released
#[derive(Debug, Default)]
struct Gate {
    entered: Notify,
    release: Notify,
}

#[derive(Debug, Default)]
struct Inner {
    script: Mutex<Script>,
    calls: Mutex<Vec<Call>>,
    gate: Mutex<Option<Arc<Gate>>>,
}

/// Scripted, call-recording API
///
/// Clones share the same script and call log. A call with nothing queued
/// fails with a request error naming the endpoint.
#[derive(Debug, Clone, Default)]
pub struct ScriptedApi {
    inner: Arc<Inner>,
}

fn unscripted<T>(endpoint: &str) -> Result<T, ApiError> {
    Err(ApiError::request(endpoint, "no scripted response"))
}

impl ScriptedApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_vault(&self, response: Result<Vec<VaultEntry>, ApiError>) -> &Self {
        self.inner.script.lock().vault.push_back(response);
        self
    }

    pub fn push_generate(&self, response: Result<String, ApiError>) -> &Self {
        self.inner.script.lock().generate.push_back(response);
        self
    }

    pub fn push_audit(&self, response: Result<AuditResult, ApiError>) -> &Self {
        self.inner.script.lock().audit.push_back(response);
        self
    }

    pub fn push_upload_slot(&self, response: Result<UploadSlot, ApiError>) -> &Self {
        self.inner.script.lock().upload_slot.push_back(response);
        self
    }

    pub fn push_transfer(&self, response: Result<(), ApiError>) -> &Self {
        self.inner.script.lock().transfer.push_back(response);
        self
    }

    pub fn push_render(&self, response: Result<RenderResponse, ApiError>) -> &Self {
        self.inner.script.lock().render.push_back(response);
        self
    }

    pub fn push_narrate(&self, response: Result<Narration, ApiError>) -> &Self {
        self.inner.script.lock().narrate.push_back(response);
        self
    }

    pub fn push_health(&self, response: Result<ServiceHealth, ApiError>) -> &Self {
        self.inner.script.lock().health.push_back(response);
        self
    }

    /// Every call so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().clone()
    }

    /// Number of calls matching a predicate
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.inner.calls.lock().iter().filter(|c| pred(c)).count()
    }

    /// Hold every subsequent call until [`Self::release`]
    pub fn hold(&self) {
        *self.inner.gate.lock() = Some(Arc::new(Gate::default()));
    }

    /// Wait until a held call has been received
    pub async fn entered(&self) {
        let gate = self.inner.gate.lock().clone();
        if let Some(gate) = gate {
            gate.entered.notified().await;
        }
    }

    /// Let held calls proceed and stop holding new ones
    pub fn release(&self) {
        if let Some(gate) = self.inner.gate.lock().take() {
            gate.release.notify_waiters();
            gate.release.notify_one();
        }
    }

    async fn record(&self, call: Call) {
        self.inner.calls.lock().push(call);
        let gate = self.inner.gate.lock().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

#[async_trait]
impl VaultApi for ScriptedApi {
    async fn list_vault(&self) -> Result<Vec<VaultEntry>, ApiError> {
        self.record(Call::ListVault).await;
        let next = self.inner.script.lock().vault.pop_front();
        next.unwrap_or_else(|| unscripted("/vault"))
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError> {
        self.record(Call::Generate(request.clone())).await;
        let next = self.inner.script.lock().generate.pop_front();
        next.unwrap_or_else(|| unscripted("/generate"))
    }

    async fn audit(&self, text: &str, context: &AuditContext) -> Result<AuditResult, ApiError> {
        self.record(Call::Audit {
            text: text.to_string(),
            context: context.clone(),
        })
        .await;
        let next = self.inner.script.lock().audit.pop_front();
        next.unwrap_or_else(|| unscripted("/audit"))
    }

    async fn request_upload_slot(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadSlot, ApiError> {
        self.record(Call::RequestUploadSlot {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
        })
        .await;
        let next = self.inner.script.lock().upload_slot.pop_front();
        next.unwrap_or_else(|| unscripted("/upload-url"))
    }

    async fn transfer(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ApiError> {
        self.record(Call::Transfer {
            upload_url: upload_url.to_string(),
            len: bytes.len(),
            content_type: content_type.to_string(),
        })
        .await;
        let next = self.inner.script.lock().transfer.pop_front();
        next.unwrap_or_else(|| unscripted(upload_url))
    }

    async fn render(&self, prompt: &str, image_key: &FileKey) -> Result<RenderResponse, ApiError> {
        self.record(Call::Render {
            prompt: prompt.to_string(),
            image_key: image_key.clone(),
        })
        .await;
        let next = self.inner.script.lock().render.pop_front();
        next.unwrap_or_else(|| unscripted("/render"))
    }

    async fn narrate(&self, text: &str, voice_id: &str) -> Result<Narration, ApiError> {
        self.record(Call::Narrate {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
        })
        .await;
        let next = self.inner.script.lock().narrate.pop_front();
        next.unwrap_or_else(|| unscripted("/audio"))
    }

    async fn health(&self) -> Result<ServiceHealth, ApiError> {
        self.record(Call::Health).await;
        let next = self.inner.script.lock().health.pop_front();
        next.unwrap_or_else(|| unscripted("/"))
    }
}

// ----- fixtures -----

pub type TestController = WorkflowController<ScriptedApi, StaticAuth>;

/// Controller signed in as "Dana" over the given API
pub async fn setup_controller(api: &ScriptedApi) -> TestController {
    let controller = WorkflowController::new(
        api.clone(),
        StaticAuth::signed_in("Dana"),
        ControllerConfig::new(),
    );
    controller.refresh_session().await;
    controller
}

pub fn oak_street_request() -> GenerationRequest {
    GenerationRequest::new("123 Oak St", "3/2/1800", "pool")
}

pub fn familial_status_failure() -> AuditResult {
    AuditResult::fail(
        "...revised...",
        vec![Violation::new(
            "no kids allowed",
            "familial status discrimination",
        )],
    )
}

pub fn png_identity() -> IdentityFile {
    IdentityFile::new("me.png", "image/png", vec![0x89, b'P', b'N', b'G'])
}

pub fn upload_slot(key: &str) -> UploadSlot {
    UploadSlot {
        upload_url: format!("https://storage.example/{key}?signature=abc"),
        file_key: FileKey::new(key),
    }
}

pub fn job(id: &str) -> JobId {
    JobId(id.to_string())
}

pub fn vault_entry(key: &str, kind: AssetKind) -> VaultEntry {
    VaultEntry {
        key: key.to_string(),
        kind,
        url: format!("https://storage.example/{key}"),
        created_at: "2024-05-01".to_string(),
    }
}

/// Drive a controller to a certified draft
pub async fn certify(controller: &TestController, api: &ScriptedApi, text: &str) {
    api.push_audit(Ok(AuditResult::pass(text)));
    controller
        .edit_draft(text)
        .expect("edit should succeed when idle");
    controller
        .audit()
        .await
        .expect("scripted audit should succeed");
}
