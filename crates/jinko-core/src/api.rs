//! Remote API contract
//!
//! [`VaultApi`] is the only way the controller reaches the generation,
//! audit, storage, render and narration engines. Implementations are thin
//! transports: no retries, no caching, no state.

use crate::error::ApiError;
use crate::types::{
    AuditContext, AuditResult, FileKey, GenerationRequest, Narration, RenderResponse,
    ServiceHealth, UploadSlot, VaultEntry,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Request/response contract of the Jinko API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VaultApi: Send + Sync {
    /// `GET /vault`
    async fn list_vault(&self) -> Result<Vec<VaultEntry>, ApiError>;

    /// `POST /generate`, returning the draft text
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError>;

    /// `POST /audit`
    async fn audit(&self, text: &str, context: &AuditContext) -> Result<AuditResult, ApiError>;

    /// `POST /upload-url`
    async fn request_upload_slot(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadSlot, ApiError>;

    /// `PUT <upload_url>` with the raw payload
    async fn transfer(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ApiError>;

    /// `POST /render`
    ///
    /// A refused job is `Ok(RenderResponse::Rejected)`, not an error.
    async fn render(&self, prompt: &str, image_key: &FileKey) -> Result<RenderResponse, ApiError>;

    /// `POST /audio`
    async fn narrate(&self, text: &str, voice_id: &str) -> Result<Narration, ApiError>;

    /// `GET /` on the service root
    async fn health(&self) -> Result<ServiceHealth, ApiError>;
}

#[async_trait]
impl<T: VaultApi + ?Sized> VaultApi for Arc<T> {
    async fn list_vault(&self) -> Result<Vec<VaultEntry>, ApiError> {
        (**self).list_vault().await
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError> {
        (**self).generate(request).await
    }

    async fn audit(&self, text: &str, context: &AuditContext) -> Result<AuditResult, ApiError> {
        (**self).audit(text, context).await
    }

    async fn request_upload_slot(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadSlot, ApiError> {
        (**self).request_upload_slot(filename, content_type).await
    }

    async fn transfer(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ApiError> {
        (**self).transfer(upload_url, bytes, content_type).await
    }

    async fn render(&self, prompt: &str, image_key: &FileKey) -> Result<RenderResponse, ApiError> {
        (**self).render(prompt, image_key).await
    }

    async fn narrate(&self, text: &str, voice_id: &str) -> Result<Narration, ApiError> {
        (**self).narrate(text, voice_id).await
    }

    async fn health(&self) -> Result<ServiceHealth, ApiError> {
        (**self).health().await
    }
}
