//! Jinko Client - HTTP transport
//!
//! [`HttpVaultApi`] implements [`VaultApi`] over JSON/HTTP with `reqwest`.
//! It is a thin transport: one request per call, no retries, and no client
//! timeout unless one is configured.
//!
//! Endpoints are resolved against the API base address
//! (`http://localhost:8000/api` by default); the health check is served from
//! the service root.

#![warn(unreachable_pub)]

mod wire;

use async_trait::async_trait;
use base64::Engine as _;
use jinko_core::{
    ApiError, AuditContext, AuditResult, FileKey, GenerationRequest, Narration, RenderResponse,
    ServiceHealth, UploadSlot, VaultApi, VaultEntry,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::wire::{AudioBody, AudioReply, AuditBody, DraftReply, RenderBody, RenderReply, UploadBody};

/// Default API base address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// HTTP implementation of the Jinko API
#[derive(Debug, Clone)]
pub struct HttpVaultApi {
    http: reqwest::Client,
    base: Url,
}

impl HttpVaultApi {
    /// Create client for a base address
    ///
    /// # Errors
    /// `InvalidUrl` if the base address does not parse, `Request` if the
    /// HTTP client cannot be built
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, None)
    }

    /// Create client with an optional per-request timeout
    ///
    /// # Errors
    /// Same as [`Self::new`]
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base = Url::parse(base_url.trim_end_matches('/')).map_err(|e| ApiError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::request(base_url, e.to_string()))?;

        Ok(Self { http, base })
    }

    /// Base address
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}/{}", self.base.as_str().trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            url: raw,
            message: e.to_string(),
        })
    }
}

/// Send a request and decode a JSON success body
async fn read_json<T: DeserializeOwned>(
    endpoint: &str,
    request: RequestBuilder,
) -> Result<T, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::request(endpoint, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::request(endpoint, e.to_string()))?;
    tracing::debug!(endpoint, bytes = body.len(), "response received");
    serde_json::from_slice(&body).map_err(|e| ApiError::decode(endpoint, e.to_string()))
}

/// Upload URL without its signature, for logs and errors
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

#[async_trait]
impl VaultApi for HttpVaultApi {
    async fn list_vault(&self) -> Result<Vec<VaultEntry>, ApiError> {
        let url = self.endpoint("vault")?;
        read_json("/vault", self.http.get(url)).await
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError> {
        let url = self.endpoint("generate")?;
        let reply: DraftReply = read_json("/generate", self.http.post(url).json(request)).await?;
        Ok(reply.draft)
    }

    async fn audit(&self, text: &str, context: &AuditContext) -> Result<AuditResult, ApiError> {
        let url = self.endpoint("audit")?;
        let body = AuditBody {
            text,
            state: &context.state,
            brokerage: &context.brokerage,
            rules: &context.rules,
            is_owner: context.is_owner,
        };
        read_json("/audit", self.http.post(url).json(&body)).await
    }

    async fn request_upload_slot(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadSlot, ApiError> {
        let url = self.endpoint("upload-url")?;
        let body = UploadBody {
            filename,
            file_type: content_type,
        };
        read_json("/upload-url", self.http.post(url).json(&body)).await
    }

    async fn transfer(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ApiError> {
        let url = Url::parse(upload_url).map_err(|e| ApiError::InvalidUrl {
            url: upload_url.to_string(),
            message: e.to_string(),
        })?;
        let endpoint = redact(&url);
        tracing::debug!(endpoint = %endpoint, bytes = bytes.len(), "transferring payload");

        let response = self
            .http
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ApiError::request(&endpoint, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
            })
        }
    }

    async fn render(&self, prompt: &str, image_key: &FileKey) -> Result<RenderResponse, ApiError> {
        let url = self.endpoint("render")?;
        let body = RenderBody {
            prompt,
            image_key: image_key.as_str(),
        };
        let reply: RenderReply = read_json("/render", self.http.post(url).json(&body)).await?;
        reply.into_response("/render")
    }

    async fn narrate(&self, text: &str, voice_id: &str) -> Result<Narration, ApiError> {
        let url = self.endpoint("audio")?;
        let body = AudioBody { text, voice_id };
        let reply: AudioReply = read_json("/audio", self.http.post(url).json(&body)).await?;
        let audio = base64::engine::general_purpose::STANDARD
            .decode(reply.audio_base64.as_bytes())
            .map_err(|e| ApiError::decode("/audio", e.to_string()))?;
        Ok(Narration {
            voice_id: voice_id.to_string(),
            audio,
        })
    }

    async fn health(&self) -> Result<ServiceHealth, ApiError> {
        let url = self.base.join("/").map_err(|e| ApiError::InvalidUrl {
            url: self.base.to_string(),
            message: e.to_string(),
        })?;
        read_json("/", self.http.get(url)).await
    }
}
