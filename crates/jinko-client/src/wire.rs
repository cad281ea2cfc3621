//! JSON bodies of the Jinko API
//!
//! Request bodies borrow from the caller; response bodies are converted into
//! `jinko_core` types by the client.

use jinko_core::{ApiError, JobId, RenderResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct AuditBody<'a> {
    pub(crate) text: &'a str,
    pub(crate) state: &'a str,
    pub(crate) brokerage: &'a str,
    pub(crate) rules: &'a str,
    pub(crate) is_owner: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DraftReply {
    pub(crate) draft: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadBody<'a> {
    pub(crate) filename: &'a str,
    pub(crate) file_type: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenderBody<'a> {
    pub(crate) prompt: &'a str,
    pub(crate) image_key: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RenderReply {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) job_id: Option<String>,
    #[serde(default)]
    pub(crate) msg: Option<String>,
}

impl RenderReply {
    pub(crate) const SUCCESS: &'static str = "SUCCESS";

    /// A `SUCCESS` without a job id breaks the contract; anything else is a
    /// rejection carrying the engine's message (or its status).
    pub(crate) fn into_response(self, endpoint: &str) -> Result<RenderResponse, ApiError> {
        if self.status == Self::SUCCESS {
            return self
                .job_id
                .map(|id| RenderResponse::Started(JobId(id)))
                .ok_or_else(|| ApiError::decode(endpoint, "SUCCESS without job_id"));
        }
        Ok(RenderResponse::Rejected(self.msg.unwrap_or(self.status)))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AudioBody<'a> {
    pub(crate) text: &'a str,
    pub(crate) voice_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AudioReply {
    pub(crate) audio_base64: String,
}
