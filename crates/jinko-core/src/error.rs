//! Error types for the Jinko workflow
//!
//! Three failure categories:
//! - Transport failures ([`ApiError`]): a remote call could not complete
//! - Precondition failures ([`PreconditionError`]): a gated action was
//!   attempted without its prerequisite, refused before any network call
//! - Controller failures ([`ControllerError`]): everything a controller
//!   operation can return, including the session gate and the busy flag
//!
//! Domain rejections (a failed audit, a refused render) are not errors; they
//! are ordinary outcomes carried in [`crate::types`].

use crate::notice::{Operation, Severity};
use crate::types::JobId;

/// Transport failure talking to the remote API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Connection or protocol failure before a response arrived
    #[error("request to {endpoint} failed: {message}")]
    Request {
        /// Endpoint path or URL
        endpoint: String,
        /// Underlying cause
        message: String,
    },

    /// Non-success HTTP status
    #[error("{endpoint} returned status {status}")]
    Status {
        /// Endpoint path or URL
        endpoint: String,
        /// HTTP status code
        status: u16,
    },

    /// Response body did not match the contract
    #[error("malformed response from {endpoint}: {message}")]
    Decode {
        /// Endpoint path or URL
        endpoint: String,
        /// Decoder message
        message: String,
    },

    /// Configured or granted URL is unusable
    #[error("invalid url {url}: {message}")]
    InvalidUrl {
        /// Offending URL
        url: String,
        /// Parser message
        message: String,
    },
}

impl ApiError {
    /// Create request failure
    #[inline]
    pub fn request(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create decode failure
    #[inline]
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

/// Gated action attempted without its prerequisite
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    /// Studio actions need a certified script
    #[error("script must be certified first")]
    NotCertified,

    /// Render needs an uploaded identity
    #[error("no identity has been uploaded")]
    MissingIdentity,

    /// Only one render is tracked per session
    #[error("render {0} is already active")]
    RenderActive(JobId),

    /// Identity uploads are limited to the configured image types
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
}

/// Identity collaborator failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Auth state could not be determined
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a controller operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// No authenticated session; the workspace is inert
    #[error("sign in required")]
    Unauthenticated,

    /// Another operation is outstanding
    #[error("another operation is in progress")]
    Busy,

    /// Gated action refused
    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// Remote call failed
    #[error("{operation} failed: {source}")]
    Api {
        /// Operation that issued the call
        operation: Operation,
        /// Transport failure
        #[source]
        source: ApiError,
    },
}

impl ControllerError {
    /// Wrap a transport failure of an operation
    #[inline]
    #[must_use]
    pub fn api(operation: Operation, source: ApiError) -> Self {
        Self::Api { operation, source }
    }

    /// Check if the error is a transport failure
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Check if the error is a refused precondition
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// How the failure is surfaced to the user
    #[must_use]
    pub fn notice_severity(&self) -> Severity {
        match self {
            Self::Precondition(PreconditionError::NotCertified) => Severity::Security,
            Self::Api { operation, .. } => operation.failure_severity(),
            Self::Unauthenticated | Self::Busy | Self::Precondition(_) => Severity::Warning,
        }
    }
}
