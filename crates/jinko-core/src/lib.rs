//! Jinko Core - Workflow Controller
//!
//! The client-side state machine of the Jinko Vault workflow:
//! - Session gate: nothing happens until an agent is signed in
//! - Navigation: Vault, Origin, Audit and Studio views; Studio stays locked
//!   until the draft is certified
//! - Draft pipeline: generate, edit, audit, remediate, re-audit
//! - Asset pipeline: upload an identity image, submit an avatar render
//! - Vault: cached listing of stored identities and videos
//!
//! Every remote call goes through the [`VaultApi`] trait; the state
//! transitions themselves are plain functions over [`SessionState`].
//!
//! # Example
//!
//! ```rust,ignore
//! use jinko_core::{ControllerConfig, GenerationRequest, StaticAuth, WorkflowController};
//!
//! # async fn example(api: impl jinko_core::VaultApi) -> Result<(), jinko_core::ControllerError> {
//! let controller =
//!     WorkflowController::new(api, StaticAuth::signed_in("Dana"), ControllerConfig::new());
//! controller.refresh_session().await;
//!
//! controller
//!     .generate(GenerationRequest::new("123 Oak St", "3/2/1800", "pool"))
//!     .await?;
//! let result = controller.audit().await?;
//! println!("certified: {}", result.is_pass());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod api;
pub mod asset;
pub mod auth;
pub mod controller;
pub mod draft;
pub mod error;
pub mod navigation;
pub mod notice;
pub mod state;
pub mod types;
pub mod vault;

// Re-exports for convenience
pub use api::VaultApi;
pub use auth::{AuthProvider, Session, StaticAuth};
pub use controller::{ControllerConfig, WorkflowController};
pub use error::{ApiError, AuthError, ControllerError, PreconditionError};
pub use notice::{Notice, Operation, Severity};
pub use state::{Action, Effect, SessionState, StudioView, View};
pub use types::{
    AssetKind, AuditContext, AuditResult, AuditStatus, DraftScript, FileKey, GenerationRequest,
    IdentityAsset, IdentityFile, JobId, Narration, OperationId, RenderJob, RenderResponse,
    ServiceHealth, Tone, UploadSlot, VaultEntry, Violation,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Jinko Core
    pub use crate::{
        AuthProvider, ControllerConfig, ControllerError, GenerationRequest, IdentityFile, View,
        VaultApi, WorkflowController,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
