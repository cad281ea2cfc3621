//! User-visible notices
//!
//! Every controller operation that the user should hear about pushes a
//! [`Notice`] onto the controller's queue; the view layer drains and shows it.

use crate::types::OperationId;
use serde::{Deserialize, Serialize};

/// How prominently a notice is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Confirmation of a completed action
    Info,
    /// Non-blocking problem
    Warning,
    /// Failure that aborted the user's action
    Blocking,
    /// Refused gated action
    Security,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Blocking => "ERROR",
            Severity::Security => "SECURITY",
        };
        f.write_str(label)
    }
}

/// Remote-backed controller operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// List the vault
    RefreshVault,
    /// Generate a draft
    Generate,
    /// Audit the draft
    Audit,
    /// Upload an identity image
    Upload,
    /// Submit a render job
    Render,
    /// Narrate the draft
    Narrate,
}

impl Operation {
    /// Message shown when the operation's remote call fails
    #[must_use]
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::RefreshVault => "Vault refresh failed. Showing the last known listing.",
            Operation::Generate | Operation::Audit => "Brain Connection Error",
            Operation::Upload => "Vault Upload Failed.",
            Operation::Render => "Render Failed.",
            Operation::Narrate => "Narration Failed.",
        }
    }

    /// Severity of a transport failure of this operation
    #[must_use]
    pub fn failure_severity(&self) -> Severity {
        match self {
            Operation::RefreshVault => Severity::Warning,
            _ => Severity::Blocking,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::RefreshVault => "vault refresh",
            Operation::Generate => "generate",
            Operation::Audit => "audit",
            Operation::Upload => "upload",
            Operation::Render => "render",
            Operation::Narrate => "narrate",
        };
        f.write_str(name)
    }
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Action that produced the notice
    pub operation_id: OperationId,
    /// Prominence
    pub severity: Severity,
    /// Text
    pub message: String,
}

impl Notice {
    /// Create new notice
    #[inline]
    #[must_use]
    pub fn new(operation_id: OperationId, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            operation_id,
            severity,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}
