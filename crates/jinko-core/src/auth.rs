//! Session gate
//!
//! The identity provider is an external collaborator; the controller only
//! reads the session it reports and fails closed when it cannot.

use crate::error::AuthError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Authentication state as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    /// Agent display name; `None` when signed out
    pub agent_name: Option<String>,
}

impl Session {
    /// Signed-out session
    #[inline]
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Signed-in session
    #[inline]
    #[must_use]
    pub fn signed_in(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: Some(agent_name.into()),
        }
    }

    /// Check if an agent is signed in
    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.agent_name.is_some()
    }
}

/// Identity collaborator
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current session
    async fn current_session(&self) -> Result<Session, AuthError>;
}

#[async_trait]
impl<T: AuthProvider + ?Sized> AuthProvider for Arc<T> {
    async fn current_session(&self) -> Result<Session, AuthError> {
        (**self).current_session().await
    }
}

/// In-process identity provider holding a signed-in agent name
#[derive(Debug, Default)]
pub struct StaticAuth {
    agent: RwLock<Option<String>>,
}

impl StaticAuth {
    /// Create provider with no agent signed in
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create provider with an agent already signed in
    #[inline]
    #[must_use]
    pub fn signed_in(agent_name: impl Into<String>) -> Self {
        Self {
            agent: RwLock::new(Some(agent_name.into())),
        }
    }

    /// Sign an agent in
    pub fn sign_in(&self, agent_name: impl Into<String>) {
        *self.agent.write() = Some(agent_name.into());
    }

    /// Sign the agent out
    pub fn sign_out(&self) {
        *self.agent.write() = None;
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn current_session(&self) -> Result<Session, AuthError> {
        Ok(Session {
            agent_name: self.agent.read().clone(),
        })
    }
}
