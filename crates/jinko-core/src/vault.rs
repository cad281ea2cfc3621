//! Vault listing cache

use crate::state::SessionState;
use crate::types::{AssetKind, VaultEntry};

/// Replace the cached listing wholesale, keeping server order
pub fn refreshed(state: &mut SessionState, entries: Vec<VaultEntry>) {
    state.vault = entries;
}

/// Count cached entries of a kind
#[must_use]
pub fn count_kind(state: &SessionState, kind: AssetKind) -> usize {
    state.vault.iter().filter(|e| e.kind == kind).count()
}
