/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Write operations a bond record can go through.
/// Used by the bond write path and by the analysis cache invalidation hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Deactivate, // soft delete, is_active -> false
    Purge,      // forced delete, row removed
}

/// Notification emitted after a bond write has been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteEvent {
    pub user_id: Uuid,
    pub bond_id: i64,
    pub operation: Operation,
}

impl WriteEvent {
    pub fn new(user_id: Uuid, bond_id: i64, operation: Operation) -> Self {
        Self { user_id, bond_id, operation }
    }
}
