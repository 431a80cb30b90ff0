//! Relationship manager model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account owner that invoices are assigned to for collection follow-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipManager {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub is_on_leave: Option<bool>,
    /// Running count of assignments; adjusted by assignment and reassignment.
    pub assigned_invoices: u32,
    pub created_at: DateTime<Utc>,
}

impl RelationshipManager {
    /// Active and not on leave.
    pub fn is_eligible(&self) -> bool {
        self.is_active && self.is_on_leave != Some(true)
    }
}

/// Input for creating a relationship manager.
#[derive(Debug, Clone)]
pub struct NewRelationshipManager {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub is_on_leave: Option<bool>,
}

impl NewRelationshipManager {
    pub(crate) fn into_rm(self, id: String, now: DateTime<Utc>) -> RelationshipManager {
        RelationshipManager {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            is_active: self.is_active,
            is_on_leave: self.is_on_leave,
            assigned_invoices: 0,
            created_at: now,
        }
    }
}

/// Partial update for a relationship manager. `None` leaves a field
/// untouched; `Some(None)` clears `phone` or `is_on_leave`.
#[derive(Debug, Clone, Default)]
pub struct RmPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub is_on_leave: Option<Option<bool>>,
}

impl RmPatch {
    pub(crate) fn apply(self, rm: &mut RelationshipManager) {
        if let Some(v) = self.name {
            rm.name = v;
        }
        if let Some(v) = self.email {
            rm.email = v;
        }
        if let Some(v) = self.phone {
            rm.phone = v;
        }
        if let Some(v) = self.is_active {
            rm.is_active = v;
        }
        if let Some(v) = self.is_on_leave {
            rm.is_on_leave = v;
        }
    }
}
