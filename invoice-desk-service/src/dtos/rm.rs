//! Request bodies for the relationship manager endpoints.

use serde::Deserialize;
use validator::Validate;

use crate::models::{NewRelationshipManager, RmPatch};

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRmRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub is_on_leave: Option<bool>,
}

impl From<CreateRmRequest> for NewRelationshipManager {
    fn from(req: CreateRmRequest) -> Self {
        NewRelationshipManager {
            name: req.name,
            email: req.email,
            phone: req.phone.filter(|p| !p.is_empty()),
            is_active: req.is_active,
            is_on_leave: req.is_on_leave,
        }
    }
}

/// Patch body. `null` clears `phone` or `is_on_leave`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateRmRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub phone: Option<Option<String>>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub is_on_leave: Option<Option<bool>>,
}

impl From<UpdateRmRequest> for RmPatch {
    fn from(req: UpdateRmRequest) -> Self {
        RmPatch {
            name: req.name,
            email: req.email,
            phone: req.phone,
            is_active: req.is_active,
            is_on_leave: req.is_on_leave,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rm_defaults_to_active() {
        let req: CreateRmRequest = serde_json::from_value(serde_json::json!({
            "name": "Priya Nair",
            "email": "priya@company.com"
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert!(req.is_active);
    }

    #[test]
    fn rejects_malformed_email() {
        let req: CreateRmRequest = serde_json::from_value(serde_json::json!({
            "name": "Priya Nair",
            "email": "not-an-email"
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn null_clears_leave_flag() {
        let req: UpdateRmRequest =
            serde_json::from_value(serde_json::json!({ "is_on_leave": null })).unwrap();

        let patch = RmPatch::from(req);
        assert_eq!(patch.is_on_leave, Some(None));
        assert_eq!(patch.phone, None);
    }

    #[test]
    fn patch_cannot_touch_assignment_counter() {
        let result: Result<UpdateRmRequest, _> =
            serde_json::from_value(serde_json::json!({ "assigned_invoices": 7 }));
        assert!(result.is_err());
    }
}
