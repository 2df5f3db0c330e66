//! Staff members (trainers, front desk, management)

use crate::core::entity::{Entity, EntityId, EntityLabels};
use crate::core::field::optional_calendar_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

static STAFF_LABELS: EntityLabels = EntityLabels {
    plural: "staff",
    short: "staff",
    record: "staff member",
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: String,
    #[serde(
        default,
        with = "optional_calendar_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub join_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default)]
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_shift: Option<String>,
}

impl Entity for Staff {
    type Draft = NewStaff;

    fn resource_name() -> &'static str {
        "staff"
    }

    fn labels() -> &'static EntityLabels {
        &STAFF_LABELS
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Creation payload for `POST /staff`
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewStaff {
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 10, message = "Phone number must be at least 10 digits."))]
    pub phone: String,
    #[validate(length(min = 1, message = "Please select a role."))]
    pub role: String,
    #[validate(length(min = 1, message = "Please select a department."))]
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_staff_decodes() {
        let staff: Staff = serde_json::from_value(json!({
            "id": "s-1",
            "name": "Alex Trainer",
            "role": "trainer",
            "status": "on-leave",
            "department": "fitness",
            "lastShift": "2024-01-14 18:00"
        }))
        .unwrap();

        assert_eq!(staff.role, "trainer");
        assert!(!staff.is_active());
        assert_eq!(staff.last_shift.as_deref(), Some("2024-01-14 18:00"));
    }

    #[test]
    fn test_new_staff_requires_role_and_department() {
        let draft = NewStaff {
            name: "Alex Trainer".to_string(),
            email: "alex@example.com".to_string(),
            phone: "5551234567".to_string(),
            role: String::new(),
            department: String::new(),
            schedule: None,
            photo: None,
        };
        let errors = draft.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("role"));
        assert!(errors.field_errors().contains_key("department"));
    }
}
