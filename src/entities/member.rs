//! Gym members

use crate::core::entity::{Entity, EntityId, EntityLabels};
use crate::core::field::optional_calendar_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

static MEMBER_LABELS: EntityLabels = EntityLabels {
    plural: "members",
    short: "member",
    record: "member",
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub membership_type: String,
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
    #[serde(
        default,
        with = "optional_calendar_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub membership_expiry: Option<NaiveDate>,
}

impl Member {
    /// Days until the membership expires, negative once expired
    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.membership_expiry.map(|d| (d - today).num_days())
    }
}

impl Entity for Member {
    type Draft = NewMember;

    fn resource_name() -> &'static str {
        "members"
    }

    fn labels() -> &'static EntityLabels {
        &MEMBER_LABELS
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

/// Creation payload for `POST /members`
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 10, message = "Phone number must be at least 10 digits."))]
    pub phone: String,
    #[validate(length(min = 1, message = "Please select a membership type."))]
    pub membership_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}
