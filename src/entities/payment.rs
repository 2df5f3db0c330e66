//! Payment records, their status lifecycle and creation drafts

use crate::core::entity::EntityId;
use crate::core::field::{calendar_date, non_negative_amount, optional_calendar_date};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Payment status
///
/// Transitions are admin-triggered:
///
/// ```text
/// pending ──▶ paid ◀── overdue
///    │  ▲               ▲
///    │  └── paid        │
///    └──────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[serde(alias = "PENDING", alias = "Pending")]
    Pending,
    #[serde(alias = "PAID", alias = "Paid")]
    Paid,
    #[serde(alias = "OVERDUE", alias = "Overdue")]
    Overdue,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        }
    }

    /// Whether `next` is an expected transition from this status
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Overdue)
                | (PaymentStatus::Overdue, PaymentStatus::Paid)
                | (PaymentStatus::Paid, PaymentStatus::Pending)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "overdue" => Ok(PaymentStatus::Overdue),
            other => Err(format!("unknown payment status '{}'", other)),
        }
    }
}

/// Delivery channel for payment reminders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderChannel {
    #[serde(alias = "EMAIL")]
    Email,
    #[serde(alias = "WHATSAPP")]
    Whatsapp,
}

impl ReminderChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderChannel::Email => "email",
            ReminderChannel::Whatsapp => "whatsapp",
        }
    }
}

impl fmt::Display for ReminderChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reminder configuration attached to a payment
///
/// `days` are lead-times before the due date (0 = on the due date).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default)]
    pub types: BTreeSet<ReminderChannel>,
    #[serde(default)]
    pub days: BTreeSet<u32>,
}

impl ReminderConfig {
    pub fn new(
        types: impl IntoIterator<Item = ReminderChannel>,
        days: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            types: types.into_iter().collect(),
            days: days.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() || self.days.is_empty()
    }
}

/// Denormalized snapshot of the member owning a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// A payment as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<EntityId>,
    pub member: MemberSnapshot,
    #[serde(with = "non_negative_amount")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub payment_type: String,
    #[serde(with = "calendar_date")]
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<ReminderConfig>,
    #[serde(
        default,
        with = "optional_calendar_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_date: Option<NaiveDate>,
}

impl Payment {
    /// The owning member id, from the flat field or the embedded snapshot
    pub fn owner_id(&self) -> Option<&EntityId> {
        self.member_id.as_ref().or(self.member.id.as_ref())
    }

    /// Signed number of days from `today` until the due date
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.due_date < today
    }
}

/// Creation payload for `POST /payments`
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    #[validate(custom(function = "validate_member_id"))]
    pub member_id: EntityId,
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Please select a payment type."))]
    pub payment_type: String,
    #[serde(with = "calendar_date")]
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<ReminderConfig>,
}

impl NewPayment {
    pub fn new(
        member_id: impl Into<EntityId>,
        amount: Decimal,
        payment_type: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            amount,
            payment_type: payment_type.into(),
            due_date,
            description: None,
            reminders: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach reminders; an empty configuration is dropped
    pub fn with_reminders(mut self, reminders: ReminderConfig) -> Self {
        self.reminders = (!reminders.is_empty()).then_some(reminders);
        self
    }
}

fn validate_member_id(id: &EntityId) -> Result<(), validator::ValidationError> {
    if id.is_empty() {
        let mut err = validator::ValidationError::new("required");
        err.message = Some("Please select a member.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_amount(amount: &Decimal) -> Result<(), validator::ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        let mut err = validator::ValidationError::new("non_negative");
        err.message = Some("Amount must not be negative.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_payment_from_backend_shape() {
        let payment: Payment = serde_json::from_value(json!({
            "id": 12,
            "member": {"id": 3, "name": "John Doe", "email": "john@example.com", "phone": "5551234567", "status": "active"},
            "amount": 59.9,
            "type": "MEMBERSHIP",
            "dueDate": "2024-03-01",
            "status": "PENDING",
            "description": null
        }))
        .unwrap();

        assert_eq!(payment.id.as_str(), "12");
        assert_eq!(payment.owner_id().map(EntityId::as_str), Some("3"));
        assert_eq!(payment.amount, Decimal::new(599, 1));
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.due_date, date(2024, 3, 1));
        assert!(payment.reminders.is_none());
    }

    #[test]
    fn test_payment_from_frontend_shape() {
        let payment: Payment = serde_json::from_value(json!({
            "id": "p-1",
            "memberId": "m-1",
            "member": {"name": "Jane Smith", "email": "jane@example.com", "phone": "5550000000"},
            "amount": "120.00",
            "type": "personal-training",
            "dueDate": "2024-03-01T00:00:00.000Z",
            "status": "overdue",
            "reminders": {"types": ["email", "whatsapp"], "days": [7, 3, 3]}
        }))
        .unwrap();

        assert_eq!(payment.owner_id().map(EntityId::as_str), Some("m-1"));
        let reminders = payment.reminders.unwrap();
        assert_eq!(reminders.types.len(), 2);
        assert_eq!(reminders.days.into_iter().collect::<Vec<_>>(), vec![3, 7]);
    }

    #[test]
    fn test_payment_rejects_bad_status_and_negative_amount() {
        let base = json!({
            "id": 1,
            "member": {"name": "A"},
            "amount": 10,
            "type": "fee",
            "dueDate": "2024-01-01",
            "status": "refunded"
        });
        assert!(serde_json::from_value::<Payment>(base.clone()).is_err());

        let mut negative = base;
        negative["status"] = json!("paid");
        negative["amount"] = json!(-5);
        assert!(serde_json::from_value::<Payment>(negative).is_err());
    }

    #[test]
    fn test_payment_rejects_wrapping_date_parts() {
        let mut payment = json!({
            "id": 1,
            "member": {"name": "A"},
            "amount": 10,
            "type": "fee",
            "dueDate": [2024, 1, 15],
            "status": "pending"
        });
        assert_eq!(
            serde_json::from_value::<Payment>(payment.clone()).unwrap().due_date,
            date(2024, 1, 15)
        );

        payment["dueDate"] = json!([2024, 4294967297u64, 15]);
        assert!(serde_json::from_value::<Payment>(payment).is_err());
    }

    #[test]
    fn test_status_transitions() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Overdue));
        assert!(Overdue.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Overdue));
        assert!(!Overdue.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Paid));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("PAID".parse::<PaymentStatus>(), Ok(PaymentStatus::Paid));
        assert!("all".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn test_new_payment_payload() {
        let draft = NewPayment::new("m-1", Decimal::new(5000, 2), "membership", date(2024, 2, 1))
            .with_description("February")
            .with_reminders(ReminderConfig::new([ReminderChannel::Email], [3]));

        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["memberId"], "m-1");
        assert_eq!(value["type"], "membership");
        assert_eq!(value["dueDate"], "2024-02-01");
        assert_eq!(value["reminders"]["types"], json!(["email"]));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_new_payment_validation() {
        let draft = NewPayment::new("", Decimal::new(-100, 2), "", date(2024, 2, 1));
        let errors = draft.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("member_id"));
        assert!(fields.contains_key("amount"));
        assert!(fields.contains_key("payment_type"));
    }

    #[test]
    fn test_empty_reminders_dropped() {
        let draft = NewPayment::new("m-1", Decimal::ONE, "fee", date(2024, 2, 1))
            .with_reminders(ReminderConfig::new([ReminderChannel::Email], []));
        assert!(draft.reminders.is_none());
    }
}
