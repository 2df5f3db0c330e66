//! Payment filters, the filtered-view derivation and list envelopes

use crate::entities::{Payment, PaymentStatus};
use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Active predicates over the payment collection
///
/// `None` means no constraint. A payment with no filters set always matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFilters {
    /// Case-insensitive substring of the member name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl PaymentFilters {
    pub fn is_empty(&self) -> bool {
        self.member_name.is_none()
            && self.status.is_none()
            && self.payment_type.is_none()
            && self.due_date.is_none()
    }

    /// Apply a single-field update, normalizing "all" to no constraint
    pub fn apply(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::MemberName(sel) => self.member_name = sel.into_text(),
            FilterUpdate::Status(sel) => self.status = sel.into_option(),
            FilterUpdate::PaymentType(sel) => self.payment_type = sel.into_text(),
            FilterUpdate::DueDate(sel) => self.due_date = sel.into_option(),
        }
    }

    /// Whether `payment` satisfies every active predicate
    pub fn matches(&self, payment: &Payment) -> bool {
        let matches_name = self.member_name.as_ref().is_none_or(|needle| {
            payment
                .member
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let matches_status = self.status.is_none_or(|s| payment.status == s);
        let matches_type = self
            .payment_type
            .as_ref()
            .is_none_or(|t| &payment.payment_type == t);
        let matches_due_date = self.due_date.is_none_or(|d| payment.due_date == d);

        matches_name && matches_status && matches_type && matches_due_date
    }
}

/// A filter value or the "all" sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Selection<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }
}

impl Selection<String> {
    /// Blank text constrains nothing, same as "all"
    fn into_text(self) -> Option<String> {
        self.into_option().filter(|s| !s.trim().is_empty())
    }
}

impl From<&str> for Selection<String> {
    fn from(value: &str) -> Self {
        if value == "all" {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }
}

impl From<String> for Selection<String> {
    fn from(value: String) -> Self {
        Selection::from(value.as_str())
    }
}

impl From<PaymentStatus> for Selection<PaymentStatus> {
    fn from(value: PaymentStatus) -> Self {
        Selection::Only(value)
    }
}

impl From<Option<PaymentStatus>> for Selection<PaymentStatus> {
    fn from(value: Option<PaymentStatus>) -> Self {
        value.map_or(Selection::All, Selection::Only)
    }
}

impl From<NaiveDate> for Selection<NaiveDate> {
    fn from(value: NaiveDate) -> Self {
        Selection::Only(value)
    }
}

impl From<Option<NaiveDate>> for Selection<NaiveDate> {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map_or(Selection::All, Selection::Only)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Selection<NaiveDate> {
    /// Time-of-day is dropped; the date is taken in the timestamp's own zone
    fn from(value: DateTime<Tz>) -> Self {
        Selection::Only(value.date_naive())
    }
}

impl std::str::FromStr for Selection<PaymentStatus> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() || s == "all" {
            Ok(Selection::All)
        } else {
            s.parse().map(Selection::Only)
        }
    }
}

/// A single-field filter change
///
/// The key set is closed: an unknown filter name cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    MemberName(Selection<String>),
    Status(Selection<PaymentStatus>),
    PaymentType(Selection<String>),
    DueDate(Selection<NaiveDate>),
}

impl FilterUpdate {
    pub fn member_name(value: impl Into<Selection<String>>) -> Self {
        FilterUpdate::MemberName(value.into())
    }

    pub fn status(value: impl Into<Selection<PaymentStatus>>) -> Self {
        FilterUpdate::Status(value.into())
    }

    pub fn payment_type(value: impl Into<Selection<String>>) -> Self {
        FilterUpdate::PaymentType(value.into())
    }

    pub fn due_date(value: impl Into<Selection<NaiveDate>>) -> Self {
        FilterUpdate::DueDate(value.into())
    }

    /// Field name as used in logs
    pub fn key(&self) -> &'static str {
        match self {
            FilterUpdate::MemberName(_) => "memberName",
            FilterUpdate::Status(_) => "status",
            FilterUpdate::PaymentType(_) => "type",
            FilterUpdate::DueDate(_) => "dueDate",
        }
    }
}

/// Derive the filtered view: a stable subsequence of `payments`
pub fn apply_filters(payments: &[Payment], filters: &PaymentFilters) -> Vec<Payment> {
    if filters.is_empty() {
        return payments.to_vec();
    }
    payments
        .iter()
        .filter(|p| filters.matches(p))
        .cloned()
        .collect()
}

/// Paginated list envelope returned by list endpoints
///
/// A missing `content` field decodes as an empty page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    /// Zero-based page index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl<T> Page<T> {
    pub fn of(content: Vec<T>) -> Self {
        let total = content.len() as u64;
        Self {
            content,
            total_elements: Some(total),
            total_pages: Some(if total == 0 { 0 } else { 1 }),
            number: Some(0),
            size: Some(total),
        }
    }

    /// Whether the backend reports more records than this page carries
    pub fn is_partial(&self) -> bool {
        self.total_elements
            .is_some_and(|total| total > self.content.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::EntityId;
    use crate::entities::MemberSnapshot;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn payment(id: &str, name: &str, status: PaymentStatus, kind: &str, due: (i32, u32, u32)) -> Payment {
        Payment {
            id: EntityId::new(id),
            member_id: None,
            member: MemberSnapshot {
                id: None,
                name: name.to_string(),
                email: String::new(),
                phone: String::new(),
            },
            amount: Decimal::new(5000, 2),
            payment_type: kind.to_string(),
            due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap(),
            status,
            description: None,
            reminders: None,
            payment_date: None,
        }
    }

    fn sample() -> Vec<Payment> {
        vec![
            payment("1", "John Doe", PaymentStatus::Pending, "membership", (2024, 1, 15)),
            payment("2", "Jane Smith", PaymentStatus::Paid, "membership", (2024, 1, 20)),
            payment("3", "Johnny Walker", PaymentStatus::Overdue, "personal-training", (2024, 1, 15)),
            payment("4", "Ann Johnson", PaymentStatus::Pending, "locker", (2024, 2, 1)),
        ]
    }

    fn ids(payments: &[Payment]) -> Vec<&str> {
        payments.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_no_filters_is_identity() {
        let payments = sample();
        let filtered = apply_filters(&payments, &PaymentFilters::default());
        assert_eq!(filtered, payments);
    }

    #[test]
    fn test_member_name_is_case_insensitive_substring() {
        let mut filters = PaymentFilters::default();
        filters.apply(FilterUpdate::member_name("JOHN"));
        assert_eq!(ids(&apply_filters(&sample(), &filters)), vec!["1", "3", "4"]);
    }

    #[test]
    fn test_filters_combine_and_preserve_order() {
        let mut filters = PaymentFilters::default();
        filters.apply(FilterUpdate::member_name("john"));
        filters.apply(FilterUpdate::status(PaymentStatus::Pending));
        assert_eq!(ids(&apply_filters(&sample(), &filters)), vec!["1", "4"]);

        filters.apply(FilterUpdate::payment_type("locker"));
        assert_eq!(ids(&apply_filters(&sample(), &filters)), vec!["4"]);
    }

    #[test]
    fn test_due_date_ignores_time_of_day() {
        let mut filters = PaymentFilters::default();
        let evening = Utc.with_ymd_and_hms(2024, 1, 15, 21, 45, 0).unwrap();
        filters.apply(FilterUpdate::due_date(evening));
        assert_eq!(ids(&apply_filters(&sample(), &filters)), vec!["1", "3"]);
    }

    #[test]
    fn test_all_sentinel_clears_only_that_field() {
        let mut filters = PaymentFilters::default();
        filters.apply(FilterUpdate::member_name("john"));
        filters.apply(FilterUpdate::status(PaymentStatus::Paid));
        filters.apply(FilterUpdate::status("all".parse::<Selection<PaymentStatus>>().unwrap()));

        assert_eq!(filters.status, None);
        assert_eq!(filters.member_name.as_deref(), Some("john"));
    }

    #[test]
    fn test_all_and_blank_text_mean_unconstrained() {
        let mut filters = PaymentFilters::default();
        filters.apply(FilterUpdate::payment_type("locker"));
        filters.apply(FilterUpdate::payment_type("all"));
        assert_eq!(filters.payment_type, None);

        filters.apply(FilterUpdate::member_name("   "));
        assert_eq!(filters.member_name, None);
        assert!(filters.is_empty());
    }

    #[test]
    fn test_only_exact_all_is_the_sentinel() {
        let mut filters = PaymentFilters::default();
        filters.apply(FilterUpdate::member_name("All"));
        assert_eq!(filters.member_name.as_deref(), Some("All"));

        filters.apply(FilterUpdate::payment_type("ALL"));
        assert_eq!(filters.payment_type.as_deref(), Some("ALL"));
        assert!(apply_filters(&sample(), &filters).is_empty());

        assert!("All".parse::<Selection<PaymentStatus>>().is_err());
    }

    #[test]
    fn test_every_kept_row_matches_and_every_dropped_row_fails() {
        let payments = sample();
        let names = ["", "john", "smith", "x"];
        let statuses = [None, Some(PaymentStatus::Pending), Some(PaymentStatus::Paid)];
        let types = ["all", "membership", "locker"];

        for name in names {
            for status in statuses {
                for kind in types {
                    let mut filters = PaymentFilters::default();
                    filters.apply(FilterUpdate::member_name(name));
                    filters.apply(FilterUpdate::status(status));
                    filters.apply(FilterUpdate::payment_type(kind));

                    let kept = apply_filters(&payments, &filters);
                    for p in &payments {
                        assert_eq!(kept.contains(p), filters.matches(p));
                    }
                }
            }
        }
    }

    #[test]
    fn test_filters_serialize_for_export() {
        let mut filters = PaymentFilters::default();
        filters.apply(FilterUpdate::status(PaymentStatus::Overdue));
        filters.apply(FilterUpdate::due_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
        let value = serde_json::to_value(&filters).unwrap();
        assert_eq!(value, serde_json::json!({"status": "overdue", "dueDate": "2024-01-15"}));
    }

    #[test]
    fn test_page_missing_content_is_empty() {
        let page: Page<Payment> = serde_json::from_str(r#"{"totalElements": 0}"#).unwrap();
        assert!(page.content.is_empty());
        assert!(!page.is_partial());

        let page: Page<u32> = serde_json::from_str(r#"{"content":[1,2],"totalElements":40}"#).unwrap();
        assert!(page.is_partial());
    }
}
