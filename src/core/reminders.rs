//! Date driven planning: which reminders to send today, which pending
//! payments have slipped past their due date and which memberships are
//! about to expire
//!
//! Everything here is pure. Dispatch lives in the payment store.

use crate::core::entity::EntityId;
use crate::entities::{Member, Payment, PaymentStatus, ReminderChannel};
use chrono::NaiveDate;
use serde::Serialize;

/// Lead-time (in days) of the default early reminder
pub const DEFAULT_EARLY_REMINDER_DAYS: i64 = 3;

/// How far ahead membership expiries are watched
pub const MEMBERSHIP_EXPIRY_WINDOW_DAYS: i64 = 30;

/// One reminder to send
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedReminder {
    pub payment_id: EntityId,
    pub member_name: String,
    pub channel: ReminderChannel,
    /// Days left until the due date (0 = due today)
    pub days_before_due: u32,
}

/// Plan the reminders due on `today`
///
/// Only pending payments are considered. A payment with its own reminder
/// configuration gets one reminder per configured channel when the days
/// left match a configured lead-time. Otherwise the default schedule
/// applies: email three days ahead, email and WhatsApp on the due date.
pub fn plan_reminders(payments: &[Payment], today: NaiveDate) -> Vec<PlannedReminder> {
    let mut planned = Vec::new();

    for payment in payments {
        if payment.status != PaymentStatus::Pending {
            continue;
        }
        let days_left = payment.days_until_due(today);
        if days_left < 0 {
            continue;
        }

        let channels: Vec<ReminderChannel> = match &payment.reminders {
            Some(config) if !config.is_empty() => {
                if config.days.contains(&(days_left as u32)) {
                    config.types.iter().copied().collect()
                } else {
                    Vec::new()
                }
            }
            _ => match days_left {
                DEFAULT_EARLY_REMINDER_DAYS => vec![ReminderChannel::Email],
                0 => vec![ReminderChannel::Email, ReminderChannel::Whatsapp],
                _ => Vec::new(),
            },
        };

        planned.extend(channels.into_iter().map(|channel| PlannedReminder {
            payment_id: payment.id.clone(),
            member_name: payment.member.name.clone(),
            channel,
            days_before_due: days_left as u32,
        }));
    }

    planned
}

/// One membership expiry reminder to send
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMembershipReminder {
    pub member_id: EntityId,
    pub member_name: String,
    pub channel: ReminderChannel,
    /// Days left until the membership expires (0 = expires today)
    pub days_before_expiry: u32,
}

/// Members whose membership expires between `today` and `today + within_days`,
/// both inclusive, in collection order
///
/// Members without an expiry date and already expired memberships are
/// skipped.
pub fn expiring_members(
    members: &[Member],
    today: NaiveDate,
    within_days: i64,
) -> Vec<&Member> {
    let window = 0..=within_days;
    members
        .iter()
        .filter(|m| m.days_until_expiry(today).is_some_and(|days| window.contains(&days)))
        .collect()
}

/// Plan the membership expiry reminders due on `today`
///
/// Email 30 days ahead, then email and WhatsApp 7 days ahead, 3 days ahead
/// and on the expiry date itself.
pub fn plan_membership_reminders(
    members: &[Member],
    today: NaiveDate,
) -> Vec<PlannedMembershipReminder> {
    let mut planned = Vec::new();

    for member in expiring_members(members, today, MEMBERSHIP_EXPIRY_WINDOW_DAYS) {
        let Some(days_left) = member.days_until_expiry(today) else {
            continue;
        };
        let channels: &[ReminderChannel] = match days_left {
            MEMBERSHIP_EXPIRY_WINDOW_DAYS => &[ReminderChannel::Email],
            7 | 3 | 0 => &[ReminderChannel::Email, ReminderChannel::Whatsapp],
            _ => &[],
        };

        planned.extend(channels.iter().map(|&channel| PlannedMembershipReminder {
            member_id: member.id.clone(),
            member_name: member.name.clone(),
            channel,
            days_before_expiry: days_left as u32,
        }));
    }

    planned
}

/// Pending payments whose due date is before `today`, in collection order
pub fn overdue_candidates(payments: &[Payment], today: NaiveDate) -> Vec<EntityId> {
    payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Pending && p.is_past_due(today))
        .map(|p| p.id.clone())
        .collect()
}
