//! Server-computed payment statistics

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trend indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

/// Signed, percentage-like trend string as sent by the server (`"+12.5%"`, `"-3%"`)
///
/// Only the sign is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trend(String);

impl Trend {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn direction(&self) -> TrendDirection {
        let raw = self.0.trim();
        if raw.starts_with('-') {
            return TrendDirection::Down;
        }
        let digits = raw.trim_start_matches('+').trim_end_matches('%').trim();
        match digits.parse::<f64>() {
            Ok(v) if v == 0.0 => TrendDirection::Flat,
            Ok(_) => TrendDirection::Up,
            Err(_) if raw.starts_with('+') => TrendDirection::Up,
            Err(_) => TrendDirection::Flat,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aggregate totals, counts and trends per status bucket
///
/// Authoritative copy lives on the server; the client never recomputes it
/// from its local collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStats {
    #[serde(default)]
    pub total_due: Decimal,
    #[serde(default)]
    pub overdue: Decimal,
    #[serde(default)]
    pub paid: Decimal,
    #[serde(default)]
    pub pending: Decimal,
    #[serde(default)]
    pub overdue_count: u64,
    #[serde(default)]
    pub paid_count: u64,
    #[serde(default)]
    pub pending_count: u64,
    #[serde(default)]
    pub due_trend: Trend,
    #[serde(default)]
    pub overdue_trend: Trend,
    #[serde(default)]
    pub paid_trend: Trend,
    #[serde(default)]
    pub pending_trend: Trend,
}

impl PaymentStats {
    /// Number of payments still owed (pending + overdue)
    pub fn due_count(&self) -> u64 {
        self.pending_count + self.overdue_count
    }
}
