//! Billing periods
//!
//! One billing period exists per unit per calendar month. The amount due is
//! copied from the unit's rent when the period is first referenced and never
//! changes afterwards.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Amount, BillingMonth, BillingPeriodId, CalendarError, UnitId};
use crate::error::BillingError;

/// Settlement state of a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Nothing received yet
    Pending,
    /// Something received, balance outstanding
    PartiallyPaid,
    /// Confirmed payments cover the amount due
    Paid,
}

impl PeriodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodStatus::Pending => "pending",
            PeriodStatus::PartiallyPaid => "partially_paid",
            PeriodStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PeriodStatus::Pending),
            "partially_paid" => Ok(PeriodStatus::PartiallyPaid),
            "paid" => Ok(PeriodStatus::Paid),
            other => Err(BillingError::validation(format!("Unknown period status: {}", other))),
        }
    }
}

/// The monthly rent obligation of one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub id: BillingPeriodId,
    pub unit_id: UnitId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Rent frozen at creation
    pub amount_due: Amount,
    pub due_date: NaiveDate,
    /// Cached settlement state; see `SettlementCalculator::recompute`
    pub status: PeriodStatus,
    pub created_at: DateTime<Utc>,
}

impl BillingPeriod {
    /// Opens a pending period for `month`
    pub fn open(unit_id: UnitId, month: BillingMonth, amount_due: Amount, due_day: u32) -> Self {
        Self {
            id: BillingPeriodId::new_v7(),
            unit_id,
            period_start: month.period_start(),
            period_end: month.period_end(),
            amount_due,
            due_date: month.due_date(due_day),
            status: PeriodStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Calendar month this period covers
    pub fn month(&self) -> Result<BillingMonth, CalendarError> {
        BillingMonth::from_date(self.period_start)
    }

    /// Returns true if the period covers exactly `month`
    pub fn covers(&self, month: BillingMonth) -> bool {
        self.period_start == month.period_start() && self.period_end == month.period_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_period_bounds() {
        let month = BillingMonth::new(2024, 2).unwrap();
        let period = BillingPeriod::open(UnitId::new_v7(), month, Amount::new(3500), 5);

        assert_eq!(period.period_start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(period.period_end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(period.due_date, NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
        assert_eq!(period.status, PeriodStatus::Pending);
        assert_eq!(period.month().unwrap(), month);
        assert!(period.covers(month));
        assert!(!period.covers(month.next().unwrap()));
    }

    #[test]
    fn test_due_date_clamped() {
        let month = BillingMonth::new(2023, 2).unwrap();
        let period = BillingPeriod::open(UnitId::new_v7(), month, Amount::new(3000), 31);
        assert_eq!(period.due_date, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [PeriodStatus::Pending, PeriodStatus::PartiallyPaid, PeriodStatus::Paid] {
            assert_eq!(status.as_str().parse::<PeriodStatus>().unwrap(), status);
        }
        assert!("settled".parse::<PeriodStatus>().is_err());
        assert_eq!(serde_json::to_string(&PeriodStatus::PartiallyPaid).unwrap(), "\"partially_paid\"");
    }
}
