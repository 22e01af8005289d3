//! Payment records
//!
//! A payment settles part or all of exactly one billing period. A lump sum
//! spread over several months is stored as one payment per month touched,
//! each tagged with the month it was applied to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Amount, BillingMonth, BillingPeriodId, PaymentId, TenantId, UnitId};
use crate::error::BillingError;

/// How the money arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    /// M-Pesa and similar mobile wallets
    #[serde(alias = "mpesa")]
    MobileMoney,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::MobileMoney => "mobile_money",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "mobile_money" | "mobile-money" | "mpesa" => Ok(PaymentMethod::MobileMoney),
            other => Err(BillingError::validation(format!("Unsupported payment method: {}", other))),
        }
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Counts toward settlement
    Confirmed,
    /// Withdrawn; ignored by settlement
    Reversed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Reversed => "reversed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(PaymentStatus::Confirmed),
            "reversed" => Ok(PaymentStatus::Reversed),
            other => Err(BillingError::validation(format!("Unknown payment status: {}", other))),
        }
    }
}

/// A payment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// Period this payment settles
    pub period_id: BillingPeriodId,
    pub unit_id: UnitId,
    pub payer_id: Option<TenantId>,
    pub method: PaymentMethod,
    pub amount: Amount,
    /// Mobile money transaction code or receipt number
    pub tx_ref: Option<String>,
    /// Payer phone for mobile money
    pub msisdn: Option<String>,
    /// Month the amount was applied to
    pub target: BillingMonth,
    pub paid_at: DateTime<Utc>,
    pub status: PaymentStatus,
    pub notes: Option<String>,
}

impl Payment {
    /// Creates a confirmed payment against a period
    pub fn confirmed(
        period_id: BillingPeriodId,
        unit_id: UnitId,
        target: BillingMonth,
        amount: Amount,
        method: PaymentMethod,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            period_id,
            unit_id,
            payer_id: None,
            method,
            amount,
            tx_ref: None,
            msisdn: None,
            target,
            paid_at: Utc::now(),
            status: PaymentStatus::Confirmed,
            notes: None,
        }
    }

    pub fn with_payer(mut self, payer_id: TenantId) -> Self {
        self.payer_id = Some(payer_id);
        self
    }

    /// Sets the external transaction reference
    pub fn with_reference(mut self, tx_ref: Option<String>) -> Self {
        self.tx_ref = tx_ref;
        self
    }

    pub fn with_msisdn(mut self, msisdn: Option<String>) -> Self {
        self.msisdn = msisdn;
        self
    }

    pub fn with_paid_at(mut self, paid_at: DateTime<Utc>) -> Self {
        self.paid_at = paid_at;
        self
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == PaymentStatus::Confirmed
    }

    /// Reverses the payment
    ///
    /// # Errors
    ///
    /// `BillingError::Validation` if the payment is already reversed
    pub fn reverse(&mut self, reason: &str) -> Result<(), BillingError> {
        if !self.is_confirmed() {
            return Err(BillingError::validation(format!("Payment {} is already reversed", self.id)));
        }
        self.status = PaymentStatus::Reversed;
        self.notes = Some(format!("Reversed: {}", reason));
        Ok(())
    }
}
