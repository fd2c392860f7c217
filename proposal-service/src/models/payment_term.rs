//! Payment term model.
//!
//! A proposal carries zero or more payment term rows. Exactly one is
//! proposal-level (`proposal_item_id IS NULL`) and is authoritative for
//! top-level display; the creation handlers synthesize a default one-time
//! row when the caller supplies none.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How the upfront slice is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpfrontType {
    Percent,
    FixedAmount,
}

impl UpfrontType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpfrontType::Percent => "percent",
            UpfrontType::FixedAmount => "fixed_amount",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "fixed_amount" => UpfrontType::FixedAmount,
            _ => UpfrontType::Percent,
        }
    }
}

/// How the balance after an upfront payment falls due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePaymentType {
    MilestoneBased,
    TimeBased,
    FullUpfront,
}

impl BalancePaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalancePaymentType::MilestoneBased => "milestone_based",
            BalancePaymentType::TimeBased => "time_based",
            BalancePaymentType::FullUpfront => "full_upfront",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "milestone_based" => BalancePaymentType::MilestoneBased,
            "full_upfront" => BalancePaymentType::FullUpfront,
            _ => BalancePaymentType::TimeBased,
        }
    }
}

/// Installment schedule kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentType {
    TimeBased,
    MilestoneBased,
}

impl InstallmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallmentType::TimeBased => "time_based",
            InstallmentType::MilestoneBased => "milestone_based",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "milestone_based" => InstallmentType::MilestoneBased,
            _ => InstallmentType::TimeBased,
        }
    }
}

/// Recurring billing cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringFrequency {
    Monthly1,
    Monthly3,
    Monthly6,
    Yearly12,
    Custom,
}

impl RecurringFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringFrequency::Monthly1 => "monthly_1",
            RecurringFrequency::Monthly3 => "monthly_3",
            RecurringFrequency::Monthly6 => "monthly_6",
            RecurringFrequency::Yearly12 => "yearly_12",
            RecurringFrequency::Custom => "custom",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "monthly_3" => RecurringFrequency::Monthly3,
            "monthly_6" => RecurringFrequency::Monthly6,
            "yearly_12" => RecurringFrequency::Yearly12,
            "custom" => RecurringFrequency::Custom,
            _ => RecurringFrequency::Monthly1,
        }
    }
}

/// One payment-shape record for a proposal or a proposal item.
///
/// The optional field groups encode mutually possible shapes; precedence
/// between them is decided by the payment-term resolver, not here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentTerm {
    pub term_id: Uuid,
    pub proposal_id: Uuid,
    /// NULL for the proposal-level row.
    pub proposal_item_id: Option<Uuid>,
    pub upfront_type: Option<String>,
    pub upfront_value: Option<Decimal>,
    pub balance_payment_type: Option<String>,
    pub balance_due_date: Option<NaiveDate>,
    pub installment_type: Option<String>,
    pub installment_count: Option<i32>,
    pub installment_frequency: Option<String>,
    pub installment_maturity_dates: Option<Vec<NaiveDate>>,
    pub recurring_enabled: bool,
    pub recurring_frequency: Option<String>,
    pub recurring_custom_months: Option<i32>,
    pub recurring_start_date: Option<NaiveDate>,
    /// Plain id array, not a relational join.
    pub milestone_ids: Vec<Uuid>,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a payment term.
#[derive(Debug, Clone, Default)]
pub struct CreatePaymentTerm {
    pub proposal_item_id: Option<Uuid>,
    pub upfront_type: Option<UpfrontType>,
    pub upfront_value: Option<Decimal>,
    pub balance_payment_type: Option<BalancePaymentType>,
    pub balance_due_date: Option<NaiveDate>,
    pub installment_type: Option<InstallmentType>,
    pub installment_count: Option<i32>,
    pub installment_frequency: Option<String>,
    pub installment_maturity_dates: Option<Vec<NaiveDate>>,
    pub recurring_enabled: bool,
    pub recurring_frequency: Option<RecurringFrequency>,
    pub recurring_custom_months: Option<i32>,
    pub recurring_start_date: Option<NaiveDate>,
    pub milestone_ids: Vec<Uuid>,
}

impl CreatePaymentTerm {
    /// The synthesized proposal-level term: one-time, no upfront, no
    /// recurring. Inserted whenever a caller supplies no proposal-level row.
    pub fn default_one_time() -> Self {
        Self::default()
    }
}
