//! Proposal line item model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How a line item is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingMethod {
    Fixed,
    Hourly,
    Recurring,
}

impl BillingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingMethod::Fixed => "fixed",
            BillingMethod::Hourly => "hourly",
            BillingMethod::Recurring => "recurring",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "hourly" => BillingMethod::Hourly,
            "recurring" => BillingMethod::Recurring,
            _ => BillingMethod::Fixed,
        }
    }
}

/// Line item belonging to a proposal.
///
/// Recurring fields are only meaningful when `billing_method` is recurring.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProposalItem {
    pub item_id: Uuid,
    pub proposal_id: Uuid,
    pub description: String,
    pub billing_method: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Option<Decimal>,
    pub recurring_enabled: bool,
    pub recurring_frequency: Option<String>,
    pub last_recurring_invoice_date: Option<DateTime<Utc>>,
    pub sort_order: i32,
    pub created_utc: DateTime<Utc>,
}

impl ProposalItem {
    pub fn billing_method(&self) -> BillingMethod {
        BillingMethod::from_string(&self.billing_method)
    }

    /// True when this item contributes to the first recurring invoice.
    pub fn is_recurring(&self) -> bool {
        self.billing_method() == BillingMethod::Recurring && self.recurring_enabled
    }
}

/// Input for creating a proposal item.
#[derive(Debug, Clone)]
pub struct CreateProposalItem {
    pub proposal_id: Uuid,
    pub description: String,
    pub billing_method: BillingMethod,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Option<Decimal>,
    pub recurring_enabled: bool,
    pub recurring_frequency: Option<String>,
    pub sort_order: i32,
}
