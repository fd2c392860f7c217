//! Bill (invoice) model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Bill status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Issued,
    Paid,
    Void,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Issued => "issued",
            BillStatus::Paid => "paid",
            BillStatus::Void => "void",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "paid" => BillStatus::Paid,
            "void" => BillStatus::Void,
            _ => BillStatus::Issued,
        }
    }
}

/// A generated financial document.
///
/// Tax and discount configuration is copied from the source proposal at
/// generation time; editing the proposal afterwards does not touch the bill.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bill {
    pub bill_id: Uuid,
    pub proposal_id: Uuid,
    pub client_id: Uuid,
    pub invoice_number: String,
    pub description: Option<String>,
    pub currency: String,
    /// Pre-discount, pre-tax base.
    pub subtotal: Decimal,
    pub discount_value: Decimal,
    pub tax_amount: Decimal,
    /// Final payable amount.
    pub amount: Decimal,
    pub tax_inclusive: bool,
    pub tax_rate: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    /// Distinguishes the upfront invoice from recurring and ordinary ones.
    pub is_upfront_payment: bool,
    pub status: String,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a bill.
#[derive(Debug, Clone)]
pub struct CreateBill {
    pub proposal_id: Uuid,
    pub client_id: Uuid,
    pub invoice_number: String,
    pub description: Option<String>,
    pub currency: String,
    pub subtotal: Decimal,
    pub discount_value: Decimal,
    pub tax_amount: Decimal,
    pub amount: Decimal,
    pub tax_inclusive: bool,
    pub tax_rate: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub is_upfront_payment: bool,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
}
