//! Proposal model for proposal-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Internal proposal workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Submitted => "submitted",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "submitted" => ProposalStatus::Submitted,
            "approved" => ProposalStatus::Approved,
            "rejected" => ProposalStatus::Rejected,
            _ => ProposalStatus::Draft,
        }
    }
}

/// Client-side acceptance decision, independent of the internal workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientApprovalStatus {
    Pending,
    Approved,
    Declined,
}

impl ClientApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientApprovalStatus::Pending => "pending",
            ClientApprovalStatus::Approved => "approved",
            ClientApprovalStatus::Declined => "declined",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "approved" => ClientApprovalStatus::Approved,
            "declined" => ClientApprovalStatus::Declined,
            _ => ClientApprovalStatus::Pending,
        }
    }
}

/// A billing arrangement offered to a client.
///
/// Tax and discount configuration lives here and is copied onto bills at
/// generation time, so later edits never alter an issued invoice.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Proposal {
    pub proposal_id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub proposal_number: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: String,
    pub tax_inclusive: bool,
    pub tax_rate: Option<Decimal>,
    pub client_discount_percent: Option<Decimal>,
    pub client_discount_amount: Option<Decimal>,
    pub status: String,
    pub client_approval_status: String,
    pub recurring_enabled: bool,
    pub recurring_frequency: Option<String>,
    /// Set once when the first recurring invoice is generated; never cleared.
    pub last_recurring_invoice_date: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Proposal {
    pub fn status(&self) -> ProposalStatus {
        ProposalStatus::from_string(&self.status)
    }

    pub fn client_approval(&self) -> ClientApprovalStatus {
        ClientApprovalStatus::from_string(&self.client_approval_status)
    }
}

/// Input for creating a proposal.
#[derive(Debug, Clone)]
pub struct CreateProposal {
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub proposal_number: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: String,
    pub tax_inclusive: bool,
    pub tax_rate: Option<Decimal>,
    pub client_discount_percent: Option<Decimal>,
    pub client_discount_amount: Option<Decimal>,
    pub recurring_enabled: bool,
    pub recurring_frequency: Option<String>,
}
