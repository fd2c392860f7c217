//! Invoice-generation eligibility and planning.
//!
//! Each plan function is a pure precondition ladder over loaded records: it
//! either refuses with a client-correctable reason or returns the amounts to
//! write. Handlers perform the writes afterwards, sequentially and without a
//! transaction; a crash between the bill insert and the proposal stamp
//! leaves an invoice whose unlock flag was never set, which operators must
//! reconcile by hand.

use crate::domain::billing::{BillingBreakdown, BillingInputs, compute_billing};
use crate::domain::payment_terms::PaymentShape;
use crate::models::{ClientApprovalStatus, PaymentTerm, Proposal, ProposalItem, ProposalStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// One-shot unlock state behind the nullable stamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurringInvoiceState {
    NotGenerated,
    Generated { at: DateTime<Utc> },
}

impl RecurringInvoiceState {
    pub fn from_stamp(stamp: Option<DateTime<Utc>>) -> Self {
        match stamp {
            None => RecurringInvoiceState::NotGenerated,
            Some(at) => RecurringInvoiceState::Generated { at },
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, RecurringInvoiceState::Generated { .. })
    }
}

/// Client-correctable refusals; every variant maps to a 400 with its reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Proposal has not been approved by the client")]
    ClientApprovalMissing,
    #[error("Proposal is not approved")]
    ProposalNotApproved,
    #[error("No upfront payment configured")]
    NoUpfrontConfigured,
    #[error("Upfront payment invoice already exists")]
    UpfrontAlreadyExists,
    #[error("Invalid upfront payment amount")]
    InvalidUpfrontAmount,
    #[error("This proposal does not have recurring billing enabled")]
    RecurringNotEnabled,
    #[error("First recurring invoice has already been generated")]
    RecurringAlreadyGenerated,
    #[error("Invalid invoice amount")]
    InvalidInvoiceAmount,
}

/// Amounts and description for a bill about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePlan {
    pub base_amount: Decimal,
    pub breakdown: BillingBreakdown,
    pub description: String,
    /// Recurring items to stamp after the bill insert; empty for
    /// upfront and standard invoices.
    pub recurring_item_ids: Vec<Uuid>,
}

/// Decide whether an upfront invoice may be generated now.
///
/// Eligible iff the client approved the proposal, the proposal-level term
/// carries upfront configuration, and no upfront bill exists yet. Terminal
/// once one does: there is no re-generation and no versioning.
pub fn plan_upfront_invoice(
    proposal: &Proposal,
    term: Option<&PaymentTerm>,
    has_upfront_bill: bool,
) -> Result<InvoicePlan, GenerationError> {
    if proposal.client_approval() != ClientApprovalStatus::Approved {
        return Err(GenerationError::ClientApprovalMissing);
    }

    let term = term.ok_or(GenerationError::NoUpfrontConfigured)?;
    let shape = PaymentShape::classify(term);
    let proposal_total = proposal.amount.unwrap_or(Decimal::ZERO);
    let base_amount = shape
        .upfront_amount(proposal_total)
        .ok_or(GenerationError::NoUpfrontConfigured)?;

    if has_upfront_bill {
        return Err(GenerationError::UpfrontAlreadyExists);
    }

    if base_amount <= Decimal::ZERO {
        return Err(GenerationError::InvalidUpfrontAmount);
    }

    let breakdown = compute_billing(
        base_amount,
        proposal.amount,
        &BillingInputs::from_proposal(proposal),
    );
    if breakdown.final_amount <= Decimal::ZERO {
        return Err(GenerationError::InvalidUpfrontAmount);
    }

    Ok(InvoicePlan {
        base_amount,
        breakdown,
        description: format!("Upfront payment for {}", proposal.title),
        recurring_item_ids: Vec::new(),
    })
}

/// Decide whether the first recurring invoice may be generated now.
///
/// This is a one-time unlock, not a scheduler: only the first recurring
/// invoice has programmatic support, and the stamp is never cleared.
pub fn plan_first_recurring_invoice(
    proposal: &Proposal,
    items: &[ProposalItem],
) -> Result<InvoicePlan, GenerationError> {
    if proposal.status() != ProposalStatus::Approved {
        return Err(GenerationError::ProposalNotApproved);
    }

    let recurring_items: Vec<&ProposalItem> = items.iter().filter(|i| i.is_recurring()).collect();

    if !proposal.recurring_enabled && recurring_items.is_empty() {
        return Err(GenerationError::RecurringNotEnabled);
    }

    if RecurringInvoiceState::from_stamp(proposal.last_recurring_invoice_date).is_generated() {
        return Err(GenerationError::RecurringAlreadyGenerated);
    }

    let (base_amount, description) = if proposal.recurring_enabled {
        (
            proposal.amount.unwrap_or(Decimal::ZERO),
            format!("Recurring billing for {}", proposal.title),
        )
    } else {
        let sum = recurring_items
            .iter()
            .filter_map(|i| i.amount)
            .fold(Decimal::ZERO, |acc, a| acc + a);
        let joined = recurring_items
            .iter()
            .map(|i| i.description.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        (sum, joined)
    };

    if base_amount <= Decimal::ZERO {
        return Err(GenerationError::InvalidInvoiceAmount);
    }

    let breakdown = compute_billing(
        base_amount,
        proposal.amount,
        &BillingInputs::from_proposal(proposal),
    );
    if breakdown.final_amount <= Decimal::ZERO {
        return Err(GenerationError::InvalidInvoiceAmount);
    }

    Ok(InvoicePlan {
        base_amount,
        breakdown,
        description,
        recurring_item_ids: recurring_items.iter().map(|i| i.item_id).collect(),
    })
}

/// Decide whether an ordinary full-amount invoice may be generated.
pub fn plan_standard_invoice(proposal: &Proposal) -> Result<InvoicePlan, GenerationError> {
    if proposal.status() != ProposalStatus::Approved {
        return Err(GenerationError::ProposalNotApproved);
    }

    let base_amount = proposal.amount.unwrap_or(Decimal::ZERO);
    if base_amount <= Decimal::ZERO {
        return Err(GenerationError::InvalidInvoiceAmount);
    }

    let breakdown = compute_billing(
        base_amount,
        proposal.amount,
        &BillingInputs::from_proposal(proposal),
    );
    if breakdown.final_amount <= Decimal::ZERO {
        return Err(GenerationError::InvalidInvoiceAmount);
    }

    Ok(InvoicePlan {
        base_amount,
        breakdown,
        description: format!("Invoice for {}", proposal.title),
        recurring_item_ids: Vec::new(),
    })
}
