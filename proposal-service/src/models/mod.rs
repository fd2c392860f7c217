//! Domain models for proposal-service.

mod bill;
mod milestone;
mod payment_term;
mod proposal;
mod proposal_item;

pub use bill::{Bill, BillStatus, CreateBill};
pub use milestone::{CreateMilestone, Milestone};
pub use payment_term::{
    BalancePaymentType, CreatePaymentTerm, InstallmentType, PaymentTerm, RecurringFrequency,
    UpfrontType,
};
pub use proposal::{ClientApprovalStatus, CreateProposal, Proposal, ProposalStatus};
pub use proposal_item::{BillingMethod, CreateProposalItem, ProposalItem};
