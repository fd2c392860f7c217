//! Request and response shapes for the HTTP surface.

use crate::models::{
    BalancePaymentType, Bill, BillingMethod, InstallmentType, Milestone, PaymentTerm, Proposal,
    ProposalItem, RecurringFrequency, UpfrontType,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProposalRequest {
    pub client_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub proposal_number: Option<String>,
    pub amount: Option<Decimal>,
    #[validate(length(min = 3, max = 3))]
    pub currency: String,
    #[serde(default)]
    pub tax_inclusive: bool,
    pub tax_rate: Option<Decimal>,
    pub client_discount_percent: Option<Decimal>,
    pub client_discount_amount: Option<Decimal>,
    #[serde(default)]
    pub recurring_enabled: bool,
    pub recurring_frequency: Option<RecurringFrequency>,
    #[serde(default)]
    pub items: Vec<CreateProposalItemRequest>,
    #[serde(default)]
    pub milestones: Vec<CreateMilestoneRequest>,
    #[serde(default)]
    pub payment_terms: Vec<PaymentTermRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProposalItemRequest {
    pub description: String,
    #[serde(default = "default_billing_method")]
    pub billing_method: BillingMethod,
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_price: Decimal,
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub recurring_enabled: bool,
    pub recurring_frequency: Option<RecurringFrequency>,
}

fn default_billing_method() -> BillingMethod {
    BillingMethod::Fixed
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Deserialize)]
pub struct CreateMilestoneRequest {
    pub name: String,
    pub amount: Option<Decimal>,
    pub percent: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
}

/// One payment-term row. Items and milestones created in the same request
/// are referenced by position, since their ids do not exist yet.
#[derive(Debug, Deserialize, Default)]
pub struct PaymentTermRequest {
    pub item_index: Option<usize>,
    pub upfront_type: Option<UpfrontType>,
    pub upfront_value: Option<Decimal>,
    pub balance_payment_type: Option<BalancePaymentType>,
    pub balance_due_date: Option<NaiveDate>,
    pub installment_type: Option<InstallmentType>,
    pub installment_count: Option<i32>,
    pub installment_frequency: Option<String>,
    pub installment_maturity_dates: Option<Vec<NaiveDate>>,
    #[serde(default)]
    pub recurring_enabled: bool,
    pub recurring_frequency: Option<RecurringFrequency>,
    pub recurring_custom_months: Option<i32>,
    pub recurring_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub milestone_indexes: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ReplacePaymentTermsRequest {
    pub payment_terms: Vec<PaymentTermRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ClientApprovalRequest {
    pub approved: bool,
}

#[derive(Debug, Serialize)]
pub struct ProposalDetailResponse {
    pub proposal: Proposal,
    pub items: Vec<ProposalItem>,
    pub payment_terms: Vec<PaymentTerm>,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Serialize)]
pub struct PaymentTermsDescriptionResponse {
    /// Classification tag: upfront, installment, recurring or one_time.
    pub shape: &'static str,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub bill_id: Uuid,
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
    pub status: String,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub created_utc: DateTime<Utc>,
}

impl From<Bill> for BillResponse {
    fn from(bill: Bill) -> Self {
        Self {
            bill_id: bill.bill_id,
            proposal_id: bill.proposal_id,
            client_id: bill.client_id,
            invoice_number: bill.invoice_number,
            description: bill.description,
            currency: bill.currency,
            subtotal: bill.subtotal,
            discount_value: bill.discount_value,
            tax_amount: bill.tax_amount,
            amount: bill.amount,
            tax_inclusive: bill.tax_inclusive,
            tax_rate: bill.tax_rate,
            discount_percent: bill.discount_percent,
            discount_amount: bill.discount_amount,
            is_upfront_payment: bill.is_upfront_payment,
            status: bill.status,
            issue_date: bill.issue_date,
            due_date: bill.due_date,
            created_utc: bill.created_utc,
        }
    }
}
