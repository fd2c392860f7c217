//! Invoice generation handlers.
//!
//! Each generation endpoint runs the precondition ladder first, then
//! performs its writes one by one: bill insert, proposal stamp, item
//! stamps. There is no transaction around the sequence and no lock around
//! the eligibility check, so two concurrent requests can both pass the
//! "not generated yet" check; the failure window between insert and stamp
//! is likewise observable. Both are accepted properties of this surface.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    domain::generation::{
        plan_first_recurring_invoice, plan_standard_invoice, plan_upfront_invoice, GenerationError,
        InvoicePlan,
    },
    domain::invoice_number::{InvoiceSuffix, ProposalNumber},
    domain::payment_terms::PaymentShape,
    dtos::BillResponse,
    middleware::AuthContext,
    models::{Bill, CreateBill, Proposal},
    services::metrics::{BILLS_TOTAL, BILL_AMOUNT_TOTAL, ERRORS_TOTAL},
    AppState,
};

/// Generate the upfront invoice for a proposal. One-shot: succeeds at most
/// once per proposal.
pub async fn generate_upfront_invoice(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(proposal_id): Path<Uuid>,
) -> Result<(StatusCode, Json<BillResponse>), AppError> {
    require_billing_role(&auth)?;
    let proposal = load_proposal(&state, proposal_id).await?;

    let term = state.db.proposal_level_term(proposal_id).await?;
    let has_upfront_bill = state.db.has_upfront_bill(proposal_id).await?;

    let plan = plan_upfront_invoice(&proposal, term.as_ref(), has_upfront_bill)
        .map_err(precondition)?;

    let invoice_number =
        allocate_number(&state, &proposal, Some(InvoiceSuffix::Upfront)).await?;

    tracing::info!(
        proposal_id = %proposal_id,
        user_id = %auth.user_id,
        invoice_number = %invoice_number,
        amount = %plan.breakdown.final_amount,
        "Generating upfront invoice"
    );

    let bill = insert_bill(&state, &proposal, &plan, invoice_number, true, None).await?;

    record_bill_metrics(&bill, "upfront");
    notify(&state, &bill).await;

    Ok((StatusCode::CREATED, Json(bill.into())))
}

/// Generate the first recurring invoice for a proposal. A one-time unlock;
/// later recurring invoices are raised manually.
pub async fn generate_first_recurring_invoice(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(proposal_id): Path<Uuid>,
) -> Result<(StatusCode, Json<BillResponse>), AppError> {
    require_billing_role(&auth)?;
    let proposal = load_proposal(&state, proposal_id).await?;
    let items = state.db.list_proposal_items(proposal_id).await?;

    let plan = plan_first_recurring_invoice(&proposal, &items).map_err(precondition)?;

    let invoice_number =
        allocate_number(&state, &proposal, Some(InvoiceSuffix::FirstRecurring)).await?;

    tracing::info!(
        proposal_id = %proposal_id,
        user_id = %auth.user_id,
        invoice_number = %invoice_number,
        amount = %plan.breakdown.final_amount,
        "Generating first recurring invoice"
    );

    let bill = insert_bill(&state, &proposal, &plan, invoice_number, false, None).await?;

    // Stamp the unlock after the insert: proposal first, then every
    // recurring item. A failure part-way leaves the bill in place with
    // stamps missing, which shows up in reconciliation.
    let stamped_at = Utc::now();
    state
        .db
        .stamp_recurring_generated(proposal_id, stamped_at)
        .await?;
    for item_id in &plan.recurring_item_ids {
        state
            .db
            .stamp_item_recurring_generated(*item_id, stamped_at)
            .await?;
    }

    record_bill_metrics(&bill, "first_recurring");
    notify(&state, &bill).await;

    Ok((StatusCode::CREATED, Json(bill.into())))
}

/// Generate an ordinary full-amount invoice, numbered by probing the
/// proposal's existing bills.
pub async fn generate_invoice(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(proposal_id): Path<Uuid>,
) -> Result<(StatusCode, Json<BillResponse>), AppError> {
    require_billing_role(&auth)?;
    let proposal = load_proposal(&state, proposal_id).await?;

    let plan = plan_standard_invoice(&proposal).map_err(precondition)?;

    let invoice_number = allocate_number(&state, &proposal, None).await?;

    // An ordinary invoice falls due on the term's balance date, when the
    // arrangement names one.
    let due_date = match state.db.proposal_level_term(proposal_id).await? {
        Some(term) => match PaymentShape::classify(&term) {
            PaymentShape::OneTime { due_date } => due_date,
            _ => None,
        },
        None => None,
    };

    tracing::info!(
        proposal_id = %proposal_id,
        user_id = %auth.user_id,
        invoice_number = %invoice_number,
        amount = %plan.breakdown.final_amount,
        "Generating invoice"
    );

    let bill = insert_bill(&state, &proposal, &plan, invoice_number, false, due_date).await?;

    record_bill_metrics(&bill, "standard");
    notify(&state, &bill).await;

    Ok((StatusCode::CREATED, Json(bill.into())))
}

/// List a proposal's bills.
pub async fn list_bills(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(proposal_id): Path<Uuid>,
) -> Result<Json<Vec<BillResponse>>, AppError> {
    load_proposal(&state, proposal_id).await?;
    let bills = state.db.list_bills(proposal_id).await?;
    Ok(Json(bills.into_iter().map(BillResponse::from).collect()))
}

/// Get a bill by ID.
pub async fn get_bill(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(bill_id): Path<Uuid>,
) -> Result<Json<BillResponse>, AppError> {
    let bill = state
        .db
        .get_bill(bill_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Bill not found")))?;
    Ok(Json(bill.into()))
}

fn require_billing_role(auth: &AuthContext) -> Result<(), AppError> {
    if !auth.role.can_manage_billing() {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Clients cannot generate invoices"
        )));
    }
    Ok(())
}

async fn load_proposal(state: &AppState, proposal_id: Uuid) -> Result<Proposal, AppError> {
    state
        .db
        .get_proposal(proposal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Proposal not found")))
}

fn precondition(err: GenerationError) -> AppError {
    ERRORS_TOTAL.with_label_values(&["precondition"]).inc();
    AppError::BadRequest(anyhow::anyhow!("{}", err))
}

/// Derive the invoice number: a type suffix on the proposal number, a probed
/// sequence suffix when `suffix` is `None`, or the date-based fallback when
/// the proposal has no number at all. Collision handling is a single
/// point-read before insert; concurrent generators can still race it, and
/// the unique index on bills turns the loser into a conflict.
async fn allocate_number(
    state: &AppState,
    proposal: &Proposal,
    suffix: Option<InvoiceSuffix>,
) -> Result<String, AppError> {
    let candidate = match proposal.proposal_number.as_deref() {
        Some(raw) => {
            let parsed = ProposalNumber::parse(raw);
            match suffix {
                Some(suffix) => parsed.invoice_number(suffix),
                None => {
                    let existing = state.db.list_bill_numbers(proposal.proposal_id).await?;
                    parsed.next_sequential_number(&existing)
                }
            }
        }
        None => {
            let count = state.db.count_bills(proposal.proposal_id).await?;
            format!("INV-{}-{}", Utc::now().format("%Y"), count + 1)
        }
    };

    if state.db.invoice_number_exists(&candidate).await? {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Invoice number '{}' already exists",
            candidate
        )));
    }

    Ok(candidate)
}

async fn insert_bill(
    state: &AppState,
    proposal: &Proposal,
    plan: &InvoicePlan,
    invoice_number: String,
    is_upfront_payment: bool,
    due_date: Option<chrono::NaiveDate>,
) -> Result<Bill, AppError> {
    state
        .db
        .create_bill(&CreateBill {
            proposal_id: proposal.proposal_id,
            client_id: proposal.client_id,
            invoice_number,
            description: Some(plan.description.clone()),
            currency: proposal.currency.clone(),
            subtotal: plan.base_amount,
            discount_value: plan.breakdown.discount_value,
            tax_amount: plan.breakdown.tax_amount,
            amount: plan.breakdown.final_amount,
            tax_inclusive: proposal.tax_inclusive,
            tax_rate: proposal.tax_rate,
            discount_percent: proposal.client_discount_percent,
            discount_amount: proposal.client_discount_amount,
            is_upfront_payment,
            issue_date: Utc::now().date_naive(),
            due_date,
        })
        .await
}

fn record_bill_metrics(bill: &Bill, kind: &str) {
    BILLS_TOTAL.with_label_values(&[kind]).inc();
    if let Some(amount) = rust_decimal::prelude::ToPrimitive::to_f64(&bill.amount) {
        BILL_AMOUNT_TOTAL
            .with_label_values(&[bill.currency.as_str()])
            .inc_by(amount);
    }
}

async fn notify(state: &AppState, bill: &Bill) {
    if let Err(e) = state.mailer.send_bill_notice(bill).await {
        tracing::warn!(bill_id = %bill.bill_id, error = %e, "Failed to send bill notice");
    }
}
