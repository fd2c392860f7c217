//! Proposal lifecycle handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::payment_terms::PaymentShape,
    dtos::{
        ClientApprovalRequest, CreateProposalRequest, PaymentTermRequest,
        PaymentTermsDescriptionResponse, ProposalDetailResponse, ReplacePaymentTermsRequest,
    },
    middleware::AuthContext,
    models::{
        ClientApprovalStatus, CreateMilestone, CreatePaymentTerm, CreateProposal,
        CreateProposalItem, Milestone, Proposal, ProposalItem, ProposalStatus,
    },
    services::metrics::PROPOSALS_TOTAL,
    AppState,
};

/// Create a proposal with its items, milestones and payment terms.
///
/// Invariant: every proposal ends up with at least one proposal-level
/// payment term row; a default one-time term is synthesized when the caller
/// supplies none.
pub async fn create_proposal(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<CreateProposalRequest>,
) -> Result<(StatusCode, Json<ProposalDetailResponse>), AppError> {
    if !auth.role.can_manage_billing() {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Clients cannot create proposals"
        )));
    }

    payload.validate()?;
    check_percent_range("tax_rate", payload.tax_rate)?;
    check_percent_range("client_discount_percent", payload.client_discount_percent)?;

    let proposal = state
        .db
        .create_proposal(&CreateProposal {
            client_id: payload.client_id,
            title: payload.title.clone(),
            description: payload.description.clone(),
            proposal_number: payload.proposal_number.clone(),
            amount: payload.amount,
            currency: payload.currency.clone(),
            tax_inclusive: payload.tax_inclusive,
            tax_rate: payload.tax_rate,
            client_discount_percent: payload.client_discount_percent,
            client_discount_amount: payload.client_discount_amount,
            recurring_enabled: payload.recurring_enabled,
            recurring_frequency: payload.recurring_frequency.map(|f| f.as_str().to_string()),
        })
        .await?;

    tracing::info!(
        proposal_id = %proposal.proposal_id,
        user_id = %auth.user_id,
        "Creating proposal"
    );

    let mut items: Vec<ProposalItem> = Vec::with_capacity(payload.items.len());
    for (sort_order, item) in payload.items.iter().enumerate() {
        let created = state
            .db
            .create_proposal_item(&CreateProposalItem {
                proposal_id: proposal.proposal_id,
                description: item.description.clone(),
                billing_method: item.billing_method,
                quantity: item.quantity,
                unit_price: item.unit_price,
                amount: item.amount,
                recurring_enabled: item.recurring_enabled,
                recurring_frequency: item.recurring_frequency.map(|f| f.as_str().to_string()),
                sort_order: sort_order as i32,
            })
            .await?;
        items.push(created);
    }

    let mut milestones: Vec<Milestone> = Vec::with_capacity(payload.milestones.len());
    for (sort_order, milestone) in payload.milestones.iter().enumerate() {
        let created = state
            .db
            .create_milestone(&CreateMilestone {
                proposal_id: proposal.proposal_id,
                name: milestone.name.clone(),
                amount: milestone.amount,
                percent: milestone.percent,
                due_date: milestone.due_date,
                sort_order: sort_order as i32,
            })
            .await?;
        milestones.push(created);
    }

    let payment_terms = write_payment_terms(
        &state,
        proposal.proposal_id,
        &payload.payment_terms,
        &items,
        &milestones,
    )
    .await?;

    PROPOSALS_TOTAL
        .with_label_values(&[ProposalStatus::Draft.as_str()])
        .inc();

    Ok((
        StatusCode::CREATED,
        Json(ProposalDetailResponse {
            proposal,
            items,
            payment_terms,
            milestones,
        }),
    ))
}

/// Get a proposal with its items, payment terms and milestones.
pub async fn get_proposal(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(proposal_id): Path<Uuid>,
) -> Result<Json<ProposalDetailResponse>, AppError> {
    let proposal = load_proposal(&state, proposal_id).await?;
    let items = state.db.list_proposal_items(proposal_id).await?;
    let payment_terms = state.db.list_payment_terms(proposal_id).await?;
    let milestones = state.db.list_milestones(proposal_id).await?;

    Ok(Json(ProposalDetailResponse {
        proposal,
        items,
        payment_terms,
        milestones,
    }))
}

/// Replace a proposal's payment terms, preserving the proposal-level-row
/// invariant.
pub async fn replace_payment_terms(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(proposal_id): Path<Uuid>,
    Json(payload): Json<ReplacePaymentTermsRequest>,
) -> Result<Json<ProposalDetailResponse>, AppError> {
    if !auth.role.can_manage_billing() {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Clients cannot edit payment terms"
        )));
    }

    let proposal = load_proposal(&state, proposal_id).await?;
    let items = state.db.list_proposal_items(proposal_id).await?;
    let milestones = state.db.list_milestones(proposal_id).await?;

    state.db.delete_payment_terms(proposal_id).await?;
    let payment_terms = write_payment_terms(
        &state,
        proposal_id,
        &payload.payment_terms,
        &items,
        &milestones,
    )
    .await?;

    Ok(Json(ProposalDetailResponse {
        proposal,
        items,
        payment_terms,
        milestones,
    }))
}

/// Rendered classification of the proposal-level payment term.
pub async fn payment_terms_description(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(proposal_id): Path<Uuid>,
) -> Result<Json<PaymentTermsDescriptionResponse>, AppError> {
    load_proposal(&state, proposal_id).await?;
    let milestones = state.db.list_milestones(proposal_id).await?;

    let shape = match state.db.proposal_level_term(proposal_id).await? {
        Some(term) => PaymentShape::classify(&term),
        // Creation synthesizes a proposal-level row, but a proposal written
        // before that invariant existed still renders as one-time.
        None => PaymentShape::OneTime { due_date: None },
    };

    Ok(Json(PaymentTermsDescriptionResponse {
        shape: shape.tag(),
        description: shape.describe(&milestones),
    }))
}

/// Submit a draft proposal for internal review.
pub async fn submit_proposal(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(proposal_id): Path<Uuid>,
) -> Result<Json<Proposal>, AppError> {
    if !auth.role.can_manage_billing() {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Clients cannot submit proposals"
        )));
    }

    let proposal = load_proposal(&state, proposal_id).await?;
    if proposal.status() != ProposalStatus::Draft {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Only draft proposals can be submitted"
        )));
    }

    transition_status(&state, proposal_id, ProposalStatus::Submitted).await
}

/// Approve a submitted proposal.
pub async fn approve_proposal(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(proposal_id): Path<Uuid>,
) -> Result<Json<Proposal>, AppError> {
    require_approver(&auth)?;

    let proposal = load_proposal(&state, proposal_id).await?;
    if proposal.status() != ProposalStatus::Submitted {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Only submitted proposals can be approved"
        )));
    }

    transition_status(&state, proposal_id, ProposalStatus::Approved).await
}

/// Reject a submitted proposal.
pub async fn reject_proposal(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(proposal_id): Path<Uuid>,
) -> Result<Json<Proposal>, AppError> {
    require_approver(&auth)?;

    let proposal = load_proposal(&state, proposal_id).await?;
    if proposal.status() != ProposalStatus::Submitted {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Only submitted proposals can be rejected"
        )));
    }

    transition_status(&state, proposal_id, ProposalStatus::Rejected).await
}

/// Record the client's acceptance decision.
pub async fn client_approval(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(proposal_id): Path<Uuid>,
    Json(payload): Json<ClientApprovalRequest>,
) -> Result<Json<Proposal>, AppError> {
    let proposal = load_proposal(&state, proposal_id).await?;
    if !matches!(
        proposal.status(),
        ProposalStatus::Submitted | ProposalStatus::Approved
    ) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Proposal is not open for client review"
        )));
    }

    let decision = if payload.approved {
        ClientApprovalStatus::Approved
    } else {
        ClientApprovalStatus::Declined
    };

    tracing::info!(
        proposal_id = %proposal_id,
        user_id = %auth.user_id,
        decision = decision.as_str(),
        "Recording client approval decision"
    );

    let updated = state
        .db
        .update_client_approval(proposal_id, decision)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Proposal not found")))?;

    Ok(Json(updated))
}

fn check_percent_range(
    field: &str,
    value: Option<rust_decimal::Decimal>,
) -> Result<(), AppError> {
    use rust_decimal::Decimal;
    if let Some(v) = value {
        if v < Decimal::ZERO || v > Decimal::ONE_HUNDRED {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "{} must be between 0 and 100",
                field
            )));
        }
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

fn require_approver(auth: &AuthContext) -> Result<(), AppError> {
    if !auth.role.can_approve_proposals() {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Only admins and managers can review proposals"
        )));
    }
    Ok(())
}

async fn transition_status(
    state: &AppState,
    proposal_id: Uuid,
    status: ProposalStatus,
) -> Result<Json<Proposal>, AppError> {
    let updated = state
        .db
        .update_proposal_status(proposal_id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Proposal not found")))?;

    PROPOSALS_TOTAL.with_label_values(&[status.as_str()]).inc();

    Ok(Json(updated))
}

/// Insert term rows, resolving positional item and milestone references,
/// then synthesize the default proposal-level row when none was supplied.
async fn write_payment_terms(
    state: &AppState,
    proposal_id: Uuid,
    requests: &[PaymentTermRequest],
    items: &[ProposalItem],
    milestones: &[Milestone],
) -> Result<Vec<crate::models::PaymentTerm>, AppError> {
    let mut created = Vec::with_capacity(requests.len() + 1);
    let mut has_proposal_level = false;

    for request in requests {
        let input = term_input(request, items, milestones)?;
        if input.proposal_item_id.is_none() {
            has_proposal_level = true;
        }
        created.push(state.db.create_payment_term(proposal_id, &input).await?);
    }

    if !has_proposal_level {
        created.push(
            state
                .db
                .create_payment_term(proposal_id, &CreatePaymentTerm::default_one_time())
                .await?,
        );
    }

    Ok(created)
}

fn term_input(
    request: &PaymentTermRequest,
    items: &[ProposalItem],
    milestones: &[Milestone],
) -> Result<CreatePaymentTerm, AppError> {
    let proposal_item_id = match request.item_index {
        Some(index) => Some(
            items
                .get(index)
                .map(|i| i.item_id)
                .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Unknown item index")))?,
        ),
        None => None,
    };

    let mut milestone_ids = Vec::with_capacity(request.milestone_indexes.len());
    for index in &request.milestone_indexes {
        let milestone = milestones
            .get(*index)
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Unknown milestone index")))?;
        milestone_ids.push(milestone.milestone_id);
    }

    Ok(CreatePaymentTerm {
        proposal_item_id,
        upfront_type: request.upfront_type,
        upfront_value: request.upfront_value,
        balance_payment_type: request.balance_payment_type,
        balance_due_date: request.balance_due_date,
        installment_type: request.installment_type,
        installment_count: request.installment_count,
        installment_frequency: request.installment_frequency.clone(),
        installment_maturity_dates: request.installment_maturity_dates.clone(),
        recurring_enabled: request.recurring_enabled,
        recurring_frequency: request.recurring_frequency,
        recurring_custom_months: request.recurring_custom_months,
        recurring_start_date: request.recurring_start_date,
        milestone_ids,
    })
}
