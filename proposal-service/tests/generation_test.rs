//! Invoice-generation eligibility.

use chrono::Utc;
use proposal_service::domain::generation::{
    plan_first_recurring_invoice, plan_standard_invoice, plan_upfront_invoice, GenerationError,
    RecurringInvoiceState,
};
use proposal_service::models::{PaymentTerm, Proposal, ProposalItem};
use rust_decimal::Decimal;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn proposal(amount: &str) -> Proposal {
    Proposal {
        proposal_id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        title: "Website redesign".to_string(),
        description: None,
        proposal_number: Some("PROP-2024-001".to_string()),
        amount: Some(dec(amount)),
        currency: "USD".to_string(),
        tax_inclusive: false,
        tax_rate: None,
        client_discount_percent: None,
        client_discount_amount: None,
        status: "approved".to_string(),
        client_approval_status: "approved".to_string(),
        recurring_enabled: false,
        recurring_frequency: None,
        last_recurring_invoice_date: None,
        created_utc: Utc::now(),
        updated_utc: Utc::now(),
    }
}

fn upfront_term(proposal_id: Uuid, upfront_type: &str, value: &str) -> PaymentTerm {
    PaymentTerm {
        term_id: Uuid::new_v4(),
        proposal_id,
        proposal_item_id: None,
        upfront_type: Some(upfront_type.to_string()),
        upfront_value: Some(dec(value)),
        balance_payment_type: None,
        balance_due_date: None,
        installment_type: None,
        installment_count: None,
        installment_frequency: None,
        installment_maturity_dates: None,
        recurring_enabled: false,
        recurring_frequency: None,
        recurring_custom_months: None,
        recurring_start_date: None,
        milestone_ids: Vec::new(),
        created_utc: Utc::now(),
    }
}

fn one_time_term(proposal_id: Uuid) -> PaymentTerm {
    PaymentTerm {
        upfront_type: None,
        upfront_value: None,
        ..upfront_term(proposal_id, "percent", "0")
    }
}

fn recurring_item(proposal_id: Uuid, description: &str, amount: &str) -> ProposalItem {
    ProposalItem {
        item_id: Uuid::new_v4(),
        proposal_id,
        description: description.to_string(),
        billing_method: "recurring".to_string(),
        quantity: Decimal::ONE,
        unit_price: dec(amount),
        amount: Some(dec(amount)),
        recurring_enabled: true,
        recurring_frequency: Some("monthly_1".to_string()),
        last_recurring_invoice_date: None,
        sort_order: 0,
        created_utc: Utc::now(),
    }
}

// --- upfront ---------------------------------------------------------------

#[test]
fn upfront_with_discount_produces_the_expected_bill_amounts() {
    let proposal = Proposal {
        client_discount_percent: Some(dec("10")),
        ..proposal("1000")
    };
    let term = upfront_term(proposal.proposal_id, "percent", "20");

    let plan = plan_upfront_invoice(&proposal, Some(&term), false).unwrap();

    assert_eq!(plan.base_amount, dec("200"));
    assert_eq!(plan.breakdown.discount_value, dec("20"));
    assert_eq!(plan.breakdown.final_amount, dec("180"));
}

#[test]
fn upfront_generation_is_terminal_once_a_bill_exists() {
    let proposal = proposal("1000");
    let term = upfront_term(proposal.proposal_id, "percent", "20");

    assert!(plan_upfront_invoice(&proposal, Some(&term), false).is_ok());
    assert_eq!(
        plan_upfront_invoice(&proposal, Some(&term), true),
        Err(GenerationError::UpfrontAlreadyExists)
    );
}

#[test]
fn upfront_requires_client_approval() {
    let unapproved = Proposal {
        client_approval_status: "pending".to_string(),
        ..proposal("1000")
    };
    let term = upfront_term(unapproved.proposal_id, "percent", "20");

    assert_eq!(
        plan_upfront_invoice(&unapproved, Some(&term), false),
        Err(GenerationError::ClientApprovalMissing)
    );
}

#[test]
fn upfront_refuses_terms_without_upfront_configuration() {
    let proposal = proposal("1000");
    let term = one_time_term(proposal.proposal_id);

    assert_eq!(
        plan_upfront_invoice(&proposal, Some(&term), false),
        Err(GenerationError::NoUpfrontConfigured)
    );
}

#[test]
fn a_missing_term_row_reads_as_no_upfront_configuration() {
    let proposal = proposal("1000");

    assert_eq!(
        plan_upfront_invoice(&proposal, None, false),
        Err(GenerationError::NoUpfrontConfigured)
    );
}

#[test]
fn zero_percent_upfront_is_an_invalid_amount() {
    let proposal = proposal("1000");
    let term = upfront_term(proposal.proposal_id, "percent", "0");

    assert_eq!(
        plan_upfront_invoice(&proposal, Some(&term), false),
        Err(GenerationError::InvalidUpfrontAmount)
    );
}

#[test]
fn fixed_upfront_uses_the_value_directly() {
    let proposal = proposal("1000");
    let term = upfront_term(proposal.proposal_id, "fixed_amount", "250");

    let plan = plan_upfront_invoice(&proposal, Some(&term), false).unwrap();

    assert_eq!(plan.base_amount, dec("250"));
    assert_eq!(plan.breakdown.final_amount, dec("250"));
}

#[test]
fn upfront_on_a_priceless_proposal_is_invalid() {
    let proposal = Proposal {
        amount: None,
        ..proposal("0")
    };
    let term = upfront_term(proposal.proposal_id, "percent", "20");

    assert_eq!(
        plan_upfront_invoice(&proposal, Some(&term), false),
        Err(GenerationError::InvalidUpfrontAmount)
    );
}

// --- first recurring -------------------------------------------------------

#[test]
fn proposal_level_recurring_uses_the_proposal_amount() {
    let proposal = Proposal {
        recurring_enabled: true,
        recurring_frequency: Some("monthly_1".to_string()),
        ..proposal("600")
    };

    let plan = plan_first_recurring_invoice(&proposal, &[]).unwrap();

    assert_eq!(plan.base_amount, dec("600"));
    assert_eq!(plan.description, "Recurring billing for Website redesign");
    assert!(plan.recurring_item_ids.is_empty());
}

#[test]
fn item_level_recurring_sums_the_recurring_items() {
    let proposal = proposal("1000");
    let hosting = recurring_item(proposal.proposal_id, "Hosting", "50");
    let support = recurring_item(proposal.proposal_id, "Support retainer", "150");
    let one_off = ProposalItem {
        billing_method: "fixed".to_string(),
        recurring_enabled: false,
        ..recurring_item(proposal.proposal_id, "Setup", "9999")
    };

    let plan =
        plan_first_recurring_invoice(&proposal, &[hosting.clone(), support.clone(), one_off])
            .unwrap();

    assert_eq!(plan.base_amount, dec("200"));
    assert_eq!(plan.description, "Hosting, Support retainer");
    assert_eq!(
        plan.recurring_item_ids,
        vec![hosting.item_id, support.item_id]
    );
}

#[test]
fn recurring_refuses_proposals_without_recurring_billing() {
    let proposal = proposal("1000");

    assert_eq!(
        plan_first_recurring_invoice(&proposal, &[]),
        Err(GenerationError::RecurringNotEnabled)
    );
}

#[test]
fn recurring_is_a_one_time_unlock() {
    let stamped = Proposal {
        recurring_enabled: true,
        last_recurring_invoice_date: Some(Utc::now()),
        ..proposal("600")
    };

    assert_eq!(
        plan_first_recurring_invoice(&stamped, &[]),
        Err(GenerationError::RecurringAlreadyGenerated)
    );
}

#[test]
fn recurring_requires_an_approved_proposal() {
    let draft = Proposal {
        status: "draft".to_string(),
        recurring_enabled: true,
        ..proposal("600")
    };

    assert_eq!(
        plan_first_recurring_invoice(&draft, &[]),
        Err(GenerationError::ProposalNotApproved)
    );
}

#[test]
fn items_with_recurring_method_but_disabled_flag_do_not_count() {
    let proposal = proposal("1000");
    let disabled = ProposalItem {
        recurring_enabled: false,
        ..recurring_item(proposal.proposal_id, "Hosting", "50")
    };

    assert_eq!(
        plan_first_recurring_invoice(&proposal, &[disabled]),
        Err(GenerationError::RecurringNotEnabled)
    );
}

#[test]
fn recurring_state_tracks_the_stamp() {
    assert_eq!(
        RecurringInvoiceState::from_stamp(None),
        RecurringInvoiceState::NotGenerated
    );

    let at = Utc::now();
    let state = RecurringInvoiceState::from_stamp(Some(at));
    assert_eq!(state, RecurringInvoiceState::Generated { at });
    assert!(state.is_generated());
}

// --- standard --------------------------------------------------------------

#[test]
fn standard_invoice_covers_the_full_amount() {
    let proposal = Proposal {
        tax_rate: Some(dec("10")),
        ..proposal("1000")
    };

    let plan = plan_standard_invoice(&proposal).unwrap();

    assert_eq!(plan.base_amount, dec("1000"));
    assert_eq!(plan.breakdown.tax_amount, dec("100"));
    assert_eq!(plan.breakdown.final_amount, dec("1100"));
}

#[test]
fn standard_invoice_requires_a_positive_amount() {
    let proposal = Proposal {
        amount: None,
        ..proposal("0")
    };

    assert_eq!(
        plan_standard_invoice(&proposal),
        Err(GenerationError::InvalidInvoiceAmount)
    );
}
