//! Payment-term classification and rendering.

use chrono::{NaiveDate, Utc};
use proposal_service::domain::payment_terms::{BalanceShape, PaymentShape};
use proposal_service::models::{
    InstallmentType, Milestone, PaymentTerm, RecurringFrequency, UpfrontType,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn empty_term(proposal_id: Uuid) -> PaymentTerm {
    PaymentTerm {
        term_id: Uuid::new_v4(),
        proposal_id,
        proposal_item_id: None,
        upfront_type: None,
        upfront_value: None,
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

fn milestone(proposal_id: Uuid, name: &str) -> Milestone {
    Milestone {
        milestone_id: Uuid::new_v4(),
        proposal_id,
        name: name.to_string(),
        amount: None,
        percent: None,
        due_date: None,
        sort_order: 0,
        created_utc: Utc::now(),
    }
}

#[test]
fn upfront_takes_precedence_over_installments() {
    let proposal_id = Uuid::new_v4();
    let mut term = empty_term(proposal_id);
    term.upfront_type = Some("percent".to_string());
    term.upfront_value = Some(dec("30"));
    term.installment_type = Some("time_based".to_string());
    term.installment_count = Some(4);

    let shape = PaymentShape::classify(&term);

    assert!(matches!(shape, PaymentShape::Upfront { .. }));
}

#[test]
fn installments_take_precedence_over_recurring() {
    let proposal_id = Uuid::new_v4();
    let mut term = empty_term(proposal_id);
    term.installment_type = Some("time_based".to_string());
    term.installment_count = Some(3);
    term.recurring_enabled = true;
    term.recurring_frequency = Some("monthly_1".to_string());

    let shape = PaymentShape::classify(&term);

    assert!(matches!(
        shape,
        PaymentShape::Installment {
            installment_type: InstallmentType::TimeBased,
            count: 3,
            ..
        }
    ));
}

#[test]
fn upfront_without_a_value_is_not_upfront() {
    let proposal_id = Uuid::new_v4();
    let mut term = empty_term(proposal_id);
    term.upfront_type = Some("percent".to_string());
    // no upfront_value: rule 1 cannot match

    let shape = PaymentShape::classify(&term);

    assert_eq!(shape, PaymentShape::OneTime { due_date: None });
}

#[test]
fn recurring_requires_both_flag_and_frequency() {
    let proposal_id = Uuid::new_v4();
    let mut term = empty_term(proposal_id);
    term.recurring_enabled = true;
    // no frequency: falls through to one-time

    let shape = PaymentShape::classify(&term);

    assert_eq!(shape, PaymentShape::OneTime { due_date: None });
}

#[test]
fn empty_row_is_one_time() {
    let term = empty_term(Uuid::new_v4());

    let shape = PaymentShape::classify(&term);

    assert_eq!(shape, PaymentShape::OneTime { due_date: None });
    assert_eq!(
        shape.describe(&[]),
        "One-time payment, paid on completion"
    );
}

#[test]
fn percent_upfront_amount_is_a_share_of_the_total() {
    let mut term = empty_term(Uuid::new_v4());
    term.upfront_type = Some("percent".to_string());
    term.upfront_value = Some(dec("20"));

    let shape = PaymentShape::classify(&term);

    assert_eq!(shape.upfront_amount(dec("1000")), Some(dec("200")));
}

#[test]
fn fixed_upfront_amount_ignores_the_total() {
    let mut term = empty_term(Uuid::new_v4());
    term.upfront_type = Some("fixed_amount".to_string());
    term.upfront_value = Some(dec("350"));

    let shape = PaymentShape::classify(&term);

    assert_eq!(shape.upfront_amount(dec("1000")), Some(dec("350")));
    assert!(matches!(
        shape,
        PaymentShape::Upfront {
            upfront_type: UpfrontType::FixedAmount,
            ..
        }
    ));
}

#[test]
fn one_time_shapes_have_no_upfront_amount() {
    let shape = PaymentShape::classify(&empty_term(Uuid::new_v4()));
    assert_eq!(shape.upfront_amount(dec("1000")), None);
}

#[test]
fn upfront_with_milestone_balance_names_the_milestones() {
    let proposal_id = Uuid::new_v4();
    let design = milestone(proposal_id, "Design sign-off");
    let launch = milestone(proposal_id, "Launch");

    let mut term = empty_term(proposal_id);
    term.upfront_type = Some("percent".to_string());
    term.upfront_value = Some(dec("40"));
    term.balance_payment_type = Some("milestone_based".to_string());
    term.milestone_ids = vec![design.milestone_id, launch.milestone_id];

    let shape = PaymentShape::classify(&term);

    match &shape {
        PaymentShape::Upfront {
            balance: Some(BalanceShape::MilestoneBased(ids)),
            ..
        } => assert_eq!(ids.len(), 2),
        other => panic!("unexpected shape: {:?}", other),
    }

    let description = shape.describe(&[design, launch]);
    assert_eq!(
        description,
        "40% upfront, balance on milestones: Design sign-off, Launch"
    );
}

#[test]
fn upfront_with_time_based_balance_shows_the_due_date() {
    let mut term = empty_term(Uuid::new_v4());
    term.upfront_type = Some("percent".to_string());
    term.upfront_value = Some(dec("50"));
    term.balance_payment_type = Some("time_based".to_string());
    term.balance_due_date = Some(date("2026-09-30"));

    let description = PaymentShape::classify(&term).describe(&[]);

    assert_eq!(description, "50% upfront, balance due 2026-09-30");
}

#[test]
fn installment_maturity_dates_override_the_frequency_text() {
    let mut term = empty_term(Uuid::new_v4());
    term.installment_type = Some("time_based".to_string());
    term.installment_count = Some(2);
    term.installment_frequency = Some("monthly".to_string());
    term.installment_maturity_dates = Some(vec![date("2026-01-15"), date("2026-02-15")]);

    let description = PaymentShape::classify(&term).describe(&[]);

    assert_eq!(description, "2 payments, monthly (due 2026-01-15, 2026-02-15)");
}

#[test]
fn recurring_cadence_labels() {
    let cases = [
        ("monthly_1", None, "Monthly"),
        ("monthly_3", None, "Every 3 months"),
        ("monthly_6", None, "Every 6 months"),
        ("yearly_12", None, "Yearly"),
        ("custom", Some(5), "Every 5 months"),
    ];

    for (frequency, custom_months, expected) in cases {
        let mut term = empty_term(Uuid::new_v4());
        term.recurring_enabled = true;
        term.recurring_frequency = Some(frequency.to_string());
        term.recurring_custom_months = custom_months;

        let shape = PaymentShape::classify(&term);
        assert!(matches!(shape, PaymentShape::Recurring { .. }));
        assert_eq!(shape.describe(&[]), expected, "frequency {}", frequency);
    }
}

#[test]
fn recurring_with_start_date_appends_it() {
    let mut term = empty_term(Uuid::new_v4());
    term.recurring_enabled = true;
    term.recurring_frequency = Some("monthly_3".to_string());
    term.recurring_start_date = Some(date("2026-03-01"));

    let description = PaymentShape::classify(&term).describe(&[]);

    assert_eq!(description, "Every 3 months, starting 2026-03-01");
}

#[test]
fn one_time_with_due_date_shows_it() {
    let mut term = empty_term(Uuid::new_v4());
    term.balance_due_date = Some(date("2026-12-01"));

    let description = PaymentShape::classify(&term).describe(&[]);

    assert_eq!(description, "One-time payment due 2026-12-01");
}

#[test]
fn frequency_labels_are_exposed_for_other_surfaces() {
    use proposal_service::domain::payment_terms::cadence_label;

    assert_eq!(cadence_label(RecurringFrequency::Yearly12, None), "Yearly");
    assert_eq!(
        cadence_label(RecurringFrequency::Custom, Some(9)),
        "Every 9 months"
    );
}
