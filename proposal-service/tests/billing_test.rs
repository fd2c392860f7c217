//! Billing calculator behavior.

use proposal_service::domain::billing::{compute_billing, BillingInputs};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn exclusive_tax_is_added_on_top() {
    let inputs = BillingInputs {
        tax_rate: Some(dec("22")),
        tax_inclusive: false,
        ..Default::default()
    };

    let breakdown = compute_billing(dec("122"), None, &inputs);

    assert_eq!(breakdown.after_discount, dec("122"));
    assert_eq!(breakdown.tax_amount, dec("26.84"));
    assert_eq!(breakdown.final_amount, dec("148.84"));
    // final is always after_discount + tax for exclusive rates
    assert_eq!(
        breakdown.final_amount,
        breakdown.after_discount + breakdown.tax_amount
    );
}

#[test]
fn inclusive_tax_is_backed_out_not_added() {
    let inputs = BillingInputs {
        tax_rate: Some(dec("22")),
        tax_inclusive: true,
        ..Default::default()
    };

    let breakdown = compute_billing(dec("122"), None, &inputs);

    assert_eq!(breakdown.tax_amount, dec("22"));
    // the stated amount already contained the tax, so it is unchanged
    assert_eq!(breakdown.final_amount, dec("122"));
}

#[test]
fn percent_discount_wins_over_flat() {
    let inputs = BillingInputs {
        discount_percent: Some(dec("10")),
        discount_amount: Some(dec("500")),
        ..Default::default()
    };

    let breakdown = compute_billing(dec("1000"), Some(dec("1000")), &inputs);

    assert_eq!(breakdown.discount_value, dec("100"));
    assert_eq!(breakdown.final_amount, dec("900"));
}

#[test]
fn flat_discount_scales_proportionally_to_the_invoiced_slice() {
    let inputs = BillingInputs {
        discount_amount: Some(dec("100")),
        ..Default::default()
    };

    // a quarter slice of a 1000 proposal gets a quarter of the discount
    let breakdown = compute_billing(dec("250"), Some(dec("1000")), &inputs);

    assert_eq!(breakdown.discount_value, dec("25"));
    assert_eq!(breakdown.after_discount, dec("225"));
}

#[test]
fn flat_discount_without_a_total_applies_against_the_base() {
    let inputs = BillingInputs {
        discount_amount: Some(dec("100")),
        ..Default::default()
    };

    let breakdown = compute_billing(dec("250"), None, &inputs);

    assert_eq!(breakdown.discount_value, dec("100"));
    assert_eq!(breakdown.after_discount, dec("150"));
}

#[test]
fn discount_then_tax_compose() {
    let inputs = BillingInputs {
        tax_rate: Some(dec("10")),
        tax_inclusive: false,
        discount_percent: Some(dec("20")),
        ..Default::default()
    };

    let breakdown = compute_billing(dec("500"), Some(dec("500")), &inputs);

    assert_eq!(breakdown.discount_value, dec("100"));
    assert_eq!(breakdown.after_discount, dec("400"));
    assert_eq!(breakdown.tax_amount, dec("40"));
    assert_eq!(breakdown.final_amount, dec("440"));
}

#[test]
fn no_configuration_passes_the_base_through() {
    let breakdown = compute_billing(dec("750"), Some(dec("750")), &BillingInputs::default());

    assert_eq!(breakdown.discount_value, Decimal::ZERO);
    assert_eq!(breakdown.tax_amount, Decimal::ZERO);
    assert_eq!(breakdown.final_amount, dec("750"));
}
