//! Billing amount derivation.

use crate::models::Proposal;
use rust_decimal::Decimal;
use serde::Serialize;

/// Tax and discount configuration applied to a base amount.
#[derive(Debug, Clone, Default)]
pub struct BillingInputs {
    pub tax_rate: Option<Decimal>,
    pub tax_inclusive: bool,
    pub discount_percent: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
}

impl BillingInputs {
    pub fn from_proposal(proposal: &Proposal) -> Self {
        Self {
            tax_rate: proposal.tax_rate,
            tax_inclusive: proposal.tax_inclusive,
            discount_percent: proposal.client_discount_percent,
            discount_amount: proposal.client_discount_amount,
        }
    }
}

/// Result of applying discount and tax to a base amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingBreakdown {
    pub discount_value: Decimal,
    pub after_discount: Decimal,
    pub tax_amount: Decimal,
    pub final_amount: Decimal,
}

/// Derive the payable amount for a base amount under the proposal's tax and
/// discount configuration. Applies identically to a full proposal, a sum of
/// recurring items, or an upfront slice.
///
/// This function only computes; rejecting a non-positive result (or a
/// non-positive base) is the caller's job, before any write happens.
pub fn compute_billing(
    base_amount: Decimal,
    proposal_total: Option<Decimal>,
    inputs: &BillingInputs,
) -> BillingBreakdown {
    let hundred = Decimal::ONE_HUNDRED;

    let discount_value = match (inputs.discount_percent, inputs.discount_amount) {
        // Percent discount always wins, even when a flat amount is also set.
        (Some(percent), _) if percent > Decimal::ZERO => base_amount * percent / hundred,
        (_, Some(flat)) if flat > Decimal::ZERO => {
            // The flat discount is proportional to the full proposal total,
            // so a partial invoice receives only its share. The divisor falls
            // back to the base itself when the total is unset or zero; if the
            // base is also zero the discount is skipped outright.
            let divisor = match proposal_total {
                Some(total) if total > Decimal::ZERO => total,
                _ => base_amount,
            };
            if divisor > Decimal::ZERO {
                base_amount * flat / divisor
            } else {
                Decimal::ZERO
            }
        }
        _ => Decimal::ZERO,
    };

    let after_discount = base_amount - discount_value;

    let (tax_amount, final_amount) = match inputs.tax_rate {
        Some(rate) if rate > Decimal::ZERO => {
            if inputs.tax_inclusive {
                // Stated amount already contains tax; back the component out.
                (after_discount * rate / (hundred + rate), after_discount)
            } else {
                let tax = after_discount * rate / hundred;
                (tax, after_discount + tax)
            }
        }
        _ => (Decimal::ZERO, after_discount),
    };

    BillingBreakdown {
        discount_value,
        after_discount,
        tax_amount,
        final_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn flat_discount_falls_back_to_base_when_total_is_zero() {
        let inputs = BillingInputs {
            discount_amount: Some(dec("50")),
            ..Default::default()
        };
        let breakdown = compute_billing(dec("200"), Some(Decimal::ZERO), &inputs);
        // divisor = base, so the flat amount applies in full
        assert_eq!(breakdown.discount_value, dec("50"));
        assert_eq!(breakdown.final_amount, dec("150"));
    }

    #[test]
    fn zero_base_with_flat_discount_skips_the_discount() {
        let inputs = BillingInputs {
            discount_amount: Some(dec("50")),
            ..Default::default()
        };
        let breakdown = compute_billing(Decimal::ZERO, None, &inputs);
        assert_eq!(breakdown.discount_value, Decimal::ZERO);
        assert_eq!(breakdown.final_amount, Decimal::ZERO);
    }

    #[test]
    fn zero_percent_falls_through_to_flat_discount() {
        let inputs = BillingInputs {
            discount_percent: Some(Decimal::ZERO),
            discount_amount: Some(dec("100")),
            ..Default::default()
        };
        let breakdown = compute_billing(dec("1000"), Some(dec("1000")), &inputs);
        assert_eq!(breakdown.discount_value, dec("100"));
    }

    #[test]
    fn zero_tax_rate_adds_nothing() {
        let inputs = BillingInputs {
            tax_rate: Some(Decimal::ZERO),
            ..Default::default()
        };
        let breakdown = compute_billing(dec("100"), None, &inputs);
        assert_eq!(breakdown.tax_amount, Decimal::ZERO);
        assert_eq!(breakdown.final_amount, dec("100"));
    }
}
