//! Payment-term classification and rendering.
//!
//! A stored term row is a bag of optional field groups; this module folds it
//! into a closed shape exactly once, so display and generation can never
//! classify the same proposal two different ways.

use crate::models::{
    BalancePaymentType, InstallmentType, Milestone, PaymentTerm, RecurringFrequency, UpfrontType,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

/// How the balance falls due after an upfront payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceShape {
    MilestoneBased(Vec<Uuid>),
    TimeBased(Option<NaiveDate>),
    FullUpfront,
}

/// Closed classification of a proposal-level payment term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentShape {
    Upfront {
        upfront_type: UpfrontType,
        value: Decimal,
        balance: Option<BalanceShape>,
    },
    Installment {
        installment_type: InstallmentType,
        count: i32,
        frequency: Option<String>,
        maturity_dates: Vec<NaiveDate>,
        milestone_ids: Vec<Uuid>,
    },
    Recurring {
        frequency: RecurringFrequency,
        custom_months: Option<i32>,
        start_date: Option<NaiveDate>,
    },
    OneTime {
        due_date: Option<NaiveDate>,
    },
}

impl PaymentShape {
    /// Classify a term row. First matching rule wins; the order is
    /// load-bearing and must not be reordered.
    pub fn classify(term: &PaymentTerm) -> PaymentShape {
        // 1. Upfront configured
        if let (Some(kind), Some(value)) = (term.upfront_type.as_deref(), term.upfront_value) {
            let balance = term.balance_payment_type.as_deref().map(|b| {
                match BalancePaymentType::from_string(b) {
                    BalancePaymentType::MilestoneBased => {
                        BalanceShape::MilestoneBased(term.milestone_ids.clone())
                    }
                    BalancePaymentType::TimeBased => {
                        BalanceShape::TimeBased(term.balance_due_date)
                    }
                    BalancePaymentType::FullUpfront => BalanceShape::FullUpfront,
                }
            });
            return PaymentShape::Upfront {
                upfront_type: UpfrontType::from_string(kind),
                value,
                balance,
            };
        }

        // 2. Installments configured
        if let (Some(kind), Some(count)) = (term.installment_type.as_deref(), term.installment_count)
        {
            return PaymentShape::Installment {
                installment_type: InstallmentType::from_string(kind),
                count,
                frequency: term.installment_frequency.clone(),
                maturity_dates: term.installment_maturity_dates.clone().unwrap_or_default(),
                milestone_ids: term.milestone_ids.clone(),
            };
        }

        // 3. Recurring explicitly enabled
        if term.recurring_enabled {
            if let Some(freq) = term.recurring_frequency.as_deref() {
                return PaymentShape::Recurring {
                    frequency: RecurringFrequency::from_string(freq),
                    custom_months: term.recurring_custom_months,
                    start_date: term.recurring_start_date,
                };
            }
        }

        // 4/5. Plain one-time term, also the shape of a fully empty row
        PaymentShape::OneTime {
            due_date: term.balance_due_date,
        }
    }

    /// Stable tag for responses and metrics labels.
    pub fn tag(&self) -> &'static str {
        match self {
            PaymentShape::Upfront { .. } => "upfront",
            PaymentShape::Installment { .. } => "installment",
            PaymentShape::Recurring { .. } => "recurring",
            PaymentShape::OneTime { .. } => "one_time",
        }
    }

    /// The upfront slice of a proposal total, when this shape has one.
    pub fn upfront_amount(&self, proposal_total: Decimal) -> Option<Decimal> {
        match self {
            PaymentShape::Upfront {
                upfront_type: UpfrontType::Percent,
                value,
                ..
            } => Some(proposal_total * *value / Decimal::ONE_HUNDRED),
            PaymentShape::Upfront {
                upfront_type: UpfrontType::FixedAmount,
                value,
                ..
            } => Some(*value),
            _ => None,
        }
    }

    /// Human-readable description. Milestone names are resolved against the
    /// proposal's milestone set.
    pub fn describe(&self, milestones: &[Milestone]) -> String {
        match self {
            PaymentShape::Upfront {
                upfront_type,
                value,
                balance,
            } => {
                let upfront = match upfront_type {
                    UpfrontType::Percent => format!("{}% upfront", value.normalize()),
                    UpfrontType::FixedAmount => format!("{} upfront", value.normalize()),
                };
                match balance {
                    Some(BalanceShape::MilestoneBased(ids)) => format!(
                        "{}, balance on milestones: {}",
                        upfront,
                        milestone_names(ids, milestones)
                    ),
                    Some(BalanceShape::TimeBased(Some(due))) => {
                        format!("{}, balance due {}", upfront, due.format("%Y-%m-%d"))
                    }
                    Some(BalanceShape::TimeBased(None)) => {
                        format!("{}, balance due on completion", upfront)
                    }
                    Some(BalanceShape::FullUpfront) | None => upfront,
                }
            }
            PaymentShape::Installment {
                installment_type: InstallmentType::TimeBased,
                count,
                frequency,
                maturity_dates,
                ..
            } => {
                let cadence = frequency.as_deref().unwrap_or("monthly");
                if maturity_dates.is_empty() {
                    format!("{} payments, {}", count, cadence)
                } else {
                    // User-entered override dates, not computed from the frequency.
                    let dates = maturity_dates
                        .iter()
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{} payments, {} (due {})", count, cadence, dates)
                }
            }
            PaymentShape::Installment {
                installment_type: InstallmentType::MilestoneBased,
                count,
                milestone_ids,
                ..
            } => format!(
                "{} payments on milestones: {}",
                count,
                milestone_names(milestone_ids, milestones)
            ),
            PaymentShape::Recurring {
                frequency,
                custom_months,
                start_date,
            } => {
                let cadence = cadence_label(*frequency, *custom_months);
                match start_date {
                    Some(start) => format!("{}, starting {}", cadence, start.format("%Y-%m-%d")),
                    None => cadence,
                }
            }
            PaymentShape::OneTime { due_date } => match due_date {
                Some(due) => format!("One-time payment due {}", due.format("%Y-%m-%d")),
                None => "One-time payment, paid on completion".to_string(),
            },
        }
    }
}

/// Cadence label for a recurring frequency.
pub fn cadence_label(frequency: RecurringFrequency, custom_months: Option<i32>) -> String {
    match frequency {
        RecurringFrequency::Monthly1 => "Monthly".to_string(),
        RecurringFrequency::Monthly3 => "Every 3 months".to_string(),
        RecurringFrequency::Monthly6 => "Every 6 months".to_string(),
        RecurringFrequency::Yearly12 => "Yearly".to_string(),
        RecurringFrequency::Custom => {
            format!("Every {} months", custom_months.unwrap_or(1))
        }
    }
}

fn milestone_names(ids: &[Uuid], milestones: &[Milestone]) -> String {
    let names: Vec<&str> = ids
        .iter()
        .filter_map(|id| {
            milestones
                .iter()
                .find(|m| m.milestone_id == *id)
                .map(|m| m.name.as_str())
        })
        .collect();
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}
