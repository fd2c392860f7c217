//! Milestone model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Named deliverable referenced by id from payment terms.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Milestone {
    pub milestone_id: Uuid,
    pub proposal_id: Uuid,
    pub name: String,
    pub amount: Option<Decimal>,
    pub percent: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub sort_order: i32,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a milestone.
#[derive(Debug, Clone)]
pub struct CreateMilestone {
    pub proposal_id: Uuid,
    pub name: String,
    pub amount: Option<Decimal>,
    pub percent: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub sort_order: i32,
}
