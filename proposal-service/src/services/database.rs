//! Database service for proposal-service.

use crate::models::{
    Bill, BillStatus, ClientApprovalStatus, CreateBill, CreateMilestone, CreatePaymentTerm,
    CreateProposal, CreateProposalItem, Milestone, PaymentTerm, Proposal, ProposalItem,
    ProposalStatus,
};
use crate::services::metrics::DB_QUERY_DURATION;
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const PROPOSAL_COLUMNS: &str = "proposal_id, client_id, title, description, proposal_number, \
     amount, currency, tax_inclusive, tax_rate, client_discount_percent, client_discount_amount, \
     status, client_approval_status, recurring_enabled, recurring_frequency, \
     last_recurring_invoice_date, created_utc, updated_utc";

const ITEM_COLUMNS: &str = "item_id, proposal_id, description, billing_method, quantity, \
     unit_price, amount, recurring_enabled, recurring_frequency, last_recurring_invoice_date, \
     sort_order, created_utc";

const TERM_COLUMNS: &str = "term_id, proposal_id, proposal_item_id, upfront_type, upfront_value, \
     balance_payment_type, balance_due_date, installment_type, installment_count, \
     installment_frequency, installment_maturity_dates, recurring_enabled, recurring_frequency, \
     recurring_custom_months, recurring_start_date, milestone_ids, created_utc";

const MILESTONE_COLUMNS: &str =
    "milestone_id, proposal_id, name, amount, percent, due_date, sort_order, created_utc";

const BILL_COLUMNS: &str = "bill_id, proposal_id, client_id, invoice_number, description, \
     currency, subtotal, discount_value, tax_amount, amount, tax_inclusive, tax_rate, \
     discount_percent, discount_amount, is_upfront_payment, status, issue_date, due_date, \
     created_utc";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "proposal-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Proposal operations
    // -------------------------------------------------------------------------

    /// Create a new proposal.
    #[instrument(skip(self, input), fields(client_id = %input.client_id))]
    pub async fn create_proposal(&self, input: &CreateProposal) -> Result<Proposal, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_proposal"])
            .start_timer();

        let proposal_id = Uuid::new_v4();
        let proposal = sqlx::query_as::<_, Proposal>(&format!(
            r#"
            INSERT INTO proposals (proposal_id, client_id, title, description, proposal_number,
                amount, currency, tax_inclusive, tax_rate, client_discount_percent,
                client_discount_amount, status, client_approval_status, recurring_enabled,
                recurring_frequency)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {PROPOSAL_COLUMNS}
            "#
        ))
        .bind(proposal_id)
        .bind(input.client_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.proposal_number)
        .bind(input.amount)
        .bind(&input.currency)
        .bind(input.tax_inclusive)
        .bind(input.tax_rate)
        .bind(input.client_discount_percent)
        .bind(input.client_discount_amount)
        .bind(ProposalStatus::Draft.as_str())
        .bind(ClientApprovalStatus::Pending.as_str())
        .bind(input.recurring_enabled)
        .bind(&input.recurring_frequency)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Proposal number '{}' already exists",
                    input.proposal_number.as_deref().unwrap_or("")
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create proposal: {}", e)),
        })?;

        timer.observe_duration();

        info!(proposal_id = %proposal.proposal_id, title = %proposal.title, "Proposal created");

        Ok(proposal)
    }

    /// Get a proposal by ID.
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn get_proposal(&self, proposal_id: Uuid) -> Result<Option<Proposal>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_proposal"])
            .start_timer();

        let proposal = sqlx::query_as::<_, Proposal>(&format!(
            "SELECT {PROPOSAL_COLUMNS} FROM proposals WHERE proposal_id = $1"
        ))
        .bind(proposal_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get proposal: {}", e)))?;

        timer.observe_duration();

        Ok(proposal)
    }

    /// Update a proposal's workflow status.
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn update_proposal_status(
        &self,
        proposal_id: Uuid,
        status: ProposalStatus,
    ) -> Result<Option<Proposal>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_proposal_status"])
            .start_timer();

        let proposal = sqlx::query_as::<_, Proposal>(&format!(
            r#"
            UPDATE proposals
            SET status = $2, updated_utc = NOW()
            WHERE proposal_id = $1
            RETURNING {PROPOSAL_COLUMNS}
            "#
        ))
        .bind(proposal_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update proposal status: {}", e))
        })?;

        timer.observe_duration();

        Ok(proposal)
    }

    /// Update the client's acceptance decision.
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn update_client_approval(
        &self,
        proposal_id: Uuid,
        approval: ClientApprovalStatus,
    ) -> Result<Option<Proposal>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_client_approval"])
            .start_timer();

        let proposal = sqlx::query_as::<_, Proposal>(&format!(
            r#"
            UPDATE proposals
            SET client_approval_status = $2, updated_utc = NOW()
            WHERE proposal_id = $1
            RETURNING {PROPOSAL_COLUMNS}
            "#
        ))
        .bind(proposal_id)
        .bind(approval.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update client approval: {}", e))
        })?;

        timer.observe_duration();

        Ok(proposal)
    }

    /// Stamp the one-shot recurring unlock on the proposal.
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn stamp_recurring_generated(
        &self,
        proposal_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["stamp_recurring_generated"])
            .start_timer();

        sqlx::query(
            r#"
            UPDATE proposals
            SET last_recurring_invoice_date = $2, updated_utc = NOW()
            WHERE proposal_id = $1
            "#,
        )
        .bind(proposal_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to stamp proposal: {}", e))
        })?;

        timer.observe_duration();

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Proposal item operations
    // -------------------------------------------------------------------------

    /// Create a proposal line item.
    #[instrument(skip(self, input), fields(proposal_id = %input.proposal_id))]
    pub async fn create_proposal_item(
        &self,
        input: &CreateProposalItem,
    ) -> Result<ProposalItem, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_proposal_item"])
            .start_timer();

        let item_id = Uuid::new_v4();
        let item = sqlx::query_as::<_, ProposalItem>(&format!(
            r#"
            INSERT INTO proposal_items (item_id, proposal_id, description, billing_method,
                quantity, unit_price, amount, recurring_enabled, recurring_frequency, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item_id)
        .bind(input.proposal_id)
        .bind(&input.description)
        .bind(input.billing_method.as_str())
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(input.amount)
        .bind(input.recurring_enabled)
        .bind(&input.recurring_frequency)
        .bind(input.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create item: {}", e)))?;

        timer.observe_duration();

        Ok(item)
    }

    /// List a proposal's line items.
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn list_proposal_items(
        &self,
        proposal_id: Uuid,
    ) -> Result<Vec<ProposalItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_proposal_items"])
            .start_timer();

        let items = sqlx::query_as::<_, ProposalItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM proposal_items WHERE proposal_id = $1 ORDER BY sort_order, item_id"
        ))
        .bind(proposal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list items: {}", e)))?;

        timer.observe_duration();

        Ok(items)
    }

    /// Stamp the one-shot recurring unlock on a line item.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn stamp_item_recurring_generated(
        &self,
        item_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["stamp_item_recurring_generated"])
            .start_timer();

        sqlx::query(
            "UPDATE proposal_items SET last_recurring_invoice_date = $2 WHERE item_id = $1",
        )
        .bind(item_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to stamp item: {}", e)))?;

        timer.observe_duration();

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Payment term operations
    // -------------------------------------------------------------------------

    /// Create a payment term row for a proposal.
    #[instrument(skip(self, input), fields(proposal_id = %proposal_id))]
    pub async fn create_payment_term(
        &self,
        proposal_id: Uuid,
        input: &CreatePaymentTerm,
    ) -> Result<PaymentTerm, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_payment_term"])
            .start_timer();

        let term_id = Uuid::new_v4();
        let term = sqlx::query_as::<_, PaymentTerm>(&format!(
            r#"
            INSERT INTO payment_terms (term_id, proposal_id, proposal_item_id, upfront_type,
                upfront_value, balance_payment_type, balance_due_date, installment_type,
                installment_count, installment_frequency, installment_maturity_dates,
                recurring_enabled, recurring_frequency, recurring_custom_months,
                recurring_start_date, milestone_ids)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {TERM_COLUMNS}
            "#
        ))
        .bind(term_id)
        .bind(proposal_id)
        .bind(input.proposal_item_id)
        .bind(input.upfront_type.map(|t| t.as_str()))
        .bind(input.upfront_value)
        .bind(input.balance_payment_type.map(|t| t.as_str()))
        .bind(input.balance_due_date)
        .bind(input.installment_type.map(|t| t.as_str()))
        .bind(input.installment_count)
        .bind(&input.installment_frequency)
        .bind(&input.installment_maturity_dates)
        .bind(input.recurring_enabled)
        .bind(input.recurring_frequency.map(|f| f.as_str()))
        .bind(input.recurring_custom_months)
        .bind(input.recurring_start_date)
        .bind(&input.milestone_ids)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create payment term: {}", e))
        })?;

        timer.observe_duration();

        Ok(term)
    }

    /// List all payment term rows of a proposal.
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn list_payment_terms(&self, proposal_id: Uuid) -> Result<Vec<PaymentTerm>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_payment_terms"])
            .start_timer();

        let terms = sqlx::query_as::<_, PaymentTerm>(&format!(
            "SELECT {TERM_COLUMNS} FROM payment_terms WHERE proposal_id = $1 ORDER BY created_utc, term_id"
        ))
        .bind(proposal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list payment terms: {}", e))
        })?;

        timer.observe_duration();

        Ok(terms)
    }

    /// The authoritative proposal-level term (`proposal_item_id IS NULL`).
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn proposal_level_term(
        &self,
        proposal_id: Uuid,
    ) -> Result<Option<PaymentTerm>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["proposal_level_term"])
            .start_timer();

        let term = sqlx::query_as::<_, PaymentTerm>(&format!(
            r#"
            SELECT {TERM_COLUMNS} FROM payment_terms
            WHERE proposal_id = $1 AND proposal_item_id IS NULL
            ORDER BY created_utc
            LIMIT 1
            "#
        ))
        .bind(proposal_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get proposal-level term: {}", e))
        })?;

        timer.observe_duration();

        Ok(term)
    }

    /// Delete all payment term rows of a proposal (for replacement).
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn delete_payment_terms(&self, proposal_id: Uuid) -> Result<u64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_payment_terms"])
            .start_timer();

        let result = sqlx::query("DELETE FROM payment_terms WHERE proposal_id = $1")
            .bind(proposal_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete payment terms: {}", e))
            })?;

        timer.observe_duration();

        Ok(result.rows_affected())
    }

    // -------------------------------------------------------------------------
    // Milestone operations
    // -------------------------------------------------------------------------

    /// Create a milestone.
    #[instrument(skip(self, input), fields(proposal_id = %input.proposal_id))]
    pub async fn create_milestone(&self, input: &CreateMilestone) -> Result<Milestone, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_milestone"])
            .start_timer();

        let milestone_id = Uuid::new_v4();
        let milestone = sqlx::query_as::<_, Milestone>(&format!(
            r#"
            INSERT INTO milestones (milestone_id, proposal_id, name, amount, percent, due_date, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MILESTONE_COLUMNS}
            "#
        ))
        .bind(milestone_id)
        .bind(input.proposal_id)
        .bind(&input.name)
        .bind(input.amount)
        .bind(input.percent)
        .bind(input.due_date)
        .bind(input.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create milestone: {}", e))
        })?;

        timer.observe_duration();

        Ok(milestone)
    }

    /// List a proposal's milestones.
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn list_milestones(&self, proposal_id: Uuid) -> Result<Vec<Milestone>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_milestones"])
            .start_timer();

        let milestones = sqlx::query_as::<_, Milestone>(&format!(
            "SELECT {MILESTONE_COLUMNS} FROM milestones WHERE proposal_id = $1 ORDER BY sort_order, milestone_id"
        ))
        .bind(proposal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list milestones: {}", e))
        })?;

        timer.observe_duration();

        Ok(milestones)
    }

    // -------------------------------------------------------------------------
    // Bill operations
    // -------------------------------------------------------------------------

    /// Create a bill.
    #[instrument(skip(self, input), fields(proposal_id = %input.proposal_id))]
    pub async fn create_bill(&self, input: &CreateBill) -> Result<Bill, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_bill"])
            .start_timer();

        let bill_id = Uuid::new_v4();
        let bill = sqlx::query_as::<_, Bill>(&format!(
            r#"
            INSERT INTO bills (bill_id, proposal_id, client_id, invoice_number, description,
                currency, subtotal, discount_value, tax_amount, amount, tax_inclusive, tax_rate,
                discount_percent, discount_amount, is_upfront_payment, status, issue_date, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {BILL_COLUMNS}
            "#
        ))
        .bind(bill_id)
        .bind(input.proposal_id)
        .bind(input.client_id)
        .bind(&input.invoice_number)
        .bind(&input.description)
        .bind(&input.currency)
        .bind(input.subtotal)
        .bind(input.discount_value)
        .bind(input.tax_amount)
        .bind(input.amount)
        .bind(input.tax_inclusive)
        .bind(input.tax_rate)
        .bind(input.discount_percent)
        .bind(input.discount_amount)
        .bind(input.is_upfront_payment)
        .bind(BillStatus::Issued.as_str())
        .bind(input.issue_date)
        .bind(input.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Invoice number '{}' already exists",
                    input.invoice_number
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create bill: {}", e)),
        })?;

        timer.observe_duration();

        info!(bill_id = %bill.bill_id, invoice_number = %bill.invoice_number, "Bill created");

        Ok(bill)
    }

    /// Get a bill by ID.
    #[instrument(skip(self), fields(bill_id = %bill_id))]
    pub async fn get_bill(&self, bill_id: Uuid) -> Result<Option<Bill>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_bill"])
            .start_timer();

        let bill = sqlx::query_as::<_, Bill>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE bill_id = $1"
        ))
        .bind(bill_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get bill: {}", e)))?;

        timer.observe_duration();

        Ok(bill)
    }

    /// List a proposal's bills.
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn list_bills(&self, proposal_id: Uuid) -> Result<Vec<Bill>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_bills"])
            .start_timer();

        let bills = sqlx::query_as::<_, Bill>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE proposal_id = $1 ORDER BY created_utc, bill_id"
        ))
        .bind(proposal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list bills: {}", e)))?;

        timer.observe_duration();

        Ok(bills)
    }

    /// Invoice numbers already taken by a proposal's bills.
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn list_bill_numbers(&self, proposal_id: Uuid) -> Result<Vec<String>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_bill_numbers"])
            .start_timer();

        let numbers: Vec<String> =
            sqlx::query_scalar("SELECT invoice_number FROM bills WHERE proposal_id = $1")
                .bind(proposal_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to list bill numbers: {}", e))
                })?;

        timer.observe_duration();

        Ok(numbers)
    }

    /// Point-read collision check by exact invoice number.
    #[instrument(skip(self))]
    pub async fn invoice_number_exists(&self, invoice_number: &str) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["invoice_number_exists"])
            .start_timer();

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bills WHERE invoice_number = $1)")
                .bind(invoice_number)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!(
                        "Failed to check invoice number: {}",
                        e
                    ))
                })?;

        timer.observe_duration();

        Ok(exists)
    }

    /// Whether an upfront bill already exists for the proposal.
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn has_upfront_bill(&self, proposal_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["has_upfront_bill"])
            .start_timer();

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bills WHERE proposal_id = $1 AND is_upfront_payment)",
        )
        .bind(proposal_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to check upfront bill: {}", e))
        })?;

        timer.observe_duration();

        Ok(exists)
    }

    /// Count of a proposal's bills, for fallback numbering.
    #[instrument(skip(self), fields(proposal_id = %proposal_id))]
    pub async fn count_bills(&self, proposal_id: Uuid) -> Result<i64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["count_bills"])
            .start_timer();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills WHERE proposal_id = $1")
            .bind(proposal_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to count bills: {}", e)))?;

        timer.observe_duration();

        Ok(count)
    }
}
