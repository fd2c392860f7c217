//! Caller identity extracted from request headers.
//!
//! The BFF resolves the session and forwards the user id and role as
//! headers. They are only trusted when the request signature is valid, so
//! the signature middleware must run BEFORE this extractor.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;
use uuid::Uuid;

/// Resolved caller role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Manager,
    Staff,
    Client,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "MANAGER" => Some(Role::Manager),
            "STAFF" => Some(Role::Staff),
            "CLIENT" => Some(Role::Client),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Staff => "STAFF",
            Role::Client => "CLIENT",
        }
    }

    /// Clients may accept or decline proposals, nothing more.
    pub fn can_manage_billing(&self) -> bool {
        !matches!(self, Role::Client)
    }

    /// Internal approval is restricted to admins and managers.
    pub fn can_approve_proposals(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

/// Authenticated caller context.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("X-User-ID")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::AuthError(anyhow::anyhow!(
                    "Missing X-User-ID header (required from BFF)"
                ))
            })?;
        let user_id = Uuid::parse_str(user_id)
            .map_err(|_| AppError::AuthError(anyhow::anyhow!("Invalid X-User-ID header")))?;

        let role = parts
            .headers
            .get("X-User-Role")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::AuthError(anyhow::anyhow!(
                    "Missing X-User-Role header (required from BFF)"
                ))
            })?;
        let role = Role::parse(role)
            .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("Unknown role: {}", role)))?;

        // Add to tracing span for observability
        let span = tracing::Span::current();
        span.record("user_id", user_id.to_string());
        span.record("role", role.as_str());

        Ok(AuthContext { user_id, role })
    }
}
