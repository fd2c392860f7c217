//! HMAC request-signature validation.
//!
//! The BFF signs every request it forwards; the identity headers it sets
//! (user id, role) are only trusted once the signature checks out, so this
//! middleware must run before any extractor that reads them.

use crate::error::AppError;
use crate::utils::signature::verify_signature;
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use http_body_util::BodyExt;

/// Maximum clock skew between signer and verifier, in seconds.
const TIMESTAMP_SKEW_SECS: i64 = 60;

#[derive(Clone, Debug, Default)]
pub struct SignatureConfig {
    pub require_signatures: bool,
    pub excluded_paths: Vec<String>,
}

#[async_trait]
pub trait SignatureStore: Send + Sync {
    /// Returns false when the nonce was already seen (replay).
    async fn validate_nonce(&self, nonce: &str) -> Result<bool, AppError>;
    async fn get_signing_secret(&self, client_id: &str) -> Result<Option<String>, AppError>;
}

pub async fn signature_validation_middleware<S>(
    State(state): State<S>,
    req: Request,
    next: Next,
) -> Result<Response, AppError>
where
    S: AsRef<SignatureConfig> + SignatureStore + Clone + Send + Sync + 'static,
{
    let config = state.as_ref();
    let path = req.uri().path();

    if config
        .excluded_paths
        .iter()
        .any(|p| path == p || path.starts_with(p))
    {
        return Ok(next.run(req).await);
    }

    // When signatures are optional, unsigned requests pass through; a signed
    // request is still verified so a bad signature never goes unnoticed.
    if !config.require_signatures && !req.headers().contains_key("X-Signature") {
        return Ok(next.run(req).await);
    }

    let (client_id, timestamp_str, nonce, signature) = extract_auth_headers(req.headers())?;

    let timestamp: i64 = timestamp_str
        .parse()
        .map_err(|_| AppError::AuthError(anyhow::anyhow!("Invalid timestamp format")))?;

    let now = chrono::Utc::now().timestamp();
    if (now - timestamp).abs() > TIMESTAMP_SKEW_SECS {
        return Err(AppError::AuthError(anyhow::anyhow!(
            "Request timestamp expired"
        )));
    }

    if !state.validate_nonce(&nonce).await? {
        return Err(AppError::AuthError(anyhow::anyhow!(
            "Replay detected (nonce used)"
        )));
    }

    let secret = state.get_signing_secret(&client_id).await?;
    let secret = secret.ok_or_else(|| AppError::AuthError(anyhow::anyhow!("Invalid Client ID")))?;

    let (parts, body) = req.into_parts();
    let bytes = body
        .collect()
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to read body: {}", e)))?
        .to_bytes();

    let body_str = std::str::from_utf8(&bytes).unwrap_or("");

    let is_valid = verify_signature(
        &secret,
        parts.method.as_str(),
        parts.uri.path(),
        timestamp,
        &nonce,
        body_str,
        &signature,
    )
    .map_err(|e| AppError::InternalError(anyhow::anyhow!("Signature verification error: {}", e)))?;

    if !is_valid {
        return Err(AppError::AuthError(anyhow::anyhow!("Invalid signature")));
    }

    let req = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(req).await)
}

fn extract_auth_headers(headers: &HeaderMap) -> Result<(String, String, String, String), AppError> {
    let client_id = get_header(headers, "X-Client-ID")?;
    let timestamp = get_header(headers, "X-Timestamp")?;
    let nonce = get_header(headers, "X-Nonce")?;
    let signature = get_header(headers, "X-Signature")?;
    Ok((client_id, timestamp, nonce, signature))
}

fn get_header(headers: &HeaderMap, key: &str) -> Result<String, AppError> {
    headers
        .get(key)
        .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("Missing header: {}", key)))?
        .to_str()
        .map(|s| s.to_string())
        .map_err(|_| AppError::AuthError(anyhow::anyhow!("Invalid header format: {}", key)))
}
