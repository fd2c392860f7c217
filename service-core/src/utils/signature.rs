use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Signed payload layout: `v1|method|path|timestamp|nonce|sha256(body)`.
/// The version tag lets the scheme rotate without ambiguity.
const SCHEME_VERSION: &str = "v1";

fn body_digest(body: &str) -> String {
    hex::encode(Sha256::digest(body.as_bytes()))
}

/// Generate an HMAC-SHA256 signature over the canonical request payload.
pub fn generate_signature(
    secret: &str,
    method: &str,
    path: &str,
    timestamp: i64,
    nonce: &str,
    body: &str,
) -> Result<String, anyhow::Error> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid key length: {}", e))?;

    let payload = format!(
        "{}|{}|{}|{}|{}|{}",
        SCHEME_VERSION,
        method,
        path,
        timestamp,
        nonce,
        body_digest(body)
    );

    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a signature using constant-time comparison.
pub fn verify_signature(
    secret: &str,
    method: &str,
    path: &str,
    timestamp: i64,
    nonce: &str,
    body: &str,
    signature: &str,
) -> Result<bool, anyhow::Error> {
    let expected = generate_signature(secret, method, path, timestamp, nonce, body)?;

    let expected_bytes = expected.as_bytes();
    let signature_bytes = signature.as_bytes();

    if expected_bytes.len() != signature_bytes.len() {
        return Ok(false);
    }

    Ok(expected_bytes.ct_eq(signature_bytes).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_signed_request() {
        let signature = generate_signature(
            "signing-secret",
            "POST",
            "/proposals/42/generate-invoice",
            1717000000,
            "nonce-abc",
            r#"{"note":"q3 retainer"}"#,
        )
        .unwrap();
        assert!(!signature.is_empty());

        let is_valid = verify_signature(
            "signing-secret",
            "POST",
            "/proposals/42/generate-invoice",
            1717000000,
            "nonce-abc",
            r#"{"note":"q3 retainer"}"#,
            &signature,
        )
        .unwrap();
        assert!(is_valid);
    }

    #[test]
    fn rejects_a_flipped_signature() {
        let signature = generate_signature("s", "GET", "/bills", 1717000000, "n", "").unwrap();
        let tampered = format!("a{}", &signature[1..]);

        let is_valid =
            verify_signature("s", "GET", "/bills", 1717000000, "n", "", &tampered).unwrap();
        assert!(!is_valid);
    }

    #[test]
    fn rejects_a_tampered_body() {
        let signature = generate_signature(
            "s",
            "POST",
            "/proposals",
            1717000000,
            "n",
            r#"{"amount":"1000"}"#,
        )
        .unwrap();

        let is_valid = verify_signature(
            "s",
            "POST",
            "/proposals",
            1717000000,
            "n",
            r#"{"amount":"9000"}"#,
            &signature,
        )
        .unwrap();
        assert!(!is_valid);
    }

    #[test]
    fn rejects_a_wrong_length_signature() {
        let is_valid =
            verify_signature("s", "GET", "/bills", 1717000000, "n", "", "deadbeef").unwrap();
        assert!(!is_valid);
    }
}
