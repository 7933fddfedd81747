//! Player identity carried in the mini-app launch URL.
//!
//! The bot can sign `(tg_id, username)` with a shared secret so the web side
//! can trust the identity without a login step. Whether the HTTP surface
//! enforces the signature is decided by which [`IdentityVerifier`] it holds.

use crate::error::{GameError, GameResult};
use anyhow::Result;
use sha2::{Digest, Sha256};

const SHA256_BLOCK_SIZE: usize = 64;

/// HMAC-SHA256 (RFC 2104).
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut key_block = [0u8; SHA256_BLOCK_SIZE];
    if key.len() > SHA256_BLOCK_SIZE {
        let digest = Sha256::digest(key);
        key_block[..digest.len()].copy_from_slice(&digest);
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let mut ipad = [0x36u8; SHA256_BLOCK_SIZE];
    let mut opad = [0x5cu8; SHA256_BLOCK_SIZE];
    for ((i, o), k) in ipad.iter_mut().zip(opad.iter_mut()).zip(key_block.iter()) {
        *i ^= k;
        *o ^= k;
    }

    let mut inner = Sha256::new();
    inner.update(ipad);
    inner.update(data);
    let inner_hash = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(opad);
    outer.update(inner_hash);
    outer.finalize().into()
}

fn signing_payload(player_id: &str, display_name: Option<&str>) -> String {
    format!("{}:{}", player_id, display_name.unwrap_or(""))
}

pub fn sign_identity(secret: &str, player_id: &str, display_name: Option<&str>) -> String {
    let payload = signing_payload(player_id, display_name);
    hex::encode(hmac_sha256(secret.as_bytes(), payload.as_bytes()))
}

/// Mini-app URL with the player's identity in the query string, signed when a
/// secret is configured.
pub fn build_launch_url(
    webapp_url: &str,
    player_id: &str,
    display_name: Option<&str>,
    secret: Option<&str>,
) -> Result<String> {
    let mut params = vec![("tg_id", player_id.to_string())];
    if let Some(name) = display_name {
        params.push(("username", name.to_string()));
    }
    if let Some(secret) = secret {
        params.push(("sig", sign_identity(secret, player_id, display_name)));
    }
    let url = reqwest::Url::parse_with_params(webapp_url, &params)?;
    Ok(url.into())
}

pub trait IdentityVerifier: Send + Sync {
    fn verify(
        &self,
        player_id: &str,
        display_name: Option<&str>,
        signature: Option<&str>,
    ) -> GameResult<()>;
}

/// Accepts whatever identity the client claims.
pub struct TrustClientIdentity;

impl IdentityVerifier for TrustClientIdentity {
    fn verify(&self, _: &str, _: Option<&str>, _: Option<&str>) -> GameResult<()> {
        Ok(())
    }
}

pub struct HmacIdentityVerifier {
    secret: String,
}

impl HmacIdentityVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl IdentityVerifier for HmacIdentityVerifier {
    fn verify(
        &self,
        player_id: &str,
        display_name: Option<&str>,
        signature: Option<&str>,
    ) -> GameResult<()> {
        let provided = signature
            .and_then(|sig| hex::decode(sig.trim()).ok())
            .ok_or(GameError::InvalidSignature)?;
        let payload = signing_payload(player_id, display_name);
        let expected = hmac_sha256(self.secret.as_bytes(), payload.as_bytes());

        if provided.len() != expected.len() {
            return Err(GameError::InvalidSignature);
        }
        let diff = provided
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        if diff != 0 {
            return Err(GameError::InvalidSignature);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_rfc4231_case_2() {
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_hmac_rfc4231_long_key() {
        let key = [0xaau8; 131];
        let mac = hmac_sha256(
            &key,
            b"Test Using Larger Than Block-Size Key - Hash Key First",
        );
        assert_eq!(
            hex::encode(mac),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    #[test]
    fn test_signed_identity_verifies() {
        let sig = sign_identity("s3cret", "12345", Some("driller"));
        let verifier = HmacIdentityVerifier::new("s3cret");
        assert!(verifier.verify("12345", Some("driller"), Some(&sig)).is_ok());
    }

    #[test]
    fn test_tampered_identity_rejected() {
        let sig = sign_identity("s3cret", "12345", Some("driller"));
        let verifier = HmacIdentityVerifier::new("s3cret");
        assert!(verifier.verify("12345", Some("someone"), Some(&sig)).is_err());
        assert!(verifier.verify("99999", Some("driller"), Some(&sig)).is_err());
        assert!(verifier.verify("12345", Some("driller"), None).is_err());
        assert!(verifier.verify("12345", Some("driller"), Some("zz")).is_err());
    }

    #[test]
    fn test_trust_client_identity_accepts_anything() {
        assert!(TrustClientIdentity.verify("1", None, None).is_ok());
    }

    #[test]
    fn test_launch_url_without_secret() {
        let url =
            build_launch_url("https://mini.example/app", "42", Some("oil man"), None).unwrap();
        assert_eq!(url, "https://mini.example/app?tg_id=42&username=oil+man");
    }

    #[test]
    fn test_launch_url_with_secret_carries_signature() {
        let url = build_launch_url("https://mini.example/", "42", None, Some("k")).unwrap();
        let expected_sig = sign_identity("k", "42", None);
        assert_eq!(url, format!("https://mini.example/?tg_id=42&sig={expected_sig}"));
    }
}
