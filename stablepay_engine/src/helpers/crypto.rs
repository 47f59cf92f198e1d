use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// The SHA-256 hash of a raw API key, hex-encoded. This is what gets persisted.
pub fn api_key_hash(raw_key: &str) -> String {
    hex::encode(Sha256::digest(raw_key.as_bytes()))
}

/// The visible portion of a raw API key, used to recognise keys in a list and to narrow the candidate set during
/// authentication.
pub fn api_key_prefix(raw_key: &str) -> String {
    let prefix: String = raw_key.chars().take(12).collect();
    format!("{prefix}...")
}

/// A fresh webhook signing secret: `whsec_` followed by 48 hex characters.
pub fn new_webhook_secret() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("whsec_{}", hex::encode(bytes))
}

/// Signs a webhook payload with HMAC-SHA256, returning the hex-encoded signature.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take a key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex-encoded HMAC-SHA256 signature over the payload. Signatures that are not 64 hex characters are
/// rejected before any comparison; the comparison itself is constant-time.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    if signature.len() != 64 {
        return false;
    }
    let sig_bytes = match hex::decode(signature) {
        Ok(b) => b,
        Err(_) => return false,
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take a key of any size");
    mac.update(payload);
    mac.verify_slice(&sig_bytes).is_ok()
}

/// Constant-time equality for equal-length byte strings. Unequal lengths return false immediately, which is fine for
/// comparing fixed-length digests.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}
