use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verifies a webhook delivery: HMAC-SHA256 over the exact raw request
/// bytes, compared in constant time against the hex-encoded signature
/// header. Returns `false` (never an error) when no secret is configured,
/// no signature was supplied, or anything fails to decode.
///
/// Must be fed the unparsed byte stream; re-serialized JSON is not
/// guaranteed to reproduce the original bytes.
pub fn verify(secret: Option<&str>, payload: &[u8], signature: Option<&str>) -> bool {
    let (Some(secret), Some(signature)) = (secret, signature) else {
        return false;
    };
    if secret.is_empty() || signature.trim().is_empty() {
        return false;
    }
    let Ok(provided) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    let digest = mac.finalize().into_bytes();
    digest.as_slice().ct_eq(provided.as_slice()).into()
}

/// Hex HMAC-SHA256 of `payload` under `secret`. Used by tests and by
/// anyone needing to sign a payload the way the webhook sender does.
pub fn sign(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}
