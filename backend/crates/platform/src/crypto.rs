//! Cryptographic Utilities
//!
//! Session cookies carry `base64url(id || HMAC-SHA256(secret, id))`, so a
//! token can be checked without a store round-trip.

use base64::{Engine, engine::general_purpose};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// Length of a signed ID token once decoded: 16 (UUID) + 32 (HMAC)
const SIGNED_ID_LEN: usize = 48;

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8; 32], data: &[u8]) -> [u8; 32] {
    // HMAC: H((K XOR opad) || H((K XOR ipad) || message))
    let mut o_key_pad = [0x5cu8; 64];
    let mut i_key_pad = [0x36u8; 64];

    for i in 0..32 {
        o_key_pad[i] ^= key[i];
        i_key_pad[i] ^= key[i];
    }

    let mut inner_hash = Sha256::new();
    inner_hash.update(i_key_pad);
    inner_hash.update(data);
    let inner_result = inner_hash.finalize();

    let mut outer_hash = Sha256::new();
    outer_hash.update(o_key_pad);
    outer_hash.update(inner_result);
    outer_hash.finalize().into()
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Sign a 16-byte ID into a cookie-safe token
pub fn sign_id(secret: &[u8; 32], id: &[u8; 16]) -> String {
    let mut data = Vec::with_capacity(SIGNED_ID_LEN);
    data.extend_from_slice(id);
    data.extend_from_slice(&hmac_sha256(secret, id));
    general_purpose::URL_SAFE_NO_PAD.encode(data)
}

/// Verify a token produced by [`sign_id`] and return the embedded ID
///
/// Returns `None` for anything malformed or signed with another secret.
pub fn verify_signed_id(secret: &[u8; 32], token: &str) -> Option<[u8; 16]> {
    let data = general_purpose::URL_SAFE_NO_PAD.decode(token).ok()?;
    if data.len() != SIGNED_ID_LEN {
        return None;
    }

    let id: [u8; 16] = data[0..16].try_into().ok()?;
    let expected = hmac_sha256(secret, &id);

    if !constant_time_eq(&data[16..], &expected) {
        return None;
    }

    Some(id)
}
