//! API token generation and hashing.
//!
//! Tokens are `ty_` followed by 48 hex characters of OS randomness. Only the
//! SHA-256 hash is stored; the raw token is shown once at creation.

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// API token identifier prefix.
pub const API_TOKEN_PREFIX: &str = "ty";

/// Number of random bytes encoded in a token.
pub const API_TOKEN_SECRET_BYTES: usize = 24;

/// Generate a fresh raw API token.
pub fn generate_api_token() -> String {
    let mut bytes = [0_u8; API_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut bytes);

    let mut token = String::with_capacity(3 + bytes.len() * 2);
    token.push_str(API_TOKEN_PREFIX);
    token.push('_');

    for byte in bytes {
        token.push_str(&format!("{byte:02x}"));
    }

    token
}

/// The at-rest form of a token.
pub fn hash_api_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
