//! Password hashing and verification.
//!
//! Bcrypt embeds the salt in the hash output, so the stored string is all
//! the verifier needs.

use crate::error::{ApiError, ApiResult};

/// Hash a plaintext password with the given work factor.
pub fn hash_password(plain: &str, cost: u32) -> ApiResult<String> {
    bcrypt::hash(plain, cost)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {}", e)))
}

/// Verify a plaintext password against a stored hash.
///
/// Returns false on mismatch or on a malformed hash; a user-facing
/// mismatch is never an error.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    bcrypt::verify(plain, hashed).unwrap_or(false)
}
