//! Password Hashing
//! Mission: One-way salted hashing and verification of user secrets

use bcrypt::{BcryptError, DEFAULT_COST};

/// Hash a plaintext secret with the default work factor.
pub fn hash(secret: &str) -> Result<String, BcryptError> {
    bcrypt::hash(secret, DEFAULT_COST)
}

/// Hash with an explicit work factor (lower costs for tests).
pub fn hash_with_cost(secret: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(secret, cost)
}

/// Verify a secret against a stored digest.
///
/// Any malformed digest verifies as false rather than surfacing an error,
/// so callers get a uniform yes/no answer.
pub fn verify(secret: &str, digest: &str) -> bool {
    bcrypt::verify(secret, digest).unwrap_or(false)
}
