use super::token::CredentialError;

/// Hashes `password` with bcrypt at `cost`. CPU bound; call from a blocking context.
pub fn hash_password(password: &str, cost: u32) -> Result<String, CredentialError> {
    bcrypt::hash(password, cost).map_err(|err| CredentialError::Hashing(err.to_string()))
}

/// Returns `Ok(false)` for a mismatch; malformed stored hashes are reported as errors.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    bcrypt::verify(password, hash).map_err(|err| CredentialError::Hashing(err.to_string()))
}
