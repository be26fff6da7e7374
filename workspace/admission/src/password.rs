//! Password hashing for provisioned accounts.

use crate::error::{AdmissionError, Result};
use bcrypt::{hash, DEFAULT_COST};

/// Bcrypt cost factor for password hashing.
pub const BCRYPT_COST: u32 = DEFAULT_COST;

/// Hash a password using bcrypt.
///
/// Runs on the blocking thread pool since bcrypt is CPU-intensive.
///
/// # Arguments
/// * `password` - Plain text password to hash
/// * `cost` - Optional bcrypt cost (defaults to BCRYPT_COST)
pub async fn hash_password(password: &str, cost: Option<u32>) -> Result<String> {
    let password = password.to_string();
    let cost = cost.unwrap_or(BCRYPT_COST);

    tokio::task::spawn_blocking(move || {
        hash(password, cost).map_err(|e| AdmissionError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AdmissionError::Hashing(format!("Task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_verifies_against_original() {
        // Low cost to keep the test fast
        let hashed = hash_password("dojo1234", Some(4)).await.unwrap();

        assert!(bcrypt::verify("dojo1234", &hashed).unwrap());
        assert!(!bcrypt::verify("wrong", &hashed).unwrap());
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let a = hash_password("dojo1234", Some(4)).await.unwrap();
        let b = hash_password("dojo1234", Some(4)).await.unwrap();
        assert_ne!(a, b);
    }
}
