use crate::error::AppError;
use bcrypt::{hash, verify};

/// bcrypt only reads this many bytes of input; anything after is ignored.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted bcrypt hashing with a configurable work factor.
///
/// Both operations are CPU bound. Handlers call them through
/// `actix_web::web::block` so they run on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Fails with `AppError::Validation` for input bcrypt would truncate.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::Validation(format!(
                "password: must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        Ok(hash(password, self.cost)?)
    }

    /// Returns `false` for a wrong password and for a hash bcrypt cannot parse.
    /// Over-long input never verifies, since no stored hash can come from it.
    pub fn verify(&self, password: &str, hashed_password: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        match verify(password, hashed_password) {
            Ok(matches) => matches,
            Err(e) => {
                log::debug!("Password verification failed on malformed hash: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost keeps the tests fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn test_password_hashing_and_verification() {
        let hasher = PasswordHasher::new(TEST_COST);
        let password = "test_password123";
        let hashed = hasher.hash(password).unwrap();

        assert_ne!(hashed, password);
        assert!(hasher.verify(password, &hashed));
        assert!(!hasher.verify("wrong_password", &hashed));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = PasswordHasher::new(TEST_COST);
        let first = hasher.hash("same password").unwrap();
        let second = hasher.hash("same password").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same password", &first));
        assert!(hasher.verify("same password", &second));
    }

    #[test]
    fn test_password_over_bcrypt_limit_is_rejected() {
        let hasher = PasswordHasher::new(TEST_COST);
        let at_limit = "a".repeat(MAX_PASSWORD_BYTES);
        let hashed = hasher.hash(&at_limit).unwrap();
        assert!(hasher.verify(&at_limit, &hashed));

        // Bytes past the limit would be ignored by bcrypt and match the shorter password.
        let longer = format!("{}Y", at_limit);
        assert!(!hasher.verify(&longer, &hashed));
        assert!(matches!(
            hasher.hash(&format!("{}X", at_limit)),
            Err(AppError::Validation(_))
        ));

        // Multi-byte characters count by byte, not by char.
        let wide = "é".repeat(37);
        assert!(matches!(hasher.hash(&wide), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        let hasher = PasswordHasher::new(TEST_COST);
        assert!(!hasher.verify("test_password123", "invalidhashformat"));
        assert!(!hasher.verify("test_password123", ""));
    }
}
