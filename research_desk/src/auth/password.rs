//! Argon2id password hashing.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

use super::{
    errors::{AuthError, AuthResult},
    models::StoredHash,
};

/// Argon2 cost parameters.
///
/// The defaults follow the Argon2 recommendation (19 MiB, 2 passes, 1 lane),
/// which takes tens of milliseconds on typical server hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl HashCost {
    /// Smallest parameters Argon2 accepts. Only suitable for tests and examples.
    pub const fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way salted password hasher.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    cost: HashCost,
    dummy_hash: String,
}

impl PasswordHasher {
    /// Create a hasher with the given cost.
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Cost parameters rejected by Argon2
    pub fn new(cost: HashCost) -> AuthResult<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AuthError::Validation(format!("Invalid password hash cost: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(b"research-desk-dummy-password", &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string();

        Ok(Self {
            argon2,
            cost,
            dummy_hash,
        })
    }

    /// Cost parameters in use.
    pub fn cost(&self) -> HashCost {
        self.cost
    }

    /// Hash a password with a fresh random salt.
    ///
    /// Two calls with the same password produce different PHC strings.
    pub fn hash(&self, password: &str) -> AuthResult<StoredHash> {
        ensure_not_empty(password)?;
        let salt = SaltString::generate(&mut OsRng);

        let phc = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string();

        Ok(StoredHash::new(phc))
    }

    /// Verify a password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch without saying why. A stored hash that
    /// cannot be parsed is a server fault and yields `AuthError::HashingFailed`.
    pub fn verify(&self, password: &str, hash: &StoredHash) -> AuthResult<bool> {
        ensure_not_empty(password)?;
        let parsed = PasswordHash::new(hash.as_str()).map_err(|_| {
            log::error!("Stored password hash is not a valid PHC string");
            AuthError::HashingFailed
        })?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Run a verification against an internal hash and discard the outcome.
    ///
    /// Used when no stored hash exists so that the caller spends the same work
    /// as for a real mismatch.
    pub fn verify_dummy(&self, password: &str) {
        if let Ok(parsed) = PasswordHash::new(&self.dummy_hash) {
            let _ = self.argon2.verify_password(password.as_bytes(), &parsed);
        }
    }
}

fn ensure_not_empty(password: &str) -> AuthResult<()> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }
    Ok(())
}
