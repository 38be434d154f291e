//! Password hashing with PBKDF2-SHA256 and a per-user random salt.
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<salt_b64>$<hash_b64>`.

use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
const HASH_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD_NO_PAD;

/// Hash a password with a fresh random salt at the default work factor.
pub fn hash_password(password: &str) -> String {
    hash_password_with_iterations(password, PBKDF2_ITERATIONS)
}

pub fn hash_password_with_iterations(password: &str, iterations: u32) -> String {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let digest = derive(password, &salt, iterations);
    format!(
        "pbkdf2-sha256${iterations}${}${}",
        B64.encode(salt),
        B64.encode(digest)
    )
}

/// Verify a password against a stored hash string. Malformed stored hashes
/// verify as false rather than erroring — the caller treats both the same.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some("pbkdf2-sha256"), Some(iterations), Some(salt), Some(digest), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (B64.decode(salt), B64.decode(digest)) else {
        return false;
    };

    let actual = derive(password, &salt, iterations);
    actual.ct_eq(&expected).into()
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_roundtrip() {
        let stored = hash_password_with_iterations("hunter2", 1_000);
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password_with_iterations("hunter2", 1_000);
        let b = hash_password_with_iterations("hunter2", 1_000);
        assert_ne!(a, b); // Random salt
    }

    #[test]
    fn malformed_stored_hash_verifies_false() {
        assert!(!verify_password("hunter2", "not-a-hash"));
        assert!(!verify_password("hunter2", "pbkdf2-sha256$abc$!!$!!"));
        assert!(!verify_password("hunter2", ""));
    }

    #[test]
    fn default_work_factor_takes_meaningful_time() {
        let start = std::time::Instant::now();
        let _stored = hash_password("test-password");
        let elapsed = start.elapsed();
        assert!(
            elapsed.as_millis() > 100,
            "PBKDF2 too fast: {}ms — brute force protection insufficient",
            elapsed.as_millis()
        );
    }
}
