//! Six-digit one-time verification codes for email confirmation.

use std::time::Duration;

use rand::Rng;
use subtle::ConstantTimeEq;

pub const OTP_DIGITS: usize = 6;

/// How long a code stays valid after being issued.
pub const OTP_TTL: Duration = Duration::from_secs(600);

/// Generate a random six-digit code, zero-padded.
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    (0..OTP_DIGITS)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Compare a submitted code against the issued one in constant time.
pub fn verify_otp(submitted: &str, issued: &str) -> bool {
    if submitted.len() != issued.len() {
        return false;
    }
    submitted.as_bytes().ct_eq(issued.as_bytes()).into()
}
