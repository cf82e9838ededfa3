//! One-time code generation and digests

use rand::Rng;
use sha2::{Digest, Sha256};

/// Uniformly random six digit code without a leading zero.
pub fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..=999_999);
    code.to_string()
}

/// Hex SHA-256 of a code; entries keep this instead of the code itself.
pub fn digest_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.trim().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(digest_code("123456"), digest_code("123456"));
        assert_eq!(digest_code(" 123456 "), digest_code("123456"));
        assert_ne!(digest_code("123456"), digest_code("123457"));
    }
}
