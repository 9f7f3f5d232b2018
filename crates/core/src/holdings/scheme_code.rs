//! Stable scheme codes for statements that do not print an ISIN.
//!
//! The code is part of the holding's upsert key, so it must come out the same
//! every time the same fund is imported, whatever the statement layout.

use sha2::{Digest, Sha256};

use crate::constants::{SYNTHETIC_SCHEME_CODE_HEX_LEN, SYNTHETIC_SCHEME_CODE_PREFIX};

/// Derives a scheme code from the scheme name.
///
/// The name is lower-cased, stripped of everything but letters, digits and
/// single spaces, then hashed with SHA-256; the code is the prefix plus the
/// first hex characters of the digest.
pub fn synthesize_scheme_code(scheme_name: &str) -> String {
    let normalized = normalize_scheme_name(scheme_name);

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!(
        "{}{}",
        SYNTHETIC_SCHEME_CODE_PREFIX,
        &digest[..SYNTHETIC_SCHEME_CODE_HEX_LEN]
    )
}

/// Lower-case, drop punctuation and collapse whitespace
fn normalize_scheme_name(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_shape() {
        let code = synthesize_scheme_code("ABC Equity Fund");
        assert!(code.starts_with("SYN-"));
        assert_eq!(code.len(), 4 + 16);
    }

    #[test]
    fn test_cosmetic_differences_give_the_same_code() {
        let a = synthesize_scheme_code("ABC Equity Fund - Growth");
        let b = synthesize_scheme_code("  abc   EQUITY fund growth ");
        let c = synthesize_scheme_code("ABC Equity Fund (Growth)");
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_different_schemes_get_different_codes() {
        assert_ne!(
            synthesize_scheme_code("ABC Equity Fund"),
            synthesize_scheme_code("ABC Debt Fund")
        );
    }

    #[test]
    fn test_normalize_scheme_name() {
        assert_eq!(
            normalize_scheme_name("  XYZ  Bond-Fund (IDCW) "),
            "xyz bond fund idcw"
        );
    }
}
