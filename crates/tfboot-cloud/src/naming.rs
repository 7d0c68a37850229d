//! Resource names
//!
//! Only the bucket name is randomized, since bucket names share a global
//! namespace. Everything else is derived from the configured name, so a
//! second run with the same name collides on the service account instead
//! of quietly creating a duplicate identity.

use base32::Alphabet;
use rand::RngCore;
use rand::rngs::OsRng;

/// Random bytes behind a bucket suffix
pub const SUFFIX_BYTES: usize = 6;

/// Length of an encoded suffix
pub const SUFFIX_LEN: usize = 8;

/// Fresh 8-character `[a-z2-7]` suffix from the OS random source
pub fn random_suffix() -> String {
    let mut bytes = [0u8; SUFFIX_BYTES];
    OsRng.fill_bytes(&mut bytes);
    encode_suffix(&bytes)
}

/// Lowercase unpadded base-32, cut to [`SUFFIX_LEN`] characters
///
/// Six bytes encode to ten characters. Only the first eight are kept, so the
/// suffix carries 40 bits and the tail of the last byte is dropped.
pub fn encode_suffix(bytes: &[u8; SUFFIX_BYTES]) -> String {
    let mut encoded =
        base32::encode(Alphabet::Rfc4648 { padding: false }, bytes).to_ascii_lowercase();
    encoded.truncate(SUFFIX_LEN);
    encoded
}

pub fn bucket_name(name: &str, suffix: &str) -> String {
    format!("{}-tf-state-{}", name, suffix)
}

pub fn service_account_name(name: &str) -> String {
    format!("{}-tf-state-manager", name)
}

pub fn secret_name(name: &str) -> String {
    format!("{}-sa-access-key", service_account_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_encode_known_bytes() {
        assert_eq!(encode_suffix(&[0; SUFFIX_BYTES]), "aaaaaaaa");
        assert_eq!(encode_suffix(&[0xff; SUFFIX_BYTES]), "77777777");
        assert_eq!(encode_suffix(b"foobar"), "mzxw6ytb");
    }

    #[test]
    fn test_suffix_uses_first_forty_bits() {
        let low = [1, 2, 3, 4, 5, 0x00];
        let high = [1, 2, 3, 4, 5, 0xff];
        assert_eq!(encode_suffix(&low), encode_suffix(&high));
        assert_eq!(encode_suffix(&low).len(), SUFFIX_LEN);
    }

    #[test]
    fn test_random_suffix_format() {
        let re = regex::Regex::new(r"^[a-z2-7]{8}$").unwrap();
        for _ in 0..64 {
            let suffix = random_suffix();
            assert!(re.is_match(&suffix), "bad suffix: {}", suffix);
        }
    }

    #[test]
    fn test_random_suffix_distinct() {
        let suffixes: HashSet<String> = (0..256).map(|_| random_suffix()).collect();
        assert_eq!(suffixes.len(), 256);
    }

    #[test]
    fn test_derived_names() {
        assert_eq!(bucket_name("demo", "abcdefgh"), "demo-tf-state-abcdefgh");
        assert_eq!(service_account_name("demo"), "demo-tf-state-manager");
        assert_eq!(secret_name("demo"), "demo-tf-state-manager-sa-access-key");
    }
}
