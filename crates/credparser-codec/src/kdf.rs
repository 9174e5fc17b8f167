// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key derivation from (master seed, salt, signer).
//!
//! The seed is XORed with the repeating `salt || signer` pattern, then hashed
//! with SHA-512 a salt-dependent number of times:
//! `key = H(... H(H(transformed || salt || signer) || salt || signer) ...)`.
//! Identical inputs always produce the identical key; decoding depends on it.

use credparser_config::CodecConfig;
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

use crate::cipher::key_filter;

/// Length of a derived key in bytes (one SHA-512 digest).
pub const DERIVED_KEY_LEN: usize = 64;

/// Number of hash rounds for `salt`.
///
/// The sum of the salt's character codes modulo `max_hash_rounds`, raised to
/// `min_hash_rounds` when it does not exceed it.
pub fn hash_rounds(salt: &str, config: &CodecConfig) -> u32 {
    let sum: u64 = salt.chars().map(u64::from).sum();
    let rounds = (sum % u64::from(config.max_hash_rounds())) as u32;
    if rounds > config.min_hash_rounds() {
        rounds
    } else {
        config.min_hash_rounds()
    }
}

/// Derive the one-time cipher key for a single message.
pub fn derive_key(
    seed: &[u8],
    salt: &str,
    signer: &str,
    config: &CodecConfig,
) -> Zeroizing<[u8; DERIVED_KEY_LEN]> {
    let salt_bytes = salt.as_bytes();
    let signer_bytes = signer.as_bytes();

    let pattern = Zeroizing::new([salt_bytes, signer_bytes].concat());
    let mut input = Zeroizing::new(key_filter(seed, &pattern));

    let mut key = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    for _ in 0..hash_rounds(salt, config) {
        let digest = Sha512::new()
            .chain_update(input.as_slice())
            .chain_update(salt_bytes)
            .chain_update(signer_bytes)
            .finalize();
        key.copy_from_slice(&digest);
        input = Zeroizing::new(key.to_vec());
    }

    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn hash_rounds_uses_salt_sum_modulo_max() {
        let config = CodecConfig::default();
        // 12 * 'a' (97) = 1164; 1164 % 24 = 12
        assert_eq!(hash_rounds("aaaaaaaaaaaa", &config), 12);
    }

    #[test]
    fn hash_rounds_never_drops_below_min() {
        let config = CodecConfig::default();
        // 12 * '0' (48) = 576; 576 % 24 = 0
        assert_eq!(hash_rounds("000000000000", &config), 3);
        // 8 * 'A' (65) + 4 * 'B' (66) = 784; 784 % 24 = 16
        assert_eq!(hash_rounds("AAAAAAAABBBB", &config), 16);
    }

    #[test]
    fn hash_rounds_equal_to_min_uses_min() {
        let config = CodecConfig::new(8, 4, 24).unwrap();
        // 8 * 'a' (97) = 776; 776 % 24 = 8
        assert_eq!(hash_rounds("aaaaaaaa", &config), 8);
        let config = CodecConfig::new(8, 8, 24).unwrap();
        assert_eq!(hash_rounds("aaaaaaaa", &config), 8);
    }

    #[test]
    fn derive_key_known_answer() {
        let seed = [0u8; 1024];
        let key = derive_key(&seed, "aaaaaaaaaaaa", "svc", &CodecConfig::default());
        assert_eq!(
            hex(key.as_slice()),
            "02e0fb2950e8cf99c0c7c06b3f2a6e28f4517d14cf11a7a258d21be910c18d9a\
             6c37a56a3880bbc53dca69bd4b732e5b67b5295db87c0f28a885f6aab5823257"
        );
    }

    #[test]
    fn derive_key_is_deterministic() {
        let seed: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
        let config = CodecConfig::default();
        let key1 = derive_key(&seed, "Xy12Zq98Lm0P", "alice", &config);
        let key2 = derive_key(&seed, "Xy12Zq98Lm0P", "alice", &config);
        assert_eq!(*key1, *key2);
    }

    #[test]
    fn derive_key_depends_on_every_input() {
        let seed = [7u8; 1024];
        let config = CodecConfig::default();
        let base = derive_key(&seed, "Xy12Zq98Lm0P", "alice", &config);

        let other_signer = derive_key(&seed, "Xy12Zq98Lm0P", "bob", &config);
        let other_salt = derive_key(&seed, "Xy12Zq98Lm0Q", "alice", &config);
        let other_seed = derive_key(&[8u8; 1024], "Xy12Zq98Lm0P", "alice", &config);

        assert_ne!(*base, *other_signer);
        assert_ne!(*base, *other_salt);
        assert_ne!(*base, *other_seed);
    }
}
