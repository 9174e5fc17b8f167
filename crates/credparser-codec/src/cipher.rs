// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stateless byte scrambler applied to the framed message.
//!
//! Two self-inverse steps: [`binflip`] reverses the bit order inside each
//! byte, [`key_filter`] XORs the data with the derived key tiled to the data
//! length. Encoding flips then filters; decoding filters then flips.

/// Reverse the bit order inside a byte (bit 7 becomes bit 0).
pub fn binflip(byte: u8) -> u8 {
    byte.reverse_bits()
}

/// XOR `data` against `key` repeated to the length of `data`.
///
/// An empty key leaves the data unchanged.
pub fn key_filter(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .zip(key.iter().cycle())
        .map(|(d, k)| d ^ k)
        .collect()
}

/// Encode direction: bit-reverse every byte, then XOR with the key.
pub fn scramble(message: &[u8], key: &[u8]) -> Vec<u8> {
    let flipped: Vec<u8> = message.iter().copied().map(binflip).collect();
    key_filter(&flipped, key)
}

/// Decode direction: XOR with the key, then undo the bit reversal.
pub fn unscramble(ciphertext: &[u8], key: &[u8]) -> Vec<u8> {
    key_filter(ciphertext, key)
        .into_iter()
        .map(binflip)
        .collect()
}
