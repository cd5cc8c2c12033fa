//! Marketplace credential derivation.
//!
//! The marketplace authenticates a maker by a credential derived from the raw
//! account token: the SHA-256 digest of the token, encoded with the
//! marketplace's own variable-width base-91 codec. The codec packs bits
//! LSB-first and switches between 13- and 14-bit groups depending on the
//! extracted value; the branch thresholds below are part of the wire format
//! and must not change.

use sha2::{Digest, Sha256};

/// The 91-character output alphabet. Symbol order is part of the wire format.
const BASE91_ALPHABET: &[u8; 91] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!#$%&()*+,./:;<=>?@[]^_`{|}~\"";

/// Derive the transport credential for a raw account token.
///
/// Deterministic and total: the same token always yields the same credential,
/// so a relaunched process interoperates with sessions created by earlier
/// runs. Only the derived credential ever leaves the process.
pub fn hash_token(token: &[u8]) -> String {
    let digest = Sha256::digest(token);
    encode_base91(&digest)
}

/// Encode bytes with the marketplace's base-91 scheme.
///
/// Bits accumulate LSB-first into a buffer. Whenever more than 13 bits are
/// available, a 13-bit group is extracted; if its value is 88 or less the
/// group widens to 14 bits. Each group emits two symbols (`value % 91`,
/// `value / 91`). Leftover bits emit one trailing symbol, plus a second when
/// more than 7 bits remain or the leftover value exceeds 90.
pub fn encode_base91(input: &[u8]) -> String {
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = String::with_capacity(input.len() * 2);

    for &byte in input {
        buffer |= u32::from(byte) << bits;
        bits += 8;

        if bits > 13 {
            let mut value = buffer & 8191;
            if value > 88 {
                buffer >>= 13;
                bits -= 13;
            } else {
                value = buffer & 16383;
                buffer >>= 14;
                bits -= 14;
            }

            out.push(BASE91_ALPHABET[(value % 91) as usize] as char);
            out.push(BASE91_ALPHABET[(value / 91) as usize] as char);
        }
    }

    if bits != 0 {
        out.push(BASE91_ALPHABET[(buffer % 91) as usize] as char);
        if bits > 7 || buffer > 90 {
            out.push(BASE91_ALPHABET[(buffer / 91) as usize] as char);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_has_91_unique_symbols() {
        let mut seen = std::collections::HashSet::new();
        for &b in BASE91_ALPHABET.iter() {
            assert!(seen.insert(b), "duplicate symbol {}", b as char);
        }
        assert_eq!(seen.len(), 91);
    }

    #[test]
    fn test_empty_input_is_empty() {
        assert_eq!(encode_base91(&[]), "");
    }

    #[test]
    fn test_single_zero_byte_emits_two_trailing_symbols() {
        // 8 leftover bits trip the `bits > 7` trailing branch.
        assert_eq!(encode_base91(&[0x00]), "AA");
    }

    #[test]
    fn test_two_zero_bytes_emit_one_trailing_symbol() {
        // One 14-bit group is consumed, leaving 2 bits and a value of zero.
        assert_eq!(encode_base91(&[0x00, 0x00]), "AAA");
    }

    #[test]
    fn test_small_group_value_widens_to_14_bits() {
        // LSB-first packing of [0x01, 0x00] yields value 1 (<= 88), so the
        // group consumes 14 bits and drains the buffer completely.
        assert_eq!(encode_base91(&[0x01, 0x00]), "BAA");
    }

    #[test]
    fn test_large_group_value_consumes_13_bits() {
        // All-ones gives the 13-bit value 8191 (> 88): 13 bits consumed,
        // 3 bits (value 7) left over.
        assert_eq!(encode_base91(&[0xFF, 0xFF]), "B\"H");
    }

    #[test]
    fn test_leftover_value_above_90_emits_second_symbol() {
        // Nine 0xFF bytes end with exactly 7 bits, value 127: the `bits > 7`
        // branch does not fire but `buffer > 90` does.
        assert_eq!(encode_base91(&[0xFF; 9]), "B\"B\"B\"B\"B\"kB");
    }

    #[test]
    fn test_all_zero_digest_vector() {
        assert_eq!(encode_base91(&[0x00; 32]), "A".repeat(37));
    }

    #[test]
    fn test_all_ones_digest_vector() {
        let expected = format!("{}4F", "B\"".repeat(19));
        assert_eq!(encode_base91(&[0xFF; 32]), expected);
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let a = hash_token(b"maker-session-token");
        let b = hash_token(b"maker-session-token");
        assert_eq!(a, b);
        assert_ne!(a, hash_token(b"another-token"));
    }

    #[test]
    fn test_hash_token_output_stays_in_alphabet() {
        let cred = hash_token(b"maker-session-token");
        assert!(!cred.is_empty());
        assert!(cred.bytes().all(|b| BASE91_ALPHABET.contains(&b)));
    }
}
