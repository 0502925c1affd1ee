//! Per-cycle source-password generation.
//!
//! The generated credential guards the streaming server's source port, which
//! only loopback clients can reach; it is an operational credential, not a
//! security boundary. The thread-local RNG is unpredictable but not a CSPRNG.
//! Treat as low-assurance if ever reused across a trust boundary.

use rand::seq::SliceRandom;
use rand::Rng;

/// Character classes with visually ambiguous members removed
/// (no 0/1/5/8, O/I/S/B/U/V, b/i/l/o/s/u/v).
const NUMERIC: &[u8] = b"234679";
const UPPERCASE: &[u8] = b"ACDEFGHJKLMNPQRTWXYZ";
const LOWERCASE: &[u8] = b"acdefghjkmnpqrtwxyz";

pub const DEFAULT_LENGTH: usize = 8;

/// Generate a `length`-character password cycling the three character classes
/// by position, then shuffling.
pub fn generate_password(length: usize) -> String {
    let classes: [&[u8]; 3] = [NUMERIC, UPPERCASE, LOWERCASE];
    let mut rng = rand::rng();

    let mut chars: Vec<u8> = (1..=length)
        .map(|position| {
            let class = classes[position % 3];
            class[rng.random_range(0..class.len())]
        })
        .collect();
    chars.shuffle(&mut rng);

    String::from_utf8(chars).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn whitelisted(c: u8) -> bool {
        NUMERIC.contains(&c) || UPPERCASE.contains(&c) || LOWERCASE.contains(&c)
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(8)]
    #[case(17)]
    #[case(64)]
    fn output_length_matches_request(#[case] length: usize) {
        assert_eq!(generate_password(length).len(), length);
    }

    #[test]
    fn zero_length_yields_empty() {
        assert_eq!(generate_password(0), "");
    }

    #[test]
    fn every_character_is_whitelisted() {
        for _ in 0..50 {
            let password = generate_password(DEFAULT_LENGTH);
            assert!(
                password.bytes().all(whitelisted),
                "unexpected character in '{password}'"
            );
        }
    }

    #[test]
    fn successive_passwords_differ() {
        // Astronomically unlikely to collide; a stuck RNG would fail this.
        let a = generate_password(32);
        let b = generate_password(32);
        assert_ne!(a, b);
    }
}
