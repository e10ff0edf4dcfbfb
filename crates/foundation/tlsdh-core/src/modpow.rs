//! Modular exponentiation over arbitrary-precision integers.

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Compute `base^exp mod modulus` by binary square-and-multiply.
///
/// Every intermediate product is a `BigUint`, so squarings never overflow
/// no matter how large the exponent grows. `exp == 0` yields `1 mod modulus`.
///
/// `modulus` must be non-zero; `DomainParams` guarantees that for every
/// call made by the handshake.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    debug_assert!(!modulus.is_zero(), "modulus must be positive");

    let mut result = BigUint::one() % modulus;
    let mut power = base % modulus;

    // Low bit first: multiply on set bits, square every round.
    for bit in 0..exp.bits() {
        if exp.bit(bit) {
            result = (&result * &power) % modulus;
        }
        power = (&power * &power) % modulus;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_known_value() {
        // 5^3 = 125 = 5 * 23 + 10
        assert_eq!(mod_pow(&big(5), &big(3), &big(23)), big(10));
    }

    #[test]
    fn test_zero_exponent() {
        for m in 1..50u64 {
            for b in 0..10u64 {
                assert_eq!(mod_pow(&big(b), &big(0), &big(m)), big(1 % m));
            }
        }
    }

    #[test]
    fn test_modulus_one() {
        assert_eq!(mod_pow(&big(7), &big(13), &big(1)), big(0));
    }

    #[test]
    fn test_result_in_range() {
        for m in 2..40u64 {
            for b in 0..30u64 {
                for e in 0..20u64 {
                    let r = mod_pow(&big(b), &big(e), &big(m));
                    assert!(r < big(m), "{}^{} mod {} = {}", b, e, m, r);
                }
            }
        }
    }

    #[test]
    fn test_matches_naive() {
        for b in 0..12u64 {
            for e in 0..12u64 {
                let naive = big(b).pow(e as u32) % big(97);
                assert_eq!(mod_pow(&big(b), &big(e), &big(97)), naive);
            }
        }
    }

    #[test]
    fn test_base_larger_than_modulus() {
        assert_eq!(mod_pow(&big(28), &big(3), &big(23)), big(10));
    }

    #[test]
    fn test_wide_intermediates() {
        // Squarings of a ~2^63 value overflow u64 long before the loop ends.
        let modulus = big(u64::MAX - 58); // largest prime below 2^64
        let base = big(u64::MAX - 100);
        let exp = big(1_000_003);
        assert_eq!(
            mod_pow(&base, &exp, &modulus),
            base.modpow(&exp, &modulus)
        );
    }

    #[test]
    fn test_huge_exponent() {
        let exp = BigUint::parse_bytes(b"123456789012345678901234567890", 10).unwrap();
        assert_eq!(
            mod_pow(&big(5), &exp, &big(23)),
            big(5).modpow(&exp, &big(23))
        );
    }
}
