//! Domain parameters, secret ranges and key pairs.

use num_bigint::BigUint;
use num_traits::One;
use rand::Rng;

use crate::{mod_pow, Error, Result};

/// Public group parameters shared by both sides for a whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParams {
    p: BigUint,
    g: BigUint,
}

impl DomainParams {
    /// Prime modulus used by the walkthrough.
    pub const TOY_P: u64 = 23;
    /// Generator used by the walkthrough.
    pub const TOY_G: u64 = 5;

    /// Build parameters, requiring `p > 1` and `1 < g < p`.
    ///
    /// Primality of `p` is not checked; small composites still produce
    /// matching secrets, just without any of the usual guarantees.
    pub fn new(p: BigUint, g: BigUint) -> Result<Self> {
        if p <= BigUint::one() {
            return Err(Error::InvalidParams(format!("modulus p = {} must be > 1", p)));
        }
        if g <= BigUint::one() || g >= p {
            return Err(Error::InvalidParams(format!(
                "generator g = {} must satisfy 1 < g < {}",
                g, p
            )));
        }
        Ok(Self { p, g })
    }

    /// The fixed p = 23, g = 5 group.
    pub fn toy() -> Self {
        Self {
            p: BigUint::from(Self::TOY_P),
            g: BigUint::from(Self::TOY_G),
        }
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// `g^secret mod p`
    pub fn public_value(&self, secret: &BigUint) -> BigUint {
        mod_pow(&self.g, secret, &self.p)
    }

    /// `peer_public^secret mod p`
    pub fn shared_secret(&self, peer_public: &BigUint, secret: &BigUint) -> BigUint {
        mod_pow(peer_public, secret, &self.p)
    }
}

impl Default for DomainParams {
    fn default() -> Self {
        Self::toy()
    }
}

/// Inclusive range that secret exponents are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretRange {
    min: u64,
    max: u64,
}

impl SecretRange {
    pub const DEFAULT_MIN: u64 = 2;
    pub const DEFAULT_MAX: u64 = 11;

    pub fn new(min: u64, max: u64) -> Result<Self> {
        if min == 0 || min > max {
            return Err(Error::InvalidSecretRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn contains(&self, secret: &BigUint) -> bool {
        *secret >= BigUint::from(self.min) && *secret <= BigUint::from(self.max)
    }

    /// Reject a caller-supplied secret outside the range.
    pub fn check(&self, secret: &BigUint) -> Result<()> {
        if self.contains(secret) {
            Ok(())
        } else {
            Err(Error::SecretOutOfRange {
                secret: secret.clone(),
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Uniform draw from `[min, max]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> BigUint {
        BigUint::from(rng.gen_range(self.min..=self.max))
    }
}

impl Default for SecretRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// A secret exponent and its public value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub secret: BigUint,
    pub public: BigUint,
}

impl KeyPair {
    pub fn from_secret(params: &DomainParams, secret: BigUint) -> Self {
        let public = params.public_value(&secret);
        Self { secret, public }
    }

    pub fn generate<R: Rng + ?Sized>(params: &DomainParams, range: &SecretRange, rng: &mut R) -> Self {
        Self::from_secret(params, range.sample(rng))
    }

    /// Combine our secret with the peer's public value.
    pub fn agree(&self, params: &DomainParams, peer_public: &BigUint) -> BigUint {
        params.shared_secret(peer_public, &self.secret)
    }
}

/// Parse a non-negative decimal integer.
pub fn parse_biguint(text: &str) -> Result<BigUint> {
    let trimmed = text.trim();
    BigUint::parse_bytes(trimmed.as_bytes(), 10).ok_or_else(|| Error::ParseNumber(text.to_string()))
}
