//! # tls-dh core
//!
//! Toy Diffie-Hellman arithmetic and the step sequencer behind the TLS
//! handshake walkthrough.
//!
//! ```text
//! Client                                   Server
//!   │ ── ClientHello ─────────────────────► │
//!   │ ◄──────────── Certificate (fixed B) ── │   B = g^b mod p
//!   │   a, A = g^a mod p                     │
//!   │ ── ClientKeyExchange (A) ───────────► │
//!   │   S = B^a mod p          S = A^b mod p │
//!   │ ◄─────────────── Finished ──────────► │
//! ```
//!
//! Small integers only. Nothing here is secure; it exists to show the
//! arithmetic of the exchange.

pub mod handshake;
pub mod modpow;
pub mod params;
pub mod snapshot;

pub use handshake::{Handshake, SharedSecrets, Step, Transition};
pub use modpow::mod_pow;
pub use params::{parse_biguint, DomainParams, KeyPair, SecretRange};
pub use snapshot::Snapshot;

/// Re-exported so callers can name big integers without a direct dependency.
pub use num_bigint::BigUint;

/// Result type for tlsdh-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building handshake inputs
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid domain parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid secret range: min {min}, max {max}")]
    InvalidSecretRange { min: u64, max: u64 },

    #[error("Secret {secret} outside range [{min}, {max}]")]
    SecretOutOfRange { secret: BigUint, min: u64, max: u64 },

    #[error("Not a non-negative decimal integer: {0:?}")]
    ParseNumber(String),
}
