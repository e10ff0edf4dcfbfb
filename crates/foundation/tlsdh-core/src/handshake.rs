//! Handshake step sequencer
//!
//! Five narrative stages, one context-dependent primary action and a
//! "previous" action. Key material appears as the user walks forward.

use num_bigint::BigUint;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{DomainParams, KeyPair, Result, SecretRange, Snapshot};

/// Stage of the handshake currently on display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Step {
    #[default]
    ClientHello,
    Certificate,
    ClientKeyExchange,
    PreMasterSecret,
    Finished,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Self::ClientHello,
        Self::Certificate,
        Self::ClientKeyExchange,
        Self::PreMasterSecret,
        Self::Finished,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::ClientHello => 0,
            Self::Certificate => 1,
            Self::ClientKeyExchange => 2,
            Self::PreMasterSecret => 3,
            Self::Finished => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// One stage forward, stopping at `Finished`.
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(Self::Finished)
    }

    /// One stage back, stopping at `ClientHello`.
    pub fn prev(self) -> Self {
        Self::from_index(self.index().saturating_sub(1)).unwrap_or(Self::ClientHello)
    }

    pub fn is_first(self) -> bool {
        self == Self::ClientHello
    }

    pub fn is_final(self) -> bool {
        self == Self::Finished
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::ClientHello => "ClientHello",
            Self::Certificate => "Certificate",
            Self::ClientKeyExchange => "ClientKeyExchange",
            Self::PreMasterSecret => "Pre-Master Secret",
            Self::Finished => "Finished",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ClientHello => {
                "The client opens the connection and sends the list of cipher suites it supports. (ClientHello)"
            }
            Self::Certificate => {
                "The server sends its certificate. The certificate carries the server's fixed DH public key B. (Certificate)"
            }
            Self::ClientKeyExchange => {
                "The client generates an ephemeral DH key pair (a, A) and sends the public key A to the server. (ClientKeyExchange)"
            }
            Self::PreMasterSecret => {
                "Client and server each combine the peer's public key with their own secret to compute the pre-master secret."
            }
            Self::Finished => {
                "Handshake complete! Both sides now encrypt traffic with keys derived from the shared secret. (Finished)"
            }
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Step {} ({})", self.index() + 1, self.title())
    }
}

/// Both independently computed shared secrets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedSecrets {
    /// `B^a mod p`
    pub client: BigUint,
    /// `A^b mod p`
    pub server: BigUint,
}

impl SharedSecrets {
    pub fn matches(&self) -> bool {
        self.client == self.server
    }
}

/// What an action did to the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Plain navigation
    Moved { from: Step, to: Step },
    /// Client key pair generated, then advanced to the pre-master stage
    KeysGenerated { secret: BigUint, public: BigUint },
    /// Shared secrets computed, then advanced to `Finished`
    SecretComputed(SharedSecrets),
    /// Action not available at this point
    Ignored { step: Step, reason: &'static str },
}

/// State of one walkthrough session
#[derive(Debug)]
pub struct Handshake {
    params: DomainParams,
    range: SecretRange,
    fixed_server_secret: Option<BigUint>,
    server: KeyPair,
    client: Option<KeyPair>,
    shared: Option<SharedSecrets>,
    step: Step,
    rng: StdRng,
}

impl Handshake {
    /// Start a session with a server secret drawn from `range`.
    pub fn new(params: DomainParams, range: SecretRange, mut rng: StdRng) -> Self {
        let server = KeyPair::generate(&params, &range, &mut rng);
        debug!(server_public = %server.public, "Handshake created");
        Self {
            params,
            range,
            fixed_server_secret: None,
            server,
            client: None,
            shared: None,
            step: Step::default(),
            rng,
        }
    }

    /// Start a session with a fixed server secret. Restarts keep it.
    pub fn with_server_secret(
        params: DomainParams,
        range: SecretRange,
        server_secret: BigUint,
        rng: StdRng,
    ) -> Result<Self> {
        range.check(&server_secret)?;
        let server = KeyPair::from_secret(&params, server_secret.clone());
        debug!(server_public = %server.public, "Handshake created with fixed server secret");
        Ok(Self {
            params,
            range,
            fixed_server_secret: Some(server_secret),
            server,
            client: None,
            shared: None,
            step: Step::default(),
            rng,
        })
    }

    pub fn params(&self) -> &DomainParams {
        &self.params
    }

    pub fn secret_range(&self) -> &SecretRange {
        &self.range
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn server(&self) -> &KeyPair {
        &self.server
    }

    pub fn client(&self) -> Option<&KeyPair> {
        self.client.as_ref()
    }

    pub fn shared(&self) -> Option<&SharedSecrets> {
        self.shared.as_ref()
    }

    pub fn previous_enabled(&self) -> bool {
        !self.step.is_first()
    }

    /// Disabled at the key-exchange stage once client keys exist, at the
    /// pre-master stage once secrets exist, and at the final stage.
    pub fn primary_enabled(&self) -> bool {
        let regenerate = self.step == Step::ClientKeyExchange && self.client.is_some();
        let recompute = self.step == Step::PreMasterSecret && self.shared.is_some();
        !(regenerate || recompute || self.step.is_final())
    }

    pub fn primary_label(&self) -> &'static str {
        match self.step {
            Step::ClientKeyExchange => "Generate ephemeral keys",
            Step::PreMasterSecret => "Compute shared secret",
            _ => "Next step",
        }
    }

    /// Results are shown from the pre-master stage on.
    pub fn results_visible(&self) -> bool {
        self.step.index() >= Step::PreMasterSecret.index()
    }

    /// `Some(true)` when both sides agree, `None` until both are computed.
    pub fn secrets_match(&self) -> Option<bool> {
        self.shared.as_ref().map(SharedSecrets::matches)
    }

    /// Step back one stage.
    pub fn previous(&mut self) -> Transition {
        if !self.previous_enabled() {
            return self.ignore("already at the first stage");
        }
        let from = self.step;
        self.step = from.prev();
        debug!(from = %from, to = %self.step, "Moved back");
        Transition::Moved { from, to: self.step }
    }

    /// Run the context-dependent primary action.
    pub fn primary(&mut self) -> Transition {
        if self.step == Step::ClientKeyExchange && self.primary_enabled() {
            let secret = self.range.sample(&mut self.rng);
            return self.generate_keys(secret);
        }
        self.primary_inner()
    }

    /// Primary action with a caller-chosen client secret.
    ///
    /// Behaves like [`Handshake::primary`] except at the key-exchange stage,
    /// where `client_secret` is used instead of a random draw.
    pub fn primary_with_client_secret(&mut self, client_secret: BigUint) -> Result<Transition> {
        if self.step == Step::ClientKeyExchange && self.primary_enabled() {
            self.range.check(&client_secret)?;
            return Ok(self.generate_keys(client_secret));
        }
        Ok(self.primary_inner())
    }

    /// Throw away all session state and draw a new server key pair.
    pub fn restart(&mut self) {
        self.server = match &self.fixed_server_secret {
            Some(secret) => KeyPair::from_secret(&self.params, secret.clone()),
            None => KeyPair::generate(&self.params, &self.range, &mut self.rng),
        };
        self.client = None;
        self.shared = None;
        self.step = Step::default();
        info!(server_public = %self.server.public, "Handshake restarted");
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    fn primary_inner(&mut self) -> Transition {
        if !self.primary_enabled() {
            return self.ignore("primary action disabled");
        }
        match self.step {
            Step::PreMasterSecret => self.compute_shared(),
            _ => {
                let from = self.step;
                self.step = from.next();
                debug!(from = %from, to = %self.step, "Moved forward");
                Transition::Moved { from, to: self.step }
            }
        }
    }

    fn generate_keys(&mut self, secret: BigUint) -> Transition {
        let pair = KeyPair::from_secret(&self.params, secret);
        info!(client_public = %pair.public, "Client ephemeral keys generated");
        let transition = Transition::KeysGenerated {
            secret: pair.secret.clone(),
            public: pair.public.clone(),
        };
        self.set_client_keys(pair);
        self.step = Step::PreMasterSecret;
        transition
    }

    fn set_client_keys(&mut self, pair: KeyPair) {
        self.client = Some(pair);
        self.shared = None;
    }

    fn compute_shared(&mut self) -> Transition {
        let Some(client) = &self.client else {
            return self.ignore("client keys not generated yet");
        };

        let shared = SharedSecrets {
            client: client.agree(&self.params, &self.server.public),
            server: self.server.agree(&self.params, &client.public),
        };

        if shared.matches() {
            info!(shared = %shared.client, "Shared secrets agree");
        } else {
            error!(client = %shared.client, server = %shared.server, "Shared secrets differ");
        }

        self.shared = Some(shared.clone());
        self.step = Step::Finished;
        Transition::SecretComputed(shared)
    }

    fn ignore(&self, reason: &'static str) -> Transition {
        warn!(step = %self.step, reason, "Action ignored");
        Transition::Ignored { step: self.step, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    fn handshake(server_secret: u64) -> Handshake {
        Handshake::with_server_secret(
            DomainParams::toy(),
            SecretRange::default(),
            big(server_secret),
            StdRng::seed_from_u64(1),
        )
        .unwrap()
    }

    #[test]
    fn test_step_navigation() {
        assert_eq!(Step::ClientHello.prev(), Step::ClientHello);
        assert_eq!(Step::ClientHello.next(), Step::Certificate);
        assert_eq!(Step::Finished.next(), Step::Finished);
        assert_eq!(Step::from_index(5), None);
        for (i, step) in Step::ALL.iter().enumerate() {
            assert_eq!(step.index(), i);
        }
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::ClientKeyExchange.to_string(), "Step 3 (ClientKeyExchange)");
    }

    #[test]
    fn test_previous_at_start_is_noop() {
        let mut hs = handshake(6);
        assert!(!hs.previous_enabled());
        assert!(matches!(hs.previous(), Transition::Ignored { .. }));
        assert_eq!(hs.step(), Step::ClientHello);
    }

    #[test]
    fn test_full_walk() {
        let mut hs = handshake(6);
        assert_eq!(hs.server().public, big(8));

        assert_eq!(hs.primary_label(), "Next step");
        hs.primary();
        hs.primary();
        assert_eq!(hs.step(), Step::ClientKeyExchange);
        assert_eq!(hs.primary_label(), "Generate ephemeral keys");
        assert!(!hs.results_visible());

        let generated = hs.primary();
        assert!(matches!(generated, Transition::KeysGenerated { .. }));
        assert_eq!(hs.step(), Step::PreMasterSecret);
        assert!(hs.results_visible());
        assert!(hs.client().is_some());
        assert_eq!(hs.secrets_match(), None);
        assert_eq!(hs.primary_label(), "Compute shared secret");

        let computed = hs.primary();
        assert!(matches!(computed, Transition::SecretComputed(_)));
        assert_eq!(hs.step(), Step::Finished);
        assert_eq!(hs.secrets_match(), Some(true));
        assert!(!hs.primary_enabled());
    }

    #[test]
    fn test_generated_secret_in_range() {
        for seed in 0..50 {
            let mut hs = Handshake::new(
                DomainParams::toy(),
                SecretRange::default(),
                StdRng::seed_from_u64(seed),
            );
            assert!(hs.secret_range().contains(&hs.server().secret));
            hs.primary();
            hs.primary();
            hs.primary();
            let client = hs.client().unwrap();
            assert!(hs.secret_range().contains(&client.secret));
            assert_eq!(client.public, hs.params().public_value(&client.secret));
        }
    }

    #[test]
    fn test_regeneration_disabled_at_key_exchange() {
        let mut hs = handshake(6);
        hs.primary();
        hs.primary();
        hs.primary_with_client_secret(big(3)).unwrap();
        hs.previous();
        assert_eq!(hs.step(), Step::ClientKeyExchange);
        assert!(!hs.primary_enabled());

        let before = hs.client().cloned();
        assert!(matches!(hs.primary(), Transition::Ignored { .. }));
        assert_eq!(hs.client().cloned(), before);
        assert_eq!(hs.step(), Step::ClientKeyExchange);
    }

    #[test]
    fn test_recompute_disabled_at_pre_master() {
        let mut hs = handshake(6);
        for _ in 0..4 {
            hs.primary();
        }
        hs.previous();
        assert_eq!(hs.step(), Step::PreMasterSecret);
        assert!(!hs.primary_enabled());
        assert!(hs.previous_enabled());
        assert!(matches!(hs.primary(), Transition::Ignored { .. }));
    }

    #[test]
    fn test_new_client_keys_clear_shared() {
        let mut hs = handshake(6);
        for _ in 0..4 {
            hs.primary();
        }
        assert!(hs.shared().is_some());

        let pair = KeyPair::from_secret(hs.params(), big(4));
        hs.set_client_keys(pair);
        assert!(hs.shared().is_none());
        assert_eq!(hs.secrets_match(), None);
        assert_eq!(hs.client().map(|c| c.secret.clone()), Some(big(4)));
    }

    #[test]
    fn test_compute_without_keys_is_ignored() {
        let mut hs = handshake(6);
        hs.step = Step::PreMasterSecret;
        assert!(hs.primary_enabled());
        assert!(matches!(hs.primary(), Transition::Ignored { .. }));
        assert_eq!(hs.step(), Step::PreMasterSecret);
        assert!(hs.shared().is_none());
    }

    #[test]
    fn test_client_secret_out_of_range() {
        let mut hs = handshake(6);
        hs.primary();
        hs.primary();
        assert!(hs.primary_with_client_secret(big(40)).is_err());
        assert!(hs.client().is_none());
        assert_eq!(hs.step(), Step::ClientKeyExchange);
    }

    #[test]
    fn test_fixed_server_secret_out_of_range() {
        let result = Handshake::with_server_secret(
            DomainParams::toy(),
            SecretRange::default(),
            big(1),
            StdRng::seed_from_u64(0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_restart_keeps_fixed_server_secret() {
        let mut hs = handshake(6);
        for _ in 0..4 {
            hs.primary();
        }
        hs.restart();
        assert_eq!(hs.step(), Step::ClientHello);
        assert!(hs.client().is_none());
        assert!(hs.shared().is_none());
        assert_eq!(hs.server().public, big(8));
    }
}
