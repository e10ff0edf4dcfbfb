//! Serializable view of a handshake, with numbers rendered as decimal text.

use serde::Serialize;

use crate::{Handshake, Step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub step: Step,
    /// 1-based, as shown to the user
    pub step_number: usize,
    pub description: &'static str,
    pub p: String,
    pub g: String,
    pub server_public: String,
    pub client_secret: Option<String>,
    pub client_public: Option<String>,
    pub client_shared: Option<String>,
    pub server_shared: Option<String>,
    pub secrets_match: Option<bool>,
    pub primary_label: &'static str,
    pub primary_enabled: bool,
    pub previous_enabled: bool,
    pub results_visible: bool,
}

impl Snapshot {
    pub fn capture(hs: &Handshake) -> Self {
        let step = hs.step();
        let client = hs.client();
        let shared = hs.shared();
        Self {
            step,
            step_number: step.index() + 1,
            description: step.description(),
            p: hs.params().p().to_string(),
            g: hs.params().g().to_string(),
            server_public: hs.server().public.to_string(),
            client_secret: client.map(|c| c.secret.to_string()),
            client_public: client.map(|c| c.public.to_string()),
            client_shared: shared.map(|s| s.client.to_string()),
            server_shared: shared.map(|s| s.server.to_string()),
            secrets_match: hs.secrets_match(),
            primary_label: hs.primary_label(),
            primary_enabled: hs.primary_enabled(),
            previous_enabled: hs.previous_enabled(),
            results_visible: hs.results_visible(),
        }
    }
}
