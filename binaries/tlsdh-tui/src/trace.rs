//! Non-interactive walk through the whole handshake

use anyhow::{Context, Result};
use tlsdh_config::Config;
use tlsdh_core::{BigUint, Snapshot, Step};
use tracing::info;

/// Press the primary action until it is disabled, capturing every stage.
pub fn walk(config: &Config, client_secret: Option<u64>) -> Result<Vec<Snapshot>> {
    let mut handshake = config.handshake().context("Failed to build handshake")?;
    let mut snapshots = vec![handshake.snapshot()];

    while handshake.primary_enabled() {
        match (handshake.step(), client_secret) {
            (Step::ClientKeyExchange, Some(secret)) => {
                handshake
                    .primary_with_client_secret(BigUint::from(secret))
                    .context("Invalid client secret")?;
            }
            _ => {
                handshake.primary();
            }
        }
        snapshots.push(handshake.snapshot());
    }

    info!(stages = snapshots.len(), "Trace complete");
    Ok(snapshots)
}

pub fn render_text(snapshots: &[Snapshot]) -> String {
    const UNSET: &str = "(not generated)";
    let mut lines = Vec::new();
    for snap in snapshots {
        lines.push(format!("[Step {}] {}", snap.step_number, snap.step.title()));
        lines.push(format!("  {}", snap.description));
        lines.push(format!("  p = {}, g = {}", snap.p, snap.g));
        lines.push(format!("  Server public key B = g^b mod p: {}", snap.server_public));
        lines.push(format!(
            "  Client secret a: {}",
            snap.client_secret.as_deref().unwrap_or(UNSET)
        ));
        lines.push(format!(
            "  Client public key A = g^a mod p: {}",
            snap.client_public.as_deref().unwrap_or(UNSET)
        ));
        if snap.results_visible {
            lines.push(format!(
                "  Client computes S = B^a mod p: {}",
                snap.client_shared.as_deref().unwrap_or("-")
            ));
            lines.push(format!(
                "  Server computes S = A^b mod p: {}",
                snap.server_shared.as_deref().unwrap_or("-")
            ));
            match snap.secrets_match {
                Some(true) => lines.push("  Success! Both sides derived the same pre-master secret.".to_string()),
                Some(false) => lines.push("  Error! The shared secrets differ.".to_string()),
                None => {}
            }
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

pub fn run(config: &Config, client_secret: Option<u64>, json: bool) -> Result<()> {
    let snapshots = walk(config, client_secret)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
    } else {
        print!("{}", render_text(&snapshots));
    }
    Ok(())
}
