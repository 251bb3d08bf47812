use anyhow::{Context, Result};
use schooldesk_core::config::Settings;
use schooldesk_core::{ExpiryCheck, SessionManager, SessionState};
use serde_json::json;

use super::format_expiry;

pub async fn run(settings: &Settings, session: &SessionManager, token: String) -> Result<()> {
    let interval = settings.session.check_interval()?;
    let mut state = session.subscribe();

    if !matches!(session.sign_in(token, json!({})), ExpiryCheck::Valid { .. }) {
        anyhow::bail!("The token is already expired or invalid");
    }

    if let Some(at) = session.expires_at() {
        println!("Signed in. Token expires {}.", format_expiry(at));
    }
    println!(
        "Checking every {}. Press Ctrl-C to stop.",
        humantime::format_duration(interval)
    );

    let watcher = session.start_expiry_watch(interval);

    loop {
        tokio::select! {
            changed = state.changed() => {
                changed.context("Session closed")?;
                if *state.borrow_and_update() == SessionState::SignedOut {
                    println!("Session expired, you have been signed out.");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.sign_out();
                println!("Signed out.");
                break;
            }
        }
    }

    watcher.stop().await;
    Ok(())
}
