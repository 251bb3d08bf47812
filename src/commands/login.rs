use anyhow::{Context, Result};
use schooldesk_core::config::Settings;
use schooldesk_core::{ExpiryCheck, SessionManager};
use serde_json::Value;

use super::format_expiry;
use crate::client::ApiClient;
use crate::utils::tui::create_spinner;

pub async fn run(settings: &Settings, session: &SessionManager, email: &str) -> Result<()> {
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    let client = ApiClient::new(&settings.api.base_url)?;

    let spinner = create_spinner(format!("Signing in as {email}"));
    let response = client.login(email, &password).await;
    spinner.finish_and_clear();
    let response = response?;

    match session.sign_in(response.access_token, Value::Object(response.profile)) {
        ExpiryCheck::Valid { .. } => {}
        ExpiryCheck::Expired { .. } => anyhow::bail!("The API issued a token that has already expired"),
        ExpiryCheck::Undecodable | ExpiryCheck::NoSession => {
            anyhow::bail!("The API returned a token that could not be decoded")
        }
    }

    let token = session.token().context("Session ended right after signing in")?;
    match session.expires_at() {
        Some(at) => eprintln!("Signed in as {email}. Token expires {}.", format_expiry(at)),
        None => eprintln!("Signed in as {email}."),
    }
    eprintln!("Export it for other commands with: export SCHOOLDESK_TOKEN=<token>\n");
    println!("{token}");

    Ok(())
}
