use anyhow::Result;
use owo_colors::OwoColorize;
use schooldesk_core::session::{TokenClaims, decode_claims};
use schooldesk_core::{ExpiryCheck, SessionManager};
use serde_json::json;

use super::format_expiry;

pub fn run(session: &SessionManager, token: String) -> Result<()> {
    let check = session.sign_in(token.clone(), json!({}));

    match check {
        ExpiryCheck::Valid { exp } => {
            println!("{} until {}", "Valid".green(), expiry_label(exp));
        }
        ExpiryCheck::Expired { exp } => {
            println!("{} since {}", "Expired".red(), expiry_label(exp));
        }
        ExpiryCheck::Undecodable | ExpiryCheck::NoSession => {
            let reason = decode_claims(&token)
                .err()
                .map_or_else(|| "unknown error".to_string(), |e| e.to_string());
            println!("{}: {}", "Invalid token".red(), reason);
        }
    }

    session.sign_out();
    Ok(())
}

fn expiry_label(exp: f64) -> String {
    TokenClaims { exp }
        .expires_at()
        .map_or_else(|| format!("exp={exp}"), format_expiry)
}
