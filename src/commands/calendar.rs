use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use schooldesk_core::config::Settings;
use schooldesk_core::{
    ExpiryCheck, ScheduleRecord, SessionManager, badges_for_day, build_calendar,
    records_from_json,
};
use serde_json::json;

use crate::client::ApiClient;
use crate::render::{Render, render_calendar};
use crate::utils::tui::create_spinner;

pub struct CalendarArgs {
    pub file: Option<PathBuf>,
    pub token: Option<String>,
    pub day: Option<String>,
    pub json: bool,
}

pub async fn run(settings: &Settings, session: &SessionManager, args: CalendarArgs) -> Result<()> {
    let records = match &args.file {
        Some(path) => {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read schedules from {}", path.display()))?;
            records_from_json(&body)
                .with_context(|| format!("Failed to parse schedules from {}", path.display()))?
        }
        None => fetch_schedules(settings, session, args.token).await?,
    };

    let groups = build_calendar(&records).context("Failed to build calendar")?;

    if let Some(day) = args.day {
        let day = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
            .with_context(|| format!("Invalid date format '{day}'. Expected YYYY-MM-DD"))?;
        let badges = badges_for_day(&groups, day);

        if args.json {
            println!("{}", serde_json::to_string_pretty(&badges)?);
        } else if badges.is_empty() {
            println!("No events on {day}");
        } else {
            for badge in &badges {
                println!("{}", badge.render());
            }
        }
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        println!("{}", render_calendar(&groups));
    }

    Ok(())
}

async fn fetch_schedules(
    settings: &Settings,
    session: &SessionManager,
    token: Option<String>,
) -> Result<Vec<ScheduleRecord>> {
    let token = token.context(
        "No token given. Pass --token, set SCHOOLDESK_TOKEN, or read schedules with --file",
    )?;

    match session.sign_in(token, json!({})) {
        ExpiryCheck::Valid { .. } => {}
        ExpiryCheck::Expired { .. } => {
            anyhow::bail!("Your session has expired. Run `schooldesk login` to sign in again.")
        }
        ExpiryCheck::Undecodable | ExpiryCheck::NoSession => {
            anyhow::bail!("The given token is not a valid bearer token.")
        }
    }

    let token = session.token().context("Signed out before fetching schedules")?;
    let client = ApiClient::new(&settings.api.base_url)?;

    let spinner = create_spinner("Fetching schedules");
    let records = client.schedules(&token).await;
    spinner.finish_and_clear();

    records
}
