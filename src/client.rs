//! HTTP client for the school API

use anyhow::{Context, Result};
use reqwest::Response;
use schooldesk_core::{ScheduleRecord, records_from_value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use url::Url;

/// HTTP client for the school REST API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Everything else the API returns about the user (profile picture etc.)
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("Invalid API base URL '{base_url}'"))?;

        // Without a trailing slash, joining would replace the last path segment
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid API path '{path}'"))
    }

    /// POST login/
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let url = self.endpoint("login/")?;
        debug!(%url, email, "Signing in");

        let resp = self
            .http
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .context("Failed to connect to the school API")?;

        let resp = error_for_status(resp, "Login failed").await?;
        let login: LoginResponse = resp.json().await.context("Failed to parse login response")?;

        info!(email, "Login accepted");
        Ok(login)
    }

    /// GET schedules/all/
    pub async fn schedules(&self, token: &str) -> Result<Vec<ScheduleRecord>> {
        let url = self.endpoint("schedules/all/")?;
        debug!(%url, "Fetching schedules");

        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to connect to the school API")?;

        let resp = error_for_status(resp, "Failed to fetch schedules").await?;

        let body: Value = resp
            .json()
            .await
            .context("Schedules response is not JSON")?;

        let records = records_from_value(body)?;
        debug!(count = records.len(), "Fetched schedules");
        Ok(records)
    }
}

async fn error_for_status(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    warn!(%status, "{what}");
    anyhow::bail!("{what} ({status}): {body}")
}
