//! Uploads a packed site archive to the Cloudflare Pages deployments API and
//! reports the resulting public URL. Credentials come from the process
//! environment; there is no retry or backoff here, the scheduler simply
//! reruns a failed publish.

use std::path::Path;

use anyhow::{anyhow, Result};
use log::info;
use url::Url;

const API_BASE: &str = "https://api.cloudflare.com/client/v4/";

/// The publishing credentials, read from `CLOUDFLARE_ACCOUNT_ID`,
/// `CLOUDFLARE_PROJECT_NAME`, and `CLOUDFLARE_API_TOKEN`.
pub struct Credentials {
    pub account_id: String,
    pub project_name: String,
    pub api_token: String,
}

impl Credentials {
    pub fn from_env() -> Result<Credentials> {
        Ok(Credentials {
            account_id: require_env("CLOUDFLARE_ACCOUNT_ID")?,
            project_name: require_env("CLOUDFLARE_PROJECT_NAME")?,
            api_token: require_env("CLOUDFLARE_API_TOKEN")?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(anyhow!("environment variable `{}` is not set", name)),
    }
}

fn deployments_endpoint(account_id: &str, project_name: &str) -> Result<Url> {
    let url = Url::parse(API_BASE)?.join(&format!(
        "accounts/{}/pages/projects/{}/deployments",
        account_id, project_name,
    ))?;
    Ok(url)
}

/// Uploads `archive` as a new deployment and returns its public URL. A
/// non-success response surfaces the API's error payload in the returned
/// error.
pub fn deploy(credentials: &Credentials, archive: &Path) -> Result<String> {
    let endpoint =
        deployments_endpoint(&credentials.account_id, &credentials.project_name)?;
    let form = reqwest::blocking::multipart::Form::new().file("file", archive)?;

    info!(
        "uploading `{}` to project `{}`",
        archive.display(),
        credentials.project_name,
    );
    let response = reqwest::blocking::Client::new()
        .post(endpoint)
        .bearer_auth(&credentials.api_token)
        .multipart(form)
        .send()?;

    let status = response.status();
    let body: serde_json::Value = response.json()?;
    if status.is_success() && body["success"].as_bool().unwrap_or(false) {
        Ok(body["result"]["url"]
            .as_str()
            .unwrap_or("(deployment url not reported)")
            .to_owned())
    } else {
        Err(anyhow!("deployment failed ({}): {}", status, body["errors"]))
    }
}
