//! Haixin backend API client.
//!
//! A lightweight client for the `ai-model-compare` backend. It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Validating `HAIXIN_API_BASE` for safety
//! - Building requests with a consistent User-Agent and Accept headers
//! - Typed calls for the menu, model-management, compare, and history
//!   endpoints
//!
//! The primary entry point is [`HaixinClient`]. Create an instance via
//! [`HaixinClient::new_from_env`] and call the typed methods directly.
//!
//! The menu fetch is deliberately infallible: navigation must keep working
//! when the backend is unreachable, so [`HaixinClient::fetch_menus`] degrades
//! to the embedded default document instead of returning an error.

use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use haixin_types::{
    CompareOutcome, HistoryDetail, HistoryItem, ItemList, MenuDocument, ModelEntry, NewModel,
    API_PREFIX,
};
use reqwest::{header, multipart, Client, RequestBuilder, Response};
use tracing::{debug, warn};
use url::Url;

/// Base URL used when `HAIXIN_API_BASE` is unset.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Hostnames allowed to use plain HTTP.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Thin wrapper around a configured `reqwest::Client` for backend access.
///
/// The client pre-configures default headers and builds requests against a
/// validated base URL. All tool endpoints live under the
/// [`API_PREFIX`] path prefix.
#[derive(Debug, Clone)]
pub struct HaixinClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl HaixinClient {
    /// Construct a client from the environment.
    ///
    /// The base URL is taken from `HAIXIN_API_BASE` (if set) or falls back to
    /// the local development default. Non-localhost hosts must use HTTPS.
    pub fn new_from_env() -> Result<Self> {
        let base_url = env::var("HAIXIN_API_BASE").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self::with_base_url(base_url)
    }

    /// Construct a client against an explicit base URL (CLI `--api-base`).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        validate_base_url(&base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("haixin-tui/0.1; {}", env::consts::OS),
        })
    }

    /// Base URL pages are served from, for opening links in a browser.
    ///
    /// Defaults to the API base; `HAIXIN_WEB_BASE` overrides it when the UI
    /// is fronted separately from the API.
    pub fn web_base(&self) -> String {
        env::var("HAIXIN_WEB_BASE").unwrap_or_else(|_| self.base_url.clone())
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }

    /// Fetch the menu document, falling back to the embedded default.
    ///
    /// Transport errors, non-success statuses, and parse failures are logged
    /// and recovered locally; this method never fails and is called exactly
    /// once at startup.
    pub async fn fetch_menus(&self) -> MenuDocument {
        let path = format!("{API_PREFIX}/menus");
        let result = async {
            let response = self
                .request(reqwest::Method::GET, &path)
                .send()
                .await?
                .error_for_status()?;
            response.json::<MenuDocument>().await.map_err(anyhow::Error::from)
        }
        .await;

        match result {
            Ok(doc) => doc,
            Err(error) => {
                warn!(%error, "menu fetch failed; using embedded default document");
                MenuDocument::fallback()
            }
        }
    }

    /// List all registered model configurations.
    pub async fn list_models(&self) -> Result<Vec<ModelEntry>> {
        let response = self
            .request(reqwest::Method::GET, &format!("{API_PREFIX}/models"))
            .send()
            .await
            .context("request /models")?;
        let response = check_status(response).await?;
        let list: ItemList<ModelEntry> = response.json().await.context("decode /models")?;
        Ok(list.items)
    }

    /// Register a new model configuration; returns the new row id.
    ///
    /// The backend takes form fields, not JSON, so this posts multipart.
    pub async fn create_model(&self, new_model: &NewModel) -> Result<i64> {
        new_model.validate()?;
        let form = multipart::Form::new()
            .text("provider", new_model.provider.trim().to_lowercase())
            .text("label", new_model.label.clone())
            .text("base_url", new_model.base_url.clone())
            .text("api_key", new_model.api_key.clone())
            .text("model", new_model.model.clone())
            .text("enabled", if new_model.enabled { "1" } else { "0" });

        let response = self
            .request(reqwest::Method::POST, &format!("{API_PREFIX}/models"))
            .multipart(form)
            .send()
            .await
            .context("request POST /models")?;
        let response = check_status(response).await?;
        let body: serde_json::Value = response.json().await.context("decode POST /models")?;
        body.get("id")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| anyhow!("POST /models response missing id"))
    }

    /// Flip a model's enabled flag.
    pub async fn toggle_model(&self, model_id: i64) -> Result<()> {
        let response = self
            .request(
                reqwest::Method::PATCH,
                &format!("{API_PREFIX}/models/{model_id}/toggle"),
            )
            .send()
            .await
            .context("request PATCH /models/{id}/toggle")?;
        check_status(response).await?;
        Ok(())
    }

    /// Delete a model configuration.
    pub async fn delete_model(&self, model_id: i64) -> Result<()> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("{API_PREFIX}/models/{model_id}"),
            )
            .send()
            .await
            .context("request DELETE /models/{id}")?;
        check_status(response).await?;
        Ok(())
    }

    /// List history rows, newest first.
    pub async fn history(&self, limit: usize, offset: usize) -> Result<Vec<HistoryItem>> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("{API_PREFIX}/history?limit={limit}&offset={offset}"),
            )
            .send()
            .await
            .context("request /history")?;
        let response = check_status(response).await?;
        let list: ItemList<HistoryItem> = response.json().await.context("decode /history")?;
        Ok(list.items)
    }

    /// Fetch one history record with its stored results.
    pub async fn history_detail(&self, item_id: i64) -> Result<HistoryDetail> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("{API_PREFIX}/history/{item_id}"),
            )
            .send()
            .await
            .context("request /history/{id}")?;
        let response = check_status(response).await?;
        response.json().await.context("decode /history/{id}")
    }

    /// Run a comparison of `model_ids` over the image at `image_path`.
    pub async fn compare(
        &self,
        image_path: &Path,
        prompt: &str,
        model_ids: &[i64],
    ) -> Result<CompareOutcome> {
        if prompt.trim().is_empty() {
            bail!("prompt must not be empty");
        }
        if model_ids.is_empty() {
            bail!("select at least one model");
        }
        let bytes = tokio::fs::read(image_path)
            .await
            .with_context(|| format!("read image {}", image_path.display()))?;
        let filename = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".into());
        let ids = model_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(filename))
            .text("prompt", prompt.to_string())
            .text("model_ids", ids);

        let response = self
            .request(reqwest::Method::POST, &format!("{API_PREFIX}/compare"))
            .multipart(form)
            .send()
            .await
            .context("request POST /compare")?;
        let response = check_status(response).await?;
        response.json().await.context("decode POST /compare")
    }
}

/// Turn a non-success response into an error carrying the backend's
/// `{"detail": ...}` message when present.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str().map(String::from)));
    match detail {
        Some(detail) => Err(anyhow!("{status}: {detail}")),
        None => Err(anyhow!("{status}")),
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: the scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<()> {
    let parsed =
        Url::parse(base).map_err(|e| anyhow!("Invalid HAIXIN_API_BASE URL '{}': {}", base, e))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("HAIXIN_API_BASE must include a host"))?;

    if LOCALHOST_DOMAINS.iter().any(|&allowed| host.eq_ignore_ascii_case(allowed)) {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        return Err(anyhow!(
            "HAIXIN_API_BASE must use https for non-localhost hosts; got '{}://'",
            parsed.scheme()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_allows_localhost_http() {
        assert!(validate_base_url("http://localhost:8000").is_ok());
        assert!(validate_base_url("http://127.0.0.1:9000").is_ok());
    }

    #[test]
    fn base_url_requires_https_off_localhost() {
        assert!(validate_base_url("https://tools.example.com").is_ok());
        assert!(validate_base_url("http://tools.example.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[tokio::test]
    async fn fetch_menus_falls_back_when_unreachable() {
        // Port 9 (discard) is unbound in CI; the connection is refused fast.
        let client = HaixinClient::with_base_url("http://127.0.0.1:9").expect("client");
        let doc = client.fetch_menus().await;
        assert_eq!(doc, MenuDocument::fallback());
    }

    #[test]
    fn compare_rejects_empty_selection_inputs() {
        let client = HaixinClient::with_base_url("http://localhost:8000").expect("client");
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let err = rt
            .block_on(client.compare(Path::new("/tmp/x.png"), "  ", &[1]))
            .unwrap_err();
        assert!(err.to_string().contains("prompt"));
        let err = rt
            .block_on(client.compare(Path::new("/tmp/x.png"), "describe", &[]))
            .unwrap_err();
        assert!(err.to_string().contains("at least one model"));
    }
}
