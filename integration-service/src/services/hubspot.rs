//! HubSpot provider client.
//!
//! Covers the three outbound surfaces of the integration: the authorization
//! redirect URL, the authorization-code token exchange, and the paginated
//! contacts fetch with normalization into [`IntegrationItem`]s.

use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::Value;
use service_core::error::AppError;
use std::time::Duration;

use crate::config::HubSpotConfig;
use crate::models::IntegrationItem;

const PAGE_LIMIT: &str = "100";
const CONTACT_PROPERTIES: &str = "firstname,lastname,email";
/// Hard cap on pages followed, in case the provider ever returns a looping
/// next-link. Normal collections stay far below this.
const MAX_PAGES: usize = 1000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HubSpot client for interacting with the HubSpot OAuth and CRM APIs.
#[derive(Clone)]
pub struct HubSpotClient {
    client: Client,
    config: HubSpotConfig,
}

impl HubSpotClient {
    /// Create a new HubSpot client.
    pub fn new(config: HubSpotConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Build the provider authorization URL carrying the serialized state
    /// payload. Scopes are space-delimited and percent-encoded.
    pub fn authorization_url(&self, state_payload: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&state={}",
            self.config.auth_url,
            self.config.client_id,
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&self.config.scopes),
            urlencoding::encode(state_payload),
        )
    }

    /// Exchange an authorization code for the provider token payload.
    ///
    /// The payload is returned verbatim; provider-specific fields pass
    /// through without normalization.
    pub async fn exchange_code(&self, code: &str) -> Result<Value, AppError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .timeout(REQUEST_TIMEOUT)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::InternalError(e.into()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::InternalError(e.into()))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "HubSpot token exchange failed");
            return Err(AppError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| AppError::InternalError(e.into()))
    }

    /// Fetch and normalize items from a serialized credential payload.
    pub async fn fetch_items(&self, credentials: &str) -> Result<Vec<IntegrationItem>, AppError> {
        let creds: Value = serde_json::from_str(credentials)
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid HubSpot credentials: {}", e)))?;

        let token = creds
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid HubSpot credentials")))?;

        self.fetch_contacts(token).await
    }

    /// Walk the paginated contacts collection and map every record into an
    /// [`IntegrationItem`], preserving page order and intra-page order.
    ///
    /// The first request carries the page-size limit and property list; each
    /// subsequent request follows the `paging.next.link` URL verbatim, which
    /// is self-contained.
    pub async fn fetch_contacts(
        &self,
        access_token: &str,
    ) -> Result<Vec<IntegrationItem>, AppError> {
        let mut url = format!("{}/crm/v3/objects/contacts", self.config.api_base_url);
        let mut first_page = true;
        let mut items = Vec::new();

        for _ in 0..MAX_PAGES {
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(access_token)
                .timeout(REQUEST_TIMEOUT);
            if first_page {
                request = request.query(&[
                    ("limit", PAGE_LIMIT),
                    ("properties", CONTACT_PROPERTIES),
                ]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| AppError::InternalError(e.into()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| AppError::InternalError(e.into()))?;

            if !status.is_success() {
                tracing::error!(status = %status, body = %body, "Error fetching HubSpot items");
                return Err(AppError::Provider {
                    status: status.as_u16(),
                    body,
                });
            }

            let page: Value =
                serde_json::from_str(&body).map_err(|e| AppError::InternalError(e.into()))?;

            if let Some(results) = page.get("results").and_then(Value::as_array) {
                items.extend(results.iter().map(integration_item_from_object));
            }

            match page.pointer("/paging/next/link").and_then(Value::as_str) {
                Some(next) => {
                    url = next.to_string();
                    first_page = false;
                }
                None => return Ok(items),
            }
        }

        tracing::warn!(pages = MAX_PAGES, "Pagination cap reached, returning accumulated items");
        Ok(items)
    }
}

/// Map a raw HubSpot CRM object into an [`IntegrationItem`].
pub fn integration_item_from_object(object: &Value) -> IntegrationItem {
    let prop = |field: &str| {
        object
            .get("properties")
            .and_then(|p| p.get(field))
            .and_then(Value::as_str)
    };

    let name = prop("name")
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| {
            let full = format!(
                "{} {}",
                prop("firstname").unwrap_or(""),
                prop("lastname").unwrap_or("")
            );
            let trimmed = full.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

    // Only an explicit boolean `false` marks the record active; a missing or
    // non-boolean flag counts as archived.
    let item_type = if object.get("archived").and_then(Value::as_bool) == Some(false) {
        object
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("object")
            .to_string()
    } else {
        "archived".to_string()
    };

    let id = match object.get("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };

    IntegrationItem {
        id,
        name,
        item_type,
        parent_id: None,
    }
}
