//! HubSpot OAuth2 authorization-code flow.
//!
//! State records protect the callback against CSRF; credential records hold
//! the provider token payload for a single retrieval. Both live in the
//! transient store under tenant-scoped keys with a 10 minute expiry.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::sync::Arc;

use crate::dtos::CallbackQuery;
use crate::services::hubspot::HubSpotClient;
use crate::services::store::KeyValueStore;

pub const STATE_TTL_SECONDS: u64 = 600;
pub const CREDENTIALS_TTL_SECONDS: u64 = 600;

/// CSRF-protection record binding a random token to a tenant pair. The whole
/// record travels through the provider as the `state` query parameter and is
/// compared against the stored copy on callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRecord {
    pub state: String,
    pub user_id: String,
    pub org_id: String,
}

fn state_key(org_id: &str, user_id: &str) -> String {
    format!("state:{}:{}", org_id, user_id)
}

fn credentials_key(org_id: &str, user_id: &str) -> String {
    format!("credentials:{}:{}", org_id, user_id)
}

#[derive(Clone)]
pub struct OAuthFlow {
    store: Arc<dyn KeyValueStore>,
    hubspot: HubSpotClient,
}

impl OAuthFlow {
    pub fn new(store: Arc<dyn KeyValueStore>, hubspot: HubSpotClient) -> Self {
        Self { store, hubspot }
    }

    /// Create a fresh state record for the tenant pair and return the
    /// provider authorization URL carrying it. A prior unconsumed record for
    /// the same pair is overwritten, restarting the flow.
    pub async fn begin_authorization(
        &self,
        user_id: &str,
        org_id: &str,
    ) -> Result<String, AppError> {
        let token = {
            let mut bytes = [0u8; 32];
            rand::thread_rng().fill(&mut bytes);
            URL_SAFE_NO_PAD.encode(bytes)
        };

        let record = StateRecord {
            state: token,
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
        };
        let payload =
            serde_json::to_string(&record).map_err(|e| AppError::InternalError(e.into()))?;

        self.store
            .set(&state_key(org_id, user_id), &payload, STATE_TTL_SECONDS)
            .await?;

        tracing::debug!(org_id = %org_id, user_id = %user_id, "Stored OAuth state record");

        Ok(self.hubspot.authorization_url(&payload))
    }

    /// Validate the callback, exchange the code, and park the credentials
    /// for one-time retrieval.
    ///
    /// State deletion and the token exchange run concurrently; neither
    /// depends on the other, but both must finish before the callback
    /// returns, and an exchange failure fails the callback even though the
    /// state is already consumed.
    pub async fn complete_authorization(&self, query: &CallbackQuery) -> Result<(), AppError> {
        if let Some(error) = &query.error {
            tracing::warn!(error = %error, "Provider reported an authorization error");
            return Err(AppError::Provider {
                status: 400,
                body: error.clone(),
            });
        }

        let (Some(code), Some(state)) = (query.code.as_deref(), query.state.as_deref()) else {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Missing code or state in callback"
            )));
        };

        let record: StateRecord = serde_json::from_str(state)
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid state payload: {}", e)))?;

        let key = state_key(&record.org_id, &record.user_id);
        let saved = self.store.get(&key).await?;
        let valid = saved
            .as_deref()
            .and_then(|s| serde_json::from_str::<StateRecord>(s).ok())
            .is_some_and(|stored| stored.state == record.state);
        if !valid {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "State validation failed"
            )));
        }

        let (exchange, deleted) = tokio::join!(
            self.hubspot.exchange_code(code),
            self.store.delete(&key),
        );
        deleted?;
        let credentials = exchange?;

        let payload =
            serde_json::to_string(&credentials).map_err(|e| AppError::InternalError(e.into()))?;
        self.store
            .set(
                &credentials_key(&record.org_id, &record.user_id),
                &payload,
                CREDENTIALS_TTL_SECONDS,
            )
            .await?;

        tracing::info!(
            org_id = %record.org_id,
            user_id = %record.user_id,
            "HubSpot authorization completed"
        );

        Ok(())
    }

    /// One-time credential retrieval: the first successful read deletes the
    /// record, so exactly one of any number of racing consumers succeeds.
    pub async fn consume_credentials(
        &self,
        user_id: &str,
        org_id: &str,
    ) -> Result<serde_json::Value, AppError> {
        let raw = self
            .store
            .take(&credentials_key(org_id, user_id))
            .await?
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No HubSpot credentials found")))?;

        serde_json::from_str(&raw).map_err(|e| AppError::InternalError(e.into()))
    }
}
