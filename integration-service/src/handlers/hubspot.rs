//! HTTP surface of the HubSpot integration.

use axum::extract::{Form, Query, State};
use axum::response::Html;
use axum::Json;
use service_core::error::AppError;

use crate::dtos::{CallbackQuery, LoadForm, TenantForm};
use crate::models::IntegrationItem;
use crate::AppState;

/// Returned to the popup window once the provider redirects back; the flow
/// outcome is retrieved separately through the credentials endpoint.
const CLOSE_WINDOW_PAGE: &str = "<html><body><script>window.close();</script></body></html>";

/// Start an authorization flow and return the provider URL to redirect the
/// user to.
pub async fn authorize(
    State(state): State<AppState>,
    Form(form): Form<TenantForm>,
) -> Result<Json<String>, AppError> {
    let url = state
        .oauth
        .begin_authorization(&form.user_id, &form.org_id)
        .await?;
    Ok(Json(url))
}

/// Provider redirect target. On success the page just closes the popup.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Html<&'static str>, AppError> {
    state.oauth.complete_authorization(&query).await?;
    Ok(Html(CLOSE_WINDOW_PAGE))
}

/// One-time retrieval of the credentials parked by the callback.
pub async fn credentials(
    State(state): State<AppState>,
    Form(form): Form<TenantForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let creds = state
        .oauth
        .consume_credentials(&form.user_id, &form.org_id)
        .await?;
    Ok(Json(creds))
}

/// Fetch and normalize the tenant's HubSpot contacts.
pub async fn load(
    State(state): State<AppState>,
    Form(form): Form<LoadForm>,
) -> Result<Json<Vec<IntegrationItem>>, AppError> {
    let items = state.hubspot.fetch_items(&form.credentials).await?;
    tracing::info!(count = items.len(), "Loaded HubSpot items");
    Ok(Json(items))
}
