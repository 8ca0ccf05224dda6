use serde::Deserialize;

/// Tenant pair identifying one authorization flow.
#[derive(Debug, Deserialize)]
pub struct TenantForm {
    pub user_id: String,
    pub org_id: String,
}

/// Query parameters delivered by the provider on the OAuth2 callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Form body for the item load endpoint; `credentials` carries the raw
/// provider token payload as JSON text.
#[derive(Debug, Deserialize)]
pub struct LoadForm {
    pub credentials: String,
}
