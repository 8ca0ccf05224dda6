use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

const DEFAULT_SCOPES: &str = "crm.objects.appointments.read crm.objects.courses.read crm.objects.companies.read crm.objects.contacts.read";

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub hubspot: HubSpotConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RedisConfig {
    pub url: Secret<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct HubSpotConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub redirect_uri: String,
    /// Space-delimited OAuth scope list, percent-encoded when placed in the
    /// authorization URL.
    pub scopes: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("INTEGRATION_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("INTEGRATION_SERVICE_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()?;

        let redis_url = env::var("INTEGRATION_REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());

        // Missing provider credentials are a startup failure, not a
        // per-request error.
        let client_id = env::var("HUBSPOT_CLIENT_ID").expect("HUBSPOT_CLIENT_ID must be set");
        let client_secret =
            env::var("HUBSPOT_CLIENT_SECRET").expect("HUBSPOT_CLIENT_SECRET must be set");

        let redirect_uri = env::var("HUBSPOT_REDIRECT_URI").unwrap_or_else(|_| {
            "http://localhost:8000/integrations/hubspot/oauth2callback".to_string()
        });
        let scopes = env::var("HUBSPOT_SCOPES").unwrap_or_else(|_| DEFAULT_SCOPES.to_string());

        let auth_url = env::var("HUBSPOT_AUTH_URL")
            .unwrap_or_else(|_| "https://app.hubspot.com/oauth/authorize".to_string());
        let token_url = env::var("HUBSPOT_TOKEN_URL")
            .unwrap_or_else(|_| "https://api.hubapi.com/oauth/v1/token".to_string());
        let api_base_url = env::var("HUBSPOT_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.hubapi.com".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            redis: RedisConfig {
                url: Secret::new(redis_url),
            },
            hubspot: HubSpotConfig {
                client_id,
                client_secret: Secret::new(client_secret),
                redirect_uri,
                scopes,
                auth_url,
                token_url,
                api_base_url,
            },
            service_name: "integration-service".to_string(),
        })
    }
}
