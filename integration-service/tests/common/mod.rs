use integration_service::config::{Config, HubSpotConfig, RedisConfig, ServerConfig};
use integration_service::services::MemoryStore;
use integration_service::Application;
use secrecy::Secret;
use std::sync::Arc;

pub const TEST_ORG_ID: &str = "test-org";
pub const TEST_USER_ID: &str = "test-user";

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the service against an in-memory store, pointing all HubSpot
    /// URLs at the given mock server base.
    pub async fn spawn(hubspot_base: &str) -> Self {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            redis: RedisConfig {
                url: Secret::new("redis://localhost:6379".to_string()),
            },
            hubspot: HubSpotConfig {
                client_id: "test-client-id".to_string(),
                client_secret: Secret::new("test-client-secret".to_string()),
                redirect_uri: "http://localhost:8000/integrations/hubspot/oauth2callback"
                    .to_string(),
                scopes: "crm.objects.contacts.read".to_string(),
                auth_url: format!("{}/oauth/authorize", hubspot_base),
                token_url: format!("{}/oauth/v1/token", hubspot_base),
                api_base_url: hubspot_base.to_string(),
            },
            service_name: "integration-service-test".to_string(),
        };

        let app = Application::build_with_store(config, Arc::new(MemoryStore::new()))
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }

    /// Start an authorization flow for the default test tenant and return
    /// the state payload extracted from the authorization URL.
    pub async fn begin_authorization(&self, client: &reqwest::Client) -> String {
        let response = client
            .post(format!("{}/integrations/hubspot/authorize", self.address))
            .form(&[("user_id", TEST_USER_ID), ("org_id", TEST_ORG_ID)])
            .send()
            .await
            .expect("Failed to call authorize endpoint");
        assert_eq!(response.status(), 200);

        let url: String = response.json().await.expect("Authorize response not JSON");
        extract_state_param(&url)
    }
}

/// Pull the decoded `state` query parameter out of an authorization URL.
pub fn extract_state_param(url: &str) -> String {
    let (_, query) = url.split_once('?').expect("URL has no query string");
    let raw = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("state="))
        .expect("URL has no state parameter");
    urlencoding::decode(raw)
        .expect("state parameter is not valid percent-encoding")
        .into_owned()
}
