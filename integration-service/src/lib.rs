pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;

use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use service_core::middleware::tracing::request_id_middleware;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::Config;
use services::{HubSpotClient, KeyValueStore, OAuthFlow, RedisStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub oauth: OAuthFlow,
    pub hubspot: HubSpotClient,
}

pub struct Application {
    port: u16,
    listener: tokio::net::TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(RedisStore::new(&config.redis).await?);
        Self::build_with_store(config, store).await
    }

    /// Build the application against an explicit store implementation. Tests
    /// use this with an in-memory store.
    pub async fn build_with_store(
        config: Config,
        store: Arc<dyn KeyValueStore>,
    ) -> anyhow::Result<Self> {
        let hubspot = HubSpotClient::new(config.hubspot.clone());
        let oauth = OAuthFlow::new(store, hubspot.clone());

        let state = AppState {
            config: config.clone(),
            oauth,
            hubspot,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route(
                "/integrations/hubspot/authorize",
                post(handlers::hubspot::authorize),
            )
            .route(
                "/integrations/hubspot/oauth2callback",
                get(handlers::hubspot::oauth_callback),
            )
            .route(
                "/integrations/hubspot/credentials",
                post(handlers::hubspot::credentials),
            )
            .route("/integrations/hubspot/load", post(handlers::hubspot::load))
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                }),
            )
            .layer(CorsLayer::permissive())
            .with_state(state);

        // Bind here so a configured port of 0 resolves to a usable port.
        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}
