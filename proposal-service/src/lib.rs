pub mod config;
pub mod domain;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::middleware::from_fn;
use axum::middleware::from_fn_with_state;
use axum::{
    routing::{get, post, put},
    Router,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    signature::{signature_validation_middleware, SignatureConfig, SignatureStore},
    tracing::request_id_middleware,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use config::Config;
use services::{Database, Mailer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub mailer: Arc<Mailer>,
    pub signature_config: SignatureConfig,
    nonces: Arc<DashMap<String, i64>>,
}

impl AsRef<SignatureConfig> for AppState {
    fn as_ref(&self) -> &SignatureConfig {
        &self.signature_config
    }
}

#[async_trait::async_trait]
impl SignatureStore for AppState {
    async fn validate_nonce(&self, nonce: &str) -> Result<bool, AppError> {
        let now = chrono::Utc::now().timestamp();
        let expiry = self.config.signature.expiry_seconds;

        // Expired entries are swept on the way in; the map stays bounded by
        // the request rate within one expiry window.
        self.nonces.retain(|_, seen_at| now - *seen_at < expiry);

        match self.nonces.entry(nonce.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                Ok(true)
            }
        }
    }

    async fn get_signing_secret(&self, _client_id: &str) -> Result<Option<String>, AppError> {
        // One signing secret for the BFF; per-client credentials would come
        // from the directory service.
        Ok(Some(self.config.signature.secret.expose_secret().clone()))
    }
}

pub struct Application {
    port: u16,
    router: Router,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let db = Database::new(
            config.database.url.expose_secret(),
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;
        db.run_migrations().await?;

        let mailer = Mailer::new(config.smtp.clone())?;
        if mailer.is_enabled() {
            tracing::info!("SMTP notifier initialized");
        } else {
            tracing::info!("SMTP notifier disabled - bill notices will be skipped");
        }

        services::metrics::init_metrics();

        let signature_config = SignatureConfig {
            require_signatures: config.signature.enabled,
            excluded_paths: vec![
                "/health".to_string(),
                "/ready".to_string(),
                "/metrics".to_string(),
            ],
        };

        let state = AppState {
            config: config.clone(),
            db,
            mailer: Arc::new(mailer),
            signature_config,
            nonces: Arc::new(DashMap::new()),
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics))
            // Proposal lifecycle
            .route("/proposals", post(handlers::proposals::create_proposal))
            .route("/proposals/:id", get(handlers::proposals::get_proposal))
            .route(
                "/proposals/:id/payment-terms",
                put(handlers::proposals::replace_payment_terms),
            )
            .route(
                "/proposals/:id/payment-terms/description",
                get(handlers::proposals::payment_terms_description),
            )
            .route(
                "/proposals/:id/submit",
                post(handlers::proposals::submit_proposal),
            )
            .route(
                "/proposals/:id/approve",
                post(handlers::proposals::approve_proposal),
            )
            .route(
                "/proposals/:id/reject",
                post(handlers::proposals::reject_proposal),
            )
            .route(
                "/proposals/:id/client-approval",
                post(handlers::proposals::client_approval),
            )
            // Invoice generation
            .route(
                "/proposals/:id/generate-upfront-invoice",
                post(handlers::invoices::generate_upfront_invoice),
            )
            .route(
                "/proposals/:id/generate-first-recurring-invoice",
                post(handlers::invoices::generate_first_recurring_invoice),
            )
            .route(
                "/proposals/:id/generate-invoice",
                post(handlers::invoices::generate_invoice),
            )
            .route("/proposals/:id/bills", get(handlers::invoices::list_bills))
            .route("/bills/:id", get(handlers::invoices::get_bill))
            .layer(from_fn_with_state(
                state.clone(),
                signature_validation_middleware::<AppState>,
            ))
            .layer(from_fn(metrics_middleware))
            .layer(from_fn(security_headers_middleware))
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
            .with_state(state);

        Ok(Self {
            port: config.server.port,
            router,
        })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        tracing::info!("Listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}
