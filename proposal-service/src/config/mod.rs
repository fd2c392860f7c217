use crate::services::MailerConfig;
use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub signature: ServiceSignatureConfig,
    pub smtp: MailerConfig,
    pub telemetry: TelemetryConfig,
    pub service_name: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Clone, Debug)]
pub struct ServiceSignatureConfig {
    pub enabled: bool,
    pub secret: Secret<String>,
    pub expiry_seconds: i64,
}

#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("PROPOSAL_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PROPOSAL_SERVICE_PORT")
            .unwrap_or_else(|_| "3007".to_string())
            .parse()?;

        let db_url = env::var("PROPOSAL_DATABASE_URL").expect("PROPOSAL_DATABASE_URL must be set");
        let max_connections = env::var("PROPOSAL_DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;
        let min_connections = env::var("PROPOSAL_DATABASE_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()?;

        let signature_secret =
            env::var("PROPOSAL_SIGNATURE_SECRET").unwrap_or_else(|_| "dev-secret".to_string());
        let signature_enabled = env::var("PROPOSAL_SIGNATURE_ENABLED")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        let smtp_enabled = env::var("PROPOSAL_SMTP_ENABLED")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);
        let smtp = MailerConfig {
            enabled: smtp_enabled,
            host: env::var("PROPOSAL_SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("PROPOSAL_SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()?,
            user: env::var("PROPOSAL_SMTP_USER").unwrap_or_default(),
            password: Secret::new(env::var("PROPOSAL_SMTP_PASSWORD").unwrap_or_default()),
            from_email: env::var("PROPOSAL_SMTP_FROM_EMAIL")
                .unwrap_or_else(|_| "billing@example.com".to_string()),
            from_name: env::var("PROPOSAL_SMTP_FROM_NAME")
                .unwrap_or_else(|_| "Billing".to_string()),
            notify_to: env::var("PROPOSAL_SMTP_NOTIFY_TO")
                .unwrap_or_else(|_| "backoffice@example.com".to_string()),
        };

        let telemetry = TelemetryConfig {
            log_level: env::var("PROPOSAL_LOG_LEVEL")
                .unwrap_or_else(|_| "info,proposal_service=debug".to_string()),
            otlp_endpoint: env::var("PROPOSAL_OTLP_ENDPOINT").ok(),
        };

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                max_connections,
                min_connections,
            },
            signature: ServiceSignatureConfig {
                enabled: signature_enabled,
                secret: Secret::new(signature_secret),
                expiry_seconds: 300,
            },
            smtp,
            telemetry,
            service_name: "proposal-service".to_string(),
        })
    }
}
