//! Outbound mail for generated invoices.

use crate::models::Bill;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::{ExposeSecret, Secret};
use service_core::error::AppError;

#[derive(Clone, Debug)]
pub struct MailerConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Secret<String>,
    pub from_email: String,
    pub from_name: String,
    /// Back-office inbox that receives generation notices.
    pub notify_to: String,
}

/// SMTP notifier. When disabled (the default) sends become no-ops, so
/// invoice generation never depends on a mail relay being reachable.
pub struct Mailer {
    config: MailerConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl Mailer {
    pub fn new(config: MailerConfig) -> Result<Self, AppError> {
        if !config.enabled {
            return Ok(Self {
                config,
                transport: None,
            });
        }

        let creds = Credentials::new(
            config.user.clone(),
            config.password.expose_secret().clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::EmailError(format!("Failed to create SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            config,
            transport: Some(transport),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Announce a freshly generated bill. Failures are returned, not
    /// retried; callers log and move on since the bill is already written.
    pub async fn send_bill_notice(&self, bill: &Bill) -> Result<(), AppError> {
        let Some(transport) = self.transport.as_ref() else {
            return Ok(());
        };

        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| AppError::EmailError(format!("Invalid from address: {}", e)))?;
        let to: Mailbox = self
            .config
            .notify_to
            .parse()
            .map_err(|e| AppError::EmailError(format!("Invalid recipient: {}", e)))?;

        let body = format!(
            "Invoice {} generated for proposal {}.\nAmount: {} {}\n",
            bill.invoice_number,
            bill.proposal_id,
            bill.amount.normalize(),
            bill.currency,
        );

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(format!("Invoice {} generated", bill.invoice_number))
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::EmailError(format!("Failed to send notice: {}", e)))?;

        Ok(())
    }
}
