use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::config::SmtpConfig;
use crate::errors::AppError;

/// Outbound notification transport. Delivery is best-effort: failures are
/// reported to the caller, who logs them and still persists the alert.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str, recipient: &str) -> Result<(), AppError>;
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::Config(format!("bad SMTP host {:?}: {}", config.host, e)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: format!("{} <{}>", config.from_name, config.from_email),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, subject: &str, body: &str, recipient: &str) -> Result<(), AppError> {
        let message = Message::builder()
            .from(self
                .from
                .parse()
                .map_err(|e| AppError::Notify(format!("invalid from address: {}", e)))?)
            .to(recipient
                .parse()
                .map_err(|e| AppError::Notify(format!("invalid recipient address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Notify(format!("failed to build message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Notify(format!("smtp send failed: {}", e)))?;

        Ok(())
    }
}

/// Log-only notifier, used when SMTP is disabled.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, body: &str, recipient: &str) -> Result<(), AppError> {
        info!(
            to = recipient,
            subject,
            body_len = body.len(),
            "smtp disabled, notification logged only"
        );
        Ok(())
    }
}
