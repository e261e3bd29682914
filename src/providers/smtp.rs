use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;
use crate::error::{PlaticaError, Result};
use crate::interfaces::mail::Mailer;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| PlaticaError::Config("mail.smtp_host is not configured".to_string()))?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| PlaticaError::Mail(e.to_string()))?;
        if let Some(port) = config.smtp_port {
            builder = builder.port(port);
        }
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        let from = config
            .from
            .as_deref()
            .ok_or_else(|| PlaticaError::Config("mail.from is not configured".to_string()))?
            .parse::<Mailbox>()
            .map_err(|e| PlaticaError::Mail(e.to_string()))?;
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| PlaticaError::Mail(e.to_string()))?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| PlaticaError::Mail(e.to_string()))?;
        self.transport
            .send(email)
            .await
            .map_err(|e| PlaticaError::Mail(e.to_string()))?;
        Ok(())
    }
}
