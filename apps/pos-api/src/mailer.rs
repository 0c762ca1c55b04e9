//! SMTP delivery of receipt emails.
//!
//! The receipt blob cached on the sale is attached as a plain-text file;
//! the body is a one-liner. Rendering belongs to atlas-core, delivery
//! belongs here.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::SmtpConfig;

/// Errors from building or sending receipt emails.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("smtp error: {0}")]
    Transport(String),
}

/// SMTP mailer for receipts.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    /// Builds a mailer from SMTP configuration.
    ///
    /// The connection is plain; the relay is expected to sit on localhost
    /// or a private network. Credentials are attached when configured.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, MailerError> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|_| MailerError::Address(config.from_address.clone()))?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host).port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Mailer {
            transport: builder.build(),
            from,
        })
    }

    /// Sends a receipt to one recipient, attached as `receipt.txt`.
    pub async fn send_receipt(
        &self,
        to: &str,
        subject: &str,
        receipt: &[u8],
    ) -> Result<(), MailerError> {
        let to: Mailbox = to
            .parse()
            .map_err(|_| MailerError::Address(to.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to.clone())
            .subject(subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(String::from("Your receipt is attached.")),
                    )
                    .singlepart(
                        Attachment::new("receipt.txt".to_string())
                            .body(receipt.to_vec(), ContentType::TEXT_PLAIN),
                    ),
            )
            .map_err(|e| MailerError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        info!(to = %to, "Receipt email sent");
        Ok(())
    }
}
