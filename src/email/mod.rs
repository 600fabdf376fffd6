//! Account mail: the welcome note after registering and password reset links.

pub mod templates;

use askama::Template;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use templates::{PasswordResetMail, WelcomeMail};

#[derive(Debug)]
pub enum MailError {
    /// `GYMS_SMTP_FROM` or the member's email is not a valid mailbox.
    Address(String),
    Render(askama::Error),
    Smtp(lettre::transport::smtp::Error),
    Message(lettre::error::Error),
}

impl std::fmt::Display for MailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailError::Address(msg) => write!(f, "bad mailbox: {msg}"),
            MailError::Render(e) => write!(f, "could not render mail body: {e}"),
            MailError::Smtp(e) => write!(f, "SMTP relay refused the mail: {e}"),
            MailError::Message(e) => write!(f, "could not assemble mail: {e}"),
        }
    }
}

impl From<askama::Error> for MailError {
    fn from(e: askama::Error) -> Self {
        MailError::Render(e)
    }
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        MailError::Smtp(e)
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(e: lettre::error::Error) -> Self {
        MailError::Message(e)
    }
}

/// Sends Gymfinder's account mail through one STARTTLS relay.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    /// Greets a member who just registered and links back to the gym list.
    pub async fn send_welcome(
        &self,
        to_email: &str,
        to_name: &str,
        base_url: &str,
    ) -> Result<(), MailError> {
        let body = WelcomeMail {
            name: to_name,
            base_url,
        };
        self.deliver(to_email, "Welcome to Gymfinder", &body).await
    }

    pub async fn send_password_reset(
        &self,
        to_email: &str,
        to_name: &str,
        reset_url: &str,
    ) -> Result<(), MailError> {
        let body = PasswordResetMail {
            name: to_name,
            reset_url,
        };
        self.deliver(to_email, "Your Gymfinder password reset", &body)
            .await
    }

    async fn deliver(
        &self,
        to: &str,
        subject: &str,
        body: &impl Template,
    ) -> Result<(), MailError> {
        let message = compose(&self.from, to, subject, body)?;
        self.transport.send(message).await?;
        tracing::debug!("Mailed \"{subject}\"");
        Ok(())
    }
}

fn compose(
    from: &str,
    to: &str,
    subject: &str,
    body: &impl Template,
) -> Result<Message, MailError> {
    let sender: Mailbox = from
        .parse()
        .map_err(|e| MailError::Address(format!("sender {from}: {e}")))?;
    let recipient: Mailbox = to
        .parse()
        .map_err(|e| MailError::Address(format!("recipient {to}: {e}")))?;

    Ok(Message::builder()
        .from(sender)
        .to(recipient)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(body.render()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn welcome() -> WelcomeMail<'static> {
        WelcomeMail {
            name: "Ada",
            base_url: "http://localhost:7777",
        }
    }

    #[test]
    fn bad_mailboxes_are_reported() {
        let err = compose("not a mailbox", "ada@example.com", "Hi", &welcome()).unwrap_err();
        assert!(matches!(err, MailError::Address(_)));
        assert!(err.to_string().contains("sender not a mailbox"));

        let err = compose("gyms@example.com", "nope", "Hi", &welcome()).unwrap_err();
        assert!(err.to_string().contains("recipient nope"));
    }

    #[test]
    fn composed_mail_is_html_with_rendered_body() {
        let message = compose(
            "Gymfinder <gyms@example.com>",
            "ada@example.com",
            "Welcome to Gymfinder",
            &welcome(),
        )
        .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Welcome to Gymfinder"));
        assert!(raw.contains("Content-Type: text/html"));
        assert!(raw.contains("Hi Ada,"));
    }
}
