use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::mpsc;

use crate::config::Config;

const WELCOME_TEMPLATE: &str = include_str!("../templates/welcome_email.html");

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Renders the signup greeting for a freshly created account.
pub fn welcome_email(to: &str, username: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: "Welcome to Our Service".to_string(),
        text: "Thank you for signing up for our service!".to_string(),
        html: WELCOME_TEMPLATE.replace("{{username}}", username),
    }
}

/// Handle to the background mail worker. Submission never blocks a request
/// and never surfaces a failure to the HTTP caller; the worker owns the SMTP
/// transport and logs its own outcomes.
#[derive(Clone)]
pub struct Mailer {
    tx: mpsc::Sender<OutgoingEmail>,
}

impl Mailer {
    pub fn spawn(config: &Config) -> Self {
        let (tx, rx) = mpsc::channel::<OutgoingEmail>(64);
        tokio::spawn(worker(config.clone(), rx));
        Self { tx }
    }

    /// Fire-and-forget: a full or closed queue drops the message with a log
    /// line, nothing more.
    pub fn send(&self, email: OutgoingEmail) {
        if let Err(e) = self.tx.try_send(email) {
            tracing::warn!("mailer: dropping outgoing email: {e}");
        }
    }
}

async fn worker(config: Config, mut rx: mpsc::Receiver<OutgoingEmail>) {
    let transport = match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host) {
        Ok(builder) => builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_pass.clone(),
            ))
            .build(),
        Err(e) => {
            tracing::error!("mailer: SMTP transport setup failed, mail disabled: {e}");
            while rx.recv().await.is_some() {}
            return;
        }
    };

    while let Some(email) = rx.recv().await {
        match build_message(&config.smtp_from, &email) {
            Ok(message) => match transport.send(message).await {
                Ok(_) => tracing::info!(to = %email.to, "mailer: email sent"),
                Err(e) => tracing::error!(to = %email.to, "mailer: send failed: {e}"),
            },
            Err(e) => tracing::error!(to = %email.to, "mailer: invalid message: {e}"),
        }
    }
}

fn build_message(
    from: &str,
    email: &OutgoingEmail,
) -> Result<Message, Box<dyn std::error::Error + Send + Sync>> {
    Ok(Message::builder()
        .from(from.parse()?)
        .to(email.to.parse()?)
        .subject(email.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))?)
}
