use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::info;

use crate::config::Config;
use crate::error::MenuError;

/// Send the rendered menu to all configured recipients in one message,
/// over implicit TLS the way the Mensa SMTP setup expects (port 465).
pub fn send_report(config: &Config, subject: &str, html_body: &str) -> Result<(), MenuError> {
    let from: Mailbox = config.smtp_email.parse()?;
    let mut builder = Message::builder().from(from).subject(subject);
    for recipient in &config.recipients {
        builder = builder.to(recipient.parse()?);
    }
    let message = builder
        .header(ContentType::TEXT_HTML)
        .body(html_body.to_string())?;

    let credentials = Credentials::new(config.smtp_email.clone(), config.smtp_password.clone());
    let transport = SmtpTransport::relay(&config.smtp_host)?
        .port(config.smtp_port)
        .credentials(credentials)
        .build();

    info!(
        "sending menu to {} recipient(s) via {}",
        config.recipients.len(),
        config.smtp_host
    );
    transport.send(&message)?;
    info!("mail sent to: {}", config.recipients.join(", "));
    Ok(())
}
