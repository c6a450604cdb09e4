use std::path::Path;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::application::ports::AlertPort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::threat::ThreatAlert;

pub const SUBJECT: &str = "Weapon Detection";

/// Datos de conexión SMTP. La contraseña llega desde el entorno.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: Vec<String>,
}

/// Envía cada alerta por correo con la foto adjunta (STARTTLS).
pub struct EmailAlert {
    settings: SmtpSettings,
}

impl EmailAlert {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    /// Construye el mensaje sin enviarlo.
    pub fn compose(&self, alert: &ThreatAlert) -> anyhow::Result<Message> {
        let mut builder = Message::builder().from(self.settings.from.parse()?).subject(SUBJECT);
        for to in &self.settings.to {
            builder = builder.to(to.parse()?);
        }

        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(alert.message.clone()));
        if let Some(path) = &alert.snapshot {
            parts = parts.singlepart(attachment(path)?);
        }
        Ok(builder.multipart(parts)?)
    }

    fn send(&self, alert: &ThreatAlert) -> anyhow::Result<()> {
        let email = self.compose(alert)?;
        let mailer = SmtpTransport::starttls_relay(&self.settings.host)?
            .port(self.settings.port)
            .credentials(Credentials::new(self.settings.username.clone(), self.settings.password.clone()))
            .build();
        mailer.send(&email)?;
        Ok(())
    }
}

fn attachment(path: &Path) -> anyhow::Result<SinglePart> {
    let body = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "snapshot.jpg".to_string());
    Ok(Attachment::new(filename).body(body, ContentType::parse("application/octet-stream")?))
}

impl AlertPort for EmailAlert {
    fn raise(&self, alert: &ThreatAlert) -> DomainResult<()> {
        if self.settings.to.is_empty() {
            return Err(DomainError::InvalidInput("no hay destinatarios de correo".into()));
        }
        tracing::info!("✉️ Enviando alerta por correo a {}", self.settings.to.join(", "));
        self.send(alert)
            .map_err(|e| DomainError::OperationFailed(format!("correo: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::threat::ThreatKind;

    fn settings(to: Vec<String>) -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.org".into(),
            port: 587,
            username: "lifeline".into(),
            password: "secret".into(),
            from: "lifeline@example.org".into(),
            to,
        }
    }

    #[test]
    fn message_attaches_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snap = dir.path().join("detectedgun.jpg");
        std::fs::write(&snap, [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

        let mailer = EmailAlert::new(settings(vec!["guard@example.org".into()]));
        let alert = ThreatAlert::new(ThreatKind::Handgun, "Lab", Some(snap));
        let raw = String::from_utf8(mailer.compose(&alert).unwrap().formatted()).unwrap();
        assert!(raw.contains("Subject: Weapon Detection"));
        assert!(raw.contains("filename=\"detectedgun.jpg\""));
        assert!(raw.contains("application/octet-stream"));
    }

    #[test]
    fn missing_snapshot_fails_composition() {
        let mailer = EmailAlert::new(settings(vec!["guard@example.org".into()]));
        let alert = ThreatAlert::new(ThreatKind::Knife, "Lab", Some("/nonexistent/x.jpg".into()));
        assert!(mailer.compose(&alert).is_err());
    }

    #[test]
    fn no_recipients_is_rejected_before_connecting() {
        let mailer = EmailAlert::new(settings(vec![]));
        let alert = ThreatAlert::new(ThreatKind::Knife, "Lab", None);
        assert!(matches!(mailer.raise(&alert), Err(DomainError::InvalidInput(_))));
    }
}
