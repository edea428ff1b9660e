//! Outbound lead notifications.
//!
//! Fire-and-forget: a failed dispatch is logged and dropped, never retried
//! and never surfaced to the visitor. Two backends: a JSON webhook
//! (Formspree-style form endpoint) and direct SMTP via lettre.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message as EmailMessage, SmtpTransport, Transport};
use serde::Serialize;

use crate::catalog::ADMIN_EMAIL;
use crate::error::NotifyError;
use crate::session::ContactInfo;

/// A composed lead notification.
#[derive(Debug, Clone)]
pub struct LeadNotification {
    pub subject: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub service: String,
    pub description: String,
}

impl LeadNotification {
    pub fn for_lead(contact: &ContactInfo, service: &str, description: &str) -> Self {
        Self {
            subject: format!("NOUVEAU LEAD : {}", contact.full_name.trim()),
            full_name: contact.full_name.trim().to_string(),
            phone: contact.phone.trim().to_string(),
            email: contact.email.trim().to_string(),
            service: service.to_string(),
            description: description.to_string(),
        }
    }

    /// Labeled plain-text body.
    pub fn body(&self) -> String {
        format!(
            "Contact: {}\nTel: {}\nEmail: {}\nService: {}\nDescription: {}",
            self.full_name, self.phone, self.email, self.service, self.description
        )
    }

    /// Reply-to address: the visitor if they left an email, the admin
    /// otherwise.
    pub fn reply_to(&self) -> &str {
        if self.email.is_empty() {
            ADMIN_EMAIL
        } else {
            &self.email
        }
    }
}

/// Notification dispatch backend.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &LeadNotification) -> Result<(), NotifyError>;
}

// ── Webhook backend ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    #[serde(rename = "_subject")]
    subject: String,
    message: String,
    #[serde(rename = "type")]
    kind: &'static str,
    full_name: &'a str,
    phone: &'a str,
    email: &'a str,
    #[serde(rename = "_replyto")]
    reply_to: &'a str,
}

/// POSTs the lead as JSON to a form endpoint (Formspree-style).
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &LeadNotification) -> Result<(), NotifyError> {
        let payload = WebhookPayload {
            subject: format!("RUBY - {}", notification.subject),
            message: notification.body(),
            kind: "lead",
            full_name: &notification.full_name,
            phone: &notification.phone,
            email: &notification.email,
            reply_to: notification.reply_to(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed {
                backend: "webhook".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(NotifyError::SendFailed {
                backend: "webhook".to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        tracing::info!("Lead notification posted to webhook");
        Ok(())
    }
}

// ── SMTP backend ────────────────────────────────────────────────────

/// SMTP settings, built from environment variables.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub to_address: String,
}

impl SmtpConfig {
    /// Returns `None` if `LEAD_SMTP_HOST` is not set (backend disabled).
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("LEAD_SMTP_HOST").ok()?;
        let port: u16 = std::env::var("LEAD_SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);
        let username = std::env::var("LEAD_SMTP_USERNAME").unwrap_or_default();
        let password = std::env::var("LEAD_SMTP_PASSWORD").unwrap_or_default();
        let from_address =
            std::env::var("LEAD_SMTP_FROM").unwrap_or_else(|_| username.clone());
        let to_address =
            std::env::var("LEAD_NOTIFY_TO").unwrap_or_else(|_| ADMIN_EMAIL.to_string());

        Some(Self {
            host,
            port,
            username,
            password,
            from_address,
            to_address,
        })
    }
}

/// Sends the lead to the admin mailbox via SMTP.
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &LeadNotification) -> Result<(), NotifyError> {
        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );

        let transport = SmtpTransport::relay(&self.config.host)
            .map_err(|e| NotifyError::SendFailed {
                backend: "smtp".to_string(),
                reason: format!("SMTP relay error: {e}"),
            })?
            .port(self.config.port)
            .credentials(creds)
            .build();

        let email = EmailMessage::builder()
            .from(self.config.from_address.parse().map_err(|e| {
                NotifyError::BuildFailed(format!("Invalid from address: {e}"))
            })?)
            .to(self.config.to_address.parse().map_err(|e| {
                NotifyError::BuildFailed(format!("Invalid to address: {e}"))
            })?)
            .reply_to(notification.reply_to().parse().map_err(|e| {
                NotifyError::BuildFailed(format!("Invalid reply-to address: {e}"))
            })?)
            .subject(format!("RUBY - {}", notification.subject))
            .body(notification.body())
            .map_err(|e| NotifyError::BuildFailed(format!("Failed to build email: {e}")))?;

        transport.send(&email).map_err(|e| NotifyError::SendFailed {
            backend: "smtp".to_string(),
            reason: format!("SMTP send failed: {e}"),
        })?;

        tracing::info!(to = %self.config.to_address, "Lead notification emailed");
        Ok(())
    }
}

/// Pick a notifier from the environment: webhook if `LEAD_WEBHOOK_URL` is
/// set, SMTP if `LEAD_SMTP_HOST` is, otherwise disabled.
pub fn from_env() -> Option<std::sync::Arc<dyn Notifier>> {
    if let Ok(url) = std::env::var("LEAD_WEBHOOK_URL") {
        tracing::info!(url = %url, "Lead notifications via webhook");
        return Some(std::sync::Arc::new(WebhookNotifier::new(url)));
    }
    if let Some(config) = SmtpConfig::from_env() {
        tracing::info!(host = %config.host, "Lead notifications via SMTP");
        return Some(std::sync::Arc::new(SmtpNotifier::new(config)));
    }
    tracing::warn!("Lead notifications disabled (no webhook URL or SMTP host configured)");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> LeadNotification {
        LeadNotification::for_lead(
            &ContactInfo {
                full_name: " Awa Diop ".into(),
                phone: "+221770000000".into(),
                email: "awa@example.com".into(),
            },
            "💻 Développement web",
            "Un site vitrine complet",
        )
    }

    #[test]
    fn body_labels_every_field() {
        let n = notification();
        let body = n.body();
        assert!(body.contains("Contact: Awa Diop"));
        assert!(body.contains("Tel: +221770000000"));
        assert!(body.contains("Email: awa@example.com"));
        assert!(body.contains("Service: 💻 Développement web"));
        assert!(body.contains("Description: Un site vitrine complet"));
    }

    #[test]
    fn subject_names_the_lead() {
        assert_eq!(notification().subject, "NOUVEAU LEAD : Awa Diop");
    }

    #[test]
    fn reply_to_prefers_the_visitor() {
        let mut n = notification();
        assert_eq!(n.reply_to(), "awa@example.com");
        n.email.clear();
        assert_eq!(n.reply_to(), ADMIN_EMAIL);
    }

    #[test]
    fn webhook_payload_serializes_formspree_fields() {
        let n = notification();
        let payload = WebhookPayload {
            subject: format!("RUBY - {}", n.subject),
            message: n.body(),
            kind: "lead",
            full_name: &n.full_name,
            phone: &n.phone,
            email: &n.email,
            reply_to: n.reply_to(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["_subject"], "RUBY - NOUVEAU LEAD : Awa Diop");
        assert_eq!(json["type"], "lead");
        assert_eq!(json["_replyto"], "awa@example.com");
    }
}
