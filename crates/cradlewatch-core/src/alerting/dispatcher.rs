//! Notification fan-out for high-priority alerts
//!
//! The dispatcher runs as a background task fed by a bounded queue, so a
//! slow or failing delivery channel can never stall the sampling loops.
//! Delivery failures are logged and surfaced in the per-contact results;
//! they never roll back the alert that triggered them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::{Alert, EmergencyContact};

/// Result of delivering one notification to one contact
#[derive(Debug, Clone)]
pub struct NotificationResult {
    /// Contact the notification was addressed to
    pub contact: String,
    /// Whether delivery succeeded
    pub success: bool,
    /// Error message if delivery failed
    pub error: Option<String>,
    /// When delivery was attempted
    pub sent_at: DateTime<Utc>,
}

/// Delivery errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Transport seam for alert delivery
///
/// The core only guarantees a notifier is invoked at most once per alert
/// raise; queueing and retry policy belong to the implementation.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert to one contact
    async fn notify(
        &self,
        alert: &Alert,
        contact: &EmergencyContact,
    ) -> std::result::Result<(), NotificationError>;
}

/// Default notifier: posts to a webhook when one is configured, otherwise
/// records the intent in the log
///
/// Phone and SMS delivery run outside this process; the webhook is the
/// hand-off point to whatever gateway the hospital operates.
pub struct NotificationSender {
    client: Client,
    webhook_url: Option<String>,
}

impl NotificationSender {
    /// Create a sender, webhook-backed when `webhook_url` is set
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            webhook_url,
        }
    }

    /// Deliver an alert to every contact, collecting per-contact results
    pub async fn send_all(
        &self,
        alert: &Alert,
        contacts: &[EmergencyContact],
    ) -> Vec<NotificationResult> {
        let mut results = Vec::with_capacity(contacts.len());

        for contact in contacts {
            let sent_at = Utc::now();
            let result = self.notify(alert, contact).await;
            results.push(NotificationResult {
                contact: contact.name.clone(),
                success: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
                sent_at,
            });
        }

        results
    }

    async fn send_webhook(
        &self,
        url: &str,
        alert: &Alert,
        contact: &EmergencyContact,
    ) -> std::result::Result<(), NotificationError> {
        let payload = WebhookPayload {
            alert_id: alert.id.to_string(),
            kind: format!("{:?}", alert.kind).to_lowercase(),
            priority: format!("{:?}", alert.priority).to_lowercase(),
            title: alert.title.clone(),
            description: alert.description.clone(),
            source_key: alert.source_key.clone(),
            created_at: alert.created_at,
            contact_name: contact.name.clone(),
            contact_phone: contact.phone.clone(),
            contact_email: contact.email.clone(),
        };

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Http(format!(
                "webhook returned {}: {}",
                status, body
            )));
        }

        info!(alert_id = %alert.id, contact = %contact.name, "Webhook notification sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for NotificationSender {
    async fn notify(
        &self,
        alert: &Alert,
        contact: &EmergencyContact,
    ) -> std::result::Result<(), NotificationError> {
        match &self.webhook_url {
            Some(url) => self.send_webhook(url, alert, contact).await,
            None => {
                info!(
                    alert_id = %alert.id,
                    contact = %contact.name,
                    phone = %contact.phone,
                    email = %contact.email,
                    "No webhook configured; notification logged only"
                );
                Ok(())
            }
        }
    }
}

/// Dispatch loop: drain the queue until every sender is dropped
pub async fn run_dispatcher(
    notifier: Arc<dyn Notifier>,
    contacts: Vec<EmergencyContact>,
    mut rx: mpsc::Receiver<Alert>,
) {
    while let Some(alert) = rx.recv().await {
        debug!(alert_id = %alert.id, contacts = contacts.len(), "Dispatching notifications");

        for contact in &contacts {
            if let Err(e) = notifier.notify(&alert, contact).await {
                warn!(
                    alert_id = %alert.id,
                    contact = %contact.name,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
    }

    debug!("Notification dispatcher stopped");
}

/// Spawn the dispatch task
///
/// Returns the queue sender handed to the alert engine and the task handle.
pub fn spawn_dispatcher(
    notifier: Arc<dyn Notifier>,
    contacts: Vec<EmergencyContact>,
    buffer: usize,
) -> (mpsc::Sender<Alert>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<Alert>(buffer.max(1));
    let handle = tokio::spawn(run_dispatcher(notifier, contacts, rx));
    (tx, handle)
}

// Webhook payload shape
#[derive(Debug, Serialize)]
struct WebhookPayload {
    alert_id: String,
    kind: String,
    priority: String,
    title: String,
    description: String,
    source_key: String,
    created_at: DateTime<Utc>,
    contact_name: String,
    contact_phone: String,
    contact_email: String,
}
