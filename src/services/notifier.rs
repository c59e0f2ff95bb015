use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::NotifyError;

/// Outbound alert email.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, subject: &str, message: &str) -> Result<(), NotifyError>;
}

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends through the EmailJS REST endpoint.
#[derive(Clone)]
pub struct EmailJsNotifier {
    http: Client,
    base_url: String,
    service_id: String,
    template_id: String,
    user_id: String,
}

impl EmailJsNotifier {
    pub fn new(base_url: String, service_id: String, template_id: String, user_id: String) -> Self {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_id,
            template_id,
            user_id,
        }
    }

    /// All three EmailJS ids are set.
    pub fn is_configured(&self) -> bool {
        !self.service_id.trim().is_empty()
            && !self.template_id.trim().is_empty()
            && !self.user_id.trim().is_empty()
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    subject: &'a str,
    message: &'a str,
}

#[async_trait]
impl Notifier for EmailJsNotifier {
    async fn notify(&self, recipient: &str, subject: &str, message: &str) -> Result<(), NotifyError> {
        if !self.is_configured() {
            return Err(NotifyError::NotConfigured);
        }

        let url = format!("{}/api/v1.0/email/send", self.base_url);
        let body = SendRequest {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.user_id,
            template_params: TemplateParams {
                to_email: recipient,
                subject,
                message,
            },
        };

        let res = self.http.post(url).json(&body).send().await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        Ok(())
    }
}

/// Writes the email to the log instead of sending it.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: &str, subject: &str, message: &str) -> Result<(), NotifyError> {
        tracing::info!("email (not sent) to={} subject={:?} message={:?}", recipient, subject, message);
        Ok(())
    }
}
