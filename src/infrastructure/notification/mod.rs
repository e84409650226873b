// src/infrastructure/notification/mod.rs
// Outbound email notification over HTTPS

use std::sync::Arc;

use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::{header, Body, Client, Method, Request};
use hyper_tls::HttpsConnector;
use serde::Serialize;

use crate::config::NotificationConfig;
use crate::domain::errors::NotificationError;
use crate::domain::service::{NotificationContext, NotificationService, TemplateKey};

const DEFAULT_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

/// Email channel over a Resend-style HTTP API.
pub struct EmailNotifier {
    client: Client<HttpsConnector<HttpConnector>>,
    endpoint: String,
    api_key: String,
    from_address: String,
    base_url: String,
}

impl EmailNotifier {
    pub fn new(api_key: String, from_address: String, base_url: String) -> Self {
        let https = HttpsConnector::new();
        Self {
            client: Client::builder().build::<_, Body>(https),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            from_address,
            base_url,
        }
    }

    fn render_html(&self, template: TemplateKey, context: &NotificationContext) -> String {
        format!(
            "<h2>Hi {},</h2>\
             <p>{}</p>\
             <p>Track your order: <a href=\"{}/orders/{}\">View Status</a></p>",
            context.customer_name,
            template.message(),
            self.base_url,
            context.order_id
        )
    }
}

#[async_trait]
impl NotificationService for EmailNotifier {
    async fn send(
        &self,
        to: &str,
        template: TemplateKey,
        context: &NotificationContext,
    ) -> Result<(), NotificationError> {
        let payload = EmailPayload {
            from: &self.from_address,
            to: [to],
            subject: template.subject(),
            html: self.render_html(template, context),
        };
        let body = serde_json::to_vec(&payload)
            .map_err(|e| NotificationError::Channel(e.to_string()))?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(&self.endpoint)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(|e| NotificationError::Channel(e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| NotificationError::Channel(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let bytes = hyper::body::to_bytes(response.into_body())
                .await
                .unwrap_or_default();
            return Err(NotificationError::Rejected(format!(
                "{}: {}",
                status,
                String::from_utf8_lossy(&bytes)
            )));
        }

        log::debug!(
            "Sent {} notification for order {}",
            template.as_str(),
            context.order_id
        );
        Ok(())
    }
}

/// No-op channel used when no API key is configured. Reports success
/// trivially; absence of configuration is degradation, not an error.
pub struct DisabledNotifier;

#[async_trait]
impl NotificationService for DisabledNotifier {
    async fn send(
        &self,
        _to: &str,
        template: TemplateKey,
        context: &NotificationContext,
    ) -> Result<(), NotificationError> {
        log::debug!(
            "Notification channel not configured - skipping {} email for order {}",
            template.as_str(),
            context.order_id
        );
        Ok(())
    }
}

/// Pick the channel implementation from configuration.
pub fn build_notifier(config: &NotificationConfig) -> Arc<dyn NotificationService> {
    match &config.api_key {
        Some(key) if !key.is_empty() => Arc::new(EmailNotifier::new(
            key.clone(),
            config.from_address.clone(),
            config.base_url.clone(),
        )),
        _ => {
            log::info!("No notification API key set; email dispatch disabled");
            Arc::new(DisabledNotifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_channel_reports_success() {
        let notifier = DisabledNotifier;
        let context = NotificationContext {
            order_id: "o1".into(),
            customer_name: "Asha".into(),
        };
        assert!(notifier
            .send("asha@example.com", TemplateKey::Ready, &context)
            .await
            .is_ok());
    }

    #[test]
    fn html_body_links_the_order_page() {
        let notifier = EmailNotifier::new(
            "key".into(),
            "Orders <orders@example.com>".into(),
            "https://shop.example.com".into(),
        );
        let context = NotificationContext {
            order_id: "ord-42".into(),
            customer_name: "Asha".into(),
        };
        let html = notifier.render_html(TemplateKey::Delivered, &context);
        assert!(html.contains("Hi Asha,"));
        assert!(html.contains("https://shop.example.com/orders/ord-42"));
        assert!(html.contains("has been delivered"));
    }
}
