//! Customer notifications sent from the back-office.
//!
//! Uses SMTP via lettre with Askama text and HTML templates. Delivery is best
//! effort: callers log failures and carry on.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use emporium_core::OrderStatus;

use crate::config::EmailConfig;
use crate::models::Order;

/// HTML body of the status update.
#[derive(Template)]
#[template(path = "email/status_update.html")]
struct StatusUpdateHtml<'a> {
    order_id: &'a str,
    order_number: &'a str,
    customer_name: &'a str,
    status: &'a str,
}

/// Plain-text body of the status update.
#[derive(Template)]
#[template(path = "email/status_update.txt")]
struct StatusUpdateText<'a> {
    order_id: &'a str,
    order_number: &'a str,
    customer_name: &'a str,
    status: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for customer notifications.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid or the sender address
    /// cannot be parsed.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.expose_secret().to_string(),
            ));
        }

        let address = config
            .from_address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(config.from_address.clone()))?;

        Ok(Self {
            mailer: builder.build(),
            from: Mailbox::new(Some(config.from_name.clone()), address),
        })
    }

    /// Tell the customer their order moved to `status`.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_status_update(
        &self,
        order: &Order,
        status: OrderStatus,
    ) -> Result<(), EmailError> {
        let order_id = order.id.to_string();
        let order_number = order.number();
        let status_name = status.to_string();

        let html = StatusUpdateHtml {
            order_id: &order_id,
            order_number: &order_number,
            customer_name: &order.full_name,
            status: &status_name,
        }
        .render()?;
        let text = StatusUpdateText {
            order_id: &order_id,
            order_number: &order_number,
            customer_name: &order.full_name,
            status: &status_name,
        }
        .render()?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(order
                .email
                .parse()
                .map_err(|_| EmailError::InvalidAddress(order.email.clone()))?)
            .subject(status_update_subject(order, status))
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(order_id = %order.id, %status, "Status update email sent");
        Ok(())
    }
}

fn status_update_subject(order: &Order, status: OrderStatus) -> String {
    format!("Order #{} status updated to {status}", order.id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use emporium_core::{Money, OrderId};

    fn order() -> Order {
        Order {
            id: OrderId::new(12),
            user_id: None,
            full_name: "Ana Kostova".to_string(),
            address: "Partizanska 12".to_string(),
            city: "Skopje".to_string(),
            phone: "070123456".to_string(),
            email: "ana@example.mk".to_string(),
            total_amount: Money::default(),
            status: OrderStatus::Processing,
            created_at: Utc.with_ymd_and_hms(2026, 4, 2, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_status_update_subject() {
        assert_eq!(
            status_update_subject(&order(), OrderStatus::Shipped),
            "Order #12 status updated to Shipped"
        );
    }

    #[test]
    fn test_text_template() {
        let text = StatusUpdateText {
            order_id: "12",
            order_number: "ORD-20260402-012",
            customer_name: "Ana Kostova",
            status: "Shipped",
        }
        .render()
        .unwrap();
        assert!(text.contains("Hello Ana Kostova"));
        assert!(text.contains("ORD-20260402-012"));
        assert!(text.contains("Shipped"));
    }
}
