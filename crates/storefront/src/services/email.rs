//! Transactional email for customers.
//!
//! Uses SMTP via lettre with Askama text and HTML templates. Callers treat
//! delivery as best effort: a failed email never fails the request.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use emporium_core::CurrencyCode;

use crate::config::EmailConfig;
use crate::models::{Order, OrderItem};

/// One line of the confirmation email, preformatted.
pub struct EmailLine {
    pub name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

/// HTML body of the order confirmation.
#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    order_id: &'a str,
    order_number: &'a str,
    customer_name: &'a str,
    lines: &'a [EmailLine],
    total: &'a str,
}

/// Plain-text body of the order confirmation.
#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    order_id: &'a str,
    order_number: &'a str,
    customer_name: &'a str,
    lines: &'a [EmailLine],
    total: &'a str,
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

/// Email service for sending transactional emails.
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

    /// Send "Order Confirmation #{id}" listing the items and the total.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_order_confirmation(
        &self,
        order: &Order,
        items: &[OrderItem],
        currency: CurrencyCode,
    ) -> Result<(), EmailError> {
        let lines = confirmation_lines(items, currency);
        let order_id = order.id.to_string();
        let order_number = order.number();
        let total = order.total_amount.display(currency);

        let html = OrderConfirmationHtml {
            order_id: &order_id,
            order_number: &order_number,
            customer_name: &order.full_name,
            lines: &lines,
            total: &total,
        }
        .render()?;
        let text = OrderConfirmationText {
            order_id: &order_id,
            order_number: &order_number,
            customer_name: &order.full_name,
            lines: &lines,
            total: &total,
        }
        .render()?;

        self.send_multipart_email(
            &order.email,
            &format!("Order Confirmation #{}", order.id),
            &text,
            &html,
        )
        .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

fn confirmation_lines(items: &[OrderItem], currency: CurrencyCode) -> Vec<EmailLine> {
    items
        .iter()
        .map(|item| EmailLine {
            name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.display(currency),
            line_total: item.line_total().display(currency),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use emporium_core::{Money, OrderId, OrderItemId, ProductId};

    fn item(name: &str, price: &str, quantity: i32) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(9),
            product_id: ProductId::new(3),
            product_name: name.to_string(),
            unit_price: Money::new(price.parse().unwrap()),
            quantity,
        }
    }

    #[test]
    fn test_confirmation_lines_format_totals() {
        let lines = confirmation_lines(&[item("Ajvar", "180", 3)], CurrencyCode::Mkd);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].unit_price, "180.00 ден");
        assert_eq!(lines[0].line_total, "540.00 ден");
    }

    #[test]
    fn test_text_template_lists_items() {
        let lines = confirmation_lines(&[item("Ajvar", "180", 2)], CurrencyCode::Eur);
        let text = OrderConfirmationText {
            order_id: "9",
            order_number: "ORD-20260101-009",
            customer_name: "Ana",
            lines: &lines,
            total: "360.00 €",
        }
        .render()
        .unwrap();
        assert!(text.contains("ORD-20260101-009"));
        assert!(text.contains("Ajvar"));
        assert!(text.contains("360.00 €"));
    }
}
