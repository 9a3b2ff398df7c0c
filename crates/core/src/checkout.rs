//! Checkout form validation and order numbering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, OrderId};

/// Raw checkout form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShippingForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// A validation failure for one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    /// Error for a form field.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validated shipping details stored on an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingDetails {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: Email,
}

impl ShippingDetails {
    pub const FULL_NAME_MAX: usize = 100;
    pub const ADDRESS_MAX: usize = 200;
    pub const CITY_MAX: usize = 50;
    pub const PHONE_MAX: usize = 30;
    pub const EMAIL_MAX: usize = 100;

    /// Validate a checkout form.
    ///
    /// # Errors
    ///
    /// Returns every failing field, in form order.
    pub fn parse(form: &ShippingForm) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let full_name = required(
            &mut errors,
            "full_name",
            "Full name",
            &form.full_name,
            Self::FULL_NAME_MAX,
        );
        let address = required(
            &mut errors,
            "address",
            "Address",
            &form.address,
            Self::ADDRESS_MAX,
        );
        let city = required(&mut errors, "city", "City", &form.city, Self::CITY_MAX);
        let phone = required(&mut errors, "phone", "Phone", &form.phone, Self::PHONE_MAX);
        let email = required(&mut errors, "email", "Email", &form.email, Self::EMAIL_MAX)
            .and_then(|raw| match Email::parse(&raw) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.push(FieldError::new("email", "Enter a valid email address."));
                    None
                }
            });

        match (full_name, address, city, phone, email) {
            (Some(full_name), Some(address), Some(city), Some(phone), Some(email))
                if errors.is_empty() =>
            {
                Ok(Self {
                    full_name,
                    address,
                    city,
                    phone,
                    email,
                })
            }
            _ => Err(errors),
        }
    }
}

fn required(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    label: &str,
    raw: &str,
    max: usize,
) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(FieldError::new(field, format!("{label} is required.")));
        return None;
    }
    if value.chars().count() > max {
        errors.push(FieldError::new(
            field,
            format!("{label} must be at most {max} characters."),
        ));
        return None;
    }
    Some(value.to_owned())
}

/// Customer-facing order number, e.g. `ORD-20260315-042`.
#[must_use]
pub fn order_number(id: OrderId, created_at: DateTime<Utc>) -> String {
    format!("ORD-{}-{:03}", created_at.format("%Y%m%d"), id.as_i32())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_form() -> ShippingForm {
        ShippingForm {
            full_name: "  Elena Petrova ".to_owned(),
            address: "Ul. Makedonija 12".to_owned(),
            city: "Skopje".to_owned(),
            phone: "+389 70 123 456".to_owned(),
            email: "Elena@Example.com".to_owned(),
        }
    }

    #[test]
    fn test_parse_trims_and_normalizes() {
        let details = ShippingDetails::parse(&valid_form()).unwrap();
        assert_eq!(details.full_name, "Elena Petrova");
        assert_eq!(details.email.as_str(), "elena@example.com");
    }

    #[test]
    fn test_parse_collects_all_missing_fields() {
        let errors = ShippingDetails::parse(&ShippingForm::default()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["full_name", "address", "city", "phone", "email"]);
        assert_eq!(errors[0].message, "Full name is required.");
    }

    #[test]
    fn test_parse_whitespace_only_is_missing() {
        let form = ShippingForm {
            city: "   ".to_owned(),
            ..valid_form()
        };
        let errors = ShippingDetails::parse(&form).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "city");
    }

    #[test]
    fn test_parse_length_limits() {
        let form = ShippingForm {
            phone: "1".repeat(31),
            address: "a".repeat(200),
            ..valid_form()
        };
        let errors = ShippingDetails::parse(&form).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "phone");
        assert_eq!(errors[0].message, "Phone must be at most 30 characters.");
    }

    #[test]
    fn test_parse_invalid_email() {
        let form = ShippingForm {
            email: "elena-at-example".to_owned(),
            ..valid_form()
        };
        let errors = ShippingDetails::parse(&form).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("email", "Enter a valid email address.")]);
    }

    #[test]
    fn test_order_number_format() {
        let created = Utc.with_ymd_and_hms(2026, 3, 15, 23, 59, 0).unwrap();
        assert_eq!(order_number(OrderId::new(42), created), "ORD-20260315-042");
        assert_eq!(order_number(OrderId::new(1234), created), "ORD-20260315-1234");
    }
}
