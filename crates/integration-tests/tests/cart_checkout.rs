//! A visitor's cart from the first add to a validated checkout.

#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use emporium_core::{
    Cart, CartError, CurrencyCode, OrderId, ShippingDetails, ShippingForm, order_number,
};
use emporium_integration_tests::{cents, product};

fn shipping_form() -> ShippingForm {
    ShippingForm {
        full_name: "Elena Petrova".to_string(),
        address: "Ul. Makedonija 12".to_string(),
        city: "Skopje".to_string(),
        phone: "+389 70 123 456".to_string(),
        email: "elena@example.com".to_string(),
    }
}

#[test]
fn test_cart_to_checkout() {
    let mut cart = Cart::new();
    cart.add(product(1), "Ajvar 550g", cents(280_00), 3).unwrap();
    cart.add(product(2), "Meadow honey 900g", cents(600_00), 10).unwrap();
    cart.add(product(1), "Ajvar 550g", cents(280_00), 3).unwrap();

    assert_eq!(cart.count(), 3);
    assert_eq!(cart.total(), cents(1160_00));
    assert_eq!(cart.total().display(CurrencyCode::Mkd), "1160.00 ден");

    let details = ShippingDetails::parse(&shipping_form()).unwrap();
    assert_eq!(details.email.as_str(), "elena@example.com");

    let placed = Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap();
    assert_eq!(order_number(OrderId::new(7), placed), "ORD-20260315-007");

    cart.clear();
    assert!(cart.is_empty());
}

#[test]
fn test_stock_limit_blocks_adding() {
    let mut cart = Cart::new();
    cart.add(product(5), "Acacia honey 450g", cents(390_00), 1).unwrap();

    let err = cart
        .add(product(5), "Acacia honey 450g", cents(390_00), 1)
        .unwrap_err();
    assert_eq!(
        err,
        CartError::InsufficientStock {
            product_id: product(5),
            available: 1,
        }
    );
    assert_eq!(cart.count(), 1);
    assert!(cart.increase(product(5), 1).is_err());
}

#[test]
fn test_cart_keeps_price_at_add_time() {
    let mut cart = Cart::new();
    cart.add(product(3), "Fig jam 370g", cents(220_00), 5).unwrap();
    cart.add(product(3), "Fig jam 370g", cents(250_00), 5).unwrap();

    let line = cart.get(product(3)).unwrap();
    assert_eq!(line.unit_price, cents(220_00));
    assert_eq!(line.line_total(), cents(440_00));
}

#[test]
fn test_decrease_removes_last_unit() {
    let mut cart = Cart::new();
    cart.add(product(4), "Sweet paprika 100g", cents(120_00), 5).unwrap();
    cart.decrease(product(4));
    assert!(cart.is_empty());
}

#[test]
fn test_cart_survives_the_session_as_json() {
    let mut cart = Cart::new();
    cart.add(product(1), "Ajvar 550g", cents(280_00), 3).unwrap();

    let stored = serde_json::to_value(&cart).unwrap();
    assert!(stored.is_array());
    let restored: Cart = serde_json::from_value(stored).unwrap();
    assert_eq!(restored, cart);
}

#[test]
fn test_checkout_reports_every_bad_field() {
    let errors = ShippingDetails::parse(&ShippingForm {
        full_name: String::new(),
        email: "not-an-email".to_string(),
        ..shipping_form()
    })
    .unwrap_err();

    let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
    assert!(fields.contains(&"full_name"));
    assert!(fields.contains(&"email"));
}
