//! Order status rules as the storefront and the back-office use them.

#![allow(clippy::unwrap_used)]

use emporium_admin::models::{OrderFilter, OrderListQuery};
use emporium_core::OrderStatus;

#[test]
fn test_fulfilment_path_is_allowed() {
    let path = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Completed,
    ];
    for pair in path.windows(2) {
        let [from, to] = pair else { unreachable!() };
        assert!(from.can_transition_to(*to), "{from} -> {to} should be allowed");
    }
    assert!(OrderStatus::Completed.is_terminal());
}

#[test]
fn test_paid_orders_follow_the_same_path() {
    assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
    assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Processing));
    assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Shipped));
    assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Pending));
}

#[test]
fn test_terminal_statuses_only_accept_themselves() {
    for terminal in [
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ] {
        assert!(terminal.is_terminal());
        for to in OrderStatus::ALL {
            assert_eq!(terminal.can_transition_to(to), to == terminal);
        }
    }
}

#[test]
fn test_allowed_transitions_never_include_self() {
    for status in OrderStatus::ALL {
        assert!(!status.allowed_transitions().contains(&status));
        for to in status.allowed_transitions() {
            assert!(status.can_transition_to(*to));
        }
    }
}

#[test]
fn test_names_and_codes_parse_back() {
    for status in OrderStatus::ALL {
        assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        assert_eq!(status.code().to_string().parse::<OrderStatus>().unwrap(), status);
        assert_eq!(
            status.as_str().to_lowercase().parse::<OrderStatus>().unwrap(),
            status
        );
    }
    assert!("7".parse::<OrderStatus>().is_err());
}

#[test]
fn test_revenue_excludes_cancelled_and_refunded() {
    let counted: Vec<_> = OrderStatus::ALL
        .into_iter()
        .filter(|s| !s.counts_as_revenue())
        .collect();
    assert_eq!(counted, [OrderStatus::Cancelled, OrderStatus::Refunded]);
}

#[test]
fn test_admin_order_filter_uses_core_parsing() {
    let filter = OrderFilter::from_query(&OrderListQuery {
        search: Some("  ".to_string()),
        status: Some("2".to_string()),
    });
    assert_eq!(filter.status, Some(OrderStatus::Processing));
    assert_eq!(filter.search, None);

    let filter = OrderFilter::from_query(&OrderListQuery {
        search: Some("ana@example.com".to_string()),
        status: Some("REFUNDED".to_string()),
    });
    assert_eq!(filter.status, Some(OrderStatus::Refunded));
    assert_eq!(filter.search_id(), None);
}
