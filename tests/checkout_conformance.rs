//! End-to-end checks of the cart/checkout arithmetic as a customer would
//! exercise it: building a cart, applying a discount, and producing the
//! billing figures an order is created from.

use rust_decimal::Decimal;
use uuid::Uuid;

use tally::{
    attributes::VariantAttributes,
    cart::{Cart, CartError, Discount},
    order::OrderStatus,
    products::ProductSnapshot,
    summary::{CheckoutSummary, ShippingMethod},
};

fn product(name: &str, price: u64) -> ProductSnapshot {
    ProductSnapshot {
        uuid: Uuid::now_v7(),
        name: name.to_string(),
        sku: None,
        image: None,
        price,
        sale_price: None,
    }
}

#[test]
fn same_product_with_distinct_attributes_forms_two_lines() -> Result<(), CartError> {
    let mut cart = Cart::new();
    let shirt = product("Shirt", 20_00);

    cart.add_item(&shirt, 2, VariantAttributes::none())?;
    cart.add_item(&shirt, 1, [("color", "red")].into_iter().collect())?;

    assert_eq!(cart.lines().len(), 2);
    assert_eq!(cart.total_items(), 3);
    assert_eq!(cart.subtotal(), 60_00);

    Ok(())
}

#[test]
fn repeated_adds_with_identical_attributes_never_duplicate_lines() -> Result<(), CartError> {
    let mut cart = Cart::new();
    let shirt = product("Shirt", 20_00);
    let size_m: VariantAttributes = [("size", "M")].into_iter().collect();

    cart.add_item(&shirt, 1, size_m.clone())?;
    cart.add_item(&shirt, 4, size_m.clone())?;

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.find(shirt.uuid, &size_m).map(|l| l.quantity), Some(5));

    Ok(())
}

#[test]
fn cart_survives_a_serialization_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = Cart::new();

    cart.add_item(&product("Mug", 15_00), 1, VariantAttributes::none())?;

    let json = serde_json::to_string(&cart)?;
    let restored: Cart = serde_json::from_str(&json)?;

    assert_eq!(restored, cart);
    assert_eq!(restored.total(), 15_00);

    Ok(())
}

#[test]
fn checkout_summary_from_a_discounted_cart_is_consistent() -> Result<(), CartError> {
    let mut cart = Cart::new();

    cart.add_item(&product("Lamp", 80_00), 1, VariantAttributes::none())?;
    cart.add_item(&product("Bulb", 5_00), 4, VariantAttributes::none())?;
    cart.set_discount(Some(Discount {
        code: "TEN".to_string(),
        amount: 10_00,
    }));

    let summary = CheckoutSummary::compute(&cart, ShippingMethod::Standard, Decimal::from(8));

    assert_eq!(summary.subtotal, 100_00);
    assert_eq!(summary.discount, 10_00);
    assert!(summary.is_consistent());
    assert_eq!(
        summary.total,
        summary.subtotal + summary.shipping + summary.tax - summary.discount
    );

    Ok(())
}

#[test]
fn order_lifecycle_happy_path_and_dead_ends() {
    let placed = OrderStatus::Pending;

    let delivered = placed
        .transition(OrderStatus::Processing)
        .and_then(|s| s.transition(OrderStatus::Shipped))
        .and_then(|s| s.transition(OrderStatus::Delivered));

    assert_eq!(delivered, Ok(OrderStatus::Delivered));

    let cancelled = OrderStatus::Pending.transition(OrderStatus::Cancelled);

    assert_eq!(cancelled, Ok(OrderStatus::Cancelled));
    assert!(OrderStatus::Cancelled.transition(OrderStatus::Pending).is_err());
    assert!(OrderStatus::Delivered.transition(OrderStatus::Shipped).is_err());
}
