//! Integration tests for the `showroom` catalog set.
//!
//! Areas: metro, regional and island. Methods, in offer order:
//!
//! - standard: metro, flat 30.00
//! - freight: metro and regional, tiers `[0, 5) 15.00`, `[5, 20) 35.00`, `[20, 100) 90.00`
//! - ferry: island, flat 75.00
//! - courier: global, side tables and dining chairs only, flat 20.00
//!
//! Sofas add 40.00 per unit to island shipping; wardrobes add 60.00 to island
//! and 25.00 to regional shipping.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use cartwright::prelude::*;

fn usd(minor: i64) -> Money<'static, rusty_money::iso::Currency> {
    Money::from_minor(minor, USD)
}

fn request(context: CheckoutContext, area: &str, shipping: ShippingSelection<'static>) -> CheckoutRequest<'static> {
    CheckoutRequest {
        context,
        customer: Customer {
            name: "Showroom Customer".to_string(),
            email: "customer@example.com".to_string(),
            phone: None,
        },
        address: ShippingAddress {
            line1: "9 Timber Lane".to_string(),
            line2: None,
            city: "Portland".to_string(),
            postcode: "97201".to_string(),
            area: AreaId::new(area),
        },
        shipping,
    }
}

#[test]
fn metro_quote_lists_area_methods_in_order() -> TestResult {
    let catalog = Catalog::from_set("showroom")?;
    let cart = catalog.cart(&["side-table", "armchair"])?;

    let quote = compute_shipping_cost(&cart, &AreaId::new("metro"), catalog.methods())?;

    let methods: Vec<&str> = quote
        .options()
        .iter()
        .map(|option| option.method_id.as_str())
        .collect();

    assert_eq!(cart.subtotal()?, usd(25_000));
    assert_eq!(quote.weight(), Decimal::from(11));
    assert_eq!(methods, vec!["standard", "freight"]);
    assert_eq!(quote.option(&MethodId::new("freight"))?.cost, usd(3_500));
    assert_eq!(
        quote.cheapest().map(|option| option.method_id.as_str()),
        Some("standard")
    );

    Ok(())
}

#[test]
fn restricted_global_courier_serves_regional_chairs() -> TestResult {
    let catalog = Catalog::from_set("showroom")?;
    let cart = catalog.cart(&["dining-chair:oak"])?;

    let quote = compute_shipping_cost(&cart, &AreaId::new("regional"), catalog.methods())?;
    let courier = quote.option(&MethodId::new("courier"))?;

    assert_eq!(courier.eligibility, Eligibility::Global);
    assert_eq!(courier.cost, usd(2_000));
    assert_eq!(
        quote.cheapest().map(|option| option.method_id.as_str()),
        Some("courier")
    );

    Ok(())
}

#[test]
fn island_shipping_adds_product_surcharge() -> TestResult {
    let catalog = Catalog::from_set("showroom")?;
    let cart = catalog.cart(&["sofa:green"])?;

    let quote = compute_shipping_cost(&cart, &AreaId::new("island"), catalog.methods())?;
    let ferry = quote.option(&MethodId::new("ferry"))?;

    assert_eq!(cart.subtotal()?, usd(95_000));
    assert_eq!(ferry.method_cost, usd(7_500));
    assert_eq!(ferry.surcharge, usd(4_000));
    assert_eq!(ferry.cost, usd(11_500));
    assert_eq!(quote.options().len(), 1);

    Ok(())
}

#[test]
fn heavy_cart_uses_highest_freight_tier() -> TestResult {
    let catalog = Catalog::from_set("showroom")?;
    let cart = catalog.cart(&["wardrobe", "wardrobe"])?;

    let quote = compute_shipping_cost(&cart, &AreaId::new("metro"), catalog.methods())?;
    let freight = quote.option(&MethodId::new("freight"))?;

    assert_eq!(quote.weight(), Decimal::from(160));
    assert!(freight.tier_overflow);
    assert_eq!(freight.cost, usd(9_000));

    Ok(())
}

#[test]
fn storefront_checkout_to_island() -> TestResult {
    let catalog = Catalog::from_set("showroom")?;
    let config = catalog.config()?;
    let checkout = Checkout::new(&config, catalog.methods());
    let cart = catalog.cart(&["wardrobe"])?;

    let order = checkout.place_order(
        &cart,
        request(CheckoutContext::Storefront, "island", ShippingSelection::Method(None)),
    )?;

    let totals = order.totals();

    assert_eq!(order.shipping_method(), Some(&MethodId::new("ferry")));
    assert_eq!(totals.subtotal, usd(75_000));
    assert_eq!(totals.shipping_cost, usd(13_500));
    assert_eq!(totals.tax, usd(6_000));
    assert_eq!(totals.total, usd(94_500));

    let line = order.lines().first().ok_or("order has no lines")?;
    assert_eq!(line.model_number.as_deref(), Some("WR-750"));

    Ok(())
}

#[test]
fn manual_checkout_uses_configured_fee() -> TestResult {
    let catalog = Catalog::from_set("showroom")?;
    let config = catalog.config()?;
    let checkout = Checkout::new(&config, catalog.methods());
    let cart = catalog.cart(&["sofa:grey"])?;

    let order = checkout.place_order(
        &cart,
        request(CheckoutContext::Manual, "island", ShippingSelection::Manual(None)),
    )?;

    assert_eq!(order.shipping_method(), None);
    assert_eq!(order.totals().shipping_cost, usd(10_000));
    assert_eq!(order.totals().total, usd(100_000));

    Ok(())
}

#[test]
fn unserved_area_has_no_shipping() -> TestResult {
    let catalog = Catalog::from_set("showroom")?;
    let cart = catalog.cart(&["armchair"])?;

    let result = compute_shipping_cost(&cart, &AreaId::new("overseas"), catalog.methods());

    assert_eq!(
        result.map(|quote| quote.options().len()),
        Err(ShippingError::NoEligibleShippingMethod(AreaId::new("overseas")))
    );

    Ok(())
}

#[test]
fn on_sale_variation_price_is_ignored_when_product_is_not_on_sale() -> TestResult {
    let catalog = Catalog::from_set("showroom")?;
    let sofa = catalog.product("sofa")?;

    let green = sofa.variation(&VariationId::new("green"));

    assert_eq!(resolve_unit_price(sofa, green), usd(95_000));
    assert_eq!(
        sofa.variation_groups()
            .iter()
            .map(|group| group.kind)
            .collect::<Vec<_>>(),
        vec!["Color"]
    );

    Ok(())
}
