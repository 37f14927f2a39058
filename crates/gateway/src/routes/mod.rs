//! HTTP route definitions.
//!
//! Route table:
//!
//! ```text
//! # Health
//! GET    /health                                     liveness probe
//!
//! # Catalog
//! GET    /products                                   storefront catalog (GraphQL)
//! GET    /collections/with-products                  collections with their products (GraphQL)
//! GET    /recharge-products                          subscription products (Recharge)
//! GET    /shopify-menu-products                      recipe products (Shopify admin)
//! GET    /menu-products                              joined menu catalog
//!
//! # Customers
//! GET    /recharge-customers/{id}                    billing customer by Shopify id
//! GET    /recharge-customers/{id}/addresses          billing addresses
//! POST   /recharge-customers                         create billing customer
//! PUT    /customers/{id}                             update billing customer
//! POST   /shopify-customers                          create account customer
//! POST   /recharge-customer-info                     provision a customer across providers
//! GET    /customers/{id}/addresses                   account addresses (Shopify admin)
//! POST   /customers/{id}/addresses                   create billing address (Recharge)
//! PUT    /customers/{id}/addresses/{address_id}      update account address (Shopify admin)
//!
//! # Payment
//! GET    /recharge-customers/{id}/payment_sources    Stripe customer with sources
//! PUT    /customers/{id}/payment-info                replace the default card (Stripe)
//!
//! # Checkout
//! POST   /checkout                                   create, rate and charge in one pass
//! POST   /recharge-checkouts                         create checkout
//! PUT    /recharge-checkouts/{token}                 update checkout
//! GET    /recharge-checkouts/{token}/shipping-rates  shipping rates for a checkout
//! POST   /recharge-charges/{token}                   charge a checkout
//! PUT    /recharge-charges/{token}                   charge a checkout (legacy verb)
//!
//! # Charges
//! GET    /recharge-queued-charges?customer_id=       upcoming charges
//! GET    /recharge-processed-charges?customer_id=    billed charges
//! POST   /skip-charge/{id}                           skip a charge
//! POST   /unskip-charge/{id}                         undo a skip
//! POST   /change-order-date/{id}                     move a charge to a new date
//!
//! # Subscriptions
//! GET    /subscriptions/{id}                         fetch a subscription
//! POST   /subscriptions                              create a subscription
//! PUT    /subscriptions/{id}                         update a subscription
//! DELETE /subscriptions/{id}                         cancel a subscription
//! POST   /onetimes/address/{address_id}              add a one-time product
//! DELETE /onetimes/{id}                              remove a one-time product
//! POST   /family-time/{id}                           add Family Time to an address
//! DELETE /family-time/{id}?customer_id=              remove Family Time
//!
//! # Misc
//! POST   /recharge-metafields                        attach a customer metafield
//! GET    /discounts/{code}                           discount lookup by code
//! ```
//!
//! Paths are registered without trailing slashes; the normalize layer
//! wrapped around the router in [`crate::app`] folds `/products/` onto
//! `/products` before routing.

use axum::Router;
use axum::routing::{delete, get, post, put};

pub mod charges;
pub mod checkout;
pub mod customers;
pub mod discounts;
pub mod metafields;
pub mod payment;
pub mod products;
pub mod subscriptions;

use crate::state::AppState;

/// `GET /health` - liveness probe.
async fn health() -> &'static str {
    "ok"
}

/// Catalog routes.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::storefront_products))
        .route(
            "/collections/with-products",
            get(products::collections_with_products),
        )
        .route("/recharge-products", get(products::recharge_products))
        .route(
            "/shopify-menu-products",
            get(products::shopify_menu_products),
        )
        .route("/menu-products", get(products::menu_products))
}

/// Customer and address routes.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/recharge-customers/{id}", get(customers::recharge_customer))
        .route(
            "/recharge-customers/{id}/addresses",
            get(customers::recharge_customer_addresses),
        )
        .route(
            "/recharge-customers",
            post(customers::create_recharge_customer),
        )
        .route("/customers/{id}", put(customers::update_recharge_customer))
        .route("/shopify-customers", post(customers::create_shopify_customer))
        .route(
            "/recharge-customer-info",
            post(customers::provision_customer),
        )
        .route(
            "/customers/{id}/addresses",
            get(customers::shopify_customer_addresses).post(customers::create_recharge_address),
        )
        .route(
            "/customers/{id}/addresses/{address_id}",
            put(customers::update_shopify_address),
        )
}

/// Payment routes.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/recharge-customers/{id}/payment_sources",
            get(payment::payment_sources),
        )
        .route(
            "/customers/{id}/payment-info",
            put(payment::update_payment_info),
        )
}

/// Checkout routes.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout::complete_checkout))
        .route("/recharge-checkouts", post(checkout::create_checkout))
        .route("/recharge-checkouts/{token}", put(checkout::update_checkout))
        .route(
            "/recharge-checkouts/{token}/shipping-rates",
            get(checkout::shipping_rates),
        )
        .route(
            "/recharge-charges/{token}",
            post(checkout::charge_checkout).put(checkout::charge_checkout),
        )
}

/// Charge routes.
pub fn charge_routes() -> Router<AppState> {
    Router::new()
        .route("/recharge-queued-charges", get(charges::queued_charges))
        .route(
            "/recharge-processed-charges",
            get(charges::processed_charges),
        )
        .route("/skip-charge/{id}", post(charges::skip_charge))
        .route("/unskip-charge/{id}", post(charges::unskip_charge))
        .route("/change-order-date/{id}", post(charges::change_order_date))
}

/// Subscription and onetime routes.
pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/subscriptions", post(subscriptions::create_subscription))
        .route(
            "/subscriptions/{id}",
            get(subscriptions::get_subscription)
                .put(subscriptions::update_subscription)
                .delete(subscriptions::delete_subscription),
        )
        .route(
            "/onetimes/address/{address_id}",
            post(subscriptions::create_onetime),
        )
        .route("/onetimes/{id}", delete(subscriptions::delete_onetime))
        .route(
            "/family-time/{id}",
            post(subscriptions::add_family_time).delete(subscriptions::remove_family_time),
        )
}

/// Metafield and discount routes.
pub fn misc_routes() -> Router<AppState> {
    Router::new()
        .route("/recharge-metafields", post(metafields::create_metafield))
        .route("/discounts/{code}", get(discounts::discount))
}

/// All routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(catalog_routes())
        .merge(customer_routes())
        .merge(payment_routes())
        .merge(checkout_routes())
        .merge(charge_routes())
        .merge(subscription_routes())
        .merge(misc_routes())
}
