//! Cross-provider orchestration for the gateway.
//!
//! Everything in here coordinates more than one upstream call. The flows are
//! forward-only sagas: identifiers produced by one step feed the next, no
//! step is retried, and nothing is rolled back (the providers offer no
//! compensating operations). A step that fails after earlier steps succeeded
//! either aborts the request with the provider's error or, for customer
//! provisioning, surfaces the partial result to the caller.
//!
//! # Services
//!
//! - `provisioning` - Shopify + Recharge customer creation with metafield
//! - `checkout` - Recharge checkout completion (create, rate, apply, charge)
//! - `catalog` - billing/platform product join for the menu page
//! - `family_time` - Family Time one-time add-on on the next charge

pub mod catalog;
pub mod checkout;
pub mod family_time;
pub mod provisioning;

pub use catalog::menu_products;
pub use checkout::complete_checkout;
pub use family_time::{add_family_time, remove_family_time};
pub use provisioning::provision_customer;
