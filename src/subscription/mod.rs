//! Membership subscriptions paid through movements.

mod core;
mod form_page;

pub use core::{
    Subscription, SubscriptionKind, create_subscription_table, get_subscription_for_movement,
    save_subscription,
};
pub use form_page::{get_subscription_page, save_subscription_endpoint};
