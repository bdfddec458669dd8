//! Multicast hubs.
//!
//! All three hub kinds share [`Subject`] and differ only in the
//! [`ReplayPolicy`] they plug in.

mod behavior_hub;
mod deferred;
mod publish_hub;
mod replay_hub;
mod subject_core;
mod subject_subscription;
mod subscribers;

pub mod replay_policy;

pub use behavior_hub::BehaviorHub;
pub use deferred::DeferredSubscription;
pub use publish_hub::PublishHub;
pub use replay_hub::ReplayHub;
pub use replay_policy::{History, LastValue, NoReplay, ReplayPolicy};
pub use subject_core::Subject;
pub use subject_subscription::HubSubscription;
