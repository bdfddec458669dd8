//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Core traits
pub use crate::observer::Observer;
pub use crate::subscription::Subscription;
// Hubs and their consumer sequences
pub use crate::subject::{
  BehaviorHub, DeferredSubscription, HubSubscription, PublishHub, ReplayHub, Subject,
};
// Termination
pub use crate::{
  error::TryRecvError,
  event::HubEvent,
  status::{Outcome, TerminalStatus},
};
