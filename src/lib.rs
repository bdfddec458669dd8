//! # rxhub: thread-safe multicast hubs
//!
//! A hub accepts values from any number of producer threads and fans each one
//! out to every consumer subscribed at that moment. Consumers read through
//! their own [`HubSubscription`], a `futures::Stream` of `Result<Item, Err>`,
//! at their own pace.
//!
//! ## Quick Start
//!
//! ```rust
//! use futures::executor::block_on_stream;
//! use rxhub::prelude::*;
//!
//! let hub = ReplayHub::<&str, String>::new(2);
//! hub.emit("a");
//! hub.emit("b");
//! hub.emit("c");
//!
//! let sub = hub.subscribe();
//! hub.complete_with_failure("disconnected".into());
//!
//! let items: Vec<_> = block_on_stream(sub).collect();
//! assert_eq!(items, vec![Ok("b"), Ok("c"), Err("disconnected".to_string())]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PublishHub`] | Subscribers see only what is emitted after they join |
//! | [`BehaviorHub`] | Subscribers first see the current value |
//! | [`ReplayHub`] | Subscribers first see up to the last `k` values |
//! | [`HubSubscription`] | One consumer's stream; drop it to unsubscribe |
//! | [`Observer`] | Producer-facing `next` / `error` / `complete` |
//!
//! ## Feature Flags
//!
//! - **`blocking`** (default): [`HubSubscription::into_blocking_iter`] for
//!   consumers on plain threads.
//!
//! ## Logging
//!
//! Lifecycle events are reported through [`tracing`](https://docs.rs/tracing):
//! completion at `debug`, registration and per-emission details at `trace`.

pub mod error;
pub mod event;
pub mod observer;
pub mod prelude;
pub mod status;
pub mod subject;
pub mod subscription;

// Re-export the prelude module
pub use prelude::*;
