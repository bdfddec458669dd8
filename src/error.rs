//! Error types for consumer-side polling.
//!
//! Hubs themselves never fail: a producer error travels to consumers as the
//! last item of their sequence. The only errors here describe why a
//! non-blocking pull came back empty-handed.

use thiserror::Error;

/// Why [`HubSubscription::try_recv`](crate::subject::HubSubscription::try_recv)
/// returned nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TryRecvError {
  /// Nothing buffered yet, the sequence is still live.
  #[error("no item buffered yet")]
  Empty,

  /// The sequence has ended and will never yield again.
  #[error("sequence closed")]
  Closed,
}
