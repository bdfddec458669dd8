//! Consumer-side cancellation.

/// A handle to a consumer's registration with a hub.
///
/// Cancelling is idempotent and may race freely with the hub completing:
/// whichever happens first removes the registry entry and the other is a
/// no-op.
pub trait Subscription {
  /// Stop receiving values and remove this consumer from its hub.
  ///
  /// Items already buffered are discarded along with the handle.
  fn unsubscribe(self);

  /// Whether the hub will deliver nothing more to this consumer.
  ///
  /// True once the subscription was cancelled, the hub completed, or every
  /// hub handle was dropped.
  fn is_closed(&self) -> bool;
}
