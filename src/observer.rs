//! Observer trait and implementations
//!
//! The Observer trait is the producer-facing side of a hub. It provides three
//! methods: next (for values), error (for errors), and complete (for
//! completion). Hubs implement it, and so does the delivery channel each hub
//! keeps per subscriber.

use futures::channel::mpsc::UnboundedSender;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: the receiving end of a producer.
///
/// An Observer receives values, errors, and completion notifications.
pub trait Observer<Item, Err> {
  /// Receive the next value.
  fn next(&mut self, value: Item);

  /// Handle an error.
  ///
  /// This consumes the observer, as no more values can be delivered after an
  /// error.
  fn error(self, err: Err);

  /// Handle completion.
  ///
  /// This consumes the observer, as no more values can be delivered after
  /// completion.
  fn complete(self);

  /// Checks if the observer is closed.
  ///
  /// Returns `true` if the observer will not accept more values, e.g. because
  /// the consumer on the other side has gone away.
  fn is_closed(&self) -> bool;
}

// ============================================================================
// Channel Observer
// ============================================================================

/// The per-subscriber delivery channel.
///
/// Sends never block: the channel is unbounded, and a send to a receiver that
/// is gone is dropped and reported through `is_closed`.
impl<Item, Err> Observer<Item, Err> for UnboundedSender<Result<Item, Err>> {
  #[inline]
  fn next(&mut self, value: Item) { let _ = self.unbounded_send(Ok(value)); }

  #[inline]
  fn error(self, err: Err) {
    // Dropping `self` right after closes the sequence.
    let _ = self.unbounded_send(Err(err));
  }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { UnboundedSender::is_closed(self) }
}
