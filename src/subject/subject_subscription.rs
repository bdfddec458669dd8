use std::{
  fmt,
  pin::Pin,
  sync::Weak,
  task::{Context, Poll},
};

use futures::{
  channel::mpsc::UnboundedReceiver,
  stream::{FusedStream, Stream, StreamExt},
  task::noop_waker_ref,
};
use tracing::trace;

use super::subject_core::Registry;
use crate::{error::TryRecvError, subscription::Subscription};

/// Where a live subscription is registered.
struct Registration {
  id: usize,
  hub: Weak<dyn Registry>,
}

impl Registration {
  fn cancel(self) {
    // The hub may already be gone, or may have cleared its registry on
    // completion. Both leave nothing to do.
    if let Some(hub) = self.hub.upgrade() {
      hub.deregister(self.id);
    }
  }
}

/// One consumer's view of a hub.
///
/// This struct is created by [`Subject::subscribe`](super::Subject::subscribe).
/// It implements `futures::Stream`, yielding items of type `Result<Item,
/// Err>`:
///
/// - `Ok(Item)`: the backlog first, then each value emitted after joining.
/// - `Err(Err)`: emitted once when the hub completes with a failure.
/// - `None`: end of stream, after success or after the error.
///
/// Items are buffered in a private unbounded channel, so the consumer pulls at
/// its own pace without ever slowing the producer down.
///
/// # Cancellation
///
/// Dropping the subscription, or calling
/// [`unsubscribe`](Subscription::unsubscribe), removes it from the hub. This
/// may race with the hub completing; either way the entry ends up gone.
pub struct HubSubscription<Item, Err> {
  receiver: UnboundedReceiver<Result<Item, Err>>,
  registration: Option<Registration>,
}

impl<Item, Err> HubSubscription<Item, Err> {
  pub(crate) fn registered(
    receiver: UnboundedReceiver<Result<Item, Err>>, id: usize, hub: Weak<dyn Registry>,
  ) -> Self {
    Self { receiver, registration: Some(Registration { id, hub }) }
  }

  /// A subscription that was never added to a registry, because its hub had
  /// already completed.
  pub(crate) fn detached(receiver: UnboundedReceiver<Result<Item, Err>>) -> Self {
    Self { receiver, registration: None }
  }

  /// Registry id, while registered.
  pub fn id(&self) -> Option<usize> { self.registration.as_ref().map(|r| r.id) }

  /// Pull the next item without waiting.
  ///
  /// Returns [`TryRecvError::Empty`] when nothing is buffered yet and
  /// [`TryRecvError::Closed`] once the sequence has ended.
  pub fn try_recv(&mut self) -> Result<Result<Item, Err>, TryRecvError> {
    let mut cx = Context::from_waker(noop_waker_ref());
    match self.poll_next_unpin(&mut cx) {
      Poll::Ready(Some(item)) => Ok(item),
      Poll::Ready(None) => Err(TryRecvError::Closed),
      Poll::Pending => Err(TryRecvError::Empty),
    }
  }

  /// Turn into a blocking iterator, for consumers running on plain threads.
  ///
  /// ```rust
  /// use std::thread;
  ///
  /// use rxhub::prelude::*;
  ///
  /// let hub = PublishHub::<i32, ()>::new();
  /// let values = hub.subscribe().into_blocking_iter();
  /// let consumer = thread::spawn(move || values.collect::<Vec<_>>());
  ///
  /// hub.emit(1);
  /// hub.emit(2);
  /// hub.complete_successfully();
  /// assert_eq!(consumer.join().unwrap(), vec![Ok(1), Ok(2)]);
  /// ```
  #[cfg(feature = "blocking")]
  pub fn into_blocking_iter(self) -> futures::executor::BlockingStream<Self> {
    futures::executor::block_on_stream(self)
  }
}

impl<Item, Err> Stream for HubSubscription<Item, Err> {
  type Item = Result<Item, Err>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let this = self.get_mut();
    let polled = this.receiver.poll_next_unpin(cx);
    if let Poll::Ready(None) = polled {
      // The hub dropped our channel, so there is no entry left to remove.
      this.registration = None;
    }
    polled
  }

  fn size_hint(&self) -> (usize, Option<usize>) { self.receiver.size_hint() }
}

impl<Item, Err> FusedStream for HubSubscription<Item, Err> {
  fn is_terminated(&self) -> bool { self.receiver.is_terminated() }
}

impl<Item, Err> Subscription for HubSubscription<Item, Err> {
  fn unsubscribe(mut self) {
    if let Some(registration) = self.registration.take() {
      trace!(id = registration.id, "unsubscribe");
      registration.cancel();
    }
  }

  fn is_closed(&self) -> bool {
    match &self.registration {
      None => true,
      Some(Registration { id, hub }) => hub
        .upgrade()
        .map_or(true, |hub| !hub.is_registered(*id)),
    }
  }
}

impl<Item, Err> Drop for HubSubscription<Item, Err> {
  fn drop(&mut self) {
    if let Some(registration) = self.registration.take() {
      registration.cancel();
    }
  }
}

impl<Item, Err> fmt::Debug for HubSubscription<Item, Err> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("HubSubscription")
      .field("id", &self.id())
      .field("terminated", &self.receiver.is_terminated())
      .finish()
  }
}
