//! Lazily subscribing, cancellable consumer sequences.
//!
//! [`DeferredSubscription`] does not touch the hub until it is first polled.
//! On that first pull it checks its cancellation signal and only then runs
//! the hub's subscribe step, so a consumer that was cancelled before it ever
//! started never shows up in the registry.

use std::{
  fmt,
  future::Future,
  pin::Pin,
  task::{ready, Context, Poll},
};

use futures::stream::{FusedStream, Stream, StreamExt};
use pin_project_lite::pin_project;
use tracing::trace;

use super::{replay_policy::ReplayPolicy, subject_core::Subject, HubSubscription};
use crate::subscription::Subscription;

pin_project! {
  /// A consumer sequence that subscribes on its first pull and stops when
  /// `cancel` resolves.
  ///
  /// Created by [`Subject::subscribe_until`] and
  /// [`Subject::subscribe_deferred`]. Yields the same items as
  /// [`HubSubscription`].
  ///
  /// ```rust
  /// use futures::{channel::oneshot, executor::block_on_stream};
  /// use rxhub::prelude::*;
  ///
  /// let hub = PublishHub::<i32, ()>::new();
  /// let (stop, stopped) = oneshot::channel::<()>();
  /// let sub = hub.subscribe_until(stopped);
  ///
  /// stop.send(()).unwrap();
  /// hub.emit(1);
  ///
  /// // Cancelled before the first pull: nothing is ever registered.
  /// assert_eq!(block_on_stream(sub).count(), 0);
  /// assert!(hub.is_empty());
  /// ```
  pub struct DeferredSubscription<Item, Err, P, F> {
    #[pin]
    cancel: F,
    hub: Option<Subject<Item, Err, P>>,
    active: Option<HubSubscription<Item, Err>>,
    done: bool,
  }
}

impl<Item, Err, P, F> DeferredSubscription<Item, Err, P, F> {
  pub(crate) fn new(hub: Subject<Item, Err, P>, cancel: F) -> Self {
    Self { cancel, hub: Some(hub), active: None, done: false }
  }

  /// Whether a live inner subscription is held: true from the first pull
  /// until the sequence ends, even if the hub had already completed and the
  /// inner subscription was never registered.
  pub fn is_subscribed(&self) -> bool { self.active.is_some() }
}

impl<Item, Err, P, F> Stream for DeferredSubscription<Item, Err, P, F>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
  P: ReplayPolicy<Item> + Send + 'static,
  F: Future,
{
  type Item = Result<Item, Err>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let this = self.project();
    if *this.done {
      return Poll::Ready(None);
    }

    if this.cancel.poll(cx).is_ready() {
      *this.done = true;
      *this.hub = None;
      if let Some(active) = this.active.take() {
        trace!(id = ?active.id(), "deferred subscription cancelled");
        active.unsubscribe();
      }
      return Poll::Ready(None);
    }

    if let Some(hub) = this.hub.take() {
      *this.active = Some(hub.subscribe());
    }

    let item = match this.active.as_mut() {
      Some(active) => ready!(active.poll_next_unpin(cx)),
      None => None,
    };
    if item.is_none() {
      *this.done = true;
      *this.active = None;
    }
    Poll::Ready(item)
  }
}

impl<Item, Err, P, F> FusedStream for DeferredSubscription<Item, Err, P, F>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
  P: ReplayPolicy<Item> + Send + 'static,
  F: Future,
{
  fn is_terminated(&self) -> bool { self.done }
}

impl<Item, Err, P, F> fmt::Debug for DeferredSubscription<Item, Err, P, F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DeferredSubscription")
      .field("subscribed", &self.active.is_some())
      .field("done", &self.done)
      .finish()
  }
}
