use std::convert::Infallible;

use super::{replay_policy::History, subject_core::Subject};

/// A hub that remembers its last `capacity` values and replays them, oldest
/// first, to every new subscriber.
///
/// ```rust
/// use futures::executor::block_on_stream;
/// use rxhub::prelude::*;
///
/// let hub = ReplayHub::<i32>::new(3);
/// for v in 1..=4 {
///   hub.emit(v);
/// }
/// hub.complete_successfully();
///
/// let late: Vec<_> = block_on_stream(hub.subscribe()).collect();
/// assert_eq!(late, vec![Ok(2), Ok(3), Ok(4)]);
/// ```
pub type ReplayHub<Item, Err = Infallible> = Subject<Item, Err, History<Item>>;

impl<Item, Err> Subject<Item, Err, History<Item>>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  /// A capacity of 0 makes this behave like a
  /// [`PublishHub`](super::PublishHub).
  #[inline]
  pub fn new(capacity: usize) -> Self { Self::with_policy(History::new(capacity)) }

  pub fn capacity(&self) -> usize { self.read_policy(History::capacity) }
}
