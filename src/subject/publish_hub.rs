use std::convert::Infallible;

use super::{replay_policy::NoReplay, subject_core::Subject};

/// A hub without memory: subscribers only see what is emitted after they
/// join.
///
/// ```rust
/// use futures::executor::block_on_stream;
/// use rxhub::prelude::*;
///
/// let hub = PublishHub::<i32>::new();
/// hub.emit(3);
/// let sub = hub.subscribe();
/// hub.emit(4);
/// hub.emit(5);
/// hub.complete_successfully();
///
/// assert_eq!(block_on_stream(sub).collect::<Vec<_>>(), vec![Ok(4), Ok(5)]);
/// ```
pub type PublishHub<Item, Err = Infallible> = Subject<Item, Err, NoReplay>;

impl<Item, Err> Subject<Item, Err, NoReplay>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  #[inline]
  pub fn new() -> Self { Self::with_policy(NoReplay) }
}

impl<Item, Err> Default for Subject<Item, Err, NoReplay>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn default() -> Self { Self::new() }
}
