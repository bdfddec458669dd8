use std::convert::Infallible;

use super::{replay_policy::LastValue, subject_core::Subject};

/// A hub that always has a current value.
///
/// It starts with a seed, and every emission replaces it. A new subscriber
/// receives the current value first, then whatever follows. After the hub
/// has completed successfully, a late subscriber still receives the current
/// value before the end of its stream. After a failure it receives only the
/// error.
///
/// ```rust
/// use futures::executor::block_on_stream;
/// use rxhub::prelude::*;
///
/// let hub = BehaviorHub::<i32>::new(3);
/// let sub = hub.subscribe();
/// hub.emit(4);
/// assert_eq!(hub.value(), 4);
/// hub.complete_successfully();
///
/// assert_eq!(block_on_stream(sub).collect::<Vec<_>>(), vec![Ok(3), Ok(4)]);
/// ```
pub type BehaviorHub<Item, Err = Infallible> = Subject<Item, Err, LastValue<Item>>;

impl<Item, Err> Subject<Item, Err, LastValue<Item>>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  #[inline]
  pub fn new(seed: Item) -> Self { Self::with_policy(LastValue::new(seed)) }

  /// The current value: the seed, or the latest accepted emission.
  pub fn value(&self) -> Item { self.read_policy(|policy| policy.current().clone()) }
}
