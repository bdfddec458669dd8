use futures::channel::mpsc::UnboundedSender;
use smallvec::SmallVec;
use tracing::debug;

use crate::observer::Observer;

/// Producer end of one subscriber's delivery channel.
pub(crate) type Delivery<Item, Err> = UnboundedSender<Result<Item, Err>>;

/// Observer registry of a hub.
///
/// Maps a subscriber id to the producer end of that subscriber's channel. Ids
/// come from a per-registry counter and are never reused, so a stale id held
/// by a cancelled subscription can never remove somebody else.
///
/// # Design Rationale
///
/// - **SmallVec**: most hubs have one or two consumers, which then need no
///   heap allocation for the registry.
/// - **Clone Optimization**: when broadcasting, the last observer receives the
///   moved value instead of a clone.
/// - **Pruning**: a channel whose receiver is gone is removed after the
///   broadcast that discovered it, never in the middle of the iteration.
pub struct Subscribers<Item, Err> {
  next_id: usize,
  items: SmallVec<[(usize, Delivery<Item, Err>); 2]>,
}

impl<Item, Err> Default for Subscribers<Item, Err> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<Item, Err> Subscribers<Item, Err> {
  /// Add an observer and return its unique ID.
  #[inline]
  pub fn add(&mut self, observer: Delivery<Item, Err>) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.items.push((id, observer));
    id
  }

  /// Remove an observer by ID.
  pub fn remove(&mut self, id: usize) -> Option<Delivery<Item, Err>> {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos).1)
  }

  /// Check if an ID exists.
  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.items.iter().any(|(i, _)| *i == id) }

  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Broadcast a value to all observers, in registration order.
  ///
  /// n observers cost n-1 clones and one move. Observers whose receiver has
  /// been dropped are pruned afterwards.
  pub(crate) fn broadcast_value(&mut self, value: Item)
  where
    Item: Clone,
  {
    let mut expired = SmallVec::<[usize; 2]>::new();
    {
      let mut iter = self.items.iter_mut().peekable();
      while let Some((id, observer)) = iter.next() {
        if iter.peek().is_some() {
          observer.next(value.clone());
          if Observer::<Item, Err>::is_closed(&*observer) {
            expired.push(*id);
          }
        } else {
          observer.next(value);
          if Observer::<Item, Err>::is_closed(&*observer) {
            expired.push(*id);
          }
          break;
        }
      }
    }

    for id in expired {
      debug!(id, "pruning observer whose receiver is gone");
      self.remove(id);
    }
  }

  /// Broadcast an error to all observers and clear the registry.
  ///
  /// # Post-condition
  ///
  /// After calling this method, the registry is empty.
  pub(crate) fn broadcast_error(&mut self, err: Err)
  where
    Err: Clone,
  {
    let mut iter = self.items.drain(..).peekable();
    while let Some((_, observer)) = iter.next() {
      if iter.peek().is_some() {
        observer.error(err.clone());
      } else {
        observer.error(err);
        break;
      }
    }
  }

  /// Complete all observers and clear the registry.
  ///
  /// # Post-condition
  ///
  /// After calling this method, the registry is empty.
  pub(crate) fn broadcast_complete(&mut self) {
    for (_, observer) in self.items.drain(..) {
      Observer::<Item, Err>::complete(observer);
    }
  }
}

#[cfg(test)]
mod tests {
  use futures::{channel::mpsc, executor::block_on_stream};

  use super::*;

  #[rxhub_macro::test]
  fn ids_are_never_reused() {
    let mut subs = Subscribers::<i32, ()>::default();
    let (tx1, _rx1) = mpsc::unbounded();
    let (tx2, _rx2) = mpsc::unbounded();
    let id1 = subs.add(tx1);
    assert!(subs.remove(id1).is_some());
    let id2 = subs.add(tx2);
    assert_ne!(id1, id2);
    assert!(!subs.contains(id1));
    assert!(subs.contains(id2));
    assert!(subs.remove(id1).is_none());
  }

  #[rxhub_macro::test]
  fn broadcast_reaches_everyone_in_order() {
    let mut subs = Subscribers::<i32, ()>::default();
    let (tx1, rx1) = mpsc::unbounded();
    let (tx2, rx2) = mpsc::unbounded();
    subs.add(tx1);
    subs.add(tx2);

    subs.broadcast_value(1);
    subs.broadcast_value(2);
    subs.broadcast_complete();
    assert!(subs.is_empty());

    assert_eq!(block_on_stream(rx1).collect::<Vec<_>>(), vec![Ok(1), Ok(2)]);
    assert_eq!(block_on_stream(rx2).collect::<Vec<_>>(), vec![Ok(1), Ok(2)]);
  }

  #[rxhub_macro::test]
  fn broadcast_prunes_dropped_receivers() {
    let mut subs = Subscribers::<i32, ()>::default();
    let (tx1, rx1) = mpsc::unbounded();
    let (tx2, rx2) = mpsc::unbounded();
    let (tx3, rx3) = mpsc::unbounded();
    subs.add(tx1);
    let gone = subs.add(tx2);
    subs.add(tx3);
    drop(rx2);

    subs.broadcast_value(5);
    assert_eq!(subs.len(), 2);
    assert!(!subs.contains(gone));

    subs.broadcast_complete();
    assert_eq!(block_on_stream(rx1).collect::<Vec<_>>(), vec![Ok(5)]);
    assert_eq!(block_on_stream(rx3).collect::<Vec<_>>(), vec![Ok(5)]);
  }

  #[rxhub_macro::test]
  fn broadcast_error_clears() {
    let mut subs = Subscribers::<i32, &str>::default();
    let (tx1, rx1) = mpsc::unbounded();
    let (tx2, rx2) = mpsc::unbounded();
    subs.add(tx1);
    subs.add(tx2);

    subs.broadcast_error("boom");
    assert!(subs.is_empty());
    assert_eq!(block_on_stream(rx1).collect::<Vec<_>>(), vec![Err("boom")]);
    assert_eq!(block_on_stream(rx2).collect::<Vec<_>>(), vec![Err("boom")]);
  }
}
