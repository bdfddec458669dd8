//! What a new subscriber sees first.
//!
//! A hub records every emitted value in its policy and, when somebody
//! subscribes, hands them the policy's snapshot before any live value. Both
//! calls happen inside the hub's critical section.

use std::collections::VecDeque;

/// Backlog strategy of a hub.
pub trait ReplayPolicy<Item> {
  /// Remember `value`, which is about to be broadcast.
  fn record(&mut self, value: &Item);

  /// The backlog for a new subscriber, oldest first.
  fn snapshot(&self) -> impl Iterator<Item = Item>;

  /// Whether a subscriber joining a hub that already failed still gets the
  /// backlog before the error.
  #[inline]
  fn replays_after_failure(&self) -> bool { true }
}

/// Replays nothing. Used by [`PublishHub`](super::PublishHub).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoReplay;

impl<Item> ReplayPolicy<Item> for NoReplay {
  #[inline]
  fn record(&mut self, _value: &Item) {}

  #[inline]
  fn snapshot(&self) -> impl Iterator<Item = Item> { std::iter::empty() }
}

/// Replays the current value. Used by [`BehaviorHub`](super::BehaviorHub).
///
/// There is always a current value: the seed until the first emission.
/// Once the hub has failed, the value is stale and late subscribers only
/// receive the error.
#[derive(Clone, Debug)]
pub struct LastValue<Item> {
  current: Item,
}

impl<Item> LastValue<Item> {
  pub fn new(seed: Item) -> Self { Self { current: seed } }

  #[inline]
  pub fn current(&self) -> &Item { &self.current }
}

impl<Item: Clone> ReplayPolicy<Item> for LastValue<Item> {
  #[inline]
  fn record(&mut self, value: &Item) { self.current = value.clone(); }

  #[inline]
  fn snapshot(&self) -> impl Iterator<Item = Item> { std::iter::once(self.current.clone()) }

  #[inline]
  fn replays_after_failure(&self) -> bool { false }
}

/// Replays up to the last `capacity` values. Used by
/// [`ReplayHub`](super::ReplayHub).
///
/// When full, recording a value overwrites the oldest one.
#[derive(Clone, Debug)]
pub struct History<Item> {
  capacity: usize,
  buffer: VecDeque<Item>,
}

impl<Item> History<Item> {
  /// A capacity of 0 keeps nothing.
  pub fn new(capacity: usize) -> Self {
    // Large bounds grow on demand instead of reserving up front.
    Self { capacity, buffer: VecDeque::with_capacity(capacity.min(64)) }
  }

  #[inline]
  pub fn capacity(&self) -> usize { self.capacity }

  #[inline]
  pub fn len(&self) -> usize { self.buffer.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.buffer.is_empty() }
}

impl<Item: Clone> ReplayPolicy<Item> for History<Item> {
  fn record(&mut self, value: &Item) {
    if self.capacity == 0 {
      return;
    }
    if self.buffer.len() == self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value.clone());
  }

  #[inline]
  fn snapshot(&self) -> impl Iterator<Item = Item> { self.buffer.iter().cloned() }
}
