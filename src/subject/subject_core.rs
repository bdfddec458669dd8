use std::{
  fmt,
  future::Future,
  sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use futures::{channel::mpsc, future::Pending};
use tracing::{debug, trace};

use super::{
  deferred::DeferredSubscription, replay_policy::ReplayPolicy,
  subject_subscription::HubSubscription, subscribers::Subscribers,
};
use crate::{
  event::HubEvent,
  observer::Observer,
  status::{Outcome, TerminalStatus},
};

// ============================================================================
// Shared State
// ============================================================================

/// Everything a hub mutates, guarded by one lock.
///
/// Status, backlog and registry change together or not at all. That is what
/// makes "snapshot the backlog, then register" atomic with respect to a
/// concurrent `emit` or `complete`.
struct HubState<Item, Err, P> {
  status: TerminalStatus<Err>,
  policy: P,
  subscribers: Subscribers<Item, Err>,
}

/// The shared core behind every handle of one hub.
pub(crate) struct SubjectCore<Item, Err, P> {
  state: Mutex<HubState<Item, Err, P>>,
}

impl<Item, Err, P> SubjectCore<Item, Err, P> {
  fn new(policy: P) -> Self {
    Self {
      state: Mutex::new(HubState {
        status: TerminalStatus::Open,
        policy,
        subscribers: Subscribers::default(),
      }),
    }
  }

  // A panicking `Clone` impl must not take the whole hub down with it.
  #[inline]
  fn lock(&self) -> MutexGuard<'_, HubState<Item, Err, P>> {
    self
      .state
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
  }
}

/// Type-erased registry access, so subscriptions do not carry the policy type.
pub(crate) trait Registry: Send + Sync {
  fn deregister(&self, id: usize);

  fn is_registered(&self, id: usize) -> bool;
}

impl<Item: Send, Err: Send, P: Send> Registry for SubjectCore<Item, Err, P> {
  fn deregister(&self, id: usize) {
    if self.lock().subscribers.remove(id).is_some() {
      trace!(id, "observer deregistered");
    }
  }

  fn is_registered(&self, id: usize) -> bool { self.lock().subscribers.contains(id) }
}

// ============================================================================
// Subject
// ============================================================================

/// Subject: a hot, thread-safe hub that multicasts values to many consumers.
///
/// A `Subject` is a cheap handle to shared state: clone it to hand the same
/// hub to producers and consumers on other threads. Every consumer gets its
/// own unbounded channel, so the producer never waits for a slow consumer and
/// each consumer reads at its own pace.
///
/// # Architecture
///
/// The hub is one generic core parameterized by a [`ReplayPolicy`] `P` that
/// decides what a new subscriber sees first:
///
/// - [`PublishHub`](super::PublishHub): nothing.
/// - [`BehaviorHub`](super::BehaviorHub): the current value.
/// - [`ReplayHub`](super::ReplayHub): the last `k` values.
///
/// # Guarantees
///
/// - Each consumer sees values in emission order, followed by the terminal
///   outcome.
/// - Subscribing snapshots the backlog and registers in one critical section
///   shared with [`emit`](Self::emit) and [`complete`](Self::complete): no
///   value is lost or duplicated at the join point.
/// - After completion nothing is delivered any more. Later `emit` and
///   `complete` calls are silently ignored, and late subscribers receive the
///   backlog followed immediately by the same terminal outcome.
///
/// # Example
///
/// ```rust
/// use futures::executor::block_on_stream;
/// use rxhub::prelude::*;
///
/// let hub = BehaviorHub::<i32, String>::new(3);
/// let early = hub.subscribe();
///
/// hub.emit(4);
/// hub.emit(5);
/// hub.complete_successfully();
/// hub.emit(6); // ignored
///
/// let early: Vec<_> = block_on_stream(early).collect();
/// assert_eq!(early, vec![Ok(3), Ok(4), Ok(5)]);
///
/// let late: Vec<_> = block_on_stream(hub.subscribe()).collect();
/// assert_eq!(late, vec![Ok(5)]);
/// ```
pub struct Subject<Item, Err, P> {
  core: Arc<SubjectCore<Item, Err, P>>,
}

impl<Item, Err, P> Clone for Subject<Item, Err, P> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<Item, Err, P> Subject<Item, Err, P>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
  P: ReplayPolicy<Item> + Send + 'static,
{
  /// Create an open hub with a custom backlog strategy.
  pub fn with_policy(policy: P) -> Self { Self { core: Arc::new(SubjectCore::new(policy)) } }

  /// Push `value` to every current subscriber.
  ///
  /// A no-op once the hub has completed.
  pub fn emit(&self, value: Item) {
    let mut state = self.core.lock();
    let HubState { status, policy, subscribers } = &mut *state;
    if status.is_completed() {
      trace!("emit after completion ignored");
      return;
    }
    policy.record(&value);
    trace!(observers = subscribers.len(), "emit");
    subscribers.broadcast_value(value);
  }

  /// Terminate the hub with `outcome`, once.
  ///
  /// Every current subscriber receives the outcome and the registry is
  /// cleared. Calling this again has no effect.
  pub fn complete(&self, outcome: Outcome<Err>) {
    let mut state = self.core.lock();
    let HubState { status, subscribers, .. } = &mut *state;
    let observers = subscribers.len();
    if !status.finish(outcome) {
      trace!("complete after completion ignored");
      return;
    }
    match status.outcome() {
      Some(Outcome::Failure(err)) => {
        debug!(observers, outcome = "failure", "hub completed");
        subscribers.broadcast_error(err.clone());
      }
      _ => {
        debug!(observers, outcome = "success", "hub completed");
        subscribers.broadcast_complete();
      }
    }
  }

  #[inline]
  pub fn complete_successfully(&self) { self.complete(Outcome::Success) }

  #[inline]
  pub fn complete_with_failure(&self, err: Err) { self.complete(Outcome::Failure(err)) }

  /// Apply one producer event.
  pub fn on(&self, event: HubEvent<Item, Err>) {
    match event {
      HubEvent::Next(value) => self.emit(value),
      HubEvent::Completed => self.complete_successfully(),
      HubEvent::Error(err) => self.complete_with_failure(err),
    }
  }

  /// Start a new consumer sequence.
  ///
  /// The sequence first yields the backlog. If the hub is still open it is
  /// registered and then yields every later value and the terminal outcome;
  /// if the hub has already completed it yields the terminal outcome right
  /// after the backlog and is never registered. A policy may withhold the
  /// backlog from a hub that failed, see
  /// [`ReplayPolicy::replays_after_failure`].
  pub fn subscribe(&self) -> HubSubscription<Item, Err> {
    let (mut tx, rx) = mpsc::unbounded::<Result<Item, Err>>();
    let mut state = self.core.lock();
    let HubState { status, policy, subscribers } = &mut *state;

    let failed = matches!(status, TerminalStatus::Completed(Outcome::Failure(_)));
    let mut replayed = 0usize;
    if !failed || policy.replays_after_failure() {
      for value in policy.snapshot() {
        tx.next(value);
        replayed += 1;
      }
    }

    match status {
      TerminalStatus::Open => {
        let id = subscribers.add(tx);
        trace!(id, replayed, "observer registered");
        let core = Arc::downgrade(&self.core);
        let registry: Weak<dyn Registry> = core;
        HubSubscription::registered(rx, id, registry)
      }
      TerminalStatus::Completed(outcome) => {
        trace!(replayed, "subscribed after completion");
        if let Outcome::Failure(err) = outcome {
          tx.error(err.clone());
        }
        HubSubscription::detached(rx)
      }
    }
  }

  /// A sequence that subscribes on its first pull and ends as soon as
  /// `cancel` resolves.
  ///
  /// If `cancel` has already resolved by the first pull, the sequence ends
  /// without ever registering.
  pub fn subscribe_until<F: Future>(&self, cancel: F) -> DeferredSubscription<Item, Err, P, F> {
    DeferredSubscription::new(self.clone(), cancel)
  }

  /// A sequence that subscribes on its first pull.
  pub fn subscribe_deferred(&self) -> DeferredSubscription<Item, Err, P, Pending<()>> {
    self.subscribe_until(futures::future::pending())
  }

  /// Number of registered subscribers.
  pub fn subscriber_count(&self) -> usize { self.core.lock().subscribers.len() }

  /// Check if there are no registered subscribers.
  pub fn is_empty(&self) -> bool { self.core.lock().subscribers.is_empty() }

  pub fn is_completed(&self) -> bool { self.core.lock().status.is_completed() }

  /// A copy of the current status.
  pub fn terminal_status(&self) -> TerminalStatus<Err> { self.core.lock().status.clone() }

  /// The backlog a subscriber joining right now would receive first.
  pub fn replay_snapshot(&self) -> Vec<Item> { self.core.lock().policy.snapshot().collect() }

  pub(crate) fn read_policy<R>(&self, f: impl FnOnce(&P) -> R) -> R { f(&self.core.lock().policy) }
}

impl<Item, Err, P> fmt::Debug for Subject<Item, Err, P> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.core.lock();
    f.debug_struct("Subject")
      .field("subscribers", &state.subscribers.len())
      .field("completed", &state.status.is_completed())
      .finish()
  }
}

// ============================================================================
// Observer Implementation
// ============================================================================

/// A hub is itself an observer, so it can sit at the end of any producer.
impl<Item, Err, P> Observer<Item, Err> for Subject<Item, Err, P>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
  P: ReplayPolicy<Item> + Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.emit(value) }

  #[inline]
  fn error(self, err: Err) { self.complete_with_failure(err) }

  #[inline]
  fn complete(self) { self.complete_successfully() }

  #[inline]
  fn is_closed(&self) -> bool { self.is_completed() }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
  use std::{sync::Arc, thread};

  use futures::{executor::block_on_stream, StreamExt};

  use crate::prelude::*;

  fn drain<Item, Err>(sub: HubSubscription<Item, Err>) -> Vec<Result<Item, Err>> {
    block_on_stream(sub).collect()
  }

  #[rxhub_macro::test]
  fn subscriber_sees_values_in_order() {
    let hub = PublishHub::<i32, ()>::new();
    let sub = hub.subscribe();
    for v in 1..=5 {
      hub.emit(v);
    }
    hub.complete_successfully();
    assert_eq!(drain(sub), vec![Ok(1), Ok(2), Ok(3), Ok(4), Ok(5)]);
  }

  #[rxhub_macro::test]
  fn multiple_subscribers() {
    let hub = PublishHub::<i32, ()>::new();
    let first = hub.subscribe();
    hub.emit(1);
    let second = hub.subscribe();
    hub.emit(2);
    hub.complete_successfully();

    assert_eq!(drain(first), vec![Ok(1), Ok(2)]);
    assert_eq!(drain(second), vec![Ok(2)]);
  }

  #[rxhub_macro::test]
  fn completion_clears_registry() {
    let hub = PublishHub::<i32, ()>::new();
    let _a = hub.subscribe();
    let _b = hub.subscribe();
    assert_eq!(hub.subscriber_count(), 2);

    hub.complete_successfully();
    assert!(hub.is_empty());
    assert!(hub.is_completed());
    assert_eq!(hub.terminal_status(), TerminalStatus::Completed(Outcome::Success));
  }

  #[rxhub_macro::test]
  fn failure_is_delivered_to_everyone() {
    let hub = PublishHub::<i32, &str>::new();
    let a = hub.subscribe();
    let b = hub.subscribe();
    hub.emit(1);
    hub.complete_with_failure("boom");

    assert_eq!(drain(a), vec![Ok(1), Err("boom")]);
    assert_eq!(drain(b), vec![Ok(1), Err("boom")]);
    assert_eq!(drain(hub.subscribe()), vec![Err("boom")]);
  }

  #[rxhub_macro::test]
  fn second_complete_has_no_effect() {
    let hub = PublishHub::<i32, &str>::new();
    let sub = hub.subscribe();
    hub.complete_successfully();
    hub.complete_with_failure("late");
    hub.emit(9);

    assert!(drain(sub).is_empty());
    assert!(drain(hub.subscribe()).is_empty());
    assert_eq!(hub.terminal_status(), TerminalStatus::Completed(Outcome::Success));
  }

  #[rxhub_macro::test]
  fn dropping_a_subscription_deregisters() {
    let hub = PublishHub::<i32, ()>::new();
    let keep = hub.subscribe();
    let gone = hub.subscribe();
    assert_eq!(hub.subscriber_count(), 2);

    drop(gone);
    assert_eq!(hub.subscriber_count(), 1);

    hub.emit(1);
    hub.complete_successfully();
    assert_eq!(drain(keep), vec![Ok(1)]);
  }

  #[rxhub_macro::test]
  fn unsubscribe_after_completion_is_a_no_op() {
    let hub = PublishHub::<i32, ()>::new();
    let sub = hub.subscribe();
    hub.complete_successfully();
    sub.unsubscribe();
    assert!(hub.is_empty());
  }

  #[rxhub_macro::test]
  fn unsubscribe_racing_completion_leaves_registry_empty() {
    for round in 0..200 {
      let hub = PublishHub::<usize, ()>::new();
      let subs: Vec<_> = (0..8).map(|_| hub.subscribe()).collect();
      hub.emit(round);

      let cancellers: Vec<_> = subs
        .into_iter()
        .enumerate()
        .map(|(i, sub)| {
          thread::spawn(move || {
            if i % 2 == 0 {
              sub.unsubscribe();
            } else {
              drop(sub);
            }
          })
        })
        .collect();
      let completer = {
        let hub = hub.clone();
        thread::spawn(move || hub.complete_successfully())
      };

      for canceller in cancellers {
        canceller.join().unwrap();
      }
      completer.join().unwrap();
      assert!(hub.is_empty());
      assert!(hub.is_completed());
    }
  }

  #[rxhub_macro::test]
  fn on_dispatches_events() {
    let hub = ReplayHub::<i32, &str>::new(8);
    hub.on(HubEvent::Next(1));
    hub.on(HubEvent::Next(2));
    hub.on(HubEvent::Error("boom"));
    hub.on(HubEvent::Next(3));

    assert_eq!(drain(hub.subscribe()), vec![Ok(1), Ok(2), Err("boom")]);
  }

  #[rxhub_macro::test]
  fn hub_as_observer() {
    fn produce<O: Observer<i32, ()>>(mut observer: O) {
      observer.next(1);
      observer.next(2);
      observer.complete();
    }

    let hub = PublishHub::<i32, ()>::new();
    let sub = hub.subscribe();
    produce(hub.clone());
    assert!(Observer::is_closed(&hub));
    assert_eq!(drain(sub), vec![Ok(1), Ok(2)]);
  }

  #[rxhub_macro::test]
  fn dropping_every_hub_handle_ends_subscriptions() {
    let hub = PublishHub::<i32, ()>::new();
    let sub = hub.subscribe();
    hub.emit(1);
    drop(hub);
    assert_eq!(drain(sub), vec![Ok(1)]);
  }

  #[rxhub_macro::test]
  fn replay_snapshot_reflects_policy() {
    let hub = ReplayHub::<i32, ()>::new(2);
    hub.emit(1);
    hub.emit(2);
    hub.emit(3);
    assert_eq!(hub.replay_snapshot(), vec![2, 3]);
  }

  #[rxhub_macro::test]
  fn debug_output() {
    let hub = PublishHub::<i32, ()>::new();
    let _sub = hub.subscribe();
    assert_eq!(format!("{hub:?}"), "Subject { subscribers: 1, completed: false }");
  }

  #[rxhub_macro::test]
  fn producer_and_consumers_on_threads() {
    let hub = PublishHub::<usize, ()>::new();
    let consumers: Vec<_> = (0..4)
      .map(|_| {
        let sub = hub.subscribe();
        thread::spawn(move || drain(sub))
      })
      .collect();

    let producer = {
      let hub = hub.clone();
      thread::spawn(move || {
        for v in 0..1000 {
          hub.emit(v);
        }
        hub.complete_successfully();
      })
    };
    producer.join().unwrap();

    let expected: Vec<Result<usize, ()>> = (0..1000).map(Ok).collect();
    for consumer in consumers {
      assert_eq!(consumer.join().unwrap(), expected);
    }
  }

  #[rxhub_macro::test]
  fn concurrent_subscribe_never_gaps_or_duplicates() {
    // A subscriber joining mid-stream must see a contiguous run of values
    // ending at the last emission.
    let hub = ReplayHub::<usize, ()>::new(1);
    let hub_for_producer = hub.clone();
    let producer = thread::spawn(move || {
      for v in 0..2000 {
        hub_for_producer.emit(v);
      }
      hub_for_producer.complete_successfully();
    });

    let joiners: Vec<_> = (0..8)
      .map(|_| {
        let hub = hub.clone();
        thread::spawn(move || drain(hub.subscribe()))
      })
      .collect();

    producer.join().unwrap();
    for joiner in joiners {
      let seen: Vec<usize> = joiner
        .join()
        .unwrap()
        .into_iter()
        .map(|item| item.unwrap())
        .collect();
      if let Some(first) = seen.first().copied() {
        let expected: Vec<usize> = (first..2000).collect();
        assert_eq!(seen, expected);
      }
    }
  }

  #[rxhub_macro::test(shared)]
  async fn async_consumers_on_a_multi_thread_runtime() {
    let hub = Arc::new(BehaviorHub::<u32, String>::new(0));
    let mut tasks = vec![];
    for _ in 0..3 {
      let mut sub = hub.subscribe();
      tasks.push(tokio::spawn(async move {
        let mut seen = vec![];
        while let Some(item) = sub.next().await {
          seen.push(item);
        }
        seen
      }));
    }

    for v in 1..=3 {
      hub.emit(v);
    }
    hub.complete_with_failure("done".to_string());

    for task in tasks {
      assert_eq!(
        task.await.unwrap(),
        vec![Ok(0), Ok(1), Ok(2), Ok(3), Err("done".to_string())]
      );
    }
  }
}
