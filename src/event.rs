//! A single producer-side notification.

use crate::status::Outcome;

/// One event a producer can push into a hub.
///
/// Mirrors the three `Observer` methods as data, so events can be queued,
/// forwarded or replayed before being applied with
/// [`Subject::on`](crate::subject::Subject::on).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HubEvent<Item, Err> {
  /// A value.
  Next(Item),
  /// Normal completion.
  Completed,
  /// Completion with an error.
  Error(Err),
}

impl<Item, Err> HubEvent<Item, Err> {
  /// `true` for `Completed` and `Error`.
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, HubEvent::Next(_)) }
}

impl<Item, Err> From<Outcome<Err>> for HubEvent<Item, Err> {
  fn from(outcome: Outcome<Err>) -> Self {
    match outcome {
      Outcome::Success => HubEvent::Completed,
      Outcome::Failure(err) => HubEvent::Error(err),
    }
  }
}

impl<Item, Err> From<Result<Item, Err>> for HubEvent<Item, Err> {
  fn from(item: Result<Item, Err>) -> Self {
    match item {
      Ok(value) => HubEvent::Next(value),
      Err(err) => HubEvent::Error(err),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxhub_macro::test]
  fn terminal_events() {
    assert!(!HubEvent::<i32, ()>::Next(1).is_terminal());
    assert!(HubEvent::<i32, ()>::Completed.is_terminal());
    assert!(HubEvent::<i32, ()>::Error(()).is_terminal());
  }

  #[rxhub_macro::test]
  fn from_outcome_and_result() {
    assert_eq!(HubEvent::<i32, &str>::from(Outcome::Success), HubEvent::Completed);
    assert_eq!(HubEvent::<i32, &str>::from(Outcome::Failure("x")), HubEvent::Error("x"));
    assert_eq!(HubEvent::<i32, &str>::from(Ok(3)), HubEvent::Next(3));
  }
}
