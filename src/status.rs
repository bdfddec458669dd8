//! Termination state of a hub.
//!
//! A hub starts [`TerminalStatus::Open`] and moves to
//! [`TerminalStatus::Completed`] exactly once. There is no way back.

/// How a hub ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<Err> {
  /// The producer finished normally.
  Success,
  /// The producer failed. The error is handed to every observer untouched.
  Failure(Err),
}

impl<Err> Outcome<Err> {
  #[inline]
  pub fn is_success(&self) -> bool { matches!(self, Outcome::Success) }

  #[inline]
  pub fn is_failure(&self) -> bool { matches!(self, Outcome::Failure(_)) }

  /// Converts into the `Result` a consumer sees as its last item, if any.
  ///
  /// `Success` is represented by the end of the sequence alone, so it maps
  /// to `None`.
  #[inline]
  pub fn into_err(self) -> Option<Err> {
    match self {
      Outcome::Success => None,
      Outcome::Failure(err) => Some(err),
    }
  }
}

/// Whether a hub is still accepting events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalStatus<Err> {
  Open,
  Completed(Outcome<Err>),
}

impl<Err> Default for TerminalStatus<Err> {
  fn default() -> Self { TerminalStatus::Open }
}

impl<Err> TerminalStatus<Err> {
  #[inline]
  pub fn is_open(&self) -> bool { matches!(self, TerminalStatus::Open) }

  #[inline]
  pub fn is_completed(&self) -> bool { !self.is_open() }

  /// The terminal outcome, once there is one.
  #[inline]
  pub fn outcome(&self) -> Option<&Outcome<Err>> {
    match self {
      TerminalStatus::Open => None,
      TerminalStatus::Completed(outcome) => Some(outcome),
    }
  }

  /// Moves to `Completed(outcome)`.
  ///
  /// Returns `false` and leaves the status untouched if it was already
  /// completed.
  pub(crate) fn finish(&mut self, outcome: Outcome<Err>) -> bool {
    if self.is_completed() {
      return false;
    }
    *self = TerminalStatus::Completed(outcome);
    true
  }
}
