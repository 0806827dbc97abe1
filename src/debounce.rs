//! Debounced propagation of rapidly changing input.

use std::time::Duration;
use tokio::time::Instant;

/// Default settle time for search input.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(350);

/// Holds back a changing value until it has been stable for `delay`.
///
/// Every `set` restarts the wait, so only the value that was current when
/// the input went quiet is ever published. There is at most one pending
/// deadline per gate. The gate is polled from the owner's tick and uses the
/// tokio clock, so paused-time tests can drive it with `tokio::time::advance`.
#[derive(Debug, Clone)]
pub struct DebounceGate<T> {
  value: T,
  pending: Option<(T, Instant)>,
  delay: Duration,
}

impl<T: Clone + PartialEq> DebounceGate<T> {
  /// Create a gate whose derived value starts at `initial`.
  pub fn new(initial: T, delay: Duration) -> Self {
    Self {
      value: initial,
      pending: None,
      delay,
    }
  }

  /// The current derived (settled) value.
  pub fn value(&self) -> &T {
    &self.value
  }

  /// Whether an input is waiting for its deadline.
  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// Deadline of the pending input, if any.
  pub fn deadline(&self) -> Option<Instant> {
    self.pending.as_ref().map(|(_, deadline)| *deadline)
  }

  /// Feed a new input value, restarting the wait.
  pub fn set(&mut self, input: T) {
    if self.pending.is_none() && input == self.value {
      return;
    }
    self.pending = Some((input, Instant::now() + self.delay));
  }

  /// Publish the pending value if its deadline has passed.
  ///
  /// Returns the new derived value exactly once per settled change. An input
  /// that settles back to the current value publishes nothing.
  pub fn poll(&mut self) -> Option<&T> {
    let deadline = self.deadline()?;
    if Instant::now() < deadline {
      return None;
    }
    self.publish()
  }

  /// Publish the pending value immediately, skipping the rest of the wait.
  pub fn flush(&mut self) -> Option<&T> {
    self.pending.as_ref()?;
    self.publish()
  }

  /// Wait for the pending value to settle, then publish it.
  pub async fn settle(&mut self) -> Option<&T> {
    let deadline = self.deadline()?;
    tokio::time::sleep_until(deadline).await;
    self.publish()
  }

  fn publish(&mut self) -> Option<&T> {
    let (input, _) = self.pending.take()?;
    if input == self.value {
      return None;
    }
    self.value = input;
    Some(&self.value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn gate() -> DebounceGate<String> {
    DebounceGate::new(String::new(), Duration::from_millis(300))
  }

  #[tokio::test(start_paused = true)]
  async fn test_rapid_input_collapses_to_last_value() {
    let mut gate = gate();
    let mut emitted = Vec::new();

    for input in ["b", "ba", "bat", "batman"] {
      gate.set(input.to_string());
      tokio::time::advance(Duration::from_millis(100)).await;
      if let Some(value) = gate.poll() {
        emitted.push(value.clone());
      }
    }

    tokio::time::advance(Duration::from_millis(300)).await;
    if let Some(value) = gate.poll() {
      emitted.push(value.clone());
    }
    assert!(gate.poll().is_none());

    assert_eq!(emitted, vec!["batman".to_string()]);
    assert_eq!(gate.value(), "batman");
  }

  #[tokio::test(start_paused = true)]
  async fn test_value_held_until_deadline() {
    let mut gate = gate();
    gate.set("dune".to_string());

    tokio::time::advance(Duration::from_millis(299)).await;
    assert!(gate.poll().is_none());
    assert_eq!(gate.value(), "");

    tokio::time::advance(Duration::from_millis(1)).await;
    assert_eq!(gate.poll().map(String::as_str), Some("dune"));
  }

  #[tokio::test(start_paused = true)]
  async fn test_returning_to_current_value_emits_nothing() {
    let mut gate = gate();
    gate.set("x".to_string());
    gate.set(String::new());
    tokio::time::advance(Duration::from_millis(400)).await;
    assert!(gate.poll().is_none());
    assert!(!gate.is_pending());
  }

  #[tokio::test(start_paused = true)]
  async fn test_flush_skips_wait() {
    let mut gate = gate();
    gate.set("alien".to_string());
    assert_eq!(gate.flush().map(String::as_str), Some("alien"));
    assert!(gate.flush().is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn test_settle_waits_for_deadline() {
    let mut gate = gate();
    let start = Instant::now();
    gate.set("heat".to_string());
    assert_eq!(gate.settle().await.map(String::as_str), Some("heat"));
    assert!(start.elapsed() >= Duration::from_millis(300));
  }
}
