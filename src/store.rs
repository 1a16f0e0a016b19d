/// Holds the most recently observed payload for one endpoint. Last write
/// wins; a late completion from an abandoned fetch simply overwrites.
#[derive(Clone, Debug, Default)]
pub struct Store<T> {
  item: Option<T>,
}

impl<T> Store<T> {
  pub fn new() -> Store<T> {
    Store { item: None }
  }

  /// Replace the stored snapshot with a freshly fetched one.
  pub fn observe(&mut self, item: T) {
    self.item = Some(item);
  }

  /// Drop the stored snapshot. Called whenever the selection or the active
  /// account changes, before the next load is issued.
  pub fn clear(&mut self) {
    self.item = None;
  }

  pub fn item(&self) -> Option<&T> {
    self.item.as_ref()
  }

  pub fn is_empty(&self) -> bool {
    self.item.is_none()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_observe_replaces() {
    let mut store = Store::new();
    assert!(store.is_empty());

    store.observe(1);
    assert_eq!(store.item(), Some(&1));

    // Last write wins, no merging
    store.observe(2);
    assert_eq!(store.item(), Some(&2));
  }

  #[test]
  fn test_clear() {
    let mut store = Store::new();
    store.observe("snapshot");
    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.item(), None);
  }
}
