//! Visibility-triggered "load more" signal.
//!
//! [`VisibilitySource`] abstracts whatever the host uses to learn that a
//! marker is on screen. [`ScrollSentinel`] attaches a callback to a marker
//! through such a source and detaches on drop. The sentinel is free to fire
//! on every frame the marker stays visible; the list controller is what
//! ignores the repeats.

use std::ops::Range;

/// Callback invoked when the observed marker is visible.
pub type VisibilityCallback = Box<dyn FnMut() + Send>;

/// Something that can report when a marker becomes visible.
pub trait VisibilitySource {
  /// Marker type this source can observe.
  type Target;

  /// Start observing `target`, replacing any previous observation.
  fn observe(&mut self, target: &Self::Target, callback: VisibilityCallback);

  /// Stop observing.
  fn disconnect(&mut self);
}

/// Attach/detach wrapper around a [`VisibilitySource`].
pub struct ScrollSentinel<S: VisibilitySource> {
  source: S,
  attached: bool,
}

impl<S: VisibilitySource> ScrollSentinel<S> {
  pub fn new(source: S) -> Self {
    Self {
      source,
      attached: false,
    }
  }

  /// Observe `target`, invoking `callback` whenever it is visible.
  ///
  /// An absent target detaches and does nothing else. Returns whether the
  /// sentinel is now observing.
  pub fn attach<F>(&mut self, target: Option<&S::Target>, callback: F) -> bool
  where
    F: FnMut() + Send + 'static,
  {
    self.detach();
    let Some(target) = target else {
      return false;
    };
    self.source.observe(target, Box::new(callback));
    self.attached = true;
    true
  }

  /// Stop observing, if observing.
  pub fn detach(&mut self) {
    if self.attached {
      self.source.disconnect();
      self.attached = false;
    }
  }

  pub fn is_attached(&self) -> bool {
    self.attached
  }

  pub fn source_mut(&mut self) -> &mut S {
    &mut self.source
  }
}

impl<S: VisibilitySource> Drop for ScrollSentinel<S> {
  fn drop(&mut self) {
    self.detach();
  }
}

/// Terminal list viewport as a visibility source.
///
/// The marker is a row index in a scrolling list. After each render the list
/// reports which rows it drew; if the marker row is among them the callback
/// fires.
#[derive(Default)]
pub struct ViewportVisibility {
  marker: Option<usize>,
  callback: Option<VisibilityCallback>,
}

impl ViewportVisibility {
  pub fn new() -> Self {
    Self::default()
  }

  /// Row currently observed, if any.
  pub fn marker(&self) -> Option<usize> {
    self.marker
  }

  /// Report the rows drawn by the last render.
  pub fn report_visible(&mut self, rows: Range<usize>) {
    let Some(marker) = self.marker else {
      return;
    };
    if let Some(callback) = self.callback.as_mut() {
      if rows.contains(&marker) {
        callback();
      }
    }
  }
}

impl VisibilitySource for ViewportVisibility {
  type Target = usize;

  fn observe(&mut self, target: &usize, callback: VisibilityCallback) {
    self.marker = Some(*target);
    self.callback = Some(callback);
  }

  fn disconnect(&mut self) {
    self.marker = None;
    self.callback = None;
  }
}
