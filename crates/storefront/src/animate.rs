//! Reveal-on-scroll animation.
//!
//! [`Animator::watch`] waits a short coalescing delay, then observes every
//! tagged element of the [`Document`] that is not yet visible. An
//! [`IntersectionEntry`] at or above the threshold marks its element visible
//! and stops observing it. Once nothing is observed the observer stops.
//!
//! The returned [`AnimationGuard`] cancels the delay and the observer when
//! dropped.

use std::collections::BTreeSet;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::{ANIMATE_DELAY, ANIMATE_THRESHOLD};
use crate::dom::{Document, ElementId};

const VIEWPORT_CAPACITY: usize = 256;

/// How much of an element is inside the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub element: ElementId,
    /// Visible fraction, `0.0..=1.0`.
    pub ratio: f64,
}

/// Source of intersection entries.
#[derive(Debug, Clone)]
pub struct Viewport {
    tx: broadcast::Sender<IntersectionEntry>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(VIEWPORT_CAPACITY);
        Self { tx }
    }

    /// Report an intersection change.
    pub fn report(&self, element: ElementId, ratio: f64) {
        let _ = self.tx.send(IntersectionEntry { element, ratio });
    }

    /// Report every tagged element of `document` as fully visible.
    pub fn reveal_all(&self, document: &Document) {
        for element in document.animated() {
            self.report(element, 1.0);
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<IntersectionEntry> {
        self.tx.subscribe()
    }
}

/// Reveal animator settings.
#[derive(Debug, Clone, Copy)]
pub struct Animator {
    delay: Duration,
    threshold: f64,
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            delay: ANIMATE_DELAY,
            threshold: ANIMATE_THRESHOLD,
        }
    }
}

impl Animator {
    #[must_use]
    pub const fn new(delay: Duration, threshold: f64) -> Self {
        Self { delay, threshold }
    }

    /// Start observing `document` through `viewport`.
    ///
    /// Entries reported during the delay are applied once observation
    /// starts. Must be called within a Tokio runtime.
    #[must_use]
    pub fn watch(&self, document: &Document, viewport: &Viewport) -> AnimationGuard {
        let Self { delay, threshold } = *self;
        let document = document.clone();
        let mut rx = viewport.subscribe();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut observed: BTreeSet<ElementId> = document.unrevealed().into_iter().collect();
            tracing::debug!(count = observed.len(), "Observing animated elements");

            while !observed.is_empty() {
                match rx.recv().await {
                    Ok(entry) => {
                        if entry.ratio >= threshold && observed.remove(&entry.element) {
                            document.mark_visible(&entry.element);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Dropped intersection entries");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            tracing::debug!("Animation observer disconnected");
        });

        AnimationGuard { task }
    }
}

/// Handle to a running observer. Dropping it disconnects the observer.
#[derive(Debug)]
pub struct AnimationGuard {
    task: JoinHandle<()>,
}

impl AnimationGuard {
    /// Whether the observer has disconnected.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for AnimationGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Re-runs the animator only when its dependency key changes.
#[derive(Debug)]
pub struct AnimationSlot<K> {
    key: Option<K>,
    guard: Option<AnimationGuard>,
}

impl<K> Default for AnimationSlot<K> {
    fn default() -> Self {
        Self {
            key: None,
            guard: None,
        }
    }
}

impl<K: PartialEq> AnimationSlot<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the animator if `key` differs from the last one.
    ///
    /// Returns whether a new observer was started.
    pub fn rearm(
        &mut self,
        key: K,
        animator: &Animator,
        document: &Document,
        viewport: &Viewport,
    ) -> bool {
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        self.guard = None;
        self.guard = Some(animator.watch(document, viewport));
        self.key = Some(key);
        true
    }

    /// Cancel the current observer and forget the key.
    pub fn clear(&mut self) {
        self.guard = None;
        self.key = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::View;

    fn document(names: &[&str]) -> Document {
        let doc = Document::new();
        doc.mount(View::new(
            String::new(),
            names.iter().map(|n| ElementId::new(*n)).collect(),
        ));
        doc
    }

    async fn tick(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_revealed_before_delay() {
        let doc = document(&["a"]);
        let viewport = Viewport::new();
        let _guard = Animator::default().watch(&doc, &viewport);

        viewport.report(ElementId::new("a"), 1.0);
        tick(50).await;
        assert!(!doc.is_visible(&ElementId::new("a")));

        tick(60).await;
        assert!(doc.is_visible(&ElementId::new("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_applies() {
        let doc = document(&["a", "b"]);
        let viewport = Viewport::new();
        let guard = Animator::default().watch(&doc, &viewport);
        tick(110).await;

        viewport.report(ElementId::new("a"), 0.1);
        viewport.report(ElementId::new("b"), 0.15);
        tick(1).await;

        assert!(!doc.is_visible(&ElementId::new("a")));
        assert!(doc.is_visible(&ElementId::new("b")));
        assert!(!guard.is_finished());

        viewport.report(ElementId::new("a"), 0.5);
        tick(1).await;
        assert!(doc.is_visible(&ElementId::new("a")));
        assert!(guard.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_guard_cancels() {
        let doc = document(&["a"]);
        let viewport = Viewport::new();
        let guard = Animator::default().watch(&doc, &viewport);

        viewport.report(ElementId::new("a"), 1.0);
        tick(50).await;
        drop(guard);
        tick(100).await;

        assert!(!doc.is_visible(&ElementId::new("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_visible_elements_are_not_observed() {
        let doc = document(&["a"]);
        doc.mark_visible(&ElementId::new("a"));
        let viewport = Viewport::new();
        let guard = Animator::default().watch(&doc, &viewport);

        tick(110).await;
        assert!(guard.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_rearms_only_on_key_change() {
        let doc = document(&["a"]);
        let viewport = Viewport::new();
        let animator = Animator::default();
        let mut slot = AnimationSlot::new();

        assert!(slot.rearm(3usize, &animator, &doc, &viewport));
        assert!(!slot.rearm(3usize, &animator, &doc, &viewport));
        assert!(slot.rearm(4usize, &animator, &doc, &viewport));

        slot.clear();
        assert!(slot.rearm(4usize, &animator, &doc, &viewport));
    }
}
