//! In-memory document the app renders into.
//!
//! The [`Document`] holds the HTML of the mounted page plus a registry of
//! elements tagged for the reveal animation, each with its `visible` flag.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identifier of an element tagged for animation (its `data-animate` value).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rendered page output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub html: String,
    /// Elements in `html` tagged for the reveal animation.
    pub animated: Vec<ElementId>,
}

impl View {
    #[must_use]
    pub const fn new(html: String, animated: Vec<ElementId>) -> Self {
        Self { html, animated }
    }
}

/// Shared handle to the mounted document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    inner: Arc<Mutex<DocumentInner>>,
}

#[derive(Debug, Default)]
struct DocumentInner {
    html: String,
    elements: BTreeMap<ElementId, bool>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DocumentInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the document content with `view`.
    ///
    /// Elements present before and after keep their `visible` flag; new
    /// elements start hidden.
    pub fn mount(&self, view: View) {
        let mut inner = self.lock();
        let previous = std::mem::take(&mut inner.elements);
        inner.elements = view
            .animated
            .into_iter()
            .map(|id| {
                let visible = previous.get(&id).copied().unwrap_or(false);
                (id, visible)
            })
            .collect();
        inner.html = view.html;
    }

    /// Clear the document.
    pub fn unmount(&self) {
        let mut inner = self.lock();
        inner.html.clear();
        inner.elements.clear();
    }

    /// Current HTML, with the `visible` class on every revealed element.
    #[must_use]
    pub fn html(&self) -> String {
        let inner = self.lock();
        let visible: Vec<&ElementId> = inner
            .elements
            .iter()
            .filter(|(_, visible)| **visible)
            .map(|(id, _)| id)
            .collect();
        with_visible_class(&inner.html, &visible)
    }

    /// Tagged elements that are not yet visible.
    #[must_use]
    pub fn unrevealed(&self) -> Vec<ElementId> {
        self.lock()
            .elements
            .iter()
            .filter(|(_, visible)| !**visible)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// All tagged elements.
    #[must_use]
    pub fn animated(&self) -> Vec<ElementId> {
        self.lock().elements.keys().cloned().collect()
    }

    /// Mark an element visible. Returns `false` if it was already visible or
    /// is not in the document.
    pub fn mark_visible(&self, id: &ElementId) -> bool {
        match self.lock().elements.get_mut(id) {
            Some(visible) if !*visible => {
                *visible = true;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_visible(&self, id: &ElementId) -> bool {
        self.lock().elements.get(id).copied().unwrap_or(false)
    }
}

const CLASS_ATTR: &str = "class=\"";

/// Append `visible` to the class list of each element tagged with one of
/// `ids`. An element without a class attribute gets one.
fn with_visible_class(html: &str, ids: &[&ElementId]) -> String {
    let mut out = html.to_owned();
    for id in ids {
        let marker = format!("data-animate=\"{id}\"");
        let Some(at) = out.find(&marker) else {
            continue;
        };
        let Some(tag_start) = out[..at].rfind('<') else {
            continue;
        };
        let tag_end = out[at..].find('>').map_or(out.len(), |i| at + i);

        match out[tag_start..tag_end].find(CLASS_ATTR) {
            Some(offset) => {
                let value_start = tag_start + offset + CLASS_ATTR.len();
                if let Some(close) = out[value_start..tag_end].find('"') {
                    out.insert_str(value_start + close, " visible");
                }
            }
            None => out.insert_str(at, "class=\"visible\" "),
        }
    }
    out
}

// =============================================================================
// Links
// =============================================================================

/// Opens an external URL in a new browsing context.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str);
}

/// Opener that only logs the URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOpener;

impl LinkOpener for LogOpener {
    fn open(&self, url: &str) {
        tracing::info!(url, "Opening link in a new browsing context");
    }
}

/// Opener that remembers every URL it was asked to open.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs opened so far, oldest first.
    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &str) {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<ElementId> {
        names.iter().map(|n| ElementId::new(*n)).collect()
    }

    #[test]
    fn test_mount_registers_hidden_elements() {
        let doc = Document::new();
        doc.mount(View::new("<div></div>".into(), ids(&["a", "b"])));

        assert_eq!(doc.html(), "<div></div>");
        assert_eq!(doc.unrevealed(), ids(&["a", "b"]));
    }

    #[test]
    fn test_mark_visible_once() {
        let doc = Document::new();
        doc.mount(View::new(String::new(), ids(&["a"])));
        let a = ElementId::new("a");

        assert!(doc.mark_visible(&a));
        assert!(!doc.mark_visible(&a));
        assert!(doc.is_visible(&a));
        assert!(doc.unrevealed().is_empty());
        assert!(!doc.mark_visible(&ElementId::new("missing")));
    }

    #[test]
    fn test_remount_keeps_visibility_of_surviving_elements() {
        let doc = Document::new();
        doc.mount(View::new(String::new(), ids(&["a", "b"])));
        doc.mark_visible(&ElementId::new("a"));

        doc.mount(View::new(String::new(), ids(&["a", "c"])));
        assert!(doc.is_visible(&ElementId::new("a")));
        assert_eq!(doc.unrevealed(), ids(&["c"]));
    }

    #[test]
    fn test_html_carries_visible_class_after_reveal() {
        let doc = Document::new();
        doc.mount(View::new(
            r#"<div class="card fade-in" data-animate="a"><p>A</p></div><div data-animate="b"></div>"#
                .into(),
            ids(&["a", "b"]),
        ));
        assert!(!doc.html().contains("visible"));

        doc.mark_visible(&ElementId::new("a"));
        assert_eq!(
            doc.html(),
            r#"<div class="card fade-in visible" data-animate="a"><p>A</p></div><div data-animate="b"></div>"#
        );

        doc.mark_visible(&ElementId::new("b"));
        assert!(doc.html().ends_with(r#"<div class="visible" data-animate="b"></div>"#));
    }

    #[test]
    fn test_recording_opener() {
        let opener = RecordingOpener::new();
        opener.open("https://wa.me/1");
        assert_eq!(opener.opened(), vec!["https://wa.me/1".to_owned()]);
    }
}
