//! In-app notification channel.
//!
//! Pages publish [`Notice`]s instead of reaching into other parts of the
//! document. The navigation cart label ([`CartBadge`]) is one listener; the
//! status line ([`NoticeBoard`]) is the other.

use std::sync::{Arc, Mutex, PoisonError};

use glasscart_core::ProductId;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::CART_BADGE_DURATION;

const CHANNEL_CAPACITY: usize = 64;

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    AddedToCart { product_id: ProductId },
    AddedToWishlist { product_id: ProductId },
    /// A mutation failed for a reason other than missing authentication.
    ActionFailed { action: String, message: String },
    LoggedIn,
    LoggedOut,
}

impl Notice {
    /// Text shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::AddedToCart { .. } => "Added to cart".to_owned(),
            Self::AddedToWishlist { .. } => "Added to wishlist".to_owned(),
            Self::ActionFailed { action, message } => format!("Could not {action}: {message}"),
            Self::LoggedIn => "Logged in".to_owned(),
            Self::LoggedOut => "Logged out".to_owned(),
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::ActionFailed { .. })
    }
}

/// Broadcast sender for [`Notice`]s.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish a notice. Having no listeners is fine.
    pub fn publish(&self, notice: Notice) {
        tracing::debug!(?notice, "Notice");
        let _ = self.tx.send(notice);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

/// Label of the navigation cart link.
///
/// Reads `Cart • +1` for a short while after each successful add-to-cart,
/// `Cart` otherwise. A newer addition restarts the period.
#[derive(Debug)]
pub struct CartBadge {
    last_added: Arc<Mutex<Option<Instant>>>,
    task: JoinHandle<()>,
}

impl CartBadge {
    /// Start listening on `notifier`. Must be called within a Tokio runtime.
    #[must_use]
    pub fn spawn(notifier: &Notifier) -> Self {
        let last_added = Arc::new(Mutex::new(None));
        let mut rx = notifier.subscribe();
        let stamp = Arc::clone(&last_added);

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(Notice::AddedToCart { .. }) => {
                        *stamp.lock().unwrap_or_else(PoisonError::into_inner) =
                            Some(Instant::now());
                    }
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self { last_added, task }
    }

    /// Current label text.
    #[must_use]
    pub fn label(&self) -> &'static str {
        let last = *self
            .last_added
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match last {
            Some(at) if at.elapsed() < CART_BADGE_DURATION => "Cart • +1",
            _ => "Cart",
        }
    }
}

impl Drop for CartBadge {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Latest notice, for the status line.
///
/// Polled at render time rather than from a task, so a notice published
/// before a render is always part of it.
#[derive(Debug)]
pub struct NoticeBoard {
    rx: broadcast::Receiver<Notice>,
    latest: Option<Notice>,
}

impl NoticeBoard {
    #[must_use]
    pub fn new(notifier: &Notifier) -> Self {
        Self {
            rx: notifier.subscribe(),
            latest: None,
        }
    }

    /// The most recent notice, taking in everything published since the
    /// last call.
    pub fn latest(&mut self) -> Option<&Notice> {
        loop {
            match self.rx.try_recv() {
                Ok(notice) => self.latest = Some(notice),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => break,
            }
        }
        self.latest.as_ref()
    }

    /// Stop showing the current notice. Notices not yet taken in are kept.
    pub fn dismiss(&mut self) {
        self.latest = None;
    }
}
