//! Shared list-load lifecycle.
//!
//! Every page that shows fetched data keeps it in a [`Resource`]:
//!
//! 1. A load enters the loading state, clears the previous error and issues
//!    one fetch.
//! 2. Success stores the value; failure stores a message. Nothing retries.
//! 3. Either way the load settles and leaves the loading state.
//!
//! A load is skipped while another one is in flight, except before the first
//! load has settled. Each load takes a ticket from a [`RequestSequence`]; only
//! the response holding the latest ticket is applied.

use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::sequence::RequestSequence;

/// Point-in-time copy of a resource's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    pub value: T,
    pub loading: bool,
    pub error: Option<String>,
    /// Whether any load has completed yet.
    pub settled: bool,
}

/// What happened to a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was stored.
    Applied,
    /// A newer load was issued meanwhile; the response was dropped.
    Stale,
    /// Another load was in flight; nothing was fetched.
    Skipped,
}

/// Fetched value plus its load lifecycle.
#[derive(Debug)]
pub struct Resource<T> {
    state: Mutex<Snapshot<T>>,
    sequence: RequestSequence,
}

impl<T: Default> Default for Resource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> Resource<T> {
    /// A resource that has not loaded yet. It reports `loading` until the
    /// first load settles.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Snapshot {
                value: T::default(),
                loading: true,
                error: None,
                settled: false,
            }),
            sequence: RequestSequence::new(),
        }
    }
}

impl<T> Resource<T> {
    fn lock(&self) -> MutexGuard<'_, Snapshot<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `fetch` under the load lifecycle.
    ///
    /// `describe` turns a failure into the message shown to the user.
    pub async fn load<E, Fut>(&self, fetch: Fut, describe: impl FnOnce(&E) -> String) -> LoadOutcome
    where
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let ticket = {
            let mut state = self.lock();
            if state.loading && state.settled {
                tracing::debug!("Load already in flight, skipping");
                return LoadOutcome::Skipped;
            }
            state.loading = true;
            state.error = None;
            self.sequence.issue()
        };

        let result = fetch.await;

        let mut state = self.lock();
        if !self.sequence.is_latest(ticket) {
            tracing::debug!("Dropping stale response");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(value) => state.value = value,
            Err(e) => {
                tracing::error!(error = %e, "Load failed");
                state.error = Some(describe(&e));
            }
        }
        state.loading = false;
        state.settled = true;
        LoadOutcome::Applied
    }

    /// Read the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock().value)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }
}

impl<T: Clone> Resource<T> {
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<T> {
        self.lock().clone()
    }
}
