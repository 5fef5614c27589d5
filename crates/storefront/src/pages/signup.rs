//! Signup page (`#/signup`).

use std::sync::{Mutex, PoisonError};

use askama::Template;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::api::SignupForm;
use crate::config::SIGNUP_REDIRECT_DELAY;
use crate::dom::View;
use crate::error::Result;
use crate::router::Route;
use crate::state::AppState;

pub const SIGNUP_SUCCESS: &str = "Signup successful. Please login.";
pub const SIGNUP_FAILED: &str = "Signup failed. Check details.";

#[derive(Template)]
#[template(path = "pages/signup.html")]
struct SignupTemplate {
    message: Option<String>,
}

/// Registration form.
///
/// A successful signup schedules a redirect to the login page. Dropping the
/// page cancels it.
#[derive(Debug)]
pub struct SignupPage {
    state: AppState,
    message: Mutex<Option<String>>,
    redirect: Mutex<Option<JoinHandle<()>>>,
}

impl SignupPage {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            message: Mutex::new(None),
            redirect: Mutex::new(None),
        }
    }

    fn set_message(&self, message: Option<&str>) {
        *self.message.lock().unwrap_or_else(PoisonError::into_inner) =
            message.map(str::to_owned);
    }

    /// Register an account. Returns whether the backend accepted it.
    ///
    /// Must be called within a Tokio runtime.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn submit(&self, form: &SignupForm) -> bool {
        self.set_message(None);

        match self.state.api().signup(form).await {
            Ok(()) => {
                tracing::info!("Signup accepted");
                self.set_message(Some(SIGNUP_SUCCESS));

                let navigator = self.state.navigator().clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(SIGNUP_REDIRECT_DELAY).await;
                    navigator.go(Route::Login);
                });
                if let Some(previous) = self
                    .redirect
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .replace(handle)
                {
                    previous.abort();
                }
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Signup failed");
                self.set_message(Some(SIGNUP_FAILED));
                false
            }
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.message
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<View> {
        let html = SignupTemplate {
            message: self.message(),
        }
        .render()?;
        Ok(View::new(html, Vec::new()))
    }
}

impl Drop for SignupPage {
    fn drop(&mut self) {
        if let Some(handle) = self
            .redirect
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
