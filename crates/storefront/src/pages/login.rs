//! Login page (`#/login`).

use std::sync::{Mutex, PoisonError};

use askama::Template;
use tracing::instrument;

use crate::api::Credentials;
use crate::dom::View;
use crate::error::Result;
use crate::notify::Notice;
use crate::router::Route;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/login.html")]
struct LoginTemplate {
    username: String,
    error: Option<String>,
}

#[derive(Debug, Default)]
struct LoginForm {
    username: String,
    error: Option<String>,
}

/// Login form.
#[derive(Debug)]
pub struct LoginPage {
    state: AppState,
    form: Mutex<LoginForm>,
}

impl LoginPage {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            form: Mutex::new(LoginForm::default()),
        }
    }

    /// Exchange credentials for a token.
    ///
    /// On success the token is stored and the app navigates home. Any
    /// failure shows `Invalid credentials`. Returns whether login succeeded.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn submit(&self, credentials: &Credentials) -> bool {
        {
            let mut form = self.form.lock().unwrap_or_else(PoisonError::into_inner);
            form.username.clone_from(&credentials.username);
            form.error = None;
        }

        match self.state.api().obtain_token(credentials).await {
            Ok(token) => {
                self.state.auth().set_token(&token);
                self.state.notifier().publish(Notice::LoggedIn);
                tracing::info!("Logged in");
                self.state.navigator().go(Route::Home);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                self.form
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .error = Some("Invalid credentials".to_owned());
                false
            }
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.form
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .error
            .clone()
    }

    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<View> {
        let template = {
            let form = self.form.lock().unwrap_or_else(PoisonError::into_inner);
            LoginTemplate {
                username: form.username.clone(),
                error: form.error.clone(),
            }
        };
        Ok(View::new(template.render()?, Vec::new()))
    }
}
