//! Command implementations.

pub mod admin;
pub mod session;
pub mod shop;

use std::io::Write;
use std::sync::Arc;

use glasscart_storefront::api::ApiError;
use glasscart_storefront::config::{ConfigError, StorefrontConfig};
use glasscart_storefront::dom::LinkOpener;
use glasscart_storefront::storage::FileStorage;
use glasscart_storefront::{AppError, AppState, Route, Router};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The backend rejected the stored token, or there is none.
    #[error("Login required: run `gc-cli login`")]
    LoginRequired,

    /// Shop API operation failed.
    #[error("API error: {0}")]
    Api(ApiError),

    /// The page reported a failure.
    #[error("{0}")]
    Page(String),

    /// Rendering failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// Admin help rendering failed.
    #[error(transparent)]
    Help(#[from] glasscart_admin::HelpError),

    /// Terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ApiError> for CliError {
    fn from(e: ApiError) -> Self {
        if e.is_unauthorized() {
            Self::LoginRequired
        } else {
            Self::Api(e)
        }
    }
}

/// Opener for a terminal: prints the link for the user to follow.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintOpener;

impl LinkOpener for PrintOpener {
    fn open(&self, url: &str) {
        if let Err(e) = output(&format!("Open: {url}")) {
            tracing::warn!(error = %e, "Failed to print link");
        }
    }
}

/// Write one line to stdout.
pub fn output(line: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")
}

/// Shared setup for commands.
pub struct Context {
    pub state: AppState,
    pub router: Router,
}

impl Context {
    /// Build the app state from the environment, starting at `route`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn from_env(route: Route) -> Result<Self, CliError> {
        let config = StorefrontConfig::from_env()?;
        let storage = Arc::new(FileStorage::new(config.storage_path.clone()));
        let router = Router::new(route);
        let state = AppState::new(config, storage, router.navigator(), Arc::new(PrintOpener))?;
        Ok(Self { state, router })
    }

    /// Fail with [`CliError::LoginRequired`] if a 401 sent the router to the
    /// login page.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::LoginRequired`] after a 401 redirect.
    pub fn ensure_not_redirected(&self, expected: &Route) -> Result<(), CliError> {
        if *expected != Route::Login && self.router.current() == Route::Login {
            return Err(CliError::LoginRequired);
        }
        Ok(())
    }

    /// Check a list load: a 401 redirect first, then the page's own error.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::LoginRequired`] after a 401 redirect, or
    /// [`CliError::Page`] carrying the load error.
    pub fn ensure_loaded(&self, expected: &Route, error: Option<String>) -> Result<(), CliError> {
        self.ensure_not_redirected(expected)?;
        error.map_or(Ok(()), |e| Err(CliError::Page(e)))
    }
}
