//! Session commands: login, logout, signup.
//!
//! # Usage
//!
//! ```bash
//! gc-cli login -u asha -p hunter2
//! gc-cli signup -u asha -p hunter2 --email asha@example.com --full-name "Asha Rao"
//! gc-cli logout
//! ```

use glasscart_storefront::Route;
use glasscart_storefront::api::{Credentials, SignupForm};
use glasscart_storefront::pages::{LoginPage, SignupPage};
use secrecy::SecretString;

use super::{CliError, Context, output};

/// Log in and store the token.
///
/// # Errors
///
/// Returns an error if the credentials are rejected.
pub async fn login(username: &str, password: SecretString) -> Result<(), CliError> {
    let ctx = Context::from_env(Route::Login)?;
    let page = LoginPage::new(ctx.state.clone());
    let credentials = Credentials {
        username: username.to_owned(),
        password,
    };

    if page.submit(&credentials).await {
        output(&format!("Logged in as {username}"))?;
        Ok(())
    } else {
        Err(CliError::Page(page.error().unwrap_or_default()))
    }
}

/// Forget the stored token.
///
/// # Errors
///
/// Returns an error if configuration is invalid.
pub fn logout() -> Result<(), CliError> {
    let ctx = Context::from_env(Route::Home)?;
    ctx.state.logout();
    output("Logged out")?;
    Ok(())
}

/// Register a new account.
///
/// # Errors
///
/// Returns an error if the backend rejects the form.
pub async fn signup(form: &SignupForm) -> Result<(), CliError> {
    let ctx = Context::from_env(Route::Signup)?;
    let page = SignupPage::new(ctx.state.clone());

    let accepted = page.submit(form).await;
    let message = page.message().unwrap_or_default();
    if accepted {
        output(&message)?;
        Ok(())
    } else {
        Err(CliError::Page(message))
    }
}
