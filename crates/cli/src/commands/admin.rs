//! Admin panel helpers.
//!
//! # Usage
//!
//! ```bash
//! # Render the help panel for a path
//! gc-cli admin help /admin/auth/user/
//!
//! # Inject it into a saved changelist page
//! gc-cli admin help /admin/auth/user/ --page users.html
//!
//! # Promote user 7 to superuser without prompting
//! gc-cli admin promote 7 --superuser --yes
//! ```

use std::io::{BufRead, Write};
use std::path::Path;

use glasscart_admin::{AssumeYes, HelpOverlay, UserPromotion};
use glasscart_core::UserId;

use super::{CliError, output};

/// Print the help panel for `path`, or the page at `page_file` with the
/// panel injected.
///
/// # Errors
///
/// Returns an error if the page cannot be read or rendering fails.
pub fn help(path: &str, page_file: Option<&Path>) -> Result<(), CliError> {
    let overlay = HelpOverlay::default();

    if let Some(file) = page_file {
        let html = std::fs::read_to_string(file)?;
        output(&overlay.inject(path, &html)?)?;
        return Ok(());
    }

    if HelpOverlay::should_inject(path, true) {
        output(&overlay.render()?)?;
    } else {
        tracing::info!(path, "Not a user admin page, no help panel");
    }
    Ok(())
}

/// Ask on the terminal; anything but `y`/`yes` declines.
fn ask(message: &str) -> bool {
    let mut stdout = std::io::stdout().lock();
    if write!(stdout, "{message} [y/N] ")
        .and_then(|()| stdout.flush())
        .is_err()
    {
        return false;
    }

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Print the promotion redirect for a user after confirmation.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn promote(user_id: UserId, superuser: bool, yes: bool) -> Result<(), CliError> {
    let promotion = if superuser {
        UserPromotion::MakeSuperuser
    } else {
        UserPromotion::MakeAdmin
    };

    let redirect = if yes {
        promotion.request(user_id, &AssumeYes)
    } else {
        promotion.request(user_id, &ask)
    };

    match redirect {
        Some(path) => output(&path)?,
        None => output("Cancelled")?,
    }
    Ok(())
}
