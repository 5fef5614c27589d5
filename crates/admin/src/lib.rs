//! Glasscart Admin library.
//!
//! Additions to the admin panel of the shop backend:
//!
//! - [`HelpOverlay`]: the user-management help panel injected above the user
//!   changelist.
//! - [`UserPromotion`]: confirmed redirects that grant staff or superuser
//!   status.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod help;
pub mod promotion;

pub use help::{HelpError, HelpOverlay, HelpSection};
pub use promotion::{AssumeYes, Confirm, UserPromotion};
