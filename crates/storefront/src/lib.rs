//! Glasscart Storefront library.
//!
//! Client for the Glasscart shop backend: token store, authenticated REST
//! client, fragment router and the page controllers the app mounts. The
//! binary and the CLI are thin drivers over this library.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod animate;
pub mod api;
pub mod app;
pub mod auth;
pub mod components;
pub mod config;
pub mod debounce;
pub mod dom;
pub mod error;
pub mod notify;
pub mod pages;
pub mod router;
pub mod sequence;
pub mod state;
pub mod storage;

pub use app::{App, Input};
pub use error::AppError;
pub use router::{Navigator, Route, Router};
pub use state::AppState;
