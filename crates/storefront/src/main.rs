//! Glasscart Storefront - interactive client.
//!
//! Reads one input per stdin line and prints the rendered document after
//! each render.
//!
//! # Input
//!
//! - `#/...` - a location fragment (`#/`, `#/products`, `#/product/42`, ...)
//! - `search <text>` / `category <id|all>` - product grid filters
//! - `reveal` - scroll every animated element into view
//! - `cart add|update|remove ...`, `checkout`, `wishlist add|remove|move ...`,
//!   `details <id>`, `browse`, `login <user> <password>`,
//!   `signup <user> <password> <email>`, `logout` - page actions
//!
//! The first command-line argument, if any, is the initial fragment.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::sync::Arc;

use glasscart_storefront::config::StorefrontConfig;
use glasscart_storefront::dom::{Document, LogOpener};
use glasscart_storefront::storage::FileStorage;
use glasscart_storefront::{App, AppState, Input, Router};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries the rendered document.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "glasscart_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = StorefrontConfig::from_env().expect("Failed to load configuration");
    tracing::info!(api = %config.api_base_url, "Starting storefront");

    let storage = Arc::new(FileStorage::new(config.storage_path.clone()));
    let initial = std::env::args().nth(1).unwrap_or_else(|| "#/".to_owned());
    let router = Router::from_fragment(&initial);

    let state = AppState::new(config, storage, router.navigator(), Arc::new(LogOpener))
        .expect("Failed to initialize application state");

    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(read_input(tx));

    let mut app = App::new(state, router);
    if let Err(e) = app.run(rx, print_document).await {
        tracing::error!(error = %e, "Storefront stopped");
        std::process::exit(1);
    }
}

/// Forward stdin lines until EOF or a shutdown signal.
async fn read_input(tx: mpsc::Sender<Input>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => {
                    if tx.send(Input::parse(&line)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read input");
                    break;
                }
            },
            () = &mut shutdown => break,
        }
    }
}

fn print_document(document: &Document) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", document.html()).and_then(|()| stdout.flush()) {
        tracing::warn!(error = %e, "Failed to write document");
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
