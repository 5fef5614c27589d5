//! Glasscart CLI - scripted access to the storefront and admin helpers.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password from the environment)
//! GLASSCART_PASSWORD=hunter2 gc-cli login -u asha
//!
//! # Render a page
//! gc-cli browse '#/products'
//!
//! # Cart
//! gc-cli cart show
//! gc-cli cart add 42
//! gc-cli checkout
//!
//! # Admin help panel
//! gc-cli admin help /admin/auth/user/
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `signup` - Session management
//! - `browse` - Load and print the page for a location fragment
//! - `cart` / `checkout` - Cart management
//! - `wishlist` - Wishlist management
//! - `admin` - Admin help panel and user promotion

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use glasscart_core::{CartLineId, ProductId, UserId, WishlistEntryId};
use glasscart_storefront::api::SignupForm;
use secrecy::SecretString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "gc-cli")]
#[command(author, version, about = "Glasscart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the access token
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "GLASSCART_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored access token
    Logout,
    /// Create an account
    Signup {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "GLASSCART_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        full_name: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long, default_value = "")]
        address: String,
    },
    /// Load the page for a location fragment and print it
    Browse {
        /// Fragment such as `#/products` or `#/product/42`
        #[arg(default_value = "#/")]
        fragment: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check out via WhatsApp
    Checkout,
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Admin panel helpers
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines and the total
    Show,
    /// Add one unit of a product
    Add { product_id: ProductId },
    /// Set a line's quantity (blank or invalid means 1)
    Update {
        line_id: CartLineId,
        #[arg(default_value = "")]
        quantity: String,
    },
    /// Remove a line
    Remove { line_id: CartLineId },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// List wishlist entries
    Show,
    /// Add a product
    Add { product_id: ProductId },
    /// Remove an entry
    Remove { entry_id: WishlistEntryId },
    /// Move a product to the cart
    Move { product_id: ProductId },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Print the help panel for an admin path
    Help {
        /// Admin request path, e.g. `/admin/auth/user/`
        path: String,

        /// Saved changelist page to inject the panel into
        #[arg(long)]
        page: Option<PathBuf>,
    },
    /// Promote a user to admin or superuser
    Promote {
        user_id: UserId,

        /// Grant superuser instead of admin
        #[arg(long)]
        superuser: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // stdout carries command output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Login { username, password } => {
            commands::session::login(&username, SecretString::from(password)).await?;
        }
        Commands::Logout => commands::session::logout()?,
        Commands::Signup {
            username,
            password,
            email,
            full_name,
            phone,
            address,
        } => {
            let form = SignupForm {
                username,
                password: SecretString::from(password),
                email,
                full_name,
                phone,
                address,
            };
            commands::session::signup(&form).await?;
        }
        Commands::Browse { fragment } => commands::shop::browse(&fragment).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::shop::cart_show().await?,
            CartAction::Add { product_id } => commands::shop::cart_add(product_id).await?,
            CartAction::Update { line_id, quantity } => {
                commands::shop::cart_update(line_id, &quantity).await?;
            }
            CartAction::Remove { line_id } => commands::shop::cart_remove(line_id).await?,
        },
        Commands::Checkout => commands::shop::checkout().await?,
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::shop::wishlist_show().await?,
            WishlistAction::Add { product_id } => commands::shop::wishlist_add(product_id).await?,
            WishlistAction::Remove { entry_id } => {
                commands::shop::wishlist_remove(entry_id).await?;
            }
            WishlistAction::Move { product_id } => {
                commands::shop::wishlist_move(product_id).await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Help { path, page } => commands::admin::help(&path, page.as_deref())?,
            AdminAction::Promote {
                user_id,
                superuser,
                yes,
            } => commands::admin::promote(user_id, superuser, yes)?,
        },
    }
    Ok(())
}
