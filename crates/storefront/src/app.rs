//! App bootstrap: mounts the page for the current route and keeps it in
//! sync with navigation.
//!
//! # Events
//!
//! - Route changes, from fragment input or in-app navigation, re-mount.
//! - Filter input on the product grid updates the filter bar; the grid
//!   reloads once the debounced filter settles. Loads never run inside the
//!   event `select!`, so no load is abandoned halfway.
//! - `Reveal` reports every tagged element as scrolled into view.
//! - Action inputs drive the mounted page, then re-render. Their outcome
//!   reaches the user through the status line, which shows the latest
//!   [`Notice`](crate::notify::Notice).
//!
//! Mounting drops the previous page first, which cancels its timers.

use askama::Template;
use glasscart_core::{CartLineId, ProductId, WishlistEntryId};
use secrecy::SecretString;
use tokio::sync::mpsc;

use crate::animate::{AnimationSlot, Animator, Viewport};
use crate::api::{Credentials, ProductFilter, SignupForm};
use crate::dom::{Document, View};
use crate::error::Result;
use crate::notify::{CartBadge, Notice, NoticeBoard};
use crate::pages::cart::parse_quantity;
use crate::pages::{Page, actions};
use crate::router::{Route, Router};
use crate::state::AppState;

struct NoticeView {
    text: String,
    failure: bool,
}

impl From<&Notice> for NoticeView {
    fn from(notice: &Notice) -> Self {
        Self {
            text: notice.message(),
            failure: notice.is_failure(),
        }
    }
}

#[derive(Template)]
#[template(path = "layout/shell.html")]
struct ShellTemplate<'a> {
    cart_label: &'a str,
    authenticated: bool,
    notice: Option<NoticeView>,
    content: &'a str,
}

/// Command words that take arguments; a malformed one is rejected instead of
/// being read as a fragment.
const COMMANDS: &[&str] = &[
    "category", "reveal", "details", "browse", "cart", "checkout", "wishlist", "login",
    "signup", "logout",
];

/// Input the app reacts to.
#[derive(Debug, Clone)]
pub enum Input {
    /// The location fragment changed (`hashchange`).
    Fragment(String),
    /// Typing in the product search box.
    Search(String),
    /// Choosing a category; empty for all.
    Category(String),
    /// Scroll every tagged element into view.
    Reveal,
    /// Open a product's detail page.
    Details(ProductId),
    /// The empty featured page's "Browse All Products".
    BrowseAll,
    AddToCart(ProductId),
    AddToWishlist(ProductId),
    /// Cart page only.
    UpdateQuantity { line: CartLineId, quantity: u32 },
    /// Cart page only.
    RemoveFromCart(CartLineId),
    /// Cart page only.
    Checkout,
    /// Wishlist page only.
    RemoveFromWishlist(WishlistEntryId),
    /// Wishlist page only.
    MoveToCart(ProductId),
    /// Login page only.
    Login(Credentials),
    /// Signup page only.
    Signup(SignupForm),
    Logout,
    /// A command with missing or malformed arguments.
    Invalid(String),
}

impl Input {
    /// Parse one line of interactive input.
    ///
    /// `#...` is a fragment. Commands:
    ///
    /// - `search <text>`, `category <id|all>`, `reveal`
    /// - `details <product>`, `browse`
    /// - `cart add <product>`, `cart update <line> [qty]`, `cart remove <line>`,
    ///   `checkout`
    /// - `wishlist add <product>`, `wishlist remove <entry>`,
    ///   `wishlist move <product>`
    /// - `login <username> <password>`, `signup <username> <password> <email>`,
    ///   `logout`
    ///
    /// Anything else is treated as a fragment.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.starts_with('#') {
            return Self::Fragment(line.to_owned());
        }

        let (command, rest) = line
            .split_once(' ')
            .map_or((line, ""), |(command, rest)| (command, rest.trim()));
        let args: Vec<&str> = rest.split_whitespace().collect();

        let parsed = match (command, args.as_slice()) {
            ("search", _) => Some(Self::Search(rest.to_owned())),
            ("category", ["all"]) => Some(Self::Category(String::new())),
            ("category", [id]) => Some(Self::Category((*id).to_owned())),
            ("reveal", []) => Some(Self::Reveal),
            ("details", [id]) => id.parse().ok().map(Self::Details),
            ("browse", []) => Some(Self::BrowseAll),
            ("cart", ["add", id]) => id.parse().ok().map(Self::AddToCart),
            ("cart", ["update", id, quantity @ ..]) if quantity.len() <= 1 => {
                id.parse().ok().map(|line| Self::UpdateQuantity {
                    line,
                    quantity: parse_quantity(quantity.first().copied().unwrap_or_default()),
                })
            }
            ("cart", ["remove", id]) => id.parse().ok().map(Self::RemoveFromCart),
            ("checkout", []) => Some(Self::Checkout),
            ("wishlist", ["add", id]) => id.parse().ok().map(Self::AddToWishlist),
            ("wishlist", ["remove", id]) => id.parse().ok().map(Self::RemoveFromWishlist),
            ("wishlist", ["move", id]) => id.parse().ok().map(Self::MoveToCart),
            ("login", [username, password]) => {
                Some(Self::Login(Credentials::new(*username, *password)))
            }
            ("signup", [username, password, email]) => Some(Self::Signup(SignupForm {
                username: (*username).to_owned(),
                password: SecretString::from((*password).to_owned()),
                email: (*email).to_owned(),
                ..SignupForm::default()
            })),
            ("logout", []) => Some(Self::Logout),
            _ if COMMANDS.contains(&command) => None,
            _ => Some(Self::Fragment(line.to_owned())),
        };

        parsed.unwrap_or_else(|| Self::Invalid(line.to_owned()))
    }

    /// Whether the input drives the mounted page.
    const fn is_action(&self) -> bool {
        !matches!(
            self,
            Self::Fragment(_) | Self::Search(_) | Self::Category(_) | Self::Reveal | Self::Invalid(_)
        )
    }
}

enum Event {
    Route,
    Input(Input),
    FilterSettled(ProductFilter),
}

/// The storefront application.
pub struct App {
    state: AppState,
    router: Router,
    document: Document,
    viewport: Viewport,
    animator: Animator,
    badge: CartBadge,
    notices: NoticeBoard,
    page: Option<Page>,
    animation: AnimationSlot<usize>,
}

impl App {
    /// Create the app. Must be called within a Tokio runtime.
    #[must_use]
    pub fn new(state: AppState, router: Router) -> Self {
        let badge = CartBadge::spawn(state.notifier());
        let notices = NoticeBoard::new(state.notifier());
        Self {
            state,
            router,
            document: Document::new(),
            viewport: Viewport::new(),
            animator: Animator::default(),
            badge,
            notices,
            page: None,
            animation: AnimationSlot::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub const fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The mounted page.
    #[must_use]
    pub const fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// Mount the page for the current route: load it, render it, and re-arm
    /// the animator.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub async fn mount(&mut self) -> Result<()> {
        let route = self.router.current();
        tracing::info!(route = %route, "Mounting page");

        self.animation.clear();
        self.notices.dismiss();
        self.page = None;

        let page = Page::for_route(&route, &self.state);
        page.load().await;
        self.page = Some(page);
        self.refresh()
    }

    /// Re-render the mounted page into the document.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn refresh(&mut self) -> Result<()> {
        let Some(page) = &self.page else {
            return Ok(());
        };

        let view = page.render()?;
        let html = ShellTemplate {
            cart_label: self.badge.label(),
            authenticated: self.state.auth().is_authenticated(),
            notice: self.notices.latest().map(NoticeView::from),
            content: &view.html,
        }
        .render()?;

        self.document.mount(View::new(html, view.animated));
        self.animation.rearm(
            page.item_count(),
            &self.animator,
            &self.document,
            &self.viewport,
        );
        Ok(())
    }

    /// Apply one input. Returns whether the document was re-rendered.
    async fn handle(&mut self, input: Input) -> Result<bool> {
        match input {
            Input::Fragment(fragment) => {
                self.router.hash_changed(&fragment);
                Ok(false)
            }
            Input::Search(text) => {
                if let Some(Page::Products(page)) = &self.page {
                    page.filter_bar().set_search(&text);
                }
                self.refresh().map(|()| true)
            }
            Input::Category(id) => {
                if let Some(Page::Products(page)) = &self.page {
                    page.filter_bar().set_category(&id);
                }
                self.refresh().map(|()| true)
            }
            Input::Reveal => {
                self.viewport.reveal_all(&self.document);
                Ok(false)
            }
            Input::Invalid(line) => {
                tracing::warn!(input = %line, "Unrecognized input");
                Ok(false)
            }
            action => {
                let mut routes = self.router.subscribe();
                self.perform(action).await;
                // A navigating action is rendered by the re-mount that follows.
                if routes.has_changed().unwrap_or(false) {
                    return Ok(false);
                }
                self.refresh().map(|()| true)
            }
        }
    }

    /// Run an action against the mounted page.
    ///
    /// Failures are already reported as notices by the page; a 401 has
    /// already navigated to the login page.
    async fn perform(&self, action: Input) {
        let state = &self.state;
        let result = match (action, self.page.as_ref()) {
            (Input::Details(id), _) => {
                state.navigator().go(Route::product(id));
                Ok(())
            }
            (Input::BrowseAll, _) => {
                state.navigator().go(Route::Products);
                Ok(())
            }
            (Input::AddToCart(id), _) => actions::add_to_cart(state, id).await,
            (Input::AddToWishlist(id), _) => actions::add_to_wishlist(state, id).await,
            (Input::UpdateQuantity { line, quantity }, Some(Page::Cart(page))) => {
                page.update_quantity(line, quantity).await
            }
            (Input::RemoveFromCart(line), Some(Page::Cart(page))) => page.remove(line).await,
            (Input::Checkout, Some(Page::Cart(page))) => page.checkout().await.map(drop),
            (Input::RemoveFromWishlist(id), Some(Page::Wishlist(page))) => page.remove(id).await,
            (Input::MoveToCart(id), Some(Page::Wishlist(page))) => page.move_to_cart(id).await,
            (Input::Login(credentials), Some(Page::Login(page))) => {
                page.submit(&credentials).await;
                Ok(())
            }
            (Input::Signup(form), Some(Page::Signup(page))) => {
                page.submit(&form).await;
                Ok(())
            }
            (Input::Logout, _) => {
                state.logout();
                Ok(())
            }
            (action, _) => {
                tracing::warn!(?action, "Action not available on this page");
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::debug!(error = %e, "Action did not complete");
        }
    }

    /// Mount the current route, then follow route changes and input until
    /// the input ends.
    ///
    /// `on_render` is called with the document after every render.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub async fn run(
        &mut self,
        mut input: mpsc::Receiver<Input>,
        mut on_render: impl FnMut(&Document),
    ) -> Result<()> {
        let mut routes = self.router.subscribe();

        self.mount().await?;
        on_render(&self.document);

        loop {
            let event = {
                let page = self.page.as_ref();
                tokio::select! {
                    changed = routes.changed() => match changed {
                        Ok(()) => Event::Route,
                        Err(_) => break,
                    },
                    next = input.recv() => match next {
                        Some(line) => Event::Input(line),
                        None => break,
                    },
                    filter = async {
                        match page {
                            Some(page) => page.settled_filter().await,
                            None => std::future::pending().await,
                        }
                    } => Event::FilterSettled(filter),
                }
            };

            match event {
                Event::Route => {
                    self.mount().await?;
                    on_render(&self.document);
                }
                Event::Input(input) => {
                    if input.is_action() {
                        tracing::debug!(?input, "Action");
                    }
                    if self.handle(input).await? {
                        on_render(&self.document);
                    }
                }
                Event::FilterSettled(filter) => {
                    let reloaded = match &self.page {
                        Some(Page::Products(page)) => page.apply_filter(filter).await.is_some(),
                        _ => false,
                    };
                    if reloaded {
                        self.refresh()?;
                        on_render(&self.document);
                    }
                }
            }
        }

        tracing::info!("Input closed, stopping");
        Ok(())
    }
}
