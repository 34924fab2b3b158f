//! Per-session screen state container.
//!
//! A [`ShopSession`] owns the login gate, the Listing view and the open Cart
//! view, and knows which screen is showing. Actions never switch screens
//! directly: they ask the [`Navigator`](crate::ports::Navigator) for a
//! [`Route`], and the presentation layer calls [`ShopSession::arrive`] once
//! that screen is up. The delayed post-checkout return arrives the same way.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::auth::{AuthError, AuthGate};
use crate::cart::{Adjustment, CartError, CartView, ListingItem};
use crate::checkout::{CheckoutResult, DEFAULT_RETURN_DELAY};
use crate::listing::{ListingError, ListingView};
use crate::ports::{Ports, Route, Screen};
use crate::sync::SyncPolicy;
use crate::types::{ProductId, SessionId};

/// Errors from session actions.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The action belongs to a different screen.
    #[error("{action} is not available on the {actual} screen (needs {expected})")]
    WrongScreen {
        action: &'static str,
        expected: Screen,
        actual: Screen,
    },

    /// The Listing screen was reached without a successful login.
    #[error("not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Listing(#[from] ListingError),
}

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Which Cart-view mutations reach the Listing view.
    pub sync_policy: SyncPolicy,
    /// Delay between checkout and the return to login.
    pub return_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            sync_policy: SyncPolicy::default(),
            return_delay: DEFAULT_RETURN_DELAY,
        }
    }
}

/// State of one shopping session, from login to checkout.
#[derive(Debug)]
pub struct ShopSession {
    id: SessionId,
    gate: AuthGate,
    catalog: Vec<ListingItem>,
    ports: Ports,
    options: SessionOptions,
    screen: Screen,
    signed_in: bool,
    listing: Option<ListingView>,
    cart: Option<CartView>,
}

impl ShopSession {
    /// Start a session on the login screen.
    #[must_use]
    pub fn new(
        gate: AuthGate,
        catalog: Vec<ListingItem>,
        ports: Ports,
        options: SessionOptions,
    ) -> Self {
        let id = SessionId::generate();
        info!(session_id = %id, policy = %options.sync_policy, "Session started");
        Self {
            id,
            gate,
            catalog,
            ports,
            options,
            screen: Screen::Login,
            signed_in: false,
            listing: None,
            cart: None,
        }
    }

    // =========================================================================
    // Login screen
    // =========================================================================

    /// Check credentials and, on success, request the Listing screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Auth` if the credentials are rejected; the
    /// matching notice has already been shown.
    #[instrument(skip(self, password), fields(session_id = %self.id))]
    pub fn login(&mut self, email: &str, password: &str) -> Result<(), SessionError> {
        self.require(Screen::Login, "login")?;

        if let Err(e) = self.gate.authenticate(email, password) {
            self.ports.notifier.present_notice(e.notice());
            return Err(e.into());
        }

        self.signed_in = true;
        self.ports.navigator.navigate_to(Route::Listing);
        Ok(())
    }

    // =========================================================================
    // Listing screen
    // =========================================================================

    /// Add a catalog product to the listing's cart.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Listing` for an unknown product.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn add_to_cart(&mut self, id: &ProductId) -> Result<u32, SessionError> {
        self.require(Screen::Listing, "add to cart")?;
        let listing = self.listing.as_mut().ok_or(SessionError::NotSignedIn)?;
        Ok(listing.add_to_cart(id)?)
    }

    /// Request the Cart screen with a snapshot of the listing's cart.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongScreen` outside the Listing screen.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn open_cart(&mut self) -> Result<(), SessionError> {
        self.require(Screen::Listing, "open cart")?;
        let listing = self.listing.as_mut().ok_or(SessionError::NotSignedIn)?;
        let params = listing.cart_params(self.options.sync_policy);
        self.ports.navigator.navigate_to(Route::Cart(params));
        Ok(())
    }

    // =========================================================================
    // Cart screen
    // =========================================================================

    /// Change an item's quantity by one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongScreen` outside the Cart screen.
    pub fn adjust_quantity(
        &mut self,
        id: &ProductId,
        adjustment: Adjustment,
    ) -> Result<Option<u32>, SessionError> {
        Ok(self.cart_mut("adjust quantity")?.adjust_quantity(id, adjustment))
    }

    /// Remove an item from the cart.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongScreen` outside the Cart screen.
    pub fn remove_item(&mut self, id: &ProductId) -> Result<(), SessionError> {
        self.cart_mut("remove item")?.remove_item(id);
        Ok(())
    }

    /// Check the cart out. The return to login follows after the delay.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Cart` with `CartError::EmptyCart` for an empty
    /// cart, or `SessionError::WrongScreen` outside the Cart screen.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn checkout(&mut self) -> Result<CheckoutResult, SessionError> {
        Ok(self.cart_mut("checkout")?.checkout()?)
    }

    /// Leave the Cart screen for the Listing screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongScreen` outside the Cart screen.
    pub fn close_cart(&mut self) -> Result<(), SessionError> {
        self.require(Screen::Cart, "close cart")?;
        self.ports.navigator.navigate_to(Route::Listing);
        Ok(())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Record that the presentation layer has shown a screen.
    ///
    /// - `Login` returns to the initial state: listing and cart are dropped.
    /// - `Listing` tears down any Cart view and reconciles its changes.
    /// - `Cart` opens a Cart view from the route's parameters.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSignedIn` when arriving at `Listing` without
    /// a successful login, and a contract-violation `SessionError::Cart` when
    /// the Cart snapshot is malformed (the session stays where it was).
    #[instrument(skip(self, route), fields(session_id = %self.id, screen = %route.screen()))]
    pub fn arrive(&mut self, route: Route) -> Result<(), SessionError> {
        match route {
            Route::Login => {
                self.close_cart_view();
                self.listing = None;
                self.signed_in = false;
                self.screen = Screen::Login;
            }
            Route::Listing => {
                if !self.signed_in {
                    warn!("Listing requested without a login");
                    return Err(SessionError::NotSignedIn);
                }
                self.close_cart_view();
                let listing = self
                    .listing
                    .get_or_insert_with(|| ListingView::new(self.catalog.clone()));
                listing.sync();
                self.screen = Screen::Listing;
            }
            Route::Cart(params) => {
                if !self.signed_in {
                    return Err(SessionError::NotSignedIn);
                }
                let view = CartView::open(params, self.ports.clone(), self.options.return_delay)?;
                self.close_cart_view();
                self.cart = Some(view);
                self.screen = Screen::Cart;
            }
        }
        debug!("Arrived");
        Ok(())
    }

    fn close_cart_view(&mut self) {
        if let Some(mut view) = self.cart.take() {
            view.teardown();
        }
    }

    fn require(&self, expected: Screen, action: &'static str) -> Result<(), SessionError> {
        if self.screen == expected {
            Ok(())
        } else {
            warn!(action, %expected, actual = %self.screen, "Action rejected on this screen");
            Err(SessionError::WrongScreen {
                action,
                expected,
                actual: self.screen,
            })
        }
    }

    fn cart_mut(&mut self, action: &'static str) -> Result<&mut CartView, SessionError> {
        self.require(Screen::Cart, action)?;
        self.cart.as_mut().ok_or(SessionError::WrongScreen {
            action,
            expected: Screen::Cart,
            actual: self.screen,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub const fn listing(&self) -> Option<&ListingView> {
        self.listing.as_ref()
    }

    #[must_use]
    pub const fn cart(&self) -> Option<&CartView> {
        self.cart.as_ref()
    }
}
