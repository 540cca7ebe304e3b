//! Page navigation with auth gating.
//!
//! The [`Navigator`] owns the current page. Descendant components never
//! reach into it directly: they hold a cloneable [`NavHandle`] and send
//! "go to page X" requests over a typed channel, which the owner drains
//! with [`Navigator::apply_pending`] between renders.
//!
//! What the user actually sees is computed per render by
//! [`Navigator::view`], which crosses the requested page with the session:
//! protected pages (admin, checkout) render the auth view while signed out,
//! carrying the page to return to once authentication succeeds. The auth
//! form performs that redirect explicitly by calling
//! [`NavHandle::goto`] with [`View::Auth::next`] after a successful
//! sign-in.

use tokio::sync::mpsc;

use crate::stores::SessionState;
use crate::telemetry;

/// The closed set of top-level pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Cart,
    Auth,
    Admin,
    Checkout,
}

impl Page {
    /// Stable lowercase name, used for logging and breadcrumbs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Cart => "cart",
            Self::Auth => "auth",
            Self::Admin => "admin",
            Self::Checkout => "checkout",
        }
    }

    /// Whether the page requires an authenticated session.
    #[must_use]
    pub const fn requires_auth(self) -> bool {
        matches!(self, Self::Admin | Self::Checkout)
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the root component should render right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The initial session check has not resolved; render a loading
    /// indicator and no page content.
    Loading,
    Home,
    Cart,
    /// The sign-in/sign-up view. `next` is the page to navigate to after a
    /// successful authentication.
    Auth {
        next: Page,
    },
    Admin,
    Checkout,
}

/// Cloneable sender half for navigation requests.
#[derive(Debug, Clone)]
pub struct NavHandle {
    tx: mpsc::UnboundedSender<Page>,
}

impl NavHandle {
    /// Request navigation to `page`.
    ///
    /// The request is queued until the owning [`Navigator`] applies it. If
    /// the navigator is gone the request is silently dropped.
    pub fn goto(&self, page: Page) {
        let _ = self.tx.send(page);
    }
}

/// Root navigation controller.
///
/// Owns the current page; reads session state, never writes it.
#[derive(Debug)]
pub struct Navigator {
    page: Page,
    tx: mpsc::UnboundedSender<Page>,
    rx: mpsc::UnboundedReceiver<Page>,
}

impl Navigator {
    /// Create a navigator on the home page.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            page: Page::Home,
            tx,
            rx,
        }
    }

    /// A handle for descendants to request navigation with.
    #[must_use]
    pub fn handle(&self) -> NavHandle {
        NavHandle {
            tx: self.tx.clone(),
        }
    }

    /// The currently requested page (before gating).
    #[must_use]
    pub const fn page(&self) -> Page {
        self.page
    }

    /// Navigate directly to `page`.
    ///
    /// Any page in the closed set is accepted verbatim; there is no history
    /// stack.
    pub fn goto(&mut self, page: Page) {
        tracing::debug!(page = %page, "Navigating");
        telemetry::add_breadcrumb("navigation", "Navigated", Some(&[("page", page.as_str())]));
        self.page = page;
    }

    /// Apply queued navigation requests in arrival order.
    ///
    /// Returns the number of requests applied (the last one wins).
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(page) = self.rx.try_recv() {
            self.goto(page);
            applied += 1;
        }
        applied
    }

    /// Decide what to render for the current page and session.
    ///
    /// Computed on every call rather than stored, so a session change is
    /// reflected without an explicit navigation.
    #[must_use]
    pub const fn view(&self, session: &SessionState) -> View {
        if session.loading {
            return View::Loading;
        }

        let authenticated = session.is_authenticated();
        match self.page {
            Page::Admin if !authenticated => View::Auth { next: Page::Admin },
            Page::Checkout if !authenticated => View::Auth {
                next: Page::Checkout,
            },
            Page::Auth => View::Auth { next: Page::Home },
            Page::Home => View::Home,
            Page::Cart => View::Cart,
            Page::Admin => View::Admin,
            Page::Checkout => View::Checkout,
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}
