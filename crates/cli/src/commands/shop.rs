//! Interactive shopping session.
//!
//! Reads one command per line from stdin. Navigation requests from the
//! session (including the delayed return to login after checkout) arrive on
//! a channel and are applied between commands.
//!
//! ```text
//! login <email> <password>   sign in
//! list                       redraw the current screen
//! add <id>                   add a product to the cart (listing)
//! cart                       open the cart (listing)
//! inc <id> / dec <id>        change a quantity by one (cart)
//! remove <id>                remove an item (cart)
//! total                      show the cart total (cart)
//! checkout                   pay and return to login (cart)
//! back                       return to the listing (cart)
//! help                       show this list
//! quit                       exit
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use pocket_shop_core::auth::AuthGate;
use pocket_shop_core::cart::{Adjustment, CartView};
use pocket_shop_core::listing::ListingView;
use pocket_shop_core::ports::{Ports, Screen};
use pocket_shop_core::session::{SessionError, ShopSession};
use pocket_shop_core::ProductId;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::TryCurrentError;

use super::money;
use crate::catalog::{self, CatalogError};
use crate::config::ShopConfig;
use crate::terminal::{ChannelNavigator, TerminalNotifier, TokioScheduler};

const HELP: &str = "\
commands:
  login <email> <password>   sign in
  list                       redraw the current screen
  add <id>                   add a product to the cart
  cart                       open the cart
  inc <id> | dec <id>        change a quantity by one
  remove <id>                remove an item
  total                      show the cart total
  checkout                   pay and return to login
  back                       return to the listing
  help                       show this list
  quit                       exit";

/// Errors that end the session.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error(transparent)]
    Load(#[from] CatalogError),

    #[error("No async runtime: {0}")]
    Runtime(#[from] TryCurrentError),

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}

// =============================================================================
// Command parsing
// =============================================================================

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Login { email: String, password: String },
    List,
    Add(ProductId),
    Cart,
    Increase(ProductId),
    Decrease(ProductId),
    Remove(ProductId),
    Total,
    Checkout,
    Back,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
enum ParseError {
    #[error("unknown command {0:?} (try `help`)")]
    Unknown(String),

    #[error("`{0}` needs a product id")]
    MissingId(&'static str),
}

impl Command {
    /// Parse a prompt line. Blank lines parse to `None`.
    ///
    /// Missing login fields are passed on as empty strings so the gate can
    /// report them.
    fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb {
            "login" => {
                let email = words.next().unwrap_or_default().to_owned();
                let password = words.next().unwrap_or_default().to_owned();
                Self::Login { email, password }
            }
            "list" => Self::List,
            "add" => Self::Add(id_arg(&mut words, "add")?),
            "cart" => Self::Cart,
            "inc" => Self::Increase(id_arg(&mut words, "inc")?),
            "dec" => Self::Decrease(id_arg(&mut words, "dec")?),
            "remove" => Self::Remove(id_arg(&mut words, "remove")?),
            "total" => Self::Total,
            "checkout" => Self::Checkout,
            "back" => Self::Back,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(ParseError::Unknown(other.to_owned())),
        };
        Ok(Some(command))
    }
}

fn id_arg<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    verb: &'static str,
) -> Result<ProductId, ParseError> {
    words
        .next()
        .map(ProductId::new)
        .ok_or(ParseError::MissingId(verb))
}

// =============================================================================
// Session loop
// =============================================================================

/// Run an interactive session until `quit` or end of input.
///
/// # Errors
///
/// Returns `ShopError` if data files cannot be loaded, the terminal fails,
/// or a cart snapshot is malformed.
pub async fn run(config: &ShopConfig) -> Result<(), ShopError> {
    let catalog = catalog::load_catalog(config.catalog_path.as_deref()).await?;
    let directory = catalog::load_directory(config.users_path.as_deref()).await?;

    let (navigator, mut routes) = ChannelNavigator::channel();
    let ports = Ports::new(
        Arc::new(navigator),
        Arc::new(TerminalNotifier::stdout()),
        Arc::new(TokioScheduler::current()?),
    );
    let mut session = ShopSession::new(
        AuthGate::new(directory),
        catalog,
        ports,
        config.session_options(),
    );

    let mut out = io::stdout();
    render_screen(&session, &mut out)?;
    prompt(&mut out)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            biased;

            Some(route) = routes.recv() => {
                let arrived = session.arrive(route).map_err(ShopError::from);
                settle(arrived, &mut out)?;
                render_screen(&session, &mut out)?;
                prompt(&mut out)?;
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!(session_id = %session.id(), "Input closed");
                    break;
                };
                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => {
                        let executed = execute(&mut session, command, &mut out);
                        settle(executed, &mut out)?;
                    }
                    Ok(None) => {}
                    Err(e) => writeln!(out, "{e}")?,
                }
                prompt(&mut out)?;
            }
        }
    }

    Ok(())
}

fn execute(
    session: &mut ShopSession,
    command: Command,
    out: &mut impl Write,
) -> Result<(), ShopError> {
    match command {
        Command::Login { email, password } => session.login(&email, &password)?,
        Command::List => render_screen(session, out)?,
        Command::Add(id) => {
            let quantity = session.add_to_cart(&id)?;
            writeln!(out, "added {id} (x{quantity})")?;
        }
        Command::Cart => session.open_cart()?,
        Command::Increase(id) => adjust(session, &id, Adjustment::Increase, out)?,
        Command::Decrease(id) => adjust(session, &id, Adjustment::Decrease, out)?,
        Command::Remove(id) => {
            session.remove_item(&id)?;
            render_screen(session, out)?;
        }
        Command::Total => {
            let view = session.cart().ok_or(SessionError::WrongScreen {
                action: "total",
                expected: Screen::Cart,
                actual: session.screen(),
            })?;
            let total = view.total().map_err(SessionError::from)?;
            writeln!(out, "total: {}", money(view.currency_symbol(), total))?;
        }
        Command::Checkout => {
            let symbol = session.cart().and_then(CartView::currency_symbol);
            let result = session.checkout()?;
            writeln!(out, "paid {}", money(symbol, result.total_amount))?;
        }
        Command::Back => session.close_cart()?,
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}

fn adjust(
    session: &mut ShopSession,
    id: &ProductId,
    adjustment: Adjustment,
    out: &mut impl Write,
) -> Result<(), ShopError> {
    match session.adjust_quantity(id, adjustment)? {
        Some(_) => render_screen(session, out)?,
        None => writeln!(out, "{id} is not in the cart")?,
    }
    Ok(())
}

/// Turn recoverable session errors into output; keep the fatal ones.
///
/// Credential failures and an empty-cart checkout have already been shown
/// as notices. A malformed cart snapshot ends the session.
fn settle(result: Result<(), ShopError>, out: &mut impl Write) -> Result<(), ShopError> {
    match result {
        Err(ShopError::Session(SessionError::Cart(e))) if e.is_contract_violation() => {
            tracing::error!(error = %e, "Cart contract violated");
            Err(SessionError::Cart(e).into())
        }
        Err(ShopError::Session(SessionError::Auth(_) | SessionError::Cart(_))) => Ok(()),
        Err(ShopError::Session(e)) => {
            writeln!(out, "error: {e}")?;
            Ok(())
        }
        other => other,
    }
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

// =============================================================================
// Rendering
// =============================================================================

fn render_screen(session: &ShopSession, out: &mut impl Write) -> io::Result<()> {
    match session.screen() {
        Screen::Login => writeln!(out, "== Login ==\nlogin <email> <password>"),
        Screen::Listing => match session.listing() {
            Some(listing) => render_listing(listing, out),
            None => Ok(()),
        },
        Screen::Cart => match session.cart() {
            Some(view) => render_cart(view, out),
            None => Ok(()),
        },
    }
}

fn render_listing(listing: &ListingView, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "== Products ==")?;
    for product in listing.catalog() {
        write!(
            out,
            "  {:<14} {:<24} {:>10}",
            product.id.as_str(),
            product.name,
            product.price
        )?;
        match listing.quantity_of(&product.id) {
            Some(quantity) => writeln!(out, "  [in cart: {quantity}]")?,
            None => writeln!(out)?,
        }
    }
    writeln!(out, "cart: {} item(s)", listing.cart().len())
}

fn render_cart(view: &CartView, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "== Cart ==")?;
    if view.is_empty() {
        writeln!(out, "  (empty)")?;
    }
    for item in view.items() {
        writeln!(
            out,
            "  {:<14} {:<24} {:>3} x {:>10} = {}",
            item.id().as_str(),
            item.name(),
            item.quantity(),
            item.price().to_string(),
            item.line_total()
                .map_or_else(|| "overflow".to_owned(), |t| money(item.price().symbol(), t))
        )?;
    }
    match view.total() {
        Ok(total) => writeln!(out, "total: {}", money(view.currency_symbol(), total)),
        Err(e) => writeln!(out, "total: {e}"),
    }
}
