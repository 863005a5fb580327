//! Cartwright - storefront cart client CLI.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog, optionally filtered by category
//! cartwright products
//! cartwright products --category electronics
//! cartwright products --featured
//!
//! # Inspect one product
//! cartwright product 3
//!
//! # Cart operations (state lives on the backend)
//! cartwright cart show
//! cartwright cart add 3
//! cartwright cart remove 3
//! cartwright cart count
//!
//! # Checkout the current cart
//! cartwright checkout
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_API_BASE_URL` - Base URL of the storefront JSON API
//! - `STOREFRONT_STATE_DIR` - Directory for persisted client state
//! - `STOREFRONT_REQUEST_TIMEOUT_SECS` - Per-request HTTP timeout

#![cfg_attr(not(test), forbid(unsafe_code))]
// A CLI talks to its user on stdout.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cartwright_core::{Product, ProductId};
use cartwright_storefront::api::{ApiClient, ApiError};
use cartwright_storefront::catalog::{self, Catalog};
use cartwright_storefront::config::StorefrontConfig;
use cartwright_storefront::identity::UserIdStore;
use cartwright_storefront::session::CartSession;
use cartwright_storefront::view::{CartBadge, CartPage, format_price};

#[derive(Parser)]
#[command(name = "cartwright")]
#[command(author, version, about = "Storefront cart client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the product catalog
    Products {
        /// Only show products in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only show the featured (home page) slice
        #[arg(short, long)]
        featured: bool,
    },
    /// Show a single product
    Product {
        /// Product ID
        id: i64,
    },
    /// Cart operations
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check out the current cart
    Checkout,
    /// Print the persisted user identifier
    Whoami,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart page
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: i64,
    },
    /// Remove a product
    Remove {
        /// Product ID
        id: i64,
    },
    /// Show the cart count badge
    Count,
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; defaults to warnings only so
    // normal CLI output stays clean.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cartwright_storefront=warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let api = ApiClient::new(&config)?;

    match cli.command {
        Commands::Products { category, featured } => {
            list_products(&Catalog::new(api), category.as_deref(), featured).await?;
        }
        Commands::Product { id } => {
            show_product(&Catalog::new(api), ProductId::new(id)).await?;
        }
        Commands::Cart { action } => {
            let session = open_session(api, &config);
            match action {
                CartAction::Show => show_cart(&session).await,
                CartAction::Add { id } => add_to_cart(&session, ProductId::new(id)).await?,
                CartAction::Remove { id } => remove_from_cart(&session, ProductId::new(id)).await?,
                CartAction::Count => show_count(&session).await,
            }
        }
        Commands::Checkout => {
            let session = open_session(api, &config);
            checkout(&session).await?;
        }
        Commands::Whoami => {
            let store = UserIdStore::new(&config.state_dir);
            println!("{}", store.load_or_create());
        }
    }

    Ok(())
}

/// Build a cart session over the persisted identifier.
fn open_session(api: ApiClient, config: &StorefrontConfig) -> CartSession {
    CartSession::new(api, UserIdStore::new(&config.state_dir))
}

async fn list_products(
    catalog: &Catalog,
    category: Option<&str>,
    featured: bool,
) -> Result<(), ApiError> {
    let products = catalog.products().await?;

    let selected: Vec<&Product> = if featured {
        catalog::featured(products.as_slice()).iter().collect()
    } else {
        catalog::filter_by_category(
            products.as_slice(),
            category.unwrap_or(catalog::ALL_CATEGORIES),
        )
    };

    if selected.is_empty() {
        println!("No products found in this category.");
        return Ok(());
    }

    for product in selected {
        println!("{}", product_row(product));
    }

    let categories = catalog::categories(products.as_slice());
    println!("\nCategories: {}", categories.join(", "));

    Ok(())
}

async fn show_product(catalog: &Catalog, id: ProductId) -> Result<(), ApiError> {
    let product = catalog.product(id).await?;
    println!("{}", product_row(&product));
    println!("  image: {}", product.image);
    Ok(())
}

/// One catalog line: id, title, category, price, rating.
fn product_row(product: &Product) -> String {
    let rating = product.rating.as_ref().map_or_else(String::new, |r| {
        format!("  {}/5 ({} reviews)", r.rate, r.count)
    });

    format!(
        "#{:<4} {:<40} {:<14} {:>8}{rating}",
        product.id,
        product.title,
        product.category,
        format_price(product.price),
    )
}

/// Show the cart page, falling back to the last known state when the
/// load fails (the failure itself is only logged).
async fn show_cart(session: &CartSession) {
    if let Err(e) = session.load().await {
        tracing::warn!("showing last known cart state: {e}");
    }

    let page = CartPage::from(&session.state());
    if page.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    println!("{:<40} {:>10} {:>6} {:>10}", "Product", "Price", "Qty", "Total");
    for item in &page.items {
        println!(
            "{:<40} {:>10} {:>6} {:>10}",
            item.title, item.unit_price, item.quantity, item.line_total
        );
    }
    println!("\nTotal: {}  ({} items)", page.subtotal, page.item_count);
}

async fn add_to_cart(session: &CartSession, id: ProductId) -> Result<(), ApiError> {
    match session.add_item(id).await {
        Ok(()) => {
            println!("Product added to cart!");
            println!("Cart: {}", CartBadge::from(&session.state()));
            Ok(())
        }
        // Completion-driven feedback: the prompt (our "button") is only
        // released here, once the outcome is actually known.
        Err(e) => {
            println!("Could not add product {id} to cart.");
            Err(e)
        }
    }
}

async fn remove_from_cart(session: &CartSession, id: ProductId) -> Result<(), ApiError> {
    session.remove_item(id).await?;
    println!("Product removed from cart!");
    show_cart_if_changed(session);
    Ok(())
}

fn show_cart_if_changed(session: &CartSession) {
    let page = CartPage::from(&session.state());
    if page.is_empty() {
        println!("Your cart is empty.");
    } else {
        println!("Cart: {} items, {}", page.item_count, page.subtotal);
    }
}

async fn show_count(session: &CartSession) {
    if let Err(e) = session.load().await {
        tracing::warn!("cart count unavailable: {e}");
    }
    println!("{}", CartBadge::from(&session.state()));
}

async fn checkout(session: &CartSession) -> Result<(), ApiError> {
    if let Err(e) = session.load().await {
        tracing::warn!("checking out last known cart state: {e}");
    }

    if session.lines().is_empty() {
        println!("Your cart is empty.");
        return Ok(());
    }

    match session.checkout().await {
        Ok(receipt) => {
            match receipt.order_id {
                Some(order_id) => println!("Order {order_id} processed successfully!"),
                None => println!("Order processed successfully!"),
            }

            // The rotated identifier (if any) is already persisted; a fresh
            // load reflects the post-checkout server state.
            if let Err(e) = session.load().await {
                tracing::warn!("failed to refresh cart after checkout: {e}");
            }
            println!("Cart: {}", CartBadge::from(&session.state()));
            Ok(())
        }
        Err(ApiError::Rejected(message)) => {
            println!("Checkout failed: {message}");
            Err(ApiError::Rejected(message))
        }
        Err(e) => {
            println!("Failed to process checkout. Please try again.");
            Err(e)
        }
    }
}
