//! Marigold CLI - the storefront from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! marigold products list --category shirts --sort-by price-asc
//! marigold products show linen-shirt
//! marigold products featured
//! marigold categories
//!
//! # Account
//! marigold register jdoe --email jdoe@example.com --password s3cretpass \
//!     --password2 s3cretpass --first-name Jo --last-name Doe
//! marigold login jdoe --password s3cretpass
//! marigold whoami
//!
//! # Cart and checkout
//! marigold cart add linen-shirt --color white --size M --quantity 2
//! marigold cart list
//! marigold checkout --first-name Jo --last-name Doe --email jdoe@example.com \
//!     --address "1 Main St" --city Springfield --state IL \
//!     --postal-code 62701 --country US --phone 555-0100
//! marigold orders list
//! ```
//!
//! # Environment Variables
//!
//! - `MARIGOLD_API_BASE` - Base URL of the storefront API
//! - `MARIGOLD_DATA_DIR` - Directory for tokens and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use marigold_client::{ApiClient, ClientConfig};

mod commands;
mod format;

#[derive(Parser)]
#[command(name = "marigold")]
#[command(author, version, about = "Marigold storefront from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// List product categories
    Categories,
    /// Create a new account
    Register(RegisterArgs),
    /// Log in and store the session tokens
    Login {
        /// Account username
        username: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Log out and clear stored tokens
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Manage the account profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Manage the local shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Create an order from the cart
    Checkout(CheckoutArgs),
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products with optional filters
    List(ListArgs),
    /// Show one product with images and variants
    Show {
        /// Product slug
        slug: String,
    },
    /// Show the featured products
    Featured,
}

#[derive(Args)]
struct ListArgs {
    /// Filter by category slug
    #[arg(long)]
    category: Option<String>,

    /// Free-text search over name, description, and category
    #[arg(long)]
    search: Option<String>,

    /// Minimum price, inclusive
    #[arg(long)]
    price_min: Option<Decimal>,

    /// Maximum price, inclusive
    #[arg(long)]
    price_max: Option<Decimal>,

    /// Only products currently in stock
    #[arg(long)]
    in_stock: bool,

    /// Sort order
    #[arg(long, value_enum)]
    sort_by: Option<commands::products::SortArg>,

    /// Page number (1-based)
    #[arg(long)]
    page: Option<u32>,
}

#[derive(Args)]
struct RegisterArgs {
    /// Account username
    username: String,

    /// Email address
    #[arg(long)]
    email: String,

    /// Password (min 8 characters)
    #[arg(long)]
    password: String,

    /// Password confirmation
    #[arg(long)]
    password2: String,

    /// First name
    #[arg(long)]
    first_name: String,

    /// Last name
    #[arg(long)]
    last_name: String,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Update names and profile fields
    Update(ProfileUpdateArgs),
    /// Change the account password
    Password {
        /// Current password
        #[arg(long)]
        old: String,

        /// New password
        #[arg(long)]
        new: String,

        /// Confirmation of the new password
        #[arg(long)]
        confirm: String,
    },
    /// Upload a profile picture
    Picture {
        /// Path to the image file
        path: PathBuf,
    },
}

#[derive(Args)]
struct ProfileUpdateArgs {
    /// First name
    #[arg(long)]
    first_name: String,

    /// Last name
    #[arg(long)]
    last_name: String,

    /// Phone number
    #[arg(long)]
    phone_number: Option<String>,

    /// Street address
    #[arg(long)]
    address: Option<String>,

    /// City
    #[arg(long)]
    city: Option<String>,

    /// State or province
    #[arg(long)]
    state: Option<String>,

    /// Postal code
    #[arg(long)]
    postal_code: Option<String>,

    /// Country
    #[arg(long)]
    country: Option<String>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    date_of_birth: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product variant to the cart
    Add {
        /// Product slug
        slug: String,

        /// Variant color
        #[arg(long)]
        color: String,

        /// Variant size
        #[arg(long)]
        size: String,

        /// Quantity (at least 1)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Show the cart contents and total
    List,
    /// Change the quantity of a cart line
    Update {
        /// Product id of the line
        product_id: i32,

        /// Variant color
        #[arg(long)]
        color: String,

        /// Variant size
        #[arg(long)]
        size: String,

        /// New quantity (at least 1)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Remove a cart line
    Remove {
        /// Product id of the line
        product_id: i32,

        /// Variant color
        #[arg(long)]
        color: String,

        /// Variant size
        #[arg(long)]
        size: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Args)]
struct CheckoutArgs {
    /// First name
    #[arg(long)]
    first_name: String,

    /// Last name
    #[arg(long)]
    last_name: String,

    /// Email address
    #[arg(long)]
    email: String,

    /// Street address
    #[arg(long)]
    address: String,

    /// City
    #[arg(long)]
    city: String,

    /// State or province
    #[arg(long)]
    state: String,

    /// Postal code
    #[arg(long)]
    postal_code: String,

    /// Country
    #[arg(long)]
    country: String,

    /// Phone number
    #[arg(long)]
    phone: String,

    /// Payment method (passed through to the backend)
    #[arg(long, default_value = "card")]
    payment_method: String,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List past orders
    List,
    /// Show one order in full
    Show {
        /// Order id
        id: i32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let api = ApiClient::new(&config);

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List(args) => commands::products::list(&api, &args).await?,
            ProductsAction::Show { slug } => commands::products::show(&api, &slug).await?,
            ProductsAction::Featured => commands::products::featured(&api).await?,
        },
        Commands::Categories => commands::products::categories(&api).await?,
        Commands::Register(args) => commands::account::register(&api, args).await?,
        Commands::Login { username, password } => {
            commands::account::login(&api, &username, &password).await?;
        }
        Commands::Logout => commands::account::logout(&api)?,
        Commands::Whoami => commands::account::whoami(&api).await?,
        Commands::Profile { action } => match action {
            ProfileAction::Update(args) => commands::account::update_profile(&api, args).await?,
            ProfileAction::Password { old, new, confirm } => {
                commands::account::change_password(&api, old, new, confirm).await?;
            }
            ProfileAction::Picture { path } => {
                commands::account::upload_picture(&api, &path).await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Add {
                slug,
                color,
                size,
                quantity,
            } => commands::cart::add(&api, &config, &slug, &color, &size, quantity).await?,
            CartAction::List => commands::cart::list(&config),
            CartAction::Update {
                product_id,
                color,
                size,
                quantity,
            } => commands::cart::update(&config, product_id, &color, &size, quantity)?,
            CartAction::Remove {
                product_id,
                color,
                size,
            } => commands::cart::remove(&config, product_id, &color, &size)?,
            CartAction::Clear => commands::cart::clear(&config)?,
        },
        Commands::Checkout(args) => commands::orders::checkout(&api, &config, args).await?,
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(&api).await?,
            OrdersAction::Show { id } => commands::orders::show(&api, id).await?,
        },
    }

    Ok(())
}
