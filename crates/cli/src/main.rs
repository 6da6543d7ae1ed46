//! RedSeam CLI - storefront surface for browsing, cart, and checkout.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! redseam products list --page 2 --sort price-asc
//! redseam products show 42
//!
//! # Account
//! redseam login -e ada@example.com -p secret
//! redseam register -u ada -e ada@example.com -p secret
//! redseam logout
//!
//! # Cart
//! redseam cart add 42 --quantity 2 --color Red --size M
//! redseam cart update 42 --quantity 3 --color Red --size M
//! redseam cart remove 42 --color Red --size M
//! redseam cart show
//!
//! # Checkout
//! redseam checkout --name Ada --surname Lovelace --zip-code 0193 \
//!     --address "12 Analytical St"
//! ```
//!
//! Configuration comes from the environment (`REDSEAM_API_URL`,
//! `REDSEAM_STATE_DIR`); see the storefront crate's config module.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use redseam_storefront::api::ProductSort;
use redseam_storefront::{StorefrontApp, StorefrontConfig};

mod commands;

#[derive(Parser)]
#[command(name = "redseam")]
#[command(author, version, about = "RedSeam storefront CLI")]
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
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Log in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and log it in
    Register {
        /// Display name
        #[arg(short, long)]
        username: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Avatar image file
        #[arg(long)]
        avatar: Option<std::path::PathBuf>,
    },
    /// Log out and clear local state
    Logout,
    /// Submit the cart as an order
    Checkout {
        /// First name
        #[arg(long)]
        name: String,

        /// Surname
        #[arg(long)]
        surname: String,

        /// Contact email (defaults to the logged-in account's email)
        #[arg(long)]
        email: Option<String>,

        /// Zip code
        #[arg(long)]
        zip_code: String,

        /// Delivery address
        #[arg(long)]
        address: String,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Sort order
        #[arg(short, long, value_enum)]
        sort: Option<SortArg>,

        /// Minimum price filter
        #[arg(long)]
        min_price: Option<Decimal>,

        /// Maximum price filter
        #[arg(long)]
        max_price: Option<Decimal>,
    },
    /// Show one product's detail
    Show {
        /// Product ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart contents and totals
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        id: i64,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Variant color (defaults to the product's first color)
        #[arg(long)]
        color: Option<String>,

        /// Variant size (defaults to the product's first size)
        #[arg(long)]
        size: Option<String>,
    },
    /// Set a cart line's quantity
    Update {
        /// Product ID
        id: i64,

        /// New quantity
        #[arg(short, long)]
        quantity: u32,

        /// Variant color of the line
        #[arg(long)]
        color: Option<String>,

        /// Variant size of the line
        #[arg(long)]
        size: Option<String>,
    },
    /// Remove a cart line
    Remove {
        /// Product ID
        id: i64,

        /// Variant color of the line
        #[arg(long)]
        color: Option<String>,

        /// Variant size of the line
        #[arg(long)]
        size: Option<String>,
    },
}

/// Sort orders accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    /// Cheapest first
    PriceAsc,
    /// Most expensive first
    PriceDesc,
    /// Newest first
    Newest,
}

impl From<SortArg> for ProductSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::PriceAsc => Self::PriceLowToHigh,
            SortArg::PriceDesc => Self::PriceHighToLow,
            SortArg::Newest => Self::Newest,
        }
    }
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
    let config = StorefrontConfig::from_env()?;
    let app = StorefrontApp::new(config);
    app.tracker().initialize().await;

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List {
                page,
                sort,
                min_price,
                max_price,
            } => {
                commands::catalog::list(&app, page, sort.map(Into::into), min_price, max_price)
                    .await?;
            }
            ProductsAction::Show { id } => commands::catalog::show(&app, id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&app),
            CartAction::Add {
                id,
                quantity,
                color,
                size,
            } => commands::cart::add(&app, id, quantity, color, size).await?,
            CartAction::Update {
                id,
                quantity,
                color,
                size,
            } => commands::cart::update(&app, id, quantity, color, size).await?,
            CartAction::Remove { id, color, size } => {
                commands::cart::remove(&app, id, color, size).await?;
            }
        },
        Commands::Login { email, password } => {
            commands::account::login(&app, &email, &password).await?;
        }
        Commands::Register {
            username,
            email,
            password,
            avatar,
        } => commands::account::register(&app, username, email, password, avatar).await?,
        Commands::Logout => commands::account::logout(&app)?,
        Commands::Checkout {
            name,
            surname,
            email,
            zip_code,
            address,
        } => commands::checkout::submit(&app, name, surname, email, zip_code, address).await?,
    }

    Ok(())
}
