//! Cartline CLI - drive cart and account workflows against a live project.
//!
//! # Usage
//!
//! ```bash
//! # Add a product to the cart (creates the cart on first use)
//! cartline cart add 9f1c1a0e-product-id
//!
//! # Change quantities and inspect the result
//! cartline cart increase 9f1c1a0e-product-id
//! cartline cart show
//!
//! # Register with separate default shipping and billing addresses
//! cartline account register -e jane@example.com -p 'Secret#123' \
//!     --first-name Jane --last-name Doe \
//!     --street "1 Main St" --city Springfield --postal-code 12345 \
//!     --billing-street "2 Side St" --billing-city Springfield --billing-postal-code 12345 \
//!     --ship-default --bill-default
//! ```
//!
//! Platform credentials come from `COMMERCE_*` environment variables (a
//! `.env` file is read if present). The cart ID and signed-in customer are
//! kept in `--state-file` between runs.
//!
//! # Commands
//!
//! - `cart` - Create, fill, inspect and discount carts
//! - `account` - Register, sign in and out, set default addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod view;

#[derive(Parser)]
#[command(name = "cartline")]
#[command(author, version, about = "Cartline storefront CLI")]
struct Cli {
    /// File holding the cart ID and signed-in customer between runs
    #[arg(long, global = true, default_value = ".cartline.json")]
    state_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with the current cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the customer account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Create a new cart and make it current
    Create,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: String,
    },
    /// Remove a product's line
    Remove {
        /// Product ID
        product_id: String,
    },
    /// Increase a product's quantity by one
    Increase {
        /// Product ID
        product_id: String,
    },
    /// Decrease a product's quantity by one
    Decrease {
        /// Product ID
        product_id: String,
    },
    /// Remove every line from the cart
    Clear,
    /// Show the current cart
    Show,
    /// Show the signed-in customer's cart
    Mine,
    /// List carts in the project
    List,
    /// Show the cart total
    Total,
    /// Apply a discount code (the configured default when omitted)
    Discount {
        /// Discount code
        code: Option<String>,
    },
    /// Attach the current cart to a customer
    Assign {
        /// Customer ID
        customer_id: String,
    },
    /// Merge the current cart into the signed-in customer's cart
    Merge,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a customer account
    Register(RegisterArgs),
    /// Sign in as an existing customer
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Forget the signed-in customer and cart
    Logout,
    /// Set default addresses for a customer
    Defaults {
        /// Customer ID (the signed-in customer when omitted)
        #[arg(long)]
        customer_id: Option<String>,

        #[command(flatten)]
        checkboxes: CheckboxArgs,
    },
}

/// Registration form fields.
#[derive(Args)]
struct RegisterArgs {
    /// Email address
    #[arg(short, long)]
    email: String,

    /// Password
    #[arg(short, long)]
    password: String,

    /// First name
    #[arg(long)]
    first_name: String,

    /// Last name
    #[arg(long)]
    last_name: String,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    date_of_birth: Option<String>,

    #[command(flatten)]
    shipping: ShippingArgs,

    #[command(flatten)]
    billing: BillingArgs,

    #[command(flatten)]
    checkboxes: CheckboxArgs,
}

/// Shipping address fields.
#[derive(Args)]
struct ShippingArgs {
    /// Shipping street
    #[arg(long)]
    street: Option<String>,

    /// Shipping city
    #[arg(long)]
    city: Option<String>,

    /// Shipping postal code
    #[arg(long)]
    postal_code: Option<String>,

    /// Shipping country (US, CA, GB, DE, AU)
    #[arg(long, default_value = "US")]
    country: String,
}

/// Billing address fields, used when billing differs from shipping.
#[derive(Args)]
struct BillingArgs {
    /// Billing street
    #[arg(long)]
    billing_street: Option<String>,

    /// Billing city
    #[arg(long)]
    billing_city: Option<String>,

    /// Billing postal code
    #[arg(long)]
    billing_postal_code: Option<String>,

    /// Billing country (US, CA, GB, DE, AU)
    #[arg(long, default_value = "US")]
    billing_country: String,
}

/// Default-address checkboxes.
#[derive(Args)]
struct CheckboxArgs {
    /// Make the shipping address the default shipping address
    #[arg(long)]
    ship_default: bool,

    /// Billing address differs from shipping
    #[arg(long)]
    separate_billing: bool,

    /// Make the billing address the default billing address
    #[arg(long)]
    bill_default: bool,
}

#[tokio::main]
async fn main() {
    // .env may carry RUST_LOG as well as the platform credentials
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cartline_storefront=info,cartline_cli=info")),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = commands::Context::load(cli.state_file)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Create => commands::cart::create(&mut ctx).await?,
            CartAction::Add { product_id } => commands::cart::add(&mut ctx, &product_id).await?,
            CartAction::Remove { product_id } => {
                commands::cart::remove(&mut ctx, &product_id).await?;
            }
            CartAction::Increase { product_id } => {
                commands::cart::increase(&mut ctx, &product_id).await?;
            }
            CartAction::Decrease { product_id } => {
                commands::cart::decrease(&mut ctx, &product_id).await?;
            }
            CartAction::Clear => commands::cart::clear(&mut ctx).await?,
            CartAction::Show => commands::cart::show(&ctx).await?,
            CartAction::Mine => commands::cart::mine(&ctx).await?,
            CartAction::List => commands::cart::list(&ctx).await?,
            CartAction::Total => commands::cart::total(&mut ctx).await?,
            CartAction::Discount { code } => {
                commands::cart::discount(&mut ctx, code.as_deref()).await?;
            }
            CartAction::Assign { customer_id } => {
                commands::cart::assign(&mut ctx, &customer_id).await?;
            }
            CartAction::Merge => commands::cart::merge(&mut ctx).await?,
        },
        Commands::Account { action } => match action {
            AccountAction::Register(args) => {
                let RegisterArgs {
                    email,
                    password,
                    first_name,
                    last_name,
                    date_of_birth,
                    shipping,
                    billing,
                    checkboxes,
                } = args;
                let form = commands::account::RegistrationForm {
                    email,
                    password,
                    first_name,
                    last_name,
                    date_of_birth,
                    shipping: commands::account::AddressFields {
                        street: shipping.street,
                        city: shipping.city,
                        postal_code: shipping.postal_code,
                        country: shipping.country,
                    },
                    billing: commands::account::AddressFields {
                        street: billing.billing_street,
                        city: billing.billing_city,
                        postal_code: billing.billing_postal_code,
                        country: billing.billing_country,
                    },
                    checkboxes: checkboxes.into_state(),
                };
                commands::account::register(&mut ctx, form).await?;
            }
            AccountAction::Login { email, password } => {
                commands::account::login(&mut ctx, &email, &password).await?;
            }
            AccountAction::Logout => commands::account::logout(&mut ctx)?,
            AccountAction::Defaults {
                customer_id,
                checkboxes,
            } => {
                commands::account::defaults(&ctx, customer_id, checkboxes.into_state()).await?;
            }
        },
    }
    Ok(())
}

impl CheckboxArgs {
    const fn into_state(self) -> cartline_storefront::services::account::CheckboxState {
        cartline_storefront::services::account::CheckboxState {
            ship_default: self.ship_default,
            ship_as_bill: !self.separate_billing,
            bill_default: self.bill_default,
        }
    }
}
