//! Cartwright CLI
//!
//! Quotes shipping and places orders against a YAML catalog set.

use std::{io, path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cartwright::{
    checkout::{Checkout, CheckoutError, CheckoutRequest, ShippingSelection},
    fixtures::{Catalog, FixtureError, products::parse_money},
    orders::{CheckoutContext, Customer, ShippingAddress},
    receipt::ReceiptError,
    shipping::MethodId,
};

#[derive(Debug, Parser)]
#[command(name = "cartwright", about = "Cart pricing and checkout", long_about = None)]
struct Cli {
    #[command(flatten)]
    catalog: CatalogArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct CatalogArgs {
    /// Directory holding products/, shipping/ and settings/
    #[arg(long, env = "CARTWRIGHT_FIXTURES", default_value = "./fixtures", global = true)]
    fixtures: PathBuf,

    /// Catalog set name
    #[arg(long, env = "CARTWRIGHT_SET", default_value = "showroom", global = true)]
    set: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price every shipping method for a cart
    Quote(QuoteArgs),

    /// Place an order and print its receipt
    Checkout(CheckoutArgs),
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Destination shipping area
    #[arg(long)]
    area: String,

    /// Cart items as `product` or `product:variation`, one unit each
    #[arg(required = true)]
    items: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    /// Destination shipping area
    #[arg(long)]
    area: String,

    /// Shipping method; the first available one when omitted
    #[arg(long, conflicts_with = "manual")]
    method: Option<String>,

    /// Enter the order as an administrator
    #[arg(long)]
    manual: bool,

    /// Manual shipping fee (e.g. "75.00 USD"); the configured fee when omitted
    #[arg(long, requires = "manual")]
    fee: Option<String>,

    /// Customer name
    #[arg(long, default_value = "Walk-in Customer")]
    name: String,

    /// Customer email
    #[arg(long, default_value = "orders@example.com")]
    email: String,

    /// Street address
    #[arg(long, default_value = "1 Showroom Way")]
    street: String,

    /// City; the area name when omitted
    #[arg(long)]
    city: Option<String>,

    /// Postal code
    #[arg(long, default_value = "")]
    postcode: String,

    /// Cart items as `product` or `product:variation`, one unit each
    #[arg(required = true)]
    items: Vec<String>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}

pub fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            #[expect(
                clippy::print_stderr,
                reason = "command errors are reported to the terminal"
            )]
            {
                eprintln!("{error}");
            }

            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut catalog = Catalog::with_base_path(&cli.catalog.fixtures);

    catalog
        .load_products(&cli.catalog.set)?
        .load_shipping(&cli.catalog.set)?
        .load_settings(&cli.catalog.set)?;

    info!(set = %cli.catalog.set, "catalog loaded");

    let config = catalog.config()?;
    let checkout = Checkout::new(&config, catalog.methods());

    match cli.command {
        Commands::Quote(args) => {
            let area = catalog.area(&args.area)?;
            let cart = catalog.cart(args.items.as_slice())?;
            let quote = checkout.quote(&cart, &area.id)?;

            quote.write_to(io::stdout().lock())?;
        }
        Commands::Checkout(args) => {
            let area = catalog.area(&args.area)?;
            let cart = catalog.cart(args.items.as_slice())?;

            let (context, shipping) = if args.manual {
                let fee = args.fee.as_deref().map(parse_money).transpose()?;

                (CheckoutContext::Manual, ShippingSelection::Manual(fee))
            } else {
                (
                    CheckoutContext::Storefront,
                    ShippingSelection::Method(args.method.as_deref().map(MethodId::from)),
                )
            };

            let order = checkout.place_order(
                &cart,
                CheckoutRequest {
                    context,
                    customer: Customer {
                        name: args.name,
                        email: args.email,
                        phone: None,
                    },
                    address: ShippingAddress {
                        line1: args.street,
                        line2: None,
                        city: args.city.unwrap_or_else(|| area.name.clone()),
                        postcode: args.postcode,
                        area: area.id.clone(),
                    },
                    shipping,
                },
            )?;

            order.write_to(io::stdout().lock())?;
        }
    }

    Ok(())
}
