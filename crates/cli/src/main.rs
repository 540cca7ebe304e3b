//! Velvet Mango CLI - Catalog management tools.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog
//! vm-cli products list
//!
//! # Add a product
//! vm-cli products add -n "Classic Tee" -p 500 -c tshirts -s 20
//!
//! # Replace a product's fields
//! vm-cli products update <id> -n "Classic Tee" -p 550 -c tshirts -s 18
//!
//! # Delete a product (destructive, requires --yes)
//! vm-cli products remove <id> --yes
//! ```
//!
//! # Commands
//!
//! - `products` - Manage the product catalog against the live backend

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use velvet_mango_core::ProductId;
use velvet_mango_storefront::backend::BackendClient;
use velvet_mango_storefront::config::AppConfig;
use velvet_mango_storefront::services::CatalogService;
use velvet_mango_storefront::telemetry;

mod commands;

#[derive(Parser)]
#[command(name = "vm-cli")]
#[command(author, version, about = "Velvet Mango CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List all products
    List,
    /// Add a new product
    Add {
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Replace an existing product's fields
    Update {
        /// Product id
        id: ProductId,

        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product
    Remove {
        /// Product id
        id: ProductId,

        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct ProductFields {
    /// Display name
    #[arg(short, long)]
    name: String,

    /// Long description
    #[arg(short, long, default_value = "")]
    description: String,

    /// Unit price in store currency
    #[arg(short, long)]
    price: Decimal,

    /// Product image URL
    #[arg(short, long)]
    image_url: Option<String>,

    /// Category label (`tshirts`, `hoodies`, `shirts`, `accessories`, ...)
    #[arg(short, long, default_value = "tshirts")]
    category: String,

    /// Units in stock
    #[arg(short, long)]
    stock: u32,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            std::process::exit(1);
        }
    };

    let _sentry_guard = telemetry::init(&config);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = BackendClient::new(&config.backend);
    let catalog = CatalogService::new(client);

    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List => commands::products::list(&catalog).await?,
            ProductAction::Add { fields } => {
                commands::products::add(&catalog, fields.into()).await?;
            }
            ProductAction::Update { id, fields } => {
                commands::products::update(&catalog, id, fields.into()).await?;
            }
            ProductAction::Remove { id, yes } => {
                commands::products::remove(&catalog, id, yes).await?;
            }
        },
    }
    Ok(())
}

impl From<ProductFields> for velvet_mango_storefront::backend::NewProduct {
    fn from(fields: ProductFields) -> Self {
        Self {
            name: fields.name,
            description: fields.description,
            price: velvet_mango_core::Price::new(fields.price),
            image_url: fields.image_url,
            category: fields.category,
            stock: fields.stock,
        }
    }
}
