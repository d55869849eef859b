//! Catalog CLI
//!
//! Operator tool for the product catalog: applies migrations, probes the
//! database and drives every catalog operation. Results print as JSON.

use std::collections::BTreeMap;

use clap::{Args, Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use domain_catalog::{
    CreateProductRequest, ListProductsRequest, PgCatalogService, Product, UpdateProductRequest,
    UpdateStockRequest,
};
use eyre::{Result, WrapErr};
use serde::Serialize;
use tracing::info;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Manage the product catalog from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Check connectivity and schema state
    Health,

    /// Create a product and print its id
    Create {
        #[arg(long)]
        name: String,

        /// Price in minor currency units
        #[arg(long)]
        price: i64,

        #[arg(long, default_value_t = 0)]
        stock: i32,

        #[command(flatten)]
        details: ProductDetails,
    },

    /// Show one product
    Get { id: i64 },

    /// Change a product's editable fields; unspecified fields keep their value
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        price: Option<i64>,

        #[arg(long)]
        rating: Option<f32>,

        #[command(flatten)]
        details: ProductDetails,
    },

    /// Soft-delete a product
    Delete { id: i64 },

    /// List products with filters, sorting and paging
    List {
        #[arg(long, default_value = "")]
        category: String,

        /// Case-insensitive substring of name or description
        #[arg(short, long, default_value = "")]
        keyword: String,

        #[arg(long)]
        on_sale_only: bool,

        #[arg(long, default_value_t = 0)]
        min_price: i64,

        #[arg(long, default_value_t = 0)]
        max_price: i64,

        /// price, create_time, sales or rating (default: newest first)
        #[arg(short, long, default_value = "")]
        sort_by: String,

        #[arg(short, long)]
        ascending: bool,

        #[arg(short, long, default_value_t = 1)]
        page: i64,

        #[arg(long, default_value_t = 10)]
        page_size: i64,
    },

    /// List the distinct categories of live products
    Categories,

    /// Apply a signed stock change: negative sells, positive restocks
    AdjustStock {
        id: i64,

        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },
}

/// Optional product fields shared by `create` and `update`
#[derive(Args, Debug, Default)]
struct ProductDetails {
    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    image_url: Option<String>,

    /// Comma-separated image URLs
    #[arg(long, value_delimiter = ',')]
    gallery: Option<Vec<String>>,

    #[arg(long)]
    category: Option<String>,

    /// Take the product off sale
    #[arg(long, conflicts_with = "on_sale")]
    off_sale: bool,

    /// Put the product back on sale
    #[arg(long)]
    on_sale: bool,

    /// Attribute as key=value, repeatable
    #[arg(long = "attr", value_parser = parse_attribute)]
    attributes: Vec<(String, String)>,
}

impl ProductDetails {
    fn sale_flag(&self) -> Option<bool> {
        match (self.on_sale, self.off_sale) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    fn attributes(&self) -> Option<BTreeMap<String, String>> {
        (!self.attributes.is_empty()).then(|| self.attributes.iter().cloned().collect())
    }
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

fn create_request(name: String, price: i64, stock: i32, details: ProductDetails) -> CreateProductRequest {
    CreateProductRequest {
        name,
        price,
        stock,
        is_on_sale: details.sale_flag().unwrap_or(true),
        attributes: details.attributes().unwrap_or_default(),
        description: details.description.unwrap_or_default(),
        image_url: details.image_url.unwrap_or_default(),
        gallery: details.gallery.unwrap_or_default(),
        category: details.category.unwrap_or_default(),
    }
}

/// Overlay the supplied flags onto the stored product
fn update_request(
    current: Product,
    name: Option<String>,
    price: Option<i64>,
    rating: Option<f32>,
    details: ProductDetails,
) -> UpdateProductRequest {
    UpdateProductRequest {
        id: current.id,
        is_on_sale: details.sale_flag().unwrap_or(current.is_on_sale),
        attributes: details.attributes().unwrap_or(current.attributes),
        name: name.unwrap_or(current.name),
        price: price.unwrap_or(current.price),
        rating,
        description: details.description.unwrap_or(current.description),
        image_url: details.image_url.unwrap_or(current.image_url),
        gallery: details.gallery.unwrap_or(current.gallery),
        category: details.category.unwrap_or(current.category),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let config = Config::from_env().wrap_err("Invalid configuration")?;

    info!(url = %config.database.redacted_url(), "Connecting to database...");
    let db = database::postgres::connect_from_config_with_retry(
        config.database.clone(),
        Some(config.retry.clone()),
    )
    .await
    .wrap_err("Database connection failed")?;

    match cli.command {
        Commands::Migrate => {
            database::postgres::run_migrations::<migration::Migrator>(&db).await?;
            return Ok(());
        }
        Commands::Health => {
            let status = database::postgres::check_health_detailed(&db).await;
            print_json(&status)?;
            if !status.healthy {
                eyre::bail!("database is unhealthy");
            }
            return Ok(());
        }
        _ => {}
    }

    let service = PgCatalogService::postgres(db);

    match cli.command {
        Commands::Create {
            name,
            price,
            stock,
            details,
        } => {
            let resp = service
                .create_product(create_request(name, price, stock, details))
                .await?;
            info!(product_id = resp.product_id, "Product created");
            print_json(&resp)?;
        }

        Commands::Get { id } => {
            print_json(&service.get_product(id).await?)?;
        }

        Commands::Update {
            id,
            name,
            price,
            rating,
            details,
        } => {
            let current = service.get_product(id).await?;
            let resp = service
                .update_product(update_request(current, name, price, rating, details))
                .await?;
            print_json(&resp)?;
        }

        Commands::Delete { id } => {
            print_json(&service.delete_product(id).await?)?;
        }

        Commands::List {
            category,
            keyword,
            on_sale_only,
            min_price,
            max_price,
            sort_by,
            ascending,
            page,
            page_size,
        } => {
            let resp = service
                .list_products(ListProductsRequest {
                    category,
                    keyword,
                    on_sale_only,
                    min_price,
                    max_price,
                    sort_by,
                    ascending,
                    page,
                    page_size,
                })
                .await?;
            print_json(&resp)?;
        }

        Commands::Categories => {
            print_json(&service.get_categories().await?)?;
        }

        Commands::AdjustStock { id, delta } => {
            let resp = service
                .update_stock(UpdateStockRequest {
                    product_id: id,
                    quantity: delta,
                })
                .await?;
            print_json(&resp)?;
        }

        Commands::Migrate | Commands::Health => {}
    }

    Ok(())
}
