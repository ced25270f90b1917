//! Catalog browsing commands.

use clap::ValueEnum;

use marigold_client::{ApiClient, ProductQuery, SortBy};

use crate::ListArgs;
use crate::format;

/// Sort orders exposed on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    /// Alphabetical by name
    Name,
    /// Cheapest first
    PriceAsc,
    /// Most expensive first
    PriceDesc,
    /// Most recently added first
    Newest,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => Self::Name,
            SortArg::PriceAsc => Self::PriceAsc,
            SortArg::PriceDesc => Self::PriceDesc,
            SortArg::Newest => Self::Newest,
        }
    }
}

pub(crate) async fn list(
    api: &ApiClient,
    args: &ListArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = ProductQuery {
        category: args.category.clone(),
        search: args.search.clone(),
        price_min: args.price_min,
        price_max: args.price_max,
        in_stock: args.in_stock,
        sort_by: args.sort_by.map(Into::into),
        page: args.page,
    };

    let page = api.list_products(&query).await?;

    println!(
        "{} products (page {} of results)",
        page.count,
        args.page.unwrap_or(1)
    );
    for product in &page.results {
        let stock = if product.in_stock { "" } else { "  [out of stock]" };
        println!(
            "  {:>4}  {:<40} {:>10}  {}{stock}",
            product.id,
            format::truncate(&product.name, 40),
            format::currency(product.price),
            product.category.name,
        );
    }
    if page.next.is_some() {
        println!("  ... more on page {}", args.page.unwrap_or(1) + 1);
    }

    Ok(())
}

pub(crate) async fn show(api: &ApiClient, slug: &str) -> Result<(), Box<dyn std::error::Error>> {
    let product = api.get_product(slug).await?;

    println!("{} ({})", product.name, format::currency(product.price));
    println!("  category: {}", product.category.name);
    println!("  slug: {}", product.slug);
    println!("  added: {}", format::date(product.created_at));
    if !product.in_stock {
        println!("  OUT OF STOCK");
    }
    if let Some(description) = &product.description {
        println!("\n{description}");
    }
    if !product.variants.is_empty() {
        println!("\nVariants:");
        for variant in &product.variants {
            println!(
                "  {:<10} {:<6} stock {:<5} sku {}",
                variant.color, variant.size, variant.stock, variant.sku
            );
        }
    }
    if !product.images.is_empty() {
        println!("\nImages:");
        for image in &product.images {
            let featured = if image.is_featured { " (featured)" } else { "" };
            println!("  {}{featured}", image.image);
        }
    }

    Ok(())
}

pub(crate) async fn featured(api: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    let products = api.featured_products().await?;

    println!("Featured products:");
    for product in &products {
        println!(
            "  {:<40} {:>10}",
            format::truncate(&product.name, 40),
            format::currency(product.price)
        );
    }

    Ok(())
}

pub(crate) async fn categories(api: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    let page = api.list_categories().await?;

    for category in &page.results {
        match &category.description {
            Some(description) => println!(
                "  {:<20} {}",
                category.slug,
                format::truncate(description, 60)
            ),
            None => println!("  {}", category.slug),
        }
    }

    Ok(())
}
