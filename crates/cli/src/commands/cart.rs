//! Local cart commands.
//!
//! The cart never touches the network except `add`, which fetches the
//! product to price the line and validate the variant.

use marigold_client::{ApiClient, CartItem, CartStore, ClientConfig};
use marigold_core::ProductId;

use crate::format;

pub(crate) async fn add(
    api: &ApiClient,
    config: &ClientConfig,
    slug: &str,
    color: &str,
    size: &str,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let product = api.get_product(slug).await?;

    let Some(variant) = product.variant(color, size) else {
        let available = product
            .variants
            .iter()
            .map(|v| format!("{}/{}", v.color, v.size))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(format!(
            "no {color}/{size} variant of {}; available: {available}",
            product.name
        )
        .into());
    };
    if variant.stock == 0 {
        return Err(format!("{} {color}/{size} is out of stock", product.name).into());
    }

    let image = product
        .images
        .iter()
        .find(|image| image.is_featured)
        .or_else(|| product.images.first())
        .map(|image| image.image.clone())
        .or_else(|| product.image.clone());

    let mut cart = CartStore::load(&config.data_dir);
    cart.add_item(CartItem {
        product_id: product.id,
        product_name: product.name.clone(),
        product_image: image,
        slug: product.slug.clone(),
        price: product.price,
        quantity,
        color: color.to_owned(),
        size: size.to_owned(),
    })?;

    println!(
        "Added {quantity} x {} ({color}/{size}) - cart total {}",
        product.name,
        format::currency(cart.total())
    );

    Ok(())
}

pub(crate) fn list(config: &ClientConfig) {
    let cart = CartStore::load(&config.data_dir);

    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in cart.items() {
        println!(
            "  {:>4}  {:<30} {}/{:<4} x{:<3} {:>10}",
            item.product_id,
            format::truncate(&item.product_name, 30),
            item.color,
            item.size,
            item.quantity,
            format::currency(item.line_total()),
        );
    }
    println!(
        "{} items - total {}",
        cart.unit_count(),
        format::currency(cart.total())
    );
}

pub(crate) fn update(
    config: &ClientConfig,
    product_id: i32,
    color: &str,
    size: &str,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let product_id = ProductId::new(product_id);
    let mut cart = CartStore::load(&config.data_dir);

    if !cart
        .items()
        .iter()
        .any(|item| item.key() == (product_id, color, size))
    {
        return Err(format!("no cart line for product {product_id} {color}/{size}").into());
    }

    cart.update_quantity(product_id, color, size, quantity)?;
    println!("Updated - cart total {}", format::currency(cart.total()));

    Ok(())
}

pub(crate) fn remove(
    config: &ClientConfig,
    product_id: i32,
    color: &str,
    size: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = CartStore::load(&config.data_dir);
    cart.remove_item(ProductId::new(product_id), color, size)?;
    println!("Removed - cart total {}", format::currency(cart.total()));

    Ok(())
}

pub(crate) fn clear(config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = CartStore::load(&config.data_dir);
    cart.clear()?;
    println!("Cart cleared");

    Ok(())
}
