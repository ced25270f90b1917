//! Checkout and order history commands.

use marigold_client::{ApiClient, CartStore, ClientConfig, NewOrder, NewOrderItem};
use marigold_core::OrderId;

use crate::CheckoutArgs;
use crate::format;

pub(crate) async fn checkout(
    api: &ApiClient,
    config: &ClientConfig,
    args: CheckoutArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let _session = super::authenticated_session(api).await?;

    let mut cart = CartStore::load(&config.data_dir);
    if cart.is_empty() {
        return Err("cart is empty; add something first".into());
    }

    let items = cart
        .items()
        .iter()
        .map(|item| NewOrderItem {
            product: item.product_id,
            quantity: item.quantity,
            color: Some(item.color.clone()),
            size: Some(item.size.clone()),
        })
        .collect();

    let order = NewOrder {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        address: args.address,
        city: args.city,
        state: args.state,
        postal_code: args.postal_code,
        country: args.country,
        phone: args.phone,
        items,
        payment_method: args.payment_method,
    };

    let created = api.create_order(&order).await?;
    // The order is placed; the local cart is done.
    cart.clear()?;

    println!(
        "Order #{} created - {} - total {}",
        created.id,
        created.status,
        format::currency(created.total_price)
    );

    Ok(())
}

pub(crate) async fn list(api: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    let _session = super::authenticated_session(api).await?;

    let page = api.list_orders().await?;
    if page.results.is_empty() {
        println!("No orders yet");
        return Ok(());
    }

    for order in &page.results {
        println!(
            "  #{:<6} {:<12} {:<10} {:>10}",
            order.id,
            format::date(order.created_at),
            order.status,
            format::currency(order.total_price),
        );
    }

    Ok(())
}

pub(crate) async fn show(api: &ApiClient, id: i32) -> Result<(), Box<dyn std::error::Error>> {
    let _session = super::authenticated_session(api).await?;

    let order = api.get_order(OrderId::new(id)).await?;

    println!("Order #{} - {}", order.id, order.status);
    println!("  placed: {}", format::date(order.created_at));
    println!(
        "  ship to: {} {}, {}, {} {} {}, {}",
        order.first_name,
        order.last_name,
        order.address,
        order.city,
        order.state,
        order.postal_code,
        order.country
    );
    println!("  contact: {} / {}", order.email, order.phone);

    println!("\nItems:");
    for item in &order.items {
        let variant = match (&item.color, &item.size) {
            (Some(color), Some(size)) => format!(" ({color}/{size})"),
            (Some(color), None) => format!(" ({color})"),
            (None, Some(size)) => format!(" ({size})"),
            (None, None) => String::new(),
        };
        println!(
            "  {:<30}{variant} x{} @ {}",
            format::truncate(&item.product.name, 30),
            item.quantity,
            format::currency(item.price),
        );
    }

    if let Some(payment) = &order.payment {
        println!(
            "\nPayment: {} - {} - {}",
            payment.payment_method,
            payment.status,
            format::currency(payment.amount)
        );
    }
    println!("\nTotal: {}", format::currency(order.total_price));

    Ok(())
}
