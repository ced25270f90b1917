//! Wire models for the storefront REST API.
//!
//! Shapes follow the backend serializers: the product listing returns a
//! summary shape, the detail endpoint adds description, images, and
//! variants. Prices arrive as decimal strings and are kept as
//! [`rust_decimal::Decimal`] throughout.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marigold_core::{CategoryId, OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

/// Paginated response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of results across all pages.
    pub count: u64,
    /// URL of the next page, if any.
    pub next: Option<String>,
    /// URL of the previous page, if any.
    pub previous: Option<String>,
    /// Results for this page.
    pub results: Vec<T>,
}

/// Profile sub-record attached to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// URL of the uploaded profile picture.
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Server-owned user record. The client holds a cached copy only; every
/// mutation is a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile: UserProfile,
}

impl User {
    /// Display name: "First Last", falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        if full.trim().is_empty() {
            self.username.clone()
        } else {
            full.trim().to_owned()
        }
    }
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One image attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: i32,
    pub image: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

/// A purchasable color/size combination of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: i32,
    pub color: String,
    pub size: String,
    pub stock: u32,
    pub sku: String,
}

/// Product shape returned by listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub category: Category,
    pub price: Decimal,
    #[serde(default)]
    pub featured_image: Option<ProductImage>,
    pub in_stock: bool,
}

/// Full product shape returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub category: Category,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    pub in_stock: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// Find the variant matching a (color, size) pair.
    #[must_use]
    pub fn variant(&self, color: &str, size: &str) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|v| v.color == color && v.size == size)
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i32,
    pub product: ProductSummary,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

/// Payment attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i32,
    pub payment_method: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Order shape returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub payment: Option<Payment>,
}

/// Full order shape returned by creation and the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub total_price: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub payment: Option<Payment>,
}
