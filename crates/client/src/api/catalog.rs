//! Product and category browsing.
//!
//! Listing, detail, featured, and category reads. Responses are cached for
//! five minutes; search queries bypass the cache so stale results never
//! shadow a live search.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{Category, Page, Product, ProductSummary};

use super::cache::CacheValue;
use super::{ApiClient, RequestSpec};

/// Sort orders accepted by the product listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Alphabetical by name (backend default).
    #[default]
    Name,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Most recently added first.
    Newest,
}

impl SortBy {
    const fn as_param(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Newest => "newest",
        }
    }
}

/// Filters for the product listing endpoint. All fields optional; only set
/// fields are sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    /// Category slug.
    pub category: Option<String>,
    /// Free-text search over name, description, and category.
    pub search: Option<String>,
    /// Minimum price, inclusive.
    pub price_min: Option<Decimal>,
    /// Maximum price, inclusive.
    pub price_max: Option<Decimal>,
    /// Only products currently in stock.
    pub in_stock: bool,
    /// Sort order.
    pub sort_by: Option<SortBy>,
    /// 1-based page number.
    pub page: Option<u32>,
}

impl ProductQuery {
    fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = &self.category {
            pairs.push(("category".to_owned(), category.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_owned(), search.clone()));
        }
        if let Some(price_min) = self.price_min {
            pairs.push(("price_min".to_owned(), price_min.to_string()));
        }
        if let Some(price_max) = self.price_max {
            pairs.push(("price_max".to_owned(), price_max.to_string()));
        }
        if self.in_stock {
            pairs.push(("in_stock".to_owned(), "true".to_owned()));
        }
        if let Some(sort_by) = self.sort_by {
            pairs.push(("sort_by".to_owned(), sort_by.as_param().to_owned()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_owned(), page.to_string()));
        }
        pairs
    }

    fn cache_key(&self) -> String {
        format!("products:{self:?}")
    }

    const fn is_search(&self) -> bool {
        self.search.is_some()
    }
}

impl ApiClient {
    /// List products with optional filters.
    ///
    /// Non-search listings are cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> Result<Page<ProductSummary>, ApiError> {
        let cache_key = query.cache_key();

        if !query.is_search()
            && let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await
        {
            debug!("cache hit for products");
            return Ok(page);
        }

        let spec = RequestSpec::get("products/").with_query(query.to_pairs());
        let page: Page<ProductSummary> = self.send(&spec).await?;

        if !query.is_search() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Fetch a single product by slug (detail shape with images and
    /// variants).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown slug.
    pub async fn get_product(&self, slug: &str) -> Result<Product, ApiError> {
        let cache_key = format!("product:{slug}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .send(&RequestSpec::get(format!("products/{slug}/")))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Fetch the in-stock featured products (at most eight).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn featured_products(&self) -> Result<Vec<ProductSummary>, ApiError> {
        const CACHE_KEY: &str = "products:featured";

        if let Some(CacheValue::Featured(products)) = self.inner.cache.get(CACHE_KEY).await {
            debug!("cache hit for featured products");
            return Ok(products);
        }

        let products: Vec<ProductSummary> =
            self.send(&RequestSpec::get("products/featured/")).await?;

        self.inner
            .cache
            .insert(CACHE_KEY.to_owned(), CacheValue::Featured(products.clone()))
            .await;

        Ok(products)
    }

    /// List product categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn list_categories(&self) -> Result<Page<Category>, ApiError> {
        const CACHE_KEY: &str = "categories";

        if let Some(CacheValue::Categories(page)) = self.inner.cache.get(CACHE_KEY).await {
            debug!("cache hit for categories");
            return Ok(page);
        }

        let page: Page<Category> = self
            .send(&RequestSpec::get("products/categories/"))
            .await?;

        self.inner
            .cache
            .insert(CACHE_KEY.to_owned(), CacheValue::Categories(page.clone()))
            .await;

        Ok(page)
    }
}
