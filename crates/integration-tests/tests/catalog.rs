//! End-to-end tests for catalog browsing and its response cache.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use marigold_client::{ApiError, ProductQuery, SortBy};
use marigold_integration_tests::{TestEnv, product_page_body, product_summary_body};
use rust_decimal::Decimal;

#[tokio::test]
async fn test_list_products_sends_filters() {
    let env = TestEnv::start().await;

    Mock::given(method("GET"))
        .and(path("/products/"))
        .and(query_param("category", "shirts"))
        .and(query_param("price_max", "80.00"))
        .and(query_param("in_stock", "true"))
        .and(query_param("sort_by", "price_asc"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_page_body()))
        .expect(1)
        .mount(&env.server)
        .await;

    let query = ProductQuery {
        category: Some("shirts".to_owned()),
        price_max: Some(Decimal::new(8000, 2)),
        in_stock: true,
        sort_by: Some(SortBy::PriceAsc),
        page: Some(2),
        ..ProductQuery::default()
    };
    let page = env.api.list_products(&query).await.expect("list");

    assert_eq!(page.count, 1);
    assert_eq!(
        page.results.first().map(|p| p.price),
        Some(Decimal::new(4990, 2))
    );
}

#[tokio::test]
async fn test_repeat_listing_is_served_from_cache() {
    let env = TestEnv::start().await;

    Mock::given(method("GET"))
        .and(path("/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_page_body()))
        .expect(1)
        .mount(&env.server)
        .await;

    let query = ProductQuery::default();
    let first = env.api.list_products(&query).await.expect("first");
    let second = env.api.list_products(&query).await.expect("second");

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_search_bypasses_the_cache() {
    let env = TestEnv::start().await;

    Mock::given(method("GET"))
        .and(path("/products/"))
        .and(query_param("search", "linen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_page_body()))
        .expect(2)
        .mount(&env.server)
        .await;

    let query = ProductQuery {
        search: Some("linen".to_owned()),
        ..ProductQuery::default()
    };
    env.api.list_products(&query).await.expect("first");
    env.api.list_products(&query).await.expect("second");
}

#[tokio::test]
async fn test_product_detail() {
    let env = TestEnv::start().await;

    let mut body = product_summary_body();
    body["description"] = serde_json::json!("A shirt.");
    body["image"] = serde_json::json!(null);
    body["is_active"] = serde_json::json!(true);
    body["created_at"] = serde_json::json!("2026-01-15T10:30:00Z");
    body["images"] = serde_json::json!([]);
    body["variants"] = serde_json::json!([
        {"id": 4, "color": "white", "size": "M", "stock": 12, "sku": "LS-W-M"}
    ]);

    Mock::given(method("GET"))
        .and(path("/products/linen-shirt/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&env.server)
        .await;

    let product = env.api.get_product("linen-shirt").await.expect("detail");
    assert_eq!(product.variant("white", "M").map(|v| v.stock), Some(12));

    // Served from cache the second time.
    let again = env.api.get_product("linen-shirt").await.expect("cached");
    assert_eq!(product, again);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let env = TestEnv::start().await;

    Mock::given(method("GET"))
        .and(path("/products/nope/"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"detail": "Not found."})),
        )
        .mount(&env.server)
        .await;

    let err = env.api.get_product("nope").await.expect_err("must fail");

    assert!(matches!(err, ApiError::NotFound(detail) if detail == "Not found."));
}

#[tokio::test]
async fn test_featured_products() {
    let env = TestEnv::start().await;

    Mock::given(method("GET"))
        .and(path("/products/featured/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([product_summary_body()])),
        )
        .expect(1)
        .mount(&env.server)
        .await;

    let products = env.api.featured_products().await.expect("featured");
    assert_eq!(products.len(), 1);

    // Cached on repeat.
    env.api.featured_products().await.expect("cached");
}

#[tokio::test]
async fn test_categories() {
    let env = TestEnv::start().await;

    Mock::given(method("GET"))
        .and(path("/products/categories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [
                {"id": 1, "name": "Shirts", "slug": "shirts", "description": null},
                {"id": 2, "name": "Trousers", "slug": "trousers", "description": "Legwear"}
            ]
        })))
        .mount(&env.server)
        .await;

    let page = env.api.list_categories().await.expect("categories");

    assert_eq!(page.count, 2);
    assert_eq!(
        page.results.last().map(|c| c.slug.clone()),
        Some("trousers".to_owned())
    );
}
