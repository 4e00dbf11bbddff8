use std::sync::Arc;

use chrono::{Duration, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;

use souvenir_api::app::services::CatalogService;
use souvenir_catalog::{
    Category, CategorySummary, DiscountType, PriceTier, Product, ProductImage, ProductStatus,
};
use souvenir_core::{CategoryId, ImageId, PriceTierId, ProductId};
use souvenir_infra::InMemoryCatalogRepository;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(repo: Arc<InMemoryCatalogRepository>) -> Self {
        // Same router as prod, over an in-memory catalog, on an ephemeral port.
        let app = souvenir_api::app::router(Arc::new(CatalogService::new(repo)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn get(&self, path: &str) -> (StatusCode, serde_json::Value) {
        let res = reqwest::get(format!("{}{}", self.base_url, path)).await.unwrap();
        let status = res.status();
        let body = res.json().await.unwrap_or(serde_json::Value::Null);
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn category(slug: &str, name: &str) -> Category {
    Category {
        id: CategoryId::new(),
        slug: slug.to_string(),
        name: name.to_string(),
        description: None,
        parent_id: None,
        is_active: true,
        sort_order: 0,
    }
}

fn product(slug: &str, price: Decimal, category: &Category, age_minutes: i64) -> Product {
    Product {
        id: ProductId::new(),
        slug: slug.to_string(),
        sku: slug.to_uppercase(),
        name: slug.replace('-', " "),
        description: Some(format!("Souvenir {slug}")),
        short_description: None,
        price,
        compare_price: None,
        print_price: Some(Decimal::from(2)),
        quantity: 10,
        is_active: true,
        is_featured: false,
        is_low_budget: false,
        allow_custom_print: true,
        status: ProductStatus::Active,
        category: CategorySummary {
            id: category.id,
            slug: category.slug.clone(),
            name: category.name.clone(),
        },
        images: vec![],
        price_tiers: vec![],
        created_at: Utc::now() - Duration::minutes(age_minutes),
    }
}

/// 15 active mugs (two of them flagged low budget), one draft mug, a low-budget
/// tote in another category, and the low-budget pseudo-category itself.
fn seeded_catalog() -> Arc<InMemoryCatalogRepository> {
    let repo = Arc::new(InMemoryCatalogRepository::new());
    let mugs = category("mugs-drinkware", "Mugs & Drinkware");
    let bags = category("bags", "Bags");
    let low = category("low-budget", "Low Budget");
    for c in [mugs.clone(), bags.clone(), low] {
        repo.upsert_category(c).unwrap();
    }

    let prices = [5, 5, 8, 9, 10, 11, 12, 14, 15, 16, 18, 20, 24, 27, 30];
    for (i, price) in prices.iter().enumerate() {
        let mut p = product(&format!("mug-{i:02}"), Decimal::from(*price), &mugs, i as i64);
        p.is_low_budget = *price == 5;
        if i == 0 {
            p.images = vec![
                ProductImage {
                    id: ImageId::new(),
                    url: "https://cdn.example.test/mug-00-back.jpg".into(),
                    alt_text: None,
                    sort_order: 1,
                    is_main: false,
                },
                ProductImage {
                    id: ImageId::new(),
                    url: "https://cdn.example.test/mug-00-front.jpg".into(),
                    alt_text: Some("Front".into()),
                    sort_order: 0,
                    is_main: true,
                },
            ];
            p.price_tiers = vec![PriceTier {
                id: PriceTierId::new(),
                min_quantity: 10,
                discount_type: DiscountType::Percentage,
                discount_value: Decimal::from(20),
                is_active: true,
            }];
        }
        repo.upsert_product(p).unwrap();
    }

    let mut draft = product("draft-mug", Decimal::from(1), &mugs, 0);
    draft.status = ProductStatus::Draft;
    repo.upsert_product(draft).unwrap();

    let mut tote = product("cheap-tote", Decimal::new(350, 2), &bags, 3);
    tote.is_low_budget = true;
    tote.images = vec![ProductImage {
        id: ImageId::new(),
        url: "https://cdn.example.test/cheap-tote.jpg".into(),
        alt_text: None,
        sort_order: 4,
        is_main: false,
    }];
    repo.upsert_product(tote).unwrap();

    repo
}

fn prices(body: &serde_json::Value) -> Vec<f64> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["price"].as_f64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn mugs_category_page_sorted_by_price() {
    let srv = TestServer::spawn(seeded_catalog()).await;

    let (status, body) = srv
        .get("/categories/mugs-drinkware?sortBy=price-asc&page=1")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["slug"], "mugs-drinkware");
    assert_eq!(body["pagination"]["total"], 15);
    assert_eq!(body["pagination"]["pages"], 2);
    assert_eq!(body["pagination"]["limit"], 12);

    let page_one = prices(&body);
    assert_eq!(page_one.len(), 12);
    assert_eq!(&page_one[..3], &[5.0, 5.0, 8.0]);
    assert!(page_one.windows(2).all(|w| w[0] <= w[1]));

    let (_, body) = srv
        .get("/categories/mugs-drinkware?sortBy=price-asc&page=2")
        .await;
    assert_eq!(prices(&body), vec![24.0, 27.0, 30.0]);
}

#[tokio::test]
async fn price_desc_is_non_increasing() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (_, body) = srv.get("/products?sortBy=price-desc").await;
    let p = prices(&body);
    assert_eq!(p[0], 30.0);
    assert!(p.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn low_budget_category_lists_flagged_products_across_categories() {
    let srv = TestServer::spawn(seeded_catalog()).await;

    for path in ["/products?category=low-budget", "/categories/low-budget"] {
        let (status, body) = srv.get(path).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        let items = body["items"].as_array().unwrap();
        let mut slugs: Vec<&str> = items.iter().map(|p| p["slug"].as_str().unwrap()).collect();
        slugs.sort();
        assert_eq!(slugs, vec!["cheap-tote", "mug-00", "mug-01"], "{path}");
        assert!(items.iter().all(|p| p["isLowBudget"] == true));
        assert!(items
            .iter()
            .any(|p| p["category"]["slug"] == "mugs-drinkware"));
    }
}

#[tokio::test]
async fn nonexistent_category_is_404_without_items() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/categories/no-such-thing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(body["message"].is_string());
    assert!(body.get("items").is_none());
}

#[tokio::test]
async fn malformed_params_fall_back_to_defaults() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv
        .get("/products?page=banana&sortBy=sideways&minPrice=cheap&inStockOnly=maybe")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["total"], 16);
    assert_eq!(body["items"].as_array().unwrap().len(), 12);

    let (_, body) = srv.get("/products?page=-3").await;
    assert_eq!(body["pagination"]["page"], 1);
}

#[tokio::test]
async fn repeated_query_keys_are_not_rejected() {
    let srv = TestServer::spawn(seeded_catalog()).await;

    let (status, body) = srv.get("/products?page=1&page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["items"].as_array().unwrap().len(), 12);

    let (status, body) = srv
        .get("/categories/mugs-drinkware?sortBy=price-desc&sortBy=price-asc")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prices(&body)[0], 30.0);

    let (status, body) = srv.get("/admin/products?page=2&page=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 2);

    let (status, body) = srv.get("/products/mug-00/quote?quantity=10&quantity=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unitPrice"], 4.0);
}

#[tokio::test]
async fn out_of_range_price_bounds_still_filter() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    for path in ["/products?minPrice=1e30", "/products?maxPrice=-1e30"] {
        let (status, body) = srv.get(path).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(body["pagination"]["total"], 0, "{path}");
        assert!(body["items"].as_array().unwrap().is_empty(), "{path}");
    }
}

#[tokio::test]
async fn page_past_the_end_is_empty_but_counted() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/products?page=9").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["total"], 16);
    assert_eq!(body["pagination"]["pages"], 2);
}

#[tokio::test]
async fn search_and_price_range() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (_, body) = srv.get("/products?search=TOTE").await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["items"][0]["price"], 3.5);

    let (_, body) = srv.get("/products?minPrice=10&maxPrice=15").await;
    assert_eq!(prices(&body).len(), 5);
    assert!(prices(&body).iter().all(|p| (10.0..=15.0).contains(p)));
}

#[tokio::test]
async fn admin_listing_pages_by_twenty() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/admin/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["limit"], 20);
    assert_eq!(body["pagination"]["pages"], 1);
    assert_eq!(body["items"].as_array().unwrap().len(), 16);
}

#[tokio::test]
async fn product_detail_formats_relations() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/products/mug-00").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 5.0);
    assert_eq!(body["printPrice"], 2.0);
    assert!(body["comparePrice"].is_null());
    assert_eq!(body["images"][0]["isMain"], true);
    assert_eq!(body["images"][0]["altText"], "Front");
    assert_eq!(body["priceTiers"][0]["minQuantity"], 10);
    assert_eq!(body["priceTiers"][0]["discountType"], "percentage");
    assert_eq!(body["priceTiers"][0]["discountValue"], 20.0);

    let (_, body) = srv.get("/products/cheap-tote").await;
    assert_eq!(body["images"][0]["isMain"], true);

    let (status, _) = srv.get("/products/draft-mug").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_applies_quantity_tier() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (_, body) = srv.get("/products/mug-00/quote?quantity=2").await;
    assert_eq!(body["unitPrice"], 5.0);
    assert_eq!(body["total"], 10.0);

    let (_, body) = srv.get("/products/mug-00/quote?quantity=10").await;
    assert_eq!(body["unitPrice"], 4.0);
    assert_eq!(body["total"], 40.0);
}

#[tokio::test]
async fn category_tree_lists_active_roots() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/checkout").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
