use fleximart_etl::models::Review;
use fleximart_etl::storage::{CatalogStore, load_catalog_file};
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

fn sample_catalog() -> Vec<Value> {
    vec![
        json!({
            "product_id": "ELEC001",
            "name": "Samsung Galaxy S21 Ultra",
            "category": "Electronics",
            "price": 79999.0,
            "stock": 150,
            "reviews": [
                {"user": "U001", "rating": 5, "comment": "Excellent", "date": "2024-01-15"},
                {"user": "U002", "rating": 4, "comment": "Good", "date": "2024-01-20"}
            ]
        }),
        json!({
            "product_id": "ELEC002",
            "name": "boAt Airdopes",
            "category": "Electronics",
            "price": 1299.0,
            "stock": 500,
            "reviews": [
                {"user": "U003", "rating": 3, "comment": "Okay", "date": "2024-02-01"}
            ]
        }),
        json!({
            "product_id": "ELEC003",
            "name": "Dell Monitor",
            "category": "Electronics",
            "price": 12999.0,
            "stock": 40
        }),
        json!({
            "product_id": "FASH001",
            "name": "Levi's Jeans",
            "category": "Fashion",
            "price": 2999.0,
            "stock": 80,
            "reviews": [
                {"user": "U004", "rating": 4, "comment": "Fits well", "date": "2024-02-10"}
            ]
        }),
        json!({
            "product_id": "FASH002",
            "name": "Nike Shoes",
            "category": "Fashion",
            "price": 4000.0,
            "stock": 60
        }),
    ]
}

fn loaded_store() -> CatalogStore {
    let mut store = CatalogStore::open_in_memory("products").unwrap();
    assert_eq!(store.insert_many(&sample_catalog()).unwrap(), 5);
    store
}

#[test]
fn test_catalog_file_accepts_array_or_object() {
    let dir = TempDir::new().unwrap();

    let array_path = dir.path().join("catalog.json");
    fs::write(&array_path, serde_json::to_string(&sample_catalog()).unwrap()).unwrap();
    assert_eq!(load_catalog_file(array_path.to_str().unwrap()).unwrap().len(), 5);

    let object_path = dir.path().join("single.json");
    fs::write(&object_path, r#"{"product_id": "ELEC001", "name": "Phone"}"#).unwrap();
    assert_eq!(load_catalog_file(object_path.to_str().unwrap()).unwrap().len(), 1);

    let scalar_path = dir.path().join("scalar.json");
    fs::write(&scalar_path, "42").unwrap();
    assert!(load_catalog_file(scalar_path.to_str().unwrap()).is_err());
}

#[test]
fn test_filtered_lookup_with_projection() {
    let store = loaded_store();

    let results = store
        .find_by_category_below_price("Electronics", 50000.0, &["name", "price", "stock"])
        .unwrap();

    assert_eq!(
        results,
        vec![
            json!({"name": "boAt Airdopes", "price": 1299.0, "stock": 500}),
            json!({"name": "Dell Monitor", "price": 12999.0, "stock": 40}),
        ]
    );
}

#[test]
fn test_average_rating_report() {
    let store = loaded_store();

    let report = store.average_rating_report(4.0).unwrap();
    let names: Vec<&str> = report.iter().filter_map(|r| r.name.as_deref()).collect();

    assert_eq!(names, vec!["Samsung Galaxy S21 Ultra", "Levi's Jeans"]);
    assert_eq!(report[0].average_rating, 4.5);
    assert_eq!(report[1].category.as_deref(), Some("Fashion"));
}

#[test]
fn test_category_price_report() {
    let store = loaded_store();

    let report = store.category_price_report().unwrap();
    assert_eq!(report.len(), 2);

    assert_eq!(report[0].category.as_deref(), Some("Electronics"));
    assert_eq!(report[0].avg_price, Some(31432.33));
    assert_eq!(report[0].product_count, 3);

    assert_eq!(report[1].category.as_deref(), Some("Fashion"));
    assert_eq!(report[1].avg_price, Some(3499.5));
    assert_eq!(report[1].product_count, 2);
}

#[test]
fn test_add_review_appends_to_matching_document() {
    let mut store = loaded_store();

    let review = Review::new("U999", 4.0, "Good value");
    assert!(store.add_review("ELEC001", &review).unwrap());
    assert!(!store.add_review("NOPE001", &review).unwrap());

    // ELEC003 had no reviews field before
    assert!(store.add_review("ELEC003", &Review::new("U998", 5.0, "Sharp")).unwrap());

    let report = store.average_rating_report(0.0).unwrap();
    let galaxy = report
        .iter()
        .find(|r| r.name.as_deref() == Some("Samsung Galaxy S21 Ultra"))
        .unwrap();
    assert!((galaxy.average_rating - 13.0 / 3.0).abs() < 1e-9);

    let monitor = report
        .iter()
        .find(|r| r.name.as_deref() == Some("Dell Monitor"))
        .unwrap();
    assert_eq!(monitor.average_rating, 5.0);
    assert_eq!(store.count().unwrap(), 5);
}
