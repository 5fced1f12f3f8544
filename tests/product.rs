mod common;

use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{body_of, spawn_app};

#[tokio::test]
async fn test_products_carry_category_name() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let category = app.create_category(&admin, "Bakery").await;
    app.create_product(&admin, "Baranka", 1.5, Some(category)).await;
    app.create_product(&admin, "Loose", 2.0, None).await;

    let response = app.get("/Product", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    assert_eq!(body["message"], "products-retrieval-success");
    let products = body["data"].as_array().expect("Products missing");
    assert_eq!(products.len(), 2);

    let baranka = products
        .iter()
        .find(|product| product["name"] == "Baranka")
        .expect("Baranka missing");
    assert_eq!(baranka["categoryName"], "Bakery");
    assert_eq!(baranka["price"], 1.5);
    assert_eq!(baranka["imageUrls"], json!(["https://img.test/Baranka.png"]));

    // No category leaves the joined name empty.
    let loose = products
        .iter()
        .find(|product| product["name"] == "Loose")
        .expect("Loose missing");
    assert!(loose["categoryName"].is_null());
}

#[tokio::test]
async fn test_create_forces_active() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let response = app
        .post(
            "/Product",
            Some(&admin),
            &json!({ "name": "Sneaky", "price": 3.0, "isActive": false }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    assert_eq!(body["message"], "product-creation-success");
    let products = body["data"].as_array().expect("Products missing");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["isActive"], true);
    assert!(products[0]["createdOn"].as_str().is_some());
}

#[tokio::test]
async fn test_invalid_products_are_rejected() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let response = app
        .post("/Product", Some(&admin), &json!({ "name": "Cheap", "price": -1.0 }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_of(response).await;
    assert_eq!(body["message"], "validation-failed");

    let response = app
        .post(
            "/Product",
            Some(&admin),
            &json!({ "name": "Orphan", "categoryId": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_of(response).await;
    assert_eq!(body["message"], "Category-not-exist");
}

#[tokio::test]
async fn test_update_product() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let id = app.create_product(&admin, "Baranka", 1.5, None).await;

    let response = app
        .put(
            "/Product/update-product",
            Some(&admin),
            &json!({ "id": id, "name": "Sushka", "price": 0.75, "quantity": 40 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    assert_eq!(body["message"], "product-update-success");

    let body = body_of(app.get(&format!("/Product/get-product?id={id}"), None).await).await;
    assert_eq!(body["message"], "product-retrieval-success");
    assert_eq!(body["data"]["name"], "Sushka");
    assert_eq!(body["data"]["price"], 0.75);
    assert_eq!(body["data"]["quantity"], 40);

    let response = app
        .put(
            "/Product/update-product",
            Some(&admin),
            &json!({ "id": Uuid::new_v4(), "name": "Nothing" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_of(response).await;
    assert_eq!(body["message"], "product-not-exist");
}

#[tokio::test]
async fn test_delete_product_is_soft() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let kept = app.create_product(&admin, "Kept", 1.0, None).await;
    let removed = app.create_product(&admin, "Removed", 1.0, None).await;

    let response = app.delete(&format!("/Product/{removed}"), Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    assert_eq!(body["message"], "product-remove-success");
    let remaining = body["data"].as_array().expect("Products missing");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["id"], kept.to_string());

    let response = app
        .get(&format!("/Product/get-product?id={removed}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    assert_eq!(body["data"]["isActive"], false);

    let response = app.delete(&format!("/Product/{removed}"), Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_of(response).await;
    assert_eq!(body["message"], "product-remove-failed");

    let response = app
        .delete(&format!("/Product/{}", Uuid::new_v4()), Some(&admin))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vendor_products() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (vendor_id, vendor) = app.user_with_role("vendor@example.com", "Vendor").await;

    app.create_product(&vendor, "Mine", 4.0, None).await;
    app.create_product(&admin, "Theirs", 5.0, None).await;

    let response = app
        .get(&format!("/Product/get-vendor-products?id={vendor_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    let products = body["data"].as_array().expect("Products missing");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Mine");
    assert_eq!(products[0]["createdBy"], vendor_id.to_string());
}

#[tokio::test]
async fn test_vendor_cannot_delete_as_someone_else() {
    let app = spawn_app().await;
    let (_, vendor) = app.user_with_role("vendor@example.com", "Vendor").await;
    let id = app.create_product(&vendor, "Mine", 4.0, None).await;

    let response = app
        .delete(
            &format!("/Product/{id}?userId={}", Uuid::new_v4()),
            Some(&vendor),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_customers_cannot_edit_catalog() {
    let app = spawn_app().await;
    let (_, customer) = app.customer("shopper@example.com").await;

    let response = app
        .post("/Product", Some(&customer), &json!({ "name": "Nope" }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_of(response).await;
    assert_eq!(body["message"], "access-denied");
}

#[tokio::test]
async fn test_bad_parameters_get_envelope() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let response = app.get("/Product/get-product?id=nope", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_of(response).await;
    assert_eq!(body["status"], "Error");
    assert_eq!(body["message"], "validation-failed");

    let response = app.delete("/Product/not-a-uuid", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_of(response).await;
    assert_eq!(body["message"], "validation-failed");
}

#[tokio::test]
async fn test_vendors_only_edit_their_own_products() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (_, owner) = app.user_with_role("owner@example.com", "Vendor").await;
    let (_, rival) = app.user_with_role("rival@example.com", "Vendor").await;
    let id = app.create_product(&owner, "Mine", 4.0, None).await;

    let response = app
        .put(
            "/Product/update-product",
            Some(&rival),
            &json!({ "id": id, "name": "Hijacked" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_of(response).await;
    assert_eq!(body["message"], "access-denied");

    let response = app.delete(&format!("/Product/{id}"), Some(&rival)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_of(app.get(&format!("/Product/get-product?id={id}"), None).await).await;
    assert_eq!(body["data"]["name"], "Mine");
    assert_eq!(body["data"]["isActive"], true);

    let response = app
        .put(
            "/Product/update-product",
            Some(&owner),
            &json!({ "id": id, "name": "Still mine" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.delete(&format!("/Product/{id}"), Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
