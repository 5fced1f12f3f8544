mod common;

use reqwest::StatusCode;
use serde_json::json;
use storefront::identity;

use common::{body_of, spawn_app, uuid_of, ADMIN_EMAIL, ADMIN_PASSWORD, USER_PASSWORD};

#[tokio::test]
async fn test_admin_login() {
    let app = spawn_app().await;

    let response = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    assert_eq!(body["status"], "Success");
    assert_eq!(body["message"], "User-login-success");
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert!(body["data"]["token"].as_str().is_some());
    assert!(body["data"]["expiration"].as_str().is_some());
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = spawn_app().await;

    let response = app.login(ADMIN_EMAIL, "Wrong!Pass1").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_of(response).await;
    assert_eq!(body["status"], "Error");
    assert_eq!(body["message"], "invalid-email/password.");
}

#[tokio::test]
async fn test_customer_starts_inactive() {
    let app = spawn_app().await;

    let response = app.register("shopper@example.com", "Customer").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    assert_eq!(body["message"], "User-creation-success");
    assert_eq!(body["data"]["isActive"], false);
    let user_id = uuid_of(&body["data"]["userId"]);

    // Correct password, inactive account.
    let response = app.login("shopper@example.com", USER_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let admin = app.admin_token().await;
    let response = app
        .put(
            &format!("/Authentication/update-user?id={user_id}&isActive=true"),
            Some(&admin),
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.login("shopper@example.com", USER_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_vendor_starts_active() {
    let app = spawn_app().await;

    let response = app.register("seller@example.com", "Vendor").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.login("seller@example.com", USER_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_role_cannot_be_self_registered() {
    let app = spawn_app().await;

    let response = app.register("mallory@example.com", "Admin").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_of(response).await;
    assert_eq!(body["message"], "access-denied");
    let user = identity::find_by_email(app.db.as_ref(), "mallory@example.com")
        .await
        .expect("Lookup failed");
    assert!(user.is_none());

    // A non-admin token does not unlock the role either.
    let (_, vendor) = app.user_with_role("seller@example.com", "Vendor").await;
    let response = app
        .register_as("mallory@example.com", "Admin", Some(&vendor))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_may_register_another_admin() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let response = app
        .register_as("deputy@example.com", "Admin", Some(&admin))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    assert_eq!(body["data"]["isActive"], true);

    let deputy = app.token_for("deputy@example.com", USER_PASSWORD).await;
    let response = app
        .post(
            "/Authentication/create-role",
            Some(&deputy),
            &json!({ "roleName": "Support" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_body_gets_envelope() {
    let app = spawn_app().await;

    let response = app
        .post_raw("/Authentication/login", None, "{email: nope")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_of(response).await;
    assert_eq!(body["code"], 400);
    assert_eq!(body["status"], "Error");
    assert_eq!(body["message"], "validation-failed");
    assert!(body["data"]["errors"].as_str().is_some());
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = spawn_app().await;

    let response = app.register("twice@example.com", "Vendor").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.register("TWICE@example.com", "Customer").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_of(response).await;
    assert_eq!(body["message"], "User-already-exist");

    // The original account is untouched and no customer membership was added.
    let admin = app.admin_token().await;
    let response = app
        .get("/Authentication/users-by-role?roleName=Customer", Some(&admin))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_register_with_unknown_role_writes_nothing() {
    let app = spawn_app().await;

    let response = app.register("ghost@example.com", "Wizard").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_of(response).await;
    assert_eq!(body["message"], "Role-not-exist");

    let user = identity::find_by_email(app.db.as_ref(), "ghost@example.com")
        .await
        .expect("Lookup failed");
    assert!(user.is_none());
}

#[tokio::test]
async fn test_weak_password_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .post(
            "/Authentication/register",
            None,
            &json!({
                "firstName": "Weak",
                "lastName": "Password",
                "email": "weak@example.com",
                "password": "password",
                "role": "Vendor",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_of(response).await;
    assert_eq!(body["message"], "validation-failed");
}

#[tokio::test]
async fn test_lockout_after_repeated_failures() {
    let app = spawn_app().await;
    app.user_with_role("locked@example.com", "Vendor").await;

    for _ in 0..3 {
        let response = app.login("locked@example.com", "Wrong!Pass1").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Locked out, so even the right password fails.
    let response = app.login("locked@example.com", USER_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token_and_role() {
    let app = spawn_app().await;

    let response = app
        .get("/Authentication/users-by-role?roleName=Admin", None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_of(response).await;
    assert_eq!(body["message"], "unauthorized");

    let response = app
        .get(
            "/Authentication/users-by-role?roleName=Admin",
            Some("not-a-token"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (_, token) = app.customer("nosy@example.com").await;
    let response = app
        .get("/Authentication/users-by-role?roleName=Admin", Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_of(response).await;
    assert_eq!(body["message"], "access-denied");
}

#[tokio::test]
async fn test_deactivated_user_token_stops_working() {
    let app = spawn_app().await;
    let (user_id, token) = app.customer("leaving@example.com").await;

    let path = format!("/Authentication/user-details?userId={user_id}");
    let response = app.get(&path, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let admin = app.admin_token().await;
    let response = app
        .put(
            &format!("/Authentication/update-user?id={user_id}&isActive=false"),
            Some(&admin),
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get(&path, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_details_of_someone_else_is_forbidden() {
    let app = spawn_app().await;
    let (first_id, _) = app.customer("first@example.com").await;
    let (_, second_token) = app.customer("second@example.com").await;

    let response = app
        .get(
            &format!("/Authentication/user-details?userId={first_id}"),
            Some(&second_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let response = app
        .get(
            &format!("/Authentication/user-details?userId={first_id}"),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    assert_eq!(body["message"], "User-details-retrieval-success");
    assert_eq!(body["data"]["email"], "first@example.com");
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_update_user_details_changes_password() {
    let app = spawn_app().await;
    let (user_id, token) = app.customer("mover@example.com").await;

    let response = app
        .put(
            "/Authentication/update-user-details",
            Some(&token),
            &json!({
                "userId": user_id,
                "firstName": "Moved",
                "lastName": "User",
                "email": "moved@example.com",
                "address": "2 New Street",
                "newPassword": "N3w!Password",
                "confirmPassword": "N3w!Password",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    assert_eq!(body["data"]["firstName"], "Moved");
    assert_eq!(body["data"]["email"], "moved@example.com");

    let response = app.login("moved@example.com", USER_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = app.login("moved@example.com", "N3w!Password").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_user_details_rejects_mismatched_confirmation() {
    let app = spawn_app().await;
    let (user_id, token) = app.customer("typo@example.com").await;

    let response = app
        .put(
            "/Authentication/update-user-details",
            Some(&token),
            &json!({
                "userId": user_id,
                "firstName": "Typo",
                "lastName": "User",
                "email": "typo@example.com",
                "newPassword": "N3w!Password",
                "confirmPassword": "N3w!Passw0rd",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing changed.
    let response = app.login("typo@example.com", USER_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_roles() {
    let app = spawn_app().await;

    let response = app.get("/Authentication/active-roles", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .expect("Roles missing")
        .iter()
        .filter_map(|role| role["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Admin", "Customer", "Vendor"]);

    let admin = app.admin_token().await;
    let payload = json!({ "roleName": "Support", "description": "Helpdesk" });
    let response = app
        .post("/Authentication/create-role", Some(&admin), &payload)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_of(response).await;
    assert_eq!(body["message"], "Role-creation-success");

    let response = app
        .post("/Authentication/create-role", Some(&admin), &payload)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_of(response).await;
    assert_eq!(body["message"], "Role-already-exist");

    let response = app
        .get("/Authentication/users-by-role?roleName=Nobody", Some(&admin))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_of(response).await;
    assert_eq!(body["message"], "Users-by-this-role-not-found");
}
