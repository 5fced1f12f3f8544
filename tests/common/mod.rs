#![allow(dead_code)]

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use storefront::api::create_api_router;
use storefront::config::{AdminSeed, Config, JwtConfig, LockoutPolicy};
use storefront::entities::{primary_setup, setup_schema};

pub const ADMIN_EMAIL: &str = "admin@storefront.test";
pub const ADMIN_PASSWORD: &str = "Adm1n!Pass";
pub const USER_PASSWORD: &str = "Muzion15!";

pub struct TestApp {
    pub base: String,
    pub client: Client,
    pub db: Arc<DatabaseConnection>,
}

/// Starts the full router on an ephemeral port against a fresh in-memory
/// database with the default roles and an administrator.
pub async fn spawn_app() -> TestApp {
    let config = Config {
        database_url: "sqlite::memory:".to_owned(),
        // One connection keeps every request on the same in-memory database.
        database_max_connections: 1,
        bind_addr: "127.0.0.1:0".to_owned(),
        cors_origin: "http://localhost:3000".to_owned(),
        jwt: JwtConfig {
            secret: "integration-test-secret".to_owned(),
            issuer: "storefront".to_owned(),
            audience: "storefront".to_owned(),
            valid_hours: 8,
        },
        lockout: LockoutPolicy {
            max_failed_attempts: 3,
            lockout_minutes: 10,
        },
        admin: Some(AdminSeed {
            email: ADMIN_EMAIL.to_owned(),
            password: ADMIN_PASSWORD.to_owned(),
        }),
    };

    let db = storefront::connect(&config)
        .await
        .expect("Failed to open database");
    setup_schema(&db).await.expect("Failed to create schema");
    primary_setup(&db, config.admin.as_ref())
        .await
        .expect("Failed to seed database");

    let db = Arc::new(db);
    let app = create_api_router(db.clone(), Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        base: format!("http://{addr}"),
        client: Client::new(),
        db,
    }
}

impl TestApp {
    fn with_token(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response {
        Self::with_token(self.client.get(format!("{}{path}", self.base)), token)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> Response {
        Self::with_token(self.client.post(format!("{}{path}", self.base)), token)
            .json(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: &Value) -> Response {
        Self::with_token(self.client.put(format!("{}{path}", self.base)), token)
            .json(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    /// Sends `body` verbatim as a JSON request body.
    pub async fn post_raw(&self, path: &str, token: Option<&str>, body: &str) -> Response {
        Self::with_token(self.client.post(format!("{}{path}", self.base)), token)
            .header("content-type", "application/json")
            .body(body.to_owned())
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Response {
        Self::with_token(self.client.delete(format!("{}{path}", self.base)), token)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post(
            "/Authentication/login",
            None,
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_of(response).await;
        body["data"]["token"]
            .as_str()
            .expect("Login returned no token")
            .to_owned()
    }

    pub async fn admin_token(&self) -> String {
        self.token_for(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn register(&self, email: &str, role: &str) -> Response {
        self.register_as(email, role, None).await
    }

    /// Registers with an optional bearer token on the request.
    pub async fn register_as(&self, email: &str, role: &str, token: Option<&str>) -> Response {
        self.post(
            "/Authentication/register",
            token,
            &json!({
                "firstName": "Test",
                "lastName": "User",
                "email": email,
                "address": "1 Test Street",
                "password": USER_PASSWORD,
                "role": role,
            }),
        )
        .await
    }

    /// Registers an account with `role`, activates it and logs in.
    pub async fn user_with_role(&self, email: &str, role: &str) -> (Uuid, String) {
        let response = self.register(email, role).await;
        assert_eq!(response.status(), StatusCode::OK);
        let user_id = uuid_of(&body_of(response).await["data"]["userId"]);

        let admin = self.admin_token().await;
        let response = self
            .put(
                &format!("/Authentication/update-user?id={user_id}&isActive=true"),
                Some(&admin),
                &json!({}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        (user_id, self.token_for(email, USER_PASSWORD).await)
    }

    pub async fn customer(&self, email: &str) -> (Uuid, String) {
        self.user_with_role(email, "Customer").await
    }

    pub async fn create_category(&self, token: &str, name: &str) -> Uuid {
        let response = self
            .post(
                "/Category",
                Some(token),
                &json!({ "categoryName": name, "categoryDescription": "Test category" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        uuid_of(&body_of(response).await["data"]["id"])
    }

    /// Creates a product and returns its id, found by name in the refreshed
    /// listing the endpoint answers with.
    pub async fn create_product(
        &self,
        token: &str,
        name: &str,
        price: f64,
        category_id: Option<Uuid>,
    ) -> Uuid {
        let response = self
            .post(
                "/Product",
                Some(token),
                &json!({
                    "name": name,
                    "description": "Test product",
                    "price": price,
                    "quantity": 10,
                    "imageUrls": [format!("https://img.test/{name}.png")],
                    "categoryId": category_id,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_of(response).await;
        let product = body["data"]
            .as_array()
            .expect("Product listing missing")
            .iter()
            .find(|product| product["name"] == name)
            .expect("Created product not listed")
            .clone();
        uuid_of(&product["id"])
    }

    pub async fn create_status(&self, token: &str, name: &str) -> Response {
        self.post(
            "/Order/create-status",
            Some(token),
            &json!({ "name": name, "description": format!("{name} orders") }),
        )
        .await
    }
}

pub async fn body_of(response: Response) -> Value {
    response
        .json::<Value>()
        .await
        .expect("Failed to parse response JSON")
}

pub fn uuid_of(value: &Value) -> Uuid {
    value
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("Expected a UUID")
}

