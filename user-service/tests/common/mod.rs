use std::sync::Arc;

use auth::AuthConfig;
use auth::AuthService;
use auth::HashScheme;
use auth::TokenCodec;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::SqliteUserRepository;

pub const SECRET_KEY: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TOKEN_TTL_MINUTES: i64 = 30;

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub user_service: Arc<UserService<SqliteUserRepository>>,
    pub api_client: reqwest::Client,
    pub token_codec: TokenCodec,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // A single long-lived connection keeps the in-memory database alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let scheme = HashScheme::Argon2id {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        let auth_config = AuthConfig::new(SECRET_KEY, "HS256", TOKEN_TTL_MINUTES)
            .and_then(|config| config.with_password_scheme(scheme))
            .expect("Invalid test auth config");

        let repository = Arc::new(SqliteUserRepository::new(pool));
        let auth_service = Arc::new(
            AuthService::new(Arc::clone(&repository), &auth_config)
                .expect("Failed to build auth service"),
        );
        // Registration and login share one hasher
        let user_service = Arc::new(UserService::new(
            repository,
            auth_service.password_hasher().clone(),
        ));

        let router = create_router(Arc::clone(&user_service), auth_service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        let token_codec = TokenCodec::new(SECRET_KEY.as_bytes(), auth::Algorithm::HS256)
            .expect("Failed to build token codec");

        Self {
            address,
            port,
            user_service,
            api_client: reqwest::Client::new(),
            token_codec,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a user through the API
    pub async fn register(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/users")
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "full_name": "John Doe",
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Submit the OAuth2 password form to the token endpoint
    pub async fn request_token(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/token")
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register a user and return a freshly issued access token
    pub async fn register_and_login(&self, username: &str, password: &str) -> String {
        self.register(username, password).await;

        let body: serde_json::Value = self
            .request_token(username, password)
            .await
            .json()
            .await
            .expect("Failed to parse token response");

        body["access_token"]
            .as_str()
            .expect("Missing access_token")
            .to_string()
    }
}
