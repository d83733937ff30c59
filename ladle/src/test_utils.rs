//! Test utilities shared by the unit and API-level tests.

use crate::config::{Config, PoolSettings};
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::{api::models::users::CurrentUser, auth::password, auth::session, build_router, AppState};
use axum_test::TestServer;
use sqlx::PgPool;

/// Password used for every user created through [`create_test_user`].
pub const TEST_PASSWORD: &str = "pass12345";

pub fn create_test_config() -> Config {
    // Per-process temp directory for uploaded media
    let media_root = std::env::temp_dir().join(format!("ladle-test-media-{}", std::process::id()));

    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: None,
        database: crate::config::DatabaseConfig {
            // Overridden by the pool handed in by #[sqlx::test]
            url: "unused".to_string(),
            pool: PoolSettings {
                max_connections: 1,
                ..Default::default()
            },
        },
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        media_root,
        auth: Default::default(),
    }
}

/// Build a test server around an existing pool.
pub fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();
    let state = AppState { db: pool, config };
    let router = build_router(&state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Create a user directly in the database with [`TEST_PASSWORD`] set.
pub async fn create_test_user(pool: &PgPool, email: &str) -> UserDBResponse {
    let password_hash = password::hash_string(TEST_PASSWORD).expect("Failed to hash test password");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Users::new(&mut conn);
    repo.create(&UserCreateDBRequest {
        email: email.to_string(),
        name: "Test User".to_string(),
        password_hash: Some(password_hash),
        is_staff: false,
        is_superuser: false,
    })
    .await
    .expect("Failed to create test user")
}

/// Mint a bearer token for a user, signed with the test secret.
pub fn token_for(user: &UserDBResponse) -> String {
    let config = create_test_config();
    let current_user = CurrentUser::from(user.clone());
    session::create_session_token(&current_user, &config).expect("Failed to create session token")
}

/// `Authorization` header value for a user.
pub fn bearer(user: &UserDBResponse) -> String {
    format!("Bearer {}", token_for(user))
}
