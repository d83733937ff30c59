//! # ladle: a recipe management backend
//!
//! `ladle` is a small self-hostable backend for keeping recipes, with per-user
//! tags and ingredients and token-based authentication. It exposes a REST API
//! over PostgreSQL.
//!
//! ## Overview
//!
//! Every tag, ingredient and recipe belongs to exactly one user. All reads and
//! writes are scoped to the authenticated caller: a request can never observe
//! or modify another user's rows, regardless of query parameters. Tag and
//! ingredient listings support an `assigned_only` filter that restricts the
//! result to labels referenced by at least one of the caller's recipes, with
//! duplicates collapsed.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the
//! HTTP layer and uses PostgreSQL (via SQLx) for persistence.
//!
//! ### Request Flow
//!
//! A request first passes through the [`CurrentUser`] extractor, which accepts
//! either a bearer token or the session cookie issued by `POST /user/token`.
//! Unauthenticated requests are rejected before any query executes. The handler
//! then drives a repository from [`db::handlers`], which owns the SQL for its
//! table, and converts the database model into the wire representation from
//! [`api::models`].
//!
//! [`CurrentUser`]: api::models::users::CurrentUser
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use ladle::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = ladle::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     ladle::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod storage;
pub mod telemetry;
mod types;

#[cfg(test)]
mod test;
#[cfg(test)]
pub mod test_utils;

use crate::{
    auth::password,
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    openapi::ApiDoc,
};
use axum::http::HeaderValue;
use axum::{
    http,
    routing::{get, post},
    Router,
};
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, instrument, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{IngredientId, RecipeId, TagId, UserId};

use crate::config::CorsOrigin;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the ladle database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial superuser if it doesn't exist.
///
/// This function is idempotent - it will create a new superuser if one doesn't
/// exist, or update the password if the user already exists. It is called
/// during application startup so a privileged account is always available.
///
/// Superusers carry both the staff and superuser flags.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &PgPool) -> Result<UserId, errors::Error> {
    let password_hash = match password {
        Some(pwd) => Some(password::hash_string(pwd)?),
        None => None,
    };

    let mut tx = db.begin().await.map_err(|e| errors::Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut tx);

    // Check if user already exists
    if let Some(existing_user) = user_repo.get_user_by_email(email).await? {
        if password_hash.is_some() {
            user_repo
                .update(
                    existing_user.id,
                    &db::models::users::UserUpdateDBRequest {
                        email: None,
                        name: None,
                        password_hash,
                    },
                )
                .await?;
        }
        tx.commit().await.map_err(|e| errors::Error::Database(e.into()))?;
        return Ok(existing_user.id);
    }

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            name: "Administrator".to_string(),
            password_hash,
            is_staff: true,
            is_superuser: true,
        })
        .await?;

    tx.commit().await.map_err(|e| errors::Error::Database(e.into()))?;
    Ok(created_user.id)
}

/// Setup the database connection pool, run migrations, and provision the
/// initial superuser
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool_settings = &config.database.pool;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(pool_settings.max_connections)
        .min_connections(pool_settings.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(pool_settings.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;

    migrator().run(&pool).await?;

    create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {}", e))?;

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    // The wildcard cannot appear in an origin list, only on its own
    let allow_origin = if config
        .auth
        .security
        .cors
        .allowed_origins
        .iter()
        .any(|origin| matches!(origin, CorsOrigin::Wildcard))
    {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.auth.security.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(config.auth.security.cors.allow_credentials)
        .allow_headers(vec![http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::PATCH,
            http::Method::PUT,
            http::Method::DELETE,
        ]);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - User routes (registration, token issuance, self management)
/// - Recipe routes (tags, ingredients, recipes, image upload)
/// - Static serving of uploaded media
/// - OpenAPI docs with a Scalar UI
/// - CORS configuration
/// - Tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let user_routes = Router::new()
        .route("/user/create", post(api::handlers::users::create_user))
        .route("/user/token", post(api::handlers::users::create_token))
        .route(
            "/user/me",
            get(api::handlers::users::get_me)
                .patch(api::handlers::users::update_me)
                .put(api::handlers::users::update_me),
        )
        .with_state(state.clone());

    let recipe_routes = Router::new()
        .route(
            "/recipe/tags",
            get(api::handlers::tags::list_tags).post(api::handlers::tags::create_tag),
        )
        .route(
            "/recipe/tags/{tag_id}",
            axum::routing::patch(api::handlers::tags::update_tag).delete(api::handlers::tags::delete_tag),
        )
        .route(
            "/recipe/ingredients",
            get(api::handlers::ingredients::list_ingredients).post(api::handlers::ingredients::create_ingredient),
        )
        .route(
            "/recipe/ingredients/{ingredient_id}",
            axum::routing::patch(api::handlers::ingredients::update_ingredient).delete(api::handlers::ingredients::delete_ingredient),
        )
        .route(
            "/recipe/recipes",
            get(api::handlers::recipes::list_recipes).post(api::handlers::recipes::create_recipe),
        )
        .route(
            "/recipe/recipes/{recipe_id}",
            get(api::handlers::recipes::get_recipe)
                .patch(api::handlers::recipes::update_recipe)
                .put(api::handlers::recipes::update_recipe)
                .delete(api::handlers::recipes::delete_recipe),
        )
        .route("/recipe/recipes/{recipe_id}/image", post(api::handlers::recipes::upload_recipe_image))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(user_routes)
        .merge(recipe_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(ApiDoc::openapi()) }),
        )
        // Serve uploaded recipe images
        .nest_service("/media", ServeDir::new(&state.config.media_root));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, and provisions the initial superuser
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting ladle with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;

        let state = AppState {
            db: pool.clone(),
            config: config.clone(),
        };

        let router = build_router(&state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "ladle listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
