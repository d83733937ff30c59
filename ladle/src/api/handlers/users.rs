use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::models::users::{CurrentUser, TokenCreateResponse, TokenRequest, TokenResponse, UserCreate, UserResponse, UserUpdate},
    auth::{password, session},
    config::Config,
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::Error,
    AppState,
};

/// Build the Set-Cookie value carrying the session token
fn create_session_cookie(token: &str, config: &Config) -> String {
    let session = &config.auth.native.session;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite={}; Max-Age={}",
        session.cookie_name,
        token,
        session.cookie_same_site,
        config.auth.security.jwt_expiry.as_secs()
    );
    if session.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Validate a password against the configured rules
fn validate_password(password: &str, config: &Config) -> Result<(), Error> {
    let password_config = &config.auth.native.password;
    if password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }
    Ok(())
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/user/create",
    request_body = UserCreate,
    tag = "user",
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "User already exists"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(State(state): State<AppState>, Json(request): Json<UserCreate>) -> Result<(StatusCode, Json<UserResponse>), Error> {
    // Check if native auth and registration are enabled
    if !state.config.auth.native.enabled {
        return Err(Error::BadRequest {
            message: "Native authentication is disabled".to_string(),
        });
    }
    if !state.config.auth.native.allow_registration {
        return Err(Error::BadRequest {
            message: "User registration is disabled".to_string(),
        });
    }

    if request.email.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Email may not be blank".to_string(),
        });
    }

    validate_password(&request.password, &state.config)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    // Check if user with this email already exists
    let mut user_repo = Users::new(&mut tx);
    if user_repo.get_user_by_email(&request.email).await?.is_some() {
        return Err(Error::BadRequest {
            message: "An account with this email address already exists".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let create_request = UserCreateDBRequest {
        email: request.email,
        name: request.name,
        password_hash: Some(password_hash),
        is_staff: false,
        is_superuser: false,
    };

    let created_user = user_repo.create(&create_request).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(created_user))))
}

/// Exchange email/password credentials for an auth token
#[utoipa::path(
    post,
    path = "/user/token",
    request_body = TokenRequest,
    tag = "user",
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Bad credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_token(State(state): State<AppState>, Json(request): Json<TokenRequest>) -> Result<TokenCreateResponse, Error> {
    if !state.config.auth.native.enabled {
        return Err(Error::BadRequest {
            message: "Native authentication is disabled".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    // Bad credentials are a client error on this endpoint; the 401 taxonomy is
    // reserved for missing/invalid tokens on protected routes
    let bad_credentials = || Error::BadRequest {
        message: "Unable to authenticate with provided credentials".to_string(),
    };

    let user = user_repo.get_user_by_email(&request.email).await?.ok_or_else(bad_credentials)?;

    let password_hash = user.password_hash.clone().ok_or_else(bad_credentials)?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &password_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(bad_credentials());
    }

    let current_user = CurrentUser::from(user);
    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(TokenCreateResponse {
        token_response: TokenResponse { token },
        cookie,
    })
}

/// Retrieve the authenticated user
#[utoipa::path(
    get,
    path = "/user/me",
    tag = "user",
    responses(
        (status = 200, description = "The authenticated user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_me(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    // The token carries a snapshot; serve the stored row
    match user_repo.get_by_id(current_user.id).await? {
        Some(user) => Ok(Json(UserResponse::from(user))),
        None => Err(Error::NotFound {
            resource: "User".to_string(),
            id: current_user.id.to_string(),
        }),
    }
}

/// Update the authenticated user
#[utoipa::path(
    patch,
    path = "/user/me",
    request_body = UserUpdate,
    tag = "user",
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(update): Json<UserUpdate>,
) -> Result<Json<UserResponse>, Error> {
    if let Some(ref email) = update.email {
        if email.trim().is_empty() {
            return Err(Error::BadRequest {
                message: "Email may not be blank".to_string(),
            });
        }
    }

    // Hash the new password if one was provided
    let password_hash = match update.password {
        Some(password) => {
            validate_password(&password, &state.config)?;
            let hash = tokio::task::spawn_blocking(move || password::hash_string(&password))
                .await
                .map_err(|e| Error::Internal {
                    operation: format!("spawn password hashing task: {e}"),
                })??;
            Some(hash)
        }
        None => None,
    };

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    let request = UserUpdateDBRequest {
        email: update.email,
        name: update.name,
        password_hash,
    };

    let updated = user_repo.update(current_user.id, &request).await?;

    Ok(Json(UserResponse::from(updated)))
}
