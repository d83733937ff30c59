//! Request extractor that resolves the authenticated user.
//!
//! Every protected handler takes [`CurrentUser`] as an argument; extraction fails
//! with a 401 before the handler body (and therefore before any query) runs.

use crate::{
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
    AppState,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract user from a Bearer token in the Authorization header if present and valid
/// Returns:
/// - None: No Authorization header or not a Bearer token
/// - Some(Ok(user)): Valid token found and verified
/// - Some(Err(error)): Bearer token present but invalid
#[instrument(skip(parts, config))]
fn try_bearer_token_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let auth_header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }))
        }
    };

    // Check for Bearer token format
    let token = auth_str.strip_prefix("Bearer ")?;

    Some(session::verify_session_token(token, config))
}

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present (or it failed verification - expired
///   cookies are expected and not worth reporting)
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Cookie header present but malformed
#[instrument(skip(parts, config))]
fn try_session_cookie_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }))
        }
    };
    let cookie_name = &config.auth.native.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                match session::verify_session_token(value, config) {
                    Ok(user) => return Some(Ok(user)),
                    Err(_) => {
                        // Invalid/expired token, continue checking other cookies
                        continue;
                    }
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Try all authentication methods in priority order.
        // Each method returns Option<Result<CurrentUser>>:
        // - None means the auth method is not applicable (no credentials present)
        // - Some(Ok(user)) means successful authentication
        // - Some(Err(error)) means auth credentials were present but invalid

        match try_bearer_token_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found bearer token authenticated user: {}", user.id);
                return Ok(user);
            }
            Some(Err(e)) => {
                trace!("Bearer token authentication failed: {:?}", e);
                return Err(Error::Unauthenticated { message: None });
            }
            None => {
                trace!("No bearer token authentication attempted");
            }
        }

        if state.config.auth.native.enabled {
            match try_session_cookie_auth(parts, &state.config) {
                Some(Ok(user)) => {
                    debug!("Found session cookie authenticated user: {}", user.id);
                    return Ok(user);
                }
                Some(Err(e)) => {
                    trace!("Session cookie authentication failed: {:?}", e);
                }
                None => {
                    trace!("No session cookie authentication attempted");
                }
            }
        }

        trace!("No authentication credentials found in request");
        Err(Error::Unauthenticated { message: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_config;
    use uuid::Uuid;

    fn parts_with_header(header_name: &str, header_value: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(header_name, header_value)
            .body(())
            .unwrap();

        let (parts, _body) = request.into_parts();
        parts
    }

    fn test_user() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            is_staff: false,
            is_superuser: false,
        }
    }

    #[test]
    fn test_bearer_token_auth_roundtrip() {
        let config = create_test_config();
        let user = test_user();
        let token = session::create_session_token(&user, &config).unwrap();

        let parts = parts_with_header("authorization", &format!("Bearer {token}"));
        let extracted = try_bearer_token_auth(&parts, &config)
            .expect("bearer auth should be attempted")
            .expect("token should verify");
        assert_eq!(extracted.id, user.id);
        assert_eq!(extracted.email, user.email);
    }

    #[test]
    fn test_bearer_token_auth_invalid_token() {
        let config = create_test_config();
        let parts = parts_with_header("authorization", "Bearer not-a-token");
        let result = try_bearer_token_auth(&parts, &config).expect("bearer auth should be attempted");
        assert!(result.is_err());
    }

    #[test]
    fn test_non_bearer_authorization_is_skipped() {
        let config = create_test_config();
        let parts = parts_with_header("authorization", "Basic dXNlcjpwYXNz");
        assert!(try_bearer_token_auth(&parts, &config).is_none());
    }

    #[test]
    fn test_session_cookie_auth_roundtrip() {
        let config = create_test_config();
        let user = test_user();
        let token = session::create_session_token(&user, &config).unwrap();

        let cookie = format!("other=1; {}={token}", config.auth.native.session.cookie_name);
        let parts = parts_with_header("cookie", &cookie);
        let extracted = try_session_cookie_auth(&parts, &config)
            .expect("cookie auth should be attempted")
            .expect("token should verify");
        assert_eq!(extracted.id, user.id);
    }

    #[test]
    fn test_session_cookie_auth_wrong_cookie_name() {
        let config = create_test_config();
        let user = test_user();
        let token = session::create_session_token(&user, &config).unwrap();

        let parts = parts_with_header("cookie", &format!("unrelated={token}"));
        assert!(try_session_cookie_auth(&parts, &config).is_none());
    }
}
