use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::domain::visibility::Viewer;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Who is asking, for routes that serve anonymous visitors too. A token that
/// is present but invalid is rejected rather than downgraded to anonymous.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CurrentViewer(pub(crate) Viewer);

impl FromRequestParts<AppState> for CurrentViewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(Self(Viewer::Authenticated {
                user_id: user.user_id,
            }));
        }

        let Some(token) = bearer_token(&parts.headers)? else {
            return Ok(Self(Viewer::Anonymous));
        };
        let claims = state
            .jwt
            .verify_token(token)
            .map_err(|_| AppError::Unauthorized)?;
        Ok(Self(Viewer::Authenticated {
            user_id: claims.user_id,
        }))
    }
}

pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?.ok_or(AppError::Unauthorized)?;

    let claims = state
        .jwt
        .verify_token(token)
        .map_err(|_| AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.user_id,
    });

    Ok(next.run(request).await)
}

/// `Ok(None)` when no `Authorization` header is sent at all.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_header = value.to_str().map_err(|_| AppError::Unauthorized)?;

    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next().ok_or(AppError::Unauthorized)?;
    let token = parts.next().ok_or(AppError::Unauthorized)?;
    if parts.next().is_some() {
        return Err(AppError::Unauthorized);
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized);
    }
    Ok(Some(token))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};

    use super::bearer_token;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn missing_header_means_anonymous() {
        assert!(matches!(bearer_token(&HeaderMap::new()), Ok(None)));
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let headers = headers("bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).ok().flatten(), Some("abc.def.ghi"));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for value in ["Bearer", "Basic abc", "Bearer a b", ""] {
            assert!(bearer_token(&headers(value)).is_err(), "{value:?} must fail");
        }
    }
}
