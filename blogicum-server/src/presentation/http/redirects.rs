//! Target locations for the post-mutate-redirect responses.

use axum::{
    Json,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

pub(crate) const LOGIN: &str = "/auth/login/";

pub(crate) fn index() -> Redirect {
    Redirect::to("/")
}

pub(crate) fn post_detail(post_id: i64) -> Redirect {
    Redirect::to(&format!("/posts/{post_id}/"))
}

pub(crate) fn profile(username: &str) -> Redirect {
    Redirect::to(&format!("/profile/{username}/"))
}

pub(crate) fn login() -> Redirect {
    Redirect::to(LOGIN)
}

/// Form views answer with the form data for the author and send everybody
/// else back to the post.
pub(crate) enum Rendered<T> {
    Json(T),
    Redirect(Redirect),
}

impl<T: Serialize> IntoResponse for Rendered<T> {
    fn into_response(self) -> Response {
        match self {
            Rendered::Json(body) => Json(body).into_response(),
            Rendered::Redirect(redirect) => redirect.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;

    use super::{Rendered, post_detail, profile};

    fn location(redirect: axum::response::Redirect) -> (StatusCode, String) {
        let response = redirect.into_response();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        (response.status(), location)
    }

    #[test]
    fn redirects_use_see_other() {
        assert_eq!(
            location(post_detail(42)),
            (StatusCode::SEE_OTHER, "/posts/42/".to_string())
        );
        assert_eq!(
            location(profile("author")),
            (StatusCode::SEE_OTHER, "/profile/author/".to_string())
        );
    }

    #[test]
    fn rendered_redirect_keeps_location() {
        let response = Rendered::<()>::Redirect(post_detail(7)).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).map(|v| v.as_bytes()),
            Some(&b"/posts/7/"[..])
        );
    }
}
