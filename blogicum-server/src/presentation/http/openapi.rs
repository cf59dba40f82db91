use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::app_error::ErrorBody;
use crate::presentation::http::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto, UserDto};
use crate::presentation::http::handlers::comments::{CommentDto, CommentFormDto};
use crate::presentation::http::handlers::health::HealthzResponse;
use crate::presentation::http::handlers::posts::{
    AuthorDto, CategoryDto, CategoryPageDto, CategoryRefDto, LocationDto, PageDto, PageQuery,
    PostDetailDto, PostDto, PostFormDto, PostListDto,
};
use crate::presentation::http::handlers::profile::{ProfileDto, ProfileFormDto, ProfilePageDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::health::healthz,
        crate::presentation::http::handlers::auth::register,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::posts::index,
        crate::presentation::http::handlers::posts::category_posts,
        crate::presentation::http::handlers::posts::post_detail,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::edit_post_form,
        crate::presentation::http::handlers::posts::edit_post,
        crate::presentation::http::handlers::posts::delete_post_form,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::comments::add_comment,
        crate::presentation::http::handlers::comments::edit_comment_form,
        crate::presentation::http::handlers::comments::edit_comment,
        crate::presentation::http::handlers::comments::delete_comment_form,
        crate::presentation::http::handlers::comments::delete_comment,
        crate::presentation::http::handlers::profile::profile,
        crate::presentation::http::handlers::profile::edit_profile_form,
        crate::presentation::http::handlers::profile::edit_profile
    ),
    components(
        schemas(
            ErrorBody,
            HealthzResponse,
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            UserDto,
            PageQuery,
            PageDto,
            AuthorDto,
            CategoryRefDto,
            LocationDto,
            PostDto,
            PostListDto,
            PostFormDto,
            PostDetailDto,
            CategoryDto,
            CategoryPageDto,
            CommentDto,
            CommentFormDto,
            ProfileDto,
            ProfileFormDto,
            ProfilePageDto
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Registration and login"),
        (name = "posts", description = "Listings and post management"),
        (name = "comments", description = "Comments under a post"),
        (name = "profile", description = "User profiles")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn documents_every_route_and_the_bearer_scheme() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/category/{slug}/",
            "/posts/{post_id}/",
            "/posts/create/",
            "/posts/{post_id}/edit/",
            "/posts/{post_id}/delete/",
            "/posts/{post_id}/comment/",
            "/posts/{post_id}/edit_comment/{comment_id}/",
            "/posts/{post_id}/delete_comment/{comment_id}/",
            "/profile/{username}/",
            "/profile/edit/",
            "/auth/registration/",
            "/auth/login/",
            "/healthz",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} is not documented");
        }

        let components = doc.components.expect("components must be present");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
