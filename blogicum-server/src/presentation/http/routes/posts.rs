use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{
    add_comment, delete_comment, delete_comment_form, edit_comment, edit_comment_form,
};
use crate::presentation::http::handlers::posts::{
    category_posts, create_post, delete_post, delete_post_form, edit_post, edit_post_form, index,
    post_detail,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(index))
        .route("/category/{slug}/", get(category_posts))
        .route("/posts/{post_id}/", get(post_detail));

    let protected = Router::new()
        .route("/posts/create/", post(create_post))
        .route(
            "/posts/{post_id}/edit/",
            get(edit_post_form).post(edit_post),
        )
        .route(
            "/posts/{post_id}/delete/",
            get(delete_post_form).post(delete_post),
        )
        .route("/posts/{post_id}/comment/", post(add_comment))
        .route(
            "/posts/{post_id}/edit_comment/{comment_id}/",
            get(edit_comment_form).post(edit_comment),
        )
        .route(
            "/posts/{post_id}/delete_comment/{comment_id}/",
            get(delete_comment_form).post(delete_comment),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            jwt_auth_middleware,
        ));

    public.merge(protected)
}
