use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::http::handlers::profile::{edit_profile, edit_profile_form, profile};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/profile/{username}/", get(profile));

    let protected = Router::new()
        .route("/profile/edit/", get(edit_profile_form).post(edit_profile))
        .route_layer(middleware::from_fn_with_state(
            state,
            jwt_auth_middleware,
        ));

    public.merge(protected)
}
