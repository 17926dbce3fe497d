// HTTP surface: routes, handlers and extractors

pub mod auth;
pub mod extractors;
pub mod health;
pub mod posts;
pub mod timeline;
pub mod users;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app_state::AppState;
use crate::infrastructure::middleware::viewer_context_middleware;

pub use extractors::ValidatedJson;

/// Build the full application router.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/auths/registrations", post(auth::register))
        .route("/auths/totp", post(auth::send_code))
        .route("/auths/verify-totp", post(auth::verify_code))
        .route("/auths/sessions", post(auth::login))
        .route("/auths/sessions/refresh", post(auth::refresh))
        .route(
            "/auths/sessions/passwords",
            post(auth::request_password_reset).patch(auth::reset_password),
        )
        .route("/auths/validate-token", post(auth::validate_token));

    let authenticated = Router::new()
        // Posts
        .route("/posts", post(posts::create_post))
        .route("/posts/me", get(posts::my_posts))
        .route("/posts/me/bookmarks", get(posts::my_bookmarks))
        .route("/posts/ads", get(posts::list_ads))
        .route("/posts/{postId}", get(posts::get_post))
        .route(
            "/posts/{postId}/comments",
            get(posts::list_comments).post(posts::add_comment),
        )
        .route("/posts/{postId}/likes", post(posts::like).delete(posts::unlike))
        .route(
            "/posts/{postId}/bookmarks",
            post(posts::bookmark).delete(posts::unbookmark),
        )
        // Feed
        .route("/timeline", get(timeline::timeline))
        // Users
        .route("/users", get(users::search))
        .route(
            "/users/me",
            get(users::get_me).patch(users::update_me).delete(users::delete_me),
        )
        .route("/users/me/followers", get(users::followers))
        .route("/users/me/following", get(users::following))
        .route(
            "/users/me/following/{userId}",
            post(users::follow).delete(users::unfollow),
        )
        .route("/users/me/passwords", patch(users::change_password))
        .route("/users/me/metrics", get(users::metrics))
        .route("/users/me/logout", post(users::logout))
        .route("/users/{userId}", get(users::get_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            viewer_context_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
