use crate::interface_adapters::net::{
    create_user, delete_user, get_user, health, list_images, list_users, reset_game, ws_handler,
};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/users", post(create_user).get(list_users))
        .route("/users/{user_id}", get(get_user).delete(delete_user))
        .route("/admin/images", get(list_images))
        .route("/admin/reset", post(reset_game))
        .route("/ws/{player_id}", get(ws_handler))
        .with_state(state)
        // The admin dashboard polls from another origin.
        .layer(CorsLayer::permissive())
}
