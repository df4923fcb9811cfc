// Network adapter modules split by player sockets, roster routes and admin routes.

pub mod admin;
pub mod client;
pub mod users;

pub use admin::{list_images, reset_game};
pub use client::ws_handler;
pub use users::{create_user, delete_user, get_user, health, list_users};
