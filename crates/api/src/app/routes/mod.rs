use axum::Router;

pub mod socks;
pub mod system;

pub fn router() -> Router {
    Router::new().nest("/api/socks", socks::router())
}
