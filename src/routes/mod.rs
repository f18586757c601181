// Route exports
pub mod distances;

use actix_web::web;

pub use distances::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(distances::configure),
    );
}
