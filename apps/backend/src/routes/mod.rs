use actix_web::web;

use crate::ws::session;

pub mod health;

/// Register every route. `main.rs` and the HTTP tests share this.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Player sessions: /ws/{user_id}
    cfg.route("/ws/{user_id}", web::get().to(session::upgrade));
}
