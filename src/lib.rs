//! Backend for splitting shared expenses: user signup and login, and the
//! splits each user records, marks paid, and deletes.

use actix_web::middleware::DefaultHeaders;

pub mod auth;
pub mod config;
pub mod gateway;
pub mod response;
pub mod routes;
pub mod schemas;
pub mod state;
pub mod validation;

pub use config::Config;
pub use routes::configure;
pub use state::AppState;

/// Hardening headers added to every response.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "SAMEORIGIN"))
        .add(("X-DNS-Prefetch-Control", "off"))
        .add(("Referrer-Policy", "no-referrer"))
}
