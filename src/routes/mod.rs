use actix_web::{error::InternalError, web, HttpResponse};

use crate::response::Envelope;

pub mod splits;
pub mod user;

const JSON_LIMIT: usize = 300 * 1024;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _request| {
            let response = HttpResponse::BadRequest().json(Envelope::failed().error(err.to_string()));
            InternalError::from_response(err, response).into()
        })
}

/// Registers every route. Public user routes first, then the splits routes,
/// each of which requires a token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    user::configure(cfg);
    splits::configure(cfg);
}
