use actix_web::{post, web, HttpResponse};
use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{error, info};

use crate::auth::{hash_password, issue_token, verify_password};
use crate::gateway::GatewayError;
use crate::response::Envelope;
use crate::schemas::{Credentials, UserRecord};
use crate::state::AppState;

const MISSING_CREDENTIALS: &str = "Missing Username or Password";

fn missing_credentials() -> HttpResponse {
    HttpResponse::BadRequest().json(Envelope::failed().error(MISSING_CREDENTIALS))
}

#[post("/login")]
async fn login(state: web::Data<AppState>, credentials: web::Json<Credentials>) -> HttpResponse {
    let Some((email, password)) = credentials.into_inner().present() else {
        return missing_credentials();
    };

    let user = match state.gateway.find_user_by_email(&email).await {
        Ok(Some(user)) if verify_password(&state.salt, &password, &user.hashed_password) => user,
        Ok(_) => return HttpResponse::BadRequest().json(Envelope::failed()),
        Err(err) => {
            error!("Login lookup failed: {}", err);
            return HttpResponse::InternalServerError().json(Envelope::failed().error("Login failed"));
        }
    };

    let token = issue_token(user.user_id, Utc::now());
    match state.gateway.insert_token(&token).await {
        Ok(()) => HttpResponse::Ok().json(Envelope::ok().token(token.token)),
        Err(err) => {
            error!("Could not store token for user {}: {}", token.user_id, err);
            HttpResponse::InternalServerError().json(Envelope::failed().error("Login failed"))
        }
    }
}

#[post("/signup")]
async fn signup(state: web::Data<AppState>, credentials: web::Json<Credentials>) -> HttpResponse {
    let Some((email, password)) = credentials.into_inner().present() else {
        return missing_credentials();
    };

    let user = UserRecord {
        user_id: ObjectId::new().to_hex(),
        hashed_password: hash_password(&state.salt, &password),
        email,
    };
    match state.gateway.insert_user(&user).await {
        Ok(()) => {
            info!("Signed up user {}", user.user_id);
            HttpResponse::Ok().json(Envelope::ok())
        }
        Err(GatewayError::Duplicate) => {
            HttpResponse::BadRequest().json(Envelope::failed().error("Duplicate User"))
        }
        Err(err) => {
            error!("Signup failed: {}", err);
            HttpResponse::InternalServerError().json(Envelope::failed().error("Signup failed"))
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/user").service(login).service(signup));
}
