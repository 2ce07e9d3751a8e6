use actix_web::{
    body::MessageBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::StatusCode,
    middleware::Next,
    web, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError,
};
use chrono::{DateTime, Utc};
use futures::future::{ready, Ready};
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng};
use sha2::Sha256;
use std::num::ParseIntError;
use thiserror::Error;
use tracing::{debug, error};

use crate::gateway::{Gateway, GatewayError};
use crate::response::Envelope;
use crate::schemas::{TokenRecord, UserId};
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the bearer token on protected routes.
pub const TOKEN_HEADER: &str = "token";
const TOKEN_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Bad token")]
    BadToken,
    #[error("Token lookup failed")]
    Lookup(#[from] GatewayError),
    #[error("application state is not registered")]
    MissingState,
}

// A rejected token is reported in the body only; the HTTP status stays 200.
impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::BadToken => StatusCode::OK,
            AuthError::Lookup(_) | AuthError::MissingState => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(Envelope::failed().reason(self.to_string()))
    }
}

/// The user a request's token resolved to.
///
/// Put into the request extensions by [`require_token`]; handlers behind the
/// gate take it as an argument.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrentUser {
    pub user_id: UserId,
}

impl FromRequest for CurrentUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(request: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            request
                .extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or(AuthError::BadToken),
        )
    }
}

/// Authentication gate for a protected scope.
///
/// The token is resolved before the inner service runs, so a rejected request
/// never has its body read.
pub async fn require_token(
    request: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let token = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let state = request.app_data::<web::Data<AppState>>().cloned();

    let resolved = match (state, token) {
        (None, _) => Err(AuthError::MissingState),
        (Some(_), None) => {
            debug!("Request without a token header");
            Err(AuthError::BadToken)
        }
        (Some(state), Some(token)) => {
            resolve_token(state.gateway.as_ref(), &token, state.token_ttl, Utc::now()).await
        }
    };

    match resolved {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.call(request)
                .await
                .map(ServiceResponse::map_into_left_body)
        }
        Err(err) => Ok(request
            .into_response(err.error_response())
            .map_into_right_body()),
    }
}

/// Maps a token to its user. Exactly one stored token must match; an expired
/// token counts as no match.
pub async fn resolve_token(
    gateway: &dyn Gateway,
    token: &str,
    ttl: Option<chrono::Duration>,
    now: DateTime<Utc>,
) -> Result<CurrentUser, AuthError> {
    let mut matches = gateway.find_tokens(token).await.map_err(|err| {
        error!("Token lookup failed: {}", err);
        AuthError::Lookup(err)
    })?;
    if matches.len() != 1 {
        debug!("Token matched {} rows", matches.len());
        return Err(AuthError::BadToken);
    }
    let record = matches.remove(0);
    if let Some(ttl) = ttl {
        if now - record.created_at > ttl {
            debug!("Token for user {} has expired", record.user_id);
            return Err(AuthError::BadToken);
        }
    }
    Ok(CurrentUser {
        user_id: record.user_id,
    })
}

pub fn issue_token(user_id: UserId, now: DateTime<Utc>) -> TokenRecord {
    let token = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect();
    TokenRecord {
        user_id,
        token,
        created_at: now,
    }
}

fn password_mac(salt: &str, password: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(salt.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(password.as_bytes());
    mac
}

/// Keyed hash of a password, as lowercase hex.
pub fn hash_password(salt: &str, password: &str) -> String {
    password_mac(salt, password)
        .finalize()
        .into_bytes()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

pub fn verify_password(salt: &str, password: &str, hashed_password: &str) -> bool {
    let Ok(expected) = decode_hex(hashed_password) else {
        return false;
    };
    password_mac(salt, password).verify_slice(&expected).is_ok()
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, ParseIntError> {
    hex.chars()
        .collect::<Vec<_>>()
        .chunks(2)
        .map(|n| u8::from_str_radix(&String::from_iter(n), 16))
        .collect()
}
