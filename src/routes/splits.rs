use actix_web::{delete, middleware::from_fn, patch, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::auth::{require_token, CurrentUser};
use crate::gateway::GatewayError;
use crate::response::{Envelope, VALIDATION_FAILED};
use crate::state::AppState;
use crate::validation::{is_shared_id, is_split_id, validate_bill_split};

#[derive(Deserialize)]
struct PaidPath {
    id: String,
    name: String,
}

fn wrong_id() -> HttpResponse {
    HttpResponse::NotFound().json(Envelope::failed().message("Wrong Id"))
}

/// Zero affected rows is a miss, anything else a hit.
fn affected(
    id: &str,
    result: Result<u64, GatewayError>,
    done: &str,
    missing: &str,
    failed: &str,
) -> HttpResponse {
    match result {
        Ok(0) => HttpResponse::NotFound().json(Envelope::failed().message(missing)),
        Ok(_) => HttpResponse::Ok().json(Envelope::ok().message(done)),
        Err(err) => {
            error!("{} for {}: {}", failed, id, err);
            HttpResponse::BadRequest().json(Envelope::failed().message(failed))
        }
    }
}

#[post("")]
async fn add_split(
    user: CurrentUser,
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> HttpResponse {
    let split = match validate_bill_split(body.get("billSplit")) {
        Ok(split) => split,
        Err(errors) => {
            debug!("Rejected split payload: {:?}", errors);
            return HttpResponse::build(VALIDATION_FAILED).json(Envelope::failed().errors(errors));
        }
    };

    let record = split.into_record(user.user_id);
    match state.gateway.insert_split(&record).await {
        Ok(()) => {
            info!("Added split {} for expense {}", record.id, record.expense_id);
            HttpResponse::Ok().json(Envelope::ok())
        }
        Err(err) => {
            error!("Could not insert split {}: {}", record.id, err);
            HttpResponse::BadRequest()
                .json(Envelope::failed().message("could not put split in database"))
        }
    }
}

#[delete("/shared/{id}")]
async fn delete_shared_splits(
    user: CurrentUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> HttpResponse {
    let id = id.into_inner();
    if !is_shared_id(&id) {
        return wrong_id();
    }
    let result = state
        .gateway
        .delete_shared_splits(&id, &user.user_id)
        .await;
    affected(
        &id,
        result,
        "Deleted splits",
        "splits not found",
        "Failed to delete splits",
    )
}

#[delete("/{id}")]
async fn delete_split(
    user: CurrentUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> HttpResponse {
    let id = id.into_inner();
    if !is_split_id(&id) {
        return wrong_id();
    }
    let result = state.gateway.delete_split(&id, &user.user_id).await;
    affected(
        &id,
        result,
        "Delete successful",
        "Split not found",
        "Failed to delete split",
    )
}

/// Marks a split paid for `name`, or every split of a shared group when the
/// id mentions "shared".
#[patch("/paid/{id}/{name}")]
async fn mark_paid(
    _user: CurrentUser,
    state: web::Data<AppState>,
    path: web::Path<PaidPath>,
) -> HttpResponse {
    let PaidPath { id, name } = path.into_inner();
    if id.contains("shared") {
        let result = state.gateway.mark_shared_splits_paid(&id, &name).await;
        affected(
            &id,
            result,
            "Splits changed to paid",
            "Splits not found",
            "Failed to turn paid into true",
        )
    } else {
        let result = state.gateway.mark_split_paid(&id, &name).await;
        affected(
            &id,
            result,
            "Split changed to paid",
            "Split not found",
            "Failed to turn paid into true",
        )
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/splits")
            .wrap(from_fn(require_token))
            .service(add_split)
            .service(delete_shared_splits)
            .service(mark_paid)
            .service(delete_split),
    );
}
